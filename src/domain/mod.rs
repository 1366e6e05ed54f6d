//! Domain models for the Orand epoch publisher
//!
//! Epoch records, the structured proof layout, verification read-backs and
//! submission handles.

mod epoch;
mod types;
mod verification;

pub use epoch::*;
pub use types::*;
pub use verification::*;
