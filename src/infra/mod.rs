//! Infrastructure layer for the Orand epoch publisher
//!
//! Contains:
//! - Error types
//! - The provider contract seam (`OrandProvider`, `ProviderConnector`)
//! - The publisher handle registry

mod error;
mod registry;
mod traits;

pub use error::*;
pub use registry::PublisherRegistry;
pub use traits::*;
