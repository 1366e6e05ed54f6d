//! Proof codec
//!
//! Turns the flat epoch record written by the off-chain prover into the
//! structured dual proof the Orand provider contract accepts:
//! - hex normalization (even digit count, `0x` prefix)
//! - splitting of concatenated field-element pairs
//! - boundary validation of field lengths and digits

mod normalize;
mod proof;

pub use normalize::*;
pub use proof::*;
