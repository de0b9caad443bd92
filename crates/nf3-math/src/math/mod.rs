//! Core math modules.

pub mod correlation;
pub mod quantile;
pub mod ratio;
pub mod rolling;
