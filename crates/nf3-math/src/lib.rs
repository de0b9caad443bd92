//! NF3 flow analytics math utilities.

pub mod math;

pub use math::correlation::*;
pub use math::quantile::*;
pub use math::ratio::*;
pub use math::rolling::*;
