//! Cap-Table Computation Core.
//!
//! Pure financial engines for modeling equity ownership: time-based vesting,
//! SAFE-to-equity conversion, dilution from priced rounds, and liquidation
//! waterfalls. All math runs on exact decimals with explicit floor rounding,
//! so identical inputs reproduce identical outputs byte for byte. No engine
//! performs I/O or mutates its inputs.

pub mod types;
pub mod dates;
pub mod error;
pub mod share_class;
pub mod vesting;
pub mod safe;
pub mod dilution;
pub mod waterfall;
pub mod captable;

pub use types::*;
pub use dates::*;
pub use error::*;
pub use share_class::*;
pub use vesting::*;
pub use safe::*;
pub use dilution::*;
pub use waterfall::*;
pub use captable::*;
