//! Crab Orders - pure order core
//!
//! Decimal money utility, price rule engine, event reducer, snapshot store
//! and receipt aggregation. No async and no I/O: everything here is driven
//! by the events and rules the caller hands in.

pub mod money;
pub mod orders;
pub mod pricing;
pub mod receipt;

pub use money::RoundingMode;
pub use orders::{IntegrityError, OrderStore, PricingContext};
pub use receipt::build_receipt;
