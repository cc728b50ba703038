//! Order Event Sourcing Module
//!
//! - **traits**: `EventApplier` and the pricing context threaded through it
//! - **appliers**: one applier per event type, dispatched via `EventAction`
//! - **reducer**: `apply(prev, event)`, fold and replay
//! - **repricing** / **totals**: rule selection and money recomputation
//! - **integrity**: hash-chain verification
//! - **store**: in-memory snapshot store, atomic per event and per batch
//!
//! # Data Flow
//!
//! ```text
//! OrderEvent → integrity::verify_link → reducer::apply → EventAction
//!                                             ↓
//!                                  totals::recalculate → OrderStore
//! ```

pub mod traits;

pub mod appliers;
pub mod integrity;
pub mod reducer;
pub mod repricing;
pub mod store;
pub mod totals;

// Re-exports
pub use appliers::EventAction;
pub use integrity::IntegrityError;
pub use reducer::{apply, fold, replay};
pub use store::OrderStore;
pub use traits::{EventApplier, PricingContext};
