//! OrderNoteAdded event applier (informational)

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderNoteAdded applier
pub struct OrderNoteAddedApplier;

impl EventApplier for OrderNoteAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderNoteAdded { note } = &event.payload {
            // Empty note clears
            snapshot.note = if note.trim().is_empty() {
                None
            } else {
                Some(note.clone())
            };
        }
    }
}
