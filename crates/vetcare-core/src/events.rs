//! Cache-invalidation events.
//!
//! Each successful mutation publishes the query tags whose cached results it
//! stales. The view layer drains them and refetches; reads publish nothing.

use std::cell::RefCell;

/// Cached query families the UI shell keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum QueryTag {
    /// Open appointment listing
    VetAppointments,
    /// Clinical records with their entries
    ClinicalRecords,
    /// Per-customer purchase history
    MyPurchases,
}

/// Collects invalidation events across one interaction.
///
/// Single-threaded by design: the core suspends only while awaiting the
/// store, so interior mutability is enough here.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: RefCell<Vec<QueryTag>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a successful mutation staled `tag`.
    pub fn publish(&self, tag: QueryTag) {
        self.pending.borrow_mut().push(tag);
    }

    /// Take all pending events, leaving the bus empty.
    pub fn drain(&self) -> Vec<QueryTag> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new();
        assert!(bus.is_empty());

        bus.publish(QueryTag::VetAppointments);
        bus.publish(QueryTag::ClinicalRecords);

        assert_eq!(
            bus.drain(),
            vec![QueryTag::VetAppointments, QueryTag::ClinicalRecords]
        );
        assert!(bus.is_empty());
    }
}
