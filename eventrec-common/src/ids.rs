//! Identifier allocation

use crate::model::{Event, EventId};

/// Next identifier: one past the largest id in `events`, or 1 when empty
///
/// `None` when the largest id is already `EventId::MAX`. Not safe against two
/// callers racing on the same snapshot; the repository calls this while
/// holding its write lock.
pub fn next_id(events: &[Event]) -> Option<EventId> {
    events.iter().map(|e| e.id).max().unwrap_or(0).checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ids(ids: &[EventId]) -> Vec<Event> {
        ids.iter()
            .map(|&id| Event::new(id, "e", "2024-01-01", "Technical"))
            .collect()
    }

    #[test]
    fn test_next_id_empty() {
        assert_eq!(next_id(&[]), Some(1));
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        assert_eq!(next_id(&with_ids(&[1, 5, 3])), Some(6));
    }

    #[test]
    fn test_next_id_ignores_gaps() {
        assert_eq!(next_id(&with_ids(&[2, 4])), Some(5));
    }

    #[test]
    fn test_next_id_exhausted_at_max() {
        assert_eq!(next_id(&with_ids(&[3, EventId::MAX])), None);
        assert_eq!(next_id(&with_ids(&[EventId::MAX - 1])), Some(EventId::MAX));
    }
}
