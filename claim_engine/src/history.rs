/// Claim Engine — History Log
///
/// Events are appended, never edited or removed. Order is a view
/// concern: live transitions store newest-first, replay stores
/// oldest-first, and readers pick the order they need.

use std::cmp::Ordering;

use crate::clock::Clock;
use crate::domain::{EventRole, HistoryEvent};

/// Sort direction for history by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrder {
    Ascending,
    Descending,
}

/// Whitespace-only notes are recorded as absent.
pub fn normalize_note(note: Option<&str>) -> Option<String> {
    note.filter(|n| !n.trim().is_empty()).map(str::to_string)
}

/// Build an event stamped with the clock's current time and a fresh id.
pub fn new_event(
    clock: &dyn Clock,
    user: &str,
    role: EventRole,
    action: impl Into<String>,
    note: Option<&str>,
) -> HistoryEvent {
    HistoryEvent {
        id: clock.next_event_id(),
        timestamp: clock.now(),
        user: user.to_string(),
        role,
        action: action.into(),
        notes: normalize_note(note),
    }
}

/// Stable sort in place. Equal timestamps keep their stored order.
pub fn sort_history(history: &mut [HistoryEvent], order: HistoryOrder) {
    history.sort_by(|a, b| compare(a, b, order));
}

/// Sorted view without touching the stored order.
pub fn ordered(history: &[HistoryEvent], order: HistoryOrder) -> Vec<&HistoryEvent> {
    let mut view: Vec<&HistoryEvent> = history.iter().collect();
    view.sort_by(|a, b| compare(a, b, order));
    view
}

/// Add a live event and re-sort newest-first. The new event goes in
/// front, so it stays ahead of any older event with the same timestamp.
pub fn append_live(history: &mut Vec<HistoryEvent>, event: HistoryEvent) {
    history.insert(0, event);
    sort_history(history, HistoryOrder::Descending);
}

pub fn is_sorted(history: &[HistoryEvent], order: HistoryOrder) -> bool {
    history
        .windows(2)
        .all(|w| compare(&w[0], &w[1], order) != Ordering::Greater)
}

fn compare(a: &HistoryEvent, b: &HistoryEvent, order: HistoryOrder) -> Ordering {
    match order {
        HistoryOrder::Ascending => a.timestamp.cmp(&b.timestamp),
        HistoryOrder::Descending => b.timestamp.cmp(&a.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::OffsetDateTime;

    fn event(id: &str, at: OffsetDateTime) -> HistoryEvent {
        HistoryEvent {
            id: id.to_string(),
            timestamp: at,
            user: "tester".to_string(),
            role: EventRole::Agent,
            action: "Note Added".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_normalize_note() {
        assert_eq!(normalize_note(None), None);
        assert_eq!(normalize_note(Some("")), None);
        assert_eq!(normalize_note(Some("  \n\t")), None);
        assert_eq!(normalize_note(Some(" keep me ")), Some(" keep me ".to_string()));
    }

    #[test]
    fn test_append_live_keeps_newest_first() {
        let mut history = vec![event("a", datetime!(2025-07-20 10:00 UTC))];
        append_live(&mut history, event("b", datetime!(2025-07-20 12:00 UTC)));
        append_live(&mut history, event("c", datetime!(2025-07-20 11:00 UTC)));
        let ids: Vec<&str> = history.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(is_sorted(&history, HistoryOrder::Descending));
        assert!(!is_sorted(&history, HistoryOrder::Ascending));
    }

    #[test]
    fn test_ordered_view_leaves_store_untouched() {
        let history = vec![
            event("late", datetime!(2025-07-20 12:00 UTC)),
            event("early", datetime!(2025-07-20 09:00 UTC)),
        ];
        let asc = ordered(&history, HistoryOrder::Ascending);
        assert_eq!(asc[0].id, "early");
        assert_eq!(history[0].id, "late");
    }

    #[test]
    fn test_sort_keeps_stored_order_for_equal_timestamps() {
        let at = datetime!(2025-07-20 09:00 UTC);
        let mut history = vec![event("first", at), event("second", at)];
        sort_history(&mut history, HistoryOrder::Ascending);
        assert_eq!(history[0].id, "first");
    }

    #[test]
    fn test_append_live_puts_same_instant_event_first() {
        let at = datetime!(2025-07-20 09:00 UTC);
        let mut history = vec![event("old", datetime!(2025-07-20 08:00 UTC))];
        append_live(&mut history, event("first", at));
        append_live(&mut history, event("second", at));
        append_live(&mut history, event("third", at));
        let ids: Vec<&str> = history.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["third", "second", "first", "old"]);
        assert!(is_sorted(&history, HistoryOrder::Descending));

        let view = ordered(&history, HistoryOrder::Descending);
        assert_eq!(view[0].id, "third");
    }
}
