use super::*;

fn drain(q: &mut TimerQueue, now: u64) -> Vec<(String, u64)> {
    let mut out = Vec::new();
    while let Some(t) = q.pop_due(now) {
        out.push((t.handler, t.due_ms));
    }
    out
}

#[test]
fn fires_in_due_order_with_registration_tiebreak() {
    let mut q = TimerQueue::default();
    q.schedule(0, 300, None, "c".into(), None);
    q.schedule(0, 100, None, "a".into(), None);
    q.schedule(0, 100, None, "b".into(), None);
    assert_eq!(
        drain(&mut q, 1000),
        vec![("a".into(), 100), ("b".into(), 100), ("c".into(), 300)]
    );
    assert_eq!(q.len(), 0);
}

#[test]
fn nothing_fires_before_due() {
    let mut q = TimerQueue::default();
    q.schedule(50, 100, None, "a".into(), None);
    assert!(q.pop_due(149).is_none());
    assert_eq!(q.next_due(), Some(150));
    assert!(q.pop_due(150).is_some());
}

#[test]
fn intervals_reschedule_by_period() {
    let mut q = TimerQueue::default();
    q.schedule(0, 100, Some(100), "tick".into(), None);
    q.schedule(0, 250, None, "once".into(), None);
    let fired = drain(&mut q, 350);
    assert_eq!(
        fired,
        vec![
            ("tick".into(), 100),
            ("tick".into(), 200),
            ("once".into(), 250),
            ("tick".into(), 300),
        ]
    );
    assert_eq!(q.next_due(), Some(400));
}

#[test]
fn interval_keeps_registration_order_on_ties() {
    let mut q = TimerQueue::default();
    q.schedule(0, 100, Some(100), "first".into(), None);
    q.schedule(0, 200, None, "second".into(), None);
    let fired = drain(&mut q, 200);
    assert_eq!(fired[1], ("first".into(), 200));
    assert_eq!(fired[2], ("second".into(), 200));
}

#[test]
fn cancel_removes_pending_and_rescheduled_intervals() {
    let mut q = TimerQueue::default();
    let id = q.schedule(0, 10, Some(10), "i".into(), None);
    let t = q.pop_due(10).unwrap();
    assert_eq!(t.id, id);
    assert!(q.cancel(id));
    assert!(!q.cancel(id));
    assert!(q.pop_due(1000).is_none());
}

#[test]
fn zero_period_is_clamped() {
    let mut q = TimerQueue::default();
    q.schedule(0, 0, Some(0), "i".into(), None);
    assert_eq!(drain(&mut q, 3).len(), 4);
}
