//! Host-clock driven delayed actions.
//!
//! The emitter never sleeps or spawns threads. The host calls
//! [`Scheduler::advance`] from its frame loop and receives the actions whose
//! deadline has passed. Every action is tagged with the session that
//! scheduled it, so replacing a session can cancel everything that belonged to
//! the old one.

use std::time::Duration;

/// Identity of one emission session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone)]
struct Pending<A> {
    /// Scheduling order, breaks deadline ties
    seq: u64,
    due: Duration,
    session: SessionId,
    action: A,
}

/// A queue of one-shot delayed actions over a monotonic host clock.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self { now: Duration::ZERO, next_seq: 0, pending: Vec::new() }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `action` to fire `delay` from now on behalf of `session`.
    pub fn schedule(&mut self, delay: Duration, session: SessionId, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { seq, due: self.now + delay, session, action });
    }

    /// Cancel every action scheduled on behalf of `session`.
    pub fn cancel_session(&mut self, session: SessionId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.session != session);
        before - self.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and drain every action that is now due, in
    /// deadline order (ties keep scheduling order).
    pub fn advance(&mut self, elapsed: Duration) -> Vec<(SessionId, A)> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| (p.session, p.action)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: SessionId = SessionId(1);
    const B: SessionId = SessionId(2);

    #[test]
    fn test_fires_after_delay() {
        let mut s = Scheduler::new();
        s.schedule(Duration::from_millis(100), A, "suppress");

        assert!(s.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(s.advance(Duration::from_millis(1)), vec![(A, "suppress")]);
        assert_eq!(s.pending_count(), 0);
        assert!(s.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(Duration::from_millis(300), A, 3);
        s.schedule(Duration::from_millis(100), A, 1);
        s.schedule(Duration::from_millis(100), B, 2);

        let fired: Vec<i32> =
            s.advance(Duration::from_secs(1)).into_iter().map(|(_, a)| a).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel_session_after_fire_is_empty() {
        let mut s = Scheduler::new();
        s.schedule(Duration::from_millis(10), A, ());
        assert_eq!(s.advance(Duration::from_millis(10)).len(), 1);
        assert_eq!(s.cancel_session(A), 0);
    }

    #[test]
    fn test_cancel_session_leaves_others() {
        let mut s = Scheduler::new();
        s.schedule(Duration::from_millis(10), A, "a1");
        s.schedule(Duration::from_millis(20), A, "a2");
        s.schedule(Duration::from_millis(30), B, "b");

        assert_eq!(s.cancel_session(A), 2);
        assert_eq!(s.advance(Duration::from_secs(1)), vec![(B, "b")]);
    }

    #[test]
    fn test_clock_accumulates() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.advance(Duration::from_millis(40));
        s.advance(Duration::from_millis(60));
        assert_eq!(s.now(), Duration::from_millis(100));

        // Delay counts from the current clock, not from zero
        s.schedule(Duration::from_millis(50), A, ());
        assert!(s.advance(Duration::from_millis(49)).is_empty());
        assert_eq!(s.advance(Duration::from_millis(1)).len(), 1);
    }
}
