//! Scripted-event scheduling: hands the sim every event whose `time`
//! has been reached, in time order, exactly once.

use crate::schema::ScheduledEvent;

pub struct EventScheduler {
    pending: Vec<ScheduledEvent>,
}

impl EventScheduler {
    pub fn new(mut events: Vec<ScheduledEvent>) -> Self {
        events.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap());
        Self { pending: events }
    }

    /// Remove and return every event with `time <= now`, in time order.
    pub fn due(&mut self, now: f64) -> Vec<ScheduledEvent> {
        let split = self.pending.partition_point(|e| e.time <= now);
        self.pending.drain(..split).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn ev(time: f64, action: &str) -> ScheduledEvent {
        ScheduledEvent { time, action: action.to_string(), params: Map::new() }
    }

    #[test]
    fn due_events_come_back_in_time_order_and_are_consumed() {
        let mut sched = EventScheduler::new(vec![ev(5.0, "b"), ev(1.0, "a"), ev(10.0, "c")]);
        let due = sched.due(5.0);
        assert_eq!(due.iter().map(|e| e.action.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(sched.remaining(), 1);
        let due2 = sched.due(10.0);
        assert_eq!(due2.len(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn no_events_due_before_their_time() {
        let mut sched = EventScheduler::new(vec![ev(100.0, "late")]);
        assert!(sched.due(50.0).is_empty());
        assert_eq!(sched.remaining(), 1);
    }
}
