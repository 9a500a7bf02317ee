use std::time::Duration;

/// Handle to a scheduled task, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    due: Duration,
    period: Option<Duration>,
    task: T,
}

/// Single-threaded timer queue on a virtual monotonic clock.
///
/// Nothing fires on its own: the owner advances the clock with
/// [`Scheduler::next_due`], handling each task as it is popped, so a handler
/// may schedule or cancel further tasks before the next one is considered.
/// Tasks due at the same instant fire in scheduling order.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `task` once, `delay` from now
    pub fn after(&mut self, delay: Duration, task: T) -> TaskId {
        self.push(self.now + delay, None, task)
    }

    /// Fire `task` every `period`, first time one period from now
    pub fn every(&mut self, period: Duration, task: T) -> TaskId {
        // a zero period would never let the clock advance
        let period = period.max(Duration::from_millis(1));
        self.push(self.now + period, Some(period), task)
    }

    /// Returns true if the task was still pending
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Pops the earliest task due at or before `until`, moving the clock to its
    /// due time. When nothing else is due the clock moves to `until` and `None`
    /// is returned.
    pub fn next_due(&mut self, until: Duration) -> Option<T> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(pos, _)| pos);

        match pos {
            Some(pos) => {
                let entry = &mut self.entries[pos];
                self.now = self.now.max(entry.due);
                let task = entry.task.clone();
                let period = entry.period;
                match period {
                    Some(period) => entry.due += period,
                    None => {
                        self.entries.remove(pos);
                    }
                }
                Some(task)
            }
            None => {
                self.now = self.now.max(until);
                None
            }
        }
    }

    fn push(&mut self, due: Duration, period: Option<Duration>, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due,
            period,
            task,
        });
        id
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>, until: Duration) -> Vec<(&'static str, Duration)> {
        let mut fired = vec![];
        while let Some(task) = s.next_due(until) {
            fired.push((task, s.now()));
        }
        fired
    }

    #[test]
    fn test_one_shot_fires_once_at_due_time() {
        let mut s = Scheduler::new();
        s.after(Duration::from_millis(500), "hide");

        assert!(drain(&mut s, Duration::from_millis(499)).is_empty());
        assert_eq!(
            drain(&mut s, Duration::from_secs(10)),
            vec![("hide", Duration::from_millis(500))]
        );
        assert_eq!(s.pending(), 0);
        assert_eq!(s.now(), Duration::from_secs(10));
    }

    #[test]
    fn test_periodic_fires_per_period() {
        let mut s = Scheduler::new();
        s.every(Duration::from_secs(1), "tick");

        let fired = drain(&mut s, Duration::from_millis(3500));
        assert_eq!(fired.len(), 3);
        assert_eq!(fired[2].1, Duration::from_secs(3));
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut s = Scheduler::new();
        let id = s.after(Duration::from_secs(5), "reveal");
        assert!(s.is_pending(id));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(drain(&mut s, Duration::from_secs(6)).is_empty());
    }

    #[test]
    fn test_ordering_by_due_then_insertion() {
        let mut s = Scheduler::new();
        s.after(Duration::from_secs(2), "late");
        s.after(Duration::from_secs(1), "first");
        s.after(Duration::from_secs(1), "second");

        let order: Vec<_> = drain(&mut s, Duration::from_secs(3))
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(order, vec!["first", "second", "late"]);
    }

    #[test]
    fn test_tasks_scheduled_mid_drain_are_relative_to_fire_time() {
        let mut s = Scheduler::new();
        s.after(Duration::from_secs(5), "reveal");

        assert_eq!(s.next_due(Duration::from_secs(20)), Some("reveal"));
        s.after(Duration::from_millis(2500), "top");

        assert_eq!(
            drain(&mut s, Duration::from_secs(20)),
            vec![("top", Duration::from_millis(7500))]
        );
    }
}
