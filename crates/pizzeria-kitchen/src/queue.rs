use crate::config::CONDVAR_POLL_BOUND;
use pizzeria_catalog::Pizza;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// The kitchen's pending-pizza queue: FIFO discipline, mutex + condvar
/// (spec.md §3 "Pizza order queue", §4.4, §4.5).
#[derive(Default)]
pub struct OrderQueue {
    items: Mutex<VecDeque<Pizza>>,
    condvar: Condvar,
}

impl OrderQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pizza and wakes one waiting cook (spec.md §4.5: "enqueue
    /// and signal one cook").
    pub fn push(&self, pizza: Pizza) {
        let mut guard = self.items.lock().unwrap();
        guard.push_back(pizza);
        drop(guard);
        self.condvar.notify_one();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks up to `timeout` for a pizza to become available (spec.md §4.4
    /// step 2: bounded 100ms dequeue, used for shutdown responsiveness).
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Pizza> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.items.lock().unwrap();
        loop {
            if let Some(pizza) = guard.pop_front() {
                return Some(pizza);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let remaining = deadline - now;
            let wait_for = remaining.min(CONDVAR_POLL_BOUND);
            let (next_guard, _) = self.condvar.wait_timeout(guard, wait_for).unwrap();
            guard = next_guard;
        }
    }

    /// Wakes every blocked cook without changing the queue, used on
    /// shutdown so all cooks observe the `running` flag promptly (spec.md
    /// §4.5 "Shutdown").
    pub fn notify_all(&self) {
        self.condvar.notify_all();
    }

    /// Drops all remaining items; the design forfeits a closing kitchen's
    /// queue rather than draining it (spec.md §4.5, §9 Open Questions).
    pub fn clear(&self) {
        self.items.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pizzeria_catalog::{PizzaType, Size};

    fn sample() -> Pizza {
        Pizza::new(PizzaType::Margarita, Size::S)
    }

    #[test]
    fn fifo_order_is_preserved() {
        let q = OrderQueue::new();
        q.push(Pizza::new(PizzaType::Margarita, Size::S));
        q.push(Pizza::new(PizzaType::Regina, Size::M));
        assert_eq!(
            q.pop_timeout(Duration::from_millis(10)).unwrap().pizza_type,
            PizzaType::Margarita
        );
        assert_eq!(
            q.pop_timeout(Duration::from_millis(10)).unwrap().pizza_type,
            PizzaType::Regina
        );
    }

    #[test]
    fn pop_on_empty_queue_times_out() {
        let q = OrderQueue::new();
        assert!(q.pop_timeout(Duration::from_millis(50)).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let q = OrderQueue::new();
        q.push(sample());
        q.push(sample());
        q.clear();
        assert!(q.is_empty());
    }
}
