use crate::config::SimulatorConfig;
use crate::queue::OrderQueue;
use crate::stock::Stock;
use pizzeria_proto::{FramedChannel, Message};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// The single shared-state block referenced by the kitchen main loop and
/// every cook thread, in place of reciprocal kitchen/cook ownership
/// (spec.md §9 "Cyclic references").
pub struct KitchenShared {
    pub kitchen_id: u64,
    pub config: SimulatorConfig,
    pub queue: OrderQueue,
    pub stock: Arc<Stock>,
    pub running: AtomicBool,
    queued_cook_time_ms: AtomicI64,
    to_reception: Mutex<FramedChannel>,
    cook_flags: Mutex<Vec<Arc<AtomicBool>>>,
    idle_since: Mutex<Instant>,
}

impl KitchenShared {
    #[must_use]
    pub fn new(
        kitchen_id: u64,
        config: SimulatorConfig,
        stock: Arc<Stock>,
        to_reception: FramedChannel,
    ) -> Self {
        Self {
            kitchen_id,
            config,
            queue: OrderQueue::new(),
            stock,
            running: AtomicBool::new(true),
            queued_cook_time_ms: AtomicI64::new(0),
            to_reception: Mutex::new(to_reception),
            cook_flags: Mutex::new(Vec::new()),
            idle_since: Mutex::new(Instant::now()),
        }
    }

    /// Registers a cook's `cooking` flag so idle counting can observe it.
    /// Called once per cook, right after the cook pool is spawned.
    pub fn register_cook_flag(&self, flag: Arc<AtomicBool>) {
        self.cook_flags.lock().unwrap().push(flag);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn add_queued_cook_time_ms(&self, delta: i64) {
        self.queued_cook_time_ms.fetch_add(delta, Ordering::AcqRel);
    }

    pub fn sub_queued_cook_time_ms(&self, delta: i64) {
        self.queued_cook_time_ms.fetch_sub(delta, Ordering::AcqRel);
    }

    #[must_use]
    pub fn queued_cook_time_ms(&self) -> i64 {
        self.queued_cook_time_ms.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn cook_count(&self) -> usize {
        self.cook_flags.lock().unwrap().len()
    }

    #[must_use]
    fn idle_cook_count(&self) -> usize {
        self.cook_flags
            .lock()
            .unwrap()
            .iter()
            .filter(|flag| !flag.load(Ordering::Acquire))
            .count()
    }

    /// Recomputes the idle-closure window (spec.md §4.5.1): counts idle
    /// cooks; if fewer than every cook is idle, or the queue is non-empty,
    /// the kitchen is busy and the timer resets. Otherwise returns elapsed
    /// idle time since the last busy observation.
    ///
    /// Returns `(elapsed_idle_ms, idle_count)`.
    pub fn tick_idle_state(&self) -> (i64, u64) {
        let idle_count = self.idle_cook_count();
        let busy = idle_count < self.cook_count() || !self.queue.is_empty();
        let mut idle_since = self.idle_since.lock().unwrap();
        if busy {
            *idle_since = Instant::now();
            (0, idle_count as u64)
        } else {
            let elapsed = idle_since.elapsed().as_millis() as i64;
            (elapsed, idle_count as u64)
        }
    }

    /// Sends one message on the shared kitchen-to-reception channel. Every
    /// cook and the main loop share this single writer handle, so sends are
    /// serialised (spec.md §9: the shared pipe relies on `PIPE_BUF` atomic
    /// writes; serialising the writer side within this process keeps one
    /// frame's bytes from interleaving with another's).
    pub fn send_to_reception(&self, message: &Message) {
        let mut channel = self.to_reception.lock().unwrap();
        if let Err(err) = channel.send(message) {
            log::warn!(
                "kitchen {} failed to send to reception: {err}",
                self.kitchen_id
            );
        }
    }

    /// Recomputes idle state and emits the resulting `Status` snapshot
    /// (spec.md §4.2, §4.4 "emit a status update", §4.5).
    pub fn emit_status(&self) {
        let (elapsed_idle_ms, idle_count) = self.tick_idle_state();
        let message = Message::Status {
            kitchen_id: self.kitchen_id,
            stock: self.stock.to_status_string(),
            elapsed_idle_ms,
            idle_count,
            queued_count: self.queue.len() as u64,
            queued_cook_time_ms: self.queued_cook_time_ms(),
        };
        self.send_to_reception(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::Stock;
    use pizzeria_catalog::{Pizza, PizzaType, Size};
    use pizzeria_proto::FifoMode;
    use tempfile::tempdir;

    fn make_shared(dir: &std::path::Path) -> KitchenShared {
        let path = dir.join("chan");
        let _reader = FramedChannel::open(&path, FifoMode::ReadOnly).unwrap();
        let writer = FramedChannel::open(&path, FifoMode::WriteOnly).unwrap();
        let config = SimulatorConfig::new(1.0, 2, std::time::Duration::from_secs(10));
        KitchenShared::new(0, config, Arc::new(Stock::new()), writer)
    }

    /// spec.md §8: "No kitchen closes while any of its cooks has
    /// cooking=true or its queue is non-empty (the check resets the timer
    /// on every such tick)."
    #[test]
    fn busy_cook_resets_elapsed_idle_to_zero() {
        let dir = tempdir().unwrap();
        let shared = make_shared(dir.path());
        shared.register_cook_flag(Arc::new(AtomicBool::new(true)));
        shared.register_cook_flag(Arc::new(AtomicBool::new(false)));

        let (elapsed, idle_count) = shared.tick_idle_state();
        assert_eq!(elapsed, 0);
        assert_eq!(idle_count, 1);
    }

    #[test]
    fn nonempty_queue_resets_elapsed_idle_even_with_every_cook_idle() {
        let dir = tempdir().unwrap();
        let shared = make_shared(dir.path());
        shared.register_cook_flag(Arc::new(AtomicBool::new(false)));
        shared.queue.push(Pizza::new(PizzaType::Margarita, Size::S));

        let (elapsed, idle_count) = shared.tick_idle_state();
        assert_eq!(elapsed, 0);
        assert_eq!(idle_count, 1);
    }

    #[test]
    fn fully_idle_kitchen_accumulates_elapsed_time() {
        let dir = tempdir().unwrap();
        let shared = make_shared(dir.path());
        shared.register_cook_flag(Arc::new(AtomicBool::new(false)));

        let (first, _) = shared.tick_idle_state();
        assert_eq!(first, 0); // idle_since just reset on construction

        std::thread::sleep(std::time::Duration::from_millis(30));
        let (second, idle_count) = shared.tick_idle_state();
        assert!(second >= 30, "elapsed {second} should have accumulated");
        assert_eq!(idle_count, 1);
    }

    #[test]
    fn queued_cook_time_tracks_additions_and_subtractions() {
        let dir = tempdir().unwrap();
        let shared = make_shared(dir.path());
        shared.add_queued_cook_time_ms(1500);
        shared.add_queued_cook_time_ms(500);
        assert_eq!(shared.queued_cook_time_ms(), 2000);
        shared.sub_queued_cook_time_ms(500);
        assert_eq!(shared.queued_cook_time_ms(), 1500);
    }
}
