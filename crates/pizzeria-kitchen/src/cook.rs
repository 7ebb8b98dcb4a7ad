use crate::config::{COOK_DEQUEUE_TIMEOUT, INGREDIENT_RESERVE_TIMEOUT};
use crate::shared::KitchenShared;
use pizzeria_proto::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A single cook worker thread (spec.md §4.4). `cooking` is read by the
/// kitchen's idle-closure check without further synchronisation; a brief
/// race that miscounts an in-flight cook by one is tolerable and
/// self-corrects on the next status (spec.md §4.4).
pub struct Cook {
    cooking: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Cook {
    /// Spawns the cook thread against the kitchen's shared state.
    pub fn spawn(shared: Arc<KitchenShared>) -> Self {
        let cooking = Arc::new(AtomicBool::new(false));
        shared.register_cook_flag(Arc::clone(&cooking));
        let cooking_for_thread = Arc::clone(&cooking);
        let handle = std::thread::spawn(move || cook_loop(shared, cooking_for_thread));
        Self {
            cooking,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn is_cooking(&self) -> bool {
        self.cooking.load(Ordering::Acquire)
    }

    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn cook_loop(shared: Arc<KitchenShared>, cooking: Arc<AtomicBool>) {
    loop {
        if !shared.is_running() {
            return;
        }

        let Some(pizza) = shared.queue.pop_timeout(COOK_DEQUEUE_TIMEOUT) else {
            continue;
        };

        let reserved = shared
            .stock
            .wait_and_reserve(pizza.ingredients(), INGREDIENT_RESERVE_TIMEOUT);
        if !reserved {
            shared.queue.push(pizza);
            continue;
        }

        cooking.store(true, Ordering::Release);
        shared.emit_status();

        let cook_time = pizza.effective_cook_time_ms(shared.config.multiplier());
        std::thread::sleep(std::time::Duration::from_millis(cook_time));
        cooking.store(false, Ordering::Release);

        shared.sub_queued_cook_time_ms(cook_time as i64);
        shared.emit_status();
        shared.send_to_reception(&Message::CookedPizza {
            kitchen_id: shared.kitchen_id,
            pizza: pizza.pack(),
        });
    }
}
