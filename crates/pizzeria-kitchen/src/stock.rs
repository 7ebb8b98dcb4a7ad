use crate::config::{CONDVAR_POLL_BOUND, INITIAL_STOCK_COUNT};
use pizzeria_catalog::{Ingredient, INGREDIENT_COUNT};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A kitchen's ingredient inventory: a mutex-guarded count per ingredient,
/// a condvar for reservation liveness, and a restock thread (spec.md §4.3).
///
/// Every reservation is all-or-nothing: either every listed ingredient is
/// decremented or none are, so `counts` never observes a partial order.
pub struct Stock {
    counts: Mutex<[u32; INGREDIENT_COUNT]>,
    condvar: Condvar,
}

impl Stock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Mutex::new([INITIAL_STOCK_COUNT; INGREDIENT_COUNT]),
            condvar: Condvar::new(),
        }
    }

    /// Blocking reservation with an overall deadline. Retries on a bounded
    /// condvar wait so it remains live even if restock never signals
    /// (spec.md §4.3, §9 "Condition-variable liveness").
    pub fn wait_and_reserve(&self, ingredients: &[Ingredient], timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.counts.lock().unwrap();
        loop {
            if try_take(&mut guard, ingredients) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let remaining = deadline - now;
            let wait_for = remaining.min(CONDVAR_POLL_BOUND);
            let (next_guard, _timeout_result) =
                self.condvar.wait_timeout(guard, wait_for).unwrap();
            guard = next_guard;
        }
    }

    /// Non-blocking reservation attempt (spec.md §4.3).
    pub fn try_reserve(&self, ingredients: &[Ingredient]) -> bool {
        let mut guard = self.counts.lock().unwrap();
        try_take(&mut guard, ingredients)
    }

    /// Increments every ingredient by one and wakes every waiter.
    fn restock_once(&self) {
        let mut guard = self.counts.lock().unwrap();
        for count in guard.iter_mut() {
            *count += 1;
        }
        drop(guard);
        self.condvar.notify_all();
    }

    /// Renders the stock as the fixed-order space-separated string used in
    /// `Status` messages (spec.md §6).
    #[must_use]
    pub fn to_status_string(&self) -> String {
        let guard = self.counts.lock().unwrap();
        guard
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Spawns the dedicated restock thread. `on_restock` lets the owning
    /// kitchen push a fresh status after every replenishment (spec.md §4.3).
    pub fn spawn_restock_thread(
        self: &Arc<Self>,
        period: Duration,
        running: Arc<AtomicBool>,
        on_restock: impl Fn() + Send + 'static,
    ) -> JoinHandle<()> {
        let stock = Arc::clone(self);
        std::thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                if !sleep_in_bounded_steps(period, &running) {
                    break;
                }
                stock.restock_once();
                on_restock();
            }
        })
    }
}

impl Default for Stock {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleeps `total` in `CONDVAR_POLL_BOUND`-sized steps so shutdown is
/// noticed promptly even when the restock period is long. Returns `false`
/// if `running` went false before the full duration elapsed.
fn sleep_in_bounded_steps(total: Duration, running: &AtomicBool) -> bool {
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if !running.load(Ordering::Acquire) {
            return false;
        }
        let step = remaining.min(CONDVAR_POLL_BOUND);
        std::thread::sleep(step);
        remaining -= step;
    }
    running.load(Ordering::Acquire)
}

fn try_take(guard: &mut [u32; INGREDIENT_COUNT], ingredients: &[Ingredient]) -> bool {
    let has_all = ingredients.iter().all(|ing| guard[ing.index()] >= 1);
    if !has_all {
        return false;
    }
    for ing in ingredients {
        guard[ing.index()] -= 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pizzeria_catalog::Ingredient::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn fresh_stock_has_five_of_everything() {
        let stock = Stock::new();
        assert_eq!(stock.to_status_string(), "5 5 5 5 5 5 5 5 5");
    }

    #[test]
    fn try_reserve_is_all_or_nothing() {
        let stock = Stock::new();
        // Drain ChiefLove to zero.
        for _ in 0..5 {
            assert!(stock.try_reserve(&[ChiefLove]));
        }
        assert!(!stock.try_reserve(&[ChiefLove]));

        // A reservation naming ChiefLove among others must not partially
        // decrement Dough/Tomato when ChiefLove is unavailable.
        let before = stock.to_status_string();
        assert!(!stock.try_reserve(&[Dough, Tomato, ChiefLove]));
        assert_eq!(stock.to_status_string(), before);
    }

    #[test]
    fn counts_never_go_negative() {
        let stock = Stock::new();
        for _ in 0..10 {
            stock.try_reserve(&[Dough]);
        }
        let guard = stock.counts.lock().unwrap();
        assert!(guard.iter().all(|&c| c <= INITIAL_STOCK_COUNT));
    }

    #[test]
    fn restock_increments_every_ingredient() {
        let stock = Stock::new();
        assert!(stock.try_reserve(&[Dough, Tomato]));
        stock.restock_once();
        let guard = stock.counts.lock().unwrap();
        assert_eq!(guard[Dough.index()], 5);
        assert_eq!(guard[Tomato.index()], 5);
    }

    #[test]
    fn wait_and_reserve_times_out_when_unavailable() {
        let stock = Stock::new();
        for _ in 0..5 {
            assert!(stock.try_reserve(&[ChiefLove]));
        }
        let reserved = stock.wait_and_reserve(&[ChiefLove], Duration::from_millis(150));
        assert!(!reserved);
    }

    #[test]
    fn wait_and_reserve_succeeds_once_restock_runs() {
        let stock = Arc::new(Stock::new());
        for _ in 0..5 {
            assert!(stock.try_reserve(&[ChiefLove]));
        }
        let running = Arc::new(AtomicBool::new(true));
        let handle = stock.spawn_restock_thread(Duration::from_millis(50), Arc::clone(&running), || {});
        let reserved = stock.wait_and_reserve(&[ChiefLove], Duration::from_millis(500));
        assert!(reserved);
        running.store(false, Ordering::Release);
        handle.join().unwrap();
    }
}
