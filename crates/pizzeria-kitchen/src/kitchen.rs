use crate::config::{SimulatorConfig, IDLE_CLOSURE_THRESHOLD, KITCHEN_TICK};
use crate::cook::Cook;
use crate::error::KitchenError;
use crate::paths;
use crate::shared::KitchenShared;
use crate::stock::Stock;
use pizzeria_catalog::Pizza;
use pizzeria_proto::{FifoMode, FramedChannel, Message};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// The kitchen subprocess entrypoint, run after `fork` in the child
/// (spec.md §4.5). Opens its two FIFO ends, spawns the cook pool and
/// restock thread, then runs the main loop until idle-closure or a forced
/// `Closed` fires, after which it tears down and returns.
pub fn run(kitchen_id: u64, fifo_prefix: &str, config: SimulatorConfig) -> Result<(), KitchenError> {
    let order_path = paths::reception_to_kitchen(fifo_prefix, kitchen_id);
    let reply_path = paths::kitchen_to_reception(fifo_prefix);

    let mut from_reception = FramedChannel::open(&order_path, FifoMode::ReadOnly)?;
    let to_reception = FramedChannel::open(&reply_path, FifoMode::WriteOnly)?;

    let stock = Arc::new(Stock::new());
    let shared = Arc::new(KitchenShared::new(kitchen_id, config, Arc::clone(&stock), to_reception));

    let cooks: Vec<Cook> = (0..config.cooks_per_kitchen())
        .map(|_| Cook::spawn(Arc::clone(&shared)))
        .collect();

    let restock_running = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let restock_shared = Arc::clone(&shared);
    let restock_handle = stock.spawn_restock_thread(
        config.restock_period(),
        Arc::clone(&restock_running),
        move || restock_shared.emit_status(),
    );

    main_loop(&shared, &mut from_reception);

    shared.running.store(false, Ordering::Release);
    shared.queue.notify_all();
    for cook in cooks {
        cook.join();
    }
    restock_running.store(false, Ordering::Release);
    // The restock thread wakes at most once more, observes `running` is
    // false, and exits; join waits out that remainder of its sleep.
    let _ = restock_handle.join();
    shared.queue.clear();

    Ok(())
}

fn main_loop(shared: &Arc<KitchenShared>, from_reception: &mut FramedChannel) {
    loop {
        drain_order_pipe(shared, from_reception);
        if !shared.is_running() {
            return;
        }

        let (elapsed_idle_ms, _idle_count) = shared.tick_idle_state();
        if elapsed_idle_ms >= IDLE_CLOSURE_THRESHOLD.as_millis() as i64 {
            shared.send_to_reception(&Message::Closed {
                kitchen_id: shared.kitchen_id,
            });
            return;
        }

        std::thread::sleep(KITCHEN_TICK);
    }
}

fn drain_order_pipe(shared: &Arc<KitchenShared>, from_reception: &mut FramedChannel) {
    while let Some(message) = from_reception.try_recv() {
        match message {
            Message::RequestStatus => shared.emit_status(),
            Message::Order { pizza, .. } => {
                if let Ok(pizza) = Pizza::unpack(pizza) {
                    shared.add_queued_cook_time_ms(
                        pizza.effective_cook_time_ms(shared.config.multiplier()) as i64,
                    );
                    shared.queue.push(pizza);
                    shared.emit_status();
                } else {
                    log::warn!("kitchen {} dropped order with unknown pizza byte", shared.kitchen_id);
                }
            }
            Message::Closed { .. } => {
                shared.running.store(false, Ordering::Release);
                return;
            }
            other => {
                log::warn!("kitchen {} received unexpected message: {other:?}", shared.kitchen_id);
            }
        }
    }
}
