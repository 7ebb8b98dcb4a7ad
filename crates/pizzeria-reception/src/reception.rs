use crate::dispatch::{self, KitchenSnapshot};
use crate::error::ReceptionError;
use crate::kitchen_record::KitchenRecord;
use crate::supervisor::ProcessSupervisor;
use pizzeria_catalog::Pizza;
use pizzeria_kitchen::SimulatorConfig;
use pizzeria_proto::{FifoMode, FramedChannel, Message};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

const MANAGER_TICK: Duration = Duration::from_millis(10);

/// State shared between the CLI thread and the manager thread (spec.md §5:
/// "one mutex covering `m_kitchens`").
struct ReceptionShared {
    kitchens: Mutex<Vec<KitchenRecord>>,
    next_id: AtomicU64,
    config: SimulatorConfig,
    fifo_prefix: String,
}

/// The parent process: owns every kitchen handle, dispatches orders, and
/// renders completion events (spec.md §4.6).
pub struct Reception {
    shared: Arc<ReceptionShared>,
    manager_running: Arc<AtomicBool>,
    manager_handle: Option<JoinHandle<()>>,
}

impl Reception {
    pub fn new(fifo_prefix: impl Into<String>, config: SimulatorConfig) -> Result<Self, ReceptionError> {
        let fifo_prefix = fifo_prefix.into();
        let from_kitchens = FramedChannel::open(
            pizzeria_kitchen::kitchen_to_reception(&fifo_prefix),
            FifoMode::ReadOnly,
        )?;

        let shared = Arc::new(ReceptionShared {
            kitchens: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            config,
            fifo_prefix,
        });

        let manager_running = Arc::new(AtomicBool::new(true));
        let manager_handle = spawn_manager(Arc::clone(&shared), Arc::clone(&manager_running), from_kitchens);

        Ok(Self {
            shared,
            manager_running,
            manager_handle: Some(manager_handle),
        })
    }

    /// Forks a new kitchen subprocess and records it (spec.md §4.5, §4.7).
    pub fn spawn_kitchen(&self) -> Result<u64, ReceptionError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::AcqRel);
        let config = self.shared.config;
        let prefix = self.shared.fifo_prefix.clone();

        let supervisor = ProcessSupervisor::spawn(move || {
            pizzeria_kitchen::kitchen::run(id, &prefix, config).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        })?;

        let order_path = pizzeria_kitchen::reception_to_kitchen(&self.shared.fifo_prefix, id);
        let writer = FramedChannel::open(order_path, FifoMode::WriteOnly)?;

        let record = KitchenRecord::new(id, self.shared.config.cooks_per_kitchen(), writer, supervisor);
        self.shared.kitchens.lock().unwrap().push(record);
        Ok(id)
    }

    /// Dispatches every pizza in `pizzas`, in order, per the load-balancing
    /// policy (spec.md §4.6). Spawns kitchens as needed, including the very
    /// first one if none exist yet.
    pub fn dispatch_orders(&self, pizzas: Vec<Pizza>) -> Result<(), ReceptionError> {
        if self.shared.kitchens.lock().unwrap().is_empty() {
            self.spawn_kitchen()?;
        }

        let mut snapshots: Vec<KitchenSnapshot> = self
            .shared
            .kitchens
            .lock()
            .unwrap()
            .iter()
            .map(KitchenRecord::snapshot)
            .collect();

        for pizza in pizzas {
            let idx = match dispatch::dispatch_one(&mut snapshots) {
                Some(idx) => idx,
                None => {
                    let new_id = self.spawn_kitchen()?;
                    snapshots.push(KitchenSnapshot {
                        id: new_id,
                        cook_count: self.shared.config.cooks_per_kitchen(),
                        idle_count: self.shared.config.cooks_per_kitchen() as u64,
                        queued_count: 0,
                        queued_cook_time_ms: 0,
                    });
                    dispatch::dispatch_one(&mut snapshots)
                        .expect("a freshly spawned kitchen is never saturated")
                }
            };
            let kitchen_id = snapshots[idx].id;
            self.send_order(kitchen_id, pizza)?;
        }
        Ok(())
    }

    fn send_order(&self, kitchen_id: u64, pizza: Pizza) -> Result<(), ReceptionError> {
        let mut kitchens = self.shared.kitchens.lock().unwrap();
        let record = kitchens
            .iter_mut()
            .find(|k| k.id == kitchen_id)
            .expect("dispatch only targets a kitchen already in the vector");
        record.writer.send(&Message::Order {
            kitchen_id,
            pizza: pizza.pack(),
        })?;
        Ok(())
    }

    /// Asks every live kitchen to emit a fresh status (used by `status` when
    /// the operator wants an up-to-date read rather than the last cached one).
    pub fn request_all_statuses(&self) {
        let mut kitchens = self.shared.kitchens.lock().unwrap();
        for record in kitchens.iter_mut() {
            let _ = record.writer.send(&Message::RequestStatus);
        }
    }

    /// Renders the `status` CLI command's output (spec.md §6).
    #[must_use]
    pub fn render_status(&self) -> String {
        let kitchens = self.shared.kitchens.lock().unwrap();
        if kitchens.is_empty() {
            return "no kitchens are running".to_string();
        }
        kitchens
            .iter()
            .map(KitchenRecord::render_status_block)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tears down every kitchen FIFO and stops the manager thread (spec.md
    /// §3 "Ownership": the Reception unlinks the FIFO special files).
    pub fn shutdown(&mut self) {
        self.manager_running.store(false, Ordering::Release);
        if let Some(handle) = self.manager_handle.take() {
            let _ = handle.join();
        }
        let kitchens = self.shared.kitchens.lock().unwrap();
        for record in kitchens.iter() {
            pizzeria_proto::Fifo::unlink(pizzeria_kitchen::reception_to_kitchen(
                &self.shared.fifo_prefix,
                record.id,
            ));
        }
        drop(kitchens);
        pizzeria_proto::Fifo::unlink(pizzeria_kitchen::kitchen_to_reception(&self.shared.fifo_prefix));
    }
}

fn spawn_manager(
    shared: Arc<ReceptionShared>,
    running: Arc<AtomicBool>,
    mut from_kitchens: FramedChannel,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while running.load(Ordering::Acquire) {
            while let Some(message) = from_kitchens.try_recv() {
                handle_message(&shared, message);
            }
            std::thread::sleep(MANAGER_TICK);
        }
    })
}

fn handle_message(shared: &Arc<ReceptionShared>, message: Message) {
    match message {
        Message::Status {
            kitchen_id,
            stock,
            elapsed_idle_ms,
            idle_count,
            queued_count,
            queued_cook_time_ms,
        } => {
            let mut kitchens = shared.kitchens.lock().unwrap();
            if let Some(record) = kitchens.iter_mut().find(|k| k.id == kitchen_id) {
                record.apply_status(stock, elapsed_idle_ms, idle_count, queued_count, queued_cook_time_ms);
            }
        }
        Message::CookedPizza { pizza, .. } => match Pizza::unpack(pizza) {
            Ok(pizza) => println!("{}", pizza.display_ready_line()),
            Err(err) => log::warn!("dropped cooked-pizza notification with bad payload: {err}"),
        },
        Message::Closed { kitchen_id } => {
            let mut kitchens = shared.kitchens.lock().unwrap();
            if let Some(pos) = kitchens.iter().position(|k| k.id == kitchen_id) {
                let mut record = kitchens.remove(pos);
                let _ = record.writer.send(&Message::Closed { kitchen_id });
            }
        }
        other => log::warn!("reception received unexpected message: {other:?}"),
    }
}
