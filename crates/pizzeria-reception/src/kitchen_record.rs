use crate::dispatch::KitchenSnapshot;
use crate::supervisor::ProcessSupervisor;
use pizzeria_proto::FramedChannel;

/// Everything the reception keeps about one live kitchen (spec.md §3
/// "Kitchen record"): a writer handle to its order pipe, its process
/// handle, and its last-known status snapshot.
pub struct KitchenRecord {
    pub id: u64,
    pub cook_count: usize,
    pub writer: FramedChannel,
    pub supervisor: ProcessSupervisor,
    pub stock: String,
    pub elapsed_idle_ms: i64,
    pub idle_count: u64,
    pub queued_count: u64,
    pub queued_cook_time_ms: i64,
}

impl KitchenRecord {
    #[must_use]
    pub fn new(id: u64, cook_count: usize, writer: FramedChannel, supervisor: ProcessSupervisor) -> Self {
        Self {
            id,
            cook_count,
            writer,
            supervisor,
            stock: String::new(),
            elapsed_idle_ms: 0,
            idle_count: cook_count as u64,
            queued_count: 0,
            queued_cook_time_ms: 0,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> KitchenSnapshot {
        KitchenSnapshot {
            id: self.id,
            cook_count: self.cook_count,
            idle_count: self.idle_count,
            queued_count: self.queued_count,
            queued_cook_time_ms: self.queued_cook_time_ms,
        }
    }

    pub fn apply_status(
        &mut self,
        stock: String,
        elapsed_idle_ms: i64,
        idle_count: u64,
        queued_count: u64,
        queued_cook_time_ms: i64,
    ) {
        self.stock = stock;
        self.elapsed_idle_ms = elapsed_idle_ms;
        self.idle_count = idle_count;
        self.queued_count = queued_count;
        self.queued_cook_time_ms = queued_cook_time_ms;
    }

    /// Rendered for the `status` CLI command (spec.md §6 "Human output").
    #[must_use]
    pub fn render_status_block(&self) -> String {
        format!(
            "kitchen {id}: idle {idle}/{total} cooks, {queued} pizza(s) in flight, stock [{stock}], idle for {elapsed}ms, {time}ms cook time remaining",
            id = self.id,
            idle = self.idle_count,
            total = self.cook_count,
            queued = self.queued_count,
            stock = self.stock,
            elapsed = self.elapsed_idle_ms,
            time = self.queued_cook_time_ms,
        )
    }
}
