//! The reception process: kitchen supervision, load-balancing dispatch,
//! and the CLI surface (spec.md §4.6, §6).

mod dispatch;
mod error;
mod kitchen_record;
mod reception;
mod supervisor;

pub use error::ReceptionError;
pub use reception::Reception;
pub use supervisor::ProcessSupervisor;
