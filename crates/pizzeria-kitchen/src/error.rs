use thiserror::Error;

/// Errors that can prevent a kitchen subprocess from starting up. Anything
/// past startup is handled locally (spec.md §7: IPC-fatal errors are
/// logged and the component continues).
#[derive(Debug, Error)]
pub enum KitchenError {
    #[error("failed to open kitchen fifo: {0}")]
    Channel(#[from] pizzeria_proto::ProtoError),
}
