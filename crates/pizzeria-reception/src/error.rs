use thiserror::Error;

/// Errors raised by the reception process (spec.md §7 taxonomy (d); usage
/// errors are handled directly in `main` as a plain `String` + exit 84 per
/// spec.md §6, so they have no variant here).
#[derive(Debug, Error)]
pub enum ReceptionError {
    #[error("failed to fork kitchen subprocess: {0}")]
    Fork(#[from] nix::errno::Errno),

    #[error(transparent)]
    Channel(#[from] pizzeria_proto::ProtoError),
}
