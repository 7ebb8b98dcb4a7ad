use thiserror::Error;

/// Errors that can occur while framing or decoding messages on a [`crate::FramedChannel`].
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The FIFO special file could not be created or opened.
    #[error("failed to open fifo {path}: {source}")]
    Fifo {
        path: String,
        #[source]
        source: nix::errno::Errno,
    },

    /// The far end of the pipe has gone away (`EPIPE`) or a write could not
    /// be completed after retrying transient errors.
    #[error("channel write failed: {0}")]
    WriteFailed(nix::errno::Errno),

    /// A frame's payload did not decode into a well-formed [`crate::Message`].
    /// Per spec, the caller discards the frame and keeps reading; this variant
    /// exists so callers can log the event.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// The channel has previously failed a write and is permanently unusable.
    #[error("channel is closed")]
    Closed,
}

impl ProtoError {
    /// `true` for errors that only affect a single call (the caller can keep
    /// using the channel), per spec §7's IPC-transient / IPC-fatal split.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtoError::MalformedFrame(_))
    }

    /// `true` for errors that mean the channel must be abandoned.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProtoError::WriteFailed(_) | ProtoError::Closed)
    }
}
