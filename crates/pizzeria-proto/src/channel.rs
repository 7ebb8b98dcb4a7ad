use crate::error::ProtoError;
use crate::fifo::{Fifo, FifoMode};
use crate::message::Message;
use std::path::Path;

const READ_CHUNK: usize = 4096;
const LENGTH_PREFIX_BYTES: usize = 4;

/// A length-prefixed message transport over a named FIFO (spec.md §4.1).
///
/// `send` blocks until the whole frame is written (backpressure from a full
/// pipe is the writer's problem, not the caller's). `try_recv` never blocks
/// and returns at most one message per call, re-assembling partial frames
/// across calls in an internal accumulator.
pub struct FramedChannel {
    fifo: Fifo,
    accumulator: Vec<u8>,
    errored: bool,
    eof: bool,
}

impl FramedChannel {
    /// Opens (creating if necessary) the FIFO at `path` for `mode`.
    pub fn open(path: impl AsRef<Path>, mode: FifoMode) -> Result<Self, ProtoError> {
        let fifo = Fifo::open(path, mode)?;
        Ok(Self {
            fifo,
            accumulator: Vec::new(),
            errored: false,
            eof: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.fifo.path()
    }

    /// `true` once a write has hit `EPIPE`; the channel must be abandoned.
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.errored
    }

    /// Encodes and writes one message as a length-prefixed frame, retrying
    /// on `EINTR` until the whole frame is drained. Marks the channel errored
    /// and fails on `EPIPE` (spec.md §4.1, §7c).
    pub fn send(&mut self, message: &Message) -> Result<(), ProtoError> {
        if self.errored {
            return Err(ProtoError::Closed);
        }
        let payload = message.pack();
        let len = (payload.len() as u32).to_ne_bytes();
        let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
        frame.extend_from_slice(&len);
        frame.extend_from_slice(&payload);
        self.write_all(&frame)
    }

    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), ProtoError> {
        let fd = self.fifo.as_raw_fd();
        while !buf.is_empty() {
            match nix::unistd::write(unsafe { std::os::fd::BorrowedFd::borrow_raw(fd) }, buf) {
                Ok(0) => {
                    self.errored = true;
                    return Err(ProtoError::WriteFailed(nix::errno::Errno::EPIPE));
                }
                Ok(n) => buf = &buf[n..],
                Err(nix::errno::Errno::EINTR) => continue,
                Err(nix::errno::Errno::EPIPE) => {
                    self.errored = true;
                    return Err(ProtoError::WriteFailed(nix::errno::Errno::EPIPE));
                }
                Err(source) => {
                    self.errored = true;
                    return Err(ProtoError::WriteFailed(source));
                }
            }
        }
        Ok(())
    }

    /// Polls for at most one message, per the 4-step algorithm of spec.md
    /// §4.1. Returns `None` ("no message") on any transient condition,
    /// including a malformed frame, which is silently discarded so later
    /// frames remain aligned (spec.md §8 scenario 6).
    pub fn try_recv(&mut self) -> Option<Message> {
        if !self.eof {
            self.fill_accumulator();
        }

        if self.accumulator.len() < LENGTH_PREFIX_BYTES {
            return None;
        }

        let len_bytes: [u8; 4] = self.accumulator[..LENGTH_PREFIX_BYTES].try_into().unwrap();
        let payload_len = u32::from_ne_bytes(len_bytes) as usize;
        let frame_len = LENGTH_PREFIX_BYTES + payload_len;

        if self.accumulator.len() < frame_len {
            return None;
        }

        let payload = self.accumulator[LENGTH_PREFIX_BYTES..frame_len].to_vec();
        self.accumulator.drain(..frame_len);

        match Message::unpack(&payload) {
            Ok(message) => Some(message),
            Err(err) => {
                log::warn!("discarding malformed frame on {}: {err}", self.path().display());
                None
            }
        }
    }

    fn fill_accumulator(&mut self) {
        let fd = self.fifo.as_raw_fd();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match nix::unistd::read(fd, &mut chunk) {
                Ok(0) => {
                    // EOF: far end closed. A complete frame already buffered
                    // is still delivered by try_recv; after that, no more
                    // reads are attempted (spec.md §4.1 EOF policy).
                    self.eof = true;
                    return;
                }
                Ok(n) => {
                    self.accumulator.extend_from_slice(&chunk[..n]);
                    if n < READ_CHUNK {
                        return;
                    }
                }
                Err(nix::errno::Errno::EAGAIN | nix::errno::Errno::EINTR) => return,
                Err(source) => {
                    log::warn!("read error on {}: {source}", self.path().display());
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn send_then_recv_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chan");
        let mut reader = FramedChannel::open(&path, FifoMode::ReadOnly).unwrap();
        let mut writer = FramedChannel::open(&path, FifoMode::WriteOnly).unwrap();

        writer.send(&Message::RequestStatus).unwrap();
        // Give the kernel a moment to make bytes visible to the reader fd.
        std::thread::sleep(std::time::Duration::from_millis(10));
        let got = reader.try_recv();
        assert_eq!(got, Some(Message::RequestStatus));
    }

    #[test]
    fn recv_on_empty_channel_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chan");
        let mut reader = FramedChannel::open(&path, FifoMode::ReadOnly).unwrap();
        assert_eq!(reader.try_recv(), None);
    }

    #[test]
    fn malformed_frame_is_discarded_without_misaligning_later_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chan");
        let mut reader = FramedChannel::open(&path, FifoMode::ReadOnly).unwrap();
        let mut writer = FramedChannel::open(&path, FifoMode::WriteOnly).unwrap();

        // Malformed frame: length 4, payload [0xFF; 4] (unknown tag).
        let mut bad = Vec::new();
        bad.extend_from_slice(&4u32.to_ne_bytes());
        bad.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        writer.write_all(&bad).unwrap();
        writer.send(&Message::RequestStatus).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));

        assert_eq!(reader.try_recv(), None); // malformed frame discarded
        assert_eq!(reader.try_recv(), Some(Message::RequestStatus)); // next frame intact
    }

    #[test]
    fn multiple_messages_delivered_one_at_a_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chan");
        let mut reader = FramedChannel::open(&path, FifoMode::ReadOnly).unwrap();
        let mut writer = FramedChannel::open(&path, FifoMode::WriteOnly).unwrap();

        writer.send(&Message::Closed { kitchen_id: 1 }).unwrap();
        writer.send(&Message::Closed { kitchen_id: 2 }).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        assert_eq!(reader.try_recv(), Some(Message::Closed { kitchen_id: 1 }));
        assert_eq!(reader.try_recv(), Some(Message::Closed { kitchen_id: 2 }));
        assert_eq!(reader.try_recv(), None);
    }
}
