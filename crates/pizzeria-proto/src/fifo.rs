use crate::error::ProtoError;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self};
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::{Path, PathBuf};

/// Which end of a named pipe a [`Fifo`] represents. Fixed for the lifetime of
/// the handle, per spec.md §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoMode {
    ReadOnly,
    WriteOnly,
}

/// A named pipe (FIFO special file) opened for one direction of traffic.
///
/// Creating a `Fifo` creates the special file on disk if absent (mode
/// `0666`, tolerating a concurrent creator's `EEXIST`) and opens a file
/// descriptor. The read side opens non-blocking so polling reads never
/// stall the caller; the write side opens blocking so a full pipe simply
/// backpressures the writer (spec.md §4.1, §5).
pub struct Fifo {
    path: PathBuf,
    fd: OwnedFd,
    mode: FifoMode,
}

impl Fifo {
    /// Opens (creating if necessary) the FIFO at `path` for `mode`.
    pub fn open(path: impl AsRef<Path>, mode: FifoMode) -> Result<Self, ProtoError> {
        let path = path.as_ref().to_path_buf();
        match unistd::mkfifo(&path, Mode::from_bits_truncate(0o666)) {
            Ok(()) | Err(nix::errno::Errno::EEXIST) => {}
            Err(source) => {
                return Err(ProtoError::Fifo {
                    path: path.display().to_string(),
                    source,
                })
            }
        }

        let mut flags = match mode {
            FifoMode::ReadOnly => OFlag::O_RDONLY | OFlag::O_NONBLOCK,
            FifoMode::WriteOnly => OFlag::O_WRONLY,
        };
        // Opening a write-only FIFO blocks until a reader is present unless
        // O_NONBLOCK is also requested for the open() call itself; retry the
        // open in a short loop rather than stalling the caller forever.
        if mode == FifoMode::WriteOnly {
            flags |= OFlag::O_NONBLOCK;
        }

        let fd = loop {
            match fcntl::open(&path, flags, Mode::empty()) {
                Ok(fd) => break fd,
                Err(nix::errno::Errno::ENXIO) if mode == FifoMode::WriteOnly => {
                    // No reader yet; spec's writer side still blocks logically,
                    // so retry rather than failing the whole channel.
                    std::thread::yield_now();
                    continue;
                }
                Err(source) => {
                    return Err(ProtoError::Fifo {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        };
        // SAFETY: fcntl::open returns a fresh, owned descriptor on success.
        let fd = unsafe { OwnedFd::from_raw_fd_checked(fd) };

        // A write-only FIFO that must behave as a blocking writer per spec
        // (§4.1) clears O_NONBLOCK again once a reader exists, so that
        // `write` backpressures instead of returning EAGAIN.
        if mode == FifoMode::WriteOnly {
            let raw = fd.as_raw_fd();
            let current = fcntl::fcntl(raw, fcntl::FcntlArg::F_GETFL).map_err(|source| {
                ProtoError::Fifo {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            let current = OFlag::from_bits_truncate(current) & !OFlag::O_NONBLOCK;
            fcntl::fcntl(raw, fcntl::FcntlArg::F_SETFL(current)).map_err(|source| {
                ProtoError::Fifo {
                    path: path.display().to_string(),
                    source,
                }
            })?;
        }

        Ok(Self { path, fd, mode })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn mode(&self) -> FifoMode {
        self.mode
    }

    pub(crate) fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd.as_raw_fd()
    }

    /// Removes the FIFO special file from the filesystem. Called by the
    /// Reception at teardown (spec.md §3 Ownership, §5 Resource policy);
    /// `ENOENT` is logged, not fatal (spec.md §7e).
    pub fn unlink(path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Err(err) = unistd::unlink(path) {
            if err != nix::errno::Errno::ENOENT {
                log::warn!("failed to unlink fifo {}: {err}", path.display());
            }
        }
    }
}

/// Small helper trait so `Fifo::open` can construct an `OwnedFd` from the
/// raw descriptor returned by `nix::fcntl::open` without pulling in
/// `std::os::fd::FromRawFd` at every call site.
trait FromRawFdChecked {
    unsafe fn from_raw_fd_checked(fd: std::os::fd::RawFd) -> Self;
}

impl FromRawFdChecked for OwnedFd {
    unsafe fn from_raw_fd_checked(fd: std::os::fd::RawFd) -> Self {
        use std::os::fd::FromRawFd;
        OwnedFd::from_raw_fd(fd)
    }
}
