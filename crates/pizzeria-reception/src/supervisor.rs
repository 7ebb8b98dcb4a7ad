use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::time::Duration;

/// Fork/wait wrapper around one kitchen subprocess (spec.md §4.7).
///
/// `spawn` forks and runs `child_main` in the child; the child process never
/// returns from `spawn` (`child_main`'s return code determines the exit
/// status: success `()` exits 0, an error exits 1). The parent gets back a
/// handle that can poll for liveness and, on drop, escalates `SIGTERM` to
/// `SIGKILL` if the child does not reap promptly.
pub struct ProcessSupervisor {
    pid: Pid,
    reaped: bool,
}

impl ProcessSupervisor {
    /// Forks a child that runs `child_main`. Exit codes follow spec.md §4.7:
    /// 0 on success, 1 on a returned error, 2 if `child_main` panics.
    pub fn spawn<F>(child_main: F) -> Result<Self, nix::errno::Errno>
    where
        F: FnOnce() -> Result<(), Box<dyn std::error::Error>>,
    {
        // SAFETY: the child immediately calls `child_main` and then exits
        // without returning across the fork, the standard pattern for
        // `nix::unistd::fork` in a multi-threaded process.
        match unsafe { fork() }? {
            ForkResult::Parent { child } => Ok(Self {
                pid: child,
                reaped: false,
            }),
            ForkResult::Child => {
                let code = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(child_main))
                {
                    Ok(Ok(())) => 0,
                    Ok(Err(err)) => {
                        log::error!("kitchen child exited with error: {err}");
                        1
                    }
                    Err(_) => 2,
                };
                std::process::exit(code);
            }
        }
    }

    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Non-blocking liveness check (`WNOHANG`, spec.md §4.7 `IsRunning`).
    pub fn is_running(&mut self) -> bool {
        if self.reaped {
            return false;
        }
        match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(_) => {
                self.reaped = true;
                false
            }
            Err(_) => {
                self.reaped = true;
                false
            }
        }
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        let _ = signal::kill(self.pid, Signal::SIGTERM);
        match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                std::thread::sleep(Duration::from_millis(200));
                if matches!(waitpid(self.pid, Some(WaitPidFlag::WNOHANG)), Ok(WaitStatus::StillAlive)) {
                    let _ = signal::kill(self.pid, Signal::SIGKILL);
                    let _ = waitpid(self.pid, None);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_zero_is_reaped_as_not_running() {
        let mut supervisor = ProcessSupervisor::spawn(|| Ok(())).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn a_long_running_child_is_observed_alive() {
        let mut supervisor = ProcessSupervisor::spawn(|| {
            std::thread::sleep(Duration::from_secs(5));
            Ok(())
        })
        .unwrap();
        assert!(supervisor.is_running());
    }
}
