//! Run an external transfer program with a hard timeout.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::TransferError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `program args...` and returns its stdout. Stderr is discarded.
///
/// If the child is still running at `timeout` it is killed and the call fails
/// with `TransferError::Timeout`. The stdout reader thread is then left to
/// finish on its own, since grandchildren may still hold the pipe.
pub(super) fn run_with_timeout<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> Result<String, TransferError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| TransferError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| TransferError::EmptyOutput(program.to_string()))?;
    let reader = std::thread::spawn(move || -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf)?;
        Ok(buf)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            tracing::warn!("{} still running after {:?}; killing", program, timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(TransferError::Timeout(timeout));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let out = reader
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdout reader panicked"))??;

    if !status.success() {
        return Err(TransferError::Exit {
            program: program.to_string(),
            code: status.code().unwrap_or(-1),
        });
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}
