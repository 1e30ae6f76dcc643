use std::io::{self, Read, Write};
use std::process::{Command as ProcessCommand, Output, Stdio};

use anyhow::{Result, anyhow};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

#[cfg(unix)]
struct ScopedSigaction {
    signum: libc::c_int,
    old_action: libc::sigaction,
}

#[cfg(unix)]
impl ScopedSigaction {
    fn ignore(signum: libc::c_int) -> Result<Self> {
        unsafe {
            let mut new_action: libc::sigaction = std::mem::zeroed();
            new_action.sa_sigaction = libc::SIG_IGN;
            libc::sigemptyset(&mut new_action.sa_mask);
            new_action.sa_flags = 0;

            let mut old_action: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(signum, &new_action, &mut old_action) != 0 {
                return Err(anyhow!("failed to update signal action for {signum}"));
            }

            Ok(Self { signum, old_action })
        }
    }
}

#[cfg(unix)]
impl Drop for ScopedSigaction {
    fn drop(&mut self) {
        unsafe {
            let _ = libc::sigaction(self.signum, &self.old_action, std::ptr::null_mut());
        }
    }
}

/// Runs `f` with SIGINT ignored in this process. Tools started inside get
/// the default handler back, so Ctrl+C stops the tool and the run reports
/// the failure instead of clipcrop dying mid-step.
#[cfg(unix)]
pub(crate) fn with_sigint_ignored<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    let _sigint_guard = ScopedSigaction::ignore(libc::SIGINT)?;
    f()
}

#[cfg(not(unix))]
pub(crate) fn with_sigint_ignored<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    f()
}

#[cfg(unix)]
fn restore_default_signals(cmd: &mut ProcessCommand) {
    unsafe {
        cmd.pre_exec(|| {
            libc::signal(libc::SIGINT, libc::SIG_DFL);
            libc::signal(libc::SIGQUIT, libc::SIG_DFL);
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn restore_default_signals(_cmd: &mut ProcessCommand) {}

/// Captures both streams; used for listings and probes.
pub(crate) fn run_captured(mut cmd: ProcessCommand) -> io::Result<Output> {
    restore_default_signals(&mut cmd);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
}

/// Most recent stderr bytes kept from a passthrough run.
const STDERR_KEEP_BYTES: usize = 64 * 1024;

/// Both streams reach the terminal, so yt-dlp and ffmpeg progress stays
/// visible. The stderr tail is also returned for error reports.
pub(crate) fn run_passthrough(mut cmd: ProcessCommand) -> io::Result<Output> {
    restore_default_signals(&mut cmd);
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut captured = Vec::new();
    if let Some(stderr) = child.stderr.take() {
        tee_stderr(stderr, &mut io::stderr(), &mut captured);
    }
    let status = child.wait()?;
    Ok(Output {
        status,
        stdout: Vec::new(),
        stderr: captured,
    })
}

/// Copies `source` to `terminal` until EOF, keeping the last
/// `STDERR_KEEP_BYTES` in `captured`.
fn tee_stderr(mut source: impl Read, terminal: &mut impl Write, captured: &mut Vec<u8>) {
    let mut buf = [0u8; 4096];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                tracing::warn!(%err, "stopped reading tool stderr");
                break;
            }
        };
        let _ = terminal.write_all(&buf[..n]);
        let _ = terminal.flush();
        captured.extend_from_slice(&buf[..n]);
        if captured.len() > STDERR_KEEP_BYTES {
            let excess = captured.len() - STDERR_KEEP_BYTES;
            captured.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_copies_everything_and_keeps_the_tail() {
        let input = "x".repeat(STDERR_KEEP_BYTES) + "frame=  120 fps= 30\nlast line\n";
        let mut terminal = Vec::new();
        let mut captured = Vec::new();

        tee_stderr(input.as_bytes(), &mut terminal, &mut captured);

        assert_eq!(terminal, input.as_bytes());
        assert_eq!(captured.len(), STDERR_KEEP_BYTES);
        assert!(captured.ends_with(b"frame=  120 fps= 30\nlast line\n"));
    }

    #[cfg(unix)]
    #[test]
    fn passthrough_reports_status_and_stderr() {
        let mut cmd = ProcessCommand::new("sh");
        cmd.args(["-c", "echo 'Invalid data found' >&2; exit 3"]);

        let output = run_passthrough(cmd).expect("sh should start");

        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stderr), "Invalid data found\n");
        assert!(output.stdout.is_empty());
    }
}
