use std::{
    io::Read,
    path::Path,
    process::{Command, ExitStatus, Output, Stdio},
    thread::JoinHandle,
    time::Duration,
};

use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    interrupt::{check_interrupt, interrupt_requested},
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run an external tool to completion, capturing stdout and stderr.
///
/// A non-zero exit is mapped through `fail`, with the tool's trimmed stderr appended so the
/// caller sees the root cause. A tool killed by SIGINT, or stopped because an interrupt was
/// requested while it ran, becomes [`SlidecastError::Interrupted`].
pub(crate) fn run_tool(
    mut cmd: Command,
    fail: fn(String) -> SlidecastError,
) -> SlidecastResult<Output> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    check_interrupt(&program)?;
    tracing::debug!(command = ?cmd, "spawning external tool");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| fail(format!("failed to spawn {program} (is it installed and on PATH?): {e}")))?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => return Err(fail(format!("failed to wait for {program}: {e}"))),
        }
        if interrupt_requested() {
            // Readers are left detached; a grandchild may still hold the pipes open.
            let _ = child.kill();
            let _ = child.wait();
            return Err(SlidecastError::interrupted(format!("{program} was stopped")));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    if interrupt_requested() || killed_by_interrupt(&status) {
        return Err(SlidecastError::interrupted(format!(
            "{program} was interrupted"
        )));
    }

    let output = Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    };
    if output.status.success() {
        return Ok(output);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(fail(format!(
        "{program} exited with status {}: {}",
        output.status,
        stderr.trim()
    )))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn collect(reader: JoinHandle<Vec<u8>>) -> Vec<u8> {
    reader.join().unwrap_or_default()
}

#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt as _;
    // SIGINT
    status.signal() == Some(2)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}

/// Return `true` when `program -version` can be invoked.
pub fn is_tool_available(program: impl AsRef<Path>) -> bool {
    Command::new(program.as_ref())
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}
