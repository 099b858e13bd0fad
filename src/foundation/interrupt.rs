use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{SlidecastError, SlidecastResult};

static REQUESTED: AtomicBool = AtomicBool::new(false);

/// Ask the running pipeline to stop.
///
/// Checked between stages and while an external tool runs; a running tool is killed and the
/// current operation fails with [`SlidecastError::Interrupted`]. The flag is process-wide and is
/// never cleared.
pub fn request_interrupt() {
    REQUESTED.store(true, Ordering::SeqCst);
}

pub fn interrupt_requested() -> bool {
    REQUESTED.load(Ordering::SeqCst)
}

/// Fail with `Interrupted` if a stop was requested before `next_step` started.
pub(crate) fn check_interrupt(next_step: &str) -> SlidecastResult<()> {
    if interrupt_requested() {
        return Err(SlidecastError::interrupted(format!(
            "stopped before {next_step}"
        )));
    }
    Ok(())
}
