use crate::auth::{AuthObserver, FlowView, Notice, NoticeLevel};
use crate::session::Surface;
use std::io::{self, Write};
use tracing::debug;

/// Prints notices as one-line toasts. Flow changes and redirects are only
/// logged; the terminal has no surfaces to switch between.
pub struct TerminalObserver<W = io::Stderr> {
    out: W,
}

impl TerminalObserver {
    #[must_use]
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> TerminalObserver<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn marker(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Ok => "✔",
        NoticeLevel::Warn => "!",
        NoticeLevel::Err => "✘",
    }
}

impl<W: Write> AuthObserver for TerminalObserver<W> {
    fn flow_changed(&mut self, view: &FlowView) {
        debug!(
            purpose = %view.purpose,
            pending = view.pending,
            action = view.action_label,
            "flow changed"
        );
    }

    fn notice(&mut self, notice: &Notice) {
        // best effort
        let _ = writeln!(
            self.out,
            "{} {}: {}",
            marker(notice.level),
            notice.title,
            notice.message
        );
    }

    fn redirect(&mut self, surface: Surface) {
        debug!("redirect to {surface:?}");
    }
}
