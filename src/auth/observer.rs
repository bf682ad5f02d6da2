//! Narrow interface between the controller and whatever renders it. The
//! controller never reaches into a UI; it reports flow changes, notices and
//! redirects, and renderers re-draw from those.

use crate::auth::types::{OtpPurpose, OtpRequestId};
use crate::session::Surface;

/// Snapshot of one flow as a renderer needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowView {
    pub purpose: OtpPurpose,
    /// Whether the code entry surface is shown.
    pub pending: bool,
    /// Credential inputs are locked while a challenge is pending.
    pub inputs_locked: bool,
    pub action_label: &'static str,
    pub request_id: Option<OtpRequestId>,
}

impl FlowView {
    #[must_use]
    pub const fn idle(purpose: OtpPurpose) -> Self {
        Self {
            purpose,
            pending: false,
            inputs_locked: false,
            action_label: purpose.idle_label(),
            request_id: None,
        }
    }

    #[must_use]
    pub fn pending(purpose: OtpPurpose, request_id: OtpRequestId) -> Self {
        Self {
            purpose,
            pending: true,
            inputs_locked: true,
            action_label: purpose.pending_label(),
            request_id: Some(request_id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Ok,
    Warn,
    Err,
}

/// Transient user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn ok(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Ok, title, message)
    }

    pub fn warn(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warn, title, message)
    }

    pub fn err(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Err, title, message)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait AuthObserver {
    fn flow_changed(&mut self, _view: &FlowView) {}

    fn notice(&mut self, _notice: &Notice) {}

    fn redirect(&mut self, _surface: Surface) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl AuthObserver for NoopObserver {}

/// Records every callback; handy for tests and headless embedders.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub views: Vec<FlowView>,
    pub notices: Vec<Notice>,
    pub redirects: Vec<Surface>,
}

impl RecordingObserver {
    #[must_use]
    pub fn last_view(&self) -> Option<&FlowView> {
        self.views.last()
    }

    #[must_use]
    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl AuthObserver for RecordingObserver {
    fn flow_changed(&mut self, view: &FlowView) {
        self.views.push(view.clone());
    }

    fn notice(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }

    fn redirect(&mut self, surface: Surface) {
        self.redirects.push(surface);
    }
}
