//! Interception dispatch.

use std::sync::Arc;

/// Task flags for the blocking screen launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchFlags {
    pub new_task: bool,
    pub clear_top: bool,
    pub single_top: bool,
}

impl LaunchFlags {
    const NEW_TASK: u32 = 0x1000_0000;
    const CLEAR_TOP: u32 = 0x0400_0000;
    const SINGLE_TOP: u32 = 0x2000_0000;

    /// New task, clear top, single top. Repeated launches reuse one screen.
    pub const SEIZE: Self = Self {
        new_task: true,
        clear_top: true,
        single_top: true,
    };

    /// New task only, as used for the home surface.
    pub const NEW_TASK_ONLY: Self = Self {
        new_task: true,
        clear_top: false,
        single_top: false,
    };

    /// Platform intent-flag bitmask.
    pub fn bits(self) -> u32 {
        let mut bits = 0;
        if self.new_task {
            bits |= Self::NEW_TASK;
        }
        if self.clear_top {
            bits |= Self::CLEAR_TOP;
        }
        if self.single_top {
            bits |= Self::SINGLE_TOP;
        }
        bits
    }
}

/// Request to put the blocking screen in front of `target_app_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptionRequest {
    pub target_app_id: String,
    pub flags: LaunchFlags,
}

/// Presentation layer that seizes the foreground.
pub trait Presenter: Send + Sync {
    /// Launch the blocking screen. Returns once the launch was handed off.
    fn launch(&self, request: &InterceptionRequest) -> color_eyre::eyre::Result<()>;
}

impl<P: Presenter + ?Sized> Presenter for Arc<P> {
    fn launch(&self, request: &InterceptionRequest) -> color_eyre::eyre::Result<()> {
        (**self).launch(request)
    }
}

/// Forwards intercept decisions to a presenter.
///
/// Keeps no record of open screens; de-duplication comes from the launch
/// flags.
pub struct Dispatcher<P> {
    presenter: P,
}

impl<P: Presenter> Dispatcher<P> {
    pub fn new(presenter: P) -> Self {
        Self { presenter }
    }

    /// Launch the blocking screen for `app_id`. Failures are logged and dropped.
    pub fn dispatch(&self, app_id: &str) {
        let request = InterceptionRequest {
            target_app_id: app_id.to_string(),
            flags: LaunchFlags::SEIZE,
        };

        tracing::info!(app_id = %app_id, "blocked app detected");

        if let Err(e) = self.presenter.launch(&request) {
            tracing::warn!(app_id = %app_id, error = %e, "failed to launch blocking screen");
        }
    }
}
