//! Blocking screen and home screen launches through the activity manager.

use color_eyre::eyre::WrapErr as _;
use guardian_core::dispatcher::{InterceptionRequest, LaunchFlags, Presenter};
use guardian_core::notice::HomeSurface;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::config::PresenterConfig;

/// Extra carrying the blocked app id to the blocking screen.
pub const BLOCKED_PACKAGE_EXTRA: &str = "blocked_package";

/// Launches the blocking screen component via `am start`.
#[derive(Debug, Clone)]
pub struct ShellPresenter {
    program: String,
    component: String,
}

impl ShellPresenter {
    pub fn new(config: &PresenterConfig) -> Self {
        Self {
            program: config.program.clone(),
            component: config.component.clone(),
        }
    }

    fn args(&self, request: &InterceptionRequest) -> Vec<String> {
        vec![
            "start".into(),
            "-n".into(),
            self.component.clone(),
            "-f".into(),
            format!("0x{:08x}", request.flags.bits()),
            "--es".into(),
            BLOCKED_PACKAGE_EXTRA.into(),
            request.target_app_id.clone(),
        ]
    }
}

impl Presenter for ShellPresenter {
    fn launch(&self, request: &InterceptionRequest) -> color_eyre::eyre::Result<()> {
        let args = self.args(request);
        debug!(program = %self.program, ?args, "launching blocking screen");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .wrap_err_with(|| format!("failed to run {}", self.program))?;

        // The event loop never waits on the launch; a side thread reaps it.
        let reaper = std::thread::Builder::new()
            .name("presenter-reap".into())
            .spawn(move || {
                if let Err(e) = child.wait() {
                    warn!("Failed to reap presenter process: {}", e);
                }
            });
        if let Err(e) = reaper {
            warn!("Failed to spawn presenter reaper: {}", e);
        }

        Ok(())
    }
}

/// Sends the user to the launcher.
#[derive(Debug, Clone)]
pub struct ShellHome {
    program: String,
}

impl ShellHome {
    pub fn new(config: &PresenterConfig) -> Self {
        Self {
            program: config.program.clone(),
        }
    }

    fn args() -> Vec<String> {
        vec![
            "start".into(),
            "-a".into(),
            "android.intent.action.MAIN".into(),
            "-c".into(),
            "android.intent.category.HOME".into(),
            "-f".into(),
            format!("0x{:08x}", LaunchFlags::NEW_TASK_ONLY.bits()),
        ]
    }
}

impl HomeSurface for ShellHome {
    fn go_home(&self) -> color_eyre::eyre::Result<()> {
        let status = Command::new(&self.program)
            .args(Self::args())
            .stdout(Stdio::null())
            .status()
            .wrap_err_with(|| format!("failed to run {}", self.program))?;

        if !status.success() {
            color_eyre::eyre::bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}
