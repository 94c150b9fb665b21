use guardian_core::capability::{CapabilityProvider, service_status};
use guardian_core::config::{BoundedStore, ConfigStore};
use guardian_core::dispatcher::Presenter;
use guardian_core::{
    Decision, ExclusionList, ForegroundEvent, LifecycleController, RunningStateReader,
};
use tracing::{debug, info};

use crate::config::GuardianConfig;
use crate::ipc::{Message, StatusReport};
use crate::permissions::ShellCapabilities;
use crate::presenter::ShellPresenter;
use crate::store::PrefsFile;

/// What the daemon loop should do after a control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Answer with a status report.
    Status,
    Shutdown,
}

/// Daemon-side owner of the lifecycle controller.
pub struct Enforcer<S, P, C> {
    controller: LifecycleController<S, P>,
    open_store: Box<dyn Fn() -> S + Send>,
    capabilities: C,
}

/// The enforcer wired to the shell collaborators.
pub type ShellEnforcer = Enforcer<BoundedStore<PrefsFile>, ShellPresenter, ShellCapabilities>;

impl ShellEnforcer {
    pub fn from_config(config: &GuardianConfig) -> Self {
        let prefs_path = config.store.path.clone();
        let timeout = config.service.read_timeout();

        Enforcer::new(
            ExclusionList::new(&config.service.package),
            ShellPresenter::new(&config.presenter),
            ShellCapabilities::new(&config.service),
            move || BoundedStore::new(PrefsFile::new(prefs_path.clone()), timeout),
        )
    }
}

impl<S, P, C> Enforcer<S, P, C>
where
    S: ConfigStore,
    P: Presenter,
    C: CapabilityProvider + Clone,
{
    pub fn new(
        exclusions: ExclusionList,
        presenter: P,
        capabilities: C,
        open_store: impl Fn() -> S + Send + 'static,
    ) -> Self {
        Self {
            controller: LifecycleController::new(exclusions, presenter),
            open_store: Box::new(open_store),
            capabilities,
        }
    }

    /// Connect the monitoring service with a fresh store handle.
    pub fn connect(&mut self) {
        self.controller.on_connected((self.open_store)());
    }

    pub fn handle_event(&self, event: &ForegroundEvent) -> Decision {
        self.controller.on_event(event)
    }

    pub fn handle_message(&mut self, msg: Message) -> Outcome {
        match msg {
            Message::Connected => {
                self.connect();
                Outcome::Continue
            }
            Message::Interrupt => {
                self.controller.on_interrupt();
                Outcome::Continue
            }
            Message::Teardown => {
                self.controller.on_teardown();
                Outcome::Continue
            }
            Message::Status => {
                debug!("Status requested");
                Outcome::Status
            }
            Message::Shutdown => {
                info!("Shutdown requested");
                Outcome::Shutdown
            }
        }
    }

    /// Tear down if connected. Called once when the daemon exits.
    pub fn shutdown(&mut self) {
        if self.controller.is_connected() {
            self.controller.on_teardown();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.controller.is_connected()
    }

    /// Detached status reader that can run off the event loop.
    pub fn status_probe(&self) -> StatusProbe<C> {
        StatusProbe {
            running: self.controller.running_state(),
            capabilities: self.capabilities.clone(),
        }
    }
}

/// Builds status reports from the running flag and the capability provider.
pub struct StatusProbe<C> {
    running: RunningStateReader,
    capabilities: C,
}

impl<C: CapabilityProvider> StatusProbe<C> {
    pub fn report(&self) -> StatusReport {
        StatusReport {
            active: self.running.is_active(),
            capabilities: service_status(&self.capabilities),
        }
    }
}
