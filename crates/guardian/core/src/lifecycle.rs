//! Monitoring lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classifier::{Decision, classify};
use crate::config::{ConfigStore, snapshot};
use crate::dispatcher::{Dispatcher, Presenter};
use crate::event::ForegroundEvent;
use crate::exclusion::ExclusionList;

/// Whether monitoring is live. Only the lifecycle controller writes it.
#[derive(Debug, Default)]
pub struct RunningState {
    active: Arc<AtomicBool>,
}

impl RunningState {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Read-only handle for status reporting.
    pub fn reader(&self) -> RunningStateReader {
        RunningStateReader {
            active: Arc::clone(&self.active),
        }
    }
}

/// Read-only view of a [`RunningState`].
#[derive(Debug, Clone)]
pub struct RunningStateReader {
    active: Arc<AtomicBool>,
}

impl RunningStateReader {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Boot broadcasts that mean the device just started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSignal {
    BootCompleted,
    QuickbootPowerOn,
}

impl BootSignal {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "android.intent.action.BOOT_COMPLETED" => Some(Self::BootCompleted),
            "android.intent.action.QUICKBOOT_POWERON" => Some(Self::QuickbootPowerOn),
            _ => None,
        }
    }
}

/// Drives `Stopped -> Connected -> Stopped` and routes events while connected.
///
/// Restarting after a reboot is up to whoever calls [`Self::on_connected`];
/// the controller persists nothing.
pub struct LifecycleController<S, P> {
    running: RunningState,
    store: Option<S>,
    exclusions: ExclusionList,
    dispatcher: Dispatcher<P>,
}

impl<S: ConfigStore, P: Presenter> LifecycleController<S, P> {
    pub fn new(exclusions: ExclusionList, presenter: P) -> Self {
        Self {
            running: RunningState::new(),
            store: None,
            exclusions,
            dispatcher: Dispatcher::new(presenter),
        }
    }

    /// Service connected: keep the store handle and mark monitoring live.
    pub fn on_connected(&mut self, store: S) {
        if self.store.replace(store).is_some() {
            tracing::debug!("service reconnected, store handle replaced");
        }
        self.running.set(true);
        tracing::info!("monitoring service connected");
    }

    /// Handle one platform event. Events while stopped always pass.
    pub fn on_event(&self, event: &ForegroundEvent) -> Decision {
        let Some(store) = &self.store else {
            tracing::trace!("event ignored, service not connected");
            return Decision::Pass;
        };

        let config = snapshot(store);
        let decision = classify(event, &config, &self.exclusions);

        if let Decision::Intercept(app_id) = &decision {
            self.dispatcher.dispatch(app_id);
        }

        decision
    }

    pub fn on_interrupt(&self) {
        tracing::info!("monitoring service interrupted");
    }

    /// Service torn down: release the store and mark monitoring stopped.
    pub fn on_teardown(&mut self) {
        self.store = None;
        self.running.set(false);
        tracing::info!("monitoring service destroyed");
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn running_state(&self) -> RunningStateReader {
        self.running.reader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::dispatcher::InterceptionRequest;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Store whose contents can change between events.
    #[derive(Clone, Default)]
    struct SharedStore {
        raw: Arc<Mutex<RawConfig>>,
        reads: Arc<AtomicUsize>,
    }

    impl SharedStore {
        fn set(&self, enabled: bool, blocked: &str) {
            *self.raw.lock().unwrap() = RawConfig {
                enabled: Some(enabled),
                blocked_apps: Some(blocked.into()),
            };
        }
    }

    impl ConfigStore for SharedStore {
        fn read_raw(&self) -> color_eyre::eyre::Result<RawConfig> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.raw.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct Recorder {
        targets: Mutex<Vec<String>>,
    }

    impl Presenter for Recorder {
        fn launch(&self, request: &InterceptionRequest) -> color_eyre::eyre::Result<()> {
            self.targets.lock().unwrap().push(request.target_app_id.clone());
            Ok(())
        }
    }

    fn controller() -> (
        LifecycleController<SharedStore, Arc<Recorder>>,
        Arc<Recorder>,
    ) {
        let recorder = Arc::new(Recorder::default());
        let controller = LifecycleController::new(ExclusionList::default(), Arc::clone(&recorder));
        (controller, recorder)
    }

    #[test]
    fn test_connect_and_teardown_flip_running_state() {
        let (mut controller, _) = controller();
        let reader = controller.running_state();
        assert!(!reader.is_active());

        controller.on_connected(SharedStore::default());
        assert!(reader.is_active());
        assert!(controller.is_connected());

        controller.on_interrupt();
        assert!(reader.is_active());

        controller.on_teardown();
        assert!(!reader.is_active());
        assert!(!controller.is_connected());
    }

    #[test]
    fn test_events_ignored_while_stopped() {
        let (controller, recorder) = controller();
        let decision = controller.on_event(&ForegroundEvent::focus("com.game.x"));
        assert_eq!(decision, Decision::Pass);
        assert!(recorder.targets.lock().unwrap().is_empty());
    }

    #[test]
    fn test_intercept_dispatches() {
        let (mut controller, recorder) = controller();
        let store = SharedStore::default();
        store.set(true, "com.game.x");
        controller.on_connected(store);

        let decision = controller.on_event(&ForegroundEvent::focus("com.game.x"));
        assert_eq!(decision, Decision::Intercept("com.game.x".into()));
        assert_eq!(*recorder.targets.lock().unwrap(), vec!["com.game.x"]);

        controller.on_event(&ForegroundEvent::focus("com.other"));
        assert_eq!(recorder.targets.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_config_change_applies_to_next_event() {
        let (mut controller, recorder) = controller();
        let store = SharedStore::default();
        store.set(true, "com.game.x");
        controller.on_connected(store.clone());

        let event = ForegroundEvent::focus("com.game.x");
        assert!(controller.on_event(&event).is_intercept());

        store.set(false, "com.game.x");
        assert_eq!(controller.on_event(&event), Decision::Pass);

        store.set(true, "com.video.y");
        assert_eq!(controller.on_event(&event), Decision::Pass);

        assert_eq!(store.reads.load(Ordering::SeqCst), 3);
        assert_eq!(recorder.targets.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_teardown_drops_store() {
        let (mut controller, _) = controller();
        let store = SharedStore::default();
        store.set(true, "com.game.x");
        controller.on_connected(store.clone());
        controller.on_teardown();

        assert_eq!(
            controller.on_event(&ForegroundEvent::focus("com.game.x")),
            Decision::Pass
        );
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_boot_signal_parse() {
        assert_eq!(
            BootSignal::parse("android.intent.action.BOOT_COMPLETED"),
            Some(BootSignal::BootCompleted)
        );
        assert_eq!(
            BootSignal::parse("android.intent.action.QUICKBOOT_POWERON"),
            Some(BootSignal::QuickbootPowerOn)
        );
        assert_eq!(BootSignal::parse("android.intent.action.SCREEN_ON"), None);
    }
}
