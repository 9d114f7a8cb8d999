// ── Watcher service ──
//
// Owns one sampler and one monitor and drives both from a single
// interval task. Front ends talk to it through a cheap cloneable handle:
// control methods enqueue commands, and every tick's result is published
// on a `watch` channel. All mutable state lives on the task, so nothing
// here needs a lock except the join handle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{AutoExitConfig, WatchSettings};
use crate::error::CoreError;
use crate::model::{NetworkSample, PowerAction};
use crate::monitor::{LowSpeedMonitor, MonitorEvent};
use crate::power::PowerActuator;
use crate::sampler::{InterfaceSource, NetworkSampler};

/// One tick's published result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchUpdate {
    /// Wall-clock time of the tick.
    pub at: DateTime<Local>,
    /// Ticks since the watcher started, starting at 1.
    pub tick: u64,
    /// `None` when no interface matched or this was a baseline reading.
    pub sample: Option<NetworkSample>,
    pub event: MonitorEvent,
    pub action: PowerAction,
    pub adapter: Option<String>,
    pub enabled: bool,
    /// Set only on the tick whose power action failed.
    pub action_error: Option<String>,
}

impl WatchUpdate {
    pub fn countdown_text(&self) -> String {
        self.event.countdown_text(self.action)
    }
}

#[derive(Debug)]
enum WatchCommand {
    SetAdapter(Option<String>),
    SetEnabled(bool),
    Configure(AutoExitConfig),
}

/// Handle to a running watcher task.
///
/// Cloning is cheap. The task stops when [`stop`](Self::stop) is called or
/// the last handle is dropped.
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<WatcherInner>,
}

struct WatcherInner {
    command_tx: mpsc::UnboundedSender<WatchCommand>,
    updates: watch::Receiver<Option<WatchUpdate>>,
    adapters: Vec<String>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for WatcherInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Watcher {
    /// Start watching. Must be called from within a tokio runtime.
    pub fn spawn<S>(
        settings: WatchSettings,
        source: S,
        actuator: Arc<dyn PowerActuator>,
    ) -> Self
    where
        S: InterfaceSource + 'static,
    {
        let mut sampler =
            NetworkSampler::new(source).with_adapter(settings.auto_exit.adapter.as_deref());
        let adapters = sampler.adapters();
        sampler.rebaseline(Instant::now().into_std());

        let monitor = LowSpeedMonitor::new(settings.auto_exit, settings.enabled);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates) = watch::channel(None);
        let cancel = CancellationToken::new();

        info!(
            interval_ms = settings.interval.as_millis(),
            adapter = ?sampler.adapter(),
            enabled = settings.enabled,
            "watcher starting"
        );

        let task = tokio::spawn(watch_task(
            WatchLoop {
                sampler,
                monitor,
                actuator,
                updates_tx,
                tick: 0,
            },
            settings.interval,
            command_rx,
            cancel.clone(),
        ));

        Self {
            inner: Arc::new(WatcherInner {
                command_tx,
                updates,
                adapters,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    /// Subscribe to per-tick updates. Holds `None` until the first tick.
    pub fn updates(&self) -> watch::Receiver<Option<WatchUpdate>> {
        self.inner.updates.clone()
    }

    /// Adapter names captured at start, led by the "All Adapters" entry.
    pub fn adapters(&self) -> &[String] {
        &self.inner.adapters
    }

    /// Change the adapter filter. `None` or "All Adapters" clears it.
    pub fn set_adapter(&self, adapter: Option<&str>) -> Result<(), CoreError> {
        self.send(WatchCommand::SetAdapter(adapter.map(ToOwned::to_owned)))
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), CoreError> {
        self.send(WatchCommand::SetEnabled(enabled))
    }

    pub fn configure(&self, config: AutoExitConfig) -> Result<(), CoreError> {
        self.send(WatchCommand::Configure(config))
    }

    /// Cancel the task and wait for it to finish.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let handle = self.inner.task.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("watcher stopped");
    }

    fn send(&self, command: WatchCommand) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::WatcherStopped);
        }
        self.inner
            .command_tx
            .send(command)
            .map_err(|_| CoreError::WatcherStopped)
    }
}

// ── Background task ─────────────────────────────────────────────────

struct WatchLoop<S> {
    sampler: NetworkSampler<S>,
    monitor: LowSpeedMonitor,
    actuator: Arc<dyn PowerActuator>,
    updates_tx: watch::Sender<Option<WatchUpdate>>,
    tick: u64,
}

impl<S: InterfaceSource> WatchLoop<S> {
    fn apply(&mut self, command: WatchCommand) {
        let now = Instant::now().into_std();
        match command {
            WatchCommand::SetAdapter(adapter) => self.sampler.set_adapter(adapter.as_deref(), now),
            WatchCommand::SetEnabled(enabled) => self.monitor.set_enabled(enabled),
            WatchCommand::Configure(config) => {
                debug!(?config, "monitor reconfigured");
                self.monitor.configure(config);
            }
        }
    }

    fn on_tick(&mut self) {
        let now = Instant::now().into_std();
        self.tick += 1;

        let sample = self.sampler.sample(now);
        let event = match &sample {
            Some(sample) => self.monitor.observe(sample.download_bytes_per_sec, now),
            None => self.monitor.status(now),
        };

        let action_error = match event {
            MonitorEvent::Fire { action } => self.actuator.perform(action).err().map(|e| {
                warn!(%action, error = %e, "power action failed");
                e.to_string()
            }),
            _ => None,
        };

        self.updates_tx.send_replace(Some(WatchUpdate {
            at: Local::now(),
            tick: self.tick,
            sample,
            event,
            action: self.monitor.config().action,
            adapter: self.sampler.adapter().map(ToOwned::to_owned),
            enabled: self.monitor.is_enabled(),
            action_error,
        }));
    }
}

async fn watch_task<S: InterfaceSource>(
    mut state: WatchLoop<S>,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<WatchCommand>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(command) = commands.recv() => state.apply(command),
            _ = interval.tick() => state.on_tick(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ThresholdUnit;
    use crate::test_support::{FailingActuator, RecordingActuator, SteppingSource};

    fn settings(enabled: bool) -> WatchSettings {
        WatchSettings::new(AutoExitConfig {
            threshold: Some(1.0),
            threshold_unit: ThresholdUnit::KilobytesPerSec,
            duration_secs: Some(3),
            action: PowerAction::Shutdown,
            adapter: None,
        })
        .enabled(enabled)
    }

    async fn next(updates: &mut watch::Receiver<Option<WatchUpdate>>) -> WatchUpdate {
        updates.changed().await.expect("watcher still running");
        updates
            .borrow_and_update()
            .clone()
            .expect("ticks always publish an update")
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_sustained_low_speed() {
        let source = SteppingSource::new(100);
        let actuator = Arc::new(RecordingActuator::default());
        let watcher = Watcher::spawn(settings(true), source, actuator.clone());
        let mut updates = watcher.updates();

        let mut events = Vec::new();
        for _ in 0..6 {
            events.push(next(&mut updates).await.event);
        }

        assert_eq!(
            events,
            vec![
                MonitorEvent::LowSpeedStarted { remaining_secs: 3 },
                MonitorEvent::CountingDown { remaining_secs: 2 },
                MonitorEvent::CountingDown { remaining_secs: 1 },
                MonitorEvent::Fire {
                    action: PowerAction::Shutdown
                },
                MonitorEvent::ActionPerformed,
                MonitorEvent::ActionPerformed,
            ]
        );
        assert_eq!(actuator.performed(), vec![PowerAction::Shutdown]);
        watcher.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn recovery_before_duration_never_fires() {
        let source = SteppingSource::new(100);
        let step = source.step_handle();
        let actuator = Arc::new(RecordingActuator::default());
        let watcher = Watcher::spawn(settings(true), source, actuator.clone());
        let mut updates = watcher.updates();

        assert_eq!(
            next(&mut updates).await.event,
            MonitorEvent::LowSpeedStarted { remaining_secs: 3 }
        );
        assert_eq!(
            next(&mut updates).await.event,
            MonitorEvent::CountingDown { remaining_secs: 2 }
        );

        step.store(1_000_000, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(next(&mut updates).await.event, MonitorEvent::Recovered);
        for _ in 0..5 {
            assert_eq!(next(&mut updates).await.event, MonitorEvent::AboveThreshold);
        }
        assert!(actuator.performed().is_empty());
        watcher.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn actuator_failure_is_reported_once() {
        let watcher = Watcher::spawn(
            settings(true),
            SteppingSource::new(0),
            Arc::new(FailingActuator),
        );
        let mut updates = watcher.updates();

        let mut fired = None;
        for _ in 0..4 {
            fired = Some(next(&mut updates).await);
        }
        let fired = fired.expect("four ticks ran");
        assert!(matches!(fired.event, MonitorEvent::Fire { .. }));
        assert!(fired.action_error.is_some());
        assert_eq!(fired.countdown_text(), "Performing Action...");

        let after = next(&mut updates).await;
        assert_eq!(after.event, MonitorEvent::ActionPerformed);
        assert_eq!(after.action_error, None);
        watcher.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_watcher_only_reports_speeds() {
        let actuator = Arc::new(RecordingActuator::default());
        let watcher = Watcher::spawn(settings(false), SteppingSource::new(0), actuator.clone());
        let mut updates = watcher.updates();

        for _ in 0..5 {
            let update = next(&mut updates).await;
            assert_eq!(update.event, MonitorEvent::Inactive);
            assert!(update.sample.is_some());
            assert!(!update.enabled);
        }
        assert!(actuator.performed().is_empty());
        watcher.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn commands_apply_between_ticks() {
        let actuator = Arc::new(RecordingActuator::default());
        let watcher = Watcher::spawn(settings(true), SteppingSource::new(0), actuator.clone());
        let mut updates = watcher.updates();

        assert_eq!(
            next(&mut updates).await.event,
            MonitorEvent::LowSpeedStarted { remaining_secs: 3 }
        );

        watcher.set_enabled(false).expect("running");
        watcher.set_adapter(Some("eth0")).expect("running");
        let update = next(&mut updates).await;
        assert_eq!(update.event, MonitorEvent::Inactive);
        assert_eq!(update.adapter.as_deref(), Some("eth0"));

        watcher
            .configure(AutoExitConfig {
                duration_secs: None,
                ..settings(true).auto_exit
            })
            .expect("running");
        watcher.set_enabled(true).expect("running");
        assert_eq!(next(&mut updates).await.event, MonitorEvent::Unconfigured);
        watcher.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_watcher_rejects_commands() {
        let watcher = Watcher::spawn(
            settings(true),
            SteppingSource::new(0),
            Arc::new(RecordingActuator::default()),
        );
        assert_eq!(watcher.adapters(), ["All Adapters", "eth0"]);
        watcher.set_enabled(false).expect("running");

        watcher.stop().await;
        assert!(matches!(
            watcher.set_enabled(false),
            Err(CoreError::WatcherStopped)
        ));
    }
}
