use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{self, coerce_interval_minutes, parse_interval_minutes};
use crate::error::ConfigError;
use crate::events::ReminderEvent;

/// Upper bound on how long a running worker takes to notice a stop request.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Values the UI edits while the worker is running.
///
/// The interval is kept as the raw text of the input field; the worker
/// re-reads and coerces it at the top of every cycle, never mid-wait.
pub struct SharedSettings {
    interval_input: RwLock<String>,
    messages: RwLock<Vec<String>>,
}

impl SharedSettings {
    pub fn new(interval_input: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            interval_input: RwLock::new(interval_input.into()),
            messages: RwLock::new(messages),
        }
    }

    pub fn set_interval_input(&self, input: &str) {
        *self.interval_input.write() = input.to_string();
    }

    pub fn interval_minutes(&self) -> u32 {
        coerce_interval_minutes(&self.interval_input.read())
    }

    pub fn set_messages(&self, messages: Vec<String>) {
        *self.messages.write() = messages;
    }

    /// Uniform pick; falls back to the built-in list when nothing usable is set.
    pub fn pick_message(&self) -> String {
        let mut rng = rand::rng();
        let messages = self.messages.read();
        let usable: Vec<&String> = messages.iter().filter(|m| !m.trim().is_empty()).collect();
        match usable.choose(&mut rng) {
            Some(message) => (*message).clone(),
            None => {
                warn!("no usable messages configured, picking a built-in one");
                config::DEFAULT_MESSAGES
                    .choose(&mut rng)
                    .map(|m| m.to_string())
                    .unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    /// A stopped worker has not exited yet; nothing was spawned.
    PreviousWorkerAlive,
}

/// Cooperative cancellation handed to one worker at spawn time.
struct CancelSignal {
    running: AtomicBool,
    wake: Notify,
}

impl CancelSignal {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            wake: Notify::new(),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.running.store(false, Ordering::Release);
        self.wake.notify_one();
    }
}

struct Worker {
    cancel: Arc<CancelSignal>,
    handle: JoinHandle<()>,
}

/// Repeating wait-then-fire loop on a background runtime.
///
/// At most one worker is alive at a time. Events are only posted to the
/// queue; the UI thread drains it.
pub struct ReminderScheduler {
    runtime: Handle,
    settings: Arc<SharedSettings>,
    events: UnboundedSender<ReminderEvent>,
    worker: Option<Worker>,
}

impl ReminderScheduler {
    pub fn new(
        runtime: Handle,
        settings: Arc<SharedSettings>,
        events: UnboundedSender<ReminderEvent>,
    ) -> Self {
        Self {
            runtime,
            settings,
            events,
            worker: None,
        }
    }

    pub fn settings(&self) -> &Arc<SharedSettings> {
        &self.settings
    }

    pub fn state(&self) -> SchedulerState {
        match &self.worker {
            None => SchedulerState::Idle,
            Some(worker) if worker.handle.is_finished() => SchedulerState::Idle,
            Some(worker) if worker.cancel.is_running() => SchedulerState::Running,
            Some(_) => SchedulerState::Stopping,
        }
    }

    pub fn start(&mut self, interval_input: &str) -> Result<StartOutcome, ConfigError> {
        match self.state() {
            SchedulerState::Running => return Ok(StartOutcome::AlreadyRunning),
            SchedulerState::Stopping => {
                warn!("previous reminder worker is still alive, not starting another");
                return Ok(StartOutcome::PreviousWorkerAlive);
            }
            SchedulerState::Idle => {}
        }

        let minutes = parse_interval_minutes(interval_input)?;

        self.settings.set_interval_input(interval_input);

        let cancel = Arc::new(CancelSignal::new());
        let handle = self.runtime.spawn(run_cycles(
            self.settings.clone(),
            cancel.clone(),
            self.events.clone(),
        ));
        self.worker = Some(Worker { cancel, handle });

        info!(interval_minutes = minutes, "reminder scheduler started");
        Ok(StartOutcome::Started)
    }

    /// Signals the worker; returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        match &self.worker {
            Some(worker) if worker.cancel.is_running() && !worker.handle.is_finished() => {
                worker.cancel.cancel();
                info!("reminder scheduler stopping");
                true
            }
            _ => false,
        }
    }

    /// Waits up to `grace` for the worker to exit. Returns whether it did.
    pub async fn join(&mut self, grace: Duration) -> bool {
        let Some(worker) = self.worker.as_mut() else {
            return true;
        };
        let joined = tokio::time::timeout(grace, &mut worker.handle).await;
        match joined {
            Ok(_) => {
                self.worker = None;
                true
            }
            Err(_) => {
                warn!(?grace, "reminder worker did not exit in time");
                false
            }
        }
    }

    /// Stop plus a bounded join, for callers outside the runtime.
    pub fn shutdown(&mut self, grace: Duration) -> bool {
        self.stop();
        let runtime = self.runtime.clone();
        runtime.block_on(self.join(grace))
    }
}

async fn run_cycles(
    settings: Arc<SharedSettings>,
    cancel: Arc<CancelSignal>,
    events: UnboundedSender<ReminderEvent>,
) {
    debug!("reminder worker running");

    while cancel.is_running() {
        let minutes = settings.interval_minutes();
        let wait_secs = u64::from(minutes) * 60;
        debug!(minutes, "waiting for next reminder");

        for _ in 0..wait_secs {
            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
                _ = cancel.wake.notified() => {}
            }
            if !cancel.is_running() {
                debug!("stop observed mid-wait");
                return;
            }
        }

        if !cancel.is_running() {
            return;
        }

        let message = settings.pick_message();
        info!("reminder interval elapsed");
        if events.send(ReminderEvent::Fire { message }).is_err() {
            warn!("event queue closed, reminder worker exiting");
            return;
        }
    }

    debug!("reminder worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tokio::time::sleep;

    fn scheduler(messages: &[&str]) -> (ReminderScheduler, UnboundedReceiver<ReminderEvent>) {
        let (tx, rx) = unbounded_channel();
        let settings = Arc::new(SharedSettings::new(
            "60",
            messages.iter().map(|m| m.to_string()).collect(),
        ));
        (ReminderScheduler::new(Handle::current(), settings, tx), rx)
    }

    fn fired(rx: &mut UnboundedReceiver<ReminderEvent>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                ReminderEvent::Fire { message } => messages.push(message),
                other => panic!("scheduler emitted {other:?}"),
            }
        }
        messages
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_stop_never_fires() {
        for minutes in [1u32, 2, 15, 60, 1440] {
            let (mut scheduler, mut rx) = scheduler(&["hold"]);

            assert_eq!(scheduler.start(&minutes.to_string()), Ok(StartOutcome::Started));
            assert!(scheduler.stop());
            assert_eq!(scheduler.state(), SchedulerState::Stopping);
            assert!(scheduler.join(Duration::from_millis(1500)).await);
            assert_eq!(scheduler.state(), SchedulerState::Idle);

            sleep(Duration::from_secs(u64::from(minutes) * 60 + 5)).await;
            assert!(fired(&mut rx).is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_mid_wait_is_observed_quickly() {
        let (mut scheduler, mut rx) = scheduler(&["hold"]);
        scheduler.start("1").unwrap();

        sleep(Duration::from_secs(30)).await;
        assert!(scheduler.stop());
        assert!(scheduler.join(Duration::from_secs(1)).await);

        sleep(Duration::from_secs(120)).await;
        assert!(fired(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_invalid_interval_without_running() {
        for input in ["0", "-3", "abc", "", "2.5", "  "] {
            let (mut scheduler, _rx) = scheduler(&["hold"]);
            assert!(scheduler.start(input).is_err(), "{input:?} should be rejected");
            assert_eq!(scheduler.state(), SchedulerState::Idle);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_each_full_interval() {
        let (mut scheduler, mut rx) = scheduler(&["only message"]);
        scheduler.start("1").unwrap();

        sleep(Duration::from_secs(59)).await;
        assert!(fired(&mut rx).is_empty());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(fired(&mut rx), vec!["only message"]);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(fired(&mut rx), vec!["only message"]);

        scheduler.stop();
        assert!(scheduler.join(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_applies_from_next_cycle() {
        let (mut scheduler, mut rx) = scheduler(&["hold"]);
        scheduler.start("1").unwrap();

        sleep(Duration::from_secs(30)).await;
        scheduler.settings().set_interval_input("2");

        sleep(Duration::from_secs(31)).await;
        assert_eq!(fired(&mut rx).len(), 1, "first cycle keeps the old interval");

        sleep(Duration::from_secs(114)).await;
        assert!(fired(&mut rx).is_empty());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(fired(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_interval_mid_run_is_coerced() {
        let (mut scheduler, mut rx) = scheduler(&["hold"]);
        scheduler.start("1").unwrap();

        sleep(Duration::from_secs(10)).await;
        scheduler.settings().set_interval_input("soon");

        sleep(Duration::from_secs(51)).await;
        assert_eq!(fired(&mut rx).len(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Running);

        sleep(Duration::from_secs(3000)).await;
        assert!(fired(&mut rx).is_empty());

        sleep(Duration::from_secs(700)).await;
        assert_eq!(fired(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_a_no_op() {
        let (mut scheduler, _rx) = scheduler(&["hold"]);
        assert_eq!(scheduler.start("5"), Ok(StartOutcome::Started));
        assert_eq!(scheduler.start("5"), Ok(StartOutcome::AlreadyRunning));
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_ignores_field_contents() {
        let (mut scheduler, _rx) = scheduler(&["hold"]);
        scheduler.start("5").unwrap();
        assert_eq!(scheduler.start("abc"), Ok(StartOutcome::AlreadyRunning));
        assert_eq!(scheduler.start("-1"), Ok(StartOutcome::AlreadyRunning));
        assert_eq!(scheduler.settings().interval_minutes(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_waits_for_previous_worker() {
        let (mut scheduler, _rx) = scheduler(&["hold"]);
        scheduler.start("5").unwrap();
        scheduler.stop();

        assert_eq!(scheduler.start("5"), Ok(StartOutcome::PreviousWorkerAlive));

        assert!(scheduler.join(Duration::from_millis(1500)).await);
        assert_eq!(scheduler.start("5"), Ok(StartOutcome::Started));
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_reports_nothing_to_stop() {
        let (mut scheduler, _rx) = scheduler(&["hold"]);
        assert!(!scheduler.stop());
        assert!(scheduler.join(Duration::from_millis(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_exits_when_queue_is_dropped() {
        let (mut scheduler, rx) = scheduler(&["hold"]);
        drop(rx);
        scheduler.start("1").unwrap();

        sleep(Duration::from_secs(61)).await;
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    fn worker_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap()
    }

    fn scheduler_on(runtime: &tokio::runtime::Runtime) -> ReminderScheduler {
        let (tx, _rx) = unbounded_channel();
        let settings = Arc::new(SharedSettings::new("60", vec!["hold".to_string()]));
        ReminderScheduler::new(runtime.handle().clone(), settings, tx)
    }

    #[test]
    fn shutdown_joins_running_worker_within_grace() {
        let runtime = worker_runtime();
        let mut scheduler = scheduler_on(&runtime);
        assert_eq!(scheduler.start("60"), Ok(StartOutcome::Started));

        let began = std::time::Instant::now();
        assert!(scheduler.shutdown(Duration::from_millis(500)));
        assert!(began.elapsed() < Duration::from_secs(1));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn shutdown_when_idle_returns_immediately() {
        let runtime = worker_runtime();
        let mut scheduler = scheduler_on(&runtime);
        assert!(scheduler.shutdown(Duration::from_millis(500)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn picks_only_configured_messages() {
        let settings = SharedSettings::new("1", vec!["a".to_string(), "b".to_string()]);
        for _ in 0..50 {
            let message = settings.pick_message();
            assert!(message == "a" || message == "b");
        }
    }

    #[test]
    fn empty_message_list_falls_back_to_defaults() {
        let settings = SharedSettings::new("1", Vec::new());
        let message = settings.pick_message();
        assert!(config::DEFAULT_MESSAGES.contains(&message.as_str()));
    }

    #[test]
    fn interval_reads_are_coerced() {
        let settings = SharedSettings::new("-4", Vec::new());
        assert_eq!(settings.interval_minutes(), config::DEFAULT_INTERVAL_MINUTES);
        settings.set_interval_input("7");
        assert_eq!(settings.interval_minutes(), 7);
    }
}
