use chrono::{DateTime, Local};
use gpui::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::assets;
use crate::config::{coerce_countdown_seconds, ConfigStore, ReminderConfig};
use crate::countdown::CountdownController;
use crate::events::ReminderEvent;
use crate::notifications;
use crate::scheduler::{ReminderScheduler, SchedulerState, SharedSettings, StartOutcome};
use crate::sound;
use crate::theme::Theme;
use crate::tray::{TrayAction, TrayHandle};
use crate::ui::{
    CountdownSnapshot, CountdownView, InputField, MessageEditor, MessageEditorPanel,
    SettingsPanel, SettingsSnapshot,
};

actions!(reminder, [QuitApp]);

/// How long exit waits for the worker to acknowledge the stop.
const EXIT_GRACE: Duration = Duration::from_millis(500);
const TRAY_POLL: Duration = Duration::from_millis(200);
const MAX_NUMBER_CHARS: usize = 6;

pub struct ReminderApp {
    config: ReminderConfig,
    store: ConfigStore,
    // keeps the worker's runtime alive for the life of the window
    _runtime: Arc<Runtime>,
    scheduler: ReminderScheduler,
    countdown: CountdownController,
    countdown_window: Option<WindowHandle<CountdownView>>,
    tray: Option<TrayHandle>,
    focus_handle: FocusHandle,
    interval_input: String,
    countdown_input: String,
    editing: Option<InputField>,
    message_editor: Option<MessageEditor>,
    error_banner: Option<String>,
    next_fire_at: Option<DateTime<Local>>,
    sound_path: PathBuf,
}

impl ReminderApp {
    pub fn new(
        config: ReminderConfig,
        store: ConfigStore,
        runtime: Arc<Runtime>,
        tray: Option<TrayHandle>,
        cx: &mut Context<'_, Self>,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        let settings = Arc::new(SharedSettings::new(
            config.interval_minutes.to_string(),
            config.messages.clone(),
        ));
        let scheduler = ReminderScheduler::new(runtime.handle().clone(), settings, events_tx);

        Self::spawn_event_pump(events_rx, cx);
        if tray.is_some() {
            Self::spawn_tray_poll(cx);
        }
        if config.auto_start {
            Self::schedule_auto_start(config.minimize_to_tray_on_start, cx);
        }

        Self {
            interval_input: config.interval_minutes.to_string(),
            countdown_input: config.countdown_seconds.to_string(),
            config,
            store,
            _runtime: runtime,
            scheduler,
            countdown: CountdownController::new(),
            countdown_window: None,
            tray,
            focus_handle: cx.focus_handle(),
            editing: None,
            message_editor: None,
            error_banner: None,
            next_fire_at: None,
            sound_path: assets::resource_path(assets::SOUND_FILE),
        }
    }

    /// Drains worker events on the UI thread.
    fn spawn_event_pump(mut events: UnboundedReceiver<ReminderEvent>, cx: &mut Context<'_, Self>) {
        cx.spawn(async move |this, cx| {
            while let Some(event) = events.recv().await {
                if this.update(cx, |app, cx| app.handle_event(event, cx)).is_err() {
                    break;
                }
            }
            debug!("event pump finished");
        })
        .detach();
    }

    fn spawn_tray_poll(cx: &mut Context<'_, Self>) {
        cx.spawn(async move |this, cx| {
            loop {
                cx.background_spawn(async {
                    std::thread::sleep(TRAY_POLL);
                })
                .await;

                match this.update(cx, |app, cx| app.poll_tray(cx)) {
                    Ok(true) => {}
                    _ => break,
                }
            }
        })
        .detach();
    }

    fn schedule_auto_start(minimize: bool, cx: &mut Context<'_, Self>) {
        cx.spawn(async move |this, cx| {
            cx.background_spawn(async {
                std::thread::sleep(Duration::from_secs(1));
            })
            .await;

            info!("auto-starting reminders");
            let _ = this.update(cx, |app, cx| app.handle_start(cx));

            if minimize {
                cx.background_spawn(async {
                    std::thread::sleep(Duration::from_secs(2));
                })
                .await;
                let _ = this.update(cx, |app, cx| {
                    if hides_after_auto_start(minimize, app.has_tray()) {
                        app.hide_window(cx);
                    } else {
                        warn!("no tray icon to restore from, keeping the window visible");
                    }
                });
            }
        })
        .detach();
    }

    pub fn handle_start(&mut self, cx: &mut Context<'_, Self>) {
        match self.scheduler.start(&self.interval_input) {
            Ok(StartOutcome::Started) => {
                self.error_banner = None;
                self.editing = None;

                let minutes = self.scheduler.settings().interval_minutes();
                let hold = coerce_countdown_seconds(&self.countdown_input);
                self.countdown_input = hold.to_string();
                self.next_fire_at = Some(next_fire_time(minutes));

                self.config.interval_minutes = minutes;
                self.config.countdown_seconds = hold;
                self.persist();
            }
            Ok(StartOutcome::AlreadyRunning) => {}
            Ok(StartOutcome::PreviousWorkerAlive) => {
                self.error_banner = Some(
                    "The previous reminder loop is still shutting down. Try again in a moment."
                        .to_string(),
                );
            }
            Err(e) => {
                warn!("Start rejected: {}", e);
                self.error_banner = Some(e.to_string());
            }
        }
        cx.notify();
    }

    pub fn handle_stop(&mut self, cx: &mut Context<'_, Self>) {
        if !self.scheduler.stop() {
            return;
        }
        self.next_fire_at = None;
        cx.notify();

        // repaint once the worker has had time to exit
        cx.spawn(async move |this, cx| {
            cx.background_spawn(async {
                std::thread::sleep(Duration::from_millis(1100));
            })
            .await;
            let _ = this.update(cx, |_, cx| cx.notify());
        })
        .detach();
    }

    fn handle_event(&mut self, event: ReminderEvent, cx: &mut Context<'_, Self>) {
        match event {
            ReminderEvent::Fire { message } => self.on_fire(message, cx),
            other => debug!(?other, "ignoring non-fire event from worker"),
        }
    }

    fn on_fire(&mut self, message: String, cx: &mut Context<'_, Self>) {
        info!("showing reminder");
        self.next_fire_at = Some(next_fire_time(self.scheduler.settings().interval_minutes()));

        sound::play_chime(&self.sound_path);
        notifications::notify_reminder(&message);

        let total = coerce_countdown_seconds(&self.countdown_input);
        let (id, events) = self.countdown.begin(total);
        self.apply_countdown_events(&events, cx);
        self.open_countdown_window(message, cx);
        self.spawn_countdown_ticker(id, cx);
        cx.notify();
    }

    fn spawn_countdown_ticker(&self, id: Uuid, cx: &mut Context<'_, Self>) {
        cx.spawn(async move |this, cx| {
            loop {
                cx.background_spawn(async {
                    std::thread::sleep(Duration::from_secs(1));
                })
                .await;

                let alive = this
                    .update(cx, |app, cx| app.tick_countdown(id, cx))
                    .unwrap_or(false);
                if !alive {
                    break;
                }
            }
        })
        .detach();
    }

    /// Returns false once session `id` is no longer the active one.
    fn tick_countdown(&mut self, id: Uuid, cx: &mut Context<'_, Self>) -> bool {
        if !self.countdown.is_current(id) {
            return false;
        }
        let events = self.countdown.tick(id);
        self.apply_countdown_events(&events, cx);
        self.countdown.is_current(id)
    }

    pub fn dismiss_countdown(&mut self, cx: &mut Context<'_, Self>) {
        match self.countdown.dismiss() {
            Some(event) => self.apply_countdown_events(&[event], cx),
            None => self.close_countdown_window(cx),
        }
    }

    fn apply_countdown_events(&mut self, events: &[ReminderEvent], cx: &mut Context<'_, Self>) {
        for event in events {
            match event {
                ReminderEvent::Tick { .. } | ReminderEvent::Complete => {
                    self.refresh_countdown_window(cx)
                }
                ReminderEvent::Closed => self.close_countdown_window(cx),
                ReminderEvent::Fire { .. } => {}
            }
        }
    }

    fn open_countdown_window(&mut self, message: String, cx: &mut Context<'_, Self>) {
        let Some(session) = self.countdown.current() else {
            return;
        };
        let snapshot = CountdownSnapshot::from_session(session);
        let theme = self.config.theme;
        let app = cx.entity().downgrade();

        let window_size = size(px(350.0), px(320.0));
        let centered_bounds = Bounds::centered(None, window_size, cx);

        let opened = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(centered_bounds)),
                titlebar: None,
                window_decorations: Some(WindowDecorations::Client),
                kind: WindowKind::PopUp,
                is_movable: true,
                is_resizable: false,
                focus: true,
                show: true,
                app_id: Some("tigan-reminder".to_string()),
                ..Default::default()
            },
            |_window, cx| cx.new(|_cx| CountdownView::new(message, snapshot, theme, app)),
        );

        match opened {
            Ok(handle) => self.countdown_window = Some(handle),
            Err(e) => error!("Failed to open countdown window: {:#}", e),
        }
    }

    fn refresh_countdown_window(&mut self, cx: &mut Context<'_, Self>) {
        let (Some(handle), Some(session)) = (self.countdown_window.as_ref(), self.countdown.current())
        else {
            return;
        };
        let snapshot = CountdownSnapshot::from_session(session);
        let updated = handle.update(cx, |view, _window, cx| {
            view.apply(snapshot);
            cx.notify();
        });
        if updated.is_err() {
            debug!("countdown window already gone");
            self.countdown_window = None;
        }
    }

    fn close_countdown_window(&mut self, cx: &mut Context<'_, Self>) {
        if let Some(handle) = self.countdown_window.take() {
            let _ = handle.update(cx, |_, window, _| window.remove_window());
        }
    }

    pub fn toggle_theme(&mut self, cx: &mut Context<'_, Self>) {
        self.config.theme = self.config.theme.toggled();
        info!(theme = self.config.theme.as_str(), "theme switched");
        self.persist();

        let theme = self.config.theme;
        if let Some(handle) = self.countdown_window.as_ref() {
            let _ = handle.update(cx, |view, _window, cx| {
                view.set_theme(theme);
                cx.notify();
            });
        }
        cx.notify();
    }

    pub fn toggle_auto_start(&mut self, cx: &mut Context<'_, Self>) {
        self.config.auto_start = !self.config.auto_start;
        self.persist();
        cx.notify();
    }

    pub fn toggle_minimize_on_start(&mut self, cx: &mut Context<'_, Self>) {
        self.config.minimize_to_tray_on_start = !self.config.minimize_to_tray_on_start;
        self.persist();
        cx.notify();
    }

    pub fn focus_field(&mut self, field: InputField, cx: &mut Context<'_, Self>) {
        self.editing = Some(field);
        cx.notify();
    }

    pub fn open_message_editor(&mut self, cx: &mut Context<'_, Self>) {
        self.editing = None;
        self.message_editor = Some(MessageEditor::new(self.config.messages.clone()));
        cx.notify();
    }

    pub fn remove_message(&mut self, index: usize, cx: &mut Context<'_, Self>) {
        if let Some(editor) = self.message_editor.as_mut() {
            editor.remove(index);
            cx.notify();
        }
    }

    pub fn edit_message(&mut self, index: usize, cx: &mut Context<'_, Self>) {
        if let Some(editor) = self.message_editor.as_mut() {
            editor.edit_line(index);
            cx.notify();
        }
    }

    pub fn restore_default_messages(&mut self, cx: &mut Context<'_, Self>) {
        if let Some(editor) = self.message_editor.as_mut() {
            editor.restore_defaults();
            cx.notify();
        }
    }

    pub fn cancel_message_editor(&mut self, cx: &mut Context<'_, Self>) {
        self.message_editor = None;
        cx.notify();
    }

    pub fn save_message_editor(&mut self, cx: &mut Context<'_, Self>) {
        let Some(editor) = self.message_editor.as_mut() else {
            return;
        };
        match editor.finish() {
            Ok(messages) => {
                info!(count = messages.len(), "messages updated");
                self.message_editor = None;
                self.scheduler.settings().set_messages(messages.clone());
                self.config.messages = messages;
                self.persist();
            }
            Err(e) => warn!("Refusing to save messages: {}", e),
        }
        cx.notify();
    }

    fn handle_key(&mut self, key: &str, key_char: Option<&str>, cx: &mut Context<'_, Self>) {
        if let Some(editor) = self.message_editor.as_mut() {
            if !editor.apply_key(key, key_char) {
                self.message_editor = None;
            }
            cx.notify();
            return;
        }

        let Some(field) = self.editing else {
            return;
        };
        let value = match field {
            InputField::Interval => &mut self.interval_input,
            InputField::Countdown => &mut self.countdown_input,
        };
        match key {
            "enter" | "escape" | "tab" => self.editing = None,
            "backspace" => {
                value.pop();
            }
            k if k.len() == 1
                && k.chars().all(|c| c.is_ascii_digit() || c == '-')
                && value.chars().count() < MAX_NUMBER_CHARS =>
            {
                value.push_str(k);
            }
            _ => {}
        }

        if field == InputField::Interval {
            // the worker picks this up at the start of its next cycle
            self.scheduler.settings().set_interval_input(&self.interval_input);
        }
        cx.notify();
    }

    fn poll_tray(&mut self, cx: &mut Context<'_, Self>) -> bool {
        let Some(tray) = self.tray.as_ref() else {
            return false;
        };
        if let Some(action) = tray.poll() {
            self.handle_tray_action(action, cx);
        }
        true
    }

    fn handle_tray_action(&mut self, action: TrayAction, cx: &mut Context<'_, Self>) {
        debug!(?action, "tray menu");
        match action {
            TrayAction::ShowWindow => self.show_window(cx),
            TrayAction::ToggleTheme => self.toggle_theme(cx),
            TrayAction::EditMessages => {
                self.show_window(cx);
                self.open_message_editor(cx);
            }
            TrayAction::Exit => self.handle_exit(cx),
        }
    }

    pub fn show_window(&mut self, cx: &mut Context<'_, Self>) {
        cx.activate(true);
    }

    pub fn hide_window(&mut self, cx: &mut Context<'_, Self>) {
        info!("hiding window to tray");
        cx.hide();
    }

    pub fn has_tray(&self) -> bool {
        self.tray.is_some()
    }

    /// Stops the worker, waits briefly for it, then quits regardless.
    pub fn handle_exit(&mut self, cx: &mut Context<'_, Self>) {
        info!("exiting");
        if !self.scheduler.shutdown(EXIT_GRACE) {
            warn!("reminder worker did not acknowledge stop, exiting anyway");
        }
        self.countdown.dismiss();
        self.close_countdown_window(cx);
        self.tray = None;
        cx.quit();
    }

    /// Save failures are reported but never stop the scheduler.
    fn persist(&mut self) {
        match self.store.save(&self.config) {
            Ok(()) => {
                if self.error_banner.as_deref().is_some_and(|b| b.starts_with(SAVE_ERROR_PREFIX)) {
                    self.error_banner = None;
                }
            }
            Err(e) => {
                let detail = format!("{:#}", e);
                error!("Failed to save settings: {}", detail);
                notifications::notify_save_failed(&detail);
                self.error_banner = Some(format!("{} {}", SAVE_ERROR_PREFIX, detail));
            }
        }
    }

    fn status_text(&self) -> String {
        match self.scheduler.state() {
            SchedulerState::Running => match self.next_fire_at {
                Some(at) => format!("Status: running, next reminder at {}", at.format("%H:%M")),
                None => "Status: running".to_string(),
            },
            SchedulerState::Stopping => "Status: stopping…".to_string(),
            SchedulerState::Idle => "Status: stopped".to_string(),
        }
    }

    fn settings_snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            interval_input: self.interval_input.clone(),
            countdown_input: self.countdown_input.clone(),
            editing: self.editing,
            auto_start: self.config.auto_start,
            minimize_to_tray_on_start: self.config.minimize_to_tray_on_start,
            running: self.scheduler.state() == SchedulerState::Running,
            status: self.status_text(),
            error_banner: self.error_banner.clone(),
            theme: self.config.theme,
        }
    }
}

const SAVE_ERROR_PREFIX: &str = "Could not save settings:";

/// Hiding without a tray would leave no way to bring the window back.
fn hides_after_auto_start(minimize: bool, has_tray: bool) -> bool {
    minimize && has_tray
}

fn next_fire_time(minutes: u32) -> DateTime<Local> {
    Local::now() + chrono::Duration::minutes(i64::from(minutes))
}

impl Render for ReminderApp {
    fn render(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let view = cx.entity().clone();
        let view_for_keyboard = view.clone();
        let view_for_quit = view.clone();
        let focus_handle = self.focus_handle.clone();

        self.focus_handle.focus(window);

        let theme = Theme::from_mode(self.config.theme);
        let body = match &self.message_editor {
            Some(editor) => {
                MessageEditorPanel::new(editor.clone(), self.config.theme, view).into_any_element()
            }
            None => SettingsPanel::new(self.settings_snapshot(), view).into_any_element(),
        };

        div()
            .w_full()
            .h_full()
            .bg(theme.background)
            .text_color(theme.foreground)
            .track_focus(&focus_handle)
            .on_key_down(move |event, _window, cx| {
                let keystroke = &event.keystroke;
                if keystroke.modifiers.platform || keystroke.modifiers.control {
                    return;
                }
                let key = keystroke.key.clone();
                let key_char = keystroke.key_char.clone();
                cx.update_entity(&view_for_keyboard, |app, cx| {
                    app.handle_key(&key, key_char.as_deref(), cx)
                });
            })
            .on_action(move |_: &QuitApp, _window, cx| {
                cx.update_entity(&view_for_quit, |app, cx| app.handle_exit(cx));
            })
            .child(body)
    }
}
