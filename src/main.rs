use gpui::*;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod assets;
mod config;
mod countdown;
mod error;
mod events;
mod notifications;
mod scheduler;
mod sound;
mod theme;
mod tray;
mod ui;

use app::{QuitApp, ReminderApp};
use config::ConfigStore;
use tray::TrayHandle;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = ConfigStore::default_location().unwrap_or_else(|e| {
        warn!("{:#}; using config.json in the working directory", e);
        ConfigStore::new("config.json")
    });
    let config = store.load();
    info!(path = %store.path().display(), "configuration loaded");

    // the reminder loop runs off the UI thread on its own small runtime
    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("reminder-worker")
            .enable_time()
            .build()
            .expect("Failed to start reminder runtime"),
    );

    Application::new().run(move |cx| {
        cx.bind_keys([
            KeyBinding::new("cmd-q", QuitApp, None),
            KeyBinding::new("ctrl-q", QuitApp, None),
        ]);

        let tray = match TrayHandle::build(&assets::resource_path(assets::TRAY_ICON_FILE)) {
            Ok(tray) => Some(tray),
            Err(e) => {
                warn!("System tray unavailable: {:#}", e);
                None
            }
        };

        let window_size = size(px(340.0), px(470.0));
        let centered_bounds = Bounds::centered(None, window_size, cx);

        cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(centered_bounds)),
                titlebar: Some(TitlebarOptions {
                    title: Some("Tigan Reminder".into()),
                    ..Default::default()
                }),
                focus: true,
                show: true,
                is_resizable: false,
                app_id: Some("tigan-reminder".to_string()),
                ..Default::default()
            },
            |window, cx| {
                let view = cx.new(|cx| {
                    ReminderApp::new(config.clone(), store.clone(), runtime.clone(), tray, cx)
                });

                let weak = view.downgrade();
                window.on_window_should_close(cx, move |_window, cx| {
                    let has_tray = weak
                        .read_with(cx, |app, _| app.has_tray())
                        .unwrap_or(false);
                    if has_tray {
                        // closing only hides; Exit lives in the tray menu
                        cx.hide();
                        return false;
                    }
                    let _ = weak.update(cx, |app, cx| app.handle_exit(cx));
                    true
                });

                view
            },
        )
        .expect("Failed to open window");
    });
}
