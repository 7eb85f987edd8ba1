use notify_rust::Notification;
use tracing::debug;

const APP_NAME: &str = "Tigan Reminder";

fn show(summary: &str, body: &str) {
    if let Err(e) = Notification::new()
        .appname(APP_NAME)
        .summary(summary)
        .body(body)
        .timeout(5000)
        .show()
    {
        debug!("desktop notification unavailable: {}", e);
    }
}

pub fn notify_reminder(message: &str) {
    show("Time to hold!", message);
}

pub fn notify_save_failed(detail: &str) {
    show("Could not save settings", detail);
}
