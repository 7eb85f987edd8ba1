use gpui::*;

use crate::app::ReminderApp;
use crate::countdown::CountdownSession;
use crate::theme::{Theme, ThemeMode};
use crate::ui::{button, CountdownRing};

/// What the popup shows for the current second.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSnapshot {
    pub display: String,
    pub progress: f32,
    pub done_enabled: bool,
}

impl CountdownSnapshot {
    pub fn from_session(session: &CountdownSession) -> Self {
        Self {
            display: session.display_text(),
            progress: session.progress(),
            done_enabled: session.done_enabled(),
        }
    }
}

/// Always-on-top popup for one hold period.
pub struct CountdownView {
    message: String,
    snapshot: CountdownSnapshot,
    theme: ThemeMode,
    app: WeakEntity<ReminderApp>,
}

impl CountdownView {
    pub fn new(
        message: String,
        snapshot: CountdownSnapshot,
        theme: ThemeMode,
        app: WeakEntity<ReminderApp>,
    ) -> Self {
        Self {
            message,
            snapshot,
            theme,
            app,
        }
    }

    pub fn apply(&mut self, snapshot: CountdownSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    fn render_done_button(&self, theme: &Theme) -> Div {
        let done = button("Done", theme.success, self.snapshot.done_enabled).w(px(140.0));
        if !self.snapshot.done_enabled {
            return done;
        }

        let app = self.app.clone();
        done.cursor_pointer()
            .hover(|style| style.opacity(0.8))
            .on_mouse_down(MouseButton::Left, move |_event, _window, cx| {
                let app = app.clone();
                // the app closes this window, so wait until its handler returns
                cx.defer(move |cx| {
                    let _ = app.update(cx, |app, cx| app.dismiss_countdown(cx));
                });
            })
    }
}

impl Render for CountdownView {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<'_, Self>) -> impl IntoElement {
        let theme = Theme::from_mode(self.theme);

        div()
            .size_full()
            .flex()
            .flex_col()
            .items_center()
            .justify_center()
            .gap_4()
            .p_6()
            .bg(theme.background)
            .child(
                div()
                    .text_size(px(15.0))
                    .text_color(theme.foreground)
                    .text_align(TextAlign::Center)
                    .child(self.message.clone()),
            )
            .child(CountdownRing::new(
                self.snapshot.progress,
                self.snapshot.display.clone(),
                theme.accent,
                theme.border,
                theme.foreground,
            ))
            .child(self.render_done_button(&theme))
    }
}
