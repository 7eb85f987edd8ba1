use gpui::prelude::*;
use gpui::*;

use crate::app::ReminderApp;
use crate::theme::{Theme, ThemeMode};
use crate::ui::{button, on_click};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Interval,
    Countdown,
}

#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    pub interval_input: String,
    pub countdown_input: String,
    pub editing: Option<InputField>,
    pub auto_start: bool,
    pub minimize_to_tray_on_start: bool,
    pub running: bool,
    pub status: String,
    pub error_banner: Option<String>,
    pub theme: ThemeMode,
}

/// Main window body: numeric fields, start-up toggles, controls.
pub struct SettingsPanel {
    snapshot: SettingsSnapshot,
    view: Entity<ReminderApp>,
}

impl SettingsPanel {
    pub fn new(snapshot: SettingsSnapshot, view: Entity<ReminderApp>) -> Self {
        Self { snapshot, view }
    }

    fn render_field(&self, label: &str, field: InputField, theme: &Theme) -> Div {
        let value = match field {
            InputField::Interval => &self.snapshot.interval_input,
            InputField::Countdown => &self.snapshot.countdown_input,
        };
        let is_editing = self.snapshot.editing == Some(field);
        let text = if is_editing {
            format!("{}|", value)
        } else {
            value.clone()
        };

        let input = on_click(
            div()
                .w(px(80.0))
                .px_2()
                .py_1()
                .rounded(px(4.0))
                .border_2()
                .text_sm()
                .text_align(TextAlign::Center)
                .when(is_editing, |div| {
                    div.bg(theme.background).border_color(theme.accent)
                })
                .when(!is_editing, |div| {
                    div.bg(theme.muted_background).border_color(theme.border)
                })
                .child(text),
            &self.view,
            move |app, cx| app.focus_field(field, cx),
        );

        div()
            .flex()
            .flex_row()
            .items_center()
            .justify_between()
            .py_1()
            .child(div().text_sm().child(label.to_string()))
            .child(input)
    }

    fn render_toggle(
        &self,
        label: &str,
        checked: bool,
        theme: &Theme,
        handler: impl Fn(&mut ReminderApp, &mut Context<'_, ReminderApp>) + 'static,
    ) -> Div {
        let mark = on_click(
            div()
                .px_2()
                .text_color(if checked { theme.success } else { theme.muted_foreground })
                .child(if checked { "☑" } else { "☐" }),
            &self.view,
            handler,
        );

        div()
            .flex()
            .flex_row()
            .items_center()
            .justify_between()
            .py_1()
            .child(div().text_sm().child(label.to_string()))
            .child(mark)
    }

    fn render_controls(&self, theme: &Theme) -> Div {
        let running = self.snapshot.running;

        let start = button("Start", theme.success, !running).flex_1();
        let start = if running {
            start
        } else {
            on_click(start, &self.view, |app, cx| app.handle_start(cx))
        };

        let stop = button("Stop", theme.danger, running).flex_1();
        let stop = if running {
            on_click(stop, &self.view, |app, cx| app.handle_stop(cx))
        } else {
            stop
        };

        div()
            .flex()
            .flex_col()
            .gap_2()
            .child(div().flex().flex_row().gap_2().child(start).child(stop))
            .child(
                div()
                    .flex()
                    .flex_row()
                    .gap_2()
                    .child(on_click(
                        button("Edit messages", theme.secondary, true).flex_1(),
                        &self.view,
                        |app, cx| app.open_message_editor(cx),
                    ))
                    .child(on_click(
                        button("Toggle theme", theme.secondary, true).flex_1(),
                        &self.view,
                        |app, cx| app.toggle_theme(cx),
                    )),
            )
    }
}

impl IntoElement for SettingsPanel {
    type Element = Div;

    fn into_element(self) -> Self::Element {
        let theme = Theme::from_mode(self.snapshot.theme);

        let settings = div()
            .flex()
            .flex_col()
            .p_3()
            .rounded(px(8.0))
            .border_1()
            .border_color(theme.border)
            .child(self.render_field("Reminder interval (minutes)", InputField::Interval, &theme))
            .child(self.render_field("Hold duration (seconds)", InputField::Countdown, &theme))
            .child(self.render_toggle(
                "Start reminders on launch",
                self.snapshot.auto_start,
                &theme,
                |app, cx| app.toggle_auto_start(cx),
            ))
            .child(self.render_toggle(
                "Minimize to tray on launch",
                self.snapshot.minimize_to_tray_on_start,
                &theme,
                |app, cx| app.toggle_minimize_on_start(cx),
            ));

        div()
            .size_full()
            .flex()
            .flex_col()
            .gap_3()
            .p_5()
            .child(
                div()
                    .text_size(px(18.0))
                    .font_weight(FontWeight::BOLD)
                    .text_align(TextAlign::Center)
                    .child("Tigan Reminder 🍑"),
            )
            .child(settings)
            .child(
                div()
                    .text_sm()
                    .text_align(TextAlign::Center)
                    .text_color(theme.muted_foreground)
                    .child(self.snapshot.status.clone()),
            )
            .when_some(self.snapshot.error_banner.clone(), |this, message| {
                this.child(
                    div()
                        .px_3()
                        .py_2()
                        .rounded(px(6.0))
                        .bg(theme.danger)
                        .text_xs()
                        .text_color(rgb(0xffffff))
                        .child(message),
                )
            })
            .child(self.render_controls(&theme))
    }
}
