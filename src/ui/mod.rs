use gpui::prelude::*;
use gpui::*;

use crate::app::ReminderApp;

mod countdown_ring;
mod countdown_window;
mod message_editor;
mod settings_panel;

pub use countdown_ring::CountdownRing;
pub use countdown_window::{CountdownSnapshot, CountdownView};
pub use message_editor::{MessageEditor, MessageEditorPanel};
pub use settings_panel::{InputField, SettingsPanel, SettingsSnapshot};

pub(crate) fn button(label: &str, color: Hsla, enabled: bool) -> Div {
    div()
        .px_4()
        .py_2()
        .rounded(px(8.0))
        .bg(color)
        .text_sm()
        .font_weight(FontWeight::MEDIUM)
        .text_color(rgb(0xffffff))
        .text_align(TextAlign::Center)
        .when(!enabled, |div| div.opacity(0.4))
        .child(label.to_string())
}

/// Routes a left click on `element` to a method on the app view.
pub(crate) fn on_click(
    element: Div,
    view: &Entity<ReminderApp>,
    handler: impl Fn(&mut ReminderApp, &mut Context<'_, ReminderApp>) + 'static,
) -> Div {
    let view = view.clone();
    element
        .cursor_pointer()
        .hover(|style| style.opacity(0.8))
        .on_mouse_down(MouseButton::Left, move |_event, _window, cx| {
            cx.update_entity(&view, |app, cx| handler(app, cx));
        })
}
