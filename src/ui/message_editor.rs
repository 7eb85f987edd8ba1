use gpui::prelude::*;
use gpui::*;

use crate::app::ReminderApp;
use crate::config::default_messages;
use crate::error::ConfigError;
use crate::theme::{Theme, ThemeMode};
use crate::ui::{button, on_click};

const MAX_MESSAGE_CHARS: usize = 120;

/// Draft state of the message list while the editor is open.
#[derive(Debug, Clone, Default)]
pub struct MessageEditor {
    lines: Vec<String>,
    input: String,
    /// Line currently loaded into `input`; `None` means the input appends.
    editing: Option<usize>,
    warning: Option<String>,
}

impl MessageEditor {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn push_str(&mut self, text: &str) {
        if self.input.chars().count() + text.chars().count() <= MAX_MESSAGE_CHARS {
            self.input.push_str(text);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Moves the typed line into the list, replacing the line being edited
    /// if there is one. Blank input is ignored.
    pub fn commit_input(&mut self) -> bool {
        let line = self.input.trim().to_string();
        self.input.clear();
        let editing = self.editing.take();
        if line.is_empty() {
            return false;
        }
        match editing.and_then(|i| self.lines.get_mut(i)) {
            Some(slot) => *slot = line,
            None => self.lines.push(line),
        }
        self.warning = None;
        true
    }

    /// Loads line `index` into the input for in-place editing. Pending
    /// input is committed first.
    pub fn edit_line(&mut self, index: usize) {
        if index >= self.lines.len() || self.editing == Some(index) {
            return;
        }
        self.commit_input();
        self.input = self.lines[index].clone();
        self.editing = Some(index);
    }

    pub fn remove(&mut self, index: usize) {
        if index >= self.lines.len() {
            return;
        }
        self.lines.remove(index);
        self.editing = match self.editing {
            Some(i) if i == index => {
                self.input.clear();
                None
            }
            Some(i) if i > index => Some(i - 1),
            other => other,
        };
    }

    /// Applies one keystroke. `key_char` is the text the key produced, if
    /// any. Returns false when the key closes the editor.
    pub fn apply_key(&mut self, key: &str, key_char: Option<&str>) -> bool {
        match key {
            "escape" => return false,
            "enter" => {
                self.commit_input();
            }
            "backspace" => self.backspace(),
            _ => match key_char.filter(|text| !text.chars().any(char::is_control)) {
                Some(text) => self.push_str(text),
                None if key == "space" => self.push_str(" "),
                None => {}
            },
        }
        true
    }

    pub fn restore_defaults(&mut self) {
        self.lines = default_messages();
        self.input.clear();
        self.editing = None;
        self.warning = None;
    }

    /// The cleaned list, or a warning kept on the editor when it is empty.
    pub fn finish(&mut self) -> Result<Vec<String>, ConfigError> {
        self.commit_input();
        let lines: Vec<String> = self
            .lines
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            let err = ConfigError::EmptyMessages;
            self.warning = Some(err.to_string());
            return Err(err);
        }
        Ok(lines)
    }
}

pub struct MessageEditorPanel {
    editor: MessageEditor,
    theme: ThemeMode,
    view: Entity<ReminderApp>,
}

impl MessageEditorPanel {
    pub fn new(editor: MessageEditor, theme: ThemeMode, view: Entity<ReminderApp>) -> Self {
        Self {
            editor,
            theme,
            view,
        }
    }

    fn render_line(&self, index: usize, line: &str, theme: &Theme) -> Div {
        let is_editing = self.editor.editing() == Some(index);
        let text = on_click(
            div()
                .flex_1()
                .text_sm()
                .when(is_editing, |div| div.text_color(theme.accent))
                .child(line.to_string()),
            &self.view,
            move |app, cx| app.edit_message(index, cx),
        );

        let remove = on_click(
            div()
                .px_2()
                .text_xs()
                .text_color(theme.danger)
                .child("✕"),
            &self.view,
            move |app, cx| app.remove_message(index, cx),
        );

        div()
            .flex()
            .flex_row()
            .items_center()
            .justify_between()
            .gap_2()
            .py_1()
            .border_b_1()
            .border_color(theme.border)
            .child(text)
            .child(remove)
    }
}

impl IntoElement for MessageEditorPanel {
    type Element = Div;

    fn into_element(self) -> Self::Element {
        let theme = Theme::from_mode(self.theme);

        let list = self
            .editor
            .lines()
            .iter()
            .enumerate()
            .fold(div().flex().flex_col().w_full(), |list, (index, line)| {
                list.child(self.render_line(index, line, &theme))
            });

        let input_text = format!("{}|", self.editor.input());

        let buttons = div()
            .flex()
            .flex_row()
            .justify_between()
            .gap_2()
            .child(on_click(
                button("Restore defaults", theme.secondary, true),
                &self.view,
                |app, cx| app.restore_default_messages(cx),
            ))
            .child(on_click(
                button("Cancel", theme.secondary, true),
                &self.view,
                |app, cx| app.cancel_message_editor(cx),
            ))
            .child(on_click(
                button("Save", theme.success, true),
                &self.view,
                |app, cx| app.save_message_editor(cx),
            ));

        div()
            .size_full()
            .flex()
            .flex_col()
            .gap_3()
            .p_4()
            .child(
                div()
                    .text_size(px(16.0))
                    .font_weight(FontWeight::BOLD)
                    .child("Edit messages"),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(
                        "Type a message and press Enter to add it. Click a line to edit it. \
                         Esc closes without saving.",
                    ),
            )
            .child(
                div()
                    .flex_1()
                    .overflow_hidden()
                    .p_2()
                    .rounded(px(6.0))
                    .bg(theme.muted_background)
                    .child(list),
            )
            .child(
                div()
                    .px_3()
                    .py_1()
                    .rounded(px(4.0))
                    .border_2()
                    .border_color(theme.accent)
                    .text_sm()
                    .child(input_text),
            )
            .when_some(self.editor.warning().map(str::to_string), |this, warning| {
                this.child(
                    div()
                        .text_xs()
                        .text_color(theme.danger)
                        .child(warning),
                )
            })
            .child(buttons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::prelude::v1::test;

    #[test]
    fn typed_line_is_appended_on_commit() {
        let mut editor = MessageEditor::new(vec!["one".to_string()]);
        editor.push_str("t");
        editor.push_str("wo");
        assert!(editor.commit_input());
        assert_eq!(editor.lines(), ["one", "two"]);
        assert_eq!(editor.input(), "");
        assert!(!editor.commit_input());
    }

    #[test]
    fn empty_list_cannot_be_saved() {
        let mut editor = MessageEditor::new(vec!["only".to_string()]);
        editor.remove(0);
        editor.remove(3);

        assert_eq!(editor.finish(), Err(ConfigError::EmptyMessages));
        assert!(editor.warning().is_some());
    }

    #[test]
    fn pending_input_is_included_when_saving() {
        let mut editor = MessageEditor::new(Vec::new());
        editor.push_str("  stretch  ");
        assert_eq!(editor.finish(), Ok(vec!["stretch".to_string()]));
    }

    #[test]
    fn restore_defaults_replaces_draft() {
        let mut editor = MessageEditor::new(vec!["x".to_string()]);
        editor.push_str("draft");
        editor.restore_defaults();
        assert_eq!(editor.lines(), default_messages().as_slice());
        assert_eq!(editor.input(), "");
    }

    #[test]
    fn input_is_capped() {
        let mut editor = MessageEditor::new(Vec::new());
        for _ in 0..200 {
            editor.push_str("a");
        }
        assert_eq!(editor.input().chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn clicked_line_is_edited_in_place() {
        let mut editor = MessageEditor::new(vec!["one".to_string(), "two".to_string()]);
        editor.edit_line(0);
        assert_eq!(editor.input(), "one");
        assert_eq!(editor.editing(), Some(0));

        editor.backspace();
        editor.backspace();
        editor.backspace();
        editor.push_str("first");
        assert!(editor.commit_input());
        assert_eq!(editor.lines(), ["first", "two"]);
        assert_eq!(editor.editing(), None);
    }

    #[test]
    fn removing_lines_keeps_edit_target_in_step() {
        let mut editor = MessageEditor::new(vec!["a".into(), "b".into(), "c".into()]);
        editor.edit_line(2);
        editor.remove(0);
        assert_eq!(editor.editing(), Some(1));

        editor.remove(1);
        assert_eq!(editor.editing(), None);
        assert_eq!(editor.input(), "");
        assert_eq!(editor.lines(), ["b"]);
    }

    #[test]
    fn typed_characters_come_from_key_char() {
        let mut editor = MessageEditor::new(Vec::new());
        assert!(editor.apply_key("h", Some("H")));
        assert!(editor.apply_key("1", Some("!")));
        assert!(editor.apply_key("space", Some(" ")));
        assert!(editor.apply_key("a", Some("提")));
        assert!(editor.apply_key("left", None));
        assert!(editor.apply_key("space", None));
        assert_eq!(editor.input(), "H! 提 ");

        assert!(editor.apply_key("backspace", None));
        assert!(editor.apply_key("enter", Some("\n")));
        assert_eq!(editor.lines(), ["H! 提"]);

        assert!(!editor.apply_key("escape", None));
    }
}
