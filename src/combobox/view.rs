//! Rendering for the combobox component.

use super::model::Model;
use super::style::{CHECK, POINTER};
use unicode_width::UnicodeWidthChar;

/// Ellipsis appended to truncated candidate text.
pub const ELLIPSIS: &str = "…";

/// Message shown by an open menu without candidates.
pub const NO_RESULTS: &str = "No results";

impl<T> Model<T> {
    /// Renders the input line, the menu when open, and any validation error.
    pub fn view(&self) -> String {
        let mut lines = vec![self.view_input()];

        if self.open {
            if self.candidates.is_empty() {
                lines.push(self.styles.empty.clone().render(NO_RESULTS));
            } else {
                lines.extend(self.candidates.iter().map(|&i| self.view_item(i)));
            }
        }

        if let Some(err) = &self.err {
            lines.push(self.styles.error.clone().render(err));
        }

        lines.join("\n")
    }

    fn view_input(&self) -> String {
        let prompt = self.styles.prompt.clone().render(&self.prompt);
        let query = self.query.get();
        let body = if query.is_empty() && !self.placeholder.is_empty() {
            self.styles.placeholder.clone().render(&self.placeholder)
        } else {
            self.styles.text.clone().render(&self.truncate(query, 0))
        };
        format!("{}{}", prompt, body)
    }

    fn view_item(&self, index: usize) -> String {
        let item = &self.items[index];
        let selected = self.selection.get().as_ref() == Some(&item.key);
        let focused = self.focused_key.as_ref() == Some(&item.key);
        let marker_width = if selected { 2 } else { 0 };
        let text = self.truncate(&item.text_value, 2 + marker_width);

        let mut line = if self.disabled.contains(&item.key) {
            self.styles.disabled_item.clone().render(&text)
        } else if focused {
            let pointed = format!("{} {}", POINTER, text);
            self.styles.focused_item.clone().render(&pointed)
        } else {
            self.styles.item.clone().render(&text)
        };

        if selected {
            line.push(' ');
            line.push_str(&self.styles.selected_marker.clone().render(CHECK));
        }
        line
    }

    /// Cuts `s` so that it fits the configured width after `reserved` columns.
    fn truncate(&self, s: &str, reserved: usize) -> String {
        if self.width == 0 {
            return s.to_string();
        }
        let limit = self.width.saturating_sub(reserved);
        let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
        if total <= limit {
            return s.to_string();
        }

        let mut out = String::new();
        let mut used = 0;
        let budget = limit.saturating_sub(1);
        for c in s.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            used += w;
            out.push(c);
        }
        out.push_str(ELLIPSIS);
        out
    }
}
