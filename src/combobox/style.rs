//! Styling for the combobox input line and menu.

use lipgloss_extras::prelude::*;

/// Marker drawn before the focused candidate.
pub const POINTER: &str = "›";

/// Marker drawn after the selected candidate.
pub const CHECK: &str = "✓";

/// Styles used by [`Model::view`](super::Model::view).
#[derive(Debug, Clone)]
pub struct Styles {
    /// Prompt before the query.
    pub prompt: Style,
    /// The query text.
    pub text: Style,
    /// Placeholder shown for an empty query.
    pub placeholder: Style,
    /// Unfocused candidate.
    pub item: Style,
    /// Candidate under the keyboard pointer.
    pub focused_item: Style,
    /// Selection checkmark.
    pub selected_marker: Style,
    /// Candidate that cannot be chosen.
    pub disabled_item: Style,
    /// Message shown by an open menu with no candidates.
    pub empty: Style,
    /// Validation error line.
    pub error: Style,
}

impl Default for Styles {
    fn default() -> Self {
        let subdued = AdaptiveColor {
            Light: "#9B9B9B",
            Dark: "#5C5C5C",
        };

        Self {
            prompt: Style::new().foreground(AdaptiveColor {
                Light: "#04B575",
                Dark: "#ECFD65",
            }),
            text: Style::new(),
            placeholder: Style::new().foreground(Color::from("240")),
            item: Style::new().padding_left(2),
            focused_item: Style::new().foreground(AdaptiveColor {
                Light: "#EE6FF8",
                Dark: "#EE6FF8",
            }),
            selected_marker: Style::new().foreground(Color::from("42")),
            disabled_item: Style::new().padding_left(2).foreground(subdued.clone()),
            empty: Style::new().padding_left(2).foreground(subdued),
            error: Style::new().foreground(Color::from("196")),
        }
    }
}
