//! Key bindings for the combobox component.

use crate::key::{self, new_binding, with_help, with_keys_str, Binding};

/// KeyMap is the set of key bindings the combobox responds to.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Focus the next candidate, opening the menu when closed.
    pub next: Binding,
    /// Focus the previous candidate, opening the menu when closed.
    pub previous: Binding,
    /// Commit the focused candidate.
    pub commit: Binding,
    /// Close the menu.
    pub close: Binding,
    /// Close the menu and move on.
    pub tab_out: Binding,
    /// Delete the last character of the query.
    pub delete_backward: Binding,
    /// Clear query and selection.
    pub clear: Binding,
}

/// The default combobox bindings.
pub fn default_key_map() -> KeyMap {
    KeyMap {
        next: new_binding(vec![
            with_keys_str(&["down", "ctrl+n"]),
            with_help("↓", "next"),
        ]),
        previous: new_binding(vec![
            with_keys_str(&["up", "ctrl+p"]),
            with_help("↑", "previous"),
        ]),
        commit: new_binding(vec![with_keys_str(&["enter"]), with_help("enter", "select")]),
        close: new_binding(vec![with_keys_str(&["esc"]), with_help("esc", "close")]),
        tab_out: new_binding(vec![
            with_keys_str(&["tab", "shift+tab"]),
            with_help("tab", "leave"),
        ]),
        delete_backward: new_binding(vec![
            with_keys_str(&["backspace", "ctrl+h"]),
            with_help("backspace", "delete"),
        ]),
        clear: new_binding(vec![with_keys_str(&["ctrl+u"]), with_help("ctrl+u", "clear")]),
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        default_key_map()
    }
}

impl key::KeyMap for KeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.next, &self.previous, &self.commit, &self.close]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.next, &self.previous, &self.commit],
            vec![&self.close, &self.tab_out, &self.delete_backward, &self.clear],
        ]
    }
}
