//! Type-safe key bindings shared by the widgets in this crate.
//!
//! A [`Binding`] groups one or more [`KeyPress`]es with the help text shown to
//! users. Bindings can be built directly from crossterm key codes or from
//! human-readable strings such as `"ctrl+u"` or `"down"`:
//!
//! ```rust
//! use autocomplete_widgets::key::{new_binding, with_help, with_keys_str, Binding};
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let commit = Binding::new(vec![KeyCode::Enter]).with_help("enter", "select");
//! let clear = new_binding(vec![with_keys_str(&["ctrl+u"]), with_help("ctrl+u", "clear")]);
//!
//! assert_eq!(commit.help().key, "enter");
//! assert_eq!(clear.keys()[0].mods, KeyModifiers::CONTROL);
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key combination: a key code plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers held while pressing `code`.
    pub mods: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, mods): (KeyCode, KeyModifiers)) -> Self {
        Self { code, mods }
    }
}

/// Help text attached to a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"↓"`.
    pub key: String,
    /// What the key does, e.g. `"next"`.
    pub desc: String,
}

/// A set of key presses that trigger the same action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding from key codes or `(KeyCode, KeyModifiers)` pairs.
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help text for this binding.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Key presses that trigger this binding.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// Help text for this binding.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Whether the binding currently responds to input.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Reports whether `msg` triggers this binding.
    ///
    /// Shift is ignored for character keys and back-tab since terminals
    /// encode it in the key itself.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if !self.enabled() {
            return false;
        }
        self.keys.iter().any(|k| {
            if k.code != msg.key {
                return false;
            }
            match k.code {
                KeyCode::Char(_) | KeyCode::BackTab => {
                    k.mods.difference(KeyModifiers::SHIFT)
                        == msg.modifiers.difference(KeyModifiers::SHIFT)
                }
                _ => k.mods == msg.modifiers,
            }
        })
    }
}

/// Option applied to a binding under construction, see [`new_binding`].
pub type BindingOpt = Box<dyn FnOnce(&mut Binding)>;

/// Builds a binding from a list of options.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        opt(&mut binding);
    }
    binding
}

/// Adds key presses to the binding.
pub fn with_keys<K: Into<KeyPress>>(keys: Vec<K>) -> BindingOpt {
    let keys: Vec<KeyPress> = keys.into_iter().map(Into::into).collect();
    Box::new(move |b: &mut Binding| b.keys.extend(keys))
}

/// Adds key presses parsed from strings such as `"ctrl+u"` or `"pgdown"`.
///
/// Strings that do not name a known key are skipped.
pub fn with_keys_str(keys: &[&str]) -> BindingOpt {
    let parsed: Vec<KeyPress> = keys.iter().filter_map(|s| parse_key(s)).collect();
    Box::new(move |b: &mut Binding| b.keys.extend(parsed))
}

/// Sets the binding's help text.
pub fn with_help(key: impl Into<String>, desc: impl Into<String>) -> BindingOpt {
    let help = Help {
        key: key.into(),
        desc: desc.into(),
    };
    Box::new(move |b: &mut Binding| b.help = help)
}

/// Parses a key description like `"alt+backspace"` into a [`KeyPress`].
pub fn parse_key(s: &str) -> Option<KeyPress> {
    let mut mods = KeyModifiers::NONE;
    let mut parts: Vec<&str> = s.split('+').collect();
    // "+" alone, or "ctrl++", names the plus key
    if s.ends_with("++") || s == "+" {
        parts.retain(|p| !p.is_empty());
        parts.push("+");
    }
    let name = parts.pop()?;
    for m in parts {
        match m {
            "ctrl" => mods |= KeyModifiers::CONTROL,
            "alt" => mods |= KeyModifiers::ALT,
            "shift" => mods |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = match name {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" if mods.contains(KeyModifiers::SHIFT) => {
            mods.remove(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" => KeyCode::PageUp,
        "pgdown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        other => {
            let mut chars = other.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };
    Some(KeyPress { code, mods })
}

/// Reports whether `msg` triggers `binding`.
pub fn matches_binding(msg: &KeyMsg, binding: &Binding) -> bool {
    binding.matches(msg)
}

/// Implemented by key maps that can describe themselves for help views.
pub trait KeyMap {
    /// The handful of bindings worth showing inline.
    fn short_help(&self) -> Vec<&Binding>;
    /// All bindings, grouped into columns.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
