#![warn(missing_docs)]

//! # autocomplete-widgets
//!
//! Autocomplete (combobox) components for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications.
//!
//! ## Overview
//!
//! The heart of the crate is the combobox interaction engine: the rules that
//! turn keystrokes, focus changes and host prop updates into
//!
//! - a filtered candidate set,
//! - an open or closed menu,
//! - a keyboard pointer over the candidates,
//! - and a committed selection.
//!
//! Query and selection can each be owned by the combobox or controlled by the
//! host. The engine follows the Elm Architecture used throughout bubbletea-rs:
//! `update()` consumes messages and returns commands, `view()` renders.
//!
//! ## Quick Start
//!
//! ```rust
//! use autocomplete_widgets::prelude::*;
//!
//! let mut combo = Combobox::new(vec![
//!     MenuItem::new("Cat").with_id("1"),
//!     MenuItem::new("Dog").with_id("2"),
//! ]);
//!
//! combo.set_query("o");
//! combo.focus_navigate(Direction::Next);
//! combo.commit_focused();
//!
//! assert_eq!(combo.query(), "Dog");
//! assert!(!combo.is_open());
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust
//! use autocomplete_widgets::prelude::*;
//! use bubbletea_rs::{Cmd, Model, Msg};
//!
//! struct App {
//!     combo: Combobox<MenuItem>,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut combo = Combobox::new(vec![MenuItem::new("Rust"), MenuItem::new("Go")]);
//!         let cmd = combo.focus();
//!         (Self { combo }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         let cmd = self.combo.update(msg);
//!         for event in self.combo.drain_events() {
//!             if let Event::SelectionChange(Some(key)) = event {
//!                 // react to the committed item
//!                 let _ = key;
//!             }
//!         }
//!         cmd
//!     }
//!
//!     fn view(&self) -> String {
//!         self.combo.view()
//!     }
//! }
//! ```

pub mod combobox;
pub mod key;

use bubbletea_rs::Cmd;

/// Focus management shared by interactive components.
///
/// Both transitions may return a command: focusing can start timers, and
/// blurring a combobox schedules its delayed menu close.
///
/// ```rust
/// use autocomplete_widgets::prelude::*;
///
/// fn cycle<C: Component>(c: &mut C) {
///     let _ = c.focus();
///     assert!(c.focused());
///     let _ = c.blur();
///     assert!(!c.focused());
/// }
///
/// let mut combo = Combobox::new(vec!["one", "two"]);
/// cycle(&mut combo);
/// ```
pub trait Component {
    /// Gives the component keyboard focus.
    fn focus(&mut self) -> Option<Cmd>;
    /// Takes keyboard focus away.
    fn blur(&mut self) -> Option<Cmd>;
    /// Whether the component has keyboard focus.
    fn focused(&self) -> bool;
}

/// Common imports.
pub mod prelude {
    pub use crate::combobox::{
        Direction, Event, Key, MenuItem, MenuTrigger, Model as Combobox, Options,
    };
    pub use crate::key::{Binding, KeyMap};
    pub use crate::Component;
}
