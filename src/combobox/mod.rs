//! Combobox (autocomplete) component.
//!
//! A combobox pairs a text query with a filterable, keyboard-navigable list of
//! candidates. This module contains the whole interaction engine:
//!
//! - **Item normalisation** ([`normalize`], [`ItemAdapter`], [`Record`]):
//!   derives a stable [`Key`] and a filter text for every record.
//! - **Filtering** ([`filter`], [`FilterPolicy`]): the stable candidate subset
//!   for the current query, using a pluggable [`MatchFn`].
//! - **State machine** ([`Model`]): menu visibility, keyboard pointer,
//!   query and selection, with each of query and selection either owned by
//!   the combobox or controlled by the host.
//!
//! # Basic Usage
//!
//! ```rust
//! use autocomplete_widgets::combobox::{Direction, Event, MenuItem, Model};
//!
//! let mut combo = Model::new(vec![
//!     MenuItem::new("Apple").with_id("a"),
//!     MenuItem::new("Apricot").with_id("b"),
//!     MenuItem::new("Banana").with_id("c"),
//! ]);
//!
//! combo.set_query("ap");
//! assert_eq!(combo.candidates().len(), 2);
//!
//! combo.focus_navigate(Direction::Previous);
//! combo.commit_focused();
//! assert_eq!(combo.query(), "Apricot");
//!
//! let events = combo.drain_events();
//! assert!(events.contains(&Event::SelectionChange(Some("b".into()))));
//! ```
//!
//! # Controlled Query
//!
//! ```rust
//! use autocomplete_widgets::combobox::{Event, Model};
//!
//! let mut combo = Model::new(vec!["abc", "abd", "xyz"]).with_query_prop("ab");
//!
//! combo.set_query("abc");
//! assert_eq!(combo.query(), "ab"); // still waiting for the host
//!
//! for event in combo.drain_events() {
//!     if let Event::QueryChange(q) = event {
//!         combo.set_query_prop(Some(q));
//!     }
//! }
//! assert_eq!(combo.query(), "abc");
//! ```
//!
//! # Blur Handling
//!
//! Blurring an open combobox does not close it right away. [`Model::handle_blur`]
//! returns a command that delivers a [`BlurCloseMsg`] after the grace period;
//! a commit or re-focus in between cancels the close.

pub mod controlled;
pub mod filter;
pub mod item;
pub mod keymap;
pub mod model;
pub mod style;
pub mod types;
pub mod view;

#[cfg(test)]
mod tests;

pub use controlled::Controlled;
pub use filter::{
    contains_ignore_case, filter, filter_indices, fuzzy, starts_with_ignore_case, EmptyQuery,
    FilterPolicy, MatchFn,
};
pub use item::{normalize, DefaultAdapter, FnAdapter, Item, ItemAdapter, Key, MenuItem, Record};
pub use keymap::{default_key_map, KeyMap};
pub use model::{Listener, Model, Snapshot};
pub use style::Styles;
pub use types::{
    BlurCloseMsg, CloseReason, Direction, Event, MenuTrigger, OpenReason, Options, ValidateFunc,
    DEFAULT_BLUR_GRACE,
};
