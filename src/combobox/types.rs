//! Core types for the combobox component: options, reasons, events and messages.

use super::filter::EmptyQuery;
use super::item::Key;
use bubbletea_rs::Msg;
use std::time::Duration;

/// Default grace period between a blur and the menu closing.
pub const DEFAULT_BLUR_GRACE: Duration = Duration::from_millis(150);

/// What opens the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuTrigger {
    /// Typing a non-empty query opens the menu.
    #[default]
    Input,
    /// Focusing the input opens the menu.
    Focus,
    /// Only arrow keys and programmatic calls open the menu.
    Manual,
}

/// Why the menu opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    /// The user typed.
    Input,
    /// The input received focus.
    Focus,
    /// Arrow key or programmatic request.
    Manual,
}

/// Why the menu closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Escape key.
    Escape,
    /// Tab key.
    Tab,
    /// Pointer press outside the component.
    ClickOutside,
    /// A candidate was committed.
    Commit,
    /// The blur grace period elapsed.
    Blur,
    /// The candidate set became empty and empty menus are not allowed.
    Empty,
    /// Closed from code.
    Programmatic,
}

/// Keyboard navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end of the list.
    Next,
    /// Towards the start of the list.
    Previous,
}

/// Notifications emitted by the combobox, drained with
/// [`Model::drain_events`](super::Model::drain_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user asked for a new query. For a controlled query this is the
    /// only effect until the owner echoes the value back.
    QueryChange(String),
    /// The selection was committed or cleared.
    SelectionChange(Option<Key>),
    /// The menu opened or closed.
    OpenChange {
        /// New visibility.
        open: bool,
        /// Set for opens.
        open_reason: Option<OpenReason>,
        /// Set for closes.
        close_reason: Option<CloseReason>,
    },
    /// The clear button was used.
    Cleared,
    /// The owner should move focus back to the input.
    RequestFocus,
}

/// Validation function run against the effective query.
pub type ValidateFunc = Box<dyn Fn(&str) -> Result<(), String> + Send>;

/// Fired when a blur grace period elapses.
///
/// Only the combobox that scheduled it, and only for its latest schedule,
/// acts on the message.
#[derive(Debug, Clone)]
pub struct BlurCloseMsg {
    /// Identifier of the combobox that scheduled the close.
    pub id: usize,
    pub(super) tag: usize,
}

impl From<BlurCloseMsg> for Msg {
    fn from(msg: BlurCloseMsg) -> Self {
        Box::new(msg) as Msg
    }
}

/// Behaviour switches for a combobox.
///
/// ```rust
/// use autocomplete_widgets::combobox::{MenuTrigger, Options};
/// use std::time::Duration;
///
/// let options = Options::default()
///     .with_menu_trigger(MenuTrigger::Focus)
///     .with_allows_custom_value(true)
///     .with_blur_grace(Duration::from_millis(200));
/// assert_eq!(options.menu_trigger, MenuTrigger::Focus);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// What opens the menu. Defaults to [`MenuTrigger::Input`].
    pub menu_trigger: MenuTrigger,
    /// Keep free text that matches no item. Defaults to false.
    pub allows_custom_value: bool,
    /// Allow the menu to stay open with no candidates. Defaults to true.
    pub allows_empty_collection: bool,
    /// What an empty query shows. Defaults to [`EmptyQuery::Auto`].
    pub empty_query: EmptyQuery,
    /// Close the menu when the input loses focus. Defaults to true.
    pub should_close_on_blur: bool,
    /// Delay before a blur closes the menu. Defaults to 150ms.
    pub blur_grace: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            menu_trigger: MenuTrigger::Input,
            allows_custom_value: false,
            allows_empty_collection: true,
            empty_query: EmptyQuery::Auto,
            should_close_on_blur: true,
            blur_grace: DEFAULT_BLUR_GRACE,
        }
    }
}

impl Options {
    /// Sets what opens the menu.
    pub fn with_menu_trigger(mut self, trigger: MenuTrigger) -> Self {
        self.menu_trigger = trigger;
        self
    }

    /// Sets whether free text is kept.
    pub fn with_allows_custom_value(mut self, allows: bool) -> Self {
        self.allows_custom_value = allows;
        self
    }

    /// Sets whether the menu may be open with no candidates.
    pub fn with_allows_empty_collection(mut self, allows: bool) -> Self {
        self.allows_empty_collection = allows;
        self
    }

    /// Sets what an empty query shows.
    pub fn with_empty_query(mut self, empty_query: impl Into<EmptyQuery>) -> Self {
        self.empty_query = empty_query.into();
        self
    }

    /// Sets whether blurring closes the menu.
    pub fn with_should_close_on_blur(mut self, close: bool) -> Self {
        self.should_close_on_blur = close;
        self
    }

    /// Sets the blur grace period.
    pub fn with_blur_grace(mut self, grace: Duration) -> Self {
        self.blur_grace = grace;
        self
    }

    /// Sets the blur grace period in milliseconds.
    pub fn with_blur_grace_ms(self, ms: u64) -> Self {
        self.with_blur_grace(Duration::from_millis(ms))
    }
}
