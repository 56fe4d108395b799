//! The combobox state machine.

use super::controlled::Controlled;
use super::filter::{contains_ignore_case, filter_indices, FilterPolicy, MatchFn};
use super::item::{normalize, position_of, DefaultAdapter, Item, ItemAdapter, Key, Record};
use super::keymap::{default_key_map, KeyMap};
use super::style::Styles;
use super::types::{
    BlurCloseMsg, CloseReason, Direction, Event, MenuTrigger, OpenReason, Options, ValidateFunc,
};
use crate::Component;
use bubbletea_rs::{tick, Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use unicode_segmentation::UnicodeSegmentation;

// Used to ensure that blur-close messages only reach the combobox that scheduled them.
static LAST_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Callback receiving the observable state after every transition.
pub type Listener<T> = Box<dyn FnMut(&Snapshot<'_, T>) + Send>;

/// The observable state of a combobox at one point in time.
#[derive(Debug)]
pub struct Snapshot<'a, T> {
    /// Effective query.
    pub query: &'a str,
    /// Whether the menu is visible.
    pub is_open: bool,
    /// Visible candidates, in collection order.
    pub candidates: Vec<&'a Item<T>>,
    /// Candidate under the keyboard pointer.
    pub focused_key: Option<&'a Key>,
    /// Committed selection.
    pub selected_key: Option<&'a Key>,
    /// Validation error for the current query.
    pub err: Option<&'a str>,
}

#[derive(PartialEq)]
struct Observed {
    query: String,
    open: bool,
    candidates: Vec<usize>,
    focused: Option<Key>,
    selected: Option<Key>,
    err: Option<String>,
    revision: u64,
}

/// A text input bound to a filterable, keyboard-navigable list of candidates.
///
/// The model owns the menu visibility, the keyboard pointer, the query and
/// the selection. Query and selection can each be handed to the host
/// ("controlled"), in which case the model reports requested changes as
/// [`Event`]s and waits for the host to echo them back through
/// [`set_query_prop`](Model::set_query_prop) and
/// [`set_selected_prop`](Model::set_selected_prop).
///
/// # Examples
///
/// ```rust
/// use autocomplete_widgets::combobox::{Direction, MenuItem, Model};
///
/// let mut combo = Model::new(vec![
///     MenuItem::new("Cat").with_id("1"),
///     MenuItem::new("Dog").with_id("2"),
/// ]);
///
/// combo.set_query("o");
/// assert!(combo.is_open());
///
/// combo.focus_navigate(Direction::Next);
/// combo.commit_focused();
/// assert_eq!(combo.selected_key().map(|k| k.as_str()), Some("2"));
/// assert_eq!(combo.query(), "Dog");
/// assert!(!combo.is_open());
/// ```
pub struct Model<T> {
    /// Prompt drawn before the query.
    pub prompt: String,
    /// Text drawn when the query is empty.
    pub placeholder: String,
    /// Maximum display width of a line. 0 means no limit.
    pub width: usize,
    /// Key bindings.
    pub key_map: KeyMap,
    /// Visual styles.
    pub styles: Styles,

    pub(super) options: Options,
    pub(super) items: Vec<Item<T>>,
    adapter: Box<dyn ItemAdapter<T> + Send>,
    predicate: MatchFn,
    pub(super) query: Controlled<String>,
    pub(super) selection: Controlled<Option<Key>>,
    pub(super) disabled: HashSet<Key>,
    pub(super) open: bool,
    open_reason: Option<OpenReason>,
    pub(super) focused_key: Option<Key>,
    pub(super) candidates: Vec<usize>,
    pub(super) focus: bool,

    id: usize,
    pub(super) blur_tag: usize,
    close_pending: bool,

    validate: Option<ValidateFunc>,
    pub(super) err: Option<String>,

    events: Vec<Event>,
    listener: Option<Listener<T>>,
    revision: u64,
}

impl<T: Record + 'static> Model<T> {
    /// Creates a combobox over `items` using the default field fallbacks.
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self::with_adapter(items, DefaultAdapter)
    }
}

impl<T> Model<T> {
    /// Creates a combobox that derives keys and text through `adapter`.
    pub fn with_adapter<A>(items: impl IntoIterator<Item = T>, adapter: A) -> Self
    where
        A: ItemAdapter<T> + Send + 'static,
    {
        let items = normalize(items, &adapter);
        let mut m = Self {
            prompt: "> ".to_string(),
            placeholder: String::new(),
            width: 0,
            key_map: default_key_map(),
            styles: Styles::default(),
            options: Options::default(),
            items,
            adapter: Box::new(adapter),
            predicate: Box::new(contains_ignore_case),
            query: Controlled::default(),
            selection: Controlled::default(),
            disabled: HashSet::new(),
            open: false,
            open_reason: None,
            focused_key: None,
            candidates: Vec::new(),
            focus: false,
            id: next_id(),
            blur_tag: 0,
            close_pending: false,
            validate: None,
            err: None,
            events: Vec::new(),
            listener: None,
            revision: 0,
        };
        m.recompute();
        m
    }

    /// Replaces the behaviour options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.set_options(options);
        self
    }

    /// Replaces the match predicate.
    pub fn with_predicate(mut self, predicate: MatchFn) -> Self {
        self.set_predicate(predicate);
        self
    }

    /// Starts with an uncontrolled query.
    pub fn with_default_query(mut self, query: impl Into<String>) -> Self {
        self.query = Controlled::Owned(query.into());
        self.query_changed();
        self
    }

    /// Starts with an uncontrolled selection. The query is filled with the
    /// item's text unless a query was already given.
    pub fn with_default_selected(mut self, key: impl Into<Key>) -> Self {
        let key = key.into();
        if self.query.get().is_empty() {
            if let Some(pos) = position_of(&self.items, &key) {
                let text = self.items[pos].text_value.clone();
                self.query.force(text);
                self.query_changed();
            }
        }
        self.selection = Controlled::Owned(Some(key));
        self
    }

    /// Starts with a query owned by the host.
    pub fn with_query_prop(mut self, query: impl Into<String>) -> Self {
        self.query = Controlled::External(query.into());
        self.query_changed();
        self
    }

    /// Starts with a selection owned by the host.
    pub fn with_selected_prop(mut self, key: Option<Key>) -> Self {
        self.selection = Controlled::External(key);
        self
    }

    /// Marks keys that can be seen but not chosen.
    pub fn with_disabled_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.set_disabled_keys(keys);
        self
    }

    // --- Accessors ---

    /// Identifier carried by this combobox's timer messages.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The effective query.
    pub fn query(&self) -> &str {
        self.query.get()
    }

    /// Whether the menu is visible.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Reason given when the menu last opened.
    pub fn menu_trigger(&self) -> Option<OpenReason> {
        self.open_reason
    }

    /// Visible candidates in collection order.
    pub fn candidates(&self) -> Vec<&Item<T>> {
        self.candidates.iter().map(|&i| &self.items[i]).collect()
    }

    /// All normalised items.
    pub fn items(&self) -> &[Item<T>] {
        &self.items
    }

    /// Key of the candidate under the keyboard pointer.
    pub fn focused_key(&self) -> Option<&Key> {
        self.focused_key.as_ref()
    }

    /// Candidate under the keyboard pointer.
    pub fn focused_item(&self) -> Option<&Item<T>> {
        let key = self.focused_key.as_ref()?;
        position_of(&self.items, key).map(|pos| &self.items[pos])
    }

    /// Key of the committed selection.
    pub fn selected_key(&self) -> Option<&Key> {
        self.selection.get().as_ref()
    }

    /// The committed item, if its key is part of the collection.
    pub fn selected_item(&self) -> Option<&Item<T>> {
        let key = self.selected_key()?;
        position_of(&self.items, key).map(|pos| &self.items[pos])
    }

    /// Whether `key` is disabled.
    pub fn is_disabled(&self, key: &Key) -> bool {
        self.disabled.contains(key)
    }

    /// Validation error for the current query.
    pub fn err(&self) -> Option<&str> {
        self.err.as_deref()
    }

    /// Whether the host owns the query.
    pub fn is_query_controlled(&self) -> bool {
        self.query.is_controlled()
    }

    /// Whether the host owns the selection.
    pub fn is_selection_controlled(&self) -> bool {
        self.selection.is_controlled()
    }

    /// Whether the input has focus.
    pub fn focused(&self) -> bool {
        self.focus
    }

    /// Whether a blur-triggered close is waiting for its grace period.
    pub fn is_close_pending(&self) -> bool {
        self.close_pending
    }

    /// Current behaviour options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The full observable state.
    pub fn snapshot(&self) -> Snapshot<'_, T> {
        Snapshot {
            query: self.query(),
            is_open: self.open,
            candidates: self.candidates(),
            focused_key: self.focused_key(),
            selected_key: self.selected_key(),
            err: self.err(),
        }
    }

    /// Takes the notifications emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Registers a listener called with a [`Snapshot`] after every
    /// transition that changed observable state.
    pub fn subscribe(&mut self, listener: Listener<T>) {
        self.listener = Some(listener);
    }

    // --- Configuration and host props ---

    /// Replaces the behaviour options and recomputes the candidates.
    pub fn set_options(&mut self, options: Options) {
        self.transition(|m| {
            m.options = options;
            m.recompute();
        });
    }

    /// Replaces the match predicate and recomputes the candidates.
    pub fn set_predicate(&mut self, predicate: MatchFn) {
        self.transition(|m| {
            m.predicate = predicate;
            m.recompute();
        });
    }

    /// Sets a validation function, run against every effective query.
    pub fn set_validate(&mut self, validate: ValidateFunc) {
        self.transition(|m| {
            m.validate = Some(validate);
            m.run_validation();
        });
    }

    /// Replaces the disabled keys. A focused candidate that becomes
    /// disabled loses the pointer.
    pub fn set_disabled_keys(&mut self, keys: impl IntoIterator<Item = Key>) {
        let keys: HashSet<Key> = keys.into_iter().collect();
        self.transition(|m| {
            m.disabled = keys;
            if m.focused_key.as_ref().is_some_and(|k| m.disabled.contains(k)) {
                m.focused_key = None;
            }
        });
    }

    /// Replaces the item collection.
    pub fn set_items(&mut self, items: impl IntoIterator<Item = T>) {
        let items = normalize(items, &*self.adapter);
        self.transition(|m| {
            m.items = items;
            m.revision += 1;
            m.recompute();
        });
    }

    /// Host echo for the query. `Some` controls the query, `None` returns
    /// ownership to the combobox.
    pub fn set_query_prop(&mut self, query: Option<String>) {
        self.transition(|m| {
            if m.query.sync(query) {
                m.query_changed();
            }
        });
    }

    /// Host echo for the selection. `Some(key)` controls the selection,
    /// `None` returns ownership to the combobox.
    ///
    /// A changed selection resets an uncontrolled query to the selected
    /// item's text.
    pub fn set_selected_prop(&mut self, selected: Option<Option<Key>>) {
        self.transition(|m| {
            if !m.selection.sync(selected) || m.query.is_controlled() {
                return;
            }
            let text = match m.selected_item() {
                Some(item) => item.text_value.clone(),
                None if m.options.allows_custom_value => return,
                None => String::new(),
            };
            m.request_query(text);
        });
    }

    // --- Entry points ---

    /// Handles a keystroke that produced `text` as the new query.
    ///
    /// For a controlled query this only emits [`Event::QueryChange`]; the
    /// candidates follow once the host echoes the value.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.transition(|m| {
            if text == *m.query.get() {
                return;
            }
            tracing::trace!(id = m.id, query = %text, "combobox query requested");

            if !m.options.allows_custom_value {
                let mismatch = match m.selected_key() {
                    Some(_) => m.selected_item().map_or(true, |i| i.text_value != text),
                    None => false,
                };
                if mismatch {
                    m.request_selection(None);
                }
            }

            m.request_query(text.clone());

            if m.options.menu_trigger == MenuTrigger::Input && !text.trim().is_empty() {
                m.open_menu(OpenReason::Input);
            }
        });
    }

    /// Moves the keyboard pointer, wrapping at both ends. Opens a closed
    /// menu without moving the pointer.
    pub fn focus_navigate(&mut self, direction: Direction) {
        self.transition(|m| {
            if !m.open {
                m.open_menu(OpenReason::Manual);
                return;
            }
            if let Some(pos) = m.step(direction) {
                let key = m.items[m.candidates[pos]].key.clone();
                tracing::trace!(id = m.id, key = %key, "combobox pointer moved");
                m.focused_key = Some(key);
            }
        });
    }

    /// Commits the focused candidate. No-op when closed or nothing is focused.
    pub fn commit_focused(&mut self) {
        self.transition(|m| {
            if !m.open {
                return;
            }
            let Some(key) = m.focused_key.clone() else {
                return;
            };
            if let Some(pos) = m.candidate_position(&key) {
                m.commit(pos);
            }
        });
    }

    /// Commits the candidate with `key`, e.g. after a pointer click.
    ///
    /// Only visible, enabled candidates can be selected; anything else is
    /// ignored.
    pub fn select_by_key(&mut self, key: &Key) {
        self.transition(|m| match m.candidate_position(key) {
            Some(pos) => m.commit(pos),
            None => {
                tracing::trace!(id = m.id, key = %key, "ignoring selection of a non-candidate");
            }
        });
    }

    /// Opens the menu. No-op when already open, or when there are no
    /// candidates and empty menus are not allowed.
    pub fn request_open(&mut self, reason: OpenReason) {
        self.transition(|m| {
            m.open_menu(reason);
        });
    }

    /// Closes the menu and cancels any pending blur close.
    pub fn request_close(&mut self, reason: CloseReason) {
        self.transition(|m| {
            m.close_menu(reason);
        });
    }

    /// Clears query and selection and asks the host to refocus the input.
    ///
    /// A pending blur close is left running; only a refocus cancels it.
    pub fn clear(&mut self) {
        self.transition(|m| {
            tracing::debug!(id = m.id, "combobox cleared");
            m.request_query(String::new());
            m.request_selection(None);
            m.events.push(Event::Cleared);
            m.events.push(Event::RequestFocus);
        });
    }

    /// The input gained focus. Cancels a pending blur close and opens the
    /// menu in [`MenuTrigger::Focus`] mode.
    pub fn handle_focus(&mut self) {
        self.transition(|m| {
            m.focus = true;
            m.close_pending = false;
            if m.options.menu_trigger == MenuTrigger::Focus {
                m.open_menu(OpenReason::Focus);
            }
        });
    }

    /// The input lost focus.
    ///
    /// An open menu closes after the grace period, so that a click on a
    /// candidate, which blurs the input first, can still commit. The returned
    /// command delivers the [`BlurCloseMsg`] to [`update`](Model::update).
    pub fn handle_blur(&mut self) -> Option<Cmd> {
        self.transition(|m| {
            m.focus = false;
            if !m.open {
                m.revert_query();
                return None;
            }
            if !m.options.should_close_on_blur {
                return None;
            }

            m.blur_tag += 1;
            m.close_pending = true;
            let id = m.id;
            let tag = m.blur_tag;
            tracing::trace!(id, tag, "combobox blur close scheduled");
            Some(tick(m.options.blur_grace, move |_| {
                Box::new(BlurCloseMsg { id, tag }) as Msg
            }))
        })
    }

    /// Processes key presses and timer messages.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(close) = msg.downcast_ref::<BlurCloseMsg>() {
            self.transition(|m| m.on_blur_close(close));
            return None;
        }

        if !self.focus {
            return None;
        }

        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            self.handle_key(key_msg);
        }
        None
    }

    fn handle_key(&mut self, key_msg: &KeyMsg) {
        if self.key_map.next.matches(key_msg) {
            self.focus_navigate(Direction::Next);
        } else if self.key_map.previous.matches(key_msg) {
            self.focus_navigate(Direction::Previous);
        } else if self.key_map.commit.matches(key_msg) {
            self.commit_focused();
        } else if self.key_map.close.matches(key_msg) {
            self.request_close(CloseReason::Escape);
        } else if self.key_map.tab_out.matches(key_msg) {
            self.request_close(CloseReason::Tab);
        } else if self.key_map.clear.matches(key_msg) {
            self.clear();
        } else if self.key_map.delete_backward.matches(key_msg) {
            let query = self.query();
            let cut = query
                .grapheme_indices(true)
                .next_back()
                .map_or(0, |(i, _)| i);
            let text = query[..cut].to_string();
            self.set_query(text);
        } else if let KeyCode::Char(ch) = key_msg.key {
            if !key_msg.modifiers.contains(KeyModifiers::CONTROL)
                && !key_msg.modifiers.contains(KeyModifiers::ALT)
            {
                let mut text = self.query().to_string();
                text.push(ch);
                self.set_query(text);
            }
        }
    }

    // --- Internals ---

    /// Runs `f` and notifies the listener if anything observable changed.
    fn transition<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.listener.is_some().then(|| self.observed());
        let out = f(self);
        if before.is_some_and(|b| b != self.observed()) {
            if let Some(mut listener) = self.listener.take() {
                listener(&self.snapshot());
                self.listener = Some(listener);
            }
        }
        out
    }

    fn observed(&self) -> Observed {
        Observed {
            query: self.query.get().clone(),
            open: self.open,
            candidates: self.candidates.clone(),
            focused: self.focused_key.clone(),
            selected: self.selection.get().clone(),
            err: self.err.clone(),
            revision: self.revision,
        }
    }

    fn policy(&self) -> FilterPolicy {
        FilterPolicy {
            empty_query: self.options.empty_query,
            trigger: self.options.menu_trigger,
        }
    }

    /// Recomputes the candidates from the effective query and restores the
    /// pointer invariant.
    fn recompute(&mut self) {
        self.candidates = filter_indices(
            &self.items,
            self.query.get(),
            &*self.predicate,
            self.policy(),
        );

        if let Some(key) = &self.focused_key {
            if self.candidate_position(key).is_none() {
                self.focused_key = None;
            }
        }

        if self.open && self.candidates.is_empty() && !self.options.allows_empty_collection {
            self.close_menu(CloseReason::Empty);
        }
    }

    fn query_changed(&mut self) {
        self.run_validation();
        self.recompute();
    }

    fn run_validation(&mut self) {
        self.err = match &self.validate {
            Some(validate) => validate(self.query.get()).err(),
            None => None,
        };
    }

    /// Position within `candidates` of the enabled candidate with `key`.
    fn candidate_position(&self, key: &Key) -> Option<usize> {
        if self.disabled.contains(key) {
            return None;
        }
        self.candidates
            .iter()
            .rposition(|&i| &self.items[i].key == key)
    }

    /// Next enabled candidate position from the pointer in `direction`.
    ///
    /// Candidates sharing the focused key are passed over, otherwise the
    /// pointer would bounce between duplicates.
    fn step(&self, direction: Direction) -> Option<usize> {
        let n = self.candidates.len();
        if n == 0 {
            return None;
        }
        let current = self
            .focused_key
            .as_ref()
            .and_then(|k| self.candidate_position(k));

        (0..n)
            .map(|offset| match (direction, current) {
                (Direction::Next, Some(cur)) => (cur + 1 + offset) % n,
                (Direction::Next, None) => offset,
                (Direction::Previous, Some(cur)) => (cur + n - 1 - offset) % n,
                (Direction::Previous, None) => n - 1 - offset,
            })
            .find(|&pos| {
                let key = &self.items[self.candidates[pos]].key;
                !self.disabled.contains(key) && self.focused_key.as_ref() != Some(key)
            })
            .or(current)
    }

    fn request_query(&mut self, text: String) {
        if text == *self.query.get() {
            return;
        }
        self.events.push(Event::QueryChange(text.clone()));
        if self.query.request(text) {
            self.query_changed();
        }
    }

    fn request_selection(&mut self, key: Option<Key>) {
        self.events.push(Event::SelectionChange(key.clone()));
        self.selection.request(key);
    }

    fn commit(&mut self, pos: usize) {
        let item = &self.items[self.candidates[pos]];
        let key = item.key.clone();
        let text = item.text_value.clone();
        tracing::debug!(id = self.id, key = %key, "combobox commit");

        self.close_pending = false;
        self.request_selection(Some(key));
        self.request_query(text);
        self.close_menu(CloseReason::Commit);
        self.focused_key = None;
    }

    fn open_menu(&mut self, reason: OpenReason) -> bool {
        if self.open {
            return false;
        }
        if self.candidates.is_empty() && !self.options.allows_empty_collection {
            tracing::trace!(id = self.id, ?reason, "not opening an empty menu");
            return false;
        }
        tracing::debug!(id = self.id, ?reason, "combobox menu opened");
        self.open = true;
        self.open_reason = Some(reason);
        self.events.push(Event::OpenChange {
            open: true,
            open_reason: Some(reason),
            close_reason: None,
        });
        true
    }

    fn close_menu(&mut self, reason: CloseReason) -> bool {
        self.close_pending = false;
        if !self.open {
            return false;
        }
        tracing::debug!(id = self.id, ?reason, "combobox menu closed");
        self.open = false;
        self.focused_key = None;
        self.events.push(Event::OpenChange {
            open: false,
            open_reason: None,
            close_reason: Some(reason),
        });
        true
    }

    fn on_blur_close(&mut self, msg: &BlurCloseMsg) {
        if msg.id != self.id || msg.tag != self.blur_tag || !self.close_pending {
            tracing::trace!(id = self.id, tag = msg.tag, "ignoring stale blur close");
            return;
        }
        self.close_menu(CloseReason::Blur);
        self.revert_query();
    }

    /// Without custom values, the query falls back to the selection's text.
    fn revert_query(&mut self) {
        if self.options.allows_custom_value {
            return;
        }
        let text = self
            .selected_item()
            .map(|item| item.text_value.clone())
            .unwrap_or_default();
        self.request_query(text);
    }
}

impl<T> Component for Model<T> {
    fn focus(&mut self) -> Option<Cmd> {
        self.handle_focus();
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.handle_blur()
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

impl<T: Record + Send + 'static> BubbleTeaModel for Model<T> {
    fn init() -> (Self, Option<Cmd>) {
        (Self::new(Vec::new()), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
