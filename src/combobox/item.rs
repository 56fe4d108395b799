//! Item normalisation: turning arbitrary records into keyed, filterable items.
//!
//! Every candidate shown by the combobox needs two facets: a stable [`Key`]
//! and the text used for filtering and for filling the input on selection.
//! An [`ItemAdapter`] derives both. [`DefaultAdapter`] works for any
//! [`Record`] and walks the usual fallback chain:
//!
//! - key: `key`, then `id`, then the positional index
//! - text: `text_value`, `label`, `value`, `title`, the scalar's own text,
//!   then the key itself
//!
//! ```rust
//! use autocomplete_widgets::combobox::{normalize, DefaultAdapter, MenuItem};
//!
//! let items = vec![
//!     MenuItem::new("Cat").with_id("1"),
//!     MenuItem::new("Dog").with_id("2"),
//! ];
//! let normalized = normalize(items, &DefaultAdapter);
//! assert_eq!(normalized[1].key.as_str(), "2");
//! assert_eq!(normalized[1].text_value, "Dog");
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Stable identity of an item within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Creates a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

/// Fields a candidate record may expose. All of them are optional.
///
/// Structured records implement the named accessors; plain values such as
/// strings and numbers implement [`Record::scalar_text`] instead.
pub trait Record {
    /// Explicit key.
    fn key(&self) -> Option<Key> {
        None
    }
    /// Identifier used when there is no explicit key.
    fn id(&self) -> Option<Key> {
        None
    }
    /// Explicit filter/display text.
    fn text_value(&self) -> Option<String> {
        None
    }
    /// Human-readable label.
    fn label(&self) -> Option<String> {
        None
    }
    /// Underlying value.
    fn value(&self) -> Option<String> {
        None
    }
    /// Title, the last named field consulted.
    fn title(&self) -> Option<String> {
        None
    }
    /// Text of a value that has no named fields at all.
    fn scalar_text(&self) -> Option<String> {
        None
    }
}

impl Record for String {
    fn scalar_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Record for &str {
    fn scalar_text(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

impl Record for char {
    fn scalar_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

macro_rules! scalar_record {
    ($($t:ty),*) => {
        $(
            impl Record for $t {
                fn scalar_text(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

scalar_record!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! map_record {
    ($($map:ident),*) => {
        $(
            impl Record for $map<String, String> {
                fn key(&self) -> Option<Key> {
                    self.get("key").map(|k| Key::new(k.as_str()))
                }
                fn id(&self) -> Option<Key> {
                    self.get("id").map(|k| Key::new(k.as_str()))
                }
                fn text_value(&self) -> Option<String> {
                    self.get("textValue").cloned()
                }
                fn label(&self) -> Option<String> {
                    self.get("label").cloned()
                }
                fn value(&self) -> Option<String> {
                    self.get("value").cloned()
                }
                fn title(&self) -> Option<String> {
                    self.get("title").cloned()
                }
            }
        )*
    };
}

map_record!(BTreeMap, HashMap);

/// A ready-made record for simple menus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItem {
    /// Explicit key.
    pub key: Option<Key>,
    /// Identifier.
    pub id: Option<Key>,
    /// Explicit text value.
    pub text_value: Option<String>,
    /// Label shown to users.
    pub label: Option<String>,
    /// Underlying value.
    pub value: Option<String>,
    /// Title.
    pub title: Option<String>,
}

impl MenuItem {
    /// Creates an item with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Sets the explicit key.
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<Key>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the explicit text value.
    pub fn with_text_value(mut self, text: impl Into<String>) -> Self {
        self.text_value = Some(text.into());
        self
    }

    /// Sets the underlying value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Record for MenuItem {
    fn key(&self) -> Option<Key> {
        self.key.clone()
    }
    fn id(&self) -> Option<Key> {
        self.id.clone()
    }
    fn text_value(&self) -> Option<String> {
        self.text_value.clone()
    }
    fn label(&self) -> Option<String> {
        self.label.clone()
    }
    fn value(&self) -> Option<String> {
        self.value.clone()
    }
    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

/// Strategy deriving the key and text of a record.
pub trait ItemAdapter<T> {
    /// Key for `item`, found at `index` in the source collection.
    fn key(&self, item: &T, index: usize) -> Key;
    /// Filter/display text for `item`, whose key has already been derived.
    fn text_value(&self, item: &T, key: &Key) -> String;
}

/// The documented fallback chain over [`Record`] fields.
///
/// Keys come from `key`, then `id`, then the positional index. Text is the
/// first non-empty of `text_value`, `label`, `value`, `title`, then the
/// record's own text for scalars (strings, chars, integers), and only then
/// the stringified key. Scalars therefore filter on their content rather
/// than their index.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdapter;

impl<T: Record> ItemAdapter<T> for DefaultAdapter {
    fn key(&self, item: &T, index: usize) -> Key {
        let present = |k: &Key| !k.as_str().is_empty();
        item.key()
            .filter(present)
            .or_else(|| item.id().filter(present))
            .unwrap_or_else(|| Key::from(index))
    }

    fn text_value(&self, item: &T, key: &Key) -> String {
        [
            item.text_value(),
            item.label(),
            item.value(),
            item.title(),
            item.scalar_text(),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| key.to_string())
    }
}

/// Adapter built from two closures.
pub struct FnAdapter<K, X> {
    key_fn: K,
    text_fn: X,
}

impl<K, X> FnAdapter<K, X> {
    /// Creates an adapter from a key function and a text function.
    pub fn new(key_fn: K, text_fn: X) -> Self {
        Self { key_fn, text_fn }
    }
}

impl<T, K, X> ItemAdapter<T> for FnAdapter<K, X>
where
    K: Fn(&T, usize) -> Key,
    X: Fn(&T) -> String,
{
    fn key(&self, item: &T, index: usize) -> Key {
        (self.key_fn)(item, index)
    }

    fn text_value(&self, item: &T, _key: &Key) -> String {
        (self.text_fn)(item)
    }
}

/// A normalised candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    /// Stable identity.
    pub key: Key,
    /// Text used for filtering and for filling the input on selection.
    pub text_value: String,
    /// Position in the source collection.
    pub index: usize,
    /// The source record.
    pub record: T,
}

/// Normalises a collection in order.
///
/// Duplicate keys are kept; lookups by key resolve to the last item that
/// carries it.
pub fn normalize<T, A>(items: impl IntoIterator<Item = T>, adapter: &A) -> Vec<Item<T>>
where
    A: ItemAdapter<T> + ?Sized,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let key = adapter.key(&record, index);
            if !seen.insert(key.clone()) {
                tracing::warn!(key = %key, index, "duplicate combobox item key");
            }
            let text_value = adapter.text_value(&record, &key);
            Item {
                key,
                text_value,
                index,
                record,
            }
        })
        .collect()
}

/// Position of the last item with `key`.
pub(crate) fn position_of<T>(items: &[Item<T>], key: &Key) -> Option<usize> {
    items.iter().rposition(|item| &item.key == key)
}
