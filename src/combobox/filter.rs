//! Filter engine: computes the visible candidate subset for a query.
//!
//! Filtering is stable. Matched items keep their original relative order and
//! are never re-ranked by match quality, so the list does not jump around
//! while the user types.

use super::item::Item;
use super::types::MenuTrigger;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Match predicate: `(text_value, query) -> matched`.
pub type MatchFn = Box<dyn Fn(&str, &str) -> bool + Send>;

/// Case-insensitive substring containment. The default predicate.
pub fn contains_ignore_case(text: &str, query: &str) -> bool {
    text.to_lowercase().contains(&query.to_lowercase())
}

/// Case-insensitive prefix match, like inline suggestions.
pub fn starts_with_ignore_case(text: &str, query: &str) -> bool {
    text.to_lowercase().starts_with(&query.to_lowercase())
}

/// Fuzzy subsequence matching using the skim algorithm.
///
/// ```rust
/// use autocomplete_widgets::combobox::fuzzy;
///
/// let pred = fuzzy();
/// assert!(pred("United Kingdom", "ukdm"));
/// assert!(!pred("France", "xyz"));
/// ```
pub fn fuzzy() -> MatchFn {
    let matcher = SkimMatcherV2::default().ignore_case();
    Box::new(move |text, query| matcher.fuzzy_match(text, query).is_some())
}

/// What an empty (or whitespace-only) query shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyQuery {
    /// Show nothing in `Input` trigger mode, everything otherwise.
    #[default]
    Auto,
    /// Show the full collection.
    ShowAll,
    /// Show nothing.
    ShowNone,
}

impl From<bool> for EmptyQuery {
    fn from(allows_empty_query_results: bool) -> Self {
        if allows_empty_query_results {
            EmptyQuery::ShowAll
        } else {
            EmptyQuery::ShowNone
        }
    }
}

/// Inputs to the filter besides the items and the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterPolicy {
    /// Behaviour for an empty query.
    pub empty_query: EmptyQuery,
    /// How the menu gets opened.
    pub trigger: MenuTrigger,
}

impl FilterPolicy {
    /// Whether an empty query yields the full collection under this policy.
    pub fn shows_all_when_empty(&self) -> bool {
        if self.trigger == MenuTrigger::Focus {
            return true;
        }
        match self.empty_query {
            EmptyQuery::ShowAll => true,
            EmptyQuery::ShowNone => false,
            EmptyQuery::Auto => self.trigger != MenuTrigger::Input,
        }
    }
}

/// Indices of the items visible for `query`, in original order.
pub fn filter_indices<T>(
    items: &[Item<T>],
    query: &str,
    predicate: &dyn Fn(&str, &str) -> bool,
    policy: FilterPolicy,
) -> Vec<usize> {
    if query.trim().is_empty() {
        return if policy.shows_all_when_empty() {
            (0..items.len()).collect()
        } else {
            Vec::new()
        };
    }

    items
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(&item.text_value, query))
        .map(|(i, _)| i)
        .collect()
}

/// The items visible for `query`, in original order.
pub fn filter<'a, T>(
    items: &'a [Item<T>],
    query: &str,
    predicate: &dyn Fn(&str, &str) -> bool,
    policy: FilterPolicy,
) -> Vec<&'a Item<T>> {
    filter_indices(items, query, predicate, policy)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combobox::item::{normalize, DefaultAdapter};

    fn items(labels: &[&'static str]) -> Vec<Item<&'static str>> {
        normalize(labels.iter().copied(), &DefaultAdapter)
    }

    fn texts(found: Vec<&Item<&'static str>>) -> Vec<String> {
        found.into_iter().map(|i| i.text_value.clone()).collect()
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        assert!(contains_ignore_case("Dog", "o"));
        assert!(contains_ignore_case("Dog", "DO"));
        assert!(!contains_ignore_case("Cat", "o"));
        assert!(starts_with_ignore_case("Apple", "ap"));
        assert!(!starts_with_ignore_case("Apple", "pl"));
    }

    #[test]
    fn test_filter_preserves_order() {
        let all = items(&["banana", "apple", "cranberry", "grape"]);
        let policy = FilterPolicy::default();
        let found = filter(&all, "an", &contains_ignore_case, policy);
        assert_eq!(texts(found), vec!["banana", "cranberry"]);

        let found = filter(&all, "a", &contains_ignore_case, policy);
        assert_eq!(texts(found), vec!["banana", "apple", "cranberry", "grape"]);
    }

    #[test]
    fn test_empty_query_policy() {
        let all = items(&["a", "b"]);
        let pred = &contains_ignore_case;

        let input_auto = FilterPolicy {
            empty_query: EmptyQuery::Auto,
            trigger: MenuTrigger::Input,
        };
        assert!(filter_indices(&all, "", pred, input_auto).is_empty());
        assert!(filter_indices(&all, "   ", pred, input_auto).is_empty());

        let manual_auto = FilterPolicy {
            trigger: MenuTrigger::Manual,
            ..input_auto
        };
        assert_eq!(filter_indices(&all, "", pred, manual_auto), vec![0, 1]);

        let input_all = FilterPolicy {
            empty_query: EmptyQuery::ShowAll,
            trigger: MenuTrigger::Input,
        };
        assert_eq!(filter_indices(&all, "", pred, input_all), vec![0, 1]);

        let manual_none = FilterPolicy {
            empty_query: EmptyQuery::ShowNone,
            trigger: MenuTrigger::Manual,
        };
        assert!(filter_indices(&all, "", pred, manual_none).is_empty());

        // Focus-triggered menus always show everything before typing.
        let focus_none = FilterPolicy {
            empty_query: EmptyQuery::ShowNone,
            trigger: MenuTrigger::Focus,
        };
        assert_eq!(filter_indices(&all, "", pred, focus_none), vec![0, 1]);
    }

    #[test]
    fn test_custom_and_fuzzy_predicates() {
        let all = items(&["United States", "United Kingdom", "Uganda"]);
        let policy = FilterPolicy::default();

        let exact = |text: &str, query: &str| text == query;
        assert_eq!(filter_indices(&all, "Uganda", &exact, policy), vec![2]);

        let fz = fuzzy();
        assert_eq!(filter_indices(&all, "unk", &*fz, policy), vec![1]);
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(EmptyQuery::from(true), EmptyQuery::ShowAll);
        assert_eq!(EmptyQuery::from(false), EmptyQuery::ShowNone);
    }
}
