//! State machine tests for the combobox component.

use super::*;
use crate::Component;
use bubbletea_rs::{KeyMsg, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn pets() -> Model<MenuItem> {
    Model::new(vec![
        MenuItem::new("Cat").with_id("1"),
        MenuItem::new("Dog").with_id("2"),
    ])
}

fn abc() -> Model<MenuItem> {
    Model::new(vec![
        MenuItem::new("Alpha").with_id("a"),
        MenuItem::new("Bravo").with_id("b"),
        MenuItem::new("Charlie").with_id("c"),
    ])
    .with_options(Options::default().with_menu_trigger(MenuTrigger::Manual))
}

fn candidate_keys<T>(m: &Model<T>) -> Vec<String> {
    m.candidates().iter().map(|i| i.key.to_string()).collect()
}

fn focused<T>(m: &Model<T>) -> Option<String> {
    m.focused_key().map(|k| k.to_string())
}

fn selected<T>(m: &Model<T>) -> Option<String> {
    m.selected_key().map(|k| k.to_string())
}

fn assert_pointer_contained<T>(m: &Model<T>) {
    if let Some(key) = m.focused_key() {
        assert!(
            m.candidates().iter().any(|i| &i.key == key),
            "focused key {} is not a candidate",
            key
        );
    }
}

fn close_events(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::OpenChange { open: false, .. }))
        .count()
}

fn blur_close_for<T>(m: &Model<T>) -> Msg {
    Box::new(BlurCloseMsg {
        id: m.id(),
        tag: m.blur_tag,
    }) as Msg
}

fn listener<F>(f: F) -> Listener<MenuItem>
where
    F: FnMut(&Snapshot<'_, MenuItem>) + Send + 'static,
{
    Box::new(f)
}

fn key(code: KeyCode) -> Msg {
    Box::new(KeyMsg {
        key: code,
        modifiers: KeyModifiers::NONE,
    }) as Msg
}

#[test]
fn test_end_to_end_input_mode() {
    let mut m = pets();

    m.set_query("");
    assert!(!m.is_open());
    assert!(m.candidates().is_empty());

    m.set_query("o");
    assert!(m.is_open());
    assert_eq!(candidate_keys(&m), vec!["2"]);
    assert_eq!(m.menu_trigger(), Some(OpenReason::Input));

    m.focus_navigate(Direction::Next);
    assert_eq!(focused(&m), Some("2".to_string()));

    m.commit_focused();
    assert_eq!(selected(&m), Some("2".to_string()));
    assert_eq!(m.query(), "Dog");
    assert!(!m.is_open());
    assert_eq!(m.focused_key(), None);

    let events = m.drain_events();
    assert!(events.contains(&Event::SelectionChange(Some(Key::from("2")))));
    assert!(events.contains(&Event::OpenChange {
        open: false,
        open_reason: None,
        close_reason: Some(CloseReason::Commit),
    }));
}

#[test]
fn test_open_and_close_are_idempotent() {
    let mut m = abc();

    m.request_close(CloseReason::Escape);
    assert!(m.drain_events().is_empty());
    assert!(!m.is_open());

    m.request_open(OpenReason::Manual);
    assert!(m.is_open());
    assert_eq!(m.drain_events().len(), 1);

    m.focus_navigate(Direction::Next);
    m.request_open(OpenReason::Manual);
    assert!(m.drain_events().is_empty());
    assert_eq!(focused(&m), Some("a".to_string()));

    m.request_close(CloseReason::Programmatic);
    assert_eq!(m.drain_events().len(), 1);
    m.request_close(CloseReason::Programmatic);
    assert!(m.drain_events().is_empty());
}

#[test]
fn test_navigation_wraps_around() {
    let mut m = abc();
    m.request_open(OpenReason::Manual);
    assert_eq!(candidate_keys(&m), vec!["a", "b", "c"]);

    let mut seen = Vec::new();
    for _ in 0..4 {
        m.focus_navigate(Direction::Next);
        seen.push(focused(&m).unwrap_or_default());
    }
    assert_eq!(seen, vec!["a", "b", "c", "a"]);

    m.focus_navigate(Direction::Previous);
    assert_eq!(focused(&m), Some("c".to_string()));
}

#[test]
fn test_navigation_passes_duplicate_keys() {
    let mut m = Model::new(vec![
        MenuItem::new("first").with_id("x"),
        MenuItem::new("mid").with_id("y"),
        MenuItem::new("second").with_id("x"),
    ])
    .with_options(Options::default().with_menu_trigger(MenuTrigger::Manual));
    m.request_open(OpenReason::Manual);

    let mut seen = Vec::new();
    for _ in 0..4 {
        m.focus_navigate(Direction::Next);
        seen.push(focused(&m).unwrap_or_default());
    }
    assert_eq!(seen, vec!["x", "y", "x", "y"]);

    m.focus_navigate(Direction::Previous);
    assert_eq!(focused(&m), Some("x".to_string()));
}

#[test]
fn test_single_candidate_keeps_pointer() {
    let mut m = pets();
    m.set_query("o");
    m.focus_navigate(Direction::Next);
    m.focus_navigate(Direction::Next);
    assert_eq!(focused(&m), Some("2".to_string()));
    m.focus_navigate(Direction::Previous);
    assert_eq!(focused(&m), Some("2".to_string()));
}

#[test]
fn test_previous_without_focus_picks_last() {
    let mut m = abc();
    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Previous);
    assert_eq!(focused(&m), Some("c".to_string()));
    m.focus_navigate(Direction::Previous);
    assert_eq!(focused(&m), Some("b".to_string()));
}

#[test]
fn test_navigation_on_closed_menu_only_opens() {
    let mut m = abc();
    m.focus_navigate(Direction::Next);
    assert!(m.is_open());
    assert_eq!(m.focused_key(), None);
    assert_eq!(m.menu_trigger(), Some(OpenReason::Manual));
}

#[test]
fn test_navigation_on_empty_candidates_is_a_noop() {
    let mut m = abc();
    m.set_query("zzz");
    m.request_open(OpenReason::Manual);
    assert!(m.is_open());
    assert!(m.candidates().is_empty());

    m.focus_navigate(Direction::Next);
    m.focus_navigate(Direction::Previous);
    assert_eq!(m.focused_key(), None);
}

#[test]
fn test_commit_without_focus_or_when_closed_is_a_noop() {
    let mut m = abc();
    m.commit_focused();
    assert_eq!(m.selected_key(), None);

    m.request_open(OpenReason::Manual);
    m.drain_events();
    m.commit_focused();
    assert_eq!(m.selected_key(), None);
    assert!(m.is_open());
    assert!(m.drain_events().is_empty());
}

#[test]
fn test_close_clears_pointer() {
    let mut m = abc();
    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Next);
    m.request_close(CloseReason::ClickOutside);
    assert_eq!(m.focused_key(), None);
}

#[test]
fn test_filtering_drops_pointer_outside_candidates() {
    let mut m = abc();
    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Next); // Alpha
    m.set_query("ar");
    assert_eq!(candidate_keys(&m), vec!["c"]);
    assert_eq!(m.focused_key(), None);

    m.focus_navigate(Direction::Next);
    m.set_query("arl");
    assert_eq!(focused(&m), Some("c".to_string()));
}

#[test]
fn test_pointer_stays_contained_through_interaction() {
    let mut m = abc();
    let queries = ["", "a", "al", "", "r", "z", "", "c"];
    for (i, q) in queries.iter().enumerate() {
        m.set_query(*q);
        assert_pointer_contained(&m);
        m.focus_navigate(if i % 2 == 0 {
            Direction::Next
        } else {
            Direction::Previous
        });
        assert_pointer_contained(&m);
        m.focus_navigate(Direction::Next);
        assert_pointer_contained(&m);
        if i % 3 == 0 {
            m.request_close(CloseReason::Escape);
            assert_pointer_contained(&m);
        }
    }
}

#[test]
fn test_select_by_key_requires_visible_candidate() {
    let mut m = pets();
    m.set_query("o");
    m.select_by_key(&Key::from("1"));
    assert_eq!(m.selected_key(), None);
    assert!(m.is_open());

    m.select_by_key(&Key::from("missing"));
    assert_eq!(m.selected_key(), None);

    m.select_by_key(&Key::from("2"));
    assert_eq!(selected(&m), Some("2".to_string()));
    assert_eq!(m.query(), "Dog");
    assert!(!m.is_open());
}

#[test]
fn test_blur_grace_cancelled_by_selection() {
    let mut m = pets();
    let _ = m.focus();
    m.set_query("o");
    assert!(m.is_open());

    let cmd = m.handle_blur();
    assert!(cmd.is_some());
    assert!(m.is_close_pending());
    assert!(m.is_open());

    m.select_by_key(&Key::from("2"));
    assert!(!m.is_close_pending());
    assert!(!m.is_open());
    assert_eq!(selected(&m), Some("2".to_string()));
    let events = m.drain_events();
    assert_eq!(close_events(&events), 1);

    // The grace period elapses after the commit.
    m.update(blur_close_for(&m));
    assert!(!m.is_open());
    assert_eq!(selected(&m), Some("2".to_string()));
    assert_eq!(m.query(), "Dog");
    assert!(m.drain_events().is_empty());
}

#[test]
fn test_blur_grace_cancelled_by_refocus() {
    let mut m = pets();
    m.set_query("o");
    let _ = m.handle_blur();
    m.handle_focus();
    assert!(!m.is_close_pending());

    m.update(blur_close_for(&m));
    assert!(m.is_open());
}

#[test]
fn test_blur_close_fires_after_grace() {
    let mut m = pets();
    m.set_query("o");
    let _ = m.handle_blur();
    m.drain_events();

    m.update(blur_close_for(&m));
    assert!(!m.is_open());
    let events = m.drain_events();
    assert!(events.contains(&Event::OpenChange {
        open: false,
        open_reason: None,
        close_reason: Some(CloseReason::Blur),
    }));
    // Nothing was selected, so the free text is dropped.
    assert_eq!(m.query(), "");
}

#[test]
fn test_blur_close_keeps_custom_value() {
    let mut m = pets().with_options(Options::default().with_allows_custom_value(true));
    m.set_query("Doge");
    let _ = m.handle_blur();
    m.update(blur_close_for(&m));
    assert!(!m.is_open());
    assert_eq!(m.query(), "Doge");
}

#[test]
fn test_close_cancels_pending_blur_before_reopen() {
    let mut m = pets();
    m.set_query("o");
    let _ = m.handle_blur();
    let stale = blur_close_for(&m);

    m.request_close(CloseReason::Escape);
    assert!(!m.is_close_pending());
    m.focus_navigate(Direction::Next);
    assert!(m.is_open());
    m.drain_events();

    m.update(stale);
    assert!(m.is_open());
    assert!(m.drain_events().is_empty());
}

#[test]
fn test_only_latest_blur_schedule_counts() {
    let mut m = pets();
    m.set_query("o");
    let _ = m.handle_blur();
    let first = blur_close_for(&m);
    m.handle_focus();
    let _ = m.handle_blur();

    m.update(first);
    assert!(m.is_open());

    m.update(blur_close_for(&m));
    assert!(!m.is_open());
}

#[test]
fn test_blur_close_for_other_combobox_is_ignored() {
    let mut a = pets();
    let mut b = pets();
    a.set_query("o");
    b.set_query("o");
    let _ = a.handle_blur();
    let _ = b.handle_blur();

    a.update(blur_close_for(&b));
    assert!(a.is_open());
    assert!(a.is_close_pending());
}

#[test]
fn test_blur_without_close_on_blur() {
    let mut m = pets().with_options(Options::default().with_should_close_on_blur(false));
    m.set_query("o");
    assert!(m.handle_blur().is_none());
    assert!(m.is_open());
    assert!(!m.is_close_pending());
}

#[test]
fn test_blur_on_closed_menu_reverts_free_text() {
    let mut m = pets().with_default_selected("1");
    assert_eq!(m.query(), "Cat");

    m.set_query("Cats");
    m.request_close(CloseReason::Escape);
    assert!(m.handle_blur().is_none());
    // Typing cleared the selection, so the input empties.
    assert_eq!(m.selected_key(), None);
    assert_eq!(m.query(), "");
}

#[test]
fn test_controlled_query_waits_for_echo() {
    let mut m = Model::new(vec!["ab", "abc", "abd"]).with_query_prop("ab");
    assert!(m.is_query_controlled());
    m.request_open(OpenReason::Manual);
    m.drain_events();

    m.set_query("abc");
    assert_eq!(m.query(), "ab");
    assert_eq!(m.candidates().len(), 3);
    assert_eq!(m.drain_events(), vec![Event::QueryChange("abc".to_string())]);

    m.set_query_prop(Some("abc".to_string()));
    assert_eq!(m.query(), "abc");
    assert_eq!(candidate_keys(&m), vec!["1"]);
}

#[test]
fn test_controlled_pointer_follows_effective_query() {
    let mut m = Model::new(vec!["ab", "abc", "abd"]).with_query_prop("ab");
    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Next); // "ab"

    m.set_query("abd");
    assert_eq!(focused(&m), Some("0".to_string()));

    m.set_query_prop(Some("abd".to_string()));
    assert_eq!(m.focused_key(), None);
    assert_pointer_contained(&m);
}

#[test]
fn test_releasing_control_keeps_value() {
    let mut m = Model::new(vec!["ab", "abc"]).with_query_prop("ab");
    m.set_query_prop(None);
    assert!(!m.is_query_controlled());
    assert_eq!(m.query(), "ab");
    m.set_query("abc");
    assert_eq!(m.query(), "abc");
}

#[test]
fn test_selection_cleared_when_text_no_longer_matches() {
    let mut m = pets();
    m.set_query("Ca");
    m.select_by_key(&Key::from("1"));
    assert_eq!(selected(&m), Some("1".to_string()));
    m.drain_events();

    m.set_query("Do");
    assert_eq!(m.selected_key(), None);
    assert!(m
        .drain_events()
        .contains(&Event::SelectionChange(None)));
}

#[test]
fn test_selection_kept_with_custom_values() {
    let mut m = pets().with_options(Options::default().with_allows_custom_value(true));
    m.set_query("Ca");
    m.select_by_key(&Key::from("1"));
    m.set_query("Do");
    assert_eq!(selected(&m), Some("1".to_string()));
}

#[test]
fn test_controlled_selection() {
    let mut m = pets().with_selected_prop(None);
    m.set_query("o");
    m.focus_navigate(Direction::Next);
    m.commit_focused();

    // Waiting on the host.
    assert_eq!(m.selected_key(), None);
    assert!(m
        .drain_events()
        .contains(&Event::SelectionChange(Some(Key::from("2")))));

    m.set_selected_prop(Some(Some(Key::from("2"))));
    assert_eq!(selected(&m), Some("2".to_string()));

    // Host picks another item; the uncontrolled query follows.
    m.set_selected_prop(Some(Some(Key::from("1"))));
    assert_eq!(m.query(), "Cat");
}

#[test]
fn test_clear() {
    let mut m = pets();
    m.set_query("o");
    m.select_by_key(&Key::from("2"));
    m.drain_events();

    m.clear();
    assert_eq!(m.query(), "");
    assert_eq!(m.selected_key(), None);
    let events = m.drain_events();
    assert!(events.contains(&Event::SelectionChange(None)));
    assert!(events.contains(&Event::Cleared));
    assert!(events.contains(&Event::RequestFocus));
    assert!(events.contains(&Event::QueryChange(String::new())));
}

#[test]
fn test_clear_after_blur_still_closes() {
    let mut m = pets();
    m.set_query("o");
    let _ = m.handle_blur();

    m.clear();
    assert!(m.is_close_pending());
    assert!(m.is_open());

    m.update(blur_close_for(&m));
    assert!(!m.is_open());
    assert_eq!(m.query(), "");
}

#[test]
fn test_focus_trigger_opens_with_all_items() {
    let mut m = pets().with_options(Options::default().with_menu_trigger(MenuTrigger::Focus));
    assert_eq!(candidate_keys(&m), vec!["1", "2"]);
    assert!(!m.is_open());

    m.handle_focus();
    assert!(m.is_open());
    assert_eq!(m.menu_trigger(), Some(OpenReason::Focus));

    // Typing does not re-open through input in focus mode.
    m.request_close(CloseReason::Escape);
    m.set_query("c");
    assert!(!m.is_open());
}

#[test]
fn test_input_trigger_with_empty_query_showing_all() {
    let m = pets().with_options(Options::default().with_empty_query(true));
    assert_eq!(candidate_keys(&m), vec!["1", "2"]);
}

#[test]
fn test_empty_collection_not_allowed() {
    let mut m = pets().with_options(Options::default().with_allows_empty_collection(false));
    m.set_query("zzz");
    assert!(!m.is_open());

    m.set_query("o");
    assert!(m.is_open());
    m.drain_events();

    m.set_query("oz");
    assert!(!m.is_open());
    assert!(m.drain_events().contains(&Event::OpenChange {
        open: false,
        open_reason: None,
        close_reason: Some(CloseReason::Empty),
    }));

    m.focus_navigate(Direction::Next);
    assert!(!m.is_open());
}

#[test]
fn test_disabled_keys_are_skipped() {
    let mut m = abc().with_disabled_keys(vec![Key::from("b")]);
    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Next);
    m.focus_navigate(Direction::Next);
    assert_eq!(focused(&m), Some("c".to_string()));
    m.focus_navigate(Direction::Next);
    assert_eq!(focused(&m), Some("a".to_string()));

    m.select_by_key(&Key::from("b"));
    assert_eq!(m.selected_key(), None);
    assert!(m.is_disabled(&Key::from("b")));

    m.set_disabled_keys(vec![Key::from("a"), Key::from("b"), Key::from("c")]);
    assert_eq!(m.focused_key(), None);
    m.focus_navigate(Direction::Next);
    assert_eq!(m.focused_key(), None);
}

#[test]
fn test_set_items_recomputes() {
    let mut m = abc();
    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Previous); // Charlie
    m.set_items(vec![
        MenuItem::new("Alpha").with_id("a"),
        MenuItem::new("Delta").with_id("d"),
    ]);
    assert_eq!(candidate_keys(&m), vec!["a", "d"]);
    assert_eq!(m.focused_key(), None);
    assert_eq!(m.items().len(), 2);
}

#[test]
fn test_validation_is_reported_not_enforced() {
    let mut m = pets();
    m.set_validate(Box::new(|s: &str| {
        if s.len() <= 3 {
            Ok(())
        } else {
            Err("too long".to_string())
        }
    }));
    assert_eq!(m.err(), None);

    m.set_query("Dogs");
    assert_eq!(m.err(), Some("too long"));
    assert!(m.is_open());
    assert_eq!(m.snapshot().err, Some("too long"));

    m.set_query("Do");
    assert_eq!(m.err(), None);
}

#[test]
fn test_listener_sees_transitions_only() {
    let seen: Arc<Mutex<Vec<(String, bool)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut m = pets();
    m.subscribe(listener(move |s| {
        if let Ok(mut v) = sink.lock() {
            v.push((s.query.to_string(), s.is_open));
        }
    }));

    m.request_close(CloseReason::Escape); // no-op
    m.set_query("o");
    m.request_open(OpenReason::Manual); // no-op
    m.focus_navigate(Direction::Next);
    m.commit_focused();

    let v = seen.lock().map(|v| v.clone()).unwrap_or_default();
    assert_eq!(
        v,
        vec![
            ("o".to_string(), true),
            ("o".to_string(), true),
            ("Dog".to_string(), false),
        ]
    );
}

#[test]
fn test_fuzzy_predicate() {
    let mut m = Model::new(vec!["United States", "United Kingdom", "France"])
        .with_predicate(fuzzy());
    m.set_query("ukd");
    assert_eq!(candidate_keys(&m), vec!["1"]);
}

#[test]
fn test_key_handling() {
    let mut m = pets();
    let _ = m.focus();

    m.update(key(KeyCode::Char('o')));
    assert_eq!(m.query(), "o");
    assert!(m.is_open());

    m.update(key(KeyCode::Down));
    assert_eq!(focused(&m), Some("2".to_string()));

    m.update(key(KeyCode::Enter));
    assert_eq!(selected(&m), Some("2".to_string()));
    assert_eq!(m.query(), "Dog");

    m.update(key(KeyCode::Backspace));
    assert_eq!(m.query(), "Do");
    assert_eq!(m.selected_key(), None);

    m.update(key(KeyCode::Esc));
    assert!(!m.is_open());

    m.update(key(KeyCode::Up));
    assert!(m.is_open());
    m.update(key(KeyCode::Tab));
    assert!(!m.is_open());

    m.update(key(KeyCode::Down));
    assert!(m.is_open());
    m.update(Box::new(KeyMsg {
        key: KeyCode::BackTab,
        modifiers: KeyModifiers::SHIFT,
    }) as Msg);
    assert!(!m.is_open());
    assert!(m.drain_events().contains(&Event::OpenChange {
        open: false,
        open_reason: None,
        close_reason: Some(CloseReason::Tab),
    }));

    m.update(Box::new(KeyMsg {
        key: KeyCode::Char('u'),
        modifiers: KeyModifiers::CONTROL,
    }) as Msg);
    assert_eq!(m.query(), "");
    assert!(m.drain_events().contains(&Event::Cleared));
}

#[test]
fn test_backspace_removes_whole_grapheme() {
    let mut m = Model::new(vec!["café"]).with_default_query("cafe\u{301}");
    let _ = m.focus();
    m.update(key(KeyCode::Backspace));
    assert_eq!(m.query(), "caf");
}

#[test]
fn test_keys_ignored_without_focus() {
    let mut m = pets();
    m.update(key(KeyCode::Char('o')));
    assert_eq!(m.query(), "");
    assert!(!m.is_open());
}

#[test]
fn test_view_lists_candidates_when_open() {
    let mut m = abc();
    m.placeholder = "Pick one".to_string();
    let closed = strip_ansi_escapes::strip_str(m.view());
    assert!(closed.contains("Pick one"));
    assert!(!closed.contains("Alpha"));

    m.request_open(OpenReason::Manual);
    m.focus_navigate(Direction::Next);
    let open = strip_ansi_escapes::strip_str(m.view());
    assert!(open.contains("› Alpha"));
    assert!(open.contains("Bravo"));
    assert!(open.contains("Charlie"));

    m.set_query("zzz");
    let empty = strip_ansi_escapes::strip_str(m.view());
    assert!(empty.contains(view::NO_RESULTS));
}

#[test]
fn test_view_truncates_to_width() {
    let mut m = Model::new(vec!["A very long candidate name"])
        .with_options(Options::default().with_menu_trigger(MenuTrigger::Focus));
    m.width = 10;
    m.handle_focus();
    let out = strip_ansi_escapes::strip_str(m.view());
    assert!(out.contains(view::ELLIPSIS));
    assert!(!out.contains("candidate"));
}

#[tokio::test]
async fn test_blur_command_delivers_close_message() {
    let mut m = pets().with_options(Options::default().with_blur_grace(Duration::from_millis(5)));
    m.set_query("o");
    let cmd = m.handle_blur().expect("open menu schedules a close");

    let msg = cmd.await.expect("tick produces a message");
    assert!(msg.downcast_ref::<BlurCloseMsg>().is_some());
    m.update(msg);
    assert!(!m.is_open());
}
