#![forbid(unsafe_code)]

//! End-to-end tests for a number edited as text, driven through the
//! harness exactly as a UI host would drive it.

use std::cell::RefCell;
use std::rc::Rc;

use cstate_core::{Equality, Reconciliation, SyncOptions, Synchronizer};
use cstate_harness::{FieldHarness, HarnessConfig};

// ============================================================================
// Helpers
// ============================================================================

fn convert(value: &f64) -> String {
    value.to_string()
}

fn invert(text: &String) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

fn number_text() -> Synchronizer<f64, String> {
    Synchronizer::new(convert, invert)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn local_state_follows_parent_value() {
    let mut h = FieldHarness::mount(&number_text(), 1.23).expect("mount");
    assert_eq!(h.state(), "1.23");
    assert_eq!(h.notification_count(), 0);

    h.rerender(0.123).expect("rerender");
    assert_eq!(h.state(), "0.123");
    assert_eq!(h.notification_count(), 1);
    assert_eq!(h.last_notification(), Some(&0.123));
}

#[test]
fn local_edit_is_reported_to_parent() {
    let mut h = FieldHarness::mount(&number_text(), 1.23).expect("mount");
    assert_eq!(h.state(), "1.23");

    h.act(|set| set.set("0.123".into())).expect("act");
    assert_eq!(h.state(), "0.123");
    assert_eq!(h.notification_count(), 1);
    assert_eq!(h.last_notification(), Some(&0.123));
}

#[test]
fn synchronized_edit_is_reported_but_not_rewritten() {
    let mut h = FieldHarness::mount(&number_text(), 1.23).expect("mount");

    h.act(|set| set.set("1.230".into())).expect("act");
    assert_eq!(h.state(), "1.230");
    // Reported even though the parent value is the same.
    assert_eq!(h.notification_count(), 1);
    assert_eq!(h.last_notification(), Some(&1.23));

    h.rerender(1.23).expect("rerender");
    // "1.230" already represents 1.23.
    assert_eq!(h.state(), "1.230");
    assert_eq!(h.notification_count(), 1);
}

#[test]
fn comparators_see_current_then_previous() {
    let value_calls = Rc::new(RefCell::new(Vec::new()));
    let state_calls = Rc::new(RefCell::new(Vec::new()));
    let vc = Rc::clone(&value_calls);
    let sc = Rc::clone(&state_calls);
    let sync = Synchronizer::with_options(
        convert,
        invert,
        SyncOptions::new(
            Equality::new(move |a: &f64, b: &f64| {
                vc.borrow_mut().push((*a, *b));
                a == b
            }),
            Equality::new(move |a: &String, b: &String| {
                sc.borrow_mut().push((a.clone(), b.clone()));
                a == b
            }),
        ),
    );

    let mut h = FieldHarness::mount(&sync, 1.23).expect("mount");
    h.act(|set| set.set("0.123".into())).expect("act");
    assert!(
        state_calls
            .borrow()
            .contains(&("0.123".to_string(), "1.23".to_string()))
    );

    h.rerender(0.123).expect("rerender");
    assert!(value_calls.borrow().contains(&(0.123, 1.23)));
}

#[test]
fn edit_and_value_change_in_one_cycle_prefers_edit() {
    let mut h = FieldHarness::mount(&number_text(), 1.0).expect("mount");
    let set = h.set_state();
    set.set("7".into());
    h.rerender(2.0).expect("rerender");

    assert_eq!(h.state(), "7");
    assert_eq!(h.notifications(), &[7.0]);
    assert_eq!(h.outcomes().last(), Some(&Reconciliation::Notified));
    assert!(!h.outcomes().contains(&Reconciliation::Resynced));
}

#[test]
fn typing_sequence_with_echoing_parent() {
    let config = HarnessConfig::default().with_echo_parent(true);
    let mut h = FieldHarness::mount_with_config(&number_text(), 0.0, config).expect("mount");

    for text in ["1", "1.", "1.5", "1.50", "1.500"] {
        h.act(|set| set.set(text.to_string())).expect("act");
        assert_eq!(h.state(), text);
    }

    assert_eq!(h.value(), &1.5);
    // Every keystroke is reported, including ones that map to the same number.
    assert_eq!(h.notifications(), &[1.0, 1.0, 1.5, 1.5, 1.5]);
}

#[test]
fn parent_reset_overrides_stale_text() {
    let config = HarnessConfig::default().with_echo_parent(true);
    let mut h = FieldHarness::mount_with_config(&number_text(), 3.0, config).expect("mount");
    h.act(|set| set.set("3.00".into())).expect("act");
    assert_eq!(h.state(), "3.00");

    h.rerender(0.0).expect("rerender");
    assert_eq!(h.state(), "0");
    assert_eq!(h.value(), &0.0);
}

#[test]
fn updater_appends_to_current_text() {
    let mut h = FieldHarness::mount(&number_text(), 4.0).expect("mount");
    h.act(|set| set.update(|text| format!("{text}.25"))).expect("act");
    assert_eq!(h.state(), "4.25");
    assert_eq!(h.last_notification(), Some(&4.25));
}

#[test]
fn cleared_field_stays_cleared_when_parent_adopts_nan() {
    let mut h = FieldHarness::mount(&number_text(), 1.0).expect("mount");
    h.act(|set| set.set(String::new())).expect("act");
    assert!(h.last_notification().is_some_and(|v| v.is_nan()));

    // The parent stores the reported NaN and re-renders, twice.
    h.rerender(f64::NAN).expect("rerender");
    h.rerender(f64::NAN).expect("rerender");
    assert_eq!(h.state(), "");
    assert_eq!(h.notification_count(), 1);
    assert!(!h.outcomes().contains(&Reconciliation::Resynced));
}

// ============================================================================
// Mount
// ============================================================================

#[test]
fn mount_at_nan_is_quiet() {
    let mut h = FieldHarness::mount(&number_text(), f64::NAN).expect("mount");
    assert_eq!(h.state(), "NaN");
    assert_eq!(h.outcomes(), &[Reconciliation::Unchanged]);

    h.rerender(f64::NAN).expect("rerender");
    assert_eq!(h.notification_count(), 0);
    assert_eq!(h.state(), "NaN");
}

#[test]
fn mount_never_notifies_even_with_always_different_state() {
    let sync = Synchronizer::with_options(
        convert,
        invert,
        SyncOptions::default().with_equal_state(Equality::always_different()),
    );
    let h = FieldHarness::mount(&sync, 2.0).expect("mount");
    assert_eq!(h.cycles(), 1);
    assert_eq!(h.outcomes(), &[Reconciliation::Unchanged]);
    assert_eq!(h.notification_count(), 0);
    assert!(h.field().is_mounted());
}
