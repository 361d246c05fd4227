#![forbid(unsafe_code)]

use cstate::prelude::*;

#[test]
fn prelude_drives_a_field() {
    let sync = Synchronizer::new(
        |value: &u32| format!("{value:03}"),
        |text: &String| text.parse().unwrap_or(0),
    );
    let mut h = FieldHarness::mount(&sync, 7).expect("mount");
    assert_eq!(h.state(), "007");

    h.act(|set| set.set("42".into())).expect("act");
    assert_eq!(h.last_notification(), Some(&42));

    // The parent adopts 42; "42" already represents it.
    h.rerender(42).expect("rerender");
    assert_eq!(h.state(), "42");
    assert_eq!(h.outcomes().last(), Some(&Reconciliation::AlreadySynced));
    assert_eq!(h.notification_count(), 1);
}
