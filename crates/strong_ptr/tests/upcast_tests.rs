use std::{cell::Cell, collections::BTreeSet};
use strong_ptr::{Strong, Weak, make_strong, upcast};
use strong_ptr_test_utils::{DropLog, Named};

struct Base {
    data0: Cell<i32>,
    _name: Named,
}

struct Derived {
    _name: Named,
    base: Base,
    data2: i32,
}

trait Speak {
    fn speak(&self) -> String;
}

impl Speak for Derived {
    fn speak(&self) -> String {
        format!("derived {}", self.data2)
    }
}

upcast!(Derived => Base, base);
upcast!(Derived => dyn Speak);

fn make_derived(log: &DropLog) -> Derived {
    Derived {
        _name: log.named("Derived"),
        base: Base {
            data0: Cell::new(0),
            _name: log.named("Base"),
        },
        data2: 3,
    }
}

fn increment(base: &Base) {
    base.data0.set(base.data0.get() + 1);
}

#[test]
fn base_views_share_ownership_and_destroy_the_derived_value() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));
    let base: Strong<Base> = Strong::from_strong(&derived);

    assert_eq!(Strong::use_count(&base), 2);
    assert_eq!(Strong::weak_count(&base), 0);

    increment(&base);
    assert_eq!(derived.base.data0.get(), 1);

    drop(derived);
    assert!(log.is_empty());
    assert_eq!(Strong::use_count(&base), 1);

    drop(base);
    assert_eq!(log.entries(), ["Derived", "Base"]);
}

#[test]
fn upcast_keeps_the_handles_ownership() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));
    let speaker: Strong<dyn Speak> = Strong::upcast(derived);

    assert_eq!(Strong::use_count(&speaker), 1);
    assert_eq!(speaker.speak(), "derived 3");

    drop(speaker);
    assert_eq!(log.entries(), ["Derived", "Base"]);
}

#[test]
fn trait_object_views_of_the_same_payload_are_equal() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));
    let a: Strong<dyn Speak> = Strong::from_strong(&derived);
    let b: Strong<dyn Speak> = Strong::from_strong(&derived);

    assert_eq!(a, b);
    assert_eq!(a, derived);
    assert_eq!(Strong::use_count(&derived), 3);
}

#[test]
fn make_strong_macro_coerces_the_payload() {
    let log = DropLog::new();
    let speaker: Strong<dyn Speak> = make_strong!(make_derived(&log));

    assert_eq!(speaker.speak(), "derived 3");
    drop(speaker);
    assert_eq!(log.entries(), ["Derived", "Base"]);
}

#[test]
fn weak_base_views() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));

    let weak_base: Weak<Base> = Weak::from_strong(&derived);
    let weak_derived = Strong::downgrade(&derived);
    let weak_again: Weak<Base> = Weak::from_weak(&weak_derived);

    increment(&weak_base.lock());
    increment(&weak_again.lock());
    assert_eq!(derived.base.data0.get(), 2);
    assert_eq!(Strong::weak_count(&derived), 3);
    assert_eq!(weak_base, weak_again);

    let mut assigned = Weak::<Base>::new();
    assigned.assign_strong(&derived);
    // Already observing the same payload, so the counts are untouched
    assigned.assign_weak(&weak_derived);
    assert_eq!(Strong::weak_count(&derived), 4);

    drop(derived);
    assert_eq!(log.entries(), ["Derived", "Base"]);
    assert!(weak_base.is_expired());
    assert!(weak_again.is_expired());
    assert!(assigned.is_expired());

    // Views of an expired payload can still be made
    let late: Weak<Base> = Weak::from_weak(&weak_derived);
    assert!(late.is_expired());
    assert!(Strong::is_empty(&late.lock()));
}

#[test]
fn strong_base_views_from_weak_handles() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));
    let weak = Strong::downgrade(&derived);

    let base: Strong<Base> = Strong::from_weak(&weak);
    let mut assigned = Strong::<Base>::empty();
    Strong::assign_weak(&mut assigned, &weak);
    Strong::assign_strong(&mut assigned, &derived);
    assert_eq!(Strong::use_count(&derived), 3);

    increment(&base);
    increment(&assigned);
    assert_eq!(derived.base.data0.get(), 2);

    drop((derived, base, assigned));
    assert!(weak.is_expired());
    assert_eq!(log.entries(), ["Derived", "Base"]);

    let revived: Strong<Base> = Strong::from_weak(&weak);
    assert!(Strong::is_empty(&revived));
}

#[test]
fn weak_handles_can_be_upcast() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));
    let weak: Weak<dyn Speak> = Strong::downgrade(&derived).upcast();

    assert_eq!(weak.lock().speak(), "derived 3");
    assert_eq!(weak.weak_count(), 1);

    drop(derived);
    assert!(weak.is_expired());
    assert!(matches!(weak.upgrade(), Err(strong_ptr::Error::Expired)));
}

#[test]
fn the_last_handle_destroys_through_any_view() {
    let log = DropLog::new();
    let derived = Strong::new(make_derived(&log));
    let base: Strong<Base> = Strong::from_strong(&derived);
    let speaker: Strong<dyn Speak> = Strong::from_strong(&derived);

    drop(derived);
    drop(speaker);
    assert!(log.is_empty());

    // Only the base view remains, but the whole derived value is destroyed
    drop(base);
    assert_eq!(log.entries(), ["Derived", "Base"]);
}

struct Plain {
    value: u32,
}

#[repr(C)]
struct Tagged {
    tag: u64,
    plain: Plain,
}

upcast!(Tagged => Plain, plain);

#[test]
fn field_views_at_an_offset_share_their_payloads_identity() {
    let tagged = Strong::new(Tagged {
        tag: 1,
        plain: Plain { value: 2 },
    });
    let plain: Strong<Plain> = Strong::from_strong(&tagged);

    assert_eq!(tagged.tag, 1);
    assert_eq!(plain.value, 2);
    assert_ne!(Strong::address(&plain), Strong::address(&tagged));
    assert_eq!(plain, tagged);
    assert!(Strong::ptr_eq(&plain, &tagged));

    let views = BTreeSet::from([plain.clone(), Strong::from_strong(&tagged)]);
    assert_eq!(views.len(), 1);
    drop(views);

    let weak_plain: Weak<Plain> = Weak::from_strong(&tagged);
    assert_eq!(weak_plain, Strong::downgrade(&tagged));

    // Re-assigning the same view leaves the counts untouched
    let mut assigned = plain.clone();
    Strong::assign_strong(&mut assigned, &tagged);
    assert_eq!(Strong::use_count(&tagged), 3);
    assert!(Strong::ptr_eq(&assigned, &plain));
    assert_eq!(assigned.value, 2);
}
