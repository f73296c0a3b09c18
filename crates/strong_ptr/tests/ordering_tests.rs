use std::{
    cell::Cell,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
};
use strong_ptr::{Strong, Weak, make_strong, upcast};

trait Widget {
    fn poke(&self);
    fn pokes(&self) -> u32;
}

#[derive(Default)]
struct Button {
    pokes: Cell<u32>,
}

impl Widget for Button {
    fn poke(&self) {
        self.pokes.set(self.pokes.get() + 1);
    }

    fn pokes(&self) -> u32 {
        self.pokes.get()
    }
}

upcast!(Button => dyn Widget);

fn make_widget() -> Strong<dyn Widget> {
    make_strong!(Button::default())
}

#[test]
fn handles_are_compared_by_identity() {
    let a = Strong::new(1);
    let b = Strong::new(1);
    let a_copy = a.clone();

    assert_ne!(a, b);
    assert!(a < b || b < a);
    assert_eq!(a, a_copy);
    assert!(a <= a_copy && a >= a_copy);
}

#[test]
fn ordering_is_a_strict_weak_ordering() {
    let handles: Vec<_> = (0..8).map(Strong::new).collect();

    for a in &handles {
        for b in &handles {
            assert_eq!(a < b, b > a);
            assert!(!(a < b && b < a));
            for c in &handles {
                if a < b && b < c {
                    assert!(a < c);
                }
            }
        }
    }
}

#[test]
fn empty_handles_are_equal() {
    assert_eq!(Strong::<i32>::empty(), Strong::<i32>::empty());
    assert_eq!(Strong::<i32>::empty(), Strong::<String>::empty());
    assert!(Strong::<i32>::empty() < Strong::new(0));
}

#[test]
fn zero_sized_payloads_have_distinct_identities() {
    let a = Strong::new(());
    let b = Strong::new(());

    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn handles_as_container_keys() {
    let handles: Vec<_> = (0..10).map(|_| make_widget()).collect();

    let mut ordered = BTreeSet::new();
    let mut hashed = HashSet::new();
    for handle in handles.iter().chain(handles.iter()) {
        ordered.insert(handle.clone());
        hashed.insert(handle.clone());
    }

    assert_eq!(ordered.len(), 10);
    assert_eq!(hashed.len(), 10);
    assert!(ordered.contains(&handles[3]));
    assert!(hashed.contains(&handles[7]));
    assert_eq!(Strong::use_count(&handles[0]), 3);
}

#[test]
fn handles_as_container_values() {
    let widget = make_widget();

    let mut by_name = BTreeMap::new();
    by_name.insert("sfdafafd", widget.clone());
    by_name["sfdafafd"].poke();

    let mut by_id = HashMap::new();
    by_id.insert(1, widget.clone());
    by_id[&1].poke();

    let set = BTreeSet::from([widget.clone()]);
    if let Some(first) = set.first() {
        first.poke();
    }

    assert_eq!(widget.pokes(), 3);
    assert_eq!(Strong::use_count(&widget), 4);
}

#[test]
fn views_of_different_types_compare_by_payload() {
    let button = Strong::new(Button::default());
    let view: Strong<dyn Widget> = Strong::from_strong(&button);
    assert_eq!(view, button);
    assert_ne!(make_widget(), button);

    let shared = Strong::new(7u8);
    let copy: Strong<u8> = Strong::from_strong(&shared);
    assert_eq!(shared, copy);
}

#[test]
fn weak_handles_are_ordered_by_identity() {
    let strong = Strong::new('w');
    let other = Strong::new('o');
    let a = Strong::downgrade(&strong);
    let b = Weak::from(&strong);
    let c = Strong::downgrade(&other);

    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: BTreeSet<_> = [a.clone(), b, c].into_iter().collect();
    assert_eq!(set.len(), 2);

    // Expired weak handles keep their identity
    drop(strong);
    assert!(set.contains(&a));
}
