use std::{
    alloc::{GlobalAlloc, Layout},
    cell::Cell,
};
use strong_ptr::{Strong, StrongArray, Weak};

struct CountingAllocator(mimalloc::MiMalloc);

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator(mimalloc::MiMalloc);

thread_local! {
    // Tests run on separate threads, so each test only sees its own allocations
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn adjust_live(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        adjust_live(1);
        unsafe { self.0.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        adjust_live(-1);
        unsafe { self.0.dealloc(ptr, layout) }
    }
}

fn live_allocations() -> isize {
    LIVE.with(Cell::get)
}

#[test]
fn the_counting_cell_is_freed_with_the_last_weak_handle() {
    let before = live_allocations();

    let strong = Strong::new(42u64);
    // The payload and its counting cell
    assert_eq!(live_allocations() - before, 2);

    let weak = Strong::downgrade(&strong);
    let weak_copy = weak.clone();
    drop(strong);
    assert!(weak.is_expired());
    assert_eq!(live_allocations() - before, 1);

    drop(weak);
    assert_eq!(live_allocations() - before, 1);

    drop(weak_copy);
    assert_eq!(live_allocations() - before, 0);
}

#[test]
fn the_counting_cell_is_freed_with_the_last_strong_handle() {
    let before = live_allocations();

    let strong = Strong::new(String::from("payload"));
    let copy = strong.clone();
    let weak = Strong::downgrade(&strong);
    drop(weak);
    drop(strong);
    assert_eq!(live_allocations() - before, 3);

    drop(copy);
    assert_eq!(live_allocations() - before, 0);
}

#[test]
fn failed_promotions_keep_the_counting_cell_alive() {
    let before = live_allocations();

    let weak: Weak<u8> = Strong::downgrade(&Strong::new(1));
    assert!(Strong::is_empty(&weak.lock()));
    assert!(weak.upgrade().is_err());
    assert_eq!(live_allocations() - before, 1);

    drop(weak);
    assert_eq!(live_allocations() - before, 0);
}

#[test]
fn array_cells_follow_the_same_rules() {
    let before = live_allocations();

    let array = StrongArray::<u32>::new(8);
    let weak = array.downgrade();
    drop(array);
    assert_eq!(live_allocations() - before, 1);

    drop(weak);
    assert_eq!(live_allocations() - before, 0);
}
