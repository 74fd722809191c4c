use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr;

use circular_deque::{CircularDeque, TryReserveError};

/// Hands out memory from the system allocator unless the current thread has
/// asked for allocations to fail.
struct FailingAlloc;

thread_local! {
    static FAIL: Cell<bool> = const { Cell::new(false) };
}

unsafe impl GlobalAlloc for FailingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if FAIL.with(Cell::get) {
            ptr::null_mut()
        } else {
            System.alloc(layout)
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: FailingAlloc = FailingAlloc;

/// Runs `f` with every allocation on this thread failing.
fn without_memory<R>(f: impl FnOnce() -> R) -> R {
    struct Reset;

    impl Drop for Reset {
        fn drop(&mut self) {
            FAIL.with(|fail| fail.set(false));
        }
    }

    FAIL.with(|fail| fail.set(true));
    let _reset = Reset;
    f()
}

#[test]
fn failed_growth_leaves_deque_unchanged() {
    let mut d = CircularDeque::<u64>::new();
    for i in (0..3).rev() {
        d.push_front(i);
    }
    d.push_back(3);
    assert_eq!(d.len(), d.capacity());
    assert!(!d.is_contiguous());
    let (cap, slices) = (d.capacity(), format!("{:?}", d.as_slices()));

    let res = without_memory(|| d.try_reserve(1));
    match res {
        Err(TryReserveError::AllocError { layout }) => {
            assert_eq!(layout, Layout::array::<u64>(2 * cap).unwrap());
        }
        other => panic!("expected an allocation error, got {:?}", other),
    }
    assert_eq!(d.capacity(), cap);
    assert_eq!(format!("{:?}", d.as_slices()), slices);
    assert_eq!(d, [0, 1, 2, 3]);

    // the deque is still fully usable once memory is back
    d.push_back(4);
    assert_eq!(d, [0, 1, 2, 3, 4]);
    assert_eq!(d.capacity(), 2 * cap);
}

#[test]
fn failed_exact_reserve_reports_requested_layout() {
    let mut d: CircularDeque<u64> = (0..10).collect();
    let cap = d.capacity();

    let res = without_memory(|| d.try_reserve(100));
    assert_eq!(
        res,
        Err(TryReserveError::AllocError { layout: Layout::array::<u64>(110).unwrap() })
    );
    assert_eq!(d.capacity(), cap);
    assert_eq!(d, (0..10).collect::<Vec<u64>>());
}

#[test]
fn failed_shrink_keeps_larger_buffer() {
    let mut d = CircularDeque::<u64>::new();
    for i in (0..8).rev() {
        d.push_front(i);
    }
    for i in 8..16 {
        d.push_back(i);
    }
    assert_eq!(d.capacity(), 16);
    while d.len() > 5 {
        d.pop_front();
    }
    assert_eq!(d.capacity(), 16);

    // this pop reaches the quarter-full watermark and would halve the buffer
    let popped = without_memory(|| d.pop_front());
    assert_eq!(popped, Some(11));
    assert_eq!(d.capacity(), 16);
    assert_eq!(d, [12, 13, 14, 15]);

    let popped = without_memory(|| d.pop_back());
    assert_eq!(popped, Some(15));
    assert_eq!(d.capacity(), 16);
    assert_eq!(d, [12, 13, 14]);

    // with memory available the next pop catches up in one move
    assert_eq!(d.pop_back(), Some(14));
    assert_eq!(d.capacity(), CircularDeque::<u64>::MIN_CAPACITY);
    assert_eq!(d, [12, 13]);
}
