//! A double-ended queue backed by a circular buffer that grows by doubling
//! when full and halves once it drops to a quarter full, so its memory
//! follows the current length rather than the largest length it ever had.
//!
//! [`CircularDeque::new`] doesn't allocate and is a `const fn`, so an empty
//! deque can live in a `const` or `static` and behaves exactly like one
//! created at runtime.

mod error;

pub use error::TryReserveError;

use std::alloc::{alloc, dealloc, Layout};

use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
    slice,
};

pub struct CircularDeque<T> {
    buf: NonNull<T>,
    cap: usize,
    head: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T> CircularDeque<T> {
    /// The smallest capacity of an allocated buffer. Growth never produces
    /// less and shrinking never goes below it.
    pub const MIN_CAPACITY: usize = if mem::size_of::<T>() == 1 {
        8
    } else if mem::size_of::<T>() <= 1024 {
        4
    } else {
        1
    };

    /// Creates an empty deque without allocating.
    #[inline]
    pub const fn new() -> Self {
        let cap = if mem::size_of::<T>() == 0 { usize::MAX } else { 0 };
        Self { buf: NonNull::dangling(), cap, head: 0, len: 0, _marker: PhantomData }
    }

    /// Creates an empty deque with room for exactly `cap` elements. The extra
    /// room is reclaimed by later pops like any other unused capacity.
    pub fn with_capacity(cap: usize) -> Self {
        let mut this = Self::new();
        if cap > this.cap {
            if let Err(e) = this.relocate(cap) {
                e.bail()
            }
        }
        this
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zero-sized element types report `usize::MAX`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    // can't underflow, self.cap >= self.len always holds.
    #[inline]
    pub const fn is_contiguous(&self) -> bool {
        self.head <= self.cap - self.len
    }

    /// Returns the elements front to back as two slices, the second one
    /// empty unless the live range wraps around the end of the buffer.
    #[inline]
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let ptr = self.buf.as_ptr();
        if self.is_contiguous() {
            (unsafe { slice::from_raw_parts(ptr.add(self.head), self.len) }, &[])
        } else {
            let head_len = self.cap - self.head;
            unsafe {
                (
                    slice::from_raw_parts(ptr.add(self.head), head_len),
                    slice::from_raw_parts(ptr, self.len - head_len),
                )
            }
        }
    }

    #[inline]
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let ptr = self.buf.as_ptr();
        if self.is_contiguous() {
            (unsafe { slice::from_raw_parts_mut(ptr.add(self.head), self.len) }, &mut [])
        } else {
            let head_len = self.cap - self.head;
            unsafe {
                (
                    slice::from_raw_parts_mut(ptr.add(self.head), head_len),
                    slice::from_raw_parts_mut(ptr, self.len - head_len),
                )
            }
        }
    }

    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.wrapping_sub(1))
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.wrapping_sub(1))
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&T> {
        if idx < self.len {
            Some(unsafe { &*self.buf.as_ptr().add(self.physical_idx(idx)) })
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        if idx < self.len {
            Some(unsafe { &mut *self.buf.as_ptr().add(self.physical_idx(idx)) })
        } else {
            None
        }
    }

    /// Maps a logical index to its slot in the buffer.
    /// `idx` must be at most `self.cap`.
    #[inline]
    fn physical_idx(&self, idx: usize) -> usize {
        // head + idx may not fit in a usize when T is a ZST, so compare
        // against the room left before the end of the buffer instead.
        let room = self.cap - self.head;
        if idx < room {
            self.head + idx
        } else {
            idx - room
        }
    }

    /// The slot just before `slot`, wrapping to the last one.
    /// Only valid for a non-zero capacity.
    #[inline]
    fn prev_slot(&self, slot: usize) -> usize {
        slot.checked_sub(1).unwrap_or(self.cap - 1)
    }

    #[inline]
    pub fn push_back(&mut self, val: T) {
        self.grow_if_full();

        // SAFETY: after grow_if_full() self.len < self.cap, so the slot past
        // the back is in bounds and free.
        let tail = self.physical_idx(self.len);
        unsafe { self.buf.as_ptr().add(tail).write(val) };
        self.len += 1;
    }

    #[inline]
    pub fn push_front(&mut self, val: T) {
        self.grow_if_full();

        // SAFETY: the buffer isn't full, so the slot before the head is free.
        let head = self.prev_slot(self.head);
        unsafe { self.buf.as_ptr().add(head).write(val) };
        self.head = head;
        self.len += 1;
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        let val = self.take_front()?;
        self.shrink_if_sparse();
        Some(val)
    }

    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        let val = self.take_back()?;
        self.shrink_if_sparse();
        Some(val)
    }

    /// Moves the front element out without considering a shrink.
    #[inline]
    fn take_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        // the slot is logically uninitialized once read, it keeps no ownership.
        let val = unsafe { self.buf.as_ptr().add(self.head).read() };
        self.head = self.physical_idx(1);
        self.len -= 1;
        Some(val)
    }

    #[inline]
    fn take_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let back = self.physical_idx(self.len - 1);
        self.len -= 1;
        Some(unsafe { self.buf.as_ptr().add(back).read() })
    }

    #[inline]
    fn grow_if_full(&mut self) {
        if self.len == self.cap {
            // for a ZST this is len == usize::MAX, and reserve() reports the overflow.
            self.reserve(1);
        }
    }

    /// Halves the buffer while it is at most a quarter full. The gap between
    /// this watermark and the full buffer that triggers growth keeps a
    /// push/pop pair at either boundary from reallocating every time.
    ///
    /// Reserved capacity can leave the buffer several halvings too large, so
    /// the target is halved until it fits and the elements move only once.
    #[inline]
    fn shrink_if_sparse(&mut self) {
        if mem::size_of::<T>() == 0 || self.cap <= Self::MIN_CAPACITY || self.len > self.cap / 4 {
            return;
        }

        let mut target = self.cap;
        while target > Self::MIN_CAPACITY && self.len <= target / 4 {
            target = (target / 2).max(Self::MIN_CAPACITY);
        }
        // a failed shrink keeps the old buffer, which is still valid.
        let _ = self.relocate(target);
    }

    pub fn reserve(&mut self, additional: usize) {
        if let Err(e) = self.try_reserve(additional) {
            e.bail()
        }
    }

    /// Makes room for at least `additional` more elements. On error the deque
    /// is left as it was.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = self.len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        if needed <= self.cap {
            return Ok(());
        }

        // a ZST has self.cap == usize::MAX, so T isn't one here. that bounds
        // self.cap by isize::MAX and the doubling can't overflow.
        let new_cap = (self.cap * 2).max(needed).max(Self::MIN_CAPACITY);
        self.relocate(new_cap)
    }

    /// Releases unused capacity. An empty deque gives its buffer back entirely.
    pub fn shrink_to_fit(&mut self) {
        if mem::size_of::<T>() == 0 {
            return;
        }
        if self.is_empty() {
            *self = Self::new();
            return;
        }

        let target = self.len.max(Self::MIN_CAPACITY);
        if self.cap > target {
            if let Err(e) = self.relocate(target) {
                e.bail()
            }
        }
    }

    /// Moves the elements into a fresh buffer of `new_cap` slots, front
    /// element first, and frees the old one.
    ///
    /// The new buffer is allocated before anything is touched, so on error
    /// the deque is unchanged.
    #[cold]
    fn relocate(&mut self, new_cap: usize) -> Result<(), TryReserveError> {
        debug_assert!(mem::size_of::<T>() != 0);
        debug_assert!(new_cap >= self.len && new_cap > 0);

        let layout = Layout::array::<T>(new_cap).map_err(|_| TryReserveError::CapacityOverflow)?;
        // SAFETY: T isn't a ZST and new_cap > 0, so the layout isn't zero-sized.
        let new_buf = NonNull::new(unsafe { alloc(layout) }.cast::<T>())
            .ok_or(TryReserveError::AllocError { layout })?;

        // nothing from here on can unwind, so no element is ever owned twice.
        let (a, b) = self.as_slices();
        let (a_len, b_len) = (a.len(), b.len());
        unsafe {
            ptr::copy_nonoverlapping(a.as_ptr(), new_buf.as_ptr(), a_len);
            ptr::copy_nonoverlapping(b.as_ptr(), new_buf.as_ptr().add(a_len), b_len);
            self.release_buf();
        }

        self.buf = new_buf;
        self.cap = new_cap;
        self.head = 0;
        Ok(())
    }

    /// # Safety
    /// Every live element must already have been moved out or dropped, and
    /// `self.buf` must not be used again before it is replaced.
    unsafe fn release_buf(&mut self) {
        let layout = Self::array_layout_unchecked(self.cap);
        if layout.size() != 0 {
            dealloc(self.buf.as_ptr().cast(), layout);
        }
    }

    /// # Safety
    /// `cap` must be the capacity of a buffer this deque allocated (or 0).
    /// For ZSTs this gives a zero-sized layout for any `cap`.
    #[inline]
    unsafe fn array_layout_unchecked(cap: usize) -> Layout {
        Layout::from_size_align_unchecked(mem::size_of::<T>().wrapping_mul(cap), mem::align_of::<T>())
    }

    /// Drops every element and frees the buffer, leaving the same state as
    /// [`CircularDeque::new`].
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn contains(&self, t: &T) -> bool
    where
        T: PartialEq,
    {
        let (a, b) = self.as_slices();
        a.contains(t) || b.contains(t)
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        let (a, b) = self.as_slices();
        Iter { front: a.iter(), back: b.iter() }
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (a, b) = self.as_mut_slices();
        IterMut { front: a.iter_mut(), back: b.iter_mut() }
    }
}

impl<T> Drop for CircularDeque<T> {
    fn drop(&mut self) {
        struct DeallocGuard {
            ptr: NonNull<u8>,
            layout: Layout,
        }

        impl Drop for DeallocGuard {
            fn drop(&mut self) {
                if self.layout.size() != 0 {
                    unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
                }
            }
        }

        struct Dropper<T>(*mut [T]);

        impl<T> Drop for Dropper<T> {
            fn drop(&mut self) {
                unsafe { ptr::drop_in_place(self.0) }
            }
        }

        // the buffer is freed last, even if an element's destructor panics.
        let layout = unsafe { Self::array_layout_unchecked(self.cap) };
        let _guard = DeallocGuard { ptr: self.buf.cast(), layout };

        if mem::needs_drop::<T>() {
            let (a, b) = self.as_mut_slices();
            let (a, b) = (a as *mut [T], b as *mut [T]);
            let _back_dropper = Dropper(b);
            unsafe { ptr::drop_in_place(a) };
        }
    }
}

impl<T> Default for CircularDeque<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularDeque<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders the elements front to back as `[a b c]`.
impl<T: fmt::Display> fmt::Display for CircularDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, t) in self.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(t, f)?;
        }
        f.write_str("]")
    }
}

impl<T: Clone> Clone for CircularDeque<T> {
    #[inline]
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq<U>, U> PartialEq<CircularDeque<U>> for CircularDeque<T> {
    #[inline]
    fn eq(&self, other: &CircularDeque<U>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for CircularDeque<T> {
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        if self.len != other.len() {
            return false;
        }
        let (a, b) = self.as_slices();
        let (c, d) = other.split_at(a.len());
        a == c && b == d
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for CircularDeque<T> {
    #[inline]
    fn eq(&self, other: &[U; N]) -> bool {
        self == other.as_slice()
    }
}

impl<T: PartialEq<U>, U> PartialEq<Vec<U>> for CircularDeque<T> {
    #[inline]
    fn eq(&self, other: &Vec<U>) -> bool {
        self == other.as_slice()
    }
}

impl<T: Eq> Eq for CircularDeque<T> {}

impl<T: PartialOrd> PartialOrd for CircularDeque<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for CircularDeque<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for CircularDeque<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        self.iter().for_each(|t| t.hash(state));
    }
}

impl<T> Index<usize> for CircularDeque<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        self.get(index).expect("Out of bounds access")
    }
}

impl<T> IndexMut<usize> for CircularDeque<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index).expect("Out of bounds access")
    }
}

unsafe impl<T: Send> Send for CircularDeque<T> {}

unsafe impl<T: Sync> Sync for CircularDeque<T> {}

impl<T> Extend<T> for CircularDeque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        iter.for_each(|t| self.push_back(t));
    }
}

impl<'a, T: 'a + Copy> Extend<&'a T> for CircularDeque<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T> FromIterator<T> for CircularDeque<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<T> From<Vec<T>> for CircularDeque<T> {
    /// Takes over the vector's buffer without copying.
    fn from(v: Vec<T>) -> Self {
        let mut v = ManuallyDrop::new(v);
        // the buffer relies on self.cap being usize::MAX for ZSTs.
        let cap = if mem::size_of::<T>() == 0 { usize::MAX } else { v.capacity() };
        // SAFETY: a Vec's pointer is never null, and its buffer was allocated
        // by the global allocator as `Layout::array::<T>(cap)`.
        let buf = unsafe { NonNull::new_unchecked(v.as_mut_ptr()) };
        Self { buf, cap, head: 0, len: v.len(), _marker: PhantomData }
    }
}

impl<T, const N: usize> From<[T; N]> for CircularDeque<T> {
    #[inline]
    fn from(arr: [T; N]) -> Self {
        Self::from(Vec::from(arr))
    }
}

impl<T> From<CircularDeque<T>> for Vec<T> {
    fn from(d: CircularDeque<T>) -> Self {
        let mut v = Vec::with_capacity(d.len());
        v.extend(d);
        v
    }
}

impl<T> IntoIterator for CircularDeque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    #[inline]
    fn into_iter(self) -> IntoIter<T> {
        IntoIter { inner: self }
    }
}

impl<'a, T> IntoIterator for &'a CircularDeque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut CircularDeque<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

pub struct Iter<'a, T> {
    front: slice::Iter<'a, T>,
    back: slice::Iter<'a, T>,
}

pub struct IterMut<'a, T> {
    front: slice::IterMut<'a, T>,
    back: slice::IterMut<'a, T>,
}

/// Owning iterator. It never shrinks the buffer while yielding; the buffer
/// is freed when the iterator is dropped.
pub struct IntoIter<T> {
    inner: CircularDeque<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        match self.front.next() {
            Some(t) => Some(t),
            None => self.back.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }

    #[inline]
    fn fold<B, F>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        let acc = self.front.fold(init, &mut f);
        self.back.fold(acc, f)
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        match self.back.next_back() {
            Some(t) => Some(t),
            None => self.front.next_back(),
        }
    }

    #[inline]
    fn rfold<B, F>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        let acc = self.back.rfold(init, &mut f);
        self.front.rfold(acc, f)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Iter { front: self.front.clone(), back: self.back.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.front.as_slice()).field(&self.back.as_slice()).finish()
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        match self.front.next() {
            Some(t) => Some(t),
            None => self.back.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }

    #[inline]
    fn fold<B, F>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        let acc = self.front.fold(init, &mut f);
        self.back.fold(acc, f)
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        match self.back.next_back() {
            Some(t) => Some(t),
            None => self.front.next_back(),
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }
}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.front.as_slice()).field(&self.back.as_slice()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.take_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len, Some(self.inner.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.take_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: Clone> Clone for IntoIter<T> {
    fn clone(&self) -> Self {
        IntoIter { inner: self.inner.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}
