#![no_main]
use std::collections::VecDeque;

use arbitrary::Arbitrary;
use circular_deque::CircularDeque;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Back,
    BackMut(i32),
    Clear,
    Contains(i32),
    Equals,
    Extend(Vec<i32>),
    Front,
    FrontMut(i32),
    Get(usize),
    IntoIter,
    IsEmpty,
    Iter,
    Len,
    PopBack,
    PopFront,
    PushBack(i32),
    PushFront(i32),
    Render,
    ShrinkToFit,
}

const MAX_LEN: usize = 1000000;

fuzz_target!(|data: Vec<Op>| { fuzz(&data) });

fn fuzz(data: &[Op]) {
    let mut d = CircularDeque::<i32>::new();
    let mut v = VecDeque::<i32>::new();

    for op in data {
        match op {
            Op::Back => {
                assert_eq!(d.back(), v.back());
            }
            &Op::BackMut(i) => {
                if let (Some(a), Some(b)) = (d.back_mut(), v.back_mut()) {
                    *a = i;
                    *b = i;
                }
            }
            Op::Clear => {
                d.clear();
                v.clear();
                assert_eq!(d.capacity(), 0);
            }
            Op::Contains(i) => {
                assert_eq!(d.contains(i), v.contains(i));
            }
            Op::Equals => {
                assert!(d.iter().eq(v.iter()));
            }
            Op::Extend(items) => {
                if v.len() + items.len() < MAX_LEN {
                    d.extend(items);
                    v.extend(items);
                }
            }
            Op::Front => {
                assert_eq!(d.front(), v.front());
            }
            &Op::FrontMut(i) => {
                if let (Some(a), Some(b)) = (d.front_mut(), v.front_mut()) {
                    *a = i;
                    *b = i;
                }
            }
            &Op::Get(i) => {
                assert_eq!(d.get(i), v.get(i));
                if !v.is_empty() {
                    let i = i % v.len();
                    assert_eq!(d.get(i), v.get(i));
                    assert_eq!(d[i], v[i]);
                }
            }
            Op::IntoIter => {
                let mut d_iter = d.clone().into_iter();
                let mut v_iter = v.clone().into_iter();
                while v_iter.len() > 0 {
                    assert_eq!(d_iter.len(), v_iter.len());
                    if fastrand::bool() {
                        assert_eq!(d_iter.next(), v_iter.next());
                    } else {
                        assert_eq!(d_iter.next_back(), v_iter.next_back());
                    }
                }
                assert_eq!(d_iter.next(), None);
            }
            Op::IsEmpty => {
                assert_eq!(d.is_empty(), v.is_empty());
            }
            Op::Iter => {
                let mut d_iter = d.iter();
                let mut v_iter = v.iter();
                while v_iter.len() > 0 {
                    if fastrand::bool() {
                        assert_eq!(d_iter.next(), v_iter.next());
                    } else {
                        assert_eq!(d_iter.next_back(), v_iter.next_back());
                    }
                }
                assert_eq!(d_iter.next(), None);
            }
            Op::Len => {
                assert_eq!(d.len(), v.len());
            }
            Op::PopBack => {
                assert_eq!(d.pop_back(), v.pop_back());
            }
            Op::PopFront => {
                assert_eq!(d.pop_front(), v.pop_front());
            }
            &Op::PushBack(i) => {
                if v.len() < MAX_LEN {
                    d.push_back(i);
                    v.push_back(i);
                }
            }
            &Op::PushFront(i) => {
                if v.len() < MAX_LEN {
                    d.push_front(i);
                    v.push_front(i);
                }
            }
            Op::Render => {
                assert_eq!(format!("{:?}", d), format!("{:?}", v));
            }
            Op::ShrinkToFit => {
                d.shrink_to_fit();
                v.shrink_to_fit();
            }
        }

        // memory follows the current length, never the peak
        assert!(d.capacity() >= d.len());
        assert!(
            d.capacity() <= CircularDeque::<i32>::MIN_CAPACITY || d.capacity() <= 4 * d.len() + 3,
            "capacity {} for length {}",
            d.capacity(),
            d.len()
        );
    }
}
