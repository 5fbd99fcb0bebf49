#![cfg(feature = "rayon")]

#[macro_use]
extern crate lazy_static;

use rayon_::iter::{
    IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator,
    IntoParallelRefMutIterator, ParallelExtend, ParallelIterator,
};
use segdeque::Deque;

macro_rules! assert_eq3 {
    ($e1:expr, $e2:expr, $e3:expr) => {{
        assert_eq!($e1, $e2);
        assert_eq!($e1, $e3);
        assert_eq!($e2, $e3);
    }};
}

lazy_static! {
    static ref DEQUE_EMPTY: Deque<u32, 2> = Deque::with_bucket_size();
    static ref DEQUE: Deque<u32, 2> = {
        let mut deque = Deque::with_bucket_size();
        deque.push_back(10);
        deque.push_back(30);
        deque.push_back(50);
        deque.push_back(60);
        deque.push_back(40);
        deque.push_front(20);
        deque
    };
}

#[test]
fn deque_seq_par_equivalence_iter_empty() {
    let vec_seq = DEQUE_EMPTY.iter().collect::<Vec<_>>();
    let vec_par = DEQUE_EMPTY.par_iter().collect::<Vec<_>>();

    assert_eq3!(vec_seq, vec_par, &[] as &[&u32]);
}

#[test]
fn deque_seq_par_equivalence_iter() {
    let mut vec_seq = DEQUE.iter().collect::<Vec<_>>();
    let mut vec_par = DEQUE.par_iter().collect::<Vec<_>>();

    assert_eq!(vec_seq, vec_par);

    let expected_sorted = [&10, &20, &30, &40, &50, &60];

    vec_seq.sort_unstable();
    vec_par.sort_unstable();

    assert_eq3!(vec_seq, vec_par, expected_sorted);
}

#[test]
fn deque_seq_par_equivalence_iter_mut_empty() {
    let mut map1 = DEQUE_EMPTY.clone();
    let mut map2 = DEQUE_EMPTY.clone();

    let vec_seq = map1.iter_mut().collect::<Vec<_>>();
    let vec_par = map2.par_iter_mut().collect::<Vec<_>>();

    assert_eq3!(vec_seq, vec_par, &[] as &[&u32]);
}

#[test]
fn deque_seq_par_equivalence_iter_mut() {
    let mut map1 = DEQUE.clone();
    let mut map2 = DEQUE.clone();

    let mut vec_seq = map1.iter_mut().collect::<Vec<_>>();
    let mut vec_par = map2.par_iter_mut().collect::<Vec<_>>();

    assert_eq!(vec_seq, vec_par);

    let expected_sorted = [&mut 10, &mut 20, &mut 30, &mut 40, &mut 50, &mut 60];

    vec_seq.sort_unstable();
    vec_par.sort_unstable();

    assert_eq3!(vec_seq, vec_par, expected_sorted);
}

#[test]
fn deque_seq_par_equivalence_into_iter_empty() {
    let vec_seq = DEQUE_EMPTY.clone().into_iter().collect::<Vec<_>>();
    let vec_par = DEQUE_EMPTY.clone().into_par_iter().collect::<Vec<_>>();

    assert_eq3!(vec_seq, vec_par, []);
}

#[test]
fn deque_seq_par_equivalence_into_iter() {
    let mut vec_seq = DEQUE.clone().into_iter().collect::<Vec<_>>();
    let mut vec_par = DEQUE.clone().into_par_iter().collect::<Vec<_>>();

    assert_eq!(vec_seq, vec_par);

    let expected_sorted = [10, 20, 30, 40, 50, 60];

    vec_seq.sort_unstable();
    vec_par.sort_unstable();

    assert_eq3!(vec_seq, vec_par, expected_sorted);
}

lazy_static! {
    static ref DEQUE_VEC_EMPTY: Vec<u32> = vec![];
    static ref DEQUE_VEC: Vec<u32> = vec![20, 10, 30, 50, 60, 40,];
}

#[test]
fn deque_seq_par_equivalence_collect_empty() {
    let deque_expected = DEQUE_EMPTY.clone();
    let deque_seq = DEQUE_VEC_EMPTY.clone().into_iter().collect::<Deque<_, 2>>();
    let deque_par = DEQUE_VEC_EMPTY.clone().into_par_iter().collect::<Deque<_, 2>>();

    assert_eq!(deque_seq, deque_par);
    assert_eq!(deque_seq, deque_expected);
    assert_eq!(deque_par, deque_expected);
}

#[test]
fn deque_seq_par_equivalence_collect() {
    let deque_expected = DEQUE.clone();
    let deque_seq = DEQUE_VEC.clone().into_iter().collect::<Deque<_, 2>>();
    let deque_par = DEQUE_VEC.clone().into_par_iter().collect::<Deque<_, 2>>();

    assert_eq!(deque_seq, deque_par);
    assert_eq!(deque_seq, deque_expected);
    assert_eq!(deque_par, deque_expected);
}

lazy_static! {
    static ref DEQUE_EXISTING_EMPTY: Deque<u32, 2> = Deque::with_bucket_size();
    static ref DEQUE_EXISTING: Deque<u32, 2> = {
        let mut deque = Deque::with_bucket_size();
        deque.push_back(10);
        deque.push_front(20);
        deque
    };
    static ref DEQUE_EXTENSION_EMPTY: Vec<u32> = vec![];
    static ref DEQUE_EXTENSION: Vec<u32> = vec![30, 50, 60, 40];
}

#[test]
fn deque_seq_par_equivalence_existing_empty_extend_empty() {
    let expected = Deque::with_bucket_size();
    let mut deque_seq = DEQUE_EXISTING_EMPTY.clone();
    let mut deque_par = DEQUE_EXISTING_EMPTY.clone();

    deque_seq.extend(DEQUE_EXTENSION_EMPTY.iter().cloned());
    deque_par.par_extend(DEQUE_EXTENSION_EMPTY.par_iter().cloned());

    assert_eq3!(deque_seq, deque_par, expected);
}

#[test]
fn deque_seq_par_equivalence_existing_empty_extend() {
    let expected = DEQUE_EXTENSION.iter().cloned().collect::<Deque<_, 2>>();
    let mut deque_seq = DEQUE_EXISTING_EMPTY.clone();
    let mut deque_par = DEQUE_EXISTING_EMPTY.clone();

    deque_seq.extend(DEQUE_EXTENSION.iter().cloned());
    deque_par.par_extend(DEQUE_EXTENSION.par_iter().cloned());

    assert_eq3!(deque_seq, deque_par, expected);
}

#[test]
fn deque_seq_par_equivalence_existing_extend_empty() {
    let expected = DEQUE_EXISTING.clone();
    let mut deque_seq = DEQUE_EXISTING.clone();
    let mut deque_par = DEQUE_EXISTING.clone();

    deque_seq.extend(DEQUE_EXTENSION_EMPTY.iter().cloned());
    deque_par.par_extend(DEQUE_EXTENSION_EMPTY.par_iter().cloned());

    assert_eq3!(deque_seq, deque_par, expected);
}

#[test]
fn deque_seq_par_equivalence_existing_extend() {
    let expected = DEQUE.clone();
    let mut deque_seq = DEQUE_EXISTING.clone();
    let mut deque_par = DEQUE_EXISTING.clone();

    deque_seq.extend(DEQUE_EXTENSION.iter().cloned());
    deque_par.par_extend(DEQUE_EXTENSION.par_iter().cloned());

    assert_eq3!(deque_seq, deque_par, expected);
}

lazy_static! {
    static ref DEQUE_LARGE: Deque<u64, 7> = (0..10_000).collect();
}

#[test]
fn deque_par_iter_splits_across_buckets() {
    let sum: u64 = DEQUE_LARGE.par_iter().sum();
    assert_eq!(sum, (0..10_000).sum::<u64>());

    let seq = DEQUE_LARGE.iter().copied().collect::<Vec<_>>();
    let par = DEQUE_LARGE.par_iter().copied().collect::<Vec<_>>();
    assert_eq!(seq, par);

    let mut doubled = DEQUE_LARGE.clone();
    doubled.par_iter_mut().for_each(|v| *v *= 2);
    assert!(doubled.iter().copied().eq((0..10_000).map(|v| v * 2)));

    let rev = DEQUE_LARGE.par_iter().rev().take(3).copied().collect::<Vec<_>>();
    assert_eq!(rev, [9_999, 9_998, 9_997]);
}
