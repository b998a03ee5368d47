use super::*;
use crate::alloc::BudgetAlloc;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

fn limits(min: usize, max: usize) -> Limits {
    Limits::new(min, max).unwrap()
}

fn filled(limits: Limits, n: usize) -> (Hive<usize>, Vec<Position>) {
    let mut hive = Hive::with_limits(limits);
    let positions = (0..n).map(|i| hive.insert(i)).collect();
    hive.check_invariants();
    (hive, positions)
}

fn contents<T: Copy, A: HiveAlloc>(hive: &Hive<T, A>) -> Vec<T> {
    hive.iter().copied().collect()
}

fn caps(blocks: impl Iterator<Item = BlockInfo>) -> Vec<usize> {
    blocks.map(|info| info.capacity).collect()
}

#[test]
fn new_hive_allocates_nothing() {
    let hive: Hive<u32> = Hive::new();
    assert_eq!(hive.capacity(), 0);
    assert_eq!(hive.blocks.len(), 0);
    assert!(hive.begin().is_end());
    assert_eq!(hive.begin(), hive.end());
    assert_eq!(hive.iter().next(), None);
    hive.check_invariants();
}

#[test]
fn emptied_block_is_reserved_then_reused_first() {
    let (mut hive, p) = filled(limits(4, 4), 12);
    assert_eq!(
        hive.active_blocks().collect::<Vec<_>>(),
        vec![BlockInfo { capacity: 4, len: 4 }; 3]
    );
    assert_eq!(hive.len(), 12);

    for &pos in &p[4..8] {
        hive.erase(pos);
        hive.check_invariants();
    }
    assert_eq!(hive.len(), 8);
    assert_eq!(hive.capacity(), 12);
    assert_eq!(caps(hive.active_blocks()), vec![4, 4]);
    assert_eq!(caps(hive.reserved_blocks()), vec![4]);

    let pos = hive.insert(100);
    assert_eq!(pos, p[4], "lands in the first slot of the vacated block");
    assert_eq!(hive.len(), 9);
    assert_eq!(hive.capacity(), 12);
    assert_eq!(hive.reserved_blocks().count(), 0);

    // The reactivated block joins the tail of the iteration order.
    assert_eq!(contents(&hive), vec![0, 1, 2, 3, 8, 9, 10, 11, 100]);
    hive.check_invariants();
}

#[test]
fn full_block_is_reopened_at_the_front() {
    let (mut hive, p) = filled(limits(4, 4), 9);
    assert_eq!(hive.open_blocks().collect::<Vec<_>>(), vec![BlockInfo { capacity: 4, len: 1 }]);

    hive.erase(p[1]);
    assert_eq!(
        hive.open_blocks().collect::<Vec<_>>(),
        vec![BlockInfo { capacity: 4, len: 3 }, BlockInfo { capacity: 4, len: 1 }]
    );

    let pos = hive.insert(50);
    assert_eq!(pos, p[1], "the freed slot is refilled before fresh space");
    assert_eq!(hive.open_blocks().count(), 1);
    hive.check_invariants();
}

#[test]
fn erasing_inside_a_block_keeps_iteration_order() {
    let (mut hive, p) = filled(limits(4, 4), 12);
    hive.erase(p[5]);
    hive.erase(p[0]);
    assert_eq!(contents(&hive), vec![1, 2, 3, 4, 6, 7, 8, 9, 10, 11]);
    hive.insert(99);
    assert_eq!(contents(&hive), vec![99, 1, 2, 3, 4, 6, 7, 8, 9, 10, 11]);
}

#[test]
fn growth_roughly_doubles_and_respects_max() {
    let mut hive = Hive::with_limits(limits(2, 64));
    let mut seen = Vec::new();
    for i in 0..129 {
        hive.insert(i);
        if seen.last() != Some(&hive.capacity()) {
            seen.push(hive.capacity());
        }
    }
    assert_eq!(seen, vec![2, 4, 8, 16, 32, 64, 128, 192]);
    assert_eq!(caps(hive.active_blocks()), vec![2, 2, 4, 8, 16, 32, 64, 64]);
    hive.check_invariants();
}

#[test]
fn reserve_adds_only_reserved_blocks() {
    let mut hive: Hive<u8> = Hive::with_limits(limits(4, 16));
    hive.reserve(10);
    assert_eq!(hive.capacity(), 10);
    hive.reserve(50);
    assert_eq!(hive.capacity(), 58);
    assert_eq!(hive.active_blocks().count(), 0);
    assert_eq!(caps(hive.reserved_blocks()), vec![16, 16, 16, 10]);
    assert_eq!(caps(hive.open_blocks()), vec![10, 16, 16, 16]);

    hive.reserve(5);
    assert_eq!(hive.capacity(), 58);

    hive.insert(1);
    assert_eq!(hive.active_blocks().collect::<Vec<_>>(), vec![BlockInfo { capacity: 10, len: 1 }]);
    hive.check_invariants();
}

#[test]
fn reserve_beyond_max_size_fails() {
    let mut hive: Hive<u64> = Hive::new();
    let too_many = hive.max_size() + 1;
    assert_eq!(hive.try_reserve(too_many), Err(HiveError::CapacityOverflow));
    assert_eq!(hive.capacity(), 0);
}

#[test]
fn trim_never_drops_below_target() {
    let mut hive: Hive<u8> = Hive::with_limits(limits(4, 16));
    hive.reserve(58);
    hive.trim_capacity(30);
    assert_eq!(hive.capacity(), 32);
    assert_eq!(caps(hive.reserved_blocks()), vec![16, 16]);
    hive.check_invariants();

    hive.shrink_to_fit();
    assert_eq!(hive.capacity(), 0);
    assert_eq!(hive.blocks.len(), 0);
    hive.check_invariants();
}

#[test]
fn trim_leaves_active_blocks_alone() {
    let (mut hive, p) = filled(limits(4, 4), 8);
    for &pos in &p[..4] {
        hive.erase(pos);
    }
    hive.shrink_to_fit();
    assert_eq!(hive.capacity(), 4);
    assert_eq!(contents(&hive), vec![4, 5, 6, 7]);
    assert_eq!(hive.get(p[5]), Some(&5));
    hive.check_invariants();
}

#[test]
fn clear_keeps_capacity() {
    let (mut hive, _) = filled(limits(4, 8), 21);
    let capacity = hive.capacity();
    hive.clear();
    assert_eq!(hive.len(), 0);
    assert_eq!(hive.capacity(), capacity);
    assert_eq!(hive.active_blocks().count(), 0);
    assert_eq!(
        hive.reserved_blocks().map(|info| info.capacity).sum::<usize>(),
        capacity
    );
    hive.check_invariants();
}

#[test]
fn reshape_moves_only_out_of_limit_blocks() {
    let (mut hive, p) = filled(limits(4, 16), 20);
    assert_eq!(caps(hive.active_blocks()), vec![4, 4, 8, 16]);
    let before = hive.get(p[10]).unwrap() as *const usize;

    hive.reshape(limits(8, 16)).unwrap();
    hive.check_invariants();
    assert!(hive.are_active_blocks_within_limits(limits(8, 16)));
    assert_eq!(hive.len(), 20);
    assert_eq!(caps(hive.active_blocks()), vec![8, 16]);

    // Elements of conforming blocks do not move.
    assert_eq!(hive.get(p[10]).map(|v| v as *const usize), Some(before));

    let mut values = contents(&hive);
    values.sort_unstable();
    assert_eq!(values, (0..20).collect::<Vec<_>>());
}

#[test]
fn reshape_preserves_relative_order_of_moved_elements() {
    let (mut hive, _) = filled(limits(4, 4), 12);
    hive.reshape(limits(8, 8)).unwrap();
    assert_eq!(caps(hive.active_blocks()), vec![8, 8]);
    assert_eq!(contents(&hive), (0..12).collect::<Vec<_>>());
    assert_eq!(hive.block_limits(), limits(8, 8));
    hive.check_invariants();
}

#[test]
fn reshape_releases_out_of_limit_spare_blocks() {
    let mut hive: Hive<u32> = Hive::with_limits(limits(4, 32));
    hive.reserve(4);
    hive.reserve(40);
    assert_eq!(caps(hive.reserved_blocks()), vec![32, 32, 4]);
    hive.reshape(limits(16, 32)).unwrap();
    assert_eq!(caps(hive.reserved_blocks()), vec![32, 32]);
    assert_eq!(hive.capacity(), 64);
    hive.check_invariants();
}

#[test]
fn failed_reshape_restores_blocks_and_limits() {
    let alloc = BudgetAlloc::unbounded();
    let mut hive = Hive::with_limits_in(limits(4, 4), alloc.clone());
    for i in 0..8u64 {
        hive.insert(i);
    }
    alloc.set_limit(Some(alloc.in_use()));

    let err = hive.reshape(limits(8, 8)).unwrap_err();
    assert!(matches!(err, HiveError::AllocFailed { .. }));
    assert_eq!(hive.block_limits(), limits(4, 4));
    assert_eq!(hive.len(), 8);
    assert_eq!(hive.capacity(), 8);
    assert_eq!(contents(&hive), (0..8).collect::<Vec<_>>());
    hive.check_invariants();
}

#[test]
fn failed_reshape_keeps_positions_and_order() {
    let alloc = BudgetAlloc::unbounded();
    let mut hive = Hive::with_limits_in(limits(4, 8), alloc.clone());
    let p: Vec<Position> = (0..16u64).map(|i| hive.insert(i)).collect();
    assert_eq!(caps(hive.active_blocks()), vec![4, 4, 8]);
    hive.erase(p[9]);
    hive.erase(p[1]);
    let open_before: Vec<_> = hive.open_blocks().collect();
    let reserved_before: Vec<_> = hive.reserved_blocks().collect();
    let order_before = contents(&hive);
    alloc.set_limit(Some(alloc.in_use()));

    let err = hive.reshape(limits(8, 8)).unwrap_err();
    assert!(matches!(err, HiveError::AllocFailed { .. }));
    assert_eq!(contents(&hive), order_before);
    for (i, &pos) in p.iter().enumerate() {
        let expected = (i != 1 && i != 9).then_some(i as u64);
        assert_eq!(hive.get(pos).copied(), expected, "position of element {i}");
    }
    assert_eq!(hive.open_blocks().collect::<Vec<_>>(), open_before);
    assert_eq!(hive.reserved_blocks().collect::<Vec<_>>(), reserved_before);
    assert_eq!(hive.block_limits(), limits(4, 8));
    assert_eq!(hive.capacity(), 16);
    hive.check_invariants();

    // The refill order is unchanged: the hole in the first block comes first.
    assert_eq!(hive.insert(100), p[1]);
}

#[test]
fn failed_reshape_releases_partially_grown_room() {
    let alloc = BudgetAlloc::unbounded();
    let mut hive = Hive::with_limits_in(limits(4, 4), alloc.clone());
    let p: Vec<Position> = (0..12u64).map(|i| hive.insert(i)).collect();
    let blocks = alloc.live_allocations();
    // Room for exactly one 8-slot block: 8 slots of 8 bytes plus one bitmap word.
    alloc.set_limit(Some(alloc.in_use() + 72));

    assert!(hive.reshape(limits(8, 8)).is_err());
    assert_eq!(alloc.live_allocations(), blocks);
    assert_eq!(hive.capacity(), 12);
    assert_eq!(contents(&hive), (0..12).collect::<Vec<_>>());
    assert_eq!(hive.get(p[5]), Some(&5));
    hive.check_invariants();
}

#[test]
fn splice_moves_blocks_and_appends_order() {
    let mut a = Hive::with_limits(limits(4, 8));
    let mut b = Hive::with_limits(limits(4, 8));
    a.extend(0..5);
    b.extend(10..13);
    let addr = b.get(b.begin()).unwrap() as *const i32;

    a.splice(&mut b).unwrap();
    assert_eq!(contents(&a), vec![0, 1, 2, 3, 4, 10, 11, 12]);
    assert_eq!(a.len(), 8);
    assert_eq!(b.len(), 0);
    assert_eq!(b.capacity(), 0);
    assert_eq!(a.position_of(addr).and_then(|pos| a.get(pos)), Some(&10));
    a.check_invariants();
    b.check_invariants();

    // The spliced-in open block takes later insertions too.
    a.extend(20..30);
    assert_eq!(a.len(), 18);
    a.check_invariants();
}

#[test]
fn splice_rejects_out_of_limit_active_blocks() {
    let mut a = Hive::with_limits(limits(4, 8));
    let mut c = Hive::with_limits(limits(16, 16));
    a.insert(1);
    c.insert(2);

    let err = a.splice(&mut c).unwrap_err();
    assert_eq!(
        err,
        HiveError::LimitsViolation {
            capacity: 16,
            limits: limits(4, 8)
        }
    );
    assert_eq!(contents(&a), vec![1]);
    assert_eq!(contents(&c), vec![2]);
}

#[test]
fn splice_drops_unfit_spare_capacity() {
    let mut a: Hive<u8> = Hive::with_limits(limits(4, 8));
    let mut d: Hive<u8> = Hive::with_limits(limits(2, 64));
    d.reserve(4);
    d.reserve(44);
    assert_eq!(caps(d.reserved_blocks()), vec![40, 4]);

    a.splice(&mut d).unwrap();
    assert_eq!(a.capacity(), 4);
    assert_eq!(d.capacity(), 0);
    a.check_invariants();
}

#[test]
fn position_of_finds_live_elements_only() {
    let (mut hive, p) = filled(limits(4, 4), 10);
    let ptr = hive.get(p[6]).unwrap() as *const usize;
    assert_eq!(hive.position_of(ptr), Some(p[6]));

    let local = 6usize;
    assert_eq!(hive.position_of(&local), None);

    hive.erase(p[6]);
    assert_eq!(hive.position_of(ptr), None);
}

#[test]
fn distance_and_ordering() {
    let (mut hive, p) = filled(limits(4, 4), 10);
    hive.erase(p[1]);
    hive.erase(p[5]);

    assert_eq!(hive.distance(hive.begin(), hive.end()), 8);
    assert_eq!(hive.distance(p[0], p[3]), 2);
    assert_eq!(hive.distance(p[2], p[9]), 6);
    assert_eq!(hive.distance(p[9], p[9]), 0);
    assert_eq!(hive.distance(p[8], hive.end()), 2);

    assert_eq!(hive.cmp_positions(p[9], p[0]), Ordering::Greater);
    assert_eq!(hive.cmp_positions(p[2], p[3]), Ordering::Less);
    assert_eq!(hive.cmp_positions(p[0], hive.end()), Ordering::Less);
    assert_eq!(hive.cmp_positions(hive.end(), hive.end()), Ordering::Equal);
}

#[test]
#[should_panic(expected = "comes after")]
fn distance_rejects_reversed_range() {
    let (hive, p) = filled(limits(4, 4), 6);
    hive.distance(p[5], p[1]);
}

#[test]
fn erase_returns_successor_across_blocks() {
    let (mut hive, p) = filled(limits(4, 4), 8);
    assert_eq!(hive.erase(p[3]), p[4]);
    assert_eq!(hive.erase(p[7]), hive.end());
    assert_eq!(hive.next_position(p[2]), p[4]);
    assert_eq!(hive.next_position(hive.end()), hive.end());
}

#[test]
fn erase_range_stops_at_last() {
    let (mut hive, p) = filled(limits(4, 4), 10);
    assert_eq!(hive.erase_range(p[2], p[6]), p[6]);
    assert_eq!(contents(&hive), vec![0, 1, 6, 7, 8, 9]);
    assert_eq!(hive.erase_range(hive.begin(), hive.end()), hive.end());
    assert!(hive.is_empty());
    hive.check_invariants();
}

#[test]
#[should_panic(expected = "end position")]
fn erasing_end_panics() {
    let (mut hive, _) = filled(limits(4, 4), 2);
    let end = hive.end();
    hive.erase(end);
}

#[test]
fn insert_then_erase_restores_state() {
    let (mut hive, _) = filled(limits(4, 4), 4);
    let reserved = hive.reserved_blocks().count();
    let pos = hive.insert(7);
    hive.erase(pos);
    assert_eq!(hive.len(), 4);
    assert_eq!(hive.reserved_blocks().count(), reserved + 1);
    hive.check_invariants();
}

#[derive(Debug, PartialEq)]
enum Build {
    Hive(HiveError),
    Refused,
}

impl From<HiveError> for Build {
    fn from(err: HiveError) -> Self {
        Build::Hive(err)
    }
}

#[test]
fn failed_construction_changes_no_membership() {
    let (mut hive, _) = filled(limits(4, 4), 6);
    let open_before: Vec<_> = hive.open_blocks().collect();
    let active_before: Vec<_> = hive.active_blocks().collect();

    let result: Result<Position, Build> = hive.try_emplace_with(|| Err(Build::Refused));
    assert_eq!(result, Err(Build::Refused));
    assert_eq!(hive.len(), 6);
    assert_eq!(hive.open_blocks().collect::<Vec<_>>(), open_before);
    assert_eq!(hive.active_blocks().collect::<Vec<_>>(), active_before);
    hive.check_invariants();

    let pos = hive.try_emplace_with(|| Ok::<_, Build>(6)).unwrap();
    assert_eq!(hive.get(pos), Some(&6));
}

#[test]
fn panicking_constructor_leaves_hive_consistent() {
    let (mut hive, _) = filled(limits(4, 4), 4);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        hive.emplace_with(|| panic!("constructor failed"));
    }));
    assert!(result.is_err());
    assert_eq!(hive.len(), 4);
    // The block grown for the insertion stays as spare capacity.
    assert_eq!(caps(hive.reserved_blocks()), vec![4]);
    hive.check_invariants();
}

#[test]
fn allocation_failure_is_reported() {
    let alloc = BudgetAlloc::new(0);
    let mut hive = Hive::with_limits_in(limits(4, 4), alloc);
    let err = hive.try_insert(1u32).unwrap_err();
    assert!(matches!(err, HiveError::AllocFailed { .. }));
    assert_eq!(hive.capacity(), 0);

    let err: Build = hive.try_emplace_with(|| Ok(2u32)).unwrap_err();
    assert!(matches!(err, Build::Hive(HiveError::AllocFailed { .. })));
    hive.check_invariants();
}

#[test]
fn retain_filters_in_place() {
    let (mut hive, p) = filled(limits(4, 4), 12);
    hive.retain(|v| *v % 3 == 0);
    assert_eq!(contents(&hive), vec![0, 3, 6, 9]);
    assert_eq!(hive.get(p[6]), Some(&6));
    hive.check_invariants();
}

#[test]
fn iter_mut_and_entries() {
    let (mut hive, p) = filled(limits(4, 4), 6);
    for v in hive.iter_mut() {
        *v *= 10;
    }
    let entries: Vec<_> = hive.entries().map(|(pos, v)| (pos, *v)).collect();
    assert_eq!(entries[4], (p[4], 40));
    assert_eq!(hive.iter().len(), 6);
    *hive.get_mut(p[0]).unwrap() = 1;
    assert_eq!(hive.get(p[0]), Some(&1));
}

#[test]
fn drop_releases_elements_and_blocks() {
    let token = Rc::new(());
    let alloc = BudgetAlloc::unbounded();
    {
        let mut hive = Hive::with_limits_in(limits(4, 8), alloc.clone());
        let positions: Vec<_> = (0..30).map(|_| hive.insert(Rc::clone(&token))).collect();
        for pos in positions.into_iter().step_by(3) {
            hive.erase(pos);
        }
        hive.reserve(100);
        assert_eq!(Rc::strong_count(&token), 21);
        assert!(alloc.live_allocations() > 0);
    }
    assert_eq!(Rc::strong_count(&token), 1);
    assert_eq!(alloc.live_allocations(), 0);
    assert_eq!(alloc.in_use(), 0);
}

#[test]
fn into_iter_yields_in_order_and_drops_the_rest() {
    let token = Rc::new(());
    let mut hive = Hive::with_limits(limits(4, 4));
    for i in 0..10 {
        hive.insert((i, Rc::clone(&token)));
    }
    let mut iter = hive.into_iter();
    assert_eq!(iter.len(), 10);
    let firsts: Vec<_> = iter.by_ref().take(5).map(|(i, _)| i).collect();
    assert_eq!(firsts, vec![0, 1, 2, 3, 4]);
    assert_eq!(iter.len(), 5);
    drop(iter);
    assert_eq!(Rc::strong_count(&token), 1);
}

#[test]
fn clone_copies_contents_and_limits() {
    let (hive, _) = filled(limits(4, 8), 11);
    let copy = hive.clone();
    assert_eq!(contents(&copy), contents(&hive));
    assert_eq!(copy.block_limits(), hive.block_limits());
    copy.check_invariants();
}

#[test]
fn swap_exchanges_everything() {
    let (mut a, _) = filled(limits(4, 4), 3);
    let mut b = Hive::with_limits(limits(8, 8));
    b.insert(42);
    a.swap(&mut b);
    assert_eq!(contents(&a), vec![42]);
    assert_eq!(contents(&b), vec![0, 1, 2]);
    assert_eq!(a.block_limits(), limits(8, 8));
}

#[test]
fn debug_lists_elements() {
    let (hive, _) = filled(limits(4, 4), 3);
    assert_eq!(format!("{hive:?}"), "[0, 1, 2]");
    assert_eq!(format!("{:?}", hive.end()), "Position(end)");
}
