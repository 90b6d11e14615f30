use proptest::prelude::*;

use crate::{LinkId, LinkTable};

fn filled(table: &mut LinkTable<i32>, data: impl IntoIterator<Item = i32>) -> LinkId {
    let head = table.alloc(i32::MIN);
    for value in data {
        let link = table.alloc(value);
        table.append(head, link);
    }
    head
}

fn values(table: &LinkTable<i32>, head: LinkId) -> Vec<i32> {
    table.iter(head).map(|link| table.tag(link)).collect()
}

fn values_rev(table: &LinkTable<i32>, head: LinkId) -> Vec<i32> {
    table.iter(head).rev().map(|link| table.tag(link)).collect()
}

#[test]
fn empty_list() {
    let mut table = LinkTable::<i32>::new();
    let head = table.alloc(0);

    assert_eq!(table.next(head), head);
    assert_eq!(table.prev(head), head);
    assert!(table.is_empty(head));
    assert_eq!(table.iter(head).count(), 0);
    assert_eq!(table.iter(head).rev().count(), 0);
    assert_eq!(table.first(head), None);
    assert_eq!(table.last(head), None);
    assert_eq!(table.walk(head).next(&table), None);
}

#[test]
fn iterate_list() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..256);

    assert_eq!(table.len(head), 256);
    assert_eq!(values(&table, head), (0..256).collect::<Vec<_>>());
    assert_eq!(values_rev(&table, head), (0..256).rev().collect::<Vec<_>>());
    assert_eq!(table.index(head, 17).map(|link| table.tag(link)), Some(17));
    assert_eq!(table.index(head, 256), None);
}

#[test]
fn iterate_from_both_ends() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..5);

    let mut iter = table.iter(head);
    let picked: Vec<_> = [
        iter.next(),
        iter.next_back(),
        iter.next(),
        iter.next_back(),
        iter.next(),
        iter.next_back(),
        iter.next(),
    ]
    .into_iter()
    .map(|link| link.map(|link| table.tag(link)))
    .collect();

    assert_eq!(picked, [Some(0), Some(4), Some(1), Some(3), Some(2), None, None]);
}

#[test]
fn split_list() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..256);
    let odd = table.alloc(i32::MIN);

    let mut walk = table.walk(head);
    while let Some(link) = walk.next(&table) {
        if table.tag(link) % 2 != 0 {
            table.unlink(link);
            table.append(odd, link);
        }
    }

    assert_eq!(values(&table, head), (0..128).map(|i| 2 * i).collect::<Vec<_>>());
    assert_eq!(values_rev(&table, head), (0..128).map(|i| 254 - 2 * i).collect::<Vec<_>>());
    assert_eq!(values(&table, odd), (0..128).map(|i| 2 * i + 1).collect::<Vec<_>>());
    assert_eq!(values_rev(&table, odd), (0..128).map(|i| 255 - 2 * i).collect::<Vec<_>>());
}

#[test]
fn clear_list() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..256);

    let mut walk = table.walk(head);
    while let Some(link) = walk.next(&table) {
        table.unlink(link);
        table.init(link);
    }

    assert_eq!(table.next(head), head);
    assert_eq!(table.prev(head), head);
    assert!(table.is_empty(head));
    assert_eq!(table.iter(head).count(), 0);
    assert_eq!(table.iter(head).rev().count(), 0);
}

#[test]
fn walk_back_tolerates_unlinking() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..6);

    let mut seen = Vec::new();
    let mut walk = table.walk_back(head);
    while let Some(link) = walk.next(&table) {
        seen.push(table.tag(link));
        if table.tag(link) >= 3 {
            table.unlink(link);
            table.init(link);
        }
    }

    assert_eq!(seen, [5, 4, 3, 2, 1, 0]);
    assert_eq!(values(&table, head), [0, 1, 2]);
}

#[test]
fn swap_list() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..256);
    let head2 = filled(&mut table, (0..256).map(|i: i32| -i));

    let mut iter2 = table.next(head2);
    let mut walk = table.walk(head);
    while let Some(link) = walk.next(&table) {
        let next2 = table.next(iter2);
        table.swap(link, iter2);
        iter2 = next2;
    }
    assert_eq!(iter2, head2);

    assert_eq!(values(&table, head), (0..256).map(|i: i32| -i).collect::<Vec<_>>());
    assert_eq!(values_rev(&table, head), (0..256).map(|i| i - 255).collect::<Vec<_>>());
    assert_eq!(values(&table, head2), (0..256).collect::<Vec<_>>());
    assert_eq!(values_rev(&table, head2), (0..256).rev().collect::<Vec<_>>());
}

#[test]
fn swap_neighbours() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..4);
    let second = table.index(head, 1).unwrap();
    let third = table.index(head, 2).unwrap();

    table.swap(second, third);
    assert_eq!(values(&table, head), [0, 2, 1, 3]);

    table.swap(second, third);
    assert_eq!(values(&table, head), [0, 1, 2, 3]);

    table.swap(second, second);
    assert_eq!(values(&table, head), [0, 1, 2, 3]);
}

#[test]
fn swap_with_detached() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..3);
    let loose = table.alloc(42);
    let middle = table.index(head, 1).unwrap();

    table.swap(loose, middle);

    assert_eq!(values(&table, head), [0, 42, 2]);
    assert!(table.is_detached(middle));

    table.swap(middle, loose);
    assert_eq!(values(&table, head), [0, 1, 2]);
    assert!(table.is_detached(loose));
}

#[test]
fn replace_keeps_position() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 0..3);
    let loose = table.alloc(7);
    let last = table.last(head).unwrap();

    table.replace(last, loose);
    table.init(last);

    assert_eq!(values(&table, head), [0, 1, 7]);
    assert!(table.is_detached(last));
}

#[test]
fn splice_lists() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, 3..5);
    let front = filled(&mut table, 0..3);
    let back = filled(&mut table, 5..7);
    let empty = table.alloc(i32::MIN);

    table.prepend_list(head, front);
    table.init(front);
    table.append_list(head, back);
    table.init(back);
    table.append_list(head, empty);

    assert_eq!(values(&table, head), [0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(values_rev(&table, head), [6, 5, 4, 3, 2, 1, 0]);
    assert!(table.is_empty(front));
    assert!(table.is_empty(back));
}

#[test]
fn insert_relative_to_members() {
    let mut table = LinkTable::new();
    let head = filled(&mut table, [1, 3]);
    let first = table.first(head).unwrap();
    let last = table.last(head).unwrap();

    let two = table.alloc(2);
    table.insert_after(first, two);
    let zero = table.alloc(0);
    table.prepend(head, zero);
    let four = table.alloc(4);
    table.insert_after(last, four);

    assert_eq!(values(&table, head), [0, 1, 2, 3, 4]);
}

proptest! {
    #[test]
    fn forward_and_backward_agree(data in prop::collection::vec(any::<i32>(), 0..64)) {
        let mut table = LinkTable::new();
        let head = filled(&mut table, data.iter().copied());

        let mut backward = values_rev(&table, head);
        backward.reverse();
        prop_assert_eq!(values(&table, head), data.clone());
        prop_assert_eq!(backward, data.clone());
        prop_assert_eq!(table.len(head), data.len());
    }

    #[test]
    fn swaps_match_vec_swaps(
        len in 1usize..32,
        pairs in prop::collection::vec((0usize..32, 0usize..32), 0..32),
    ) {
        let mut table = LinkTable::new();
        let head = filled(&mut table, 0..len as i32);
        let links: Vec<_> = table.iter(head).collect();
        let mut model: Vec<i32> = (0..len as i32).collect();

        for (a, b) in pairs {
            let (a, b) = (a % len, b % len);
            let (pos_a, pos_b) = (
                model.iter().position(|&v| v == a as i32).unwrap(),
                model.iter().position(|&v| v == b as i32).unwrap(),
            );
            model.swap(pos_a, pos_b);
            table.swap(links[a], links[b]);
        }

        prop_assert_eq!(values(&table, head), model.clone());
        let mut backward = values_rev(&table, head);
        backward.reverse();
        prop_assert_eq!(backward, model);
    }
}
