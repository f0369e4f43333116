use cordyceps_avl::AvlMap;
use pretty_assertions::assert_eq;

fn collect(map: &AvlMap<u32, &'static str>) -> Vec<(u32, &'static str)> {
    map.iter().map(|(&k, &v)| (k, v)).collect()
}

#[test]
fn empty_map() {
    let mut map: AvlMap<u32, &str> = AvlMap::new();

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.height(), 0);
    assert_eq!(map.get(&1), None);
    assert_eq!(map.remove(&1), None);
    assert_eq!(map.first_key_value(), None);
    assert_eq!(map.pop_last(), None);
    assert_eq!(map.check_invariants(), Ok(()));
}

#[test]
fn insert_overwrites_existing_value() {
    let mut map = AvlMap::new();

    assert_eq!(map.insert(2, "two"), None);
    assert_eq!(map.insert(1, "one"), None);
    assert_eq!(map.insert(2, "deux"), Some("two"));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&2), Some(&"deux"));
    assert_eq!(collect(&map), vec![(1, "one"), (2, "deux")]);
}

#[test]
fn get_mut_updates_in_place() {
    let mut map: AvlMap<u32, u32> = (0..10).map(|k| (k, k)).collect();

    *map.get_mut(&7).expect("key 7 was inserted") += 100;

    assert_eq!(map.get(&7), Some(&107));
    assert_eq!(map.get_mut(&70), None);
}

#[test]
fn remove_returns_value_and_keeps_order() {
    let mut map: AvlMap<u32, &str> = [(5, "e"), (1, "a"), (3, "c"), (4, "d"), (2, "b")]
        .into_iter()
        .collect();

    assert_eq!(map.remove(&3), Some("c"));
    assert_eq!(map.remove(&3), None);
    assert_eq!(map.check_invariants(), Ok(()));
    assert_eq!(collect(&map), vec![(1, "a"), (2, "b"), (4, "d"), (5, "e")]);
}

#[test]
fn pops_drain_from_both_ends() {
    let mut map: AvlMap<u32, u32> = (1..=5).map(|k| (k, k * k)).collect();

    assert_eq!(map.first_key_value(), Some((&1, &1)));
    assert_eq!(map.last_key_value(), Some((&5, &25)));

    assert_eq!(map.pop_first(), Some((1, 1)));
    assert_eq!(map.pop_last(), Some((5, 25)));
    assert_eq!(map.pop_first(), Some((2, 4)));

    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![9, 16]);
}

#[test]
fn descending_inserts_stay_balanced() {
    let mut map = AvlMap::new();

    for key in (0..255u32).rev() {
        map.insert(key, ());
    }

    assert_eq!(map.check_invariants(), Ok(()));
    assert_eq!(map.len(), 255);
    assert_eq!(map.height(), 8);
}

#[test]
fn interleaved_removals_keep_invariants() {
    let mut map: AvlMap<u32, u32> = (0..200).map(|k| (k, k)).collect();

    for key in (0..200).step_by(3) {
        assert_eq!(map.remove(&key), Some(key));
        assert_eq!(map.check_invariants(), Ok(()));
    }

    let expected: Vec<u32> = (0..200).filter(|k| k % 3 != 0).collect();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), expected);

    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.check_invariants(), Ok(()));
}

#[test]
fn borrowed_lookups() {
    let mut map = AvlMap::new();
    map.insert(String::from("pear"), 3);
    map.insert(String::from("apple"), 1);

    assert!(map.contains_key("apple"));
    assert_eq!(map.get("pear"), Some(&3));
    assert_eq!(map.remove("apple"), Some(1));
    assert!(!map.contains_key("apple"));
}

#[test]
fn debug_lists_entries_in_order() {
    let map: AvlMap<u32, char> = [(2, 'b'), (1, 'a')].into_iter().collect();

    assert_eq!(format!("{map:?}"), "{1: 'a', 2: 'b'}");
}
