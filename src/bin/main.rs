use cordyceps_avl::AvlMap;

// Prints the tree built from ascending inserts, then again after removing its three smallest
// keys. Pipe the output through `dot -Tsvg` to view it.
fn main() -> std::fmt::Result {
    let mut map = AvlMap::new();

    for key in 1..=7u32 {
        map.insert(key, key * 10);
        map.check_invariants().expect("tree invariants violated");
    }

    let mut out = String::new();
    map.dotgraph("ascending", &mut out)?;
    println!("{out}");

    for key in 1..=3 {
        let value = map.remove(&key);
        assert_eq!(value, Some(key * 10));
        map.check_invariants().expect("tree invariants violated");
    }

    out.clear();
    map.dotgraph("trimmed", &mut out)?;
    println!("{out}");

    println!("{map:?}");

    Ok(())
}
