use std::collections::BTreeMap;

use expect_test::expect;
use proptest::prelude::*;

use crate::Interner;

const C1: &str = "This is a string";
const C2: &str = "Insert this in the dict";
const C3: &str = "I'm made of characters";
const C4: &str = "I'm a sequence";

fn dump(interner: &Interner) -> String {
    interner
        .iter()
        .map(|(symbol, text)| format!("{text:?} x{}\n", interner.refcount(symbol)))
        .collect()
}

#[test]
fn empty_dict() {
    let mut interner = Interner::new();
    interner.delete("Hello, World!");
    assert!(interner.is_empty());
    assert_eq!(interner.lookup("Hello, World!"), None);
    interner.assert_invariants();
}

#[test]
fn insert_vals() {
    let mut interner = Interner::new();
    let symbols: Vec<_> = [C1, C2, C3, C4].into_iter().map(|c| interner.insert(c)).collect();

    for (symbol, content) in symbols.iter().zip([C1, C2, C3, C4]) {
        let resolved = interner.resolve(*symbol);
        assert_eq!(resolved, content);
        assert_ne!(resolved.as_ptr(), content.as_ptr());
        assert_eq!(interner.lookup(content), Some(*symbol));
    }
    assert_eq!(interner.len(), 4);
    interner.assert_invariants();
}

#[test]
fn delete_vals() {
    let mut interner = Interner::new();
    for content in [C1, C2, C3, C4] {
        interner.insert(content);
    }

    let all = [C1, C2, C3, C4];
    for removed in 0..all.len() {
        interner.delete(all[removed]);
        interner.assert_invariants();
        for (i, content) in all.iter().enumerate() {
            let symbol = interner.lookup(content);
            if i <= removed {
                assert_eq!(symbol, None, "{content:?} should be gone");
            } else {
                assert_eq!(symbol.map(|s| interner.resolve(s)), Some(*content));
            }
        }
    }
    assert!(interner.is_empty());
}

#[test]
fn insert_twice() {
    let mut interner = Interner::new();
    let s1 = interner.insert(C1);
    let s2 = interner.insert(C1);

    assert_eq!(s1, s2);
    assert_eq!(interner.resolve(s1).as_ptr(), interner.resolve(s2).as_ptr());
    assert_eq!(interner.refcount(s1), 2);

    interner.delete(C1);
    assert_eq!(interner.lookup(C1), Some(s1));

    interner.delete(C1);
    assert_eq!(interner.lookup(C1), None);
    assert!(!interner.is_live(s1));
}

#[test]
fn n_inserts_survive_n_minus_one_deletes() {
    let mut interner = Interner::new();
    let symbol = (0..5).map(|_| interner.insert("shared")).last().unwrap();
    interner.insert("other");

    for _ in 0..4 {
        interner.delete("shared");
        assert_eq!(interner.lookup("shared"), Some(symbol));
    }
    assert_eq!(interner.refcount(symbol), 1);

    interner.delete("shared");
    assert_eq!(interner.lookup("shared"), None);
    assert_eq!(interner.len(), 1);
}

#[test]
fn retain_and_release() {
    let mut interner = Interner::new();
    let symbol = interner.insert("name");
    interner.retain(symbol);
    assert_eq!(interner.release(symbol), 1);
    assert_eq!(interner.release(symbol), 0);
    assert!(interner.is_empty());
}

#[test]
#[should_panic = "was released"]
fn stale_symbol_panics() {
    let mut interner = Interner::new();
    let symbol = interner.insert("gone");
    interner.release(symbol);
    interner.insert("reuses the slot");
    interner.resolve(symbol);
}

#[test]
#[should_panic = "was released"]
fn cleared_symbol_panics() {
    let mut interner = Interner::new();
    let symbol = interner.insert("gone");
    interner.clear();
    interner.resolve(symbol);
}

#[test]
#[should_panic = "belongs to another interner"]
fn foreign_symbol_panics() {
    let mut a = Interner::new();
    let mut b = Interner::new();
    let symbol = a.insert("same");
    b.insert("same");
    assert!(!b.is_live(symbol));
    b.resolve(symbol);
}

#[test]
fn released_bytes_stay_until_clear() {
    let mut interner = Interner::with_blob_size(64);
    for i in 0..100 {
        let symbol = interner.insert(&format!("value_{i:04}"));
        interner.release(symbol);
    }
    assert!(interner.is_empty());
    assert!(interner.stats().arena.blobs > 1);

    interner.clear();
    assert_eq!(interner.stats().arena.blobs, 0);
}

#[test]
fn symbols_survive_rebalancing() {
    let mut interner = Interner::new();
    let words = ["m", "d", "t", "a", "g", "p", "x", "b", "e", "h", "n", "q", "u", "y"];
    let symbols: Vec<_> = words.iter().map(|w| interner.insert(w)).collect();

    // Interior nodes hand their content to a neighbour on removal.
    for removed in ["m", "d", "t"] {
        interner.delete(removed);
        interner.assert_invariants();
    }

    for (word, symbol) in words.iter().zip(symbols) {
        if ["m", "d", "t"].contains(word) {
            assert!(!interner.is_live(symbol));
        } else {
            assert_eq!(interner.resolve(symbol), *word);
        }
    }
}

#[test]
fn iterates_in_byte_order() {
    let mut interner = Interner::new();
    for word in ["pear", "Apple", "apple", "", "banana", "apple", "Zebra", "äpfel"] {
        interner.insert(word);
    }
    interner.assert_invariants();

    expect![[r#"
        "" x1
        "Apple" x1
        "Zebra" x1
        "apple" x2
        "banana" x1
        "pear" x1
        "äpfel" x1
    "#]]
    .assert_eq(&dump(&interner));
}

#[test]
fn huge_string_round_trips() {
    let huge = "Lorem ipsum dolor sit amet. ".repeat(200);
    let mut interner = Interner::with_blob_size(64);
    let small = interner.insert("small");
    let big = interner.insert(&huge);
    let again = interner.insert(&huge);

    assert_eq!(big, again);
    assert_eq!(interner.resolve(big), huge);
    assert_eq!(interner.resolve(small), "small");
    assert!(interner.stats().arena.blobs >= 2);
}

#[test]
fn clear_empties_everything() {
    let mut interner = Interner::new();
    for word in ["a", "b", "c"] {
        interner.insert(word);
    }
    interner.clear();

    assert!(interner.is_empty());
    assert_eq!(interner.iter().count(), 0);
    assert_eq!(interner.stats().arena.blobs, 0);

    let symbol = interner.insert("b");
    assert_eq!(interner.resolve(symbol), "b");
    interner.assert_invariants();
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    Delete(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(0u8..24).prop_map(Op::Insert), (0u8..24).prop_map(Op::Delete)]
}

proptest! {
    #[test]
    fn matches_refcounted_model(ops in prop::collection::vec(op(), 0..200)) {
        let mut interner = Interner::with_blob_size(32);
        let mut model = BTreeMap::<String, u32>::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    let key = format!("key{key:02}");
                    let symbol = interner.insert(&key);
                    *model.entry(key.clone()).or_default() += 1;
                    prop_assert_eq!(interner.resolve(symbol), key.as_str());
                }
                Op::Delete(key) => {
                    let key = format!("key{key:02}");
                    interner.delete(&key);
                    if let Some(count) = model.get_mut(&key) {
                        *count -= 1;
                        if *count == 0 {
                            model.remove(&key);
                        }
                    }
                }
            }
            interner.assert_invariants();
        }

        let actual: Vec<_> = interner
            .iter()
            .map(|(symbol, text)| (text.to_owned(), interner.refcount(symbol)))
            .collect();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn interning_is_idempotent(words in prop::collection::vec("[a-z]{0,6}", 1..40)) {
        let mut interner = Interner::new();
        let first: Vec<_> = words.iter().map(|w| interner.insert(w)).collect();
        let second: Vec<_> = words.iter().map(|w| interner.insert(w)).collect();
        prop_assert_eq!(&first, &second);
        for (word, symbol) in words.iter().zip(&first) {
            prop_assert_eq!(interner.lookup(word), Some(*symbol));
        }
    }
}
