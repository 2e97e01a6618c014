use super::*;

#[test]
fn string_input_chunks() {
    let mut input = StringInput::with_chunk_size("hello world", 4);
    assert_eq!(input.read(0).unwrap(), b"hell");
    assert_eq!(input.read(4).unwrap(), b"o wo");
    assert_eq!(input.read(8).unwrap(), b"rld");
    assert_eq!(input.read(11).unwrap(), b"");
    assert_eq!(input.read(100).unwrap(), b"");
}

#[test]
fn string_input_is_pure() {
    let mut input = StringInput::with_chunk_size("abc", 2);
    assert_eq!(input.read(1).unwrap(), b"bc");
    assert_eq!(input.read(1).unwrap(), b"bc");
}

#[test]
fn spy_coalesces_contiguous_reads() {
    let mut spy = SpyInput::new("abcdefgh", 3);
    spy.read(0).unwrap();
    spy.read(3).unwrap();
    spy.read(6).unwrap();
    assert_eq!(spy.strings_read(), ["abcdefgh"]);
}

#[test]
fn spy_splits_on_seek() {
    let mut spy = SpyInput::new("abcdefgh", 2);
    spy.read(0).unwrap();
    spy.read(6).unwrap();
    assert_eq!(spy.strings_read(), ["ab", "gh"]);
}

#[test]
fn spy_ignores_empty_reads() {
    let mut spy = SpyInput::new("ab", 2);
    spy.read(0).unwrap();
    spy.read(2).unwrap();
    assert_eq!(spy.strings_read(), ["ab"]);
}

#[test]
fn spy_edits_are_visible_to_reads() {
    let mut spy = SpyInput::new("ac", 8);
    spy.insert(1, "b");
    assert_eq!(spy.read(0).unwrap(), b"abc");
    spy.delete(0, 2);
    assert_eq!(spy.text(), "c");
}

#[test]
fn spy_clone_shares_state() {
    let spy = SpyInput::new("abcd", 2);
    let mut handle = spy.clone();
    handle.read(0).unwrap();
    assert_eq!(spy.strings_read(), ["ab"]);
    spy.clear();
    assert!(spy.strings_read().is_empty());
}
