//! Column address codec

use proptest::prelude::*;
use tabula::address::{index_to_letters, letters_to_index, CellRef, RangeRef};

#[test]
fn test_literal_cases() {
    for (index, letters) in [(0, "A"), (1, "B"), (25, "Z"), (26, "AA"), (51, "AZ"), (52, "BA"), (115, "DL"), (766, "ACM")] {
        assert_eq!(index_to_letters(index), letters);
        assert_eq!(letters_to_index(letters), Some(index));
    }
}

#[test]
fn test_excel_last_column() {
    assert_eq!(index_to_letters(16_383), "XFD");
}

#[test]
fn test_references_render_a1() {
    let start = CellRef::new(0, 1);
    let end = CellRef::new(27, 20);
    assert_eq!(start.to_string(), "A1");
    assert_eq!(RangeRef::new(start, end).to_string(), "A1:AB20");
}

proptest! {
    #[test]
    fn test_codec_bijection(index in 0usize..10_000_000) {
        prop_assert_eq!(letters_to_index(&index_to_letters(index)), Some(index));
    }

    #[test]
    fn test_letters_are_uppercase_alpha(index in 0usize..1_000_000) {
        let letters = index_to_letters(index);
        prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
        prop_assert_eq!(letters_to_index(&letters.to_lowercase()), Some(index));
    }
}
