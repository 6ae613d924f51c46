//! Spreadsheet column letters and A1-style references
//!
//! Columns use bijective base-26 (no zero digit): 0 → A, 25 → Z, 26 → AA.

use std::fmt;

/// Convert a zero-based column index to its column letters
///
/// Examples:
/// - 0 → A
/// - 25 → Z
/// - 26 → AA
/// - 766 → ACM
pub fn index_to_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut idx = index;

    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Convert column letters back to a zero-based index. Lowercase is accepted.
///
/// Returns `None` for empty input, non-letters, or overflow.
pub fn letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut result: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let value = (b.to_ascii_uppercase() - b'A') as usize + 1;
        result = result.checked_mul(26)?.checked_add(value)?;
    }
    Some(result - 1)
}

/// A single cell reference such as `B7`. Rows are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: usize,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: usize, row: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", index_to_letters(self.column), self.row)
    }
}

/// A rectangular range such as `A1:B2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
