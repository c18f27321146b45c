use regex::Regex;
use thiserror::Error;

/// Errors related to A1-style cell reference parsing.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Invalid cell reference '{0}'")]
    FormatError(String),
}

/// Converts 0-based row & column indices to an A1-style cell reference (e.g., "A1", "B2").
pub fn index_to_reference(row: usize, col: usize) -> String {
    let row = (row + 1).to_string();
    let mut col: u32 = col as u32 + 1;
    let mut reference = String::new();
    while col > 0 {
        col -= 1;
        let digit = char::from_u32(65 + col % 26).expect("Hardcode letters");
        col /= 26;
        reference.insert(0, digit);
    }
    reference.push_str(row.as_str());
    reference
}

/// Converts column letters to a 0-based column index ("A" = 0, "AA" = 26).
/// Returns None for an empty string.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for letter in letters.chars() {
        index = index * 26 + (letter as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

/// Converts a 1-based row number string to a 0-based row index.
/// Returns None for an empty string.
pub fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().map(|row| row - 1)
}

/// Parses an A1-style cell reference into 0-based (row, column) indices.
pub fn parse_reference(reference: &str) -> Result<(usize, usize), ReferenceError> {
    let pattern = Regex::new(r"^([A-Z]+)([1-9]\d*)$").expect("Hardcode regex pattern");
    let value = reference.to_ascii_uppercase();
    let captures = pattern
        .captures(value.as_str())
        .ok_or_else(|| ReferenceError::FormatError(reference.to_owned()))?;
    let col = captures
        .get(1)
        .map(|matcher| matcher.as_str())
        .and_then(col_to_index)
        .ok_or_else(|| ReferenceError::FormatError(reference.to_owned()))?;
    let row = captures
        .get(2)
        .map(|matcher| matcher.as_str())
        .and_then(row_to_index)
        .ok_or_else(|| ReferenceError::FormatError(reference.to_owned()))?;
    Ok((row, col))
}
