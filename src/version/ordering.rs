//! Orderings used to pick the last release out of the tag listing.

use serde::Deserialize;
use std::cmp::Ordering;

/// How tag names are ordered when looking for the last release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagOrder {
    /// Plain byte-wise comparison; `2.9.0` sorts after `2.10.0`
    Lexical,
    /// Numeric runs compare as numbers; `2.10.0` sorts after `2.9.0`
    #[default]
    Version,
}

impl TagOrder {
    /// Compare two tag names
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            TagOrder::Lexical => a.trim_start().cmp(b.trim_start()),
            TagOrder::Version => compare_versions(a, b),
        }
    }

    /// Greatest tag under this ordering
    pub fn latest<S: AsRef<str>>(self, tags: &[S]) -> Option<&str> {
        tags.iter()
            .map(AsRef::as_ref)
            .max_by(|a, b| self.compare(a, b))
    }
}

/// Natural version comparison.
///
/// Names are split into runs of digits and non-digits. Digit runs compare by
/// numeric value (leading zeros ignored), other runs byte-wise. When one name
/// is a prefix of the other, the shorter one sorts first.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (is_numeric(x), is_numeric(y)) {
                    (true, true) => compare_numeric(x, y),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn is_numeric(chunk: &str) -> bool {
    chunk.bytes().all(|b| b.is_ascii_digit())
}

// Digit runs may exceed u64, so compare by significant length first.
fn compare_numeric(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
