//! Numeric ordering of tag numbers.
//!
//! Tags are handed out by the value of the digits embedded in their number,
//! so `"2"` precedes `"10"` and `"T-009"` precedes `"T-010"`. Numbers without
//! digits sort after all numbered tags, lexically.

use std::cmp::Ordering;

use super::model::Tag;

/// Sort key derived from a tag number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagNumberKey {
    no_digits: bool,
    value: u64,
    raw: String,
}

impl TagNumberKey {
    /// Build the key for `tag_number`.
    pub fn new(tag_number: &str) -> Self {
        let mut value: u64 = 0;
        let mut seen = false;
        for digit in tag_number.chars().filter_map(|c| c.to_digit(10)) {
            seen = true;
            value = value.saturating_mul(10).saturating_add(u64::from(digit));
        }
        Self {
            no_digits: !seen,
            value,
            raw: tag_number.to_string(),
        }
    }

    /// The embedded numeric value, if the number has digits.
    pub fn value(&self) -> Option<u64> {
        (!self.no_digits).then_some(self.value)
    }
}

/// Compare two tag numbers by embedded numeric value.
pub fn tag_number_order(a: &str, b: &str) -> Ordering {
    TagNumberKey::new(a).cmp(&TagNumberKey::new(b))
}

/// Sort tags in place, lowest tag number first.
pub fn sort_by_tag_number(tags: &mut [Tag]) {
    tags.sort_by_cached_key(|t| TagNumberKey::new(&t.tag_number));
}
