//! Ordering key extraction.
//!
//! The key is read from a single metadata tag of each slice, Content Time
//! `(0008,0033)` unless configured otherwise.

use crate::{enums::KeyParsing, error::AssemblyError, slice::Slice};

use dicom::core::Tag;
use dicom_dictionary_std::tags;
use std::path::Path;

pub const DEFAULT_ORDERING_TAG: Tag = tags::CONTENT_TIME;

#[derive(Clone, Copy, Debug)]
pub struct OrderingKeyExtractor {
    tag: Tag,
    parsing: KeyParsing,
}

impl Default for OrderingKeyExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ORDERING_TAG, KeyParsing::default())
    }
}

impl OrderingKeyExtractor {
    pub fn new(tag: Tag, parsing: KeyParsing) -> Self {
        Self { tag, parsing }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Extract the ordering key of `slice`, read from the file at `path`.
    ///
    /// # Errors
    ///
    /// `MissingTag` if the slice has no value for the tag, `MalformedTag` if
    /// the value does not parse as a finite number.
    pub fn extract_key(&self, slice: &Slice, path: &Path) -> Result<f64, AssemblyError> {
        let value = slice
            .metadata
            .get(&self.tag)
            .ok_or_else(|| AssemblyError::MissingTag {
                path: path.to_path_buf(),
                tag: self.tag,
            })?;

        let parsed = match self.parsing {
            KeyParsing::Permissive => parse_permissive(value),
            KeyParsing::Strict => parse_strict(value),
        };

        parsed
            .filter(|key| key.is_finite())
            .ok_or_else(|| AssemblyError::MalformedTag {
                path: path.to_path_buf(),
                tag: self.tag,
                value: value.clone(),
            })
    }
}

/// Parse the longest numeric prefix of `value` after leading whitespace.
pub fn parse_permissive(value: &str) -> Option<f64> {
    let text = value.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse().ok()
}

/// Parse the whole value, ignoring DICOM space/NUL padding.
pub fn parse_strict(value: &str) -> Option<f64> {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .parse()
        .ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
