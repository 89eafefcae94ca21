//! Name normalization.
//!
//! A raw name is split on `.`; each segment is trimmed, lowercased and checked
//! against the current [`ParamsProvider`] bounds and the character rule.
//! Segment lengths are measured in UTF-8 bytes.

use crate::errors::{NameError, Result};
use dotname_types::ParamsProvider;
use unicode_general_category::{get_general_category, GeneralCategory};
use uuid::Uuid;

/// Normalize `name` into its stored form.
///
/// Bounds are read from `params` on every call.
pub fn normalize<P: ParamsProvider + ?Sized>(params: &P, name: &str) -> Result<String> {
    let min = params.min_segment_length();
    let max = params.max_segment_length();

    let mut segments = Vec::new();
    for raw in name.split('.') {
        let segment = raw.trim().to_lowercase();
        let len = segment.len();
        if len < min as usize {
            return Err(NameError::SegmentTooShort { segment, min });
        }
        if len > max as usize {
            return Err(NameError::SegmentTooLong { segment, max });
        }
        if !is_valid_segment(&segment) {
            return Err(NameError::NameInvalid {
                name: name.to_string(),
            });
        }
        segments.push(segment);
    }

    let max_levels = params.max_name_levels();
    if segments.len() > max_levels as usize {
        return Err(NameError::TooManySegments {
            levels: segments.len(),
            max: max_levels,
        });
    }
    Ok(segments.join("."))
}

/// Character rule for a single, already lowercased segment.
///
/// UUIDs are accepted as-is. Anything else may hold at most one `-`, and every
/// other character must be a lowercase letter (`Ll`) or decimal digit (`Nd`).
pub fn is_valid_segment(segment: &str) -> bool {
    if is_valid_uuid(segment) {
        return true;
    }
    if segment.matches('-').count() > 1 {
        return false;
    }
    segment.chars().all(|c| c == '-' || is_lower_or_digit(c))
}

fn is_valid_uuid(segment: &str) -> bool {
    Uuid::parse_str(segment).is_ok()
}

fn is_lower_or_digit(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::LowercaseLetter | GeneralCategory::DecimalNumber
    )
}
