//! # Stage Sanitation
//!
//! Turns arbitrary (already lowercased) text into a valid [`Stage`].
//!
//! Steps, in order:
//! 1. every character outside `[a-z0-9-]` becomes `-`
//! 2. hyphen runs collapse to a single `-`
//! 3. leading and trailing hyphens are stripped
//! 4. the result is cut to [`MAX_STAGE_LEN`] characters
//! 5. an empty result becomes `"local"`
//!
//! Cutting can expose a hyphen at the new end, so trailing hyphens are
//! stripped once more after step 4.

use crate::types::{MAX_STAGE_LEN, Stage};

/// Sanitize raw text into a stage identifier.
///
/// Idempotent: `sanitize_stage(sanitize_stage(x).as_str()) == sanitize_stage(x)`.
#[must_use]
pub fn sanitize_stage(raw: &str) -> Stage {
    let mut collapsed = String::with_capacity(raw.len().min(MAX_STAGE_LEN * 4));

    for ch in raw.chars() {
        let mapped = if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            ch
        } else {
            '-'
        };

        // Leading hyphens and hyphen runs never make it into the buffer.
        if mapped == '-' && (collapsed.is_empty() || collapsed.ends_with('-')) {
            continue;
        }
        collapsed.push(mapped);
    }

    // Only ASCII survives the mapping, so byte length == char count here.
    let trimmed = collapsed.trim_end_matches('-');
    let cut = &trimmed[..trimmed.len().min(MAX_STAGE_LEN)];
    let cut = cut.trim_end_matches('-');

    if cut.is_empty() {
        Stage::local()
    } else {
        Stage::from_normalized(cut.to_string())
    }
}
