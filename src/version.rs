//! Version comparison policy for edition updates
//!
//! Vendor versions are opaque digit strings (dates like `20240101` or plain
//! sequence numbers). When both sides are pure digit runs they are compared
//! numerically, tolerating leading zeros and arbitrary length; anything else
//! falls back to equality-only comparison. Plain string ordering would treat
//! `"9"` as newer than `"10"`, so it is deliberately not used.

use std::cmp::Ordering;

/// Whether an update is required for an edition.
///
/// Required when no marker has ever been written (first sync), when the
/// caller forces it, or when the marker differs from the vendor's published
/// version under the numeric-aware policy.
pub fn update_required(current: Option<&str>, latest: &str, force: bool) -> bool {
    match current {
        None => true,
        Some(current) => force || versions_differ(current, latest),
    }
}

/// Whether two version strings differ under the comparison policy.
///
/// Pure digit strings compare numerically, so `"09"` and `"9"` are the same
/// version. Mixed strings compare for equality only.
pub fn versions_differ(current: &str, latest: &str) -> bool {
    if is_digit_run(current) && is_digit_run(latest) {
        numeric_cmp(current, latest) != Ordering::Equal
    } else {
        current != latest
    }
}

/// Numeric ordering of two digit strings without parsing into an integer,
/// so arbitrarily long versions cannot overflow.
pub fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn is_digit_run(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
