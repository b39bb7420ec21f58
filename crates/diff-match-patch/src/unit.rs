//! UTF-16 code-unit text model.
//!
//! Every engine in this crate indexes, slices, and counts in UTF-16 code
//! units, because the delta and patch wire formats carry unit offsets and
//! lengths. Strings are re-encoded once at the public API boundary and all
//! internal work happens on `&[u16]` slices.

/// A text held as UTF-16 code units.
pub(crate) type Units = Vec<u16>;

pub(crate) fn encode(text: &str) -> Units {
    text.encode_utf16().collect()
}

/// Lossy conversion back to a Rust string. A payload may legally begin or
/// end mid-surrogate-pair (a delta `=N` token or a bisect split point can
/// fall between the halves); those lone halves become U+FFFD here while the
/// unit-level data stays exact.
pub(crate) fn decode(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// `String.prototype.indexOf` over unit slices: first occurrence of
/// `needle` at or after `from`. An empty needle matches at `from` clamped
/// to the haystack length.
pub(crate) fn index_of(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    let from = from.min(haystack.len());
    if needle.is_empty() {
        return Some(from);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// `String.prototype.lastIndexOf` over unit slices: last occurrence whose
/// start index is at most `from`.
pub(crate) fn last_index_of(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let start = from.min(haystack.len() - needle.len());
    (0..=start)
        .rev()
        .find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Length of the longest common prefix, by exponentially-narrowing binary
/// search over slice equality.
pub(crate) fn common_prefix(a: &[u16], b: &[u16]) -> usize {
    if a.is_empty() || b.is_empty() || a[0] != b[0] {
        return 0;
    }
    let mut min = 0;
    let mut max = a.len().min(b.len());
    let mut mid = max;
    let mut start = 0;
    while min < mid {
        if a[start..mid] == b[start..mid] {
            min = mid;
            start = min;
        } else {
            max = mid;
        }
        mid = (max - min) / 2 + min;
    }
    mid
}

/// Length of the longest common suffix, same search from the other end.
pub(crate) fn common_suffix(a: &[u16], b: &[u16]) -> usize {
    if a.is_empty() || b.is_empty() || a[a.len() - 1] != b[b.len() - 1] {
        return 0;
    }
    let mut min = 0;
    let mut max = a.len().min(b.len());
    let mut mid = max;
    let mut end = 0;
    while min < mid {
        if a[a.len() - mid..a.len() - end] == b[b.len() - mid..b.len() - end] {
            min = mid;
            end = min;
        } else {
            max = mid;
        }
        mid = (max - min) / 2 + min;
    }
    mid
}

/// Length of the longest suffix of `a` that is a prefix of `b`.
///
/// Uses the quadratic-worst-case doubling scan; per Knuth-Morris-Pratt the
/// worst case is rare enough in practice that the simple form wins.
pub(crate) fn common_overlap(a: &[u16], b: &[u16]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    // Truncate to equal lengths.
    let a = if a.len() > b.len() {
        &a[a.len() - b.len()..]
    } else {
        a
    };
    let b = if b.len() > a.len() { &b[..a.len()] } else { b };
    let text_length = a.len();
    if a == b {
        return text_length;
    }

    let mut best = 0;
    let mut length = 1;
    loop {
        let pattern = &a[text_length - length..];
        let Some(found) = index_of(b, pattern, 0) else {
            return best;
        };
        length += found;
        if found == 0 || a[text_length - length..] == b[..length] {
            best = length;
            length += 1;
        }
        if length > text_length {
            return best;
        }
    }
}
