//! Approximate pattern location via the Bitap (shift-or) algorithm.
//!
//! The score of a candidate balances its error count against its distance
//! from the expected location; `match_threshold` is the rejection ceiling
//! and `match_distance` scales how fast proximity decays.

use std::collections::HashMap;

use thiserror::Error;

use crate::options::Options;
use crate::unit;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("pattern of {len} units exceeds the {max}-unit match limit")]
    PatternTooLong { len: usize, max: usize },
}

/// Locates the best instance of `pattern` in `text` near `loc`.
///
/// Returns `Ok(None)` when no occurrence scores under the threshold.
/// Offsets are in UTF-16 code units.
///
/// ```
/// use diff_match_patch::{bitap, Options};
///
/// let opts = Options::default();
/// assert_eq!(bitap::locate("abcdefghijk", "fgh", 5, &opts).unwrap(), Some(5));
/// assert_eq!(bitap::locate("abcdefghijk", "efxhi", 0, &opts).unwrap(), Some(2));
/// assert_eq!(bitap::locate("abcdef", "xyz", 3, &opts).unwrap(), None);
/// ```
pub fn locate(
    text: &str,
    pattern: &str,
    loc: usize,
    opts: &Options,
) -> Result<Option<usize>, MatchError> {
    locate_units(&unit::encode(text), &unit::encode(pattern), loc, opts)
}

pub(crate) fn locate_units(
    text: &[u16],
    pattern: &[u16],
    loc: usize,
    opts: &Options,
) -> Result<Option<usize>, MatchError> {
    let loc = loc.min(text.len());
    if text == pattern {
        // Shortcut (potentially not guaranteed by the algorithm).
        return Ok(Some(0));
    }
    if text.is_empty() {
        return Ok(None);
    }
    if loc + pattern.len() <= text.len() && &text[loc..loc + pattern.len()] == pattern {
        // Perfect match at the perfect spot.
        return Ok(Some(loc));
    }
    bitap(text, pattern, loc, opts)
}

fn bitap(
    text: &[u16],
    pattern: &[u16],
    loc: usize,
    opts: &Options,
) -> Result<Option<usize>, MatchError> {
    // State vectors are u64, so the effective pattern bound is the smaller
    // of `match_max_bits` and 64.
    let max_bits = opts.match_max_bits.min(64);
    if pattern.len() > max_bits {
        return Err(MatchError::PatternTooLong {
            len: pattern.len(),
            max: max_bits,
        });
    }

    let alphabet = alphabet(pattern);

    let score = |errors: usize, x: usize| -> f64 {
        let accuracy = errors as f64 / pattern.len() as f64;
        let proximity = (loc as isize - x as isize).unsigned_abs();
        if opts.match_distance == 0 {
            // Dodge divide by zero.
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f64 / opts.match_distance as f64
    };

    // Highest score beyond which we give up.
    let mut score_threshold = opts.match_threshold as f64;
    // Is there a nearby exact match? (speedup)
    if let Some(exact) = unit::index_of(text, pattern, loc) {
        score_threshold = score(0, exact).min(score_threshold);
        // What about in the other direction? (speedup)
        if let Some(exact_back) = unit::last_index_of(text, pattern, loc + pattern.len()) {
            score_threshold = score(0, exact_back).min(score_threshold);
        }
    }

    let matchmask: u64 = 1 << (pattern.len() - 1);
    let mut best_loc: Option<usize> = None;

    let mut bin_max = pattern.len() + text.len();
    let mut last_rd: Vec<u64> = Vec::new();
    for d in 0..pattern.len() {
        // Scan for the best match; each iteration allows for one more
        // error. Run a binary search to determine how far from `loc` we can
        // stray at this error level.
        let mut bin_min = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            if score(d, loc + bin_mid) <= score_threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        // Use the result from this iteration as the maximum for the next.
        bin_max = bin_mid;
        let mut start = 1.max(loc as isize - bin_mid as isize + 1) as usize;
        let finish = (loc + bin_mid).min(text.len()) + pattern.len();

        let mut rd: Vec<u64> = vec![0; finish + 2];
        rd[finish + 1] = (1u64 << d) - 1;
        let mut j = finish;
        while j >= start {
            let char_match: u64 = if j > text.len() {
                // Out of range.
                0
            } else {
                alphabet.get(&text[j - 1]).copied().unwrap_or(0)
            };
            rd[j] = if d == 0 {
                // First pass: exact match.
                ((rd[j + 1] << 1) | 1) & char_match
            } else {
                // Subsequent passes: fuzzy match.
                let last_j1 = last_rd.get(j + 1).copied().unwrap_or(0);
                let last_j = last_rd.get(j).copied().unwrap_or(0);
                (((rd[j + 1] << 1) | 1) & char_match) | (((last_j1 | last_j) << 1) | 1) | last_j1
            };
            if rd[j] & matchmask != 0 {
                let candidate = score(d, j - 1);
                // This match will almost certainly be better than any
                // existing match, but check anyway.
                if candidate <= score_threshold {
                    score_threshold = candidate;
                    best_loc = Some(j - 1);
                    if j - 1 > loc {
                        // When passing `loc`, don't exceed our current
                        // distance from it.
                        start = 1.max(2 * loc as isize - (j as isize - 1)) as usize;
                    } else {
                        // Already passed `loc`; downhill from here.
                        break;
                    }
                }
            }
            j -= 1;
        }
        // No hope of a better match at greater error levels.
        if score(d + 1, loc) > score_threshold {
            break;
        }
        last_rd = rd;
    }
    Ok(best_loc)
}

/// Bitmask per pattern character, bit i set (from the high end) for each
/// position the character occupies.
fn alphabet(pattern: &[u16]) -> HashMap<u16, u64> {
    let mut masks: HashMap<u16, u64> = HashMap::new();
    for (i, &c) in pattern.iter().enumerate() {
        *masks.entry(c).or_insert(0) |= 1 << (pattern.len() - i - 1);
    }
    masks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_masks_unique_and_duplicate_characters() {
        let masks = alphabet(&unit::encode("abc"));
        assert_eq!(masks[&(b'a' as u16)], 4);
        assert_eq!(masks[&(b'b' as u16)], 2);
        assert_eq!(masks[&(b'c' as u16)], 1);

        let masks = alphabet(&unit::encode("abcaba"));
        assert_eq!(masks[&(b'a' as u16)], 37);
        assert_eq!(masks[&(b'b' as u16)], 18);
        assert_eq!(masks[&(b'c' as u16)], 8);
    }
}
