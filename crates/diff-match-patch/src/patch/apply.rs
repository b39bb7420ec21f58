//! Best-effort application of a patch list to a (possibly drifted) text.

use super::{add_padding, split_max, Patch};
use crate::bitap;
use crate::diff::{self, cleanup_semantic_lossless, Op};
use crate::options::Options;
use crate::unit::{self, Units};

/// Applies `patches` to `text`, locating each patch fuzzily near its
/// expected position. Returns the new text and one flag per applied patch
/// (patches are split to the match engine's size bound first, so the flag
/// vector can be longer than the input list).
///
/// The input list is deep-copied; the caller's patches are not modified.
pub fn apply(patches: &[Patch], text: &str, opts: &Options) -> (String, Vec<bool>) {
    if patches.is_empty() {
        return (text.to_string(), Vec::new());
    }

    // Deep copy the patches so that no changes are made to the originals.
    let mut patches: Vec<Patch> = patches.to_vec();
    let null_padding = add_padding(&mut patches, opts);
    let mut text: Units = {
        let mut padded = null_padding.clone();
        padded.extend_from_slice(&unit::encode(text));
        padded.extend_from_slice(&null_padding);
        padded
    };
    split_max(&mut patches, opts);

    // `delta` keeps track of the offset between the expected and actual
    // location of the previous patch. If there are patches expected at
    // positions 10 and 20, but the first patch was found at 12, delta is 2
    // and the second patch has an effective expected position of 22.
    let mut delta: isize = 0;
    let mut results = vec![false; patches.len()];
    let max_bits = opts.match_max_bits.min(64);
    for (x, patch) in patches.iter().enumerate() {
        let expected_loc = patch.start2 as isize + delta;
        let text1 = diff::src_units(&patch.diffs);
        let mut start_loc: Option<usize>;
        let mut end_loc: Option<usize> = None;
        if text1.len() > max_bits {
            // A monster delete: locate the leading and trailing chunks of
            // the pattern separately.
            start_loc = locate(&text, &text1[..max_bits], expected_loc, opts);
            if start_loc.is_some() {
                end_loc = locate(
                    &text,
                    &text1[text1.len() - max_bits..],
                    expected_loc + (text1.len() - max_bits) as isize,
                    opts,
                );
                match end_loc {
                    // Can't find valid trailing context. Drop this patch.
                    None => start_loc = None,
                    Some(el) if start_loc.is_some_and(|sl| sl >= el) => start_loc = None,
                    _ => {}
                }
            }
        } else {
            start_loc = locate(&text, &text1, expected_loc, opts);
        }

        let Some(sl) = start_loc else {
            // No match found. :(
            tracing::debug!(patch = x, "patch did not match; skipping");
            // Subtract the delta for this failed patch from subsequent
            // patches.
            delta -= patch.length2 as isize - patch.length1 as isize;
            continue;
        };

        // Found a match. :)
        results[x] = true;
        delta = sl as isize - expected_loc;
        let text2_end = match end_loc {
            None => (sl + text1.len()).min(text.len()),
            Some(el) => (el + max_bits).min(text.len()),
        };
        let text2: Units = text[sl..text2_end].to_vec();
        if text1 == text2 {
            // Perfect match, just shove the replacement text in.
            let replacement = diff::dst_units(&patch.diffs);
            text.splice(sl..sl + text1.len(), replacement);
        } else {
            // Imperfect match. Run a diff to get a framework of equivalent
            // indices.
            let mut diffs2 = diff::main_units(&text1, &text2, false, diff::deadline_from(opts), opts);
            if text1.len() > max_bits
                && diff::levenshtein(&diffs2) as f64 / text1.len() as f64
                    > opts.patch_delete_threshold as f64
            {
                // The end points match, but the content is unacceptably bad.
                tracing::debug!(patch = x, "monster delete content too divergent; dropping");
                results[x] = false;
            } else {
                cleanup_semantic_lossless(&mut diffs2);
                let mut index1 = 0usize;
                for d in &patch.diffs {
                    if d.op != Op::Equal {
                        let index2 = diff::x_index(&diffs2, index1);
                        match d.op {
                            Op::Insert => {
                                let at = (sl + index2).min(text.len());
                                text.splice(at..at, d.units().iter().copied());
                            }
                            Op::Delete => {
                                let from = (sl + index2).min(text.len());
                                let to = (sl + diff::x_index(&diffs2, index1 + d.len_units()))
                                    .min(text.len());
                                text.drain(from..to.max(from));
                            }
                            Op::Equal => unreachable!("filtered above"),
                        }
                    }
                    if d.op != Op::Delete {
                        index1 += d.len_units();
                    }
                }
            }
        }
    }

    // Strip the padding off.
    let start = null_padding.len().min(text.len());
    let end = text.len().saturating_sub(null_padding.len()).max(start);
    (unit::decode(&text[start..end]), results)
}

/// Clamps the expected location into the text and runs the fuzzy matcher.
/// A pattern over the engine's bit bound cannot occur here by construction,
/// so the error path collapses to a non-match.
fn locate(text: &[u16], pattern: &[u16], expected_loc: isize, opts: &Options) -> Option<usize> {
    let loc = expected_loc.max(0) as usize;
    bitap::locate_units(text, pattern, loc, opts).unwrap_or_default()
}
