//! Context-bearing patch records: construction, growth, splitting, and
//! padding. Application lives in [`apply`]; the wire format in [`text`].

pub mod apply;
pub mod text;

use std::collections::VecDeque;

use crate::diff::{self, cleanup_efficiency, cleanup_semantic, Diff, Op};
use crate::options::Options;
use crate::unit::{self, Units};

pub use apply::apply;
pub use text::{from_text, to_text, PatchError};

/// One patch: an edit script for a window of the source text, padded with
/// equality context on both sides, plus the window coordinates.
///
/// `start1`/`length1` address the source text, `start2`/`length2` the
/// destination text; all four count UTF-16 code units and are zero-based
/// (the wire format renders starts one-based). `Clone` is a deep copy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch {
    pub diffs: Vec<Diff>,
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

/// The accepted shapes of [`make`].
#[derive(Debug, Clone, Copy)]
pub enum PatchInput<'a> {
    /// Source and destination texts; the script is computed and cleaned up.
    Texts(&'a str, &'a str),
    /// A precomputed script; the source text is reconstructed from it.
    Diffs(&'a [Diff]),
    /// Source text plus a precomputed script (the preferred precomputed
    /// form: no reconstruction needed).
    TextDiffs(&'a str, &'a [Diff]),
}

/// Builds a list of patches to turn one text into another.
///
/// For the precomputed-script shapes, the script must actually describe the
/// given source text (`diff::src` of the script equals it).
///
/// ```
/// use diff_match_patch::{patch, Options, PatchInput};
///
/// let opts = Options::default();
/// let patches = patch::make(PatchInput::Texts("The cat.", "The hat."), &opts);
/// let (patched, results) = patch::apply(&patches, "The cat.", &opts);
/// assert_eq!(patched, "The hat.");
/// assert!(results.iter().all(|&ok| ok));
/// ```
pub fn make(input: PatchInput<'_>, opts: &Options) -> Vec<Patch> {
    match input {
        PatchInput::Texts(text1, text2) => {
            let mut diffs = diff::diff_main(text1, text2, true, opts);
            if diffs.len() > 2 {
                cleanup_semantic(&mut diffs);
                cleanup_efficiency(&mut diffs, opts);
            }
            build(&unit::encode(text1), &diffs, opts)
        }
        PatchInput::Diffs(diffs) => build(&diff::src_units(diffs), diffs, opts),
        PatchInput::TextDiffs(text1, diffs) => build(&unit::encode(text1), diffs, opts),
    }
}

pub fn make_from_texts(text1: &str, text2: &str, opts: &Options) -> Vec<Patch> {
    make(PatchInput::Texts(text1, text2), opts)
}

pub fn make_from_diffs(diffs: &[Diff], opts: &Options) -> Vec<Patch> {
    make(PatchInput::Diffs(diffs), opts)
}

pub fn make_from_text_and_diffs(text1: &str, diffs: &[Diff], opts: &Options) -> Vec<Patch> {
    make(PatchInput::TextDiffs(text1, diffs), opts)
}

#[deprecated(note = "the destination text is ignored; use make_from_text_and_diffs")]
pub fn make_from_texts_and_diffs(
    text1: &str,
    _text2: &str,
    diffs: &[Diff],
    opts: &Options,
) -> Vec<Patch> {
    make(PatchInput::TextDiffs(text1, diffs), opts)
}

/// Walks a script, opening a patch at each edit and closing it at the next
/// large equality. `start1`/`start2` of later patches are rolling-context
/// coordinates: they assume all earlier patches have been applied.
fn build(text1: &[u16], diffs: &[Diff], opts: &Options) -> Vec<Patch> {
    let mut patches = Vec::new();
    if diffs.is_empty() {
        return patches;
    }
    let mut patch = Patch::default();
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;
    // `prepatch_text` is the source state the open patch addresses;
    // `postpatch_text` tracks the text as it stands with all edits so far
    // applied, and becomes the next patch's prepatch state.
    let mut prepatch_text: Units = text1.to_vec();
    let mut postpatch_text: Units = text1.to_vec();
    for (x, d) in diffs.iter().enumerate() {
        if patch.diffs.is_empty() && d.op != Op::Equal {
            // A new patch starts here.
            patch.start1 = char_count1;
            patch.start2 = char_count2;
        }
        match d.op {
            Op::Insert => {
                patch.diffs.push(d.clone());
                patch.length2 += d.len_units();
                postpatch_text.splice(char_count2..char_count2, d.units().iter().copied());
            }
            Op::Delete => {
                patch.length1 += d.len_units();
                patch.diffs.push(d.clone());
                postpatch_text.drain(char_count2..char_count2 + d.len_units());
            }
            Op::Equal => {
                if d.len_units() <= 2 * opts.patch_margin
                    && !patch.diffs.is_empty()
                    && x != diffs.len() - 1
                {
                    // Small equality inside a patch.
                    patch.diffs.push(d.clone());
                    patch.length1 += d.len_units();
                    patch.length2 += d.len_units();
                }
                if d.len_units() >= 2 * opts.patch_margin && !patch.diffs.is_empty() {
                    // Time for a new patch.
                    add_context_units(&mut patch, &prepatch_text, opts);
                    patches.push(std::mem::take(&mut patch));
                    // The rolling context: future patches are positioned
                    // against the text as already modified.
                    prepatch_text = postpatch_text.clone();
                    char_count1 = char_count2;
                }
            }
        }
        if d.op != Op::Insert {
            char_count1 += d.len_units();
        }
        if d.op != Op::Delete {
            char_count2 += d.len_units();
        }
    }
    if !patch.diffs.is_empty() {
        add_context_units(&mut patch, &prepatch_text, opts);
        patches.push(patch);
    }
    patches
}

/// Grows equality context around a patch until the patched region is unique
/// in `text` (or the pattern would outgrow the match engine), then adds one
/// margin of padding. `text` is the source text the patch addresses.
pub fn add_context(patch: &mut Patch, text: &str, opts: &Options) {
    add_context_units(patch, &unit::encode(text), opts);
}

fn add_context_units(patch: &mut Patch, text: &[u16], opts: &Options) {
    if text.is_empty() {
        return;
    }
    let clamp = |i: usize| i.min(text.len());
    let mut pattern = text[clamp(patch.start2)..clamp(patch.start2 + patch.length1)].to_vec();
    let mut padding = 0;

    // Widen until the pattern is unique, staying under the match engine's
    // pattern limit.
    while unit::index_of(text, &pattern, 0) != unit::last_index_of(text, &pattern, text.len())
        && pattern.len() < opts.match_max_bits.saturating_sub(2 * opts.patch_margin)
    {
        padding += opts.patch_margin;
        let begin = patch.start2.saturating_sub(padding);
        let end = clamp(patch.start2 + patch.length1 + padding);
        pattern = text[begin..end].to_vec();
    }
    // One chunk of padding either side.
    padding += opts.patch_margin;

    let prefix_start = patch.start2.saturating_sub(padding);
    let prefix = &text[prefix_start..clamp(patch.start2)];
    if !prefix.is_empty() {
        patch
            .diffs
            .insert(0, Diff::from_units(Op::Equal, prefix.to_vec()));
    }
    let suffix_start = clamp(patch.start2 + patch.length1);
    let suffix_end = clamp(patch.start2 + patch.length1 + padding);
    let suffix = &text[suffix_start..suffix_end];
    if !suffix.is_empty() {
        patch.diffs.push(Diff::from_units(Op::Equal, suffix.to_vec()));
    }

    patch.start1 = patch.start1.saturating_sub(prefix.len());
    patch.start2 = patch.start2.saturating_sub(prefix.len());
    patch.length1 += prefix.len() + suffix.len();
    patch.length2 += prefix.len() + suffix.len();
}

/// Adds a layer of unique padding (code points 1..=margin) to the edges of
/// the patch list so that edge patches can still anchor their context.
/// Returns the padding added, so the caller can wrap the text the same way.
pub fn add_padding(patches: &mut [Patch], opts: &Options) -> Units {
    let padding_length = opts.patch_margin;
    let null_padding: Units = (1..=padding_length as u16).collect();

    if patches.is_empty() {
        return null_padding;
    }

    // Bump all the patches forward.
    for patch in patches.iter_mut() {
        patch.start1 += padding_length;
        patch.start2 += padding_length;
    }

    // Add some padding on start of first diff.
    let patch = patches.first_mut().expect("patch list is non-empty");
    if patch.diffs.first().is_none_or(|d| d.op != Op::Equal) {
        patch
            .diffs
            .insert(0, Diff::from_units(Op::Equal, null_padding.clone()));
        patch.start1 -= padding_length;
        patch.start2 -= padding_length;
        patch.length1 += padding_length;
        patch.length2 += padding_length;
    } else if padding_length > patch.diffs[0].len_units() {
        // Grow first equality.
        let existing = patch.diffs[0].units().len();
        let extra = padding_length - existing;
        let mut grown = null_padding[existing..].to_vec();
        grown.extend_from_slice(patch.diffs[0].units());
        patch.diffs[0].text = grown;
        patch.start1 -= extra;
        patch.start2 -= extra;
        patch.length1 += extra;
        patch.length2 += extra;
    }

    // Add some padding on end of last diff.
    let patch = patches.last_mut().expect("patch list is non-empty");
    if patch.diffs.last().is_none_or(|d| d.op != Op::Equal) {
        patch
            .diffs
            .push(Diff::from_units(Op::Equal, null_padding.clone()));
        patch.length1 += padding_length;
        patch.length2 += padding_length;
    } else if padding_length > patch.diffs.last().expect("non-empty").len_units() {
        // Grow last equality.
        let last = patch.diffs.last_mut().expect("non-empty");
        let extra = padding_length - last.len_units();
        last.text.extend_from_slice(&null_padding[..extra]);
        patch.length1 += extra;
        patch.length2 += extra;
    }

    null_padding
}

/// Splits any patch whose source span exceeds `match_max_bits` into a chain
/// of smaller patches, each carrying its own context. A lone monster
/// deletion is allowed through whole; its application path anchors on the
/// pattern's two ends instead.
pub fn split_max(patches: &mut Vec<Patch>, opts: &Options) {
    let patch_size = opts.match_max_bits;
    let margin = opts.patch_margin;
    if patch_size == 0 || patch_size <= 2 * margin {
        return;
    }

    let mut result: Vec<Patch> = Vec::with_capacity(patches.len());
    for mut bigpatch in patches.drain(..) {
        if bigpatch.length1 <= patch_size {
            result.push(bigpatch);
            continue;
        }

        let mut start1 = bigpatch.start1;
        let mut start2 = bigpatch.start2;
        let mut precontext: Units = Vec::new();
        let mut big_diffs: VecDeque<Diff> = bigpatch.diffs.drain(..).collect();
        while !big_diffs.is_empty() {
            // Create one of several smaller patches.
            let mut patch = Patch {
                start1: start1 - precontext.len(),
                start2: start2 - precontext.len(),
                ..Patch::default()
            };
            let mut empty = true;
            if !precontext.is_empty() {
                patch.length1 = precontext.len();
                patch.length2 = precontext.len();
                patch
                    .diffs
                    .push(Diff::from_units(Op::Equal, precontext.clone()));
            }
            while let Some(front) = big_diffs.front() {
                if patch.length1 >= patch_size - margin {
                    break;
                }
                match front.op {
                    Op::Insert => {
                        // Insertions are harmless.
                        let d = big_diffs.pop_front().expect("front exists");
                        patch.length2 += d.len_units();
                        start2 += d.len_units();
                        patch.diffs.push(d);
                        empty = false;
                    }
                    Op::Delete
                        if patch.diffs.len() == 1
                            && patch.diffs[0].op == Op::Equal
                            && front.len_units() > 2 * patch_size =>
                    {
                        // This is a large deletion. Let it pass in one chunk.
                        let d = big_diffs.pop_front().expect("front exists");
                        patch.length1 += d.len_units();
                        start1 += d.len_units();
                        empty = false;
                        patch.diffs.push(d);
                    }
                    _ => {
                        // Deletion or equality. Only take as much as we can
                        // stomach.
                        let take = (patch_size - patch.length1 - margin).min(front.len_units());
                        let op = front.op;
                        let text: Units = front.units()[..take].to_vec();
                        patch.length1 += text.len();
                        start1 += text.len();
                        if op == Op::Equal {
                            patch.length2 += text.len();
                            start2 += text.len();
                        } else {
                            empty = false;
                        }
                        if take == front.len_units() {
                            let d = big_diffs.pop_front().expect("front exists");
                            patch.diffs.push(d);
                        } else {
                            patch.diffs.push(Diff::from_units(op, text));
                            let front = big_diffs.front_mut().expect("front exists");
                            front.text.drain(..take);
                        }
                    }
                }
            }

            // Compute the head context for the next patch.
            let dst = diff::dst_units(&patch.diffs);
            precontext = dst[dst.len().saturating_sub(margin)..].to_vec();

            // Append the end context for this patch.
            let mut post_src: Units = Vec::new();
            for d in big_diffs.iter() {
                if d.op != Op::Insert {
                    post_src.extend_from_slice(d.units());
                    if post_src.len() >= margin {
                        break;
                    }
                }
            }
            let postcontext = &post_src[..margin.min(post_src.len())];
            if !postcontext.is_empty() {
                patch.length1 += postcontext.len();
                patch.length2 += postcontext.len();
                if patch.diffs.last().is_some_and(|d| d.op == Op::Equal) {
                    patch
                        .diffs
                        .last_mut()
                        .expect("non-empty")
                        .text
                        .extend_from_slice(postcontext);
                } else {
                    patch
                        .diffs
                        .push(Diff::from_units(Op::Equal, postcontext.to_vec()));
                }
            }
            if !empty {
                result.push(patch);
            }
        }
    }
    *patches = result;
}
