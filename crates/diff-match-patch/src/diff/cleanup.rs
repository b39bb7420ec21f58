//! Rewrites of an edit script: merging, semantic alignment, and efficiency
//! fusion. All passes operate in place and leave the script's source and
//! destination texts unchanged.

use super::{Diff, Op};
use crate::options::Options;
use crate::unit::{self, Units};

const CR: u16 = b'\r' as u16;
const LF: u16 = b'\n' as u16;

/// Reorders and merges like edit sections, factoring out commonalities.
/// Any edit section can move as long as it doesn't cross an equality.
pub fn cleanup_merge(diffs: &mut Vec<Diff>) {
    if diffs.is_empty() {
        return;
    }
    // Sentinel equality at the end triggers the final run flush.
    diffs.push(Diff::from_units(Op::Equal, Vec::new()));
    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete: Units = Vec::new();
    let mut text_insert: Units = Vec::new();
    while pointer < diffs.len() {
        match diffs[pointer].op {
            Op::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(diffs[pointer].units());
                pointer += 1;
            }
            Op::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(diffs[pointer].units());
                pointer += 1;
            }
            Op::Equal => {
                // Upon reaching an equality, check for prior redundancies.
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let commonlength = unit::common_prefix(&text_insert, &text_delete);
                        if commonlength != 0 {
                            let start = pointer - count_delete - count_insert;
                            if start > 0 && diffs[start - 1].op == Op::Equal {
                                diffs[start - 1]
                                    .text
                                    .extend_from_slice(&text_insert[..commonlength]);
                            } else {
                                diffs.insert(
                                    0,
                                    Diff::from_units(Op::Equal, text_insert[..commonlength].to_vec()),
                                );
                                pointer += 1;
                            }
                            text_insert.drain(..commonlength);
                            text_delete.drain(..commonlength);
                        }
                        let commonlength = unit::common_suffix(&text_insert, &text_delete);
                        if commonlength != 0 {
                            let mut merged = text_insert[text_insert.len() - commonlength..].to_vec();
                            merged.extend_from_slice(diffs[pointer].units());
                            diffs[pointer].text = merged;
                            text_insert.truncate(text_insert.len() - commonlength);
                            text_delete.truncate(text_delete.len() - commonlength);
                        }
                    }
                    // Replace the run with at most one delete and one insert.
                    let start = pointer - count_delete - count_insert;
                    diffs.drain(start..pointer);
                    pointer = start;
                    if !text_delete.is_empty() {
                        diffs.insert(pointer, Diff::from_units(Op::Delete, text_delete.clone()));
                        pointer += 1;
                    }
                    if !text_insert.is_empty() {
                        diffs.insert(pointer, Diff::from_units(Op::Insert, text_insert.clone()));
                        pointer += 1;
                    }
                    pointer += 1;
                } else if pointer != 0 && diffs[pointer - 1].op == Op::Equal {
                    // Merge this equality with the previous one.
                    let current = diffs.remove(pointer);
                    diffs[pointer - 1].text.extend_from_slice(current.units());
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }
    if diffs.last().is_some_and(|d| d.text.is_empty()) {
        diffs.pop();
    }

    // Second pass: look for single edits surrounded on both sides by
    // equalities which can be shifted sideways to eliminate an equality.
    // e.g: A<ins>BA</ins>C -> <ins>AB</ins>AC
    let mut changes = false;
    let mut pointer = 1;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
            let prev = diffs[pointer - 1].text.clone();
            let current = diffs[pointer].text.clone();
            let next = diffs[pointer + 1].text.clone();
            if current.ends_with(&prev) {
                // Shift the edit over the previous equality.
                let mut shifted = prev.clone();
                shifted.extend_from_slice(&current[..current.len() - prev.len()]);
                diffs[pointer].text = shifted;
                let mut grown = prev;
                grown.extend_from_slice(&next);
                diffs[pointer + 1].text = grown;
                diffs.remove(pointer - 1);
                changes = true;
            } else if current.starts_with(&next) {
                // Shift the edit over the next equality.
                diffs[pointer - 1].text.extend_from_slice(&next);
                let mut shifted = current[next.len()..].to_vec();
                shifted.extend_from_slice(&next);
                diffs[pointer].text = shifted;
                diffs.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }
    if changes {
        cleanup_merge(diffs);
    }
}

/// Reduces the number of edits by eliminating semantically trivial
/// equalities, then factors out edit overlaps.
pub fn cleanup_semantic(diffs: &mut Vec<Diff>) {
    let mut changes = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Units> = None;
    let mut pointer: usize = 0;
    // Number of characters that changed prior to / after the equality.
    let mut length_insertions1 = 0;
    let mut length_deletions1 = 0;
    let mut length_insertions2 = 0;
    let mut length_deletions2 = 0;
    while pointer < diffs.len() {
        if diffs[pointer].op == Op::Equal {
            equalities.push(pointer);
            length_insertions1 = length_insertions2;
            length_deletions1 = length_deletions2;
            length_insertions2 = 0;
            length_deletions2 = 0;
            last_equality = Some(diffs[pointer].text.clone());
        } else {
            if diffs[pointer].op == Op::Insert {
                length_insertions2 += diffs[pointer].units().len();
            } else {
                length_deletions2 += diffs[pointer].units().len();
            }
            // Eliminate an equality smaller or equal to the edits on both
            // sides of it.
            let eliminate = last_equality.as_ref().is_some_and(|eq| {
                eq.len() <= length_insertions1.max(length_deletions1)
                    && eq.len() <= length_insertions2.max(length_deletions2)
            });
            if eliminate {
                let eq = last_equality.take().expect("checked above");
                let pos = *equalities.last().expect("pushed with last_equality");
                diffs.insert(pos, Diff::from_units(Op::Delete, eq));
                diffs[pos + 1].op = Op::Insert;
                equalities.pop();
                equalities.pop();
                pointer = match equalities.last() {
                    Some(&p) => p,
                    None => usize::MAX,
                };
                length_insertions1 = 0;
                length_deletions1 = 0;
                length_insertions2 = 0;
                length_deletions2 = 0;
                changes = true;
            }
        }
        pointer = pointer.wrapping_add(1);
    }
    if changes {
        cleanup_merge(diffs);
    }
    cleanup_semantic_lossless(diffs);

    // Find any overlaps between deletions and insertions:
    // e.g: <del>abcxxx</del><ins>xxxdef</ins> -> <del>abc</del>xxx<ins>def</ins>
    // e.g: <del>xxxabc</del><ins>defxxx</ins> -> <ins>def</ins>xxx<del>abc</del>
    // Only extract an overlap if it is as big as the edit ahead or behind it.
    let mut pointer = 1;
    while pointer < diffs.len() {
        if diffs[pointer - 1].op == Op::Delete && diffs[pointer].op == Op::Insert {
            let deletion = diffs[pointer - 1].text.clone();
            let insertion = diffs[pointer].text.clone();
            let overlap_length1 = unit::common_overlap(&deletion, &insertion);
            let overlap_length2 = unit::common_overlap(&insertion, &deletion);
            if overlap_length1 >= overlap_length2 {
                if overlap_length1 * 2 >= deletion.len() || overlap_length1 * 2 >= insertion.len() {
                    diffs.insert(
                        pointer,
                        Diff::from_units(Op::Equal, insertion[..overlap_length1].to_vec()),
                    );
                    diffs[pointer - 1].text = deletion[..deletion.len() - overlap_length1].to_vec();
                    diffs[pointer + 1].text = insertion[overlap_length1..].to_vec();
                    pointer += 1;
                }
            } else if overlap_length2 * 2 >= deletion.len() || overlap_length2 * 2 >= insertion.len()
            {
                // Reverse overlap: swap and trim the surrounding edits.
                diffs.insert(
                    pointer,
                    Diff::from_units(Op::Equal, deletion[..overlap_length2].to_vec()),
                );
                diffs[pointer - 1] = Diff::from_units(
                    Op::Insert,
                    insertion[..insertion.len() - overlap_length2].to_vec(),
                );
                diffs[pointer + 1] =
                    Diff::from_units(Op::Delete, deletion[overlap_length2..].to_vec());
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Slides each single edit sitting between two equalities sideways to align
/// it with logical boundaries (word, line, paragraph). Lossless: the
/// script's source and destination texts are preserved.
pub fn cleanup_semantic_lossless(diffs: &mut Vec<Diff>) {
    let mut pointer = 1;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
            let mut equality1 = diffs[pointer - 1].text.clone();
            let mut edit = diffs[pointer].text.clone();
            let mut equality2 = diffs[pointer + 1].text.clone();

            // First, shift the edit as far left as possible.
            let common_offset = unit::common_suffix(&equality1, &edit);
            if common_offset > 0 {
                let common = edit[edit.len() - common_offset..].to_vec();
                equality1.truncate(equality1.len() - common_offset);
                let mut shifted = common.clone();
                shifted.extend_from_slice(&edit[..edit.len() - common_offset]);
                edit = shifted;
                let mut grown = common;
                grown.extend_from_slice(&equality2);
                equality2 = grown;
            }

            // Then step character by character right, looking for the best fit.
            let mut best_equality1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_equality2 = equality2.clone();
            let mut best_score =
                semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit[0]);
                let carried = equality2[0];
                edit.remove(0);
                edit.push(carried);
                equality2.remove(0);
                let score = semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
                // The >= encourages trailing rather than leading whitespace
                // on edits.
                if score >= best_score {
                    best_score = score;
                    best_equality1 = equality1.clone();
                    best_edit = edit.clone();
                    best_equality2 = equality2.clone();
                }
            }

            if diffs[pointer - 1].text != best_equality1 {
                // We have an improvement, save it back to the diff.
                if !best_equality1.is_empty() {
                    diffs[pointer - 1].text = best_equality1;
                } else {
                    diffs.remove(pointer - 1);
                    pointer -= 1;
                }
                diffs[pointer].text = best_edit;
                if !best_equality2.is_empty() {
                    diffs[pointer + 1].text = best_equality2;
                } else {
                    diffs.remove(pointer + 1);
                    pointer -= 1;
                }
            }
        }
        pointer += 1;
    }
}

/// Scores how semantically tidy a boundary between `one` and `two` is.
/// 6 is best (edge of a text), 0 is worst (splitting a word).
fn semantic_score(one: &[u16], two: &[u16]) -> i32 {
    if one.is_empty() || two.is_empty() {
        // Edges are the best.
        return 6;
    }
    let char1 = one[one.len() - 1];
    let char2 = two[0];
    let non_alnum1 = !is_ascii_alphanumeric(char1);
    let non_alnum2 = !is_ascii_alphanumeric(char2);
    let whitespace1 = non_alnum1 && is_whitespace(char1);
    let whitespace2 = non_alnum2 && is_whitespace(char2);
    let line_break1 = whitespace1 && (char1 == CR || char1 == LF);
    let line_break2 = whitespace2 && (char2 == CR || char2 == LF);
    let blank_line1 = line_break1 && ends_with_blank_line(one);
    let blank_line2 = line_break2 && starts_with_blank_line(two);

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alnum1 && !whitespace1 && whitespace2 {
        // End of sentence.
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn is_ascii_alphanumeric(u: u16) -> bool {
    matches!(u, 0x30..=0x39 | 0x41..=0x5a | 0x61..=0x7a)
}

fn is_whitespace(u: u16) -> bool {
    char::from_u32(u as u32).is_some_and(char::is_whitespace)
}

fn ends_with_blank_line(s: &[u16]) -> bool {
    let n = s.len();
    (n >= 2 && s[n - 1] == LF && s[n - 2] == LF)
        || (n >= 3 && s[n - 1] == LF && s[n - 2] == CR && s[n - 3] == LF)
}

fn starts_with_blank_line(s: &[u16]) -> bool {
    let mut i = 0;
    if s.get(i) == Some(&CR) {
        i += 1;
    }
    if s.get(i) != Some(&LF) {
        return false;
    }
    i += 1;
    if s.get(i) == Some(&CR) {
        i += 1;
    }
    s.get(i) == Some(&LF)
}

/// Reduces the number of edits by eliminating operationally trivial
/// equalities, using `diff_edit_cost` as the budget.
pub fn cleanup_efficiency(diffs: &mut Vec<Diff>, opts: &Options) {
    let mut changes = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Units> = None;
    let mut pointer: usize = 0;
    // Is there an insertion/deletion operation before/after the last equality.
    let mut pre_ins = false;
    let mut pre_del = false;
    let mut post_ins = false;
    let mut post_del = false;
    while pointer < diffs.len() {
        if diffs[pointer].op == Op::Equal {
            if diffs[pointer].units().len() < opts.diff_edit_cost && (post_ins || post_del) {
                // Candidate found.
                equalities.push(pointer);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = Some(diffs[pointer].text.clone());
            } else {
                // Not a candidate, and can never become one.
                equalities.clear();
                last_equality = None;
            }
            post_ins = false;
            post_del = false;
        } else {
            if diffs[pointer].op == Op::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }
            // Five types to be split:
            // <ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>
            // <ins>A</ins>X<ins>C</ins><del>D</del>
            // <ins>A</ins><del>B</del>X<ins>C</ins>
            // <ins>A</del>X<ins>C</ins><del>D</del>
            // <ins>A</ins><del>B</del>X<del>C</del>
            let split = last_equality.as_ref().is_some_and(|eq| {
                (pre_ins && pre_del && post_ins && post_del)
                    || (eq.len() * 2 < opts.diff_edit_cost
                        && (pre_ins as u8 + pre_del as u8 + post_ins as u8 + post_del as u8) == 3)
            });
            if split {
                let eq = last_equality.take().expect("checked above");
                let pos = *equalities.last().expect("pushed with last_equality");
                diffs.insert(pos, Diff::from_units(Op::Delete, eq));
                diffs[pos + 1].op = Op::Insert;
                equalities.pop();
                if pre_ins && pre_del {
                    // No changes made which could affect previous entry,
                    // keep going.
                    post_ins = true;
                    post_del = true;
                    equalities.clear();
                } else {
                    equalities.pop();
                    pointer = match equalities.last() {
                        Some(&p) => p,
                        None => usize::MAX,
                    };
                    post_ins = false;
                    post_del = false;
                }
                changes = true;
            }
        }
        pointer = pointer.wrapping_add(1);
    }
    if changes {
        cleanup_merge(diffs);
    }
}
