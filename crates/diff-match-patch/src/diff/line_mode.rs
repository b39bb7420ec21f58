//! Line-mode speedup: hash whole lines down to single code units, diff the
//! hashes, then rehydrate and re-diff the changed blocks character-wise.
//! Fast but not minimal.

use std::collections::HashMap;
use std::time::Instant;

use super::{cleanup, main_units, Diff, Op};
use crate::options::Options;
use crate::unit::{self, Units};

const NEWLINE: u16 = b'\n' as u16;

/// Hash table 0 is reserved so that a hash can never be the NUL unit.
/// The first text may claim at most 40 000 distinct lines, leaving room
/// for the second; the table overall is capped at 65 535 entries so every
/// hash fits a single UTF-16 unit.
pub(crate) struct LineHash {
    pub(crate) chars1: Units,
    pub(crate) chars2: Units,
    pub(crate) lines: Vec<Units>,
}

pub(crate) fn lines_to_units(a: &[u16], b: &[u16]) -> LineHash {
    let mut lines: Vec<Units> = vec![Vec::new()];
    let mut hash: HashMap<Units, u16> = HashMap::new();
    let chars1 = munge(a, &mut lines, &mut hash, 40_000);
    let chars2 = munge(b, &mut lines, &mut hash, 65_535);
    LineHash {
        chars1,
        chars2,
        lines,
    }
}

fn munge(text: &[u16], lines: &mut Vec<Units>, hash: &mut HashMap<Units, u16>, max_lines: usize) -> Units {
    let mut chars = Vec::new();
    let mut line_start = 0;
    while line_start < text.len() {
        let mut line_end = unit::index_of(text, &[NEWLINE], line_start).unwrap_or(text.len() - 1);
        let mut line = text[line_start..line_end + 1].to_vec();
        if let Some(&existing) = hash.get(&line) {
            chars.push(existing);
        } else {
            if lines.len() == max_lines {
                // Table full: fold the remainder of the text into one line.
                tracing::trace!(distinct = lines.len(), "line table full; folding remainder");
                line = text[line_start..].to_vec();
                line_end = text.len() - 1;
            }
            let index = lines.len() as u16;
            hash.insert(line.clone(), index);
            lines.push(line);
            chars.push(index);
        }
        line_start = line_end + 1;
    }
    chars
}

pub(crate) fn units_to_lines(diffs: &mut [Diff], lines: &[Units]) {
    for d in diffs.iter_mut() {
        let mut text = Vec::new();
        for &u in d.units() {
            text.extend_from_slice(&lines[u as usize]);
        }
        d.text = text;
    }
}

pub(crate) fn diff_line_mode(
    a: &[u16],
    b: &[u16],
    deadline: Option<Instant>,
    opts: &Options,
) -> Vec<Diff> {
    let hashed = lines_to_units(a, b);
    let mut diffs = main_units(&hashed.chars1, &hashed.chars2, false, deadline, opts);
    units_to_lines(&mut diffs, &hashed.lines);
    cleanup::cleanup_semantic(&mut diffs);

    // Rediff each change block character-wise for accuracy.
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
            }
            Op::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(diffs[pointer].units());
            }
            Op::Equal => {
                if count_delete >= 1 && count_insert >= 1 {
                    let start = pointer - count_delete - count_insert;
                    diffs.drain(start..pointer);
                    pointer = start;
                    let sub = main_units(&text_delete, &text_insert, false, deadline, opts);
                    let sub_len = sub.len();
                    diffs.splice(pointer..pointer, sub);
                    pointer += sub_len;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
        pointer += 1;
    }
    diffs.pop();
    diffs
}
