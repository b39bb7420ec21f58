//! The textual patch wire format, modeled on the GNU diff/ed hunk shape.
//!
//! Header starts are one-based on the wire; a length of 1 omits the comma
//! and length, and a length of 0 renders the zero-based start literally.

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

use super::Patch;
use crate::diff::{Diff, Op};
use crate::uri;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("invalid patch string: {0}")]
    BadHeader(String),
    #[error("invalid patch mode '{sign}' in: {line}")]
    UnknownSign { sign: char, line: String },
    #[error("illegal escape in patch: {0}")]
    InvalidEscape(String),
}

fn header_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@$").unwrap())
}

fn coords(start: usize, length: usize) -> String {
    match length {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

impl fmt::Display for Patch {
    /// Emits the wire form; the header line and every body line are
    /// newline-terminated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            coords(self.start1, self.length1),
            coords(self.start2, self.length2)
        )?;
        for d in &self.diffs {
            let sign = match d.op {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            };
            writeln!(f, "{}{}", sign, uri::encode(d.units()))?;
        }
        Ok(())
    }
}

/// Serializes a patch list; the concatenation of each patch's `Display`.
pub fn to_text(patches: &[Patch]) -> String {
    patches.iter().map(Patch::to_string).collect()
}

/// Parses a serialized patch list. Blank lines between patches are ignored.
pub fn from_text(input: &str) -> Result<Vec<Patch>, PatchError> {
    let mut patches = Vec::new();
    if input.is_empty() {
        return Ok(patches);
    }
    let lines: Vec<&str> = input.split('\n').collect();
    let mut pointer = 0;
    while pointer < lines.len() {
        let line = lines[pointer];
        if line.is_empty() {
            pointer += 1;
            continue;
        }
        let caps = header_regex()
            .captures(line)
            .ok_or_else(|| PatchError::BadHeader(line.to_string()))?;
        let bad_header = || PatchError::BadHeader(line.to_string());
        let mut patch = Patch::default();
        let (start1, length1) =
            decode_coords(&caps[1], &caps[2]).ok_or_else(bad_header)?;
        let (start2, length2) =
            decode_coords(&caps[3], &caps[4]).ok_or_else(bad_header)?;
        patch.start1 = start1;
        patch.length1 = length1;
        patch.start2 = start2;
        patch.length2 = length2;
        pointer += 1;

        while pointer < lines.len() {
            let line = lines[pointer];
            if line.is_empty() {
                // Blank line? Whatever.
                pointer += 1;
                continue;
            }
            let mut chars = line.chars();
            let sign = chars.next().expect("line is non-empty");
            if sign == '@' {
                // Start of next patch.
                break;
            }
            let body = uri::decode(chars.as_str())
                .map_err(|_| PatchError::InvalidEscape(line.to_string()))?;
            let op = match sign {
                '-' => Op::Delete,
                '+' => Op::Insert,
                ' ' => Op::Equal,
                _ => {
                    return Err(PatchError::UnknownSign {
                        sign,
                        line: line.to_string(),
                    })
                }
            };
            patch.diffs.push(Diff::from_units(op, body));
            pointer += 1;
        }
        patches.push(patch);
    }
    Ok(patches)
}

/// Undoes the one-based start / omitted-length header conventions.
fn decode_coords(start_field: &str, length_field: &str) -> Option<(usize, usize)> {
    let start: usize = start_field.parse().ok()?;
    match length_field {
        "" => Some((start.saturating_sub(1), 1)),
        "0" => Some((start, 0)),
        _ => {
            let length: usize = length_field.parse().ok()?;
            Some((start.saturating_sub(1), length))
        }
    }
}
