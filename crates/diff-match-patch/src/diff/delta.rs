//! Compact textual encoding of an edit script against a known source text.
//!
//! Crush the diff into a tab-separated list of tokens: `=N` keeps N units,
//! `-N` drops N units, `+text` inserts percent-encoded text. Offsets count
//! UTF-16 code units; a `=N` may legally split a surrogate pair.

use thiserror::Error;

use super::{Diff, Op};
use crate::unit;
use crate::uri;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    #[error("illegal escape in delta insert: {0}")]
    InvalidEscape(String),
    #[error("invalid length in delta token: {0}")]
    InvalidLength(String),
    #[error("invalid operation in delta token: {0}")]
    UnknownOp(String),
    #[error("delta length ({consumed}) does not equal source text length ({expected})")]
    LengthMismatch { consumed: usize, expected: usize },
}

pub fn to_delta(diffs: &[Diff]) -> String {
    let mut tokens = Vec::with_capacity(diffs.len());
    for d in diffs {
        match d.op {
            Op::Insert => tokens.push(format!("+{}", uri::encode(d.units()))),
            Op::Delete => tokens.push(format!("-{}", d.units().len())),
            Op::Equal => tokens.push(format!("={}", d.units().len())),
        }
    }
    tokens.join("\t")
}

/// Rebuilds the full script from a delta, advancing a cursor through
/// `src_text` for the `=` and `-` tokens.
pub fn from_delta(src_text: &str, delta: &str) -> Result<Vec<Diff>, DeltaError> {
    let text1 = unit::encode(src_text);
    let mut diffs = Vec::new();
    // Cursor in text1, in UTF-16 units.
    let mut pointer = 0usize;
    for token in delta.split('\t') {
        if token.is_empty() {
            // Blank tokens are ok (from a trailing \t).
            continue;
        }
        let mut chars = token.chars();
        let sign = chars.next().expect("token is non-empty");
        let param = chars.as_str();
        match sign {
            '+' => {
                let text = uri::decode(param)
                    .map_err(|_| DeltaError::InvalidEscape(param.to_string()))?;
                diffs.push(Diff::from_units(Op::Insert, text));
            }
            '-' | '=' => {
                let n: usize = param
                    .parse()
                    .map_err(|_| DeltaError::InvalidLength(param.to_string()))?;
                let start = pointer.min(text1.len());
                let end = (pointer + n).min(text1.len());
                let text = text1[start..end].to_vec();
                pointer += n;
                if sign == '=' {
                    diffs.push(Diff::from_units(Op::Equal, text));
                } else {
                    diffs.push(Diff::from_units(Op::Delete, text));
                }
            }
            _ => return Err(DeltaError::UnknownOp(token.to_string())),
        }
    }
    if pointer != text1.len() {
        return Err(DeltaError::LengthMismatch {
            consumed: pointer,
            expected: text1.len(),
        });
    }
    Ok(diffs)
}
