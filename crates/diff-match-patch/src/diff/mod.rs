//! Edit-script production: the Myers bisect core with its shortcut ladder,
//! plus the ancillary script operations.

pub mod cleanup;
pub mod delta;
pub mod html;
pub(crate) mod line_mode;

use std::fmt;
use std::time::{Duration, Instant};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::options::Options;
use crate::unit::{self, Units};

pub use cleanup::{cleanup_efficiency, cleanup_merge, cleanup_semantic, cleanup_semantic_lossless};
pub use delta::{from_delta, to_delta, DeltaError};
pub use html::pretty_html;

/// The three edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Delete,
    Equal,
    Insert,
}

impl Op {
    /// The integer tag of this operation: −1, 0, or +1.
    pub fn sign(self) -> i8 {
        match self {
            Op::Delete => -1,
            Op::Equal => 0,
            Op::Insert => 1,
        }
    }

    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            -1 => Some(Op::Delete),
            0 => Some(Op::Equal),
            1 => Some(Op::Insert),
            _ => None,
        }
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign())
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sign = i8::deserialize(deserializer)?;
        Op::from_sign(sign).ok_or_else(|| D::Error::custom(format!("invalid op tag: {sign}")))
    }
}

/// One entry of an edit script: an operation and its text payload.
///
/// The payload is held as UTF-16 code units; [`Diff::text`] converts back to
/// a `String` (lossily if the entry begins or ends mid-surrogate-pair).
///
/// Serializes as the two-element array `[op, text]`, so a script becomes
/// `[[0,"jump"],[-1,"s"],[1,"ed"]]` on a JSON wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Diff {
    pub op: Op,
    pub(crate) text: Units,
}

impl Diff {
    pub fn new(op: Op, text: &str) -> Self {
        Self {
            op,
            text: unit::encode(text),
        }
    }

    pub fn equal(text: &str) -> Self {
        Self::new(Op::Equal, text)
    }

    pub fn delete(text: &str) -> Self {
        Self::new(Op::Delete, text)
    }

    pub fn insert(text: &str) -> Self {
        Self::new(Op::Insert, text)
    }

    pub(crate) fn from_units(op: Op, text: Units) -> Self {
        Self { op, text }
    }

    pub fn text(&self) -> String {
        unit::decode(&self.text)
    }

    /// Payload length in UTF-16 code units (the unit of every wire offset).
    pub fn len_units(&self) -> usize {
        self.text.len()
    }

    pub(crate) fn units(&self) -> &[u16] {
        &self.text
    }
}

impl fmt::Debug for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Diff({:?}, {:?})", self.op, self.text())
    }
}

impl Serialize for Diff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.op, self.text()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Diff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (op, text) = <(Op, String)>::deserialize(deserializer)?;
        Ok(Diff::new(op, &text))
    }
}

/// Diffs two texts into an edit script, line-mode speedup enabled.
///
/// ```
/// use diff_match_patch::{diff, Options};
///
/// let opts = Options::default();
/// let script = diff::diff("kitten", "sitting", &opts);
/// assert_eq!(diff::src(&script), "kitten");
/// assert_eq!(diff::dst(&script), "sitting");
/// ```
pub fn diff(src_text: &str, dst_text: &str, opts: &Options) -> Vec<Diff> {
    diff_main(src_text, dst_text, true, opts)
}

/// Diffs two texts into an edit script. `checklines` enables the line-mode
/// speedup for large inputs, trading minimality for speed.
pub fn diff_main(src_text: &str, dst_text: &str, checklines: bool, opts: &Options) -> Vec<Diff> {
    main_units(
        &unit::encode(src_text),
        &unit::encode(dst_text),
        checklines,
        deadline_from(opts),
        opts,
    )
}

/// Converts `diff_timeout` seconds into an absolute deadline. Zero or
/// negative means no deadline.
pub(crate) fn deadline_from(opts: &Options) -> Option<Instant> {
    if opts.diff_timeout <= 0.0 {
        None
    } else {
        Some(Instant::now() + Duration::from_secs_f32(opts.diff_timeout))
    }
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() > d)
}

pub(crate) fn main_units(
    a: &[u16],
    b: &[u16],
    checklines: bool,
    deadline: Option<Instant>,
    opts: &Options,
) -> Vec<Diff> {
    if a == b {
        if a.is_empty() {
            return Vec::new();
        }
        return vec![Diff::from_units(Op::Equal, a.to_vec())];
    }

    let prefix_len = unit::common_prefix(a, b);
    let prefix = &a[..prefix_len];
    let (a, b) = (&a[prefix_len..], &b[prefix_len..]);
    let suffix_len = unit::common_suffix(a, b);
    let suffix = &a[a.len() - suffix_len..];
    let (a, b) = (&a[..a.len() - suffix_len], &b[..b.len() - suffix_len]);

    let mut diffs = compute(a, b, checklines, deadline, opts);
    if !prefix.is_empty() {
        diffs.insert(0, Diff::from_units(Op::Equal, prefix.to_vec()));
    }
    if !suffix.is_empty() {
        diffs.push(Diff::from_units(Op::Equal, suffix.to_vec()));
    }
    cleanup::cleanup_merge(&mut diffs);
    diffs
}

/// The shortcut ladder for two texts that share no common affix.
fn compute(
    a: &[u16],
    b: &[u16],
    checklines: bool,
    deadline: Option<Instant>,
    opts: &Options,
) -> Vec<Diff> {
    if a.is_empty() {
        return vec![Diff::from_units(Op::Insert, b.to_vec())];
    }
    if b.is_empty() {
        return vec![Diff::from_units(Op::Delete, a.to_vec())];
    }

    let (long, short, a_is_long) = if a.len() > b.len() {
        (a, b, true)
    } else {
        (b, a, false)
    };
    if let Some(i) = unit::index_of(long, short, 0) {
        // Shorter text is inside the longer text.
        let op = if a_is_long { Op::Delete } else { Op::Insert };
        return vec![
            Diff::from_units(op, long[..i].to_vec()),
            Diff::from_units(Op::Equal, short.to_vec()),
            Diff::from_units(op, long[i + short.len()..].to_vec()),
        ];
    }
    if short.len() == 1 {
        // Single character can't be part of both an equality and an edit.
        return vec![
            Diff::from_units(Op::Delete, a.to_vec()),
            Diff::from_units(Op::Insert, b.to_vec()),
        ];
    }

    if let Some(hm) = half_match(a, b, opts) {
        let mut diffs = main_units(&hm.a_prefix, &hm.b_prefix, checklines, deadline, opts);
        diffs.push(Diff::from_units(Op::Equal, hm.common));
        diffs.extend(main_units(
            &hm.a_suffix,
            &hm.b_suffix,
            checklines,
            deadline,
            opts,
        ));
        return diffs;
    }

    if checklines && a.len() > 100 && b.len() > 100 {
        return line_mode::diff_line_mode(a, b, deadline, opts);
    }

    bisect(a, b, deadline, opts)
}

struct HalfMatch {
    a_prefix: Units,
    a_suffix: Units,
    b_prefix: Units,
    b_suffix: Units,
    common: Units,
}

impl HalfMatch {
    fn swapped(self) -> Self {
        Self {
            a_prefix: self.b_prefix,
            a_suffix: self.b_suffix,
            b_prefix: self.a_prefix,
            b_suffix: self.a_suffix,
            common: self.common,
        }
    }
}

/// Looks for a substring shared by both texts that is at least half the
/// length of the longer one. Disabled when unlimited diff time was asked
/// for, since the heuristic sacrifices minimality.
fn half_match(a: &[u16], b: &[u16], opts: &Options) -> Option<HalfMatch> {
    if opts.diff_timeout <= 0.0 {
        return None;
    }
    let (long, short) = if a.len() > b.len() { (a, b) } else { (b, a) };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // Check seeds starting at the second quarter and at the second half.
    let hm1 = half_match_at(long, short, long.len().div_ceil(4));
    let hm2 = half_match_at(long, short, long.len().div_ceil(2));
    let hm = match (hm1, hm2) {
        (None, None) => return None,
        (Some(h), None) | (None, Some(h)) => h,
        (Some(h1), Some(h2)) => {
            if h1.common.len() > h2.common.len() {
                h1
            } else {
                h2
            }
        }
    };
    Some(if a.len() > b.len() { hm } else { hm.swapped() })
}

/// Extends a quarter-length seed taken from `long` at offset `i` against
/// every occurrence in `short`, keeping the widest extension.
fn half_match_at(long: &[u16], short: &[u16], i: usize) -> Option<HalfMatch> {
    let seed = &long[i..i + long.len() / 4];
    let mut best: Option<HalfMatch> = None;
    let mut best_common_len = 0;
    let mut j_next = unit::index_of(short, seed, 0);
    while let Some(j) = j_next {
        let prefix_length = unit::common_prefix(&long[i..], &short[j..]);
        let suffix_length = unit::common_suffix(&long[..i], &short[..j]);
        if best_common_len < suffix_length + prefix_length {
            best_common_len = suffix_length + prefix_length;
            best = Some(HalfMatch {
                common: short[j - suffix_length..j + prefix_length].to_vec(),
                a_prefix: long[..i - suffix_length].to_vec(),
                a_suffix: long[i + prefix_length..].to_vec(),
                b_prefix: short[..j - suffix_length].to_vec(),
                b_suffix: short[j + prefix_length..].to_vec(),
            });
        }
        j_next = unit::index_of(short, seed, j + 1);
    }
    best.filter(|_| best_common_len * 2 >= long.len())
}

/// Finds the middle snake per Myers' bidirectional O(ND) algorithm, splits
/// the problem there, and recurses. Past the deadline it falls back to a
/// trivial delete-all/insert-all script.
fn bisect(a: &[u16], b: &[u16], deadline: Option<Instant>, opts: &Options) -> Vec<Diff> {
    let a_len = a.len() as isize;
    let b_len = b.len() as isize;
    let max_d = (a.len() + b.len()).div_ceil(2);
    let v_offset = max_d as isize;
    // One extra slot on each side keeps the seed writes at `v_offset + 1`
    // in bounds for the smallest inputs.
    let v_length = 2 * max_d + 2;
    let mut v1 = vec![-1isize; v_length];
    let mut v2 = vec![-1isize; v_length];
    v1[max_d + 1] = 0;
    v2[max_d + 1] = 0;

    let delta = a_len - b_len;
    // If the total number of characters is odd, the front path will collide
    // with the reverse path.
    let front = delta % 2 != 0;
    let mut k1start: isize = 0;
    let mut k1end: isize = 0;
    let mut k2start: isize = 0;
    let mut k2end: isize = 0;

    for d in 0..max_d as isize {
        if past(deadline) {
            tracing::debug!(step = d, "diff deadline exceeded; returning coarse result");
            break;
        }

        // Walk the front path one step.
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < a_len && y1 < b_len && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > a_len {
                // Ran off the right of the graph.
                k1end += 2;
            } else if y1 > b_len {
                // Ran off the bottom of the graph.
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && (k2_offset as usize) < v_length && v2[k2_offset as usize] != -1
                {
                    // Mirror x2 onto top-left coordinate system.
                    let x2 = a_len - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize, deadline, opts);
                    }
                }
            }
            k1 += 2;
        }

        // Walk the reverse path one step.
        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < a_len
                && y2 < b_len
                && a[(a_len - x2 - 1) as usize] == b[(b_len - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > a_len {
                k2end += 2;
            } else if y2 > b_len {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && (k1_offset as usize) < v_length && v1[k1_offset as usize] != -1
                {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    // Mirror x2 onto top-left coordinate system.
                    let x2 = a_len - x2;
                    if x1 >= x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize, deadline, opts);
                    }
                }
            }
            k2 += 2;
        }
    }
    // Number of diffs equals number of characters: no commonality at all,
    // or the deadline fired first.
    vec![
        Diff::from_units(Op::Delete, a.to_vec()),
        Diff::from_units(Op::Insert, b.to_vec()),
    ]
}

fn bisect_split(
    a: &[u16],
    b: &[u16],
    x: usize,
    y: usize,
    deadline: Option<Instant>,
    opts: &Options,
) -> Vec<Diff> {
    let mut diffs = main_units(&a[..x], &b[..y], false, deadline, opts);
    diffs.extend(main_units(&a[x..], &b[y..], false, deadline, opts));
    diffs
}

/// Source text of a script: all non-insert payloads concatenated.
pub fn src(diffs: &[Diff]) -> String {
    unit::decode(&src_units(diffs))
}

/// Destination text of a script: all non-delete payloads concatenated.
pub fn dst(diffs: &[Diff]) -> String {
    unit::decode(&dst_units(diffs))
}

pub(crate) fn src_units(diffs: &[Diff]) -> Units {
    let mut out = Vec::new();
    for d in diffs {
        if d.op != Op::Insert {
            out.extend_from_slice(d.units());
        }
    }
    out
}

pub(crate) fn dst_units(diffs: &[Diff]) -> Units {
    let mut out = Vec::new();
    for d in diffs {
        if d.op != Op::Delete {
            out.extend_from_slice(d.units());
        }
    }
    out
}

/// Levenshtein distance of a script: each delete/insert run costs the
/// larger of its two sides.
pub fn levenshtein(diffs: &[Diff]) -> usize {
    let mut total = 0;
    let mut insertions = 0;
    let mut deletions = 0;
    for d in diffs {
        match d.op {
            Op::Insert => insertions += d.units().len(),
            Op::Delete => deletions += d.units().len(),
            Op::Equal => {
                total += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    total + insertions.max(deletions)
}

/// Translates a source-text offset (in UTF-16 units) to the corresponding
/// destination-text offset. An offset inside a deletion maps to the
/// position where the deleted region collapsed to.
pub fn x_index(diffs: &[Diff], loc: usize) -> usize {
    let mut chars1 = 0;
    let mut chars2 = 0;
    let mut last_chars1 = 0;
    let mut last_chars2 = 0;
    let mut containing: Option<&Diff> = None;
    for d in diffs {
        if d.op != Op::Insert {
            chars1 += d.units().len();
        }
        if d.op != Op::Delete {
            chars2 += d.units().len();
        }
        if chars1 > loc {
            containing = Some(d);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }
    if let Some(d) = containing {
        if d.op == Op::Delete {
            return last_chars2;
        }
    }
    last_chars2 + (loc - last_chars1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> Units {
        unit::encode(s)
    }

    fn no_timeout() -> Options {
        Options {
            diff_timeout: 0.0,
            ..Options::default()
        }
    }

    #[test]
    fn half_match_finds_nothing_in_dissimilar_texts() {
        let opts = Options::default();
        assert!(half_match(&u("1234567890"), &u("abcdef"), &opts).is_none());
        assert!(half_match(&u("12345"), &u("23"), &opts).is_none());
    }

    #[test]
    fn half_match_single_and_multiple_matches() {
        let opts = Options::default();
        let hm = half_match(&u("1234567890"), &u("a345678z"), &opts).unwrap();
        assert_eq!(
            (
                unit::decode(&hm.a_prefix),
                unit::decode(&hm.a_suffix),
                unit::decode(&hm.b_prefix),
                unit::decode(&hm.b_suffix),
                unit::decode(&hm.common)
            ),
            (
                "12".to_string(),
                "90".to_string(),
                "a".to_string(),
                "z".to_string(),
                "345678".to_string()
            )
        );

        let hm = half_match(&u("a345678z"), &u("1234567890"), &opts).unwrap();
        assert_eq!(unit::decode(&hm.common), "345678");
        assert_eq!(unit::decode(&hm.a_prefix), "a");

        let hm = half_match(
            &u("121231234123451234123121"),
            &u("a1234123451234z"),
            &opts,
        )
        .unwrap();
        assert_eq!(unit::decode(&hm.common), "1234123451234");
    }

    #[test]
    fn half_match_does_not_claim_non_optimal_overlap_edges() {
        let opts = Options::default();
        let hm = half_match(&u("qHilloHelloHew"), &u("xHelloHeHulloy"), &opts).unwrap();
        assert_eq!(unit::decode(&hm.common), "HelloHe");
        assert_eq!(unit::decode(&hm.a_prefix), "qHillo");
    }

    #[test]
    fn half_match_disabled_without_timeout() {
        let opts = no_timeout();
        assert!(half_match(&u("qHilloHelloHew"), &u("xHelloHeHulloy"), &opts).is_none());
    }

    #[test]
    fn bisect_splits_at_the_collision_point() {
        let opts = no_timeout();
        let diffs = bisect(&u("cat"), &u("map"), None, &opts);
        assert_eq!(
            diffs,
            vec![
                Diff::delete("c"),
                Diff::insert("m"),
                Diff::equal("a"),
                Diff::delete("t"),
                Diff::insert("p"),
            ]
        );
    }

    #[test]
    fn bisect_past_deadline_returns_trivial_script() {
        let opts = Options::default();
        let past = Instant::now() - Duration::from_millis(1);
        let diffs = bisect(&u("cat"), &u("map"), Some(past), &opts);
        assert_eq!(diffs, vec![Diff::delete("cat"), Diff::insert("map")]);
    }

    #[test]
    fn x_index_translates_and_handles_deletions() {
        let diffs = vec![Diff::delete("a"), Diff::insert("1234"), Diff::equal("xyz")];
        assert_eq!(x_index(&diffs, 2), 5);

        let diffs = vec![Diff::equal("a"), Diff::delete("1234"), Diff::equal("xyz")];
        assert_eq!(x_index(&diffs, 3), 1);
    }

    #[test]
    fn levenshtein_counts_runs() {
        let diffs = vec![Diff::delete("abc"), Diff::insert("1234"), Diff::equal("xyz")];
        assert_eq!(levenshtein(&diffs), 4);
        let diffs = vec![Diff::equal("xyz"), Diff::delete("abc"), Diff::insert("1234")];
        assert_eq!(levenshtein(&diffs), 4);
        let diffs = vec![Diff::delete("abc"), Diff::equal("xyz"), Diff::insert("1234")];
        assert_eq!(levenshtein(&diffs), 7);
    }
}
