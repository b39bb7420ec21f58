//! Tunables shared by the diff, match, and patch engines.

use serde::{Deserialize, Serialize};

/// Behavior knobs for the three engines.
///
/// Unknown keys in a deserialized options document are ignored and missing
/// keys take their defaults, so configuration written against a newer
/// revision of this crate still loads.
///
/// ```
/// use diff_match_patch::Options;
///
/// let opts = Options::default();
/// assert_eq!(opts.match_max_bits, 32);
///
/// let strict: Options = serde_json::from_str(r#"{"match_threshold": 0.0}"#).unwrap();
/// assert_eq!(strict.match_threshold, 0.0);
/// assert_eq!(strict.patch_margin, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Seconds to map a diff before giving a coarse answer. Zero or
    /// negative means unlimited time (and disables the half-match
    /// heuristic, which trades minimality for speed).
    pub diff_timeout: f32,
    /// Cost of an empty edit operation in terms of edit characters, used by
    /// the efficiency cleanup.
    pub diff_edit_cost: usize,
    /// At what point is no match declared (0.0 = perfection, 1.0 = very
    /// loose).
    pub match_threshold: f32,
    /// How far to search for a match (0 = exact location, 1000+ = broad
    /// match). A match this many characters away from the expected location
    /// scores as a complete mismatch.
    pub match_distance: usize,
    /// The number of bits in a match state vector; also the chunk size for
    /// patch splitting. Patterns longer than this cannot be located.
    pub match_max_bits: usize,
    /// When deleting a large block of text (over ~64 characters), how close
    /// do the contents have to be to match the expected contents.
    pub patch_delete_threshold: f32,
    /// Chunk size of context captured on either side of a patch.
    pub patch_margin: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            diff_timeout: 1.0,
            diff_edit_cost: 4,
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: 32,
            patch_delete_threshold: 0.5,
            patch_margin: 4,
        }
    }
}
