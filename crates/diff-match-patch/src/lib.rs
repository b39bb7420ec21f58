//! Text differencing, fuzzy matching, and patching.
//!
//! Three engines, usable separately or as a pipeline:
//!
//! - [`diff`] — produces a minimal ordered edit script between two texts
//!   (Myers bisection with affix trimming, half-match decomposition, line
//!   mode, cleanup passes, and a compact delta codec).
//! - [`bitap`] — finds the best fuzzy occurrence of a pattern near an
//!   expected location, scoring edit distance against positional drift.
//! - [`patch`] — turns a script into self-describing, context-bearing
//!   patches that can later be applied, with tolerance, to a drifted
//!   derivative of the original text.
//!
//! All offsets and lengths — in the delta format, the patch format, and the
//! location APIs — count UTF-16 code units, so serialized artifacts are
//! interchangeable with implementations hosted on UTF-16 strings.
//!
//! ```
//! use diff_match_patch::{patch, Options, PatchInput};
//!
//! let opts = Options::default();
//! let patches = patch::make(
//!     PatchInput::Texts("The quick brown fox.", "The slow brown fox."),
//!     &opts,
//! );
//! let (result, applied) = patch::apply(&patches, "The quick brown dog.", &opts);
//! assert_eq!(result, "The slow brown dog.");
//! assert_eq!(applied, vec![true]);
//! ```

pub mod bitap;
pub mod diff;
pub mod options;
pub mod patch;
mod unit;
mod uri;

pub use bitap::MatchError;
pub use diff::{Diff, DeltaError, Op};
pub use options::Options;
pub use patch::{Patch, PatchError, PatchInput};
