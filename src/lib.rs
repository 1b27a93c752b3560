#![forbid(unsafe_code)]
#![deny(missing_docs, missing_debug_implementations)]
//! Thai Character Cluster (TCC) segmentation.
//!
//! Thai text has no spaces between words, and what a reader sees as one
//! character may be a stack of up to three code points. A Thai Character
//! Cluster is the smallest run of such stacks that can never be split, which
//! makes clusters the unit word segmenters, line breakers and search indexes
//! work with.
//!
//! Segmentation runs in two steps:
//!
//! 1. [`assemble`] normalizes text to NFC and groups its code points into
//!    [`GraphemeStack`]s: a base code point with an optional upper or lower
//!    vowel and an optional tone mark or upper sign stacked on it.
//! 2. A [`GStackClusterParser`] walks the stacks and, at every position,
//!    applies the first rule of its ordered table that matches, producing a
//!    [`GStackCluster`].
//!
//! Rules are patterns over classes of stacks, written in a small anchored
//! regular expression language (see [`ClassRegistry`] and
//! [`CompiledPattern`]). Common misspellings and stray marks are recognised
//! by dedicated rules and produce clusters flagged with an
//! [`InvalidReason`]; only input no rule covers makes segmentation fail.
//!
//! ```
//! let clusters = thai_tcc::segment_text("กรุงเทพฯ").unwrap();
//! let texts = clusters.iter().map(|c| c.text()).collect::<Vec<_>>();
//! assert_eq!(vec!["ก", "รุ", "ง", "เท", "พ", "ฯ"], texts);
//! ```
//!
//! # Stack assembly
//!
//! * A consonant takes a following upper or lower vowel, and after it a tone
//!   mark or upper sign. Without a vowel it may take the mark directly.
//!   Nothing stacks on top of a tone mark.
//! * A vowel or mark with nothing to sit on forms a stack of its own with no
//!   base. It is Thai, but not valid Thai.
//! * Two SARA_E in a row are read as one SARA_AE, a common way of typing it.
//! * Every non-Thai code point is a stack of its own.

use once_cell::sync::Lazy;

pub mod codepoints;

pub(crate) mod error;

pub(crate) mod gstack_ty;

pub(crate) mod gstack_iter;

pub(crate) mod class_registry;

pub(crate) mod pattern;

pub(crate) mod pattern_match;

pub(crate) mod cluster_ty;

pub(crate) mod rules;

pub(crate) mod cluster_parser;

pub use error::{PatternError, RuleCompileError, SegmentError, UnknownName};

pub use gstack_ty::GraphemeStack;

pub use gstack_iter::{assemble, normalize, GraphemeStacks};

pub use class_registry::{ClassRegistry, Predicate};

pub use pattern::CompiledPattern;

pub use pattern_match::{Captures, Match};

pub use cluster_ty::{GStackCluster, InvalidReason};

pub use rules::{
    extract_cluster, register_builtin_classes, RuleMatch, TccRule, Trailing, BUILTIN_RULES,
};

pub use cluster_parser::{Clusters, GStackClusterParser};

static SHARED_PARSER: Lazy<GStackClusterParser> = Lazy::new(|| {
    GStackClusterParser::new().expect("built-in cluster rules must compile")
});

/// A parser with the built-in rule table, compiled on first use.
pub fn shared_parser() -> &'static GStackClusterParser {
    &SHARED_PARSER
}

/// Segments `text` with the [`shared_parser`].
pub fn segment_text(text: &str) -> Result<Vec<GStackCluster>, SegmentError> {
    shared_parser().segment_text(text)
}

#[cfg(test)]
mod tests {
    use super::{segment_text, shared_parser};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shared_parser_is_built_once() {
        assert!(std::ptr::eq(shared_parser(), shared_parser()));
        assert_eq!(crate::BUILTIN_RULES.len(), shared_parser().rules().len());
    }

    #[test]
    fn test_segment_text_normalizes() {
        // SARA_U typed after MAI_EK is reordered by NFC before assembly.
        let clusters = segment_text("ป\u{0E48}\u{0E38}").unwrap();
        assert_eq!(1, clusters.len());
        assert_eq!("\u{0E1B}\u{0E38}\u{0E48}", clusters[0].text());
        assert_eq!("single-diacritic-vowel", clusters[0].matching_rule());
    }
}
