use thiserror::Error;

/// Errors raised while defining classes, compiling patterns, or reading
/// capture groups out of a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A pattern references a class or identity that was never defined.
    #[error("undefined class `{0}`")]
    UndefinedClass(String),
    /// The pattern text does not follow the pattern grammar.
    #[error("malformed pattern at `{token}`: {reason}")]
    Syntax {
        /// The offending token, as written in the pattern.
        token: String,
        /// What was expected instead.
        reason: &'static str,
    },
    /// A class or identity name was defined twice.
    #[error("class `{0}` is already defined")]
    DuplicateClass(String),
    /// Two capture groups in one pattern share a name.
    #[error("capture group `{0}` is defined more than once")]
    DuplicateGroup(String),
    /// The bounds of a capture group that did not take part in the match
    /// were requested.
    #[error("capture group `{0}` is empty")]
    EmptyGroupAccess(String),
}

/// A rule of a cluster rule table could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cluster rule `{rule}` failed to compile")]
pub struct RuleCompileError {
    /// Name of the failing rule.
    pub rule: &'static str,
    /// The underlying pattern error.
    #[source]
    pub source: PatternError,
}

/// Segmentation of a grapheme stack sequence failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// No rule of the table matches at `position`. The input lies outside the
    /// grammar, so no partial result is produced.
    #[error("no cluster rule matches at stack {position}: {stack}")]
    GrammarExhausted {
        /// Index of the unmatched stack in the input sequence.
        position: usize,
        /// Diagnostic representation of the unmatched stack.
        stack: String,
    },
}

/// A name passed to [`string_from_names`](crate::codepoints::string_from_names)
/// is not a Thai code point name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{name}` at index {index} is not a Thai code point name")]
pub struct UnknownName {
    /// The unrecognised name.
    pub name: String,
    /// Its position in the list of names.
    pub index: usize,
}
