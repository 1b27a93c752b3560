use crate::gstack_ty::GraphemeStack;
use smallvec::SmallVec;
use std::fmt;

/// Why a cluster is not valid Thai.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// A vowel, tone mark or upper sign with no consonant to sit on.
    SoloDiacritic,
    /// A vowel that follows the consonant, found with no consonant before it.
    SoloFinalVowel,
    /// SARA_E or SARA_AE before a consonant that already carries a vowel.
    InvalidSaraECombination,
    /// SARA_AE written where the short o-ang sandwich needs SARA_E.
    MisspelledShortOAng,
}

impl InvalidReason {
    /// A short human readable description.
    pub fn description(self) -> &'static str {
        match self {
            InvalidReason::SoloDiacritic => "diacritic without a host consonant",
            InvalidReason::SoloFinalVowel => "following vowel without a consonant",
            InvalidReason::InvalidSaraECombination => {
                "front vowel before a consonant that already has a vowel"
            }
            InvalidReason::MisspelledShortOAng => "SARA_AE used for the short o-ang sandwich",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

pub(crate) type ClusterTail = SmallVec<[GraphemeStack; 4]>;

/// One Thai Character Cluster.
///
/// A valid Thai cluster has either a `first_consonant`, optionally preceded
/// by a `front_vowel`, or a `single_mid_sign`. Stacks after the first
/// consonant are kept in order in the `tail`. A non-Thai cluster, and a
/// cluster made of one stray vowel or mark, keeps its stack in the `tail`.
///
/// Exactly one of `first_consonant`, `single_mid_sign` or "not Thai" holds
/// for valid Thai clusters and non-Thai clusters only. A cluster flagged
/// [`InvalidReason::SoloDiacritic`] or [`InvalidReason::SoloFinalVowel`] is
/// Thai and has neither a first consonant nor a mid sign.
#[derive(Clone, PartialEq, Eq)]
pub struct GStackCluster {
    text: String,
    is_thai: bool,
    is_valid_thai: bool,
    invalid_reason: Option<InvalidReason>,
    front_vowel: Option<GraphemeStack>,
    first_consonant: Option<GraphemeStack>,
    single_mid_sign: Option<GraphemeStack>,
    tail: ClusterTail,
    matching_rule: &'static str,
}

/// The part a stack plays in a cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StackRole {
    /// The leading vowel written before the consonant.
    FrontVowel,
    /// The core consonant.
    FirstConsonant,
    /// A standalone sign or digit.
    SingleMidSign,
    /// Anything completing the cluster.
    Tail,
}

impl GStackCluster {
    /// Starts an empty cluster produced by `matching_rule`.
    pub(crate) fn new(matching_rule: &'static str) -> Self {
        GStackCluster {
            text: String::new(),
            is_thai: true,
            is_valid_thai: true,
            invalid_reason: None,
            front_vowel: None,
            first_consonant: None,
            single_mid_sign: None,
            tail: ClusterTail::new(),
            matching_rule,
        }
    }

    /// A cluster holding one non-Thai stack.
    pub(crate) fn not_thai(stack: GraphemeStack) -> Self {
        let mut cluster = GStackCluster::new("not-thai");
        cluster.push(StackRole::Tail, stack);
        cluster
    }

    /// Appends `stack` in the given role. The cluster text grows in push order.
    pub(crate) fn push(&mut self, role: StackRole, stack: GraphemeStack) {
        self.text.push_str(stack.text());
        self.is_thai &= stack.is_thai();
        self.is_valid_thai &= stack.is_valid_thai();
        match role {
            StackRole::FrontVowel => self.front_vowel = Some(stack),
            StackRole::FirstConsonant => self.first_consonant = Some(stack),
            StackRole::SingleMidSign => self.single_mid_sign = Some(stack),
            StackRole::Tail => self.tail.push(stack),
        }
    }

    /// Marks the cluster as a recognised misspelling.
    pub fn with_invalid_reason(mut self, reason: InvalidReason) -> Self {
        self.invalid_reason = Some(reason);
        self.is_valid_thai = false;
        self
    }

    /// Concatenated text of the cluster's stacks.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether every stack of the cluster is Thai.
    pub fn is_thai(&self) -> bool {
        self.is_thai
    }

    /// Whether the cluster is well-formed Thai.
    pub fn is_valid_thai(&self) -> bool {
        self.is_valid_thai
    }

    /// Set exactly when a recognised misspelling produced the cluster.
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        self.invalid_reason
    }

    /// The leading vowel.
    pub fn front_vowel(&self) -> Option<&GraphemeStack> {
        self.front_vowel.as_ref()
    }

    /// The core consonant, with any vowel or mark stacked on it.
    pub fn first_consonant(&self) -> Option<&GraphemeStack> {
        self.first_consonant.as_ref()
    }

    /// The standalone sign or digit.
    pub fn single_mid_sign(&self) -> Option<&GraphemeStack> {
        self.single_mid_sign.as_ref()
    }

    /// Stacks completing the cluster, in order.
    pub fn tail(&self) -> &[GraphemeStack] {
        &self.tail
    }

    /// Name of the rule that produced the cluster.
    pub fn matching_rule(&self) -> &'static str {
        self.matching_rule
    }

    /// All stacks of the cluster, in text order.
    pub fn stacks(&self) -> impl Iterator<Item = &GraphemeStack> + '_ {
        self.front_vowel
            .iter()
            .chain(self.first_consonant.iter())
            .chain(self.single_mid_sign.iter())
            .chain(self.tail.iter())
    }

    /// Diagnostic representation, the same text as the `Debug` output.
    pub fn repr(&self) -> String {
        format!("{:?}", self)
    }
}

impl fmt::Display for GStackCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for GStackCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_thai {
            return write!(f, "<CC Not-Thai: {}>", self.text);
        }
        if let Some(reason) = self.invalid_reason {
            return write!(f, "<CC Invalid-Thai: {} Reason: {}>", self.text, reason);
        }
        write!(f, "<CC Thai {}", self.text)?;
        if let Some(sign) = &self.single_mid_sign {
            write!(f, " SS:{:?}", sign)?;
        }
        if let Some(front_vowel) = &self.front_vowel {
            write!(f, " FV:{:?}", front_vowel)?;
        }
        if let Some(consonant) = &self.first_consonant {
            write!(f, " FC:{:?}", consonant)?;
        }
        for (idx, stack) in self.tail.iter().enumerate() {
            write!(f, " T{}:{:?}", idx, stack)?;
        }
        f.write_str(">")
    }
}
