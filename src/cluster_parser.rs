use crate::{
    class_registry::{ClassRegistry, Predicate},
    cluster_ty::GStackCluster,
    error::{PatternError, RuleCompileError, SegmentError},
    gstack_iter::assemble,
    gstack_ty::GraphemeStack,
    pattern::CompiledPattern,
    rules::{register_builtin_classes, RuleMatch, TccRule, Trailing, BUILTIN_RULES},
};
use std::{fmt, iter::FusedIterator};

struct CompiledRule {
    rule: TccRule,
    pattern: CompiledPattern,
    keep: Option<Predicate>,
}

impl CompiledRule {
    fn compile(classes: &ClassRegistry, rule: &TccRule) -> Result<Self, RuleCompileError> {
        let err = |source: PatternError| RuleCompileError {
            rule: rule.name,
            source,
        };
        let pattern = classes.compile(rule.pattern).map_err(err)?;
        let keep = match rule.trailing {
            Some(Trailing { group, keep }) => {
                if pattern.group_index(group).is_none() {
                    return Err(err(PatternError::Syntax {
                        token: group.to_owned(),
                        reason: "trailing group is not defined by the pattern",
                    }));
                }
                keep.map(|name| {
                    classes
                        .get(name)
                        .cloned()
                        .ok_or_else(|| err(PatternError::UndefinedClass(name.to_owned())))
                })
                .transpose()?
            }
            None => None,
        };
        Ok(CompiledRule {
            rule: *rule,
            pattern,
            keep,
        })
    }
}

/// Splits grapheme stacks into Thai Character Clusters.
///
/// The parser owns its compiled rule table and never changes it after
/// construction, so one parser can serve any number of threads.
pub struct GStackClusterParser {
    classes: ClassRegistry,
    rules: Vec<CompiledRule>,
}

impl GStackClusterParser {
    /// Compiles the built-in rule table.
    pub fn new() -> Result<Self, RuleCompileError> {
        GStackClusterParser::with_rules(BUILTIN_RULES)
    }

    /// Compiles `rules` against the built-in class namespace. Earlier rules
    /// take priority.
    pub fn with_rules(rules: &[TccRule]) -> Result<Self, RuleCompileError> {
        let mut classes = ClassRegistry::new();
        register_builtin_classes(&mut classes).map_err(|source| RuleCompileError {
            rule: "builtin-classes",
            source,
        })?;
        let rules = rules
            .iter()
            .map(|rule| CompiledRule::compile(&classes, rule))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "compiled {} cluster rules over {} classes",
            rules.len(),
            classes.len()
        );
        Ok(GStackClusterParser { classes, rules })
    }

    /// The class namespace rules are compiled against.
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// The rule table, highest priority first.
    pub fn rules(&self) -> impl ExactSizeIterator<Item = &TccRule> + '_ {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Lazily segments `stacks`. The iterator ends after the first error.
    pub fn clusters<'p, 's>(&'p self, stacks: &'s [GraphemeStack]) -> Clusters<'p, 's> {
        Clusters {
            parser: self,
            stacks,
            pos: 0,
            failed: false,
        }
    }

    /// Segments `stacks` into clusters whose texts concatenate back to the
    /// stacks' texts.
    ///
    /// Fails when no rule matches at some position; no partial result is
    /// returned then.
    pub fn segment(&self, stacks: &[GraphemeStack]) -> Result<Vec<GStackCluster>, SegmentError> {
        self.clusters(stacks).collect()
    }

    /// Normalizes and assembles `text`, then segments it.
    pub fn segment_text(&self, text: &str) -> Result<Vec<GStackCluster>, SegmentError> {
        self.segment(&assemble(text))
    }

    fn cluster_at(
        &self,
        stacks: &[GraphemeStack],
        pos: usize,
    ) -> Result<(GStackCluster, usize), SegmentError> {
        let stack = &stacks[pos];
        if !stack.is_thai() {
            log::trace!("stack {} is not Thai: {:?}", pos, stack);
            return Ok((GStackCluster::not_thai(stack.clone()), 1));
        }

        for compiled in &self.rules {
            let found = match compiled.rule.trailing {
                Some(trailing) => compiled.pattern.match_with_trailing_disambiguation(
                    stacks,
                    pos,
                    trailing.group,
                    compiled.keep.as_ref(),
                ),
                None => compiled.pattern.match_at(stacks, pos),
            };
            // A rule that consumes nothing cannot advance the scan.
            if !found.success() || found.length() == 0 {
                continue;
            }
            let rule_match = RuleMatch::new(compiled.rule.name, stacks, &found);
            let cluster = (compiled.rule.extract)(&rule_match);
            match cluster.invalid_reason() {
                Some(reason) => log::debug!(
                    "invalid cluster at stack {}: {} ({})",
                    pos,
                    cluster.text(),
                    reason
                ),
                None => log::trace!("{:?} by rule {}", cluster, compiled.rule.name),
            }
            return Ok((cluster, found.length()));
        }

        log::warn!("no cluster rule matches at stack {}: {:?}", pos, stack);
        Err(SegmentError::GrammarExhausted {
            position: pos,
            stack: format!("{:?}", stack),
        })
    }
}

impl fmt::Debug for GStackClusterParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GStackClusterParser")
            .field(
                "rules",
                &self.rules().map(|rule| rule.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A lazy iterator over the clusters of a stack sequence.
///
/// Yields at most one error, as its last item.
pub struct Clusters<'p, 's> {
    parser: &'p GStackClusterParser,
    stacks: &'s [GraphemeStack],
    pos: usize,
    failed: bool,
}

impl<'p, 's> Clusters<'p, 's> {
    /// Index of the next stack to be clustered.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'p, 's> Iterator for Clusters<'p, 's> {
    type Item = Result<GStackCluster, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.stacks.len() {
            return None;
        }
        match self.parser.cluster_at(self.stacks, self.pos) {
            Ok((cluster, consumed)) => {
                self.pos += consumed;
                Some(Ok(cluster))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Clusters<'_, '_> {}

impl fmt::Debug for Clusters<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clusters")
            .field("pos", &self.pos)
            .field("len", &self.stacks.len())
            .field("failed", &self.failed)
            .finish()
    }
}
