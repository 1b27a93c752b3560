use crate::{
    class_registry::Predicate,
    error::PatternError,
    gstack_ty::GraphemeStack,
    pattern::{CompiledPattern, Node, Term},
};
use smallvec::{smallvec, SmallVec};
use std::ops::Range;

type Slots = SmallVec<[Option<Range<usize>>; 8]>;

type Continuation<'k> = dyn FnMut(usize, &mut Slots) -> bool + 'k;

fn match_terms(
    terms: &[Term],
    input: &[GraphemeStack],
    pos: usize,
    slots: &mut Slots,
    k: &mut Continuation<'_>,
) -> bool {
    let (term, rest) = match terms.split_first() {
        Some(split) => split,
        None => return k(pos, slots),
    };
    let mut next = |pos: usize, slots: &mut Slots| match_terms(rest, input, pos, slots, &mut *k);
    if match_node(&term.node, input, pos, slots, &mut next) {
        return true;
    }
    term.optional && next(pos, slots)
}

fn match_node(
    node: &Node,
    input: &[GraphemeStack],
    pos: usize,
    slots: &mut Slots,
    k: &mut Continuation<'_>,
) -> bool {
    match node {
        Node::Class(expr) => match input.get(pos) {
            Some(stack) if expr.eval(stack) => k(pos + 1, slots),
            _ => false,
        },
        Node::End => pos == input.len() && k(pos, slots),
        Node::Group {
            index,
            alternatives,
        } => {
            let index = *index;
            for alternative in alternatives {
                let mut close = |end: usize, slots: &mut Slots| {
                    let prev = slots[index].replace(pos..end);
                    if k(end, slots) {
                        return true;
                    }
                    slots[index] = prev;
                    false
                };
                if match_terms(alternative, input, pos, slots, &mut close) {
                    return true;
                }
            }
            false
        }
    }
}

/// Capture groups of a [`Match`].
///
/// Group 0 spans the whole match. A group that did not take part in the
/// match is empty; asking for its bounds is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures<'p> {
    slots: Slots,
    names: &'p [(String, usize)],
}

impl<'p> Captures<'p> {
    /// Number of groups, counting group 0.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pattern has no groups at all, which never happens for a
    /// compiled pattern.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The range of stacks group `idx` captured, if it took part.
    pub fn get(&self, idx: usize) -> Option<Range<usize>> {
        self.slots.get(idx).cloned().flatten()
    }

    /// The range of stacks the group called `name` captured, if it took part.
    pub fn name(&self, name: &str) -> Option<Range<usize>> {
        self.index_of(name).and_then(|idx| self.get(idx))
    }

    /// Whether group `idx` did not take part in the match.
    pub fn group_is_empty(&self, idx: usize) -> bool {
        self.get(idx).is_none()
    }

    /// The bounds of group `idx`.
    pub fn bounds(&self, idx: usize) -> Result<Range<usize>, PatternError> {
        self.get(idx)
            .ok_or_else(|| PatternError::EmptyGroupAccess(idx.to_string()))
    }

    /// The bounds of the group called `name`.
    pub fn named_bounds(&self, name: &str) -> Result<Range<usize>, PatternError> {
        self.name(name)
            .ok_or_else(|| PatternError::EmptyGroupAccess(name.to_owned()))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, idx)| idx)
    }
}

/// The outcome of an anchored match attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'p> {
    success: bool,
    start: usize,
    length: usize,
    groups: Captures<'p>,
}

impl<'p> Match<'p> {
    /// Whether the pattern matched.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Where the attempt was anchored.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of stacks consumed; zero when the match failed.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The consumed range of the input.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.length
    }

    /// The capture groups.
    pub fn groups(&self) -> &Captures<'p> {
        &self.groups
    }
}

impl CompiledPattern {
    fn empty_slots(&self) -> Slots {
        smallvec![None; self.group_count]
    }

    /// Matches the pattern against `input` starting exactly at `pos`.
    ///
    /// The first successful path wins: alternatives are tried left to right
    /// and optional terms are tried before they are skipped. A `pos` past the
    /// end of the input behaves like the end of the input.
    pub fn match_at<'p>(&'p self, input: &[GraphemeStack], pos: usize) -> Match<'p> {
        let mut slots = self.empty_slots();
        let mut end = pos;
        let success = pos <= input.len()
            && match_node(&self.root, input, pos, &mut slots, &mut |e: usize, _: &mut Slots| {
                end = e;
                true
            });
        if !success {
            slots = self.empty_slots();
            end = pos;
        }
        Match {
            success,
            start: pos,
            length: end - pos,
            groups: Captures {
                slots,
                names: &self.group_names,
            },
        }
    }

    /// Matches like [`match_at`](Self::match_at), then decides whether the
    /// stacks captured by the trailing group `group` belong to this match.
    ///
    /// Rules end in a group that peeks at what follows so that lookahead
    /// conditions such as "followed by a non-vowel or the end" can be
    /// expressed. The stacks that group captured stay in the match only if
    /// `keep` accepts every one of them; otherwise the match is shortened by
    /// the group's length and the group is reported as empty. With no `keep`
    /// predicate the group is always given back.
    ///
    /// Only a group that ends where the match ends is considered.
    pub fn match_with_trailing_disambiguation<'p>(
        &'p self,
        input: &[GraphemeStack],
        pos: usize,
        group: &str,
        keep: Option<&Predicate>,
    ) -> Match<'p> {
        let mut found = self.match_at(input, pos);
        if !found.success {
            return found;
        }
        let trailing = match found.groups.name(group) {
            Some(range) if !range.is_empty() && range.end == found.range().end => range,
            _ => return found,
        };
        let kept = keep.map_or(false, |keep| input[trailing.clone()].iter().all(|s| keep(s)));
        if !kept {
            log::trace!(
                "giving back {} trailing stack(s) of group `{}`",
                trailing.len(),
                group
            );
            found.length -= trailing.len();
            let end = found.range().end;
            for slot in found.groups.slots.iter_mut() {
                *slot = match slot.take() {
                    Some(range) if range.start >= end && !range.is_empty() => None,
                    Some(range) => Some(range.start..range.end.min(end)),
                    None => None,
                };
            }
            if let Some(idx) = found.groups.index_of(group) {
                found.groups.slots[idx] = None;
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use crate::class_registry::{ClassRegistry, Predicate};
    use crate::codepoints::*;
    use crate::error::PatternError;
    use crate::gstack_iter::assemble;
    use crate::gstack_ty::GraphemeStack;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry
            .define_class("consonant", GraphemeStack::is_consonant)
            .unwrap();
        registry
            .define_class("mid-vowel", |s| s.main().map_or(false, is_mid_vowel))
            .unwrap();
        for &(c, name) in [(SARA_A, "SARA_A"), (SARA_AA, "SARA_AA"), (SARA_E, "SARA_E")].iter() {
            registry
                .define_identity(name, GraphemeStack::from_char(c))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_anchored() {
        let pattern = registry().compile("[:consonant:] [:SARA_AA:]").unwrap();
        let input = assemble("กกา");
        assert!(!pattern.match_at(&input, 0).success());
        let found = pattern.match_at(&input, 1);
        assert!(found.success());
        assert_eq!(1..3, found.range());
        assert_eq!(Some(1..3), found.groups().get(0));
        assert!(!pattern.match_at(&input, 3).success());
        assert!(!pattern.match_at(&input, 7).success());
    }

    #[test]
    fn test_optional_is_greedy() {
        let pattern = registry()
            .compile("(?P<fc>[:consonant:]) (?P<v>[:SARA_A:])?")
            .unwrap();
        let input = assemble("ละ");
        let found = pattern.match_at(&input, 0);
        assert_eq!(2, found.length());
        assert_eq!(Some(1..2), found.groups().name("v"));

        let input = assemble("ลา");
        let found = pattern.match_at(&input, 0);
        assert_eq!(1, found.length());
        assert!(found.groups().group_is_empty(2));
        assert_eq!(
            Err(PatternError::EmptyGroupAccess("v".to_owned())),
            found.groups().named_bounds("v")
        );
        assert_eq!(
            Err(PatternError::EmptyGroupAccess("2".to_owned())),
            found.groups().bounds(2)
        );
        assert_eq!(Ok(0..1), found.groups().named_bounds("fc"));
    }

    #[test]
    fn test_backtracks_into_optional_and_alternatives() {
        // The optional consonant must give its stack back for the final one.
        let pattern = registry()
            .compile("[:consonant:] [:consonant:]? [:consonant:] $")
            .unwrap();
        assert_eq!(2, pattern.match_at(&assemble("กข"), 0).length());
        assert_eq!(3, pattern.match_at(&assemble("กขค"), 0).length());

        let pattern = registry()
            .compile("(?P<a>[:consonant:] | [:consonant:] [:consonant:]) [:SARA_AA:]")
            .unwrap();
        let found = pattern.match_at(&assemble("กขา"), 0);
        assert!(found.success());
        assert_eq!(Some(0..2), found.groups().name("a"));
    }

    #[test]
    fn test_end_anchor() {
        let pattern = registry().compile("[:consonant:] $").unwrap();
        assert!(pattern.match_at(&assemble("ก"), 0).success());
        assert!(!pattern.match_at(&assemble("กา"), 0).success());
        assert!(pattern.match_at(&assemble("กข"), 1).success());
    }

    #[test]
    fn test_failed_match_has_no_groups() {
        let pattern = registry()
            .compile("(?P<fc>[:consonant:]) [:SARA_A:]")
            .unwrap();
        let found = pattern.match_at(&assemble("กา"), 0);
        assert!(!found.success());
        assert_eq!(0, found.length());
        assert!(found.groups().group_is_empty(0));
        assert!(found.groups().group_is_empty(1));
    }

    #[test]
    fn test_trailing_disambiguation() {
        let registry = registry();
        let pattern = registry
            .compile(
                "(?P<fv>[:SARA_E:]) (?P<fc>[:consonant:]) \
                 (?P<trail>[:SARA_A:] | [:!mid-vowel:] | $)",
            )
            .unwrap();
        let keep: Predicate = registry.get("SARA_A").cloned().unwrap();

        // SARA_A belongs to the cluster.
        let input = assemble("เละ");
        let found = pattern.match_with_trailing_disambiguation(&input, 0, "trail", Some(&keep));
        assert_eq!(3, found.length());
        assert_eq!(Some(2..3), found.groups().name("trail"));

        // A following consonant only confirms the boundary.
        let input = assemble("เลง");
        let found = pattern.match_with_trailing_disambiguation(&input, 0, "trail", Some(&keep));
        assert_eq!(2, found.length());
        assert_eq!(None, found.groups().name("trail"));
        assert_eq!(Some(0..2), found.groups().get(0));
        assert_eq!(Some(1..2), found.groups().name("fc"));

        // At the end of the input there is nothing to give back.
        let input = assemble("เล");
        let found = pattern.match_with_trailing_disambiguation(&input, 0, "trail", Some(&keep));
        assert_eq!(2, found.length());
        assert_eq!(Some(2..2), found.groups().name("trail"));

        // Without a keep predicate the trailing stack is always given back.
        let input = assemble("เละ");
        let found = pattern.match_with_trailing_disambiguation(&input, 0, "trail", None);
        assert_eq!(2, found.length());

        // A mid vowel other than SARA_A fails the lookahead outright.
        let input = assemble("เลา");
        assert!(!pattern
            .match_with_trailing_disambiguation(&input, 0, "trail", Some(&keep))
            .success());
    }

    #[test]
    fn test_predicates_are_shared() {
        let registry = registry();
        let pattern = registry.compile("[:consonant:]").unwrap();
        drop(registry);
        let pattern = Arc::new(pattern);
        let worker = {
            let pattern = Arc::clone(&pattern);
            std::thread::spawn(move || pattern.match_at(&assemble("ก"), 0).success())
        };
        assert!(worker.join().unwrap());
    }
}
