//! The ordered TCC grammar and the class namespace it is written in.
//!
//! Rules are tried in table order at every position; the first one that
//! matches wins, so specific spellings come before the general patterns they
//! would otherwise be swallowed by. The last four rules accept common
//! misspellings and stray marks and produce invalid clusters instead of
//! failing.
//!
//! Capture groups named `fv`, `fc` and `ms` tell [`extract_cluster`] where the
//! front vowel, the first consonant and a standalone sign are. A group named
//! `trail` is a lookahead that is given back unless the rule says otherwise;
//! see [`Trailing`].

use crate::{
    class_registry::ClassRegistry,
    cluster_ty::{GStackCluster, InvalidReason, StackRole},
    codepoints::*,
    error::PatternError,
    gstack_ty::GraphemeStack,
    pattern_match::Match,
};
use std::fmt;

/// How a rule's trailing lookahead group is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trailing {
    /// Name of the capture group closing the pattern.
    pub group: &'static str,
    /// Class the captured stacks must belong to in order to stay in the
    /// cluster. With `None` they are always given back.
    pub keep: Option<&'static str>,
}

/// A successful rule match, handed to the rule's extractor.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    rule: &'static str,
    input: &'a [GraphemeStack],
    found: &'a Match<'a>,
}

impl<'a> RuleMatch<'a> {
    pub(crate) fn new(
        rule: &'static str,
        input: &'a [GraphemeStack],
        found: &'a Match<'a>,
    ) -> Self {
        RuleMatch { rule, input, found }
    }

    /// Name of the matching rule.
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// The whole stack sequence being segmented.
    pub fn input(&self) -> &'a [GraphemeStack] {
        self.input
    }

    /// The match, after trailing disambiguation.
    pub fn found(&self) -> &'a Match<'a> {
        self.found
    }

    /// The stacks the match consumed.
    pub fn consumed(&self) -> &'a [GraphemeStack] {
        &self.input[self.found.range()]
    }

    /// The stacks the group called `name` captured, if it took part.
    pub fn group(&self, name: &str) -> Option<&'a [GraphemeStack]> {
        self.found
            .groups()
            .name(name)
            .map(|range| &self.input[range])
    }
}

/// One entry of a cluster rule table.
#[derive(Clone, Copy)]
pub struct TccRule {
    /// Diagnostic name, reported as the cluster's matching rule.
    pub name: &'static str,
    /// Pattern text, compiled against the built-in class namespace.
    pub pattern: &'static str,
    /// Trailing lookahead resolution, if the pattern ends in one.
    pub trailing: Option<Trailing>,
    /// Builds the cluster from a match.
    pub extract: fn(&RuleMatch<'_>) -> GStackCluster,
}

impl fmt::Debug for TccRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TccRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("trailing", &self.trailing)
            .finish()
    }
}

/// Builds a cluster from the consumed stacks of a match.
///
/// Stacks in the `fv` group become the front vowel, the first stack of the
/// `fc` group the first consonant, a stack in the `ms` group the single mid
/// sign. Everything else goes to the tail, in order.
pub fn extract_cluster(m: &RuleMatch<'_>) -> GStackCluster {
    let groups = m.found().groups();
    let front_vowel = groups.name("fv");
    let first_consonant = groups.name("fc");
    let mid_sign = groups.name("ms");

    let mut cluster = GStackCluster::new(m.rule());
    for pos in m.found().range() {
        let role = if front_vowel.as_ref().map_or(false, |r| r.contains(&pos)) {
            StackRole::FrontVowel
        } else if first_consonant.as_ref().map_or(false, |r| r.start == pos) {
            StackRole::FirstConsonant
        } else if mid_sign.as_ref().map_or(false, |r| r.contains(&pos)) {
            StackRole::SingleMidSign
        } else {
            StackRole::Tail
        };
        cluster.push(role, m.input()[pos].clone());
    }
    cluster
}

fn solo_diacritic(m: &RuleMatch<'_>) -> GStackCluster {
    extract_cluster(m).with_invalid_reason(InvalidReason::SoloDiacritic)
}

fn solo_final_vowel(m: &RuleMatch<'_>) -> GStackCluster {
    extract_cluster(m).with_invalid_reason(InvalidReason::SoloFinalVowel)
}

fn invalid_sara_e_combination(m: &RuleMatch<'_>) -> GStackCluster {
    extract_cluster(m).with_invalid_reason(InvalidReason::InvalidSaraECombination)
}

fn misspelled_short_o_ang(m: &RuleMatch<'_>) -> GStackCluster {
    extract_cluster(m).with_invalid_reason(InvalidReason::MisspelledShortOAng)
}

/// Consonants that glide into a following RO_RUA.
const GLIDE_LEAD_RO: &[char] = &[
    KO_KAI, KHO_KHAI, KHO_KHWAI, TO_TAO, THO_THAHAN, PO_PLA, PHO_PHAN, BO_BAIMAI, DO_DEK, FO_FAN,
    CHO_CHAN, SO_SALA, SO_SUA,
];

/// Consonants that glide into a following LO_LING.
const GLIDE_LEAD_LO: &[char] = &[
    KO_KAI, KHO_KHAI, KHO_KHWAI, PO_PLA, PHO_PHAN, PHO_PHUNG, BO_BAIMAI, FO_FAN,
];

/// Consonants that glide into a following WO_WAEN.
const GLIDE_LEAD_WO: &[char] = &[KO_KAI, KHO_KHAI, KHO_KHWAI];

/// Low consonants a silent HO_HIP leads.
const AFTER_HO_HIP: &[char] = &[
    NGO_NGU, YO_YING, NO_NU, MO_MA, YO_YAK, RO_RUA, LO_LING, WO_WAEN,
];

const SIMPLE_DIACRITIC_VOWELS: &[char] = &[
    SARA_I, SARA_II, SARA_UE, SARA_UEE, SARA_U, SARA_UU, PHINTHU, MAITAIKHU,
];

fn main_is(f: fn(char) -> bool) -> impl Fn(&GraphemeStack) -> bool + Send + Sync {
    move |stack: &GraphemeStack| stack.main().map_or(false, f)
}

fn main_in(set: &'static [char]) -> impl Fn(&GraphemeStack) -> bool + Send + Sync {
    move |stack: &GraphemeStack| stack.main().map_or(false, |c| set.contains(&c))
}

fn bare_in(set: &'static [char]) -> impl Fn(&GraphemeStack) -> bool + Send + Sync {
    move |stack: &GraphemeStack| {
        stack.diacritic_vowel().is_none()
            && stack.upper_diacritic().is_none()
            && stack.main().map_or(false, |c| set.contains(&c))
    }
}

fn vowel_is(f: fn(Option<char>) -> bool) -> impl Fn(&GraphemeStack) -> bool + Send + Sync {
    move |stack: &GraphemeStack| f(stack.diacritic_vowel())
}

/// Defines the class namespace the built-in rules are written in.
///
/// Besides the categories below, every Thai code point `NAME` gets an
/// identity `NAME` (the stack that code point forms alone) and a class
/// `has-NAME` (any slot of the stack holds it).
///
/// | class | accepts |
/// |---|---|
/// | `consonant` | a consonant, with anything stacked on it |
/// | `front-vowel`, `mid-vowel`, `mid-sign`, `digit` | by `main` |
/// | `sara-ai`, `sara-e-ae-o` | front vowels by group |
/// | `solo-diacritic` | a vowel or mark with no host |
/// | `has-dv`, `no-dv` | a diacritic vowel is present, absent |
/// | `short-or-no-dv` | no diacritic vowel, or MAITAIKHU |
/// | `uee-or-no-dv` | no diacritic vowel, or SARA_UEE |
/// | `simple-dv` | an upper or lower vowel other than MAI_HAN_AKAT |
/// | `tone-mark`, `upper-sign` | by `upper_diacritic` |
/// | `glide-lead-ro`, `glide-lead-lo`, `glide-lead-wo` | a bare consonant that glides into the next |
/// | `after-ho-hip` | a low consonant led by HO_HIP |
pub fn register_builtin_classes(registry: &mut ClassRegistry) -> Result<(), PatternError> {
    registry.define_class("consonant", GraphemeStack::is_consonant)?;
    registry.define_class("front-vowel", main_is(is_front_vowel))?;
    registry.define_class("mid-vowel", main_is(is_mid_vowel))?;
    registry.define_class("mid-sign", main_is(is_mid_sign))?;
    registry.define_class("digit", main_is(is_digit))?;
    registry.define_class("sara-ai", main_in(&[SARA_AI_MAIMUAN, SARA_AI_MAIMALAI]))?;
    registry.define_class("sara-e-ae-o", main_in(&[SARA_E, SARA_AE, SARA_O]))?;
    registry.define_class("solo-diacritic", |stack: &GraphemeStack| {
        stack.main().is_none() && stack.is_thai()
    })?;
    registry.define_class("has-dv", vowel_is(|dv| dv.is_some()))?;
    registry.define_class("no-dv", vowel_is(|dv| dv.is_none()))?;
    registry.define_class(
        "short-or-no-dv",
        vowel_is(|dv| matches!(dv, None | Some(MAITAIKHU))),
    )?;
    registry.define_class(
        "uee-or-no-dv",
        vowel_is(|dv| matches!(dv, None | Some(SARA_UEE))),
    )?;
    registry.define_class(
        "simple-dv",
        vowel_is(|dv| dv.map_or(false, |c| SIMPLE_DIACRITIC_VOWELS.contains(&c))),
    )?;
    registry.define_class("tone-mark", |stack: &GraphemeStack| {
        stack.upper_diacritic().map_or(false, is_tone_mark)
    })?;
    registry.define_class("upper-sign", |stack: &GraphemeStack| {
        stack.upper_diacritic().map_or(false, is_upper_sign)
    })?;
    registry.define_class("glide-lead-ro", bare_in(GLIDE_LEAD_RO))?;
    registry.define_class("glide-lead-lo", bare_in(GLIDE_LEAD_LO))?;
    registry.define_class("glide-lead-wo", bare_in(GLIDE_LEAD_WO))?;
    registry.define_class("after-ho-hip", main_in(AFTER_HO_HIP))?;

    for &(c, name) in CODEPOINT_NAMES {
        registry.define_identity(name, GraphemeStack::from_char(c))?;
        registry.define_class(&format!("has-{}", name), move |stack: &GraphemeStack| {
            stack.has(c)
        })?;
    }
    Ok(())
}

/// Expands to a pattern with a first-consonant group between `$before` and
/// `$after`. The group is one consonant accepted by class `$x`, or a gliding
/// pair whose second consonant is accepted by `$x`.
macro_rules! with_consonant_group {
    ($before:literal, $x:literal, $after:literal) => {
        concat!(
            $before,
            "(?P<fc>[:glide-lead-ro:] [:has-RO_RUA: && :", $x, ":]",
            " | [:glide-lead-lo:] [:has-LO_LING: && :", $x, ":]",
            " | [:glide-lead-wo:] [:has-WO_WAEN: && :", $x, ":]",
            " | [:HO_HIP:] [:after-ho-hip: && :", $x, ":]",
            " | [:consonant: && :", $x, ":])",
            $after
        )
    };
}

const KEEP_SARA_A: Option<Trailing> = Some(Trailing {
    group: "trail",
    keep: Some("SARA_A"),
});

const GIVE_BACK: Option<Trailing> = Some(Trailing {
    group: "trail",
    keep: None,
});

/// The built-in rule table, highest priority first.
pub static BUILTIN_RULES: &[TccRule] = &[
    // เฉพาะ
    TccRule {
        name: "special-digraph",
        pattern: "(?P<fv>[:SARA_E:]) (?P<fc>[:CHO_CHING:] [:PHO_PHAN:]) [:SARA_AA:] [:SARA_A:]",
        trailing: None,
        extract: extract_cluster,
    },
    // เกาะ, เพราะ
    TccRule {
        name: "sandwich-short-o",
        pattern: with_consonant_group!("(?P<fv>[:SARA_E:]) ", "no-dv", " [:SARA_AA:] [:SARA_A:]"),
        trailing: None,
        extract: extract_cluster,
    },
    // เมีย, เกี๊ยะ, เปลี่ยน
    TccRule {
        name: "sandwich-ia",
        pattern: with_consonant_group!(
            "(?P<fv>[:SARA_E:]) ",
            "has-SARA_II",
            " [:YO_YAK:] [:SARA_A:]?"
        ),
        trailing: None,
        extract: extract_cluster,
    },
    // เรือ, เธอ, เลอะ
    TccRule {
        name: "sandwich-uea-er",
        pattern: with_consonant_group!(
            "(?P<fv>[:SARA_E:]) ",
            "uee-or-no-dv",
            " [:O_ANG:] (?P<trail>[:SARA_A:] | [:!mid-vowel:] | $)"
        ),
        trailing: KEEP_SARA_A,
        extract: extract_cluster,
    },
    // เดิน
    TccRule {
        name: "medial-er",
        pattern: with_consonant_group!("(?P<fv>[:SARA_E:]) ", "has-SARA_I", ""),
        trailing: None,
        extract: extract_cluster,
    },
    // เขา, เปล่า
    TccRule {
        name: "sandwich-ao",
        pattern: with_consonant_group!("(?P<fv>[:SARA_E:]) ", "no-dv", " [:SARA_AA:]"),
        trailing: None,
        extract: extract_cluster,
    },
    // ไป, ใคร, ไหม
    TccRule {
        name: "leading-sara-ai",
        pattern: with_consonant_group!(
            "(?P<fv>[:sara-ai:]) ",
            "no-dv",
            " (?P<trail>[:!mid-vowel:] | $)"
        ),
        trailing: GIVE_BACK,
        extract: extract_cluster,
    },
    // และ, เป็น, โต๊ะ, แต่
    TccRule {
        name: "maybe-sandwich-short-a",
        pattern: with_consonant_group!(
            "(?P<fv>[:sara-e-ae-o:]) ",
            "short-or-no-dv",
            " (?P<trail>[:SARA_A:] | [:!mid-vowel:] | $)"
        ),
        trailing: KEEP_SARA_A,
        extract: extract_cluster,
    },
    // ละ, หา
    TccRule {
        name: "short-long-a",
        pattern: "(?P<fc>[:consonant: && :no-dv:]) ([:SARA_A:] | [:SARA_AA:])",
        trailing: None,
        extract: extract_cluster,
    },
    // รือ
    TccRule {
        name: "uee-o-ang",
        pattern: "(?P<fc>[:consonant: && :has-SARA_UEE:]) [:O_ANG:] (?P<trail>[:!mid-vowel:] | $)",
        trailing: GIVE_BACK,
        extract: extract_cluster,
    },
    // ตัว, ผัวะ
    TccRule {
        name: "ua",
        pattern: "(?P<fc>[:consonant: && :has-MAI_HAN_AKAT:]) [:WO_WAEN:] [:SARA_A:]?",
        trailing: None,
        extract: extract_cluster,
    },
    // ทำ
    TccRule {
        name: "sara-am",
        pattern: "(?P<fc>[:consonant: && :no-dv:]) [:SARA_AM:]",
        trailing: None,
        extract: extract_cluster,
    },
    // กัน
    TccRule {
        name: "mai-han-akat-final",
        pattern: "(?P<fc>[:consonant: && :has-MAI_HAN_AKAT:]) [:consonant: && :no-dv:]",
        trailing: None,
        extract: extract_cluster,
    },
    // สิ, ตึ, มู, ก็
    TccRule {
        name: "single-diacritic-vowel",
        pattern: "(?P<fc>[:consonant: && :simple-dv:])",
        trailing: None,
        extract: extract_cluster,
    },
    // ฤๅ, ฦๅ
    TccRule {
        name: "sanskrit-digraph",
        pattern: "(?P<fc>[:RU: || :LU:]) [:LAKKHANGYAO:]",
        trailing: None,
        extract: extract_cluster,
    },
    TccRule {
        name: "bare-consonant",
        pattern: "(?P<fc>[:consonant: && :no-dv:])",
        trailing: None,
        extract: extract_cluster,
    },
    // ฯ, ๆ, ๑
    TccRule {
        name: "mid-sign",
        pattern: "(?P<ms>[:mid-sign: || :digit:])",
        trailing: None,
        extract: extract_cluster,
    },
    TccRule {
        name: "solo-diacritic",
        pattern: "[:solo-diacritic:]",
        trailing: None,
        extract: solo_diacritic,
    },
    TccRule {
        name: "solo-final-vowel",
        pattern: "[:mid-vowel:]",
        trailing: None,
        extract: solo_final_vowel,
    },
    // เกุ, แกี
    TccRule {
        name: "invalid-sara-e-combination",
        pattern: "(?P<fv>[:SARA_E: || :SARA_AE:]) (?P<fc>[:consonant: && :has-dv:])",
        trailing: None,
        extract: invalid_sara_e_combination,
    },
    // แกาะ
    TccRule {
        name: "misspelled-short-o-ang",
        pattern: with_consonant_group!("(?P<fv>[:SARA_AE:]) ", "no-dv", " [:SARA_AA:] [:SARA_A:]"),
        trailing: None,
        extract: misspelled_short_o_ang,
    },
];

#[cfg(test)]
mod tests {
    use super::{register_builtin_classes, BUILTIN_RULES};
    use crate::class_registry::ClassRegistry;
    use crate::gstack_iter::assemble;
    use pretty_assertions::assert_eq;

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        register_builtin_classes(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_rule_order() {
        let names = BUILTIN_RULES.iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(
            vec![
                "special-digraph",
                "sandwich-short-o",
                "sandwich-ia",
                "sandwich-uea-er",
                "medial-er",
                "sandwich-ao",
                "leading-sara-ai",
                "maybe-sandwich-short-a",
                "short-long-a",
                "uee-o-ang",
                "ua",
                "sara-am",
                "mai-han-akat-final",
                "single-diacritic-vowel",
                "sanskrit-digraph",
                "bare-consonant",
                "mid-sign",
                "solo-diacritic",
                "solo-final-vowel",
                "invalid-sara-e-combination",
                "misspelled-short-o-ang",
            ],
            names
        );
    }

    #[test]
    fn test_builtin_rules_compile() {
        let registry = registry();
        for rule in BUILTIN_RULES {
            let pattern = registry
                .compile(rule.pattern)
                .unwrap_or_else(|err| panic!("{}: {}", rule.name, err));
            if let Some(trailing) = rule.trailing {
                assert!(pattern.group_index(trailing.group).is_some(), "{}", rule.name);
            }
        }
    }

    fn rule_pattern(name: &str) -> &'static str {
        BUILTIN_RULES
            .iter()
            .find(|rule| rule.name == name)
            .unwrap_or_else(|| panic!("no rule named {}", name))
            .pattern
    }

    #[test]
    fn test_consonant_group_glides() {
        let registry = registry();
        let pattern = registry.compile(rule_pattern("sandwich-ao")).unwrap();
        // SARA_E, PO_PLA, LO_LING + MAI_EK, SARA_AA
        let input = assemble("เปล่า");
        let found = pattern.match_at(&input, 0);
        assert!(found.success());
        assert_eq!(4, found.length());
        assert_eq!(Some(1..3), found.groups().name("fc"));

        // HO_HIP leads MO_MA.
        let pattern = registry.compile(rule_pattern("leading-sara-ai")).unwrap();
        let input = assemble("ไหม");
        assert_eq!(
            Some(1..3),
            pattern.match_at(&input, 0).groups().name("fc")
        );
    }

    #[test]
    fn test_builtin_classes() {
        let registry = registry();
        // 87 identities, 87 has-classes and the named categories.
        assert_eq!(87 * 2 + 19, registry.len());
        let has_mai_ek = registry.get("has-MAI_EK").unwrap();
        assert!(has_mai_ek(&assemble("ต่")[0]));
        assert!(has_mai_ek(&assemble("่")[0]));
        assert!(!has_mai_ek(&assemble("ต")[0]));

        let solo = registry.get("solo-diacritic").unwrap();
        assert!(solo(&assemble("่")[0]));
        assert!(!solo(&assemble("a")[0]));
    }
}
