use crate::codepoints::{self, SARA_AE};
use std::fmt;

/// One user-perceived character box of Thai text.
///
/// A stack holds a base code point (`main`) and, when the base is a
/// consonant, up to two marks stacked on it: a diacritic vowel above or below
/// it, and a tone mark or upper sign on top. Any non-Thai code point forms a
/// stack of its own.
///
/// A diacritic that arrives with no host is kept as a stack without `main`.
/// Such a stack is structurally fine but not valid Thai; the cluster rules
/// flag it later.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct GraphemeStack {
    text: String,
    main: Option<char>,
    diacritic_vowel: Option<char>,
    upper_diacritic: Option<char>,
}

pub(crate) type StackReprCharVec = smallvec::SmallVec<[char; 3]>;

mod stack_analysis {
    use crate::codepoints::{
        is_consonant, is_diacritic_vowel, is_thai, is_upper_diacritic, SARA_E,
    };

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub(crate) enum StackShape {
        /// An upper or lower vowel with nothing to sit on.
        SoloDiacriticVowel,
        /// A tone mark or upper sign with nothing to sit on.
        SoloUpperDiacritic,
        /// One code point standing alone.
        Single,
        /// Two SARA_E typed in place of one SARA_AE.
        DoubleSaraE,
        /// Consonant and upper/lower vowel.
        WithDiacriticVowel,
        /// Consonant, upper/lower vowel, tone mark or upper sign.
        WithDiacriticVowelAndUpper,
        /// Consonant and tone mark or upper sign.
        WithUpperDiacritic,
    }

    impl StackShape {
        pub(crate) fn len(self) -> usize {
            match self {
                StackShape::SoloDiacriticVowel
                | StackShape::SoloUpperDiacritic
                | StackShape::Single => 1,
                StackShape::DoubleSaraE
                | StackShape::WithDiacriticVowel
                | StackShape::WithUpperDiacritic => 2,
                StackShape::WithDiacriticVowelAndUpper => 3,
            }
        }
    }

    /// Decides how many of the upcoming code points form the next stack.
    /// `lookahead` holds at most three code points and is never empty.
    pub(crate) fn analyze_stack(lookahead: &[char]) -> StackShape {
        match *lookahead {
            [r1, ..] if is_diacritic_vowel(r1) => StackShape::SoloDiacriticVowel,
            [r1, ..] if is_upper_diacritic(r1) => StackShape::SoloUpperDiacritic,
            [r1, ..] if !is_thai(r1) => StackShape::Single,
            // Must be checked before any consonant-based shape.
            [SARA_E, SARA_E, ..] => StackShape::DoubleSaraE,
            [r1, r2, r3]
                if is_consonant(r1) && is_diacritic_vowel(r2) && is_upper_diacritic(r3) =>
            {
                StackShape::WithDiacriticVowelAndUpper
            }
            [r1, r2, ..] if is_consonant(r1) && is_diacritic_vowel(r2) => {
                StackShape::WithDiacriticVowel
            }
            [r1, r2, ..] if is_consonant(r1) && is_upper_diacritic(r2) => {
                StackShape::WithUpperDiacritic
            }
            _ => StackShape::Single,
        }
    }
}

use stack_analysis::{analyze_stack, StackShape};

impl GraphemeStack {
    /// Builds the stack a single code point forms when it stands alone.
    ///
    /// Host-less diacritics produce a stack without `main`, exactly as the
    /// assembler would.
    pub fn from_char(c: char) -> Self {
        let mut buf = [0u8; 4];
        let text = c.encode_utf8(&mut buf);
        match GraphemeStack::take_from(text) {
            Some((stack, _)) => stack,
            None => unreachable!("a single char always forms a stack"),
        }
    }

    /// Returns the stack `text` assembles to, or `None` unless it assembles
    /// to exactly one stack. No normalization is applied.
    pub fn parse_single(text: &str) -> Option<Self> {
        let (stack, consumed) = GraphemeStack::take_from(text)?;
        if consumed == text.len() {
            Some(stack)
        } else {
            None
        }
    }

    /// Assembles the stack at the start of `text`, returning it with the
    /// number of bytes it consumed.
    pub(crate) fn take_from(text: &str) -> Option<(Self, usize)> {
        let lookahead = text.chars().take(3).collect::<StackReprCharVec>();
        if lookahead.is_empty() {
            return None;
        }
        let shape = analyze_stack(&lookahead);
        let consumed = lookahead[..shape.len()]
            .iter()
            .map(|c| c.len_utf8())
            .sum::<usize>();

        let mut stack = GraphemeStack {
            text: text[..consumed].to_owned(),
            ..GraphemeStack::default()
        };
        match (shape, &lookahead[..]) {
            (StackShape::SoloDiacriticVowel, [r1, ..]) => stack.diacritic_vowel = Some(*r1),
            (StackShape::SoloUpperDiacritic, [r1, ..]) => stack.upper_diacritic = Some(*r1),
            (StackShape::Single, [r1, ..]) => stack.main = Some(*r1),
            (StackShape::DoubleSaraE, _) => stack.main = Some(SARA_AE),
            (StackShape::WithDiacriticVowel, [r1, r2, ..]) => {
                stack.main = Some(*r1);
                stack.diacritic_vowel = Some(*r2);
            }
            (StackShape::WithDiacriticVowelAndUpper, [r1, r2, r3]) => {
                stack.main = Some(*r1);
                stack.diacritic_vowel = Some(*r2);
                stack.upper_diacritic = Some(*r3);
            }
            (StackShape::WithUpperDiacritic, [r1, r2, ..]) => {
                stack.main = Some(*r1);
                stack.upper_diacritic = Some(*r2);
            }
            _ => unreachable!("stack shape longer than its lookahead"),
        }
        Some((stack, consumed))
    }

    /// The source text this stack was assembled from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The base code point, unset for a host-less diacritic.
    pub fn main(&self) -> Option<char> {
        self.main
    }

    /// The upper or lower vowel stacked on `main`.
    pub fn diacritic_vowel(&self) -> Option<char> {
        self.diacritic_vowel
    }

    /// The tone mark or upper sign on top of the stack.
    pub fn upper_diacritic(&self) -> Option<char> {
        self.upper_diacritic
    }

    /// `main`, or the lone diacritic of a host-less stack.
    pub fn principal(&self) -> Option<char> {
        self.main
            .or(self.diacritic_vowel)
            .or(self.upper_diacritic)
    }

    /// Whether the stack's principal code point is Thai.
    pub fn is_thai(&self) -> bool {
        self.principal().map_or(false, codepoints::is_thai)
    }

    /// Whether the stack has a Thai `main`. Host-less diacritics are not valid.
    pub fn is_valid_thai(&self) -> bool {
        self.main.map_or(false, codepoints::is_thai)
    }

    /// Whether any of the three slots holds `c`.
    pub fn has(&self, c: char) -> bool {
        self.main == Some(c) || self.diacritic_vowel == Some(c) || self.upper_diacritic == Some(c)
    }

    /// Structural equality: the same code points in the same slots,
    /// regardless of the source text.
    pub fn same_shape(&self, other: &GraphemeStack) -> bool {
        self.main == other.main
            && self.diacritic_vowel == other.diacritic_vowel
            && self.upper_diacritic == other.upper_diacritic
    }

    /// Whether `main` is a Thai consonant.
    pub fn is_consonant(&self) -> bool {
        self.main.map_or(false, codepoints::is_consonant)
    }
}

impl fmt::Display for GraphemeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for GraphemeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<GraphemeStack {}", self.text)?;
        let slots = [
            ("MAIN", self.main),
            ("DV", self.diacritic_vowel),
            ("UD", self.upper_diacritic),
        ];
        for (label, slot) in slots {
            if let Some(c) = slot {
                let mut buf = [0u8; 4];
                write!(f, " {}={}", label, codepoints::names_of(c.encode_utf8(&mut buf)))?;
            }
        }
        write!(f, ">")
    }
}

impl From<char> for GraphemeStack {
    fn from(c: char) -> Self {
        GraphemeStack::from_char(c)
    }
}

#[cfg(test)]
mod tests {
    use super::GraphemeStack;
    use crate::codepoints::*;

    #[test]
    fn test_from_char() {
        let stack = GraphemeStack::from_char(KO_KAI);
        assert_eq!(Some(KO_KAI), stack.main());
        assert!(stack.is_valid_thai());

        let stack = GraphemeStack::from_char(MAI_EK);
        assert_eq!(None, stack.main());
        assert_eq!(Some(MAI_EK), stack.upper_diacritic());
        assert!(stack.is_thai());
        assert!(!stack.is_valid_thai());

        let stack = GraphemeStack::from_char(SARA_U);
        assert_eq!(Some(SARA_U), stack.diacritic_vowel());
        assert!(!stack.is_valid_thai());

        let stack = GraphemeStack::from_char('z');
        assert!(!stack.is_thai());
        assert!(!stack.is_valid_thai());
    }

    #[test]
    fn test_parse_single() {
        // THAI_CHARACTER_O_ANG, THAI_CHARACTER_SARA_UE
        let stack = GraphemeStack::parse_single("อึ").unwrap();
        assert_eq!(Some(O_ANG), stack.main());
        assert_eq!(Some(SARA_UE), stack.diacritic_vowel());
        assert_eq!(None, stack.upper_diacritic());

        // YO_YAK, SARA_UU, MAI_EK
        let stack = GraphemeStack::parse_single("ยู่").unwrap();
        assert_eq!(Some(YO_YAK), stack.main());
        assert_eq!(Some(SARA_UU), stack.diacritic_vowel());
        assert_eq!(Some(MAI_EK), stack.upper_diacritic());

        assert_eq!(None, GraphemeStack::parse_single("อา"));
        assert_eq!(None, GraphemeStack::parse_single(""));
    }

    #[test]
    fn test_upper_diacritic_closes_stack() {
        // NO_NU, MAI_THO, SARA_I: nothing stacks on top of a tone mark.
        let text = string_from_names(&["NO_NU", "MAI_THO", "SARA_I"]).unwrap();
        let (stack, consumed) = GraphemeStack::take_from(&text).unwrap();
        assert_eq!(Some(MAI_THO), stack.upper_diacritic());
        assert_eq!(None, stack.diacritic_vowel());
        assert_eq!(6, consumed);
    }

    #[test]
    fn test_double_sara_e() {
        let text = string_from_names(&["SARA_E", "SARA_E", "TO_TAO"]).unwrap();
        let (stack, consumed) = GraphemeStack::take_from(&text).unwrap();
        assert_eq!(Some(SARA_AE), stack.main());
        assert_eq!(6, consumed);
        assert_eq!("\u{0E40}\u{0E40}", stack.text());
        assert!(stack.same_shape(&GraphemeStack::from_char(SARA_AE)));
        assert_ne!(stack, GraphemeStack::from_char(SARA_AE));
    }

    #[test]
    fn test_has() {
        let stack = GraphemeStack::parse_single("ยู่").unwrap();
        assert!(stack.has(YO_YAK));
        assert!(stack.has(SARA_UU));
        assert!(stack.has(MAI_EK));
        assert!(!stack.has(MAI_THO));
    }

    #[test]
    fn test_debug_fmt() {
        let stack = GraphemeStack::parse_single("ยู่").unwrap();
        assert_eq!(
            "<GraphemeStack ยู่ MAIN=YO_YAK DV=SARA_UU UD=MAI_EK>",
            format!("{:?}", stack)
        );
        assert_eq!(
            "<GraphemeStack a MAIN=a>",
            format!("{:?}", GraphemeStack::from_char('a'))
        );
    }
}
