use crate::gstack_ty::GraphemeStack;
use std::{borrow::Cow, fmt, iter::FusedIterator};
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Brings `text` to Unicode Normalization Form C, borrowing it when it
/// already is.
pub fn normalize(text: &str) -> Cow<'_, str> {
    match is_nfc_quick(text.chars()) {
        IsNormalized::Yes => Cow::Borrowed(text),
        IsNormalized::No | IsNormalized::Maybe => Cow::Owned(text.nfc().collect()),
    }
}

/// Normalizes `text` to NFC and splits it into grapheme stacks.
///
/// Every code point of the normalized text lands in exactly one stack, so the
/// stack texts concatenate back to the normalized input. Assembly never fails.
pub fn assemble(text: &str) -> Vec<GraphemeStack> {
    let text = normalize(text);
    log::trace!("assembling {} bytes into grapheme stacks", text.len());
    GraphemeStacks::new(&text).collect()
}

/// A lazy iterator over the grapheme stacks of a string slice.
///
/// No normalization is performed; use [`assemble`] for NFC input handling.
#[derive(Clone, Copy)]
pub struct GraphemeStacks<'str> {
    data: &'str str,
}

impl<'str> GraphemeStacks<'str> {
    /// Starts iterating over the stacks of `text`.
    pub const fn new(text: &'str str) -> Self {
        GraphemeStacks { data: text }
    }

    /// The part of the text that has not been assembled yet.
    pub const fn as_str(&self) -> &'str str {
        self.data
    }
}

impl<'str> Iterator for GraphemeStacks<'str> {
    type Item = GraphemeStack;

    fn next(&mut self) -> Option<Self::Item> {
        let (stack, consumed) = GraphemeStack::take_from(self.data)?;
        self.data = &self.data[consumed..];
        Some(stack)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.data.len();
        ((len + 8) / 9, Some(len))
    }
}

impl FusedIterator for GraphemeStacks<'_> {}

impl fmt::Debug for GraphemeStacks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphemeStacks(")?;
        f.debug_list().entries(*self).finish()?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::{assemble, normalize, GraphemeStacks};
    use crate::codepoints::*;
    use crate::gstack_ty::GraphemeStack;
    use pretty_assertions::assert_eq;
    use std::borrow::Cow;

    fn texts(stacks: &[GraphemeStack]) -> Vec<&str> {
        stacks.iter().map(GraphemeStack::text).collect()
    }

    #[test]
    fn test_simple_consonant_and_vowel() {
        // O_ANG, SARA_AA, CHO_CHAN
        let stacks = assemble("อาจ");
        assert_eq!(vec!["อ", "า", "จ"], texts(&stacks));
        assert_eq!(Some(O_ANG), stacks[0].main());
        assert_eq!(Some(SARA_AA), stacks[1].main());
        assert_eq!(Some(CHO_CHAN), stacks[2].main());
    }

    #[test]
    fn test_interleaved_latin() {
        let stacks = assemble("aอbาcจ");
        assert_eq!(vec!["a", "อ", "b", "า", "c", "จ"], texts(&stacks));
        assert!(!stacks[0].is_thai());
        assert!(stacks[1].is_thai());
        assert!(!stacks[4].is_thai());
    }

    #[test]
    fn test_leading_solo_diacritic_vowel() {
        // SARA_E, SARA_E, SARA_II, YO_YAK, WO_WAEN
        let stacks = assemble("เเียว");
        assert_eq!(vec!["เเ", "ี", "ย", "ว"], texts(&stacks));
        assert_eq!(Some(SARA_AE), stacks[0].main());
        assert_eq!(None, stacks[1].main());
        assert_eq!(Some(SARA_II), stacks[1].diacritic_vowel());
        assert!(!stacks[1].is_valid_thai());
    }

    #[test]
    fn test_tone_marks_and_lower_vowels() {
        let stacks = assemble("อ้าง");
        assert_eq!(vec!["อ้", "า", "ง"], texts(&stacks));
        assert_eq!(Some(MAI_THO), stacks[0].upper_diacritic());

        let stacks = assemble("อยู่");
        assert_eq!(vec!["อ", "ยู่"], texts(&stacks));
        assert_eq!(Some(SARA_UU), stacks[1].diacritic_vowel());
        assert_eq!(Some(MAI_EK), stacks[1].upper_diacritic());

        let stacks = assemble("อาบน้ำ");
        assert_eq!(vec!["อ", "า", "บ", "น้", "ำ"], texts(&stacks));

        let stacks = assemble("ก็");
        assert_eq!(vec!["ก็"], texts(&stacks));
        assert_eq!(Some(MAITAIKHU), stacks[0].diacritic_vowel());

        let stacks = assemble("อึ");
        assert_eq!(vec!["อึ"], texts(&stacks));
    }

    #[test]
    fn test_round_trip_and_idempotence() {
        let inputs = ["กรุงเทพฯ", "แต่ละ", "abc ก่ ่", "เเีย", "", "น้ำ ๑๒๓"];
        for input in inputs {
            let stacks = assemble(input);
            let joined = stacks.iter().map(GraphemeStack::text).collect::<String>();
            assert_eq!(normalize(input), joined);
            assert_eq!(stacks, assemble(&joined));
        }
    }

    #[test]
    fn test_normalize() {
        assert!(matches!(normalize("ภาษาไทย"), Cow::Borrowed(_)));
        // LATIN E + COMBINING ACUTE composes.
        assert_eq!("\u{e9}", normalize("e\u{301}"));
    }

    #[test]
    fn test_lazy_iteration() {
        let mut stacks = GraphemeStacks::new("กินข้าว");
        assert_eq!("กิ", stacks.next().unwrap().text());
        assert_eq!("นข้าว", stacks.as_str());
        assert_eq!(4, stacks.count());
    }

    #[test]
    fn test_stacks_stay_apart_under_uax29() {
        use unicode_segmentation::UnicodeSegmentation;
        // Every stack boundary produced by the assembler is also a legacy
        // grapheme boundary for text that has no host-less marks.
        let text = "สวัสดีครับ ท่านผู้ชม";
        let mut legacy = text
            .grapheme_indices(false)
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();
        legacy.push(text.len());
        let mut offset = 0;
        for stack in assemble(text) {
            assert!(legacy.contains(&offset), "boundary at {}", offset);
            offset += stack.text().len();
        }
        assert_eq!(text.len(), offset);
    }
}
