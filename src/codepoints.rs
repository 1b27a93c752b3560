//! Thai code points, their names and the position categories the cluster
//! grammar is written in.
//!
//! Category membership follows the layout of Thai script rather than the
//! Unicode general category alone:
//!
//! * `O_ANG`, `RU` and `LU` count as consonants.
//! * `SARA_AM` and `LAKKHANGYAO` are mid-position vowels, not upper ones.
//! * `MAITAIKHU` is an upper-position vowel, as Unicode has it.
//! * `PHINTHU` is a lower-position vowel.

use crate::error::UnknownName;

macro_rules! thai_codepoints {
    ($($name:ident = $value:literal,)*) => {
        $(
            #[doc = concat!("THAI ", stringify!($name), " (`", stringify!($value), "`).")]
            pub const $name: char = $value;
        )*

        /// Every assigned Thai code point with its short name, ordered by code point.
        pub(crate) static CODEPOINT_NAMES: &[(char, &str)] = &[
            $(($name, stringify!($name)),)*
        ];
    };
}

thai_codepoints! {
    KO_KAI = '\u{0E01}',
    KHO_KHAI = '\u{0E02}',
    KHO_KHUAT = '\u{0E03}',
    KHO_KHWAI = '\u{0E04}',
    KHO_KHON = '\u{0E05}',
    KHO_RAKHANG = '\u{0E06}',
    NGO_NGU = '\u{0E07}',
    CHO_CHAN = '\u{0E08}',
    CHO_CHING = '\u{0E09}',
    CHO_CHANG = '\u{0E0A}',
    SO_SO = '\u{0E0B}',
    CHO_CHOE = '\u{0E0C}',
    YO_YING = '\u{0E0D}',
    DO_CHADA = '\u{0E0E}',
    TO_PATAK = '\u{0E0F}',
    THO_THAN = '\u{0E10}',
    THO_NANGMONTHO = '\u{0E11}',
    THO_PHUTHAO = '\u{0E12}',
    NO_NEN = '\u{0E13}',
    DO_DEK = '\u{0E14}',
    TO_TAO = '\u{0E15}',
    THO_THUNG = '\u{0E16}',
    THO_THAHAN = '\u{0E17}',
    THO_THONG = '\u{0E18}',
    NO_NU = '\u{0E19}',
    BO_BAIMAI = '\u{0E1A}',
    PO_PLA = '\u{0E1B}',
    PHO_PHUNG = '\u{0E1C}',
    FO_FA = '\u{0E1D}',
    PHO_PHAN = '\u{0E1E}',
    FO_FAN = '\u{0E1F}',
    PHO_SAMPHAO = '\u{0E20}',
    MO_MA = '\u{0E21}',
    YO_YAK = '\u{0E22}',
    RO_RUA = '\u{0E23}',
    RU = '\u{0E24}',
    LO_LING = '\u{0E25}',
    LU = '\u{0E26}',
    WO_WAEN = '\u{0E27}',
    SO_SALA = '\u{0E28}',
    SO_RUSI = '\u{0E29}',
    SO_SUA = '\u{0E2A}',
    HO_HIP = '\u{0E2B}',
    LO_CHULA = '\u{0E2C}',
    O_ANG = '\u{0E2D}',
    HO_NOKHUK = '\u{0E2E}',
    PAIYANNOI = '\u{0E2F}',
    SARA_A = '\u{0E30}',
    MAI_HAN_AKAT = '\u{0E31}',
    SARA_AA = '\u{0E32}',
    SARA_AM = '\u{0E33}',
    SARA_I = '\u{0E34}',
    SARA_II = '\u{0E35}',
    SARA_UE = '\u{0E36}',
    SARA_UEE = '\u{0E37}',
    SARA_U = '\u{0E38}',
    SARA_UU = '\u{0E39}',
    PHINTHU = '\u{0E3A}',
    CURRENCY_SYMBOL_BAHT = '\u{0E3F}',
    SARA_E = '\u{0E40}',
    SARA_AE = '\u{0E41}',
    SARA_O = '\u{0E42}',
    SARA_AI_MAIMUAN = '\u{0E43}',
    SARA_AI_MAIMALAI = '\u{0E44}',
    LAKKHANGYAO = '\u{0E45}',
    MAIYAMOK = '\u{0E46}',
    MAITAIKHU = '\u{0E47}',
    MAI_EK = '\u{0E48}',
    MAI_THO = '\u{0E49}',
    MAI_TRI = '\u{0E4A}',
    MAI_CHATTAWA = '\u{0E4B}',
    THANTHAKHAT = '\u{0E4C}',
    NIKHAHIT = '\u{0E4D}',
    YAMAKKAN = '\u{0E4E}',
    FONGMAN = '\u{0E4F}',
    DIGIT_ZERO = '\u{0E50}',
    DIGIT_ONE = '\u{0E51}',
    DIGIT_TWO = '\u{0E52}',
    DIGIT_THREE = '\u{0E53}',
    DIGIT_FOUR = '\u{0E54}',
    DIGIT_FIVE = '\u{0E55}',
    DIGIT_SIX = '\u{0E56}',
    DIGIT_SEVEN = '\u{0E57}',
    DIGIT_EIGHT = '\u{0E58}',
    DIGIT_NINE = '\u{0E59}',
    ANGKHANKHU = '\u{0E5A}',
    KHOMUT = '\u{0E5B}',
}

/// Returns `true` for an assigned code point of the Thai block.
pub const fn is_thai(c: char) -> bool {
    matches!(c, '\u{0E01}'..='\u{0E3A}' | '\u{0E3F}'..='\u{0E5B}')
}

/// Returns `true` if every code point of `text` is Thai. Empty text is Thai.
pub fn is_thai_str(text: &str) -> bool {
    text.chars().all(is_thai)
}

/// Consonants run from `KO_KAI` to `HO_NOKHUK`, including `RU`, `LU` and `O_ANG`.
pub const fn is_consonant(c: char) -> bool {
    matches!(c, KO_KAI..=HO_NOKHUK)
}

/// Vowels written before the consonant they are pronounced after.
pub const fn is_front_vowel(c: char) -> bool {
    matches!(
        c,
        SARA_E | SARA_AE | SARA_O | SARA_AI_MAIMUAN | SARA_AI_MAIMALAI
    )
}

/// Vowels written on the baseline after the consonant.
pub const fn is_mid_vowel(c: char) -> bool {
    matches!(c, SARA_A | SARA_AA | SARA_AM | LAKKHANGYAO)
}

/// Vowels stacked above a consonant.
pub const fn is_upper_vowel(c: char) -> bool {
    matches!(
        c,
        MAI_HAN_AKAT | SARA_I | SARA_II | SARA_UE | SARA_UEE | MAITAIKHU
    )
}

/// Vowels stacked below a consonant.
pub const fn is_lower_vowel(c: char) -> bool {
    matches!(c, SARA_U | SARA_UU | PHINTHU)
}

/// Upper and lower vowels: the vowels that live in a stack's `diacritic_vowel` slot.
pub const fn is_diacritic_vowel(c: char) -> bool {
    is_upper_vowel(c) || is_lower_vowel(c)
}

/// Any vowel, in any position.
pub const fn is_vowel(c: char) -> bool {
    is_front_vowel(c) || is_mid_vowel(c) || is_upper_vowel(c) || is_lower_vowel(c)
}

/// The four tone marks.
pub const fn is_tone_mark(c: char) -> bool {
    matches!(c, MAI_EK | MAI_THO | MAI_TRI | MAI_CHATTAWA)
}

/// Non-vowel signs stacked above a consonant.
pub const fn is_upper_sign(c: char) -> bool {
    matches!(c, THANTHAKHAT | NIKHAHIT | YAMAKKAN)
}

/// Tone marks and upper signs: the marks that live in a stack's `upper_diacritic` slot.
pub const fn is_upper_diacritic(c: char) -> bool {
    is_tone_mark(c) || is_upper_sign(c)
}

/// Anything drawn above the baseline.
pub const fn is_upper_position(c: char) -> bool {
    is_upper_vowel(c) || is_upper_diacritic(c)
}

/// Punctuation, repetition and currency signs that stand on their own.
pub const fn is_mid_sign(c: char) -> bool {
    matches!(
        c,
        PAIYANNOI | CURRENCY_SYMBOL_BAHT | MAIYAMOK | FONGMAN | ANGKHANKHU | KHOMUT
    )
}

/// Upper and mid signs.
pub const fn is_sign(c: char) -> bool {
    is_upper_sign(c) || is_mid_sign(c)
}

/// Thai digits zero to nine.
pub const fn is_digit(c: char) -> bool {
    matches!(c, DIGIT_ZERO..=DIGIT_NINE)
}

/// Returns the short name of a Thai code point, such as `"KO_KAI"`.
pub fn codepoint_name(c: char) -> Option<&'static str> {
    CODEPOINT_NAMES
        .binary_search_by_key(&c, |&(ch, _)| ch)
        .ok()
        .map(|idx| CODEPOINT_NAMES[idx].1)
}

/// Returns the Thai code point with the given short name.
pub fn codepoint_by_name(name: &str) -> Option<char> {
    CODEPOINT_NAMES
        .iter()
        .find(|&&(_, n)| n == name)
        .map(|&(ch, _)| ch)
}

/// Describes each code point of `text`, joined with `", "`.
///
/// Thai code points are shown by name, printable ASCII as-is, and everything
/// else as `U+XXXX`.
pub fn names_of(text: &str) -> String {
    text.chars()
        .map(|c| match codepoint_name(c) {
            Some(name) => name.to_owned(),
            None if c.is_ascii_graphic() => c.to_string(),
            None => format!("U+{:04X}", c as u32),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds a string from a list of Thai code point names.
pub fn string_from_names(names: &[&str]) -> Result<String, UnknownName> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            codepoint_by_name(name).ok_or_else(|| UnknownName {
                name: (*name).to_owned(),
                index,
            })
        })
        .collect()
}
