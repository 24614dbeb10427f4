//! Plural categories and the per-locale rules that pick them.

/// CLDR-style plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    One,
    Two,
    Few,
    Other,
}

/// How a locale maps a count to a [`PluralCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// Everything is `other` (English "a 5-minute break").
    Invariant,
    /// `one` for exactly 1 (German, Spanish, Italian).
    OneOther,
    /// `one` for 0 and 1 (French).
    OneUpToOne,
    /// `one`, `two`, `few` for 3..=10, `other` beyond (Arabic, as spoken for minutes).
    Arabic,
}

impl PluralRule {
    pub fn category(self, n: u32) -> PluralCategory {
        match self {
            PluralRule::Invariant => PluralCategory::Other,
            PluralRule::OneOther => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            PluralRule::OneUpToOne => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            PluralRule::Arabic => match n {
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                3..=10 => PluralCategory::Few,
                _ => PluralCategory::Other,
            },
        }
    }
}
