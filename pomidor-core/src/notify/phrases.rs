//! Built-in announcement phrases, keyed by locale-base code.
//!
//! Break phrases are listed per plural category; `{m}` is replaced by the
//! minute count. Adding a locale means adding one [`PhraseSet`] entry.

use super::locale::base_code;
use super::plural::{PluralCategory, PluralRule};
use PluralCategory::{Few, One, Other, Two};
use crate::mode::Mode;

pub const DEFAULT_LOCALE: &str = "en";

type Forms = &'static [(PluralCategory, &'static str)];

#[derive(Debug)]
pub struct PhraseSet {
    pub code: &'static str,
    pub rule: PluralRule,
    pub focus: &'static str,
    pub short_break: Forms,
    pub long_break: Forms,
}

static PHRASES: &[PhraseSet] = &[
    PhraseSet {
        code: "en",
        rule: PluralRule::Invariant,
        focus: "It's time to focus.",
        short_break: &[(Other, "It's time to take a {m}-minute break.")],
        long_break: &[(Other, "It's time to take a {m}-minute break.")],
    },
    PhraseSet {
        code: "fr",
        rule: PluralRule::OneUpToOne,
        focus: "Il est temps de se concentrer.",
        short_break: &[
            (One, "Il est temps de faire une pause de {m} minute."),
            (Other, "Il est temps de faire une pause de {m} minutes."),
        ],
        long_break: &[
            (One, "Il est temps de faire une longue pause de {m} minute."),
            (Other, "Il est temps de faire une longue pause de {m} minutes."),
        ],
    },
    PhraseSet {
        code: "es",
        rule: PluralRule::OneOther,
        focus: "Es hora de concentrarse.",
        short_break: &[
            (One, "Es hora de tomar un descanso de {m} minuto."),
            (Other, "Es hora de tomar un descanso de {m} minutos."),
        ],
        long_break: &[
            (One, "Es hora de tomar un descanso largo de {m} minuto."),
            (Other, "Es hora de tomar un descanso largo de {m} minutos."),
        ],
    },
    PhraseSet {
        code: "de",
        rule: PluralRule::OneOther,
        focus: "Es ist Zeit, sich zu konzentrieren.",
        short_break: &[(Other, "Es ist Zeit für eine {m}-minütige Pause.")],
        long_break: &[
            (One, "Es ist Zeit für eine lange Pause von {m} Minute."),
            (Other, "Es ist Zeit für eine lange Pause von {m} Minuten."),
        ],
    },
    PhraseSet {
        code: "it",
        rule: PluralRule::OneOther,
        focus: "È ora di concentrarsi.",
        short_break: &[
            (One, "È ora di fare una pausa di {m} minuto."),
            (Other, "È ora di fare una pausa di {m} minuti."),
        ],
        long_break: &[
            (One, "È ora di fare una lunga pausa di {m} minuto."),
            (Other, "È ora di fare una lunga pausa di {m} minuti."),
        ],
    },
    PhraseSet {
        code: "ar",
        rule: PluralRule::Arabic,
        focus: "حان وقت التركيز.",
        short_break: &[
            (One, "حان وقت أخذ استراحة لمدة دقيقة."),
            (Two, "حان وقت أخذ استراحة لمدة دقيقتين."),
            (Few, "حان وقت أخذ استراحة لمدة {m} دقائق."),
            (Other, "حان وقت أخذ استراحة لمدة {m} دقيقة."),
        ],
        long_break: &[
            (One, "حان وقت أخذ استراحة طويلة لمدة دقيقة."),
            (Two, "حان وقت أخذ استراحة طويلة لمدة دقيقتين."),
            (Few, "حان وقت أخذ استراحة طويلة لمدة {m} دقائق."),
            (Other, "حان وقت أخذ استراحة طويلة لمدة {m} دقيقة."),
        ],
    },
];

/// Phrases for `locale`'s base code, or the default locale's.
pub fn phrase_set(locale: &str) -> &'static PhraseSet {
    let base = base_code(locale);
    PHRASES
        .iter()
        .find(|set| set.code == base)
        .or_else(|| PHRASES.iter().find(|set| set.code == DEFAULT_LOCALE))
        .unwrap_or(&PHRASES[0])
}

fn pick(forms: Forms, category: PluralCategory) -> &'static str {
    forms
        .iter()
        .find(|(c, _)| *c == category)
        .or_else(|| forms.iter().find(|(c, _)| *c == Other))
        .or_else(|| forms.first())
        .map(|(_, template)| *template)
        .unwrap_or_default()
}

/// Sentence announcing `mode`. `minutes` only matters for breaks.
pub fn resolve(locale: &str, mode: Mode, minutes: u32) -> String {
    let set = phrase_set(locale);
    let forms = match mode {
        Mode::Focus => return set.focus.to_string(),
        Mode::ShortBreak => set.short_break,
        Mode::LongBreak => set.long_break,
    };
    pick(forms, set.rule.category(minutes)).replace("{m}", &minutes.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_short_break_pluralizes() {
        assert_eq!(
            resolve("fr-FR", Mode::ShortBreak, 5),
            "Il est temps de faire une pause de 5 minutes."
        );
        assert_eq!(
            resolve("fr-CA", Mode::ShortBreak, 1),
            "Il est temps de faire une pause de 1 minute."
        );
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(resolve("ja-JP", Mode::Focus, 0), "It's time to focus.");
        assert_eq!(
            resolve("", Mode::LongBreak, 15),
            "It's time to take a 15-minute break."
        );
    }

    #[test]
    fn english_uses_the_compound_adjective() {
        assert_eq!(
            resolve("en-GB", Mode::ShortBreak, 1),
            "It's time to take a 1-minute break."
        );
        assert_eq!(
            resolve("en-US", Mode::LongBreak, 20),
            "It's time to take a 20-minute break."
        );
    }

    #[test]
    fn german_short_break_is_invariant() {
        assert_eq!(
            resolve("de-DE", Mode::ShortBreak, 1),
            "Es ist Zeit für eine 1-minütige Pause."
        );
        assert_eq!(
            resolve("de", Mode::LongBreak, 1),
            "Es ist Zeit für eine lange Pause von 1 Minute."
        );
    }

    #[test]
    fn arabic_uses_dual_and_few_forms() {
        assert_eq!(
            resolve("ar-EG", Mode::ShortBreak, 2),
            "حان وقت أخذ استراحة لمدة دقيقتين."
        );
        assert_eq!(
            resolve("ar", Mode::ShortBreak, 5),
            "حان وقت أخذ استراحة لمدة 5 دقائق."
        );
        assert_eq!(
            resolve("ar", Mode::LongBreak, 15),
            "حان وقت أخذ استراحة طويلة لمدة 15 دقيقة."
        );
    }

    #[test]
    fn every_locale_has_a_fallback_form() {
        for set in PHRASES {
            for forms in [set.short_break, set.long_break] {
                assert!(forms.iter().any(|(c, _)| *c == Other), "{}", set.code);
            }
        }
        assert_eq!(PHRASES.len(), 6);
    }
}
