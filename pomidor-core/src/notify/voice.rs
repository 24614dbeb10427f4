use super::locale::base_code;
use super::phrases::DEFAULT_LOCALE;

/// A voice offered by the speech backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// What the backend expects to be told to select this voice.
    pub id: String,
    /// Language tag as reported by the backend, e.g. `fr-FR` or `fr_CA`.
    pub lang: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lang: lang.into(),
        }
    }

    fn lang_normalized(&self) -> String {
        self.lang.replace('_', "-").to_ascii_lowercase()
    }
}

/// Exact tag, then same base language, then the default locale, then
/// whatever comes first.
pub fn select_voice<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    let wanted = locale.replace('_', "-").to_ascii_lowercase();
    let base = base_code(locale);
    voices
        .iter()
        .find(|v| v.lang_normalized() == wanted)
        .or_else(|| voices.iter().find(|v| v.lang_normalized().starts_with(&base)))
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.lang_normalized().starts_with(DEFAULT_LOCALE))
        })
        .or_else(|| voices.first())
}
