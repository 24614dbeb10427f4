//! Locale detection and normalization.

pub const FALLBACK_LOCALE: &str = "en-US";

/// BCP 47-ish tag from whatever the platform hands us.
///
/// `fr_FR.UTF-8` and `fr_FR@euro` become `fr-FR`; `C` and `POSIX` are
/// treated as unknown.
pub fn normalize(raw: &str) -> Option<String> {
    let tag = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace('_', "-");
    if tag.is_empty() || tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(tag)
}

/// Primary language subtag, lowercased (`"fr"` for `"fr-FR"`).
pub fn base_code(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Configured override, then the system locale, then [`FALLBACK_LOCALE`].
pub fn detect(override_tag: Option<&str>) -> String {
    override_tag
        .and_then(normalize)
        .or_else(|| sys_locale::get_locale().as_deref().and_then(normalize))
        .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
}
