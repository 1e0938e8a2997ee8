//! Supported language catalog and recognition locale tags.

/// Target languages accepted by the pipeline, with display names.
pub const SUPPORTED_TARGETS: &[(&str, &str)] = &[
    ("hi", "Hindi"),
    ("mr", "Marathi"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("bn", "Bengali"),
    ("gu", "Gujarati"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("or", "Odia"),
    ("pa", "Punjabi"),
    ("ur", "Urdu"),
    ("as", "Assamese"),
];

/// Locale-qualified tags expected by the recognition backend.
const LOCALE_TAGS: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("hi", "hi-IN"),
    ("mr", "mr-IN"),
    ("ta", "ta-IN"),
    ("te", "te-IN"),
    ("bn", "bn-IN"),
    ("gu", "gu-IN"),
    ("kn", "kn-IN"),
    ("ml", "ml-IN"),
    ("or", "or-IN"),
    ("pa", "pa-IN"),
    ("ur", "ur-IN"),
    ("as", "as-IN"),
];

/// Check whether a target-language code is in the supported set.
pub fn is_supported_target(code: &str) -> bool {
    SUPPORTED_TARGETS.iter().any(|(c, _)| *c == code)
}

/// Display name for a supported target code.
pub fn display_name(code: &str) -> Option<&'static str> {
    SUPPORTED_TARGETS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Qualify a bare language code with its region for recognition requests.
/// Codes without a known region pass through unchanged; recognition
/// backends accept bare codes as a fallback.
pub fn locale_tag(code: &str) -> String {
    LOCALE_TAGS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, tag)| (*tag).to_string())
        .unwrap_or_else(|| code.to_string())
}
