//! Collection name to language code mapping

/// Code used for English and for any collection without a known language.
/// Lookups always translate into this language.
pub const FALLBACK_LANGUAGE: &str = "en-US";

/// Known collection languages
const COLLECTION_LANGUAGES: &[(&str, &str)] = &[
    ("german", "de"),
    ("latin", "la"),
    ("italian", "it"),
    ("english", FALLBACK_LANGUAGE),
];

/// Language code for a collection name
pub fn language_code(collection: &str) -> &'static str {
    COLLECTION_LANGUAGES
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, code)| *code)
        .unwrap_or(FALLBACK_LANGUAGE)
}
