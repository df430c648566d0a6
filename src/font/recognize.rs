use crate::font::model::GlyphData;

/// Optional glyph recognizer consulted before falling back to private-use codes.
///
/// Conversion behaves the same whether or not a suggestion comes back.
pub trait GlyphRecognizer: Send + Sync {
    /// Text the glyph looks like, if recognized.
    fn recognize(&self, glyph: &GlyphData) -> Option<String>;
}

/// Single character for a raw suggestion.
///
/// Ligatures and letters that read like roman numerals map to their dedicated code points, since
/// the plain letters are usually taken already.
pub(crate) fn normalize_suggestion(raw: &str) -> Option<char> {
    let s = raw.trim().to_lowercase();
    let mapped = match s.as_str() {
        "ff" => '\u{FB00}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "i" => '\u{2160}',
        "v" => '\u{2164}',
        "x" => '\u{2169}',
        _ => {
            let mut chars = s.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            };
        }
    };
    Some(mapped)
}
