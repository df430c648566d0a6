use std::collections::BTreeMap;

use crate::font::model::{Font, FontGlyph, FontId, FontMetrics};
use crate::foundation::math::StableHasher;

/// Fonts merged to share one physical font file.
///
/// `glyphs` is the union of the glyph tables of every font in the group, keyed by assigned
/// character. Compatibility guarantees a character never maps to two different glyphs.
#[derive(Clone, Debug, PartialEq)]
pub struct FontGroup {
    /// Declared name until naming, unique file-safe name afterwards.
    pub name: String,
    /// Metrics shared by the non-whitespace fonts of the group.
    pub metrics: FontMetrics,
    /// Member fonts.
    pub fonts: Vec<Font>,
    /// Merged glyph table.
    pub glyphs: BTreeMap<char, FontGlyph>,
}

impl FontGroup {
    /// Group holding a single font.
    pub fn from_font(font: Font) -> Self {
        let glyphs = font
            .glyphs
            .iter()
            .map(|g| (g.ch, g.clone()))
            .collect();
        Self {
            name: font.name.clone(),
            metrics: font.metrics,
            fonts: vec![font],
            glyphs,
        }
    }

    /// Every glyph is blank. Such groups merge with anything.
    pub fn is_all_whitespace(&self) -> bool {
        self.glyphs.values().all(FontGlyph::is_whitespace)
    }

    /// Whether `self` and `other` can share a font file.
    ///
    /// Requires equal metrics and no character with two different glyphs. With
    /// `require_common`, the groups must also share a non-whitespace glyph.
    pub fn is_compatible_with(&self, other: &FontGroup, require_common: bool) -> bool {
        if self.is_all_whitespace() || other.is_all_whitespace() {
            return true;
        }
        if self.metrics != other.metrics {
            return false;
        }
        let (small, large) = if other.glyphs.len() < self.glyphs.len() {
            (other, self)
        } else {
            (self, other)
        };

        let mut has_common = false;
        for (ch, glyph) in &small.glyphs {
            let Some(theirs) = large.glyphs.get(ch) else {
                continue;
            };
            if theirs != glyph {
                return false;
            }
            has_common |= !glyph.is_whitespace();
        }
        !require_common || has_common
    }

    /// Absorb `other`'s fonts and glyphs.
    pub fn merge(&mut self, other: FontGroup) {
        if self.is_all_whitespace() && !other.is_all_whitespace() {
            self.metrics = other.metrics;
        }
        self.glyphs.extend(other.glyphs);
        self.fonts.extend(other.fonts);
    }

    /// Hash of the merged glyph table, stable across runs.
    pub(crate) fn content_key(&self) -> u64 {
        let mut h = StableHasher::new();
        for (ch, glyph) in &self.glyphs {
            h.write_u32(u32::from(*ch));
            h.write_u64(glyph.data.key());
        }
        h.finish()
    }

    /// Serializable description of the group.
    pub fn summary(&self) -> FontGroupSummary {
        FontGroupSummary {
            name: self.name.clone(),
            fonts: self.fonts.iter().map(|f| f.id).collect(),
            glyph_count: self.glyphs.len(),
        }
    }
}

/// Outcome of font reduction for one group.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FontGroupSummary {
    /// Unique group name.
    pub name: String,
    /// Source fonts sharing the group's file.
    pub fonts: Vec<FontId>,
    /// Glyphs in the merged table.
    pub glyph_count: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/font/group.rs"]
mod tests;
