use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::ConvertConfig;
use crate::font::glyph::parse_font_glyphs;
use crate::font::group::{FontGroup, FontGroupSummary};
use crate::font::model::{Font, FontGlyph, FontId, FontMap, FontMetrics, FontScale, GlyphData};
use crate::font::recognize::{GlyphRecognizer, normalize_suggestion};
use crate::font::writer::FontFileWriter;
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::movie::model::{FontDef, Movie, Tag};

const FIRST_UNKNOWN_CODE: u32 = 0xE000;
const LAST_UNKNOWN_CODE: u32 = 0xF8FF;

/// Fonts of a movie collection after reduction.
#[derive(Clone, Debug, Default)]
pub struct ReducedFonts {
    /// Every source font, renamed and pointing at its group's shared file.
    pub fonts: FontMap,
    /// One entry per merged group, in group order.
    pub groups: Vec<FontGroupSummary>,
}

/// Builds the fonts of a movie collection and merges compatible ones.
///
/// Holds the code remapping state, so one reducer should serve exactly one batch.
pub struct FontReducer<'a> {
    config: &'a ConvertConfig,
    recognizer: Option<&'a dyn GlyphRecognizer>,
    unknown_codes: HashMap<u64, char>,
    next_unknown: u32,
}

impl<'a> FontReducer<'a> {
    /// Reducer with fresh remapping state.
    pub fn new(config: &'a ConvertConfig, recognizer: Option<&'a dyn GlyphRecognizer>) -> Self {
        Self {
            config,
            recognizer,
            unknown_codes: HashMap::new(),
            next_unknown: FIRST_UNKNOWN_CODE,
        }
    }

    /// Create, merge, name, write and ungroup the fonts of `movies`.
    #[tracing::instrument(skip_all, fields(movies = movies.len()))]
    pub fn reduce(
        &mut self,
        movies: &[Movie],
        writer: &dyn FontFileWriter,
    ) -> ConvertResult<ReducedFonts> {
        let fonts = self.create_fonts(movies)?;
        let font_count = fonts.len();
        let mut groups = self.merge_fonts(fonts);
        assign_unique_names(&mut groups);
        if self.config.group_fonts {
            tracing::debug!(fonts = font_count, groups = groups.len(), "font groups created");
        }
        let summaries = groups.iter().map(FontGroup::summary).collect();
        let fonts = ungroup_fonts(groups, writer)?;
        Ok(ReducedFonts {
            fonts,
            groups: summaries,
        })
    }

    /// One [`Font`] per font definition, in movie then tag order.
    pub fn create_fonts(&mut self, movies: &[Movie]) -> ConvertResult<Vec<Font>> {
        self.unknown_codes.clear();
        self.next_unknown = FIRST_UNKNOWN_CODE;

        let mut fonts = Vec::new();
        for (file_index, movie) in movies.iter().enumerate() {
            for tag in &movie.tags {
                if let Tag::DefineFont(def) = tag {
                    let locator = Locator::file(file_index).child(def.id);
                    fonts.push(self.create_font(file_index, def, &locator)?);
                }
            }
        }
        Ok(fonts)
    }

    fn create_font(
        &mut self,
        file_index: usize,
        def: &FontDef,
        locator: &Locator,
    ) -> ConvertResult<Font> {
        let scale = self.font_scale(def.version, locator)?;
        if !def.kernings.is_empty() {
            return Err(ConvertError::unsupported(locator, "font kerning"));
        }

        let data = parse_font_glyphs(def, scale, locator)?;
        let mut assigned = HashSet::new();
        let mut glyphs = Vec::with_capacity(data.len());
        for (glyph, &code) in data.into_iter().zip(&def.codes) {
            let glyph = self.assign_char(glyph, code, &assigned, locator)?;
            assigned.insert(glyph.ch);
            glyphs.push(glyph);
        }

        Ok(Font {
            id: FontId {
                file_index,
                font_id: def.id,
            },
            name: def.name.clone(),
            metrics: FontMetrics {
                ascent: def.ascent * scale.scale_x,
                descent: def.descent * scale.scale_x,
                scale,
            },
            glyphs,
            file: None,
        })
    }

    fn font_scale(&self, version: u8, locator: &Locator) -> ConvertResult<FontScale> {
        match version {
            2 => Ok(self.config.font_scale2),
            3 => Ok(self.config.font_scale3),
            v => Err(ConvertError::unsupported(
                locator,
                format!("font definition version {v}"),
            )),
        }
    }

    /// Character of a glyph in its font.
    ///
    /// Blank glyphs all become spaces. A code that is taken in this font, is whitespace, a control
    /// character or in the specials block gets a replacement: the code already given to identical
    /// glyph data, then the recognizer's suggestion, then the next private-use code.
    fn assign_char(
        &mut self,
        data: GlyphData,
        code: u16,
        assigned: &HashSet<char>,
        locator: &Locator,
    ) -> ConvertResult<FontGlyph> {
        if data.is_whitespace() {
            return Ok(FontGlyph {
                ch: ' ',
                data: GlyphData::whitespace(),
            });
        }
        if let Some(ch) = char::from_u32(u32::from(code))
            && is_usable(ch, assigned)
        {
            return Ok(FontGlyph { ch, data });
        }

        let key = data.key();
        let ch = match self.unknown_codes.get(&key) {
            Some(&cached) if !assigned.contains(&cached) => cached,
            Some(_) => self.next_unknown_char(locator)?,
            None => {
                let ch = match self.recognized(&data) {
                    Some(ch) if is_usable(ch, assigned) => ch,
                    _ => self.next_unknown_char(locator)?,
                };
                self.unknown_codes.insert(key, ch);
                ch
            }
        };
        tracing::debug!(
            code = %format!("{code:#06x}"),
            assigned = %format!("{:#06x}", u32::from(ch)),
            "duplicate or invalid glyph code reassigned"
        );
        Ok(FontGlyph { ch, data })
    }

    fn recognized(&self, data: &GlyphData) -> Option<char> {
        let raw = self.recognizer?.recognize(data)?;
        normalize_suggestion(&raw)
    }

    fn next_unknown_char(&mut self, locator: &Locator) -> ConvertResult<char> {
        let ch = (self.next_unknown <= LAST_UNKNOWN_CODE)
            .then(|| char::from_u32(self.next_unknown))
            .flatten()
            .ok_or_else(|| {
                ConvertError::resource(locator, "private-use code points exhausted")
            })?;
        self.next_unknown += 1;
        Ok(ch)
    }

    /// Merge fonts sharing a name, then across names.
    ///
    /// Each pass repeats until the group count stops shrinking. With `group_fonts` off every font
    /// keeps its own group.
    pub fn merge_fonts(&self, fonts: Vec<Font>) -> Vec<FontGroup> {
        let groups: Vec<FontGroup> = fonts.into_iter().map(FontGroup::from_font).collect();
        if !self.config.group_fonts {
            return groups;
        }

        let mut names: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<Vec<FontGroup>> = Vec::new();
        for group in groups {
            let slot = *names.entry(group.name.clone()).or_insert_with(|| {
                buckets.push(Vec::new());
                buckets.len() - 1
            });
            buckets[slot].push(group);
        }

        let mut all = Vec::new();
        for bucket in buckets {
            tracing::debug!(name = %bucket[0].name, fonts = bucket.len(), "merging fonts by name");
            all.extend(merge_groups(bucket, true));
        }
        tracing::debug!(groups = all.len(), "merging fonts ignoring names");
        merge_groups(all, false)
    }
}

fn is_usable(ch: char, assigned: &HashSet<char>) -> bool {
    !(assigned.contains(&ch)
        || ch.is_whitespace()
        || ch <= '\u{1F}'
        || ('\u{FFF0}'..='\u{FFFF}').contains(&ch))
}

/// Fold each group into the first compatible earlier one, until stable.
pub(crate) fn merge_groups(mut groups: Vec<FontGroup>, require_common: bool) -> Vec<FontGroup> {
    loop {
        let before = groups.len();
        let mut merged: Vec<FontGroup> = Vec::with_capacity(before);
        for group in groups {
            match merged
                .iter_mut()
                .find(|m| group.is_compatible_with(m, require_common))
            {
                Some(target) => target.merge(group),
                None => merged.push(group),
            }
        }
        if merged.len() == before {
            return merged;
        }
        tracing::debug!(before, after = merged.len(), "merged font groups");
        groups = merged;
    }
}

/// Give every group a unique lowercase name without spaces.
///
/// Empty names get a token derived from the glyph table. Collisions get `-2`, `-3`, ...
pub fn assign_unique_names(groups: &mut [FontGroup]) {
    let mut taken = HashSet::new();
    for group in groups.iter_mut() {
        let mut name = group.name.replace(' ', "-").to_lowercase();
        if name.is_empty() {
            name = format!("font-{:016x}", group.content_key());
        }
        if taken.contains(&name) {
            let mut i = 2;
            while taken.contains(&format!("{name}-{i}")) {
                i += 1;
            }
            name = format!("{name}-{i}");
        }
        taken.insert(name.clone());
        group.name = name;
    }
}

/// Write each group's file and hand it to every member font under the group name.
pub fn ungroup_fonts(groups: Vec<FontGroup>, writer: &dyn FontFileWriter) -> ConvertResult<FontMap> {
    let mut map = FontMap::new();
    for group in groups {
        let file = Arc::new(writer.write(&group)?);
        for mut font in group.fonts {
            font.name = group.name.clone();
            font.file = Some(Arc::clone(&file));
            map.insert(font.id, Arc::new(font));
        }
    }
    Ok(map)
}

#[cfg(test)]
#[path = "../../tests/unit/font/reducer.rs"]
mod tests;
