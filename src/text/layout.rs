use std::sync::Arc;

use crate::color::CompositeColorTransform;
use crate::config::ConvertConfig;
use crate::font::model::{Font, FontId, FontMap, FontScale};
use crate::foundation::core::{Affine, Color, EM_SQUARE_SIZE, is_identity};
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::model::{FrameObject, GroupKind, GroupObject, ShapeObject, TextObject};
use crate::ir::path::{Path, PathElement};
use crate::movie::model::{GlyphEntry, TextDef, TextSpanDef};

/// Translates static text definitions into text objects.
///
/// Fonts come from the reduced font map of the batch.
pub struct TextTranslator<'a> {
    config: &'a ConvertConfig,
    fonts: &'a FontMap,
    file_index: usize,
}

/// Style inherited from span to span.
#[derive(Default)]
struct SpanState {
    font: Option<Arc<Font>>,
    size: Option<f64>,
    color: Option<Color>,
    x: f64,
    y: f64,
}

/// A glyph of a span after whitespace folding.
struct Run {
    index: u16,
    ch: char,
    advance: f64,
    default_advance: f64,
    whitespace: bool,
}

impl<'a> TextTranslator<'a> {
    /// Translator for the movie at `file_index`.
    pub fn new(config: &'a ConvertConfig, fonts: &'a FontMap, file_index: usize) -> Self {
        Self {
            config,
            fonts,
            file_index,
        }
    }

    /// Text objects of `def`, wrapped in a transform group unless the text transform is identity.
    ///
    /// Returns nothing when no span sets a font or no span has visible glyphs.
    pub fn translate(
        &self,
        def: &TextDef,
        colors: &CompositeColorTransform,
        locator: &Locator,
    ) -> ConvertResult<Vec<FrameObject>> {
        let Some(scale) = self.text_scale(def, locator)? else {
            return Ok(Vec::new());
        };

        let mut state = SpanState::default();
        let mut texts = Vec::new();
        for span in &def.spans {
            self.update_style(&mut state, span, colors, locator)?;
            if let Some(text) = self.translate_span(def.id, &mut state, span, locator)? {
                texts.push(FrameObject::Text(text));
            }
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let transform = self.text_transform(def, scale);
        let mut objects = if is_identity(transform) {
            texts
        } else {
            let mut group = GroupObject::new(def.id, GroupKind::Transform(transform));
            group.objects = texts;
            vec![FrameObject::Group(group)]
        };

        if self.config.draw_text_bounds {
            let mut bounds = Path::outline(vec![PathElement::Rectangle(def.bounds.to_rect())]);
            bounds.line = Some(self.config.debug_line_style());
            objects.push(FrameObject::Shape(ShapeObject {
                id: def.id,
                paths: vec![bounds],
            }));
        }
        Ok(objects)
    }

    fn font(&self, id: u16, locator: &Locator) -> ConvertResult<&'a Arc<Font>> {
        let key = FontId {
            file_index: self.file_index,
            font_id: id,
        };
        self.fonts
            .get(&key)
            .ok_or_else(|| ConvertError::structure(locator, format!("unknown font ID {id}")))
    }

    /// The single font scale of the spans, since one transform serves all of them.
    fn text_scale(&self, def: &TextDef, locator: &Locator) -> ConvertResult<Option<FontScale>> {
        let mut last: Option<FontScale> = None;
        for id in def.spans.iter().filter_map(|s| s.font_id) {
            let scale = self.font(id, locator)?.metrics.scale;
            if last.is_some_and(|l| l != scale) {
                return Err(ConvertError::unsupported(
                    locator,
                    "fonts with different scale in the same text",
                ));
            }
            last = Some(scale);
        }
        Ok(last)
    }

    /// Tag matrix with its linear part scaled back from font units. Translation is kept.
    fn text_transform(&self, def: &TextDef, scale: FontScale) -> Affine {
        let usx = scale.unscale_x;
        let usy = scale.unscale_y * self.config.y_axis.multiplier();
        let [a, b, c, d, e, f] = def.matrix.to_affine().as_coeffs();
        Affine::new([a * usx, b * usx, c * usy, d * usy, e, f])
    }

    fn update_style(
        &self,
        state: &mut SpanState,
        span: &TextSpanDef,
        colors: &CompositeColorTransform,
        locator: &Locator,
    ) -> ConvertResult<()> {
        if let Some(id) = span.font_id {
            state.font = Some(Arc::clone(self.font(id, locator)?));
        }
        let Some(font) = &state.font else {
            return Err(ConvertError::structure(locator, "no font specified"));
        };
        let scale = font.metrics.scale;

        if let Some(h) = span.height {
            state.size = Some(h);
        }
        if state.size.is_none() {
            return Err(ConvertError::structure(locator, "no font size specified"));
        }
        if let Some(c) = span.color {
            state.color = Some(colors.apply(c));
        }
        if state.color.is_none() {
            return Err(ConvertError::structure(locator, "no text color specified"));
        }

        // Offsets replace the running position, they never add to it.
        if let Some(x) = span.offset_x {
            state.x = x / scale.unscale_x;
        }
        if let Some(y) = span.offset_y {
            state.y = y / scale.unscale_y * self.config.y_axis.multiplier();
        }
        Ok(())
    }

    fn translate_span(
        &self,
        id: u16,
        state: &mut SpanState,
        span: &TextSpanDef,
        locator: &Locator,
    ) -> ConvertResult<Option<TextObject>> {
        let (Some(font), Some(size), Some(color)) = (state.font.clone(), state.size, state.color)
        else {
            return Ok(None);
        };
        if size == 0.0 {
            return Ok(None);
        }
        let unscale_x = font.metrics.scale.unscale_x;

        let mut runs = fold_whitespace(&font, &span.glyphs, locator)?;
        let mut x = state.x;
        state.x += span.glyphs.iter().map(|g| g.advance / unscale_x).sum::<f64>();

        if runs.first().is_some_and(|r| r.whitespace) {
            x += runs.remove(0).advance / unscale_x;
        }
        if runs.last().is_some_and(|r| r.whitespace) {
            runs.pop();
        }
        if runs.is_empty() {
            return Ok(None);
        }

        let glyph_offsets = self.glyph_offsets(&runs, unscale_x * size);
        Ok(Some(TextObject {
            id,
            x,
            y: state.y,
            font_size: size,
            color,
            text: runs.iter().map(|r| r.ch).collect(),
            glyph_indices: runs.iter().map(|r| r.index).collect(),
            glyph_offsets,
            font,
        }))
    }

    /// Deviation of each advance from the glyph's default advance, in em square units.
    ///
    /// Deviations under the threshold are emitted as zero and carried into the next glyph. There is
    /// no offset after the last glyph, and trailing zeros are dropped.
    fn glyph_offsets(&self, runs: &[Run], units_per_em: f64) -> Vec<f64> {
        let threshold = self.config.ignore_glyph_offsets_threshold;
        let mut offsets = Vec::with_capacity(runs.len().saturating_sub(1));
        let mut carry = 0.0;
        for run in &runs[..runs.len().saturating_sub(1)] {
            let actual = run.advance / units_per_em * EM_SQUARE_SIZE;
            let wanted = actual - run.default_advance + carry;
            if wanted.abs() < threshold {
                offsets.push(0.0);
                carry = wanted;
            } else {
                offsets.push(wanted);
                carry = 0.0;
            }
        }
        while offsets.last() == Some(&0.0) {
            offsets.pop();
        }
        offsets
    }
}

/// Resolve glyph entries and merge consecutive whitespace into one glyph with their summed advance.
fn fold_whitespace(font: &Font, entries: &[GlyphEntry], locator: &Locator) -> ConvertResult<Vec<Run>> {
    let mut runs: Vec<Run> = Vec::with_capacity(entries.len());
    for entry in entries {
        let glyph = font.glyphs.get(usize::from(entry.index)).ok_or_else(|| {
            ConvertError::resource(
                locator,
                format!(
                    "glyph index {} out of range for font {} ({} glyphs)",
                    entry.index,
                    font.id.font_id,
                    font.glyphs.len()
                ),
            )
        })?;
        let whitespace = glyph.is_whitespace();
        if whitespace && let Some(last) = runs.last_mut().filter(|r| r.whitespace) {
            last.advance += entry.advance;
            continue;
        }
        runs.push(Run {
            index: entry.index,
            ch: glyph.ch,
            advance: entry.advance,
            default_advance: glyph.data.advance_width,
            whitespace,
        });
    }
    Ok(runs)
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
