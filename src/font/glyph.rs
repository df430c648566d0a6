use crate::font::model::{FontScale, GlyphData};
use crate::foundation::core::Affine;
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::path::{Path, PathElement};
use crate::movie::model::FontDef;
use crate::shape::builder::record_outline_paths;

/// Outlines and advances of every glyph of `def`, scaled to em square units.
///
/// Fonts without layout get zero advances.
pub(crate) fn parse_font_glyphs(
    def: &FontDef,
    scale: FontScale,
    locator: &Locator,
) -> ConvertResult<Vec<GlyphData>> {
    if def.glyphs.len() != def.codes.len() {
        return Err(ConvertError::resource(
            locator,
            format!(
                "font has {} glyph shapes for {} codes",
                def.glyphs.len(),
                def.codes.len()
            ),
        ));
    }
    if !def.advances.is_empty() && def.advances.len() != def.codes.len() {
        return Err(ConvertError::resource(
            locator,
            format!(
                "font has {} advances for {} codes",
                def.advances.len(),
                def.codes.len()
            ),
        ));
    }

    let transform = Affine::scale_non_uniform(scale.scale_x, scale.scale_y);
    def.glyphs
        .iter()
        .enumerate()
        .map(|(i, records)| {
            let advance = def.advances.get(i).map_or(0.0, |a| a * scale.scale_x);
            let paths = record_outline_paths(records, transform, locator)?;
            Ok(GlyphData {
                advance_width: advance,
                contours: split_contours(paths),
            })
        })
        .collect()
}

/// One path per subpath: every contour starts with its only `MoveTo`.
fn split_contours(paths: Vec<Path>) -> Vec<Path> {
    let mut contours = Vec::new();
    for path in paths {
        let mut current = Vec::new();
        for el in path.elements {
            if matches!(el, PathElement::MoveTo(_)) && !current.is_empty() {
                contours.push(Path::outline(std::mem::take(&mut current)));
            }
            current.push(el);
        }
        if !current.is_empty() {
            contours.push(Path::outline(current));
        }
    }
    contours
}

#[cfg(test)]
#[path = "../../tests/unit/font/glyph.rs"]
mod tests;
