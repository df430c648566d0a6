use crate::bitmap::decoder::ImageDecoder;
use crate::config::ConvertConfig;
use crate::font::model::FontMap;
use crate::foundation::core::{Affine, is_identity};
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::model::{BlendMode, FrameObject, FrameRoot, GroupKind, GroupObject, ShapeObject};
use crate::ir::path::{Path, PathElement};
use crate::movie::model::{BlendModeDef, Dictionary, FilterDef, ShapeDef, Tag, TextDef};
use crate::scene::stacks::SceneStacks;
use crate::shape::builder::{outline_paths, styled_paths};
use crate::shape::style::StyleConverter;
use crate::text::layout::TextTranslator;
use crate::timeline::{Frame, Placement};

const IDENTITY_COLOR_MATRIX: [f32; 20] = [
    1.0, 0.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];

/// Converts the frames of one movie into scene trees.
pub struct SceneBuilder<'a> {
    config: &'a ConvertConfig,
    dictionary: &'a Dictionary<'a>,
    images: &'a dyn ImageDecoder,
    text: TextTranslator<'a>,
    locator: Locator,
}

impl<'a> SceneBuilder<'a> {
    /// Builder for the movie at `file_index`, whose characters are in `dictionary`.
    pub fn new(
        config: &'a ConvertConfig,
        dictionary: &'a Dictionary<'a>,
        fonts: &'a FontMap,
        images: &'a dyn ImageDecoder,
        file_index: usize,
    ) -> Self {
        Self {
            config,
            dictionary,
            images,
            text: TextTranslator::new(config, fonts, file_index),
            locator: Locator::file(file_index),
        }
    }

    /// Scene tree of one frame.
    pub fn build_frame(&self, frame: &Frame<'_>) -> ConvertResult<FrameRoot> {
        let mut root = FrameRoot::new(
            f64::from(frame.width),
            f64::from(frame.height),
            self.config.frame_padding_twips(),
            self.config.y_axis,
        );
        let root_transform = root.transform();
        let group = std::mem::replace(&mut root.group, GroupObject::new(0, GroupKind::Simple));

        let mut stacks = SceneStacks::new(group, root_transform);
        self.placements(&mut stacks, &frame.placements)?;
        stacks.leave_clip_scope(Vec::new(), &self.locator)?;
        root.group = stacks.finish();
        Ok(root)
    }

    fn placements(
        &self,
        stacks: &mut SceneStacks,
        placements: &[Placement<'_>],
    ) -> ConvertResult<()> {
        let mut previous = 0;
        for p in placements {
            if p.depth < previous {
                return Err(ConvertError::UnorderedPlacement {
                    locator: p.locator.clone(),
                    depth: p.depth,
                    previous,
                });
            }
            previous = p.depth;
            // Motion tween frames are not converted.
            if p.place.ratio.is_some() {
                continue;
            }
            self.placement(stacks, p)?;
        }
        Ok(())
    }

    fn placement(&self, stacks: &mut SceneStacks, p: &Placement<'_>) -> ConvertResult<()> {
        check_filters(&p.place.filters, &p.locator)?;

        let color_pushed = match p.place.color_transform {
            Some(ct) => {
                stacks.push_color(ct);
                true
            }
            None => false,
        };

        match p.place.clip_depth {
            Some(end_depth) => self.clip(stacks, p, end_depth)?,
            None => self.drawn(stacks, p)?,
        }
        stacks.close_clips(p.depth, &p.locator)?;

        if color_pushed {
            stacks.pop_color();
        }
        Ok(())
    }

    /// Clip placement. The placement transform goes into the clip paths, since the clip group
    /// also holds the placements it clips.
    fn clip(
        &self,
        stacks: &mut SceneStacks,
        p: &Placement<'_>,
        end_depth: u16,
    ) -> ConvertResult<()> {
        let Tag::DefineShape(shape) = p.definition else {
            return Err(ConvertError::unsupported(
                &p.locator,
                format!("clip object of type {}", p.definition.kind_name()),
            ));
        };
        if self.config.disable_clipping {
            return Ok(());
        }
        let mut paths = Vec::new();
        for path in outline_paths(shape, p.place.transform(), &p.locator)? {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Ok(());
        }
        stacks.push_clip(p.id, end_depth, paths, &p.locator)
    }

    fn drawn(&self, stacks: &mut SceneStacks, p: &Placement<'_>) -> ConvertResult<()> {
        let mark = stacks.group_depth();
        let transform = p.place.transform();

        let mut mask_paths = None;
        match p.place.blend_mode {
            Some(BlendModeDef::Alpha) if !self.config.disable_masking => {
                let Tag::DefineShape(shape) = p.definition else {
                    return Err(ConvertError::unsupported(
                        &p.locator,
                        format!("mask object of type {}", p.definition.kind_name()),
                    ));
                };
                let total = stacks.transform() * transform;
                let paths = self.shape_paths(stacks, shape, total, &p.locator)?;
                if paths.is_empty() {
                    tracing::warn!(locator = %p.locator, "mask shape has no paths, placement skipped");
                    return Ok(());
                }
                let bounds = transform.transform_rect_bbox(shape.bounds.to_rect());
                if !stacks.push_masked(bounds) {
                    tracing::warn!(locator = %p.locator, "nothing to mask, placement skipped");
                    return Ok(());
                }
                mask_paths = Some(paths);
            }
            Some(def) => {
                if let Some(mode) = def.to_blend_mode()
                    && mode != stacks.blend()
                {
                    if mode != BlendMode::Normal && stacks.blend() != BlendMode::Normal {
                        return Err(ConvertError::unsupported(
                            &p.locator,
                            format!(
                                "blend mode {mode:?} nested in blend mode {:?}",
                                stacks.blend()
                            ),
                        ));
                    }
                    stacks.push_blend(p.id, mode);
                }
            }
            None => {}
        }

        if !is_identity(transform) {
            stacks.push_transform(p.id, transform);
        }

        match p.definition {
            Tag::DefineShape(shape) => {
                let paths = match mask_paths {
                    Some(paths) => paths,
                    None => {
                        let total = stacks.transform();
                        self.shape_paths(stacks, shape, total, &p.locator)?
                    }
                };
                self.shape(stacks, shape, paths);
            }
            Tag::DefineText(text) => self.text(stacks, text, &p.locator)?,
            Tag::DefineSprite(_) => {
                stacks.push_simple(p.id);
                let saved = stacks.enter_clip_scope();
                if let Some(children) = &p.sprite {
                    self.placements(stacks, children)?;
                }
                stacks.leave_clip_scope(saved, &p.locator)?;
            }
            other => {
                tracing::warn!(
                    locator = %p.locator,
                    kind = other.kind_name(),
                    "object type cannot be placed, ignored"
                );
            }
        }

        stacks.unwind(mark);
        Ok(())
    }

    fn shape_paths(
        &self,
        stacks: &SceneStacks,
        shape: &ShapeDef,
        total: Affine,
        locator: &Locator,
    ) -> ConvertResult<Vec<Path>> {
        let mut styles = StyleConverter {
            colors: stacks.colors(),
            dictionary: self.dictionary,
            images: self.images,
            config: self.config,
            transform: total,
            locator,
        };
        styled_paths(
            shape,
            Affine::IDENTITY,
            self.config.allow_rectangles,
            &mut styles,
            locator,
        )
    }

    fn shape(&self, stacks: &mut SceneStacks, shape: &ShapeDef, paths: Vec<Path>) {
        if paths.is_empty() {
            return;
        }
        if self.config.draw_shape_bounds {
            let mut bounds = Path::outline(vec![PathElement::Rectangle(shape.bounds.to_rect())]);
            bounds.line = Some(self.config.debug_line_style());
            stacks.append(FrameObject::Shape(ShapeObject {
                id: shape.id,
                paths: vec![bounds],
            }));
        }
        stacks.append(FrameObject::Shape(ShapeObject {
            id: shape.id,
            paths,
        }));
    }

    fn text(
        &self,
        stacks: &mut SceneStacks,
        text: &TextDef,
        locator: &Locator,
    ) -> ConvertResult<()> {
        let objects = self.text.translate(text, stacks.colors(), locator)?;
        for obj in objects {
            stacks.append(obj);
        }
        Ok(())
    }
}

/// Only identity color matrices are accepted.
fn check_filters(filters: &[FilterDef], locator: &Locator) -> ConvertResult<()> {
    for filter in filters {
        match filter {
            FilterDef::ColorMatrix { matrix } if matrix.as_slice() == IDENTITY_COLOR_MATRIX => {}
            FilterDef::ColorMatrix { .. } => {
                return Err(ConvertError::unsupported(
                    locator,
                    "non-identity color matrix filter",
                ));
            }
            other => {
                return Err(ConvertError::unsupported(
                    locator,
                    format!("place filter {other:?}"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/builder.rs"]
mod tests;
