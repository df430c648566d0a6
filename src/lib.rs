//! swfir converts decoded vector-animation movies into a render-agnostic scene IR.
//!
//! A batch run works in three stages:
//!
//! - Reduce the fonts of every [`Movie`] into merged font groups
//! - Replay the display list of each movie into frames
//! - Build one [`FrameRoot`] scene tree per frame (paths, groups, text runs)
//!
//! Start from [`convert_batch`], or [`convert_movie`] with an already reduced [`FontMap`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod batch;
pub(crate) mod bitmap;
pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod font;
pub(crate) mod ir;
pub(crate) mod movie;
pub(crate) mod scene;
pub(crate) mod shape;
pub(crate) mod text;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Affine, Color, EM_SQUARE_SIZE, Point, Rect, TWIPS_PER_INCH, TWIPS_PER_POINT, YAxisDirection,
};
pub use crate::foundation::error::{ConvertError, ConvertResult, Locator};

pub use crate::batch::{BatchOutput, Collaborators, convert_batch, convert_movie};
pub use crate::bitmap::decoder::{ImageData, ImageDecoder, RasterImageDecoder};
pub use crate::color::{ColorTransform, CompositeColorTransform};
pub use crate::config::ConvertConfig;
pub use crate::font::group::{FontGroup, FontGroupSummary};
pub use crate::font::model::{
    Font, FontFile, FontGlyph, FontId, FontMap, FontMetrics, FontScale, GlyphData,
};
pub use crate::font::recognize::GlyphRecognizer;
pub use crate::font::reducer::{FontReducer, ReducedFonts, assign_unique_names, ungroup_fonts};
pub use crate::font::writer::{FontFileWriter, JsonFontWriter, MemoryFontWriter};
pub use crate::ir::model::{
    BlendMode, FrameObject, FrameRoot, GroupKind, GroupObject, ShapeObject, TextObject,
};
pub use crate::ir::path::{
    FillStyle, GradientStop, LineCap, LineJoin, LineStyle, Path, PathElement,
};
pub use crate::ir::visit::{SceneStats, collect_fonts, collect_images, scene_stats};
pub use crate::movie::model::{
    BitmapFillDef, BlendModeDef, Dictionary, FillStyleDef, FilterDef, FontDef, GlyphEntry,
    GradientDef, GradientStopDef, ImageDef, ImageFormat, InterpolationMode, KerningRecord,
    LineStyleDef, Matrix, Movie, MovieHeader, PlaceMode, PlaceObject, RemoveObject, ShapeDef,
    ShapeRecord, SpreadMode, SpriteDef, StyleChange, Tag, TextDef, TextSpanDef, TwipsRect,
};
pub use crate::scene::builder::SceneBuilder;
pub use crate::scene::stacks::SceneStacks;
pub use crate::shape::builder::{StyleResolver, outline_paths, styled_paths};
pub use crate::shape::rect::path_to_rectangle;
pub use crate::shape::style::StyleConverter;
pub use crate::text::layout::TextTranslator;
pub use crate::timeline::{Frame, Placement, build_frames};
