use std::path::PathBuf;

use anyhow::Context;

use crate::font::group::FontGroup;
use crate::font::model::{FontFile, FontMetrics};
use crate::foundation::error::ConvertResult;
use crate::ir::path::Path;

/// Produces the physical font resource of a merged group.
pub trait FontFileWriter: Send + Sync {
    /// Write `group` and describe the resulting file.
    fn write(&self, group: &FontGroup) -> ConvertResult<FontFile>;
}

/// Writer that only creates handles.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryFontWriter;

impl FontFileWriter for MemoryFontWriter {
    fn write(&self, group: &FontGroup) -> ConvertResult<FontFile> {
        Ok(FontFile {
            name: group.name.clone(),
            path: None,
            glyph_count: group.glyphs.len(),
        })
    }
}

/// Writes each group's glyph table to `<dir>/<name>.json`.
#[derive(Clone, Debug)]
pub struct JsonFontWriter {
    dir: PathBuf,
}

impl JsonFontWriter {
    /// Writer into `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[derive(serde::Serialize)]
struct FontFileJson<'a> {
    name: &'a str,
    metrics: &'a FontMetrics,
    glyphs: Vec<GlyphJson<'a>>,
}

#[derive(serde::Serialize)]
struct GlyphJson<'a> {
    ch: char,
    advance_width: f64,
    contours: &'a [Path],
}

impl FontFileWriter for JsonFontWriter {
    fn write(&self, group: &FontGroup) -> ConvertResult<FontFile> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create font dir {}", self.dir.display()))?;
        let path = self.dir.join(format!("{}.json", group.name));

        let doc = FontFileJson {
            name: &group.name,
            metrics: &group.metrics,
            glyphs: group
                .glyphs
                .values()
                .map(|g| GlyphJson {
                    ch: g.ch,
                    advance_width: g.data.advance_width,
                    contours: &g.data.contours,
                })
                .collect(),
        };
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create font file {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &doc)
            .with_context(|| format!("write font file {}", path.display()))?;

        Ok(FontFile {
            name: group.name.clone(),
            path: Some(path),
            glyph_count: group.glyphs.len(),
        })
    }
}
