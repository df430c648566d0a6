use std::sync::Arc;

use rayon::prelude::*;

use crate::bitmap::decoder::{ImageData, ImageDecoder};
use crate::config::ConvertConfig;
use crate::font::group::FontGroupSummary;
use crate::font::model::FontMap;
use crate::font::recognize::GlyphRecognizer;
use crate::font::reducer::FontReducer;
use crate::font::writer::FontFileWriter;
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::model::FrameRoot;
use crate::ir::visit::collect_images;
use crate::movie::model::{Dictionary, Movie};
use crate::scene::builder::SceneBuilder;
use crate::timeline::build_frames;

/// External services used by a conversion run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Decoder of bitmap fills.
    pub images: &'a dyn ImageDecoder,
    /// Writer of merged font files.
    pub font_writer: &'a dyn FontFileWriter,
    /// Optional recognizer naming glyphs with unusable codes.
    pub recognizer: Option<&'a dyn GlyphRecognizer>,
}

/// Result of a batch conversion.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BatchOutput {
    /// Scene roots of every frame, per movie in input order.
    pub movies: Vec<Vec<FrameRoot>>,
    /// Merged font groups.
    pub fonts: Vec<FontGroupSummary>,
    /// Decoded images referenced by the scenes, deduplicated by content.
    pub images: Vec<Arc<ImageData>>,
}

/// Convert a movie collection.
///
/// Fonts are reduced once over all movies, then every movie is converted on its own, in parallel
/// unless `config.parallel` is off. Any failure aborts the batch; the error of the lowest-index
/// failing movie is returned.
#[tracing::instrument(skip_all, fields(movies = movies.len(), parallel = config.parallel))]
pub fn convert_batch(
    movies: &[Movie],
    config: &ConvertConfig,
    collab: &Collaborators<'_>,
) -> ConvertResult<BatchOutput> {
    config.validate()?;

    let reduced = FontReducer::new(config, collab.recognizer).reduce(movies, collab.font_writer)?;
    let fonts = &reduced.fonts;

    let results: Vec<ConvertResult<Vec<FrameRoot>>> = if config.parallel {
        let pool = build_thread_pool(config.threads)?;
        pool.install(|| {
            movies
                .par_iter()
                .enumerate()
                .map(|(i, movie)| convert_movie(i, movie, config, fonts, collab.images))
                .collect()
        })
    } else {
        movies
            .iter()
            .enumerate()
            .map(|(i, movie)| convert_movie(i, movie, config, fonts, collab.images))
            .collect()
    };

    let mut converted = Vec::with_capacity(results.len());
    for result in results {
        converted.push(result?);
    }
    let images = collect_images(converted.iter().flatten());
    tracing::debug!(images = images.len(), "batch converted");

    Ok(BatchOutput {
        movies: converted,
        fonts: reduced.groups,
        images,
    })
}

/// Convert the frames of the movie at `file_index`, using fonts already reduced for the batch.
#[tracing::instrument(skip(movie, config, fonts, images))]
pub fn convert_movie(
    file_index: usize,
    movie: &Movie,
    config: &ConvertConfig,
    fonts: &FontMap,
    images: &dyn ImageDecoder,
) -> ConvertResult<Vec<FrameRoot>> {
    let dictionary = Dictionary::new(movie);
    let frames = build_frames(movie, &dictionary, config, &Locator::file(file_index))?;
    let builder = SceneBuilder::new(config, &dictionary, fonts, images, file_index);
    frames.iter().map(|f| builder.build_frame(f)).collect()
}

fn build_thread_pool(threads: Option<usize>) -> ConvertResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(ConvertError::config("threads must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ConvertError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}
