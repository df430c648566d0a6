use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "swfir", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a movie collection to scene IR JSON.
    Convert(ConvertArgs),
    /// Print node counts of every converted frame.
    Stats(StatsArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input movie collection JSON (an array of decoded movies).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Conversion config JSON. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output IR JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Write merged font glyph tables to this directory.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Write decoded images as PNG files to this directory.
    #[arg(long)]
    images_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Input movie collection JSON (an array of decoded movies).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Conversion config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn read_movies(path: &Path) -> anyhow::Result<Vec<swfir::Movie>> {
    let f = File::open(path).with_context(|| format!("open movies '{}'", path.display()))?;
    let movies: Vec<swfir::Movie> =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse movie collection JSON")?;
    Ok(movies)
}

fn read_config(path: Option<&Path>) -> anyhow::Result<swfir::ConvertConfig> {
    let Some(path) = path else {
        return Ok(swfir::ConvertConfig::default());
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    Ok(swfir::ConvertConfig::from_json_str(&s)?)
}

fn run(
    movies: &[swfir::Movie],
    config: &swfir::ConvertConfig,
    fonts_dir: Option<&Path>,
) -> anyhow::Result<swfir::BatchOutput> {
    let images = swfir::RasterImageDecoder::new(config.max_image_density);
    let json_writer;
    let font_writer: &dyn swfir::FontFileWriter = match fonts_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create fonts dir '{}'", dir.display()))?;
            json_writer = swfir::JsonFontWriter::new(dir);
            &json_writer
        }
        None => &swfir::MemoryFontWriter,
    };
    let collab = swfir::Collaborators {
        images: &images,
        font_writer,
        recognizer: None,
    };
    Ok(swfir::convert_batch(movies, config, &collab)?)
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let movies = read_movies(&args.in_path)?;
    let config = read_config(args.config.as_deref())?;
    let output = run(&movies, &config, args.fonts_dir.as_deref())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create output '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &output).with_context(|| "serialize IR")?;
    w.flush()
        .with_context(|| format!("write output '{}'", args.out.display()))?;

    if let Some(dir) = &args.images_dir {
        write_images(dir, &output.images)?;
    }

    eprintln!(
        "wrote {} ({} movies, {} font groups, {} images)",
        args.out.display(),
        output.movies.len(),
        output.fonts.len(),
        output.images.len()
    );
    Ok(())
}

fn write_images(dir: &Path, images: &[std::sync::Arc<swfir::ImageData>]) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create images dir '{}'", dir.display()))?;
    for img in images {
        let path = dir.join(format!("{:016x}.png", img.key));
        image::save_buffer_with_format(
            &path,
            &img.rgba,
            img.width,
            img.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
    }
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let movies = read_movies(&args.in_path)?;
    let config = read_config(args.config.as_deref())?;
    let output = run(&movies, &config, None)?;

    for (movie, frames) in output.movies.iter().enumerate() {
        let collected = swfir::collect_fonts(frames);
        let fonts: Vec<&str> = collected
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        println!("movie {movie}: {} frames, fonts [{}]", frames.len(), fonts.join(", "));
        for (frame, root) in frames.iter().enumerate() {
            let stats = swfir::scene_stats(root);
            println!(
                "movie {movie} frame {frame}: {}",
                serde_json::to_string(&stats).with_context(|| "serialize stats")?
            );
        }
    }
    for group in &output.fonts {
        println!(
            "font {}: {} glyphs, {} fonts",
            group.name,
            group.glyph_count,
            group.fonts.len()
        );
    }
    Ok(())
}
