use crate::color::{Color, parse_paper};
use crate::config::{Config, load_config};
use crate::log::debug;
use crate::raster::PixmapSurface;
use crate::render::SymbolRenderer;
use crate::surface::Surface;
use crate::symbol::Symbol;
use crate::text_metrics::FontBook;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "symrender", version, about = "Render encoded barcode symbols to PNG")]
pub struct Args {
    /// Input file with one symbol or an array of symbols (JSON), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output PNG file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Device units per symbol unit
    #[arg(short = 'm', long = "magnification")]
    pub magnification: Option<f64>,

    /// Paper (background) color, or 'none' to keep the canvas transparent
    #[arg(long = "paper")]
    pub paper: Option<String>,

    /// Ink (foreground) color
    #[arg(long = "ink")]
    pub ink: Option<String>,

    /// Space between symbols, in device units
    #[arg(long = "gap")]
    pub gap: Option<f64>,

    /// Additional font file; may be repeated
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args)?;

    let input = read_input(args.input.as_deref())?;
    let symbols = Symbol::many_from_json(&input)?;
    if symbols.is_empty() {
        return Err(anyhow::anyhow!("No symbols found in input"));
    }

    let owned;
    let fonts = if config.font_files.is_empty() {
        FontBook::global()
    } else {
        let mut book = FontBook::with_system_fonts();
        for path in &config.font_files {
            book.load_font_file(path)?;
        }
        owned = book;
        &owned
    };
    debug!(faces = fonts.face_count(), symbols = symbols.len(), "fonts loaded");

    let surface = render_row(&symbols, &config, fonts)?;
    surface.save_png(&args.output)?;
    Ok(())
}

fn apply_args(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(m) = args.magnification {
        config.magnification = m;
    }
    if let Some(paper) = args.paper.as_deref() {
        config.palette.paper = parse_paper(paper)?;
    }
    if let Some(ink) = args.ink.as_deref() {
        config.palette.ink = Color::parse(ink)?;
    }
    if let Some(gap) = args.gap {
        config.gap = gap.max(0.0);
    }
    config.font_files.extend(args.fonts.iter().cloned());
    Ok(())
}

/// Canvas size for `symbols` placed left to right, `gap` apart.
pub fn canvas_size(symbols: &[Symbol], magnification: f64, gap: f64) -> (u32, u32) {
    let mut width = 0.0f64;
    let mut height = 0.0f64;
    for (idx, symbol) in symbols.iter().enumerate() {
        if idx > 0 {
            width += gap;
        }
        width += symbol.width * magnification;
        height = height.max(symbol.height * magnification);
    }
    (width.ceil().max(1.0) as u32, height.ceil().max(1.0) as u32)
}

/// Renders every symbol onto one pixmap, translating the surface between
/// symbols.
pub fn render_row<'f>(
    symbols: &[Symbol],
    config: &Config,
    fonts: &'f FontBook,
) -> Result<PixmapSurface<'f>> {
    let mag = config.magnification;
    let (width, height) = canvas_size(symbols, mag, config.gap);
    let surface = PixmapSurface::new(width, height)?
        .with_fonts(fonts)
        .with_anti_alias(config.anti_alias);
    let mut renderer = SymbolRenderer::new(
        surface,
        fonts,
        mag,
        config.palette.paper,
        config.palette.ink,
    )?
    .with_options(config.render);

    for symbol in symbols {
        match config.font_family.as_deref() {
            Some(family) => {
                let mut styled = symbol.clone();
                styled.font_name = family.to_string();
                renderer.render(&styled)?;
            }
            None => renderer.render(symbol)?,
        }
        renderer
            .surface_mut()
            .translate(symbol.width * mag + config.gap, 0.0);
    }
    Ok(renderer.into_surface())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let mut buf = String::new();
    match path {
        Some(path) if path != Path::new("-") => {
            buf = std::fs::read_to_string(path)?;
        }
        _ => {
            io::stdin().read_to_string(&mut buf)?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Rectangle;

    #[test]
    fn canvas_fits_row_of_symbols() {
        let symbols = vec![Symbol::new(10.0, 4.0), Symbol::new(5.5, 8.0)];
        assert_eq!(canvas_size(&symbols, 2.0, 3.0), (34, 16));
        assert_eq!(canvas_size(&[], 2.0, 3.0), (1, 1));
    }

    #[test]
    fn row_places_symbols_side_by_side() {
        let mut first = Symbol::new(4.0, 4.0);
        first.push_rectangle(Rectangle::new(0.0, 0.0, 1.0, 1.0));
        let second = first.clone();
        let config = Config {
            magnification: 2.0,
            gap: 2.0,
            anti_alias: false,
            ..Config::default()
        };
        let fonts = FontBook::new();
        let surface = render_row(&[first, second], &config, &fonts).unwrap();
        assert_eq!(surface.width(), 18);
        assert_eq!(surface.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(surface.pixel(3, 3), Some(Color::WHITE));
        assert_eq!(surface.pixel(10, 0), Some(Color::BLACK));
        assert_eq!(surface.pixel(8, 0), Some(Color::rgba(0, 0, 0, 0)));
    }

    #[test]
    fn args_override_config() {
        let args = Args::parse_from([
            "symrender",
            "-o",
            "out.png",
            "-m",
            "3",
            "--paper",
            "none",
            "--ink",
            "#112233",
        ]);
        let mut config = Config::default();
        apply_args(&mut config, &args).unwrap();
        assert_eq!(config.magnification, 3.0);
        assert_eq!(config.palette.paper, None);
        assert_eq!(config.palette.ink, Color::rgb(0x11, 0x22, 0x33));
    }
}
