use crate::align::JustifyMode;
use crate::color::{Color, parse_paper};
use crate::render::RenderOptions;
use crate::theme::Palette;
use crate::transform::TargetGeometry;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub magnification: f64,
    pub palette: Palette,
    pub render: RenderOptions,
    /// Replaces every symbol's font family when set.
    pub font_family: Option<String>,
    /// Extra font files loaded into the font book.
    pub font_files: Vec<PathBuf>,
    /// Horizontal space between symbols on one canvas, in device units.
    pub gap: f64,
    pub anti_alias: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            magnification: 4.0,
            palette: Palette::classic(),
            render: RenderOptions::default(),
            font_family: None,
            font_files: Vec::new(),
            gap: 0.0,
            anti_alias: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    magnification: Option<f64>,
    palette: Option<String>,
    paper: Option<String>,
    ink: Option<String>,
    justify: Option<JustifyMode>,
    target_geometry: Option<TargetGeometry>,
    font_family: Option<String>,
    #[serde(default)]
    font_files: Vec<PathBuf>,
    gap: Option<f64>,
    anti_alias: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let mut config = parse_config(&contents)?;
    // Font paths are relative to the config file.
    if let Some(base) = path.parent() {
        for font in &mut config.font_files {
            if font.is_relative() {
                *font = base.join(&*font);
            }
        }
    }
    Ok(config)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(name) = parsed.palette.as_deref() {
        config.palette = Palette::by_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown palette: {name}"))?;
    }
    if let Some(paper) = parsed.paper.as_deref() {
        config.palette.paper = parse_paper(paper)?;
    }
    if let Some(ink) = parsed.ink.as_deref() {
        config.palette.ink = Color::parse(ink)?;
    }
    if let Some(v) = parsed.magnification {
        config.magnification = v;
    }
    if let Some(v) = parsed.justify {
        config.render.justify = v;
    }
    if let Some(v) = parsed.target_geometry {
        config.render.target_geometry = v;
    }
    if let Some(v) = parsed.gap {
        config.gap = v.max(0.0);
    }
    if let Some(v) = parsed.anti_alias {
        config.anti_alias = v;
    }
    config.font_family = parsed.font_family;
    config.font_files = parsed.font_files;
    Ok(config)
}
