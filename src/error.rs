use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid magnification: {0} (must be a finite value >= 0)")]
    InvalidMagnification(f64),
    #[error("unknown alignment: {0}")]
    UnknownAlignment(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("no font face found for family \"{family}\"")]
    FontNotFound { family: String },
    #[error("font \"{family}\" could not be parsed")]
    InvalidFont { family: String },
    #[error("degenerate text bounds for {text:?}: width {width}")]
    DegenerateBounds { text: String, width: f64 },
    #[error("no font set on surface before drawing text")]
    NoFont,
    #[error("font cache lock poisoned")]
    FontCachePoisoned,
    #[error("cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
