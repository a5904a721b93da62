//! angka: MusicXML to numbered-notation ("not angka") SVG for hymnals.
//!
//! Supports both uncompressed MusicXML (.musicxml) and compressed MXL (.mxl)
//! files. Pitches become movable-do degrees, durations become digits with
//! continuation dots and underlines, and the result is laid out on a
//! justified fixed-width page.
//!
//! # Example
//! ```no_run
//! use angka::{parse_file, render_score_to_svg, RenderOptions};
//!
//! let score = parse_file("path/to/hymn.musicxml").unwrap();
//! let svg = render_score_to_svg(&score, &RenderOptions::default()).unwrap();
//! println!("{} bytes of SVG", svg.len());
//! ```

pub mod canvas;
pub mod error;
pub mod fonts;
pub mod metadata;
pub mod model;
pub mod mxl;
pub mod parser;
pub mod renderer;
pub mod theory;

use std::path::Path;

pub use canvas::{Canvas, SvgCanvas};
pub use error::{FontError, RenderError, Result};
pub use fonts::{FontProvider, NoFonts, StaticFontCss};
pub use metadata::{HymnMetadata, InMemoryRepository, MetadataRepository, Verse};
pub use model::*;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;
pub use renderer::{
    layout_score, render_score_to_svg, DefaultDelegate, ErrorAction, HymnRenderer, RenderDelegate, RenderOptions,
};
pub use theory::{KeySignature, Mode, TimeSignatures};

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => {
            let xml = std::str::from_utf8(data)
                .map_err(|e| RenderError::MalformedInput(format!("invalid UTF-8 in MusicXML file: {e}")))?;
            parse_musicxml(xml)
        }
        _ => {
            // Auto-detect: try as XML first, then as MXL
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return parse_musicxml(xml);
                }
            }
            parse_mxl(data)
        }
    }
}

/// Convert a parsed score to a JSON string.
pub fn score_to_json(score: &Score) -> Result<String> {
    Ok(serde_json::to_string_pretty(score)?)
}

/// Parse a MusicXML file and render it directly to SVG.
pub fn render_file_to_svg<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let score = parse_file(path)?;
    render_score_to_svg(&score, options)
}

/// Parse MusicXML bytes and render to SVG.
pub fn render_bytes_to_svg(data: &[u8], extension: Option<&str>, options: &RenderOptions) -> Result<String> {
    let score = parse_bytes(data, extension)?;
    render_score_to_svg(&score, options)
}
