//! Web-font stylesheet lookup.
//!
//! The SVG embeds `@font-face` rules in a `<style>` block. Fetching them is
//! best effort: a provider that misses its deadline or fails only costs the
//! rules, never the render.

use std::fmt::Write;
use std::time::{Duration, Instant};

use crate::error::FontError;

/// Supplies `@font-face` CSS for the document.
pub trait FontProvider {
    /// Return the stylesheet, or fail once `deadline` has passed.
    fn font_css(&self, deadline: Instant) -> Result<String, FontError>;
}

/// No web fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFonts;

impl FontProvider for NoFonts {
    fn font_css(&self, _deadline: Instant) -> Result<String, FontError> {
        Ok(String::new())
    }
}

/// One `@font-face` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub url: String,
    pub weight: u16,
    pub italic: bool,
}

/// Stylesheet known ahead of time (bundled, or fetched by an adapter).
#[derive(Debug, Clone, Default)]
pub struct StaticFontCss {
    css: String,
}

impl StaticFontCss {
    pub fn new(css: impl Into<String>) -> Self {
        Self { css: css.into() }
    }

    pub fn from_faces(faces: &[FontFace]) -> Self {
        let mut css = String::new();
        for face in faces {
            let style = if face.italic { "italic" } else { "normal" };
            // Writing to a String cannot fail.
            let _ = writeln!(
                css,
                "@font-face {{ font-family: '{}'; font-style: {}; font-weight: {}; src: url({}); }}",
                face.family, style, face.weight, face.url
            );
        }
        Self { css }
    }
}

impl FontProvider for StaticFontCss {
    fn font_css(&self, deadline: Instant) -> Result<String, FontError> {
        if Instant::now() > deadline {
            return Err(FontError::DeadlineExceeded);
        }
        Ok(self.css.clone())
    }
}

/// Fetch the stylesheet within `timeout`, degrading to no rules.
pub fn fetch_font_css(provider: &dyn FontProvider, timeout: Duration) -> String {
    let deadline = Instant::now() + timeout;
    match provider.font_css(deadline) {
        Ok(css) => css,
        Err(e) => {
            log::warn!("continuing without web fonts: {e}");
            String::new()
        }
    }
}
