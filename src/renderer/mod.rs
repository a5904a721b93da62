//! Hymn renderer: converts a parsed Score into numbered-notation SVG.
//!
//! The renderer computes its own layout from the musical content (pitch,
//! duration, time signature) plus the hymn's metadata, then writes the
//! page through a [`Canvas`]. Nothing reaches the canvas until every
//! fallible lookup has succeeded.

mod beams;
mod constants;
mod emit;
mod glyph_width;
mod header;
mod layout;
mod lyrics;
mod note_renderer;
mod notes;
mod slurs;
mod verses;

use std::fmt::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, SvgCanvas};
use crate::error::{RenderError, Result};
use crate::fonts::{fetch_font_css, FontProvider, NoFonts};
use crate::metadata::{HymnMetadata, MetadataRepository};
use crate::model::Score;
use crate::theory::{KeySignature, TimeSignatures};

use constants::*;
use emit::{draw_row, EmitStyle};
use header::{draw_text_block, plan_footer, plan_header};
use layout::{layout_rows, RowSettings};
use lyrics::verse_numbers;
use verses::{draw_verses, plan_verses};

pub use beams::{clean_beam_by_number, split_beam, BeamSegment};
pub use header::{key_time_label, TextBlock, TextLine};
pub use layout::{justify, split_rows, Row, RowBounds, Underline};
pub use lyrics::{hyphen_x, Extender, Hyphen};
pub use note_renderer::{CurveMark, LyricSegment, NoteRenderer, RendererKind, TupletMark};
pub use slurs::{Curve, CurveKind};
pub use verses::{justify_credit, wrap_text, PlacedWord, VerseBlock, VerseLayout};

// ═══════════════════════════════════════════════════════════════════════
// Options
// ═══════════════════════════════════════════════════════════════════════

/// Page geometry and font sizes. Every field falls back to its default
/// when missing from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub page_width: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub note_font_size: f64,
    pub lyric_font_size: f64,
    pub row_spacing: f64,
    /// Deadline for the web-font fetch
    pub font_timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            margin_left: PAGE_MARGIN_LEFT,
            margin_right: PAGE_MARGIN_RIGHT,
            margin_top: PAGE_MARGIN_TOP,
            margin_bottom: PAGE_MARGIN_BOTTOM,
            note_font_size: NOTE_FONT_SIZE,
            lyric_font_size: LYRIC_FONT_SIZE,
            row_spacing: ROW_SPACING,
            font_timeout_ms: 1500,
        }
    }
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configured width, or the default for a non-positive one.
    pub fn effective_page_width(&self) -> f64 {
        if self.page_width > 0.0 {
            self.page_width
        } else {
            DEFAULT_PAGE_WIDTH
        }
    }

    pub fn bounds(&self) -> RowBounds {
        RowBounds {
            left: self.margin_left,
            right: self.effective_page_width() - self.margin_right,
        }
    }

    pub fn font_timeout(&self) -> Duration {
        Duration::from_millis(self.font_timeout_ms)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Delegate
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Abort the render and return the error
    Stop,
    /// Carry on with blank metadata
    Ignore,
}

/// Hooks the caller (typically an HTTP adapter) uses to steer a render.
pub trait RenderDelegate {
    /// Called once every lookup has succeeded, just before the first write.
    fn on_before_start_write(&mut self) {}

    fn on_error(&mut self, _err: &RenderError) -> ErrorAction {
        ErrorAction::Stop
    }
}

/// Stops on every error and needs no notification.
#[derive(Debug, Default)]
pub struct DefaultDelegate;

impl RenderDelegate for DefaultDelegate {}

// ═══════════════════════════════════════════════════════════════════════
// Page layout
// ═══════════════════════════════════════════════════════════════════════

/// A fully positioned page, ready to be written.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub header: TextBlock,
    pub rows: Vec<Row>,
    pub verses: VerseLayout,
    pub footer: TextBlock,
    /// Verse numbers sung under the rows, in lyric-line order
    pub lyric_verses: Vec<u32>,
}

/// Compute the whole page for the first part of `score`.
pub fn layout_score(score: &Score, meta: &HymnMetadata, options: &RenderOptions) -> Result<PageLayout> {
    let part = score
        .parts
        .first()
        .ok_or_else(|| RenderError::MalformedInput("score has no parts".into()))?;

    let key = KeySignature::from_key(score.initial_key())?;
    let times = TimeSignatures::from_measures(&part.measures);
    let bounds = options.bounds();
    log::debug!(
        "laying out {} measure(s) in {} ({})",
        part.measures.len(),
        key.humanized(),
        key.mode()
    );

    let header = plan_header(meta, &key, times.first(), bounds, options.margin_top);
    let settings = RowSettings {
        bounds,
        note_font_size: options.note_font_size,
        lyric_font_size: options.lyric_font_size,
        row_spacing: options.row_spacing,
    };
    let music_top = options.margin_top + header.height;
    let rows = layout_rows(part, &key, &times, &settings, music_top)?;

    let music_bottom = rows.iter().map(|r| r.top + r.height).fold(music_top, f64::max);
    let verses = plan_verses(&meta.verses, bounds, music_bottom)?;
    let footer = plan_footer(&meta.copyright, bounds, music_bottom + verses.height);

    Ok(PageLayout {
        width: options.effective_page_width(),
        height: music_bottom + verses.height + footer.height + options.margin_bottom,
        header,
        lyric_verses: verse_numbers(&rows),
        rows,
        verses,
        footer,
    })
}

/// Write a planned page. `font_css` goes into the document's `<style>`.
pub fn write_page(canvas: &mut dyn Canvas, page: &PageLayout, font_css: &str, options: &RenderOptions) -> Result<()> {
    canvas.start(page.width, page.height)?;
    if !font_css.is_empty() {
        let out = canvas.writer();
        out.write_str("<style>\n")?;
        out.write_str(font_css)?;
        out.write_str("</style>\n")?;
    }

    draw_text_block(canvas, &page.header, "header")?;
    let style = EmitStyle {
        note_font_size: options.note_font_size,
        lyric_font_size: options.lyric_font_size,
    };
    for row in &page.rows {
        draw_row(canvas, row, &page.lyric_verses, &style)?;
    }
    draw_verses(canvas, &page.verses)?;
    draw_text_block(canvas, &page.footer, "footer")?;
    canvas.end()?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Renders hymns by number, pulling metadata and fonts from collaborators.
pub struct HymnRenderer<'a> {
    repository: &'a dyn MetadataRepository,
    fonts: &'a dyn FontProvider,
    options: RenderOptions,
}

impl<'a> HymnRenderer<'a> {
    pub fn new(repository: &'a dyn MetadataRepository, fonts: &'a dyn FontProvider, options: RenderOptions) -> Self {
        Self {
            repository,
            fonts,
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render hymn `number` whose music is `score`.
    ///
    /// Metadata failures are handed to `delegate`. On [`ErrorAction::Ignore`]
    /// a failed lookup draws the page with blank metadata and an
    /// undecodable verse is left out. Layout errors always abort.
    pub fn render(
        &self,
        number: u32,
        score: &Score,
        canvas: &mut dyn Canvas,
        delegate: &mut dyn RenderDelegate,
    ) -> Result<()> {
        let meta = self.resolve_metadata(number, delegate)?;
        let page = layout_score(score, &meta, &self.options)?;
        delegate.on_before_start_write();
        let css = fetch_font_css(self.fonts, self.options.font_timeout());
        write_page(canvas, &page, &css, &self.options)
    }

    /// Look up `number` and check its verses, consulting `delegate` on failure.
    fn resolve_metadata(&self, number: u32, delegate: &mut dyn RenderDelegate) -> Result<HymnMetadata> {
        let mut meta = match self.repository.hymn_metadata(number) {
            Ok(meta) => meta,
            Err(err) => match delegate.on_error(&err) {
                ErrorAction::Stop => {
                    log::debug!("render of hymn {number} stopped: {err}");
                    return Err(err);
                }
                ErrorAction::Ignore => {
                    log::warn!("rendering hymn {number} without metadata: {err}");
                    return Ok(HymnMetadata::blank(number));
                }
            },
        };

        let mut verses = Vec::with_capacity(meta.verses.len());
        for verse in std::mem::take(&mut meta.verses) {
            if let Err(err) = verse.lines() {
                match delegate.on_error(&err) {
                    ErrorAction::Stop => {
                        log::debug!("render of hymn {number} stopped: {err}");
                        return Err(err);
                    }
                    ErrorAction::Ignore => {
                        log::warn!("hymn {number}: skipping verse {}: {err}", verse.verse_number);
                        continue;
                    }
                }
            }
            verses.push(verse);
        }
        meta.verses = verses;
        Ok(meta)
    }
}

/// Render a parsed Score into a complete SVG string.
///
/// Credits come from the score itself and no web fonts are embedded.
pub fn render_score_to_svg(score: &Score, options: &RenderOptions) -> Result<String> {
    let meta = HymnMetadata::from_score(score);
    let page = layout_score(score, &meta, options)?;
    let mut canvas = SvgCanvas::new();
    let css = fetch_font_css(&NoFonts, options.font_timeout());
    write_page(&mut canvas, &page, &css, options)?;
    Ok(canvas.into_string())
}
