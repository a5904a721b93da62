//! Shared constants for the numbered-notation renderer (all in SVG user units).

// ── Page & margins ──────────────────────────────────────────────────
pub(crate) const DEFAULT_PAGE_WIDTH: f64 = 720.0;
pub(crate) const PAGE_MARGIN_LEFT: f64 = 30.0;
pub(crate) const PAGE_MARGIN_RIGHT: f64 = 30.0;
pub(crate) const PAGE_MARGIN_TOP: f64 = 30.0;
pub(crate) const PAGE_MARGIN_BOTTOM: f64 = 30.0;

// ── Header ──────────────────────────────────────────────────────────
pub(super) const TITLE_FONT_SIZE: f64 = 18.0;
pub(super) const HEADER_FONT_SIZE: f64 = 12.0;
pub(super) const HEADER_LINE_HEIGHT: f64 = 18.0;
pub(super) const HEADER_GAP: f64 = 14.0; // between header and first row

// ── Note glyphs ─────────────────────────────────────────────────────
pub(crate) const NOTE_FONT_SIZE: f64 = 16.0;
pub(super) const CAP_HEIGHT_RATIO: f64 = 0.75; // digit height over font size
pub(super) const NOTE_GLYPH_WIDTH: f64 = 10.0; // a digit at NOTE_FONT_SIZE
pub(super) const NOTE_GAP: f64 = 10.0; // minimum space between renderers
pub(super) const BREATH_WIDTH: f64 = 5.0;
pub(super) const STRIKE_WIDTH: f64 = 1.2;

// ── Octave dots & underlines ────────────────────────────────────────
pub(super) const OCTAVE_DOT_RADIUS: f64 = 1.5;
pub(super) const OCTAVE_DOT_SPACING: f64 = 4.0;
pub(super) const OCTAVE_DOT_GAP: f64 = 3.0; // between digit and first dot
pub(super) const CONTINUATION_DOT_RADIUS: f64 = 1.8;
pub(super) const UNDERLINE_OFFSET: f64 = 4.0; // below baseline
pub(super) const UNDERLINE_SPACING: f64 = 3.0;
pub(super) const UNDERLINE_WIDTH: f64 = 1.0;

// ── Barlines ────────────────────────────────────────────────────────
pub(super) const BARLINE_WIDTH: f64 = 1.0;
pub(super) const HEAVY_BARLINE_WIDTH: f64 = 3.0;
pub(super) const DOUBLE_BARLINE_WIDTH: f64 = 5.0; // light-light, light-heavy, ...
pub(super) const REPEAT_BARLINE_WIDTH: f64 = 9.0; // with the two dots

// ── Rows ────────────────────────────────────────────────────────────
pub(crate) const ROW_SPACING: f64 = 16.0; // between the last lyric line and the next row
pub(super) const ROW_TOP_PAD: f64 = 24.0; // above the digit baseline (slurs, dots)
pub(super) const MEASURE_TEXT_HEIGHT: f64 = 14.0;
pub(super) const UNDER_ROW_HEIGHT: f64 = 16.0; // underlines and low dots

// ── Lyrics ──────────────────────────────────────────────────────────
pub(crate) const LYRIC_FONT_SIZE: f64 = 16.0;
pub(super) const LYRIC_LINE_HEIGHT: f64 = 18.0;
pub(super) const LYRIC_PADDING: f64 = 2.0;
/// Lyric overhang allowed before the width is capped
pub(super) const LYRIC_UPPER_BOUND: f64 = 40.0;
pub(super) const LYRIC_CAP_SCALE: f64 = 0.75;
pub(super) const EXTENDER_WIDTH: f64 = 0.8;

// ── Slurs & ties ────────────────────────────────────────────────────
pub(super) const SLUR_LIFT: f64 = 4.0; // above the digit cap height
pub(super) const SLUR_INSET: f64 = 3.0;
pub(super) const SLUR_OCTAVE_INSET_SHRINK: f64 = 2.0;
pub(super) const SLUR_PULL_FACTOR: f64 = 0.12;
pub(super) const SLUR_MIN_PULL: f64 = 4.0;
pub(super) const SLUR_MAX_PULL: f64 = 12.0;
pub(super) const SLUR_STROKE: f64 = 1.0;

// ── Verses ──────────────────────────────────────────────────────────
pub(super) const VERSE_FONT_SIZE: f64 = 14.0;
pub(super) const VERSE_LINE_HEIGHT: f64 = 18.0;
pub(super) const VERSE_NUMBER_WIDTH: f64 = 20.0;
pub(super) const VERSE_BLOCK_GAP: f64 = 12.0;
pub(super) const VERSE_COLUMN_GAP: f64 = 20.0;
pub(super) const COMBINED_ARC_DEPTH: f64 = 4.0;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const NOTE_COLOR: &str = "#1a1a1a";
pub(super) const LYRICS_COLOR: &str = "#333333";
pub(super) const HEADER_COLOR: &str = "#1a1a1a";
pub(super) const BARLINE_COLOR: &str = "#333333";
