//! The laid-out unit of numbered notation.
//!
//! Every glyph on a row (a digit, a rest, a continuation dot, a breath mark
//! or a barline) is one [`NoteRenderer`]. A row owns its renderers in a
//! `Vec` and every pass refers to them by index.

use std::collections::BTreeMap;

use crate::model::{BarStyle, Barline, BeamState, MeasureText, RepeatDirection, Syllabic};

use super::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Note,
    Rest,
    /// Continuation dot extending the previous note
    Dot,
    Breath,
    Barline,
}

/// A lyric syllable under a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricSegment {
    pub verse: u32,
    pub text: String,
    pub syllabic: Syllabic,
    pub extend: bool,
}

/// Start/stop flags for a slur number or the tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurveMark {
    pub start: bool,
    pub stop: bool,
}

/// Tuplet bracket information carried by the first and last note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupletMark {
    pub start: bool,
    pub stop: bool,
    pub count: i32,
}

#[derive(Debug, Clone, Default)]
pub struct NoteRenderer {
    pub kind: RendererKind,
    /// Scale degree 1..=7, 0 for rests and non-note glyphs
    pub degree: u8,
    /// Dots above (positive) or below (negative)
    pub octave: i32,
    /// Chromatically altered from the diatonic pitch
    pub strikethrough: bool,
    pub x: f64,
    /// Digit baseline
    pub y: f64,
    /// Horizontal space reserved for this glyph and its lyrics
    pub width: f64,
    /// Continuation glyph produced by duration decomposition
    pub is_dotted: bool,
    /// Underline count
    pub level: u8,
    pub lyrics: Vec<LyricSegment>,
    pub slurs: BTreeMap<i32, CurveMark>,
    pub tie: CurveMark,
    /// Underline state per beam number
    pub beams: BTreeMap<u8, BeamState>,
    pub barline: Option<Barline>,
    pub width_from_lyric: bool,
    /// The row breaks after this renderer
    pub new_line: bool,
    pub measure: i32,
    /// Position within the row, set by the layout pass
    pub index: usize,
    /// Beats from the start of the measure
    pub beat_offset: f64,
    pub tuplet: Option<TupletMark>,
    pub texts: Vec<MeasureText>,
    /// Digit font size; sets the glyph width and cap height
    pub font_size: f64,
}

impl NoteRenderer {
    pub fn note(degree: u8, octave: i32, strikethrough: bool) -> Self {
        Self {
            kind: RendererKind::Note,
            degree,
            octave,
            strikethrough,
            width: NOTE_GLYPH_WIDTH,
            font_size: NOTE_FONT_SIZE,
            ..Default::default()
        }
    }

    pub fn rest() -> Self {
        Self {
            kind: RendererKind::Rest,
            width: NOTE_GLYPH_WIDTH,
            font_size: NOTE_FONT_SIZE,
            ..Default::default()
        }
    }

    /// Continuation dot; takes no width until repositioned.
    pub fn dot(level: u8) -> Self {
        Self {
            kind: RendererKind::Dot,
            is_dotted: true,
            level,
            ..Default::default()
        }
    }

    pub fn breath() -> Self {
        Self {
            kind: RendererKind::Breath,
            width: BREATH_WIDTH,
            ..Default::default()
        }
    }

    pub fn barline(barline: Barline) -> Self {
        Self {
            kind: RendererKind::Barline,
            width: barline_width(&barline),
            barline: Some(barline),
            ..Default::default()
        }
    }

    /// Resize a digit or rest for `font_size`.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        if self.is_glyph() {
            self.width = self.glyph_width();
        }
        self
    }

    /// Width of a digit at this renderer's font size.
    pub fn glyph_width(&self) -> f64 {
        NOTE_GLYPH_WIDTH * self.font_size / NOTE_FONT_SIZE
    }

    /// Height of a digit above its baseline.
    pub fn cap_height(&self) -> f64 {
        self.font_size * CAP_HEIGHT_RATIO
    }

    pub fn is_barline(&self) -> bool {
        self.kind == RendererKind::Barline
    }

    pub fn is_regular_barline(&self) -> bool {
        self.barline
            .map_or(false, |b| b.style == BarStyle::Regular && b.repeat.is_none())
    }

    /// Digit or rest: something a lyric, slur or beam can attach to.
    pub fn is_glyph(&self) -> bool {
        matches!(self.kind, RendererKind::Note | RendererKind::Rest)
    }

    /// Width of the glyph itself, ignoring lyrics.
    pub fn intrinsic_width(&self) -> f64 {
        match self.kind {
            RendererKind::Note | RendererKind::Rest => self.glyph_width(),
            RendererKind::Dot => 0.0,
            RendererKind::Breath => BREATH_WIDTH,
            RendererKind::Barline => self.barline.as_ref().map_or(0.0, barline_width),
        }
    }

    pub fn lyric(&self, verse: u32) -> Option<&LyricSegment> {
        self.lyrics.iter().find(|l| l.verse == verse)
    }

    pub fn beam(&self, number: u8) -> Option<BeamState> {
        self.beams.get(&number).copied()
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Text drawn for a digit or rest.
    pub fn label(&self) -> String {
        match self.kind {
            RendererKind::Rest => "0".to_string(),
            RendererKind::Note => self.degree.to_string(),
            _ => String::new(),
        }
    }
}

/// Layout width of a barline. Plain barlines take none so that a row can
/// end exactly on the margin.
pub fn barline_width(barline: &Barline) -> f64 {
    if barline.repeat.is_some() {
        return REPEAT_BARLINE_WIDTH;
    }
    match barline.style {
        BarStyle::Regular | BarStyle::Dotted | BarStyle::Dashed | BarStyle::None => 0.0,
        BarStyle::Heavy => HEAVY_BARLINE_WIDTH,
        BarStyle::LightLight | BarStyle::LightHeavy | BarStyle::HeavyLight | BarStyle::HeavyHeavy => {
            DOUBLE_BARLINE_WIDTH
        }
    }
}

/// Barline drawn before a measure's first note, if any.
pub fn leading_barline(barline: Option<&Barline>) -> Option<Barline> {
    barline
        .copied()
        .filter(|b| b.repeat == Some(RepeatDirection::Forward) || b.style != BarStyle::Regular)
}
