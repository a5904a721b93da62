//! Data model for a parsed MusicXML score.
//!
//! These structures capture the musical information the numbered-notation
//! renderer consumes: pitches, durations, lyrics, slurs, ties, beams,
//! barlines and key/time signatures. A single melodic voice per part is
//! assumed.

use serde::{Deserialize, Serialize};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// Lyricist name
    pub lyricist: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Software that created the file
    pub software: Option<String>,
    /// Musical parts; only the first one is rendered
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Soprano")
    pub name: String,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number
    pub number: i32,
    /// Whether this is an implicit measure (pickup/anacrusis)
    pub implicit: bool,
    /// Attributes (key, time), present only when they change
    pub attributes: Option<Attributes>,
    /// Notes and rests in this measure
    pub notes: Vec<Note>,
    /// Left and/or right barline
    pub barlines: Vec<Barline>,
    /// The system (row) ends after this measure
    pub line_break: bool,
}

/// Musical attributes that may change at the start of a measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Divisions per quarter note
    pub divisions: Option<i32>,
    pub key: Option<Key>,
    pub time: Option<TimeSignature>,
}

/// Key signature as written in the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
    /// Mode (e.g., "major", "minor")
    pub mode: Option<String>,
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats: 4, beat_type: 4 }
    }
}

/// A single note or rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    /// Pitch (None if this is a rest)
    pub pitch: Option<Pitch>,
    /// Whether this is a rest
    pub rest: bool,
    /// Whole-measure rest (`<rest measure="yes"/>` or a rest without a type)
    pub measure_rest: bool,
    /// Part of a chord with the previous note (not rendered)
    pub chord: bool,
    /// Grace note (not rendered)
    pub grace: bool,
    /// Duration in divisions
    pub duration: i32,
    pub note_type: Option<NoteType>,
    /// Number of augmentation dots
    pub dots: u8,
    /// Explicitly written accidental
    pub accidental: Option<Accidental>,
    pub beams: Vec<Beam>,
    pub tie_start: bool,
    pub tie_stop: bool,
    pub slurs: Vec<SlurEvent>,
    pub lyrics: Vec<Lyric>,
    pub tuplet: Option<TupletEvent>,
    pub time_modification: Option<TimeModification>,
    pub breath_mark: bool,
    /// Words directions that precede this note
    pub texts: Vec<MeasureText>,
    /// The row breaks after this note
    pub new_line: bool,
}

/// Pitch of a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration: -1.0 = flat, 1.0 = sharp
    pub alter: Option<f64>,
}

/// Diatonic letter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "C" | "c" => Some(Step::C),
            "D" | "d" => Some(Step::D),
            "E" | "e" => Some(Step::E),
            "F" | "f" => Some(Step::F),
            "G" | "g" => Some(Step::G),
            "A" | "a" => Some(Step::A),
            "B" | "b" => Some(Step::B),
            _ => None,
        }
    }

    /// Position within C D E F G A B.
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn from_index(i: i32) -> Self {
        Self::ALL[i.rem_euclid(7) as usize]
    }

    /// Semitones above C.
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Step::C => 'c',
            Step::D => 'd',
            Step::E => 'e',
            Step::F => 'f',
            Step::G => 'g',
            Step::A => 'a',
            Step::B => 'b',
        }
    }
}

/// Accidental sign (written or implied by the key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Parse a MusicXML `<accidental>` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "flat-flat" | "double-flat" => Some(Accidental::DoubleFlat),
            "flat" => Some(Accidental::Flat),
            "natural" => Some(Accidental::Natural),
            "sharp" => Some(Accidental::Sharp),
            "double-sharp" | "sharp-sharp" => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// Accidental for a `<alter>` value; microtones round to the nearest
    /// semitone and anything beyond a double accidental is rejected.
    pub fn from_alter(alter: f64) -> Option<Self> {
        match alter.round() as i32 {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// Semitone offset.
    pub fn offset(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "♭♭",
            Accidental::Flat => "♭",
            Accidental::Natural => "",
            Accidental::Sharp => "♯",
            Accidental::DoubleSharp => "♯♯",
        }
    }
}

/// Written note type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteType {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneTwentyEighth,
    TwoFiftySixth,
}

impl NoteType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "whole" => Some(NoteType::Whole),
            "half" => Some(NoteType::Half),
            "quarter" => Some(NoteType::Quarter),
            "eighth" => Some(NoteType::Eighth),
            "16th" => Some(NoteType::Sixteenth),
            "32nd" => Some(NoteType::ThirtySecond),
            "64th" => Some(NoteType::SixtyFourth),
            "128th" => Some(NoteType::OneTwentyEighth),
            "256th" => Some(NoteType::TwoFiftySixth),
            _ => None,
        }
    }

    /// Length in quarter notes.
    pub fn quarters(self) -> f64 {
        match self {
            NoteType::Whole => 4.0,
            NoteType::Half => 2.0,
            NoteType::Quarter => 1.0,
            NoteType::Eighth => 0.5,
            NoteType::Sixteenth => 0.25,
            NoteType::ThirtySecond => 0.125,
            NoteType::SixtyFourth => 0.0625,
            NoteType::OneTwentyEighth => 0.031_25,
            NoteType::TwoFiftySixth => 0.015_625,
        }
    }
}

/// Beam grouping information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beam {
    /// Beam level (1 = eighth-note beam, 2 = sixteenth-note beam, etc.)
    pub number: u8,
    pub state: BeamState,
}

/// Beam state at one beam level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamState {
    Begin,
    Continue,
    End,
    ForwardHook,
    BackwardHook,
    /// A beam under a single glyph
    Single,
}

impl BeamState {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "begin" => Some(BeamState::Begin),
            "continue" => Some(BeamState::Continue),
            "end" => Some(BeamState::End),
            "forward hook" => Some(BeamState::ForwardHook),
            "backward hook" => Some(BeamState::BackwardHook),
            _ => None,
        }
    }
}

/// A slur start or stop on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlurEvent {
    pub kind: StartStop,
    /// Slur number (distinguishes overlapping slurs)
    pub number: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartStop {
    Start,
    Stop,
}

/// A lyric syllable attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lyric {
    /// Verse number (1-based)
    pub number: u32,
    pub text: String,
    pub syllabic: Syllabic,
    /// Melisma underline continues after this syllable
    pub extend: bool,
}

/// Position of a syllable within its word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Syllabic {
    #[default]
    Single,
    Begin,
    Middle,
    End,
}

impl Syllabic {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "begin" => Syllabic::Begin,
            "middle" => Syllabic::Middle,
            "end" => Syllabic::End,
            _ => Syllabic::Single,
        }
    }

    /// A hyphen follows this syllable.
    pub fn continues(self) -> bool {
        matches!(self, Syllabic::Begin | Syllabic::Middle)
    }

    /// This syllable continues a word started earlier.
    pub fn is_continuation(self) -> bool {
        matches!(self, Syllabic::Middle | Syllabic::End)
    }
}

/// Tuplet bracket start/stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupletEvent {
    pub kind: StartStop,
}

/// `<time-modification>`: `actual` notes in the time of `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeModification {
    pub actual: i32,
    pub normal: i32,
}

/// Free text attached to the following note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureText {
    pub text: String,
    /// Vertical offset in tenths (positive = higher)
    pub default_y: Option<f64>,
    pub align: TextAlign,
    pub italic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }

    /// SVG `text-anchor` value.
    pub fn anchor(self) -> &'static str {
        match self {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        }
    }
}

/// A barline (may include repeat signs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barline {
    pub location: BarlineLocation,
    pub style: BarStyle,
    pub repeat: Option<RepeatDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarlineLocation {
    Left,
    Right,
}

/// Visual style of a barline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarStyle {
    #[default]
    Regular,
    Dotted,
    Dashed,
    Heavy,
    LightLight,
    LightHeavy,
    HeavyLight,
    HeavyHeavy,
    None,
}

impl BarStyle {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "dotted" => BarStyle::Dotted,
            "dashed" => BarStyle::Dashed,
            "heavy" => BarStyle::Heavy,
            "light-light" => BarStyle::LightLight,
            "light-heavy" => BarStyle::LightHeavy,
            "heavy-light" => BarStyle::HeavyLight,
            "heavy-heavy" => BarStyle::HeavyHeavy,
            "none" => BarStyle::None,
            _ => BarStyle::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatDirection {
    Forward,
    Backward,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of measures in the first part.
    pub fn measure_count(&self) -> usize {
        self.parts.first().map_or(0, |p| p.measures.len())
    }

    /// The key written in the first measure that carries one.
    pub fn initial_key(&self) -> Option<&Key> {
        self.parts
            .first()?
            .measures
            .iter()
            .find_map(|m| m.attributes.as_ref().and_then(|a| a.key.as_ref()))
    }
}

impl Measure {
    pub fn right_barline(&self) -> Option<&Barline> {
        self.barlines
            .iter()
            .find(|b| b.location == BarlineLocation::Right)
    }

    pub fn left_barline(&self) -> Option<&Barline> {
        self.barlines
            .iter()
            .find(|b| b.location == BarlineLocation::Left)
    }

    /// Notes that produce glyphs (chord members and grace notes are skipped).
    pub fn melody(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| !n.chord && !n.grace)
    }
}
