//! Movable-do pitch transposition.
//!
//! Pitches are spelled as a letter plus accidental ([`PitchName`]); equality
//! is enharmonic, and stepping by half tones goes through a fixed successor
//! table so that any spelling (double flats included) lands on the same
//! chromatic ladder.

use std::fmt;

use crate::model::{Accidental, Pitch, Step};

use super::key::KeySignature;

/// A letter name with its (possibly implied) accidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchName {
    pub step: Step,
    pub accidental: Accidental,
}

/// Chromatic successor table: the spelling reached one half step above each
/// pitch class.
const HALF_STEP_LADDER: [PitchName; 12] = [
    PitchName::new(Step::C, Accidental::Natural),
    PitchName::new(Step::C, Accidental::Sharp),
    PitchName::new(Step::D, Accidental::Natural),
    PitchName::new(Step::D, Accidental::Sharp),
    PitchName::new(Step::E, Accidental::Natural),
    PitchName::new(Step::F, Accidental::Natural),
    PitchName::new(Step::F, Accidental::Sharp),
    PitchName::new(Step::G, Accidental::Natural),
    PitchName::new(Step::G, Accidental::Sharp),
    PitchName::new(Step::A, Accidental::Natural),
    PitchName::new(Step::A, Accidental::Sharp),
    PitchName::new(Step::B, Accidental::Natural),
];

impl PitchName {
    pub const fn new(step: Step, accidental: Accidental) -> Self {
        Self { step, accidental }
    }

    pub const fn natural(step: Step) -> Self {
        Self::new(step, Accidental::Natural)
    }

    /// Parse spellings such as `"C#"`, `"Db"`, `"Bbb"`, `"F##"` or `"E"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let step = Step::parse(&chars.next()?.to_string())?;
        let accidental = match chars.as_str() {
            "" => Accidental::Natural,
            "#" | "♯" => Accidental::Sharp,
            "##" | "x" | "♯♯" => Accidental::DoubleSharp,
            "b" | "♭" => Accidental::Flat,
            "bb" | "♭♭" => Accidental::DoubleFlat,
            _ => return None,
        };
        Some(Self::new(step, accidental))
    }

    /// Pitch class 0..12 with C = 0.
    pub fn pitch_class(self) -> i32 {
        (self.step.semitone() + self.accidental.offset()).rem_euclid(12)
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.step.letter(), self.accidental.symbol())
    }
}

/// Enharmonic equality (`C#` == `Db`).
pub fn is_pitch_equal(a: PitchName, b: PitchName) -> bool {
    a.pitch_class() == b.pitch_class()
}

/// The pitch one half step above `p`.
pub fn next_half_step(p: PitchName) -> PitchName {
    HALF_STEP_LADDER[((p.pitch_class() + 1) % 12) as usize]
}

/// Number of half steps going up from `from` until `to` is reached (0..12).
pub fn half_steps_between(from: PitchName, to: PitchName) -> u32 {
    let mut current = from;
    let mut steps = 0;
    while !is_pitch_equal(current, to) && steps < 12 {
        current = next_half_step(current);
        steps += 1;
    }
    steps
}

/// Convert a spelled pitch to its movable-do degree (1..=7).
///
/// The second value is true when the pitch is not diatonic in the key; the
/// degree then names the scale step just above it and is drawn struck
/// through.
pub fn convert_pitch_to_numbered(key: &KeySignature, pitch: PitchName) -> (u8, bool) {
    let half_steps = half_steps_between(key.root(), pitch);
    let target = f64::from(half_steps) / 2.0;

    let mut accumulated = 0.0;
    let mut degree: u8 = 1;
    for step in key.scale_steps() {
        if accumulated >= target {
            break;
        }
        accumulated += step;
        degree += 1;
    }

    let altered = accumulated > target;
    ((degree - 1) % 7 + 1, altered)
}

/// Circular letter comparison against the tonic: `0` when equal, `1` when
/// `pitch` lies one to three letters above `tonic`, `-1` when it lies one to
/// three letters below.
pub fn compare_pitch(pitch: Step, tonic: Step) -> i32 {
    match (pitch.index() - tonic.index()).rem_euclid(7) {
        0 => 0,
        1..=3 => 1,
        _ => -1,
    }
}

/// Octave dots for `pitch`: positive above the digit, negative below.
///
/// A pitch belongs to the octave of the nearest tonic letter; C major keeps
/// the plain MusicXML octave split at C.
pub fn octave_offset(key: &KeySignature, pitch: &Pitch) -> i32 {
    if key.is_c_major() {
        return pitch.octave - 4;
    }

    let tonic = key.root().step;
    let tonic_octave = match compare_pitch(pitch.step, tonic) {
        0 => pitch.octave,
        1 if tonic.index() <= pitch.step.index() => pitch.octave,
        1 => pitch.octave - 1,
        _ if tonic.index() >= pitch.step.index() => pitch.octave,
        _ => pitch.octave + 1,
    };
    tonic_octave - 4
}
