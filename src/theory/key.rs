//! Key signatures and the four supported modes.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::{Lazy, OnceCell};

use crate::error::{RenderError, Result};
use crate::model::{Accidental, Key, Note, Step};

use super::pitch::PitchName;

// ═══════════════════════════════════════════════════════════════════════
// Static tables
// ═══════════════════════════════════════════════════════════════════════

/// Order in which sharps are added by the circle of fifths.
const SHARP_ORDER: [Step; 7] = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E, Step::B];

/// Order in which flats are added.
const FLAT_ORDER: [Step; 7] = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C, Step::F];

const MAJOR_STEPS: [f64; 7] = [1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 0.5];
const MINOR_STEPS: [f64; 7] = [1.0, 0.5, 1.0, 1.0, 0.5, 1.0, 1.0];
const DORIAN_STEPS: [f64; 7] = [1.0, 0.5, 1.0, 1.0, 1.0, 0.5, 1.0];
const PHRYGIAN_STEPS: [f64; 7] = [0.5, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0];

fn root_table(entries: &[(i32, &str)]) -> HashMap<i32, PitchName> {
    entries
        .iter()
        .filter_map(|&(fifths, name)| PitchName::parse(name).map(|p| (fifths, p)))
        .collect()
}

static MAJOR_ROOTS: Lazy<HashMap<i32, PitchName>> = Lazy::new(|| {
    root_table(&[
        (-7, "Cb"),
        (-6, "Gb"),
        (-5, "Db"),
        (-4, "Ab"),
        (-3, "Eb"),
        (-2, "Bb"),
        (-1, "F"),
        (0, "C"),
        (1, "G"),
        (2, "D"),
        (3, "A"),
        (4, "E"),
        (5, "B"),
        (6, "F#"),
        (7, "C#"),
    ])
});

static MINOR_ROOTS: Lazy<HashMap<i32, PitchName>> = Lazy::new(|| {
    root_table(&[
        (-7, "Ab"),
        (-6, "Eb"),
        (-5, "Bb"),
        (-4, "F"),
        (-3, "C"),
        (-2, "G"),
        (-1, "D"),
        (0, "A"),
        (1, "E"),
        (2, "B"),
        (3, "F#"),
        (4, "C#"),
        (5, "G#"),
        (6, "D#"),
        (7, "A#"),
    ])
});

// Modal tunes in the hymnal only use these signatures.
static DORIAN_ROOTS: Lazy<HashMap<i32, PitchName>> =
    Lazy::new(|| root_table(&[(-2, "C"), (-1, "G"), (0, "D"), (1, "A"), (2, "E")]));

static PHRYGIAN_ROOTS: Lazy<HashMap<i32, PitchName>> =
    Lazy::new(|| root_table(&[(-2, "D"), (-1, "A"), (0, "E"), (1, "B")]));

// ═══════════════════════════════════════════════════════════════════════
// Mode
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
    Dorian,
    Phrygian,
}

impl Mode {
    /// Parse a MusicXML `<mode>`; anything unrecognised is major.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("minor") => Mode::Minor,
            Some("dorian") => Mode::Dorian,
            Some("phrygian") => Mode::Phrygian,
            _ => Mode::Major,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
        }
    }

    /// Solfège syllable sung on the tonic.
    fn tonic_syllable(self) -> &'static str {
        match self {
            Mode::Major => "do",
            Mode::Minor => "la",
            Mode::Dorian => "re",
            Mode::Phrygian => "mi",
        }
    }

    fn roots(self) -> &'static HashMap<i32, PitchName> {
        match self {
            Mode::Major => &MAJOR_ROOTS,
            Mode::Minor => &MINOR_ROOTS,
            Mode::Dorian => &DORIAN_ROOTS,
            Mode::Phrygian => &PHRYGIAN_ROOTS,
        }
    }

    fn steps(self) -> [f64; 7] {
        match self {
            Mode::Major => MAJOR_STEPS,
            Mode::Minor => MINOR_STEPS,
            Mode::Dorian => DORIAN_STEPS,
            Mode::Phrygian => PHRYGIAN_STEPS,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// KeySignature
// ═══════════════════════════════════════════════════════════════════════

/// The key of a piece, resolved once and shared read-only by the layout.
#[derive(Debug, Clone)]
pub struct KeySignature {
    fifths: i32,
    mode: Mode,
    root: PitchName,
    humanized: OnceCell<String>,
}

impl KeySignature {
    /// Resolve the tonic for `fifths` in `mode`.
    ///
    /// Fails with [`RenderError::LookupMiss`] when the combination is absent
    /// from the root tables (e.g. phrygian with three sharps).
    pub fn new(fifths: i32, mode: Mode) -> Result<Self> {
        let root = mode
            .roots()
            .get(&fifths)
            .copied()
            .ok_or_else(|| RenderError::LookupMiss {
                table: "root",
                fifths,
                mode: mode.name().to_string(),
            })?;
        Ok(Self {
            fifths,
            mode,
            root,
            humanized: OnceCell::new(),
        })
    }

    /// Build from the score's `<key>` element; C major when there is none.
    pub fn from_key(key: Option<&Key>) -> Result<Self> {
        match key {
            Some(k) => Self::new(k.fifths, Mode::parse(k.mode.as_deref())),
            None => Self::new(0, Mode::Major),
        }
    }

    pub fn fifths(&self) -> i32 {
        self.fifths
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn root(&self) -> PitchName {
        self.root
    }

    pub fn is_c_major(&self) -> bool {
        self.fifths == 0 && self.mode == Mode::Major
    }

    /// Whole/half step sizes starting at the tonic.
    pub fn scale_steps(&self) -> [f64; 7] {
        self.mode.steps()
    }

    /// Header label such as `"do = d"` or `"la = f♯"`.
    pub fn humanized(&self) -> &str {
        self.humanized.get_or_init(|| {
            format!(
                "{} = {}{}",
                self.mode.tonic_syllable(),
                self.root.step.letter(),
                self.root.accidental.symbol()
            )
        })
    }

    /// Accidental the signature implies for `step`, if any.
    pub fn implied_accidental(&self, step: Step) -> Option<Accidental> {
        let count = self.fifths.unsigned_abs().min(7) as usize;
        if self.fifths > 0 && SHARP_ORDER[..count].contains(&step) {
            Some(Accidental::Sharp)
        } else if self.fifths < 0 && FLAT_ORDER[..count].contains(&step) {
            Some(Accidental::Flat)
        } else {
            None
        }
    }

    /// Spelled pitch of `note`.
    ///
    /// `<alter>` is the sounding pitch and wins when present, so accidentals
    /// carried through a measure survive. Without it the written accidental
    /// overrides the key's implied one.
    pub fn pitch_with_accidental(&self, note: &Note) -> Option<PitchName> {
        let pitch = note.pitch.as_ref()?;
        let accidental = pitch
            .alter
            .and_then(Accidental::from_alter)
            .or(note.accidental)
            .or_else(|| self.implied_accidental(pitch.step))
            .unwrap_or(Accidental::Natural);
        Some(PitchName::new(pitch.step, accidental))
    }
}

impl PartialEq for KeySignature {
    fn eq(&self, other: &Self) -> bool {
        self.fifths == other.fifths && self.mode == other.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pitch;
    use crate::theory::pitch::convert_pitch_to_numbered;

    fn note(step: Step, accidental: Option<Accidental>) -> Note {
        Note {
            pitch: Some(Pitch { step, octave: 4, alter: None }),
            accidental,
            ..Default::default()
        }
    }

    fn supported() -> Vec<KeySignature> {
        let mut keys = Vec::new();
        for mode in [Mode::Major, Mode::Minor, Mode::Dorian, Mode::Phrygian] {
            for fifths in -7..=7 {
                if let Ok(k) = KeySignature::new(fifths, mode) {
                    keys.push(k);
                }
            }
        }
        keys
    }

    #[test]
    fn roots_follow_the_circle_of_fifths() {
        let key = KeySignature::new(2, Mode::Major).unwrap();
        assert_eq!(key.root().to_string(), "d");
        let key = KeySignature::new(-3, Mode::Minor).unwrap();
        assert_eq!(key.root().to_string(), "c");
        let key = KeySignature::new(3, Mode::Minor).unwrap();
        assert_eq!(key.root().to_string(), "f♯");
        let key = KeySignature::new(0, Mode::Dorian).unwrap();
        assert_eq!(key.root().to_string(), "d");
    }

    #[test]
    fn missing_modal_entry_is_a_lookup_miss() {
        let err = KeySignature::new(3, Mode::Phrygian).unwrap_err();
        assert!(matches!(
            err,
            RenderError::LookupMiss { fifths: 3, ref mode, .. } if mode == "phrygian"
        ));
        assert!(KeySignature::new(-4, Mode::Dorian).is_err());
        assert!(KeySignature::new(8, Mode::Major).is_err());
    }

    #[test]
    fn unknown_mode_defaults_to_major() {
        assert_eq!(Mode::parse(None), Mode::Major);
        assert_eq!(Mode::parse(Some("ionian-ish")), Mode::Major);
        assert_eq!(Mode::parse(Some("Minor")), Mode::Minor);
    }

    #[test]
    fn humanized_label() {
        assert_eq!(KeySignature::new(2, Mode::Major).unwrap().humanized(), "do = d");
        assert_eq!(KeySignature::new(-2, Mode::Major).unwrap().humanized(), "do = b♭");
        assert_eq!(KeySignature::new(0, Mode::Minor).unwrap().humanized(), "la = a");
        assert_eq!(KeySignature::new(1, Mode::Phrygian).unwrap().humanized(), "mi = b");
    }

    #[test]
    fn scale_steps_span_an_octave() {
        for key in supported() {
            let total: f64 = key.scale_steps().iter().sum();
            assert_eq!(total, 6.0, "{} {}", key.fifths(), key.mode());
        }
    }

    #[test]
    fn explicit_accidental_overrides_the_key() {
        let key = KeySignature::new(2, Mode::Major).unwrap();
        let implied = key.pitch_with_accidental(&note(Step::F, None)).unwrap();
        assert_eq!(implied, PitchName::new(Step::F, Accidental::Sharp));

        let natural = key
            .pitch_with_accidental(&note(Step::F, Some(Accidental::Natural)))
            .unwrap();
        assert_eq!(natural, PitchName::natural(Step::F));

        let flat_key = KeySignature::new(-1, Mode::Major).unwrap();
        let b = flat_key.pitch_with_accidental(&note(Step::B, None)).unwrap();
        assert_eq!(b, PitchName::new(Step::B, Accidental::Flat));
        assert!(flat_key.pitch_with_accidental(&Note::default()).is_none());
    }

    #[test]
    fn alter_carries_the_accidental_through_the_measure() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let mut carried = note(Step::F, None);
        carried.pitch = Some(Pitch { step: Step::F, octave: 4, alter: Some(1.0) });
        let name = key.pitch_with_accidental(&carried).unwrap();
        assert_eq!(name, PitchName::new(Step::F, Accidental::Sharp));
        assert_eq!(convert_pitch_to_numbered(&key, name), (5, true));

        // alter 0 cancels the key's sharp even without a written natural
        let d_major = KeySignature::new(2, Mode::Major).unwrap();
        let mut cancelled = note(Step::C, None);
        cancelled.pitch = Some(Pitch { step: Step::C, octave: 5, alter: Some(0.0) });
        assert_eq!(d_major.pitch_with_accidental(&cancelled).unwrap(), PitchName::natural(Step::C));

        let mut flat = note(Step::B, Some(Accidental::Flat));
        flat.pitch = Some(Pitch { step: Step::B, octave: 4, alter: Some(-1.0) });
        assert_eq!(key.pitch_with_accidental(&flat).unwrap(), PitchName::new(Step::B, Accidental::Flat));
    }

    /// Every diatonic pitch of every supported key maps to an unaltered
    /// degree, and the pitch a half step below it (when chromatic) is
    /// altered with the same degree.
    #[test]
    fn diatonic_round_trip_for_every_key() {
        for key in supported() {
            let mut degrees = Vec::new();
            let mut offset = 0.0;
            let mut current = key.root().pitch_class();
            for (i, step) in key.scale_steps().iter().enumerate() {
                let letter = Step::from_index(key.root().step.index() + i as i32);
                let name = spell(letter, current);
                let (degree, altered) = convert_pitch_to_numbered(&key, name);
                assert!(!altered, "{name} altered in {} {}", key.fifths(), key.mode());
                assert_eq!(degree as usize, i + 1, "{name} in {} {}", key.fifths(), key.mode());
                degrees.push(current);
                offset += step;
                current = (key.root().pitch_class() + (offset * 2.0) as i32).rem_euclid(12);
            }

            for (i, pc) in degrees.iter().enumerate() {
                let below = (pc - 1).rem_euclid(12);
                if degrees.contains(&below) {
                    continue;
                }
                let letter = Step::from_index(key.root().step.index() + i as i32);
                let name = spell(letter, below);
                let (degree, altered) = convert_pitch_to_numbered(&key, name);
                assert!(altered, "{name} not altered in {} {}", key.fifths(), key.mode());
                assert_eq!(degree as usize, i + 1);
            }
        }
    }

    fn spell(letter: Step, pitch_class: i32) -> PitchName {
        let diff = (pitch_class - letter.semitone() + 6).rem_euclid(12) - 6;
        let accidental = match diff {
            -2 => Accidental::DoubleFlat,
            -1 => Accidental::Flat,
            0 => Accidental::Natural,
            1 => Accidental::Sharp,
            _ => Accidental::DoubleSharp,
        };
        PitchName::new(letter, accidental)
    }
}
