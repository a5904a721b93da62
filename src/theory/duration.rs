//! Beat lengths and their decomposition into numbered-notation glyphs.
//!
//! Numbered notation has a glyph for one beat and its halvings (underlined
//! once, twice, ...). Anything longer is written as the anchor digit
//! followed by continuation dots, each worth one beat; leftover fractions
//! become further underlined dots.

use crate::model::{Note, NoteType};

use super::time::TimeSignatures;

/// Smallest representable fraction of a beat (a 64th under x/4).
const MAX_LEVEL: u8 = 4;

const EPSILON: f64 = 1e-6;

/// One displayable glyph of a decomposed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthUnit {
    /// Underline count: 0 for a full beat, 1 for half a beat, ...
    pub level: u8,
    /// Continuation glyph (a dot, or a repeated `0` for rests)
    pub is_dotted: bool,
}

impl LengthUnit {
    /// Beats covered by this glyph.
    pub fn beats(self) -> f64 {
        0.5f64.powi(i32::from(self.level))
    }
}

/// Length of `note` in beats at `measure`.
///
/// The written type gives the base (quarter = 1), doubled under x/8; dots
/// add `base * (1 - 0.5^n)` and a time modification scales by
/// `normal / actual`. Measure rests fill the measure.
pub fn note_length(times: &TimeSignatures, measure: i32, note: &Note) -> f64 {
    if note.rest && (note.measure_rest || note.note_type.is_none()) {
        return times.measure_beats(measure);
    }

    let Some(note_type) = note.note_type else {
        log::debug!("note without a type in measure {measure}; assuming one beat");
        return 1.0;
    };

    let mut base = note_type.quarters();
    if times.at(measure).beat_type == 8 {
        base *= 2.0;
    }
    let mut length = base + base * (1.0 - 0.5f64.powi(i32::from(note.dots)));

    if let Some(tm) = note.time_modification {
        if tm.actual > 0 {
            length *= f64::from(tm.normal) / f64::from(tm.actual);
        }
    }
    length
}

/// Underline level of a written type (eighth = 1 under x/4).
pub fn type_level(note_type: NoteType, beat_type: i32) -> u8 {
    let mut beats = note_type.quarters();
    if beat_type == 8 {
        beats *= 2.0;
    }
    let mut level = 0;
    while beats < 1.0 - EPSILON && level < MAX_LEVEL {
        beats *= 2.0;
        level += 1;
    }
    level
}

/// Split `beats` into the anchor glyph plus continuation glyphs.
///
/// Whole beats come first (one glyph each), then halving fractions:
/// 1.5 gives a beat and a half-beat dot, 0.75 an eighth and a 16th dot.
pub fn render_length_note(beats: f64) -> Vec<LengthUnit> {
    let mut levels = Vec::new();

    let whole = (beats + EPSILON).floor();
    for _ in 0..(whole as usize) {
        levels.push(0);
    }

    let mut remaining = beats - whole;
    let mut level = 1;
    while remaining > EPSILON && level <= MAX_LEVEL {
        let size = 0.5f64.powi(i32::from(level));
        if remaining + EPSILON >= size {
            levels.push(level);
            remaining -= size;
        }
        level += 1;
    }

    if levels.is_empty() {
        levels.push(MAX_LEVEL);
    }

    levels
        .into_iter()
        .enumerate()
        .map(|(i, level)| LengthUnit {
            level,
            is_dotted: i > 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TimeModification, TimeSignature};

    fn note(note_type: NoteType, dots: u8) -> Note {
        Note {
            note_type: Some(note_type),
            dots,
            ..Default::default()
        }
    }

    fn units(beats: f64) -> Vec<(u8, bool)> {
        render_length_note(beats)
            .into_iter()
            .map(|u| (u.level, u.is_dotted))
            .collect()
    }

    #[test]
    fn dotted_lengths() {
        let times = TimeSignatures::new();
        assert_eq!(note_length(&times, 1, &note(NoteType::Whole, 4)), 7.75);
        assert_eq!(note_length(&times, 1, &note(NoteType::Quarter, 2)), 1.75);
        assert_eq!(note_length(&times, 1, &note(NoteType::Half, 1)), 3.0);
        assert_eq!(note_length(&times, 1, &note(NoteType::Eighth, 0)), 0.5);
    }

    #[test]
    fn compound_time_doubles_the_base() {
        let mut times = TimeSignatures::new();
        times.push(1, TimeSignature { beats: 6, beat_type: 8 });
        assert_eq!(note_length(&times, 1, &note(NoteType::Eighth, 0)), 1.0);
        assert_eq!(note_length(&times, 1, &note(NoteType::Quarter, 1)), 3.0);
    }

    #[test]
    fn triplets_scale_by_normal_over_actual() {
        let times = TimeSignatures::new();
        let mut n = note(NoteType::Eighth, 0);
        n.time_modification = Some(TimeModification { actual: 3, normal: 2 });
        assert!((note_length(&times, 1, &n) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn measure_rest_fills_the_bar() {
        let mut times = TimeSignatures::new();
        times.push(1, TimeSignature { beats: 3, beat_type: 4 });
        let rest = Note {
            rest: true,
            measure_rest: true,
            ..Default::default()
        };
        assert_eq!(note_length(&times, 2, &rest), 3.0);
    }

    #[test]
    fn decomposition() {
        assert_eq!(units(1.0), vec![(0, false)]);
        assert_eq!(units(0.5), vec![(1, false)]);
        assert_eq!(units(1.5), vec![(0, false), (1, true)]);
        assert_eq!(units(2.5), vec![(0, false), (0, true), (1, true)]);
        assert_eq!(units(0.75), vec![(1, false), (2, true)]);
        assert_eq!(units(4.0), vec![(0, false), (0, true), (0, true), (0, true)]);
        assert_eq!(units(1.75), vec![(0, false), (1, true), (2, true)]);
    }

    #[test]
    fn decomposition_preserves_length() {
        for beats in [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0, 3.5, 7.75] {
            let total: f64 = render_length_note(beats).iter().map(|u| u.beats()).sum();
            assert!((total - beats).abs() < 1e-9, "{beats}");
        }
    }

    #[test]
    fn levels_by_type() {
        assert_eq!(type_level(NoteType::Quarter, 4), 0);
        assert_eq!(type_level(NoteType::Eighth, 4), 1);
        assert_eq!(type_level(NoteType::Sixteenth, 4), 2);
        assert_eq!(type_level(NoteType::Eighth, 8), 0);
        assert_eq!(type_level(NoteType::Half, 4), 0);
    }
}
