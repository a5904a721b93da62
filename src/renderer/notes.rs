//! Per-measure renderer construction.
//!
//! Each melody note becomes its anchor glyph plus the continuation glyphs
//! its duration needs, annotated with lyrics, slurs, ties and underlines.
//! A barline renderer closes every measure.

use crate::error::{RenderError, Result};
use crate::model::{Barline, BarlineLocation, Measure, Note, StartStop};
use crate::theory::duration::{note_length, render_length_note, type_level, LengthUnit};
use crate::theory::{convert_pitch_to_numbered, octave_offset, KeySignature, TimeSignatures};

use super::beams::{assign_beams, finish_measure_beams};
use super::lyrics::apply_lyric_width;
use super::note_renderer::{leading_barline, CurveMark, LyricSegment, NoteRenderer, TupletMark};

/// Everything a measure needs from the piece, passed down explicitly.
pub(super) struct MeasureContext<'a> {
    pub(super) key: &'a KeySignature,
    pub(super) times: &'a TimeSignatures,
    pub(super) measure: &'a Measure,
    pub(super) note_font_size: f64,
    pub(super) lyric_font_size: f64,
}

impl MeasureContext<'_> {
    fn beat_type(&self) -> i32 {
        self.times.at(self.measure.number).beat_type
    }
}

/// Renderers for one measure, barlines included.
pub(super) fn build_measure(ctx: &MeasureContext<'_>) -> Result<Vec<NoteRenderer>> {
    let m = ctx.measure;
    let mut out = Vec::new();

    if let Some(bar) = leading_barline(m.left_barline()) {
        let mut r = NoteRenderer::barline(bar);
        r.measure = m.number;
        out.push(r);
    }

    let notes: Vec<&Note> = m.melody().collect();
    if notes.is_empty() {
        log::debug!("measure {} has no notes", m.number);
        out.push(closing_barline(m));
        return Ok(out);
    }

    let level_shift = u8::from(ctx.beat_type() == 8);
    let mut body = Vec::new();
    let mut beat = 0.0;

    for note in notes {
        let length = note_length(ctx.times, m.number, note);
        let units = decompose(ctx, note, length);

        let mut group = build_note_group(ctx, note, &units)?;
        assign_beams(&mut group, &units, &note.beams, level_shift);

        let mut offset = beat;
        for (r, unit) in group.iter_mut().zip(&units) {
            r.beat_offset = offset;
            offset += if units.len() == 1 { length } else { unit.beats() };
        }
        beat += length;

        if note.breath_mark {
            let mut breath = NoteRenderer::breath();
            breath.measure = m.number;
            breath.beat_offset = beat;
            // The breath mark is where the row visibly ends.
            breath.new_line = note.new_line;
            group.push(breath);
        } else if note.new_line {
            if let Some(last) = group.last_mut() {
                last.new_line = true;
            }
        }
        body.extend(group);
    }

    finish_measure_beams(&mut body);
    out.extend(body);
    out.push(closing_barline(m));
    Ok(out)
}

/// Glyph units for `note`; tuplet members keep their written type.
fn decompose(ctx: &MeasureContext<'_>, note: &Note, length: f64) -> Vec<LengthUnit> {
    if note.time_modification.is_some() {
        let level = note
            .note_type
            .map_or(0, |t| type_level(t, ctx.beat_type()));
        return vec![LengthUnit {
            level,
            is_dotted: false,
        }];
    }
    render_length_note(length)
}

/// The anchor glyph and its continuation glyphs.
fn build_note_group(ctx: &MeasureContext<'_>, note: &Note, units: &[LengthUnit]) -> Result<Vec<NoteRenderer>> {
    let m = ctx.measure;
    let mut anchor = match (&note.pitch, note.rest) {
        (_, true) => NoteRenderer::rest(),
        (Some(pitch), false) => {
            let name = ctx.key.pitch_with_accidental(note).ok_or_else(|| {
                RenderError::MalformedInput(format!("unspellable pitch in measure {}", m.number))
            })?;
            let (degree, altered) = convert_pitch_to_numbered(ctx.key, name);
            NoteRenderer::note(degree, octave_offset(ctx.key, pitch), altered)
        }
        (None, false) => {
            return Err(RenderError::MalformedInput(format!(
                "note without pitch or rest in measure {}",
                m.number
            )))
        }
    };

    anchor = anchor.with_font_size(ctx.note_font_size);
    anchor.measure = m.number;
    anchor.level = units.first().map_or(0, |u| u.level);
    anchor.texts = note.texts.clone();
    anchor.lyrics = note
        .lyrics
        .iter()
        .map(|l| LyricSegment {
            verse: l.number,
            text: l.text.clone(),
            syllabic: l.syllabic,
            extend: l.extend,
        })
        .collect();
    for slur in &note.slurs {
        let mark = anchor.slurs.entry(slur.number).or_default();
        match slur.kind {
            StartStop::Start => mark.start = true,
            StartStop::Stop => mark.stop = true,
        }
    }
    anchor.tie = CurveMark {
        start: note.tie_start,
        stop: note.tie_stop,
    };
    if let (Some(tuplet), Some(tm)) = (note.tuplet, note.time_modification) {
        anchor.tuplet = Some(TupletMark {
            start: tuplet.kind == StartStop::Start,
            stop: tuplet.kind == StartStop::Stop,
            count: tm.actual,
        });
    }
    apply_lyric_width(&mut anchor, ctx.lyric_font_size);

    let mut group = vec![anchor];
    for unit in units.iter().skip(1) {
        let mut r = if note.rest {
            let mut zero = NoteRenderer::rest().with_font_size(ctx.note_font_size);
            zero.is_dotted = true;
            zero.level = unit.level;
            zero
        } else {
            NoteRenderer::dot(unit.level)
        };
        r.measure = m.number;
        group.push(r);
    }
    Ok(group)
}

fn closing_barline(m: &Measure) -> NoteRenderer {
    let bar = m.right_barline().copied().unwrap_or(Barline {
        location: BarlineLocation::Right,
        style: Default::default(),
        repeat: None,
    });
    let mut r = NoteRenderer::barline(bar);
    r.measure = m.number;
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Accidental, Beam, BeamState, Lyric, NoteType, Pitch, SlurEvent, Step, Syllabic, TimeModification, TupletEvent,
    };
    use crate::renderer::constants::{LYRIC_FONT_SIZE, NOTE_FONT_SIZE, NOTE_GLYPH_WIDTH};
    use crate::renderer::note_renderer::RendererKind;
    use crate::theory::Mode;

    fn pitched(step: Step, octave: i32, note_type: NoteType, dots: u8) -> Note {
        Note {
            pitch: Some(Pitch { step, octave, alter: None }),
            note_type: Some(note_type),
            dots,
            ..Default::default()
        }
    }

    fn build(key: &KeySignature, measure: &Measure) -> Vec<NoteRenderer> {
        let times = TimeSignatures::new();
        let ctx = MeasureContext {
            key,
            times: &times,
            measure,
            note_font_size: NOTE_FONT_SIZE,
            lyric_font_size: LYRIC_FONT_SIZE,
        };
        build_measure(&ctx).unwrap()
    }

    fn kinds(rs: &[NoteRenderer]) -> Vec<RendererKind> {
        rs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn half_note_gets_a_continuation_dot() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let measure = Measure {
            number: 1,
            notes: vec![pitched(Step::E, 4, NoteType::Half, 0)],
            ..Default::default()
        };
        let rs = build(&key, &measure);
        assert_eq!(
            kinds(&rs),
            vec![RendererKind::Note, RendererKind::Dot, RendererKind::Barline]
        );
        assert_eq!(rs[0].degree, 3);
        assert_eq!(rs[1].beat_offset, 1.0);
    }

    #[test]
    fn rests_repeat_zero() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let measure = Measure {
            number: 1,
            notes: vec![Note {
                rest: true,
                note_type: Some(NoteType::Half),
                ..Default::default()
            }],
            ..Default::default()
        };
        let rs = build(&key, &measure);
        assert_eq!(rs[0].label(), "0");
        assert_eq!(rs[1].label(), "0");
        assert!(rs[1].is_dotted);
    }

    #[test]
    fn empty_measure_is_only_a_barline() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let measure = Measure::default();
        assert_eq!(kinds(&build(&key, &measure)), vec![RendererKind::Barline]);
    }

    #[test]
    fn breath_mark_takes_the_line_break() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let mut n = pitched(Step::C, 4, NoteType::Quarter, 0);
        n.breath_mark = true;
        n.new_line = true;
        let measure = Measure {
            number: 1,
            notes: vec![n],
            ..Default::default()
        };
        let rs = build(&key, &measure);
        assert_eq!(rs[1].kind, RendererKind::Breath);
        assert!(rs[1].new_line);
        assert!(!rs[0].new_line);
    }

    #[test]
    fn annotations_land_on_the_anchor() {
        let key = KeySignature::new(2, Mode::Major).unwrap();
        let mut n = pitched(Step::D, 4, NoteType::Quarter, 1);
        n.lyrics.push(Lyric {
            number: 1,
            text: "Ha".into(),
            syllabic: Syllabic::Begin,
            extend: false,
        });
        n.slurs.push(SlurEvent {
            kind: StartStop::Start,
            number: 1,
        });
        n.tie_start = true;
        let measure = Measure {
            number: 3,
            notes: vec![n],
            ..Default::default()
        };
        let rs = build(&key, &measure);
        assert_eq!(rs[0].degree, 1);
        assert_eq!(rs[0].lyrics[0].text, "Ha");
        assert!(rs[0].slurs[&1].start);
        assert!(rs[0].tie.start);
        assert_eq!(rs[0].measure, 3);
        assert!(rs[1].lyrics.is_empty());
        assert_eq!(rs[1].beam(1), Some(BeamState::Single));
    }

    #[test]
    fn eighths_in_one_beat_share_an_underline() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let mut a = pitched(Step::C, 4, NoteType::Eighth, 0);
        a.beams.push(Beam { number: 1, state: BeamState::Begin });
        let mut b = pitched(Step::D, 4, NoteType::Eighth, 0);
        b.beams.push(Beam { number: 1, state: BeamState::End });
        let measure = Measure {
            number: 1,
            notes: vec![a, b],
            ..Default::default()
        };
        let rs = build(&key, &measure);
        assert_eq!(rs[0].beam(1), Some(BeamState::Begin));
        assert_eq!(rs[1].beam(1), Some(BeamState::End));
    }

    #[test]
    fn triplet_members_keep_their_type() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let notes = (0..3)
            .map(|i| {
                let mut n = pitched(Step::C, 4, NoteType::Eighth, 0);
                n.time_modification = Some(TimeModification { actual: 3, normal: 2 });
                n.tuplet = match i {
                    0 => Some(TupletEvent { kind: StartStop::Start }),
                    2 => Some(TupletEvent { kind: StartStop::Stop }),
                    _ => None,
                };
                n
            })
            .collect();
        let measure = Measure {
            number: 1,
            notes,
            ..Default::default()
        };
        let rs = build(&key, &measure);
        assert_eq!(rs.len(), 4);
        assert!(rs[..3].iter().all(|r| r.level == 1));
        assert_eq!(rs[0].tuplet.map(|t| t.count), Some(3));
        assert!(rs[2].tuplet.map_or(false, |t| t.stop));
    }

    #[test]
    fn accidental_carries_through_the_measure() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let sharp = |written: bool| Note {
            pitch: Some(Pitch { step: Step::F, octave: 4, alter: Some(1.0) }),
            note_type: Some(NoteType::Quarter),
            accidental: written.then_some(Accidental::Sharp),
            ..Default::default()
        };
        let measure = Measure {
            number: 1,
            notes: vec![sharp(true), sharp(false)],
            ..Default::default()
        };
        let rs = build(&key, &measure);
        let glyphs: Vec<(u8, bool)> = rs[..2].iter().map(|r| (r.degree, r.strikethrough)).collect();
        assert_eq!(glyphs, vec![(5, true), (5, true)]);
    }

    #[test]
    fn note_font_size_scales_glyphs() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let times = TimeSignatures::new();
        let measure = Measure {
            number: 1,
            notes: vec![
                pitched(Step::C, 4, NoteType::Half, 0),
                Note {
                    rest: true,
                    note_type: Some(NoteType::Half),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let ctx = MeasureContext {
            key: &key,
            times: &times,
            measure: &measure,
            note_font_size: 2.0 * NOTE_FONT_SIZE,
            lyric_font_size: LYRIC_FONT_SIZE,
        };
        let rs = build_measure(&ctx).unwrap();
        let widths: Vec<f64> = rs.iter().map(|r| r.width).collect();
        let wide = 2.0 * NOTE_GLYPH_WIDTH;
        assert_eq!(widths, vec![wide, 0.0, wide, wide, 0.0]);
    }

    #[test]
    fn pitchless_note_is_malformed() {
        let key = KeySignature::new(0, Mode::Major).unwrap();
        let times = TimeSignatures::new();
        let measure = Measure {
            number: 1,
            notes: vec![Note {
                note_type: Some(NoteType::Quarter),
                ..Default::default()
            }],
            ..Default::default()
        };
        let ctx = MeasureContext {
            key: &key,
            times: &times,
            measure: &measure,
            note_font_size: NOTE_FONT_SIZE,
            lyric_font_size: LYRIC_FONT_SIZE,
        };
        assert!(matches!(build_measure(&ctx), Err(RenderError::MalformedInput(_))));
    }
}
