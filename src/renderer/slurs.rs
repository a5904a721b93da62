//! Slur and tie curves.
//!
//! Starts and stops are paired by slur number (ties have one shared state)
//! across the whole piece. A curve still open at the end of a row is drawn
//! to the right margin and picked up again at the next row's left margin.

use std::collections::BTreeMap;

use super::constants::*;
use super::layout::Row;
use super::note_renderer::NoteRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Slur,
    Tie,
}

/// A quadratic curve above the digits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub kind: CurveKind,
    pub number: i32,
    pub start: (f64, f64),
    pub control: (f64, f64),
    pub end: (f64, f64),
}

impl Curve {
    fn between(kind: CurveKind, number: i32, start: (f64, f64), end: (f64, f64)) -> Self {
        let span = (end.0 - start.0).abs();
        let pull = (span * SLUR_PULL_FACTOR).clamp(SLUR_MIN_PULL, SLUR_MAX_PULL);
        Self {
            kind,
            number,
            start,
            control: ((start.0 + end.0) / 2.0, start.1.min(end.1) - pull),
            end,
        }
    }
}

/// Endpoint height over a glyph, clear of its octave dots.
fn anchor_y(r: &NoteRenderer) -> f64 {
    let dots = f64::from(r.octave.max(0)) * OCTAVE_DOT_SPACING;
    r.y - r.cap_height() - SLUR_LIFT - dots
}

fn inset(r: &NoteRenderer) -> f64 {
    if r.octave > 0 {
        SLUR_INSET - SLUR_OCTAVE_INSET_SHRINK
    } else {
        SLUR_INSET
    }
}

fn start_point(r: &NoteRenderer) -> (f64, f64) {
    (r.x + r.intrinsic_width() - inset(r), anchor_y(r))
}

fn end_point(r: &NoteRenderer) -> (f64, f64) {
    (r.x + inset(r), anchor_y(r))
}

/// Height of a continuation anchored at a row edge.
fn row_anchor_y(row: &Row) -> f64 {
    let cap = row
        .renderers
        .iter()
        .find(|r| r.is_glyph())
        .map_or(NOTE_FONT_SIZE * CAP_HEIGHT_RATIO, NoteRenderer::cap_height);
    row.y - cap - SLUR_LIFT
}

#[derive(Default)]
struct OpenCurves {
    slurs: BTreeMap<i32, (f64, f64)>,
    tie: Option<(f64, f64)>,
}

/// Pair every slur and tie, returning the curves of each row.
pub(super) fn pair_curves(rows: &[Row], left_edge: f64, right_edge: f64) -> Vec<Vec<Curve>> {
    let mut out = vec![Vec::new(); rows.len()];
    let mut open = OpenCurves::default();

    for (ri, row) in rows.iter().enumerate() {
        if row.renderers.is_empty() {
            continue;
        }

        // Curves carried over from the previous row restart at the margin.
        let resume = (left_edge, row_anchor_y(row));
        for point in open.slurs.values_mut() {
            *point = resume;
        }
        if let Some(point) = open.tie.as_mut() {
            *point = resume;
        }

        for r in row.renderers.iter().filter(|r| r.is_glyph()) {
            for (&number, mark) in &r.slurs {
                if !mark.stop {
                    continue;
                }
                match open.slurs.remove(&number) {
                    Some(start) => out[ri].push(Curve::between(CurveKind::Slur, number, start, end_point(r))),
                    None => log::debug!("slur {number} stops in measure {} without a start", r.measure),
                }
            }
            if r.tie.stop {
                if let Some(start) = open.tie.take() {
                    out[ri].push(Curve::between(CurveKind::Tie, 0, start, end_point(r)));
                }
            }

            for (&number, mark) in &r.slurs {
                if mark.start {
                    open.slurs.insert(number, start_point(r));
                }
            }
            if r.tie.start {
                open.tie = Some(start_point(r));
            }
        }

        for (&number, &start) in &open.slurs {
            out[ri].push(Curve::between(CurveKind::Slur, number, start, (right_edge, start.1)));
        }
        if let Some(start) = open.tie {
            out[ri].push(Curve::between(CurveKind::Tie, 0, start, (right_edge, start.1)));
        }
    }

    if !open.slurs.is_empty() {
        log::debug!("{} slur(s) left open at the end of the piece", open.slurs.len());
    }
    out
}
