//! Underline (beam) grouping.
//!
//! In numbered notation a beam is drawn as an underline under the digits it
//! groups; level 1 halves the beat, level 2 quarters it. The passes here run
//! over one measure's renderers in order:
//!
//! 1. [`assign_beams`] gives a decomposed note's glyphs their states,
//! 2. [`join_beams`] joins fragments that fall within the same beat,
//! 3. [`clean_beam_by_number`] repairs dangling runs and reports segments,
//! 4. [`split_beam`] breaks long level-1 runs into groups of two and three.

use crate::model::{Beam, BeamState};
use crate::theory::duration::LengthUnit;

use super::note_renderer::NoteRenderer;

const EPSILON: f64 = 1e-6;

/// A closed run of underlines at one level, by row/measure index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamSegment {
    pub start: usize,
    pub end: usize,
}

impl BeamSegment {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Per-note assignment
// ═══════════════════════════════════════════════════════════════════════

/// Set underline states on the glyphs of one decomposed note.
///
/// `group[0]` is the anchor and carries the written beams (renumbered so
/// that level 1 is the first underline); the continuation glyphs extend
/// the anchor's run or form their own.
pub(super) fn assign_beams(group: &mut [NoteRenderer], units: &[LengthUnit], written: &[Beam], level_shift: u8) {
    let max_level = units.iter().map(|u| u.level).max().unwrap_or(0);

    for level in 1..=max_level {
        let members: Vec<usize> = (0..units.len().min(group.len()))
            .filter(|&i| units[i].level >= level)
            .collect();
        let Some(&first) = members.first() else {
            continue;
        };
        let last = *members.last().unwrap_or(&first);

        let anchor_state = if first == 0 {
            written
                .iter()
                .find(|b| b.number > level_shift && b.number - level_shift == level)
                .map(|b| b.state)
                .filter(|s| matches!(s, BeamState::Begin | BeamState::Continue | BeamState::End))
        } else {
            None
        };

        match anchor_state {
            Some(state @ (BeamState::Begin | BeamState::Continue)) => {
                group[first].beams.insert(level, state);
                for &i in &members[1..] {
                    group[i].beams.insert(level, BeamState::Continue);
                }
            }
            Some(_) if members.len() > 1 => {
                group[first].beams.insert(level, BeamState::Continue);
                for &i in &members[1..members.len() - 1] {
                    group[i].beams.insert(level, BeamState::Continue);
                }
                group[last].beams.insert(level, BeamState::End);
            }
            Some(state) => {
                group[first].beams.insert(level, state);
            }
            None => open_run(group, &members, level),
        }
    }
}

/// A self-contained run: Begin .. End, or Single for one glyph.
fn open_run(group: &mut [NoteRenderer], members: &[usize], level: u8) {
    match members {
        [] => {}
        [only] => {
            group[*only].beams.insert(level, BeamState::Single);
        }
        [first, middle @ .., last] => {
            group[*first].beams.insert(level, BeamState::Begin);
            for &i in middle {
                group[i].beams.insert(level, BeamState::Continue);
            }
            group[*last].beams.insert(level, BeamState::End);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Joining
// ═══════════════════════════════════════════════════════════════════════

fn beat_of(r: &NoteRenderer) -> i64 {
    (r.beat_offset + EPSILON).floor() as i64
}

/// Join a closed fragment to the next one when both lie in the same beat.
pub(super) fn join_beams(renderers: &mut [NoteRenderer]) {
    let max_level = renderers.iter().map(|r| r.level).max().unwrap_or(0);
    for level in 1..=max_level {
        for i in 0..renderers.len().saturating_sub(1) {
            let (left, right) = (renderers[i].beam(level), renderers[i + 1].beam(level));
            let closes = matches!(left, Some(BeamState::End) | Some(BeamState::Single));
            let opens = matches!(right, Some(BeamState::Begin) | Some(BeamState::Single));
            if !closes || !opens || beat_of(&renderers[i]) != beat_of(&renderers[i + 1]) {
                continue;
            }

            let left_state = if left == Some(BeamState::Single) {
                BeamState::Begin
            } else {
                BeamState::Continue
            };
            let right_state = if right == Some(BeamState::Single) {
                BeamState::End
            } else {
                BeamState::Continue
            };
            renderers[i].beams.insert(level, left_state);
            renderers[i + 1].beams.insert(level, right_state);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Segments
// ═══════════════════════════════════════════════════════════════════════

/// Collect the runs at `level`, closing any left open.
///
/// A run interrupted by a glyph without the level (or by the end of the
/// slice) is closed on the glyph before, so every Begin gets its End.
pub fn clean_beam_by_number(renderers: &mut [NoteRenderer], level: u8) -> Vec<BeamSegment> {
    let mut segments = Vec::new();
    let mut open: Option<usize> = None;

    for i in 0..renderers.len() {
        match renderers[i].beam(level) {
            Some(BeamState::Begin) => {
                if let Some(start) = open.take() {
                    close_run(renderers, level, start, i - 1, &mut segments);
                }
                open = Some(i);
            }
            Some(BeamState::Continue) => {
                if open.is_none() {
                    renderers[i].beams.insert(level, BeamState::Begin);
                    open = Some(i);
                }
            }
            Some(BeamState::End) => match open.take() {
                Some(start) => segments.push(BeamSegment { start, end: i }),
                None => {
                    renderers[i].beams.insert(level, BeamState::Single);
                    segments.push(BeamSegment { start: i, end: i });
                }
            },
            Some(BeamState::Single) | Some(BeamState::ForwardHook) | Some(BeamState::BackwardHook) => {
                if let Some(start) = open.take() {
                    close_run(renderers, level, start, i - 1, &mut segments);
                }
                segments.push(BeamSegment { start: i, end: i });
            }
            None => {
                if let Some(start) = open.take() {
                    close_run(renderers, level, start, i - 1, &mut segments);
                }
            }
        }
    }

    if let Some(start) = open {
        let end = renderers.len() - 1;
        close_run(renderers, level, start, end, &mut segments);
    }
    segments
}

fn close_run(
    renderers: &mut [NoteRenderer],
    level: u8,
    start: usize,
    end: usize,
    segments: &mut Vec<BeamSegment>,
) {
    log::debug!("closing dangling level-{level} underline at {end}");
    if start == end {
        renderers[start].beams.insert(level, BeamState::Single);
    } else {
        renderers[end].beams.insert(level, BeamState::End);
    }
    segments.push(BeamSegment { start, end });
}

// ═══════════════════════════════════════════════════════════════════════
// Splitting
// ═══════════════════════════════════════════════════════════════════════

/// Split points (relative to the run start) for a level-1 run of `len`
/// glyphs, given the level-2 runs inside it (also relative).
///
/// Four glyphs group 2+2. Five group 3+2, or 2+3 when a nested run starts
/// at or after the third glyph. Six group 3+3 when a nested run covers the
/// third glyph, else 2+2+2. Longer runs take a first group of 3 when a
/// nested run spans the second and third glyph (2 otherwise) and split the
/// rest the same way.
// TODO: have an engraver review the five- and six-glyph cases; they follow
// the existing hymnal output, not a written rule.
pub(super) fn split_points(len: usize, nested: &[BeamSegment]) -> Vec<usize> {
    match len {
        0..=3 => Vec::new(),
        4 => vec![2],
        5 => {
            if nested.iter().any(|s| s.start >= 2) {
                vec![2]
            } else {
                vec![3]
            }
        }
        6 => {
            if nested.iter().any(|s| s.start <= 2 && s.end >= 2) {
                vec![3]
            } else {
                vec![2, 4]
            }
        }
        _ => {
            let first = if nested.iter().any(|s| s.start <= 1 && s.end >= 2) {
                3
            } else {
                2
            };
            let rest: Vec<BeamSegment> = nested
                .iter()
                .filter(|s| s.end >= first)
                .map(|s| BeamSegment {
                    start: s.start.max(first) - first,
                    end: s.end - first,
                })
                .collect();
            let mut points = vec![first];
            points.extend(split_points(len - first, &rest).into_iter().map(|p| p + first));
            points
        }
    }
}

/// Break `segment` (a level-1 run) at the points the case table gives,
/// splitting level-2 runs that cross a break too.
pub fn split_beam(renderers: &mut [NoteRenderer], segment: BeamSegment, nested: &[BeamSegment]) -> Vec<BeamSegment> {
    let relative: Vec<BeamSegment> = nested
        .iter()
        .filter(|s| s.start >= segment.start && s.end <= segment.end)
        .map(|s| BeamSegment {
            start: s.start - segment.start,
            end: s.end - segment.start,
        })
        .collect();

    let points = split_points(segment.len(), &relative);
    if points.is_empty() {
        return vec![segment];
    }
    log::debug!(
        "splitting underline {}..={} at {:?}",
        segment.start,
        segment.end,
        points
    );

    let mut pieces = Vec::new();
    let mut start = segment.start;
    for p in points {
        let at = segment.start + p;
        split_at(renderers, 1, start, at);
        for s in nested.iter().filter(|s| s.start < at && s.end >= at) {
            split_at(renderers, 2, s.start, at);
        }
        pieces.push(BeamSegment { start, end: at - 1 });
        start = at;
    }
    pieces.push(BeamSegment {
        start,
        end: segment.end,
    });

    for piece in &pieces {
        if piece.start == piece.end {
            renderers[piece.start].beams.insert(1, BeamState::Single);
        }
    }
    pieces
}

/// End the run containing `at - 1` there and begin a new one at `at`.
fn split_at(renderers: &mut [NoteRenderer], level: u8, run_start: usize, at: usize) {
    let before = if run_start == at - 1 {
        BeamState::Single
    } else {
        BeamState::End
    };
    renderers[at - 1].beams.insert(level, before);
    if renderers[at].beam(level) != Some(BeamState::End) {
        renderers[at].beams.insert(level, BeamState::Begin);
    } else {
        renderers[at].beams.insert(level, BeamState::Single);
    }
}

/// Run every pass over one measure's renderers.
pub(super) fn finish_measure_beams(renderers: &mut [NoteRenderer]) {
    if renderers.is_empty() {
        return;
    }
    join_beams(renderers);

    let nested = clean_beam_by_number(renderers, 2);
    let runs = clean_beam_by_number(renderers, 1);
    for run in runs {
        split_beam(renderers, run, &nested);
    }

    let max_level = renderers.iter().map(|r| r.level).max().unwrap_or(0);
    for level in 3..=max_level {
        clean_beam_by_number(renderers, level);
    }
}
