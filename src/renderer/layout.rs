//! Layout computation: groups measures into rows, places every renderer
//! horizontally and justifies each row to the page margins.

use crate::error::Result;
use crate::model::{Measure, Part};
use crate::theory::{KeySignature, TimeSignatures};

use super::beams::clean_beam_by_number;
use super::constants::*;
use super::lyrics::{place_extenders, place_hyphens, verse_numbers, Extender, Hyphen};
use super::note_renderer::{NoteRenderer, RendererKind};
use super::notes::{build_measure, MeasureContext};
use super::slurs::{pair_curves, Curve};

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

/// One underline spanning a beam segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Underline {
    pub level: u8,
    pub x1: f64,
    pub x2: f64,
}

/// One horizontal line of numbered notation.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub renderers: Vec<NoteRenderer>,
    /// Top edge of the row's band
    pub top: f64,
    /// Digit baseline
    pub y: f64,
    pub height: f64,
    /// Top of the first lyric line
    pub lyric_top: f64,
    pub underlines: Vec<Underline>,
    pub curves: Vec<Curve>,
    pub hyphens: Vec<Hyphen>,
    pub extenders: Vec<Extender>,
}

/// Horizontal extent available to rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBounds {
    pub left: f64,
    pub right: f64,
}

/// Settings the row layout reads.
#[derive(Debug, Clone, Copy)]
pub(super) struct RowSettings {
    pub(super) bounds: RowBounds,
    pub(super) note_font_size: f64,
    pub(super) lyric_font_size: f64,
    pub(super) row_spacing: f64,
}

// ═══════════════════════════════════════════════════════════════════════
// Line splitting
// ═══════════════════════════════════════════════════════════════════════

/// Partition measures into rows at each line break.
///
/// A break after the final measure leaves a trailing empty row.
pub fn split_rows(measures: &[Measure]) -> Vec<Vec<&Measure>> {
    let mut rows = Vec::new();
    let mut current = Vec::new();
    for m in measures {
        current.push(m);
        if m.line_break {
            rows.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() || measures.last().map_or(false, |m| m.line_break) {
        rows.push(current);
    }
    rows
}

/// Detach the renderers after a mid-row line break.
///
/// A flag followed only by barlines keeps the barlines on its row.
pub(super) fn take_carryover(renderers: &mut Vec<NoteRenderer>) -> Vec<NoteRenderer> {
    let Some(i) = renderers.iter().position(|r| r.new_line) else {
        return Vec::new();
    };
    if renderers[i + 1..].iter().all(NoteRenderer::is_barline) {
        return Vec::new();
    }
    let carry = renderers.split_off(i + 1);
    log::debug!("carrying {} renderer(s) to the next row", carry.len());
    carry
}

// ═══════════════════════════════════════════════════════════════════════
// Horizontal placement
// ═══════════════════════════════════════════════════════════════════════

/// Place renderers left to right at their natural widths.
pub(super) fn place_cursor(renderers: &mut [NoteRenderer], left: f64) {
    let mut cursor = left;
    for (i, r) in renderers.iter_mut().enumerate() {
        r.index = i;
        r.x = cursor;
        cursor += r.width + NOTE_GAP;
    }
}

/// Spread the row so its last renderer ends exactly on `right_edge`.
///
/// The first renderer stays put, each internal renderer `i` moves right by
/// `i * remaining / (n - 2)` and the last one is pinned to the edge.
pub fn justify(renderers: &mut [NoteRenderer], right_edge: f64) {
    let n = renderers.len();
    if n < 2 {
        return;
    }
    let last = &renderers[n - 1];
    let remaining = right_edge - (last.x + last.width);
    if remaining < 0.0 {
        log::warn!("row overflows the page by {:.1}", -remaining);
    }

    if n > 2 {
        let step = remaining / (n - 2) as f64;
        for (i, r) in renderers.iter_mut().enumerate().take(n - 1).skip(1) {
            r.x += step * i as f64;
        }
    }
    let last = &mut renderers[n - 1];
    last.x = right_edge - last.width;
}

/// Spread runs of continuation dots evenly between the glyphs around them.
pub(super) fn reposition_dots(renderers: &mut [NoteRenderer]) {
    let n = renderers.len();
    let mut i = 0;
    while i < n {
        if renderers[i].kind != RendererKind::Dot {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && renderers[i].kind == RendererKind::Dot {
            i += 1;
        }
        // Runs touching either end of the row stay where justification put them.
        if start == 0 || i == n {
            continue;
        }

        let prev = &renderers[start - 1];
        let prev_end = prev.x + prev.intrinsic_width();
        let gap = renderers[i].x - prev_end;
        let count = i - start;
        for (k, dot) in renderers[start..i].iter_mut().enumerate() {
            dot.x = prev_end + (k + 1) as f64 * gap / (count + 1) as f64;
        }
    }
}

/// Underlines for every beam segment on the row.
fn collect_underlines(renderers: &mut [NoteRenderer]) -> Vec<Underline> {
    let max_level = renderers.iter().map(|r| r.level).max().unwrap_or(0);
    let mut out = Vec::new();
    for level in 1..=max_level {
        for seg in clean_beam_by_number(renderers, level) {
            let first = &renderers[seg.start];
            let last = &renderers[seg.end];
            let last_w = if last.kind == RendererKind::Dot {
                CONTINUATION_DOT_RADIUS * 2.0
            } else {
                last.intrinsic_width()
            };
            out.push(Underline {
                level,
                x1: first.x,
                x2: last.x + last_w,
            });
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════
// Vertical placement
// ═══════════════════════════════════════════════════════════════════════

fn max_level(row: &Row) -> u8 {
    row.renderers.iter().map(|r| r.level).max().unwrap_or(0)
}

/// Space above the digit baseline.
fn row_top(row: &Row) -> f64 {
    let high_dots = row.renderers.iter().map(|r| r.octave.max(0)).max().unwrap_or(0);
    let has_text = row
        .renderers
        .iter()
        .any(|r| r.texts.iter().any(|t| t.default_y.map_or(true, |y| y >= 0.0)));
    ROW_TOP_PAD
        + f64::from(high_dots) * OCTAVE_DOT_SPACING
        + if has_text { MEASURE_TEXT_HEIGHT } else { 0.0 }
}

/// Depth below the baseline taken by underlines, low octave dots and
/// texts placed under the row.
pub(super) fn under_depth(row: &Row) -> f64 {
    let low_dots = row.renderers.iter().map(|r| (-r.octave).max(0)).max().unwrap_or(0);
    let has_text = row
        .renderers
        .iter()
        .any(|r| r.texts.iter().any(|t| t.default_y.map_or(false, |y| y < 0.0)));
    UNDER_ROW_HEIGHT
        + f64::from(max_level(row)) * UNDERLINE_SPACING
        + f64::from(low_dots) * OCTAVE_DOT_SPACING
        + if has_text { MEASURE_TEXT_HEIGHT } else { 0.0 }
}

// ═══════════════════════════════════════════════════════════════════════
// Main layout computation
// ═══════════════════════════════════════════════════════════════════════

/// Lay out every row of `part`, starting at `top`.
pub(super) fn layout_rows(
    part: &Part,
    key: &KeySignature,
    times: &TimeSignatures,
    settings: &RowSettings,
    top: f64,
) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut carry: Vec<NoteRenderer> = Vec::new();

    for group in split_rows(&part.measures) {
        let mut renderers = std::mem::take(&mut carry);
        for measure in group {
            let ctx = MeasureContext {
                key,
                times,
                measure,
                note_font_size: settings.note_font_size,
                lyric_font_size: settings.lyric_font_size,
            };
            renderers.extend(build_measure(&ctx)?);
        }
        carry = take_carryover(&mut renderers);
        rows.push(Row {
            renderers,
            ..Default::default()
        });
    }
    while !carry.is_empty() {
        let mut renderers = std::mem::take(&mut carry);
        carry = take_carryover(&mut renderers);
        rows.push(Row {
            renderers,
            ..Default::default()
        });
    }
    log::debug!("laid out {} row(s)", rows.len());

    let verses = verse_numbers(&rows);
    let mut y = top;
    for row in &mut rows {
        place_cursor(&mut row.renderers, settings.bounds.left);
        justify(&mut row.renderers, settings.bounds.right);
        reposition_dots(&mut row.renderers);
        row.underlines = collect_underlines(&mut row.renderers);

        row.top = y;
        if row.renderers.is_empty() {
            row.y = y;
            continue;
        }
        let above = row_top(row);
        let below = under_depth(row);
        row.y = y + above;
        row.lyric_top = row.y + below;
        row.height = above + below + verses.len() as f64 * LYRIC_LINE_HEIGHT + settings.row_spacing;
        for r in &mut row.renderers {
            r.y = row.y;
        }
        y += row.height;
    }

    let curves = pair_curves(&rows, settings.bounds.left, settings.bounds.right);
    let hyphens = place_hyphens(&rows, settings.lyric_font_size, settings.bounds.right);
    for ((row, curves), hyphens) in rows.iter_mut().zip(curves).zip(hyphens) {
        row.curves = curves;
        row.hyphens = hyphens;
        row.extenders = place_extenders(row, settings.lyric_font_size);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Barline, BarlineLocation, BarStyle};

    fn measure(number: i32, line_break: bool) -> Measure {
        Measure {
            number,
            line_break,
            ..Default::default()
        }
    }

    fn glyphs(widths: &[f64]) -> Vec<NoteRenderer> {
        widths
            .iter()
            .map(|&w| {
                let mut r = NoteRenderer::note(1, 0, false);
                r.width = w;
                r
            })
            .collect()
    }

    #[test]
    fn rows_split_after_breaks() {
        let ms = vec![measure(1, false), measure(2, true), measure(3, false)];
        let rows = split_rows(&ms);
        let numbers: Vec<Vec<i32>> = rows.iter().map(|r| r.iter().map(|m| m.number).collect()).collect();
        assert_eq!(numbers, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn break_on_the_last_measure_keeps_an_empty_row() {
        let ms = vec![measure(1, true), measure(2, true)];
        let rows = split_rows(&ms);
        assert_eq!(rows.len(), 3);
        assert!(rows[2].is_empty());
    }

    #[test]
    fn justification_pins_the_last_renderer() {
        let mut rs = glyphs(&[10.0, 24.0, 10.0, 10.0, 18.0]);
        place_cursor(&mut rs, 30.0);
        let natural: Vec<f64> = rs.iter().map(|r| r.x).collect();
        let last = rs.last().unwrap();
        let remaining = 690.0 - (last.x + last.width);

        justify(&mut rs, 690.0);
        let last = rs.last().unwrap();
        assert!((last.x + last.width - 690.0).abs() < 1e-9);
        assert_eq!(rs[0].x, 30.0);

        let added: f64 = (1..rs.len())
            .map(|i| (rs[i].x - rs[i - 1].x) - (natural[i] - natural[i - 1]))
            .sum();
        assert!((added - remaining).abs() < 1e-6);
    }

    #[test]
    fn trailing_barline_width_is_kept() {
        let mut rs = glyphs(&[10.0, 10.0]);
        rs.push(NoteRenderer::barline(Barline {
            location: BarlineLocation::Right,
            style: BarStyle::LightHeavy,
            repeat: None,
        }));
        place_cursor(&mut rs, 30.0);
        justify(&mut rs, 690.0);
        assert_eq!(rs[2].x, 690.0 - DOUBLE_BARLINE_WIDTH);
    }

    #[test]
    fn dots_are_spread_in_the_gap() {
        let mut rs = vec![
            NoteRenderer::note(1, 0, false),
            NoteRenderer::dot(0),
            NoteRenderer::dot(0),
            NoteRenderer::dot(0),
            NoteRenderer::note(2, 0, false),
        ];
        rs[0].x = 30.0;
        rs[4].x = 110.0;
        reposition_dots(&mut rs);
        // gap from 40 to 110 split into four
        let xs: Vec<f64> = rs[1..4].iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![57.5, 75.0, 92.5]);
    }

    #[test]
    fn carryover_moves_renderers_after_the_flag() {
        let mut rs = glyphs(&[10.0, 10.0, 10.0]);
        rs[0].new_line = true;
        let carry = take_carryover(&mut rs);
        assert_eq!(rs.len(), 1);
        assert_eq!(carry.len(), 2);

        let mut rs = glyphs(&[10.0]);
        rs[0].new_line = true;
        rs.push(NoteRenderer::barline(Barline {
            location: BarlineLocation::Right,
            style: BarStyle::Regular,
            repeat: None,
        }));
        assert!(take_carryover(&mut rs).is_empty());
        assert_eq!(rs.len(), 2);
    }
}
