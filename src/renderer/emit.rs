//! Row emission: digits, dots, barlines, underlines, curves and lyrics,
//! drawn through a [`Canvas`].

use std::fmt;

use crate::canvas::{num, Canvas};
use crate::model::{BarStyle, Barline, RepeatDirection, TextAlign};

use super::constants::*;
use super::layout::{under_depth, Row};
use super::note_renderer::{NoteRenderer, RendererKind};
use super::slurs::CurveKind;

/// Font sizes the emission pass reads.
#[derive(Debug, Clone, Copy)]
pub(super) struct EmitStyle {
    pub(super) note_font_size: f64,
    pub(super) lyric_font_size: f64,
}

/// Top of a digit above its baseline.
fn cap_height(style: &EmitStyle) -> f64 {
    style.note_font_size * CAP_HEIGHT_RATIO
}

fn lyric_baseline(row: &Row, verse_index: usize, style: &EmitStyle) -> f64 {
    row.lyric_top + style.lyric_font_size + verse_index as f64 * LYRIC_LINE_HEIGHT
}

fn stroke_line(canvas: &mut dyn Canvas, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) -> fmt::Result {
    let w = num(width);
    canvas.line(x1, y1, x2, y2, &[("stroke", color), ("stroke-width", &w)])
}

// ═══════════════════════════════════════════════════════════════════════
// Rows
// ═══════════════════════════════════════════════════════════════════════

/// Draw one laid-out row. `verses` maps a verse number to its lyric line.
pub(super) fn draw_row(canvas: &mut dyn Canvas, row: &Row, verses: &[u32], style: &EmitStyle) -> fmt::Result {
    if row.renderers.is_empty() {
        return Ok(());
    }
    canvas.group(&[("class", "row")])?;

    let size = num(style.note_font_size);
    canvas.group(&[
        ("class", "notes"),
        ("font-size", &size),
        ("fill", NOTE_COLOR),
        ("text-anchor", "middle"),
    ])?;
    for r in &row.renderers {
        draw_renderer(canvas, r, style)?;
    }
    canvas.group_end()?;

    for u in &row.underlines {
        let y = row.y + UNDERLINE_OFFSET + f64::from(u.level - 1) * UNDERLINE_SPACING;
        stroke_line(canvas, u.x1, y, u.x2, y, NOTE_COLOR, UNDERLINE_WIDTH)?;
    }

    for c in &row.curves {
        let class = match c.kind {
            CurveKind::Slur => "slur",
            CurveKind::Tie => "tie",
        };
        let w = num(SLUR_STROKE);
        canvas.quadratic_bezier(
            c.start,
            c.control,
            c.end,
            &[("class", class), ("fill", "none"), ("stroke", NOTE_COLOR), ("stroke-width", &w)],
        )?;
    }

    draw_tuplets(canvas, row, style)?;
    draw_texts(canvas, row, style)?;
    draw_lyrics(canvas, row, verses, style)?;
    canvas.group_end()
}

fn draw_renderer(canvas: &mut dyn Canvas, r: &NoteRenderer, style: &EmitStyle) -> fmt::Result {
    let cx = r.x + r.glyph_width() / 2.0;
    match r.kind {
        RendererKind::Note | RendererKind::Rest => {
            canvas.text(cx, r.y, &r.label(), &[])?;
            if r.strikethrough {
                stroke_line(
                    canvas,
                    r.x + 1.0,
                    r.y + 1.0,
                    r.x + r.glyph_width() - 1.0,
                    r.y - cap_height(style),
                    NOTE_COLOR,
                    STRIKE_WIDTH,
                )?;
            }
            draw_octave_dots(canvas, r, style)
        }
        RendererKind::Dot => canvas.circle(
            r.x + CONTINUATION_DOT_RADIUS,
            r.y - cap_height(style) / 2.0,
            CONTINUATION_DOT_RADIUS,
            &[("fill", NOTE_COLOR)],
        ),
        RendererKind::Breath => canvas.text(r.x + BREATH_WIDTH / 2.0, r.y - cap_height(style), ",", &[]),
        RendererKind::Barline => match &r.barline {
            Some(bar) => draw_barline(canvas, bar, r.x, r.y - cap_height(style) - 2.0, r.y + 4.0),
            None => Ok(()),
        },
    }
}

fn draw_octave_dots(canvas: &mut dyn Canvas, r: &NoteRenderer, style: &EmitStyle) -> fmt::Result {
    let cx = r.x + r.glyph_width() / 2.0;
    let count = r.octave.unsigned_abs();
    for k in 0..count {
        let step = f64::from(k) * OCTAVE_DOT_SPACING;
        let cy = if r.octave > 0 {
            r.y - cap_height(style) - OCTAVE_DOT_GAP - step
        } else {
            r.y + UNDERLINE_OFFSET + f64::from(r.level) * UNDERLINE_SPACING + OCTAVE_DOT_GAP + step
        };
        canvas.circle(cx, cy, OCTAVE_DOT_RADIUS, &[])?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Barlines
// ═══════════════════════════════════════════════════════════════════════

fn repeat_dots(canvas: &mut dyn Canvas, x: f64, top: f64, bottom: f64) -> fmt::Result {
    let mid = (top + bottom) / 2.0;
    canvas.circle(x, mid - 3.0, 1.2, &[("fill", BARLINE_COLOR)])?;
    canvas.circle(x, mid + 3.0, 1.2, &[("fill", BARLINE_COLOR)])
}

fn vbar(canvas: &mut dyn Canvas, x: f64, top: f64, bottom: f64, width: f64) -> fmt::Result {
    stroke_line(canvas, x, top, x, bottom, BARLINE_COLOR, width)
}

pub(super) fn draw_barline(canvas: &mut dyn Canvas, bar: &Barline, x: f64, top: f64, bottom: f64) -> fmt::Result {
    let thin = BARLINE_WIDTH;
    let heavy = HEAVY_BARLINE_WIDTH;

    match bar.repeat {
        Some(RepeatDirection::Forward) => {
            vbar(canvas, x + 1.5, top, bottom, heavy)?;
            vbar(canvas, x + 5.0, top, bottom, thin)?;
            return repeat_dots(canvas, x + 7.5, top, bottom);
        }
        Some(RepeatDirection::Backward) => {
            repeat_dots(canvas, x + 1.5, top, bottom)?;
            vbar(canvas, x + 4.0, top, bottom, thin)?;
            return vbar(canvas, x + 7.5, top, bottom, heavy);
        }
        None => {}
    }

    match bar.style {
        BarStyle::Regular => vbar(canvas, x, top, bottom, thin),
        BarStyle::Dotted | BarStyle::Dashed => {
            let dash = if bar.style == BarStyle::Dotted { "1,2" } else { "4,2" };
            let w = num(BARLINE_WIDTH);
            canvas.line(
                x,
                top,
                x,
                bottom,
                &[("stroke", BARLINE_COLOR), ("stroke-width", &w), ("stroke-dasharray", dash)],
            )
        }
        BarStyle::Heavy => vbar(canvas, x + 1.5, top, bottom, heavy),
        BarStyle::LightLight => {
            vbar(canvas, x + 0.5, top, bottom, thin)?;
            vbar(canvas, x + 4.5, top, bottom, thin)
        }
        BarStyle::LightHeavy => {
            vbar(canvas, x + 0.5, top, bottom, thin)?;
            vbar(canvas, x + 3.5, top, bottom, heavy)
        }
        BarStyle::HeavyLight => {
            vbar(canvas, x + 1.5, top, bottom, heavy)?;
            vbar(canvas, x + 4.5, top, bottom, thin)
        }
        BarStyle::HeavyHeavy => {
            vbar(canvas, x + 1.0, top, bottom, heavy)?;
            vbar(canvas, x + 4.0, top, bottom, heavy)
        }
        BarStyle::None => Ok(()),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Annotations
// ═══════════════════════════════════════════════════════════════════════

/// Tuplet count centred over each start..stop group.
fn draw_tuplets(canvas: &mut dyn Canvas, row: &Row, style: &EmitStyle) -> fmt::Result {
    let mut open: Option<&NoteRenderer> = None;
    for r in &row.renderers {
        let Some(t) = r.tuplet else { continue };
        if t.start {
            open = Some(r);
        }
        if t.stop {
            let first = open.take().unwrap_or(r);
            let x = (first.x + r.x + r.glyph_width()) / 2.0;
            let y = row.y - cap_height(style) - SLUR_LIFT - SLUR_MAX_PULL;
            let size = num(style.note_font_size * 0.6);
            canvas.text(
                x,
                y,
                &t.count.to_string(),
                &[("font-size", &size), ("font-style", "italic"), ("text-anchor", "middle")],
            )?;
        }
    }
    Ok(())
}

/// Words directions above the row, or below it for a negative `default-y`.
fn draw_texts(canvas: &mut dyn Canvas, row: &Row, style: &EmitStyle) -> fmt::Result {
    let above = row.y - cap_height(style) - SLUR_LIFT - SLUR_MAX_PULL;
    let below = row.y + under_depth(row) - 3.0;
    let size = num(HEADER_FONT_SIZE);
    for r in &row.renderers {
        for t in &r.texts {
            let y = if t.default_y.map_or(false, |d| d < 0.0) { below } else { above };
            let x = match t.align {
                TextAlign::Left => r.x,
                TextAlign::Center => r.x + r.glyph_width() / 2.0,
                TextAlign::Right => r.x + r.glyph_width(),
            };
            let mut attrs = vec![("font-size", size.as_str()), ("text-anchor", t.align.anchor())];
            if t.italic {
                attrs.push(("font-style", "italic"));
            }
            canvas.text(x, y, &t.text, &attrs)?;
        }
    }
    Ok(())
}

fn draw_lyrics(canvas: &mut dyn Canvas, row: &Row, verses: &[u32], style: &EmitStyle) -> fmt::Result {
    let has_lyrics = row.renderers.iter().any(|r| !r.lyrics.is_empty());
    if !has_lyrics && row.hyphens.is_empty() {
        return Ok(());
    }
    let size = num(style.lyric_font_size);
    canvas.group(&[("class", "lyrics"), ("font-size", &size), ("fill", LYRICS_COLOR)])?;

    let line_of = |verse: u32| verses.iter().position(|&v| v == verse).unwrap_or(0);
    for r in &row.renderers {
        for l in &r.lyrics {
            canvas.text(r.x, lyric_baseline(row, line_of(l.verse), style), &l.text, &[])?;
        }
    }
    for h in &row.hyphens {
        canvas.text(h.x, lyric_baseline(row, line_of(h.verse), style), "-", &[])?;
    }
    for e in &row.extenders {
        let y = lyric_baseline(row, line_of(e.verse), style) + LYRIC_PADDING;
        stroke_line(canvas, e.x1, y, e.x2, y, LYRICS_COLOR, EXTENDER_WIDTH)?;
    }
    canvas.group_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SvgCanvas;
    use crate::model::BarlineLocation;
    use crate::renderer::layout::Underline;
    use crate::renderer::lyrics::Hyphen;
    use crate::renderer::note_renderer::LyricSegment;
    use crate::model::Syllabic;

    const STYLE: EmitStyle = EmitStyle {
        note_font_size: NOTE_FONT_SIZE,
        lyric_font_size: LYRIC_FONT_SIZE,
    };

    fn count(svg: &str, needle: &str) -> usize {
        svg.matches(needle).count()
    }

    #[test]
    fn octave_dots_match_the_offset() {
        let mut high = NoteRenderer::note(1, 2, false);
        high.y = 100.0;
        let mut low = NoteRenderer::note(5, -1, true);
        low.y = 100.0;

        let mut canvas = SvgCanvas::new();
        draw_renderer(&mut canvas, &high, &STYLE).unwrap();
        assert_eq!(count(canvas.as_str(), "<circle"), 2);
        assert!(canvas.as_str().contains(">1</text>"));

        let mut canvas = SvgCanvas::new();
        draw_renderer(&mut canvas, &low, &STYLE).unwrap();
        assert_eq!(count(canvas.as_str(), "<circle"), 1);
        // strikethrough
        assert_eq!(count(canvas.as_str(), "<line"), 1);
    }

    #[test]
    fn barline_styles() {
        let bar = |style, repeat| Barline {
            location: BarlineLocation::Right,
            style,
            repeat,
        };
        let lines = |b: Barline| {
            let mut canvas = SvgCanvas::new();
            draw_barline(&mut canvas, &b, 100.0, 80.0, 104.0).unwrap();
            let svg = canvas.into_string();
            (count(&svg, "<line"), count(&svg, "<circle"))
        };
        assert_eq!(lines(bar(BarStyle::Regular, None)), (1, 0));
        assert_eq!(lines(bar(BarStyle::LightHeavy, None)), (2, 0));
        assert_eq!(lines(bar(BarStyle::None, None)), (0, 0));
        assert_eq!(lines(bar(BarStyle::HeavyLight, Some(RepeatDirection::Forward))), (2, 2));
    }

    #[test]
    fn row_draws_lyrics_underlines_and_hyphens() {
        let mut a = NoteRenderer::note(1, 0, false);
        a.x = 30.0;
        a.y = 60.0;
        a.lyrics.push(LyricSegment {
            verse: 1,
            text: "Ha".into(),
            syllabic: Syllabic::Begin,
            extend: false,
        });
        let row = Row {
            renderers: vec![a],
            y: 60.0,
            lyric_top: 76.0,
            underlines: vec![Underline { level: 1, x1: 30.0, x2: 40.0 }],
            hyphens: vec![Hyphen { verse: 1, x: 50.0 }],
            ..Default::default()
        };
        let mut canvas = SvgCanvas::new();
        draw_row(&mut canvas, &row, &[1], &STYLE).unwrap();
        let svg = canvas.into_string();
        assert!(svg.contains(">Ha</text>"));
        assert!(svg.contains(r#"<text x="50" y="92">-</text>"#));
        assert!(svg.contains(r#"<line x1="30" y1="64" x2="40" y2="64""#));
    }

    #[test]
    fn empty_row_draws_nothing() {
        let mut canvas = SvgCanvas::new();
        draw_row(&mut canvas, &Row::default(), &[], &STYLE).unwrap();
        assert_eq!(canvas.as_str(), "");
    }
}
