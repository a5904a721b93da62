//! Rich text helpers and the verse blocks printed below the music.
//!
//! Verse text comes from the metadata repository as lines of words, each
//! with its syllable breakdown. Blocks are either full width (style row 12)
//! or half width (style row 6, two columns side by side).

use std::fmt::{self, Write};

use crate::canvas::{escape_attr, escape_text, num, Attr, Canvas};
use crate::error::Result;
use crate::metadata::{Verse, VerseWord};

use super::constants::*;
use super::glyph_width::{char_width, markup_width, text_width, NBSP};
use super::layout::RowBounds;

// ═══════════════════════════════════════════════════════════════════════
// Rich text
// ═══════════════════════════════════════════════════════════════════════

/// Greedy word wrap of text that may carry `<i>…</i>` spans.
///
/// A span still open at the end of a line is closed there and re-opened at
/// the start of the next line, so each line is well formed on its own.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let space = char_width(' ', font_size);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0;
    let mut italic = false;

    for word in text.split_whitespace() {
        let w = markup_width(word, font_size);
        if !line.is_empty() && width + space + w > max_width {
            if italic {
                line.push_str("</i>");
            }
            lines.push(std::mem::take(&mut line));
            width = 0.0;
            if italic {
                line.push_str("<i>");
            }
        }
        if width > 0.0 {
            line.push(' ');
            width += space;
        }
        line.push_str(word);
        width += w;

        if let (Some(open), close) = (word.rfind("<i>"), word.rfind("</i>")) {
            italic = close.map_or(true, |c| open > c);
        } else if word.contains("</i>") {
            italic = false;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split a line into `(text, italic)` runs.
fn italic_runs(line: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut rest = line;
    let mut italic = false;
    loop {
        let tag = if italic { "</i>" } else { "<i>" };
        match rest.find(tag) {
            Some(at) => {
                if at > 0 {
                    runs.push((&rest[..at], italic));
                }
                rest = &rest[at + tag.len()..];
                italic = !italic;
            }
            None => {
                if !rest.is_empty() {
                    runs.push((rest, italic));
                }
                return runs;
            }
        }
    }
}

/// Write one line of rich text, italic spans as `<tspan>`s.
pub(super) fn write_rich_text(
    canvas: &mut dyn Canvas,
    x: f64,
    y: f64,
    line: &str,
    attrs: &[Attr<'_>],
) -> fmt::Result {
    let runs = italic_runs(line);
    if runs.iter().all(|(_, italic)| !italic) {
        let plain: String = runs.iter().map(|(t, _)| *t).collect();
        return canvas.text(x, y, &plain, attrs);
    }

    let out = canvas.writer();
    write!(out, r#"<text x="{}" y="{}""#, num(x), num(y))?;
    for (name, value) in attrs {
        write!(out, r#" {}="{}""#, name, escape_attr(value))?;
    }
    out.write_str(">")?;
    for (text, italic) in runs {
        if italic {
            write!(out, r#"<tspan font-style="italic">{}</tspan>"#, escape_text(text))?;
        } else {
            out.write_str(&escape_text(text))?;
        }
    }
    out.write_str("</text>\n")
}

/// Join two credits into one line exactly `width` wide, padding the middle
/// with non-breaking spaces.
pub fn justify_credit(left: &str, right: &str, width: f64, font_size: f64) -> String {
    if right.is_empty() {
        return left.to_string();
    }
    let used = markup_width(left, font_size) + markup_width(right, font_size);
    let pad = char_width(NBSP, font_size);
    let count = (((width - used) / pad).floor() as i64).max(1) as usize;
    let mut out = String::with_capacity(left.len() + right.len() + count * 2);
    out.push_str(left);
    out.extend(std::iter::repeat(NBSP).take(count));
    out.push_str(right);
    out
}

// ═══════════════════════════════════════════════════════════════════════
// Verse blocks
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub x: f64,
    pub word: VerseWord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerseBlock {
    pub verse_number: u32,
    pub x: f64,
    /// Baseline of the first line
    pub y: f64,
    pub width: f64,
    pub lines: Vec<Vec<PlacedWord>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerseLayout {
    pub blocks: Vec<VerseBlock>,
    pub height: f64,
}

fn word_text(w: &VerseWord) -> String {
    if w.word.is_empty() {
        w.breakdown.concat()
    } else {
        w.word.clone()
    }
}

/// Place words left to right, wrapping onto new lines when they overflow.
fn place_words(lines: Vec<Vec<VerseWord>>, x: f64, width: f64) -> Vec<Vec<PlacedWord>> {
    let space = char_width(' ', VERSE_FONT_SIZE);
    let mut out = Vec::new();
    for line in lines {
        let mut placed = Vec::new();
        let mut cursor = x;
        for word in line {
            let w = text_width(&word_text(&word), VERSE_FONT_SIZE);
            if !placed.is_empty() && cursor + w > x + width {
                out.push(std::mem::take(&mut placed));
                cursor = x;
            }
            placed.push(PlacedWord { x: cursor, word });
            cursor += w + space;
        }
        out.push(placed);
    }
    out
}

/// Position every verse block, starting at `top`.
///
/// Verses are grouped by their `row`; a row's height is that of its
/// tallest block.
pub fn plan_verses(verses: &[Verse], bounds: RowBounds, top: f64) -> Result<VerseLayout> {
    let mut sorted: Vec<&Verse> = verses.iter().collect();
    sorted.sort_by_key(|v| (v.row, v.column, v.verse_number));

    let full = bounds.right - bounds.left;
    let half = (full - VERSE_COLUMN_GAP) / 2.0;
    let mut layout = VerseLayout::default();
    let mut y = top;
    let mut i = 0;

    while i < sorted.len() {
        let row = sorted[i].row;
        let mut tallest = 0usize;
        while i < sorted.len() && sorted[i].row == row {
            let verse = sorted[i];
            let (x, width) = if verse.is_full_width() {
                (bounds.left, full)
            } else if verse.column <= 1 {
                (bounds.left, half)
            } else {
                (bounds.left + half + VERSE_COLUMN_GAP, half)
            };
            let lines = place_words(
                verse.lines()?,
                x + VERSE_NUMBER_WIDTH,
                width - VERSE_NUMBER_WIDTH,
            );
            tallest = tallest.max(lines.len());
            layout.blocks.push(VerseBlock {
                verse_number: verse.verse_number,
                x,
                y: y + VERSE_FONT_SIZE,
                width,
                lines,
            });
            i += 1;
        }
        y += tallest as f64 * VERSE_LINE_HEIGHT + VERSE_BLOCK_GAP;
    }
    layout.height = y - top;
    log::debug!("planned {} verse block(s)", layout.blocks.len());
    Ok(layout)
}

/// Arc endpoints under each combined syllable boundary of `word`.
pub(super) fn combined_arcs(word: &PlacedWord, baseline: f64) -> Vec<((f64, f64), (f64, f64), (f64, f64))> {
    let mut out = Vec::new();
    for &k in &word.word.combined {
        if k + 1 >= word.word.breakdown.len() {
            continue;
        }
        let prefix: String = word.word.breakdown[..=k].concat();
        let cx = word.x + text_width(&prefix, VERSE_FONT_SIZE);
        let half = char_width(' ', VERSE_FONT_SIZE);
        let y = baseline + LYRIC_PADDING;
        out.push(((cx - half, y), (cx, y + COMBINED_ARC_DEPTH), (cx + half, y)));
    }
    out
}

pub(super) fn draw_verses(canvas: &mut dyn Canvas, layout: &VerseLayout) -> fmt::Result {
    if layout.blocks.is_empty() {
        return Ok(());
    }
    let size = num(VERSE_FONT_SIZE);
    canvas.group(&[("class", "verses"), ("font-size", &size), ("fill", LYRICS_COLOR)])?;
    for block in &layout.blocks {
        canvas.text(block.x, block.y, &format!("{}.", block.verse_number), &[])?;
        for (li, line) in block.lines.iter().enumerate() {
            let baseline = block.y + li as f64 * VERSE_LINE_HEIGHT;
            for word in line {
                canvas.text(word.x, baseline, &word_text(&word.word), &[])?;
                for (start, control, end) in combined_arcs(word, baseline) {
                    canvas.quadratic_bezier(
                        start,
                        control,
                        end,
                        &[("fill", "none"), ("stroke", LYRICS_COLOR), ("stroke-width", "0.8")],
                    )?;
                }
            }
        }
    }
    canvas.group_end()
}
