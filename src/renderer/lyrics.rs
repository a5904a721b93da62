//! Lyric-driven widths, syllable hyphens and melisma extenders.

use crate::model::Syllabic;

use super::constants::*;
use super::glyph_width::{char_width, text_width};
use super::layout::Row;
use super::note_renderer::NoteRenderer;

/// A hyphen between two syllables of one verse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyphen {
    pub verse: u32,
    pub x: f64,
}

/// Underline continuing a syllable over the following notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extender {
    pub verse: u32,
    pub x1: f64,
    pub x2: f64,
}

// ── Widths ──────────────────────────────────────────────────────────

pub(super) fn hyphen_width(font_size: f64) -> f64 {
    char_width('-', font_size)
}

/// Room a syllable needs after itself: a space after a word end, room for
/// a hyphen inside a word.
fn trailing_allowance(syllabic: Syllabic, font_size: f64) -> f64 {
    if syllabic.continues() {
        hyphen_width(font_size) + 2.0 * LYRIC_PADDING
    } else {
        char_width(' ', font_size)
    }
}

/// Widen `r` to hold its longest syllable.
///
/// The width grows to the lyric plus its trailing allowance; a lyric more
/// than [`LYRIC_UPPER_BOUND`] wider than the glyph is capped so one long
/// word cannot stretch the row.
pub(super) fn apply_lyric_width(r: &mut NoteRenderer, font_size: f64) {
    let intrinsic = r.intrinsic_width();
    let lyric = r
        .lyrics
        .iter()
        .map(|l| text_width(&l.text, font_size) + LYRIC_PADDING + trailing_allowance(l.syllabic, font_size))
        .fold(0.0f64, f64::max);

    if lyric > intrinsic + LYRIC_UPPER_BOUND {
        r.width = intrinsic + LYRIC_UPPER_BOUND * LYRIC_CAP_SCALE;
        r.width_from_lyric = true;
    } else if lyric > intrinsic {
        r.width = lyric;
        r.width_from_lyric = true;
    } else {
        r.width = intrinsic;
    }
}

// ── Hyphens ─────────────────────────────────────────────────────────

/// X of a hyphen centred in the gap between two syllables.
pub fn hyphen_x(prev_end: f64, next_start: f64, font_size: f64) -> f64 {
    prev_end + (next_start - prev_end) / 2.0 - hyphen_width(font_size) / 2.0
}

struct PrevSyllable {
    row: usize,
    end: f64,
    syllabic: Syllabic,
}

/// Hyphens per row, for every verse.
///
/// A hyphen goes between a begin/middle syllable and the middle/end
/// syllable that follows it. When the word breaks across rows, the hyphen
/// trails the last syllable of the earlier row.
pub(super) fn place_hyphens(rows: &[Row], font_size: f64, right_edge: f64) -> Vec<Vec<Hyphen>> {
    let mut out: Vec<Vec<Hyphen>> = vec![Vec::new(); rows.len()];
    let verses = verse_numbers(rows);

    for verse in verses {
        let mut prev: Option<PrevSyllable> = None;
        for (ri, row) in rows.iter().enumerate() {
            for r in &row.renderers {
                let Some(lyric) = r.lyric(verse) else {
                    continue;
                };
                if let Some(p) = prev.take() {
                    if p.syllabic.continues() && lyric.syllabic.is_continuation() {
                        if p.row == ri {
                            out[ri].push(Hyphen {
                                verse,
                                x: hyphen_x(p.end, r.x, font_size),
                            });
                        } else {
                            let x = (p.end + LYRIC_PADDING).min(right_edge - hyphen_width(font_size));
                            out[p.row].push(Hyphen { verse, x });
                        }
                    }
                }
                prev = Some(PrevSyllable {
                    row: ri,
                    end: r.x + text_width(&lyric.text, font_size),
                    syllabic: lyric.syllabic,
                });
            }
        }
        // A word left open at the very end still shows its hyphen.
        if let Some(p) = prev {
            if p.syllabic.continues() {
                let x = (p.end + LYRIC_PADDING).min(right_edge - hyphen_width(font_size));
                out[p.row].push(Hyphen { verse, x });
            }
        }
    }
    out
}

// ── Extenders ───────────────────────────────────────────────────────

/// Melisma lines from an extended syllable to the last note sung on it.
pub(super) fn place_extenders(row: &Row, font_size: f64) -> Vec<Extender> {
    let mut out = Vec::new();
    let rs = &row.renderers;
    for (i, r) in rs.iter().enumerate() {
        for lyric in r.lyrics.iter().filter(|l| l.extend) {
            let mut last: Option<&NoteRenderer> = None;
            for next in &rs[i + 1..] {
                if next.lyric(lyric.verse).is_some() {
                    break;
                }
                if next.is_glyph() || next.is_dotted {
                    last = Some(next);
                }
            }
            if let Some(last) = last {
                let x1 = r.x + text_width(&lyric.text, font_size) + LYRIC_PADDING;
                let x2 = last.x + last.intrinsic_width().max(OCTAVE_DOT_RADIUS * 2.0);
                if x2 > x1 {
                    out.push(Extender {
                        verse: lyric.verse,
                        x1,
                        x2,
                    });
                }
            }
        }
    }
    out
}

/// Every verse number used anywhere, ascending.
pub(super) fn verse_numbers(rows: &[Row]) -> Vec<u32> {
    let mut verses: Vec<u32> = rows
        .iter()
        .flat_map(|row| row.renderers.iter())
        .flat_map(|r| r.lyrics.iter().map(|l| l.verse))
        .collect();
    verses.sort_unstable();
    verses.dedup();
    verses
}
