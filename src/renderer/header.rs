//! Header and footer text around the music: hymn number and title, key and
//! time signature, credits, cross references and the copyright line.

use std::fmt;

use crate::canvas::{num, Canvas};
use crate::metadata::HymnMetadata;
use crate::model::TimeSignature;
use crate::theory::KeySignature;

use super::constants::*;
use super::layout::RowBounds;
use super::verses::{justify_credit, wrap_text, write_rich_text};

/// One positioned line of header text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    /// May contain `<i>…</i>`
    pub text: String,
    pub font_size: f64,
    pub anchor: &'static str,
    pub bold: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub height: f64,
}

/// `"12. Title"`, or just the title when there is no number.
fn heading(meta: &HymnMetadata) -> String {
    match (meta.number, meta.title.trim()) {
        (0, title) => title.to_string(),
        (n, "") => n.to_string(),
        (n, title) => format!("{n}. {title}"),
    }
}

/// `"do = d  3/4"`
pub fn key_time_label(key: &KeySignature, time: TimeSignature) -> String {
    format!("{}  {}/{}", key.humanized(), time.beats, time.beat_type)
}

/// Lay out the header block starting at `top`.
pub(super) fn plan_header(
    meta: &HymnMetadata,
    key: &KeySignature,
    time: TimeSignature,
    bounds: RowBounds,
    top: f64,
) -> TextBlock {
    let width = bounds.right - bounds.left;
    let mut lines = Vec::new();
    let mut y = top;

    let title = heading(meta);
    if !title.is_empty() {
        for text in wrap_text(&title, width, TITLE_FONT_SIZE) {
            y += TITLE_FONT_SIZE;
            lines.push(TextLine {
                x: bounds.left + width / 2.0,
                y,
                text,
                font_size: TITLE_FONT_SIZE,
                anchor: "middle",
                bold: true,
            });
        }
        y += HEADER_LINE_HEIGHT - TITLE_FONT_SIZE;
    }

    y += HEADER_LINE_HEIGHT;
    lines.push(TextLine {
        x: bounds.left,
        y,
        text: key_time_label(key, time),
        font_size: HEADER_FONT_SIZE,
        anchor: "start",
        bold: false,
    });

    if !meta.lyricist.is_empty() || !meta.composer.is_empty() {
        y += HEADER_LINE_HEIGHT;
        let (text, anchor, x) = if meta.lyricist.is_empty() {
            (meta.composer.clone(), "end", bounds.right)
        } else {
            (
                justify_credit(&meta.lyricist, &meta.composer, width, HEADER_FONT_SIZE),
                "start",
                bounds.left,
            )
        };
        lines.push(TextLine {
            x,
            y,
            text,
            font_size: HEADER_FONT_SIZE,
            anchor,
            bold: false,
        });
    }

    if !meta.cross_references.is_empty() {
        let refs = meta.cross_references.join(", ");
        for text in wrap_text(&refs, width, HEADER_FONT_SIZE) {
            y += HEADER_LINE_HEIGHT;
            lines.push(TextLine {
                x: bounds.right,
                y,
                text,
                font_size: HEADER_FONT_SIZE,
                anchor: "end",
                bold: false,
            });
        }
    }

    y += HEADER_GAP;
    TextBlock {
        lines,
        height: y - top,
    }
}

/// The copyright footer, wrapped to the page width.
pub(super) fn plan_footer(copyright: &str, bounds: RowBounds, top: f64) -> TextBlock {
    let mut block = TextBlock::default();
    if copyright.trim().is_empty() {
        return block;
    }
    let mut y = top;
    for text in wrap_text(copyright, bounds.right - bounds.left, HEADER_FONT_SIZE) {
        y += HEADER_LINE_HEIGHT;
        block.lines.push(TextLine {
            x: bounds.left,
            y,
            text,
            font_size: HEADER_FONT_SIZE,
            anchor: "start",
            bold: false,
        });
    }
    block.height = y - top;
    block
}

pub(super) fn draw_text_block(canvas: &mut dyn Canvas, block: &TextBlock, class: &str) -> fmt::Result {
    if block.lines.is_empty() {
        return Ok(());
    }
    canvas.group(&[("class", class), ("fill", HEADER_COLOR)])?;
    for line in &block.lines {
        let size = num(line.font_size);
        let mut attrs = vec![("font-size", size.as_str()), ("text-anchor", line.anchor)];
        if line.bold {
            attrs.push(("font-weight", "bold"));
        }
        write_rich_text(canvas, line.x, line.y, &line.text, &attrs)?;
    }
    canvas.group_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Mode;
    use pretty_assertions::assert_eq;

    const BOUNDS: RowBounds = RowBounds { left: 30.0, right: 690.0 };

    fn meta() -> HymnMetadata {
        HymnMetadata {
            number: 12,
            title: "Amazing Grace".into(),
            lyricist: "Words: <i>John Newton</i>".into(),
            composer: "Music: Traditional".into(),
            cross_references: vec!["See 14".into()],
            copyright: "Public domain".into(),
            verses: Vec::new(),
        }
    }

    #[test]
    fn header_lines_in_order() {
        let key = KeySignature::new(2, Mode::Major).unwrap();
        let block = plan_header(&meta(), &key, TimeSignature { beats: 3, beat_type: 4 }, BOUNDS, 30.0);
        let texts: Vec<&str> = block.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts[0], "12. Amazing Grace");
        assert_eq!(texts[1], "do = d  3/4");
        assert!(texts[2].starts_with("Words: <i>John Newton</i>\u{a0}"));
        assert_eq!(texts[3], "See 14");
        assert_eq!(block.lines.len(), 4);

        let ys: Vec<f64> = block.lines.iter().map(|l| l.y).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
        assert!(block.height > ys[3] - 30.0);
    }

    #[test]
    fn blank_metadata_still_shows_the_key() {
        let key = KeySignature::new(-1, Mode::Minor).unwrap();
        let block = plan_header(&HymnMetadata::default(), &key, TimeSignature::default(), BOUNDS, 0.0);
        assert_eq!(block.lines.len(), 1);
        assert!(block.lines[0].text.ends_with("4/4"));
    }

    #[test]
    fn empty_copyright_has_no_footer() {
        assert_eq!(plan_footer("  ", BOUNDS, 500.0), TextBlock::default());
        let footer = plan_footer("© 2001", BOUNDS, 500.0);
        assert_eq!(footer.lines.len(), 1);
        assert_eq!(footer.height, HEADER_LINE_HEIGHT);
    }
}
