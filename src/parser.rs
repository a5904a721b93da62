//! MusicXML parser: converts MusicXML XML into the Score data model.
//!
//! Only what numbered notation needs is read. Optional elements fall back to
//! sensible defaults; a document that is not XML, not `score-partwise`, or
//! that carries an unreadable pitch is rejected as malformed.

use roxmltree::{Document, Node};

use crate::error::{RenderError, Result};
use crate::model::*;

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| RenderError::MalformedInput(format!("XML parse error: {e}")))?;
    let root = doc.root_element();

    if root.tag_name().name() != "score-partwise" {
        return Err(RenderError::MalformedInput(format!(
            "unsupported root element '{}', only 'score-partwise' is supported",
            root.tag_name().name()
        )));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "identification" => parse_identification(&child, &mut score),
            "credit" => parse_credit(&child, &mut score),
            "part-list" => parse_part_list(&child, &mut score),
            "part" => parse_part(&child, &mut score)?,
            _ => {}
        }
    }

    log::debug!(
        "parsed score with {} part(s), {} measure(s)",
        score.parts.len(),
        score.measure_count()
    );
    Ok(score)
}

// ─── Work ────────────────────────────────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        // <credit type="title"> takes priority.
        if child.tag_name().name() == "work-title" && score.title.is_none() {
            score.title = trimmed_text(&child);
        }
    }
}

// ─── Identification ──────────────────────────────────────────────────

fn parse_identification(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "creator" => {
                let text = trimmed_text(&child);
                match child.attribute("type").unwrap_or("") {
                    "composer" if score.composer.is_none() => score.composer = text,
                    "lyricist" | "poet" if score.lyricist.is_none() => score.lyricist = text,
                    _ => {}
                }
            }
            "encoding" => {
                for enc in child.children().filter(|n| n.is_element()) {
                    if enc.tag_name().name() == "software" {
                        score.software = trimmed_text(&enc);
                    }
                }
            }
            _ => {}
        }
    }
}

// ─── Credits ─────────────────────────────────────────────────────────

fn parse_credit(node: &Node, score: &mut Score) {
    let mut credit_type = String::new();
    let mut credit_text = String::new();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "credit-type" => credit_type = child.text().unwrap_or("").trim().to_string(),
            "credit-words" => {
                let text = child.text().unwrap_or("").trim();
                if !text.is_empty() {
                    if !credit_text.is_empty() {
                        credit_text.push(' ');
                    }
                    credit_text.push_str(text);
                }
            }
            _ => {}
        }
    }
    if credit_text.is_empty() {
        return;
    }

    // <credit> values are the primary source; <work-title> and <creator>
    // are fallbacks.
    match credit_type.as_str() {
        "title" => score.title = Some(credit_text),
        "composer" => score.composer = Some(credit_text),
        "lyricist" => score.lyricist = Some(credit_text),
        _ => {}
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() != "score-part" {
            continue;
        }
        let mut part = Part {
            id: child.attribute("id").unwrap_or("").to_string(),
            ..Default::default()
        };
        for sp in child.children().filter(|n| n.is_element()) {
            if sp.tag_name().name() == "part-name" {
                part.name = sp.text().unwrap_or("").trim().to_string();
            }
        }
        score.parts.push(part);
    }
}

// ─── Part (measures) ─────────────────────────────────────────────────

/// Directions waiting for the next note of the part.
#[derive(Default)]
struct PendingDirections {
    texts: Vec<MeasureText>,
}

fn parse_part(node: &Node, score: &mut Score) -> Result<()> {
    let part_id = node.attribute("id").unwrap_or("");

    let Some(part) = score.parts.iter_mut().find(|p| p.id == part_id) else {
        log::warn!("part '{part_id}' is missing from the part list, skipped");
        return Ok(());
    };

    let mut pending = PendingDirections::default();
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "measure" {
            parse_measure(&child, &mut part.measures, &mut pending)?;
        }
    }
    Ok(())
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node, measures: &mut Vec<Measure>, pending: &mut PendingDirections) -> Result<()> {
    let number = node
        .attribute("number")
        .and_then(|n| n.parse::<i32>().ok())
        .unwrap_or(0);

    let mut measure = Measure {
        number,
        implicit: node.attribute("implicit") == Some("yes"),
        ..Default::default()
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => measure.attributes = Some(parse_attributes(&child)),
            "note" => {
                let mut note = parse_note(&child, number)?;
                if !note.chord && !note.grace {
                    note.texts.append(&mut pending.texts);
                }
                measure.notes.push(note);
            }
            "barline" => measure.barlines.push(parse_barline(&child)),
            "direction" => {
                let (texts, line_break) = parse_direction(&child);
                pending.texts.extend(texts);
                if line_break {
                    mark_line_break(&mut measure, measures);
                }
            }
            "print" => {
                let breaks = child.attribute("new-system") == Some("yes")
                    || child.attribute("new-page") == Some("yes");
                if breaks {
                    // The row ends after the previous measure.
                    if let Some(prev) = measures.last_mut() {
                        prev.line_break = true;
                    }
                }
            }
            _ => {}
        }
    }

    measures.push(measure);
    Ok(())
}

/// Flag the most recent melody note, looking back into earlier measures.
fn mark_line_break(current: &mut Measure, earlier: &mut [Measure]) {
    let in_current = current.notes.iter_mut().rev().find(|n| !n.chord && !n.grace);
    let note = match in_current {
        Some(n) => Some(n),
        None => earlier
            .iter_mut()
            .rev()
            .find_map(|m| m.notes.iter_mut().rev().find(|n| !n.chord && !n.grace)),
    };
    match note {
        Some(n) => n.new_line = true,
        None => log::debug!("line-break direction in measure {} precedes every note", current.number),
    }
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node) -> Attributes {
    let mut attrs = Attributes::default();
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "divisions" => attrs.divisions = parse_i32(&child),
            "key" => attrs.key = Some(parse_key(&child)),
            "time" => attrs.time = Some(parse_time(&child)),
            _ => {}
        }
    }
    attrs
}

fn parse_key(node: &Node) -> Key {
    let mut key = Key { fifths: 0, mode: None };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "fifths" => key.fifths = parse_i32(&child).unwrap_or(0),
            "mode" => key.mode = trimmed_text(&child),
            _ => {}
        }
    }
    key
}

fn parse_time(node: &Node) -> TimeSignature {
    let mut ts = TimeSignature::default();
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "beats" => ts.beats = parse_i32(&child).unwrap_or(4),
            "beat-type" => ts.beat_type = parse_i32(&child).unwrap_or(4),
            _ => {}
        }
    }
    ts
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node, measure: i32) -> Result<Note> {
    let mut note = Note::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => note.pitch = Some(parse_pitch(&child, measure)?),
            "duration" => note.duration = parse_i32(&child).unwrap_or(0),
            "type" => note.note_type = child.text().and_then(NoteType::parse),
            "dot" => note.dots += 1,
            "rest" => {
                note.rest = true;
                note.measure_rest = child.attribute("measure") == Some("yes");
            }
            "grace" => note.grace = true,
            "chord" => note.chord = true,
            "accidental" => note.accidental = child.text().and_then(Accidental::parse),
            "beam" => {
                let number = child.attribute("number").and_then(|n| n.parse().ok()).unwrap_or(1);
                if let Some(state) = child.text().and_then(BeamState::parse) {
                    note.beams.push(Beam { number, state });
                }
            }
            "tie" => apply_tie(&child, &mut note),
            "time-modification" => note.time_modification = parse_time_modification(&child),
            "notations" => parse_notations(&child, &mut note),
            "lyric" => {
                if let Some(lyric) = parse_lyric(&child) {
                    note.lyrics.push(lyric);
                }
            }
            _ => {}
        }
    }

    if note.rest && note.note_type.is_none() {
        note.measure_rest = true;
    }
    Ok(note)
}

fn parse_pitch(node: &Node, measure: i32) -> Result<Pitch> {
    let mut step = None;
    let mut octave = 4;
    let mut alter = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => step = child.text().and_then(Step::parse),
            "octave" => octave = parse_i32(&child).unwrap_or(4),
            "alter" => alter = parse_f64(&child),
            _ => {}
        }
    }
    let step = step.ok_or_else(|| {
        RenderError::MalformedInput(format!("pitch without a readable step in measure {measure}"))
    })?;
    Ok(Pitch { step, octave, alter })
}

/// `<tie>` and `<tied>` carry the same start/stop information.
fn apply_tie(node: &Node, note: &mut Note) {
    match node.attribute("type") {
        Some("start") => note.tie_start = true,
        Some("stop") => note.tie_stop = true,
        _ => {}
    }
}

fn parse_time_modification(node: &Node) -> Option<TimeModification> {
    let mut actual = None;
    let mut normal = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "actual-notes" => actual = parse_i32(&child),
            "normal-notes" => normal = parse_i32(&child),
            _ => {}
        }
    }
    match (actual, normal) {
        (Some(actual), Some(normal)) if actual > 0 && normal > 0 => Some(TimeModification { actual, normal }),
        _ => None,
    }
}

fn parse_start_stop(node: &Node) -> Option<StartStop> {
    match node.attribute("type") {
        Some("start") => Some(StartStop::Start),
        Some("stop") => Some(StartStop::Stop),
        _ => None,
    }
}

fn parse_notations(node: &Node, note: &mut Note) {
    for nc in node.children().filter(|n| n.is_element()) {
        match nc.tag_name().name() {
            "slur" => {
                if let Some(kind) = parse_start_stop(&nc) {
                    let number = nc.attribute("number").and_then(|n| n.parse().ok()).unwrap_or(1);
                    note.slurs.push(SlurEvent { kind, number });
                }
            }
            "tied" => apply_tie(&nc, note),
            "tuplet" => note.tuplet = parse_start_stop(&nc).map(|kind| TupletEvent { kind }),
            "articulations" => {
                if nc
                    .children()
                    .any(|a| a.is_element() && a.tag_name().name() == "breath-mark")
                {
                    note.breath_mark = true;
                }
            }
            _ => {}
        }
    }
}

fn parse_lyric(node: &Node) -> Option<Lyric> {
    let number = node.attribute("number").and_then(|n| n.parse().ok()).unwrap_or(1);
    let mut text = String::new();
    let mut syllabic = Syllabic::Single;
    let mut extend = false;
    for lc in node.children().filter(|n| n.is_element()) {
        match lc.tag_name().name() {
            "text" => text.push_str(lc.text().unwrap_or("").trim()),
            "syllabic" => syllabic = Syllabic::parse(lc.text().unwrap_or("")),
            "extend" => extend = lc.attribute("type").map_or(true, |t| t != "stop"),
            _ => {}
        }
    }
    if text.is_empty() {
        return None;
    }
    Some(Lyric {
        number,
        text,
        syllabic,
        extend,
    })
}

// ─── Barline ─────────────────────────────────────────────────────────

fn parse_barline(node: &Node) -> Barline {
    let location = match node.attribute("location") {
        Some("left") => BarlineLocation::Left,
        _ => BarlineLocation::Right,
    };
    let mut barline = Barline {
        location,
        style: BarStyle::Regular,
        repeat: None,
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "bar-style" => barline.style = BarStyle::parse(child.text().unwrap_or("")),
            "repeat" => {
                barline.repeat = match child.attribute("direction") {
                    Some("backward") => Some(RepeatDirection::Backward),
                    _ => Some(RepeatDirection::Forward),
                };
            }
            _ => {}
        }
    }
    barline
}

// ─── Direction ───────────────────────────────────────────────────────

/// Words texts of a direction, and whether it asks for a line break.
fn parse_direction(node: &Node) -> (Vec<MeasureText>, bool) {
    let mut texts = Vec::new();
    let mut line_break = false;
    let below = node.attribute("placement") == Some("below");

    for dt in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "direction-type")
    {
        for child in dt.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "words" => {
                    let Some(text) = trimmed_text(&child) else {
                        continue;
                    };
                    let default_y = child
                        .attribute("default-y")
                        .and_then(|v| v.parse::<f64>().ok())
                        .or(if below { Some(-1.0) } else { None });
                    texts.push(MeasureText {
                        text,
                        default_y,
                        align: TextAlign::parse(child.attribute("justify").unwrap_or("")),
                        italic: child.attribute("font-style") == Some("italic"),
                    });
                }
                "other-direction" => {
                    if child.text().map(str::trim) == Some("line-break") {
                        line_break = true;
                    }
                }
                _ => {}
            }
        }
    }
    (texts, line_break)
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn trimmed_text(node: &Node) -> Option<String> {
    node.text().map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text()?.trim().parse().ok()
}
