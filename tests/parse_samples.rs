//! Integration tests: parse the fixture scores under tests/fixtures/.

use angka::{parse_bytes, parse_file, score_to_json, BarStyle, RenderError, Score, StartStop, Syllabic};
use pretty_assertions::assert_eq;

mod common;
use common::fixture;

fn amazing_grace() -> Score {
    parse_file(fixture("amazing-grace.musicxml")).expect("Failed to parse amazing-grace.musicxml")
}

#[test]
fn identification() {
    let score = amazing_grace();
    assert_eq!(score.title.as_deref(), Some("Amazing Grace"));
    assert_eq!(score.composer.as_deref(), Some("Traditional"));
    assert_eq!(score.lyricist.as_deref(), Some("John Newton"));
    assert_eq!(score.version.as_deref(), Some("3.1"));
    assert_eq!(score.software.as_deref(), Some("Hand written"));
}

#[test]
fn measures_and_attributes() {
    let score = amazing_grace();
    let part = &score.parts[0];
    assert_eq!(part.id, "P1");
    assert_eq!(part.name, "Melody");
    assert_eq!(part.measures.len(), 5);

    let m0 = &part.measures[0];
    assert_eq!(m0.number, 0);
    assert!(m0.implicit, "pickup measure should be implicit");

    let key = score.initial_key().expect("key");
    assert_eq!(key.fifths, 1);
    assert_eq!(key.mode.as_deref(), Some("major"));
    let time = m0.attributes.as_ref().and_then(|a| a.time).expect("time");
    assert_eq!((time.beats, time.beat_type), (3, 4));
}

#[test]
fn new_system_marks_the_previous_measure() {
    let score = amazing_grace();
    let breaks: Vec<bool> = score.parts[0].measures.iter().map(|m| m.line_break).collect();
    assert_eq!(breaks, vec![false, false, true, false, false]);
}

#[test]
fn lyrics_slurs_ties_and_barlines() {
    let score = amazing_grace();
    let ms = &score.parts[0].measures;

    let first = &ms[1].notes[0];
    assert_eq!(first.lyrics.len(), 2);
    assert_eq!(first.lyrics[0].syllabic, Syllabic::Begin);
    assert_eq!(ms[1].notes[1].lyrics[0].syllabic, Syllabic::End);

    assert_eq!(ms[1].notes[1].slurs[0].kind, StartStop::Start);
    assert_eq!(ms[1].notes[2].slurs[0].kind, StartStop::Stop);

    assert!(ms[4].notes[0].tie_start);
    assert!(ms[4].notes[1].tie_stop);
    assert!(ms[4].notes[0].lyrics[0].extend);
    assert_eq!(ms[4].right_barline().map(|b| b.style), Some(BarStyle::LightHeavy));

    assert_eq!(ms[3].notes[0].texts[0].text, "softly");
    assert!(ms[3].notes[0].texts[0].italic);
}

#[test]
fn bytes_autodetect_xml() {
    let data = std::fs::read(fixture("d-major-slur.musicxml")).unwrap();
    let score = parse_bytes(&data, None).unwrap();
    assert_eq!(score.title.as_deref(), Some("Two Notes"));
    assert_eq!(score.measure_count(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file(fixture("no-such-hymn.musicxml")).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
}

#[test]
fn json_round_trip_keeps_the_melody() {
    let score = amazing_grace();
    let json = score_to_json(&score).unwrap();
    let back: Score = serde_json::from_str(&json).unwrap();
    assert_eq!(back.measure_count(), score.measure_count());
    assert_eq!(back.parts[0].measures[2].notes.len(), 2);
}
