//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fmt;
use std::path::PathBuf;

use angka::canvas::{Attr, Canvas};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// One primitive drawn on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Start { width: f64, height: f64 },
    End,
    Group(Vec<(String, String)>),
    GroupEnd,
    Text { x: f64, y: f64, content: String },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Curve { start: (f64, f64), control: (f64, f64), end: (f64, f64), class: Option<String> },
}

/// Canvas double that keeps every call for inspection.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<Op>,
    pub raw: String,
}

impl RecordingCanvas {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn curves(&self) -> Vec<&Op> {
        self.ops.iter().filter(|op| matches!(op, Op::Curve { .. })).collect()
    }
}

fn owned(attrs: &[Attr<'_>]) -> Vec<(String, String)> {
    attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl Canvas for RecordingCanvas {
    fn start(&mut self, width: f64, height: f64) -> fmt::Result {
        self.ops.push(Op::Start { width, height });
        Ok(())
    }

    fn end(&mut self) -> fmt::Result {
        self.ops.push(Op::End);
        Ok(())
    }

    fn group(&mut self, attrs: &[Attr<'_>]) -> fmt::Result {
        self.ops.push(Op::Group(owned(attrs)));
        Ok(())
    }

    fn group_end(&mut self) -> fmt::Result {
        self.ops.push(Op::GroupEnd);
        Ok(())
    }

    fn text(&mut self, x: f64, y: f64, content: &str, _attrs: &[Attr<'_>]) -> fmt::Result {
        self.ops.push(Op::Text { x, y, content: content.to_string() });
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, _attrs: &[Attr<'_>]) -> fmt::Result {
        self.ops.push(Op::Line { x1, y1, x2, y2 });
        Ok(())
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, _attrs: &[Attr<'_>]) -> fmt::Result {
        self.ops.push(Op::Circle { cx, cy, r });
        Ok(())
    }

    fn quadratic_bezier(
        &mut self,
        start: (f64, f64),
        control: (f64, f64),
        end: (f64, f64),
        attrs: &[Attr<'_>],
    ) -> fmt::Result {
        let class = attrs.iter().find(|(k, _)| *k == "class").map(|(_, v)| v.to_string());
        self.ops.push(Op::Curve { start, control, end, class });
        Ok(())
    }

    fn writer(&mut self) -> &mut dyn fmt::Write {
        &mut self.raw
    }
}
