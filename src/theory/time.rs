//! Time signatures in effect across a piece.

use crate::model::{Measure, TimeSignature};

/// One signature change: `signature` applies from `measure` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEntry {
    pub measure: i32,
    pub signature: TimeSignature,
}

/// Ordered list of time-signature changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSignatures {
    entries: Vec<TimeEntry>,
}

impl TimeSignatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `<time>` change in measure order.
    pub fn from_measures(measures: &[Measure]) -> Self {
        let mut times = Self::new();
        for m in measures {
            if let Some(time) = m.attributes.as_ref().and_then(|a| a.time) {
                times.push(m.number, time);
            }
        }
        times
    }

    /// Record a change; entries stay sorted by measure number.
    pub fn push(&mut self, measure: i32, signature: TimeSignature) {
        let pos = self.entries.partition_point(|e| e.measure <= measure);
        self.entries.insert(pos, TimeEntry { measure, signature });
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    /// The signature in effect at `measure`: the last entry at or before
    /// it, the first entry for a pickup before any change, 4/4 when empty.
    pub fn at(&self, measure: i32) -> TimeSignature {
        self.entries
            .iter()
            .rev()
            .find(|e| e.measure <= measure)
            .or_else(|| self.entries.first())
            .map(|e| e.signature)
            .unwrap_or_default()
    }

    /// The initial signature, printed in the header.
    pub fn first(&self) -> TimeSignature {
        self.entries.first().map(|e| e.signature).unwrap_or_default()
    }

    /// Beats per measure counted in the unit `note_length` uses (a quarter,
    /// or an eighth under x/8).
    pub fn measure_beats(&self, measure: i32) -> f64 {
        let ts = self.at(measure);
        let quarters = f64::from(ts.beats) * 4.0 / f64::from(ts.beat_type.max(1));
        if ts.beat_type == 8 {
            quarters * 2.0
        } else {
            quarters
        }
    }
}
