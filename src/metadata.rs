//! Hymn metadata: titles, credits and verse text stored outside the score.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::model::Score;

/// Everything printed around the numbered-notation rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HymnMetadata {
    pub number: u32,
    pub title: String,
    /// Words credit; may contain `<i>…</i>`
    pub lyricist: String,
    /// Music credit; may contain `<i>…</i>`
    pub composer: String,
    pub cross_references: Vec<String>,
    pub copyright: String,
    pub verses: Vec<Verse>,
}

impl HymnMetadata {
    /// Metadata with only the number set, used when a lookup is ignored.
    pub fn blank(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Credits taken from the score's own identification block.
    pub fn from_score(score: &Score) -> Self {
        Self {
            title: score.title.clone().unwrap_or_default(),
            lyricist: score.lyricist.clone().unwrap_or_default(),
            composer: score.composer.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// One stanza printed below the music.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verse {
    pub verse_number: u32,
    /// Block row, top to bottom
    pub row: u32,
    /// Column within the row (1 = left)
    pub column: u32,
    /// 12 spans the full width; 6 takes half
    pub style_row: u32,
    /// JSON: `[[{"word": .., "breakdown": [..], "combined": [..]}, ..], ..]`
    pub content: String,
}

/// A word of verse text and its syllable breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerseWord {
    pub word: String,
    pub breakdown: Vec<String>,
    /// Breakdown indices joined to the next syllable by an arc
    pub combined: Vec<usize>,
}

impl Verse {
    pub fn is_full_width(&self) -> bool {
        self.style_row != 6
    }

    /// Decode `content` into lines of words.
    ///
    /// Undecodable content is a [`RenderError::Metadata`] failure, handled
    /// like any other metadata problem.
    pub fn lines(&self) -> Result<Vec<Vec<VerseWord>>> {
        if self.content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.content)
            .map_err(|e| RenderError::Metadata(format!("verse {} content: {e}", self.verse_number)))
    }
}

/// Source of hymn metadata (a database in production).
pub trait MetadataRepository {
    /// Fails with [`RenderError::NotFound`] when `number` is unknown.
    fn hymn_metadata(&self, number: u32) -> Result<HymnMetadata>;
}

/// Repository backed by a map, for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    hymns: HashMap<u32, HymnMetadata>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metadata: HymnMetadata) {
        self.hymns.insert(metadata.number, metadata);
    }

    /// Load a JSON array of [`HymnMetadata`].
    pub fn from_json(json: &str) -> Result<Self> {
        let list: Vec<HymnMetadata> = serde_json::from_str(json)?;
        let mut repo = Self::new();
        for m in list {
            repo.insert(m);
        }
        Ok(repo)
    }
}

impl MetadataRepository for InMemoryRepository {
    fn hymn_metadata(&self, number: u32) -> Result<HymnMetadata> {
        self.hymns
            .get(&number)
            .cloned()
            .ok_or(RenderError::NotFound(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verse_content_decodes() {
        let verse = Verse {
            verse_number: 1,
            row: 1,
            column: 1,
            style_row: 12,
            content: r#"[[{"word":"Haleluya","breakdown":["Ha","le","lu","ya"],"combined":[2]}]]"#
                .into(),
        };
        let lines = verse.lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0].breakdown, vec!["Ha", "le", "lu", "ya"]);
        assert_eq!(lines[0][0].combined, vec![2]);
        assert!(verse.is_full_width());
    }

    #[test]
    fn missing_fields_default() {
        let verse = Verse {
            content: r#"[[{"word":"Amin"}]]"#.into(),
            ..Default::default()
        };
        let lines = verse.lines().unwrap();
        assert_eq!(lines[0][0].word, "Amin");
        assert!(lines[0][0].breakdown.is_empty());
    }

    #[test]
    fn bad_content_is_a_metadata_error() {
        let verse = Verse {
            verse_number: 2,
            content: "[[{".into(),
            ..Default::default()
        };
        let err = verse.lines().unwrap_err();
        assert!(matches!(err, RenderError::Metadata(ref msg) if msg.starts_with("verse 2 content")));
    }

    #[test]
    fn repository_lookup() {
        let repo = InMemoryRepository::from_json(
            r#"[{"number": 12, "title": "Suci, Suci, Suci", "lyricist": "R. Heber"}]"#,
        )
        .unwrap();
        assert_eq!(repo.hymn_metadata(12).unwrap().title, "Suci, Suci, Suci");
        assert!(matches!(repo.hymn_metadata(13), Err(RenderError::NotFound(13))));
    }
}
