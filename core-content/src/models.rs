//! Domain models for lesson content

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ContentError;

// =============================================================================
// Part
// =============================================================================

/// Half of a lesson. Parsed strictly from `"A"` / `"B"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Part {
    A,
    B,
}

impl Part {
    pub const ALL: [Part; 2] = [Part::A, Part::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Part::A => "A",
            Part::B => "B",
        }
    }

    /// Lowercase letter used in audio ids and file names.
    pub fn letter(&self) -> char {
        match self {
            Part::A => 'a',
            Part::B => 'b',
        }
    }

    pub fn parse(value: &str) -> Option<Part> {
        match value {
            "A" => Some(Part::A),
            "B" => Some(Part::B),
            _ => None,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Part {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Part::parse(s).ok_or_else(|| ContentError::InvalidPart(s.to_string()))
    }
}

// =============================================================================
// Paragraph
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Number shown to the learner. `0` when the source did not carry a
    /// usable positive integer.
    pub paragraph: u32,
    pub original_text: String,
    pub jyutping: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
}

impl Paragraph {
    pub fn new(paragraph: u32, original_text: impl Into<String>, jyutping: impl Into<String>) -> Self {
        Self {
            paragraph,
            original_text: original_text.into(),
            jyutping: jyutping.into(),
            audio_file: None,
        }
    }

    pub fn with_audio(mut self, audio_file: impl Into<String>) -> Self {
        self.audio_file = Some(audio_file.into());
        self
    }

    /// Both the characters and the romanisation are present.
    pub fn has_text(&self) -> bool {
        !self.original_text.trim().is_empty() && !self.jyutping.trim().is_empty()
    }

    pub fn has_audio(&self) -> bool {
        self.audio_file
            .as_deref()
            .is_some_and(|file| !file.trim().is_empty())
    }

    /// Display number, falling back to the 1-based position in the part.
    pub fn display_number(&self, index: usize) -> u32 {
        if self.paragraph > 0 {
            self.paragraph
        } else {
            u32::try_from(index + 1).unwrap_or(u32::MAX)
        }
    }
}

// =============================================================================
// Course
// =============================================================================

/// A lesson. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(rename = "partA", default)]
    pub part_a: Vec<Paragraph>,
    #[serde(rename = "partB", default)]
    pub part_b: Vec<Paragraph>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            part_a: Vec::new(),
            part_b: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: Part, paragraphs: Vec<Paragraph>) -> Self {
        match part {
            Part::A => self.part_a = paragraphs,
            Part::B => self.part_b = paragraphs,
        }
        self
    }

    pub fn part(&self, part: Part) -> &[Paragraph] {
        match part {
            Part::A => &self.part_a,
            Part::B => &self.part_b,
        }
    }

    pub fn has_part(&self, part: Part) -> bool {
        !self.part(part).is_empty()
    }

    /// Parts that carry at least one paragraph, in A, B order.
    pub fn available_parts(&self) -> Vec<Part> {
        Part::ALL
            .into_iter()
            .filter(|part| self.has_part(*part))
            .collect()
    }

    pub fn paragraph_count(&self) -> usize {
        self.part_a.len() + self.part_b.len()
    }

    /// Every `(part, paragraph)` pair that references an audio file.
    pub fn audio_paragraphs(&self) -> impl Iterator<Item = (Part, &Paragraph)> + '_ {
        Part::ALL.into_iter().flat_map(move |part| {
            self.part(part)
                .iter()
                .filter(|paragraph| paragraph.has_audio())
                .map(move |paragraph| (part, paragraph))
        })
    }
}

/// Identifier of the audio session for a paragraph:
/// `part-a-Class01-1`, `part-b-Class02-3`.
pub fn audio_id(course_id: &str, part: Part, paragraph: u32) -> String {
    format!("part-{}-{}-{}", part.letter(), course_id, paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_parse_is_strict() {
        assert_eq!(Part::parse("A"), Some(Part::A));
        assert_eq!(Part::parse("B"), Some(Part::B));
        assert_eq!(Part::parse("a"), None);
        assert_eq!(Part::parse("C"), None);
        assert_eq!(Part::parse(""), None);
        assert!("b".parse::<Part>().is_err());
        assert_eq!(Part::B.to_string(), "B");
    }

    #[test]
    fn test_course_deserializes_with_missing_parts() {
        let course: Course = serde_json::from_str(
            r#"{"id":"Class01","name":"第一课","partA":[{"paragraph":1,"originalText":"你好","jyutping":"nei5 hou2","audioFile":"Sound/Class01/a_1.opus"}]}"#,
        )
        .unwrap();

        assert_eq!(course.part_a.len(), 1);
        assert!(course.part_b.is_empty());
        assert_eq!(course.available_parts(), vec![Part::A]);
        assert_eq!(
            course.part_a[0].audio_file.as_deref(),
            Some("Sound/Class01/a_1.opus")
        );
    }

    #[test]
    fn test_audio_paragraphs_skips_text_only() {
        let course = Course::new("Class02", "第二课")
            .with_part(
                Part::A,
                vec![Paragraph::new(1, "一", "jat1").with_audio("Sound/Class02/a_1.opus")],
            )
            .with_part(
                Part::B,
                vec![
                    Paragraph::new(1, "二", "ji6"),
                    Paragraph::new(2, "三", "saam1").with_audio("Sound/Class02/b_2.opus"),
                ],
            );

        let refs: Vec<(Part, u32)> = course
            .audio_paragraphs()
            .map(|(part, p)| (part, p.paragraph))
            .collect();
        assert_eq!(refs, vec![(Part::A, 1), (Part::B, 2)]);
    }

    #[test]
    fn test_display_number_fallback() {
        let numbered = Paragraph::new(4, "x", "y");
        let unnumbered = Paragraph::new(0, "x", "y");
        assert_eq!(numbered.display_number(0), 4);
        assert_eq!(unnumbered.display_number(2), 3);
    }

    #[test]
    fn test_audio_id_format() {
        assert_eq!(audio_id("Class01", Part::A, 1), "part-a-Class01-1");
        assert_eq!(audio_id("Class02", Part::B, 3), "part-b-Class02-3");
    }
}
