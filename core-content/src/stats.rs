//! Course statistics, status badges and integrity checks.

use serde::Serialize;
use std::fmt;

use crate::models::{Course, Part};

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate counts over the loaded course list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatistics {
    pub total_courses: usize,
    pub courses_with_content: usize,
    pub total_part_a: usize,
    pub total_part_b: usize,
    pub total_paragraphs: usize,
    pub paragraphs_with_audio: usize,
}

impl CourseStatistics {
    pub fn collect<'a>(courses: impl IntoIterator<Item = &'a Course>) -> Self {
        let mut stats = Self::default();

        for course in courses {
            stats.total_courses += 1;
            if course.paragraph_count() > 0 {
                stats.courses_with_content += 1;
            }
            if course.has_part(Part::A) {
                stats.total_part_a += 1;
            }
            if course.has_part(Part::B) {
                stats.total_part_b += 1;
            }
            stats.total_paragraphs += course.paragraph_count();
            stats.paragraphs_with_audio += course.audio_paragraphs().count();
        }

        stats
    }
}

// =============================================================================
// Status badge
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseStatus {
    /// Every non-empty part has full text.
    Complete,
    /// Some text and some audio, but not every part is complete.
    Partial,
    /// Audio references without any text.
    AudioOnly,
    Missing,
}

impl CourseStatus {
    /// CSS class of the badge. Audio-only shares the partial styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            CourseStatus::Complete => "complete",
            CourseStatus::Partial | CourseStatus::AudioOnly => "partial",
            CourseStatus::Missing => "missing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CourseStatus::Complete => "内容完整",
            CourseStatus::Partial => "部分内容",
            CourseStatus::AudioOnly => "仅有音频",
            CourseStatus::Missing => "无内容",
        }
    }
}

/// A part counts as complete when every paragraph in it has text.
fn part_complete(course: &Course, part: Part) -> bool {
    course.part(part).iter().all(|p| p.has_text())
}

pub fn course_status(course: &Course) -> CourseStatus {
    let mut total_parts = 0;
    let mut complete_parts = 0;
    let mut has_text = false;
    let mut has_audio = false;

    for part in course.available_parts() {
        total_parts += 1;
        let paragraphs = course.part(part);
        has_audio |= paragraphs.iter().any(|p| p.has_audio());
        if part_complete(course, part) {
            has_text = true;
            complete_parts += 1;
        } else if paragraphs.iter().any(|p| p.has_text()) {
            has_text = true;
        }
    }

    match (complete_parts == total_parts && has_text, has_text, has_audio) {
        (true, _, _) => CourseStatus::Complete,
        (false, true, true) => CourseStatus::Partial,
        (false, false, true) => CourseStatus::AudioOnly,
        _ => CourseStatus::Missing,
    }
}

// =============================================================================
// Integrity
// =============================================================================

/// A paragraph that references audio but has no text to show with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityIssue {
    pub course_id: String,
    pub part: Part,
    pub paragraph: u32,
}

impl IntegrityIssue {
    pub fn scan(course: &Course) -> Vec<IntegrityIssue> {
        course
            .audio_paragraphs()
            .filter(|(_, paragraph)| !paragraph.has_text())
            .map(|(part, paragraph)| IntegrityIssue {
                course_id: course.id.clone(),
                part,
                paragraph: paragraph.paragraph,
            })
            .collect()
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "课程 {} Part {} 第{}段有音频但缺少文本内容",
            self.course_id, self.part, self.paragraph
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Paragraph;

    fn full(n: u32) -> Paragraph {
        Paragraph::new(n, "你好", "nei5 hou2").with_audio(format!("Sound/Class01/a_{}.opus", n))
    }

    fn audio_only(n: u32) -> Paragraph {
        Paragraph::new(n, "", "").with_audio(format!("Sound/Class01/b_{}.opus", n))
    }

    #[test]
    fn test_status_complete() {
        let course = Course::new("Class01", "第一课").with_part(Part::A, vec![full(1)]);
        assert_eq!(course_status(&course), CourseStatus::Complete);
    }

    #[test]
    fn test_status_partial_and_audio_only() {
        let partial = Course::new("Class01", "第一课")
            .with_part(Part::A, vec![full(1)])
            .with_part(Part::B, vec![audio_only(1)]);
        assert_eq!(course_status(&partial), CourseStatus::Partial);
        assert_eq!(CourseStatus::Partial.label(), "部分内容");

        let audio = Course::new("Class02", "第二课").with_part(Part::B, vec![audio_only(1)]);
        assert_eq!(course_status(&audio), CourseStatus::AudioOnly);
        assert_eq!(CourseStatus::AudioOnly.css_class(), "partial");
    }

    #[test]
    fn test_status_missing() {
        let course = Course::new("Class03", "第三课")
            .with_part(Part::A, vec![Paragraph::new(1, "", "")]);
        assert_eq!(course_status(&course), CourseStatus::Missing);
    }

    #[test]
    fn test_statistics() {
        let courses = vec![
            Course::new("Class01", "第一课").with_part(Part::A, vec![full(1), full(2)]),
            Course::new("Class02", "第二课")
                .with_part(Part::A, vec![Paragraph::new(1, "a", "b")])
                .with_part(Part::B, vec![audio_only(1)]),
        ];

        let stats = CourseStatistics::collect(&courses);
        assert_eq!(stats.total_courses, 2);
        assert_eq!(stats.courses_with_content, 2);
        assert_eq!(stats.total_part_a, 2);
        assert_eq!(stats.total_part_b, 1);
        assert_eq!(stats.total_paragraphs, 4);
        assert_eq!(stats.paragraphs_with_audio, 3);
    }

    #[test]
    fn test_integrity_reports_audio_without_text() {
        let course = Course::new("Class02", "第二课")
            .with_part(Part::A, vec![full(1)])
            .with_part(Part::B, vec![audio_only(4)]);

        let issues = IntegrityIssue::scan(&course);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].part, Part::B);
        assert_eq!(issues[0].to_string(), "课程 Class02 Part B 第4段有音频但缺少文本内容");
    }
}
