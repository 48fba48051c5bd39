//! # View Models
//!
//! Pure `(state) -> view` functions. Nothing here touches a host; the
//! [`ContentView`](crate::switcher::ContentView) implementation turns these
//! values into markup.
//!
//! - [`render_course_list`] for the sidebar
//! - [`render_part`] for the paragraph pane
//! - [`render_audio_controls`] for one paragraph's player
//! - [`render_breadcrumb`] for the pane header

use core_content::{audio_id, course_status, validate_audio_path, Course, CourseStatus, Part};
use core_navigation::Selection;
use core_playback::{format_time, MediaErrorKind, SessionSnapshot, SessionState, StatusText};
use serde::Serialize;
use std::sync::Arc;

const MISSING_ORIGINAL_TEXT: &str = "暂无原文内容";
const MISSING_JYUTPING: &str = "暂无粤拼标注";

// =============================================================================
// Course list
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CourseListView {
    Empty { title: String, message: String },
    Courses { items: Vec<CourseItemView> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseItemView {
    pub course_id: String,
    pub name: String,
    pub status: CourseStatus,
    pub status_class: String,
    pub status_label: String,
    /// The selection points into this course.
    pub has_selection: bool,
    pub parts: Vec<PartButtonView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartButtonView {
    pub part: Part,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

fn part_button(course: &Course, part: Part, selection: Option<&Selection>) -> PartButtonView {
    let paragraphs = course.part(part);
    let disabled = paragraphs.is_empty();
    let label = if disabled {
        format!("Part {} (无内容)", part)
    } else if !paragraphs.iter().any(|p| p.has_text()) {
        format!("Part {} (仅音频)", part)
    } else {
        format!("Part {}", part)
    };

    PartButtonView {
        part,
        label,
        disabled,
        selected: selection.is_some_and(|s| s.course_id == course.id && s.part == part),
    }
}

pub fn render_course_list(courses: &[Arc<Course>], selection: Option<&Selection>) -> CourseListView {
    if courses.is_empty() {
        return CourseListView::Empty {
            title: "暂无课程".to_string(),
            message: "请检查Sound目录是否包含课程文件，或稍后重试。".to_string(),
        };
    }

    let items = courses
        .iter()
        .map(|course| {
            let status = course_status(course);
            CourseItemView {
                course_id: course.id.clone(),
                name: course.name.clone(),
                status,
                status_class: status.css_class().to_string(),
                status_label: status.label().to_string(),
                has_selection: selection.is_some_and(|s| s.course_id == course.id),
                parts: Part::ALL
                    .into_iter()
                    .map(|part| part_button(course, part, selection))
                    .collect(),
            }
        })
        .collect();

    CourseListView::Courses { items }
}

// =============================================================================
// Audio controls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimaryButton {
    Play,
    Pause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioControlsView {
    pub audio_id: String,
    /// Play and pause share one slot.
    pub primary: PrimaryButton,
    pub play_enabled: bool,
    pub pause_enabled: bool,
    pub stop_enabled: bool,
    pub loading: bool,
    pub status_text: String,
    pub show_retry: bool,
    /// Set when the format can never play in this host.
    pub format_error: Option<String>,
    pub show_progress: bool,
    pub progress: f64,
    pub current_time: String,
    pub duration: String,
    pub volume_percent: u8,
    pub muted: bool,
}

impl AudioControlsView {
    /// Controls for a paragraph whose session has not been created yet.
    pub fn idle(audio_id: impl Into<String>, preloaded: bool) -> Self {
        let status = if preloaded {
            StatusText::Ready
        } else {
            StatusText::ClickToPlay
        };
        Self {
            audio_id: audio_id.into(),
            primary: PrimaryButton::Play,
            play_enabled: true,
            pause_enabled: true,
            stop_enabled: true,
            loading: false,
            status_text: status.text(),
            show_retry: false,
            format_error: None,
            show_progress: false,
            progress: 0.0,
            current_time: format_time(0.0),
            duration: format_time(0.0),
            volume_percent: 100,
            muted: false,
        }
    }
}

pub fn render_audio_controls(snapshot: &SessionSnapshot) -> AudioControlsView {
    let (primary, enabled) = match snapshot.state {
        SessionState::Playing => (PrimaryButton::Pause, true),
        SessionState::Stopped | SessionState::Paused => (PrimaryButton::Play, true),
        SessionState::Loading | SessionState::Error => (PrimaryButton::Play, false),
    };

    let error_kind = snapshot.error.as_ref().map(|e| e.kind);
    let format_error = match error_kind {
        Some(MediaErrorKind::UnsupportedFormat | MediaErrorKind::Decode) => Some(
            "⚠️ 音频格式不支持，建议使用最新版本的 Chrome、Firefox 或 Edge 浏览器".to_string(),
        ),
        _ => None,
    };
    let duration = snapshot.duration.filter(|d| d.is_finite() && *d > 0.0);
    let progress = duration.map_or(0.0, |d| (snapshot.current_time / d).clamp(0.0, 1.0));

    AudioControlsView {
        audio_id: snapshot.audio_id.clone(),
        primary,
        play_enabled: enabled,
        pause_enabled: enabled,
        stop_enabled: snapshot.state != SessionState::Loading,
        loading: snapshot.loading,
        status_text: snapshot.status.text(),
        show_retry: error_kind.is_some_and(|kind| kind.offers_retry()),
        format_error,
        show_progress: snapshot.state.is_active(),
        progress,
        current_time: format_time(snapshot.current_time),
        duration: format_time(duration.unwrap_or(0.0)),
        volume_percent: (snapshot.volume.clamp(0.0, 1.0) * 100.0).round() as u8,
        muted: snapshot.muted,
    }
}

// =============================================================================
// Content pane
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ParagraphAudio {
    Controls {
        audio_file: String,
        controls: AudioControlsView,
    },
    Missing {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphView {
    pub number: u32,
    pub original_text: String,
    pub jyutping: String,
    pub audio: ParagraphAudio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ContentPaneView {
    Paragraphs {
        title: String,
        summary: String,
        part: Part,
        paragraphs: Vec<ParagraphView>,
    },
    Error {
        message: String,
    },
}

impl ContentPaneView {
    /// Audio ids that need a session, in display order.
    pub fn audio_ids(&self) -> Vec<&str> {
        match self {
            ContentPaneView::Paragraphs { paragraphs, .. } => paragraphs
                .iter()
                .filter_map(|p| match &p.audio {
                    ParagraphAudio::Controls { controls, .. } => Some(controls.audio_id.as_str()),
                    ParagraphAudio::Missing { .. } => None,
                })
                .collect(),
            ContentPaneView::Error { .. } => Vec::new(),
        }
    }
}

fn text_or(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A paragraph that has audio worth a session: `(audio id, file)`.
pub fn playable_audio(course: &Course, part: Part) -> Vec<(String, String)> {
    course
        .part(part)
        .iter()
        .enumerate()
        .filter_map(|(index, paragraph)| {
            let file = paragraph.audio_file.as_deref()?;
            validate_audio_path(file)
                .then(|| (audio_id(&course.id, part, paragraph.display_number(index)), file.to_string()))
        })
        .collect()
}

/// Render one part. `sessions` supplies live state for paragraphs that
/// already have a session; the rest render idle controls.
pub fn render_part(course: &Course, part: Part, sessions: &[SessionSnapshot]) -> ContentPaneView {
    let paragraphs = course.part(part);
    if paragraphs.is_empty() {
        return ContentPaneView::Error {
            message: format!("Part {} 没有可用内容", part),
        };
    }

    let views = paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| {
            let number = paragraph.display_number(index);
            let audio = match paragraph.audio_file.as_deref().filter(|f| validate_audio_path(f)) {
                Some(file) => {
                    let id = audio_id(&course.id, part, number);
                    let controls = sessions
                        .iter()
                        .find(|s| s.audio_id == id)
                        .map(render_audio_controls)
                        .unwrap_or_else(|| AudioControlsView::idle(id, false));
                    ParagraphAudio::Controls {
                        audio_file: file.to_string(),
                        controls,
                    }
                }
                None => ParagraphAudio::Missing {
                    message: format!("第{}段暂无音频文件", number),
                },
            };

            ParagraphView {
                number,
                original_text: text_or(&paragraph.original_text, MISSING_ORIGINAL_TEXT),
                jyutping: text_or(&paragraph.jyutping, MISSING_JYUTPING),
                audio,
            }
        })
        .collect();

    ContentPaneView::Paragraphs {
        title: format!("{} - Part {}", course.name, part),
        summary: format!("{}段内容", paragraphs.len()),
        part,
        paragraphs: views,
    }
}

// =============================================================================
// Breadcrumb
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbView {
    pub course_name: String,
    pub part_label: String,
}

/// Falls back to the id when the course is unknown.
pub fn render_breadcrumb(course_id: &str, course: Option<&Course>, part: Part) -> BreadcrumbView {
    BreadcrumbView {
        course_name: course.map_or_else(|| course_id.to_string(), |c| c.name.clone()),
        part_label: format!("Part {}", part),
    }
}
