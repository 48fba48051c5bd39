//! Field-by-field validation of lesson JSON and audio references.

use regex::RegexSet;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::{ContentError, Result};
use crate::models::{Course, Paragraph, Part};

const AUDIO_EXTENSIONS: &[&str] = &[".opus", ".mp3", ".wav", ".ogg"];

static AUDIO_PATH_SHAPES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)^Sound/Class\d+/[ab]_\d+\.(opus|mp3|wav|ogg)$",
        r"(?i)^\./Sound/Class\d+/[ab]_\d+\.(opus|mp3|wav|ogg)$",
        r"(?i)^https?://.+\.(opus|mp3|wav|ogg)$",
        r"(?i)^/.*\.(opus|mp3|wav|ogg)$",
    ])
    .expect("audio path patterns are valid")
});

/// Whether `audio_file` names a playable asset in an accepted location.
///
/// Accepted shapes: `Sound/Class<n>/<a|b>_<n>.<ext>` (optionally `./`
/// prefixed), absolute `http(s)` URLs, and `/`-rooted paths, with `ext` one
/// of `opus`, `mp3`, `wav`, `ogg` in any case.
pub fn validate_audio_path(audio_file: &str) -> bool {
    let lower = audio_file.to_ascii_lowercase();
    if !AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return false;
    }
    AUDIO_PATH_SHAPES.is_match(audio_file)
}

/// Validate one course document.
///
/// `source_id` names the course in error messages when the document's own
/// `id` is missing or malformed.
pub fn validate_course(source_id: &str, value: &Value) -> Result<Course> {
    let object = value
        .as_object()
        .ok_or_else(|| ContentError::invalid(source_id, "$", "course data is not an object"))?;

    let id = required_string(source_id, object, "id")?;
    let name = required_string(&id, object, "name")?;

    let part_a = optional_part(&id, object, Part::A)?;
    let part_b = optional_part(&id, object, Part::B)?;

    if part_a.is_empty() && part_b.is_empty() {
        return Err(ContentError::invalid(
            &id,
            "partA/partB",
            "course must contain Part A or Part B content",
        ));
    }

    Ok(Course {
        id,
        name,
        part_a,
        part_b,
    })
}

fn required_string(course_id: &str, object: &Map<String, Value>, field: &str) -> Result<String> {
    match object.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ContentError::invalid(
            course_id,
            field,
            "missing or not a non-empty string",
        )),
    }
}

fn part_key(part: Part) -> &'static str {
    match part {
        Part::A => "partA",
        Part::B => "partB",
    }
}

fn optional_part(course_id: &str, object: &Map<String, Value>, part: Part) -> Result<Vec<Paragraph>> {
    let key = part_key(part);
    let entries = match object.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ContentError::invalid(course_id, key, "not an array")),
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| paragraph(course_id, key, index, entry))
        .collect()
}

fn paragraph(course_id: &str, key: &str, index: usize, entry: &Value) -> Result<Paragraph> {
    let field = |name: &str| format!("{}[{}].{}", key, index, name);

    let object = entry
        .as_object()
        .ok_or_else(|| ContentError::invalid(course_id, format!("{}[{}]", key, index), "not an object"))?;

    let number = object
        .get("paragraph")
        .and_then(Value::as_f64)
        .ok_or_else(|| ContentError::invalid(course_id, field("paragraph"), "not a number"))?;

    let original_text = object
        .get("originalText")
        .and_then(Value::as_str)
        .ok_or_else(|| ContentError::invalid(course_id, field("originalText"), "not a string"))?;

    let jyutping = object
        .get("jyutping")
        .and_then(Value::as_str)
        .ok_or_else(|| ContentError::invalid(course_id, field("jyutping"), "not a string"))?;

    let audio_file = match object.get("audioFile") {
        None => None,
        Some(Value::String(file)) => Some(file.clone()),
        Some(_) => {
            return Err(ContentError::invalid(
                course_id,
                field("audioFile"),
                "not a string",
            ))
        }
    };

    Ok(Paragraph {
        paragraph: paragraph_number(number),
        original_text: original_text.to_string(),
        jyutping: jyutping.to_string(),
        audio_file,
    })
}

/// Positive integral numbers are kept; anything else becomes `0` (unnumbered).
fn paragraph_number(value: f64) -> u32 {
    if value.fract() == 0.0 && value >= 1.0 && value <= f64::from(u32::MAX) {
        value as u32
    } else {
        0
    }
}
