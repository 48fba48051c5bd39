//! Conventional course names and audio file paths.

use crate::models::Part;

const CHINESE_ORDINALS: [&str; 10] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];

/// Display name derived from a course id.
///
/// `Class01`..`Class10` map to `第一课`..`第十课`; any other suffix after
/// `Class` is used verbatim (`Class11` -> `第11课`). Ids without the prefix
/// are returned unchanged.
pub fn course_display_name(course_id: &str) -> String {
    let Some(suffix) = course_id.strip_prefix("Class") else {
        return course_id.to_string();
    };

    let numeral = suffix
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=CHINESE_ORDINALS.len()).contains(n))
        .map(|n| CHINESE_ORDINALS[n - 1].to_string())
        .unwrap_or_else(|| suffix.to_string());

    format!("第{}课", numeral)
}

/// Conventional media path for a paragraph.
///
/// Part A has a single recording per course; Part B has one per paragraph.
pub fn audio_path_for(course_id: &str, part: Part, paragraph: Option<u32>) -> Option<String> {
    if course_id.is_empty() {
        return None;
    }

    match (part, paragraph) {
        (Part::A, _) => Some(format!("Sound/{}/a.opus", course_id)),
        (Part::B, Some(n)) if n > 0 => Some(format!("Sound/{}/b_{}.opus", course_id, n)),
        (Part::B, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(course_display_name("Class01"), "第一课");
        assert_eq!(course_display_name("Class10"), "第十课");
        assert_eq!(course_display_name("Class11"), "第11课");
        assert_eq!(course_display_name("ClassX"), "第X课");
        assert_eq!(course_display_name("Intro"), "Intro");
    }

    #[test]
    fn test_audio_paths() {
        assert_eq!(
            audio_path_for("Class01", Part::A, None).as_deref(),
            Some("Sound/Class01/a.opus")
        );
        assert_eq!(
            audio_path_for("Class01", Part::B, Some(3)).as_deref(),
            Some("Sound/Class01/b_3.opus")
        );
        assert_eq!(audio_path_for("Class01", Part::B, None), None);
        assert_eq!(audio_path_for("", Part::A, None), None);
    }
}
