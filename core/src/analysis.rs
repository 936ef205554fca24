use crate::model::Improvements;

/// Substituted when the model's analysis cannot be parsed.
pub const FALLBACK_IMPROVEMENTS: [&str; 3] = ["Enhanced tone", "Improved clarity", "Added empathy"];

/// System prompt for the analysis language model.
pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "You analyze text improvements and output only in JSON array format";

pub fn analysis_prompt(original: &str, rewritten: &str) -> String {
    format!(
        "Analyze these two versions and output exactly 3 improvements.\n\
         Original: \"{original}\"\n\
         Improved: \"{rewritten}\"\n\
         \n\
         Output format must be a JSON array like: [\"Improvement 1\", \"Improvement 2\", \"Improvement 3\"]\n\
         Output ONLY the JSON array with no other text."
    )
}

/// Parses the analysis response, falling back to [`FALLBACK_IMPROVEMENTS`].
pub fn parse_improvements(raw: &str) -> Improvements {
    match extract_json_array(raw) {
        Some(items) => Improvements::from(items),
        None => {
            tracing::debug!(raw, "analysis output unparseable, using fallback improvements");
            fallback_improvements()
        }
    }
}

pub fn fallback_improvements() -> Improvements {
    Improvements::from(
        FALLBACK_IMPROVEMENTS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    )
}

/// Extracts the first JSON array of strings from a mixed-text model response.
///
/// The scan is anchored on the first line whose trimmed content starts with
/// `[`. From there the first complete array literal is decoded (it may span
/// several lines, anything after the closing bracket is ignored).
///
/// Returns `None` when no line starts with `[`, when the literal never closes,
/// or when it does not decode as an array of strings. Only the first
/// candidate line is considered.
pub fn extract_json_array(raw: &str) -> Option<Vec<String>> {
    let start = line_start_of_array(raw)?;
    serde_json::Deserializer::from_str(&raw[start..])
        .into_iter::<Vec<String>>()
        .next()?
        .ok()
}

// byte offset of the `[` opening the first line that begins with one
fn line_start_of_array(raw: &str) -> Option<usize> {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_array_line() {
        let improvements = parse_improvements(r#"["a","b","c"]"#);
        assert_eq!(improvements.as_slice(), strings(&["a", "b", "c"]).as_slice());
    }

    #[test]
    fn test_prose_before_and_after() {
        let raw = "Sure! Here is the analysis:\n  [\"Softer opening\", \"Clear ask\", \"Warm close\"]\nHope this helps.";
        assert_eq!(
            extract_json_array(raw),
            Some(strings(&["Softer opening", "Clear ask", "Warm close"]))
        );
    }

    #[test]
    fn test_trailing_prose_on_same_line() {
        let raw = r#"["a", "b"] <- these are the changes"#;
        assert_eq!(extract_json_array(raw), Some(strings(&["a", "b"])));
    }

    #[test]
    fn test_brackets_inside_strings() {
        let raw = r#"["Replaced [sic] wording", "Escaped \" quote ]", "c"]"#;
        assert_eq!(
            extract_json_array(raw),
            Some(strings(&["Replaced [sic] wording", "Escaped \" quote ]", "c"]))
        );
    }

    #[test]
    fn test_multiline_array() {
        let raw = "Result:\n[\n  \"one\",\n  \"two\",\n  \"three\"\n]\n";
        assert_eq!(extract_json_array(raw), Some(strings(&["one", "two", "three"])));
    }

    #[test]
    fn test_nested_array_is_rejected() {
        assert_eq!(extract_json_array(r#"[["a"], "b"]"#), None);
    }

    #[test]
    fn test_truncated_array() {
        assert_eq!(extract_json_array(r#"["a", "b""#), None);
        let improvements = parse_improvements("[\"a\", \"b\"\nand then the model stopped");
        assert_eq!(improvements, fallback_improvements());
    }

    #[test]
    fn test_no_line_starting_with_bracket() {
        let raw = "The improvements are: [\"a\", \"b\", \"c\"]";
        assert_eq!(extract_json_array(raw), None);
        assert_eq!(
            parse_improvements(raw).as_slice(),
            strings(&FALLBACK_IMPROVEMENTS).as_slice()
        );
        assert_eq!(parse_improvements(""), fallback_improvements());
    }

    #[test]
    fn test_invalid_json_on_first_candidate_line() {
        let raw = "[not json]\n[\"a\", \"b\", \"c\"]";
        assert_eq!(parse_improvements(raw), fallback_improvements());
    }

    #[test]
    fn test_non_string_items_fall_back() {
        assert_eq!(parse_improvements("[1, 2, 3]"), fallback_improvements());
    }

    #[test]
    fn test_more_than_three_truncated() {
        let improvements = parse_improvements(r#"["1","2","3","4"]"#);
        assert_eq!(improvements.as_slice(), strings(&["1", "2", "3"]).as_slice());
    }

    #[test]
    fn test_array_followed_by_second_array() {
        let raw = "[\"a\", \"b\", \"c\"][\"d\"]";
        assert_eq!(extract_json_array(raw), Some(strings(&["a", "b", "c"])));
    }

    #[test]
    fn test_explicit_empty_array() {
        assert!(parse_improvements("[]").is_empty());
    }

    #[test]
    fn test_analysis_prompt_embeds_both_versions() {
        let prompt = analysis_prompt("we cant do that", "We are unable to do that.");
        assert!(prompt.contains("Original: \"we cant do that\""));
        assert!(prompt.contains("Improved: \"We are unable to do that.\""));
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("exactly 3 improvements"));
    }
}
