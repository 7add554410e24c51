const FENCE: &str = "```";

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code fences from a response.
///
/// Every fence marker is removed wherever it appears, together with a language tag
/// directly attached to it (```` ```json ````). Removal repeats until no marker is
/// left, so the result never contains a fence and stripping twice is a no-op.
pub fn strip_code_blocks(response: &str) -> String {
    let mut text = response.to_string();
    while text.contains(FENCE) {
        text = remove_fences_once(&text);
    }
    text.trim().to_string()
}

fn remove_fences_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+'))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_truncate_within_bounds() {
        let text = "Hello";
        assert_eq!(truncate_to_char_boundary(text, 100), "Hello");
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }

    #[test]
    fn strips_fences_in_the_middle_of_text() {
        let raw = "Here you go:\n```json\n{\"filters\":{}}\n```\nEnjoy";
        assert_eq!(strip_code_blocks(raw), "Here you go:\n\n{\"filters\":{}}\n\nEnjoy");
    }

    #[test]
    fn strips_other_language_tags() {
        assert_eq!(strip_code_blocks("```javascript\n[1]\n```"), "[1]");
    }

    #[test]
    fn stripping_is_idempotent() {
        let inputs = [
            "```json\n{\"a\":1}\n```",
            "  plain text  ",
            "``` ```json ```",
            "``````json````",
            "`` ```json ``` `",
        ];
        for input in inputs {
            let once = strip_code_blocks(input);
            assert_eq!(strip_code_blocks(&once), once, "input: {input:?}");
            assert!(!once.contains("```"), "input: {input:?}");
        }
    }
}
