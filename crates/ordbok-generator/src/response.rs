//! Recovery of a JSON payload from free-form generator output.

use serde_json::Value;

/// Remove a surrounding ``` fence (with or without a language tag)
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn closer(open: char) -> char {
    if open == '[' { ']' } else { '}' }
}

/// Whether `text` is one bracket span from its first to its last character
fn is_bracketed(text: &str) -> bool {
    matches!(
        (text.chars().next(), text.chars().last()),
        (Some('['), Some(']')) | (Some('{'), Some('}'))
    ) && balanced_span_at(text, 0) == Some(text.len())
}

/// End offset (exclusive) of the balanced span opening at byte `start`
fn balanced_span_at(text: &str, start: usize) -> Option<usize> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => stack.push(closer(c)),
            ']' | '}' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// First balanced array or object anywhere in `text`
pub fn extract_json_span(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .find_map(|(start, _)| balanced_span_at(text, start).map(|end| &text[start..end]))
}

/// Parse the structured payload out of raw generator text
pub fn parse_payload(raw: &str) -> Result<Value, String> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err("empty payload".to_string());
    }

    let span = if is_bracketed(text) {
        text
    } else {
        tracing::debug!("Response is not a clean JSON span, searching for one");
        extract_json_span(text).ok_or_else(|| "no JSON array or object found".to_string())?
    };

    serde_json::from_str(span).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  [3]  "), "[3]");
    }

    #[test]
    fn finds_span_inside_chatter() {
        let raw = "Sure! Here is the entry: [{\"word\": \"bil\"}] Hope this helps.";
        assert_eq!(extract_json_span(raw), Some("[{\"word\": \"bil\"}]"));
    }

    #[test]
    fn brackets_in_strings_do_not_count() {
        let raw = "note {\"word\": \"hus [pl]\", \"x\": \"}\"} tail";
        assert_eq!(extract_json_span(raw), Some("{\"word\": \"hus [pl]\", \"x\": \"}\"}"));
    }

    #[test]
    fn unbalanced_opener_is_skipped() {
        let raw = "see (a [b) then {\"ok\": true}";
        assert_eq!(extract_json_span(raw), Some("{\"ok\": true}"));
    }

    #[test]
    fn parses_chatty_payload() {
        let value = parse_payload("Here you go:\n```json\n[{\"word\": \"bil\"}]\n```").unwrap();
        assert_eq!(value[0]["word"], "bil");

        let value = parse_payload("The answer is {\"output\": \"Hej\", \"explanation\": \"\"}.").unwrap();
        assert_eq!(value["output"], "Hej");
    }

    #[test]
    fn rejects_text_without_json() {
        assert!(parse_payload("I cannot help with that.").is_err());
        assert!(parse_payload("```json\n```").is_err());
        assert!(parse_payload("[{\"word\": }]").is_err());
    }
}
