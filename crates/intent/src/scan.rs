//! Balanced-brace scanner for JSON objects embedded in free text.
//!
//! Backends wrap their JSON in prose, code fences, or apologies. The scanner
//! tracks nesting depth and string literals so braces inside string values
//! (`{"text": "a } b"}`) do not end an object early.
//!
//! One pass over the bytes with a stack of open-brace offsets; an opening
//! brace that never closes simply stays on the stack, so runs of stray
//! braces cost linear time. String literals are only tracked inside an open
//! brace, so quotes in surrounding prose are ignored.

use std::vec::IntoIter;

/// Iterator over complete top-level `{...}` spans, left to right.
pub struct ObjectSpans<'a> {
    text: &'a str,
    spans: IntoIter<(usize, usize)>,
}

/// All complete top-level brace-balanced spans of `text`.
///
/// An opening brace that is never closed is skipped, so a stray `{` in
/// leading prose does not hide a later object.
pub fn object_spans(text: &str) -> ObjectSpans<'_> {
    ObjectSpans {
        text,
        spans: outermost_spans(text).into_iter(),
    }
}

/// The first complete top-level `{...}` span, if any.
pub fn first_object(text: &str) -> Option<&str> {
    object_spans(text).next()
}

impl<'a> Iterator for ObjectSpans<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (start, end) = self.spans.next()?;
        Some(&self.text[start..end])
    }
}

/// Byte ranges of closed objects not nested in another closed object, by start.
///
/// The delimiters are ASCII, so every offset is a char boundary.
fn outermost_spans(text: &str) -> Vec<(usize, usize)> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(idx),
            b'}' => {
                let Some(start) = open.pop() else {
                    continue;
                };
                // Spans closed earlier inside this one are no longer top-level.
                while spans.last().is_some_and(|&(inner, _)| inner > start) {
                    spans.pop();
                }
                spans.push((start, idx + 1));
            }
            _ => {}
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        let text = r#"{"function_call":{"name":"continue_chat"}}"#;
        assert_eq!(first_object(text), Some(text));
    }

    #[test]
    fn object_surrounded_by_prose() {
        let text = r#"Sure! {"function_call":{"name":"continue_chat"}} Thanks."#;
        assert_eq!(
            first_object(text),
            Some(r#"{"function_call":{"name":"continue_chat"}}"#)
        );
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"function_call":{"name":"say","arguments":{"text":"a } b { c"}}} trailing }"#;
        assert_eq!(
            first_object(text),
            Some(r#"{"function_call":{"name":"say","arguments":{"text":"a } b { c"}}}"#)
        );
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"text":"he said \"}\" loudly"} rest"#;
        assert_eq!(first_object(text), Some(r#"{"text":"he said \"}\" loudly"}"#));
    }

    #[test]
    fn code_fenced_object() {
        let text = "```json\n{\"function_call\": {\"name\": \"play_music\"}}\n```";
        assert_eq!(
            first_object(text),
            Some("{\"function_call\": {\"name\": \"play_music\"}}")
        );
    }

    #[test]
    fn unclosed_leading_brace_is_skipped() {
        let text = r#"Use { carefully: {"function_call":{"name":"x"}}"#;
        assert_eq!(first_object(text), Some(r#"{"function_call":{"name":"x"}}"#));
    }

    #[test]
    fn no_object() {
        assert_eq!(first_object("I cannot help with that"), None);
        assert_eq!(first_object("only an opening {"), None);
        assert_eq!(first_object(""), None);
    }

    #[test]
    fn multiple_objects_in_order() {
        let spans: Vec<&str> = object_spans(r#"{a} and {"b":1} then {"c":{"d":2}}"#).collect();
        assert_eq!(spans, vec!["{a}", r#"{"b":1}"#, r#"{"c":{"d":2}}"#]);
    }

    #[test]
    fn nested_objects_inside_unclosed_brace() {
        let spans: Vec<&str> = object_spans(r#"{ stray {"a":{"b":1}} and {"c":2}"#).collect();
        assert_eq!(spans, vec![r#"{"a":{"b":1}}"#, r#"{"c":2}"#]);
    }

    #[test]
    fn quotes_in_leading_prose_are_ignored() {
        let text = r#"He said "fine {"function_call":{"name":"continue_chat"}}"#;
        assert_eq!(
            first_object(text),
            Some(r#"{"function_call":{"name":"continue_chat"}}"#)
        );
    }

    #[test]
    fn long_run_of_unclosed_braces_is_linear() {
        let object = r#"{"function_call":{"name":"x"}}"#;
        let mut text = "{".repeat(200_000);
        text.push_str(object);

        let started = std::time::Instant::now();
        assert_eq!(first_object(&"{".repeat(200_000)), None);
        assert_eq!(first_object(&text), Some(object));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn stray_closing_braces_are_skipped() {
        assert_eq!(first_object("} } {\"a\":1} }"), Some("{\"a\":1}"));
    }

    #[test]
    fn multibyte_text_around_object() {
        let text = "好的 → {\"function_call\":{\"name\":\"continue_chat\"}} ✓";
        assert_eq!(
            first_object(text),
            Some("{\"function_call\":{\"name\":\"continue_chat\"}}")
        );
    }
}
