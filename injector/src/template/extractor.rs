use super::{MessageTemplate, Placeholder, Segment};
use crate::error::InjectorError;
use regex::Regex;

const NIL_FIELD_SEPARATOR: &str = " - ";

/// Recovers the sequence counter from a persisted log line.
///
/// The pattern is built from the literal text around the first `{counter}` in
/// the template, so the counter is found even when the downstream agent wraps
/// the original message into a larger record. Only the part of the preceding
/// literal after its last syslog nil field (` - `) is used, since agents parse
/// the syslog header away and keep the free-text message.
#[derive(Debug, Clone)]
pub struct CounterExtractor {
    pattern: Regex,
}

impl CounterExtractor {
    pub fn from_template(template: &MessageTemplate) -> Result<Self, InjectorError> {
        let segments = template.segments();
        let position = segments
            .iter()
            .position(|segment| *segment == Segment::Placeholder(Placeholder::Counter))
            .ok_or_else(|| {
                InjectorError::InvalidTemplate(format!(
                    "template '{}' has no {{counter}} placeholder",
                    template.source()
                ))
            })?;

        let prefix = match position.checked_sub(1).map(|index| &segments[index]) {
            Some(Segment::Literal(text)) => {
                let message = match text.rfind(NIL_FIELD_SEPARATOR) {
                    Some(index) => &text[index + NIL_FIELD_SEPARATOR.len()..],
                    None => text.as_str(),
                };
                regex::escape(message)
            }
            _ => String::new(),
        };
        let suffix = match segments.get(position + 1) {
            Some(Segment::Literal(text)) => regex::escape(text),
            _ => String::new(),
        };

        if prefix.is_empty() && suffix.is_empty() {
            return Err(InjectorError::InvalidTemplate(format!(
                "template '{}' has no literal text next to {{counter}}, a custom pattern is required",
                template.source()
            )));
        }

        Self::from_pattern(&format!(r"{prefix}(\d+){suffix}"))
    }

    /// Custom pattern; its first capture group must match the counter digits.
    pub fn from_pattern(pattern: &str) -> Result<Self, InjectorError> {
        let pattern =
            Regex::new(pattern).map_err(|error| InjectorError::InvalidTemplate(error.to_string()))?;
        if pattern.captures_len() < 2 {
            return Err(InjectorError::InvalidTemplate(format!(
                "pattern '{pattern}' has no capture group for the counter"
            )));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn extract(&self, line: &str) -> Option<u64> {
        self.pattern
            .captures(line)
            .and_then(|captures| captures.get(1))
            .and_then(|counter| counter.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::defaults::DEFAULT_MESSAGE_FORMAT;

    #[test]
    fn should_extract_counter_from_rendered_message() {
        let template = MessageTemplate::parse(DEFAULT_MESSAGE_FORMAT);
        let extractor = CounterExtractor::from_template(&template).unwrap();

        assert_eq!(extractor.extract(&template.render(12345)), Some(12345));
    }

    #[test]
    fn should_extract_counter_from_wrapped_record() {
        let template = MessageTemplate::parse(DEFAULT_MESSAGE_FORMAT);
        let extractor = CounterExtractor::from_template(&template).unwrap();
        let record = r#"{"host":"node-1","message":"Test message #77","@timestamp":"2024-05-01T10:00:00.000Z"}"#;

        assert_eq!(extractor.extract(record), Some(77));
    }

    #[test]
    fn should_use_literal_on_both_sides() {
        let template = MessageTemplate::with_identity("seq=[{counter}] at {timestamp}", "h", 1);
        let extractor = CounterExtractor::from_template(&template).unwrap();

        assert_eq!(extractor.pattern(), r"seq=\[(\d+)\] at ");
        assert_eq!(extractor.extract("seq=[9] at 2024"), Some(9));
        assert_eq!(extractor.extract("seq=9 at 2024"), None);
    }

    #[test]
    fn should_find_counter_after_syslog_header_is_stripped() {
        let template = MessageTemplate::parse(DEFAULT_MESSAGE_FORMAT);
        let extractor = CounterExtractor::from_template(&template).unwrap();

        assert_eq!(extractor.extract("Test message #5"), Some(5));
        assert_eq!(extractor.extract("Other message #5"), None);
    }

    #[test]
    fn custom_pattern_should_need_a_capture_group() {
        let extractor = CounterExtractor::from_pattern(r"seq=(\d+)").unwrap();
        assert_eq!(extractor.extract("a seq=12 b"), Some(12));
        assert!(CounterExtractor::from_pattern(r"seq=\d+").is_err());
        assert!(CounterExtractor::from_pattern(r"seq=(").is_err());
    }

    #[test]
    fn should_reject_template_without_counter() {
        let template = MessageTemplate::parse("{timestamp} no sequence");
        assert!(matches!(
            CounterExtractor::from_template(&template),
            Err(InjectorError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn should_reject_counter_without_adjacent_literal() {
        for source in ["{counter}", "{pid}{counter}", "<134>1 {hostname} - {counter}"] {
            let template = MessageTemplate::with_identity(source, "h", 1);
            assert!(
                matches!(
                    CounterExtractor::from_template(&template),
                    Err(InjectorError::InvalidTemplate(_))
                ),
                "{source}"
            );
        }
    }
}
