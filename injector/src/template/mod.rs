mod extractor;

pub use extractor::CounterExtractor;

use chrono::{DateTime, Utc};
use std::fmt::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const FALLBACK_HOSTNAME: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placeholder {
    Counter,
    Timestamp,
    Hostname,
    Pid,
}

impl Placeholder {
    const ALL: [Placeholder; 4] = [
        Placeholder::Counter,
        Placeholder::Timestamp,
        Placeholder::Hostname,
        Placeholder::Pid,
    ];

    fn token(self) -> &'static str {
        match self {
            Placeholder::Counter => "{counter}",
            Placeholder::Timestamp => "{timestamp}",
            Placeholder::Hostname => "{hostname}",
            Placeholder::Pid => "{pid}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A message template split into literal text and placeholders.
///
/// Recognized placeholders are `{counter}`, `{timestamp}`, `{hostname}` and
/// `{pid}`; every occurrence is substituted. Any other brace sequence is kept
/// verbatim. Host name and process id are resolved once, when the template is
/// parsed, while the timestamp is taken once per render so that all
/// `{timestamp}` occurrences of one message agree.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
    hostname: String,
    pid: String,
}

impl MessageTemplate {
    pub fn parse(template: &str) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string());
        Self::with_identity(template, &hostname, std::process::id())
    }

    pub fn with_identity(template: &str, hostname: &str, pid: u32) -> Self {
        Self {
            source: template.to_string(),
            segments: split_segments(template),
            hostname: hostname.to_string(),
            pid: pid.to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn render(&self, counter: u64) -> String {
        let mut message = String::with_capacity(self.source.len() + 32);
        self.render_into(counter, &mut message);
        message
    }

    /// Renders into `buffer`, replacing its contents, so the sender can reuse one allocation.
    pub fn render_into(&self, counter: u64, buffer: &mut String) {
        let mut now: Option<DateTime<Utc>> = None;
        buffer.clear();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => buffer.push_str(text),
                Segment::Placeholder(Placeholder::Counter) => {
                    let _ = write!(buffer, "{counter}");
                }
                Segment::Placeholder(Placeholder::Timestamp) => {
                    let now = now.get_or_insert_with(Utc::now);
                    let _ = write!(buffer, "{}", now.format(TIMESTAMP_FORMAT));
                }
                Segment::Placeholder(Placeholder::Hostname) => buffer.push_str(&self.hostname),
                Segment::Placeholder(Placeholder::Pid) => buffer.push_str(&self.pid),
            }
        }
    }
}

fn split_segments(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;
    while let Some(position) = rest.find('{') {
        literal.push_str(&rest[..position]);
        let tail = &rest[position..];
        match Placeholder::ALL
            .iter()
            .find(|placeholder| tail.starts_with(placeholder.token()))
        {
            Some(placeholder) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(*placeholder));
                rest = &tail[placeholder.token().len()..];
            }
            None => {
                literal.push('{');
                rest = &tail[1..];
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
