//! Log redaction for credentials.
//!
//! The user info endpoint returns the operator's password and operators type
//! it into the login form, so a stray `{:?}` of a response or form could put
//! it in the log file. `SanitizingMakeWriter` rewrites every formatted log
//! line before it reaches the sink.
//!
//! Redacted:
//! - `passwordInput` / `password` JSON fields and `password=` pairs
//! - bearer tokens and JWTs
//! - long hex strings (session keys, tokens)
//!
//! Input longer than `IWM_SANITIZE_MAX_BYTES` (default 16 KiB) is truncated.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Rule>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("IWM_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: [(&str, &str); 5] = [
            // JSON fields: "passwordInput":"...", "password": "..."
            (
                r#"(?i)"(password|passwordInput|pwd)"\s*:\s*"[^"]*""#,
                r#""$1":"[REDACTED]""#,
            ),
            // key=value and key: value pairs
            (
                r#"(?i)\b(password|passwordInput|passwd|pwd|token|secret)\b(\s*[=:]\s*)[^\s,;"'}]+"#,
                "$1$2[REDACTED]",
            ),
            (r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]+=*", "Bearer [REDACTED]"),
            (
                r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b",
                "[REDACTED-JWT]",
            ),
            (r"\b[0-9a-fA-F]{32,}\b", "[REDACTED-KEY]"),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Redact credentials from a log line.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted log
/// line before it is written to the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let sanitized = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline in sight: flush what we have rather than grow forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_password_field() {
        let input = r#"response {"userName":"Admin","passwordInput":"1234"}"#;
        let sanitized = sanitize(input);
        assert!(!sanitized.contains("1234"));
        assert!(sanitized.contains(r#""passwordInput":"[REDACTED]""#));
        assert!(sanitized.contains("Admin"));
    }

    #[test]
    fn test_key_value_password() {
        let sanitized = sanitize("login user=admin password=hunter2 ok");
        assert_eq!(sanitized, "login user=admin password=[REDACTED] ok");
    }

    #[test]
    fn test_bearer_token() {
        let sanitized = sanitize("Authorization: Bearer abc.def-123");
        assert!(sanitized.contains("Bearer [REDACTED]"));
        assert!(!sanitized.contains("abc.def-123"));
    }

    #[test]
    fn test_plain_lines_untouched() {
        let line = "Scanned box C4554402 onto pallet PLT-77291 (qty 48)";
        assert_eq!(sanitize(line), line);
        assert_ne!(sanitize("pwd: 1234"), "pwd: 1234");
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("é".repeat(20).as_str(), 7);
        assert!(sanitized.ends_with(" [TRUNCATED]"));
        assert!(sanitized.starts_with("ééé"));
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut out);
            writer.write_all(b"first password=abc\nsecond ").expect("write");
            writer.write_all(b"line\n").expect("write");
        }
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "first password=[REDACTED]\nsecond line\n");
    }
}
