//! Whitespace and line-ending normalization shared by every reader.

use regex::Regex;
use std::sync::OnceLock;

fn inline_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("static regex"))
}

/// Canonicalize extracted text.
///
/// - `\r\n` and bare `\r` become `\n`
/// - runs of spaces/tabs inside a line collapse to one space
/// - each line is trimmed
/// - leading and trailing blank lines are dropped
///
/// Interior blank lines are kept. The function is idempotent.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let re = inline_whitespace();

    let lines: Vec<String> = unified
        .split('\n')
        .map(|line| re.replace_all(line, " ").trim().to_string())
        .collect();

    lines.join("\n").trim_matches('\n').to_string()
}
