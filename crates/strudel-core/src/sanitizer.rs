//! Post-processing of raw model output into a directly executable snippet.
//!
//! Models tend to wrap code in a fenced block and sprinkle explanatory comment
//! lines around it. Neither survives: fence lines are dropped wherever they
//! appear, a fence closed on the same line as code is cut off, and every line
//! that is only a `//` comment is removed. Comments that trail code on the same
//! line are left alone since the pattern language treats them as part of the
//! expression text.

const FENCE: &str = "```";
const LINE_COMMENT: &str = "//";

/// Strips code fences and comment-only lines from `raw`.
///
/// The result may be empty; callers treat that as a failed generation.
pub fn sanitize(raw: &str) -> String {
    let kept: Vec<&str> = raw
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with(FENCE) || trimmed.starts_with(LINE_COMMENT) {
                return None;
            }
            Some(strip_trailing_fence(line))
        })
        .collect();

    kept.join("\n").trim().to_string()
}

fn strip_trailing_fence(line: &str) -> &str {
    let mut current = line.trim_end();
    if !current.ends_with(FENCE) {
        return line;
    }
    while let Some(rest) = current.strip_suffix(FENCE) {
        current = rest.trim_end();
    }
    current
}
