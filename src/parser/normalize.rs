//! Line normalization
//!
//! Turns raw header text into the ordered declaration candidates the
//! recognizers run over: comments and blank lines are dropped and noise
//! tokens (calling-convention and export macros such as `GLFWAPI` or
//! `APIENTRY`) are removed. Order is preserved because aggregate bodies are
//! reassembled from consecutive lines.

/// A normalized line and its 1-based line number in the original input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        SourceLine {
            number,
            text: text.into(),
        }
    }
}

/// Normalize raw lines, removing every standalone occurrence of `noise`.
pub fn normalize<'a, I>(lines: I, noise: &[String]) -> Vec<SourceLine>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut in_block_comment = false;
    let mut normalized = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let code = strip_comments(raw, &mut in_block_comment);
        let mut text = code.trim().to_string();
        for token in noise {
            text = remove_token(&text, token);
        }
        let text = text.trim();
        if !text.is_empty() {
            normalized.push(SourceLine::new(index + 1, text));
        }
    }

    normalized
}

/// Normalize a whole document.
pub fn normalize_source(source: &str, noise: &[String]) -> Vec<SourceLine> {
    normalize(source.lines(), noise)
}

/// Remove comment text from one line, tracking block comments across lines.
fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut code = String::with_capacity(line.len());
    let mut rest = line;

    loop {
        if *in_block {
            match rest.find("*/") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    *in_block = false;
                    code.push(' ');
                }
                None => return code,
            }
        }

        let line_comment = rest.find("//");
        let block_comment = rest.find("/*");
        match (line_comment, block_comment) {
            (Some(l), Some(b)) if l < b => {
                code.push_str(&rest[..l]);
                return code;
            }
            (Some(l), None) => {
                code.push_str(&rest[..l]);
                return code;
            }
            (_, Some(b)) => {
                code.push_str(&rest[..b]);
                rest = &rest[b + 2..];
                *in_block = true;
            }
            (None, None) => {
                code.push_str(rest);
                return code;
            }
        }
    }
}

/// Remove standalone occurrences of `token`.
///
/// An occurrence counts when it is not part of a longer identifier and is
/// bounded by a space or the line edge on at least one side. One adjoining
/// space is removed with it so the rest of the line keeps its spacing.
fn remove_token(line: &str, token: &str) -> String {
    if token.is_empty() {
        return line.to_string();
    }

    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = rest.find(token) {
        let before = rest[..pos].chars().next_back();
        let after = rest[pos + token.len()..].chars().next();

        let bounded_before = before.map_or(true, |c| !is_ident(c));
        let bounded_after = after.map_or(true, |c| !is_ident(c));
        let spaced = before.map_or(true, |c| c == ' ') || after.map_or(true, |c| c == ' ');

        if bounded_before && bounded_after && spaced {
            out.push_str(&rest[..pos]);
            let mut tail = &rest[pos + token.len()..];
            if after == Some(' ') {
                tail = &tail[1..];
            } else if before == Some(' ') {
                out.pop();
            }
            rest = tail;
        } else {
            let skip = pos + token.len();
            out.push_str(&rest[..skip]);
            rest = &rest[skip..];
        }
    }

    out.push_str(rest);
    out
}
