use once_cell::sync::Lazy;
use regex::Regex;

static MUSTACHE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(.+?)\}\}").unwrap());

/// Turns interpolated text into a single concatenation expression.
///
/// `Hello {{name}}!` becomes `"Hello " + (name) + "!"`. Literal text is
/// quoted verbatim, so only the bracketed bodies are ever evaluated. Text
/// without a complete `{{ }}` pair becomes one string literal.
pub fn parse_exp(text: &str) -> String {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in MUSTACHE.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        tokens.push(quote(&text[last..whole.start()]));
        tokens.push(format!("({})", body.as_str()));
        last = whole.end();
    }
    tokens.push(quote(&text[last..]));
    tokens.join(" + ")
}

/// Number of `{{ }}` bodies in `text`.
pub fn count_interpolations(text: &str) -> usize {
    MUSTACHE.find_iter(text).count()
}

fn quote(piece: &str) -> String {
    let mut out = String::with_capacity(piece.len() + 2);
    out.push('"');
    for c in piece.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
