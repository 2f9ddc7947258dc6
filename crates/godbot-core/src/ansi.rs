//! Terminal escape-sequence handling for compiler output.
//!
//! Both entry points are total over arbitrary input: malformed or truncated
//! sequences simply fail to match the recognized pattern.

use regex::Regex;

/// `ESC [ params m`: the SGR (color/style) sequences gcc and clang emit.
fn escape_pattern() -> Regex {
    Regex::new(r"\x1b\[([0-9;]*)m").expect("valid regex")
}

/// Erase-line variant emitted between gcc's color spans.
const ERASE_LINE: &str = "\x1b[K";

/// Remove all recognized escape sequences, leaving the text untouched.
pub fn strip(text: &str) -> String {
    escape_pattern()
        .replace_all(text, "")
        .replace(ERASE_LINE, "")
}

/// Escape HTML-significant characters so literal angle brackets and
/// ampersands in source or diagnostics cannot be interpreted as markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StyleAttr {
    Bold,
    Underline,
    Reverse,
    Fg(usize),
    Bg(usize),
}

const PALETTE: [&str; 8] = [
    "#000000", "#ff0000", "#00ff00", "#ffff00", "#0000ff", "#ff00ff", "#00ffff", "#ffffff",
];

impl StyleAttr {
    fn from_code(code: u32) -> Option<StyleAttr> {
        match code {
            1 => Some(StyleAttr::Bold),
            4 => Some(StyleAttr::Underline),
            7 => Some(StyleAttr::Reverse),
            30..=37 => Some(StyleAttr::Fg(code as usize - 30)),
            40..=47 => Some(StyleAttr::Bg(code as usize - 40)),
            _ => None,
        }
    }

    fn css(&self) -> String {
        match self {
            StyleAttr::Bold => "font-weight: bold".to_string(),
            StyleAttr::Underline => "text-decoration: underline".to_string(),
            StyleAttr::Reverse => "text-decoration: reverse".to_string(),
            StyleAttr::Fg(i) => format!("color: {}", PALETTE[*i]),
            StyleAttr::Bg(i) => format!("background-color: {}", PALETTE[*i]),
        }
    }
}

/// Accumulating set of active style attributes.
///
/// Attributes are additive and keep their first-seen order; a new foreground
/// or background color replaces the previous one in place. A reset (explicit
/// code 0 or an empty parameter list) clears the state before the remaining
/// recognized parameters of the same sequence are applied.
#[derive(Clone, Debug, Default)]
pub struct AnsiStyleState {
    attrs: Vec<StyleAttr>,
}

impl AnsiStyleState {
    pub fn apply(&mut self, params: &[u32]) {
        if params.is_empty() || params.contains(&0) {
            self.attrs.clear();
        }
        for &code in params {
            let Some(attr) = StyleAttr::from_code(code) else {
                continue;
            };
            self.add(attr);
        }
    }

    fn add(&mut self, attr: StyleAttr) {
        let replaces = |existing: &StyleAttr| match attr {
            StyleAttr::Fg(_) => matches!(existing, StyleAttr::Fg(_)),
            StyleAttr::Bg(_) => matches!(existing, StyleAttr::Bg(_)),
            _ => *existing == attr,
        };
        if let Some(slot) = self.attrs.iter_mut().find(|a| replaces(a)) {
            *slot = attr;
            return;
        }
        self.attrs.push(attr);
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    fn css(&self) -> String {
        self.attrs
            .iter()
            .map(StyleAttr::css)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Convert escape-coded text to HTML with `<span style="...">` styling.
pub fn to_html(text: &str) -> String {
    let text = escape_html(text).replace(ERASE_LINE, "");
    let re = escape_pattern();

    let mut out = String::new();
    let mut state = AnsiStyleState::default();
    let mut last = 0usize;

    for m in re.captures_iter(&text) {
        let whole = m.get(0).expect("match has a whole group");
        emit(&mut out, &state, &text[last..whole.start()]);

        let params: Vec<u32> = m
            .get(1)
            .map(|g| g.as_str())
            .unwrap_or("")
            .split(';')
            .map(|p| p.parse().unwrap_or(0))
            .collect();
        state.apply(&params);

        last = whole.end();
    }
    emit(&mut out, &state, &text[last..]);

    out
}

fn emit(out: &mut String, state: &AnsiStyleState, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    if state.is_empty() {
        out.push_str(fragment);
        return;
    }
    out.push_str(&format!(
        "<span style=\"{}\">{}</span>",
        state.css(),
        fragment
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = "Hello, world!";
        assert_eq!(strip(text), text);
        assert_eq!(to_html(text), text);
    }

    #[test]
    fn strip_is_idempotent() {
        let text = "Hello, \x1b[31m\x1b[1mworld!\x1b[0m and \x1b[K tail";
        let once = strip(text);
        assert_eq!(strip(&once), once);
    }

    #[test]
    fn strip_removes_sequences_and_erase_line() {
        let text = "\x1b[01m\x1b[K<source>:1:1:\x1b[m\x1b[K error";
        assert_eq!(strip(text), "<source>:1:1: error");
    }

    #[test]
    fn single_color_sequence() {
        let text = "Hello, \x1b[31mworld!";
        assert_eq!(
            to_html(text),
            "Hello, <span style=\"color: #ff0000\">world!</span>"
        );
    }

    #[test]
    fn attributes_accumulate_in_order() {
        let text = "Hello, \x1b[31m\x1b[1mworld!";
        assert_eq!(
            to_html(text),
            "Hello, <span style=\"color: #ff0000; font-weight: bold\">world!</span>"
        );
    }

    #[test]
    fn reset_after_styled_fragment() {
        let text = "Hello, \x1b[31m\x1b[1mworld!\x1b[0m";
        assert_eq!(
            to_html(text),
            "Hello, <span style=\"color: #ff0000; font-weight: bold\">world!</span>"
        );
    }

    #[test]
    fn reset_clears_active_style_for_following_text() {
        let text = "\x1b[31mred\x1b[0m plain";
        assert_eq!(
            to_html(text),
            "<span style=\"color: #ff0000\">red</span> plain"
        );
        // Empty parameter list is also a reset.
        let text = "\x1b[4munder\x1b[m plain";
        assert_eq!(
            to_html(text),
            "<span style=\"text-decoration: underline\">under</span> plain"
        );
    }

    #[test]
    fn reset_applies_before_remaining_params_of_same_sequence() {
        let text = "\x1b[31mred\x1b[0;1mbold";
        assert_eq!(
            to_html(text),
            "<span style=\"color: #ff0000\">red</span><span style=\"font-weight: bold\">bold</span>"
        );
    }

    #[test]
    fn later_color_replaces_earlier_in_place() {
        let text = "\x1b[31m\x1b[1m\x1b[32mgreen";
        assert_eq!(
            to_html(text),
            "<span style=\"color: #00ff00; font-weight: bold\">green</span>"
        );
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let text = "\x1b[99mplain\x1b[38;5;196mstill plain";
        assert_eq!(to_html(text), "plainstill plain");
    }

    #[test]
    fn escapes_markup_characters() {
        let text = "\x1b[31m<source>&co\x1b[0m";
        assert_eq!(
            to_html(text),
            "<span style=\"color: #ff0000\">&lt;source&gt;&amp;co</span>"
        );
    }

    #[test]
    fn truncated_sequence_passes_through() {
        let text = "tail\x1b[31";
        assert_eq!(strip(text), text);
        assert_eq!(to_html(text), text);
    }

    #[test]
    fn gcc_diagnostic_renders() {
        let text = "\x1b[01m\x1b[K<source>:1:1:\x1b[m\x1b[K \x1b[01;31m\x1b[Kerror: \x1b[m\x1b[Kexpected";
        let html = to_html(text);
        assert_eq!(
            html,
            "<span style=\"font-weight: bold\">&lt;source&gt;:1:1:</span> \
             <span style=\"font-weight: bold; color: #ff0000\">error: </span>expected"
        );
    }
}
