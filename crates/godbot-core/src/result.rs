//! Compile-result rendering: fixed section sequence packed into bounded
//! Markdown chunks, or converted to styled HTML.

use tracing::debug;

use crate::ansi;
use crate::writer::MessageWriter;

/// Which result sections a reply renders. Closed set: the callback buttons
/// select one section, the initial reply carries both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputSections {
    Assembly,
    Diagnostics,
    All,
}

impl OutputSections {
    fn wants_assembly(self) -> bool {
        matches!(self, OutputSections::Assembly | OutputSections::All)
    }

    fn wants_diagnostics(self) -> bool {
        matches!(self, OutputSections::Diagnostics | OutputSections::All)
    }
}

/// Outcome of one remote compile.
///
/// `asm` and `output` hold the raw, still escape-coded line text; rendering
/// decides whether codes are stripped or translated.
#[derive(Clone, Debug)]
pub struct CompileResult {
    pub ok: bool,
    pub header: String,
    pub asm: Vec<String>,
    pub output: Vec<String>,
}

impl CompileResult {
    /// Render the selected sections to Markdown chunks, each within
    /// `max_size` and independently well-formed with respect to code fences.
    pub fn to_messages(&self, sections: OutputSections, max_size: usize) -> Vec<String> {
        let mut w = MessageWriter::new(max_size);
        w.add_line(&self.header);

        if sections.wants_assembly() {
            write_section(&mut w, "Assembly", &self.asm);
        }
        if sections.wants_diagnostics() {
            write_section(&mut w, "Output", &self.output);
        }

        let messages = w.into_messages();
        debug!(chunks = messages.len(), "rendered compile result");
        messages
    }

    /// Styled rendering of the same sections, escape codes translated to
    /// `<span>` markup.
    pub fn to_html(&self, sections: OutputSections) -> String {
        let mut out = String::new();
        out.push_str(&ansi::escape_html(&self.header));
        out.push('\n');

        if sections.wants_assembly() {
            html_section(&mut out, "Assembly", &self.asm);
        }
        if sections.wants_diagnostics() {
            html_section(&mut out, "Output", &self.output);
        }

        out
    }
}

fn write_section(w: &mut MessageWriter, name: &str, lines: &[String]) {
    if lines.is_empty() {
        w.add_line(&format!("*{name}*: void"));
        return;
    }
    w.add_line(&format!("*{name}:*"));
    w.set_code_mode();
    for line in lines {
        w.add_line(&ansi::strip(line));
    }
    w.set_plain_mode();
}

fn html_section(out: &mut String, name: &str, lines: &[String]) {
    if lines.is_empty() {
        out.push_str(&format!("<b>{name}</b>: void\n"));
        return;
    }
    out.push_str(&format!("<b>{name}:</b>\n<pre>"));
    for line in lines {
        out.push_str(&ansi::to_html(line));
        out.push('\n');
    }
    out.push_str("</pre>\n");
}
