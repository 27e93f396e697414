//! Markdown to plain text, for hosts that cannot render formatting.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Renders `source` as plain text. Paragraphs are separated by a blank line,
/// list items get a bullet, inline formatting is dropped.
#[must_use]
pub fn to_plain_text(source: &str) -> String {
    let mut out = String::new();
    let mut line = String::new();

    let flush = |out: &mut String, line: &mut String| {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(trimmed);
        }
        line.clear();
    };

    for event in Parser::new(source) {
        match event {
            Event::Start(Tag::Item) => {
                flush(&mut out, &mut line);
                line.push_str("• ");
            }
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_)) => {
                flush(&mut out, &mut line);
                out.push('\n');
            }
            Event::End(TagEnd::Item) => flush(&mut out, &mut line),
            Event::Text(text) | Event::Code(text) => line.push_str(&text),
            Event::SoftBreak => line.push(' '),
            Event::HardBreak => flush(&mut out, &mut line),
            _ => {}
        }
    }
    flush(&mut out, &mut line);
    out.trim_end().to_owned()
}
