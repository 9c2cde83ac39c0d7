//! The fixed markup subset assistant messages may carry:
//! `**bold**`, `*italic*`, `` `code` ``, `==highlight==`, and `- `
//! list items. Anything else, including unterminated markers, is
//! plain text. Parsing never fails.

/// One styled run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Highlight(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Text(s)
            | Span::Bold(s)
            | Span::Italic(s)
            | Span::Code(s)
            | Span::Highlight(s) => s,
        }
    }
}

/// A block-level element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Span>),
    List(Vec<Vec<Span>>),
}

/// Parse message content into blocks. Consecutive `- ` lines group
/// into one list; every other non-blank line is a paragraph.
pub fn parse(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut items: Vec<Vec<Span>> = Vec::new();

    for line in content.lines() {
        let line = line.trim_end();
        if let Some(item) = line.trim_start().strip_prefix("- ") {
            items.push(parse_spans(item));
            continue;
        }
        if !items.is_empty() {
            blocks.push(Block::List(std::mem::take(&mut items)));
        }
        if line.trim().is_empty() {
            continue;
        }
        blocks.push(Block::Paragraph(parse_spans(line)));
    }
    if !items.is_empty() {
        blocks.push(Block::List(items));
    }
    blocks
}

/// Inline pass. `**` is tried before `*` so bold wins; a marker with
/// no closer is consumed as literal text.
pub fn parse_spans(text: &str) -> Vec<Span> {
    type Make = fn(String) -> Span;
    const MARKERS: [(&str, Make); 4] = [
        ("**", Span::Bold),
        ("==", Span::Highlight),
        ("*", Span::Italic),
        ("`", Span::Code),
    ];

    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    'outer: while !rest.is_empty() {
        for (delim, make) in MARKERS {
            if let Some(inner) = rest.strip_prefix(delim) {
                if let Some(end) = inner.find(delim) {
                    if end > 0 {
                        flush(&mut plain, &mut spans);
                        spans.push(make(inner[..end].to_string()));
                        rest = &inner[end + delim.len()..];
                        continue 'outer;
                    }
                }
                break;
            }
        }
        let ch = rest.chars().next().expect("rest is non-empty");
        plain.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    flush(&mut plain, &mut spans);
    spans
}

fn flush(plain: &mut String, spans: &mut Vec<Span>) {
    if !plain.is_empty() {
        spans.push(Span::Text(std::mem::take(plain)));
    }
}
