use scraper::{ElementRef, Html, Node};

/// A run of text with uniform formatting. A `"\n"` inside the text marks an
/// explicit line break (`<br>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// Block-level structure recovered from the stored note HTML. Anything the
/// rich-text editor can emit maps onto one of these; unknown markup degrades
/// to its text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, runs: Vec<TextRun> },
    Paragraph { runs: Vec<TextRun> },
    ListItem { ordered: bool, index: usize, runs: Vec<TextRun> },
}

impl Block {
    pub fn runs(&self) -> &[TextRun] {
        match self {
            Block::Heading { runs, .. } => runs,
            Block::Paragraph { runs } => runs,
            Block::ListItem { runs, .. } => runs,
        }
    }

    /// Text content with formatting stripped.
    pub fn text(&self) -> String {
        self.runs().iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    bold: bool,
    italic: bool,
    underline: bool,
}

/// Parses note HTML into blocks. Never fails: arbitrary or broken markup
/// yields whatever text can be recovered, and empty input yields no blocks.
pub fn parse_notes(html: &str) -> Vec<Block> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let fragment = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    collect_blocks(&fragment.root_element(), &mut blocks);
    blocks
}

fn collect_blocks(container: &ElementRef, blocks: &mut Vec<Block>) {
    // Inline content outside any block container accumulates here and is
    // flushed as a paragraph when a block element (or the end) is reached.
    let mut pending: Vec<TextRun> = Vec::new();

    for child in container.children() {
        match child.value() {
            Node::Text(text) => push_text(&mut pending, text, Style::default()),
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = el.value().name();
                match name {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        flush_pending(blocks, &mut pending);
                        let level = name.as_bytes()[1] - b'0';
                        let runs = collect_runs(&el);
                        if !runs.is_empty() {
                            blocks.push(Block::Heading { level, runs });
                        }
                    }
                    "p" | "div" | "blockquote" | "pre" => {
                        flush_pending(blocks, &mut pending);
                        let runs = collect_runs(&el);
                        if !runs.is_empty() {
                            blocks.push(Block::Paragraph { runs });
                        }
                    }
                    "ul" | "ol" => {
                        flush_pending(blocks, &mut pending);
                        collect_list(&el, name == "ol", blocks);
                    }
                    "br" => flush_pending(blocks, &mut pending),
                    _ => collect_runs_into(&el, inline_style(name, Style::default()), &mut pending),
                }
            }
            _ => {}
        }
    }

    flush_pending(blocks, &mut pending);
}

fn collect_list(list: &ElementRef, ordered: bool, blocks: &mut Vec<Block>) {
    let mut index = 1;
    for child in list.children() {
        let Some(item) = ElementRef::wrap(child) else {
            continue;
        };
        if item.value().name() != "li" {
            continue;
        }
        let runs = collect_runs(&item);
        if !runs.is_empty() {
            blocks.push(Block::ListItem { ordered, index, runs });
            index += 1;
        }
    }
}

fn collect_runs(el: &ElementRef) -> Vec<TextRun> {
    let mut runs = Vec::new();
    collect_runs_into(el, Style::default(), &mut runs);
    runs
}

fn collect_runs_into(el: &ElementRef, style: Style, runs: &mut Vec<TextRun>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => push_text(runs, text, style),
            Node::Element(_) => {
                let Some(inner) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = inner.value().name();
                if name == "br" {
                    append_run(runs, "\n", style);
                    continue;
                }
                collect_runs_into(&inner, inline_style(name, style), runs);
            }
            _ => {}
        }
    }
}

fn inline_style(name: &str, mut style: Style) -> Style {
    // Links and unrecognized inline elements keep the surrounding style;
    // their text content still comes through.
    match name {
        "strong" | "b" => style.bold = true,
        "em" | "i" => style.italic = true,
        "u" => style.underline = true,
        _ => {}
    }
    style
}

fn push_text(runs: &mut Vec<TextRun>, raw: &str, style: Style) {
    if raw.trim().is_empty() {
        // Whitespace between inline elements separates words; whitespace at
        // the start of a block does not.
        if runs.last().is_some_and(|last| !last.text.ends_with([' ', '\n'])) {
            append_run(runs, " ", Style::default());
        }
        return;
    }

    // Collapse whitespace sequences the way a browser renders them
    let mut text = String::with_capacity(raw.len());
    let mut last_was_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                text.push(' ');
            }
            last_was_space = true;
        } else {
            text.push(ch);
            last_was_space = false;
        }
    }

    append_run(runs, &text, style);
}

fn append_run(runs: &mut Vec<TextRun>, text: &str, style: Style) {
    if let Some(last) = runs.last_mut() {
        if last.bold == style.bold && last.italic == style.italic && last.underline == style.underline
        {
            last.text.push_str(text);
            return;
        }
    }
    runs.push(TextRun {
        text: text.to_string(),
        bold: style.bold,
        italic: style.italic,
        underline: style.underline,
    });
}

fn flush_pending(blocks: &mut Vec<Block>, pending: &mut Vec<TextRun>) {
    if !pending.is_empty() {
        blocks.push(Block::Paragraph {
            runs: std::mem::take(pending),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_blocks() {
        assert!(parse_notes("").is_empty());
        assert!(parse_notes("   \n  ").is_empty());
    }

    #[test]
    fn test_heading_and_paragraph() {
        let blocks = parse_notes("<h1>Hi</h1><p>there</p>");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    runs: vec![TextRun::plain("Hi")],
                },
                Block::Paragraph {
                    runs: vec![TextRun::plain("there")],
                },
            ]
        );
    }

    #[test]
    fn test_emphasis_runs() {
        let blocks = parse_notes("<p>a <strong>b</strong> <em>c</em></p>");
        let runs = blocks[0].runs();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0], TextRun::plain("a "));
        assert!(runs[1].bold && runs[1].text == "b");
        assert!(runs[3].italic && runs[3].text == "c");
        assert_eq!(blocks[0].text(), "a b c");
    }

    #[test]
    fn test_nested_emphasis() {
        let blocks = parse_notes("<p><strong><em>both</em></strong></p>");
        let run = &blocks[0].runs()[0];
        assert!(run.bold && run.italic);
    }

    #[test]
    fn test_lists() {
        let blocks = parse_notes("<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol>");
        assert_eq!(
            blocks[0],
            Block::ListItem {
                ordered: false,
                index: 1,
                runs: vec![TextRun::plain("one")],
            }
        );
        assert_eq!(
            blocks[1],
            Block::ListItem {
                ordered: false,
                index: 2,
                runs: vec![TextRun::plain("two")],
            }
        );
        assert_eq!(
            blocks[2],
            Block::ListItem {
                ordered: true,
                index: 1,
                runs: vec![TextRun::plain("first")],
            }
        );
    }

    #[test]
    fn test_line_breaks_inside_paragraph() {
        let blocks = parse_notes("<p>one<br>two</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "one\ntwo");
    }

    #[test]
    fn test_links_degrade_to_text() {
        let blocks = parse_notes(r#"<p>see <a href="https://example.com">this page</a></p>"#);
        assert_eq!(blocks[0].text(), "see this page");
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        let blocks = parse_notes("just some text");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                runs: vec![TextRun::plain("just some text")],
            }]
        );
    }

    #[test]
    fn test_unknown_markup_degrades_to_text() {
        let blocks = parse_notes("<article><p>inside</p></article><video>clip</video>");
        // <article> is not a recognized container; its text still survives
        assert!(blocks.iter().any(|b| b.text().contains("inside")));
    }
}
