use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::{AppError, Result};
use crate::models::Notebook;

use super::html::{parse_notes, Block};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 6.5;
const WRAP_COLUMNS: usize = 90;

/// Renders one notebook as a PDF byte buffer. Inline emphasis degrades to
/// plain text here; headings keep a bold face and larger size.
pub fn render_pdf(notebook: &Notebook) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        notebook.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "content",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut page = PageCursor {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    page.write_wrapped(&doc, &notebook.title, &bold, 18.0);
    page.blank_line();
    if !notebook.video_url.is_empty() {
        page.write_wrapped(&doc, &format!("Video URL: {}", notebook.video_url), &regular, 11.0);
        page.blank_line();
    }

    let blocks = parse_notes(&notebook.notes);
    if !blocks.is_empty() {
        page.write_wrapped(&doc, "Notes:", &regular, 11.0);
        page.blank_line();
        for block in &blocks {
            match block {
                Block::Heading { level, runs: _ } => {
                    page.write_wrapped(&doc, &block.text(), &bold, heading_size(*level));
                }
                Block::Paragraph { .. } => {
                    page.write_wrapped(&doc, &block.text(), &regular, 11.0);
                }
                Block::ListItem { ordered, index, .. } => {
                    let marker = if *ordered {
                        format!("{}. ", index)
                    } else {
                        "- ".to_string()
                    };
                    page.write_wrapped(&doc, &format!("{}{}", marker, block.text()), &regular, 11.0);
                }
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::Render(format!("pdf rendering failed: {}", e))
}

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 16.0,
        2 => 14.0,
        _ => 12.0,
    }
}

struct PageCursor {
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor {
    /// Writes text wrapped to the page width, breaking onto new pages as
    /// needed. Explicit line breaks in the text are honored.
    fn write_wrapped(
        &mut self,
        doc: &PdfDocumentReference,
        text: &str,
        font: &IndirectFontRef,
        size: f32,
    ) {
        for raw_line in text.lines() {
            if raw_line.is_empty() {
                self.advance(doc, LINE_HEIGHT_MM);
                continue;
            }
            for wrapped in textwrap::wrap(raw_line, WRAP_COLUMNS) {
                self.advance(doc, LINE_HEIGHT_MM);
                self.layer
                    .use_text(wrapped.as_ref(), size, Mm(MARGIN_MM), Mm(self.y), font);
            }
        }
    }

    fn blank_line(&mut self) {
        self.y -= LINE_HEIGHT_MM / 2.0;
    }

    fn advance(&mut self, doc: &PdfDocumentReference, by: f32) {
        self.y -= by;
        if self.y < MARGIN_MM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notebook(notes: &str) -> Notebook {
        Notebook {
            id: 1,
            title: "Lecture".to_string(),
            video_url: "https://www.youtube.com/watch?v=abc123".to_string(),
            notes: notes.to_string(),
            progress_time_seconds: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pdf_header_and_nonempty() {
        let bytes = render_pdf(&notebook("<h1>Hi</h1><p>there</p>")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_empty_notes_still_render() {
        let bytes = render_pdf(&notebook("")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_notes_grow_the_document() {
        let long = format!("<p>{}</p>", "paragraph text ".repeat(40)).repeat(60);
        let long_bytes = render_pdf(&notebook(&long)).unwrap();
        let short_bytes = render_pdf(&notebook("<p>short</p>")).unwrap();
        assert!(long_bytes.starts_with(b"%PDF"));
        assert!(long_bytes.len() > short_bytes.len());
    }
}
