use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

use crate::error::{AppError, Result};
use crate::models::Notebook;

use super::html::{parse_notes, Block, TextRun};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Renders one notebook as a DOCX byte buffer: title heading, the video URL
/// as plain reference text, and the notes converted from their stored HTML
/// into WordprocessingML.
pub fn render_docx(notebook: &Notebook) -> Result<Vec<u8>> {
    let document = document_xml(notebook);

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)
        .map_err(zip_err)?;
    zip.write_all(CONTENT_TYPES.as_bytes()).map_err(io_err)?;

    zip.start_file("_rels/.rels", options).map_err(zip_err)?;
    zip.write_all(RELS.as_bytes()).map_err(io_err)?;

    zip.start_file("word/document.xml", options).map_err(zip_err)?;
    zip.write_all(document.as_bytes()).map_err(io_err)?;

    let cursor = zip.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

fn zip_err(e: zip::result::ZipError) -> AppError {
    AppError::Render(format!("docx packaging failed: {}", e))
}

fn io_err(e: std::io::Error) -> AppError {
    AppError::Render(format!("docx packaging failed: {}", e))
}

fn document_xml(notebook: &Notebook) -> String {
    let mut paragraphs = String::new();

    let title_run = TextRun {
        text: notebook.title.clone(),
        bold: true,
        italic: false,
        underline: false,
    };
    paragraphs.push_str(&paragraph_xml(
        std::slice::from_ref(&title_run),
        "",
        &size_props(40),
    ));

    if !notebook.video_url.is_empty() {
        let url_run = TextRun::plain(format!("Video URL: {}", notebook.video_url));
        paragraphs.push_str(&paragraph_xml(std::slice::from_ref(&url_run), "", ""));
        paragraphs.push_str("<w:p/>");
    }

    let blocks = parse_notes(&notebook.notes);
    if !blocks.is_empty() {
        let label = TextRun::plain("Notes:");
        paragraphs.push_str(&paragraph_xml(std::slice::from_ref(&label), "", ""));
        for block in &blocks {
            paragraphs.push_str(&block_xml(block));
        }
    }

    format!(
        r#"{}<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        XML_HEADER, paragraphs
    )
}

fn block_xml(block: &Block) -> String {
    match block {
        Block::Heading { level, runs } => {
            let runs: Vec<TextRun> = runs
                .iter()
                .cloned()
                .map(|mut run| {
                    run.bold = true;
                    run
                })
                .collect();
            paragraph_xml(&runs, "", &size_props(heading_size(*level)))
        }
        Block::Paragraph { runs } => paragraph_xml(runs, "", ""),
        Block::ListItem {
            ordered,
            index,
            runs,
        } => {
            let marker = if *ordered {
                format!("{}. ", index)
            } else {
                "\u{2022} ".to_string()
            };
            let mut marked = Vec::with_capacity(runs.len() + 1);
            marked.push(TextRun::plain(marker));
            marked.extend(runs.iter().cloned());
            paragraph_xml(&marked, r#"<w:pPr><w:ind w:left="360"/></w:pPr>"#, "")
        }
    }
}

/// Half-point font sizes per heading level, h1 largest.
fn heading_size(level: u8) -> u32 {
    match level {
        1 => 36,
        2 => 32,
        3 => 28,
        _ => 24,
    }
}

fn size_props(half_points: u32) -> String {
    format!(
        r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
        half_points
    )
}

fn paragraph_xml(runs: &[TextRun], paragraph_props: &str, extra_run_props: &str) -> String {
    let mut xml = String::from("<w:p>");
    xml.push_str(paragraph_props);
    for run in runs {
        xml.push_str(&run_xml(run, extra_run_props));
    }
    xml.push_str("</w:p>");
    xml
}

fn run_xml(run: &TextRun, extra_props: &str) -> String {
    let mut props = String::from(extra_props);
    if run.bold {
        props.push_str("<w:b/>");
    }
    if run.italic {
        props.push_str("<w:i/>");
    }
    if run.underline {
        props.push_str(r#"<w:u w:val="single"/>"#);
    }
    let run_props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{}</w:rPr>", props)
    };

    // Embedded newlines are explicit <br> line breaks
    let text = run
        .text
        .split('\n')
        .map(|part| format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(part)))
        .collect::<Vec<_>>()
        .join("<w:br/>");

    format!("<w:r>{}{}</w:r>", run_props, text)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
