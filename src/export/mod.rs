mod docx;
mod html;
mod pdf;

pub use self::html::{parse_notes, Block, TextRun};

use crate::error::{AppError, Result};
use crate::models::Notebook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn all() -> [ExportFormat; 2] {
        [ExportFormat::Docx, ExportFormat::Pdf]
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// One rendered document, ready to hand to a delivery mechanism.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Deterministic download name: spaces replaced, extension appended.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    format!("{}.{}", title.replace(' ', "_"), format.extension())
}

pub fn export_notebook(notebook: &Notebook, format: ExportFormat) -> Result<ExportedFile> {
    let bytes = match format {
        ExportFormat::Docx => docx::render_docx(notebook)?,
        ExportFormat::Pdf => pdf::render_pdf(notebook)?,
    };

    // A rendering failure must surface as an error, never as an empty
    // document presented as success.
    if bytes.is_empty() {
        return Err(AppError::Render(format!("{} renderer produced no output", format)));
    }

    Ok(ExportedFile {
        file_name: export_file_name(&notebook.title, format),
        format,
        bytes,
    })
}

/// Renders every supported format independently. One format failing never
/// suppresses the others; callers get a per-format result.
pub fn export_all(notebook: &Notebook) -> Vec<(ExportFormat, Result<ExportedFile>)> {
    ExportFormat::all()
        .into_iter()
        .map(|format| (format, export_notebook(notebook, format)))
        .collect()
}
