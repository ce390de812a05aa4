use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::db::{import_notebooks, Repository};
use crate::error::{AppError, Result};
use crate::export::{export_all, export_notebook, ExportFormat};
use crate::video::{normalize_watch_url, resume_url, OEmbedClient, TitleLookup};

/// The literal token the user must type to confirm a deletion.
const DELETE_CONFIRMATION: &str = "DELETE";

#[derive(Parser)]
#[command(name = "tubenote", version, about = "Video notebooks: notes and playback progress per video")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all notebooks, newest first
    List,
    /// Create a notebook for a video URL
    Create {
        /// Any recognized YouTube link (watch, short, or embed form)
        url: String,
        /// Notebook title; fetched from the video when omitted
        #[arg(long)]
        title: Option<String>,
    },
    /// Show one notebook with its notes as plain text
    Show { id: i64 },
    /// Rename a notebook
    Rename { id: i64, title: String },
    /// Overwrite a notebook's notes from an HTML file
    SaveNotes {
        id: i64,
        /// File containing the note HTML
        file: PathBuf,
        /// Playback position in seconds saved along with the notes
        #[arg(long, default_value_t = 0)]
        progress: u32,
    },
    /// Update the saved playback position
    Progress { id: i64, seconds: u32 },
    /// Open the video in the browser, resuming at the saved position
    Open { id: i64 },
    /// Delete a notebook after confirmation
    Delete {
        id: i64,
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Append notebooks from another database file
    Import { file: PathBuf },
    /// Export a notebook as a document
    Export {
        id: i64,
        #[arg(long, value_enum, default_value = "docx")]
        format: FormatArg,
        /// Directory the exported files are written to
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Docx,
    Pdf,
    All,
}

impl Cli {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let repo = Repository::open(&config.db_path).await?;

        match self.command {
            Command::List => {
                let notebooks = repo.list_all().await?;
                if notebooks.is_empty() {
                    println!("No notebooks yet. Create one with: tubenote create <url>");
                    return Ok(());
                }
                for notebook in &notebooks {
                    println!(
                        "{:>4}  {:<48}  {:>6}s  {}",
                        notebook.id,
                        truncate(&notebook.title, 48),
                        notebook.progress_time_seconds,
                        notebook.created_at.format("%Y-%m-%d"),
                    );
                }
            }

            Command::Create { url, title } => {
                let watch_url = normalize_watch_url(&url).ok_or_else(|| {
                    AppError::validation(format!("unrecognized video URL: {}", url))
                })?;

                let title = match title {
                    Some(title) => title,
                    None => {
                        let lookup =
                            OEmbedClient::new(Duration::from_secs(config.title_lookup_timeout_secs));
                        lookup.lookup_title(&watch_url).await.ok_or_else(|| {
                            AppError::validation(
                                "could not fetch a title for this video; pass --title",
                            )
                        })?
                    }
                };

                let id = repo.create(&title, &watch_url).await?;
                println!("Created notebook {}: {}", id, title);
            }

            Command::Show { id } => {
                let notebook = repo.get(id).await?;
                println!("#{}  {}", notebook.id, notebook.title);
                println!("Video:    {}", notebook.video_url);
                println!("Progress: {}s", notebook.progress_time_seconds);
                println!("Created:  {}", notebook.created_at.format("%Y-%m-%d %H:%M"));
                if !notebook.notes.trim().is_empty() {
                    let text = html2text::from_read(notebook.notes.as_bytes(), 80)
                        .unwrap_or_else(|_| notebook.notes.clone());
                    println!("\n{}", text.trim_end());
                }
            }

            Command::Rename { id, title } => {
                repo.update_title(id, &title).await?;
                println!("Renamed notebook {} to: {}", id, title);
            }

            Command::SaveNotes { id, file, progress } => {
                let notes = std::fs::read_to_string(&file)?;
                repo.update_notes(id, &notes, progress).await?;
                println!("Saved notes for notebook {}", id);
            }

            Command::Progress { id, seconds } => {
                // Notes and progress are written together; carry the current
                // notes through unchanged.
                let notebook = repo.get(id).await?;
                repo.update_notes(id, &notebook.notes, seconds).await?;
                println!("Progress for notebook {} set to {}s", id, seconds);
            }

            Command::Open { id } => {
                let notebook = repo.get(id).await?;
                let url = resume_url(&notebook.video_url, notebook.progress_time_seconds);
                open::that(&url)?;
                println!("Opened {}", url);
            }

            Command::Delete { id, yes } => {
                let notebook = repo.get(id).await?;
                if !yes && !confirm_deletion(&notebook.title)? {
                    println!("Aborted.");
                    return Ok(());
                }
                repo.delete(id).await?;
                println!("Deleted notebook {}", id);
            }

            Command::Import { file } => {
                let report = import_notebooks(&repo, &file).await?;
                println!("Imported {} notebooks from {}", report.imported, file.display());
            }

            Command::Export { id, format, dir } => {
                let notebook = repo.get(id).await?;
                std::fs::create_dir_all(&dir)?;

                let results = match format {
                    FormatArg::Docx => {
                        vec![(ExportFormat::Docx, export_notebook(&notebook, ExportFormat::Docx))]
                    }
                    FormatArg::Pdf => {
                        vec![(ExportFormat::Pdf, export_notebook(&notebook, ExportFormat::Pdf))]
                    }
                    FormatArg::All => export_all(&notebook),
                };

                let mut failures = 0;
                for (format, result) in results {
                    match result {
                        Ok(file) => {
                            let path = dir.join(&file.file_name);
                            std::fs::write(&path, &file.bytes)?;
                            println!("Wrote {}", path.display());
                        }
                        Err(e) => {
                            failures += 1;
                            tracing::warn!("{} export failed: {}", format, e);
                            eprintln!("{} export failed: {}", format, e);
                        }
                    }
                }
                if failures > 0 {
                    return Err(AppError::Render(format!(
                        "{} export format(s) failed",
                        failures
                    )));
                }
            }
        }

        Ok(())
    }
}

fn confirm_deletion(title: &str) -> Result<bool> {
    print!("Delete '{}'? Type {} to confirm: ", title, DELETE_CONFIRMATION);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim() == DELETE_CONFIRMATION)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}\u{2026}", kept)
}
