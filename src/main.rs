//! # doc-chat CLI (`docchat`)
//!
//! The `docchat` binary answers questions about your own documents. It
//! extracts text from PDF, DOCX, and TXT files, indexes it with an
//! embedding provider, and runs a retrieval-grounded conversation loop.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat chat [FILES...]` | Process files, then answer questions interactively |
//! | `docchat ask "<question>" --file <f>` | Process files and answer a single question |
//! | `docchat extract <file>` | Print extracted text and unit count |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use doc_chat::config::{self, Config};
use doc_chat::embedding::create_embedding_provider;
use doc_chat::extract;
use doc_chat::generation::create_chat_model;
use doc_chat::models::{DeclaredType, UploadedFile};
use doc_chat::session::{AskOutcome, Session};
use doc_chat::transcript;

/// doc-chat — chat with your documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; without one the built-in defaults are used. An `OPENAI_API_KEY`
/// environment variable is required for the default providers.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "doc-chat — a document question-answering assistant grounded in your own files",
    version,
    long_about = "doc-chat extracts text from PDF, DOCX, and TXT files, chunks and embeds it, \
    and answers questions through a conversational loop constrained to the retrieved content."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docchat.toml`; a missing file falls back to
    /// the built-in defaults.
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Process documents, then answer questions interactively.
    ///
    /// Plain input lines are questions. Session commands: `:process <files...>`
    /// re-processes from scratch, `:status` shows the per-file records,
    /// `:transcript` prints the HTML transcript, `:reset` clears the
    /// session, `:quit` exits.
    Chat {
        /// Documents to process before the first question (`.pdf`, `.docx`, `.txt`).
        files: Vec<PathBuf>,
    },

    /// Process documents and answer a single question.
    Ask {
        /// The question to answer.
        question: String,

        /// Documents to ground the answer in (repeatable).
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the extracted text and unit count for one file.
    Extract {
        /// The document to extract.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Chat { files } => run_chat(&cfg, &files).await,
        Commands::Ask { question, files } => run_ask(&cfg, &question, &files).await,
        Commands::Extract { file } => run_extract(&file),
    }
}

/// Read files from disk into pipeline inputs. Missing files are hard
/// errors; unsupported types are left for the assembler to warn about.
fn load_files(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        files.push(UploadedFile::new(name, bytes));
    }
    Ok(files)
}

fn new_session(cfg: &Config) -> Result<Session> {
    let embeddings = create_embedding_provider(&cfg.embedding)?;
    let chat_model = create_chat_model(&cfg.generation)?;
    Ok(Session::new(cfg.clone(), embeddings, chat_model))
}

/// Process a batch of files into the session and print the status list.
async fn process_into(session: &mut Session, paths: &[PathBuf]) -> Result<()> {
    let files = load_files(paths)?;
    let summary = session.process(&files).await?;

    for warning in &summary.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Processed {} document(s) into {} chunks ({} failed).",
        summary.processed, summary.chunks, summary.failed
    );
    print_status(session);
    Ok(())
}

fn print_status(session: &Session) {
    if session.records().is_empty() {
        println!("No documents processed yet.");
        return;
    }
    for record in session.records() {
        println!("{}", record.name);
        println!("  type: {}", record.declared_type);
        println!("  info: {}", record.info);
        println!("  status: {}", record.status);
    }
}

async fn run_chat(cfg: &Config, files: &[PathBuf]) -> Result<()> {
    let mut session = new_session(cfg)?;

    if !files.is_empty() {
        if let Err(e) = process_into(&mut session, files).await {
            eprintln!("error: {:#}", e);
        }
    }

    println!("Ask a question about your documents (:quit to exit).");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match parts.next() {
                Some("quit") | Some("q") => break,
                Some("reset") => {
                    session.reset();
                    println!("Successfully cleared chat history");
                }
                Some("status") => print_status(&session),
                Some("transcript") => match session.engine() {
                    Some(engine) => println!("{}", transcript::render_transcript(engine)),
                    None => println!("No conversation yet."),
                },
                Some("process") => {
                    let paths: Vec<PathBuf> = parts.map(PathBuf::from).collect();
                    if let Err(e) = process_into(&mut session, &paths).await {
                        eprintln!("error: {:#}", e);
                    }
                }
                _ => println!(
                    "Unknown command. Available: :process <files...>, :status, :transcript, :reset, :quit"
                ),
            }
            continue;
        }

        answer_question(&mut session, input).await;
    }

    Ok(())
}

async fn answer_question(session: &mut Session, question: &str) {
    match session.ask(question).await {
        Ok(AskOutcome::Answer(answer)) => println!("{}", answer),
        Ok(AskOutcome::NotReady(guidance)) => println!("{}", guidance),
        Err(e) => {
            eprintln!("error: {:#}", e);
            eprintln!("Tip: Try asking a more specific question about your documents.");
        }
    }
}

async fn run_ask(cfg: &Config, question: &str, files: &[PathBuf]) -> Result<()> {
    let mut session = new_session(cfg)?;
    process_into(&mut session, files).await?;
    answer_question(&mut session, question).await;
    Ok(())
}

fn run_extract(path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let declared_type = DeclaredType::from_name(&name)
        .with_context(|| format!("Unsupported file type: {}", name))?;

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let result = extract::extract(&bytes, declared_type)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!(
        "{}: {} {}",
        declared_type,
        result.unit_count,
        declared_type.unit_noun()
    );
    println!("{}", result.text);
    Ok(())
}
