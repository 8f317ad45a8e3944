//! services/client/src/bin/unbind.rs

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unbind_client::{
    app::{
        documents::{get_document, list_analyses},
        load_dashboard, login, logout, request_analysis,
        session::update_profile,
        AppState, UploadCoordinator,
    },
    config::Config,
    error::ClientError,
};
use unbind_core::{
    domain::{Analysis, Document, LoginCredentials, ProfileUpdate},
    format::{
        capitalize_first, format_date_time, format_file_size, format_relative_time,
        is_valid_email, is_valid_password, slugify, truncate_text,
    },
    upload::{LocalFile, UploadStatus},
};

const PREVIEW_CHARS: usize = 280;

#[derive(Debug, Parser)]
#[command(name = "unbind", about = "Upload legal documents and read their simplifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your documents with dashboard counters
    Documents,
    /// Show one document
    Show { document_id: i64 },
    /// Upload one or more pdf, docx, doc or txt files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Run an analysis of a document and print the simplification
    Analyze { document_id: i64 },
    /// List the analyses of a document
    Analyses { document_id: i64 },
    /// Update your first and/or last name
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Build the Shared AppState ---
    let state = AppState::from_config(config)?;

    // --- 3. Run the Command ---
    let cli = Cli::parse();
    match cli.command {
        Commands::Login { email, password } => {
            if !is_valid_email(&email) {
                return Err(ClientError::Internal(format!("'{}' is not a valid email address", email)));
            }
            if !is_valid_password(&password) {
                return Err(ClientError::Internal(
                    "Password must be at least 6 characters".to_string(),
                ));
            }
            login(&state, &LoginCredentials { email, password }).await?;
        }
        Commands::Logout => logout(&state),
        Commands::Whoami => {
            let dashboard = load_dashboard(&state).await;
            match dashboard.user {
                Some(user) => {
                    println!("{} <{}>", user.display_name(), user.email);
                    println!("Member since {}", format_date_time(&user.created_at));
                    if !user.is_verified {
                        println!("Email address not verified yet");
                    }
                }
                None => println!("Not signed in"),
            }
        }
        Commands::Documents => {
            let dashboard = load_dashboard(&state).await;
            let counters = dashboard.counters;
            println!(
                "Total: {}  Analyzed: {}  Pending: {}",
                counters.total, counters.analyzed, counters.pending
            );
            if dashboard.documents.is_empty() {
                println!("No documents yet. Upload one with `unbind upload <file>`.");
            }
            for document in &dashboard.documents {
                print_document_row(document);
            }
        }
        Commands::Show { document_id } => {
            let document = get_document(&state, document_id).await?;
            print_document_row(&document);
            println!("  stored as {} ({})", document.filename, document.mime_type);
            let stem = document
                .original_filename
                .rsplit_once('.')
                .map_or(document.original_filename.as_str(), |(stem, _)| stem);
            println!("  slug {}", slugify(stem));
            if let Some(updated_at) = document.updated_at {
                println!("  updated {}", format_date_time(&updated_at));
            }
        }
        Commands::Upload { paths } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(read_local_file(path).await?);
            }

            let coordinator = UploadCoordinator::new(&state);
            let result = coordinator.upload_files(files).await;
            for attempt in coordinator.attempts() {
                let label = match attempt.status() {
                    UploadStatus::Success => "uploaded".to_string(),
                    UploadStatus::Uploading => "pending".to_string(),
                    UploadStatus::Error => format!("failed: {}", attempt.error().unwrap_or("unknown")),
                };
                println!(
                    "{:<40} {:>10}  {}",
                    attempt.file().name,
                    format_file_size(attempt.file().size()),
                    label
                );
            }
            result?;
        }
        Commands::Analyze { document_id } => {
            let analysis = request_analysis(&state, document_id).await?;
            print_analysis(&analysis, None);
        }
        Commands::Analyses { document_id } => {
            let analyses = list_analyses(&state, document_id).await?;
            if analyses.is_empty() {
                println!("No analyses for document {} yet.", document_id);
            }
            for analysis in &analyses {
                print_analysis(analysis, Some(PREVIEW_CHARS));
            }
        }
        Commands::Profile {
            first_name,
            last_name,
        } => {
            let user = update_profile(&state, &ProfileUpdate { first_name, last_name }).await?;
            println!("{} <{}>", user.display_name(), user.email);
        }
    }

    Ok(())
}

async fn read_local_file(path: &Path) -> Result<LocalFile, ClientError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::Internal(format!("{} is not a file", path.display())))?;
    let bytes = tokio::fs::read(path).await?;
    Ok(LocalFile::new(name, bytes))
}

fn print_document_row(document: &Document) {
    println!(
        "#{:<5} {:<40} {:>10}  {:<10} {}",
        document.id,
        document.original_filename,
        format_file_size(document.file_size),
        capitalize_first(document.status.as_str()),
        format_relative_time(&document.created_at, &Utc::now()),
    );
}

fn print_analysis(analysis: &Analysis, preview: Option<usize>) {
    println!(
        "Analysis #{} ({}) of document {}, {}",
        analysis.id,
        analysis.analysis_type,
        analysis.document_id,
        format_date_time(&analysis.created_at)
    );
    if let Some(score) = analysis.confidence_score {
        println!("  confidence: {}", score);
    }
    if let Some(ms) = analysis.processing_time {
        println!("  processing time: {}", ms);
    }
    let text = match preview {
        Some(max) => truncate_text(&analysis.simplified_text, max),
        None => analysis.simplified_text.clone(),
    };
    println!("{}\n", text);
}
