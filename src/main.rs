//! scholarlens - Bibliometric classification engine
//!
//! Classifies a researcher's publications into research domains, resolves the
//! owner's author position on each paper and computes citation metrics.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! scholarlens analyze profile.json
//! scholarlens venue "IEEE Transactions on Pattern Analysis and Machine Intelligence"
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! scholarlens serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::{Parser, Subcommand};
use scholarlens::{
    analysis::{ProfileAnalyzer, ProfileReport},
    authorship::{parse_authors, resolve_role},
    conferences::{ConferenceEntry, ConferenceStore},
    config::EngineConfig,
    domain::Domain,
    error::OptionExt,
    loader,
    publication::{self, Profile},
    registry::VenueRegistry,
    resolver::{Resolution, VenueResolver},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Bibliometric classification engine for Scholar profiles
#[derive(Parser)]
#[command(name = "scholarlens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Extra config file layered over the default cascade
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a profile (JSON or CSV) and print the report as JSON
    Analyze {
        /// Profile file
        input: PathBuf,

        /// Owner name (required for CSV input)
        #[arg(long)]
        name: Option<String>,

        /// SCImago journal database or CSV export (overrides config)
        #[arg(long)]
        scimago: Option<PathBuf>,

        /// Conference table JSON (overrides config)
        #[arg(long)]
        conferences: Option<PathBuf>,

        /// Boost domains with Semantic Scholar fields of study
        #[arg(long)]
        enrich: bool,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve venue strings to domains
    Venue {
        /// Venue strings
        #[arg(required = true)]
        venues: Vec<String>,

        /// Show every scored candidate
        #[arg(long)]
        explain: bool,
    },

    /// Resolve the owner's position in a raw author string
    Authors {
        /// Author string as shown on the profile, e.g. "A Smith, J Doe, ..."
        raw: String,

        /// Profile owner's display name
        #[arg(long)]
        owner: String,
    },

    /// Inspect or build the journal registry
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },

    /// Manage the persisted conference table
    Conferences {
        #[command(subcommand)]
        action: ConferenceAction,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
enum RegistryAction {
    /// Print registry statistics
    Stats,
    /// Convert a SCImago CSV export (or JSON database) into a JSON database
    Import {
        /// SCImago `.csv` export or `.json` database
        input: PathBuf,
        /// Output JSON database
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConferenceAction {
    /// Show conference file path
    Path,
    /// List known conferences
    List,
    /// Add or replace a conference
    Add {
        /// Lookup key, e.g. "iclr"
        key: String,
        /// Full conference name
        #[arg(long)]
        name: String,
        /// Domain label, e.g. "Computer Science and AI"
        #[arg(long)]
        domain: Domain,
        #[arg(long, default_value = "Unknown")]
        rank: String,
        /// Comma-separated aliases
        #[arg(long, value_delimiter = ',')]
        aliases: Vec<String>,
    },
    /// Remove the stored table (the built-in list is used again)
    Clear,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries reports, so logs go to stderr
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.log_json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            input,
            name,
            scimago,
            conferences,
            enrich,
            output,
        } => {
            let mut config = config;
            if scimago.is_some() {
                config.data.scimago_path = scimago;
            }
            if conferences.is_some() {
                config.data.conference_path = conferences;
            }
            run_analyze(config, &input, name.as_deref(), enrich, output.as_deref()).await
        }
        Commands::Venue { venues, explain } => run_venue(&config, &venues, explain),
        Commands::Authors { raw, owner } => run_authors(&raw, &owner),
        Commands::Registry { action } => handle_registry(&config, action),
        Commands::Conferences { action } => handle_conferences(&config, action),
        Commands::Serve { port, host } => run_server(config, host, port).await,
    }
}

fn shared_registry(config: &EngineConfig) -> Arc<VenueRegistry> {
    Arc::new(loader::build_registry(&config.data, &config.matching))
}

// ============================================================================
// Profile Commands
// ============================================================================

async fn run_analyze(
    mut config: EngineConfig,
    input: &Path,
    name: Option<&str>,
    enrich: bool,
    output: Option<&Path>,
) -> Result<()> {
    let profile = publication::load_profile(input, name)
        .with_context(|| format!("Failed to load profile {:?}", input))?;

    if enrich {
        config.enrichment.enabled = true;
    }
    let analyzer = ProfileAnalyzer::new(shared_registry(&config), config);
    let report = analyzer.analyze_with_enrichment(&profile).await;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            println!("Saved: {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_venue(config: &EngineConfig, venues: &[String], explain: bool) -> Result<()> {
    let resolver = VenueResolver::new(shared_registry(config), config.matching.clone());

    for venue in venues {
        let resolution = resolver.explain(venue);
        if explain {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            continue;
        }
        match &resolution.accepted {
            Some(m) => {
                let domains: Vec<&str> = m.domains.iter().map(|d| d.label()).collect();
                println!(
                    "{} -> {} ({:?}, score {}, key '{}')",
                    venue,
                    domains.join(", "),
                    m.kind,
                    m.score,
                    m.matched_key
                );
            }
            None => println!("{} -> no match", venue),
        }
    }
    Ok(())
}

fn run_authors(raw: &str, owner: &str) -> Result<()> {
    let parsed = parse_authors(raw);
    let role = resolve_role(owner, &parsed.tokens, parsed.truncated);

    let tokens: Vec<&str> = parsed.tokens.iter().map(|t| t.as_str()).collect();
    println!("Authors:   {}", tokens.join(" | "));
    println!("Truncated: {}", parsed.truncated);
    println!("Role:      {}", role);
    Ok(())
}

// ============================================================================
// Registry Management
// ============================================================================

fn handle_registry(config: &EngineConfig, action: RegistryAction) -> Result<()> {
    match action {
        RegistryAction::Stats => {
            let registry = shared_registry(config);
            println!("{}", serde_json::to_string_pretty(&registry.stats())?);
        }
        RegistryAction::Import { input, out } => {
            let extension = input
                .extension()
                .and_then(|e| e.to_str())
                .ok_or_parse("dataset path has no extension")?;
            info!(input = ?input, extension = %extension, "Importing journal dataset");

            let database = loader::read_dataset(&input)
                .with_context(|| format!("Failed to read dataset {:?}", input))?;
            loader::write_database(&database, &out)
                .with_context(|| format!("Failed to write database {:?}", out))?;
            println!("Saved {} journals to {:?}", database.journals.len(), out);
        }
    }
    Ok(())
}

// ============================================================================
// Conference Management
// ============================================================================

fn conference_store(config: &EngineConfig) -> Result<ConferenceStore> {
    Ok(match &config.data.conference_path {
        Some(path) => ConferenceStore::with_path(path.clone()),
        None => ConferenceStore::new()?,
    })
}

fn handle_conferences(config: &EngineConfig, action: ConferenceAction) -> Result<()> {
    let store = conference_store(config)?;

    match action {
        ConferenceAction::Path => {
            println!("Conference file: {:?}", store.path());
        }
        ConferenceAction::List => {
            let registry = store.load();
            for (key, entry) in registry.iter() {
                println!("{:<12} {:<4} {:<32} {}", key, entry.rank, entry.domain.label(), entry.name);
            }
            println!("{} conferences", registry.len());
        }
        ConferenceAction::Add {
            key,
            name,
            domain,
            rank,
            aliases,
        } => {
            let mut registry = store.load();
            registry.add(
                &key,
                ConferenceEntry {
                    name,
                    domain,
                    rank,
                    aliases,
                },
            );
            store.save(&registry)?;
            println!("Saved '{}' ({} conferences)", key, registry.len());
        }
        ConferenceAction::Clear => {
            store.clear()?;
            println!("Conference table cleared.");
        }
    }
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(config: EngineConfig, host: String, port: u16) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");
    println!("Starting server at http://{}:{}", host, port);

    let registry = shared_registry(&config);
    let app_state = Arc::new(AppState {
        resolver: VenueResolver::new(registry.clone(), config.matching.clone()),
        analyzer: ProfileAnalyzer::new(registry, config),
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .route("/analyze/batch", post(batch_handler))
        .route("/venue", post(venue_handler))
        .route("/registry", get(registry_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

struct AppState {
    resolver: VenueResolver,
    analyzer: ProfileAnalyzer,
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Analyze request body: a profile, optionally with enrichment
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(flatten)]
    profile: Profile,
    #[serde(default)]
    enrich: bool,
}

async fn analyze_profile(state: &AppState, req: AnalyzeRequest) -> ProfileReport {
    if req.enrich {
        let mut config = state.analyzer.config().clone();
        config.enrichment.enabled = true;
        let analyzer = ProfileAnalyzer::new(state.resolver.registry().clone(), config);
        analyzer.analyze_with_enrichment(&req.profile).await
    } else {
        state.analyzer.analyze_with_enrichment(&req.profile).await
    }
}

/// Analyze endpoint handler
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ProfileReport>, (StatusCode, String)> {
    if req.profile.name.trim().is_empty() {
        error!("Analyze request without owner name");
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "profile name is required".to_string()));
    }
    info!(name = %req.profile.name, publications = req.profile.publications.len(), "Analyze request");
    Ok(Json(analyze_profile(&state, req).await))
}

/// Batch analyze: profiles are analyzed concurrently, results keep request order
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<AnalyzeRequest>>,
) -> Json<Vec<ProfileReport>> {
    info!(profiles = requests.len(), "Batch analyze request");
    let reports = futures::future::join_all(
        requests
            .into_iter()
            .map(|req| analyze_profile(&state, req)),
    )
    .await;
    Json(reports)
}

/// Venue request body
#[derive(Debug, Deserialize)]
struct VenueRequest {
    venues: Vec<String>,
}

#[derive(Debug, Serialize)]
struct VenueResponse {
    status: String,
    count: usize,
    results: Vec<Resolution>,
}

/// Venue resolution endpoint handler
async fn venue_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VenueRequest>,
) -> Json<VenueResponse> {
    let results: Vec<Resolution> = req.venues.iter().map(|v| state.resolver.explain(v)).collect();
    Json(VenueResponse {
        status: "success".to_string(),
        count: results.len(),
        results,
    })
}

async fn registry_handler(State(state): State<Arc<AppState>>) -> Json<scholarlens::registry::RegistryStats> {
    Json(state.resolver.registry().stats())
}
