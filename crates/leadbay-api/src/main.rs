//! Leadbay CLI and REST API entry point.
//!
//! Binary name: `leadbay`
//!
//! Reads storage configuration from the environment, picks the backend
//! (SQL via the Any-driver pool, or the JSON-file fallback when nothing
//! is configured outside production), then dispatches to the requested
//! command or starts the API server.

mod http;
mod state;

use clap::{Parser, Subcommand};

use leadbay_core::store::{Backend, SessionStore, UserStore};
use leadbay_infra::config::{StorageConfig, StorageMode};
use leadbay_infra::file::FileBackend;
use leadbay_infra::sql::schema::initialize_schema;
use leadbay_infra::sql::{Database, SqlBackend};
use leadbay_types::error::StoreError;
use leadbay_types::user::CreateUser;

use state::AppState;

#[derive(Parser)]
#[command(name = "leadbay", about = "Lead & chat-widget capture backend", version)]
struct Cli {
    /// Emit one-line JSON log records instead of human-readable output.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Bridge tracing spans to an OpenTelemetry stdout exporter.
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0", env = "LEADBAY_HOST")]
        host: String,
        #[arg(long, default_value_t = 8080, env = "LEADBAY_PORT")]
        port: u16,
    },
    /// Apply the relational schema idempotently and exit.
    InitSchema,
    /// Create a dashboard user. Prompts for the password when not given.
    CreateUser {
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// Plaintext password; omit to be prompted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete expired dashboard sessions.
    CleanupSessions,
}

/// The backend chosen at startup. The SQL arm keeps the pool handle so
/// it can be drained on exit.
enum SelectedBackend {
    Sql { db: Database, backend: SqlBackend },
    File(FileBackend),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    leadbay_observe::tracing_setup::init_tracing("info,leadbay=debug", cli.json_logs, cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let config = StorageConfig::from_env();

    let result = run(cli.command, &config).await;
    leadbay_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(command: Commands, config: &StorageConfig) -> anyhow::Result<()> {
    match command {
        Commands::InitSchema => {
            let db = Database::connect(config).await?;
            db.ping().await?;
            initialize_schema(&db).await?;
            db.close().await;
            println!("Schema applied.");
            Ok(())
        }
        command => match select_backend(config).await? {
            SelectedBackend::Sql { db, backend } => {
                let result = dispatch(command, backend).await;
                db.close().await;
                result
            }
            SelectedBackend::File(backend) => dispatch(command, backend).await,
        },
    }
}

async fn dispatch<B: Backend>(command: Commands, backend: B) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => serve(backend, &host, port).await,
        Commands::CreateUser {
            username,
            email,
            role,
            password,
        } => create_user(backend, username, email, role, password).await,
        Commands::CleanupSessions => {
            let removed = backend.sessions().delete_expired().await?;
            println!("Removed {removed} expired session(s).");
            Ok(())
        }
        Commands::InitSchema => unreachable!("handled before backend selection"),
    }
}

/// Pick the storage backend per configuration: explicit file mode, or
/// the SQL pool, falling back to file storage when the descriptor is
/// absent and the deployment is not strict.
async fn select_backend(config: &StorageConfig) -> anyhow::Result<SelectedBackend> {
    if config.mode == StorageMode::File {
        let backend = FileBackend::open(config.data_dir.clone()).await?;
        return Ok(SelectedBackend::File(backend));
    }

    match Database::connect(config).await {
        Ok(db) => {
            db.ping().await?;
            initialize_schema(&db).await?;
            let backend = SqlBackend::new(db.clone());
            Ok(SelectedBackend::Sql { db, backend })
        }
        Err(StoreError::Configuration(msg)) if !config.strict => {
            tracing::warn!(%msg, "no database configured, using file storage");
            let backend = FileBackend::open(config.data_dir.clone()).await?;
            Ok(SelectedBackend::File(backend))
        }
        Err(e) => Err(e.into()),
    }
}

async fn serve<B: Backend>(backend: B, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Leadbay API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(AppState::new(backend));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

async fn create_user<B: Backend>(
    backend: B,
    username: String,
    email: Option<String>,
    role: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => dialoguer::Password::new()
            .with_prompt(format!("Password for '{username}'"))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let user = backend
        .users()
        .create(CreateUser {
            username,
            password,
            email,
            role,
        })
        .await?;

    println!(
        "  {} Created user '{}' (role: {})",
        console::style("✓").green(),
        console::style(&user.username).cyan(),
        user.role
    );
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
