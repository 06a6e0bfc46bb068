//! Clinic CLI - admin and doctor panels from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as the clinic administrator
//! clinic-cli login admin -e admin@clinic.test -p secret
//!
//! # Inventory
//! clinic-cli drugs list
//! clinic-cli drugs edit 65f0c2 --price 6.50 --stock 40
//!
//! # Orders
//! clinic-cli orders complete 65f0d1
//!
//! # Doctor panel
//! clinic-cli login doctor -e grey@clinic.test -p secret
//! clinic-cli doctor appointments
//! ```
//!
//! # Environment Variables
//!
//! - `CLINIC_BACKEND_URL` - Base URL of the clinic backend (required)
//! - `CLINIC_SESSION_FILE` - Where session tokens are kept
//! - `CLINIC_LOG_JSON` - Emit JSON logs when set
//! - `RUST_LOG` - Log filter (default: `clinic_cli=info,clinic_admin=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use clinic_admin::AppState;
use clinic_admin::config::ClientConfig;
use clinic_admin_core::Role;
use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::admin::{AppointmentsAction, DoctorsAction, DrugsAction, OrdersAction};
use commands::doctor::{DoctorAction, ProfileAction};
use commands::session::TokenAction;
use error::CliError;

#[derive(Parser)]
#[command(name = "clinic-cli")]
#[command(author, version, about = "Clinic admin and doctor panel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the role's token
    Login {
        /// Role to sign in as (`admin` or `doctor`)
        role: Role,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign a role out
    Logout {
        role: Role,
    },
    /// Manage stored tokens directly
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Show which roles are signed in
    Status,
    /// Doctors (admin)
    Doctors {
        #[command(subcommand)]
        action: DoctorsAction,
    },
    /// Appointments (admin)
    Appointments {
        #[command(subcommand)]
        action: AppointmentsAction,
    },
    /// Drug inventory (admin)
    Drugs {
        #[command(subcommand)]
        action: DrugsAction,
    },
    /// Pharmacy orders (admin)
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Admin dashboard summary
    Dashboard,
    /// The signed-in doctor's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Doctor panel: own appointments and dashboard
    Doctor {
        #[command(subcommand)]
        action: DoctorAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clinic_cli=info,clinic_admin=info".into());

    let json = std::env::var_os("CLINIC_LOG_JSON").is_some();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let state = AppState::new(config).await?;
    let (done_tx, done_rx) = oneshot::channel();
    let printer = tokio::spawn(output::follow_notifications(
        state.notifier().subscribe(),
        done_rx,
    ));

    let result = dispatch(&state, cli.command).await;

    let _ = done_tx.send(());
    match printer.await {
        Ok(printed) => printed?,
        Err(e) => tracing::warn!("Notification printer stopped: {e}"),
    }
    result
}

async fn dispatch(state: &AppState, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login {
            role,
            email,
            password,
        } => commands::session::login(state, role, email, password).await,
        Commands::Logout { role } => commands::session::logout(state, role).await,
        Commands::Token { action } => commands::session::token(state, action).await,
        Commands::Status => commands::session::status(state),
        Commands::Doctors { action } => commands::admin::doctors(state, action).await,
        Commands::Appointments { action } => commands::admin::appointments(state, action).await,
        Commands::Drugs { action } => commands::admin::drugs(state, action).await,
        Commands::Orders { action } => commands::admin::orders(state, action).await,
        Commands::Dashboard => commands::admin::dashboard(state).await,
        Commands::Profile { action } => commands::doctor::profile(state, action).await,
        Commands::Doctor { action } => commands::doctor::doctor(state, action).await,
    }
}
