//! # mediroom-cli: Command-Line Front End
//!
//! Parses arguments, opens the stores, and dispatches to a command handler.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    MediRoom CLI Architecture                            │
//! │                                                                         │
//! │  argv ──► Cli (clap) ──► run()                                          │
//! │                            │                                            │
//! │            ┌───────────────┼────────────────────┐                       │
//! │            ▼               ▼                    ▼                       │
//! │      doctors/config   entity commands       db status                   │
//! │      (no storage)     (Stores: live         (Database: schema,          │
//! │                        snapshot + FIFO       counts, health)            │
//! │                        saves)                                           │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                   output::emit (text or --json)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mediroom_core::Specialty;
use mediroom_store::{StoreConfig, Stores};

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod error;
pub mod output;

pub use error::{ApiError, ErrorCode};

// =============================================================================
// Arguments
// =============================================================================

/// MediRoom: book doctors, keep a gallery, manage your profile, leave reviews.
#[derive(Debug, Parser)]
#[command(name = "mediroom", version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: platform config dir/mediroom.toml)
    #[arg(short, long, global = true, env = "MEDIROOM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List bookable doctors and their slots
    Doctors {
        /// Only doctors of this specialty (e.g. neurologist, family-doctor)
        #[arg(short, long)]
        specialty: Option<Specialty>,
    },

    /// Book and list appointments
    Appointment {
        #[command(subcommand)]
        action: AppointmentAction,
    },

    /// Upload and list gallery pictures
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },

    /// Show or replace the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Submit and list reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Print a table's contents every time it changes
    Watch {
        table: WatchTarget,

        /// Stop after this many snapshots (default: until Ctrl-C)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Database housekeeping
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Show or write the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum AppointmentAction {
    /// Book a slot with a doctor
    Book {
        #[arg(short, long)]
        doctor: String,

        #[arg(short, long)]
        time: String,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List appointments, newest first
    List {
        /// Only this doctor's appointments
        #[arg(short, long)]
        doctor: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum GalleryAction {
    /// Add a picture by URI or path
    Add {
        #[arg(short, long)]
        uri: String,

        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List pictures, newest first
    List,
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// Show the stored profile
    Show,

    /// Replace the stored profile
    Save {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        gender: String,

        #[arg(long, default_value = "")]
        bio: String,

        /// Picture file; keeps the stored picture when omitted
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReviewAction {
    /// Submit a review
    Submit { content: String },

    /// List reviews, newest first
    List,
}

#[derive(Debug, Subcommand)]
pub enum DbAction {
    /// Schema version, row counts, and health
    Status,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init,
}

/// Tables that `watch` can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WatchTarget {
    Appointments,
    Gallery,
    Profile,
    Reviews,
}

// =============================================================================
// Logging
// =============================================================================

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over `verbose` when set.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,mediroom=info,sqlx=warn",
        1 => "info,mediroom=debug,sqlx=warn",
        _ => "debug,mediroom=trace,sqlx=info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command to completion.
///
/// Command failures come back as [`ApiError`] inside the `anyhow::Error`,
/// so `main` can pick the exit code.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;

    // Commands that never touch storage
    match &cli.command {
        Commands::Doctors { specialty } => {
            let doctors = commands::doctors::list_doctors(*specialty);
            return output::emit(&doctors, json);
        }
        Commands::Config { action } => {
            return commands::config::run(action, cli.config.clone(), json);
        }
        _ => {}
    }

    let config = StoreConfig::load(cli.config.clone())
        .map_err(ApiError::from)
        .context("loading configuration")?;
    debug!(path = %config.database.path.display(), "Opening stores");

    let stores = Stores::open(&config).await.map_err(ApiError::from)?;
    let result = dispatch(&stores, cli.command, json).await;

    // Drain pending saves even when the command failed
    stores.shutdown().await;
    result
}

async fn dispatch(stores: &Stores, command: Commands, json: bool) -> anyhow::Result<()> {
    use commands::{appointment, db, gallery, profile, review, watch};

    match command {
        Commands::Appointment { action } => match action {
            AppointmentAction::Book {
                doctor,
                time,
                notes,
            } => output::emit(
                &appointment::book_appointment(stores, &doctor, &time, notes).await?,
                json,
            ),
            AppointmentAction::List { doctor } => output::emit(
                &appointment::list_appointments(stores, doctor.as_deref()).await?,
                json,
            ),
        },

        Commands::Gallery { action } => match action {
            GalleryAction::Add {
                uri,
                title,
                description,
            } => output::emit(
                &gallery::add_item(stores, &uri, &title, &description).await?,
                json,
            ),
            GalleryAction::List => output::emit(&gallery::list_items(stores).await?, json),
        },

        Commands::Profile { action } => match action {
            ProfileAction::Show => output::emit(&profile::show_profile(stores).await?, json),
            ProfileAction::Save {
                name,
                username,
                email,
                gender,
                bio,
                image,
            } => {
                let input = profile::ProfileInput {
                    name,
                    username,
                    email,
                    gender,
                    bio,
                };
                output::emit(
                    &profile::save_profile(stores, input, image.as_deref()).await?,
                    json,
                )
            }
        },

        Commands::Review { action } => match action {
            ReviewAction::Submit { content } => {
                output::emit(&review::submit_review(stores, &content).await?, json)
            }
            ReviewAction::List => output::emit(&review::list_reviews(stores).await?, json),
        },

        Commands::Watch { table, count } => watch::run(stores, table, count, json).await,

        Commands::Db { action } => match action {
            DbAction::Status => output::emit(&db::status(stores.database()).await?, json),
        },

        Commands::Doctors { .. } | Commands::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_book() {
        let cli = Cli::try_parse_from([
            "mediroom",
            "appointment",
            "book",
            "--doctor",
            "Dr. Jane Smith",
            "--time",
            "09:00 AM",
        ])
        .unwrap();

        match cli.command {
            Commands::Appointment {
                action: AppointmentAction::Book { doctor, time, notes },
            } => {
                assert_eq!(doctor, "Dr. Jane Smith");
                assert_eq!(time, "09:00 AM");
                assert_eq!(notes, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_specialty_and_globals() {
        let cli =
            Cli::try_parse_from(["mediroom", "doctors", "-s", "family-doctor", "--json", "-vv"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Doctors {
                specialty: Some(Specialty::FamilyDoctor)
            }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_specialty() {
        assert!(Cli::try_parse_from(["mediroom", "doctors", "-s", "plumber"]).is_err());
    }
}
