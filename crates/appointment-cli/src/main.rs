//! `clinic` CLI: inspect availability, check access rules and replay
//! booking requests against an in-memory clinic.
//!
//! ## Usage
//!
//! ```sh
//! # Free starts for doctor 10 on a date, given existing bookings
//! clinic availability --doctor 10 --date 2026-01-12 --bookings bookings.json
//!
//! # Bookings from stdin, custom clinic hours
//! cat bookings.json | clinic availability --doctor 10 --date 2026-01-12 --bookings - --config clinic.json
//!
//! # Would a nurse acting as staff be allowed to list every appointment?
//! clinic authorize --operation list_all --role NURSE --context STAFF
//!
//! # Replay booking requests through the access gate
//! clinic book --users users.json --requests requests.json --bookings bookings.json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` for the engine's decisions.

use std::io::{self, Read};

use access_policy::{Context as AccessContext, CredentialSet, Operation, Role, RuleTable, UserId};
use anyhow::{Context, Result};
use appointment_engine::{
    memory_clinic, Appointment, AppointmentRequest, MemoryDirectory, MemoryStore, Scheduler,
    SchedulingConfig, UserRecord,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "clinic", version, about = "Clinic appointment scheduling CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a doctor's free appointment starts for one clinic day
    Availability {
        /// Doctor id
        #[arg(long)]
        doctor: u64,
        /// Clinic-local date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// JSON array of existing appointments ("-" reads stdin)
        #[arg(long)]
        bookings: Option<String>,
        /// Scheduling config JSON (defaults apply when omitted)
        #[arg(long)]
        config: Option<String>,
    },
    /// Evaluate one operation's access rule for a set of credentials
    Authorize {
        /// Operation name (e.g., create_appointment)
        #[arg(long)]
        operation: Operation,
        /// Role held by the caller; repeatable
        #[arg(long = "role")]
        roles: Vec<Role>,
        /// Login context of the caller; repeatable
        #[arg(long = "context")]
        contexts: Vec<AccessContext>,
        /// Rule overrides JSON, layered on the clinic defaults
        #[arg(long)]
        rules: Option<String>,
    },
    /// Replay booking requests through the access gate
    Book {
        /// JSON array of user records (doctors and patients)
        #[arg(long)]
        users: String,
        /// JSON array of `{caller, request}` booking attempts
        #[arg(long)]
        requests: String,
        /// JSON array of existing appointments to seed the store with
        #[arg(long)]
        bookings: Option<String>,
        /// Scheduling config JSON
        #[arg(long)]
        config: Option<String>,
        /// Rule overrides JSON
        #[arg(long)]
        rules: Option<String>,
    },
}

/// One replayed booking: who is asking, and what for.
#[derive(Deserialize)]
struct BookingAttempt {
    caller: CredentialSet,
    request: AppointmentRequest,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Availability {
            doctor,
            date,
            bookings,
            config,
        } => {
            let schedule = load_config(config.as_deref())?
                .resolve()
                .context("Invalid scheduling config")?;
            let seeded = load_bookings(bookings.as_deref())?;
            let store =
                MemoryStore::with_appointments(seeded, &schedule).context("Invalid bookings")?;
            let scheduler = Scheduler::new(store, MemoryDirectory::default(), schedule);

            let result = scheduler
                .availability(UserId(doctor), date)
                .context("Failed to compute availability")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Authorize {
            operation,
            roles,
            contexts,
            rules,
        } => {
            let table = load_rules(rules.as_deref())?;
            let credentials = CredentialSet {
                roles: roles.into_iter().collect(),
                contexts: contexts.into_iter().collect(),
                subject_id: UserId(0),
            };
            let decision = if table.permits(operation, &credentials) {
                "allow"
            } else {
                "deny"
            };
            println!("{decision}");
        }
        Commands::Book {
            users,
            requests,
            bookings,
            config,
            rules,
        } => {
            let users: Vec<UserRecord> = read_json(&users)?;
            let attempts: Vec<BookingAttempt> = read_json(&requests)?;
            let schedule = load_config(config.as_deref())?
                .resolve()
                .context("Invalid scheduling config")?;
            let seeded = load_bookings(bookings.as_deref())?;
            let store =
                MemoryStore::with_appointments(seeded, &schedule).context("Invalid bookings")?;
            let gate = memory_clinic(
                schedule,
                load_rules(rules.as_deref())?,
                store,
                MemoryDirectory::new(users),
            );
            tracing::debug!(count = attempts.len(), "replaying booking requests");

            for (n, attempt) in attempts.into_iter().enumerate() {
                match gate.create_appointment(&attempt.caller, attempt.request) {
                    Ok(view) => println!(
                        "{n}: booked {} with {} at {}",
                        view.id,
                        view.doctor_name,
                        view.start.to_rfc3339()
                    ),
                    Err(err) => println!("{n}: rejected: {err}"),
                }
            }
        }
    }

    Ok(())
}

/// Logs to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(path: Option<&str>) -> Result<SchedulingConfig> {
    match path {
        Some(path) => {
            let raw = read_input(path)?;
            SchedulingConfig::from_json(&raw)
                .with_context(|| format!("Failed to parse scheduling config: {path}"))
        }
        None => Ok(SchedulingConfig::default()),
    }
}

fn load_rules(path: Option<&str>) -> Result<RuleTable> {
    match path {
        Some(path) => {
            let raw = read_input(path)?;
            RuleTable::from_json(&raw).with_context(|| format!("Failed to load rules: {path}"))
        }
        None => Ok(RuleTable::clinic_default()),
    }
}

fn load_bookings(path: Option<&str>) -> Result<Vec<Appointment>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Vec::new()),
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON: {path}"))
}

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}
