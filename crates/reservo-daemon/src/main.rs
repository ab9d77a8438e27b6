//! Reservo Daemon
//!
//! Command-line surface for the booking service: create bookings (from
//! free text or explicit fields), list them, clear them, and follow
//! new-booking notifications for the admin view.

#![allow(clippy::print_stdout)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use reservo_core::config::{default_database_path, load_config};
use reservo_core::parse::parse_reservation;
use reservo_core::tracing_init::init_tracing;

use reservo_daemon::booking::BookingService;
use reservo_daemon::email::mailer_from_config;
use reservo_daemon::relay::{InsertWatcher, NotificationHub};
use reservo_daemon::storage::{Booking, BookingMethod, Database, NewBooking};

#[derive(Parser, Debug)]
#[command(name = "reservo-daemon")]
#[command(version, about = "Reservo booking service")]
struct Args {
    /// Database file path
    #[arg(long, env = "RESERVO_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "RESERVO_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "RESERVO_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a booking from free text and/or explicit fields.
    Book {
        /// Free-text request, e.g. "table for 4 at 7:30pm under smith, a@b.com"
        #[arg(long)]
        text: Option<String>,

        /// Guest name (overrides the parsed value)
        #[arg(long)]
        name: Option<String>,

        /// Contact email (overrides the parsed value)
        #[arg(long)]
        email: Option<String>,

        /// Date, YYYY-MM-DD (overrides the parsed value)
        #[arg(long)]
        date: Option<String>,

        /// Time, 24-hour HH:MM (overrides the parsed value)
        #[arg(long)]
        time: Option<String>,

        /// Party size (overrides the parsed value)
        #[arg(long)]
        people: Option<i64>,

        /// Booking method: "ai" or "manual". Defaults to ai when --text is
        /// used, manual otherwise.
        #[arg(long)]
        method: Option<BookingMethod>,

        /// Seconds the reservation took to complete (timing experiment)
        #[arg(long)]
        completion_secs: Option<i64>,

        /// When the reservation attempt started (opaque timestamp string)
        #[arg(long)]
        start_time: Option<String>,
    },

    /// List all bookings, newest first.
    List,

    /// Delete every booking (administrative).
    Clear,

    /// Follow new-booking notifications (admin live view) until Ctrl-C.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let lvl = &args.log_level;
    init_tracing(
        &format!("reservo_daemon={lvl},reservo_core={lvl}"),
        args.log_json,
    );

    let cwd = std::env::current_dir().ok();
    let config = load_config(cwd.as_deref())?;

    let db_path = args
        .db_path
        .or_else(|| config.storage.database_path.clone())
        .or_else(default_database_path)
        .context("could not determine a database path; set --db-path or RESERVO_DB_PATH")?;
    let db = Database::open(&db_path).await?;

    let hub = NotificationHub::new();
    let mailer = Arc::from(mailer_from_config(&config.email));
    let service = BookingService::new(db.clone(), hub.clone(), mailer);

    match args.command {
        Command::Book {
            text,
            name,
            email,
            date,
            time,
            people,
            method,
            completion_secs,
            start_time,
        } => {
            let used_text = text.is_some();
            let parsed = text.map(|t| parse_reservation(&t)).unwrap_or_default();

            let name = name.or(parsed.name);
            let email = email.or(parsed.email);
            let date = date.or(parsed.date);
            let time = time.or(parsed.time);
            let people = people.or_else(|| parsed.people.map(i64::from));

            let mut absent = Vec::new();
            if name.is_none() {
                absent.push("name");
            }
            if email.is_none() {
                absent.push("email");
            }
            if date.is_none() {
                absent.push("date");
            }
            if time.is_none() {
                absent.push("time");
            }
            if people.is_none() {
                absent.push("people");
            }
            if !absent.is_empty() {
                anyhow::bail!(
                    "could not determine: {}. Provide the matching --flags or a fuller --text.",
                    absent.join(", ")
                );
            }

            let input = NewBooking {
                name: name.unwrap_or_default(),
                email: email.unwrap_or_default(),
                date: date.unwrap_or_default(),
                time: time.unwrap_or_default(),
                people: people.unwrap_or_default(),
                completion_time: completion_secs,
                booking_method: method.or(Some(if used_text {
                    BookingMethod::Ai
                } else {
                    BookingMethod::Manual
                })),
                start_time,
            };

            let booking = service.create(input).await?;
            println!(
                "Booked: {} on {} at {} for {} (#{})",
                booking.name,
                booking.date,
                booking.time,
                booking.people,
                booking.reference()
            );

            // Give the fire-and-forget confirmation send a moment before
            // the process exits.
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        Command::List => {
            let bookings = service.list().await?;
            if bookings.is_empty() {
                println!("No bookings yet.");
            } else {
                for booking in &bookings {
                    print_booking(booking);
                }
                println!("Total: {}", bookings.len());
            }
        }

        Command::Clear => {
            let removed = service.clear().await?;
            println!("Removed {removed} booking(s).");
        }

        Command::Watch => {
            let mut sub = hub.subscribe();
            let _watcher = InsertWatcher::spawn(
                db.clone(),
                hub.clone(),
                Duration::from_millis(config.relay.poll_interval_ms),
            )
            .await;

            let initial = service.list().await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load initial bookings");
                Vec::new()
            });
            // Local creates arrive both directly and via the watcher;
            // de-duplicate by booking id.
            let mut seen: HashSet<String> = initial.iter().map(|b| b.id.clone()).collect();
            for booking in &initial {
                print_booking(booking);
            }
            info!("Watching for new bookings; Ctrl-C to stop");

            loop {
                tokio::select! {
                    event = sub.recv() => {
                        match event {
                            Some(event) if seen.insert(event.booking.id.clone()) => {
                                println!("new booking:");
                                print_booking(&event.booking);
                            }
                            Some(_) => {}
                            None => break,
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            sub.unsubscribe();
            hub.close();
        }
    }

    Ok(())
}

fn print_booking(booking: &Booking) {
    println!(
        "  #{}  {}  {} {}  party of {}  <{}>{}",
        booking.reference(),
        booking.name,
        booking.date,
        booking.time,
        booking.people,
        booking.email,
        booking
            .booking_method
            .as_deref()
            .map(|m| format!("  [{m}]"))
            .unwrap_or_default(),
    );
}
