//! Subcommands and their dispatch.

pub mod admin;
pub mod booking;
pub mod request;

use crate::state::AppState;
use anyhow::Context;
use clap::Subcommand;
use motbook_sdk::objects::{PaymentMethod, calendar_date};
use std::path::PathBuf;
use time::{Date, Month};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the free time slots of a date (YYYY-MM-DD)
    Slots {
        #[arg(value_parser = parse_date)]
        date: Date,
    },

    /// List the bookable days of a month (defaults to the current one)
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        month: Option<u8>,
    },

    /// Book from a request file and pay at the terminal
    Book {
        /// TOML file with the booking form fields
        request: PathBuf,
        /// Override the payment method of the request (paypal or cash)
        #[arg(long)]
        method: Option<PaymentMethod>,
    },

    /// Staff commands
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Show how a path resolves for the stored admin session
    Route { path: String },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when neither given nor set in the environment
        #[arg(long, env = "MOTBOOK_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in admin
    Whoami,

    /// Show a customer booking
    Customer {
        id: String,
        /// Download the booking photos into this directory
        #[arg(long)]
        photos: Option<PathBuf>,
    },

    /// Book on behalf of a customer from a request file
    Book {
        request: PathBuf,
        #[arg(long)]
        method: Option<PaymentMethod>,
    },
}

fn parse_date(value: &str) -> Result<Date, String> {
    calendar_date::parse(value).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Run `command` against `state`.
pub async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Slots { date } => booking::slots(state, date).await,
        Command::Calendar { year, month } => {
            let today = motbook_core::booking::calendar::today();
            let year = year.unwrap_or(today.year());
            let month = match month {
                Some(month) => Month::try_from(month)?,
                None => today.month(),
            };
            booking::calendar(state, year, month).await
        }
        Command::Book { request, method } => booking::book(state, &request, method).await,
        Command::Admin(command) => dispatch_admin(state, command).await,
        Command::Route { path } => admin::route(state, &path).await,
    }
}

async fn dispatch_admin(state: &AppState, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            admin::login(state, &email, &password).await
        }
        AdminCommand::Logout => admin::logout(state).await,
        AdminCommand::Whoami => admin::whoami(state).await,
        AdminCommand::Customer { id, photos } => {
            admin::customer(state, &id, photos.as_deref()).await
        }
        AdminCommand::Book { request, method } => admin::book(state, &request, method).await,
    }
}

fn read_password() -> anyhow::Result<String> {
    use std::io::{BufRead, Write};

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use time::macros::date;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_parse_slots() {
        let cli = Cli::try_parse_from(["motbook", "slots", "2025-03-04"]).unwrap();
        assert!(matches!(cli.command, Command::Slots { date } if date == date!(2025 - 03 - 04)));

        assert!(Cli::try_parse_from(["motbook", "slots", "04/03/2025"]).is_err());
    }

    #[test]
    fn test_parse_book_with_method() {
        let cli =
            Cli::try_parse_from(["motbook", "book", "jane.toml", "--method", "cash"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Book { method: Some(PaymentMethod::Cash), .. }
        ));
    }

    #[test]
    fn test_parse_admin_customer() {
        let cli = Cli::try_parse_from([
            "motbook", "admin", "customer", "c-9", "--photos", "/tmp/photos",
        ])
        .unwrap();
        match cli.command {
            Command::Admin(AdminCommand::Customer { id, photos }) => {
                assert_eq!(id, "c-9");
                assert_eq!(photos, Some(PathBuf::from("/tmp/photos")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_month_range() {
        assert!(Cli::try_parse_from(["motbook", "calendar", "--month", "13"]).is_err());
    }
}
