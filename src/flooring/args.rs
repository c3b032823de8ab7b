use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flooring")]
#[command(version, about = "Manage flooring installation orders stored as plain text", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.json, Data/ and Orders/
    #[arg(long, env = "FLOORING_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the orders on a date
    #[command(alias = "ls")]
    List {
        /// Fulfillment date (MM/DD/YYYY or YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Show a single order
    Show {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        #[arg(short, long)]
        number: u32,
    },

    /// Create an order and save it
    Add {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        /// Customer name (letters, digits, spaces, commas, periods)
        #[arg(long)]
        name: String,

        /// State abbreviation, as listed by `states`
        #[arg(long)]
        state: String,

        /// Product type, as listed by `products`
        #[arg(long)]
        product: String,

        /// Area in square feet
        #[arg(long)]
        area: Decimal,

        /// Print the priced order without storing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Change an order and save it. Omitted fields keep their value.
    #[command(alias = "e")]
    Edit {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        #[arg(short, long)]
        number: u32,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        product: Option<String>,

        #[arg(long)]
        area: Option<Decimal>,
    },

    /// Remove an order and save the date
    #[command(alias = "rm")]
    Remove {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        #[arg(short, long)]
        number: u32,
    },

    /// List available products
    Products,

    /// List state tax rates
    States,

    /// Print the number the next order will get
    NextNumber,

    /// Get or set configuration
    Config {
        /// Configuration key (orders-dir, data-dir, minimum-area)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

/// Accepts `MM/DD/YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{s}', expected MM/DD/YYYY or YYYY-MM-DD"))
}
