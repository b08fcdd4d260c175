use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Interstate ICMS (Antecipação and DIFAL) and sale-price calculator.
///
/// Amounts and percentages are read in pt-BR format (`1.234,56`, `17,5`).
#[derive(Debug, Parser)]
#[command(name = "icms")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file. Defaults to `icms.toml` in the working directory
    /// when that file exists.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level or EnvFilter directive (overrides the configuration file).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Computes the ICMS due on one interstate purchase.
    Difal(DifalArgs),
    /// Solves a sale price and its margins.
    Pricing(PricingArgs),
    /// Prints the internal rate of every state.
    Rates,
    /// Evaluates every operation of a semicolon-separated CSV file.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct DifalArgs {
    /// Value of the goods
    #[arg(long)]
    pub goods: String,

    /// Freight charged on the invoice
    #[arg(long, default_value = "")]
    pub freight: String,

    /// Other accessory expenses
    #[arg(long, default_value = "")]
    pub other: String,

    /// IPI charged on the invoice (added to the base for consumption only)
    #[arg(long, default_value = "")]
    pub ipi: String,

    /// resale (revenda) or consumption (consumo)
    #[arg(long)]
    pub purpose: String,

    /// Origin state code (e.g. SP)
    #[arg(long)]
    pub origin: String,

    /// Destination state code (e.g. BA)
    #[arg(long)]
    pub destination: String,

    /// Interstate rate; looked up from the states when omitted
    #[arg(long)]
    pub inter_rate: Option<String>,

    /// Destination internal rate; taken from the rate table when omitted
    #[arg(long)]
    pub dest_rate: Option<String>,

    /// Base reduction in percent
    #[arg(long, default_value = "")]
    pub reduction: String,

    /// The goods are imported (4% interstate rate)
    #[arg(long, default_value_t = false)]
    pub imported: bool,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["sale", "profit", "margin"])
))]
pub struct PricingArgs {
    /// Unit cost
    #[arg(long)]
    pub cost: String,

    /// Taxes on the sale, in percent of the sale price
    #[arg(long, default_value = "")]
    pub tax: String,

    /// Fixed costs, in percent of the sale price
    #[arg(long, default_value = "")]
    pub fixed: String,

    /// Sale price to analyse
    #[arg(long)]
    pub sale: Option<String>,

    /// Target net profit per unit
    #[arg(long)]
    pub profit: Option<String>,

    /// Target net margin, in percent of the sale price
    #[arg(long)]
    pub margin: Option<String>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Path to the CSV file containing the operations
    #[arg(short, long)]
    pub file: PathBuf,
}
