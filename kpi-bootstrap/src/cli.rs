use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Upper bound for `--days` and `--days-ahead`, same as the config windows.
pub const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Parser, Debug)]
#[command(name = "kpi-monitor")]
#[command(about = "KPI indicator evaluation and analytics", long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Print Prometheus counters to stderr after the command finishes
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Indicators due for execution, most urgent first
    Plan,
    /// Evaluate one execution result against its indicator's threshold
    Evaluate {
        #[arg(long)]
        indicator: i64,
        /// Value the query returned; omit for failed runs
        #[arg(long)]
        value: Option<Decimal>,
        #[arg(long)]
        historical: Option<Decimal>,
        #[arg(long, default_value = "scheduled")]
        context: String,
        /// The caller holds permission for manual and test runs
        #[arg(long)]
        user_permission: bool,
        /// Error message of a failed run
        #[arg(long)]
        failed: Option<String>,
        #[arg(long)]
        duration_ms: Option<i64>,
    },
    /// Health score of one indicator, or of every active one
    Health {
        #[arg(long)]
        indicator: Option<i64>,
    },
    /// Configuration checks for all indicators
    Validate,
    Trend {
        #[arg(long)]
        indicator: i64,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS))]
        days: Option<u32>,
    },
    /// Per indicator execution statistics, highest alert rate first
    Performance {
        /// RFC 3339 timestamp or YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Predict {
        #[arg(long)]
        indicator: i64,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS))]
        days_ahead: Option<u32>,
    },
    Anomalies {
        #[arg(long)]
        indicator: i64,
    },
    Seasonality {
        #[arg(long)]
        indicator: i64,
    },
    Correlations,
}
