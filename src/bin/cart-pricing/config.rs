//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Price a cart fixture and print its receipt
#[derive(Debug, Parser)]
#[command(name = "cart-pricing", version)]
pub(crate) struct CliConfig {
    /// Fixture set to load the cart & pricing from
    #[arg(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Directory containing `carts/` and `pricing/` fixtures
    #[arg(long, env = "CART_PRICING_FIXTURES", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Coupon code to apply; repeat to apply several in order
    #[arg(short, long = "coupon")]
    pub coupons: Vec<String>,

    /// Override the base shipping charge (e.g., "15.90 BRL")
    #[arg(short, long)]
    pub shipping: Option<String>,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
