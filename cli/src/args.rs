//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Update a profile phone number behind OTP verification.
#[derive(Parser, Debug, Clone)]
#[command(name = "phone-verify")]
#[command(about = "Interactive OTP-gated phone update session")]
#[command(version)]
pub struct Args {
    /// Phone currently saved on the profile. Fetched from the API when omitted.
    #[arg(short, long)]
    pub phone: Option<String>,

    /// Configuration file (defaults to config.<environment>.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print transitions as JSON lines instead of screens.
    #[arg(long)]
    pub json: bool,
}
