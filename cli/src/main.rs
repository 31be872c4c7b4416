//! phone-verify: interactive OTP-gated phone update.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use pv_core::{OtpMachine, ProfileForm};
use pv_infra::{create_gateway, HttpOtpGateway};
use pv_shared::config::{ApiConfig, AppConfig, Environment, GatewayProvider};
use pv_shared::phone::mask_phone_number;

mod args;
mod logging;
mod session;

use args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();
    dotenvy::from_filename(Environment::from_env().env_file()).ok();

    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    logging::init(&config.logging)?;

    info!(
        environment = ?config.environment,
        provider = %config.api.provider,
        "Starting phone-verify v{}",
        env!("CARGO_PKG_VERSION")
    );

    let initial_phone = match args.phone.clone() {
        Some(phone) => phone,
        None => fetch_saved_phone(&config.api).await?,
    };

    let gateway = create_gateway(&config.api)?;
    let machine = OtpMachine::builder(gateway)
        .config(config.machine.clone())
        .build(initial_phone.as_str())?;
    info!(
        session_id = %machine.session_id(),
        phone = %mask_phone_number(&initial_phone),
        "Session ready"
    );

    let form = Arc::new(ProfileForm::new(machine.clone()));
    session::run(form, args.json).await?;

    machine.stop();
    Ok(())
}

async fn fetch_saved_phone(api: &ApiConfig) -> Result<String> {
    if api.provider != GatewayProvider::Http {
        bail!("--phone is required with the {} provider", api.provider);
    }

    let gateway = HttpOtpGateway::new(api)?;
    let phone = gateway
        .fetch_saved_phone()
        .await
        .with_context(|| format!("failed to fetch the saved phone from {}", api.saved_phone_url()))?;
    Ok(phone)
}
