// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of waydroid-upgrade.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! waydroid-upgrade - Entry point for the upgrade checker binary
//!
//! Exits with 0 when nothing is pending, with the number of pending upgrades
//! when `NO_UPGRADE` is set, and otherwise with the exit code of
//! `sudo waydroid upgrade`.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use waydroid_upgrade::config::CONFIG_PATH;
use waydroid_upgrade::{OtaClient, UpgradeInvoker, Upgrader, WaydroidConfig, logging};

#[derive(Debug, Parser)]
#[command(name = "waydroid-upgrade")]
#[command(
    version,
    about = "Check for Waydroid image upgrades without restarting the session"
)]
struct Cli {
    /// Waydroid configuration file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Only report pending upgrades, like setting NO_UPGRADE
    #[arg(long)]
    no_upgrade: bool,

    /// Seconds to wait before running `sudo waydroid upgrade`
    #[arg(long, default_value_t = 3)]
    delay: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match run(cli).await {
        Ok(code) => u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config =
        WaydroidConfig::load_from(&cli.config).context("failed to load Waydroid config")?;

    let suppressed = cli.no_upgrade || no_upgrade_requested();
    let invoker = UpgradeInvoker::new(suppressed).with_delay(Duration::from_secs(cli.delay));
    let upgrader = Upgrader::new(config, OtaClient::new()?, invoker);

    Ok(upgrader.run().await?)
}

/// Any non-empty `NO_UPGRADE` counts as set
fn no_upgrade_requested() -> bool {
    std::env::var_os("NO_UPGRADE").is_some_and(|value| !value.is_empty())
}
