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

//! Log output setup for the binary

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Filter from `RUST_LOG`, falling back to `info`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: one line per record with local time,
/// level and message, written to stderr
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_owned()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
