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

//! Error types for the upgrade checker

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to \"{url}\" failed: {message}")]
    Request { url: String, message: String },

    #[error("\"{url}\" returned HTTP {status}")]
    Network { url: String, status: u16 },

    #[error("unexpected OTA response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, UpgradeError>;
