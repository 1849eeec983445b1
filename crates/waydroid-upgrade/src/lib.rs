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

//! Waydroid upgrade checker
//!
//! Compares the build timestamps of the installed Waydroid system and vendor
//! images with the ones published on their OTA channels, without restarting
//! the session. Runs as a normal user and never writes to the system itself;
//! pending upgrades are applied through `sudo waydroid upgrade`.

pub mod config;
pub mod decision;
pub mod error;
pub mod invoker;
pub mod logging;
pub mod ota;
pub mod upgrader;

pub use config::WaydroidConfig;
pub use decision::{Image, ImageCheck, decide};
pub use error::UpgradeError;
pub use invoker::{UpgradeCommand, UpgradeInvoker};
pub use ota::{OtaClient, UpdateRecord};
pub use upgrader::Upgrader;
