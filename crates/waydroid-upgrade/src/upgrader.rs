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

//! Upgrade check that ties config, OTA fetching and the upgrade command together

use crate::config::WaydroidConfig;
use crate::decision::{Image, ImageCheck, decide};
use crate::error::Result;
use crate::invoker::UpgradeInvoker;
use crate::ota::{OtaClient, UpdateRecord, latest_datetime};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Upgrader {
    config: WaydroidConfig,
    ota: OtaClient,
    invoker: UpgradeInvoker,
}

impl Upgrader {
    pub fn new(config: WaydroidConfig, ota: OtaClient, invoker: UpgradeInvoker) -> Self {
        Self {
            config,
            ota,
            invoker,
        }
    }

    /// Run one check and return the process exit code
    pub async fn run(&self) -> Result<i32> {
        if self.config.is_preinstalled_image() {
            warn!(
                "Upgrade refused because Waydroid loads pre-installed image: {}",
                self.config.images_path()
            );
            return Ok(0);
        }

        let system_url = self.config.system_ota()?;
        let vendor_url = self.config.vendor_ota()?;
        let local_system = self.config.system_datetime()?;
        let local_vendor = self.config.vendor_datetime()?;

        let (system_records, vendor_records) = self.ota.fetch_both(system_url, vendor_url).await?;
        info!("Extraction completed.");

        let system = image_check(Image::System, local_system, &system_records)?;
        let vendor = image_check(Image::Vendor, local_vendor, &vendor_records)?;

        for check in [&system, &vendor] {
            if check.upgrade_available() {
                info!("{} upgrade available: {}", check.image, check.remote);
            } else {
                info!("{} is up to date: {}", check.image, check.local);
            }
        }

        let count = decide(system.local, system.remote, vendor.local, vendor.remote);
        self.invoker.invoke(count).await
    }
}

fn image_check(image: Image, local: i64, records: &[UpdateRecord]) -> Result<ImageCheck> {
    let remote = latest_datetime(records)?;
    if let Some(newest) = records.first()
        && let Some(filename) = newest.filename()
    {
        tracing::debug!("Newest {image} build: {filename}");
    }
    Ok(ImageCheck::new(image, local, remote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpgradeError;
    use crate::invoker::UpgradeCommand;
    use mockito::{Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn config_for(
        server: &ServerGuard,
        images_path: &str,
        system: i64,
        vendor: i64,
    ) -> WaydroidConfig {
        WaydroidConfig::from_ini_str(&format!(
            "[waydroid]\n\
             images_path = {images_path}\n\
             system_ota = {url}/system.json\n\
             vendor_ota = {url}/vendor.json\n\
             system_datetime = {system}\n\
             vendor_datetime = {vendor}\n",
            url = server.url()
        ))
        .unwrap()
    }

    fn ota_body(datetime: i64) -> String {
        json!({ "response": [{ "datetime": datetime, "filename": "image.zip" }] }).to_string()
    }

    fn suppressed() -> UpgradeInvoker {
        UpgradeInvoker::new(true).with_delay(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_preinstalled_image_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let config = config_for(&server, "/usr/share/waydroid-extra/images", 0, 0);
        let upgrader = Upgrader::new(config, OtaClient::new().unwrap(), suppressed());

        assert_eq!(upgrader.run().await.unwrap(), 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_one_pending_upgrade_suppressed() {
        let mut server = Server::new_async().await;
        let _system = server
            .mock("GET", "/system.json")
            .with_body(ota_body(150))
            .create_async()
            .await;
        let _vendor = server
            .mock("GET", "/vendor.json")
            .with_body(ota_body(200))
            .create_async()
            .await;

        let config = config_for(&server, "/var/lib/waydroid/images", 100, 200);
        let upgrader = Upgrader::new(config, OtaClient::new().unwrap(), suppressed());

        assert_eq!(upgrader.run().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_both_pending_upgrades_suppressed() {
        let mut server = Server::new_async().await;
        let _system = server
            .mock("GET", "/system.json")
            .with_body(ota_body(101))
            .create_async()
            .await;
        let _vendor = server
            .mock("GET", "/vendor.json")
            .with_body(ota_body(201))
            .create_async()
            .await;

        let config = config_for(&server, "/var/lib/waydroid/images", 100, 200);
        let upgrader = Upgrader::new(config, OtaClient::new().unwrap(), suppressed());

        assert_eq!(upgrader.run().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_server_error_aborts() {
        let mut server = Server::new_async().await;
        let _system = server
            .mock("GET", "/system.json")
            .with_status(500)
            .create_async()
            .await;
        let _vendor = server
            .mock("GET", "/vendor.json")
            .with_body(ota_body(300))
            .create_async()
            .await;

        let config = config_for(&server, "/var/lib/waydroid/images", 100, 200);
        let upgrader = Upgrader::new(config, OtaClient::new().unwrap(), suppressed());

        assert!(matches!(
            upgrader.run().await,
            Err(UpgradeError::Network { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_ota_url_fails_before_fetching() {
        let config = WaydroidConfig::from_ini_str("[waydroid]\nsystem_datetime = 1\n").unwrap();
        let upgrader = Upgrader::new(
            config,
            OtaClient::new().unwrap(),
            UpgradeInvoker::new(false)
                .with_command(UpgradeCommand::new("false", Vec::<String>::new())),
        );

        assert!(matches!(
            upgrader.run().await,
            Err(UpgradeError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_channel_is_parse_error() {
        let mut server = Server::new_async().await;
        let _system = server
            .mock("GET", "/system.json")
            .with_body(r#"{"response": []}"#)
            .create_async()
            .await;
        let _vendor = server
            .mock("GET", "/vendor.json")
            .with_body(ota_body(200))
            .create_async()
            .await;

        let config = config_for(&server, "/var/lib/waydroid/images", 100, 200);
        let upgrader = Upgrader::new(config, OtaClient::new().unwrap(), suppressed());

        assert!(matches!(
            upgrader.run().await,
            Err(UpgradeError::Parse(_))
        ));
    }
}
