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

//! OTA endpoint fetching
//!
//! Waydroid OTA channels answer with `{"response": [{"datetime": ..., ...}]}`,
//! newest build first.

use crate::error::{Result, UpgradeError};
use serde_json::{Map, Value};
use tracing::info;

const USER_AGENT: &str = concat!("waydroid-upgrade/", env!("CARGO_PKG_VERSION"));

/// One build entry of an OTA channel
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRecord {
    fields: Map<String, Value>,
}

impl UpdateRecord {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(UpgradeError::Parse(format!(
                "update entry is not an object: {other}"
            ))),
        }
    }

    /// Build timestamp of this entry
    pub fn datetime(&self) -> Result<i64> {
        match self.fields.get("datetime") {
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                UpgradeError::Parse(format!("\"datetime\" is not an integer: {n}"))
            }),
            Some(other) => Err(UpgradeError::Parse(format!(
                "\"datetime\" is not an integer: {other}"
            ))),
            None => Err(UpgradeError::Parse(
                "update entry has no \"datetime\"".to_owned(),
            )),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.fields.get("filename").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }
}

/// Parse an OTA response body into its update entries
pub fn parse_updates(body: &str) -> Result<Vec<UpdateRecord>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| UpgradeError::Parse(format!("body is not JSON: {e}")))?;

    let Value::Object(mut envelope) = value else {
        return Err(UpgradeError::Parse("body is not a JSON object".to_owned()));
    };

    match envelope.remove("response") {
        Some(Value::Array(entries)) => entries.into_iter().map(UpdateRecord::from_value).collect(),
        Some(_) => Err(UpgradeError::Parse("\"response\" is not an array".to_owned())),
        None => Err(UpgradeError::Parse("missing \"response\" key".to_owned())),
    }
}

/// Timestamp of the newest build, which the channel lists first
pub fn latest_datetime(records: &[UpdateRecord]) -> Result<i64> {
    records
        .first()
        .ok_or_else(|| UpgradeError::Parse("\"response\" is empty".to_owned()))?
        .datetime()
}

#[derive(Debug, Clone)]
pub struct OtaClient {
    client: reqwest::Client,
}

impl OtaClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpgradeError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET `url` and return the update entries it lists
    pub async fn fetch(&self, url: &str) -> Result<Vec<UpdateRecord>> {
        info!("Checking \"{url}\" for updates");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpgradeError::Request {
                url: url.to_owned(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpgradeError::Network {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        info!("Got response from \"{url}\", extracting JSON");

        let body = response.text().await.map_err(|e| UpgradeError::Request {
            url: url.to_owned(),
            message: format!("failed to read body: {e}"),
        })?;

        parse_updates(&body)
    }

    /// Fetch both channels concurrently; the first failure aborts the other
    pub async fn fetch_both(
        &self,
        system_url: &str,
        vendor_url: &str,
    ) -> Result<(Vec<UpdateRecord>, Vec<UpdateRecord>)> {
        tokio::try_join!(self.fetch(system_url), self.fetch(vendor_url))
    }
}
