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

//! Timestamp comparison between installed and published images

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Image {
    System,
    Vendor,
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("System"),
            Self::Vendor => f.write_str("Vendor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCheck {
    pub image: Image,
    pub local: i64,
    pub remote: i64,
}

impl ImageCheck {
    pub fn new(image: Image, local: i64, remote: i64) -> Self {
        Self {
            image,
            local,
            remote,
        }
    }

    /// Strictly newer only; an equal timestamp is the installed build
    pub fn upgrade_available(&self) -> bool {
        self.remote > self.local
    }
}

pub fn count_upgrades(checks: &[ImageCheck]) -> u8 {
    let stale = checks.iter().filter(|c| c.upgrade_available()).count();
    u8::try_from(stale).unwrap_or(u8::MAX)
}

/// Number of images (0..=2) with a newer published build
pub fn decide(local_system: i64, remote_system: i64, local_vendor: i64, remote_vendor: i64) -> u8 {
    count_upgrades(&[
        ImageCheck::new(Image::System, local_system, remote_system),
        ImageCheck::new(Image::Vendor, local_vendor, remote_vendor),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_counts_each_image() {
        assert_eq!(decide(100, 100, 200, 200), 0);
        assert_eq!(decide(100, 150, 200, 200), 1);
        assert_eq!(decide(100, 100, 200, 250), 1);
        assert_eq!(decide(100, 150, 200, 250), 2);
    }

    #[test]
    fn test_older_remote_is_up_to_date() {
        assert_eq!(decide(150, 100, 250, 200), 0);
        assert_eq!(decide(150, 100, 200, 201), 1);
    }

    #[test]
    fn test_strict_comparison_on_boundaries() {
        assert!(!ImageCheck::new(Image::System, 0, 0).upgrade_available());
        assert!(ImageCheck::new(Image::System, 0, 1).upgrade_available());
        assert!(!ImageCheck::new(Image::Vendor, i64::MAX, i64::MAX).upgrade_available());
        assert!(ImageCheck::new(Image::Vendor, i64::MIN, i64::MAX).upgrade_available());
    }

    #[test]
    fn test_count_upgrades_empty() {
        assert_eq!(count_upgrades(&[]), 0);
    }

    #[test]
    fn test_image_display() {
        assert_eq!(Image::System.to_string(), "System");
        assert_eq!(Image::Vendor.to_string(), "Vendor");
    }
}
