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

//! Applies pending upgrades by running `sudo waydroid upgrade`

use crate::error::Result;
use std::fmt;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info};

/// Grace period for an operator watching the log to cancel
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

const EXIT_NOT_FOUND: i32 = 127;
const EXIT_NOT_EXECUTABLE: i32 = 126;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCommand {
    program: String,
    args: Vec<String>,
}

impl UpgradeCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for UpgradeCommand {
    fn default() -> Self {
        Self::new("sudo", ["waydroid", "upgrade"])
    }
}

impl fmt::Display for UpgradeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UpgradeInvoker {
    suppressed: bool,
    delay: Duration,
    command: UpgradeCommand,
}

impl UpgradeInvoker {
    /// `suppressed` reports pending upgrades instead of applying them
    pub fn new(suppressed: bool) -> Self {
        Self {
            suppressed,
            delay: DEFAULT_DELAY,
            command: UpgradeCommand::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_command(mut self, command: UpgradeCommand) -> Self {
        self.command = command;
        self
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Returns the process exit code for `count` pending upgrades
    pub async fn invoke(&self, count: u8) -> Result<i32> {
        if count == 0 {
            return Ok(0);
        }

        if self.suppressed {
            info!("{count} upgrades available.");
            return Ok(i32::from(count));
        }

        info!(
            "Upgrades will be applied in {} seconds.",
            self.delay.as_secs_f32()
        );
        tokio::time::sleep(self.delay).await;

        info!("Running \"{}\"", self.command);
        let status = Command::new(&self.command.program)
            .args(&self.command.args)
            .status()
            .await;

        match status {
            Ok(status) => {
                let code = exit_code(status);
                info!("\"{}\" exited with {code}", self.command);
                Ok(code)
            }
            Err(e) => {
                error!("Failed to run \"{}\": {e}", self.command);
                Ok(spawn_failure_code(&e))
            }
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

fn spawn_failure_code(err: &io::Error) -> i32 {
    if err.kind() == io::ErrorKind::NotFound {
        EXIT_NOT_FOUND
    } else {
        EXIT_NOT_EXECUTABLE
    }
}
