// SPDX-License-Identifier: GPL-3.0-only

//! Navigation to the system privacy settings

use crate::config::{Config, SettingsCommand};
use crate::errors::{AppError, AppResult};
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

/// Opens the platform settings screen where camera access can be granted
pub trait SettingsNavigator: Send + Sync {
    fn open_settings(&self) -> AppResult<()>;
}

/// Launches the desktop's settings application
#[derive(Debug, Clone)]
pub struct DesktopSettings {
    uri: Option<String>,
    commands: Vec<SettingsCommand>,
}

impl DesktopSettings {
    pub fn new(uri: Option<String>, commands: Vec<SettingsCommand>) -> Self {
        Self { uri, commands }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.settings_uri.clone(), config.settings_commands.clone())
    }
}

impl SettingsNavigator for DesktopSettings {
    fn open_settings(&self) -> AppResult<()> {
        if let Some(uri) = &self.uri {
            info!(uri = %uri, "Opening settings URI");
            return open::that_detached(uri).map_err(|e| {
                error!(uri = %uri, error = %e, "Failed to open settings URI");
                AppError::Settings(e.to_string())
            });
        }

        for command in &self.commands {
            match Command::new(&command.program)
                .args(&command.args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(_) => {
                    info!(program = %command.program, "Launched settings application");
                    return Ok(());
                }
                Err(e) => {
                    debug!(program = %command.program, error = %e, "Settings application not available");
                }
            }
        }

        Err(AppError::Settings(
            "no settings application could be launched".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_candidates_is_an_error() {
        let settings = DesktopSettings::new(
            None,
            vec![SettingsCommand::new("definitely-not-a-settings-app-9f3c", "")],
        );
        assert!(matches!(
            settings.open_settings(),
            Err(AppError::Settings(_))
        ));
    }
}
