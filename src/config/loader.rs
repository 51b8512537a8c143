// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration loading and priority management.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::Config;
use crate::error::RunError;

const CONFIG_FILE_NAME: &str = "config.yaml";

impl Config {
    /// Load configuration from a file.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| format!("Failed to read configuration file at {}. Please check file permissions and ensure the file is accessible.", expanded_path.display()))?;

        serde_yaml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}. Please check the YAML syntax is valid.",
                expanded_path.display()
            )
        })
    }

    /// Load configuration with priority order:
    /// 1. Explicit --config path (must exist)
    /// 2. $XDG_CONFIG_HOME/sshsudo/config.yaml
    /// 3. Platform config directory (~/.config/sshsudo/config.yaml on Linux)
    /// 4. Built-in defaults
    pub async fn load_with_priority(explicit: Option<&Path>) -> Result<Self, RunError> {
        if let Some(path) = explicit {
            tracing::debug!("Using explicitly specified config file: {:?}", path);
            return Self::load(path).await.map_err(|source| RunError::Config {
                path: path.to_path_buf(),
                source,
            });
        }

        for candidate in standard_locations() {
            if !candidate.exists() {
                tracing::trace!("No config at {:?}", candidate);
                continue;
            }
            tracing::debug!("Found config at {:?}", candidate);
            return Self::load(&candidate)
                .await
                .map_err(|source| RunError::Config {
                    path: candidate,
                    source,
                });
        }

        tracing::debug!("No config file found, using default empty configuration");
        Ok(Self::default())
    }
}

/// Candidate config files in lookup order.
pub(crate) fn standard_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        locations.push(
            PathBuf::from(xdg_config_home)
                .join("sshsudo")
                .join(CONFIG_FILE_NAME),
        );
    }
    if let Some(proj_dirs) = ProjectDirs::from("", "", "sshsudo") {
        let path = proj_dirs.config_dir().join(CONFIG_FILE_NAME);
        if !locations.contains(&path) {
            locations.push(path);
        }
    }
    locations
}

/// Expand a leading `~/` to the home directory.
pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
