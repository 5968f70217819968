// midodebug - troubleshooting CLI for MidoNet virtual topologies
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_API_PORT: u16 = 8080;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Full API root; takes precedence over host/port when set.
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_id: Option<String>,
    /// Default instance inventory used by `router-for-instance`.
    pub inventory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error("MidoNet API host is required; set it with `midodebug configure --host <host>`")]
    MissingHost,
    #[error("no instance inventory given; pass --inventory <FILE> or store one with `configure`")]
    MissingInventory,
}

/// Connection settings after merging both scopes and command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_id: Option<String>,
    pub inventory: Option<PathBuf>,
}

impl EffectiveConfig {
    pub fn inventory(&self) -> Result<&Path, ConfigError> {
        self.inventory
            .as_deref()
            .ok_or(ConfigError::MissingInventory)
    }
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".midodebug.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("MIDODEBUG_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("midodebug").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    Ok(read_if_exists(&config_path(scope, cwd)?)?.unwrap_or_default())
}

pub fn save(scope: Scope, config: &Config, cwd: &Path) -> Result<PathBuf> {
    let path = config_path(scope, cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

pub fn resolve(cwd: &Path, overrides: Config) -> Result<EffectiveConfig> {
    let merged = merge(load(cwd)?, overrides);

    let base_url = match (merged.base_url, merged.host) {
        (Some(url), _) => url,
        (None, Some(host)) => api_root(host.trim(), merged.port.unwrap_or(DEFAULT_API_PORT)),
        (None, None) => return Err(ConfigError::MissingHost.into()),
    };

    Ok(EffectiveConfig {
        base_url,
        username: merged.username,
        password: merged.password,
        tenant_id: merged.tenant_id,
        inventory: merged.inventory,
    })
}

pub fn api_root(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/midonet-api")
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

/// Fields set in `over` win over those in `base`.
pub fn merge(base: Config, over: Config) -> Config {
    Config {
        host: over.host.or(base.host),
        port: over.port.or(base.port),
        base_url: over.base_url.or(base.base_url),
        username: over.username.or(base.username),
        password: over.password.or(base.password),
        tenant_id: over.tenant_id.or(base.tenant_id),
        inventory: over.inventory.or(base.inventory),
    }
}
