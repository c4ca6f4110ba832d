// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Optional TOML configuration file.
//!
//! ```toml
//! [connection]
//! application_name = "plant getvar"
//! security_mode = "sign_and_encrypt"
//! security_policy = "basic256_sha256"
//! username = "operator"
//! password = "secret"
//! pki_dir = "pki"
//! trust_all_certificates = false
//! session_timeout = "30s"
//!
//! [output]
//! file = "/var/lib/silos/getvar.out"
//! ```
//!
//! Precedence: command-line option or environment variable, then this file,
//! then built-in defaults. Relative paths are resolved against the directory
//! holding the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use uavar_opcua::{OpcUaConfig, SecurityMode, SecurityPolicy, UserTokenType};

use crate::error::{BinError, BinResult};

/// Output file used when neither the command line nor the config file names one.
pub const DEFAULT_OUTPUT_FILE: &str = "getvar.out";

// =============================================================================
// Settings
// =============================================================================

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Session parameters.
    pub connection: ConnectionSection,
    /// `getvar` output file.
    pub output: OutputSection,
}

/// `[connection]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSection {
    /// Client application name.
    pub application_name: Option<String>,
    /// Client application URI.
    pub application_uri: Option<String>,
    /// Message security mode.
    pub security_mode: Option<SecurityMode>,
    /// Security policy.
    pub security_policy: Option<SecurityPolicy>,
    /// User name; anonymous when absent.
    pub username: Option<String>,
    /// Password for `username`.
    pub password: Option<String>,
    /// Certificate store directory.
    pub pki_dir: Option<PathBuf>,
    /// Accept any server certificate.
    pub trust_all_certificates: bool,
    /// Requested session timeout.
    #[serde(with = "humantime_serde")]
    pub session_timeout: Option<Duration>,
}

/// `[output]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Path of the `getvar` value file.
    pub file: Option<PathBuf>,
}

impl Settings {
    /// Loads the file at `path`, or returns defaults when there is none.
    pub fn load(path: Option<&Path>) -> BinResult<Self> {
        let Some(path) = path else {
            debug!("No configuration file, using defaults");
            return Ok(Self::default());
        };

        info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| BinError::config(format!("{}: {}", path.display(), e)))?;
        let mut settings = Self::parse(&content)
            .map_err(|e| BinError::config(format!("{}: {}", path.display(), e)))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        settings.resolve_relative_paths(base);
        Ok(settings)
    }

    /// Parses TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [&mut self.connection.pki_dir, &mut self.output.file]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Builds the client configuration for `endpoint`.
    ///
    /// The result is not validated here; the transport validates it on
    /// connect so that a bad endpoint surfaces as a connection failure.
    pub fn opcua_config(&self, endpoint: &str) -> OpcUaConfig {
        let section = &self.connection;
        let mut config = OpcUaConfig::new(endpoint);

        if let Some(mode) = section.security_mode {
            config.security_mode = mode;
        }
        if let Some(policy) = section.security_policy {
            config.security_policy = policy;
        }
        if let Some(username) = &section.username {
            config.user_token = UserTokenType::UserName {
                username: username.clone(),
                password: section.password.clone().unwrap_or_default(),
            };
        }
        if let Some(name) = &section.application_name {
            config.application_name = name.clone();
        }
        if let Some(uri) = &section.application_uri {
            config.application_uri = Some(uri.clone());
        }
        if let Some(timeout) = section.session_timeout {
            config.session_timeout = timeout;
        }
        if let Some(dir) = &section.pki_dir {
            config.pki_dir = Some(dir.display().to_string());
        }
        config.trust_all_certificates = section.trust_all_certificates;
        config
    }

    /// Picks the output file: command line/env, then file, then default.
    pub fn output_file(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.output.file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    }
}

// =============================================================================
// Tests
// =============================================================================
