// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node addressing, value kinds and client configuration.
//!
//! - **NodeId**: namespace index plus string identifier
//! - **ValueKind**: the scalar types a node can be read or written as
//! - **SecurityMode/Policy**: security configuration types
//! - **OpcUaConfig**: client connection configuration with builder
//!
//! # Examples
//!
//! ```
//! use uavar_opcua::types::{NodeId, OpcUaConfig, TokenSet, ValueKind};
//!
//! let node_id = NodeId::new(1, "the.answer");
//! assert_eq!(node_id.to_string(), "ns=1;s=the.answer");
//!
//! let kind = ValueKind::from_token("INT32", TokenSet::Full).unwrap();
//! assert_eq!(kind.name(), "Int32");
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()
//!     .unwrap();
//! assert!(!config.uses_security());
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigurationError, OpcUaError};

// =============================================================================
// NodeId
// =============================================================================

/// Address of a single node: namespace index and string identifier.
///
/// Only string identifiers are used; the identifier is taken verbatim from
/// the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Namespace index.
    pub namespace_index: u16,

    /// The string identifier.
    pub identifier: String,
}

impl NodeId {
    /// Creates a string node ID.
    #[inline]
    pub fn new(namespace_index: u16, identifier: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: identifier.into(),
        }
    }

    /// Creates a node ID from a namespace operand and an identifier.
    ///
    /// The namespace text must be a non-negative decimal that fits the
    /// OPC UA namespace range.
    ///
    /// ```
    /// use uavar_opcua::types::NodeId;
    ///
    /// assert!(NodeId::from_operands("2", "Temp").is_ok());
    /// assert!(NodeId::from_operands("-1", "Temp").is_err());
    /// assert!(NodeId::from_operands("70000", "Temp").is_err());
    /// ```
    pub fn from_operands(namespace: &str, identifier: &str) -> Result<Self, OpcUaError> {
        Ok(Self::new(parse_namespace_index(namespace)?, identifier))
    }

}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};s={}", self.namespace_index, self.identifier)
    }
}

/// Parses a namespace index operand.
///
/// Decimal with optional leading whitespace and an optional `+`, the same
/// shape a write literal may take. Signs other than `+` and trailing text
/// are rejected.
pub fn parse_namespace_index(text: &str) -> Result<u16, OpcUaError> {
    let trimmed = text.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OpcUaError::configuration(
            ConfigurationError::invalid_namespace(text),
        ));
    }
    digits
        .parse::<u16>()
        .map_err(|_| OpcUaError::configuration(ConfigurationError::invalid_namespace(text)))
}

// =============================================================================
// TokenSet
// =============================================================================

/// Which type tokens a program accepts on its command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenSet {
    /// Read-only tool: no `SBYTE`/`BYTE`.
    Legacy,
    /// Read/write tool: all twelve tokens.
    #[default]
    Full,
}

impl TokenSet {
    /// Returns `true` if `kind` can be selected with this token set.
    pub const fn accepts(&self, kind: ValueKind) -> bool {
        match self {
            Self::Full => true,
            Self::Legacy => !matches!(kind, ValueKind::SByte | ValueKind::Byte),
        }
    }
}

// =============================================================================
// ValueKind
// =============================================================================

/// Scalar kind selected for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Boolean.
    Boolean,
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Byte string.
    String,
}

impl ValueKind {
    /// Every kind, in command-line token order.
    pub const ALL: [ValueKind; 12] = [
        Self::Boolean,
        Self::SByte,
        Self::Byte,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float,
        Self::Double,
        Self::String,
    ];

    /// Resolves a case-sensitive command-line token.
    pub fn from_token(token: &str, set: TokenSet) -> Result<Self, OpcUaError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token() == token && set.accepts(*kind))
            .ok_or_else(|| {
                OpcUaError::configuration(ConfigurationError::invalid_data_type(token))
            })
    }

    /// Returns the command-line token.
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOL",
            Self::SByte => "SBYTE",
            Self::Byte => "BYTE",
            Self::Int16 => "INT16",
            Self::UInt16 => "UINT16",
            Self::Int32 => "INT32",
            Self::UInt32 => "UINT32",
            Self::Int64 => "INT64",
            Self::UInt64 => "UINT64",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::String => "STRING",
        }
    }

    /// Returns the OPC UA built-in type name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
        }
    }

    /// Returns `true` for signed integer kinds.
    #[inline]
    pub const fn is_signed_integer(&self) -> bool {
        matches!(self, Self::SByte | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns `true` for floating-point kinds.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Security
// =============================================================================

/// Lowercases and drops separators so `SignAndEncrypt`, `sign-and-encrypt`
/// and `sign_and_encrypt` compare equal.
fn fold(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// OPC UA message security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// No signing, no encryption.
    #[default]
    None,
    /// Signed messages.
    Sign,
    /// Signed and encrypted messages.
    SignAndEncrypt,
}

impl SecurityMode {
    const ALL: [Self; 3] = [Self::None, Self::Sign, Self::SignAndEncrypt];

    /// Returns `true` for [`SecurityMode::None`].
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// OPC UA name of the mode.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Sign => "Sign",
            Self::SignAndEncrypt => "SignAndEncrypt",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SecurityMode {
    type Err = OpcUaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold(s);
        Self::ALL
            .into_iter()
            .find(|mode| fold(mode.name()) == wanted)
            .ok_or_else(|| {
                OpcUaError::configuration(ConfigurationError::invalid_security_mode(s))
            })
    }
}

const POLICY_URI_PREFIX: &str = "http://opcfoundation.org/UA/SecurityPolicy#";

/// OPC UA security policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicy {
    /// Only valid together with [`SecurityMode::None`].
    #[default]
    None,
    /// Deprecated.
    Basic128Rsa15,
    /// Deprecated.
    Basic256,
    /// Basic256Sha256.
    Basic256Sha256,
    /// Aes128-Sha256-RsaOaep.
    Aes128Sha256RsaOaep,
    /// Aes256-Sha256-RsaPss.
    Aes256Sha256RsaPss,
}

impl SecurityPolicy {
    const ALL: [Self; 6] = [
        Self::None,
        Self::Basic128Rsa15,
        Self::Basic256,
        Self::Basic256Sha256,
        Self::Aes128Sha256RsaOaep,
        Self::Aes256Sha256RsaPss,
    ];

    /// Policy name as it appears after `#` in the policy URI.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Basic128Rsa15 => "Basic128Rsa15",
            Self::Basic256 => "Basic256",
            Self::Basic256Sha256 => "Basic256Sha256",
            Self::Aes128Sha256RsaOaep => "Aes128_Sha256_RsaOaep",
            Self::Aes256Sha256RsaPss => "Aes256_Sha256_RsaPss",
        }
    }

    /// Full policy URI.
    pub fn uri(&self) -> String {
        format!("{}{}", POLICY_URI_PREFIX, self.name())
    }
}

impl fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SecurityPolicy {
    type Err = OpcUaError;

    /// Accepts the policy URI or its name, ignoring case and separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold(s.strip_prefix(POLICY_URI_PREFIX).unwrap_or(s));
        Self::ALL
            .into_iter()
            .find(|policy| fold(policy.name()) == wanted)
            .ok_or_else(|| {
                OpcUaError::configuration(ConfigurationError::invalid_security_policy(s))
            })
    }
}

/// Identity presented when activating the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserTokenType {
    /// No identity.
    #[default]
    Anonymous,
    /// User name and password.
    UserName {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
}

impl UserTokenType {
    /// Returns `true` for anonymous sessions.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        *self == Self::Anonymous
    }
}

// =============================================================================
// OpcUaConfig
// =============================================================================

/// Session parameters for one invocation.
///
/// ```
/// use uavar_opcua::types::{OpcUaConfig, SecurityMode, SecurityPolicy};
///
/// let config = OpcUaConfig::builder()
///     .endpoint("opc.tcp://secure-server:4840")
///     .security_mode(SecurityMode::SignAndEncrypt)
///     .security_policy(SecurityPolicy::Basic256Sha256)
///     .username("operator", "secret")
///     .build()
///     .unwrap();
/// assert!(config.uses_security());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpcUaConfig {
    /// Server URL, `opc.tcp://host:port[/path]`.
    pub endpoint: String,
    /// Message security mode.
    pub security_mode: SecurityMode,
    /// Security policy; must be `None` exactly when the mode is `None`.
    pub security_policy: SecurityPolicy,
    /// Session identity.
    pub user_token: UserTokenType,
    /// Client application name.
    pub application_name: String,
    /// Client application URI; derived from the name when absent.
    pub application_uri: Option<String>,
    /// Requested session timeout.
    #[serde(with = "humantime_serde")]
    pub session_timeout: Duration,
    /// Certificate store directory.
    pub pki_dir: Option<String>,
    /// Accept any server certificate.
    pub trust_all_certificates: bool,
}

impl Default for OpcUaConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            security_mode: SecurityMode::None,
            security_policy: SecurityPolicy::None,
            user_token: UserTokenType::Anonymous,
            application_name: "uavar OPC UA Client".to_string(),
            application_uri: None,
            session_timeout: Duration::from_secs(60),
            pki_dir: None,
            trust_all_certificates: false,
        }
    }
}

impl OpcUaConfig {
    /// Defaults for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Starts a builder.
    pub fn builder() -> OpcUaConfigBuilder {
        OpcUaConfigBuilder::default()
    }

    /// Checks the endpoint scheme, mode/policy pairing, user name and timeout.
    pub fn validate(&self) -> Result<(), OpcUaError> {
        let fail = |e: ConfigurationError| -> Result<(), OpcUaError> {
            Err(OpcUaError::configuration(e))
        };

        if self.endpoint.is_empty() {
            return fail(ConfigurationError::missing_field("endpoint"));
        }
        if !self.endpoint.starts_with("opc.tcp://") {
            return fail(ConfigurationError::invalid_endpoint(
                &self.endpoint,
                "scheme must be opc.tcp",
            ));
        }
        match (self.security_mode.is_none(), self.security_policy == SecurityPolicy::None) {
            (true, false) => {
                return fail(ConfigurationError::invalid_security(format!(
                    "policy {} needs a signing mode",
                    self.security_policy
                )));
            }
            (false, true) => {
                return fail(ConfigurationError::invalid_security(format!(
                    "mode {} needs a policy",
                    self.security_mode
                )));
            }
            _ => {}
        }
        if matches!(&self.user_token, UserTokenType::UserName { username, .. } if username.is_empty())
        {
            return fail(ConfigurationError::missing_field("username"));
        }
        if self.session_timeout.is_zero() {
            return fail(ConfigurationError::invalid_timeout(
                self.session_timeout,
                "must be non-zero",
            ));
        }
        Ok(())
    }

    /// Application URI sent to the server.
    pub fn effective_application_uri(&self) -> String {
        match &self.application_uri {
            Some(uri) => uri.clone(),
            None => format!("urn:uavar:{}", self.application_name.replace(' ', "")),
        }
    }

    /// Returns `true` unless the mode is `None`.
    #[inline]
    pub fn uses_security(&self) -> bool {
        !self.security_mode.is_none()
    }
}

/// Builder for [`OpcUaConfig`]; `build` validates.
#[derive(Debug, Default)]
pub struct OpcUaConfigBuilder {
    config: OpcUaConfig,
}

impl OpcUaConfigBuilder {
    /// Server URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Message security mode.
    pub fn security_mode(mut self, mode: SecurityMode) -> Self {
        self.config.security_mode = mode;
        self
    }

    /// Security policy.
    pub fn security_policy(mut self, policy: SecurityPolicy) -> Self {
        self.config.security_policy = policy;
        self
    }

    /// User name and password identity.
    pub fn username(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.user_token = UserTokenType::UserName {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Client application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = name.into();
        self
    }

    /// Session timeout.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.config.session_timeout = timeout;
        self
    }

    /// Certificate store directory.
    pub fn pki_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.pki_dir = Some(dir.into());
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<OpcUaConfig, OpcUaError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// =============================================================================
// Tests
// =============================================================================
