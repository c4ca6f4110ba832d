// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA transport backed by the `opcua` crate.
//!
//! The `opcua` client API is synchronous, so every service call runs on the
//! blocking pool via [`tokio::task::spawn_blocking`] and is awaited right
//! away. At most one call is in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! use uavar_opcua::client::{OpcUaTransport, RealOpcUaTransport};
//! use uavar_opcua::types::OpcUaConfig;
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()?;
//!
//! let mut transport = RealOpcUaTransport::new(config);
//! transport.connect().await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, trace};

use opcua::client::prelude::*;
use opcua::sync::RwLock as OpcUaRwLock;
use opcua::types::{DataValue, MessageSecurityMode, QualifiedName, UAString, Variant};

use crate::client::transport::{
    OpcUaTransport, OpcUaValue, ReadResult, SessionState, WriteResult, STATUS_BAD,
};
use crate::error::{ConnectionError, ConversionError, OpcUaError, OpcUaResult, OperationError};
use crate::types::{NodeId, OpcUaConfig, SecurityMode, UserTokenType};

type SharedSession = Arc<OpcUaRwLock<Session>>;

// =============================================================================
// RealOpcUaTransport
// =============================================================================

/// Transport that talks to a real server.
pub struct RealOpcUaTransport {
    config: OpcUaConfig,
    state: SessionState,
    session: Option<SharedSession>,
}

impl RealOpcUaTransport {
    /// Creates a new transport with the given configuration.
    pub fn new(config: OpcUaConfig) -> Self {
        Self {
            config,
            state: SessionState::Closed,
            session: None,
        }
    }

    fn build_client(config: &OpcUaConfig) -> OpcUaResult<Client> {
        let timeout_ms = u32::try_from(config.session_timeout.as_millis()).unwrap_or(u32::MAX);
        let mut builder = ClientBuilder::new()
            .application_name(&config.application_name)
            .application_uri(&config.effective_application_uri())
            .create_sample_keypair(config.uses_security())
            .trust_server_certs(config.trust_all_certificates)
            .session_retry_limit(0)
            .session_timeout(timeout_ms);
        if let Some(dir) = &config.pki_dir {
            builder = builder.pki_dir(dir);
        }

        builder.client().ok_or_else(|| {
            ConnectionError::invalid_endpoint(&config.endpoint, "client setup rejected").into()
        })
    }

    /// Discovers endpoints, picks the one matching mode and policy, and
    /// activates a session on it. Blocks.
    fn open_session(config: &OpcUaConfig) -> OpcUaResult<SharedSession> {
        let mut client = Self::build_client(config)?;

        let offered = client
            .get_server_endpoints_from_url(config.endpoint.as_str())
            .map_err(|status| {
                ConnectionError::endpoint_not_found(format!("{}: {status}", config.endpoint))
            })?;

        let policy_uri = config.security_policy.uri();
        let mode = match config.security_mode {
            SecurityMode::None => MessageSecurityMode::None,
            SecurityMode::Sign => MessageSecurityMode::Sign,
            SecurityMode::SignAndEncrypt => MessageSecurityMode::SignAndEncrypt,
        };
        let Some(endpoint) = offered
            .into_iter()
            .find(|e| e.security_mode == mode && e.security_policy_uri.as_ref() == policy_uri)
        else {
            return Err(ConnectionError::no_suitable_endpoint(format!(
                "{}/{}",
                config.security_policy, config.security_mode
            ))
            .into());
        };
        debug!(policy = %policy_uri, mode = %config.security_mode, "Endpoint selected");

        let identity = match &config.user_token {
            UserTokenType::Anonymous => IdentityToken::Anonymous,
            UserTokenType::UserName { username, password } => {
                IdentityToken::UserName(username.clone(), password.clone())
            }
        };
        client
            .connect_to_endpoint(endpoint, identity)
            .map_err(|status| ConnectionError::refused(&config.endpoint, status.to_string()).into())
    }

    fn session(&self) -> OpcUaResult<SharedSession> {
        self.session.clone().ok_or_else(OpcUaError::not_connected)
    }

    fn to_opcua_node_id(node_id: &NodeId) -> opcua::types::NodeId {
        opcua::types::NodeId::new(
            node_id.namespace_index,
            UAString::from(node_id.identifier.as_str()),
        )
    }

    /// Converts an `opcua` variant to a transport value.
    fn from_opcua_variant(variant: &Variant) -> OpcUaValue {
        match variant {
            Variant::Empty => OpcUaValue::Null,
            Variant::Boolean(v) => OpcUaValue::Boolean(*v),
            Variant::SByte(v) => OpcUaValue::SByte(*v),
            Variant::Byte(v) => OpcUaValue::Byte(*v),
            Variant::Int16(v) => OpcUaValue::Int16(*v),
            Variant::UInt16(v) => OpcUaValue::UInt16(*v),
            Variant::Int32(v) => OpcUaValue::Int32(*v),
            Variant::UInt32(v) => OpcUaValue::UInt32(*v),
            Variant::Int64(v) => OpcUaValue::Int64(*v),
            Variant::UInt64(v) => OpcUaValue::UInt64(*v),
            Variant::Float(v) => OpcUaValue::Float(*v),
            Variant::Double(v) => OpcUaValue::Double(*v),
            Variant::String(v) => OpcUaValue::String(v.as_ref().as_bytes().to_vec()),
            Variant::Array(arr) => OpcUaValue::Array {
                element_type: format!("{:?}", arr.value_type),
                values: arr.values.iter().map(Self::from_opcua_variant).collect(),
            },
            other => OpcUaValue::Unsupported(format!("{:?}", other.type_id())),
        }
    }

    /// Converts a scalar transport value to an `opcua` variant.
    fn to_opcua_variant(value: &OpcUaValue) -> OpcUaResult<Variant> {
        let variant = match value {
            OpcUaValue::Null => Variant::Empty,
            OpcUaValue::Boolean(v) => Variant::Boolean(*v),
            OpcUaValue::SByte(v) => Variant::SByte(*v),
            OpcUaValue::Byte(v) => Variant::Byte(*v),
            OpcUaValue::Int16(v) => Variant::Int16(*v),
            OpcUaValue::UInt16(v) => Variant::UInt16(*v),
            OpcUaValue::Int32(v) => Variant::Int32(*v),
            OpcUaValue::UInt32(v) => Variant::UInt32(*v),
            OpcUaValue::Int64(v) => Variant::Int64(*v),
            OpcUaValue::UInt64(v) => Variant::UInt64(*v),
            OpcUaValue::Float(v) => Variant::Float(*v),
            OpcUaValue::Double(v) => Variant::Double(*v),
            OpcUaValue::String(v) => {
                Variant::String(UAString::from(String::from_utf8_lossy(v).into_owned()))
            }
            other @ (OpcUaValue::Array { .. } | OpcUaValue::Unsupported(_)) => {
                return Err(OpcUaError::conversion(
                    ConversionError::type_mismatch("scalar", other.type_name()),
                ));
            }
        };
        Ok(variant)
    }

    fn join_error(e: tokio::task::JoinError) -> OpcUaError {
        OpcUaError::connection(ConnectionError::closed(Some(e.to_string())))
    }
}

#[async_trait]
impl OpcUaTransport for RealOpcUaTransport {
    async fn connect(&mut self) -> OpcUaResult<()> {
        self.config.validate().map_err(|e| {
            OpcUaError::connection(ConnectionError::invalid_endpoint(
                &self.config.endpoint,
                e.to_string(),
            ))
        })?;

        self.state = SessionState::Opening;
        info!(endpoint = %self.config.endpoint, "Connecting to OPC UA server");

        let config = self.config.clone();
        let opened = tokio::task::spawn_blocking(move || Self::open_session(&config))
            .await
            .map_err(Self::join_error)
            .and_then(|result| result);

        match opened {
            Ok(session) => {
                self.session = Some(session);
                self.state = SessionState::Open;
                info!(endpoint = %self.config.endpoint, "Connected to OPC UA server");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Lost;
                Err(e)
            }
        }
    }

    async fn disconnect(&mut self) -> OpcUaResult<()> {
        let Some(session) = self.session.take() else {
            self.state = SessionState::Closed;
            return Ok(());
        };

        debug!(endpoint = %self.config.endpoint, "Disconnecting from OPC UA server");
        tokio::task::spawn_blocking(move || session.read().disconnect())
            .await
            .map_err(Self::join_error)?;

        self.state = SessionState::Closed;
        info!(endpoint = %self.config.endpoint, "Disconnected from OPC UA server");
        Ok(())
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult> {
        let session = self.session()?;
        let read_value_id = ReadValueId {
            node_id: Self::to_opcua_node_id(node_id),
            attribute_id: AttributeId::Value as u32,
            index_range: UAString::null(),
            data_encoding: QualifiedName::null(),
        };

        trace!(node_id = %node_id, "Reading node value");

        let results = tokio::task::spawn_blocking(move || {
            session
                .read()
                .read(&[read_value_id], TimestampsToReturn::Neither, 0.0)
        })
        .await
        .map_err(Self::join_error)?
        .map_err(|status| OpcUaError::read_failed(node_id.to_string(), status.to_string()))?;

        let Some(data_value) = results.first() else {
            return Ok(ReadResult::bad(node_id.clone(), STATUS_BAD));
        };

        let status_code = data_value.status.as_ref().map(|s| s.bits()).unwrap_or(0);

        let mut result = ReadResult::bad(node_id.clone(), status_code);
        result.value = data_value.value.as_ref().map(Self::from_opcua_variant);
        Ok(result)
    }

    async fn write_value(&self, node_id: &NodeId, value: OpcUaValue) -> OpcUaResult<WriteResult> {
        let session = self.session()?;
        let write_value = WriteValue {
            node_id: Self::to_opcua_node_id(node_id),
            attribute_id: AttributeId::Value as u32,
            index_range: UAString::null(),
            value: DataValue::value_only(Self::to_opcua_variant(&value)?),
        };

        trace!(node_id = %node_id, "Writing node value");

        let results = tokio::task::spawn_blocking(move || session.read().write(&[write_value]))
            .await
            .map_err(Self::join_error)?
            .map_err(|status| {
                OpcUaError::operation(OperationError::write_failed(
                    node_id.to_string(),
                    status.to_string(),
                ))
            })?;

        match results.first() {
            Some(status) if status.is_good() => Ok(WriteResult::accepted(node_id.clone())),
            Some(status) => Ok(WriteResult::rejected(node_id.clone(), status.bits())),
            None => Ok(WriteResult::rejected(node_id.clone(), STATUS_BAD)),
        }
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

// =============================================================================
// Tests
// =============================================================================
