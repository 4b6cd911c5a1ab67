//! # Request Context
//!
//! The caller identity and device class for one request, resolved once at
//! the transport boundary and passed explicitly into every scoping and
//! pagination call.
//!
//! There is deliberately no process-global "current request" here: hidden
//! request state couples layers and makes scoping untestable. Everything
//! downstream receives a `&RequestContext` parameter.

use serde::{Deserialize, Serialize};

use crate::device::{DeviceClass, DeviceDetectConfig};

// =============================================================================
// Identity
// =============================================================================

/// The caller identity, resolved by an external authentication collaborator.
///
/// Opaque to this workspace: a user id string or nothing. An anonymous
/// identity scopes to the empty accessible set (empty results, not errors).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// No authenticated caller.
    Anonymous,
    /// An authenticated user id.
    User(String),
}

impl Default for Identity {
    fn default() -> Self {
        Identity::Anonymous
    }
}

impl Identity {
    /// Convenience constructor from a user id.
    pub fn user(id: impl Into<String>) -> Self {
        Identity::User(id.into())
    }

    /// The user id, if authenticated.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(id.as_str()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

// =============================================================================
// Request Context
// =============================================================================

/// Per-request context: identity + device class.
///
/// Built fresh for every request; never cached across requests.
///
/// ## Example
/// ```rust
/// use duka_core::context::{Identity, RequestContext};
/// use duka_core::device::{DeviceClass, DeviceDetectConfig};
///
/// let detect = DeviceDetectConfig::default();
/// let ctx = RequestContext::from_header(
///     Identity::user("user-1"),
///     Some("Mozilla/5.0 (iPhone)"),
///     &detect,
/// );
/// assert_eq!(ctx.device, DeviceClass::Mobile);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub identity: Identity,
    pub device: DeviceClass,
}

impl RequestContext {
    /// Creates a context with an already-classified device.
    pub fn new(identity: Identity, device: DeviceClass) -> Self {
        RequestContext { identity, device }
    }

    /// Creates a context by classifying the raw header value.
    pub fn from_header(
        identity: Identity,
        header_value: Option<&str>,
        detect: &DeviceDetectConfig,
    ) -> Self {
        RequestContext {
            identity,
            device: detect.classify(header_value),
        }
    }

    /// An anonymous web context (useful in tests and internal jobs).
    pub fn anonymous() -> Self {
        RequestContext {
            identity: Identity::Anonymous,
            device: DeviceClass::Web,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
