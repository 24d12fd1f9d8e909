//! Security audit logging for authentication events
//!
//! Registrations, logins and rejected bearer tokens are logged at INFO level
//! with the "audit" target so they can be filtered and routed separately
//! from application logs.
//!
//! Events carry usernames and client metadata only. Passwords, hashes and
//! tokens never appear in an audit record.
//!
//! ```ignore
//! use rolodex_api::audit::{audit_log, AuditEvent, ClientInfo};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     username: "alice".to_string(),
//!     client: ClientInfo::from_headers(request.headers()),
//! });
//! ```

use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where a request came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Security audit events for authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful user registration
    RegistrationSuccess {
        username: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    /// Failed registration attempt
    RegistrationFailure {
        username: String,
        reason: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    /// Successful login, token issued
    LoginSuccess {
        username: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    /// Failed login attempt
    ///
    /// `reason` keeps the internal distinction between unknown user and
    /// wrong password, which the HTTP response does not.
    LoginFailure {
        username: String,
        reason: String,
        #[serde(flatten)]
        client: ClientInfo,
    },

    /// Bearer token rejected
    InvalidToken {
        reason: String,
        #[serde(flatten)]
        client: ClientInfo,
    },
}

/// Log a security audit event with structured fields
///
/// The event is also serialized to JSON in the `event` field for log
/// aggregators.
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::RegistrationSuccess { username, client } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                ip_address = ?client.ip_address,
                "Registration successful"
            );
        }
        AuditEvent::RegistrationFailure {
            username,
            reason,
            client,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?client.ip_address,
                "Registration failed"
            );
        }
        AuditEvent::LoginSuccess { username, client } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                ip_address = ?client.ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            username,
            reason,
            client,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?client.ip_address,
                "Login failed"
            );
        }
        AuditEvent::InvalidToken { reason, client } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                reason = %reason,
                ip_address = ?client.ip_address,
                "Invalid token"
            );
        }
    }
}

/// Extract the client IP from proxy headers
///
/// Checks X-Forwarded-For, then X-Real-IP.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            // First IP in the chain is the client
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

/// Extract user agent from request headers
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginSuccess {
            username: "alice".to_string(),
            client: ClientInfo {
                ip_address: Some("192.168.1.1".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
            },
        };

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "login_success");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["ip_address"], "192.168.1.1");
    }

    #[test]
    fn test_audit_log_does_not_panic() {
        audit_log(&AuditEvent::LoginFailure {
            username: "alice".to_string(),
            reason: "incorrect_password".to_string(),
            client: ClientInfo::default(),
        });
        audit_log(&AuditEvent::RegistrationFailure {
            username: "alice".to_string(),
            reason: "duplicate_username".to_string(),
            client: ClientInfo::default(),
        });
        audit_log(&AuditEvent::InvalidToken {
            reason: "expired".to_string(),
            client: ClientInfo::default(),
        });
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        assert_eq!(
            extract_ip_address(&headers),
            Some("203.0.113.1".to_string())
        );
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        assert_eq!(
            extract_ip_address(&headers),
            Some("203.0.113.1".to_string())
        );
    }

    #[test]
    fn test_client_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::USER_AGENT,
            "Mozilla/5.0 (Test)".parse().unwrap(),
        );

        let client = ClientInfo::from_headers(&headers);
        assert_eq!(client.ip_address, None);
        assert_eq!(client.user_agent, Some("Mozilla/5.0 (Test)".to_string()));
    }
}
