//! Authentication service layer
//!
//! Composes the credential store and token service into the three flows the
//! HTTP layer needs: registration, login, and turning a bearer token back
//! into a user. Audit events are emitted here; error kinds are collapsed by
//! `AppError`.

use super::models::{AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse, UserInfo};
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::AppError;
use rolodex_auth::{CredentialError, CredentialStore, TokenService};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user
    ///
    /// * `Ok(UserInfo)` - Newly created user
    /// * `Err(AppError::BadRequest)` - Username taken or input rejected
    pub async fn register(
        &self,
        request: RegisterRequest,
        client: ClientInfo,
    ) -> Result<UserInfo, AppError> {
        match self
            .credentials
            .register_user(&request.username, &request.fullname, &request.password)
            .await
        {
            Ok(record) => {
                audit_log(&AuditEvent::RegistrationSuccess {
                    username: record.username.clone(),
                    client,
                });
                Ok(UserInfo::from(record))
            }
            Err(e) => {
                audit_log(&AuditEvent::RegistrationFailure {
                    username: request.username,
                    reason: failure_reason(&e).to_string(),
                    client,
                });
                Err(e.into())
            }
        }
    }

    /// Verify credentials and issue an access token
    ///
    /// Unknown usernames and wrong passwords both end in
    /// `AppError::InvalidCredentials`.
    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientInfo,
    ) -> Result<TokenResponse, AppError> {
        let user = match self
            .credentials
            .authenticate(&request.username, &request.password)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                audit_log(&AuditEvent::LoginFailure {
                    username: request.username,
                    reason: failure_reason(&e).to_string(),
                    client,
                });
                return Err(e.into());
            }
        };

        let issued = self.tokens.issue_access_token(&user.username)?;

        audit_log(&AuditEvent::LoginSuccess {
            username: user.username,
            client,
        });

        Ok(TokenResponse {
            access_token: issued.token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in(),
        })
    }

    /// Validate a bearer token and load the user it names
    ///
    /// Every failure, including a subject that no longer exists, is
    /// `AppError::Unauthorized`.
    pub async fn resolve_bearer(
        &self,
        token: &str,
        client: ClientInfo,
    ) -> Result<AuthenticatedUser, AppError> {
        let identity = match self.tokens.validate(token) {
            Ok(identity) => identity,
            Err(e) => {
                audit_log(&AuditEvent::InvalidToken {
                    reason: e.reason().to_string(),
                    client,
                });
                return Err(AppError::Unauthorized);
            }
        };

        match self
            .credentials
            .users()
            .find_by_username(&identity.username)
            .await?
        {
            Some(record) => Ok(AuthenticatedUser::from(record)),
            None => {
                audit_log(&AuditEvent::InvalidToken {
                    reason: "unknown_subject".to_string(),
                    client,
                });
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn failure_reason(err: &CredentialError) -> &'static str {
    match err {
        CredentialError::DuplicateUsername => "duplicate_username",
        CredentialError::UnknownUsername => "unknown_username",
        CredentialError::IncorrectPassword => "incorrect_password",
        CredentialError::InvalidInput(_) => "invalid_input",
        CredentialError::Hashing(_) => "hashing_failed",
        CredentialError::Storage(_) => "storage_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            fullname: "Test User".to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_login_resolve() {
        let state = AppState::for_testing();
        let auth = &state.auth;

        let info = auth
            .register(register_request("alice", "Secr3t!"), ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(info.username, "alice");

        let token = auth
            .login(login_request("alice", "Secr3t!"), ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 30 * 60);

        let user = auth
            .resolve_bearer(&token.access_token, ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.fullname, "Test User");
    }

    #[tokio::test]
    async fn test_login_failures_collapse() {
        let state = AppState::for_testing();
        let auth = &state.auth;
        auth.register(register_request("alice", "Secr3t!"), ClientInfo::default())
            .await
            .unwrap();

        let wrong = auth
            .login(login_request("alice", "wrong"), ClientInfo::default())
            .await;
        let unknown = auth
            .login(login_request("bob", "anything"), ClientInfo::default())
            .await;

        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_token_for_missing_user_is_rejected() {
        let state = AppState::for_testing();
        let token = state
            .auth
            .tokens()
            .issue_access_token("ghost")
            .unwrap()
            .token;

        let result = state
            .auth
            .resolve_bearer(&token, ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
