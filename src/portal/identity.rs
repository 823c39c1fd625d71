//! Identity provider adapter (Firebase Identity Toolkit REST API).
//!
//! Credentials are exchanged for an ID token; the session probe re-checks
//! the account with `accounts:lookup` on every call so the verified flag is
//! always fresh, never cached.

use serde::{Deserialize, Serialize};

use crate::{
    infra::config::FirebaseConfig,
    portal::http::HttpRunner,
    usecases::{
        guided_auth::{AuthBackendError, PortalAuthClient, SignInOutcome},
        navigate::{IdentitySnapshot, IdentityUser, SessionProbe, SourceError},
    },
};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

pub struct FirebaseIdentityClient {
    runner: HttpRunner,
    base_url: String,
    api_key: String,
    id_token: Option<String>,
    uid: Option<String>,
}

impl FirebaseIdentityClient {
    pub fn new(config: &FirebaseConfig) -> Result<Self, AuthBackendError> {
        let runner = HttpRunner::new().map_err(|message| AuthBackendError::Transient {
            code: "AUTH_BACKEND_UNAVAILABLE",
            message,
        })?;

        Ok(Self {
            runner,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: config.api_key.clone(),
            id_token: None,
            uid: None,
        })
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Restores a token persisted by a previous run. The next probe
    /// re-validates it with the provider; a rejected token reads as
    /// signed-out, never as an error.
    pub fn restore_token(&mut self, id_token: String) {
        self.id_token = Some(id_token);
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.base_url, operation, self.api_key
        )
    }

    fn exchange_credentials(
        &mut self,
        operation: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthBackendError> {
        let url = self.endpoint(operation);
        let body = CredentialsRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response: CredentialsResponse = self.runner.block_on(async {
            let response = self
                .runner
                .client()
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(map_transport_error)?;

            if !response.status().is_success() {
                return Err(read_api_error(response).await);
            }

            response
                .json::<CredentialsResponse>()
                .await
                .map_err(map_transport_error)
        })?;

        self.uid = Some(response.local_id);
        self.id_token = Some(response.id_token);

        Ok(())
    }

    /// Fresh account read; errors keep the previous token untouched.
    fn lookup_account(&self) -> Result<Option<AccountRecord>, AuthBackendError> {
        let Some(id_token) = self.id_token.as_deref() else {
            return Ok(None);
        };

        let url = self.endpoint("lookup");
        let body = TokenRequest { id_token };

        let response: LookupResponse = self.runner.block_on(async {
            let response = self
                .runner
                .client()
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(map_transport_error)?;

            if !response.status().is_success() {
                return Err(read_api_error(response).await);
            }

            response
                .json::<LookupResponse>()
                .await
                .map_err(map_transport_error)
        })?;

        Ok(response.users.unwrap_or_default().into_iter().next())
    }
}

impl PortalAuthClient for FirebaseIdentityClient {
    fn sign_in(&mut self, email: &str, password: &str) -> Result<SignInOutcome, AuthBackendError> {
        self.exchange_credentials("signInWithPassword", email, password)?;

        match self.lookup_account()? {
            Some(account) if account.email_verified => Ok(SignInOutcome::Verified),
            _ => Ok(SignInOutcome::VerificationPending),
        }
    }

    fn sign_up(&mut self, email: &str, password: &str) -> Result<SignInOutcome, AuthBackendError> {
        self.exchange_credentials("signUp", email, password)?;

        // New accounts always start unverified.
        Ok(SignInOutcome::VerificationPending)
    }

    fn resend_verification(&mut self) -> Result<(), AuthBackendError> {
        let Some(id_token) = self.id_token.as_deref() else {
            return Err(AuthBackendError::Transient {
                code: "AUTH_NOT_SIGNED_IN",
                message: "verification email requires a signed-in account".to_owned(),
            });
        };

        let url = self.endpoint("sendOobCode");
        let body = SendOobCodeRequest {
            request_type: "VERIFY_EMAIL",
            id_token,
        };

        self.runner.block_on(async {
            let response = self
                .runner
                .client()
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(map_transport_error)?;

            if !response.status().is_success() {
                return Err(read_api_error(response).await);
            }

            Ok(())
        })
    }
}

impl SessionProbe for FirebaseIdentityClient {
    fn probe(&self) -> Result<IdentitySnapshot, SourceError> {
        if self.id_token.is_none() {
            return Ok(IdentitySnapshot::default());
        }

        match self.lookup_account() {
            Ok(Some(account)) => Ok(IdentitySnapshot {
                user: Some(IdentityUser {
                    uid: account.local_id,
                    email_verified: account.email_verified,
                }),
            }),
            // Token rejected or account gone: signed out, not an outage.
            Ok(None) | Err(AuthBackendError::InvalidCredentials) => {
                Ok(IdentitySnapshot::default())
            }
            Err(AuthBackendError::Timeout) => Err(SourceError::Timeout),
            Err(AuthBackendError::TooManyAttempts) => Err(SourceError::Denied),
            Err(_) => Err(SourceError::Unavailable),
        }
    }
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(rename = "returnSecureToken")]
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
struct CredentialsResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
struct SendOobCodeRequest<'a> {
    #[serde(rename = "requestType")]
    request_type: &'static str,
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct LookupResponse {
    users: Option<Vec<AccountRecord>>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "emailVerified", default)]
    email_verified: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn map_transport_error(error: reqwest::Error) -> AuthBackendError {
    if error.is_timeout() {
        AuthBackendError::Timeout
    } else {
        AuthBackendError::Transient {
            code: "AUTH_BACKEND_UNAVAILABLE",
            message: error.to_string(),
        }
    }
}

async fn read_api_error(response: reqwest::Response) -> AuthBackendError {
    match response.json::<ApiErrorBody>().await {
        Ok(body) => map_api_error(&body.error.message),
        Err(error) => AuthBackendError::Transient {
            code: "AUTH_BACKEND_UNAVAILABLE",
            message: error.to_string(),
        },
    }
}

/// Maps the provider's error message vocabulary onto flow errors. Messages
/// may carry a suffix after the code (`WEAK_PASSWORD : Password should...`).
fn map_api_error(message: &str) -> AuthBackendError {
    let code = message.split_whitespace().next().unwrap_or_default();

    match code {
        "EMAIL_NOT_FOUND" => AuthBackendError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_ID_TOKEN" => {
            AuthBackendError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthBackendError::EmailAlreadyInUse,
        "WEAK_PASSWORD" => AuthBackendError::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthBackendError::TooManyAttempts,
        _ => AuthBackendError::Transient {
            code: "AUTH_BACKEND_UNAVAILABLE",
            message: message.to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_provider_error_codes_to_flow_errors() {
        assert_eq!(
            map_api_error("EMAIL_NOT_FOUND"),
            AuthBackendError::UserNotFound
        );
        assert_eq!(
            map_api_error("INVALID_LOGIN_CREDENTIALS"),
            AuthBackendError::InvalidCredentials
        );
        assert_eq!(
            map_api_error("EMAIL_EXISTS"),
            AuthBackendError::EmailAlreadyInUse
        );
        assert_eq!(
            map_api_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthBackendError::WeakPassword
        );
        assert_eq!(
            map_api_error("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthBackendError::TooManyAttempts
        );
    }

    #[test]
    fn unknown_provider_messages_become_transient() {
        let error = map_api_error("OPERATION_NOT_ALLOWED");

        assert!(matches!(
            error,
            AuthBackendError::Transient {
                code: "AUTH_BACKEND_UNAVAILABLE",
                ..
            }
        ));
    }

    #[test]
    fn lookup_response_parses_verified_flag() {
        let body = r#"{"users":[{"localId":"uid-1","emailVerified":true}]}"#;
        let parsed: LookupResponse = serde_json::from_str(body).expect("lookup body parses");

        let account = parsed
            .users
            .expect("users present")
            .into_iter()
            .next()
            .expect("one account");
        assert_eq!(account.local_id, "uid-1");
        assert!(account.email_verified);
    }

    #[test]
    fn lookup_response_defaults_missing_verified_flag_to_false() {
        let body = r#"{"users":[{"localId":"uid-2"}]}"#;
        let parsed: LookupResponse = serde_json::from_str(body).expect("lookup body parses");

        assert!(!parsed.users.expect("users")[0].email_verified);
    }

    #[test]
    fn credentials_request_serializes_provider_field_names() {
        let body = CredentialsRequest {
            email: "team@cbit.ac.in",
            password: "s3cret99",
            return_secure_token: true,
        };

        let json = serde_json::to_value(&body).expect("request serializes");
        assert_eq!(json["email"], "team@cbit.ac.in");
        assert_eq!(json["returnSecureToken"], true);
    }
}
