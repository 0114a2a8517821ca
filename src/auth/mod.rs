//! SOCKS5 authentication
//!
//! Three interchangeable negotiators (no-auth, GSSAPI, username/password)
//! behind a closed strategy enum, and the dispatcher that intersects the
//! client's offered method list with the configured server preference.
//!
//! Each strategy writes its own method-selection reply before running its
//! sub-negotiation, and hands back an [`AuthOutcome`] on every branch so the
//! session always regains the stream and can close it.

mod gssapi;
mod none;
mod userpass;

pub use gssapi::GssapiAuth;
pub use none::NoAuth;
pub use userpass::UserPassAuth;

use crate::config::{AuthConfig, MethodPreference};
use crate::socks::consts::*;
use crate::socks::wire;
use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Result of a method negotiation and sub-negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Whether the client may proceed to the request phase
    pub accepted: bool,
    /// The method that was negotiated (`0xFF` when none was acceptable)
    pub method: u8,
    /// Human-readable failure detail for the audit log, empty on success
    pub diagnostic: String,
}

impl AuthOutcome {
    fn accepted(method: u8) -> Self {
        Self {
            accepted: true,
            method,
            diagnostic: String::new(),
        }
    }

    fn rejected(method: u8, diagnostic: impl Into<String>) -> Self {
        Self {
            accepted: false,
            method,
            diagnostic: diagnostic.into(),
        }
    }
}

/// The closed set of authentication strategies.
///
/// The "method" concept lives entirely in this module; the session only sees
/// the outcome.
enum AuthStrategy {
    None(NoAuth),
    Gssapi(GssapiAuth),
    UserPass(UserPassAuth),
}

impl AuthStrategy {
    /// Map an offered method byte to a strategy, honoring the configured
    /// preference. `Any` admits all three known methods; a concrete
    /// preference admits only itself. Username/password additionally
    /// requires configured credentials.
    fn select(method: u8, config: &AuthConfig) -> Option<Self> {
        let admissible = match config.preference {
            MethodPreference::Any => {
                matches!(method, AUTH_METHOD_NONE | AUTH_METHOD_GSSAPI | AUTH_METHOD_PASSWORD)
            }
            MethodPreference::NoAuth => method == AUTH_METHOD_NONE,
            MethodPreference::Gssapi => method == AUTH_METHOD_GSSAPI,
            MethodPreference::UserPass => method == AUTH_METHOD_PASSWORD,
        };
        if !admissible {
            return None;
        }

        match method {
            AUTH_METHOD_NONE => Some(AuthStrategy::None(NoAuth)),
            AUTH_METHOD_GSSAPI => Some(AuthStrategy::Gssapi(GssapiAuth)),
            AUTH_METHOD_PASSWORD => {
                let (username, password) = match (&config.username, &config.password) {
                    (Some(u), Some(p)) => (u.clone(), p.clone()),
                    _ => return None,
                };
                Some(AuthStrategy::UserPass(UserPassAuth::new(username, password)))
            }
            _ => None,
        }
    }

    async fn authenticate<S>(&self, stream: &mut S) -> Result<AuthOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self {
            AuthStrategy::None(strategy) => strategy.authenticate(stream).await,
            AuthStrategy::Gssapi(strategy) => strategy.authenticate(stream).await,
            AuthStrategy::UserPass(strategy) => strategy.authenticate(stream).await,
        }
    }
}

/// Negotiate an authentication method and run its sub-negotiation.
///
/// Walks the offered methods in client order; the first one admissible under
/// the server preference wins and its strategy takes over the stream. When
/// no offered method is admissible, answers `[5, 0xFF]` and rejects.
pub async fn negotiate<S>(stream: &mut S, offered: &[u8], config: &AuthConfig) -> Result<AuthOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for &method in offered {
        if let Some(strategy) = AuthStrategy::select(method, config) {
            return strategy.authenticate(stream).await;
        }
    }

    stream
        .write_all(&wire::encode_method_select(AUTH_METHOD_NOT_ACCEPTABLE))
        .await?;
    stream.flush().await?;
    Ok(AuthOutcome::rejected(
        AUTH_METHOD_NOT_ACCEPTABLE,
        "Unsupported authentication method.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    fn config(preference: MethodPreference) -> AuthConfig {
        AuthConfig {
            preference,
            username: Some("u".to_string()),
            password: Some("p".to_string()),
        }
    }

    #[tokio::test]
    async fn test_negotiate_no_auth() {
        let (mut client, mut server) = duplex(1024);

        let outcome = negotiate(&mut server, &[AUTH_METHOD_NONE], &config(MethodPreference::NoAuth))
            .await
            .unwrap();

        assert!(outcome.accepted);
        assert_eq!(outcome.method, AUTH_METHOD_NONE);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [5, 0]);
    }

    #[tokio::test]
    async fn test_negotiate_rejects_unsupported_method() {
        // Scenario: server requires username/password, client only offers
        // no-auth. Expect [5, FF] and a rejection.
        let (mut client, mut server) = duplex(1024);

        let outcome = negotiate(
            &mut server,
            &[AUTH_METHOD_NONE],
            &config(MethodPreference::UserPass),
        )
        .await
        .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.method, AUTH_METHOD_NOT_ACCEPTABLE);
        assert_eq!(outcome.diagnostic, "Unsupported authentication method.");

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [5, 0xFF]);
    }

    #[tokio::test]
    async fn test_negotiate_first_offered_match_wins() {
        // Client offers user/pass before no-auth; Any preference takes the
        // first admissible one.
        let (mut client, mut server) = duplex(1024);

        let client_task = tokio::spawn(async move {
            let mut reply = [0u8; 2];
            client.read_exact(&mut reply).await.unwrap();
            assert_eq!(reply, [5, AUTH_METHOD_PASSWORD]);

            client
                .write_all(&wire::encode_userpass_request("u", "p"))
                .await
                .unwrap();

            let mut status = [0u8; 2];
            client.read_exact(&mut status).await.unwrap();
            assert_eq!(status, [1, 0]);
        });

        let outcome = negotiate(
            &mut server,
            &[AUTH_METHOD_PASSWORD, AUTH_METHOD_NONE],
            &config(MethodPreference::Any),
        )
        .await
        .unwrap();

        assert!(outcome.accepted);
        assert_eq!(outcome.method, AUTH_METHOD_PASSWORD);
        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_negotiate_skips_non_matching_methods() {
        // An unknown method ahead of an admissible one must not abort the
        // walk.
        let (mut client, mut server) = duplex(1024);

        let outcome = negotiate(
            &mut server,
            &[0x80, AUTH_METHOD_NONE],
            &config(MethodPreference::Any),
        )
        .await
        .unwrap();

        assert!(outcome.accepted);
        assert_eq!(outcome.method, AUTH_METHOD_NONE);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [5, 0]);
    }

    #[tokio::test]
    async fn test_negotiate_gssapi_declines() {
        let (mut client, mut server) = duplex(1024);

        let outcome = negotiate(
            &mut server,
            &[AUTH_METHOD_GSSAPI],
            &config(MethodPreference::Any),
        )
        .await
        .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.method, AUTH_METHOD_GSSAPI);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [5, 1]);
    }

    #[tokio::test]
    async fn test_negotiate_userpass_without_credentials_is_inadmissible() {
        let (mut client, mut server) = duplex(1024);
        let config = AuthConfig {
            preference: MethodPreference::UserPass,
            username: None,
            password: None,
        };

        let outcome = negotiate(&mut server, &[AUTH_METHOD_PASSWORD], &config)
            .await
            .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.method, AUTH_METHOD_NOT_ACCEPTABLE);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [5, 0xFF]);
    }

    #[tokio::test]
    async fn test_negotiate_empty_method_list() {
        let (mut client, mut server) = duplex(1024);

        let outcome = negotiate(&mut server, &[], &config(MethodPreference::Any))
            .await
            .unwrap();

        assert!(!outcome.accepted);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [5, 0xFF]);
    }
}
