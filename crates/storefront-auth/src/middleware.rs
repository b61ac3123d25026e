//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_db::User;
use tracing::{debug, info, warn};

use crate::basic::{BasicAuthGuard, parse_basic_header};
use crate::error::AuthError;
use crate::jwt::JwtManager;
use crate::password::verify_password;
use crate::roles::RoleSet;
use crate::store::CredentialStore;

/// Header carrying the session token
pub const TOKEN_HEADER: &str = "x-dsr-token";

/// Valid Argon2 hash that no password matches, checked when the login name is
/// unknown so both failure paths do the same work
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// Authenticated user information, attached to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub user_type: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            uuid: user.uuid,
            name: user.name,
            user_type: user.user_type,
        }
    }
}

/// Login and token checks over a credential store
pub struct TokenAuthenticator {
    jwt: JwtManager,
    store: Arc<dyn CredentialStore>,
}

impl TokenAuthenticator {
    pub fn new(jwt: JwtManager, store: Arc<dyn CredentialStore>) -> Self {
        Self { jwt, store }
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Verify a name/password pair and issue a token for it
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        debug!("Login attempt for user: {}", username);

        let Some(user) = self.store.find_by_name(username).await? else {
            // Burn the same hashing time as a real check; the outcome is irrelevant
            let _ = verify_password(password, DUMMY_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(&user, now)?;
        info!("User {} logged in successfully", user.name);
        Ok(token)
    }

    /// Resolve a request token to a user admitted by `required`
    ///
    /// The role comes from the token itself, so a role change only applies
    /// after the next login.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        required: &RoleSet,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.jwt.verify(token, now)?;

        let user = self
            .store
            .find_by_external_id(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        if !required.check(&claims.role) {
            debug!(
                "Role {} of user {} not in [{}]",
                claims.role, user.name, required
            );
            return Err(AuthError::Forbidden);
        }

        Ok(user)
    }
}

/// Middleware state for a token-protected route
#[derive(Clone)]
pub struct TokenGuard {
    authenticator: Arc<TokenAuthenticator>,
    roles: RoleSet,
}

impl TokenGuard {
    pub fn new(authenticator: Arc<TokenAuthenticator>, roles: RoleSet) -> Self {
        Self {
            authenticator,
            roles,
        }
    }
}

fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    headers
        .get(TOKEN_HEADER)
        .map(|value| {
            value
                .to_str()
                .map(str::to_owned)
                .map_err(|e| AuthError::Malformed(e.to_string()))
        })
        .transpose()
}

/// Extract Basic credentials from the authorization header
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic_header)
}

fn reject(err: AuthError) -> AuthError {
    warn!("Rejected request: {}", err);
    metrics::counter!("storefront_auth_rejections_total", "reason" => err.reason()).increment(1);
    err
}

/// Token middleware
///
/// Validates the `x-dsr-token` header against the guard's role set. On
/// success the resolved user is added to request extensions as [`AuthUser`].
pub async fn require_token(
    State(guard): State<TokenGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = token_from_headers(request.headers()).map_err(reject)?;

    let user = guard
        .authenticator
        .authenticate(token.as_deref(), &guard.roles, Utc::now())
        .await
        .map_err(reject)?;

    debug!("Authenticated user: {} ({})", user.name, user.user_type);

    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}

/// Basic auth middleware over the static credential table
pub async fn require_basic_auth(
    State(guard): State<Arc<BasicAuthGuard>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let admitted = basic_credentials(request.headers())
        .is_some_and(|(username, password)| guard.verify(&username, &password));

    if !admitted {
        return Err(reject(AuthError::BasicAuthRequired));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;
    use storefront_db::{Database, NewUser};
    use tower::ServiceExt;

    async fn setup() -> (Database, TokenAuthenticator) {
        let db = Database::in_memory().await.unwrap();
        let auth = TokenAuthenticator::new(
            JwtManager::new("middleware-secret", Duration::minutes(2)),
            Arc::new(db.clone()),
        );
        (db, auth)
    }

    async fn register(db: &Database, name: &str, password: &str, role: &str) -> User {
        db.insert_user(NewUser {
            name: name.to_string(),
            password_hash: hash_password(password).unwrap(),
            user_type: role.to_string(),
        })
        .await
        .unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_login_then_authenticate() {
        let (db, auth) = setup().await;
        let user = register(&db, "dsrawat", "12345", "admin").await;
        let roles = RoleSet::new(["user", "admin"]).unwrap();

        let token = auth.login("dsrawat", "12345", at(1_700_000_000)).await.unwrap();
        let resolved = auth
            .authenticate(Some(&token), &roles, at(1_700_000_060))
            .await
            .unwrap();
        assert_eq!(resolved.uuid, user.uuid);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let (db, auth) = setup().await;
        register(&db, "dsrawat", "12345", "admin").await;
        let now = at(1_700_000_000);

        assert!(matches!(
            auth.login("dsrawat", "wrong", now).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "12345", now).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("", "12345", now).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login("dsrawat", "", now).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_state_machine_rejections() {
        let (db, auth) = setup().await;
        let user = register(&db, "alice", "secret", "user").await;
        let admin_only = RoleSet::new(["admin"]).unwrap();
        let anyone = RoleSet::new(["user", "admin"]).unwrap();
        let now = at(1_700_000_000);

        assert!(matches!(
            auth.authenticate(None, &anyone, now).await,
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            auth.authenticate(Some("  "), &anyone, now).await,
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            auth.authenticate(Some("garbage"), &anyone, now).await,
            Err(AuthError::Malformed(_))
        ));

        let token = auth.login("alice", "secret", now).await.unwrap();
        assert!(matches!(
            auth.authenticate(Some(&token), &admin_only, now).await,
            Err(AuthError::Forbidden)
        ));
        assert!(matches!(
            auth.authenticate(Some(&token), &anyone, now + Duration::minutes(3)).await,
            Err(AuthError::Expired)
        ));

        db.delete_user(&user.uuid).await.unwrap();
        assert!(matches!(
            auth.authenticate(Some(&token), &anyone, now).await,
            Err(AuthError::UnknownSubject)
        ));
    }

    #[tokio::test]
    async fn test_role_is_taken_from_token() {
        let (db, auth) = setup().await;
        let user = register(&db, "bob", "pw", "user").await;
        let admin_only = RoleSet::new(["admin"]).unwrap();
        let now = at(1_700_000_000);

        // A token claiming "admin" for a stored "user" still passes the gate.
        let stale = auth
            .jwt()
            .issue(
                &User {
                    user_type: "admin".to_string(),
                    ..user.clone()
                },
                now,
                Duration::minutes(2),
            )
            .unwrap();
        let resolved = auth
            .authenticate(Some(&stale), &admin_only, now)
            .await
            .unwrap();
        assert_eq!(resolved.user_type, "user");
    }

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        user.name
    }

    #[tokio::test]
    async fn test_require_token_layer() {
        let (db, auth) = setup().await;
        register(&db, "carol", "pw", "admin").await;
        let auth = Arc::new(auth);
        let token = auth.login("carol", "pw", Utc::now()).await.unwrap();

        let guard = TokenGuard::new(auth, RoleSet::new(["admin"]).unwrap());
        let app = Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(guard, require_token));

        let response = app
            .clone()
            .oneshot(
                HttpRequest::get("/me")
                    .header(TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"carol");

        let response = app
            .oneshot(HttpRequest::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_basic_auth_layer() {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let guard = Arc::new(BasicAuthGuard::new(HashMap::from([(
            "user123".to_string(),
            "password123".to_string(),
        )])));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(guard, require_basic_auth));

        for (credentials, expected) in [
            ("user123:password123", StatusCode::OK),
            ("user123:nope", StatusCode::UNAUTHORIZED),
            (":", StatusCode::UNAUTHORIZED),
        ] {
            let response = app
                .clone()
                .oneshot(
                    HttpRequest::get("/")
                        .header(AUTHORIZATION, format!("Basic {}", STANDARD.encode(credentials)))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{}", credentials);
        }
    }
}
