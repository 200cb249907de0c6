//! Request identity.
//!
//! A request is [`Identity::Anonymous`] until it presents a session cookie
//! whose token verifies and names a user that still exists. Tokens are
//! HS256 JWTs; nothing about a session is stored server side.
//!
//! Guarded handlers take a [`CurrentUser`] argument. Its extractor runs
//! before the handler body and answers an anonymous request with a redirect
//! to the sign-in page, so the handler's side effects never happen.

use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use poem::web::cookie::{Cookie, CookieJar, SameSite};
use poem::{FromRequest, Request, RequestBody};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::AppState;
use crate::entities::user;
use crate::error::AppError;
use crate::password::{self, CredentialError};
use crate::store::{NewUser, ProfileChanges, Store, StoreError};

pub const SESSION_COOKIE: &str = "blog_session";

/// Checked against on a sign-in for an unknown handle, so a miss costs one
/// Argon2 verification like a wrong password does.
const DUMMY_PASSWORD: &str = "blog-sign-in-placeholder";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already exists")]
    HandleTaken,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Store(StoreError),
    #[error("failed to sign session token")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AuthError::HandleTaken,
            other => AuthError::Store(other),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
    #[serde(default)]
    remember: bool,
}

/// A freshly signed token and how long the cookie carrying it should live.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    /// `None` makes a browser-session cookie.
    pub max_age: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(user::Model),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    pub fn user(&self) -> Option<&user::Model> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous => None,
        }
    }
}

/// The signed-in user of a guarded request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

pub struct SignedIn {
    pub user: user::Model,
    pub session: IssuedSession,
}

pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    remember_ttl: Duration,
    dummy_digest: OnceCell<String>,
}

impl SessionManager {
    pub fn new(secret: &[u8], ttl: Duration, remember_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            remember_ttl,
            dummy_digest: OnceCell::new(),
        }
    }

    /// Signs a token for `user_id`. "Remember me" sessions get the long TTL
    /// and a persistent cookie.
    pub fn issue(&self, user_id: i32, remember: bool) -> Result<IssuedSession, AuthError> {
        let ttl = if remember { self.remember_ttl } else { self.ttl };
        let now = get_current_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
            remember,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(IssuedSession {
            token,
            max_age: remember.then_some(ttl),
        })
    }

    /// The user id a token was issued for, if its signature and expiry hold.
    pub fn user_id(&self, token: &str) -> Option<i32> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims.sub.parse().ok(),
            Err(err) => {
                tracing::debug!(error = %err, "rejected session token");
                None
            }
        }
    }

    pub async fn resolve(
        &self,
        store: &Store,
        token: Option<&str>,
    ) -> Result<Identity, StoreError> {
        let Some(user_id) = token.and_then(|t| self.user_id(t)) else {
            return Ok(Identity::Anonymous);
        };
        match store.user(user_id).await {
            Ok(user) => Ok(Identity::Authenticated(user)),
            Err(StoreError::NotFound) => {
                tracing::debug!(user_id, "session names a missing user");
                Ok(Identity::Anonymous)
            }
            Err(err) => Err(err),
        }
    }

    /// Checks the handle and password and, on success, issues a session.
    pub async fn sign_in(
        &self,
        store: &Store,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<SignedIn, AuthError> {
        let Some(user) = store.user_by_username(username).await? else {
            let digest = self
                .dummy_digest
                .get_or_try_init(|| password::hash_blocking(DUMMY_PASSWORD.to_owned()))
                .await?;
            password::verify_blocking(password.to_owned(), digest.clone()).await?;
            return Err(AuthError::InvalidCredentials);
        };
        let matches =
            password::verify_blocking(password.to_owned(), user.password_hash.clone()).await?;
        if !matches {
            tracing::info!(user_id = user.id, "sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue(user.id, remember)?;
        tracing::info!(user_id = user.id, remember, "signed in");
        Ok(SignedIn { user, session })
    }
}

/// Creates an account. The caller stays anonymous afterwards.
pub async fn sign_up(
    store: &Store,
    name: &str,
    username: &str,
    password: &str,
) -> Result<user::Model, AuthError> {
    if store.user_by_username(username).await?.is_some() {
        return Err(AuthError::HandleTaken);
    }
    let password_hash = password::hash_blocking(password.to_owned()).await?;
    let user = store
        .create_user(NewUser {
            name: name.to_owned(),
            username: username.to_owned(),
            password_hash,
        })
        .await?;
    Ok(user)
}

pub async fn update_profile(
    store: &Store,
    current: &CurrentUser,
    changes: ProfileChanges,
) -> Result<user::Model, AuthError> {
    Ok(store.update_user(current.0.id, changes).await?)
}

pub fn start(jar: &CookieJar, session: &IssuedSession) {
    let mut cookie = Cookie::new_with_str(SESSION_COOKIE, &session.token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    if let Some(max_age) = session.max_age {
        cookie.set_max_age(max_age);
    }
    jar.add(cookie);
}

pub fn end(jar: &CookieJar) {
    let mut cookie = Cookie::new_with_str(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(Duration::ZERO);
    jar.add(cookie);
}

async fn identity_of(req: &Request) -> Result<Identity, AppError> {
    let state = req.data::<AppState>().ok_or_else(|| {
        tracing::error!("AppState is not attached to the endpoint");
        AppError::Internal
    })?;
    let token = req
        .cookie()
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value_str().to_owned());
    Ok(state.sessions.resolve(&state.store, token.as_deref()).await?)
}

impl<'a> FromRequest<'a> for Identity {
    async fn from_request(req: &'a Request, _body: &mut RequestBody) -> poem::Result<Self> {
        Ok(identity_of(req).await?)
    }
}

impl<'a> FromRequest<'a> for CurrentUser {
    async fn from_request(req: &'a Request, _body: &mut RequestBody) -> poem::Result<Self> {
        match identity_of(req).await? {
            Identity::Authenticated(user) => Ok(CurrentUser(user)),
            Identity::Anonymous => Err(AppError::LoginRequired.into()),
        }
    }
}
