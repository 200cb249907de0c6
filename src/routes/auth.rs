//! Sign-up, sign-in, sign-out and the profile page.
//!
//! Handlers that take a [`CurrentUser`] are guarded: anonymous requests are
//! redirected to `/signin/` before the handler body runs.

use poem::web::cookie::CookieJar;
use poem::web::{Data, Form, Html, Redirect};
use poem::{Result, handler};
use validator::Validate;

use crate::AppState;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::{ProfileForm, SignInForm, SignUpForm};
use crate::session::{self, AuthError, CurrentUser, Identity};
use crate::views::{self, ProfilePage, SignInPage, SignUpPage};

#[handler]
pub async fn sign_up_form(identity: Identity, jar: &CookieJar) -> Result<Html<String>> {
    let page = SignUpPage::new(identity.is_authenticated(), flash::take(jar));
    Ok(views::render(&page)?)
}

#[handler]
pub async fn sign_up(
    state: Data<&AppState>,
    jar: &CookieJar,
    Form(form): Form<SignUpForm>,
) -> Result<Redirect> {
    form.validate().map_err(AppError::from)?;
    match session::sign_up(&state.store, &form.name, &form.username, &form.password).await {
        Ok(_) => flash::set(jar, Flash::AccountCreated),
        Err(AuthError::HandleTaken) => flash::set(jar, Flash::HandleTaken),
        Err(err) => {
            tracing::error!(error = %err, "sign-up failed");
            return Err(AppError::WriteFailed("There was an issue creating your account").into());
        }
    }
    Ok(Redirect::see_other("/signup/"))
}

#[handler]
pub async fn sign_in_form(identity: Identity, jar: &CookieJar) -> Result<Html<String>> {
    let page = SignInPage::new(identity.is_authenticated(), flash::take(jar));
    Ok(views::render(&page)?)
}

#[handler]
pub async fn sign_in(
    state: Data<&AppState>,
    jar: &CookieJar,
    Form(form): Form<SignInForm>,
) -> Result<Redirect> {
    let attempt = state
        .sessions
        .sign_in(&state.store, &form.username, &form.password, form.remember())
        .await;
    match attempt {
        Ok(signed_in) => {
            session::start(jar, &signed_in.session);
            Ok(Redirect::see_other("/profile/"))
        }
        Err(AuthError::InvalidCredentials) => {
            flash::set(jar, Flash::InvalidCredentials);
            Ok(Redirect::see_other("/signin/"))
        }
        Err(AuthError::Credential(err)) => {
            tracing::error!(error = %err, "stored password digest is unusable");
            flash::set(jar, Flash::InvalidCredentials);
            Ok(Redirect::see_other("/signin/"))
        }
        Err(err) => {
            tracing::error!(error = %err, "sign-in failed");
            Err(AppError::Internal.into())
        }
    }
}

#[handler]
pub async fn sign_out(user: CurrentUser, jar: &CookieJar) -> Redirect {
    session::end(jar);
    tracing::info!(user_id = user.0.id, "signed out");
    Redirect::see_other("/home/")
}

#[handler]
pub async fn profile(user: CurrentUser, jar: &CookieJar) -> Result<Html<String>> {
    Ok(views::render(&ProfilePage::new(&user.0, flash::take(jar)))?)
}

#[handler]
pub async fn update_profile(
    user: CurrentUser,
    state: Data<&AppState>,
    jar: &CookieJar,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    form.validate().map_err(AppError::from)?;
    match session::update_profile(&state.store, &user, form.into()).await {
        Ok(_) => flash::set(jar, Flash::ProfileUpdated),
        Err(AuthError::HandleTaken) => flash::set(jar, Flash::HandleTaken),
        Err(err) => {
            tracing::error!(user_id = user.0.id, error = %err, "profile update failed");
            return Err(AppError::WriteFailed("There was an issue updating your profile").into());
        }
    }
    Ok(Redirect::see_other("/profile/"))
}
