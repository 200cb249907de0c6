//! One-shot notices carried across a redirect in a cookie.
//!
//! The cookie holds a short code rather than the text itself, so only the
//! messages listed here can ever be shown.

use std::time::Duration;

use poem::web::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "blog_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    AccountCreated,
    HandleTaken,
    InvalidCredentials,
    ProfileUpdated,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::AccountCreated => "account_created",
            Flash::HandleTaken => "handle_taken",
            Flash::InvalidCredentials => "invalid_credentials",
            Flash::ProfileUpdated => "profile_updated",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "account_created" => Some(Flash::AccountCreated),
            "handle_taken" => Some(Flash::HandleTaken),
            "invalid_credentials" => Some(Flash::InvalidCredentials),
            "profile_updated" => Some(Flash::ProfileUpdated),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::AccountCreated => "Your account has been created. Please sign in.",
            Flash::HandleTaken => "That username already exists.",
            Flash::InvalidCredentials => "Please check your login details and try again.",
            Flash::ProfileUpdated => "Your profile has been updated.",
        }
    }
}

pub fn set(jar: &CookieJar, flash: Flash) {
    let mut cookie = Cookie::new_with_str(FLASH_COOKIE, flash.code());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie);
}

/// Reads the pending notice, if any, and expires the cookie.
pub fn take(jar: &CookieJar) -> Option<Flash> {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::from_code(cookie.value_str()));
    if flash.is_some() {
        let mut cookie = Cookie::new_with_str(FLASH_COOKIE, "");
        cookie.set_path("/");
        cookie.set_max_age(Duration::ZERO);
        jar.add(cookie);
    }
    flash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_reversible() {
        for flash in [
            Flash::AccountCreated,
            Flash::HandleTaken,
            Flash::InvalidCredentials,
            Flash::ProfileUpdated,
        ] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn test_take_consumes_notice() {
        let jar = CookieJar::default();
        set(&jar, Flash::HandleTaken);

        assert_eq!(take(&jar), Some(Flash::HandleTaken));
        assert_eq!(take(&jar), None);
    }
}
