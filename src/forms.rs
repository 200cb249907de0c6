//! Typed form payloads. Missing required keys are rejected by the `Form`
//! extractor; `validate()` catches empty or oversized values.

use serde::Deserialize;
use validator::Validate;

use crate::store::{NewPost, PostChanges, ProfileChanges};

#[derive(Debug, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
}

impl From<PostForm> for NewPost {
    fn from(form: PostForm) -> Self {
        Self {
            title: form.title,
            content: form.content,
            category: form.category,
        }
    }
}

/// Every field is optional; omitted fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostForm {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
}

impl From<UpdatePostForm> for PostChanges {
    fn from(form: UpdatePostForm) -> Self {
        Self {
            title: form.title,
            content: form.content,
            category: form.category,
        }
    }
}

// No Debug: these carry plaintext passwords.

#[derive(Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
    /// Checkbox; browsers omit the key when unchecked.
    #[serde(default)]
    pub remember: Option<String>,
}

impl SignInForm {
    pub fn remember(&self) -> bool {
        self.remember
            .as_deref()
            .is_some_and(|v| !v.is_empty() && v != "false" && v != "0")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
}

impl From<ProfileForm> for ProfileChanges {
    fn from(form: ProfileForm) -> Self {
        Self {
            name: form.name,
            username: form.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_rejects_empty_title() {
        let form = PostForm {
            title: String::new(),
            content: "C".to_string(),
            category: "Tech".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_update_form_allows_omitted_fields() {
        let form = UpdatePostForm {
            title: Some("T2".to_string()),
            content: None,
            category: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_remember_checkbox_values() {
        let mut form = SignInForm {
            username: "ann1".to_string(),
            password: "pw123".to_string(),
            remember: None,
        };
        assert!(!form.remember());
        form.remember = Some("on".to_string());
        assert!(form.remember());
        form.remember = Some("false".to_string());
        assert!(!form.remember());
    }
}
