//! Server-rendered pages. Every page extends `base.html`, which shows the
//! pending flash notice when there is one and the account links that fit
//! `signed_in`.

use askama::Template;
use poem::web::Html;

use crate::entities::user;
use crate::error::AppError;
use crate::flash::Flash;
use crate::store::PostRecord;

pub fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}

fn message(flash: Option<Flash>) -> Option<&'static str> {
    flash.map(Flash::message)
}

pub struct PostView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub category: String,
    pub date_created: String,
}

impl From<&PostRecord> for PostView {
    fn from(record: &PostRecord) -> Self {
        Self {
            id: record.blog.id,
            title: record.blog.title.clone(),
            content: record.blog.content.clone(),
            category: record.category_name().to_string(),
            date_created: record.blog.date_created.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
    pub posts: Vec<PostView>,
}

impl BlogPage {
    pub fn new(signed_in: bool, posts: &[PostRecord]) -> Self {
        Self {
            signed_in,
            flash: None,
            posts: posts.iter().map(PostView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "update.html")]
pub struct UpdatePage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
    pub post: PostView,
}

impl UpdatePage {
    pub fn new(signed_in: bool, record: &PostRecord) -> Self {
        Self {
            signed_in,
            flash: None,
            post: PostView::from(record),
        }
    }
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignUpPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

impl SignUpPage {
    pub fn new(signed_in: bool, flash: Option<Flash>) -> Self {
        Self {
            signed_in,
            flash: message(flash),
        }
    }
}

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SignInPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

impl SignInPage {
    pub fn new(signed_in: bool, flash: Option<Flash>) -> Self {
        Self {
            signed_in,
            flash: message(flash),
        }
    }
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
    pub name: String,
    pub username: String,
    pub avatar: Option<String>,
}

impl ProfilePage {
    pub fn new(user: &user::Model, flash: Option<Flash>) -> Self {
        Self {
            signed_in: true,
            flash: message(flash),
            name: user.name.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Template, Default)]
#[template(path = "home.html")]
pub struct HomePage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

#[derive(Template, Default)]
#[template(path = "about.html")]
pub struct AboutPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

#[derive(Template, Default)]
#[template(path = "contact.html")]
pub struct ContactPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

#[derive(Template, Default)]
#[template(path = "videos.html")]
pub struct VideosPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

#[derive(Template, Default)]
#[template(path = "createblog.html")]
pub struct CreateBlogPage {
    pub signed_in: bool,
    pub flash: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_page_escapes_user_text() {
        let page = ProfilePage {
            signed_in: true,
            flash: Some(Flash::ProfileUpdated.message()),
            name: "<b>Ann</b>".to_string(),
            username: "ann1".to_string(),
            avatar: None,
        };
        let html = page.render().unwrap();
        assert!(html.contains("&lt;b&gt;Ann"));
        assert!(!html.contains("<b>Ann"));
        assert!(html.contains("Your profile has been updated."));
    }

    #[test]
    fn test_blog_page_lists_posts() {
        let page = BlogPage {
            signed_in: false,
            flash: None,
            posts: vec![PostView {
                id: 3,
                title: "T".to_string(),
                content: "C".to_string(),
                category: "Tech".to_string(),
                date_created: "2024-01-01 00:00".to_string(),
            }],
        };
        let html = page.render().unwrap();
        assert!(html.contains("/update/3"));
        assert!(html.contains("/delete/3"));
        assert!(html.contains("Tech"));
        assert!(html.contains("/signin/"));
        assert!(!html.contains("/signout"));
    }

    #[test]
    fn test_signed_in_nav_offers_sign_out() {
        let html = HomePage {
            signed_in: true,
            ..Default::default()
        }
        .render()
        .unwrap();
        assert!(html.contains("/signout"));
        assert!(html.contains("/profile/"));
        assert!(!html.contains("/signin/"));
    }
}
