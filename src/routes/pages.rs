//! Informational pages with no state of their own.

use poem::web::Html;
use poem::{Result, handler};

use crate::session::Identity;
use crate::views::{self, AboutPage, ContactPage, CreateBlogPage, HomePage, VideosPage};

#[handler]
pub async fn home(identity: Identity) -> Result<Html<String>> {
    Ok(views::render(&HomePage {
        signed_in: identity.is_authenticated(),
        ..Default::default()
    })?)
}

#[handler]
pub async fn about(identity: Identity) -> Result<Html<String>> {
    Ok(views::render(&AboutPage {
        signed_in: identity.is_authenticated(),
        ..Default::default()
    })?)
}

#[handler]
pub async fn contact(identity: Identity) -> Result<Html<String>> {
    Ok(views::render(&ContactPage {
        signed_in: identity.is_authenticated(),
        ..Default::default()
    })?)
}

#[handler]
pub async fn videos(identity: Identity) -> Result<Html<String>> {
    Ok(views::render(&VideosPage {
        signed_in: identity.is_authenticated(),
        ..Default::default()
    })?)
}

#[handler]
pub async fn create_blog(identity: Identity) -> Result<Html<String>> {
    Ok(views::render(&CreateBlogPage {
        signed_in: identity.is_authenticated(),
        ..Default::default()
    })?)
}
