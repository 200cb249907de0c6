use poem::web::{Data, Form, Html, Path, Redirect};
use poem::{Result, handler};
use validator::Validate;

use crate::AppState;
use crate::error::AppError;
use crate::forms::{PostForm, UpdatePostForm};
use crate::session::Identity;
use crate::views::{self, BlogPage, UpdatePage};

#[handler]
pub async fn list_posts(state: Data<&AppState>, identity: Identity) -> Result<Html<String>> {
    let posts = state.store.list_posts().await.map_err(AppError::from)?;
    Ok(views::render(&BlogPage::new(identity.is_authenticated(), &posts))?)
}

#[handler]
pub async fn create_post(state: Data<&AppState>, Form(form): Form<PostForm>) -> Result<Redirect> {
    form.validate().map_err(AppError::from)?;
    state
        .store
        .create_post(form.into())
        .await
        .map_err(AppError::write("There was an issue adding your blog post"))?;
    Ok(Redirect::see_other("/blog/"))
}

#[handler]
pub async fn edit_post(
    state: Data<&AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> Result<Html<String>> {
    let post = state.store.post(id).await.map_err(AppError::from)?;
    Ok(views::render(&UpdatePage::new(identity.is_authenticated(), &post))?)
}

#[handler]
pub async fn update_post(
    state: Data<&AppState>,
    Path(id): Path<i32>,
    Form(form): Form<UpdatePostForm>,
) -> Result<Redirect> {
    form.validate().map_err(AppError::from)?;
    state
        .store
        .update_post(id, form.into())
        .await
        .map_err(AppError::write("There was an issue updating your blog post"))?;
    Ok(Redirect::see_other("/"))
}

#[handler]
pub async fn delete_post(state: Data<&AppState>, Path(id): Path<i32>) -> Result<Redirect> {
    state
        .store
        .delete_post(id)
        .await
        .map_err(AppError::write("There was a problem deleting that blog post"))?;
    Ok(Redirect::see_other("/"))
}
