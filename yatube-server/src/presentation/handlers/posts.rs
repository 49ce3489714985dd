use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::post::is_author;
use crate::domain::user::Actor;
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult, render};
use crate::presentation::forms::{FormErrors, PostForm};
use crate::presentation::handlers::{PageQuery, PostId};
use crate::presentation::middleware::auth::{AuthenticatedUser, CurrentUser};
use crate::presentation::templates::{
    GroupListTemplate, IndexTemplate, Nav, PostCard, PostDetailTemplate, PostFormTemplate,
    ProfileTemplate,
};

pub(crate) async fn index(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let page = state.blog_service.index(query.number()).await?;
    render(&IndexTemplate::new(Nav::new(actor.as_ref()), &page))
}

pub(crate) async fn group_posts(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let listing = state.blog_service.group_posts(&slug, query.number()).await?;
    render(&GroupListTemplate::new(
        Nav::new(actor.as_ref()),
        &listing.group,
        &listing.page,
    ))
}

pub(crate) async fn profile(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let listing = state.blog_service.profile(&username, query.number()).await?;
    render(&ProfileTemplate::new(
        Nav::new(actor.as_ref()),
        &listing.author.username,
        listing.post_count,
        &listing.page,
    ))
}

pub(crate) async fn post_detail(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    PostId(post_id): PostId,
) -> AppResult<Html<String>> {
    let detail = state.blog_service.post_detail(post_id).await?;
    let can_edit = actor
        .as_ref()
        .is_some_and(|actor| is_author(actor, &detail.post));

    render(&PostDetailTemplate {
        nav: Nav::new(actor.as_ref()),
        post: PostCard::from(&detail.post),
        author_post_count: detail.author_post_count,
        can_edit,
    })
}

pub(crate) async fn create_post_form(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> AppResult<Html<String>> {
    let groups = state.blog_service.group_choices().await?;
    render(&PostFormTemplate::create(
        Nav::new(Some(&actor)),
        &PostForm::default(),
        &groups,
        &FormErrors::default(),
    ))
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return rerender_create(&state, &actor, &form, FormErrors::from(&errors)).await;
    }

    match state.blog_service.create_post(&actor, form.to_input()).await {
        Ok(_) => Ok(Redirect::to(&format!("/profile/{}/", actor.username)).into_response()),
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => rerender_create(&state, &actor, &form, errors).await,
            None => Err(err.into()),
        },
    }
}

pub(crate) async fn edit_post_form(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    PostId(post_id): PostId,
) -> AppResult<Response> {
    let post = match state.blog_service.post_for_edit(&actor, post_id).await {
        Ok(post) => post,
        Err(DomainError::Forbidden) => return Ok(to_detail(post_id)),
        Err(err) => return Err(err.into()),
    };

    let groups = state.blog_service.group_choices().await?;
    let page = render(&PostFormTemplate::edit(
        Nav::new(Some(&actor)),
        post_id,
        &PostForm::from_post(&post),
        &groups,
        &FormErrors::default(),
    ))?;
    Ok(page.into_response())
}

pub(crate) async fn edit_post(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    PostId(post_id): PostId,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    // чужой пост: молча возвращаем на страницу поста, ничего не пишем
    match state.blog_service.post_for_edit(&actor, post_id).await {
        Ok(_) => {}
        Err(DomainError::Forbidden) => return Ok(to_detail(post_id)),
        Err(err) => return Err(err.into()),
    }

    if let Err(errors) = form.validate() {
        return rerender_edit(&state, &actor, post_id, &form, FormErrors::from(&errors)).await;
    }

    match state.blog_service.edit_post(&actor, post_id, form.to_input()).await {
        Ok(_) | Err(DomainError::Forbidden) => Ok(to_detail(post_id)),
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => rerender_edit(&state, &actor, post_id, &form, errors).await,
            None => Err(AppError::from(err)),
        },
    }
}

fn to_detail(post_id: i64) -> Response {
    Redirect::to(&format!("/posts/{post_id}/")).into_response()
}

async fn rerender_create(
    state: &AppState,
    actor: &Actor,
    form: &PostForm,
    errors: FormErrors,
) -> AppResult<Response> {
    let groups = state.blog_service.group_choices().await?;
    let page = render(&PostFormTemplate::create(
        Nav::new(Some(actor)),
        form,
        &groups,
        &errors,
    ))?;
    Ok(page.into_response())
}

async fn rerender_edit(
    state: &AppState,
    actor: &Actor,
    post_id: i64,
    form: &PostForm,
    errors: FormErrors,
) -> AppResult<Response> {
    let groups = state.blog_service.group_choices().await?;
    let page = render(&PostFormTemplate::edit(
        Nav::new(Some(actor)),
        post_id,
        form,
        &groups,
        &errors,
    ))?;
    Ok(page.into_response())
}
