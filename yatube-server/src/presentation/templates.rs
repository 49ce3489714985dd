//! Askama pages and the flat view models they render.

use askama::Template;

use crate::domain::group::Group;
use crate::domain::page::Page;
use crate::domain::post::Post;
use crate::domain::user::Actor;
use crate::presentation::forms::{FormErrors, LoginForm, PostForm, SignupForm};

/// Header state: who is logged in, if anyone.
#[derive(Debug, Clone, Default)]
pub(crate) struct Nav {
    pub(crate) logged_in: bool,
    pub(crate) username: String,
}

impl Nav {
    pub(crate) fn new(actor: Option<&Actor>) -> Self {
        match actor {
            Some(actor) => Self {
                logged_in: true,
                username: actor.username.clone(),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PostCard {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) created_at: String,
    pub(crate) author: String,
    pub(crate) has_group: bool,
    pub(crate) group_slug: String,
    pub(crate) group_title: String,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        let (group_slug, group_title) = post
            .group
            .as_ref()
            .map(|group| (group.slug.clone(), group.title.clone()))
            .unwrap_or_default();

        Self {
            id: post.id,
            text: post.text.clone(),
            created_at: post.created_at.format("%d.%m.%Y %H:%M").to_string(),
            author: post.author.username.clone(),
            has_group: post.group.is_some(),
            group_slug,
            group_title,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PaginatorView {
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) has_other_pages: bool,
    pub(crate) has_previous: bool,
    pub(crate) has_next: bool,
    pub(crate) previous: u32,
    pub(crate) next: u32,
}

impl<T> From<&Page<T>> for PaginatorView {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            has_other_pages: page.has_other_pages(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.previous_page_number(),
            next: page.next_page_number(),
        }
    }
}

fn cards(page: &Page<Post>) -> Vec<PostCard> {
    page.items.iter().map(PostCard::from).collect()
}

#[derive(Debug, Clone)]
pub(crate) struct GroupOption {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) selected: bool,
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) nav: Nav,
    pub(crate) posts: Vec<PostCard>,
    pub(crate) paginator: PaginatorView,
}

impl IndexTemplate {
    pub(crate) fn new(nav: Nav, page: &Page<Post>) -> Self {
        Self {
            nav,
            posts: cards(page),
            paginator: page.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub(crate) struct GroupListTemplate {
    pub(crate) nav: Nav,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) posts: Vec<PostCard>,
    pub(crate) paginator: PaginatorView,
}

impl GroupListTemplate {
    pub(crate) fn new(nav: Nav, group: &Group, page: &Page<Post>) -> Self {
        Self {
            nav,
            title: group.title.clone(),
            description: group.description.clone(),
            posts: cards(page),
            paginator: page.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub(crate) struct ProfileTemplate {
    pub(crate) nav: Nav,
    pub(crate) author: String,
    pub(crate) post_count: u64,
    pub(crate) posts: Vec<PostCard>,
    pub(crate) paginator: PaginatorView,
}

impl ProfileTemplate {
    pub(crate) fn new(nav: Nav, author: &str, post_count: u64, page: &Page<Post>) -> Self {
        Self {
            nav,
            author: author.to_string(),
            post_count,
            posts: cards(page),
            paginator: page.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub(crate) struct PostDetailTemplate {
    pub(crate) nav: Nav,
    pub(crate) post: PostCard,
    pub(crate) author_post_count: u64,
    pub(crate) can_edit: bool,
}

/// Create and edit share this page; `is_edit` switches the heading and action.
#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub(crate) struct PostFormTemplate {
    pub(crate) nav: Nav,
    pub(crate) is_edit: bool,
    pub(crate) action: String,
    pub(crate) text: String,
    pub(crate) groups: Vec<GroupOption>,
    pub(crate) text_errors: Vec<String>,
    pub(crate) group_errors: Vec<String>,
}

impl PostFormTemplate {
    pub(crate) fn create(nav: Nav, form: &PostForm, groups: &[Group], errors: &FormErrors) -> Self {
        Self::build(nav, false, "/create/".to_string(), form, groups, errors)
    }

    pub(crate) fn edit(
        nav: Nav,
        post_id: i64,
        form: &PostForm,
        groups: &[Group],
        errors: &FormErrors,
    ) -> Self {
        Self::build(nav, true, format!("/posts/{post_id}/edit/"), form, groups, errors)
    }

    fn build(
        nav: Nav,
        is_edit: bool,
        action: String,
        form: &PostForm,
        groups: &[Group],
        errors: &FormErrors,
    ) -> Self {
        let groups = groups
            .iter()
            .map(|group| GroupOption {
                id: group.id,
                title: group.title.clone(),
                selected: form.is_selected(&group.id),
            })
            .collect();

        Self {
            nav,
            is_edit,
            action,
            text: form.text.clone(),
            groups,
            text_errors: errors.field("text").to_vec(),
            group_errors: errors.field("group").to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) nav: Nav,
    pub(crate) username: String,
    pub(crate) next: String,
    pub(crate) username_errors: Vec<String>,
    pub(crate) password_errors: Vec<String>,
    pub(crate) non_field_errors: Vec<String>,
}

impl LoginTemplate {
    pub(crate) fn new(nav: Nav, form: &LoginForm, next: &str, errors: &FormErrors) -> Self {
        Self {
            nav,
            username: form.username.clone(),
            next: next.to_string(),
            username_errors: errors.field("username").to_vec(),
            password_errors: errors.field("password").to_vec(),
            non_field_errors: errors.non_field().to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub(crate) struct SignupTemplate {
    pub(crate) nav: Nav,
    pub(crate) username: String,
    pub(crate) username_errors: Vec<String>,
    pub(crate) password_errors: Vec<String>,
    pub(crate) password_confirm_errors: Vec<String>,
}

impl SignupTemplate {
    pub(crate) fn new(nav: Nav, form: &SignupForm, errors: &FormErrors) -> Self {
        Self {
            nav,
            username: form.username.clone(),
            username_errors: errors.field("username").to_vec(),
            password_errors: errors.field("password").to_vec(),
            password_confirm_errors: errors.field("password_confirm").to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "errors/error.html")]
pub(crate) struct ErrorTemplate {
    pub(crate) nav: Nav,
    pub(crate) status: u16,
    pub(crate) title: &'static str,
    pub(crate) message: &'static str,
}
