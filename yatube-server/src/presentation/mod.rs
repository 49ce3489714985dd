use std::sync::Arc;

use sqlx::SqlitePool;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::data::repositories::sqlite::{
    SqliteGroupRepository, SqlitePostRepository, SqliteUserRepository,
};
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod forms;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod routes;
pub(crate) mod templates;


pub(crate) type SqliteBlogService =
    BlogService<SqlitePostRepository, SqliteGroupRepository, SqliteUserRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: SqlitePool,
    pub(crate) auth_service: Arc<AuthService<SqliteUserRepository>>,
    pub(crate) blog_service: Arc<SqliteBlogService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) session_cookie_secure: bool,
}

impl AppState {
    pub(crate) fn new(pool: SqlitePool, jwt: Arc<JwtService>, session_cookie_secure: bool) -> Self {
        let auth_service = AuthService::new(SqliteUserRepository::new(pool.clone()), jwt.clone());
        let blog_service = BlogService::new(
            SqlitePostRepository::new(pool.clone()),
            SqliteGroupRepository::new(pool.clone()),
            SqliteUserRepository::new(pool.clone()),
        );

        Self {
            pool,
            auth_service: Arc::new(auth_service),
            blog_service: Arc::new(blog_service),
            jwt,
            session_cookie_secure,
        }
    }
}
