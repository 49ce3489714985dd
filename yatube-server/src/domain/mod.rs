pub(crate) mod error;
pub(crate) mod group;
pub(crate) mod page;
pub(crate) mod post;
pub(crate) mod user;
