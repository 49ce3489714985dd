use chrono::Utc;
use tracing::{info, warn};

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::{Group, NewGroupRequest};
use crate::domain::page::{POSTS_PER_PAGE, Page, Paginator};
use crate::domain::post::{Post, PostInput, is_author};
use crate::domain::user::{Actor, User};

#[derive(Debug, Clone)]
pub(crate) struct GroupPosts {
    pub(crate) group: Group,
    pub(crate) page: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProfilePosts {
    pub(crate) author: User,
    pub(crate) post_count: u64,
    pub(crate) page: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) author_post_count: u64,
}

pub(crate) struct BlogService<P, G, U>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
{
    posts: P,
    groups: G,
    users: U,
}

impl<P, G, U> BlogService<P, G, U>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
{
    pub(crate) fn new(posts: P, groups: G, users: U) -> Self {
        Self {
            posts,
            groups,
            users,
        }
    }

    pub(crate) async fn index(&self, page: i64) -> Result<Page<Post>, DomainError> {
        self.page_of(PostFilter::All, page).await
    }

    pub(crate) async fn group_posts(&self, slug: &str, page: i64) -> Result<GroupPosts, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;

        let page = self.page_of(PostFilter::Group(group.id), page).await?;
        Ok(GroupPosts { group, page })
    }

    pub(crate) async fn profile(&self, username: &str, page: i64) -> Result<ProfilePosts, DomainError> {
        let author = self
            .users
            .find_user(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let page = self.page_of(PostFilter::Author(author.id), page).await?;
        Ok(ProfilePosts {
            author,
            post_count: page.total,
            page,
        })
    }

    pub(crate) async fn post_detail(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        let author_post_count = self
            .posts
            .count_posts(PostFilter::Author(post.author.id))
            .await?;

        Ok(PostDetail {
            post,
            author_post_count: u64::try_from(author_post_count).unwrap_or_default(),
        })
    }

    pub(crate) async fn group_choices(&self) -> Result<Vec<Group>, DomainError> {
        self.groups.list_groups().await
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let input = self.validate_input(input).await?;

        let new_post = NewPost {
            text: input.text,
            author_id: actor.user_id,
            group_id: input.group_id,
            created_at: Utc::now(),
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author = %actor.username, "post created");
        Ok(post)
    }

    /// The post as the edit form should show it; refused for anyone but the author.
    pub(crate) async fn post_for_edit(&self, actor: &Actor, post_id: i64) -> Result<Post, DomainError> {
        let post = self.get_post(post_id).await?;
        if !is_author(actor, &post) {
            warn!(post_id, user_id = actor.user_id, "edit refused: not the author");
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    pub(crate) async fn edit_post(
        &self,
        actor: &Actor,
        post_id: i64,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        self.post_for_edit(actor, post_id).await?;
        let input = self.validate_input(input).await?;

        let patch = PostPatch {
            text: input.text,
            group_id: input.group_id,
        };
        // update is scoped by author_id as well, so a lost race writes nothing
        let post = self
            .posts
            .update_post_owned(post_id, actor.user_id, patch)
            .await?
            .ok_or(DomainError::Forbidden)?;
        info!(post_id, author = %actor.username, "post edited");
        Ok(post)
    }

    pub(crate) async fn create_group(&self, req: NewGroupRequest) -> Result<Group, DomainError> {
        let req = req.validate()?;
        let group = self
            .groups
            .create_group(NewGroup {
                title: req.title,
                slug: req.slug,
                description: req.description,
            })
            .await?;
        info!(group_id = group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn validate_input(&self, input: PostInput) -> Result<PostInput, DomainError> {
        let input = input.validate()?;
        if let Some(group_id) = input.group_id
            && self.groups.find_by_id(group_id).await?.is_none()
        {
            return Err(DomainError::validation("group", "Выберите корректную группу."));
        }
        Ok(input)
    }

    async fn page_of(&self, filter: PostFilter, requested: i64) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count_posts(filter).await?;
        let window = Paginator::new(u64::try_from(total).unwrap_or_default(), POSTS_PER_PAGE)
            .window(requested);

        let pagination = Pagination {
            limit: window.per_page,
            offset: window.offset(),
        };
        let posts = self.posts.list_posts(filter, pagination).await?;
        Ok(window.with_items(posts))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};

    use super::BlogService;
    use crate::data::group_repository::{GroupRepository, NewGroup};
    use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::group::{Group, GroupRef, NewGroupRequest};
    use crate::domain::post::{Author, Post, PostInput};
    use crate::domain::user::{Actor, User};

    #[derive(Default)]
    struct FakeState {
        users: Vec<User>,
        groups: Vec<Group>,
        posts: Vec<Post>,
        update_calls: usize,
    }

    /// One in-memory store behind all three repository traits.
    #[derive(Clone, Default)]
    struct FakeStore {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeStore {
        fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
            f(&mut self.state.lock().expect("fake store mutex poisoned"))
        }

        fn add_user(&self, username: &str) -> Actor {
            self.with(|state| {
                let id = state.users.len() as i64 + 1;
                let user = User::new(id, username, Utc::now()).expect("valid user");
                let actor = user.as_actor();
                state.users.push(user);
                actor
            })
        }

        fn add_group(&self, slug: &str) -> Group {
            self.with(|state| {
                let group = Group {
                    id: state.groups.len() as i64 + 1,
                    title: format!("Group {slug}"),
                    slug: slug.to_string(),
                    description: String::new(),
                };
                state.groups.push(group.clone());
                group
            })
        }

        fn add_post(&self, author: &Actor, text: &str, group: Option<&Group>, at: DateTime<Utc>) -> Post {
            self.with(|state| {
                let post = Post::new(
                    state.posts.len() as i64 + 1,
                    text,
                    at,
                    Author {
                        id: author.user_id,
                        username: author.username.clone(),
                    },
                    group.map(GroupRef::from),
                )
                .expect("valid post");
                state.posts.push(post.clone());
                post
            })
        }

        fn post(&self, id: i64) -> Post {
            self.with(|state| state.posts.iter().find(|p| p.id == id).cloned())
                .expect("post must exist")
        }

        fn post_count(&self) -> usize {
            self.with(|state| state.posts.len())
        }

        fn update_calls(&self) -> usize {
            self.with(|state| state.update_calls)
        }
    }

    fn matches_filter(post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(id) => post.group_id() == Some(id),
            PostFilter::Author(id) => post.author.id == id,
        }
    }

    #[async_trait]
    impl PostRepository for FakeStore {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            let author = self
                .with(|state| state.users.iter().find(|u| u.id == input.author_id).cloned())
                .ok_or_else(|| DomainError::not_found("author", input.author_id))?;
            let group = input.group_id.map(|id| {
                self.with(|state| state.groups.iter().find(|g| g.id == id).cloned())
                    .expect("service validates groups")
            });
            Ok(self.add_post(&author.as_actor(), &input.text, group.as_ref(), input.created_at))
        }

        async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self.with(|state| state.posts.iter().find(|p| p.id == id).cloned()))
        }

        async fn update_post_owned(
            &self,
            post_id: i64,
            owner_id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            Ok(self.with(|state| {
                state.update_calls += 1;
                let group = patch
                    .group_id
                    .and_then(|id| state.groups.iter().find(|g| g.id == id).map(GroupRef::from));
                let post = state
                    .posts
                    .iter_mut()
                    .find(|p| p.id == post_id && p.author.id == owner_id)?;
                post.text = patch.text;
                post.group = group;
                Some(post.clone())
            }))
        }

        async fn list_posts(
            &self,
            filter: PostFilter,
            pagination: Pagination,
        ) -> Result<Vec<Post>, DomainError> {
            let mut posts: Vec<Post> = self.with(|state| {
                state
                    .posts
                    .iter()
                    .filter(|p| matches_filter(p, filter))
                    .cloned()
                    .collect()
            });
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(posts
                .into_iter()
                .skip(pagination.offset as usize)
                .take(pagination.limit as usize)
                .collect())
        }

        async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
            Ok(self.with(|state| {
                state
                    .posts
                    .iter()
                    .filter(|p| matches_filter(p, filter))
                    .count() as i64
            }))
        }
    }

    #[async_trait]
    impl GroupRepository for FakeStore {
        async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
            if self.with(|state| state.groups.iter().any(|g| g.slug == input.slug)) {
                return Err(DomainError::AlreadyExists("slug"));
            }
            let mut group = self.add_group(&input.slug);
            group.title = input.title;
            group.description = input.description;
            Ok(group)
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
            Ok(self.with(|state| state.groups.iter().find(|g| g.slug == slug).cloned()))
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
            Ok(self.with(|state| state.groups.iter().find(|g| g.id == id).cloned()))
        }

        async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
            Ok(self.with(|state| state.groups.clone()))
        }
    }

    #[async_trait]
    impl UserRepository for FakeStore {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            let actor = self.add_user(&input.username);
            Ok(User::new(actor.user_id, actor.username, Utc::now()).expect("valid user"))
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(None)
        }

        async fn find_user(&self, username: &str) -> Result<Option<User>, DomainError> {
            Ok(self.with(|state| state.users.iter().find(|u| u.username == username).cloned()))
        }
    }

    fn service(store: &FakeStore) -> BlogService<FakeStore, FakeStore, FakeStore> {
        BlogService::new(store.clone(), store.clone(), store.clone())
    }

    fn input(text: &str, group_id: Option<i64>) -> PostInput {
        PostInput {
            text: text.to_string(),
            group_id,
        }
    }

    fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Utc::now() - Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn create_post_binds_author_and_lands_first_on_index() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        store.add_post(&auth, "old", None, minutes_ago(5));
        let service = service(&store);

        let created = service
            .create_post(&auth, input("  Новый пост  ", None))
            .await
            .expect("create must succeed");
        assert_eq!(created.text, "Новый пост");
        assert_eq!(created.author.id, auth.user_id);
        assert!(created.group.is_none());

        let index = service.index(1).await.expect("index must succeed");
        assert_eq!(index.items[0].id, created.id);
    }

    #[tokio::test]
    async fn create_post_with_blank_text_writes_nothing() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");

        let err = service(&store)
            .create_post(&auth, input("   ", None))
            .await
            .expect_err("blank text must fail");
        assert!(matches!(err, DomainError::Validation { field: "text", .. }));
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn create_post_with_unknown_group_writes_nothing() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");

        let err = service(&store)
            .create_post(&auth, input("text", Some(77)))
            .await
            .expect_err("unknown group must fail");
        assert!(matches!(err, DomainError::Validation { field: "group", .. }));
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn group_listing_pages_thirteen_posts_as_ten_and_three() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        let group = store.add_group("test-slug");
        for i in 0..13 {
            store.add_post(&auth, "Тестовый пост", Some(&group), minutes_ago(60 - i));
        }
        store.add_post(&auth, "no group", None, Utc::now());
        let service = service(&store);

        let first = service.group_posts("test-slug", 1).await.expect("page 1");
        assert_eq!(first.group.slug, "test-slug");
        assert_eq!(first.page.items.len(), 10);
        assert_eq!(first.page.num_pages, 2);

        let second = service.group_posts("test-slug", 2).await.expect("page 2");
        assert_eq!(second.page.items.len(), 3);

        let clamped = service.group_posts("test-slug", 40).await.expect("clamped");
        assert_eq!(clamped.page.number, 2);
        assert_eq!(clamped.page.items.len(), 3);

        let saturated = service.group_posts("test-slug", i64::MAX).await.expect("saturated");
        assert_eq!(saturated.page.number, 2);
        assert_eq!(saturated.page.items.len(), 3);
    }

    #[tokio::test]
    async fn group_listing_for_unknown_slug_is_not_found() {
        let store = FakeStore::default();
        let err = service(&store)
            .group_posts("missing", 1)
            .await
            .expect_err("must be missing");
        assert!(matches!(err, DomainError::NotFound { resource: "group", .. }));
    }

    #[tokio::test]
    async fn profile_reports_total_post_count() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        let other = store.add_user("other");
        for i in 0..12 {
            store.add_post(&auth, "mine", None, minutes_ago(i));
        }
        store.add_post(&other, "theirs", None, Utc::now());

        let profile = service(&store).profile("auth", 2).await.expect("profile");
        assert_eq!(profile.author.username, "auth");
        assert_eq!(profile.post_count, 12);
        assert_eq!(profile.page.items.len(), 2);
        assert!(profile.page.items.iter().all(|p| p.author.id == auth.user_id));

        let err = service(&store)
            .profile("nobody", 1)
            .await
            .expect_err("unknown user");
        assert!(matches!(err, DomainError::NotFound { resource: "user", .. }));
    }

    #[tokio::test]
    async fn post_detail_counts_author_posts() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        let post = store.add_post(&auth, "one", None, minutes_ago(1));
        store.add_post(&auth, "two", None, Utc::now());

        let detail = service(&store).post_detail(post.id).await.expect("detail");
        assert_eq!(detail.post.text, "one");
        assert_eq!(detail.author_post_count, 2);

        let err = service(&store)
            .post_detail(9999)
            .await
            .expect_err("missing post");
        assert!(matches!(err, DomainError::NotFound { resource: "post", .. }));
    }

    #[tokio::test]
    async fn edit_by_non_author_is_forbidden_and_writes_nothing() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        let intruder = store.add_user("intruder");
        let post = store.add_post(&auth, "original", None, Utc::now());
        let service = service(&store);

        let err = service
            .edit_post(&intruder, post.id, input("hijacked", None))
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert_eq!(store.post(post.id).text, "original");
        assert_eq!(store.update_calls(), 0);

        let err = service
            .post_for_edit(&intruder, post.id)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn edit_by_author_changes_only_text_and_group() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        let group = store.add_group("test-slug");
        let post = store.add_post(&auth, "original", None, minutes_ago(30));

        let edited = service(&store)
            .edit_post(&auth, post.id, input("Изменённый пост", Some(group.id)))
            .await
            .expect("edit must succeed");

        assert_eq!(edited.id, post.id);
        assert_eq!(edited.author, post.author);
        assert_eq!(edited.created_at, post.created_at);
        assert_eq!(edited.text, "Изменённый пост");
        assert_eq!(edited.group_id(), Some(group.id));
    }

    #[tokio::test]
    async fn edit_by_author_with_blank_text_writes_nothing() {
        let store = FakeStore::default();
        let auth = store.add_user("auth");
        let post = store.add_post(&auth, "original", None, Utc::now());

        let err = service(&store)
            .edit_post(&auth, post.id, input("", None))
            .await
            .expect_err("blank text must fail");
        assert!(matches!(err, DomainError::Validation { field: "text", .. }));
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn create_group_validates_and_rejects_duplicates() {
        let store = FakeStore::default();
        let service = service(&store);
        let req = || NewGroupRequest {
            title: " Тестовая группа ".to_string(),
            slug: "test-slug".to_string(),
            description: "Тестовое описание".to_string(),
        };

        let group = service.create_group(req()).await.expect("create group");
        assert_eq!(group.title, "Тестовая группа");

        let err = service.create_group(req()).await.expect_err("duplicate");
        assert!(matches!(err, DomainError::AlreadyExists("slug")));
    }
}
