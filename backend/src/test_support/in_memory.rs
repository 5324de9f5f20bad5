//! In-memory `DocumentStore` and `PostCache` adapters.
//!
//! Both adapters count the calls integration tests care about and can be
//! told to fail, so cache-consistency properties can be checked without
//! PostgreSQL or Redis.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{CacheKey, DocumentStore, DocumentStoreError, PostCache, PostCacheError};
use crate::domain::{
    Comment, Follow, FollowId, Like, NewFollow, NewPost, NewUser, PasswordDigest, Post, PostId,
    PostWithAuthor, User, UserId, UserRecord,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("in-memory adapter mutex poisoned"),
    }
}

#[derive(Default)]
struct Documents {
    users: Vec<UserRecord>,
    posts: Vec<Post>,
    follows: Vec<Follow>,
}

/// Document store held in process memory.
///
/// Enforces the same unique constraints as the PostgreSQL schema
/// (`users_username_key`, `users_email_key`).
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<Documents>,
    failure: Mutex<Option<DocumentStoreError>>,
    list_queries: AtomicUsize,
    post_queries: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `error` until [`Self::recover`].
    pub fn fail_with(&self, error: DocumentStoreError) {
        *lock(&self.failure) = Some(error);
    }

    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Number of listing queries served.
    pub fn list_queries(&self) -> usize {
        self.list_queries.load(Ordering::SeqCst)
    }

    /// Number of single-post lookups served.
    pub fn post_queries(&self) -> usize {
        self.post_queries.load(Ordering::SeqCst)
    }

    /// Read a stored post directly, bypassing counters.
    pub fn stored_post(&self, id: &PostId) -> Option<Post> {
        lock(&self.documents)
            .posts
            .iter()
            .find(|post| post.id == *id)
            .cloned()
    }

    /// Read a stored password digest directly.
    pub fn stored_digest(&self, username: &str) -> Option<PasswordDigest> {
        lock(&self.documents)
            .users
            .iter()
            .find(|record| record.user.username == username)
            .map(|record| record.password_digest.clone())
    }

    fn check_failure(&self) -> Result<(), DocumentStoreError> {
        match lock(&self.failure).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_post<R>(
        &self,
        id: &PostId,
        update: impl FnOnce(&mut Post) -> R,
    ) -> Result<Option<R>, DocumentStoreError> {
        self.check_failure()?;
        let mut documents = lock(&self.documents);
        Ok(documents
            .posts
            .iter_mut()
            .find(|post| post.id == *id)
            .map(update))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_user(&self, user: &NewUser) -> Result<UserId, DocumentStoreError> {
        self.check_failure()?;
        let mut documents = lock(&self.documents);
        if documents
            .users
            .iter()
            .any(|record| record.user.username == user.username)
        {
            return Err(DocumentStoreError::duplicate_key("users_username_key"));
        }
        if documents
            .users
            .iter()
            .any(|record| record.user.email == user.email)
        {
            return Err(DocumentStoreError::duplicate_key("users_email_key"));
        }

        let id = UserId::random();
        documents.users.push(UserRecord {
            user: user.clone().into_user(id),
            password_digest: user.password_digest.clone(),
        });
        Ok(id)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DocumentStoreError> {
        self.check_failure()?;
        Ok(lock(&self.documents)
            .users
            .iter()
            .find(|record| record.user.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DocumentStoreError> {
        self.check_failure()?;
        Ok(lock(&self.documents)
            .users
            .iter()
            .find(|record| record.user.email == email)
            .map(|record| record.user.clone()))
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, DocumentStoreError> {
        self.check_failure()?;
        Ok(lock(&self.documents)
            .users
            .iter()
            .find(|record| record.user.id == *id)
            .map(|record| record.user.clone()))
    }

    async fn insert_post(&self, post: &NewPost) -> Result<PostId, DocumentStoreError> {
        self.check_failure()?;
        let id = PostId::random();
        lock(&self.documents).posts.push(post.clone().into_post(id));
        Ok(id)
    }

    async fn find_post_by_id(&self, id: &PostId) -> Result<Option<Post>, DocumentStoreError> {
        self.post_queries.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.stored_post(id))
    }

    async fn list_posts_with_author(&self) -> Result<Vec<PostWithAuthor>, DocumentStoreError> {
        self.list_queries.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let documents = lock(&self.documents);
        let mut posts: Vec<PostWithAuthor> = documents
            .posts
            .iter()
            .map(|post| PostWithAuthor {
                author: documents
                    .users
                    .iter()
                    .find(|record| record.user.id == post.author_id)
                    .map(|record| record.user.clone()),
                post: post.clone(),
            })
            .collect();
        posts.sort_by(|a, b| {
            a.post
                .created_at
                .cmp(&b.post.created_at)
                .then_with(|| a.post.id.cmp(&b.post.id))
        });
        Ok(posts)
    }

    async fn append_comment(
        &self,
        post_id: &PostId,
        comment: &Comment,
    ) -> Result<bool, DocumentStoreError> {
        let appended = self.with_post(post_id, |post| {
            post.comments.push(comment.clone());
            post.updated_at = comment.updated_at;
        })?;
        Ok(appended.is_some())
    }

    async fn append_like(&self, post_id: &PostId, like: &Like) -> Result<bool, DocumentStoreError> {
        let appended = self.with_post(post_id, |post| {
            if post.is_liked_by(&like.username) {
                return false;
            }
            post.likes.push(like.clone());
            post.updated_at = like.created_at;
            true
        })?;
        Ok(appended.unwrap_or(false))
    }

    async fn insert_follow(&self, follow: &NewFollow) -> Result<Follow, DocumentStoreError> {
        self.check_failure()?;
        let follow = follow.clone().into_follow(FollowId::random());
        lock(&self.documents).follows.push(follow.clone());
        Ok(follow)
    }

    async fn find_followers(&self, user_id: &UserId) -> Result<Vec<Follow>, DocumentStoreError> {
        self.check_failure()?;
        Ok(lock(&self.documents)
            .follows
            .iter()
            .filter(|follow| follow.following_id == *user_id)
            .cloned()
            .collect())
    }

    async fn find_following(&self, user_id: &UserId) -> Result<Vec<Follow>, DocumentStoreError> {
        self.check_failure()?;
        Ok(lock(&self.documents)
            .follows
            .iter()
            .filter(|follow| follow.follower_id == *user_id)
            .cloned()
            .collect())
    }
}

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Post cache held in process memory with clock-driven expiry.
pub struct InMemoryPostCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryPostCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Whether a live (unexpired) entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.live_value(key).is_some()
    }

    /// Store a value verbatim, e.g. to plant an undecodable entry.
    pub fn insert_raw(&self, key: &CacheKey, value: impl Into<String>, ttl: Duration) {
        let expires_at = self.expiry(ttl);
        lock(&self.entries).insert(
            key.as_str().to_owned(),
            Entry {
                value: value.into(),
                expires_at,
            },
        );
    }

    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        self.clock
            .utc()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn live_value(&self, key: &CacheKey) -> Option<String> {
        let now = self.clock.utc();
        let mut entries = lock(&self.entries);
        match entries.get(key.as_str()) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key.as_str());
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl PostCache for InMemoryPostCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, PostCacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PostCacheError::backend("cache offline"));
        }
        Ok(self.live_value(key))
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), PostCacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PostCacheError::backend("cache offline"));
        }
        self.insert_raw(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), PostCacheError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PostCacheError::backend("cache offline"));
        }
        lock(&self.entries).remove(key.as_str());
        Ok(())
    }
}
