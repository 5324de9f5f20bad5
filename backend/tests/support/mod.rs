//! Shared harness for the repository integration tests.
//!
//! Wires a [`SocialRepository`] to the in-memory store and cache, a real
//! Argon2 hasher and a manually advanced clock.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use social_backend::domain::{Post, SocialRepository, User};
use social_backend::outbound::security::Argon2PasswordHasher;
use social_backend::test_support::{InMemoryDocumentStore, InMemoryPostCache, MutableClock};

pub type Repository =
    SocialRepository<InMemoryDocumentStore, InMemoryPostCache, Argon2PasswordHasher>;

pub const PASSWORD: &str = "correct horse battery staple";

pub struct Harness {
    pub clock: Arc<MutableClock>,
    pub store: Arc<InMemoryDocumentStore>,
    pub cache: Arc<InMemoryPostCache>,
    pub repository: Repository,
}

impl Harness {
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .expect("valid start time");
        let clock = Arc::new(MutableClock::new(start));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let store = Arc::new(InMemoryDocumentStore::new());
        let cache = Arc::new(InMemoryPostCache::new(Arc::clone(&shared_clock)));
        let repository = SocialRepository::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            Arc::new(Argon2PasswordHasher::new()),
            shared_clock,
        );
        Self {
            clock,
            store,
            cache,
            repository,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Register `username` with [`PASSWORD`] and an address derived from it.
    pub async fn register(&self, username: &str) -> User {
        self.repository
            .register_user(username, username, &format!("{username}@example.com"), PASSWORD)
            .await
            .expect("registration succeeds")
    }

    /// Publish `content` as `author`, advancing the clock so posts order
    /// deterministically.
    pub async fn publish(&self, author: &User, content: &str) -> Post {
        self.clock.advance_seconds(1);
        self.repository
            .create_post(&author.id, content, None, None)
            .await
            .expect("post created")
            .into_value()
    }
}
