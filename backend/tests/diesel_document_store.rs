//! `DieselDocumentStore` against embedded PostgreSQL.
//!
//! Covers the statements the in-memory store only imitates: the JSONB
//! appends with their like guard, the left-join listing and the unique
//! constraint names surfaced on duplicate registrations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use social_backend::domain::ports::{DocumentStore, DocumentStoreError};
use social_backend::domain::{
    Comment, Like, NewPost, NewUser, PasswordDigest, PostId, Registration, UserId,
};
use social_backend::outbound::persistence::{
    DbPool, DieselDocumentStore, PoolConfig, run_pending_migrations,
};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{handle_cluster_setup_failure, test_cluster};

struct TestContext {
    runtime: Runtime,
    store: DieselDocumentStore,
    _cluster: TestCluster,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = cluster.connection().database_url("postgres");
    runtime
        .block_on(run_pending_migrations(&database_url))
        .map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        store: DieselDocumentStore::new(pool),
        _cluster: cluster,
    })
}

#[fixture]
fn store_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::seconds(seconds)
}

fn new_user(username: &str, email: &str) -> NewUser {
    let registration = Registration::try_from_parts(username, username, email, "pw")
        .expect("valid registration");
    NewUser::from_registration(&registration, PasswordDigest::new("$argon2id$digest"), at(0))
}

fn new_post(author_id: UserId, content: &str, created_at: DateTime<Utc>) -> NewPost {
    NewPost {
        content: content.into(),
        tags: Some(vec!["intro".into()]),
        img_url: None,
        author_id,
        created_at,
    }
}

impl TestContext {
    fn publish(&self, author_id: UserId, content: &str, created_at: DateTime<Utc>) -> PostId {
        self.runtime
            .block_on(self.store.insert_post(&new_post(author_id, content, created_at)))
            .expect("post inserted")
    }
}

#[rstest]
fn repeated_like_by_one_username_is_stored_once(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: repeated_like_by_one_username_is_stored_once skipped");
        return;
    };
    let post_id = context.publish(UserId::random(), "like me", at(1));
    let like = |seconds| Like {
        username: "grace".into(),
        created_at: at(seconds),
    };

    let first = context
        .runtime
        .block_on(context.store.append_like(&post_id, &like(2)))
        .expect("first like");
    let second = context
        .runtime
        .block_on(context.store.append_like(&post_id, &like(3)))
        .expect("second like");
    let other = context
        .runtime
        .block_on(context.store.append_like(
            &post_id,
            &Like {
                username: "ada".into(),
                created_at: at(4),
            },
        ))
        .expect("other like");

    assert!(first);
    assert!(!second);
    assert!(other);
    let post = context
        .runtime
        .block_on(context.store.find_post_by_id(&post_id))
        .expect("lookup")
        .expect("post exists");
    let likers: Vec<_> = post.likes.iter().map(|like| like.username.as_str()).collect();
    assert_eq!(likers, ["grace", "ada"]);
    assert_eq!(post.likes[0].created_at, at(2));
}

#[rstest]
fn comments_are_appended_in_order(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: comments_are_appended_in_order skipped");
        return;
    };
    let post_id = context.publish(UserId::random(), "thread", at(1));

    for (offset, content) in (2..).zip(["c1", "c2", "c3"]) {
        let comment = Comment::new(content, "ada", at(offset)).expect("valid comment");
        let appended = context
            .runtime
            .block_on(context.store.append_comment(&post_id, &comment))
            .expect("append");
        assert!(appended);
    }

    let post = context
        .runtime
        .block_on(context.store.find_post_by_id(&post_id))
        .expect("lookup")
        .expect("post exists");
    let contents: Vec<_> = post
        .comments
        .iter()
        .map(|comment| comment.content.as_str())
        .collect();
    assert_eq!(contents, ["c1", "c2", "c3"]);
    assert_eq!(post.updated_at, at(4));
    assert_eq!(post.tags, Some(vec!["intro".to_owned()]));
}

#[rstest]
fn appends_to_missing_post_change_nothing(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: appends_to_missing_post_change_nothing skipped");
        return;
    };
    let missing = PostId::random();
    let comment = Comment::new("hello?", "ada", at(1)).expect("valid comment");
    let like = Like {
        username: "ada".into(),
        created_at: at(1),
    };

    let commented = context
        .runtime
        .block_on(context.store.append_comment(&missing, &comment))
        .expect("append comment");
    let liked = context
        .runtime
        .block_on(context.store.append_like(&missing, &like))
        .expect("append like");

    assert!(!commented);
    assert!(!liked);
}

#[rstest]
fn listing_keeps_posts_whose_author_is_missing(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: listing_keeps_posts_whose_author_is_missing skipped");
        return;
    };
    let ada_id = context
        .runtime
        .block_on(context.store.insert_user(&new_user("ada", "ada@example.com")))
        .expect("user inserted");
    let kept = context.publish(ada_id, "kept", at(1));
    let orphan = context.publish(UserId::random(), "orphan", at(2));

    let listing = context
        .runtime
        .block_on(context.store.list_posts_with_author())
        .expect("listing");

    let ids: Vec<_> = listing.iter().map(|entry| entry.post.id).collect();
    assert_eq!(ids, vec![kept, orphan]);
    assert_eq!(
        listing[0].author.as_ref().map(|user| user.username.as_str()),
        Some("ada")
    );
    assert!(listing[1].author.is_none());
}

#[rstest]
#[case("ada", "other@example.com", "users_username_key")]
#[case("other", "ada@example.com", "users_email_key")]
fn duplicate_user_reports_violated_constraint(
    store_context: Option<TestContext>,
    #[case] username: &str,
    #[case] email: &str,
    #[case] constraint: &str,
) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_user_reports_violated_constraint skipped");
        return;
    };
    context
        .runtime
        .block_on(context.store.insert_user(&new_user("ada", "ada@example.com")))
        .expect("first user");

    let err = context
        .runtime
        .block_on(context.store.insert_user(&new_user(username, email)))
        .expect_err("duplicate");

    assert_eq!(err, DocumentStoreError::duplicate_key(constraint));
}
