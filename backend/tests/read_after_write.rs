//! Writes are visible to the very next read, through both the listing and
//! the single-post path, even when both were cached beforehand.

use rstest::{fixture, rstest};
use social_backend::domain::ports::DocumentStore;
use social_backend::domain::{ErrorCode, NewPost, PostId, UserId};

mod support;

use support::Harness;

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
#[tokio::test]
async fn new_post_appears_in_warm_listing(harness: Harness) {
    let ada = harness.register("ada").await;
    let first = harness.publish(&ada, "first").await;
    assert_eq!(harness.repository.get_posts().await.expect("listing").len(), 1);

    let second = harness.publish(&ada, "second").await;

    let listing = harness.repository.get_posts().await.expect("listing");
    let ids: Vec<_> = listing.iter().map(|entry| entry.post.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    let fetched = harness
        .repository
        .get_post_by_id(&second.id.to_string())
        .await
        .expect("post");
    assert_eq!(fetched, second);
}

#[rstest]
#[tokio::test]
async fn comment_is_visible_through_both_read_paths(harness: Harness) {
    let ada = harness.register("ada").await;
    let grace = harness.register("grace").await;
    let post = harness.publish(&ada, "hello").await;
    let post_id = post.id.to_string();

    harness.repository.get_posts().await.expect("warm listing");
    harness
        .repository
        .get_post_by_id(&post_id)
        .await
        .expect("warm post");

    let written = harness
        .repository
        .add_comment(&post_id, &grace.id, "nice post")
        .await
        .expect("comment");
    assert!(written.warning.is_none());
    assert_eq!(written.value.comments.len(), 1);

    let single = harness
        .repository
        .get_post_by_id(&post_id)
        .await
        .expect("post");
    let comment = &single.comments[0];
    assert_eq!(comment.content, "nice post");
    assert_eq!(comment.username, "grace");

    let listing = harness.repository.get_posts().await.expect("listing");
    assert_eq!(listing[0].post.comments, single.comments);
}

#[rstest]
#[tokio::test]
async fn comments_keep_append_order(harness: Harness) {
    let ada = harness.register("ada").await;
    let post = harness.publish(&ada, "thread").await;
    let post_id = post.id.to_string();

    for content in ["c1", "c2", "c3"] {
        harness.clock.advance_seconds(1);
        harness
            .repository
            .add_comment(&post_id, &ada.id, content)
            .await
            .expect("comment");
    }

    let post = harness
        .repository
        .get_post_by_id(&post_id)
        .await
        .expect("post");
    let contents: Vec<_> = post
        .comments
        .iter()
        .map(|comment| comment.content.as_str())
        .collect();
    assert_eq!(contents, ["c1", "c2", "c3"]);
}

#[rstest]
#[tokio::test]
async fn liking_twice_records_one_like(harness: Harness) {
    let ada = harness.register("ada").await;
    let grace = harness.register("grace").await;
    let post = harness.publish(&ada, "like me").await;
    let post_id = post.id.to_string();
    harness.repository.get_posts().await.expect("warm listing");

    let first = harness
        .repository
        .add_like(&post_id, &grace.id)
        .await
        .expect("like")
        .into_value();
    let second = harness
        .repository
        .add_like(&post_id, &grace.id)
        .await
        .expect("repeat like")
        .into_value();

    assert_eq!(first.likes.len(), 1);
    assert_eq!(second.likes, first.likes);
    assert!(second.is_liked_by("grace"));

    let listing = harness.repository.get_posts().await.expect("listing");
    assert_eq!(listing[0].post.likes.len(), 1);
}

#[rstest]
#[tokio::test]
async fn posts_with_missing_authors_stay_listed(harness: Harness) {
    let ada = harness.register("ada").await;
    harness.publish(&ada, "kept").await;
    harness.clock.advance_seconds(1);
    let orphan = NewPost {
        content: "orphan".into(),
        tags: None,
        img_url: None,
        author_id: UserId::random(),
        created_at: harness.now(),
    };
    harness
        .store
        .insert_post(&orphan)
        .await
        .expect("orphan inserted");

    let listing = harness.repository.get_posts().await.expect("listing");

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].author.as_ref().map(|u| u.username.as_str()), Some("ada"));
    assert!(listing[1].author.is_none());
}

#[rstest]
#[tokio::test]
async fn comment_on_missing_post_is_not_found(harness: Harness) {
    let ada = harness.register("ada").await;
    let missing = PostId::random().to_string();

    let err = harness
        .repository
        .add_comment(&missing, &ada.id, "hello?")
        .await
        .expect_err("missing post");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
