//! PostgreSQL-backed `DocumentStore` implementation using Diesel ORM.
//!
//! Users, posts and follow edges live in their own tables. Comments and likes
//! are JSONB arrays on the post row; appends use `||` inside a single
//! `UPDATE`, so concurrent appends to one post serialise on the row lock and
//! none is lost. The like append carries a containment guard so a second like
//! by the same username matches no row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Jsonb, Text, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{DocumentStore, DocumentStoreError};
use crate::domain::{
    Comment, Follow, FollowId, Like, NewFollow, NewPost, NewUser, PasswordDigest, Post, PostId,
    PostWithAuthor, User, UserId, UserRecord,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{FollowRow, NewPostRow, NewUserRow, PostRow, PublicUserRow, UserRow};
use super::pool::DbPool;
use super::schema::{follows, posts, users};

const APPEND_COMMENT_SQL: &str = r#"
UPDATE posts
SET comments = comments || jsonb_build_array($1::jsonb),
    updated_at = $2
WHERE id = $3
"#;

const APPEND_LIKE_SQL: &str = r#"
UPDATE posts
SET likes = likes || jsonb_build_array($1::jsonb),
    updated_at = $2
WHERE id = $3
  AND NOT (likes @> jsonb_build_array(jsonb_build_object('username', $4::text)))
"#;

/// Diesel-backed implementation of the `DocumentStore` port.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn public_row_to_user(row: PublicUserRow) -> User {
    User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        username: row.username,
        email: row.email,
    }
}

fn row_to_record(row: UserRow) -> UserRecord {
    UserRecord {
        user: User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            username: row.username,
            email: row.email,
        },
        password_digest: PasswordDigest::new(row.password_digest),
    }
}

fn row_to_post(row: PostRow) -> Result<Post, DocumentStoreError> {
    let comments: Vec<Comment> = serde_json::from_value(row.comments).map_err(|err| {
        DocumentStoreError::corrupt(format!("comments of post {}: {err}", row.id))
    })?;
    let likes: Vec<Like> = serde_json::from_value(row.likes)
        .map_err(|err| DocumentStoreError::corrupt(format!("likes of post {}: {err}", row.id)))?;

    Ok(Post {
        id: PostId::from_uuid(row.id),
        content: row.content,
        tags: row.tags,
        img_url: row.img_url,
        author_id: UserId::from_uuid(row.author_id),
        comments,
        likes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_follow(row: FollowRow) -> Follow {
    Follow {
        id: FollowId::from_uuid(row.id),
        follower_id: UserId::from_uuid(row.follower_id),
        following_id: UserId::from_uuid(row.following_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn encode_embedded<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DocumentStoreError> {
    serde_json::to_value(value)
        .map_err(|err| DocumentStoreError::query(format!("failed to encode embedded entry: {err}")))
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn insert_user(&self, user: &NewUser) -> Result<UserId, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = Uuid::new_v4();
        let row = NewUserRow {
            id,
            name: &user.name,
            username: &user.username,
            email: &user.email,
            password_digest: user.password_digest.as_str(),
            created_at: user.created_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(UserId::from_uuid(id))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_record))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PublicUserRow> = users::table
            .filter(users::email.eq(email))
            .select(PublicUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(public_row_to_user))
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PublicUserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(PublicUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(public_row_to_user))
    }

    async fn insert_post(&self, post: &NewPost) -> Result<PostId, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = Uuid::new_v4();
        let row = NewPostRow {
            id,
            content: &post.content,
            tags: post.tags.clone(),
            img_url: post.img_url.as_deref(),
            author_id: *post.author_id.as_uuid(),
            comments: json!([]),
            likes: json!([]),
            created_at: post.created_at,
            updated_at: post.created_at,
        };

        diesel::insert_into(posts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(PostId::from_uuid(id))
    }

    async fn find_post_by_id(&self, id: &PostId) -> Result<Option<Post>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_post).transpose()
    }

    async fn list_posts_with_author(&self) -> Result<Vec<PostWithAuthor>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(PostRow, Option<PublicUserRow>)> = posts::table
            .left_join(users::table.on(users::id.eq(posts::author_id)))
            .select((PostRow::as_select(), Option::<PublicUserRow>::as_select()))
            .order_by((posts::created_at.asc(), posts::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(post, author)| {
                Ok(PostWithAuthor {
                    post: row_to_post(post)?,
                    author: author.map(public_row_to_user),
                })
            })
            .collect()
    }

    async fn append_comment(
        &self,
        post_id: &PostId,
        comment: &Comment,
    ) -> Result<bool, DocumentStoreError> {
        let entry = encode_embedded(comment)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changed = sql_query(APPEND_COMMENT_SQL)
            .bind::<Jsonb, _>(&entry)
            .bind::<Timestamptz, _>(comment.created_at)
            .bind::<SqlUuid, _>(post_id.as_uuid())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(changed > 0)
    }

    async fn append_like(&self, post_id: &PostId, like: &Like) -> Result<bool, DocumentStoreError> {
        let entry = encode_embedded(like)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changed = sql_query(APPEND_LIKE_SQL)
            .bind::<Jsonb, _>(&entry)
            .bind::<Timestamptz, _>(like.created_at)
            .bind::<SqlUuid, _>(post_id.as_uuid())
            .bind::<Text, _>(&like.username)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(changed > 0)
    }

    async fn insert_follow(&self, follow: &NewFollow) -> Result<Follow, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = FollowRow {
            id: Uuid::new_v4(),
            follower_id: *follow.follower_id.as_uuid(),
            following_id: *follow.following_id.as_uuid(),
            created_at: follow.created_at,
            updated_at: follow.created_at,
        };

        diesel::insert_into(follows::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_follow(row))
    }

    async fn find_followers(&self, user_id: &UserId) -> Result<Vec<Follow>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FollowRow> = follows::table
            .filter(follows::following_id.eq(user_id.as_uuid()))
            .order_by((follows::created_at.asc(), follows::id.asc()))
            .select(FollowRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_follow).collect())
    }

    async fn find_following(&self, user_id: &UserId) -> Result<Vec<Follow>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FollowRow> = follows::table
            .filter(follows::follower_id.eq(user_id.as_uuid()))
            .order_by((follows::created_at.asc(), follows::id.asc()))
            .select(FollowRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_follow).collect())
    }
}
