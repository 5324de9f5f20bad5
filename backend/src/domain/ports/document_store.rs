//! Port for the durable document store holding users, posts and follow edges.
//!
//! The store is the single source of truth and owns identity assignment.
//! Comment and like appends must be atomic single-record updates so that
//! concurrent appends to the same post never lose an entry.

use async_trait::async_trait;

use crate::domain::{
    Comment, Follow, Like, NewFollow, NewPost, NewUser, Post, PostId, PostWithAuthor, User,
    UserId, UserRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached or no connection was available.
        Connection { message: String } =>
            "document store connection failed: {message}"; transient,
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "document store query failed: {message}"; permanent,
        /// A unique index rejected the write.
        DuplicateKey { constraint: String } =>
            "document store unique constraint violated: {constraint}"; permanent,
        /// A stored record could not be decoded into the domain model.
        Corrupt { message: String } =>
            "stored document could not be decoded: {message}"; permanent,
    }
}

/// Durable persistence for every record kind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a user; fails with `DuplicateKey` when the username or email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<UserId, DocumentStoreError>;

    /// Lookup including the password digest. Only login may call this.
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DocumentStoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DocumentStoreError>;

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, DocumentStoreError>;

    async fn insert_post(&self, post: &NewPost) -> Result<PostId, DocumentStoreError>;

    async fn find_post_by_id(&self, id: &PostId) -> Result<Option<Post>, DocumentStoreError>;

    /// Every post joined with its author, ordered by creation time then id.
    ///
    /// Posts whose author does not resolve are kept with an absent author.
    async fn list_posts_with_author(&self) -> Result<Vec<PostWithAuthor>, DocumentStoreError>;

    /// Append a comment and bump `updated_at`. Returns whether a post changed.
    async fn append_comment(
        &self,
        post_id: &PostId,
        comment: &Comment,
    ) -> Result<bool, DocumentStoreError>;

    /// Append a like unless the post already holds one for the same username.
    ///
    /// Returns `false` both when the post is missing and when the like already
    /// exists.
    async fn append_like(&self, post_id: &PostId, like: &Like) -> Result<bool, DocumentStoreError>;

    async fn insert_follow(&self, follow: &NewFollow) -> Result<Follow, DocumentStoreError>;

    /// Edges whose `following_id` is `user_id`.
    async fn find_followers(&self, user_id: &UserId) -> Result<Vec<Follow>, DocumentStoreError>;

    /// Edges whose `follower_id` is `user_id`.
    async fn find_following(&self, user_id: &UserId) -> Result<Vec<Follow>, DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DocumentStoreError::connection("refused"), true)]
    #[case(DocumentStoreError::query("syntax"), false)]
    #[case(DocumentStoreError::duplicate_key("users_email_key"), false)]
    #[case(DocumentStoreError::corrupt("bad json"), false)]
    fn only_connection_failures_are_transient(
        #[case] error: DocumentStoreError,
        #[case] transient: bool,
    ) {
        assert_eq!(error.is_transient(), transient);
    }

    #[rstest]
    fn duplicate_key_names_the_constraint() {
        let error = DocumentStoreError::duplicate_key("users_username_key");
        assert!(error.to_string().contains("users_username_key"));
    }
}
