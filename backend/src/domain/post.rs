//! Post aggregate with its embedded comments and likes.
//!
//! Comments and likes have no identity of their own: they live inside the
//! post, are only ever appended, and carry the commenter's username copied at
//! write time rather than a live reference to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PostId, User, UserId};

/// Validation errors for post and comment input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    #[error("post content must not be empty")]
    EmptyContent,
    #[error("comment content must not be empty")]
    EmptyComment,
    #[error("tags must not be blank")]
    BlankTag,
}

/// Comment embedded in a post, ordered chronologically by insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub content: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Build a comment, rejecting blank content.
    pub fn new(
        content: &str,
        username: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<Self, PostValidationError> {
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyComment);
        }
        Ok(Self {
            content: content.to_owned(),
            username: username.into(),
            created_at: at,
            updated_at: at,
        })
    }
}

/// Like embedded in a post; at most one per username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A published post.
///
/// ## Invariants
/// - `comments` preserve insertion order.
/// - `likes` hold at most one entry per `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub img_url: Option<String>,
    pub author_id: UserId,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes: Vec<Like>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether `username` has already liked this post.
    pub fn is_liked_by(&self, username: &str) -> bool {
        self.likes.iter().any(|like| like.username == username)
    }
}

/// A post joined with its author.
///
/// The author is absent when `author_id` no longer resolves to a user; such
/// posts are still listed. The author is serialised under `User`, matching
/// the listing shape clients already consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    #[serde(rename = "User", default)]
    pub author: Option<User>,
}

/// Validated post content prior to authorship and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    content: String,
    tags: Option<Vec<String>>,
    img_url: Option<String>,
}

impl PostDraft {
    /// Validate caller input for a new post.
    ///
    /// Blank image URLs are treated as absent.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::PostDraft;
    ///
    /// let draft = PostDraft::try_new("hello", Some(vec!["rust".into()]), Some(" ".into())).unwrap();
    /// assert_eq!(draft.content(), "hello");
    /// assert!(draft.img_url().is_none());
    /// ```
    pub fn try_new(
        content: &str,
        tags: Option<Vec<String>>,
        img_url: Option<String>,
    ) -> Result<Self, PostValidationError> {
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        if tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|tag| tag.trim().is_empty()))
        {
            return Err(PostValidationError::BlankTag);
        }
        let img_url = img_url.filter(|url| !url.trim().is_empty());
        Ok(Self {
            content: content.to_owned(),
            tags,
            img_url,
        })
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn img_url(&self) -> Option<&str> {
        self.img_url.as_deref()
    }

    /// Attach the author and creation time.
    pub fn into_new_post(self, author_id: UserId, at: DateTime<Utc>) -> NewPost {
        NewPost {
            content: self.content,
            tags: self.tags,
            img_url: self.img_url,
            author_id,
            created_at: at,
        }
    }
}

/// Post ready for insertion; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub img_url: Option<String>,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// Materialise the stored post once the store has assigned an id.
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            content: self.content,
            tags: self.tags,
            img_url: self.img_url,
            author_id: self.author_id,
            comments: Vec::new(),
            likes: Vec::new(),
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
