//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` and `email` carry unique indexes. The password is only ever
    /// stored as an Argon2 PHC string.
    users (id) {
        id -> Uuid,
        name -> Text,
        username -> Text,
        email -> Text,
        password_digest -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published posts.
    ///
    /// `comments` and `likes` are JSONB arrays appended in place so each
    /// append is a single-row update.
    posts (id) {
        id -> Uuid,
        content -> Text,
        tags -> Nullable<Array<Text>>,
        img_url -> Nullable<Text>,
        /// References `users.id` without a foreign key.
        author_id -> Uuid,
        comments -> Jsonb,
        likes -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directional follow edges; duplicates are permitted.
    follows (id) {
        id -> Uuid,
        follower_id -> Uuid,
        following_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(follows, posts, users);
