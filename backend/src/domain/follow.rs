//! Directional follow edges between users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FollowId, UserId};

/// A stored follow edge: `follower_id` follows `following_id`.
///
/// No uniqueness is enforced on the pair; repeated follows produce repeated
/// edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: FollowId,
    pub follower_id: UserId,
    pub following_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Follow edge ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFollow {
    pub follower_id: UserId,
    pub following_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl NewFollow {
    pub fn into_follow(self, id: FollowId) -> Follow {
        Follow {
            id,
            follower_id: self.follower_id,
            following_id: self.following_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
