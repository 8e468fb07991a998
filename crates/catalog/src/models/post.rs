//! Blog post domain models. Posts are independent of the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mossberry_core::PostId;

use super::product::ImageCompromise;

/// A blog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique post ID.
    pub id: PostId,
    /// Title shown in listings.
    pub title: String,
    /// Body content (markup handled by the rendering layer).
    pub content: String,
    /// Header image location.
    pub image_url: String,
    /// Image cropping policy.
    pub image_compromise: ImageCompromise,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last touched (store-side trigger).
    pub modified_at: DateTime<Utc>,
}

/// Fields for creating a post. The store assigns the ID.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub image_compromise: ImageCompromise,
}

/// Full overwrite of a post's mutable fields.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub image_compromise: ImageCompromise,
}
