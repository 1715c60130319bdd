//! Request and response bodies for the Inkwell `/api/v1` surface.
//!
//! These types carry no behaviour; the server and any client share them so the
//! JSON shape is defined in one place.

use serde::{Deserialize, Serialize};

/// A post as returned by every listing and lookup endpoint.
///
/// `timestamp` counts nanoseconds since the Unix epoch. Divide by one million to
/// get milliseconds for display. `starred` is only present when the server runs
/// in starred mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
}

/// Body for `POST /api/v1/posts` and `PUT /api/v1/posts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContentRequest {
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreatedResponse {
    pub id: u64,
}

/// Body for `PUT /api/v1/featured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedPostRequest {
    pub id: u64,
}
