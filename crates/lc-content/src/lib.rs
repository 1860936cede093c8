//! Tier-gated content access for the Lectern client
//!
//! - [`ArticleService`] / [`VideoService`]: paginated, filtered listings and
//!   detail fetches. Both are stateless; access tiers are enforced by the
//!   backend, which answers 403 for content above the caller's tier
//! - [`ContentQuery`]: listing parameters, sent verbatim with unset fields omitted
//! - [`ProgressStore`]: persisted reading positions per content id
//!
//! Services take an [`lc_core::ApiClient`]; build it with
//! `with_bearer_auth` so requests carry the session token.

pub mod articles;
pub mod models;
pub mod progress;
pub mod query;
pub mod videos;

pub use articles::ArticleService;
pub use models::{Article, ArticlePage, Author, Video, VideoPage};
pub use progress::ProgressStore;
pub use query::ContentQuery;
pub use videos::VideoService;
