use lc_core::{ApiClient, Result, endpoints};
use tracing::{debug, instrument};

use crate::models::{Video, VideoPage};
use crate::query::ContentQuery;

/// Video listing and detail calls
#[derive(Debug, Clone)]
pub struct VideoService {
    api: ApiClient,
}

impl VideoService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn fetch_videos(&self, query: &ContentQuery) -> Result<VideoPage> {
        let page: VideoPage = self.api.get_json_with_query(endpoints::VIDEOS, query).await?;
        debug!("Fetched {} of {} videos", page.videos.len(), page.total);
        Ok(page)
    }

    /// Unknown ids fail with `ApiError::NotFound`
    #[instrument(skip(self))]
    pub async fn fetch_video_by_id(&self, id: &str) -> Result<Video> {
        self.api.get_json_item(endpoints::VIDEOS, id).await
    }
}
