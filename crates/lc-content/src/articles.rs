use lc_core::{ApiClient, Result, endpoints};
use tracing::{debug, instrument};

use crate::models::{Article, ArticlePage};
use crate::query::ContentQuery;

/// Article listing and detail calls. Stateless; tier checks happen server-side.
#[derive(Debug, Clone)]
pub struct ArticleService {
    api: ApiClient,
}

impl ArticleService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch one page of articles matching `query`
    #[instrument(skip(self))]
    pub async fn fetch_articles(&self, query: &ContentQuery) -> Result<ArticlePage> {
        let page: ArticlePage = self.api.get_json_with_query(endpoints::ARTICLES, query).await?;
        debug!(
            "Fetched {} articles (page {}/{})",
            page.articles.len(),
            page.page,
            page.total_pages
        );
        Ok(page)
    }

    /// Fetch a single article. Unknown ids fail with `ApiError::NotFound`.
    #[instrument(skip(self))]
    pub async fn fetch_article_by_id(&self, id: &str) -> Result<Article> {
        self.api.get_json_item(endpoints::ARTICLES, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_core::{ApiError, ClientConfig, Tier};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> ArticleService {
        let config = ClientConfig::new(format!("{}/api", server.uri())).unwrap();
        ArticleService::new(ApiClient::new(config).unwrap())
    }

    fn article(id: i64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": "d",
            "content": "c",
            "content_preview": "p",
            "cover_image_url": "https://cdn.example.com/c.png",
            "access_tier": "premium",
            "author_id": 1,
            "created_at": "2025-01-01T00:00:00Z",
            "author": {"id": 1, "username": "ferris", "avatar": ""},
            "views": 0,
            "read_time": "3 min",
            "category": "rust"
        })
    }

    #[tokio::test]
    async fn test_fetch_articles_sends_only_set_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "10"))
            .and(query_param("access_tier", "premium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "articles": [article(11, "Lifetimes"), article(12, "Traits")],
                "total": 12,
                "page": 2,
                "per_page": 10,
                "total_pages": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ContentQuery::new()
            .page(2)
            .per_page(10)
            .access_tier(Tier::Premium);
        let page = service_for(&server).fetch_articles(&query).await.unwrap();

        assert_eq!(page.page, 2);
        assert!(!page.has_next());

        let requests = server.received_requests().await.unwrap();
        let mut sent: Vec<(String, String)> = requests[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                ("access_tier".to_string(), "premium".to_string()),
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "10".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_backend_order_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "articles": [article(3, "C"), article(1, "A"), article(2, "B")],
                "total": 3,
                "page": 1,
                "per_page": 10,
                "total_pages": 1
            })))
            .mount(&server)
            .await;

        let page = service_for(&server)
            .fetch_articles(&ContentQuery::new())
            .await
            .unwrap();

        let ids: Vec<i64> = page.articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(server.received_requests().await.unwrap()[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_fetch_article_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(article(11, "Lifetimes")))
            .mount(&server)
            .await;

        let article = service_for(&server).fetch_article_by_id("11").await.unwrap();
        assert_eq!(article.title, "Lifetimes");
    }

    #[tokio::test]
    async fn test_fetch_article_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/404"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = service_for(&server)
            .fetch_article_by_id("404")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_tier_denied_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/7"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"message": "Premium subscription required"})),
            )
            .mount(&server)
            .await;

        let err = service_for(&server).fetch_article_by_id("7").await.unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(message, "Premium subscription required");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }
}
