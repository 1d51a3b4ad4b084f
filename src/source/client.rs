use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::SourceError;
use crate::state::data::{GalleryItem, SearchPage};

/// Every listing request is restricted to this orientation
const ORIENTATION: &str = "portrait";

/// Thin accessor for the photo API.
///
/// No retries: a failed attempt is returned to the caller as is.
/// Cloning is cheap, clones share one connection pool.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: Client,
    api_url: String,
    authorization: String,
}

impl UnsplashClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(concat!("thanks-card/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::unavailable("client setup", e))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            authorization: format!("Client-ID {}", config.access_key),
        })
    }

    /// `count` random portrait photos
    pub async fn fetch_random_batch(&self, count: u32) -> Result<Vec<GalleryItem>, SourceError> {
        let url = format!("{}/photos/random", self.api_url);
        let query = [
            ("count", count.to_string()),
            ("orientation", ORIENTATION.to_string()),
        ];
        self.get_json("Fetching random photos", &url, &query).await
    }

    /// One page of portrait search results (pages are 1-based)
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SourceError> {
        let url = format!("{}/search/photos", self.api_url);
        let params = [
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("orientation", ORIENTATION.to_string()),
        ];
        self.get_json("Searching photos", &url, &params).await
    }

    /// Tell the source a photo was used. Failures are only logged.
    pub async fn notify_download(&self, download_location: &str) {
        let url = self.absolute(download_location);
        let result = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => tracing::debug!("Download tracked: {}", url),
            Err(e) => tracing::warn!("Error triggering download tracking: {}", e),
        }
    }

    /// Raw bytes of an image on the source's CDN
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SourceError::unavailable("Fetching image", e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::unavailable("Fetching image", e))?;

        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, &self.authorization)
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                tracing::error!("{} failed: {}", operation, e);
                SourceError::unavailable(operation, e)
            })?;

        response.json::<T>().await.map_err(|e| {
            tracing::error!("{}: unexpected payload: {}", operation, e);
            SourceError::decode(e)
        })
    }

    /// Tracking URLs are absolute, but tolerate API-relative paths
    fn absolute(&self, location: &str) -> String {
        if location.starts_with('/') {
            format!("{}{}", self.api_url, location)
        } else {
            location.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::thread;
    use tiny_http::{Response, Server};

    /// What the fake API saw for one request
    #[derive(Debug)]
    struct Seen {
        url: String,
        authorization: Option<String>,
    }

    /// Serve `replies` in order, then stop. Returns the base URL and a
    /// receiver of the requests that were made.
    fn serve(replies: Vec<(u16, String)>) -> (String, mpsc::Receiver<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in replies {
                let Ok(request) = server.recv() else { return };
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.to_string());
                let _ = tx.send(Seen {
                    url: request.url().to_string(),
                    authorization,
                });
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        "Content-Type: application/json"
                            .parse::<tiny_http::Header>()
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        (format!("http://127.0.0.1:{}", port), rx)
    }

    fn client(api_url: &str) -> UnsplashClient {
        UnsplashClient::new(&Config {
            access_key: "test-key".to_string(),
            api_url: api_url.to_string(),
            download_dir: PathBuf::from("."),
        })
        .unwrap()
    }

    fn item_json(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","urls":{{"regular":"https://img/{id}?w=1080","small":"https://img/{id}?w=400","thumb":"https://img/{id}?w=200"}},"links":{{"download_location":"https://api/photos/{id}/download"}},"user":{{"username":"u_{id}","name":"Author {id}"}}}}"#
        )
    }

    #[tokio::test]
    async fn test_random_batch_keeps_order_and_sends_credential() {
        let body = format!(
            "[{},{},{},{}]",
            item_json("a"),
            item_json("b"),
            item_json("c"),
            item_json("d")
        );
        let (base, seen) = serve(vec![(200, body)]);

        let items = client(&base).fetch_random_batch(4).await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);

        let request = seen.recv().unwrap();
        assert!(request.url.starts_with("/photos/random?"));
        assert!(request.url.contains("count=4"));
        assert!(request.url.contains("orientation=portrait"));
        assert_eq!(request.authorization.as_deref(), Some("Client-ID test-key"));
    }

    #[tokio::test]
    async fn test_search_sends_paging_params() {
        let body = format!(
            r#"{{"total":42,"total_pages":6,"results":[{}]}}"#,
            item_json("x")
        );
        let (base, seen) = serve(vec![(200, body)]);

        let page = client(&base).search("red fox", 3, 8).await.unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.total_pages, 6);
        assert_eq!(page.results.len(), 1);

        let request = seen.recv().unwrap();
        assert!(request.url.starts_with("/search/photos?"));
        assert!(request.url.contains("query=red+fox"));
        assert!(request.url.contains("page=3"));
        assert!(request.url.contains("per_page=8"));
        assert!(request.url.contains("orientation=portrait"));
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let (base, _seen) = serve(vec![(401, r#"{"errors":["OAuth error"]}"#.to_string())]);
        let result = client(&base).fetch_random_batch(4).await;
        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let (base, _seen) = serve(vec![(200, r#"{"unexpected":true}"#.to_string())]);
        let result = client(&base).search("cats", 1, 8).await;
        assert!(matches!(result, Err(SourceError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_source_is_unavailable() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let server = Server::http("127.0.0.1:0").unwrap();
            server.server_addr().to_ip().unwrap().port()
        };
        let result = client(&format!("http://127.0.0.1:{}", port))
            .fetch_random_batch(4)
            .await;
        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_notify_download_swallows_failure() {
        let (base, seen) = serve(vec![(500, String::new())]);
        let location = format!("{}/photos/abc/download", base);

        // Must return normally even though the server failed
        client(&base).notify_download(&location).await;

        let request = seen.recv().unwrap();
        assert_eq!(request.url, "/photos/abc/download");
        assert_eq!(request.authorization.as_deref(), Some("Client-ID test-key"));
    }

    #[tokio::test]
    async fn test_fetch_image_returns_bytes() {
        let (base, seen) = serve(vec![(200, "PNGDATA".to_string())]);
        let bytes = client(&base)
            .fetch_image(&format!("{}/img/1", base))
            .await
            .unwrap();
        assert_eq!(bytes, b"PNGDATA");
        // CDN requests carry no credential
        assert!(seen.recv().unwrap().authorization.is_none());
    }
}
