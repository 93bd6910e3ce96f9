use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    CatalogApi,
    error::{CatalogError, CatalogResult},
    models::{ExternalGame, GameSearch, GameSearchPage, ReferenceCategory, ReferencePage},
    retry::{RetryPolicy, run_with_retry},
};
use crate::config::CatalogSettings;

/// HTTP client for the RAWG catalog API.
#[derive(Clone)]
pub struct RawgClient {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
    policy: RetryPolicy,
}

impl RawgClient {
    /// Build a client from the catalog section of the configuration.
    pub fn new(settings: &CatalogSettings) -> CatalogResult<Self> {
        let policy = settings.retry_policy();
        let client = Client::builder()
            .connect_timeout(policy.attempt_timeout)
            .build()
            .map_err(|source| CatalogError::ClientBuilder { source })?;

        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Arc::<str>::from);

        Ok(Self {
            client,
            base_url: Arc::from(settings.base_url.trim_end_matches('/')),
            api_key,
            policy,
        })
    }

    async fn get_json<T>(&self, path: String, query: Vec<(&'static str, String)>) -> CatalogResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let budget = self.policy.attempt_timeout;
        let path = path.as_str();

        run_with_retry(&self.policy, path, || {
            let mut request = self.client.get(&url).query(&query);
            if let Some(key) = &self.api_key {
                request = request.query(&[("key", key.as_ref())]);
            }

            async move {
                debug!(path, "calling catalog");
                let response = request
                    .send()
                    .await
                    .map_err(|source| CatalogError::from_transport(path, source, budget))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::from_status(path, status));
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|source| CatalogError::from_transport(path, source, budget))?;
                serde_json::from_slice::<T>(&body).map_err(|source| CatalogError::Malformed {
                    path: path.to_owned(),
                    source,
                })
            }
        })
        .await
    }
}

impl CatalogApi for RawgClient {
    fn fetch_game(&self, external_id: i64) -> BoxFuture<'static, CatalogResult<ExternalGame>> {
        let client = self.clone();
        async move { client.get_json(format!("games/{external_id}"), Vec::new()).await }.boxed()
    }

    fn search_games(&self, search: GameSearch) -> BoxFuture<'static, CatalogResult<GameSearchPage>> {
        let client = self.clone();
        async move {
            let mut query = vec![
                ("page", search.page.to_string()),
                ("page_size", search.page_size.to_string()),
            ];
            if let Some(term) = search.query.filter(|term| !term.trim().is_empty()) {
                query.push(("search", term));
            }
            client.get_json("games".to_owned(), query).await
        }
        .boxed()
    }

    fn fetch_reference(
        &self,
        category: ReferenceCategory,
        page: u32,
        page_size: u32,
    ) -> BoxFuture<'static, CatalogResult<ReferencePage>> {
        let client = self.clone();
        async move {
            let query = vec![
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ];
            client.get_json(category.path().to_owned(), query).await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Upstream {
        game_calls: AtomicUsize,
        genre_calls: AtomicUsize,
    }

    async fn game(
        State(upstream): State<Arc<Upstream>>,
        Path(id): Path<i64>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let call = upstream.game_calls.fetch_add(1, Ordering::SeqCst);
        if params.get("key").map(String::as_str) != Some("secret") {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        match id {
            404 => StatusCode::NOT_FOUND.into_response(),
            // Flaky title: two 503s before answering.
            7 if call < 2 => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            _ => Json(json!({
                "id": id,
                "name": "Portal 2",
                "released": "2011-04-18",
                "description_raw": "Puzzles."
            }))
            .into_response(),
        }
    }

    async fn genres(State(upstream): State<Arc<Upstream>>) -> Response {
        upstream.genre_calls.fetch_add(1, Ordering::SeqCst);
        "definitely not json".into_response()
    }

    async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
        Json(json!({
            "count": 1,
            "results": [{"id": 1, "name": params.get("search").cloned().unwrap_or_default()}]
        }))
        .into_response()
    }

    async fn spawn_upstream() -> (String, Arc<Upstream>) {
        let upstream = Arc::new(Upstream::default());
        let app = Router::new()
            .route("/api/games/{id}", get(game))
            .route("/api/games", get(search))
            .route("/api/genres", get(genres))
            .with_state(upstream.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        (format!("http://{addr}/api/"), upstream)
    }

    fn client(base_url: String) -> RawgClient {
        let settings = CatalogSettings {
            base_url,
            api_key: Some("secret".into()),
            timeout: Duration::from_secs(2),
            max_attempts: 3,
            base_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(40),
            jitter: 0.0,
        };
        RawgClient::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let (base_url, upstream) = spawn_upstream().await;

        let game = client(base_url).fetch_game(7).await.unwrap();

        assert_eq!(game.name, "Portal 2");
        assert_eq!(game.released.as_deref(), Some("2011-04-18"));
        assert_eq!(upstream.game_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn not_found_is_reported_without_retry() {
        let (base_url, upstream) = spawn_upstream().await;

        let err = client(base_url).fetch_game(404).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(upstream.game_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_not_retried() {
        let (base_url, upstream) = spawn_upstream().await;

        let err = client(base_url)
            .fetch_reference(ReferenceCategory::Genres, 1, 20)
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Malformed { .. }));
        assert_eq!(upstream.genre_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn search_forwards_the_query() {
        let (base_url, _) = spawn_upstream().await;

        let page = client(base_url)
            .search_games(GameSearch {
                query: Some("zelda".into()),
                page: 1,
                page_size: 10,
            })
            .await
            .unwrap();

        assert_eq!(page.results[0].name, "zelda");
    }

    #[tokio::test]
    async fn unreachable_catalog_surfaces_transient_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}")).fetch_game(1).await.unwrap_err();

        assert!(err.is_transient());
    }
}
