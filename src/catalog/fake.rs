use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use futures::{FutureExt, future::BoxFuture};
use reqwest::StatusCode;
use tokio::sync::Barrier;

use super::{
    CatalogApi,
    error::{CatalogError, CatalogResult},
    models::{
        CatalogPage, ExternalGame, GameSearch, GameSearchPage, ReferenceCategory, ReferenceItem,
        ReferencePage,
    },
};

/// Scriptable in-process catalog counting every call it receives.
#[derive(Default)]
pub struct FakeCatalog {
    games: Mutex<HashMap<i64, ExternalGame>>,
    failures: Mutex<VecDeque<CatalogError>>,
    barrier: Mutex<Option<Arc<Barrier>>>,
    fetch_calls: AtomicUsize,
    search_calls: AtomicUsize,
    reference_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game(self, external_id: i64, name: &str) -> Self {
        self.add_game(external_game(external_id, name));
        self
    }

    pub fn add_game(&self, game: ExternalGame) {
        self.games.lock().unwrap().insert(game.id, game);
    }

    /// Serve `game` for `external_id` even when its own id differs.
    pub fn add_game_as(&self, external_id: i64, game: ExternalGame) {
        self.games.lock().unwrap().insert(external_id, game);
    }

    /// Queue an error returned by the next catalog call instead of data.
    pub fn fail_next(&self, err: CatalogError) {
        self.failures.lock().unwrap().push_back(err);
    }

    /// Hold every `fetch_game` until `parties` callers are waiting.
    pub fn rendezvous(&self, parties: usize) {
        *self.barrier.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn reference_calls(&self) -> usize {
        self.reference_calls.load(Ordering::SeqCst)
    }

    fn scripted_failure(&self) -> Option<CatalogError> {
        self.failures.lock().unwrap().pop_front()
    }
}

impl CatalogApi for FakeCatalog {
    fn fetch_game(&self, external_id: i64) -> BoxFuture<'static, CatalogResult<ExternalGame>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let barrier = self.barrier.lock().unwrap().clone();
        let outcome = match self.scripted_failure() {
            Some(err) => Err(err),
            None => self
                .games
                .lock()
                .unwrap()
                .get(&external_id)
                .cloned()
                .ok_or_else(|| {
                    CatalogError::from_status(&format!("games/{external_id}"), StatusCode::NOT_FOUND)
                }),
        };
        async move {
            if let Some(barrier) = barrier {
                barrier.wait().await;
            }
            outcome
        }
        .boxed()
    }

    fn search_games(&self, search: GameSearch) -> BoxFuture<'static, CatalogResult<GameSearchPage>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match self.scripted_failure() {
            Some(err) => Err(err),
            None => {
                let needle = search.query.unwrap_or_default().to_lowercase();
                let mut results = self
                    .games
                    .lock()
                    .unwrap()
                    .values()
                    .filter(|g| g.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect::<Vec<_>>();
                results.sort_by_key(|g| g.id);
                Ok(CatalogPage {
                    count: results.len() as u64,
                    next: None,
                    previous: None,
                    results,
                })
            }
        };
        async move { outcome }.boxed()
    }

    fn fetch_reference(
        &self,
        category: ReferenceCategory,
        page: u32,
        page_size: u32,
    ) -> BoxFuture<'static, CatalogResult<ReferencePage>> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match self.scripted_failure() {
            Some(err) => Err(err),
            None => {
                let first = i64::from((page.max(1) - 1) * page_size);
                let results = (first..first + i64::from(page_size))
                    .map(|id| ReferenceItem {
                        id,
                        name: format!("{category} {id}"),
                        slug: format!("{category}-{id}"),
                        games_count: 10,
                        image_background: None,
                    })
                    .collect();
                Ok(CatalogPage {
                    count: 100,
                    next: None,
                    previous: None,
                    results,
                })
            }
        };
        async move { outcome }.boxed()
    }
}

pub fn external_game(external_id: i64, name: &str) -> ExternalGame {
    ExternalGame {
        id: external_id,
        name: name.to_owned(),
        slug: Some(name.to_lowercase().replace(' ', "-")),
        released: Some("2013-09-17".into()),
        background_image: Some(format!("https://media.example/{external_id}.jpg")),
        description_raw: Some(format!("{name} description")),
        rating: Some(4.5),
        ratings_count: Some(100),
        platforms: Vec::new(),
        genres: Vec::new(),
    }
}
