use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Single game as returned by the catalog's detail and search endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalGame {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// `YYYY-MM-DD`, absent for unreleased titles.
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    /// Only present on the detail endpoint.
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ratings_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platforms: Vec<PlatformEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<NamedRef>,
}

/// Wrapper the catalog uses around platform references inside a game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformEntry {
    #[serde(default)]
    pub platform: Option<NamedRef>,
}

/// Minimal `{ id, name }` reference embedded in game payloads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// One page of a paginated catalog collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogPage<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Page of search hits.
pub type GameSearchPage = CatalogPage<ExternalGame>;

/// Page of genres, platforms or developers.
pub type ReferencePage = CatalogPage<ReferenceItem>;

/// Entry of a low-cardinality reference collection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ReferenceItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub games_count: u64,
    #[serde(default)]
    pub image_background: Option<String>,
}

/// Slowly-changing collections served through the reference cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceCategory {
    Genres,
    Platforms,
    Developers,
}

impl ReferenceCategory {
    /// Catalog path serving the collection.
    pub fn path(self) -> &'static str {
        match self {
            ReferenceCategory::Genres => "genres",
            ReferenceCategory::Platforms => "platforms",
            ReferenceCategory::Developers => "developers",
        }
    }
}

impl fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Query forwarded to the catalog's search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSearch {
    /// Free-text search; `None` lists the catalog without filtering.
    pub query: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl ExternalGame {
    /// Platform names, skipping entries the catalog left empty.
    pub fn platform_names(&self) -> Vec<String> {
        self.platforms
            .iter()
            .filter_map(|entry| entry.platform.as_ref())
            .map(|platform| platform.name.clone())
            .collect()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
