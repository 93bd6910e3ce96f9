use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    catalog::models::{ReferenceItem, ReferencePage},
    dto::game::{default_page, default_page_size},
};

/// Pagination of reference collections.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ReferenceQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 40))]
    pub page_size: u32,
}

/// Page of genres, platforms or developers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReferencePageResponse {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<ReferenceItem>,
}

impl From<&ReferencePage> for ReferencePageResponse {
    fn from(page: &ReferencePage) -> Self {
        Self {
            count: page.count,
            next: page.next.clone(),
            previous: page.previous.clone(),
            results: page.results.clone(),
        }
    }
}
