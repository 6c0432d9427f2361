use airport_core::{Page, PageRequest};
use airport_store::app_config::PaginationConfig;
use serde::{Deserialize, Serialize};

/// `?page=&page_size=` on every collection endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn request(&self, config: &PaginationConfig) -> PageRequest {
        let size = self
            .page_size
            .unwrap_or(config.page_size)
            .min(config.max_page_size);
        PageRequest::new(self.page.unwrap_or(1), size)
    }
}

/// Listing envelope. `next`/`previous` are page numbers, absent at the ends.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(page: Page<T>, request: &PageRequest) -> Self {
        Self {
            next: page.has_next(request).then(|| request.page + 1),
            previous: (request.page > 1).then(|| request.page - 1),
            count: page.count,
            results: page.results,
        }
    }
}
