mod crawl;
mod export;
mod parser;

use async_trait::async_trait;
use kickscout_core::{KicksError, Result};
use kickscout_scrapers::{PageFetcher, SearchQuery};
use std::sync::Mutex;

pub const FIRST_PAGE: &str = include_str!("../fixtures/first_page.html");
pub const LAST_PAGE: &str = include_str!("../fixtures/last_page.html");
pub const NO_RESULTS: &str = include_str!("../fixtures/no_results.html");
pub const SINGLE_RESULT: &str = include_str!("../fixtures/single_result.html");

/// Serves recorded result pages in order. Requests past the last page fail
/// like a dropped connection.
pub struct FixtureFetcher {
    pages: Vec<String>,
    requested: Mutex<Vec<u32>>,
}

impl FixtureFetcher {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|page| page.to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<String> {
        self.requested.lock().unwrap().push(query.page);
        self.pages
            .get(query.page as usize - 1)
            .cloned()
            .ok_or_else(|| KicksError::Transport(format!("connection reset on page {}", query.page)))
    }
}
