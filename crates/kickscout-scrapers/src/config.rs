use std::path::PathBuf;
use std::time::Duration;

use kickscout_core::{KicksError, Result};
use url::Url;

use crate::SearchQuery;

pub const DEFAULT_SEARCH_URL: &str = "https://www.ebay.com/sch/i.html";
pub const DEFAULT_RESALE_INDEX_URL: &str = "https://api.sneakersapi.dev/api/v3/stockx";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Item condition filter codes understood by the auction search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ItemCondition {
    New,
    OpenBox,
    Used,
    CertifiedRefurbished,
    ExcellentRefurbished,
    VeryGood,
    Good,
    ForParts,
}

impl ItemCondition {
    pub const fn code(self) -> u32 {
        match self {
            ItemCondition::New => 1000,
            ItemCondition::OpenBox => 1500,
            ItemCondition::Used => 3000,
            ItemCondition::CertifiedRefurbished => 2000,
            ItemCondition::ExcellentRefurbished => 2500,
            ItemCondition::VeryGood => 4000,
            ItemCondition::Good => 5000,
            ItemCondition::ForParts => 7000,
        }
    }
}

/// Category codes for the auction search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Category {
    /// Clothing, Shoes & Accessories
    #[default]
    ClothingShoesAccessories,
    /// Men's Shoes
    MensShoes,
}

impl Category {
    pub const fn code(self) -> u32 {
        match self {
            Category::ClothingShoesAccessories => 11450,
            Category::MensShoes => 93427,
        }
    }
}

/// Bounded exponential backoff for transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): base, 2x base, 4x base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Everything the auction crawler needs, fixed for the lifetime of a crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub search_url: String,
    pub category: Category,
    pub condition: Option<ItemCondition>,
    pub page_size: u32,
    pub completed_only: bool,
    pub sold_only: bool,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// External bound on pages per crawl. `None` follows pagination to the end.
    pub max_pages: Option<u32>,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            category: Category::default(),
            condition: None,
            page_size: DEFAULT_PAGE_SIZE,
            completed_only: true,
            sold_only: true,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            max_pages: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn with_search_url(mut self, search_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_condition(mut self, condition: Option<ItemCondition>) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Search URL for one page. The identifier is passed as the free-text
    /// query as-is; only transport encoding is applied.
    pub fn page_url(&self, query: &SearchQuery) -> Result<Url> {
        let flag = |on: bool| if on { "1" } else { "0" };
        let mut params: Vec<(&str, String)> = vec![
            ("_nkw", query.identifier.clone()),
            ("LH_Complete", flag(self.completed_only).to_string()),
            ("LH_Sold", flag(self.sold_only).to_string()),
            ("_ipg", self.page_size.to_string()),
            ("_dcat", self.category.code().to_string()),
            ("_pgn", query.page.to_string()),
        ];
        if let Some(condition) = self.condition {
            params.push(("LH_ItemCondition", condition.code().to_string()));
        }

        Ok(Url::parse_with_params(&self.search_url, &params)?)
    }
}

/// Resale-index REST service settings.
#[derive(Debug, Clone)]
pub struct ResaleIndexConfig {
    pub base_url: String,
    /// Without a key the source reports itself unavailable.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ResaleIndexConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RESALE_INDEX_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

impl ResaleIndexConfig {
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn products_url(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        Url::parse(&format!("{}/products", base)).map_err(|e| KicksError::Config(e.to_string()))
    }
}

/// How to reach the marketplace process bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("node"),
            args: vec!["goat_bridge.js".to_string()],
            timeout: Duration::from_secs(20),
        }
    }
}

impl BridgeConfig {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
