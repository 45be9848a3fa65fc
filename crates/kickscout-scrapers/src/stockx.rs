use async_trait::async_trait;
use kickscout_core::{PriceData, Result, SourceKind, SourceResult, SourceSnapshot};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{retry, PriceSource, ResaleIndexConfig};

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    data: Vec<Product>,
}

/// One catalogue entry. Prices arrive as numbers or numeric strings.
#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    retail_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_price")]
    avg_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_price")]
    min_price: Option<f64>,
}

fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    })
}

impl From<Product> for PriceData {
    fn from(product: Product) -> Self {
        PriceData {
            name: product.title,
            brand: product.brand,
            retail_price: product.retail_price,
            avg_price: product.avg_price.or(product.min_price),
            ..PriceData::default()
        }
    }
}

/// First product from a products response, if any.
pub fn parse_products_response(body: &str) -> Result<Option<PriceData>> {
    let response: ProductsResponse = serde_json::from_str(body)?;
    Ok(response.data.into_iter().next().map(|product| {
        debug!("Resale index matched sku {:?}", product.sku);
        PriceData::from(product)
    }))
}

/// Client for the resale-index REST service.
#[derive(Debug, Clone)]
pub struct StockXClient {
    client: Client,
    config: ResaleIndexConfig,
    cancel: CancellationToken,
}

impl StockXClient {
    pub fn new(config: ResaleIndexConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl PriceSource for StockXClient {
    fn kind(&self) -> SourceKind {
        SourceKind::ResaleIndex
    }

    async fn fetch(&self, identifier: &str) -> Result<SourceResult> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Ok(SourceResult::unavailable("StockX API key not configured"));
        };

        let url = self.config.products_url()?;
        let body = retry::send_text(
            || {
                self.client
                    .get(url.clone())
                    .header(AUTHORIZATION, api_key)
                    .query(&[("sku", identifier)])
            },
            &self.config.retry,
            &self.cancel,
        )
        .await?;

        match parse_products_response(&body)? {
            Some(data) => Ok(SourceResult::snapshot(SourceSnapshot::Available(data))),
            None => {
                info!("No StockX product for {}", identifier);
                Ok(SourceResult::unavailable("No StockX data found for this SKU"))
            }
        }
    }
}
