use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{RateProvider, RateQuery, RateQuote};
use crate::error::RateError;

pub const DEFAULT_BASE_URL: &str = "https://bank.gov.ua";
const EXCHANGE_PATH: &str = "/NBUStatService/v1/statdirectory/exchange";

/// One entry of the NBU exchange endpoint's JSON array
#[derive(Debug, Deserialize)]
struct NbuRate {
    #[allow(dead_code)]
    r030: Option<u32>,
    #[allow(dead_code)]
    txt: Option<String>,
    rate: serde_json::Number,
    cc: String,
    /// DD.MM.YYYY
    exchangedate: String,
}

/// Client for the National Bank of Ukraine statistics API
#[derive(Debug, Clone)]
pub struct NbuClient {
    client: Client,
    base_url: String,
}

impl NbuClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RateError> {
        let client = Client::builder()
            .user_agent(concat!("nbu-pnl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the request URL; the bare `json` flag selects the JSON format
    pub fn rate_url(&self, currency: &str, query: RateQuery) -> String {
        let mut url = format!(
            "{}{}?valcode={}",
            self.base_url,
            EXCHANGE_PATH,
            currency.to_uppercase()
        );
        if let RateQuery::On(date) = query {
            url.push_str(&format!("&date={}", date.format("%Y%m%d")));
        }
        url.push_str("&json");
        url
    }
}

#[async_trait]
impl RateProvider for NbuClient {
    async fn lookup_rate(&self, currency: &str, query: RateQuery) -> Result<RateQuote, RateError> {
        let url = self.rate_url(currency, query);
        info!("Fetching {} rate for {:?} from NBU", currency, query);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_rate_response(&body, currency, query)
    }
}

/// Decode the NBU response body into the first quote it carries
pub fn parse_rate_response(
    body: &str,
    currency: &str,
    query: RateQuery,
) -> Result<RateQuote, RateError> {
    let entries: Vec<NbuRate> =
        serde_json::from_str(body).map_err(|e| RateError::Decode(e.to_string()))?;

    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| RateError::NotFound {
            currency: currency.to_uppercase(),
            date: query.date(),
        })?;

    // Number's Display is the shortest round-trip form, so 36.5686 stays 36.5686
    let rate = Decimal::from_str(&entry.rate.to_string())
        .map_err(|e| RateError::Decode(format!("invalid rate {}: {}", entry.rate, e)))?;
    if rate <= Decimal::ZERO {
        return Err(RateError::Decode(format!("non-positive rate {}", rate)));
    }

    let as_of = NaiveDate::parse_from_str(&entry.exchangedate, "%d.%m.%Y").map_err(|_| {
        RateError::Decode(format!("invalid exchange date '{}'", entry.exchangedate))
    })?;

    Ok(RateQuote {
        currency: entry.cc,
        rate,
        as_of,
    })
}
