//! Scanner filters
//!
//! A scanner filter is the server-side query the client fetches pages for
//! and subscribes to for live result updates.

use super::chain::SupportedChainName;
use serde::{Deserialize, Serialize};

const ONE_DAY_SECS: f64 = 24.0 * 60.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Asc,
    Desc,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Asc => "asc",
            OrderBy::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "5M")]
    FiveMin,
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "6H")]
    SixHour,
    #[serde(rename = "24H")]
    TwentyFourHour,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::FiveMin => "5M",
            TimeFrame::OneHour => "1H",
            TimeFrame::SixHour => "6H",
            TimeFrame::TwentyFourHour => "24H",
        }
    }
}

/// Ranking column understood by the scanner API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankBy {
    #[serde(rename = "price5M")]
    Price5M,
    #[serde(rename = "price1H")]
    Price1H,
    #[serde(rename = "price6H")]
    Price6H,
    #[serde(rename = "price24H")]
    Price24H,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "txns")]
    Txns,
    #[serde(rename = "buys")]
    Buys,
    #[serde(rename = "sells")]
    Sells,
    #[serde(rename = "trending")]
    Trending,
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "liquidity")]
    Liquidity,
    #[serde(rename = "mcap")]
    Mcap,
    #[serde(rename = "migration")]
    Migration,
}

impl RankBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankBy::Price5M => "price5M",
            RankBy::Price1H => "price1H",
            RankBy::Price6H => "price6H",
            RankBy::Price24H => "price24H",
            RankBy::Volume => "volume",
            RankBy::Txns => "txns",
            RankBy::Buys => "buys",
            RankBy::Sells => "sells",
            RankBy::Trending => "trending",
            RankBy::Age => "age",
            RankBy::Liquidity => "liquidity",
            RankBy::Mcap => "mcap",
            RankBy::Migration => "migration",
        }
    }
}

/// Query parameters for scanner results (`GetScannerResultParams` on the wire)
///
/// Every field is optional and omitted from the wire when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannerFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<SupportedChainName>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(rename = "rankBy", default, skip_serializing_if = "Option::is_none")]
    pub rank_by: Option<RankBy>,
    #[serde(rename = "timeFrame", default, skip_serializing_if = "Option::is_none")]
    pub time_frame: Option<TimeFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "isNotHP", default, skip_serializing_if = "Option::is_none")]
    pub is_not_hp: Option<bool>,
    #[serde(rename = "isVerified", default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(rename = "minVol24H", default, skip_serializing_if = "Option::is_none")]
    pub min_vol_24h: Option<f64>,
    #[serde(rename = "maxVol24H", default, skip_serializing_if = "Option::is_none")]
    pub max_vol_24h: Option<f64>,
    #[serde(rename = "minAge", default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<f64>,
    #[serde(rename = "maxAge", default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<f64>,
    #[serde(rename = "minLiq", default, skip_serializing_if = "Option::is_none")]
    pub min_liq: Option<f64>,
    #[serde(rename = "maxLiq", default, skip_serializing_if = "Option::is_none")]
    pub max_liq: Option<f64>,
    #[serde(rename = "minBuys24H", default, skip_serializing_if = "Option::is_none")]
    pub min_buys_24h: Option<f64>,
    #[serde(rename = "minSells24H", default, skip_serializing_if = "Option::is_none")]
    pub min_sells_24h: Option<f64>,
    #[serde(rename = "minTxns24H", default, skip_serializing_if = "Option::is_none")]
    pub min_txns_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dexes: Option<Vec<String>>,
    #[serde(rename = "virtualDexes", default, skip_serializing_if = "Option::is_none")]
    pub virtual_dexes: Option<Vec<String>>,
}

impl ScannerFilter {
    /// Trending tokens: ranked by volume, at least $1k 24h volume, under a week old
    pub fn trending() -> Self {
        Self {
            rank_by: Some(RankBy::Volume),
            order_by: Some(OrderBy::Desc),
            min_vol_24h: Some(1000.0),
            is_not_hp: Some(true),
            max_age: Some(7.0 * ONE_DAY_SECS),
            ..Default::default()
        }
    }

    /// New tokens: ranked by age, under a day old
    pub fn new_tokens() -> Self {
        Self {
            rank_by: Some(RankBy::Age),
            order_by: Some(OrderBy::Desc),
            max_age: Some(ONE_DAY_SECS),
            is_not_hp: Some(true),
            ..Default::default()
        }
    }

    /// Same filter targeting a specific result page
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// Same filter with pagination stripped (used for live subscriptions)
    pub fn without_page(&self) -> Self {
        Self {
            page: None,
            ..self.clone()
        }
    }

    /// Whether two filters describe the same result set, ignoring pagination
    pub fn matches(&self, other: &ScannerFilter) -> bool {
        self.without_page() == other.without_page()
    }

    /// Encode as HTTP query parameters
    ///
    /// Unset fields are omitted; list fields repeat their key once per entry.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::new();

        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(chain) = self.chain {
            push("chain", chain.as_str().to_string());
        }
        if let Some(order_by) = self.order_by {
            push("orderBy", order_by.as_str().to_string());
        }
        if let Some(rank_by) = self.rank_by {
            push("rankBy", rank_by.as_str().to_string());
        }
        if let Some(time_frame) = self.time_frame {
            push("timeFrame", time_frame.as_str().to_string());
        }
        if let Some(page) = self.page {
            push("page", page.to_string());
        }
        if let Some(v) = self.is_not_hp {
            push("isNotHP", v.to_string());
        }
        if let Some(v) = self.is_verified {
            push("isVerified", v.to_string());
        }
        if let Some(v) = self.min_vol_24h {
            push("minVol24H", format_number(v));
        }
        if let Some(v) = self.max_vol_24h {
            push("maxVol24H", format_number(v));
        }
        if let Some(v) = self.min_age {
            push("minAge", format_number(v));
        }
        if let Some(v) = self.max_age {
            push("maxAge", format_number(v));
        }
        if let Some(v) = self.min_liq {
            push("minLiq", format_number(v));
        }
        if let Some(v) = self.max_liq {
            push("maxLiq", format_number(v));
        }
        if let Some(v) = self.min_buys_24h {
            push("minBuys24H", format_number(v));
        }
        if let Some(v) = self.min_sells_24h {
            push("minSells24H", format_number(v));
        }
        if let Some(v) = self.min_txns_24h {
            push("minTxns24H", format_number(v));
        }
        for dex in self.dexes.iter().flatten() {
            push("dexes", dex.clone());
        }
        for dex in self.virtual_dexes.iter().flatten() {
            push("virtualDexes", dex.clone());
        }

        params
    }
}

/// Integral values are sent without a fractional part (1000, not 1000.0)
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
