//! Scanner result and pair detail DTOs
//!
//! Shapes follow the scanner API. Decimal values arrive as strings; use
//! [`parse_decimal`] to read them. Missing fields fall back to defaults so a
//! partially populated payload still deserializes.

use super::chain::SupportedChainName;
use serde::{Deserialize, Serialize};

/// Parse a stringly-typed decimal, treating empty or malformed input as 0
pub fn parse_decimal(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Same as [`parse_decimal`] for optional fields
pub fn parse_optional_decimal(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
}

/// One row of scanner results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerResult {
    pub age: String,
    pub bundler_holdings: String,
    pub buy_fee: Option<f64>,
    pub buys: Option<u64>,
    pub call_count: u64,
    pub chain_id: u64,
    pub contract_renounced: bool,
    pub contract_verified: bool,
    pub current_mcap: String,
    pub dev_holdings: String,
    pub dex_paid: bool,
    #[serde(rename = "diff1H")]
    pub diff_1h: String,
    #[serde(rename = "diff24H")]
    pub diff_24h: String,
    #[serde(rename = "diff5M")]
    pub diff_5m: String,
    #[serde(rename = "diff6H")]
    pub diff_6h: String,
    pub discord_link: Option<String>,
    pub fdv: String,
    #[serde(rename = "first1H")]
    pub first_1h: String,
    #[serde(rename = "first24H")]
    pub first_24h: String,
    #[serde(rename = "first5M")]
    pub first_5m: String,
    #[serde(rename = "first6H")]
    pub first_6h: String,
    pub honey_pot: Option<bool>,
    pub initial_mcap: String,
    pub insider_holdings: String,
    pub insiders: u64,
    pub is_freeze_auth_disabled: bool,
    pub is_mint_auth_disabled: bool,
    pub liquidity: String,
    pub liquidity_locked: bool,
    pub liquidity_locked_amount: String,
    pub liquidity_locked_ratio: String,
    pub makers: Option<u64>,
    pub migrated_from_virtual_router: Option<String>,
    pub virtual_router_type: Option<String>,
    pub migrated_from_pair_address: Option<String>,
    pub migrated_from_router_address: Option<String>,
    pub migration_progress: Option<String>,
    pub pair_address: String,
    pub pair_mcap_usd: String,
    pub pair_mcap_usd_initial: String,
    pub percent_change_in_liquidity: String,
    pub percent_change_in_mcap: String,
    pub price: String,
    pub reserves0: String,
    pub reserves0_usd: String,
    pub reserves1: String,
    pub reserves1_usd: String,
    pub router_address: String,
    pub sell_fee: Option<f64>,
    pub sells: Option<u64>,
    pub sniper_holdings: String,
    pub snipers: u64,
    pub telegram_link: Option<String>,
    pub token0_decimals: u32,
    pub token0_symbol: String,
    pub token1_address: String,
    /// The API sends this one as a string, unlike `token0_decimals`
    pub token1_decimals: String,
    pub token1_image_uri: Option<String>,
    pub token1_name: String,
    pub token1_symbol: String,
    pub token1_total_supply_formatted: String,
    pub top10_holdings: String,
    pub twitter_link: Option<String>,
    pub txns: Option<u64>,
    pub volume: String,
    pub web_link: Option<String>,
}

/// Response of `GET /scanner`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerApiResponse {
    pub pairs: Vec<ScannerResult>,
    pub total_rows: u64,
}

/// Pair details carried by `pair-stats` events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerPairDetails {
    pub token1_sniper_wallet_to_total_supply_ratio: String,
    pub token1_bundler_wallet_to_total_supply_ratio: String,
    pub traders: u64,
    pub bundlers: u64,
    pub bundler_holdings: Option<String>,
    pub burned_amount: Option<String>,
    pub burned_supply: String,
    pub chain: SupportedChainName,
    pub dev_holdings: Option<String>,
    pub dex_paid: bool,
    pub fdv: String,
    pub freeze_authority_renounced: bool,
    pub insider_holdings: Option<String>,
    pub insiders: u64,
    pub is_migrating: Option<bool>,
    pub is_verified: bool,
    pub link_discord: Option<String>,
    pub link_telegram: Option<String>,
    pub link_twitter: Option<String>,
    pub link_website: Option<String>,
    pub locked_amount: Option<String>,
    pub migrated_from_pair_address: Option<String>,
    pub migrated_from_router_address: Option<String>,
    pub migrated_to_pair_address: Option<String>,
    pub migrated_from_virtual_router: Option<String>,
    pub virtual_router_type: Option<String>,
    pub mint_authority_renounced: bool,
    pub pair_address: String,
    pub pair_created_at: String,
    pub pair_marketcap_usd: String,
    pub pair_marketcap_usd_initial: Option<String>,
    pub pair_price0_usd: String,
    pub pair_price1_usd: String,
    pub pair_reserves0: String,
    pub pair_reserves0_usd: String,
    pub pair_reserves1: String,
    pub pair_reserves1_usd: String,
    pub pair_total_supply: String,
    pub renounced: bool,
    pub router_address: String,
    pub router_type: String,
    pub sniper_holdings: Option<String>,
    pub snipers: u64,
    pub token0_address: String,
    pub token0_decimals: u32,
    pub token0_symbol: String,
    pub token1_address: String,
    pub token1_buy_fee: Option<f64>,
    pub token1_decimals: u32,
    pub token1_dev_wallet_to_total_supply_ratio: Option<String>,
    pub token1_image_uri: Option<String>,
    pub token1_is_honeypot: Option<bool>,
    pub token1_is_proxy: bool,
    pub token1_max_transaction: Option<String>,
    pub token1_max_transaction_to_total_supply_ratio: Option<String>,
    pub token1_max_wallet: Option<String>,
    pub token1_max_wallet_to_total_supply_ratio: Option<String>,
    pub token1_name: String,
    pub token1_sell_fee: Option<f64>,
    pub token1_symbol: String,
    pub token1_total_supply: String,
    pub token1_total_supply_formatted: String,
    pub token1_transfer_fee: Option<f64>,
    pub top10_holdings: Option<String>,
    pub total_locked_ratio: Option<String>,
}

/// Per-timeframe trading statistics for a pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeFramePairStatsRef {
    pub buy_volume: String,
    pub buyers: u64,
    pub buys: u64,
    pub change: String,
    pub diff: String,
    pub first: String,
    pub last: String,
    pub makers: u64,
    pub sell_volume: String,
    pub sellers: u64,
    pub sells: u64,
    pub txns: u64,
    pub volume: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeframesPairStats {
    pub five_min: TimeFramePairStatsRef,
    pub one_hour: TimeFramePairStatsRef,
    pub six_hour: TimeFramePairStatsRef,
    pub twenty_four_hour: TimeFramePairStatsRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.25"), 1.25);
        assert_eq!(parse_decimal(" 42 "), 42.0);
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal("NaN"), 0.0);
        assert_eq!(parse_decimal("inf"), 0.0);
    }

    #[test]
    fn test_parse_optional_decimal() {
        assert_eq!(parse_optional_decimal(Some("3.5")), Some(3.5));
        assert_eq!(parse_optional_decimal(Some("x")), None);
        assert_eq!(parse_optional_decimal(None), None);
    }

    #[test]
    fn test_deserialize_scanner_result() {
        let json = r#"{
            "age": "2024-05-01T12:00:00Z",
            "chainId": 8453,
            "pairAddress": "0xpair",
            "token1Address": "0xtoken",
            "token1Name": "Degen",
            "token1Symbol": "DEGEN",
            "token0Symbol": "WETH",
            "token1Decimals": "18",
            "token0Decimals": 18,
            "diff5M": "1.5",
            "diff24H": "-3.25",
            "price": "0.0123",
            "volume": "150000",
            "honeyPot": null,
            "buys": 12,
            "sells": null,
            "migratedFromVirtualRouter": null,
            "virtualRouterType": null
        }"#;

        let result: ScannerResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.chain_id, 8453);
        assert_eq!(result.pair_address, "0xpair");
        assert_eq!(result.token1_decimals, "18");
        assert_eq!(result.token0_decimals, 18);
        assert_eq!(result.diff_5m, "1.5");
        assert_eq!(result.diff_24h, "-3.25");
        assert_eq!(result.buys, Some(12));
        assert_eq!(result.sells, None);
        assert_eq!(result.honey_pot, None);
        assert!(result.liquidity.is_empty());
    }

    #[test]
    fn test_deserialize_api_response() {
        let json = r#"{"pairs":[{"pairAddress":"a"},{"pairAddress":"b"}],"totalRows":120}"#;
        let response: ScannerApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.pairs.len(), 2);
        assert_eq!(response.total_rows, 120);
    }

    #[test]
    fn test_deserialize_timeframe_stats() {
        let json = r#"{
            "fiveMin": {"change": "2.5", "buys": 3, "sells": 1, "txns": 4},
            "oneHour": {"change": "-1"},
            "sixHour": {},
            "twentyFourHour": {"volume": "9000"}
        }"#;
        let stats: TimeframesPairStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.five_min.change, "2.5");
        assert_eq!(stats.five_min.txns, 4);
        assert_eq!(stats.one_hour.change, "-1");
        assert_eq!(stats.twenty_four_hour.volume, "9000");
    }
}
