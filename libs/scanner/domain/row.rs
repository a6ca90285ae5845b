//! Scanner table rows and their merge rules
//!
//! A row starts from a [`ScannerResult`] (HTTP page or `scanner-pairs`
//! snapshot) and is then kept current by `tick` and `pair-stats` events.

use super::chain::{chain_id_to_name, SupportedChainName};
use super::messages::{PairStatsMsgData, PairSubscriptionPayload, WsTokenSwap};
use super::pair::{parse_decimal, parse_optional_decimal, ScannerResult};
use chrono::{DateTime, TimeZone, Utc};

/// How long a price flash stays visible after a price change
pub const PRICE_FLASH_MS: i64 = 800;

/// Direction of the last price change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFlash {
    Up,
    Down,
}

/// Price change percentage per timeframe
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceChanges {
    pub m5: f64,
    pub h1: f64,
    pub h6: f64,
    pub h24: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transactions {
    pub buys: u64,
    pub sells: u64,
}

impl Transactions {
    pub fn total(&self) -> u64 {
        self.buys + self.sells
    }
}

/// Contract audit flags and social links
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Audit {
    pub mintable: bool,
    pub freezable: bool,
    pub honeypot: bool,
    pub contract_verified: bool,
    pub renounced: bool,
    pub liquidity_locked: bool,
    pub link_twitter: Option<String>,
    pub link_website: Option<String>,
    pub link_telegram: Option<String>,
    pub link_discord: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Liquidity {
    pub current: f64,
    pub change_pc: f64,
}

/// Merged row state for one pair
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerTableRow {
    /// Pair address
    pub id: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_base_symbol: Option<String>,
    /// Address of the scanned token (token1)
    pub token_address: String,
    pub chain: SupportedChainName,
    pub chain_id: u64,
    /// Router address of the pool
    pub exchange: String,
    pub price_usd: f64,
    pub price_flash: Option<PriceFlash>,
    pub price_flash_at: Option<DateTime<Utc>>,
    pub volume_usd: f64,
    pub mcap: f64,
    pub mcap_change_pc: Option<f64>,
    pub total_supply: f64,
    pub price_change_pcs: PriceChanges,
    pub transactions: Transactions,
    pub audit: Audit,
    pub token_created_at: DateTime<Utc>,
    pub liquidity: Liquidity,
    pub migration_progress: Option<f64>,
    pub call_count: u64,
    pub dex_paid: bool,
}

impl From<&ScannerResult> for ScannerTableRow {
    fn from(result: &ScannerResult) -> Self {
        let mcap = match parse_decimal(&result.current_mcap) {
            v if v > 0.0 => v,
            _ => parse_decimal(&result.pair_mcap_usd),
        };

        Self {
            id: result.pair_address.clone(),
            token_name: result.token1_name.clone(),
            token_symbol: result.token1_symbol.clone(),
            token_base_symbol: Some(result.token0_symbol.clone()).filter(|s| !s.is_empty()),
            token_address: result.token1_address.clone(),
            chain: chain_id_to_name(result.chain_id),
            chain_id: result.chain_id,
            exchange: result.router_address.clone(),
            price_usd: parse_decimal(&result.price),
            price_flash: None,
            price_flash_at: None,
            volume_usd: parse_decimal(&result.volume),
            mcap,
            mcap_change_pc: parse_optional_decimal(Some(&result.percent_change_in_mcap)),
            total_supply: parse_decimal(&result.token1_total_supply_formatted),
            price_change_pcs: PriceChanges {
                m5: parse_decimal(&result.diff_5m),
                h1: parse_decimal(&result.diff_1h),
                h6: parse_decimal(&result.diff_6h),
                h24: parse_decimal(&result.diff_24h),
            },
            transactions: Transactions {
                buys: result.buys.unwrap_or(0),
                sells: result.sells.unwrap_or(0),
            },
            audit: Audit {
                mintable: !result.is_mint_auth_disabled,
                freezable: !result.is_freeze_auth_disabled,
                honeypot: result.honey_pot == Some(true),
                contract_verified: result.contract_verified,
                renounced: result.contract_renounced,
                liquidity_locked: result.liquidity_locked,
                link_twitter: result.twitter_link.clone(),
                link_website: result.web_link.clone(),
                link_telegram: result.telegram_link.clone(),
                link_discord: result.discord_link.clone(),
            },
            token_created_at: parse_timestamp(&result.age),
            liquidity: Liquidity {
                current: parse_decimal(&result.liquidity),
                change_pc: parse_decimal(&result.percent_change_in_liquidity),
            },
            migration_progress: parse_optional_decimal(result.migration_progress.as_deref()),
            call_count: result.call_count,
            dex_paid: result.dex_paid,
        }
    }
}

impl ScannerTableRow {
    /// The pair stream this row listens to while mounted
    pub fn subscription(&self) -> PairSubscriptionPayload {
        PairSubscriptionPayload {
            pair: self.id.clone(),
            token: self.token_address.clone(),
            chain: self.chain,
        }
    }

    /// Rebuild from a fresh snapshot while keeping the live price flash
    pub fn refresh_from(&mut self, result: &ScannerResult) {
        let flash = self.price_flash;
        let flash_at = self.price_flash_at;
        *self = ScannerTableRow::from(result);
        self.price_flash = flash;
        self.price_flash_at = flash_at;
    }

    /// Merge a batch of swaps. Returns whether the row changed.
    ///
    /// Outlier swaps are skipped. The last remaining swap sets the price and
    /// market cap; every remaining swap adds to volume and to the buy or sell
    /// count. A swap paying in the scanned token is a sell.
    pub fn apply_tick(&mut self, swaps: &[WsTokenSwap], now: DateTime<Utc>) -> bool {
        let valid: Vec<&WsTokenSwap> = swaps.iter().filter(|s| !s.is_outlier).collect();
        let Some(latest) = valid.last() else {
            return false;
        };

        for swap in &valid {
            let price = parse_decimal(&swap.price_token1_usd);
            let amount = parse_decimal(&swap.amount_token1).abs();
            self.volume_usd += amount * price;

            if swap.token_in_address.eq_ignore_ascii_case(&self.token_address) {
                self.transactions.sells += 1;
            } else {
                self.transactions.buys += 1;
            }
        }

        let new_price = parse_decimal(&latest.price_token1_usd);
        if new_price > 0.0 {
            let old_price = self.price_usd;
            if new_price > old_price {
                self.price_flash = Some(PriceFlash::Up);
                self.price_flash_at = Some(now);
            } else if new_price < old_price {
                self.price_flash = Some(PriceFlash::Down);
                self.price_flash_at = Some(now);
            }

            if self.total_supply > 0.0 {
                self.mcap = self.total_supply * new_price;
            } else if old_price > 0.0 {
                self.mcap *= new_price / old_price;
            }
            self.price_usd = new_price;
        }

        true
    }

    /// Merge pair details and per-timeframe stats. Returns whether the row changed.
    pub fn apply_pair_stats(&mut self, data: &PairStatsMsgData) -> bool {
        let before = self.clone();
        let pair = &data.pair;

        self.audit.mintable = !pair.mint_authority_renounced;
        self.audit.freezable = !pair.freeze_authority_renounced;
        self.audit.honeypot = pair.token1_is_honeypot == Some(true);
        self.audit.contract_verified = pair.is_verified;
        self.audit.renounced = pair.renounced;
        self.audit.link_twitter = pair.link_twitter.clone().or(self.audit.link_twitter.take());
        self.audit.link_website = pair.link_website.clone().or(self.audit.link_website.take());
        self.audit.link_telegram = pair.link_telegram.clone().or(self.audit.link_telegram.take());
        self.audit.link_discord = pair.link_discord.clone().or(self.audit.link_discord.take());
        self.dex_paid = pair.dex_paid;

        if let Some(supply) = parse_optional_decimal(Some(&pair.token1_total_supply_formatted)) {
            if supply > 0.0 {
                self.total_supply = supply;
            }
        }

        if let Some(progress) = parse_optional_decimal(Some(&data.migration_progress)) {
            self.migration_progress = Some(progress);
        }
        self.call_count = data.call_count;

        let stats = &data.pair_stats;
        let changes = [
            (&stats.five_min.change, &mut self.price_change_pcs.m5),
            (&stats.one_hour.change, &mut self.price_change_pcs.h1),
            (&stats.six_hour.change, &mut self.price_change_pcs.h6),
            (&stats.twenty_four_hour.change, &mut self.price_change_pcs.h24),
        ];
        for (raw, slot) in changes {
            if let Some(change) = parse_optional_decimal(Some(raw)) {
                *slot = change;
            }
        }

        *self != before
    }

    /// Direction of a price flash that is still visible at `now`
    pub fn active_flash(&self, now: DateTime<Utc>) -> Option<PriceFlash> {
        let flash = self.price_flash?;
        let at = self.price_flash_at?;
        ((now - at).num_milliseconds() < PRICE_FLASH_MS).then_some(flash)
    }
}

/// Parse a creation timestamp: RFC 3339, or unix seconds/milliseconds.
/// Unparseable input maps to the unix epoch.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
        return ts.with_timezone(&Utc);
    }
    if let Ok(n) = raw.trim().parse::<i64>() {
        let parsed = if n > 10_000_000_000 {
            Utc.timestamp_millis_opt(n).single()
        } else {
            Utc.timestamp_opt(n, 0).single()
        };
        if let Some(ts) = parsed {
            return ts;
        }
    }
    DateTime::<Utc>::UNIX_EPOCH
}
