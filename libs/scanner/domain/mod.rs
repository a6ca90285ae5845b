//! Domain Layer
//!
//! Wire DTOs, scanner filters, table rows and their merge rules, and cell
//! formatting. No I/O happens here.

pub mod chain;
pub mod dex;
pub mod filter;
pub mod format;
pub mod messages;
pub mod pair;
pub mod row;

// Re-export chain mapping
pub use chain::{chain_id_to_name, SupportedChainName, SUPPORTED_CHAIN_IDS};

// Re-export filters and presets
pub use filter::{OrderBy, RankBy, ScannerFilter, TimeFrame};

// Re-export wire DTOs
pub use messages::{
    IncomingMessage, OutgoingMessage, PairStatsMsgData, PairSubscriptionPayload,
    ScannerPairsEventPayload, ScannerPairsResults, TickEventPayload, WsTokenSwap,
};
pub use pair::{
    parse_decimal, ScannerApiResponse, ScannerPairDetails, ScannerResult, TimeFramePairStatsRef,
    TimeframesPairStats,
};

// Re-export row state
pub use dex::{short_address, DexRegistry};
pub use format::{format_age, format_count, format_percent, format_usd};
pub use row::{Audit, Liquidity, PriceChanges, PriceFlash, ScannerTableRow, Transactions, PRICE_FLASH_MS};
