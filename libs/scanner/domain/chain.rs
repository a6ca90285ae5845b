//! Supported chains and chain id mapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chains the scanner API serves results for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SupportedChainName {
    #[default]
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "SOL")]
    Sol,
    #[serde(rename = "BASE")]
    Base,
    #[serde(rename = "BSC")]
    Bsc,
}

impl SupportedChainName {
    pub const ALL: [SupportedChainName; 4] = [
        SupportedChainName::Eth,
        SupportedChainName::Sol,
        SupportedChainName::Base,
        SupportedChainName::Bsc,
    ];

    /// Wire name ("ETH", "SOL", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedChainName::Eth => "ETH",
            SupportedChainName::Sol => "SOL",
            SupportedChainName::Base => "BASE",
            SupportedChainName::Bsc => "BSC",
        }
    }

    /// Numeric chain id used by the scanner API
    pub fn chain_id(&self) -> u64 {
        match self {
            SupportedChainName::Eth => 1,
            SupportedChainName::Sol => 900,
            SupportedChainName::Base => 8453,
            SupportedChainName::Bsc => 56,
        }
    }

    /// Parse a wire name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SupportedChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chain ids accepted by the API. Sepolia (11155111) has no chain name of its own.
pub const SUPPORTED_CHAIN_IDS: [u64; 5] = [1, 11155111, 900, 8453, 56];

/// Map a numeric chain id to its chain name.
///
/// Unknown ids (including Sepolia) fall back to ETH.
pub fn chain_id_to_name(chain_id: u64) -> SupportedChainName {
    match chain_id {
        1 => SupportedChainName::Eth,
        56 => SupportedChainName::Bsc,
        8453 => SupportedChainName::Base,
        900 => SupportedChainName::Sol,
        _ => SupportedChainName::Eth,
    }
}
