//! Router address → DEX slug lookup
//!
//! Rows carry the router address of their pool. The exchange column shows a
//! protocol slug when the router is known and falls back to a shortened
//! address otherwise.

use std::collections::HashMap;

/// Well known routers per chain id
const KNOWN_ROUTERS: &[(u64, &str, &str)] = &[
    (1, "0x7a250d5630b4cf539739df2c5dacb4c659f2488d", "uniswap-v2"),
    (1, "0xe592427a0aece92de3edee1f18e0157c05861564", "uniswap-v3"),
    (1, "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f", "sushiswap"),
    (56, "0x10ed43c718714eb63d5aa57b78b54704e256024e", "pancakeswap-amm"),
    (8453, "0xcf77a3ba9a5ca399b7c97c74d54e5b1beb874e43", "aerodrome-v1"),
    (8453, "0x4752ba5dbc23f44d87826276bf6fd6b1c372ad24", "uniswap-v2"),
    (900, "675kpx9mhtjs2zt1qfr1nyhuzelxfqm9h24wfsut1mp8", "raydium-amm"),
    (900, "6ef8rrecthr5dkzon8nwu78hrvfckubj14m5ubewf6p", "pump.fun"),
];

#[derive(Debug, Clone, Default)]
pub struct DexRegistry {
    routers: HashMap<(u64, String), String>,
}

impl DexRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with well known routers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (chain_id, router, slug) in KNOWN_ROUTERS {
            registry.insert(*chain_id, router, slug);
        }
        registry
    }

    /// Register (or override) the slug for a router on a chain
    pub fn insert(&mut self, chain_id: u64, router: &str, slug: &str) {
        self.routers
            .insert((chain_id, router.to_lowercase()), slug.to_string());
    }

    pub fn slug_for(&self, chain_id: u64, router: &str) -> Option<&str> {
        self.routers
            .get(&(chain_id, router.to_lowercase()))
            .map(String::as_str)
    }

    /// Slug if known, otherwise the router shortened to `0x1234…abcd`
    pub fn display_name(&self, chain_id: u64, router: &str) -> String {
        match self.slug_for(chain_id, router) {
            Some(slug) => slug.to_string(),
            None => short_address(router),
        }
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

/// Shorten an address for display, keeping 6 leading and 4 trailing chars
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_router_lookup_is_case_insensitive() {
        let registry = DexRegistry::with_defaults();
        assert_eq!(
            registry.slug_for(1, "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
            Some("uniswap-v2")
        );
        assert_eq!(
            registry.slug_for(56, "0x10ED43C718714eb63d5aA57B78B54704E256024E"),
            Some("pancakeswap-amm")
        );
    }

    #[test]
    fn test_router_is_scoped_by_chain() {
        let registry = DexRegistry::with_defaults();
        assert_eq!(
            registry.slug_for(56, "0x7a250d5630b4cf539739df2c5dacb4c659f2488d"),
            None
        );
    }

    #[test]
    fn test_override_and_display_name() {
        let mut registry = DexRegistry::new();
        assert!(registry.is_empty());
        registry.insert(1, "0xAbC", "custom-dex");
        assert_eq!(registry.display_name(1, "0xabc"), "custom-dex");
        assert_eq!(
            registry.display_name(1, "0x1234567890abcdef1234"),
            "0x1234…1234"
        );
    }

    #[test]
    fn test_short_address_keeps_short_values() {
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
