// src/address.rs
use alloy::primitives::Address;
use eyre::{eyre, Result};

/// Validate an EVM address string (0x prefix + 40 hex chars) and return its
/// normalized lower-case form. All downstream matching is case-insensitive,
/// so the normalized form is what the aggregator and explorer client see.
pub fn normalize(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let addr: Address = trimmed
        .parse()
        .map_err(|_| eyre!("invalid address: {}", trimmed))?;
    Ok(format!("{:#x}", addr))
}
