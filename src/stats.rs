// src/stats.rs
//
// Pure per-wallet aggregation: turns the explorer's raw transaction and
// transfer lists into the derived WalletStats record. No I/O, no shared
// state; safe to run concurrently for different addresses.
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::FromStr;
use rust_decimal::Decimal;

use crate::models::{Erc20Transfer, InternalTx, NftTransfer, NormalTx, WalletStats};

/// Parse a wei amount from an explorer decimal string. Explorers
/// occasionally return empty or non-numeric value fields; those degrade to
/// zero instead of failing the aggregation. Every numeric field in this
/// module goes through here so the policy stays in one place.
pub fn parse_wei(s: &str) -> Decimal {
    Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO)
}

/// Convert a wei amount to the display unit (1 ETH = 10^18 wei).
pub fn wei_to_eth(wei: Decimal) -> Decimal {
    wei / Decimal::from(10u64.pow(18))
}

/// Gaps in hours between consecutive distinct timestamps, sorted ascending.
/// Fewer than two distinct values means no cadence can be measured and the
/// result is empty.
pub fn transaction_intervals(times: &[DateTime<Utc>]) -> Vec<f64> {
    let mut sorted: Vec<DateTime<Utc>> = times.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / 3600.0)
        .collect();
    gaps.sort_by(|a, b| a.partial_cmp(b).expect("interval is finite"));
    gaps
}

/// Whole 30-day months between the earliest timestamp and `now`. Defined for
/// a single timestamp; zero when the list is empty.
pub fn wallet_age_months(times: &[DateTime<Utc>], now: DateTime<Utc>) -> i64 {
    match times.iter().min() {
        Some(first) => (now - *first).num_days() / 30,
        None => 0,
    }
}

/// Sum of internal-transaction values (wei) whose hash appears in `hashes`.
/// Many-to-many by exact hash equality: one hash may match several internal
/// transactions and all of them count; an unmatched hash contributes zero.
pub fn tokens_sum(hashes: &HashSet<&str>, internal: &[InternalTx]) -> Decimal {
    internal
        .iter()
        .filter(|tx| hashes.contains(tx.hash.as_str()))
        .map(|tx| parse_wei(&tx.value))
        .sum()
}

/// Aggregate one wallet's history into a WalletStats record. Reads the clock
/// exactly once so every time-derived field sees the same instant.
pub fn compute(
    address: &str,
    balance: &str,
    normal: &[NormalTx],
    internal: &[InternalTx],
    nft: &[NftTransfer],
    erc20: &[Erc20Transfer],
) -> WalletStats {
    compute_at(Utc::now(), address, balance, normal, internal, nft, erc20)
}

pub fn compute_at(
    now: DateTime<Utc>,
    address: &str,
    balance: &str,
    normal: &[NormalTx],
    internal: &[InternalTx],
    nft: &[NftTransfer],
    erc20: &[Erc20Transfer],
) -> WalletStats {
    // A wallet with no history, or with a single distinct timestamp, has no
    // cadence to measure; the whole record is unusable, not partial.
    if normal.is_empty() {
        return WalletStats::no_data();
    }

    let times: Vec<DateTime<Utc>> = normal.iter().filter_map(|tx| tx.time()).collect();
    let intervals = transaction_intervals(&times);
    if intervals.is_empty() {
        return WalletStats::no_data();
    }

    let address = address.to_lowercase();

    // NFT events by direction relative to the wallet. Tokens that were both
    // bought and later sold ("matched") estimate acquisition cost of sold
    // items; never-sold buys are the still-held inventory.
    let sold: Vec<&NftTransfer> = nft
        .iter()
        .filter(|t| t.from().to_lowercase() == address)
        .collect();
    let sold_uids: HashSet<String> = sold.iter().map(|t| t.token_uid()).collect();
    let (bought_matched, bought_unmatched): (Vec<&NftTransfer>, Vec<&NftTransfer>) = nft
        .iter()
        .filter(|t| t.to().to_lowercase() == address)
        .partition(|t| sold_uids.contains(&t.token_uid()));

    // Marketplaces settle payment via an internal transaction on the same
    // top-level hash as the transfer event, so the matched internal value
    // approximates sale price.
    let sold_sum = tokens_sum(&sold.iter().map(|t| t.hash()).collect(), internal);
    let buy_sum = tokens_sum(&bought_matched.iter().map(|t| t.hash()).collect(), internal);
    let buy_not_sold_sum =
        tokens_sum(&bought_unmatched.iter().map(|t| t.hash()).collect(), internal);

    // Net-position proxy: total events minus sold events. Not a true
    // current-balance count (mints without a transfer-in event skew it), but
    // downstream weighting expects exactly this quantity.
    let holding = nft.len() as i64 - sold.len() as i64;

    // Average sold/bought price ratio applied to never-sold inventory.
    let nft_worth = if buy_sum.is_zero() {
        Decimal::ZERO
    } else {
        sold_sum / buy_sum * buy_not_sold_sum
    };

    let deployed_contracts = normal
        .iter()
        .filter(|tx| !tx.contract_address.is_empty())
        .count();

    let distinct_symbols: HashSet<&str> =
        erc20.iter().map(|t| t.token_symbol.as_str()).collect();

    let turnover: Decimal = normal.iter().map(|tx| parse_wei(&tx.value)).sum();

    let month_ago = now - Duration::days(30);
    let last_month_transactions = times.iter().filter(|t| **t > month_ago).count();

    // times is non-empty here: intervals required two distinct values.
    let latest = times.iter().max().copied().unwrap_or(now);
    let time_from_last_transaction = (now - latest).num_days() / 30;

    let average = intervals.iter().sum::<f64>() / intervals.len() as f64;

    WalletStats {
        balance: wei_to_eth(parse_wei(balance)),
        no_data: false,
        wallet_age: wallet_age_months(&times, now),
        total_transactions: normal.len(),
        min_transaction_time: intervals[0],
        max_transaction_time: intervals[intervals.len() - 1],
        average_transaction_time: average,
        wallet_turnover: wei_to_eth(turnover),
        last_month_transactions,
        time_from_last_transaction,
        nft_holding: holding,
        nft_trading: wei_to_eth(sold_sum - buy_sum),
        nft_worth: wei_to_eth(nft_worth),
        deployed_contracts,
        tokens_holding: distinct_symbols.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NftTransferFields;

    const HOUR: i64 = 3600;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn tx(secs: i64, value: &str) -> NormalTx {
        NormalTx {
            hash: format!("0xtx{}", secs),
            timestamp: secs.to_string(),
            value: value.to_string(),
            contract_address: String::new(),
        }
    }

    fn itx(hash: &str, value: &str) -> InternalTx {
        InternalTx {
            hash: hash.to_string(),
            value: value.to_string(),
        }
    }

    fn nft(hash: &str, from: &str, to: &str, contract: &str, id: &str) -> NftTransfer {
        NftTransfer::Erc721(NftTransferFields {
            hash: hash.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            contract_address: contract.to_string(),
            token_id: id.to_string(),
        })
    }

    fn eth(n: u64) -> String {
        format!("{}000000000000000000", n)
    }

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
    const OTHER: &str = "0x00000000000000000000000000000000000000ff";

    #[test]
    fn empty_history_yields_no_data() {
        let stats = compute_at(at(0), WALLET, "0", &[], &[], &[], &[]);
        assert!(stats.no_data);
        assert_eq!(stats, WalletStats::no_data());
    }

    #[test]
    fn single_distinct_timestamp_yields_no_data() {
        let normal = vec![tx(1000, "1"), tx(1000, "2"), tx(1000, "3")];
        let stats = compute_at(at(2000), WALLET, "0", &normal, &[], &[], &[]);
        assert!(stats.no_data);
    }

    #[test]
    fn intervals_are_sorted_gaps_between_distinct_times() {
        // 0h, 3h, 4h -> gaps [3, 1] -> sorted [1, 3]
        let times = vec![at(4 * HOUR), at(0), at(3 * HOUR), at(0)];
        assert_eq!(transaction_intervals(&times), vec![1.0, 3.0]);
    }

    #[test]
    fn fewer_than_two_distinct_times_means_no_intervals() {
        assert!(transaction_intervals(&[]).is_empty());
        assert!(transaction_intervals(&[at(5)]).is_empty());
        assert!(transaction_intervals(&[at(5), at(5)]).is_empty());
    }

    #[test]
    fn interval_stats_cover_min_max_average() {
        let normal = vec![tx(0, "0"), tx(HOUR, "0"), tx(3 * HOUR, "0")];
        let stats = compute_at(at(10 * HOUR), WALLET, "0", &normal, &[], &[], &[]);
        assert_eq!(stats.min_transaction_time, 1.0);
        assert_eq!(stats.max_transaction_time, 2.0);
        assert_eq!(stats.average_transaction_time, 1.5);
        assert_eq!(stats.total_transactions, 3);
    }

    #[test]
    fn tokens_sum_matches_hashes_many_to_many() {
        let internal = vec![itx("h1", "100"), itx("h1", "50"), itx("h2", "9")];
        let hashes: HashSet<&str> = ["h1"].into_iter().collect();
        assert_eq!(tokens_sum(&hashes, &internal), Decimal::from(150));
    }

    #[test]
    fn tokens_sum_treats_malformed_value_as_zero() {
        let internal = vec![itx("h1", "garbage"), itx("h1", "7")];
        let hashes: HashSet<&str> = ["h1"].into_iter().collect();
        assert_eq!(tokens_sum(&hashes, &internal), Decimal::from(7));
    }

    #[test]
    fn nft_worth_is_zero_without_matched_buys() {
        let normal = vec![tx(0, "0"), tx(HOUR, "0")];
        // Sold a token that was never bought back in: sold_sum > 0, buy_sum = 0.
        let nfts = vec![nft("hs", WALLET, OTHER, "0xc", "1")];
        let internal = vec![itx("hs", &eth(200))];
        let stats = compute_at(at(2 * HOUR), WALLET, "0", &normal, &internal, &nfts, &[]);
        assert_eq!(stats.nft_worth, Decimal::ZERO);
        assert_eq!(stats.nft_trading, Decimal::from(200));
    }

    #[test]
    fn nft_worth_scales_held_inventory_by_price_ratio() {
        let normal = vec![tx(0, "0"), tx(HOUR, "0")];
        let nfts = vec![
            nft("hs", WALLET, OTHER, "0xc", "1"),  // sold token 1
            nft("hb", OTHER, WALLET, "0xC", "1"),  // bought token 1 (matched, case-insensitive uid)
            nft("hn", OTHER, WALLET, "0xc", "2"),  // bought token 2, still held
        ];
        let internal = vec![
            itx("hs", &eth(200)),
            itx("hb", &eth(100)),
            itx("hn", &eth(50)),
        ];
        let stats = compute_at(at(2 * HOUR), WALLET, "0", &normal, &internal, &nfts, &[]);
        // ratio 200/100 applied to the 50 of never-sold inventory
        assert_eq!(stats.nft_worth, Decimal::from(100));
        assert_eq!(stats.nft_trading, Decimal::from(100));
        // total events (3) minus sold events (1)
        assert_eq!(stats.nft_holding, 2);
    }

    #[test]
    fn nft_direction_matching_ignores_address_case() {
        let normal = vec![tx(0, "0"), tx(HOUR, "0")];
        let nfts = vec![nft("hs", &WALLET.to_uppercase().replace("0X", "0x"), OTHER, "0xc", "1")];
        let stats = compute_at(at(2 * HOUR), WALLET, "0", &normal, &[], &nfts, &[]);
        // Counted as sold despite the casing difference.
        assert_eq!(stats.nft_holding, 0);
    }

    #[test]
    fn time_from_last_transaction_is_floored_30_day_months() {
        let now = at(200 * 24 * HOUR);
        let latest = now - Duration::days(95);
        let first = now - Duration::days(100);
        let normal = vec![tx(first.timestamp(), "0"), tx(latest.timestamp(), "0")];
        let stats = compute_at(now, WALLET, "0", &normal, &[], &[], &[]);
        assert_eq!(stats.time_from_last_transaction, 3);
        assert_eq!(stats.wallet_age, 3); // 100 days -> 3 whole months
    }

    #[test]
    fn last_month_count_excludes_exact_30_day_boundary() {
        let now = at(400 * 24 * HOUR);
        let boundary = now - Duration::days(30);
        let inside = now - Duration::days(29);
        let old = now - Duration::days(60);
        let normal = vec![
            tx(boundary.timestamp(), "0"),
            tx(inside.timestamp(), "0"),
            tx(old.timestamp(), "0"),
        ];
        let stats = compute_at(now, WALLET, "0", &normal, &[], &[], &[]);
        assert_eq!(stats.last_month_transactions, 1);
    }

    #[test]
    fn turnover_and_balance_convert_to_display_units() {
        let normal = vec![tx(0, &eth(3)), tx(HOUR, &eth(2)), tx(2 * HOUR, "junk")];
        let stats = compute_at(at(3 * HOUR), WALLET, &eth(7), &normal, &[], &[], &[]);
        // malformed value contributes zero, not an error
        assert_eq!(stats.wallet_turnover, Decimal::from(5));
        assert_eq!(stats.balance, Decimal::from(7));
    }

    #[test]
    fn counts_deployed_contracts_and_distinct_token_symbols() {
        let mut deploy = tx(0, "0");
        deploy.contract_address = "0xdeadbeef".into();
        let normal = vec![deploy, tx(HOUR, "0")];
        let erc20 = vec![
            Erc20Transfer { token_symbol: "USDC".into() },
            Erc20Transfer { token_symbol: "DAI".into() },
            Erc20Transfer { token_symbol: "USDC".into() },
        ];
        let stats = compute_at(at(2 * HOUR), WALLET, "0", &normal, &[], &[], &erc20);
        assert_eq!(stats.deployed_contracts, 1);
        assert_eq!(stats.tokens_holding, 2);
    }

    #[test]
    fn compute_is_idempotent_for_a_fixed_instant() {
        let now = at(500 * 24 * HOUR);
        let normal = vec![tx(0, &eth(1)), tx(HOUR, &eth(2)), tx(5 * HOUR, "3")];
        let internal = vec![itx("hs", &eth(4))];
        let nfts = vec![nft("hs", WALLET, OTHER, "0xc", "9")];
        let erc20 = vec![Erc20Transfer { token_symbol: "WETH".into() }];
        let a = compute_at(now, WALLET, &eth(10), &normal, &internal, &nfts, &erc20);
        let b = compute_at(now, WALLET, &eth(10), &normal, &internal, &nfts, &erc20);
        assert_eq!(a, b);
        assert!(!a.no_data);
    }

    #[test]
    fn parse_wei_coerces_garbage_to_zero() {
        assert_eq!(parse_wei(""), Decimal::ZERO);
        assert_eq!(parse_wei("0x10"), Decimal::ZERO);
        assert_eq!(parse_wei(" 42 "), Decimal::from(42));
    }
}
