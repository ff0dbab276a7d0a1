// src/market/universe.rs
use crate::types::InstrumentMeta;

/// Reference prices as of Feb 19-20, 2026.
pub const UNIVERSE: [InstrumentMeta; 6] = [
    InstrumentMeta {
        ticker: "NVDA",
        name: "NVIDIA Corp",
        sector: "Semiconductors",
        base_price: 187.71,
        market_cap: 4580e9,
        pe: 52.3,
        eps: 2.59,
        dividend_yield: 0.03,
        beta: 1.97,
        high_52w: 212.19,
        low_52w: 86.62,
        color: "#f59e0b",
        shares: 5,
        snapshot_seed: 1,
        history_seed: 11,
    },
    InstrumentMeta {
        ticker: "MSFT",
        name: "Microsoft Corp",
        sector: "Technology",
        base_price: 403.02,
        market_cap: 2990e9,
        pe: 32.1,
        eps: 12.50,
        dividend_yield: 0.82,
        beta: 0.90,
        high_52w: 555.45,
        low_52w: 344.79,
        color: "#10b981",
        shares: 3,
        snapshot_seed: 2,
        history_seed: 22,
    },
    InstrumentMeta {
        ticker: "LLY",
        name: "Eli Lilly & Co",
        sector: "Pharma",
        base_price: 1021.45,
        market_cap: 968e9,
        pe: 71.4,
        eps: 14.30,
        dividend_yield: 0.74,
        beta: 0.42,
        high_52w: 1133.95,
        low_52w: 623.78,
        color: "#0ea5e9",
        shares: 1,
        snapshot_seed: 3,
        history_seed: 33,
    },
    InstrumentMeta {
        ticker: "TSLA",
        name: "Tesla Inc",
        sector: "EV / Clean Energy",
        base_price: 417.32,
        market_cap: 1320e9,
        pe: 118.9,
        eps: 3.46,
        dividend_yield: 0.00,
        beta: 2.31,
        high_52w: 488.54,
        low_52w: 138.80,
        color: "#f43f5e",
        shares: 4,
        snapshot_seed: 4,
        history_seed: 44,
    },
    InstrumentMeta {
        ticker: "ASML",
        name: "ASML Holding NV",
        sector: "Semiconductors",
        base_price: 1440.00,
        market_cap: 566e9,
        pe: 50.3,
        eps: 29.03,
        dividend_yield: 0.60,
        beta: 1.88,
        high_52w: 1493.47,
        low_52w: 578.51,
        color: "#7c3aed",
        shares: 1,
        snapshot_seed: 5,
        history_seed: 55,
    },
    InstrumentMeta {
        ticker: "CRWD",
        name: "CrowdStrike Holdings",
        sector: "Cybersecurity",
        base_price: 429.75,
        market_cap: 105e9,
        pe: 480.2,
        eps: 0.87,
        dividend_yield: 0.00,
        beta: 1.12,
        high_52w: 447.62,
        low_52w: 198.21,
        color: "#06b6d4",
        shares: 2,
        snapshot_seed: 6,
        history_seed: 66,
    },
];

pub fn lookup(ticker: &str) -> Option<&'static InstrumentMeta> {
    UNIVERSE.iter().find(|m| m.ticker.eq_ignore_ascii_case(ticker))
}
