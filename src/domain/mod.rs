//! Core domain types and logic.

pub mod candle;
pub mod error;
pub mod evaluator;
pub mod quotes;
pub mod returns;
pub mod trade;
