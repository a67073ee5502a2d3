//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading and worker resolution
//! - Market-data backend selection
//! - The `symbols`, `closing` and `returns` commands run as a binary against
//!   CSV price files (no network)

mod common;

use common::*;
use qmoney::adapters::file_config_adapter::FileConfigAdapter;
use qmoney::cli;
use qmoney::domain::error::QmoneyError;
use qmoney::ports::market_data_port::MarketDataPort;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const TRADES_JSON: &str = r#"[
  {"symbol": "MSFT", "quantity": 10, "tradeType": "BUY", "purchaseDate": "2019-01-02"},
  {"symbol": "AAPL", "quantity": 5, "tradeType": "BUY", "purchaseDate": "2019-01-02"},
  {"symbol": "GOOGL", "quantity": 1, "tradeType": "BUY", "purchaseDate": "2019-01-02"}
]"#;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Trade file plus one CSV per symbol. GOOGL's rows are out of order.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("trades.json"), TRADES_JSON).unwrap();

    let prices = dir.path().join("prices");
    fs::create_dir(&prices).unwrap();
    fs::write(
        prices.join("MSFT.csv"),
        "date,open,high,low,close,volume\n\
         2019-01-02,99.55,101.75,98.94,101.12,35329345\n\
         2019-12-12,151.65,153.44,151.02,153.24,24612100\n",
    )
    .unwrap();
    fs::write(
        prices.join("AAPL.csv"),
        "date,open,high,low,close,volume\n\
         2019-01-02,154.89,158.85,154.23,157.92,37039737\n\
         2019-12-12,267.78,272.56,267.32,271.46,34327600\n",
    )
    .unwrap();
    fs::write(
        prices.join("GOOGL.csv"),
        "date,open,high,low,close,volume\n\
         2019-12-12,1345.94,1355.78,1340.50,1350.27,1287810\n\
         2019-01-02,1027.20,1060.79,1025.28,1054.68,1593395\n",
    )
    .unwrap();
    dir
}

fn qmoney(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_qmoney"))
        .args(args)
        .env_remove("TIINGO_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn no_config_file_is_empty_config() {
        let config = cli::load_config(None).unwrap();
        assert_eq!(cli::resolve_workers(None, &config).unwrap(), None);
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let err = cli::load_config(Some(Path::new("/nonexistent/qmoney.ini")))
            .err()
            .unwrap();
        assert!(matches!(err, QmoneyError::ConfigParse { .. }));
    }

    #[test]
    fn workers_from_config() {
        let ini = write_temp_ini("[evaluation]\nworkers = 4\n");
        let config = cli::load_config(Some(ini.path())).unwrap();
        assert_eq!(cli::resolve_workers(None, &config).unwrap(), Some(4));
    }

    #[test]
    fn workers_flag_overrides_config() {
        let config = FileConfigAdapter::from_string("[evaluation]\nworkers = 4\n").unwrap();
        assert_eq!(cli::resolve_workers(Some(2), &config).unwrap(), Some(2));
    }

    #[test]
    fn non_positive_workers_in_config_is_invalid() {
        for raw in ["0", "-3", "lots"] {
            let config =
                FileConfigAdapter::from_string(&format!("[evaluation]\nworkers = {raw}\n"))
                    .unwrap();
            let err = cli::resolve_workers(None, &config).unwrap_err();
            assert!(matches!(err, QmoneyError::ConfigInvalid { ref key, .. } if key == "workers"));
        }
    }
}

mod backend_selection {
    use super::*;

    #[test]
    fn csv_dir_flag_selects_csv() {
        let dir = fixture();
        let config = FileConfigAdapter::empty();
        let port = cli::build_market_data(&config, Some(dir.path().join("prices").as_path())).unwrap();
        let candles = port
            .fetch_candles("MSFT", date(2019, 1, 1), date(2019, 12, 31))
            .unwrap();
        assert_eq!(candles.len(), 2);
    }

    #[test]
    fn csv_dir_from_config() {
        let dir = fixture();
        let ini = format!(
            "[market_data]\ncsv_dir = {}\n",
            path_str(&dir.path().join("prices"))
        );
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        let port = cli::build_market_data(&config, None).unwrap();
        assert!(port
            .fetch_candles("AAPL", date(2019, 1, 1), date(2019, 12, 31))
            .is_ok());
    }

    #[test]
    fn tiingo_from_config_token() {
        let config = FileConfigAdapter::from_string("[tiingo]\ntoken = abc\n").unwrap();
        assert!(cli::build_market_data(&config, None).is_ok());
    }
}

mod commands {
    use super::*;

    #[test]
    fn run_symbols_keeps_file_order() {
        let dir = fixture();
        let json = cli::run_symbols(path_str(&dir.path().join("trades.json"))).unwrap();
        let symbols: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(symbols, vec!["MSFT", "AAPL", "GOOGL"]);
    }

    #[test]
    fn compute_returns_sequential_and_parallel_agree() {
        let dir = fixture();
        let port = cli::build_market_data(&FileConfigAdapter::empty(), Some(dir.path().join("prices").as_path()))
            .unwrap();
        let trades = vec![
            trade("MSFT", "2019-01-02"),
            trade("AAPL", "2019-01-02"),
            trade("GOOGL", "2019-01-02"),
        ];

        let sequential =
            cli::compute_returns(port.as_ref(), &trades, date(2019, 12, 12), None).unwrap();
        let parallel =
            cli::compute_returns(port.as_ref(), &trades, date(2019, 12, 12), Some(3)).unwrap();
        assert_eq!(sequential, parallel);

        let order: Vec<_> = sequential.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn symbols_binary_prints_json() {
        let dir = fixture();
        let out = qmoney(&["symbols", path_str(&dir.path().join("trades.json"))]);
        assert!(out.status.success());
        let symbols: Vec<String> = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(symbols, vec!["MSFT", "AAPL", "GOOGL"]);
    }

    #[test]
    fn closing_binary_orders_by_close() {
        let dir = fixture();
        let out = qmoney(&[
            "closing",
            path_str(&dir.path().join("trades.json")),
            "2019-12-12",
            "--csv-dir",
            path_str(&dir.path().join("prices")),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        let symbols: Vec<String> = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(symbols, vec!["MSFT", "AAPL", "GOOGL"]);
    }

    #[test]
    fn returns_binary_with_workers() {
        let dir = fixture();
        let out = qmoney(&[
            "returns",
            path_str(&dir.path().join("trades.json")),
            "2019-12-12",
            "--workers",
            "2",
            "--csv-dir",
            path_str(&dir.path().join("prices")),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

        let results: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["symbol"], "AAPL");
        let total = results[0]["totalReturn"].as_f64().unwrap();
        assert!((total - (271.46 - 154.89) / 154.89).abs() < 1e-9);
        assert!(results[0]["annualizedReturn"].as_f64().unwrap() > total);
    }

    #[test]
    fn returns_binary_reports_missing_data_as_null() {
        let dir = fixture();
        fs::remove_file(dir.path().join("prices").join("GOOGL.csv")).unwrap();
        let out = qmoney(&[
            "returns",
            path_str(&dir.path().join("trades.json")),
            "2019-12-12",
            "--csv-dir",
            path_str(&dir.path().join("prices")),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

        let results: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(results[2]["symbol"], "GOOGL");
        assert!(results[2]["annualizedReturn"].is_null());
        assert!(results[2]["totalReturn"].is_null());
    }

    #[test]
    fn returns_binary_fails_fast_in_parallel() {
        let dir = fixture();
        fs::remove_file(dir.path().join("prices").join("GOOGL.csv")).unwrap();
        let out = qmoney(&[
            "returns",
            path_str(&dir.path().join("trades.json")),
            "2019-12-12",
            "-w",
            "2",
            "--csv-dir",
            path_str(&dir.path().join("prices")),
        ]);
        assert_eq!(out.status.code(), Some(5));
        assert!(out.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("GOOGL"), "{stderr}");
    }

    #[test]
    fn returns_binary_rejects_end_before_purchase() {
        let dir = fixture();
        let out = qmoney(&[
            "returns",
            path_str(&dir.path().join("trades.json")),
            "2018-12-31",
            "--csv-dir",
            path_str(&dir.path().join("prices")),
        ]);
        assert_eq!(out.status.code(), Some(4));
    }

    #[test]
    fn returns_binary_without_token_is_config_error() {
        let dir = fixture();
        let out = qmoney(&[
            "returns",
            path_str(&dir.path().join("trades.json")),
            "2019-12-12",
        ]);
        assert_eq!(out.status.code(), Some(2));
        assert!(String::from_utf8_lossy(&out.stderr).contains("token"));
    }

    #[test]
    fn missing_trade_file_exit_code() {
        let out = qmoney(&["symbols", "/nonexistent/trades.json"]);
        assert_eq!(out.status.code(), Some(3));
    }
}
