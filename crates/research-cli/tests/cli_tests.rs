//! CLI integration tests.
//!
//! Upstream services are replaced by one-shot HTTP stubs on localhost and
//! wired in through the endpoint override variables.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use predicates::prelude::*;

fn crypto_research() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crypto-research"));
    cmd.env("NO_PROXY", "127.0.0.1")
        .env("NO_COLOR", "1")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("RUST_LOG");
    cmd
}

/// Serve a single JSON response; the handle yields the raw request line
fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request_line
    });

    (url, handle)
}

fn bitcoin_body() -> String {
    serde_json::json!({
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "market_cap_rank": 1,
        "market_data": {
            "current_price": {"usd": 67234.56},
            "price_change_percentage_24h": 2.34,
            "price_change_percentage_7d": -1.5,
            "market_cap": {"usd": 1_320_000_000_000_u64},
            "total_volume": {"usd": 28_500_000_000_u64},
            "high_24h": {"usd": 68000.0},
            "low_24h": {"usd": 65500.0},
            "ath": {"usd": 73738.0}
        }
    })
    .to_string()
}

#[test]
fn test_help() {
    crypto_research()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("research"))
        .stdout(predicate::str::contains("price"))
        .stdout(predicate::str::contains("news"))
        .stdout(predicate::str::contains("supported"));
}

#[test]
fn test_supported_lists_coins() {
    crypto_research()
        .arg("supported")
        .assert()
        .success()
        .stdout(predicate::str::contains("BTC"))
        .stdout(predicate::str::contains("bitcoin"))
        .stdout(predicate::str::contains("avalanche-2"));
}

#[test]
fn test_price_against_stub() {
    let (url, server) = serve_once("200 OK", bitcoin_body());

    crypto_research()
        .args(["price", "btc"])
        .env("COINGECKO_API_URL", &url)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bitcoin (BTC)"))
        .stdout(predicate::str::contains("$67234.56"))
        .stdout(predicate::str::contains("+2.34%"))
        .stdout(predicate::str::contains("-1.50%"))
        .stdout(predicate::str::contains("$1.32T"))
        .stdout(predicate::str::contains("#1"));

    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("GET /coins/bitcoin?"));
}

#[test]
fn test_price_upstream_error_exits_nonzero() {
    let (url, server) = serve_once("500 Internal Server Error", "{}".into());

    crypto_research()
        .args(["price", "ETH"])
        .env("COINGECKO_API_URL", &url)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("coingecko"));

    server.join().unwrap();
}

#[test]
fn test_unsupported_symbol_fails_before_network() {
    crypto_research()
        .args(["price", "NOTACOIN"])
        .env("COINGECKO_API_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid Input"))
        .stderr(predicate::str::contains("Unsupported symbol"));

    crypto_research()
        .args(["news", "NOTACOIN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported symbol"));
}

#[test]
fn test_news_limit_out_of_range_is_a_usage_error() {
    crypto_research()
        .args(["news", "BTC", "--limit", "18446744073709551615"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--limit"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_research_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();

    crypto_research()
        .args(["research", "BTC"])
        .current_dir(dir.path())
        .env_remove("ANTHROPIC_API_KEY")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration Error"))
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_research_prints_report() {
    let dir = tempfile::tempdir().unwrap();
    let body = serde_json::json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "content": [{"type": "text", "text": "# Bitcoin Brief\n\nPrice is steady."}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 120, "output_tokens": 12}
    })
    .to_string();
    let (url, server) = serve_once("200 OK", body);

    crypto_research()
        .args(["research", "BTC", "--model", "claude-test"])
        .current_dir(dir.path())
        .env("ANTHROPIC_API_KEY", "sk-test")
        .env("ANTHROPIC_BASE_URL", &url)
        .assert()
        .success()
        .stdout(predicate::str::contains("Researching: BTC"))
        .stdout(predicate::str::contains("Research Report: BTC"))
        .stdout(predicate::str::contains("# Bitcoin Brief"))
        .stdout(predicate::str::contains("Model: claude-test | Tools used: 0"));

    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("POST /v1/messages"));
}

#[test]
fn test_research_auth_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
    let (url, server) = serve_once("401 Unauthorized", body.into());

    crypto_research()
        .args(["research", "SOL"])
        .current_dir(dir.path())
        .env("ANTHROPIC_API_KEY", "sk-bad")
        .env("ANTHROPIC_BASE_URL", &url)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Authentication failed"));

    server.join().unwrap();
}
