//! Terminal rendering
//!
//! Every method returns a `String`; callers decide between stdout and
//! stderr. Styling is dropped entirely when color is disabled.

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Style};
use rust_decimal::{Decimal, RoundingStrategy};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style as TableStyle};
use tabled::{Table, Tabled};

use agent_core::RunOutcome;
use crypto_research::{NewsItem, PriceRecord, Symbol};

/// Braille spinner frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Tabled)]
struct CoinRow {
    #[tabled(rename = "Ticker")]
    ticker: &'static str,
    #[tabled(rename = "CoinGecko ID")]
    coingecko_id: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// Color only for an interactive stdout without `--no-color` or `NO_COLOR`
    pub fn detect(no_color: bool) -> Self {
        let env_opt_out = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(!no_color && !env_opt_out && std::io::stdout().is_terminal())
    }

    fn paint(&self, text: impl Display, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn header(&self) -> String {
        format!(
            "{} {}\n{}\n",
            self.paint("Crypto Research Agent", Style::new().cyan().bold()),
            self.paint(concat!("v", env!("CARGO_PKG_VERSION")), Style::new().dimmed()),
            self.paint("AI-Powered Cryptocurrency Analysis", Style::new().dimmed()),
        )
    }

    /// `$` with 2 decimals, or 6 below one dollar
    pub fn format_price(value: Option<Decimal>) -> String {
        match value {
            None => "N/A".to_string(),
            Some(v) if v >= Decimal::ONE => format!("${:.2}", round(v, 2)),
            Some(v) => format!("${:.6}", round(v, 6)),
        }
    }

    pub fn format_percent(&self, value: Option<Decimal>) -> String {
        let Some(value) = value else {
            return self.paint("N/A", Style::new().dimmed());
        };

        // Sign and color follow the raw value, so -0.001 reads "-0.00%"
        let magnitude = round(value.abs(), 2);
        if value.is_zero() {
            self.paint("0.00%", Style::new().yellow())
        } else if value.is_sign_positive() {
            self.paint(format!("+{magnitude:.2}%"), Style::new().green().bold())
        } else {
            self.paint(format!("-{magnitude:.2}%"), Style::new().red().bold())
        }
    }

    /// Dollar amount with a T/B/M/K suffix
    pub fn format_large(value: Option<Decimal>) -> String {
        const SCALES: [(i64, &str); 4] = [
            (1_000_000_000_000, "T"),
            (1_000_000_000, "B"),
            (1_000_000, "M"),
            (1_000, "K"),
        ];

        let Some(value) = value else {
            return "N/A".to_string();
        };

        for (scale, suffix) in SCALES {
            let scale = Decimal::from(scale);
            if value >= scale {
                return format!("${:.2}{suffix}", round(value / scale, 2));
            }
        }
        format!("${:.2}", round(value, 2))
    }

    pub fn format_rank(rank: Option<u32>) -> String {
        rank.map_or_else(|| "#N/A".to_string(), |r| format!("#{r}"))
    }

    pub fn price_table(&self, record: &PriceRecord) -> String {
        let rows: [(&str, String); 13] = [
            ("Current Price", Self::format_price(Some(record.price))),
            ("24h Change", self.format_percent(record.change_24h)),
            ("7d Change", self.format_percent(record.change_7d)),
            ("30d Change", self.format_percent(record.change_30d)),
            ("", String::new()),
            ("24h High", Self::format_price(record.high_24h)),
            ("24h Low", Self::format_price(record.low_24h)),
            ("", String::new()),
            ("Market Cap", Self::format_large(record.market_cap)),
            ("Market Cap Rank", Self::format_rank(record.rank)),
            ("24h Volume", Self::format_large(record.volume_24h)),
            ("", String::new()),
            ("All-Time High", Self::format_price(record.ath)),
        ];

        let mut builder = Builder::default();
        builder.push_record(["Metric".to_string(), "Value".to_string()]);
        for (label, value) in rows {
            builder.push_record([self.paint(label, Style::new().bold()), value]);
        }

        let mut table = builder.build();
        table
            .with(TableStyle::rounded())
            .modify(Columns::single(1), Alignment::right());

        format!(
            "{}\n{table}\n",
            self.paint(
                format!("{} ({})", record.name, record.symbol),
                Style::new().bold()
            )
        )
    }

    pub fn news_list(&self, symbol: Symbol, items: &[NewsItem]) -> String {
        if items.is_empty() {
            return format!(
                "  {} {}\n",
                self.paint("⚠", Style::new().yellow()),
                self.paint(
                    format!("No recent news found for {symbol}"),
                    Style::new().yellow()
                )
            );
        }

        let mut out = format!(
            "{}\n\n",
            self.paint(format!("Recent News for {symbol}"), Style::new().bold())
        );
        for (i, item) in items.iter().enumerate() {
            let mut meta = format!("Source: {}", item.source);
            if let Some(published) = item.published {
                meta.push_str(&format!(" | {}", published.format("%Y-%m-%d")));
            }

            out.push_str(&format!(
                "{} {}\n    {}\n",
                self.paint(format!("[{}]", i + 1), Style::new().blue()),
                self.paint(&item.title, Style::new().bold()),
                self.paint(meta, Style::new().dimmed()),
            ));
            if !item.link.is_empty() {
                out.push_str(&format!(
                    "    {}\n",
                    self.paint(&item.link, Style::new().cyan().underline())
                ));
            }
            out.push('\n');
        }
        out
    }

    pub fn supported_table(&self) -> String {
        let mut rows: Vec<CoinRow> = Symbol::all()
            .map(|s| CoinRow {
                ticker: s.ticker(),
                coingecko_id: s.coingecko_id(),
            })
            .collect();
        rows.sort_by_key(|r| r.ticker);

        let mut table = Table::new(rows);
        table.with(TableStyle::rounded());

        format!(
            "{}\n{table}\n\n{}\n",
            self.paint("Supported Cryptocurrencies", Style::new().bold()),
            self.paint(
                "Note: only these tickers are accepted by the price, news and research commands.",
                Style::new().dimmed()
            ),
        )
    }

    pub fn researching(&self, symbol: Symbol) -> String {
        format!(
            "{} {}\n",
            self.paint("Researching:", Style::new().bold()),
            self.paint(symbol, Style::new().cyan())
        )
    }

    /// Final report with optional tool trace and a model footer
    pub fn report(&self, symbol: Symbol, outcome: &RunOutcome, show_tools: bool) -> String {
        let session = &outcome.session;
        let mut out = String::new();

        if show_tools && !session.invocations.is_empty() {
            out.push_str(&format!("{}\n", self.paint("Tools Called", Style::new().bold())));
            for call in &session.invocations {
                let mark = if call.success {
                    self.paint("✓", Style::new().green())
                } else {
                    self.paint("×", Style::new().red())
                };
                out.push_str(&format!(
                    "  {mark} {}: {}\n",
                    self.paint(&call.tool, Style::new().cyan()),
                    call.input
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "{}\n\n{}\n\n",
            self.paint(format!("Research Report: {symbol}"), Style::new().green().bold()),
            outcome.text.trim_end()
        ));
        out.push_str(&self.paint(
            format!(
                "Model: {} | Tools used: {}",
                session.model,
                session.invocations.len()
            ),
            Style::new().dimmed(),
        ));
        out.push('\n');
        out
    }

    pub fn error_panel(&self, title: &str, message: &str) -> String {
        format!(
            "  {} {}\n\n  {message}\n",
            self.paint("×", Style::new().red()),
            self.paint(title, Style::new().red().bold()),
        )
    }

    /// Spinner on stderr; hidden when stderr is not a terminal
    pub fn spinner(message: &str) -> ProgressBar {
        if !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(SPINNER_FRAMES));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
