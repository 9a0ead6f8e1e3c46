//! Terminal rendering of ranked quotes.
use num_format::{Locale, ToFormattedString};
use remit_common::{QuoteRequest, RankedQuotes};
use tabled::{Table, Tabled};

#[derive(Debug, Tabled)]
struct QuoteRow {
    #[tabled(rename = "#")]
    rank: String,
    provider: String,
    #[tabled(rename = "recipient gets")]
    recipient_gets: String,
    #[tabled(rename = "exchange rate")]
    exchange_rate: String,
    fee: String,
    #[tabled(rename = "vs best")]
    shortfall: String,
    link: String,
}

/// Rounds to a whole unit and groups thousands, e.g. `18,425,000`.
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    rounded.to_formatted_string(&Locale::en)
}

/// One-line heading for a result list: `1,000,000 KRW → Vietnam (VND)`.
pub fn summary_line(request: &QuoteRequest) -> String {
    format!(
        "{} KRW → {} ({})",
        request.send_amount_krw().to_formatted_string(&Locale::en),
        request.country(),
        request.currency()
    )
}

/// Table of the ranked quotes, best one marked with a star.
pub fn render_table(request: &QuoteRequest, ranked: &RankedQuotes) -> String {
    let currency = request.currency();
    let rows: Vec<QuoteRow> = ranked
        .quotes()
        .iter()
        .enumerate()
        .map(|(index, quote)| QuoteRow {
            rank: if ranked.is_best(index) {
                "★ 1".to_string()
            } else {
                (index + 1).to_string()
            },
            provider: quote.display_name().to_string(),
            recipient_gets: format!("{} {}", format_amount(quote.recipient_gets), currency),
            exchange_rate: quote.exchange_rate.to_string(),
            fee: format!("{} KRW", format_amount(quote.fee)),
            shortfall: match ranked.shortfall(index) {
                Some(gap) if gap > 0.0 => format!("-{} {}", format_amount(gap), currency),
                _ => "-".to_string(),
            },
            link: quote.link.clone(),
        })
        .collect();
    Table::new(rows).to_string()
}
