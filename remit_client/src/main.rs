//! Quote Client — compares remittance providers for sending KRW abroad and
//! prints the ranking, best rate first.
//!
//! Usage example (CLI):
//! ```bash
//! remit_client compare --amount 1,000,000 --country vietnam
//! remit_client --base-url http://localhost:8000 compare --amount 500000 --country nepal --staged
//! remit_client countries
//! remit_client watch --country philippines
//! ```
//!
//! In `watch` mode every stdin line of the form `<amount> [country]` starts a
//! new comparison; a line typed while a fetch is running supersedes it.
#![warn(missing_docs)]
mod args;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::Receiver;
use log::{error, info, warn};
use remit_client::render::{render_table, summary_line};
use remit_client::{FetchPhase, HttpTransport, QuoteClient, QuoteSession, SessionEvent};
use remit_common::request::parse_amount;
use remit_common::{ClientConfig, Country, QuoteError, QuoteRequest, RankedQuotes, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::args::{Args, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();

    let mut config = ClientConfig::with_base_url(&args.base_url)?;
    config.first_attempt_timeout = Duration::from_secs(args.timeout_secs);
    config.retry_timeout = Duration::from_secs(args.retry_timeout_secs);
    info!("Using quote API at {}", config.base_url());

    match args.cmd {
        Command::Countries => {
            for country in Country::all() {
                println!(
                    "{:<12} {}  {}",
                    country.to_string(),
                    country.iso_code(),
                    country.currency()
                );
            }
            Ok(())
        }
        Command::Compare {
            amount,
            country,
            staged,
            json,
        } => {
            let request = QuoteRequest::new(parse_amount(&amount)?, country)?;
            let client = QuoteClient::new(HttpTransport::new()?, config);
            compare(&client, &request, staged, json).await
        }
        Command::Watch { country } => {
            let client = QuoteClient::new(HttpTransport::new()?, config);
            watch(client, country).await
        }
    }
}

async fn compare(
    client: &QuoteClient<HttpTransport>,
    request: &QuoteRequest,
    staged: bool,
    json: bool,
) -> Result<()> {
    let outcome = if staged {
        client
            .fetch_staged(request, |partial| {
                info!("{} providers so far", partial.len());
            })
            .await
    } else {
        client
            .fetch_quotes_observed(request, |phase| {
                if let FetchPhase::Retrying { .. } = phase {
                    info!("Server is warming up, retrying...");
                }
            })
            .await
    };

    match outcome {
        Ok(ranked) if json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        Ok(ranked) => print_ranked(request, &ranked),
        Err(QuoteError::NoProvidersAvailable) => {
            println!("{}: no exchange rate providers available", summary_line(request));
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

async fn watch(client: QuoteClient<HttpTransport>, default_country: Country) -> Result<()> {
    let (mut session, events) = QuoteSession::new(Arc::new(client))?;
    let printer = thread::spawn(move || print_events(events));

    info!("Type \"<amount> [country]\" and press Enter. Ctrl+C to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received. Shutting down client...");
                session.cancel().await?;
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => match parse_watch_line(&line, default_country) {
                    Ok(request) => {
                        session.submit(request)?;
                    }
                    Err(e) => warn!("{}", e),
                },
                None => {
                    session.wait().await?;
                    break;
                }
            }
        }
    }

    drop(session);
    if printer.join().is_err() {
        error!("Event printer thread panicked");
    }
    Ok(())
}

/// Parses `<amount> [country]`; the country may contain spaces ("Sri Lanka").
fn parse_watch_line(line: &str, default_country: Country) -> Result<QuoteRequest> {
    let line = line.trim();
    let (amount, country) = match line.split_once(char::is_whitespace) {
        Some((amount, rest)) => (amount, Country::parse(rest)?),
        None => (line, default_country),
    };
    QuoteRequest::new(parse_amount(amount)?, country)
}

fn print_events(events: Receiver<SessionEvent>) {
    for event in events.iter() {
        match event {
            SessionEvent::Started {
                generation,
                request,
            } => println!("[#{}] comparing {} ...", generation, summary_line(&request)),
            SessionEvent::Retrying { generation } => {
                println!("[#{}] server is warming up, retrying...", generation)
            }
            SessionEvent::Ready {
                generation,
                request,
                quotes,
            } => {
                println!("[#{}]", generation);
                print_ranked(&request, &quotes);
            }
            SessionEvent::NoProviders { generation } => {
                println!("[#{}] no exchange rate providers available", generation)
            }
            SessionEvent::Failed {
                generation,
                message,
            } => println!("[#{}] {}", generation, message),
        }
    }
    info!("Event printer stopping...");
}

fn print_ranked(request: &QuoteRequest, ranked: &RankedQuotes) {
    println!("{}", summary_line(request));
    println!("{}", render_table(request, ranked));
    if let Some(best) = ranked.best() {
        println!(
            "Best rate: {} ({})",
            best.display_name(),
            best.link
        );
    }
    println!("Fetched at {}", ranked.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"));
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_line_with_and_without_country() {
        let request = parse_watch_line("1,000,000", Country::Nepal).unwrap();
        assert_eq!(request.country(), Country::Nepal);
        assert_eq!(request.send_amount_krw(), 1_000_000);

        let request = parse_watch_line(" 500000 Sri Lanka ", Country::Nepal).unwrap();
        assert_eq!(request.country(), Country::SriLanka);

        assert!(parse_watch_line("5000 vietnam", Country::Nepal).is_err());
        assert!(parse_watch_line("100000 Mars", Country::Nepal).is_err());
    }
}
