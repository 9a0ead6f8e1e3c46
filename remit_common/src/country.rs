//! Destination countries supported by the comparison and their currencies.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::QuoteError;

/// Set of supported destinations, in the order the country picker lists them.
///
/// Parsing is case-insensitive and accepts the display name, the name
/// without spaces, the ISO-3166 alpha-2 code and the currency code.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive)]
pub enum Country {
    #[strum(to_string = "Vietnam", serialize = "VN", serialize = "VND")]
    Vietnam,
    #[strum(to_string = "Nepal", serialize = "NP", serialize = "NPR")]
    Nepal,
    #[strum(to_string = "Philippines", serialize = "PH", serialize = "PHP")]
    Philippines,
    #[strum(to_string = "Thailand", serialize = "TH", serialize = "THB")]
    Thailand,
    #[strum(to_string = "Myanmar", serialize = "MM", serialize = "MMK")]
    Myanmar,
    #[strum(to_string = "Indonesia", serialize = "ID", serialize = "IDR")]
    Indonesia,
    #[strum(to_string = "Cambodia", serialize = "KH", serialize = "KHR")]
    Cambodia,
    #[strum(to_string = "Uzbekistan", serialize = "UZ", serialize = "UZS")]
    Uzbekistan,
    #[strum(
        to_string = "Sri Lanka",
        serialize = "SriLanka",
        serialize = "sri-lanka",
        serialize = "LK",
        serialize = "LKR"
    )]
    #[value(alias = "sri-lanka")]
    SriLanka,
    #[strum(to_string = "Bangladesh", serialize = "BD", serialize = "BDT")]
    Bangladesh,
}

impl Country {
    /// Destination currency code sent as `receive_currency`.
    pub fn currency(&self) -> &'static str {
        match self {
            Country::Vietnam => "VND",
            Country::Nepal => "NPR",
            Country::Philippines => "PHP",
            Country::Thailand => "THB",
            Country::Myanmar => "MMK",
            Country::Indonesia => "IDR",
            Country::Cambodia => "KHR",
            Country::Uzbekistan => "UZS",
            Country::SriLanka => "LKR",
            Country::Bangladesh => "BDT",
        }
    }

    /// ISO-3166 alpha-2 code.
    pub fn iso_code(&self) -> &'static str {
        match self {
            Country::Vietnam => "VN",
            Country::Nepal => "NP",
            Country::Philippines => "PH",
            Country::Thailand => "TH",
            Country::Myanmar => "MM",
            Country::Indonesia => "ID",
            Country::Cambodia => "KH",
            Country::Uzbekistan => "UZ",
            Country::SriLanka => "LK",
            Country::Bangladesh => "BD",
        }
    }

    /// Name sent as `receive_country`. The endpoint expects "Sri Lanka" with a space.
    pub fn api_name(&self) -> &'static str {
        match self {
            Country::Vietnam => "Vietnam",
            Country::Nepal => "Nepal",
            Country::Philippines => "Philippines",
            Country::Thailand => "Thailand",
            Country::Myanmar => "Myanmar",
            Country::Indonesia => "Indonesia",
            Country::Cambodia => "Cambodia",
            Country::Uzbekistan => "Uzbekistan",
            Country::SriLanka => "Sri Lanka",
            Country::Bangladesh => "Bangladesh",
        }
    }

    /// Every supported destination in picker order.
    pub fn all() -> impl Iterator<Item = Country> {
        Country::iter()
    }

    /// Parses free-form user text into a `Country`.
    ///
    /// Surrounding whitespace is ignored. Anything outside the supported
    /// table is rejected as `InvalidRequest`.
    pub fn parse(text: &str) -> Result<Country, QuoteError> {
        let trimmed = text.trim();
        trimmed
            .parse::<Country>()
            .map_err(|_| QuoteError::InvalidRequest(format!("unsupported country: {trimmed}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_codes_and_currencies() {
        assert_eq!(Country::parse("vietnam").unwrap(), Country::Vietnam);
        assert_eq!(Country::parse("VN").unwrap(), Country::Vietnam);
        assert_eq!(Country::parse("vnd").unwrap(), Country::Vietnam);
        assert_eq!(Country::parse(" Sri Lanka ").unwrap(), Country::SriLanka);
        assert_eq!(Country::parse("SriLanka").unwrap(), Country::SriLanka);
        assert_eq!(Country::parse("lkr").unwrap(), Country::SriLanka);
    }

    #[test]
    fn rejects_unsupported_country() {
        match Country::parse("Japan") {
            Err(QuoteError::InvalidRequest(msg)) => assert!(msg.contains("Japan")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn table_is_one_to_one() {
        let all: Vec<Country> = Country::all().collect();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0], Country::Vietnam);

        let mut currencies: Vec<&str> = all.iter().map(|c| c.currency()).collect();
        currencies.sort();
        currencies.dedup();
        assert_eq!(currencies.len(), 10);
    }

    #[test]
    fn display_matches_api_name() {
        for country in Country::all() {
            assert_eq!(country.to_string(), country.api_name());
        }
    }
}
