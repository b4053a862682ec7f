//! American Community Survey client for table `B19001`.
//!
//! Uses the Census Data API to fetch household income bracket counts for a
//! single tract. A key is optional for low request volumes.

use async_trait::async_trait;
use serde::Deserialize;
use venue_profile_tract_models::{
    BRACKET_COUNT, INCOME_BRACKETS, IncomeBracketCounts, TractLocation,
    brackets::RESPONDENTS_VARIABLE,
};

use crate::{DataUnavailableError, IncomeStatistics};

/// Maximum length of a response body included in error messages.
const BODY_PREVIEW_LEN: usize = 300;

/// Census Data API location of the ACS dataset to query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AcsConfig {
    /// API base URL (e.g. `"https://api.census.gov/data"`).
    pub base_url: String,
    /// Survey year.
    pub year: u16,
    /// Dataset path (e.g. `"acs/acs5"`).
    pub dataset: String,
}

impl AcsConfig {
    /// The configuration embedded from `services/acs.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the file is embedded).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(include_str!("../services/acs.toml"))
            .unwrap_or_else(|e| panic!("Failed to parse embedded ACS config: {e}"))
    }
}

/// ACS client for a fixed dataset and year.
#[derive(Debug, Clone)]
pub struct AcsClient {
    client: reqwest::Client,
    config: AcsConfig,
    api_key: Option<String>,
}

impl AcsClient {
    /// Creates a client for `config`.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: AcsConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Builds the request URL for one tract.
    fn url(&self, tract: &TractLocation) -> String {
        let variables = std::iter::once(RESPONDENTS_VARIABLE)
            .chain(INCOME_BRACKETS.iter().map(|b| b.variable))
            .collect::<Vec<_>>()
            .join(",");

        let mut url = format!(
            "{base}/{year}/{dataset}\
             ?get={variables}\
             &for=tract:{tract}\
             &in=state:{state}%20county:{county}",
            base = self.config.base_url,
            year = self.config.year,
            dataset = self.config.dataset,
            tract = tract.tract_id,
            state = tract.state_id,
            county = tract.county_id,
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

#[async_trait]
impl IncomeStatistics for AcsClient {
    async fn bracket_counts(
        &self,
        tract: &TractLocation,
    ) -> Result<IncomeBracketCounts, DataUnavailableError> {
        let geoid = tract.geoid();
        log::info!(
            "Fetching ACS {} income brackets for tract {geoid}...",
            self.config.year
        );

        let resp = self.client.get(self.url(tract)).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        // The API answers an unknown tract with 204 and an empty body.
        if status == reqwest::StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Err(DataUnavailableError::NotFound { geoid });
        }

        if !status.is_success() {
            return Err(DataUnavailableError::Malformed {
                geoid,
                message: format!("HTTP {status}: {}", truncate_for_log(&body, BODY_PREVIEW_LEN)),
            });
        }

        parse_bracket_response(&body, &geoid)
    }
}

/// Parses an ACS response into bracket counts.
///
/// The response is a JSON array of arrays: a header row naming each
/// column, then one row per matched geography:
///
/// ```text
/// [["B19001_001E","B19001_002E",...,"state","county","tract"],
///  ["1532","87",...,"11","001","009807"]]
/// ```
///
/// Columns are located by header name rather than position.
fn parse_bracket_response(
    body: &str,
    geoid: &str,
) -> Result<IncomeBracketCounts, DataUnavailableError> {
    let malformed = |message: String| DataUnavailableError::Malformed {
        geoid: geoid.to_string(),
        message,
    };

    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(body).map_err(|e| {
        malformed(format!(
            "{e} (body: {})",
            truncate_for_log(body, BODY_PREVIEW_LEN)
        ))
    })?;

    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| malformed("Empty response".to_string()))?;
    let Some(row) = rows.next() else {
        return Err(DataUnavailableError::NotFound {
            geoid: geoid.to_string(),
        });
    };

    let column = |variable: &str| -> Result<u64, DataUnavailableError> {
        let idx = header
            .iter()
            .position(|h| h.as_str() == Some(variable))
            .ok_or_else(|| malformed(format!("Missing column {variable}")))?;
        let value = row
            .get(idx)
            .ok_or_else(|| malformed(format!("Row too short for column {variable}")))?;
        parse_count(value)
            .ok_or_else(|| malformed(format!("Invalid count for {variable}: {value}")))
    };

    let mut counts = [0u64; BRACKET_COUNT];
    for (count, bracket) in counts.iter_mut().zip(INCOME_BRACKETS.iter()) {
        *count = column(bracket.variable)?;
    }

    let mut result = IncomeBracketCounts::new(counts);
    if let Ok(respondents) = column(RESPONDENTS_VARIABLE) {
        result = result.with_respondents(respondents);
    }

    Ok(result)
}

/// Parses a non-negative count. ACS encodes annotations as large negative
/// sentinel values (e.g. `-666666666`), which are rejected here.
fn parse_count(value: &serde_json::Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str()?.trim().parse::<u64>().ok())
}

/// Truncates a string for logging, appending "..." if it exceeds `max_len`.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOID: &str = "11001009807";

    fn header() -> Vec<String> {
        let mut header = vec![RESPONDENTS_VARIABLE.to_string()];
        header.extend(INCOME_BRACKETS.iter().map(|b| b.variable.to_string()));
        header.extend(["state", "county", "tract"].map(String::from));
        header
    }

    fn response(values: &[&str]) -> String {
        let mut row: Vec<String> = values.iter().map(|v| (*v).to_string()).collect();
        row.extend(["11", "001", "009807"].map(String::from));
        serde_json::json!([header(), row]).to_string()
    }

    #[test]
    fn parses_counts_in_bracket_order() {
        let body = response(&[
            "136", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15",
            "16",
        ]);
        let counts = parse_bracket_response(&body, GEOID).unwrap();
        assert_eq!(
            counts.counts(),
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]
        );
        assert_eq!(counts.respondents(), Some(136));
    }

    #[test]
    fn locates_columns_by_header() {
        let mut header = header();
        header.reverse();
        // tract, county, state, B19001_017E ... B19001_002E, B19001_001E
        let mut row = vec!["009807".to_string(), "001".to_string(), "11".to_string()];
        row.extend((1..=16).rev().map(|i| (i * 10).to_string()));
        row.push("1360".to_string());
        let body = serde_json::json!([header, row]).to_string();

        let counts = parse_bracket_response(&body, GEOID).unwrap();
        assert_eq!(counts.counts()[0], 10);
        assert_eq!(counts.counts()[15], 160);
        assert_eq!(counts.respondents(), Some(1360));
    }

    #[test]
    fn header_only_is_not_found() {
        let body = serde_json::json!([header()]).to_string();
        assert!(matches!(
            parse_bracket_response(&body, GEOID),
            Err(DataUnavailableError::NotFound { .. })
        ));
    }

    #[test]
    fn jam_values_are_malformed() {
        let body = response(&[
            "10", "-666666666", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0",
            "0", "0",
        ]);
        let err = parse_bracket_response(&body, GEOID).unwrap_err();
        assert!(
            matches!(err, DataUnavailableError::Malformed { ref message, .. } if message.contains("B19001_002E")),
            "{err:?}"
        );
    }

    #[test]
    fn missing_column_is_malformed() {
        let body = serde_json::json!([["B19001_001E", "state"], ["10", "11"]]).to_string();
        assert!(matches!(
            parse_bracket_response(&body, GEOID),
            Err(DataUnavailableError::Malformed { .. })
        ));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_bracket_response("error: unknown variable", GEOID),
            Err(DataUnavailableError::Malformed { .. })
        ));
    }

    #[test]
    fn builds_tract_url() {
        let client = AcsClient::new(
            reqwest::Client::new(),
            AcsConfig::embedded(),
            Some("secret".to_string()),
        );
        let url = client.url(&TractLocation {
            state_id: "11".to_string(),
            county_id: "001".to_string(),
            tract_id: "009807".to_string(),
            land_area: 1.0,
            population: 1,
        });
        assert!(url.starts_with("https://api.census.gov/data/2022/acs/acs5?get=B19001_001E,B19001_002E,"));
        assert!(url.contains("B19001_017E&for=tract:009807&in=state:11%20county:001"));
        assert!(url.ends_with("&key=secret"));
    }

    #[test]
    fn truncates_long_bodies() {
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        assert_eq!(truncate_for_log("abc", 3), "abc");
    }
}
