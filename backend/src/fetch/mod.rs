//! Google Sheets download
//!
//! Each tab is fetched through the public CSV export endpoint. The
//! spreadsheet must be shared as "anyone with the link can view"; otherwise
//! Google answers with a sign-in page, which is detected and reported instead
//! of being parsed as CSV.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use konopas::fetch::SheetFetcher;
//!
//! let fetcher = SheetFetcher::new(Duration::from_secs(30))?;
//! let sheets = fetcher.fetch_all(&config.sheets).await?;
//! ```

use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::config::SheetSource;
use crate::error::{FetchError, FetchResult};
use crate::parser::{parse_csv_str, ParseResult};

/// Default number of retries
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

static HTML_PAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?si)<html.*<head.*</head>.*<body.*</body>.*</html>").expect("html pattern is valid")
});

/// CSV export URL of a sheet tab.
pub fn export_url(key: &str, gid: u64) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        key, gid
    )
}

/// Whether a payload is an HTML page rather than CSV.
pub fn looks_like_html(payload: &str) -> bool {
    HTML_PAGE_RE.is_match(payload)
}

/// A downloaded and parsed sheet tab
#[derive(Debug, Clone)]
pub struct FetchedSheet {
    pub source: SheetSource,
    pub csv: ParseResult,
}

/// HTTP client for sheet exports
#[derive(Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl SheetFetcher {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the number of attempts per sheet
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Fetch every sheet concurrently. Fails on the first sheet that fails.
    pub async fn fetch_all(&self, sheets: &[SheetSource]) -> FetchResult<Vec<FetchedSheet>> {
        try_join_all(sheets.iter().map(|sheet| self.fetch(sheet))).await
    }

    /// Fetch one sheet, retrying transport failures.
    pub async fn fetch(&self, sheet: &SheetSource) -> FetchResult<FetchedSheet> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.try_fetch(sheet).await {
                Ok(fetched) => return Ok(fetched),
                Err(e @ (FetchError::HtmlPayload(_) | FetchError::Csv { .. })) => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        sheet = %sheet.name,
                        "Attempt {}/{} failed: {}",
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::HttpError("no attempt made".to_string())))
    }

    async fn try_fetch(&self, sheet: &SheetSource) -> FetchResult<FetchedSheet> {
        let url = export_url(&sheet.key, sheet.gid);
        tracing::debug!(sheet = %sheet.name, %url, "fetching sheet");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::info!(sheet = %sheet.name, "Response status: {}", status.as_u16());

        if !status.is_success() {
            return Err(FetchError::BadStatus {
                name: sheet.name.clone(),
                status: status.as_u16(),
            });
        }

        let payload = response.text().await?;
        let csv = parse_payload(&sheet.name, &payload)?;

        Ok(FetchedSheet {
            source: sheet.clone(),
            csv,
        })
    }
}

/// Check and parse a downloaded export.
pub fn parse_payload(name: &str, payload: &str) -> FetchResult<ParseResult> {
    if looks_like_html(payload) {
        return Err(FetchError::HtmlPayload(name.to_string()));
    }
    parse_csv_str(payload).map_err(|source| FetchError::Csv {
        name: name.to_string(),
        source,
    })
}
