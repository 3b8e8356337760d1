use std::time::Duration;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{PracticeError, Result};
use crate::sheet::record::{Dataset, WordRecord};

/// Marker left in the default URL until the user points it at a real sheet.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_SHEET_ID";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const WORD_COLUMN: &str = "Word";
const CATEGORY_COLUMN: &str = "Category";
const PRACTICED_COLUMN: &str = "Practiced";

const SHEETS_HOST: &str = "https://docs.google.com/spreadsheets/d/";

/// Where a practice run gets its rows from.
pub trait SheetSource: Send + Sync {
    fn fetch(&self, source_url: &str) -> Result<Dataset>;
}

/// The sheet behind an HTTP(S) URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpSheet;

impl SheetSource for HttpSheet {
    fn fetch(&self, source_url: &str) -> Result<Dataset> {
        fetch(source_url)
    }
}

impl<F> SheetSource for F
where
    F: Fn(&str) -> Result<Dataset> + Send + Sync,
{
    fn fetch(&self, source_url: &str) -> Result<Dataset> {
        self(source_url)
    }
}

/// Download the sheet at `source_url` and parse it into a dataset.
///
/// The URL is checked before anything touches the network. A failed request
/// or non-success status ends the run; bad individual rows never do.
pub fn fetch(source_url: &str) -> Result<Dataset> {
    let url = validate_source_url(source_url)?;
    let url = export_url(url);

    info!(url = %url, "downloading sheet");
    let body = fetch_text(&url)?;
    let dataset = parse_csv(&body);
    info!(records = dataset.len(), "parsed sheet");
    Ok(dataset)
}

/// Reject URLs that cannot possibly point at a sheet.
pub fn validate_source_url(source_url: &str) -> Result<&str> {
    let url = source_url.trim();
    if url.is_empty() || url.contains(PLACEHOLDER_TOKEN) {
        return Err(PracticeError::configuration(
            "Please enter a valid Google Sheet URL",
        ));
    }
    Ok(url)
}

/// Turn a Google Sheets share link into its CSV export link.
///
/// Links that already export (or publish) CSV, and non-Google URLs, are
/// returned unchanged.
pub fn export_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix(SHEETS_HOST) else {
        return url.to_string();
    };

    let id_end = rest
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let (id, tail) = rest.split_at(id_end);

    // "/d/e/<id>/pub?output=csv" is a published link, already CSV
    if id.is_empty() || id == "e" || tail.starts_with("/export") {
        return url.to_string();
    }

    match gid_of(tail) {
        Some(gid) => format!("{SHEETS_HOST}{id}/export?format=csv&gid={gid}"),
        None => format!("{SHEETS_HOST}{id}/export?format=csv"),
    }
}

fn gid_of(tail: &str) -> Option<&str> {
    let start = tail.find("gid=")? + "gid=".len();
    let digits = &tail[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 { None } else { Some(&digits[..end]) }
}

#[cfg(feature = "network")]
fn fetch_text(url: &str) -> Result<String> {
    let fetch_error = |e: reqwest::Error| PracticeError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
        source: Some(Box::new(e)),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(fetch_error)?;
    let response = client.get(url).send().map_err(fetch_error)?;

    let status = response.status();
    if !status.is_success() {
        warn!(url, status = status.as_u16(), "sheet request rejected");
        return Err(PracticeError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(fetch_error)
}

#[cfg(not(feature = "network"))]
fn fetch_text(url: &str) -> Result<String> {
    Err(PracticeError::Fetch {
        url: url.to_string(),
        reason: "built without network support".to_string(),
        source: None,
    })
}

/// Column positions found in the header row.
struct Columns {
    word: Option<usize>,
    category: Option<usize>,
    practiced: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            word: position(WORD_COLUMN),
            category: position(CATEGORY_COLUMN),
            practiced: position(PRACTICED_COLUMN),
        }
    }
}

/// Parse CSV text with a `Word,Category,Practiced` header into records.
///
/// Rows without a word are dropped, a missing category becomes empty and an
/// unreadable practice count becomes 0.
pub fn parse_csv(text: &str) -> Dataset {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = match reader.headers() {
        Ok(headers) => Columns::locate(headers),
        Err(e) => {
            warn!(error = %e, "sheet has no readable header row");
            return Vec::new();
        }
    };
    let Some(word_idx) = columns.word else {
        debug!("sheet has no {WORD_COLUMN} column, every row dropped");
        return Vec::new();
    };

    let mut dataset = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(row, error = %e, "skipping unreadable row");
                continue;
            }
        };

        let word = record.get(word_idx).unwrap_or("").trim();
        if word.is_empty() {
            debug!(row, "skipping row without a word");
            continue;
        }
        let category = columns
            .category
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
            .trim();
        let practiced = parse_practiced(columns.practiced.and_then(|idx| record.get(idx)));

        dataset.push(WordRecord::new(word, category, practiced));
    }
    dataset
}

/// Read a practice count leniently: "3", "3.0" and " 3 " are all 3, anything
/// unreadable or negative is 0. Counts beyond `u64::MAX` saturate.
pub fn parse_practiced(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as u64,
        Ok(_) => 0,
        Err(_) => {
            debug!(value = raw, "non-numeric practice count treated as 0");
            0
        }
    }
}
