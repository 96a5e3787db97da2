//! WHOOP API client
//!
//! Minimal blocking client for the WHOOP developer API (v2). Reads
//! physiological cycles to measure daily energy expenditure and turns it into
//! an empirical PAL against a person's BMR.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::energy::{empirical_pal, ensure_positive_bmr, Person};
use crate::error::{AppError, AppResult, CalcResult};
use crate::units::{kj_to_kcal, LengthUnit, MassUnit};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1500);
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_PAGE_SIZE: u32 = 25;

/// Score attached to a scored cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleScore {
    #[serde(default)]
    pub strain: Option<f64>,
    /// Total energy expenditure over the cycle
    #[serde(default)]
    pub kilojoule: Option<f64>,
    #[serde(default)]
    pub average_heart_rate: Option<f64>,
    #[serde(default)]
    pub max_heart_rate: Option<f64>,
}

/// One physiological cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub timezone_offset: Option<String>,
    #[serde(default)]
    pub score_state: Option<String>,
    #[serde(default)]
    pub score: Option<CycleScore>,
}

#[derive(Debug, Deserialize)]
struct CyclePage {
    #[serde(default)]
    records: Vec<Cycle>,
    #[serde(default, alias = "nextToken")]
    next_token: Option<String>,
}

/// Body measurements stored in the WHOOP profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurement {
    pub height_meter: f64,
    pub weight_kilogram: f64,
    #[serde(default)]
    pub max_heart_rate: Option<i64>,
}

impl BodyMeasurement {
    /// Copy height and weight onto a person
    pub fn apply_to(&self, person: &mut Person) -> CalcResult<()> {
        person.set_height(self.height_meter * 100.0, LengthUnit::Centimeter)?;
        person.set_weight(self.weight_kilogram, MassUnit::Kilogram)
    }
}

pub struct WhoopClient {
    http: Client,
    access_token: SecretString,
    base_url: String,
    retry_backoff: Duration,
    max_attempts: u32,
}

impl WhoopClient {
    pub fn new(base_url: &str, access_token: SecretString) -> AppResult<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Override the wait used when a 429 carries no `Retry-After`
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// GET a JSON endpoint, retrying on 429 up to `max_attempts` times
    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut attempt = 0;
        loop {
            attempt += 1;
            let resp = self
                .http
                .get(&url)
                .bearer_auth(self.access_token.expose_secret())
                .header(ACCEPT, "application/json")
                .query(query)
                .send()?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_attempts {
                let wait = retry_after(resp.headers()).unwrap_or(self.retry_backoff);
                tracing::warn!(
                    "WHOOP rate limited on {} (attempt {}), retrying in {:?}",
                    path,
                    attempt,
                    wait
                );
                std::thread::sleep(wait);
                continue;
            }
            if !status.is_success() {
                let message = resp.text().unwrap_or_default();
                return Err(AppError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            return Ok(resp.json()?);
        }
    }

    /// All cycles in `[start, end)`, following `next_token` pagination.
    /// `limit` is the page size requested per call.
    pub fn cycles(&self, start: DateTime<Utc>, end: DateTime<Utc>, limit: u32) -> AppResult<Vec<Cycle>> {
        let mut cycles = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("start", start.to_rfc3339()),
                ("end", end.to_rfc3339()),
                ("limit", limit.to_string()),
            ];
            if let Some(token) = &next_token {
                query.push(("nextToken", token.clone()));
            }

            let page: CyclePage = self.get_json("cycle", &query)?;
            tracing::debug!("Fetched {} WHOOP cycles", page.records.len());
            cycles.extend(page.records);

            next_token = page.next_token.filter(|t| !t.is_empty());
            if next_token.is_none() {
                break;
            }
        }

        Ok(cycles)
    }

    /// Body measurements (needs the `read:body_measurement` scope)
    pub fn body_measurement(&self) -> AppResult<BodyMeasurement> {
        self.get_json("user/measurement/body", &[])
    }

    /// Total measured energy expenditure in kcal over a window
    pub fn daily_total_kcal(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<f64> {
        Ok(total_kcal(&self.cycles(start, end, DEFAULT_PAGE_SIZE)?))
    }

    /// Measured PAL for a window: WHOOP kcal divided by BMR.
    ///
    /// The BMR is checked before any request is made.
    pub fn pal_for_day(&self, bmr_kcal: f64, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<f64> {
        ensure_positive_bmr(bmr_kcal)?;
        let measured = self.daily_total_kcal(start, end)?;
        Ok(empirical_pal(measured, bmr_kcal)?)
    }
}

/// Sum cycle energy in kcal; unscored cycles are skipped
pub fn total_kcal(cycles: &[Cycle]) -> f64 {
    let total_kj: f64 = cycles
        .iter()
        .filter_map(|c| c.score.as_ref().and_then(|s| s.kilojoule))
        .sum();
    kj_to_kcal(total_kj)
}

/// UTC midnight-to-midnight window for a calendar day
pub fn utc_day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::default()).and_utc();
    (start, start + chrono::Duration::days(1))
}

/// Seconds from a `Retry-After` header
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}
