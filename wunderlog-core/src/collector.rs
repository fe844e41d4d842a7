use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, Local, NaiveDate, TimeDelta, Utc};
use serde_json::Value;
use tokio::fs;

use crate::api::{ApiClient, WUNDERGROUND_API};
use crate::cache::{FileCache, NoCache, ResponseCache, default_ttl};
use crate::credentials;
use crate::error::{Result, WunderlogError};
use crate::forecast::ForecastKind;
use crate::format::{self, day_stamp, minute_stamp};
use crate::storage::{ensure_dir_exists, find_with_prefix, write_json};

pub const DAILY_DIR: &str = "daily";
pub const OBSERVATIONS_DIR: &str = "observations";

/// Days fetched by [`Wunderlog::get_history`] when no count is given.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct WunderlogOptions {
    /// Read from `~/.netrc` when `None`.
    pub api_key: Option<String>,
    /// Root of the per-location directories and the response cache.
    pub directory: PathBuf,
    pub base_url: String,
    /// Zero disables the response cache.
    pub cache_ttl: TimeDelta,
}

impl Default for WunderlogOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            directory: PathBuf::from("."),
            base_url: WUNDERGROUND_API.to_owned(),
            cache_ttl: default_ttl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already on disk, nothing was requested.
    Skipped(PathBuf),
    /// Files written by this call.
    Fetched(Vec<PathBuf>),
}

impl FetchOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, FetchOutcome::Skipped(_))
    }
}

/// Collects observation history and forecasts for one location.
///
/// Layout under `directory`:
///
/// ```text
/// <location, lower-cased>/
///   daily/<YYYY-MM-DD>.json
///   observations/<YYYY-MM-DDTHH-MM>.json
///   forecast/<YYYY-MM-DDTHH-MM>.json
///   forecast_hourly/<YYYY-MM-DDTHH-MM>.json
/// cache.json
/// ```
#[derive(Debug)]
pub struct Wunderlog {
    api: ApiClient,
    loc_dir: PathBuf,
}

impl Wunderlog {
    pub async fn new(location: impl Into<String>, options: WunderlogOptions) -> Result<Self> {
        let location = location.into();
        let api_key = match options.api_key {
            Some(key) => key,
            None => credentials::api_key_from_netrc()?,
        };

        let loc_dir = options.directory.join(location.to_lowercase());
        ensure_dir_exists(&loc_dir).await?;

        let cache: Box<dyn ResponseCache> = if options.cache_ttl > TimeDelta::zero() {
            Box::new(FileCache::in_dir(&options.directory, options.cache_ttl))
        } else {
            Box::new(NoCache)
        };

        Ok(Self {
            api: ApiClient::new(options.base_url, api_key, location, cache),
            loc_dir,
        })
    }

    pub fn location(&self) -> &str {
        self.api.location()
    }

    pub fn location_dir(&self) -> &Path {
        &self.loc_dir
    }

    /// Download the daily summary and individual observations for `day`
    /// (yesterday by default).
    ///
    /// Does nothing if the day's summary file already exists, whatever its
    /// contents.
    pub async fn get_day(&self, day: Option<NaiveDate>) -> Result<FetchOutcome> {
        let daily_dir = self.loc_dir.join(DAILY_DIR);
        ensure_dir_exists(&daily_dir).await?;

        let day = day.unwrap_or_else(yesterday);
        let daily_path = daily_dir.join(format!("{}.json", day_stamp(day)));
        if fs::try_exists(&daily_path)
            .await
            .map_err(|e| WunderlogError::io(&daily_path, e))?
        {
            tracing::info!("Already have observations for {}", daily_path.display());
            return Ok(FetchOutcome::Skipped(daily_path));
        }

        let key = format::history_key(day);
        let response = self.api.request(&key).await?;
        let summary = response
            .pointer("/history/dailysummary/0")
            .ok_or_else(|| missing(&key, "history.dailysummary"))?;
        let observations = response
            .pointer("/history/observations")
            .and_then(Value::as_array)
            .ok_or_else(|| missing(&key, "history.observations"))?;

        write_json(&daily_path, summary).await?;
        let mut written = vec![daily_path];

        let obs_dir = self.loc_dir.join(OBSERVATIONS_DIR);
        ensure_dir_exists(&obs_dir).await?;
        for observation in observations {
            let date = observation.get("date").ok_or_else(|| {
                WunderlogError::InvalidObservationDate("observation has no 'date'".into())
            })?;
            let stamp = minute_stamp(format::parse_observation_date(date)?);
            let path = obs_dir.join(format!("{stamp}.json"));
            write_json(&path, observation).await?;
            written.push(path);
        }

        tracing::info!(
            "Saved {} for {} with {} observations",
            day_stamp(day),
            self.location(),
            observations.len()
        );
        Ok(FetchOutcome::Fetched(written))
    }

    /// Fetch `max_days` days of history ([`DEFAULT_HISTORY_DAYS`] by default).
    ///
    /// Every iteration targets yesterday, so only the first call can reach
    /// the network; the rest find the file already there.
    pub async fn get_history(&self, max_days: Option<u32>) -> Result<()> {
        for _ in 0..max_days.unwrap_or(DEFAULT_HISTORY_DAYS) {
            self.get_day(Some(yesterday())).await?;
        }
        Ok(())
    }

    /// Store a forecast snapshot unless one was already taken this hour (UTC).
    pub async fn get_forecast(&self, kind: ForecastKind) -> Result<FetchOutcome> {
        self.get_forecast_at(kind, Utc::now()).await
    }

    pub async fn get_forecast_at(
        &self,
        kind: ForecastKind,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome> {
        let fcast_dir = self.loc_dir.join(kind.dir_name());
        ensure_dir_exists(&fcast_dir).await?;

        let now = now.naive_utc();
        if let Some(existing) = find_with_prefix(&fcast_dir, &format::hour_prefix(now)).await? {
            tracing::info!("Already have {}", existing.display());
            return Ok(FetchOutcome::Skipped(existing));
        }

        let path = fcast_dir.join(format!("{}.json", minute_stamp(now)));
        let response = self.api.request(kind.request_key()).await?;
        let forecast = kind
            .extract(&response)
            .ok_or_else(|| missing(kind.request_key(), kind.pointer()))?;
        write_json(&path, forecast).await?;

        tracing::info!("Saved {kind} forecast {}", path.display());
        Ok(FetchOutcome::Fetched(vec![path]))
    }

    /// One pass: yesterday's observations, then the daily and hourly
    /// forecasts. Stops at the first error.
    pub async fn collect(&self) -> Result<()> {
        self.get_day(None).await?;
        self.get_forecast(ForecastKind::Daily).await?;
        self.get_forecast(ForecastKind::Hourly).await?;
        Ok(())
    }
}

fn yesterday() -> NaiveDate {
    Local::now().date_naive() - Days::new(1)
}

fn missing(key: &str, field: &'static str) -> WunderlogError {
    WunderlogError::MissingField {
        key: key.to_owned(),
        field,
    }
}
