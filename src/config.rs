use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use clap::Parser;
use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Long flag names that are also accepted with a single leading dash
/// (`-endpoint foo`, `-since=2016-04-28`).
const SINGLE_DASH_FLAGS: &[&str] = &["endpoint", "tz", "token", "since", "until", "timeout-secs", "verbose"];

/// Incident report over a date range, grouped by service.
#[derive(Parser, Debug)]
#[command(name = "pd_report")]
#[command(about = "Summarize incidents per service for a date range")]
#[command(version)]
pub struct Cli {
    /// Incident API host for your organization (e.g. acme.pagerduty.com)
    #[arg(long, env = "PD_ENDPOINT")]
    pub endpoint: String,

    /// tz database timezone, e.g. Singapore
    #[arg(long = "tz", env = "PD_TIMEZONE")]
    pub time_zone: String,

    /// API token assigned by the incident service
    #[arg(long, env = "PD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// First day of the range, e.g. 2016-04-27
    #[arg(long)]
    pub since: String,

    /// Last day of the range (inclusive), e.g. 2016-04-28
    #[arg(long)]
    pub until: String,

    /// HTTP client timeout in seconds (requests wait indefinitely when unset)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Whole days in `time_zone`: `start` is local midnight of `since`, `end` is
/// 23:59:59 local time on `until`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub time_zone: Tz,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl DateRange {
    pub fn new(since: NaiveDate, until: NaiveDate, time_zone: Tz) -> Result<Self> {
        if since > until {
            anyhow::bail!("since ({}) is after until ({})", since, until);
        }
        let start = local_time(time_zone, since.and_time(NaiveTime::MIN))?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).context("invalid end-of-day time")?;
        let end = local_time(time_zone, until.and_time(end_of_day))?;
        Ok(Self {
            since,
            until,
            time_zone,
            start,
            end,
        })
    }
}

/// Resolves a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward an hour.
fn local_time(tz: Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        .with_context(|| format!("{} does not exist in {}", naive, tz.name()))
}

pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| anyhow::anyhow!("unknown timezone {:?} (expected a tz database name)", name))
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api: ApiConfig,
    pub range: DateRange,
    pub verbose: bool,
}

impl Config {
    /// Loads `.env`, then parses the command line (environment variables fill
    /// in missing endpoint, timezone and token).
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        dotenvy::dotenv().ok();

        let cli = Cli::try_parse_from(normalize_flags(args))?;
        Self::from_cli(cli)
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.endpoint.trim().is_empty() {
            anyhow::bail!("endpoint must not be empty");
        }
        if cli.token.trim().is_empty() {
            anyhow::bail!("token must not be empty");
        }
        if cli.time_zone.trim().is_empty() {
            anyhow::bail!("timezone must not be empty");
        }

        let time_zone = parse_time_zone(&cli.time_zone).context("Invalid -tz value")?;
        let since = parse_date(&cli.since).context("Invalid -since date")?;
        let until = parse_date(&cli.until).context("Invalid -until date")?;
        let range = DateRange::new(since, until, time_zone)?;

        Ok(Self {
            api: ApiConfig {
                base_url: base_url(&cli.endpoint),
                token: cli.token,
                timeout: cli.timeout_secs.map(Duration::from_secs),
            },
            range,
            verbose: cli.verbose,
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .with_context(|| format!("expected YYYY-MM-DD, got {:?}", value))
}

/// A bare host becomes `https://{host}`; anything with a scheme is kept as is.
pub fn base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}

/// Rewrites `-endpoint`-style flags to `--endpoint` so clap accepts them.
pub fn normalize_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text.starts_with("--") || !text.starts_with('-') {
                return arg;
            }
            let name = text[1..].split('=').next().unwrap_or_default();
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}
