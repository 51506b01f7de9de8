use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use once_cell::unsync::OnceCell;
use serde::Serialize;

use crate::labels::clean_match_label;
use crate::metrics::Metric;

pub const DEFAULT_CSV_PATH: &str = "DATOS_PARTIDOS.csv.csv";
pub const SESSION_PERIOD: &str = "Session";

const PLAYER_COLUMN: &str = "Player Name";
const ACTIVITY_COLUMN: &str = "Activity Name";
const PERIOD_COLUMN: &str = "Period Name";
const DURATION_COLUMN: &str = "Total Duration";

/// One whole-match ("Session") row for a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRow {
    pub player_name: String,
    pub activity_name: String,
    pub total_duration: String,
    pub duration_minutes: f64,
    pub total_distance: f64,
    pub hsr: f64,
    pub accelerations: f64,
    pub max_velocity: f64,
    pub tackles: f64,
}

impl SessionRow {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalDistance => self.total_distance,
            Metric::Hsr => self.hsr,
            Metric::Accelerations => self.accelerations,
            Metric::MaxVelocity => self.max_velocity,
            Metric::Tackles => self.tackles,
            Metric::DurationMinutes => self.duration_minutes,
        }
    }

    fn set_value(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::TotalDistance => self.total_distance = value,
            Metric::Hsr => self.hsr = value,
            Metric::Accelerations => self.accelerations = value,
            Metric::MaxVelocity => self.max_velocity = value,
            Metric::Tackles => self.tackles = value,
            Metric::DurationMinutes => self.duration_minutes = value,
        }
    }
}

/// Team mean of one metric for one raw activity name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAverage {
    pub activity_name: String,
    pub label: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry<'a> {
    pub label: String,
    pub row: &'a SessionRow,
}

/// Session rows loaded from the tracking export. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    source: PathBuf,
    rows: Vec<SessionRow>,
    discarded: usize,
}

struct ColumnIndex {
    player: usize,
    activity: usize,
    period: usize,
    duration: usize,
    metrics: Vec<(Metric, usize)>,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("missing required column '{name}'"))
        };
        let player = find(PLAYER_COLUMN)?;
        let activity = find(ACTIVITY_COLUMN)?;
        let period = find(PERIOD_COLUMN)?;
        let duration = find(DURATION_COLUMN)?;
        let mut metrics = Vec::with_capacity(Metric::CSV_COLUMNS.len());
        for metric in Metric::CSV_COLUMNS {
            metrics.push((metric, find(metric.column())?));
        }
        Ok(Self {
            player,
            activity,
            period,
            duration,
            metrics,
        })
    }
}

pub fn load(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open tracking csv {}", path.display()))?;
    load_from_reader(file, path)
}

pub fn load_from_reader<R: Read>(reader: R, source: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .with_context(|| format!("read csv header from {}", source.display()))?
        .clone();
    let columns = ColumnIndex::resolve(&headers)
        .with_context(|| format!("unexpected csv schema in {}", source.display()))?;

    let mut rows = Vec::new();
    let mut discarded = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("parse csv record {} in {}", idx + 1, source.display())
        })?;
        // Short records read as empty trailing cells; long ones are malformed.
        if record.len() > headers.len() {
            return Err(anyhow!(
                "csv record {} in {} has {} fields, header has {}",
                idx + 1,
                source.display(),
                record.len(),
                headers.len()
            ));
        }
        let field = |i: usize| record.get(i).unwrap_or("");

        if field(columns.period) != SESSION_PERIOD {
            discarded += 1;
            continue;
        }

        let total_duration = field(columns.duration).to_string();
        let duration_minutes = parse_duration(&total_duration).unwrap_or_else(|| {
            debug!(
                "record {}: duration '{}' did not parse, using 0",
                idx + 1,
                total_duration
            );
            0.0
        });

        let mut row = SessionRow {
            player_name: field(columns.player).to_string(),
            activity_name: field(columns.activity).to_string(),
            total_duration,
            duration_minutes,
            total_distance: 0.0,
            hsr: 0.0,
            accelerations: 0.0,
            max_velocity: 0.0,
            tackles: 0.0,
        };
        for (metric, col) in &columns.metrics {
            row.set_value(*metric, parse_metric(field(*col)));
        }
        rows.push(row);
    }

    info!(
        "loaded {} session rows from {} ({} non-session rows discarded)",
        rows.len(),
        source.display(),
        discarded
    );

    Ok(Dataset {
        source: source.to_path_buf(),
        rows,
        discarded,
    })
}

/// Converts an `H:MM:SS` duration into minutes.
///
/// Anything that is not exactly three integer components maps to `0.0`.
/// Components may carry surrounding whitespace, a sign and single `_` digit
/// separators (`1_0`); their size is unbounded.
pub fn time_to_minutes(raw: &str) -> f64 {
    parse_duration(raw).unwrap_or(0.0)
}

fn parse_duration(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [h, m, s] = parts.as_slice() else {
        return None;
    };
    let h = parse_component(h)?;
    let m = parse_component(m)?;
    let s = parse_component(s)?;
    Some(h * 60.0 + m + s / 60.0)
}

fn parse_component(part: &str) -> Option<f64> {
    let part = part.trim();
    let digits = part.strip_prefix(['+', '-']).unwrap_or(part);
    let valid = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '_')
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__");
    if !valid {
        return None;
    }
    part.replace('_', "").parse::<f64>().ok()
}

fn parse_metric(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl Dataset {
    pub fn from_rows(rows: Vec<SessionRow>) -> Self {
        Self {
            source: PathBuf::new(),
            rows,
            discarded: 0,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped at load time because their period was not `Session`.
    pub fn discarded_rows(&self) -> usize {
        self.discarded
    }

    pub fn players(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.player_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn matches_for_player(&self, player: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.player_name == player)
            .map(|r| r.activity_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn single_match_metrics(&self, player: &str, activity: &str) -> Option<&SessionRow> {
        self.rows
            .iter()
            .find(|r| r.player_name == player && r.activity_name == activity)
    }

    /// Per raw activity name (ascending), the mean of `metric` over every player's row.
    pub fn team_average_by_match(&self, metric: Metric) -> Vec<TeamAverage> {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for row in &self.rows {
            let entry = groups.entry(row.activity_name.as_str()).or_insert((0.0, 0));
            entry.0 += row.value(metric);
            entry.1 += 1;
        }
        groups
            .into_iter()
            .map(|(activity, (sum, count))| TeamAverage {
                activity_name: activity.to_string(),
                label: clean_match_label(activity),
                mean: sum / count as f64,
            })
            .collect()
    }

    pub fn player_history(&self, player: &str) -> Vec<HistoryEntry<'_>> {
        self.rows
            .iter()
            .filter(|r| r.player_name == player)
            .map(|row| HistoryEntry {
                label: clean_match_label(&row.activity_name),
                row,
            })
            .collect()
    }
}

/// Loads the dataset on first access and hands out the same copy afterwards.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    cell: OnceCell<Dataset>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get_or_load(&self) -> Result<&Dataset> {
        self.cell.get_or_try_init(|| load(&self.path))
    }
}
