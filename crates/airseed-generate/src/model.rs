use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::allocator::FLIGHT_NUMBER_MAX;
use crate::errors::GenerationError;
use crate::pricing::PricingTable;
use crate::schedule::{FrequencyTable, FrequencyTier};

/// Cities served when no city list is configured.
pub const DEFAULT_CITIES: [&str; 18] = [
    "Athens",
    "London",
    "Paris",
    "Rome",
    "Berlin",
    "Madrid",
    "New York",
    "Chicago",
    "Tokyo",
    "Sydney",
    "Toronto",
    "Dubai",
    "Cairo",
    "Bangkok",
    "Singapore",
    "Dublin",
    "Lisbon",
    "Vienna",
];

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenerateOptions {
    /// Seed fixing every random draw of the run.
    pub seed: u64,
    /// Multiplier applied to every base cardinality.
    pub scale: f64,
    /// Date range flights are scheduled over.
    pub window: ScheduleWindow,
    /// Cities that receive airports.
    pub cities: Vec<String>,
    /// Cardinalities at scale 1.0.
    pub base: BaseCardinalities,
    /// Route tiers and their flights-per-day rates.
    pub frequency: FrequencyTable,
    /// Fare ranges, seasonal bands and class multipliers.
    pub pricing: PricingTable,
    /// Seats on every generated flight.
    pub seat_capacity: u32,
    /// Target flights per tiered route; the route count is `flights / flights_per_route`.
    pub flights_per_route: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            scale: 1.0,
            window: ScheduleWindow::default(),
            cities: DEFAULT_CITIES.iter().map(|city| city.to_string()).collect(),
            base: BaseCardinalities::default(),
            frequency: FrequencyTable::default(),
            pricing: PricingTable::default(),
            seat_capacity: 200,
            flights_per_route: 50,
        }
    }
}

impl GenerateOptions {
    /// Reject option sets that cannot produce a consistent dataset.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(GenerationError::InvalidConfig(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if self.cities.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "at least one city is required".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for city in &self.cities {
            if city.trim().is_empty() {
                return Err(GenerationError::InvalidConfig(
                    "city names must not be blank".to_string(),
                ));
            }
            if !seen.insert(city.as_str()) {
                return Err(GenerationError::InvalidConfig(format!(
                    "city '{city}' is listed twice"
                )));
            }
        }
        if self.flights_per_route == 0 {
            return Err(GenerationError::InvalidConfig(
                "flights_per_route must be at least 1".to_string(),
            ));
        }
        self.frequency.validate()?;
        self.pricing.validate()?;
        Ok(())
    }

    /// Resolve base cardinalities at the configured scale over `window`.
    ///
    /// Airports never drop below one per city and users never below one.
    /// Airlines never drop below what the worst-case schedule needs: every
    /// directed route flying its densest tier each day, with no airline asked
    /// for more than [`FLIGHT_NUMBER_MAX`] flight numbers.
    pub fn cardinalities(&self, window: &ResolvedWindow) -> Cardinalities {
        let scaled = |base: u64| (base as f64 * self.scale).floor() as u64;
        let flights = scaled(self.base.flights);
        let routes = (flights / self.flights_per_route.max(1)).max(1);

        let max_route_flights = self
            .frequency
            .max_daily_flights()
            .saturating_mul(window.len_days());
        let directed_routes =
            routes.saturating_add(2 * self.frequency.popular_routes.len() as u64);
        let max_flights = directed_routes.saturating_mul(max_route_flights);
        let per_airline = u64::from(FLIGHT_NUMBER_MAX)
            .saturating_sub(max_route_flights)
            .max(1);

        Cardinalities {
            airports: scaled(self.base.airports).max(self.cities.len() as u64),
            airlines: scaled(self.base.airlines)
                .max(max_flights.div_ceil(per_airline))
                .max(1),
            users: scaled(self.base.users).max(1),
            flights,
            routes,
            favorites: scaled(self.base.favorites),
            max_route_flights,
            max_flights,
        }
    }
}

/// Scheduling window relative to an anchor date ("now").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScheduleWindow {
    /// Date treated as "now"; defaults to today's UTC date.
    pub anchor: Option<NaiveDate>,
    /// Days between the anchor and the first scheduled day.
    pub start_offset_days: i64,
    /// Number of scheduled days.
    pub duration_days: i64,
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self {
            anchor: None,
            start_offset_days: 2,
            duration_days: 120,
        }
    }
}

impl ScheduleWindow {
    /// Turn the relative window into concrete dates, using `today` when no
    /// anchor is configured.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedWindow, GenerationError> {
        let anchor = self.anchor.unwrap_or(today);
        let start = shift(anchor, self.start_offset_days)?;
        let end = shift(start, self.duration_days)?;
        if end <= start {
            return Err(GenerationError::InvalidWindow { start, end });
        }
        Ok(ResolvedWindow { start, end })
    }
}

fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, GenerationError> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| {
            GenerationError::InvalidConfig(format!("shifting {date} by {days} days overflows"))
        })
}

/// Concrete half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedWindow {
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days().max(0) as u64
    }

    /// Each scheduled day with its zero-based index.
    pub fn days(&self) -> impl Iterator<Item = (u64, NaiveDate)> {
        let len = self.len_days();
        (0..len).zip(self.start.iter_days())
    }
}

/// Entity counts at scale 1.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BaseCardinalities {
    pub airports: u64,
    pub airlines: u64,
    pub users: u64,
    pub flights: u64,
    pub favorites: u64,
}

impl Default for BaseCardinalities {
    fn default() -> Self {
        Self {
            airports: 300,
            airlines: 80,
            users: 4000,
            flights: 300_000,
            favorites: 15_000,
        }
    }
}

/// Entity counts resolved for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinalities {
    pub airports: u64,
    pub airlines: u64,
    pub users: u64,
    pub flights: u64,
    pub routes: u64,
    pub favorites: u64,
    /// Most flights a single directed route can emit over the window.
    pub max_route_flights: u64,
    /// Upper bound on flights across every route.
    pub max_flights: u64,
}

/// Summary of a generated batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows_requested: u64,
    pub rows_generated: u64,
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

impl GenerationIssue {
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code: code.to_string(),
            message: message.into(),
            table: None,
            route: None,
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn with_route(mut self, from: &str, to: &str) -> Self {
        self.route = Some(format!("{from} -> {to}"));
        self
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub scale: f64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub tables: Vec<TableReport>,
    pub routes_scheduled: u64,
    pub routes_skipped: u64,
    pub flights_by_tier: BTreeMap<FrequencyTier, u64>,
    pub favorites_collapsed: u64,
    pub allocator_retries: u64,
    pub duration_ms: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(seed: u64, scale: f64, window: ResolvedWindow) -> Self {
        Self {
            seed,
            scale,
            window_start: window.start,
            window_end: window.end,
            tables: Vec::new(),
            routes_scheduled: 0,
            routes_skipped: 0,
            flights_by_tier: BTreeMap::new(),
            favorites_collapsed: 0,
            allocator_retries: 0,
            duration_ms: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_table(&mut self, table: &str, rows_requested: u64, rows_generated: u64) {
        self.tables.push(TableReport {
            table: table.to_string(),
            rows_requested,
            rows_generated,
        });
    }

    pub fn record_flight(&mut self, tier: FrequencyTier) {
        *self.flights_by_tier.entry(tier).or_insert(0) += 1;
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }

    pub fn table(&self, table: &str) -> Option<&TableReport> {
        self.tables.iter().find(|report| report.table == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn window_resolves_relative_to_anchor() {
        let window = ScheduleWindow {
            anchor: Some(date(2025, 5, 1)),
            start_offset_days: 2,
            duration_days: 12,
        };
        let resolved = window.resolve(date(2030, 1, 1)).expect("resolve window");
        assert_eq!(resolved.start, date(2025, 5, 3));
        assert_eq!(resolved.end, date(2025, 5, 15));
        assert_eq!(resolved.len_days(), 12);
        assert_eq!(resolved.days().last(), Some((11, date(2025, 5, 14))));
    }

    #[test]
    fn window_without_anchor_uses_today() {
        let window = ScheduleWindow::default();
        let resolved = window.resolve(date(2025, 1, 1)).expect("resolve window");
        assert_eq!(resolved.start, date(2025, 1, 3));
    }

    #[test]
    fn empty_window_is_rejected() {
        let window = ScheduleWindow {
            anchor: Some(date(2025, 5, 1)),
            start_offset_days: 0,
            duration_days: 0,
        };
        assert!(matches!(
            window.resolve(date(2025, 5, 1)),
            Err(GenerationError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn cardinalities_clamp_small_scales() {
        let options = GenerateOptions {
            scale: 0.01,
            ..GenerateOptions::default()
        };
        let window = ResolvedWindow {
            start: date(2025, 5, 3),
            end: date(2025, 5, 15),
        };
        let sizes = options.cardinalities(&window);
        assert_eq!(sizes.airports, 18);
        assert_eq!(sizes.airlines, 1);
        assert_eq!(sizes.users, 40);
        assert_eq!(sizes.flights, 3000);
        assert_eq!(sizes.routes, 60);
        assert_eq!(sizes.favorites, 150);
        assert_eq!(sizes.max_route_flights, 36);
        assert_eq!(sizes.max_flights, 72 * 36);
    }

    #[test]
    fn airlines_grow_with_flight_volume() {
        let options = GenerateOptions {
            scale: 0.01,
            ..GenerateOptions::default()
        };
        let window = options
            .window
            .resolve(date(2025, 5, 1))
            .expect("resolve window");
        let sizes = options.cardinalities(&window);
        assert_eq!(sizes.max_route_flights, 360);
        assert_eq!(sizes.max_flights, 72 * 360);
        assert_eq!(sizes.airlines, 3);
        let per_airline = u64::from(FLIGHT_NUMBER_MAX) - sizes.max_route_flights;
        assert!(sizes.airlines * per_airline >= sizes.max_flights);
    }

    #[test]
    fn rejects_non_positive_scale_and_duplicate_cities() {
        let options = GenerateOptions {
            scale: 0.0,
            ..GenerateOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));

        let options = GenerateOptions {
            cities: vec!["Athens".to_string(), "Athens".to_string()],
            ..GenerateOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
