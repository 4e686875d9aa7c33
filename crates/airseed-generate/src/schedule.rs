use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::Rng;
use rand::seq::IndexedRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use airseed_core::validation::{MAX_FLIGHT_MINUTES, MIN_FLIGHT_MINUTES};
use airseed_core::{Airline, Airport, Flight, Ticket};

use crate::allocator::FLIGHT_NAMESPACE;
use crate::context::GenerationContext;
use crate::errors::GenerationError;
use crate::model::{GenerationIssue, ResolvedWindow};
use crate::pricing::PricingEngine;

const DAYS_PER_WEEK: u64 = 7;

/// Frequency class of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for FrequencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrequencyTier::High => "high",
            FrequencyTier::Medium => "medium",
            FrequencyTier::Low => "low",
        };
        f.write_str(label)
    }
}

/// Route tiers and their flights-per-day rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FrequencyTable {
    /// City pairs served densely in both directions.
    pub popular_routes: Vec<[String; 2]>,
    /// Cities whose routes are at least `medium`.
    pub major_cities: Vec<String>,
    pub high_per_day: f64,
    pub medium_per_day: f64,
    pub low_per_day: f64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        let pair = |a: &str, b: &str| [a.to_string(), b.to_string()];
        Self {
            popular_routes: vec![
                pair("Athens", "London"),
                pair("New York", "Tokyo"),
                pair("Paris", "Rome"),
                pair("Athens", "Berlin"),
                pair("Bangkok", "Singapore"),
                pair("Berlin", "Madrid"),
            ],
            major_cities: ["Athens", "London", "Paris", "Rome", "Berlin"]
                .iter()
                .map(|city| city.to_string())
                .collect(),
            high_per_day: 3.0,
            medium_per_day: 1.0,
            low_per_day: 0.3,
        }
    }
}

impl FrequencyTable {
    pub fn validate(&self) -> Result<(), GenerationError> {
        for [a, b] in &self.popular_routes {
            if a == b {
                return Err(GenerationError::InvalidConfig(format!(
                    "popular route '{a}' connects a city to itself"
                )));
            }
        }
        for (tier, rate) in [
            (FrequencyTier::High, self.high_per_day),
            (FrequencyTier::Medium, self.medium_per_day),
            (FrequencyTier::Low, self.low_per_day),
        ] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(GenerationError::InvalidConfig(format!(
                    "{tier} tier needs a positive flights-per-day rate"
                )));
            }
        }
        Ok(())
    }

    /// Tier of the route between two cities. Popular pairs match in either direction.
    pub fn classify(&self, from_city: &str, to_city: &str) -> FrequencyTier {
        let popular = self
            .popular_routes
            .iter()
            .any(|[a, b]| (a == from_city && b == to_city) || (a == to_city && b == from_city));
        if popular {
            return FrequencyTier::High;
        }
        let major = |city: &str| self.major_cities.iter().any(|major| major == city);
        if major(from_city) || major(to_city) {
            FrequencyTier::Medium
        } else {
            FrequencyTier::Low
        }
    }

    /// Most flights any tier emits on a single day.
    pub fn max_daily_flights(&self) -> u64 {
        [self.high_per_day, self.medium_per_day, self.low_per_day]
            .into_iter()
            .flat_map(|rate| (0..DAYS_PER_WEEK).map(move |day| flights_on_day(rate, day)))
            .max()
            .unwrap_or(0)
    }

    pub fn rate(&self, tier: FrequencyTier) -> f64 {
        match tier {
            FrequencyTier::High => self.high_per_day,
            FrequencyTier::Medium => self.medium_per_day,
            FrequencyTier::Low => self.low_per_day,
        }
    }
}

/// Flights a route with `rate` flights per day operates on day `day_index`
/// of the window.
///
/// Rates of at least one fly `floor(rate)` times a day. Lower rates become a
/// weekly quota of `max(1, round(rate * 7))` flights, slot `i` landing on day
/// `floor(i * 7 / quota)` of every 7-day block.
pub fn flights_on_day(rate: f64, day_index: u64) -> u64 {
    if rate >= 1.0 {
        return rate.floor() as u64;
    }
    let quota = ((rate * DAYS_PER_WEEK as f64).round() as u64).clamp(1, DAYS_PER_WEEK);
    let day_in_week = day_index % DAYS_PER_WEEK;
    (0..quota)
        .filter(|slot| slot * DAYS_PER_WEEK / quota == day_in_week)
        .count() as u64
}

/// Flights and tickets produced by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub flights: Vec<Flight>,
    pub tickets: Vec<Ticket>,
}

/// A directed route operated by one airline.
#[derive(Debug, Clone, Copy)]
struct Route<'a> {
    airline: &'a Airline,
    from: &'a Airport,
    to: &'a Airport,
    tier: FrequencyTier,
}

/// Expands routes into flights over the scheduling window.
#[derive(Debug, Clone)]
pub struct RouteScheduler<'a> {
    frequency: &'a FrequencyTable,
    pricing: PricingEngine<'a>,
    window: ResolvedWindow,
    seat_capacity: u32,
}

impl<'a> RouteScheduler<'a> {
    pub fn new(
        frequency: &'a FrequencyTable,
        pricing: PricingEngine<'a>,
        window: ResolvedWindow,
        seat_capacity: u32,
    ) -> Self {
        Self {
            frequency,
            pricing,
            window,
            seat_capacity,
        }
    }

    /// Schedule the guaranteed popular routes, then `route_count` random
    /// tiered routes. Every flight is priced as soon as it is emitted.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        rng: &mut R,
        airports: &[Airport],
        airlines: &[Airline],
        route_count: u64,
    ) -> Result<Schedule, GenerationError> {
        let mut schedule = Schedule::default();
        if airlines.is_empty() {
            ctx.warn(
                GenerationIssue::warning("no_airlines", "no airlines available; nothing scheduled")
                    .with_table("flight"),
            );
            return Ok(schedule);
        }

        let mut by_city: BTreeMap<&str, Vec<&Airport>> = BTreeMap::new();
        for airport in airports {
            by_city.entry(airport.city.as_str()).or_default().push(airport);
        }

        self.schedule_popular(ctx, rng, &by_city, airlines, &mut schedule)?;
        self.schedule_tiered(ctx, rng, airports, airlines, route_count, &mut schedule)?;
        Ok(schedule)
    }

    fn schedule_popular<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        rng: &mut R,
        by_city: &BTreeMap<&str, Vec<&Airport>>,
        airlines: &[Airline],
        schedule: &mut Schedule,
    ) -> Result<(), GenerationError> {
        let route_flights = self.window.len_days();
        for [a, b] in &self.frequency.popular_routes {
            for (from_city, to_city) in [(a.as_str(), b.as_str()), (b.as_str(), a.as_str())] {
                let airline = pick_airline(ctx, rng, airlines, route_flights)?;
                let from = by_city
                    .get(from_city)
                    .and_then(|list| list.choose(rng))
                    .copied();
                let to = by_city
                    .get(to_city)
                    .and_then(|list| list.choose(rng))
                    .copied();
                let (Some(from), Some(to)) = (from, to) else {
                    ctx.report.routes_skipped += 1;
                    ctx.warn(
                        GenerationIssue::warning(
                            "route_city_without_airport",
                            format!("popular route {from_city} -> {to_city} skipped: city has no airport"),
                        )
                        .with_route(from_city, to_city),
                    );
                    continue;
                };

                let route = Route {
                    airline,
                    from,
                    to,
                    tier: FrequencyTier::High,
                };
                for (_, day) in self.window.days() {
                    self.emit_flight(ctx, rng, &route, day, schedule)?;
                }
                ctx.report.routes_scheduled += 1;
                debug!(from = from_city, to = to_city, airline = %airline.id, "popular route scheduled");
            }
        }
        Ok(())
    }

    fn schedule_tiered<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        rng: &mut R,
        airports: &[Airport],
        airlines: &[Airline],
        route_count: u64,
        schedule: &mut Schedule,
    ) -> Result<(), GenerationError> {
        if airports.len() < 2 {
            ctx.report.routes_skipped += route_count;
            ctx.warn(
                GenerationIssue::warning(
                    "not_enough_airports",
                    format!("{route_count} tiered routes skipped: fewer than two airports"),
                )
                .with_table("flight"),
            );
            return Ok(());
        }

        for _ in 0..route_count {
            let first = rng.random_range(0..airports.len());
            let mut second = rng.random_range(0..airports.len() - 1);
            if second >= first {
                second += 1;
            }
            let (from, to) = (&airports[first], &airports[second]);
            let tier = self.frequency.classify(&from.city, &to.city);
            let rate = self.frequency.rate(tier);
            let route_flights: u64 = self
                .window
                .days()
                .map(|(index, _)| flights_on_day(rate, index))
                .sum();
            let airline = pick_airline(ctx, rng, airlines, route_flights)?;
            let route = Route {
                airline,
                from,
                to,
                tier,
            };

            for (index, day) in self.window.days() {
                for _ in 0..flights_on_day(rate, index) {
                    self.emit_flight(ctx, rng, &route, day, schedule)?;
                }
            }
            ctx.report.routes_scheduled += 1;
        }
        Ok(())
    }

    /// Build one flight departing on `day` together with its tickets.
    fn emit_flight<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        rng: &mut R,
        route: &Route<'_>,
        day: NaiveDate,
        schedule: &mut Schedule,
    ) -> Result<(), GenerationError> {
        let hour = rng.random_range(0..24);
        let minute = rng.random_range(0..60);
        let departure = day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default());
        let duration = rng.random_range(MIN_FLIGHT_MINUTES..MAX_FLIGHT_MINUTES);
        let id = ctx.allocator.allocate_flight_id(rng, &route.airline.id)?;

        let flight = Flight {
            id,
            airline_id: route.airline.id.clone(),
            departure_airport_id: route.from.id.clone(),
            arrival_airport_id: route.to.id.clone(),
            departure_time: departure,
            arrival_time: departure + Duration::minutes(duration),
            seat_capacity: self.seat_capacity,
        };
        let tickets = self.pricing.price_flight(&flight, rng);

        ctx.report.record_flight(route.tier);
        schedule.flights.push(flight);
        schedule.tickets.extend(tickets);
        Ok(())
    }
}

/// Choose an airline with at least `route_flights` flight numbers left.
fn pick_airline<'b, R: Rng + ?Sized>(
    ctx: &GenerationContext,
    rng: &mut R,
    airlines: &'b [Airline],
    route_flights: u64,
) -> Result<&'b Airline, GenerationError> {
    let open: Vec<&Airline> = airlines
        .iter()
        .filter(|airline| ctx.allocator.flight_numbers_left(&airline.id) >= route_flights)
        .collect();
    open.choose(rng).copied().ok_or_else(|| {
        let capacity = airlines
            .iter()
            .map(|airline| ctx.allocator.flight_numbers_left(&airline.id))
            .max()
            .unwrap_or(0);
        GenerationError::NamespaceExhausted {
            namespace: FLIGHT_NAMESPACE.to_string(),
            requested: route_flights,
            capacity,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_popular_pairs_in_both_directions() {
        let table = FrequencyTable::default();
        assert_eq!(table.classify("Athens", "London"), FrequencyTier::High);
        assert_eq!(table.classify("London", "Athens"), FrequencyTier::High);
        assert_eq!(table.classify("Dublin", "Paris"), FrequencyTier::Medium);
        assert_eq!(table.classify("Cairo", "Dublin"), FrequencyTier::Low);
    }

    #[test]
    fn daily_rates_fly_floor_rate_each_day() {
        assert_eq!(flights_on_day(3.0, 0), 3);
        assert_eq!(flights_on_day(1.0, 5), 1);
        assert_eq!(flights_on_day(2.7, 11), 2);
    }

    #[test]
    fn fractional_rates_spread_weekly_quota() {
        let week: Vec<u64> = (0..7).map(|day| flights_on_day(0.3, day)).collect();
        assert_eq!(week, vec![1, 0, 0, 1, 0, 0, 0]);
        let next_week: u64 = (7..14).map(|day| flights_on_day(0.3, day)).sum();
        assert_eq!(next_week, 2);
    }

    #[test]
    fn tiny_rates_still_fly_weekly() {
        let week: u64 = (0..7).map(|day| flights_on_day(0.01, day)).sum();
        assert_eq!(week, 1);
        assert_eq!(flights_on_day(0.01, 0), 1);
    }

    #[test]
    fn rejects_self_loop_popular_route() {
        let table = FrequencyTable {
            popular_routes: vec![["Rome".to_string(), "Rome".to_string()]],
            ..FrequencyTable::default()
        };
        assert!(matches!(
            table.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
