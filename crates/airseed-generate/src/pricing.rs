use chrono::Datelike;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use airseed_core::{FareClass, Flight, Ticket};

use crate::errors::GenerationError;

/// Fare ranges, seasonal bands and class multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PricingTable {
    /// Smallest base fare, in whole currency units.
    pub base_fare_min: i64,
    /// Largest base fare, in whole currency units.
    pub base_fare_max: i64,
    /// Month bands with a price multiplier; months outside every band are neutral.
    pub seasons: Vec<SeasonBand>,
    pub economy_multiplier: f64,
    pub business_multiplier: f64,
    pub first_multiplier: f64,
    /// Seats offered in economy.
    pub economy_availability: AvailabilityRange,
    /// Seats offered in business and first.
    pub premium_availability: AvailabilityRange,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            base_fare_min: 40,
            base_fare_max: 600,
            seasons: vec![
                SeasonBand {
                    name: "summer".to_string(),
                    months: vec![6, 7, 8],
                    multiplier: 1.5,
                },
                SeasonBand {
                    name: "winter_holidays".to_string(),
                    months: vec![12, 1],
                    multiplier: 1.3,
                },
            ],
            economy_multiplier: 1.0,
            business_multiplier: 2.5,
            first_multiplier: 5.0,
            economy_availability: AvailabilityRange { min: 80, max: 200 },
            premium_availability: AvailabilityRange { min: 10, max: 50 },
        }
    }
}

/// A set of months sharing one price multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeasonBand {
    pub name: String,
    pub months: Vec<u32>,
    pub multiplier: f64,
}

/// Inclusive seat-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AvailabilityRange {
    pub min: u32,
    pub max: u32,
}

impl PricingTable {
    /// Check that every flight ends up with strictly increasing class prices.
    ///
    /// After rounding to whole units the gap between neighbouring classes must
    /// stay at least one unit for the cheapest base fare in the cheapest season.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.base_fare_min < 1 || self.base_fare_max < self.base_fare_min {
            return Err(GenerationError::InvalidConfig(format!(
                "base fare range [{}, {}] is invalid",
                self.base_fare_min, self.base_fare_max
            )));
        }
        for band in &self.seasons {
            if !band.multiplier.is_finite() || band.multiplier <= 0.0 {
                return Err(GenerationError::InvalidConfig(format!(
                    "season '{}' needs a positive multiplier",
                    band.name
                )));
            }
            if let Some(month) = band.months.iter().find(|month| !(1..=12).contains(*month)) {
                return Err(GenerationError::InvalidConfig(format!(
                    "season '{}' lists month {month}",
                    band.name
                )));
            }
        }
        for range in [self.economy_availability, self.premium_availability] {
            if range.max < range.min {
                return Err(GenerationError::InvalidConfig(format!(
                    "availability range [{}, {}] is invalid",
                    range.min, range.max
                )));
            }
        }

        let lowest_season = self
            .seasons
            .iter()
            .map(|band| band.multiplier)
            .fold(1.0_f64, f64::min);
        let cheapest = self.base_fare_min as f64 * lowest_season;
        let multipliers: Vec<f64> = FareClass::ALL
            .iter()
            .map(|class| self.class_multiplier(*class))
            .collect();
        if multipliers.iter().any(|m| !m.is_finite() || *m <= 0.0) {
            return Err(GenerationError::InvalidConfig(
                "fare class multipliers must be positive".to_string(),
            ));
        }
        if multipliers
            .windows(2)
            .any(|pair| (pair[1] - pair[0]) * cheapest < 1.0)
        {
            return Err(GenerationError::InvalidConfig(
                "fare class multipliers must increase enough to keep economy < business < first"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Multiplier for a departure month (1-12); the first matching band wins.
    pub fn seasonal_multiplier(&self, month: u32) -> f64 {
        self.seasons
            .iter()
            .find(|band| band.months.contains(&month))
            .map(|band| band.multiplier)
            .unwrap_or(1.0)
    }

    pub fn class_multiplier(&self, class: FareClass) -> f64 {
        match class {
            FareClass::Economy => self.economy_multiplier,
            FareClass::Business => self.business_multiplier,
            FareClass::First => self.first_multiplier,
        }
    }

    pub fn availability(&self, class: FareClass) -> AvailabilityRange {
        match class {
            FareClass::Economy => self.economy_availability,
            FareClass::Business | FareClass::First => self.premium_availability,
        }
    }
}

/// Prices every fare class of a flight.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine<'a> {
    table: &'a PricingTable,
}

impl<'a> PricingEngine<'a> {
    pub fn new(table: &'a PricingTable) -> Self {
        Self { table }
    }

    /// One ticket per fare class, cheapest first.
    pub fn price_flight<R: Rng + ?Sized>(&self, flight: &Flight, rng: &mut R) -> Vec<Ticket> {
        let base = rng.random_range(self.table.base_fare_min..=self.table.base_fare_max) as f64;
        let seasonal = self
            .table
            .seasonal_multiplier(flight.departure_time.month());

        FareClass::ALL
            .iter()
            .map(|class| {
                let range = self.table.availability(*class);
                Ticket {
                    code: ticket_code(&flight.id, *class),
                    flight_id: flight.id.clone(),
                    airline_id: flight.airline_id.clone(),
                    fare_class: *class,
                    price: round_price(base * seasonal * self.table.class_multiplier(*class)),
                    availability: rng.random_range(range.min..=range.max),
                }
            })
            .collect()
    }
}

/// Ticket code derived from the flight id and the fare class letter.
pub fn ticket_code(flight_id: &str, class: FareClass) -> String {
    format!("{flight_id}-{}", class.code_letter())
}

/// Prices are whole currency units, rounded half away from zero.
fn round_price(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn flight_in(month: u32) -> Flight {
        let departure = NaiveDate::from_ymd_opt(2025, month, 10)
            .and_then(|date| date.and_hms_opt(9, 15, 0))
            .expect("valid departure");
        Flight {
            id: "AE0420".to_string(),
            airline_id: "AE".to_string(),
            departure_airport_id: "ATH".to_string(),
            arrival_airport_id: "LHR".to_string(),
            departure_time: departure,
            arrival_time: departure + chrono::Duration::minutes(200),
            seat_capacity: 200,
        }
    }

    #[test]
    fn seasonal_bands_match_months() {
        let table = PricingTable::default();
        assert_eq!(table.seasonal_multiplier(7), 1.5);
        assert_eq!(table.seasonal_multiplier(12), 1.3);
        assert_eq!(table.seasonal_multiplier(1), 1.3);
        assert_eq!(table.seasonal_multiplier(4), 1.0);
    }

    #[test]
    fn prices_one_ticket_per_class_in_increasing_order() {
        let table = PricingTable::default();
        let engine = PricingEngine::new(&table);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for month in 1..=12 {
            let tickets = engine.price_flight(&flight_in(month), &mut rng);
            assert_eq!(tickets.len(), 3);
            let codes: Vec<&str> = tickets.iter().map(|t| t.code.as_str()).collect();
            assert_eq!(codes, vec!["AE0420-E", "AE0420-B", "AE0420-F"]);
            assert!(tickets[0].price < tickets[1].price);
            assert!(tickets[1].price < tickets[2].price);
            assert!((80..=200).contains(&tickets[0].availability));
            assert!((10..=50).contains(&tickets[2].availability));
        }
    }

    #[test]
    fn summer_prices_exceed_spring_prices_for_same_draw() {
        let table = PricingTable::default();
        let engine = PricingEngine::new(&table);
        let spring = engine.price_flight(&flight_in(4), &mut ChaCha8Rng::seed_from_u64(5));
        let summer = engine.price_flight(&flight_in(7), &mut ChaCha8Rng::seed_from_u64(5));
        assert!(summer[0].price > spring[0].price);
        assert_eq!(summer[0].availability, spring[0].availability);
    }

    #[test]
    fn economy_price_is_base_times_season() {
        let table = PricingTable {
            base_fare_min: 100,
            base_fare_max: 100,
            ..PricingTable::default()
        };
        let engine = PricingEngine::new(&table);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tickets = engine.price_flight(&flight_in(8), &mut rng);
        let prices: Vec<i64> = tickets.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![150, 375, 750]);
    }

    #[test]
    fn rejects_multipliers_that_collapse_classes() {
        let table = PricingTable {
            business_multiplier: 1.0,
            ..PricingTable::default()
        };
        assert!(matches!(
            table.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
        assert!(PricingTable::default().validate().is_ok());
    }
}
