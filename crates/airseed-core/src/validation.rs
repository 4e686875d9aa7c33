use std::collections::{BTreeMap, BTreeSet};

use crate::batch::OutputBatch;
use crate::error::{Error, Result};
use crate::model::{FareClass, TicketKey};

/// Shortest and longest (exclusive) flight duration in minutes.
pub const MIN_FLIGHT_MINUTES: i64 = 60;
pub const MAX_FLIGHT_MINUTES: i64 = 720;

/// Validate internal consistency of a finished output batch.
///
/// This checks:
/// - duplicate airport/airline/user/flight ids and ticket/favorite keys
/// - flight airline and airport references, distinct endpoints, duration bounds
/// - ticket flight references and exactly one ticket per fare class
/// - strictly increasing prices from economy to first
/// - favorite ticket and user references
pub fn validate_batch(batch: &OutputBatch) -> Result<()> {
    let airports = unique_ids("airport", batch.airports.iter().map(|a| a.id.as_str()))?;
    let airlines = unique_ids("airline", batch.airlines.iter().map(|a| a.id.as_str()))?;
    let users = unique_ids("user", batch.users.iter().map(|u| u.id.as_str()))?;

    let mut flights: BTreeMap<&str, &str> = BTreeMap::new();
    for flight in &batch.flights {
        if flights
            .insert(flight.id.as_str(), flight.airline_id.as_str())
            .is_some()
        {
            return Err(Error::DuplicateKey(format!("flight {}", flight.id)));
        }
        if !airlines.contains(flight.airline_id.as_str()) {
            return Err(Error::ReferentialGap(format!(
                "flight {} references unknown airline {}",
                flight.id, flight.airline_id
            )));
        }
        for airport in [&flight.departure_airport_id, &flight.arrival_airport_id] {
            if !airports.contains(airport.as_str()) {
                return Err(Error::ReferentialGap(format!(
                    "flight {} references unknown airport {}",
                    flight.id, airport
                )));
            }
        }
        if flight.departure_airport_id == flight.arrival_airport_id {
            return Err(Error::InvalidRecord(format!(
                "flight {} departs and arrives at {}",
                flight.id, flight.departure_airport_id
            )));
        }
        let minutes = flight.duration_minutes();
        if !(MIN_FLIGHT_MINUTES..MAX_FLIGHT_MINUTES).contains(&minutes) {
            return Err(Error::InvalidRecord(format!(
                "flight {} lasts {minutes} minutes",
                flight.id
            )));
        }
    }

    let mut ticket_keys: BTreeSet<TicketKey> = BTreeSet::new();
    let mut fares: BTreeMap<&str, BTreeMap<FareClass, i64>> = BTreeMap::new();
    for ticket in &batch.tickets {
        let Some(airline_id) = flights.get(ticket.flight_id.as_str()) else {
            return Err(Error::ReferentialGap(format!(
                "ticket {} references unknown flight {}",
                ticket.code, ticket.flight_id
            )));
        };
        if *airline_id != ticket.airline_id {
            return Err(Error::ReferentialGap(format!(
                "ticket {} carries airline {} but flight {} is operated by {}",
                ticket.code, ticket.airline_id, ticket.flight_id, airline_id
            )));
        }
        if ticket.price < 0 {
            return Err(Error::InvalidRecord(format!(
                "ticket {} has negative price",
                ticket.code
            )));
        }
        if !ticket_keys.insert(ticket.key()) {
            return Err(Error::DuplicateKey(format!("ticket {}", ticket.key())));
        }
        let classes = fares.entry(ticket.flight_id.as_str()).or_default();
        if classes.insert(ticket.fare_class, ticket.price).is_some() {
            return Err(Error::DuplicateKey(format!(
                "flight {} has two {} tickets",
                ticket.flight_id, ticket.fare_class
            )));
        }
    }

    for flight_id in flights.keys() {
        let classes = fares.get(flight_id).map(|c| c.len()).unwrap_or(0);
        if classes != FareClass::ALL.len() {
            return Err(Error::InvalidRecord(format!(
                "flight {flight_id} has {classes} tickets"
            )));
        }
    }

    for (flight_id, classes) in &fares {
        let prices: Vec<i64> = classes.values().copied().collect();
        if prices.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidRecord(format!(
                "flight {flight_id} fares are not increasing by class"
            )));
        }
    }

    let mut favorites = BTreeSet::new();
    for favorite in &batch.favorites {
        let key = favorite.ticket_key();
        if !ticket_keys.contains(&key) {
            return Err(Error::ReferentialGap(format!(
                "favorite references unknown ticket {key}"
            )));
        }
        if !users.contains(favorite.user_id.as_str()) {
            return Err(Error::ReferentialGap(format!(
                "favorite references unknown user {}",
                favorite.user_id
            )));
        }
        if !favorites.insert((key, favorite.user_id.as_str())) {
            return Err(Error::DuplicateKey(format!(
                "favorite {} for {}",
                favorite.ticket_code, favorite.user_id
            )));
        }
    }

    Ok(())
}

fn unique_ids<'a>(
    label: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<BTreeSet<&'a str>> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateKey(format!("{label} {id}")));
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::model::{Airline, Airport, Favorite, Flight, Ticket, User};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    fn ticket(flight: &str, class: FareClass, price: i64) -> Ticket {
        Ticket {
            code: format!("{flight}-{}", class.code_letter()),
            flight_id: flight.to_string(),
            airline_id: "BA".to_string(),
            fare_class: class,
            price,
            availability: 10,
        }
    }

    fn small_batch() -> OutputBatch {
        OutputBatch {
            airports: vec![
                Airport {
                    id: "ATH".to_string(),
                    city: "Athens".to_string(),
                    country: "CountryX".to_string(),
                },
                Airport {
                    id: "LHR".to_string(),
                    city: "London".to_string(),
                    country: "CountryX".to_string(),
                },
            ],
            airlines: vec![Airline {
                id: "BA".to_string(),
                name: "Blue Wings".to_string(),
                website: None,
            }],
            users: vec![User {
                id: "alex0@example.com".to_string(),
                password: "hash".to_string(),
            }],
            flights: vec![Flight {
                id: "BA0001".to_string(),
                airline_id: "BA".to_string(),
                departure_airport_id: "ATH".to_string(),
                arrival_airport_id: "LHR".to_string(),
                departure_time: at(8, 30),
                arrival_time: at(11, 45),
                seat_capacity: 200,
            }],
            tickets: vec![
                ticket("BA0001", FareClass::Economy, 100),
                ticket("BA0001", FareClass::Business, 250),
                ticket("BA0001", FareClass::First, 500),
            ],
            favorites: vec![Favorite {
                ticket_code: "BA0001-E".to_string(),
                flight_id: "BA0001".to_string(),
                airline_id: "BA".to_string(),
                user_id: "alex0@example.com".to_string(),
            }],
        }
    }

    #[test]
    fn accepts_consistent_batch() {
        validate_batch(&small_batch()).expect("batch is consistent");
    }

    #[test]
    fn rejects_flight_with_unknown_airport() {
        let mut batch = small_batch();
        batch.flights[0].arrival_airport_id = "JFK".to_string();
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::ReferentialGap(_))
        ));
    }

    #[test]
    fn rejects_favorite_with_unknown_user() {
        let mut batch = small_batch();
        batch.favorites[0].user_id = "ghost@example.com".to_string();
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::ReferentialGap(_))
        ));
    }

    #[test]
    fn rejects_short_flight() {
        let mut batch = small_batch();
        batch.flights[0].arrival_time = at(9, 0);
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn rejects_missing_fare_class() {
        let mut batch = small_batch();
        batch.tickets.pop();
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn rejects_non_increasing_fares() {
        let mut batch = small_batch();
        batch.tickets[1].price = 90;
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn rejects_duplicate_airline() {
        let mut batch = small_batch();
        let airline = batch.airlines[0].clone();
        batch.airlines.push(airline);
        assert!(matches!(
            validate_batch(&batch),
            Err(Error::DuplicateKey(_))
        ));
    }
}
