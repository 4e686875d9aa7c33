use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An airport identified by a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub city: String,
    pub country: String,
}

/// An operating airline identified by a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub id: String,
    pub name: String,
    pub website: Option<String>,
}

/// A user account. `password` holds a placeholder hash, not a real credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub password: String,
}

/// A scheduled flight between two airports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub airline_id: String,
    pub departure_airport_id: String,
    pub arrival_airport_id: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub seat_capacity: u32,
}

impl Flight {
    /// Flight duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_time - self.departure_time).num_minutes()
    }
}

/// Fare classes sold on every flight, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareClass {
    Economy,
    Business,
    First,
}

impl FareClass {
    pub const ALL: [FareClass; 3] = [FareClass::Economy, FareClass::Business, FareClass::First];

    pub fn as_str(self) -> &'static str {
        match self {
            FareClass::Economy => "economy",
            FareClass::Business => "business",
            FareClass::First => "first",
        }
    }

    /// First letter of the class name, used to derive ticket codes.
    pub fn code_letter(self) -> char {
        match self {
            FareClass::Economy => 'E',
            FareClass::Business => 'B',
            FareClass::First => 'F',
        }
    }
}

impl fmt::Display for FareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketKey {
    pub code: String,
    pub flight_id: String,
    pub airline_id: String,
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.code, self.flight_id, self.airline_id)
    }
}

/// One fare class offered on a flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub code: String,
    pub flight_id: String,
    pub airline_id: String,
    pub fare_class: FareClass,
    pub price: i64,
    pub availability: u32,
}

impl Ticket {
    pub fn key(&self) -> TicketKey {
        TicketKey {
            code: self.code.clone(),
            flight_id: self.flight_id.clone(),
            airline_id: self.airline_id.clone(),
        }
    }
}

/// A user bookmark on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Favorite {
    pub ticket_code: String,
    pub flight_id: String,
    pub airline_id: String,
    pub user_id: String,
}

impl Favorite {
    pub fn new(ticket: TicketKey, user_id: String) -> Self {
        Self {
            ticket_code: ticket.code,
            flight_id: ticket.flight_id,
            airline_id: ticket.airline_id,
            user_id,
        }
    }

    pub fn ticket_key(&self) -> TicketKey {
        TicketKey {
            code: self.ticket_code.clone(),
            flight_id: self.flight_id.clone(),
            airline_id: self.airline_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fare_classes_are_ordered_by_cabin() {
        assert!(FareClass::Economy < FareClass::Business);
        assert!(FareClass::Business < FareClass::First);
        let letters: String = FareClass::ALL.iter().map(|class| class.code_letter()).collect();
        assert_eq!(letters, "EBF");
    }

    #[test]
    fn favorite_round_trips_ticket_key() {
        let key = TicketKey {
            code: "BA0042-E".to_string(),
            flight_id: "BA0042".to_string(),
            airline_id: "BA".to_string(),
        };
        let favorite = Favorite::new(key.clone(), "maria3@example.com".to_string());
        assert_eq!(favorite.ticket_key(), key);
        assert_eq!(key.to_string(), "BA0042-E/BA0042/BA");
    }
}
