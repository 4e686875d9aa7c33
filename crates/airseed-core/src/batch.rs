use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Airline, Airport, Favorite, Flight, Ticket, User};

/// The six entity batches, in foreign-key dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Airport,
    Airline,
    User,
    Flight,
    Ticket,
    Favorite,
}

impl EntityKind {
    /// Insert order that satisfies every foreign key.
    pub const ORDERED: [EntityKind; 6] = [
        EntityKind::Airport,
        EntityKind::Airline,
        EntityKind::User,
        EntityKind::Flight,
        EntityKind::Ticket,
        EntityKind::Favorite,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Airport => "airport",
            EntityKind::Airline => "airline",
            EntityKind::User => "user",
            EntityKind::Flight => "flight",
            EntityKind::Ticket => "ticket",
            EntityKind::Favorite => "favorite",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Finished snapshot produced by one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputBatch {
    pub airports: Vec<Airport>,
    pub airlines: Vec<Airline>,
    pub users: Vec<User>,
    pub flights: Vec<Flight>,
    pub tickets: Vec<Ticket>,
    pub favorites: Vec<Favorite>,
}

impl OutputBatch {
    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Airport => self.airports.len(),
            EntityKind::Airline => self.airlines.len(),
            EntityKind::User => self.users.len(),
            EntityKind::Flight => self.flights.len(),
            EntityKind::Ticket => self.tickets.len(),
            EntityKind::Favorite => self.favorites.len(),
        }
    }

    /// Row counts per batch in insert order.
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        EntityKind::ORDERED
            .iter()
            .map(|kind| (*kind, self.len_of(*kind)))
            .collect()
    }
}
