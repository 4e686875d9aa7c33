use rand::Rng;
use rand::seq::IndexedRandom;
use sha2::{Digest, Sha256};

use airseed_core::{Airline, Airport, User};

use crate::allocator::UPPERCASE;
use crate::context::GenerationContext;
use crate::errors::GenerationError;
use crate::model::GenerationIssue;
use crate::reference::ReferenceData;

pub const AIRPORT_NAMESPACE: &str = "airport";
pub const AIRPORT_CODE_LEN: usize = 3;
pub const AIRLINE_NAMESPACE: &str = "airline";
pub const AIRLINE_CODE_LEN: usize = 2;

/// Country written on synthetic airports.
pub const PLACEHOLDER_COUNTRY: &str = "CountryX";

const AIRLINE_ADJECTIVES: [&str; 10] = [
    "Global", "Blue", "Sky", "Prime", "Express", "United", "Star", "Swift", "Aero", "Atlantic",
];
const AIRLINE_NOUNS: [&str; 5] = ["Air", "Jet", "Fly", "Wings", "Lines"];
const FIRST_NAMES: [&str; 15] = [
    "alex", "maria", "john", "kate", "nick", "sofia", "paul", "irene", "george", "lena", "bruce",
    "clark", "diana", "peter", "natasha",
];

/// Produces airports, airlines and users, drawing on reference data when loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityFactory<'a> {
    reference: Option<&'a ReferenceData>,
}

impl<'a> EntityFactory<'a> {
    pub fn new(reference: Option<&'a ReferenceData>) -> Self {
        Self { reference }
    }

    /// `count` airports. Every city receives one before any city gets a second.
    pub fn generate_airports<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        rng: &mut R,
        count: u64,
        cities: &[String],
    ) -> Result<Vec<Airport>, GenerationError> {
        let mut airports = Vec::new();
        if cities.is_empty() {
            return Ok(airports);
        }

        // one airport per city before any city gets a second
        if let Some(reference) = self.reference {
            for city in cities {
                if airports.len() as u64 >= count {
                    break;
                }
                if let Some(found) = reference.airports.iter().find(|a| &a.city == city) {
                    push_reference_airport(ctx, &mut airports, &found.code, city, &found.country);
                }
            }
        }
        for city in cities {
            if airports.len() as u64 >= count {
                break;
            }
            if airports.iter().any(|airport| &airport.city == city) {
                continue;
            }
            airports.push(synthetic_airport(ctx, rng, city)?);
        }

        if let Some(reference) = self.reference {
            for found in &reference.airports {
                if airports.len() as u64 >= count {
                    break;
                }
                let placed = airports.iter().any(|airport| airport.id == found.code);
                if !placed && cities.contains(&found.city) {
                    push_reference_airport(ctx, &mut airports, &found.code, &found.city, &found.country);
                }
            }
        }
        while (airports.len() as u64) < count {
            let city = cities
                .choose(rng)
                .ok_or_else(|| GenerationError::InvalidConfig("no cities configured".to_string()))?;
            airports.push(synthetic_airport(ctx, rng, city)?);
        }
        Ok(airports)
    }

    /// `count` airlines named `"<adjective> <noun>"` unless reference names are loaded.
    pub fn generate_airlines<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        rng: &mut R,
        count: u64,
    ) -> Result<Vec<Airline>, GenerationError> {
        let mut airlines = Vec::new();

        if let Some(reference) = self.reference {
            for found in &reference.airlines {
                if airlines.len() as u64 >= count {
                    break;
                }
                if !ctx.allocator.reserve(AIRLINE_NAMESPACE, &found.code) {
                    ctx.warn(
                        GenerationIssue::warning(
                            "duplicate_reference_code",
                            format!("airline code {} appears twice in reference data", found.code),
                        )
                        .with_table("airline"),
                    );
                    continue;
                }
                airlines.push(Airline {
                    id: found.code.clone(),
                    name: found.name.clone(),
                    website: None,
                });
            }
        }

        while (airlines.len() as u64) < count {
            let id = ctx
                .allocator
                .allocate(rng, AIRLINE_NAMESPACE, UPPERCASE, AIRLINE_CODE_LEN)?;
            let adjective = pick(rng, &AIRLINE_ADJECTIVES);
            let noun = pick(rng, &AIRLINE_NOUNS);
            airlines.push(Airline {
                website: Some(format!("https://www.{}.example", id.to_ascii_lowercase())),
                name: format!("{adjective} {noun}"),
                id,
            });
        }
        Ok(airlines)
    }

    /// `count` users with ids `<name><index>@example.com`, unique by index.
    pub fn generate_users<R: Rng + ?Sized>(&self, rng: &mut R, count: u64) -> Vec<User> {
        (0..count)
            .map(|index| {
                let id = format!("{}{index}@example.com", pick(rng, &FIRST_NAMES));
                User {
                    password: hash_password(&id),
                    id,
                }
            })
            .collect()
    }
}

fn push_reference_airport(
    ctx: &mut GenerationContext,
    airports: &mut Vec<Airport>,
    code: &str,
    city: &str,
    country: &str,
) {
    if !ctx.allocator.reserve(AIRPORT_NAMESPACE, code) {
        ctx.warn(
            GenerationIssue::warning(
                "duplicate_reference_code",
                format!("airport code {code} appears twice in reference data"),
            )
            .with_table("airport"),
        );
        return;
    }
    airports.push(Airport {
        id: code.to_string(),
        city: city.to_string(),
        country: if country.is_empty() {
            PLACEHOLDER_COUNTRY.to_string()
        } else {
            country.to_string()
        },
    });
}

fn synthetic_airport<R: Rng + ?Sized>(
    ctx: &mut GenerationContext,
    rng: &mut R,
    city: &str,
) -> Result<Airport, GenerationError> {
    let id = ctx
        .allocator
        .allocate(rng, AIRPORT_NAMESPACE, UPPERCASE, AIRPORT_CODE_LEN)?;
    Ok(Airport {
        id,
        city: city.to_string(),
        country: PLACEHOLDER_COUNTRY.to_string(),
    })
}

fn pick<'p, R: Rng + ?Sized>(rng: &mut R, pool: &'p [&'p str]) -> &'p str {
    pool[rng.random_range(0..pool.len())]
}

/// Lowercase hex SHA-256 digest used as the stored password.
pub fn hash_password(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
