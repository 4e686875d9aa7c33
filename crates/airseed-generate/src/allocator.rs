use std::collections::{BTreeMap, HashSet};

use rand::Rng;

use crate::errors::GenerationError;

/// Uppercase ASCII letters, the alphabet of airport and airline codes.
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Namespace holding every flight id issued during a run.
pub const FLIGHT_NAMESPACE: &str = "flight";

/// Largest numeric suffix of a flight id (`XX0001` through `XX9999`).
pub const FLIGHT_NUMBER_MAX: u32 = 9999;

const ATTEMPT_FACTOR: u128 = 32;
const MAX_ATTEMPTS: u64 = 1_000_000;

/// Issues random codes that are unique within their namespace for one run.
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    namespaces: BTreeMap<String, HashSet<String>>,
    retries: u64,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail early when `requested` codes cannot fit the code space.
    pub fn ensure_capacity(
        &self,
        namespace: &str,
        charset_len: usize,
        length: usize,
        requested: u64,
    ) -> Result<(), GenerationError> {
        let capacity = code_space(charset_len, length);
        if requested > capacity {
            return Err(GenerationError::NamespaceExhausted {
                namespace: namespace.to_string(),
                requested,
                capacity,
            });
        }
        Ok(())
    }

    /// Fail early when one route needs more flight numbers than an airline owns.
    pub fn ensure_flight_capacity(&self, route_flights: u64) -> Result<(), GenerationError> {
        let capacity = u64::from(FLIGHT_NUMBER_MAX);
        if route_flights > capacity {
            return Err(GenerationError::NamespaceExhausted {
                namespace: FLIGHT_NAMESPACE.to_string(),
                requested: route_flights,
                capacity,
            });
        }
        Ok(())
    }

    /// Flight numbers `airline_code` can still issue.
    pub fn flight_numbers_left(&self, airline_code: &str) -> u64 {
        let issued = self.issued(&format!("{FLIGHT_NAMESPACE}.{airline_code}")) as u64;
        u64::from(FLIGHT_NUMBER_MAX).saturating_sub(issued)
    }

    /// Draw a fresh `length`-character code from `charset`.
    pub fn allocate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        namespace: &str,
        charset: &[u8],
        length: usize,
    ) -> Result<String, GenerationError> {
        if charset.is_empty() || length == 0 {
            return Err(GenerationError::InvalidConfig(format!(
                "namespace '{namespace}' needs a non-empty charset and length"
            )));
        }
        let capacity = code_space(charset.len(), length);
        self.draw_unique(rng, &[namespace], capacity, |rng| {
            (0..length)
                .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
                .collect()
        })
    }

    /// Compose `airline_code` with a random four-digit suffix.
    ///
    /// Each airline owns a sub-namespace of [`FLIGHT_NUMBER_MAX`] ids; the
    /// result is also unique across every airline.
    pub fn allocate_flight_id<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        airline_code: &str,
    ) -> Result<String, GenerationError> {
        let airline_namespace = format!("{FLIGHT_NAMESPACE}.{airline_code}");
        self.draw_unique(
            rng,
            &[airline_namespace.as_str(), FLIGHT_NAMESPACE],
            u64::from(FLIGHT_NUMBER_MAX),
            |rng| {
                let number = rng.random_range(1..=FLIGHT_NUMBER_MAX);
                format!("{airline_code}{number:04}")
            },
        )
    }

    /// Record an externally supplied code. Returns `false` when it was already issued.
    pub fn reserve(&mut self, namespace: &str, code: &str) -> bool {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(code.to_string())
    }

    pub fn is_issued(&self, namespace: &str, code: &str) -> bool {
        self.namespaces
            .get(namespace)
            .map(|issued| issued.contains(code))
            .unwrap_or(false)
    }

    pub fn issued(&self, namespace: &str) -> usize {
        self.namespaces.get(namespace).map(HashSet::len).unwrap_or(0)
    }

    /// Number of draws that collided with an already issued code.
    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Draw until a candidate is absent from every namespace in `namespaces`.
    /// The first namespace bounds the attempt count.
    fn draw_unique<R, F>(
        &mut self,
        rng: &mut R,
        namespaces: &[&str],
        capacity: u64,
        mut draw: F,
    ) -> Result<String, GenerationError>
    where
        R: Rng + ?Sized,
        F: FnMut(&mut R) -> String,
    {
        let primary = namespaces.first().copied().unwrap_or(FLIGHT_NAMESPACE);
        let issued = self.issued(primary) as u64;
        let exhausted = || GenerationError::NamespaceExhausted {
            namespace: primary.to_string(),
            requested: issued + 1,
            capacity,
        };
        if issued >= capacity {
            return Err(exhausted());
        }

        let bound = attempt_bound(capacity, issued);
        for attempt in 0..bound {
            let candidate = draw(rng);
            let taken = namespaces
                .iter()
                .any(|namespace| self.is_issued(namespace, &candidate));
            if taken {
                continue;
            }
            for namespace in namespaces {
                self.reserve(namespace, &candidate);
            }
            self.retries += attempt;
            return Ok(candidate);
        }

        self.retries += bound;
        Err(exhausted())
    }
}

/// Number of distinct codes of `length` characters over `charset_len` symbols.
pub fn code_space(charset_len: usize, length: usize) -> u64 {
    let Ok(exponent) = u32::try_from(length) else {
        return u64::MAX;
    };
    (charset_len as u64)
        .checked_pow(exponent)
        .unwrap_or(u64::MAX)
}

/// Attempts allowed for the next draw: proportional to how crowded the
/// namespace is, `ATTEMPT_FACTOR * capacity / free`.
fn attempt_bound(capacity: u64, issued: u64) -> u64 {
    let free = u128::from(capacity.saturating_sub(issued)).max(1);
    let bound = (ATTEMPT_FACTOR * u128::from(capacity)).div_ceil(free);
    u64::try_from(bound).unwrap_or(MAX_ATTEMPTS).min(MAX_ATTEMPTS)
}
