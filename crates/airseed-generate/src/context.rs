use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::allocator::IdentifierAllocator;
use crate::errors::GenerationError;
use crate::model::{GenerationIssue, GenerationReport};

/// Pipeline phases. A run walks them strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Allocate,
    Entities,
    Schedule,
    Favorites,
    Finalize,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Allocate => "allocate",
            Phase::Entities => "entities",
            Phase::Schedule => "schedule",
            Phase::Favorites => "favorites",
            Phase::Finalize => "finalize",
        }
    }

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Allocate => Some(Phase::Entities),
            Phase::Entities => Some(Phase::Schedule),
            Phase::Schedule => Some(Phase::Favorites),
            Phase::Favorites => Some(Phase::Finalize),
            Phase::Finalize => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one generation run: the seed, the identifier allocator,
/// the current phase and the report being assembled.
#[derive(Debug)]
pub struct GenerationContext {
    seed: u64,
    phase: Option<Phase>,
    pub allocator: IdentifierAllocator,
    pub report: GenerationReport,
}

impl GenerationContext {
    pub fn new(seed: u64, report: GenerationReport) -> Self {
        Self {
            seed,
            phase: None,
            allocator: IdentifierAllocator::new(),
            report,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Move to `next`, which must directly follow the current phase.
    pub fn enter(&mut self, next: Phase) -> Result<(), GenerationError> {
        let expected = match self.phase {
            None => Some(Phase::Allocate),
            Some(current) => current.next(),
        };
        if expected != Some(next) {
            return Err(GenerationError::PhaseOrder {
                from: self.phase.map(Phase::as_str).unwrap_or("start"),
                to: next.as_str(),
            });
        }
        self.phase = Some(next);
        Ok(())
    }

    /// Independent random stream for one component, derived from the run seed.
    pub fn rng_for(&self, label: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(hash_seed(self.seed, label))
    }

    /// Log and record a non-fatal diagnostic.
    pub fn warn(&mut self, issue: GenerationIssue) {
        warn!(
            code = %issue.code,
            table = issue.table.as_deref().unwrap_or(""),
            route = issue.route.as_deref().unwrap_or(""),
            "{}",
            issue.message
        );
        self.report.record_warning(issue);
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::Rng;

    use super::*;
    use crate::model::ResolvedWindow;

    fn context(seed: u64) -> GenerationContext {
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date");
        let window = ResolvedWindow {
            start: day,
            end: day.succ_opt().expect("next day"),
        };
        GenerationContext::new(seed, GenerationReport::new(seed, 1.0, window))
    }

    #[test]
    fn phases_advance_linearly() {
        let mut ctx = context(1);
        for phase in [
            Phase::Allocate,
            Phase::Entities,
            Phase::Schedule,
            Phase::Favorites,
            Phase::Finalize,
        ] {
            ctx.enter(phase).expect("next phase");
        }
        assert_eq!(ctx.phase(), Some(Phase::Finalize));
    }

    #[test]
    fn skipping_or_reentering_a_phase_fails() {
        let mut ctx = context(1);
        assert!(matches!(
            ctx.enter(Phase::Entities),
            Err(GenerationError::PhaseOrder { from: "start", .. })
        ));
        ctx.enter(Phase::Allocate).expect("allocate");
        assert!(ctx.enter(Phase::Allocate).is_err());
        assert!(ctx.enter(Phase::Schedule).is_err());
    }

    #[test]
    fn component_streams_are_stable_and_distinct() {
        let ctx = context(42);
        let a: u64 = ctx.rng_for("airports").random();
        let b: u64 = ctx.rng_for("airports").random();
        let c: u64 = ctx.rng_for("airlines").random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn warnings_are_counted_by_code() {
        let mut ctx = context(1);
        ctx.warn(GenerationIssue::warning("route_skipped", "no airport"));
        ctx.warn(GenerationIssue::warning("route_skipped", "no airport"));
        assert_eq!(ctx.report.warnings_by_code.get("route_skipped"), Some(&2));
        assert_eq!(ctx.report.warnings.len(), 2);
    }
}
