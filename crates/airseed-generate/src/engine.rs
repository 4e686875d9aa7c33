use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use airseed_core::{EntityKind, FareClass, OutputBatch, validate_batch};

use crate::allocator::UPPERCASE;
use crate::context::{GenerationContext, Phase};
use crate::entities::{
    AIRLINE_CODE_LEN, AIRLINE_NAMESPACE, AIRPORT_CODE_LEN, AIRPORT_NAMESPACE, EntityFactory,
};
use crate::errors::GenerationError;
use crate::favorites::FavoritesSampler;
use crate::model::{Cardinalities, GenerateOptions, GenerationIssue, GenerationReport};
use crate::pricing::PricingEngine;
use crate::reference::ReferenceData;
use crate::schedule::RouteScheduler;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub batch: OutputBatch,
    pub report: GenerationReport,
}

/// Entry point for generating a flight-booking dataset.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
    reference: Option<ReferenceData>,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            reference: None,
        }
    }

    /// Prefer real airport and airline names from `reference`.
    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = (!reference.is_empty()).then_some(reference);
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate with the window anchored on today's UTC date unless the
    /// options pin an anchor.
    pub fn run(&self) -> Result<GenerationOutput, GenerationError> {
        self.run_at(Utc::now().date_naive())
    }

    /// Generate with `today` standing in for the current date.
    ///
    /// Identical options and `today` always produce an identical batch.
    pub fn run_at(&self, today: NaiveDate) -> Result<GenerationOutput, GenerationError> {
        let outcome = self.execute(today);
        if let Err(err) = &outcome {
            warn!(seed = self.options.seed, error = %err, "generation failed");
        }
        outcome
    }

    fn execute(&self, today: NaiveDate) -> Result<GenerationOutput, GenerationError> {
        let start = Instant::now();
        let options = &self.options;
        let window = options.window.resolve(today)?;
        options.validate()?;
        let sizes = options.cardinalities(&window);

        let mut ctx = GenerationContext::new(
            options.seed,
            GenerationReport::new(options.seed, options.scale, window),
        );
        info!(
            seed = options.seed,
            scale = options.scale,
            window_start = %window.start,
            window_end = %window.end,
            airports = sizes.airports,
            airlines = sizes.airlines,
            users = sizes.users,
            routes = sizes.routes,
            favorites = sizes.favorites,
            reference = self.reference.is_some(),
            "generation started"
        );

        ctx.enter(Phase::Allocate)?;
        ctx.allocator.ensure_flight_capacity(sizes.max_route_flights)?;
        ctx.allocator.ensure_capacity(
            AIRPORT_NAMESPACE,
            UPPERCASE.len(),
            AIRPORT_CODE_LEN,
            sizes.airports,
        )?;
        ctx.allocator.ensure_capacity(
            AIRLINE_NAMESPACE,
            UPPERCASE.len(),
            AIRLINE_CODE_LEN,
            sizes.airlines,
        )?;

        ctx.enter(Phase::Entities)?;
        let phase_start = Instant::now();
        let factory = EntityFactory::new(self.reference.as_ref());
        let mut rng = ctx.rng_for("airports");
        let airports = factory.generate_airports(&mut ctx, &mut rng, sizes.airports, &options.cities)?;
        let mut rng = ctx.rng_for("airlines");
        let airlines = factory.generate_airlines(&mut ctx, &mut rng, sizes.airlines)?;
        let mut rng = ctx.rng_for("users");
        let users = factory.generate_users(&mut rng, sizes.users);
        info!(
            airports = airports.len(),
            airlines = airlines.len(),
            users = users.len(),
            duration_ms = phase_start.elapsed().as_millis() as u64,
            "entities generated"
        );

        ctx.enter(Phase::Schedule)?;
        let phase_start = Instant::now();
        let scheduler = RouteScheduler::new(
            &options.frequency,
            PricingEngine::new(&options.pricing),
            window,
            options.seat_capacity,
        );
        let mut rng = ctx.rng_for("schedule");
        let schedule = scheduler.schedule(&mut ctx, &mut rng, &airports, &airlines, sizes.routes)?;
        info!(
            routes_scheduled = ctx.report.routes_scheduled,
            routes_skipped = ctx.report.routes_skipped,
            flights = schedule.flights.len(),
            tickets = schedule.tickets.len(),
            duration_ms = phase_start.elapsed().as_millis() as u64,
            "flights scheduled"
        );

        ctx.enter(Phase::Favorites)?;
        if sizes.favorites > 0 && schedule.tickets.is_empty() {
            ctx.warn(
                GenerationIssue::warning(
                    "no_tickets_for_favorites",
                    "no tickets were generated; favorites skipped",
                )
                .with_table(EntityKind::Favorite.table_name()),
            );
        }
        let mut rng = ctx.rng_for("favorites");
        let sampled = FavoritesSampler::new(sizes.favorites).sample(&mut rng, &schedule.tickets, &users);
        ctx.report.favorites_collapsed = sampled.collapsed;
        info!(
            favorites = sampled.favorites.len(),
            collapsed = sampled.collapsed,
            "favorites sampled"
        );

        ctx.enter(Phase::Finalize)?;
        let batch = OutputBatch {
            airports,
            airlines,
            users,
            flights: schedule.flights,
            tickets: schedule.tickets,
            favorites: sampled.favorites,
        };
        validate_batch(&batch)?;

        for kind in EntityKind::ORDERED {
            let requested = requested_rows(kind, &sizes, &batch);
            ctx.report
                .record_table(kind.table_name(), requested, batch.len_of(kind) as u64);
        }
        ctx.report.allocator_retries = ctx.allocator.retries();
        ctx.report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            seed = options.seed,
            flights = batch.flights.len(),
            tickets = batch.tickets.len(),
            favorites = batch.favorites.len(),
            warnings = ctx.report.warnings.len(),
            allocator_retries = ctx.report.allocator_retries,
            duration_ms = ctx.report.duration_ms,
            "generation completed"
        );

        Ok(GenerationOutput {
            batch,
            report: ctx.report,
        })
    }
}

/// Rows each table was asked for. Flights are driven by route tiers, so their
/// target is the scaled base count; tickets follow the flights.
fn requested_rows(kind: EntityKind, sizes: &Cardinalities, batch: &OutputBatch) -> u64 {
    match kind {
        EntityKind::Airport => sizes.airports,
        EntityKind::Airline => sizes.airlines,
        EntityKind::User => sizes.users,
        EntityKind::Flight => sizes.flights,
        EntityKind::Ticket => (batch.flights.len() * FareClass::ALL.len()) as u64,
        EntityKind::Favorite => sizes.favorites,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScheduleWindow;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
    }

    fn small_options() -> GenerateOptions {
        GenerateOptions {
            seed: 7,
            scale: 0.01,
            window: ScheduleWindow {
                anchor: Some(anchor()),
                start_offset_days: 2,
                duration_days: 7,
            },
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn reports_every_table_in_order() {
        let output = GenerationEngine::new(small_options())
            .run_at(anchor())
            .expect("generate");
        let tables: Vec<&str> = output.report.tables.iter().map(|t| t.table.as_str()).collect();
        assert_eq!(
            tables,
            vec!["airport", "airline", "user", "flight", "ticket", "favorite"]
        );
        let tickets = output.report.table("ticket").expect("ticket report");
        assert_eq!(tickets.rows_generated, tickets.rows_requested);
        assert_eq!(
            output.report.flights_by_tier.values().sum::<u64>(),
            output.batch.flights.len() as u64
        );
    }

    #[test]
    fn invalid_window_wins_over_other_errors() {
        let mut options = small_options();
        options.window.duration_days = 0;
        options.scale = -1.0;
        let result = GenerationEngine::new(options).run_at(anchor());
        assert!(matches!(result, Err(GenerationError::InvalidWindow { .. })));
    }

    #[test]
    fn empty_reference_data_is_ignored() {
        let engine = GenerationEngine::new(small_options()).with_reference(ReferenceData::default());
        assert!(engine.reference.is_none());
    }
}
