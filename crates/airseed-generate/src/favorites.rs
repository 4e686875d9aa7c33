use std::collections::HashSet;

use rand::Rng;

use airseed_core::{Favorite, Ticket, User};

/// Draws (ticket, user) pairs uniformly with replacement.
#[derive(Debug, Clone, Copy)]
pub struct FavoritesSampler {
    target: u64,
}

/// Favorites kept after deduplication, and how many draws repeated a pair.
#[derive(Debug, Clone, Default)]
pub struct SampledFavorites {
    pub favorites: Vec<Favorite>,
    pub collapsed: u64,
}

impl FavoritesSampler {
    pub fn new(target: u64) -> Self {
        Self { target }
    }

    /// Perform `target` draws; repeated pairs keep their first occurrence.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        tickets: &[Ticket],
        users: &[User],
    ) -> SampledFavorites {
        let mut sampled = SampledFavorites::default();
        if tickets.is_empty() || users.is_empty() {
            return sampled;
        }

        let mut seen = HashSet::new();
        for _ in 0..self.target {
            let ticket_index = rng.random_range(0..tickets.len());
            let user_index = rng.random_range(0..users.len());
            if !seen.insert((ticket_index, user_index)) {
                sampled.collapsed += 1;
                continue;
            }
            sampled.favorites.push(Favorite::new(
                tickets[ticket_index].key(),
                users[user_index].id.clone(),
            ));
        }
        sampled
    }
}
