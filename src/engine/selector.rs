use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::sheet::record::{Selection, WordRecord};

/// Picks the least practiced words for the next session.
///
/// Words are ranked by practice count, lowest first. Words that share a
/// count are shuffled on every call so the same handful does not always
/// lead its level.
pub struct WordSelector {
    rng: SmallRng,
}

impl WordSelector {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Selector with a reproducible tie-break order.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn select(&mut self, dataset: &[WordRecord], count: usize) -> Selection {
        select_with_rng(dataset, count, &mut self.rng)
    }
}

impl Default for WordSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank `dataset` by practice count and return the first `count` words.
///
/// The dataset itself is left untouched; the selection is a fresh vector.
pub fn select_with_rng<R: Rng + ?Sized>(
    dataset: &[WordRecord],
    count: usize,
    rng: &mut R,
) -> Selection {
    if dataset.is_empty() || count == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<&WordRecord> = dataset.iter().collect();
    ranked.sort_by_key(|record| record.practiced);

    let mut seen = 0;
    for level in ranked.chunk_by_mut(|a, b| a.practiced == b.practiced) {
        level.shuffle(rng);
        seen += level.len();
        // Levels past the cut never reach the selection
        if seen >= count {
            break;
        }
    }

    ranked.into_iter().take(count).cloned().collect()
}
