// ============================================================================
// metrics.rs — Aviary
// Per-generation foraging statistics, returned by `train` and logged at the
// end of every generation.
// ============================================================================

/// Satiation summary of one finished generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub population: usize,
    pub min_satiation: usize,
    pub max_satiation: usize,
    pub avg_satiation: f64,
    /// Food items eaten by the whole population.
    pub total_eaten: usize,
}

impl GenerationStats {
    pub fn from_satiation<I>(generation: usize, satiation: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut population = 0usize;
        let mut min_satiation = usize::MAX;
        let mut max_satiation = 0usize;
        let mut total_eaten = 0usize;

        for s in satiation {
            population += 1;
            total_eaten += s;
            min_satiation = min_satiation.min(s);
            max_satiation = max_satiation.max(s);
        }

        if population == 0 {
            min_satiation = 0;
        }
        let avg_satiation = if population > 0 {
            total_eaten as f64 / population as f64
        } else {
            0.0
        };

        Self {
            generation,
            population,
            min_satiation,
            max_satiation,
            avg_satiation,
            total_eaten,
        }
    }

    /// Log at INFO level, with the change in average from `prev` if known.
    pub fn log(&self, prev: Option<&GenerationStats>) {
        let delta = prev
            .map(|p| format!(" ({:+.2})", self.avg_satiation - p.avg_satiation))
            .unwrap_or_default();
        log::info!(
            "Generation {} done: population={} eaten={} satiation min={} max={} avg={:.2}{}",
            self.generation,
            self.population,
            self.total_eaten,
            self.min_satiation,
            self.max_satiation,
            self.avg_satiation,
            delta,
        );
    }
}
