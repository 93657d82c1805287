pub mod crossover;
pub mod fitness;
pub mod mutation;
pub mod selection;

use crate::config::{ConfigError, GaConfig, LevelConfig, TruncationPolicy};
use crate::evolution::fitness::{ElementCounts, count_elements, evaluate};
use crate::level::generator::LevelSource;
use crate::level::{LevelError, LevelGrid};
use crate::profile::PlayerProfile;
use log::{debug, info, warn};
use rand::prelude::*;
use rand_pcg::Pcg64;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::cmp::Ordering;
use thiserror::Error;

/// Fitness marker for a candidate whose level changed since it was last scored
pub const UNEVALUATED: f64 = f64::NEG_INFINITY;

#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("Unusable GA settings: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Level source returned a {got_width}x{got_height} level, expected {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
    #[error("Level source failed: {0}")]
    Level(#[from] LevelError),
}

/// One level in the population together with its score.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub grid: LevelGrid,
    /// Only meaningful right after an evaluation; `UNEVALUATED` otherwise
    pub fitness: f64,
}

impl Candidate {
    /// Wraps a level that still has to be scored.
    pub fn new(grid: LevelGrid) -> Self {
        Self {
            grid,
            fitness: UNEVALUATED,
        }
    }

    fn evaluated(grid: LevelGrid, profile: &PlayerProfile) -> Self {
        let mut candidate = Self::new(grid);
        candidate.evaluate(profile);
        candidate
    }

    /// Rescores the level; required after any edit to `grid`.
    pub fn evaluate(&mut self, profile: &PlayerProfile) {
        self.fitness = evaluate(&self.grid, profile);
    }

    pub fn counts(&self) -> ElementCounts {
        count_elements(&self.grid)
    }
}

fn by_descending_fitness(a: &Candidate, b: &Candidate) -> Ordering {
    b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal)
}

/// Drives the search: every `step` grows the population to its high-water mark
/// with offspring, cuts it back and keeps a copy of the best level seen so far.
///
/// All randomness comes from one seeded stream, so a given configuration and
/// seed always replays the same search.
#[derive(Clone)]
pub struct GeneticAlgorithm<'a> {
    /// This is a reference to the user-defined config for a given evolution run
    config: &'a GaConfig,
    profile: PlayerProfile,
    /// Sorted by descending fitness after every step
    population: Vec<Candidate>,
    /// Deep copy of the fittest candidate ever seen, never shared with `population`
    best: Candidate,
    rng: Pcg64,
    iteration: usize,
    prev_error: f64,
    delta_error: f64,
}

impl<'a> GeneticAlgorithm<'a> {
    /// Creates the engine and its starting population.
    ///
    /// Every starting level comes from `source`, seeded from the run's random
    /// stream, and is scored against `profile` before the first step.
    ///
    /// # Arguments
    /// * `config` - Reference to the `GaConfig` holding population bounds and rates
    /// * `level` - Size, seed and kind of the levels to evolve
    /// * `profile` - The target counts levels are scored against
    /// * `source` - Where starting levels come from
    ///
    /// # Returns
    /// * `Result<Self, EvolutionError>` - An error if the GA settings are unusable
    ///   or the source cannot produce levels of the requested size
    pub fn new(
        config: &'a GaConfig,
        level: &LevelConfig,
        profile: PlayerProfile,
        source: &dyn LevelSource,
    ) -> Result<Self, EvolutionError> {
        config.validate()?;

        info!(
            "Initializing population of {} {}x{} levels...",
            config.normal_population, level.width, level.height
        );
        let mut rng = Pcg64::seed_from_u64(level.seed);
        let mut grids = Vec::with_capacity(config.normal_population);
        for _ in 0..config.normal_population {
            let grid = source.generate(level.width, level.height, rng.random(), level.kind)?;
            if grid.width() != level.width || grid.height() != level.height {
                return Err(EvolutionError::DimensionMismatch {
                    width: level.width,
                    height: level.height,
                    got_width: grid.width(),
                    got_height: grid.height(),
                });
            }
            grids.push(grid);
        }

        // Scoring is pure, so the starting levels can be scored in parallel
        let mut population: Vec<Candidate> = grids
            .into_par_iter()
            .map(|grid| Candidate::evaluated(grid, &profile))
            .collect();
        population.sort_by(by_descending_fitness);

        let best = population[0].clone();
        info!("Initial best fitness: {:.4}", best.fitness);

        Ok(Self {
            config,
            profile,
            population,
            best,
            rng,
            iteration: 0,
            prev_error: f64::MAX,
            delta_error: config.convergence_threshold,
        })
    }

    /// Runs one generation.
    ///
    /// Grows the population to `max_population` with offspring, records the change
    /// of the summed fitness, truncates according to the configured policy and
    /// updates the best-ever candidate.
    pub fn step(&mut self) {
        self.iteration += 1;
        self.population.sort_by(by_descending_fitness);

        while self.population.len() < self.config.max_population {
            match self.breed() {
                Some(offspring) => self.population.push(offspring),
                None => {
                    warn!("Population is empty, nothing to breed from");
                    return;
                }
            }
        }

        let error: f64 = self.population.iter().map(|c| c.fitness).sum();
        self.delta_error = (error - self.prev_error).abs();
        self.prev_error = error;
        if self.delta_error < self.config.convergence_threshold {
            debug!(
                "Gen {}: aggregate fitness stable (delta {:.6})",
                self.iteration, self.delta_error
            );
        }

        self.population.sort_by(by_descending_fitness);
        self.truncate();

        if self.population[0].fitness > self.best.fitness {
            self.best = self.population[0].clone();
            info!(
                "Gen {}: new best fitness {:.4}",
                self.iteration, self.best.fitness
            );
        }
        self.best.evaluate(&self.profile);

        debug!(
            "Gen {}: Top Fitness={:.4} | Best Ever={:.4} | Population={} | Delta={:.6}",
            self.iteration,
            self.population[0].fitness,
            self.best.fitness,
            self.population.len(),
            self.delta_error
        );
    }

    /// Produces one scored offspring from two rank-selected parents.
    fn breed(&mut self) -> Option<Candidate> {
        let parent1 = selection::select(&self.population, &mut self.rng)?;
        let parent2 = selection::select(&self.population, &mut self.rng)?;

        let mut grid = if self.rng.random_bool(self.config.crossover_rate) {
            crossover::crossover(&parent1.grid, &parent2.grid, &mut self.rng)
        } else if self.rng.random_bool(0.5) {
            parent1.grid.clone()
        } else {
            parent2.grid.clone()
        };

        if self.rng.random_bool(self.config.mutation_rate) {
            mutation::mutate(&mut grid, &mut self.rng);
        }

        Some(Candidate::evaluated(grid, &self.profile))
    }

    /// Cuts the sorted population back after growth.
    fn truncate(&mut self) {
        let keep = self.config.normal_population;
        match self.config.truncation {
            TruncationPolicy::TopK => self.population.truncate(keep),
            TruncationPolicy::Thinning => {
                let mut i = keep;
                while i + keep < self.population.len() {
                    self.population.remove(i);
                    i += 1;
                }
            }
        }
    }

    /// Population size right after truncation, once growth has reached
    /// `max_population`.
    pub fn steady_state_size(&self) -> usize {
        let keep = self.config.normal_population;
        let max = self.config.max_population;
        match self.config.truncation {
            TruncationPolicy::TopK => keep,
            TruncationPolicy::Thinning => {
                let (mut len, mut i) = (max, keep);
                while i + keep < len {
                    len -= 1;
                    i += 1;
                }
                len
            }
        }
    }

    /// `true` once more than `max_iterations` generations have run.
    pub fn is_converged(&self) -> bool {
        self.iteration > self.config.max_iterations
    }

    /// Steps until `is_converged` or until `generations` steps have run.
    ///
    /// # Returns
    /// * `usize` - The number of steps taken
    pub fn run(&mut self, generations: Option<usize>) -> usize {
        let mut steps = 0;
        while !self.is_converged() && generations.is_none_or(|g| steps < g) {
            self.step();
            steps += 1;
            if self.iteration % 100 == 0 {
                info!(
                    "--- Generation {}: best fitness {:.4} ---",
                    self.iteration, self.best.fitness
                );
            }
        }
        steps
    }

    /// The best level found so far. Its fitness and element counts are logged.
    pub fn best_result(&self) -> &Candidate {
        let counts = self.best.counts();
        info!("Fitness rating: {:.4}", self.best.fitness);
        info!("Number of coins: {}", counts.coins);
        info!("Number of jumps: {}", counts.jumps);
        info!("Number of enemies: {}", counts.enemies);
        &self.best
    }

    pub fn best_fitness(&self) -> f64 {
        self.best.fitness
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Change of the summed population fitness during the last step. Tracked for
    /// reporting only.
    pub fn delta_error(&self) -> f64 {
        self.delta_error
    }
}
