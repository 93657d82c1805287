use crate::level::LevelKind;
use crate::profile::PlayerProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the population is cut back to size after each growth phase.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Keep exactly the `normal_population` fittest candidates.
    #[default]
    TopK,
    /// Keep the `normal_population` fittest, then drop every other candidate of
    /// the remainder until only `normal_population` candidates are left beyond
    /// the dropping point. With 10 and 50 this keeps 35 candidates.
    Thinning,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GaConfig {
    /// Population size after truncation (low-water mark)
    pub normal_population: usize,
    /// Population size reached by each growth phase (high-water mark)
    pub max_population: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// `is_converged` turns true once this many generations have run
    pub max_iterations: usize,
    /// Aggregate fitness change below which a generation is reported as stable.
    /// Informational only, it does not stop the search.
    pub convergence_threshold: f64,
    #[serde(default)]
    pub truncation: TruncationPolicy,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            normal_population: 10,
            max_population: 50,
            crossover_rate: 0.90,
            mutation_rate: 0.60,
            max_iterations: 10_000,
            convergence_threshold: 0.00005,
            truncation: TruncationPolicy::TopK,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    /// Seeds the single random stream of a run; equal seeds replay the same run
    pub seed: u64,
    #[serde(default)]
    pub kind: LevelKind,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    /// Where the best level is written as JSON
    pub export_path: String,
    /// Stop after this many generations even if `max_iterations` is not reached
    pub generations: Option<usize>,
    #[serde(default)]
    pub print_level: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub ga: GaConfig,
    pub level: LevelConfig,
    pub profile: PlayerProfile,
    pub output: OutputConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Checks the values serde cannot: probability ranges and population bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ga.validate()?;
        if self.level.width == 0 || self.level.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "level size must be non-zero, got {}x{}",
                self.level.width, self.level.height
            )));
        }
        Ok(())
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "{} must lie in [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.normal_population == 0 {
            return Err(ConfigError::Invalid(
                "normal_population must be at least 1".to_string(),
            ));
        }
        if self.normal_population >= self.max_population {
            return Err(ConfigError::Invalid(format!(
                "normal_population ({}) must be below max_population ({})",
                self.normal_population, self.max_population
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[ga]
normal_population = 10
max_population = 50
crossover_rate = 0.9
mutation_rate = 0.6
max_iterations = 10000
convergence_threshold = 0.00005
truncation = "thinning"

[level]
width = 160
height = 15
seed = 1234
kind = "castle"

[profile]
coins = 5
jumps = 3
kills = 2

[output]
export_path = "best_level.json"
generations = 200
"#;

    #[test]
    fn test_load_sample_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ga.truncation, TruncationPolicy::Thinning);
        assert_eq!(config.level.kind, LevelKind::Castle);
        assert_eq!(config.profile, PlayerProfile::new(5, 3, 2));
        assert_eq!(config.output.generations, Some(200));
        assert!(!config.output.print_level);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::load(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::FileReadError(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[ga]\nnormal_population = \"ten\"").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = GaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.truncation, TruncationPolicy::TopK);
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let mut config = GaConfig::default();
        config.normal_population = 50;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GaConfig::default();
        config.mutation_rate = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GaConfig::default();
        config.normal_population = 0;
        assert!(config.validate().is_err());
    }
}
