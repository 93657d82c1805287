use mario_levelgen::config::Config;
use mario_levelgen::evolution::GeneticAlgorithm;
use mario_levelgen::export::{LevelExport, RunConfig, render_ascii, write_export_to_json};
use mario_levelgen::level::generator::TerrainGenerator;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    log::info!("Booting level generator...");

    // 1. Load and Validate Configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = match Config::load(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    }
    log::info!("Configuration '{}' loaded and validated.", config_path);

    // 2. Build the starting population
    let mut engine = match GeneticAlgorithm::new(
        &config.ga,
        &config.level,
        config.profile,
        &TerrainGenerator,
    ) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to set up evolution: {}", e);
            process::exit(1);
        }
    };

    // 3. Evolve
    log::info!(
        "--- Starting Evolution (target: {} coins, {} jumps, {} kills) ---",
        config.profile.coins,
        config.profile.jumps,
        config.profile.kills
    );
    let steps = engine.run(config.output.generations);
    log::info!("--- Evolution Complete after {} generations ---", steps);

    // 4. Report and export
    let best = engine.best_result();
    if config.output.print_level {
        println!("{}", render_ascii(&best.grid));
    }

    let run = RunConfig {
        ga: config.ga.clone(),
        level: config.level.clone(),
        profile: config.profile,
    };
    let export = LevelExport::new(best, run, engine.iteration());
    let output_path = Path::new(&config.output.export_path);
    match write_export_to_json(&export, output_path) {
        Ok(()) => log::info!("Best level written to '{}'", output_path.display()),
        Err(e) => {
            log::error!("Failed to write level export: {}", e);
            process::exit(1);
        }
    }
}
