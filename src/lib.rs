pub mod config;
pub mod evolution;
pub mod export;
pub mod level;
pub mod profile;
