/// Database connection and schema migration
pub mod database;

/// Invoice, storage and accounting defaults loaded from config.toml
pub mod settings;
