// Application configuration, loaded from the embedded default.json or a user file.
pub mod settings;

pub use settings::AppSettings;
