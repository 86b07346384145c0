// Settings module
// JSON settings file with defaults for every field

pub mod settings;

pub use settings::AppSettings;
