pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::{BackendKind, Settings};

/// Load environment variables from .env files.
/// First loads from ~/.env (home directory), then from ./.env (project directory).
/// Variables already present in the process environment are never replaced.
/// Call this before parsing CLI args so `HOARD_*` variables reach clap.
pub fn load_env_file() {
    if let Some(home) = dirs::home_dir() {
        let home_env_path = home.join(".env");
        dotenv::from_path(home_env_path).ok();
    }

    // dotenv::dotenv() does not overwrite variables that are already set,
    // so the project file only fills in what the home file left empty.
    dotenv::dotenv().ok();
}
