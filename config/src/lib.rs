pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::Settings;

/// Load environment variables from ./.env (project directory) and ~/.env (home directory).
/// Project directory values take precedence over home directory values, and
/// variables already present in the process environment win over both.
/// Call this before parsing CLI args to ensure env vars are available.
pub fn load_env_file() {
    // dotenv never overwrites a variable that is already set, so the project
    // file has to be loaded first to win over the home file.
    dotenv::dotenv().ok();

    if let Some(home) = dirs::home_dir() {
        dotenv::from_path(home.join(".env")).ok();
    }
}
