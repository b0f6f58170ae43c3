use std::fs;
use std::path::{Path, PathBuf};

use ordbok_config::Config;

fn profiles_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("profiles")
}

fn profile_file(data_dir: &Path, name: &str) -> PathBuf {
    profiles_dir(data_dir).join(format!("{name}.json"))
}

/// Create the profiles folder and a main profile from the environment if missing
pub fn init_user_config(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(profiles_dir(data_dir))?;

    let main_profile = profile_file(data_dir, "main");
    if !main_profile.exists() {
        Config::new().save(&main_profile)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(())
}

/// Load a profile by name, falling back to main and then to the environment
pub fn load_user_profile(data_dir: &Path, name: &str) -> anyhow::Result<Config> {
    let file = profile_file(data_dir, name);
    if file.exists() {
        return Ok(Config::load(&file)?);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile");
    let main_file = profile_file(data_dir, "main");
    if main_file.exists() {
        Ok(Config::load(&main_file)?)
    } else {
        Ok(Config::new())
    }
}
