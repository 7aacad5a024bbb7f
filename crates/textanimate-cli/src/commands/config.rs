use anyhow::Result;
use tracing::info;

use textanimate_core::AppConfig;

pub fn run(config: &AppConfig, path_only: bool, init: bool) -> Result<()> {
    let path = AppConfig::config_path();
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            config.save()?;
            info!(path = %path.display(), "Wrote config");
            println!("Wrote {}", path.display());
        }
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
