use scrobble_import::{AppConfig, ConfigPersistence};

pub fn handle_show(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = ConfigPersistence::config_path()?;
    let origin = if path.exists() { "saved" } else { "defaults" };
    println!("⚙️  Configuration ({origin}, {})", path.display());
    println!("{}", config.to_json()?);
    Ok(())
}

pub fn handle_init(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = ConfigPersistence::config_path()?;
    if path.exists() && !force {
        println!("⚠️  {} already exists, use --force to overwrite", path.display());
        return Ok(());
    }

    let path = ConfigPersistence::save(&AppConfig::default())?;
    println!("💾 Wrote default configuration to {}", path.display());
    Ok(())
}
