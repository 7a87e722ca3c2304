//! `pushling install`: place a starter config and systemd unit on the host.

use std::path::Path;
use std::{env, fs};

use anyhow::{Context, Result, bail};

const CONFIG_TEMPLATE: &str = include_str!("../data/config.toml");
const UNIT_TEMPLATE: &str = include_str!("../data/pushling.service");

/// Write the starter config and a systemd unit pointing at the running
/// binary. Existing files are only replaced with `--force`.
pub fn install_files(config_dir: &Path, systemd_dir: &Path, force: bool) -> Result<()> {
    let config_dest = config_dir.join("config.toml");
    let unit_dest = systemd_dir.join("pushling.service");

    for dir in [config_dir, systemd_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create directory {}, try with sudo", dir.display()))?;
    }

    if config_dest.exists() && !force {
        bail!("config file {} already exists, use --force to overwrite", config_dest.display());
    }
    if unit_dest.exists() && !force {
        bail!("service file {} already exists, use --force to overwrite", unit_dest.display());
    }

    fs::write(&config_dest, CONFIG_TEMPLATE)
        .with_context(|| format!("cannot write {}", config_dest.display()))?;
    println!("Copied config to {}", config_dest.display());

    let binary = env::current_exe().context("cannot resolve the running binary path")?;
    let unit = UNIT_TEMPLATE
        .replace("/etc/pushling/config.toml", &config_dest.display().to_string())
        .replace("/usr/bin/pushling", &binary.display().to_string());
    fs::write(&unit_dest, unit)
        .with_context(|| format!("cannot write {}", unit_dest.display()))?;
    println!("Created service file at {}", unit_dest.display());

    println!();
    println!("Installation complete. Next steps:");
    println!("1. Edit the config file:");
    println!("     sudo nano {}", config_dest.display());
    println!("2. Reload systemd, then enable and start the service:");
    println!("     sudo systemctl daemon-reload");
    println!("     sudo systemctl enable --now pushling");
    Ok(())
}
