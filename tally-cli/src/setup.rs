use anyhow::{Context, Result};
use std::io::{self, Write};
use tally_core::SystemClock;
use tally_ledger::{LedgerError, LedgerStore};

use crate::config::{Config, config_path, load_config, save_config};

fn prompt(label: &str, default: &str) -> Result<String> {
    print!("{} [{}]: ", label, default);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    let s = s.trim();
    Ok(if s.is_empty() { default.to_string() } else { s.to_string() })
}

/// Interactive first run: pick a user id and a personal organization,
/// write config.toml and seed the ledger.
pub fn run_setup() -> Result<()> {
    println!("Tally setup\n");
    let mut cfg = load_config()?;

    cfg.user.id = prompt("User id", &cfg.user.id)?;
    let org_name = prompt("Organization name", "Personal")?;
    cfg.clock.timezone = prompt("Timezone (IANA)", &cfg.clock.timezone)?;
    let clock = SystemClock::from_tz_name(&cfg.clock.timezone)?;

    let org_id = seed_organization(&cfg, &org_name, &clock)?;
    cfg.ledger.default_organization = Some(org_id.clone());
    save_config(&cfg)?;

    println!("\nWrote {}", config_path()?.display());
    println!("Default organization: {}", org_id);
    println!("Timezone: {}", clock.timezone());
    println!("\nNext: paste a statement with `tally extract` (reads stdin)");
    Ok(())
}

fn seed_organization(cfg: &Config, name: &str, clock: &SystemClock) -> Result<String> {
    let path = cfg.ledger_path()?;
    let mut store =
        LedgerStore::open(&path).with_context(|| format!("open ledger {}", path.display()))?;

    let id = match store.create_organization(name, &cfg.user.id, clock) {
        Ok(org) => org.id,
        Err(LedgerError::OrganizationExists(id)) => {
            store.add_member(&id, &cfg.user.id)?;
            id
        }
        Err(e) => return Err(e.into()),
    };

    store.save().with_context(|| format!("write ledger {}", path.display()))?;
    Ok(id)
}
