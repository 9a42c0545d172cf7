use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::AppError;

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcademyConfig {
    pub academy_name: String,
    pub bcrypt_cost: u32,
    pub seed_demo_data: bool,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub overdue_sweep_secs: u64,
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            academy_name: "Volleyball Academy".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            seed_demo_data: true,
            admin_email: "admin@academy.local".to_string(),
            admin_password: None,
            overdue_sweep_secs: 3600,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match dotenvy::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool, AppError> {
    match dotenvy::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Config(format!(
                "{} must be a boolean, got '{}'",
                name, raw
            ))),
        },
        Err(_) => Ok(default),
    }
}

impl AcademyConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let bcrypt_cost = parse_var("ACADEMY_BCRYPT_COST", defaults.bcrypt_cost)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Config(format!(
                "ACADEMY_BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let overdue_sweep_secs =
            parse_var("ACADEMY_OVERDUE_SWEEP_SECS", defaults.overdue_sweep_secs)?;
        if overdue_sweep_secs == 0 {
            return Err(AppError::Config(
                "ACADEMY_OVERDUE_SWEEP_SECS must be positive".to_string(),
            ));
        }

        Ok(Self {
            academy_name: dotenvy::var("ACADEMY_NAME").unwrap_or(defaults.academy_name),
            bcrypt_cost,
            seed_demo_data: parse_flag("ACADEMY_SEED_DEMO_DATA", defaults.seed_demo_data)?,
            admin_email: dotenvy::var("ACADEMY_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: dotenvy::var("ACADEMY_ADMIN_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
            overdue_sweep_secs,
        })
    }
}
