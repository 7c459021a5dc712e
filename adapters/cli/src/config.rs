//! Role coefficient overrides loaded from a TOML file.
//!
//! ```toml
//! version = 1
//!
//! [support]
//! plant = 6.0
//! ```

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use paintball_system_agent::{RoleCoefficients, SquadConfig};
use serde::Deserialize;

const SUPPORTED_ROLES_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RolesFile {
    version: u32,
    #[serde(default)]
    aggressive: Option<CoefficientOverrides>,
    #[serde(default)]
    support: Option<CoefficientOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoefficientOverrides {
    shoot: Option<f64>,
    shield: Option<f64>,
    ammo: Option<f64>,
    exploration: Option<f64>,
    enemy_approach: Option<f64>,
    plant: Option<f64>,
    adapter: Option<f64>,
}

impl CoefficientOverrides {
    fn apply(&self, role: &str, coefficients: &mut RoleCoefficients) -> Result<()> {
        let slots = [
            ("shoot", self.shoot, &mut coefficients.shoot),
            ("shield", self.shield, &mut coefficients.shield),
            ("ammo", self.ammo, &mut coefficients.ammo),
            ("exploration", self.exploration, &mut coefficients.exploration),
            ("enemy_approach", self.enemy_approach, &mut coefficients.enemy_approach),
            ("plant", self.plant, &mut coefficients.plant),
            ("adapter", self.adapter, &mut coefficients.adapter),
        ];

        for (name, value, slot) in slots {
            let Some(value) = value else {
                continue;
            };
            if !value.is_finite() || value < 0.0 {
                bail!("{role}.{name} must be a finite, non-negative number; found {value}");
            }
            *slot = value;
        }
        Ok(())
    }
}

/// Reads the roles file at `path` and layers it over `config`.
pub(crate) fn load_roles(path: &Path, config: &mut SquadConfig) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read roles file at {}", path.display()))?;
    apply_roles(&contents, config)
        .with_context(|| format!("invalid roles file at {}", path.display()))
}

fn apply_roles(contents: &str, config: &mut SquadConfig) -> Result<()> {
    let file: RolesFile = toml::from_str(contents).context("failed to parse roles toml contents")?;
    if file.version != SUPPORTED_ROLES_VERSION {
        bail!(
            "unsupported roles file version {}; expected {}",
            file.version,
            SUPPORTED_ROLES_VERSION
        );
    }

    if let Some(overrides) = &file.aggressive {
        overrides.apply("aggressive", &mut config.aggressive)?;
    }
    if let Some(overrides) = &file.support {
        overrides.apply("support", &mut config.support)?;
    }
    Ok(())
}
