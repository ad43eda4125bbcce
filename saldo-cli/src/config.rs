use anyhow::{Context, Result, bail};
use saldo_core::SeparatorHeuristic;
use saldo_finance::SchemeKind;
use saldo_ingest::Delimiter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalizer: NormalizerSection,
    pub ledger: LedgerSection,
    pub input: InputSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSection {
    /// Separator heuristic for ledger exports
    pub ledger_heuristic: SeparatorHeuristic,
    /// Separator heuristic for order-book exports
    pub orders_heuristic: SeparatorHeuristic,
}

impl Default for NormalizerSection {
    fn default() -> Self {
        Self {
            ledger_heuristic: SeparatorHeuristic::CommaDecimal,
            orders_heuristic: SeparatorHeuristic::DotThousands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    pub scheme: SchemeKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub delimiter: Delimiter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Config file rooted at `base_dir`: `<base_dir>/.saldo/config.toml`.
pub fn config_path_in(base_dir: &Path) -> PathBuf {
    base_dir.join(".saldo").join("config.toml")
}

/// `~/.saldo/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine the home directory")?;
    Ok(config_path_in(&home))
}

/// Load `explicit` (which must exist), else the default path, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one already exists. Returns the path
/// and whether it was written.
pub fn init_config(explicit: Option<&Path>) -> Result<(PathBuf, bool)> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if p.exists() {
        return Ok((p, false));
    }
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    save_config(&Config::default(), &p)?;
    Ok((p, true))
}
