use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

const BUNDLED_TOML_STR: &str = include_str!("banks.toml");

static BUNDLED_REGISTRY: OnceLock<BankRegistry> = OnceLock::new();

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    banks: BTreeMap<String, String>,
}

/// Lookup table of bank codes to institution names, loaded from a TOML file
/// with a single `[banks]` table. The bundled table is a point-in-time
/// snapshot of the CNB directory; callers can load their own snapshot to
/// track later changes.
#[derive(Debug, Clone)]
pub struct BankRegistry {
    banks: BTreeMap<String, String>,
}

impl BankRegistry {
    /// The registry compiled into the binary. Loaded once per process.
    pub fn bundled() -> &'static BankRegistry {
        BUNDLED_REGISTRY.get_or_init(|| {
            // The bundled table is a compile-time asset; a unit test keeps it
            // loadable, so a failure here is a broken build.
            BankRegistry::from_toml_str(BUNDLED_TOML_STR)
                .expect("bundled bank table is not loadable")
        })
    }

    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read bank registry from {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse a `[banks]` table. Every key must be exactly four ASCII digits;
    /// a key that is not a plausible bank code fails the whole load rather
    /// than silently never matching.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let parsed: RegistryFile =
            toml::from_str(contents).context("Failed to parse bank registry TOML")?;

        for code in parsed.banks.keys() {
            if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
                bail!("Bank code '{}' is not a four-digit code", code);
            }
        }

        Ok(Self { banks: parsed.banks })
    }

    /// Name of the institution behind a code. An entry with an empty name is
    /// treated as absent, so blanking a name in a snapshot retires the code.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.banks
            .get(code)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.name_for(code).is_some()
    }

    /// All codes in the table, in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.banks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}
