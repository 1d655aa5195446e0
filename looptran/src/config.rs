//! One-shot configuration loading at script start.
//!
//! The external compiler installation carries a default settings file that
//! deployment setup copies next to the scripts. Loading happens once and
//! produces an immutable [Config] value that is threaded into the helpers
//! that need it; there is no ambient global state. A missing file at an
//! explicitly requested location is fatal, because no annotation can be
//! trusted without the target-specific settings.

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable pointing directly at a settings file.
pub const CONFIG_ENV: &str = "LOOPTRAN_CONFIG";
/// Environment variable pointing at the external compiler installation.
pub const COMPILER_HOME_ENV: &str = "FTN_COMPILER_HOME";
/// Location of the settings file inside the compiler installation.
const INSTALL_RELATIVE_PATH: &str = "share/looptran/looptran.toml";

/// Bundled copy of the upstream default settings, used when no file can be
/// located. This is the same content deployment setup would otherwise fetch
/// into the environment.
const BUNDLED_DEFAULT: &str = r#"
# Default target-specific directive behaviour.
backend = "omp"
loop_span_limit = 12
apply_collapse = true
min_collapse = 2
"#;

/// Which directive vocabulary the scripts emit.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// OpenACC: kernels regions plus `!$acc loop`.
    Acc,
    /// OpenMP: parallel regions plus `!$omp do` variants.
    Omp,
}

fn default_loop_span_limit() -> usize {
    12
}

fn default_apply_collapse() -> bool {
    true
}

fn default_min_collapse() -> u64 {
    2
}

/// Immutable target-specific settings for one script run.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub backend: Backend,
    /// Maximum number of consecutive loops one parallel region spans.
    #[serde(default = "default_loop_span_limit")]
    pub loop_span_limit: usize,
    /// Whether to work out and attach collapse clauses automatically.
    #[serde(default = "default_apply_collapse")]
    pub apply_collapse: bool,
    /// Smallest collapse depth worth emitting.
    #[serde(default = "default_min_collapse")]
    pub min_collapse: u64,
}

impl Default for Config {
    fn default() -> Self {
        // The bundled copy is fixed content; parsing it cannot fail.
        toml::from_str(BUNDLED_DEFAULT).unwrap()
    }
}

impl Config {
    /// Parse a settings file. Fatal if the file is absent or malformed.
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration at '{}'", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Malformed configuration at '{}'", path.display()))?;
        Ok(config)
    }
    /// Locate and load the settings for this run.
    ///
    /// Resolution order: explicit path, then [CONFIG_ENV], then the file
    /// inside the installation named by [COMPILER_HOME_ENV], then the
    /// bundled default. An explicit or environment-named file that cannot
    /// be read is an error rather than a silent fallback.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        if let Ok(home) = std::env::var(COMPILER_HOME_ENV) {
            let path = PathBuf::from(home).join(INSTALL_RELATIVE_PATH);
            if path.is_file() {
                return Self::from_file(&path);
            }
            debug!(
                "no settings at '{}', falling back to the bundled default",
                path.display()
            );
        }
        Ok(Config::default())
    }
}
