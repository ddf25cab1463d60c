//! Installer configuration.
//!
//! Configuration is TOML. Every section is optional and falls back to the
//! defaults shown below, so an empty file is a valid configuration:
//!
//! ```toml
//! [runtime]
//! dependencies = [
//!     { name = "libX11", lib_dir = "/opt/deps/libX11/lib" },
//!     { name = "alsa-lib", lib_dir = "/opt/deps/alsa-lib/lib" },
//! ]
//! path_prefix = ["/opt/deps/gnugrep/bin"]
//! interpreter = "/opt/deps/glibc/lib/ld-linux-x86-64.so.2"
//!
//! [relocation]
//! helper = "jspawnhelper"
//!
//! [activation]
//! support_dir = "nix-support"
//! home_variable = "JAVA_HOME"
//! propagated_inputs = ["/opt/deps/setJavaClassPath"]
//!
//! [network]
//! timeout_secs = 600
//! command_timeout_secs = 60
//! ```
//!
//! The file is located by [`Config::load`].

use crate::error::{InstallerError, Result};
use crate::relocation::RelocationRules;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "JDK_INSTALLER_CONFIG";

/// Application directory under the platform configuration directory.
const APP_DIR: &str = "jdk-installer";

/// File name looked up inside [`APP_DIR`].
const CONFIG_FILE_NAME: &str = "config.toml";

/// Catalog file name inside [`APP_DIR`].
const CATALOG_FILE_NAME: &str = "catalog.json";

/// One shared-library provider the installed JDK depends on at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeDependency {
    /// Human-readable package name, e.g. `libXrender`.
    pub name: String,
    /// Directory holding the package's shared libraries.
    pub lib_dir: Utf8PathBuf,
}

/// The libraries and tools every wrapped executable must see.
///
/// Dependencies are referenced by path only; nothing here is copied into
/// the installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeDependencySet {
    /// Ordered shared-library providers.
    pub dependencies: Vec<RuntimeDependency>,
    /// Directories prepended to `PATH` by every launcher.
    pub path_prefix: Vec<Utf8PathBuf>,
    /// Dynamic loader to install as the ELF interpreter, if any.
    pub interpreter: Option<Utf8PathBuf>,
}

impl RuntimeDependencySet {
    /// Library directories in declaration order.
    pub fn library_dirs(&self) -> impl Iterator<Item = &Utf8Path> {
        self.dependencies.iter().map(|dep| dep.lib_dir.as_path())
    }
}

/// Settings for the environment-activation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActivationConfig {
    /// Directory, relative to the installation root, receiving the metadata.
    pub support_dir: String,
    /// Variable the setup hook exports.
    pub home_variable: String,
    /// Companion packages recorded as propagated inputs.
    pub propagated_inputs: Vec<String>,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            support_dir: "nix-support".to_owned(),
            home_variable: "JAVA_HOME".to_owned(),
            propagated_inputs: Vec::new(),
        }
    }
}

/// Network and subprocess limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Whole-request timeout for downloads and API calls, in seconds.
    pub timeout_secs: u64,
    /// Timeout for each external tool invocation, in seconds.
    pub command_timeout_secs: u64,
}

impl NetworkConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Tool timeout as a [`Duration`].
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            command_timeout_secs: 60,
        }
    }
}

/// Complete installer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Runtime dependency set.
    pub runtime: RuntimeDependencySet,
    /// Relocation patterns.
    pub relocation: RelocationRules,
    /// Activation metadata settings.
    pub activation: ActivationConfig,
    /// Network limits.
    pub network: NetworkConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml(contents: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| InstallerError::Config {
            path: origin.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Read configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| InstallerError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents, path)
    }

    /// Load configuration using the standard lookup order.
    ///
    /// 1. `explicit`, typically from `--config`; it must exist.
    /// 2. The file named by `$JDK_INSTALLER_CONFIG`; it must exist.
    /// 3. `<config dir>/jdk-installer/config.toml`, if present.
    /// 4. Built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] if a selected file cannot be read
    /// or parsed.
    pub fn load(explicit: Option<&Utf8Path>) -> Result<Self> {
        match locate(explicit) {
            Some(path) => {
                log::debug!("loading configuration from {path}");
                Self::from_file(&path)
            }
            None => {
                log::debug!("no configuration file found; using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Resolve which configuration file, if any, [`Config::load`] would read.
#[must_use]
pub fn locate(explicit: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    if let Some(value) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(Utf8PathBuf::from(value.to_string_lossy().as_ref()));
    }
    default_config_path().filter(|path| path.is_file())
}

/// The per-user configuration path, whether or not it exists.
#[must_use]
pub fn default_config_path() -> Option<Utf8PathBuf> {
    app_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// The per-user catalog path used when `--catalog` is not given.
#[must_use]
pub fn default_catalog_path() -> Option<Utf8PathBuf> {
    app_config_dir().map(|dir| dir.join(CATALOG_FILE_NAME))
}

fn app_config_dir() -> Option<Utf8PathBuf> {
    let dirs = directories_next::BaseDirs::new()?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().join(APP_DIR)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn origin() -> &'static Utf8Path {
        Utf8Path::new("config.toml")
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("", origin()).expect("empty config");
        assert_eq!(config, Config::default());
        assert_eq!(config.activation.home_variable, "JAVA_HOME");
        assert_eq!(config.activation.support_dir, "nix-support");
        assert_eq!(config.network.timeout(), Duration::from_secs(600));
    }

    #[test]
    fn parses_runtime_dependencies_in_order() {
        let toml = r#"
            [runtime]
            dependencies = [
                { name = "libX11", lib_dir = "/deps/x11/lib" },
                { name = "alsa", lib_dir = "/deps/alsa/lib" },
            ]
            path_prefix = ["/deps/grep/bin"]
            interpreter = "/deps/glibc/lib/ld-linux-x86-64.so.2"
        "#;
        let config = Config::from_toml(toml, origin()).expect("valid config");
        let dirs: Vec<_> = config.runtime.library_dirs().map(Utf8Path::as_str).collect();
        assert_eq!(dirs, vec!["/deps/x11/lib", "/deps/alsa/lib"]);
        assert_eq!(
            config.runtime.interpreter.as_deref(),
            Some(Utf8Path::new("/deps/glibc/lib/ld-linux-x86-64.so.2"))
        );
    }

    #[test]
    fn relocation_section_overrides_individual_rules() {
        let toml = "[relocation]\nhelper = \"forkhelper\"\n";
        let config = Config::from_toml(toml, origin()).expect("valid config");
        assert_eq!(config.relocation.helper, "forkhelper");
        assert_eq!(
            config.relocation.font_manager,
            RelocationRules::default().font_manager
        );
    }

    #[rstest]
    #[case::unknown_section("[telemetry]\nenabled = true\n")]
    #[case::unknown_key("[network]\nretries = 3\n")]
    #[case::wrong_type("[network]\ntimeout_secs = \"slow\"\n")]
    fn rejects_invalid_documents(#[case] toml: &str) {
        let err = Config::from_toml(toml, origin()).expect_err("invalid config");
        assert!(matches!(err, InstallerError::Config { .. }));
    }

    #[test]
    fn explicit_path_wins_over_environment() {
        let temp = tempfile::tempdir().expect("temp dir");
        let explicit = Utf8PathBuf::from_path_buf(temp.path().join("explicit.toml"))
            .expect("UTF-8 path");
        temp_env::with_var(CONFIG_ENV_VAR, Some("/elsewhere/config.toml"), || {
            assert_eq!(locate(Some(&explicit)), Some(explicit.clone()));
        });
    }

    #[test]
    fn environment_variable_selects_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("env.toml");
        std::fs::write(&path, "[network]\ntimeout_secs = 5\n").expect("write config");
        let path_str = path.to_str().expect("UTF-8 path").to_owned();

        temp_env::with_var(CONFIG_ENV_VAR, Some(&path_str), || {
            let config = Config::load(None).expect("config loads");
            assert_eq!(config.network.timeout_secs, 5);
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Utf8Path::new("/nonexistent/jdk-installer.toml")))
            .expect_err("missing file");
        assert!(matches!(err, InstallerError::Config { .. }));
    }

    #[test]
    fn falls_back_to_defaults_without_any_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let home = temp.path().to_str().expect("UTF-8 path").to_owned();
        temp_env::with_vars(
            [
                (CONFIG_ENV_VAR, None),
                ("HOME", Some(home.as_str())),
                ("XDG_CONFIG_HOME", Some(home.as_str())),
            ],
            || {
                let config = Config::load(None).expect("defaults");
                assert_eq!(config, Config::default());
            },
        );
    }
}
