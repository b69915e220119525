//! Install context: everything the pipeline reads from the process.
//!
//! The environment and the executable path are captured once into an
//! [`InstallContext`] and passed down explicitly, so the pipeline never reads
//! ambient process state and tests can build contexts directly.

use crate::package::PACKAGE_NAME;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variables consulted by the fix.
pub mod env {
    /// Install-prefix override (`npm --prefix`, `NPM_CONFIG_PREFIX`).
    pub const NPM_CONFIG_PREFIX: &str = "npm_config_prefix";
    /// Global-prefix override.
    pub const NPM_CONFIG_GLOBAL_PREFIX: &str = "npm_config_global_prefix";
    /// Prefix reported by npm to lifecycle scripts.
    pub const NPM_PREFIX: &str = "npm_prefix";
    /// Legacy prefix variable.
    pub const PREFIX: &str = "PREFIX";
    /// Local-prefix override.
    pub const NPM_CONFIG_LOCAL_PREFIX: &str = "npm_config_local_prefix";
    /// Path of the `node` binary running the install, set by npm for lifecycle scripts.
    pub const NPM_NODE_EXECPATH: &str = "npm_node_execpath";
    /// Windows roaming application-data directory.
    pub const APPDATA: &str = "APPDATA";
    /// Any non-empty value enables diagnostics on stderr.
    pub const DEBUG: &str = "SKILLS_MCP_DEBUG_INSTALL";

    /// All prefix variables, highest priority first.
    pub const PREFIX_VARS: [&str; 5] = [
        NPM_CONFIG_PREFIX,
        NPM_CONFIG_GLOBAL_PREFIX,
        NPM_PREFIX,
        PREFIX,
        NPM_CONFIG_LOCAL_PREFIX,
    ];
}

/// Platform family; decides the default prefix, the `node_modules` layout and
/// the path separator used in the cache fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Unix => "unix",
        }
    }

    /// Native path separator.
    #[must_use]
    pub fn separator(&self) -> char {
        match self {
            Self::Windows => '\\',
            Self::Unix => '/',
        }
    }
}

/// Inputs of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallContext {
    /// `npm_config_prefix`.
    pub prefix_override: Option<PathBuf>,
    /// `npm_config_global_prefix`.
    pub global_prefix_override: Option<PathBuf>,
    /// `npm_prefix`.
    pub manager_prefix: Option<PathBuf>,
    /// `PREFIX`.
    pub legacy_prefix: Option<PathBuf>,
    /// `npm_config_local_prefix`.
    pub local_prefix_override: Option<PathBuf>,
    /// `APPDATA`, only used on Windows.
    pub app_data: Option<PathBuf>,
    pub platform: Platform,
    /// Executable the default prefix is derived from.
    pub executable_path: Option<PathBuf>,
    /// Scoped package name, e.g. `@scope/name`.
    pub package_name: String,
    /// Whether diagnostics are enabled.
    pub debug_enabled: bool,
}

impl InstallContext {
    /// Empty context for `platform`: no overrides, no executable, default package.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            prefix_override: None,
            global_prefix_override: None,
            manager_prefix: None,
            legacy_prefix: None,
            local_prefix_override: None,
            app_data: None,
            platform,
            executable_path: None,
            package_name: PACKAGE_NAME.to_string(),
            debug_enabled: false,
        }
    }

    /// Capture the context from the process environment.
    ///
    /// The executable is the `node` binary npm runs lifecycle scripts with
    /// (`npm_node_execpath`) when available, otherwise this process.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(
            |key| std::env::var_os(key),
            Platform::current(),
            std::env::current_exe().ok(),
        )
    }

    /// Build a context from an arbitrary variable lookup.
    ///
    /// Unset and empty variables are both treated as absent. `fallback_exe` is
    /// used when `npm_node_execpath` is absent.
    #[must_use]
    pub fn from_lookup<F>(lookup: F, platform: Platform, fallback_exe: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let path = |key: &str| non_empty(lookup(key)).map(PathBuf::from);

        Self {
            prefix_override: path(env::NPM_CONFIG_PREFIX),
            global_prefix_override: path(env::NPM_CONFIG_GLOBAL_PREFIX),
            manager_prefix: path(env::NPM_PREFIX),
            legacy_prefix: path(env::PREFIX),
            local_prefix_override: path(env::NPM_CONFIG_LOCAL_PREFIX),
            app_data: path(env::APPDATA),
            platform,
            executable_path: path(env::NPM_NODE_EXECPATH).or(fallback_exe),
            package_name: PACKAGE_NAME.to_string(),
            debug_enabled: non_empty(lookup(env::DEBUG)).is_some(),
        }
    }

    #[must_use]
    pub fn with_prefix_override(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefix_override = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_global_prefix_override(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.global_prefix_override = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_manager_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.manager_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_legacy_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.legacy_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_local_prefix_override(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.local_prefix_override = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_app_data(mut self, dir: impl Into<PathBuf>) -> Self {
        self.app_data = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_executable_path(mut self, exe: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(exe.into());
        self
    }

    #[must_use]
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.is_empty())
}
