/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name the binary reports itself under.
pub const TOOL_NAME: &str = "skills-mcp-postinstall";

/// Returns a formatted version string, e.g. `skills-mcp-postinstall 0.1.0`.
#[must_use]
pub fn version_string() -> String {
    format!("{TOOL_NAME} {VERSION}")
}
