//! `version` subcommand.
/// Version reported by the binary: `NATIVE_ASSETS_VERSION` at build time,
/// otherwise the package version.
#[must_use]
pub fn current() -> &'static str {
    option_env!("NATIVE_ASSETS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version line.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("native-assets {}", current());
}
