//! Native platform identifiers.
use std::fmt;

/// Native project kind a synchronization pass targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum NativePlatform {
    /// Gradle project with a flat `res/` directory.
    Android,
    /// Xcode project with an asset catalog and a `project.pbxproj` graph.
    Ios,
}

impl NativePlatform {
    /// Every platform, in pass order.
    pub const ALL: [Self; 2] = [Self::Android, Self::Ios];

    /// Lowercase identifier, also used as the ledger section key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for NativePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
