// Shared helpers for integration tests.
//
// Provides a temporary Expo-style project (an iOS project with a single
// `.xcodeproj`, an `Info.plist`, and an Android project with a Kotlin entry
// point) so each integration test can run the commands in isolation.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use native_assets_cli::cli::{GlobalOpts, SyncOpts};
use native_assets_cli::commands;
use native_assets_cli::logging::Logger;
use native_assets_cli::platform::NativePlatform;

/// Project manifest every test project starts from.
pub const PBXPROJ: &str = include_str!("../fixtures/project.pbxproj");

/// Application property list without any registered fonts.
pub const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleName</key>
	<string>MyApp</string>
</dict>
</plist>
"#;

/// Kotlin entry point with both anchors the font patch needs.
pub const MAIN_APPLICATION: &str = "package com.myapp

import android.app.Application

class MainApplication : Application() {
    override fun onCreate() {
        super.onCreate()
    }
}
";

/// Relative path of the Xcode project manifest.
pub const PBXPROJ_PATH: &str = "ios/MyApp.xcodeproj/project.pbxproj";
/// Relative path of the application property list.
pub const INFO_PLIST_PATH: &str = "ios/MyApp/Info.plist";
/// Relative path of the asset catalog.
pub const CATALOG_PATH: &str = "ios/MyApp/Images.xcassets";
/// Relative path of the bundled font folder.
pub const IOS_FONTS_PATH: &str = "ios/MyApp/Fonts";
/// Relative path of the Android resource directory.
pub const RES_PATH: &str = "android/app/src/main/res";
/// Relative path of the Android entry point.
pub const MAIN_APPLICATION_PATH: &str =
    "android/app/src/main/java/com/myapp/MainApplication.kt";

/// An isolated Expo-style project backed by a [`tempfile::TempDir`].
pub struct TestProject {
    /// Temporary directory holding the project.
    pub root: tempfile::TempDir,
}

impl TestProject {
    /// Create a project with both native platforms and no assets.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let project = Self { root };
        project.write(PBXPROJ_PATH, PBXPROJ);
        project.write(INFO_PLIST_PATH, INFO_PLIST);
        project.write(MAIN_APPLICATION_PATH, MAIN_APPLICATION);
        std::fs::create_dir_all(project.path(RES_PATH)).expect("create res dir");
        project
    }

    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write project file");
    }

    /// Read `rel` as text.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read project file")
    }

    /// Whether `rel` exists.
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// File names inside the directory `rel`, sorted.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path(rel))
            .expect("list directory")
            .map(|e| {
                e.expect("directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Write `native-assets.toml` with both platform sections followed by
    /// `assets`.
    pub fn write_config(&self, assets: &str) {
        self.write(
            "native-assets.toml",
            format!("[ios]\n\n[android]\n\n{assets}"),
        );
    }

    /// Global options pointing at this project.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            root: Some(self.root_path().to_path_buf()),
            config: None,
            dry_run: false,
            parallel: true,
        }
    }

    /// Run `sync` for every platform.
    pub fn sync(&self) -> anyhow::Result<()> {
        self.sync_with(&self.global(), &[])
    }

    /// Run `sync` with explicit options.
    pub fn sync_with(
        &self,
        global: &GlobalOpts,
        platforms: &[NativePlatform],
    ) -> anyhow::Result<()> {
        let log = Arc::new(Logger::new("sync"));
        let opts = SyncOpts {
            platform: platforms.to_vec(),
        };
        commands::sync::run(global, &opts, &log)
    }

    /// Run `check`.
    pub fn check(&self) -> anyhow::Result<()> {
        let log = Arc::new(Logger::new("check"));
        commands::check::run(&self.global(), &log)
    }
}

/// One `imageset` descriptor in group `images`.
pub fn imageset(path: &str) -> String {
    format!("[[assets.images]]\ntype = \"imageset\"\npath = \"{path}\"\n\n")
}

/// One `appiconset` descriptor in group `icons`.
pub fn appiconset(path: &str) -> String {
    format!("[[assets.icons]]\ntype = \"appiconset\"\npath = \"{path}\"\n\n")
}

/// One `font` descriptor with a regular face per path, in group `fonts`.
pub fn font(family: &str, paths: &[&str]) -> String {
    let files: Vec<String> = paths
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{{ path = \"{p}\", weight = {} }}", 400 + i * 100))
        .collect();
    format!(
        "[[assets.fonts]]\ntype = \"font\"\nfamily = \"{family}\"\nfiles = [{}]\n\n",
        files.join(", ")
    )
}
