#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `sync` command.
//!
//! Each test builds a temporary Expo-style project, runs the command through
//! the library entry point and inspects the native projects on disk.

mod common;

use common::*;
use native_assets_cli::ledger::LEDGER_FILE;
use native_assets_cli::platform::NativePlatform;

fn imageset_dir(name: &str) -> String {
    format!("{CATALOG_PATH}/{name}.imageset")
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

/// A second run over unchanged descriptors must leave every generated file
/// byte-identical.
#[test]
fn second_run_is_byte_identical() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"logo-1x");
    project.write("assets/AppIcon.png", b"icon");
    project.write("assets/fonts/Inter-Regular.ttf", b"inter");
    project.write_config(&format!(
        "{}{}{}",
        imageset("assets/logo.png"),
        appiconset("assets/AppIcon.png"),
        font("Inter", &["assets/fonts/Inter-Regular.ttf"])
    ));

    project.sync().unwrap();
    let pbxproj = project.read(PBXPROJ_PATH);
    let plist = project.read(INFO_PLIST_PATH);
    let entry = project.read(MAIN_APPLICATION_PATH);
    let ledger = project.read(LEDGER_FILE);
    assert_ne!(pbxproj, PBXPROJ, "first run must link the fonts");

    project.sync().unwrap();
    assert_eq!(project.read(PBXPROJ_PATH), pbxproj);
    assert_eq!(project.read(INFO_PLIST_PATH), plist);
    assert_eq!(project.read(MAIN_APPLICATION_PATH), entry);
    assert_eq!(project.read(LEDGER_FILE), ledger);
}

/// Removing a font and adding it back reproduces the original manifest,
/// because record identifiers are derived from the linked path.
#[test]
fn re_adding_a_font_restores_the_same_manifest() {
    let project = TestProject::new();
    project.write("assets/fonts/Inter-Regular.ttf", b"inter");
    project.write("assets/fonts/Lato-Regular.ttf", b"lato");
    let inter = font("Inter", &["assets/fonts/Inter-Regular.ttf"]);
    let lato = font("Lato", &["assets/fonts/Lato-Regular.ttf"]);

    project.write_config(&inter);
    project.sync().unwrap();
    let first = project.read(PBXPROJ_PATH);

    project.write_config(&lato);
    project.sync().unwrap();
    assert_ne!(project.read(PBXPROJ_PATH), first);

    project.write_config(&inter);
    project.sync().unwrap();
    assert_eq!(project.read(PBXPROJ_PATH), first);
}

// ---------------------------------------------------------------------------
// Density pairing
// ---------------------------------------------------------------------------

/// `icon.png` with only `icon@2x.png` alongside yields a base-only set on
/// both platforms.
#[test]
fn lone_2x_variant_is_ignored() {
    let project = TestProject::new();
    project.write("assets/icon.png", b"1x");
    project.write("assets/icon@2x.png", b"2x");
    project.write_config(&imageset("assets/icon.png"));

    project.sync().unwrap();

    assert_eq!(
        project.list(&imageset_dir("icon")),
        vec!["Contents.json", "icon.png"]
    );
    let contents = project.read(&format!("{}/Contents.json", imageset_dir("icon")));
    assert_eq!(contents.matches("\"filename\"").count(), 1);
    assert!(project.exists(&format!("{RES_PATH}/drawable-mdpi/icon.png")));
    assert!(!project.exists(&format!("{RES_PATH}/drawable-xhdpi/icon.png")));
}

/// A full 1x/2x/3x set is copied completely on both platforms.
#[test]
fn full_density_set_is_copied() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"1x");
    project.write("assets/logo@2x.png", b"2x");
    project.write("assets/logo@3x.png", b"3x");
    project.write_config(&imageset("assets/logo.png"));

    project.sync().unwrap();

    assert_eq!(
        project.list(&imageset_dir("logo")),
        vec!["Contents.json", "logo.png", "logo@2x.png", "logo@3x.png"]
    );
    for bucket in ["drawable-mdpi", "drawable-xhdpi", "drawable-xxhdpi"] {
        assert!(project.exists(&format!("{RES_PATH}/{bucket}/logo.png")));
    }
    assert_eq!(
        project.read(&format!("{RES_PATH}/drawable-xxhdpi/logo.png")),
        "3x"
    );
}

/// Losing the 3x source shrinks the set back to the base file, removing the
/// previously copied high-density files.
#[test]
fn shrinking_density_set_removes_old_variants() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"1x");
    project.write("assets/logo@2x.png", b"2x");
    project.write("assets/logo@3x.png", b"3x");
    project.write_config(&imageset("assets/logo.png"));
    project.sync().unwrap();

    std::fs::remove_file(project.path("assets/logo@3x.png")).unwrap();
    project.sync().unwrap();

    assert_eq!(
        project.list(&imageset_dir("logo")),
        vec!["Contents.json", "logo.png"]
    );
    assert!(!project.exists(&format!("{RES_PATH}/drawable-xhdpi/logo.png")));
    assert!(!project.exists(&format!("{RES_PATH}/drawable-xxhdpi/logo.png")));
}

// ---------------------------------------------------------------------------
// Stale removal
// ---------------------------------------------------------------------------

/// Replacing the font set leaves exactly the new fonts on disk, in the
/// manifest, and in `UIAppFonts`.
#[test]
fn replaced_fonts_leave_no_trace() {
    let project = TestProject::new();
    for name in ["A-Regular.ttf", "B-Regular.ttf", "C-Regular.ttf"] {
        project.write(&format!("assets/fonts/{name}"), name.as_bytes());
    }
    project.write_config(&format!(
        "{}{}",
        font("Alpha", &["assets/fonts/A-Regular.ttf"]),
        font("Beta", &["assets/fonts/B-Regular.ttf"])
    ));
    project.sync().unwrap();
    assert_eq!(
        project.list(IOS_FONTS_PATH),
        vec!["A-Regular.ttf", "B-Regular.ttf"]
    );

    project.write_config(&font("Gamma", &["assets/fonts/C-Regular.ttf"]));
    project.sync().unwrap();

    assert_eq!(project.list(IOS_FONTS_PATH), vec!["C-Regular.ttf"]);
    let pbxproj = project.read(PBXPROJ_PATH);
    assert!(pbxproj.contains("C-Regular.ttf"));
    assert!(!pbxproj.contains("A-Regular.ttf"));
    assert!(!pbxproj.contains("B-Regular.ttf"));
    let plist = project.read(INFO_PLIST_PATH);
    assert!(plist.contains("<string>C-Regular.ttf</string>"));
    assert!(!plist.contains("A-Regular.ttf"));
    assert_eq!(
        project.list(&format!("{RES_PATH}/font")),
        vec!["gamma.xml", "gamma_400_normal.ttf"]
    );
}

/// A descriptor dropped from the configuration takes its generated files
/// with it on both platforms.
#[test]
fn dropped_descriptor_removes_generated_files() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"logo");
    project.write("assets/banner.png", b"banner");
    project.write_config(&format!(
        "{}{}",
        imageset("assets/logo.png"),
        imageset("assets/banner.png")
    ));
    project.sync().unwrap();
    assert!(project.exists(&imageset_dir("banner")));
    assert!(project.exists(&format!("{RES_PATH}/drawable-mdpi/banner.png")));

    project.write_config(&imageset("assets/logo.png"));
    project.sync().unwrap();

    assert!(!project.exists(&imageset_dir("banner")));
    assert!(!project.exists(&format!("{RES_PATH}/drawable-mdpi/banner.png")));
    assert!(project.exists(&imageset_dir("logo")));
    assert!(project.exists(&format!("{RES_PATH}/drawable-mdpi/logo.png")));
    assert!(!project.read(LEDGER_FILE).contains("banner"));
}

/// Files in `res/` that were never generated are left alone.
#[test]
fn unmanaged_resources_are_kept() {
    let project = TestProject::new();
    project.write(&format!("{RES_PATH}/drawable-mdpi/splash.png"), b"splash");
    project.write("assets/logo.png", b"logo");
    project.write_config(&imageset("assets/logo.png"));
    project.sync().unwrap();

    project.write_config("");
    project.sync().unwrap();

    assert!(project.exists(&format!("{RES_PATH}/drawable-mdpi/splash.png")));
    assert!(!project.exists(&format!("{RES_PATH}/drawable-mdpi/logo.png")));
}

// ---------------------------------------------------------------------------
// Non-fatal skips
// ---------------------------------------------------------------------------

/// A descriptor whose source is missing is skipped; the rest still sync and
/// the command succeeds.
#[test]
fn missing_source_is_skipped() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"logo");
    project.write_config(&format!(
        "{}{}",
        imageset("assets/gone.png"),
        imageset("assets/logo.png")
    ));

    project.sync().unwrap();

    assert!(!project.exists(&imageset_dir("gone")));
    assert!(project.exists(&imageset_dir("logo")));
}

/// A font family with a missing face is skipped as a whole.
#[test]
fn font_family_with_missing_face_is_skipped() {
    let project = TestProject::new();
    project.write("assets/fonts/Inter-Regular.ttf", b"inter");
    project.write_config(&font(
        "Inter",
        &["assets/fonts/Inter-Regular.ttf", "assets/fonts/Inter-Bold.ttf"],
    ));

    project.sync().unwrap();

    assert!(!project.exists(IOS_FONTS_PATH));
    assert!(!project.read(INFO_PLIST_PATH).contains("Inter-Regular.ttf"));
    assert!(!project.read(MAIN_APPLICATION_PATH).contains("ReactFontManager"));
}

// ---------------------------------------------------------------------------
// Registration lists
// ---------------------------------------------------------------------------

/// `UIAppFonts` is replaced wholesale, dropping names the tool did not add.
#[test]
fn ui_app_fonts_is_replaced() {
    let project = TestProject::new();
    project.write(
        INFO_PLIST_PATH,
        INFO_PLIST.replace(
            "</dict>",
            "\t<key>UIAppFonts</key>\n\t<array>\n\t\t<string>Old.ttf</string>\n\t</array>\n</dict>",
        ),
    );
    project.write("assets/fonts/Inter-Regular.ttf", b"inter");
    project.write_config(&font("Inter", &["assets/fonts/Inter-Regular.ttf"]));

    project.sync().unwrap();

    let plist = project.read(INFO_PLIST_PATH);
    assert!(plist.contains("<string>Inter-Regular.ttf</string>"));
    assert!(!plist.contains("Old.ttf"));
    assert!(plist.contains("<string>MyApp</string>"));
}

/// Fonts are registered in the Android entry point and unregistered once
/// the configuration drops them.
#[test]
fn entry_point_block_follows_fonts() {
    let project = TestProject::new();
    project.write("assets/fonts/Inter-Regular.ttf", b"inter");
    project.write_config(&font("Inter", &["assets/fonts/Inter-Regular.ttf"]));

    project.sync().unwrap();
    let patched = project.read(MAIN_APPLICATION_PATH);
    assert!(patched.contains(
        "ReactFontManager.getInstance().addCustomFont(this, \"Inter\", R.font.inter)"
    ));
    assert!(patched.contains("import com.facebook.react.common.assets.ReactFontManager"));
    assert!(project.exists(&format!("{RES_PATH}/font/inter.xml")));

    project.write_config("");
    project.sync().unwrap();

    assert_eq!(project.read(MAIN_APPLICATION_PATH), MAIN_APPLICATION);
    assert!(!project.exists(&format!("{RES_PATH}/font/inter.xml")));
    assert!(!project.exists(IOS_FONTS_PATH));
    assert!(!project.read(INFO_PLIST_PATH).contains("UIAppFonts"));
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// A dry run reports changes without writing anything.
#[test]
fn dry_run_writes_nothing() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"logo");
    project.write("assets/fonts/Inter-Regular.ttf", b"inter");
    project.write_config(&format!(
        "{}{}",
        imageset("assets/logo.png"),
        font("Inter", &["assets/fonts/Inter-Regular.ttf"])
    ));
    let mut global = project.global();
    global.dry_run = true;

    project.sync_with(&global, &[]).unwrap();

    assert_eq!(project.read(PBXPROJ_PATH), PBXPROJ);
    assert_eq!(project.read(INFO_PLIST_PATH), INFO_PLIST);
    assert_eq!(project.read(MAIN_APPLICATION_PATH), MAIN_APPLICATION);
    assert!(!project.exists(CATALOG_PATH));
    assert!(!project.exists(IOS_FONTS_PATH));
    assert!(!project.exists(LEDGER_FILE));
    assert!(project.list(RES_PATH).is_empty());
}

/// Selecting one platform leaves the other untouched.
#[test]
fn platform_filter_limits_the_passes() {
    let project = TestProject::new();
    project.write("assets/logo.png", b"logo");
    project.write_config(&imageset("assets/logo.png"));

    project
        .sync_with(&project.global(), &[NativePlatform::Android])
        .unwrap();

    assert!(project.exists(&format!("{RES_PATH}/drawable-mdpi/logo.png")));
    assert!(!project.exists(CATALOG_PATH));
    assert_eq!(project.read(PBXPROJ_PATH), PBXPROJ);
}

/// A missing Xcode project fails the iOS pass, but the Android pass still
/// runs and the command reports the failure.
#[test]
fn failed_pass_does_not_stop_the_other() {
    let project = TestProject::new();
    std::fs::remove_dir_all(project.path("ios/MyApp.xcodeproj")).unwrap();
    project.write("assets/logo.png", b"logo");
    project.write_config(&imageset("assets/logo.png"));

    let err = project.sync().unwrap_err();

    assert!(err.to_string().contains("1 task(s) failed"));
    assert!(project.exists(&format!("{RES_PATH}/drawable-mdpi/logo.png")));
}

/// A configuration file is required.
#[test]
fn missing_config_is_an_error() {
    let project = TestProject::new();
    assert!(project.sync().is_err());
}
