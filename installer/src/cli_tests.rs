//! Tests for installer CLI parsing.

use super::*;
use crate::catalog::selector::RollingAlias;
use clap::CommandFactory;
use rstest::rstest;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("jdk-installer").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn install_parses_required_and_optional_flags() {
    let cli = parse(&[
        "install",
        "--provider",
        "adoptium",
        "--version",
        "21",
        "--platform",
        "aarch64-unknown-linux-gnu",
        "--catalog",
        "/tmp/catalog.json",
        "--out",
        "/opt/jdk",
        "--dry-run",
    ]);
    let Command::Install(args) = cli.command else {
        panic!("expected Install command");
    };
    assert_eq!(args.selection.provider, "adoptium");
    assert_eq!(args.selection.selector, VersionSelector::Major(21));
    assert_eq!(
        args.selection.platform.as_ref().map(Platform::as_str),
        Some("aarch64-unknown-linux-gnu")
    );
    assert_eq!(args.selection.catalog, Some(Utf8PathBuf::from("/tmp/catalog.json")));
    assert_eq!(args.out, Some(Utf8PathBuf::from("/opt/jdk")));
    assert!(args.dry_run);
    assert!(args.config.is_none());
}

#[rstest]
#[case::latest("latest", RollingAlias::Latest)]
#[case::stable("stable", RollingAlias::Stable)]
#[case::lts("lts", RollingAlias::Lts)]
fn resolve_accepts_aliases(#[case] value: &str, #[case] alias: RollingAlias) {
    let cli = parse(&["resolve", "--provider", "semeru", "--version", value, "--json"]);
    let Command::Resolve(args) = cli.command else {
        panic!("expected Resolve command");
    };
    assert_eq!(args.selection.selector, VersionSelector::Alias(alias));
    assert!(args.json);
}

#[rstest]
#[case::bad_selector(&["resolve", "--provider", "adoptium", "--version", "newest"])]
#[case::bad_platform(&[
    "resolve", "--provider", "adoptium", "--version", "21", "--platform", "x86_64-pc-windows-msvc",
])]
#[case::missing_version(&["install", "--provider", "adoptium"])]
#[case::unknown_update_provider(&["update-catalog", "--provider", "corretto"])]
#[case::quiet_and_verbose(&["-q", "-v", "finalize", "jdk"])]
fn rejects_invalid_arguments(#[case] args: &[&str]) {
    let result = Cli::try_parse_from(std::iter::once("jdk-installer").chain(args.iter().copied()));
    assert!(result.is_err());
}

#[test]
fn finalize_takes_directory_and_home() {
    let cli = parse(&["finalize", "./jdk", "--home", "/opt/java"]);
    let Command::Finalize(args) = cli.command else {
        panic!("expected Finalize command");
    };
    assert_eq!(args.dir, Utf8PathBuf::from("./jdk"));
    assert_eq!(args.home, Some(Utf8PathBuf::from("/opt/java")));
}

#[test]
fn update_catalog_parses_provider() {
    let cli = parse(&[
        "update-catalog",
        "--provider",
        "semeru",
        "--catalog",
        "catalog.json",
        "--api-url",
        "http://127.0.0.1:8080",
    ]);
    let Command::UpdateCatalog(args) = cli.command else {
        panic!("expected UpdateCatalog command");
    };
    assert_eq!(args.provider, Provider::Semeru);
    assert_eq!(args.api_url.as_deref(), Some("http://127.0.0.1:8080"));
}

#[rstest]
#[case::before_subcommand(&["-vv", "finalize", "jdk"], 2, false)]
#[case::after_subcommand(&["finalize", "jdk", "-v"], 1, false)]
#[case::quiet(&["finalize", "jdk", "--quiet"], 0, true)]
fn global_flags_apply_anywhere(#[case] args: &[&str], #[case] verbosity: u8, #[case] quiet: bool) {
    let cli = parse(args);
    assert_eq!(cli.verbosity, verbosity);
    assert_eq!(cli.quiet, quiet);
}
