//! Behaviour-driven tests for catalog resolution and rolling aliases.

mod support;

use jdk_installer::catalog::Catalog;
use jdk_installer::catalog::error::CatalogError;
use jdk_installer::catalog::record::DistributionRecord;
use jdk_installer::catalog::selector::{RollingAlias, VersionSelector};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use support::{linux_x64, scratch};

const CATALOG: &str = r#"{
  "x86_64-unknown-linux-gnu": {
    "adoptium": {
      "versions": {
        "17": {
          "major_version": 17,
          "version": "17.0.10+7",
          "url": "https://example.test/OpenJDK17U-jdk_x64_linux_hotspot_17.0.10_7.tar.gz",
          "sha256": "1717171717171717171717171717171717171717171717171717171717171717"
        },
        "21": {
          "major_version": 21,
          "version": "21.0.2+13",
          "url": "https://example.test/OpenJDK21U-jdk_x64_linux_hotspot_21.0.2_13.tar.gz",
          "sha256": "2121212121212121212121212121212121212121212121212121212121212121"
        }
      },
      "aliases": { "latest": 21, "stable": 21, "lts": 21 }
    }
  }
}"#;

#[derive(Default)]
struct CatalogWorld {
    catalog: Option<Catalog>,
    resolved: Option<Result<DistributionRecord, CatalogError>>,
}

#[fixture]
fn world() -> CatalogWorld {
    CatalogWorld::default()
}

#[given("a catalog with JDK 17 and 21 where lts is 21")]
fn given_catalog(world: &mut CatalogWorld) {
    let dir = scratch();
    let path = dir.path.join("catalog.json");
    std::fs::write(&path, CATALOG).expect("write catalog");
    world.catalog = Some(Catalog::load(&path).expect("catalog parses"));
}

#[given("the lts alias is moved to {major}")]
fn given_alias_moved(world: &mut CatalogWorld, major: u32) {
    let platform = linux_x64();
    let catalog = world.catalog.as_mut().expect("catalog loaded");
    let mut entry = catalog
        .provider(&platform, "adoptium")
        .expect("adoptium entry")
        .clone();
    entry.aliases.insert(RollingAlias::Lts, major);
    catalog.set_provider(&platform, "adoptium", entry);
}

#[when("\"{selector}\" is resolved for \"{provider}\"")]
fn when_resolved(world: &mut CatalogWorld, selector: String, provider: String) {
    let selector: VersionSelector = selector.parse().expect("valid selector");
    let catalog = world.catalog.as_ref().expect("catalog loaded");
    world.resolved = Some(catalog.resolve(&linux_x64(), &provider, selector));
}

#[then("the resolved major version is {major}")]
fn then_resolved_major(world: &mut CatalogWorld, major: u32) {
    let record = world
        .resolved
        .as_ref()
        .expect("resolution attempted")
        .as_ref()
        .expect("resolution succeeds");
    assert_eq!(record.major_version, major);
    assert!(record.url.contains(&format!("OpenJDK{major}U")));
}

#[then("resolution fails mentioning \"{text}\"")]
fn then_resolution_fails(world: &mut CatalogWorld, text: String) {
    let err = world
        .resolved
        .as_ref()
        .expect("resolution attempted")
        .as_ref()
        .expect_err("resolution fails");
    assert!(err.to_string().contains(&text), "unexpected error: {err}");
}

#[scenario(
    path = "tests/features/catalog.feature",
    name = "Aliases resolve through the alias table"
)]
fn scenario_alias_resolves(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/catalog.feature",
    name = "Alias targets follow the table"
)]
fn scenario_alias_follows_table(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/catalog.feature",
    name = "Unknown majors list what is available"
)]
fn scenario_unknown_major(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/catalog.feature",
    name = "Unknown providers are rejected"
)]
fn scenario_unknown_provider(world: CatalogWorld) {
    let _ = world;
}
