//! End-to-end tests for a synchronization run against a real git repository.
//!
//! Upstreams are served from memory; file writes, commits and tags are real.

mod common;

use common::prelude::*;

use image_updater::config;
use image_updater::filesystem::BuildTree;
use image_updater::git;
use image_updater::packages::PackageClient;
use image_updater::registry::RegistryClient;
use image_updater::repository::DefaultGitOperations;
use image_updater::sync::Synchronizer;
use image_updater::writer::{checkpoint_tag, SyncWriter};

const TAGS_URL: &str = "https://registry.hub.docker.com/v2/repositories/library/base/tags";

fn registry_body() -> &'static str {
    r#"{"count": 3, "results": [
        {"name": "latest", "last_updated": "2024-03-01T08:00:00.000000Z"},
        {"name": "3.4", "last_updated": "2024-02-01T08:00:00.000000Z"},
        {"name": "3.3", "last_updated": "2024-01-01T08:00:00.000000Z"}
    ]}"#
}

fn synchronizer(
    fixture: &TestFixture,
    http: &FakeHttp,
) -> Synchronizer<FakeHttp, DefaultGitOperations> {
    Synchronizer::new(
        "acme",
        RegistryClient::new(http.clone()),
        PackageClient::new(http.clone()),
        SyncWriter::new(
            BuildTree::new(fixture.path()),
            DefaultGitOperations::new(fixture.path()),
        ),
    )
}

#[test]
fn test_first_run_writes_and_tags_template() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_catalog(catalogs::TEMPLATE_ONLY)
        .with_git();
    let http = FakeHttp::new().with_body(TAGS_URL, registry_body());
    let catalog = config::from_dir(fixture.path()).unwrap();

    let report = synchronizer(&fixture, &http).run(&catalog).unwrap();

    assert_eq!(fixture.read("base-template/Dockerfile"), "FROM base:3.4\nRUN true\n");
    assert_eq!(fixture.read("base-template/version"), "3.4.01");
    assert_eq!(report.checkpoints.len(), 1);
    assert_eq!(
        git::list_tags(fixture.path()).unwrap(),
        vec!["base-template_3.4.01"]
    );
}

#[test]
fn test_rerun_creates_no_checkpoint() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_catalog(catalogs::TEMPLATE_ONLY)
        .with_git();
    let http = FakeHttp::new().with_body(TAGS_URL, registry_body());
    let catalog = config::from_dir(fixture.path()).unwrap();

    synchronizer(&fixture, &http).run(&catalog).unwrap();
    let report = synchronizer(&fixture, &http).run(&catalog).unwrap();

    assert!(report.checkpoints.is_empty());
    assert_eq!(git::list_tags(fixture.path()).unwrap().len(), 1);
}

#[test]
fn test_existing_matching_dockerfile_keeps_version() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_catalog(catalogs::TEMPLATE_ONLY)
        .with_file("base-template/Dockerfile", "FROM base:3.4\nRUN true\n")
        .with_file("base-template/version", "3.4.03")
        .with_git();
    let http = FakeHttp::new().with_body(TAGS_URL, registry_body());
    let catalog = config::from_dir(fixture.path()).unwrap();

    let synced = synchronizer(&fixture, &http)
        .sync_template(&catalog.templates[0])
        .unwrap();

    assert_eq!(synced.version, "3.4.03");
    assert!(synced.checkpoint.is_none());
    assert!(git::list_tags(fixture.path()).unwrap().is_empty());
}

#[test]
fn test_newer_upstream_resets_counter() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_catalog(catalogs::TEMPLATE_ONLY)
        .with_file("base-template/Dockerfile", "FROM base:3.3\nRUN true\n")
        .with_file("base-template/version", "3.3.04")
        .with_git();
    let http = FakeHttp::new().with_body(TAGS_URL, registry_body());
    let catalog = config::from_dir(fixture.path()).unwrap();

    let report = synchronizer(&fixture, &http).run(&catalog).unwrap();

    assert_eq!(report.checkpoints[0].tag, "base-template_3.4.01");
    assert_eq!(fixture.read("base-template/version"), "3.4.01");
}

#[test]
fn test_tilde_revision_is_committed_and_tagged() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_catalog(catalogs::TEMPLATE_ONLY)
        .with_git();
    let mut writer = SyncWriter::new(
        BuildTree::new(fixture.path()),
        DefaultGitOperations::new(fixture.path()),
    );

    let revision = writer.write_revision("web", "1.25.4-1~bookworm").unwrap();
    let checkpoint = writer.checkpoint(&checkpoint_tag("web", &revision)).unwrap();

    assert_eq!(checkpoint.tag, "web_1.25.4-1_bookworm.01");
    assert_eq!(
        git::list_tags(fixture.path()).unwrap(),
        vec!["web_1.25.4-1_bookworm.01"]
    );
    assert_eq!(fixture.read("web/version"), "1.25.4-1~bookworm.01");
}
