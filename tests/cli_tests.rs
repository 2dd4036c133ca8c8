mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::TestTree;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

/// `clasy` running inside the tree's root with an isolated home directory
fn clasy(tree: &TestTree) -> Result<Command> {
    let mut cmd = Command::cargo_bin("clasy")?;
    cmd.current_dir(tree.path())
        .env("HOME", tree.path())
        .env("NO_COLOR", "1")
        .env_remove("CLASY_CONFIG_PATH")
        .env_remove("CLASY_LOG");
    Ok(cmd)
}

#[cfg(unix)]
#[test]
fn test_classify_creates_links() -> Result<()> {
    let tree = TestTree::new()?;
    tree.source_file("a.txt", "a")?;
    let manifest = tree.write_manifest("  - name: a.txt\n    tags: [x, y]\n")?;

    clasy(&tree)?
        .arg("classify")
        .arg("-f")
        .arg(&manifest)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 linked, 0 up to date"));

    assert_eq!(
        fs::read_link(tree.link("x", "a.txt"))?,
        PathBuf::from("../../src/a.txt")
    );

    clasy(&tree)?
        .args(["classify", "-f"])
        .arg(&manifest)
        .assert()
        .success()
        .stderr(predicate::str::contains("0 linked, 2 up to date"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_default_command_reads_meta_yml() -> Result<()> {
    let tree = TestTree::new()?;
    tree.source_file("a.txt", "a")?;
    tree.write_manifest("  - name: a.txt\n    tags: [x]\n")?;

    clasy(&tree)?
        .assert()
        .success()
        .stderr(predicate::str::contains("1 linked"));

    assert!(fs::symlink_metadata(tree.link("x", "a.txt")).is_ok());
    Ok(())
}

#[test]
fn test_missing_manifest_exits_128() -> Result<()> {
    let tree = TestTree::new()?;

    clasy(&tree)?
        .args(["classify", "-f", "absent.yml"])
        .assert()
        .code(128)
        .stderr(predicate::str::contains("Can't open manifest absent.yml"));
    Ok(())
}

#[test]
fn test_malformed_manifest_exits_1() -> Result<()> {
    let tree = TestTree::new()?;
    fs::write(tree.path().join("meta.yml"), "files: [")?;

    clasy(&tree)?
        .arg("classify")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse manifest"));
    assert!(!tree.dst.exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_conflicts_do_not_fail_the_run() -> Result<()> {
    let tree = TestTree::new()?;
    tree.source_file("a.txt", "a")?;
    fs::create_dir_all(tree.dst.join("x"))?;
    fs::write(tree.link("x", "a.txt"), "occupied")?;
    tree.write_manifest("  - name: a.txt\n    tags: [x]\n")?;

    clasy(&tree)?
        .arg("classify")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 conflicts"));

    assert_eq!(fs::read_to_string(tree.link("x", "a.txt"))?, "occupied");
    Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
    let tree = TestTree::new()?;
    tree.source_file("a.txt", "a")?;
    tree.write_manifest("  - name: a.txt\n    tags: [x, y]\n")?;

    clasy(&tree)?
        .args(["reconcile", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 to link"));

    assert!(!tree.dst.exists());
    Ok(())
}

#[test]
fn test_generate_writes_and_refuses_overwrite() -> Result<()> {
    let tree = TestTree::new()?;
    let manifest = tree.path().join("meta.yml");

    clasy(&tree)?.arg("generate").assert().success();
    let written = fs::read_to_string(&manifest)?;
    assert!(written.contains("source_directory"));

    fs::write(&manifest, "mine")?;
    clasy(&tree)?
        .arg("generate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&manifest)?, "mine");

    clasy(&tree)?.args(["generate", "--force"]).assert().success();
    assert_eq!(fs::read_to_string(&manifest)?, written);
    Ok(())
}

#[test]
fn test_generate_to_stdout() -> Result<()> {
    let tree = TestTree::new()?;

    clasy(&tree)?
        .args(["template", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("destination_directory"))
        .stdout(predicate::str::contains("tags:"));

    assert!(!tree.path().join("meta.yml").exists());
    Ok(())
}

#[test]
fn test_manifest_path_from_config() -> Result<()> {
    let tree = TestTree::new()?;
    let config = tree.path().join("config.toml");
    fs::write(&config, "[core]\nmanifest = \"tags.yml\"\n")?;

    clasy(&tree)?
        .arg("--config")
        .arg(&config)
        .arg("generate")
        .assert()
        .success();

    assert!(tree.path().join("tags.yml").exists());
    assert!(!tree.path().join("meta.yml").exists());
    Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> Result<()> {
    let tree = TestTree::new()?;
    let config = tree.path().join("config.toml");
    fs::write(&config, "[enrich]\nproviders = [\"bogus\"]\n")?;

    clasy(&tree)?
        .env("CLASY_CONFIG_PATH", &config)
        .arg("generate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid config file"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_scan_with_extension_provider() -> Result<()> {
    let tree = TestTree::new()?;
    tree.source_file("trip/beach.jpg", "b")?;
    tree.source_file("notes.TXT", "n")?;
    let config = tree.path().join("config.toml");
    fs::write(&config, "[enrich]\nproviders = [\"extension\"]\n")?;

    clasy(&tree)?
        .arg("--config")
        .arg(&config)
        .args(["scan", "src", "dst", "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 linked"));

    assert_eq!(
        fs::read_link(tree.link("jpg", "beach.jpg"))?,
        PathBuf::from("../../src/trip/beach.jpg")
    );
    assert_eq!(fs::read_to_string(tree.link("txt", "notes.TXT"))?, "n");
    Ok(())
}

#[test]
fn test_scan_declined_at_prompt() -> Result<()> {
    let tree = TestTree::new()?;
    tree.source_file("a.txt", "a")?;

    clasy(&tree)?
        .args(["scan", "src", "dst"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Are you sure?"))
        .stderr(predicate::str::contains("Aborted"));

    assert!(!tree.dst.exists());
    Ok(())
}

#[test]
fn test_scan_missing_source() -> Result<()> {
    let tree = TestTree::new()?;

    clasy(&tree)?
        .args(["scan", "nowhere", "dst", "--yes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Source directory not found"));
    Ok(())
}

#[test]
fn test_completion_script() -> Result<()> {
    let tree = TestTree::new()?;

    clasy(&tree)?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clasy"));
    Ok(())
}

#[test]
fn test_quiet_hides_summary() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write_manifest("  []\n")?;

    clasy(&tree)?
        .args(["-q", "classify"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
    Ok(())
}
