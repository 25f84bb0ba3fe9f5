//! End-to-end tests for the `migrant` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn migrant(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("migrant").unwrap();
    cmd.current_dir(cwd)
        .env_remove("MIGRANT_MIGRATIONS_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn migration_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn generates_posts_migration() {
    let dir = tempfile::tempdir().unwrap();

    migrant(dir.path())
        .args([
            "migration",
            "posts",
            "--schema=title:string:unique body:text published_at:timestamp:nullable",
            "--add=timestamps,softDeletes",
            "--keys=user_id:id:users:cascade",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("posts generated"));

    let migrations = dir.path().join("database/migrations");
    let names = migration_files(&migrations);
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with("_create_posts_table.php"), "{:?}", names);

    let content = fs::read_to_string(migrations.join(&names[0])).unwrap();
    assert!(content.contains("class CreatePostsTable extends Migration"));
    assert!(content.contains("            $table->string('title')->unique();\n"));
    assert!(content.contains("            $table->timestamp('published_at')->nullable();\n"));
    assert!(content.contains("            $table->softDeletes();\n"));
    assert!(content.contains("->onDelete('cascade');"));
}

#[test]
fn second_run_replaces_previous_migration() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("2020_01_01_000000_create_posts_table.php"), "<?php").unwrap();
    fs::write(out.join("2020_01_01_000000_create_users_table.php"), "<?php").unwrap();

    migrant(dir.path())
        .args(["migration", "posts", "--schema=title:string", "--path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed stale migration"));

    let names = migration_files(&out);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"2020_01_01_000000_create_users_table.php".to_string()));
    assert!(!names.contains(&"2020_01_01_000000_create_posts_table.php".to_string()));
}

#[test]
fn explicit_file_name_and_directory_from_env() {
    let dir = tempfile::tempdir().unwrap();

    migrant(dir.path())
        .env("MIGRANT_MIGRATIONS_DIR", dir.path())
        .args(["migration", "posts", "--file=posts_fixture"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("posts_fixture.php")).unwrap();
    assert!(content.contains("            // Schema declaration\n"));
}

#[test]
fn explicit_file_replaced_without_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("posts_fixture.php");

    migrant(dir.path())
        .args(["migration", "posts", "--schema=title:string", "--file=posts_fixture", "--path"])
        .arg(dir.path())
        .assert()
        .success();

    migrant(dir.path())
        .args(["migration", "posts", "--schema=body:text", "--file=posts_fixture", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed stale migration"))
        .stdout(predicate::str::contains("posts generated"));

    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("$table->text('body');"));
    assert!(!content.contains("$table->string('title');"));
    assert_eq!(migration_files(dir.path()), vec!["posts_fixture.php"]);
}

#[test]
fn config_file_sets_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("migrant.toml"), "migrations_dir = \"db\"\n").unwrap();

    migrant(dir.path())
        .args(["migration", "tags", "--file=tags"])
        .assert()
        .success();

    assert!(dir.path().join("db/tags.php").is_file());
}

#[test]
fn bad_schema_fails() {
    let dir = tempfile::tempdir().unwrap();

    migrant(dir.path())
        .args(["migration", "posts", "--schema=title:string(255"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid options for table 'posts'"));

    assert!(!dir.path().join("database").exists());
}

#[test]
fn parse_prints_json() {
    let dir = tempfile::tempdir().unwrap();

    migrant(dir.path())
        .args(["parse", "keys", "[a,b]:id:parents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"parents\""))
        .stdout(predicate::str::contains("\"a\""));

    migrant(dir.path())
        .args(["parse", "schema", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("no schema given"));
}
