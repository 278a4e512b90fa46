#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// ビルドコンテキストのない一時ディレクトリへバイナリをコピー
fn isolated_binary() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("o2js");
    std::fs::copy(assert_cmd::cargo::cargo_bin("o2js"), &binary).unwrap();
    (dir, binary)
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("o2js").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("openapi2jsonschema"))
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("schemas"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("o2js").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("o2js"));
}

/// schemasコマンドのヘルプにオプションが表示されることを確認
#[test]
fn test_schemas_help() {
    let mut cmd = Command::cargo_bin("o2js").unwrap();
    cmd.arg("schemas")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--jobs"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("o2js").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// 固定設定がJSONで表示されることを確認
#[test]
fn test_config_prints_fixed_settings() {
    let mut cmd = Command::cargo_bin("o2js").unwrap();
    let output = cmd.arg("config").assert().success().get_output().stdout.clone();

    let settings: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        settings["release"]["image"],
        "patthomasrick/openapi2jsonschema:latest"
    );
    assert_eq!(
        settings["release"]["platforms"],
        serde_json::json!(["linux/amd64", "linux/arm64"])
    );
    assert_eq!(settings["release"]["builder"], "multiarch");
}

/// ビルドコンテキストがなければ docker を呼ばずに終了コード4で失敗することを確認
#[test]
fn test_release_without_context() {
    let (_dir, binary) = isolated_binary();

    Command::new(&binary)
        .arg("release")
        .assert()
        .code(4)
        .stdout(predicate::str::contains("docker buildx build").not())
        .stderr(predicate::str::contains("docker-openapi2jsonschema"));
}

/// 作業ディレクトリ外への出力指定は通信前に拒否されることを確認
#[test]
fn test_schemas_rejects_absolute_output() {
    let workdir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("o2js").unwrap();
    cmd.current_dir(workdir.path())
        .args(["schemas", "--output", "/tmp/o2js-schemas"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("relative path"));
}

/// 引数なしでもリリースが実行されることを確認
#[test]
fn test_default_command_is_release() {
    let (_dir, binary) = isolated_binary();

    Command::new(&binary)
        .current_dir(std::env::temp_dir())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("ビルドコンテキストが見つかりません"));
}
