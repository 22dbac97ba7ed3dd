//! Testes de integração para a CLI do Sigilo.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binário rodando dentro de um diretório temporário.
fn sigilo_in(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sigilo").expect("binary exists");
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    sigilo_in(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sigilo"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    sigilo_in(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("mask"))
                .and(predicate::str::contains("rules"))
                .and(predicate::str::contains("key"))
                .and(predicate::str::contains("audit"))
                .and(predicate::str::contains("doctor")),
        );
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    sigilo_in(&dir).arg("invalid-command-that-does-not-exist").assert().failure();
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .arg("init")
        .arg("--path")
        .arg(dir.path())
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("sigilo.toml")).unwrap();
    assert!(content.contains("[general]"));
    assert!(content.contains("[cache]"));
    assert!(content.contains("[masking]"));
    assert!(content.contains("[audit]"));
}

#[test]
fn test_mask_from_stdin() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .args(["mask", "--view", "detail", "--role", "receptionist"])
        .write_stdin(r#"{"name": "Joana", "cpf": "123.456.789-00"}"#)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("123.***.***-00")
                .and(predicate::str::contains("Joana"))
                .and(predicate::str::contains("456").not()),
        );
}

#[test]
fn test_mask_records_audit_trail() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .args(["mask", "--user", "ana", "--emergency"])
        .write_stdin(r#"{"diagnosis": "dermatite", "card_number": "4111111111111111"}"#)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("dermatite").and(predicate::str::contains("tok_")),
        );

    assert!(dir.path().join(".sigilo").join("audit.db").exists());

    sigilo_in(&dir)
        .args(["audit", "--user", "ana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ana").and(predicate::str::contains("EMERGENCY")));
}

#[test]
fn test_mask_show_audit_goes_to_stderr() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .args(["mask", "--show-audit"])
        .write_stdin(r#"{"email": "joana@clinica.com"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("jo***@clinica.com"))
        .stderr(predicate::str::contains("masked_fields"));
}

#[test]
fn test_mask_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .arg("mask")
        .write_stdin("{not json")
        .assert()
        .failure();
}

#[test]
fn test_rules_lists_builtin_set() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("cpf").and(predicate::str::contains("credentials")));
}

#[test]
fn test_key_is_order_independent() {
    let dir = TempDir::new().unwrap();

    let first = sigilo_in(&dir)
        .args(["key", "appointments", r#"{"day": "2024-05-01", "clinic": 7}"#])
        .output()
        .unwrap();
    let second = sigilo_in(&dir)
        .args(["key", "appointments", r#"{"clinic": 7, "day": "2024-05-01"}"#])
        .output()
        .unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stdout).starts_with("appointments:"));
}

#[test]
fn test_custom_rules_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("sigilo.toml"),
        r#"
[masking]
include_builtin_rules = false

[[masking.rules]]
id = "nickname"
fields = ["nickname"]
category = "personal"
masking_type = "redact"
priority = 10

[audit]
enabled = false
"#,
    )
    .unwrap();

    sigilo_in(&dir)
        .arg("mask")
        .write_stdin(r#"{"nickname": "Jo", "cpf": "123.456.789-00"}"#)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[REDACTED]").and(predicate::str::contains("123.456.789-00")),
        );
}

#[test]
fn test_invalid_rule_names_rule_id() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("sigilo.toml"),
        r#"
[[masking.rules]]
id = "scrambled-cpf"
fields = ["cpf"]
category = "sensitive"
masking_type = "scramble"
priority = 10
"#,
    )
    .unwrap();

    sigilo_in(&dir)
        .arg("rules")
        .assert()
        .failure()
        .stderr(predicate::str::contains("scrambled-cpf"));

    // doctor reporta o problema sem falhar
    sigilo_in(&dir)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("scrambled-cpf"));
}

#[test]
fn test_doctor_without_config() {
    let dir = TempDir::new().unwrap();

    sigilo_in(&dir)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Diagnosing"));
}

#[test]
fn test_verbose_and_quiet_flags() {
    let dir = TempDir::new().unwrap();
    sigilo_in(&dir).args(["-v", "version"]).assert().success();
    sigilo_in(&dir).args(["-q", "version"]).assert().success();
}
