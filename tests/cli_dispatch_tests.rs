use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_autoprof")
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("autoprof-{name}-{stamp}.yaml"))
}

#[test]
fn missing_command_prints_usage() {
    let output = Command::new(bin()).output().expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: autoprof"));
}

#[test]
fn decode_command_emits_canonical_json() {
    let output = Command::new(bin())
        .args(["decode", "Tower|Buckler", "SHIELDTYPE.Heavy", "%LIST[CLASS=Fighter]"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("decode should emit json");
    assert_eq!(payload["token"], "AUTO:SHIELDPROF");
    assert_eq!(
        payload["values"],
        serde_json::json!(["%LIST[CLASS=Fighter]", "Buckler|Tower", "SHIELDTYPE=Heavy"])
    );
}

#[test]
fn decode_command_fails_on_mixed_all() {
    let output = Command::new(bin())
        .args(["decode", "ALL|Buckler"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Non-sensical AUTO:SHIELDPROF"));
}

#[test]
fn decode_command_fails_when_values_conflict() {
    let output = Command::new(bin())
        .args(["decode", "ALL", "Buckler"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("encode failed"));
}

#[test]
fn validate_command_passes_clean_rule_set() {
    let output = Command::new(bin())
        .args(["validate", &fixture("rules.yaml"), &fixture("catalog.yaml")])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed"));
}

#[test]
fn validate_command_returns_non_zero_on_invalid_rules() {
    let output = Command::new(bin())
        .args(["validate", &fixture("invalid_rules.yaml")])
        .env_remove("AUTOPROF_CATALOG")
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed: 3 error(s)"));
    assert!(stderr.contains("Fighter.auto_shieldprof[1]"));
}

#[test]
fn validate_command_reports_unreadable_yaml() {
    let path = unique_temp_path("broken-rules");
    fs::write(&path, "entities: [ {key: ").expect("fixture should be written");

    let output = Command::new(bin())
        .args(["validate", path.to_string_lossy().as_ref()])
        .env_remove("AUTOPROF_CATALOG")
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unable to parse yaml"));

    let _ = fs::remove_file(path);
}

#[test]
fn grant_command_combines_static_grants_and_choices() {
    let output = Command::new(bin())
        .args(["grant", &fixture("rules.yaml"), "fighter", "Light Shield", "Kite"])
        .env("AUTOPROF_CATALOG", fixture("catalog.yaml"))
        .output()
        .expect("grant should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("grant should emit json");
    assert_eq!(payload["entity"], "Fighter");
    assert_eq!(
        payload["granted"],
        serde_json::json!(["Buckler", "Light Shield", "Heavy Shield", "Tower"])
    );
}

#[test]
fn grant_command_rejects_unknown_entity() {
    let output = Command::new(bin())
        .args(["grant", &fixture("rules.yaml"), "Wizard"])
        .env("AUTOPROF_CATALOG", fixture("catalog.yaml"))
        .output()
        .expect("grant should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown entity 'Wizard'"));
}
