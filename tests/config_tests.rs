//! Config loading, TOML parsing, and env var override tests.
//!
//! Some tests are `#[ignore]` (they chdir or set env vars and conflict in parallel).
//! Run them with: `cargo test --test config_tests -- --ignored --test-threads=1`

use std::env;
use std::fs;
use tempfile::TempDir;
use text2sql::inference::ChatTemplate;
use text2sql::Config;

fn write_config(content: &str) -> (TempDir, String) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, content).unwrap();
    let path = path.to_string_lossy().into_owned();
    (temp, path)
}

// Default Configuration Tests
#[test]
fn test_config_default_model() {
    let config = Config::default();
    assert_eq!(config.model.endpoint, "http://127.0.0.1:8001");
    assert_eq!(config.model.name, "Qwen/Qwen2.5-Coder-7B-Instruct-GPTQ-Int4");
    assert_eq!(config.model.chat_template, ChatTemplate::ChatMl);
    assert_eq!(config.model.max_new_tokens, 512);
    assert!(config.model.temperature.abs() < f32::EPSILON);
}

#[test]
fn test_config_default_http() {
    let config = Config::default();
    assert_eq!(config.http.port, 8000);
    assert!(config.http.ui_enabled);
}

#[test]
fn test_config_default_client_timeout() {
    let config = Config::default();
    assert_eq!(config.client.timeout_secs, 300);
    assert_eq!(config.model.request_timeout_secs, 300);
}

// TOML File Parsing Tests
#[test]
fn test_from_file_reads_sections() {
    let (_temp, path) = write_config(
        r#"
[model]
endpoint = "http://gpu-box:8001"
chat_template = "llama2"
max_new_tokens = 256

[http]
port = 9100
cors_origins = ["http://localhost:3000"]
ui_enabled = false

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.model.endpoint, "http://gpu-box:8001");
    assert_eq!(config.model.chat_template, ChatTemplate::Llama2);
    assert_eq!(config.model.max_new_tokens, 256);
    assert_eq!(config.http.port, 9100);
    assert_eq!(config.http.cors_origins, vec!["http://localhost:3000"]);
    assert!(!config.http.ui_enabled);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    // untouched sections keep their defaults
    assert_eq!(config.client.timeout_secs, 300);
}

#[test]
fn test_from_file_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.toml");
    let config = Config::from_file(&path.to_string_lossy()).unwrap();
    assert_eq!(config.http.port, 8000);
}

#[test]
fn test_from_file_qwen_alias() {
    let (_temp, path) = write_config("[model]\nchat_template = \"qwen\"\n");
    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.model.chat_template, ChatTemplate::ChatMl);
}

#[test]
fn test_from_file_rejects_bad_types() {
    let (_temp, path) = write_config("[http]\nport = \"eighty\"\n");
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_from_file_rejects_unknown_template() {
    let (_temp, path) = write_config("[model]\nchat_template = \"mistral\"\n");
    assert!(Config::from_file(&path).is_err());
}

// Environment Override Tests
#[test]
#[ignore = "Requires --test-threads=1 due to env var changes"]
fn test_db_env_vars_override_file() {
    let (_temp, path) = write_config("[database]\nhost = \"from-file\"\nport = 6000\n");

    env::set_var("DB_HOST", "from-env");
    env::set_var("DB_PORT", "6543");
    env::set_var("DB_PASSWORD", "s3cret");
    let config = Config::from_file(&path);
    env::remove_var("DB_HOST");
    env::remove_var("DB_PORT");
    env::remove_var("DB_PASSWORD");

    let config = config.unwrap();
    assert_eq!(config.database.host, "from-env");
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.database.password, "s3cret");
}

#[test]
#[ignore = "Requires --test-threads=1 due to env var changes"]
fn test_prefixed_env_vars_override_file() {
    let (_temp, path) = write_config("[model]\nendpoint = \"http://from-file:8001\"\n");

    env::set_var("TEXT2SQL_MODEL__ENDPOINT", "http://from-env:8001");
    env::set_var("TEXT2SQL_HTTP__PORT", "9200");
    let config = Config::from_file(&path);
    env::remove_var("TEXT2SQL_MODEL__ENDPOINT");
    env::remove_var("TEXT2SQL_HTTP__PORT");

    let config = config.unwrap();
    assert_eq!(config.model.endpoint, "http://from-env:8001");
    assert_eq!(config.http.port, 9200);
}

#[test]
#[ignore = "Requires --test-threads=1 due to directory change"]
fn test_load_merges_local_overrides() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.toml"),
        "[model]\nmax_new_tokens = 128\n[http]\nport = 9000\n",
    )
    .unwrap();
    fs::write(temp.path().join("config.local.toml"), "[http]\nport = 9001\n").unwrap();

    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(temp.path()).unwrap();
    let config = Config::load();
    env::set_current_dir(original_dir).unwrap();

    let config = config.unwrap();
    assert_eq!(config.model.max_new_tokens, 128);
    assert_eq!(config.http.port, 9001);
}
