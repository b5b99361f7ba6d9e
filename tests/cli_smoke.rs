/// CLI smoke tests: invoke the compiled binary, no network required.
/// Every test isolates HOME and clears credential variables so nothing resolves.
use assert_cmd::Command;
use tempfile::TempDir;

const CREDENTIAL_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "PINECONE_API_KEY",
    "PINECONE_INDEX",
    "PINECONE_INDEX_HOST",
    "SHOPWHISPER_LLM_ENDPOINT",
    "SHOPWHISPER_LLM_MODEL",
    "SHOPWHISPER_EMBED_PROVIDER",
    "SHOPWHISPER_EMBED_MODEL",
    "SHOPWHISPER_EMBED_ENDPOINT",
];

#[allow(deprecated)]
fn shopwhisper(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shopwhisper").unwrap();
    cmd.env("HOME", home.path()).env_remove("XDG_CONFIG_HOME");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn stderr_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

// ── Binary runs ──────────────────────────────────────────────────────────

#[test]
fn help_flag_exits_zero() {
    let tmp = TempDir::new().unwrap();
    shopwhisper(&tmp).arg("--help").assert().success();
}

#[test]
fn version_flag_exits_zero() {
    let tmp = TempDir::new().unwrap();
    shopwhisper(&tmp).arg("--version").assert().success();
}

// ── Auth (no network needed) ─────────────────────────────────────────────

#[test]
fn auth_list_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let text = stdout_of(shopwhisper(&tmp).args(["auth", "list"]).assert().success());
    assert!(text.contains("Pinecone"), "got: {}", text);
    assert!(text.contains("not configured"), "got: {}", text);
}

#[test]
fn auth_status_no_config_exits_zero() {
    // Should print a "Note:" message and exit 0, not panic
    let tmp = TempDir::new().unwrap();
    let text = stdout_of(shopwhisper(&tmp).args(["auth", "status"]).assert().success());
    assert!(text.contains("Note:"), "got: {}", text);
}

#[test]
fn auth_logout_unknown_service_errors() {
    let tmp = TempDir::new().unwrap();
    shopwhisper(&tmp)
        .args(["auth", "logout", "myspace"])
        .assert()
        .failure();
}

// ── Graceful errors ──────────────────────────────────────────────────────

#[test]
fn ask_without_credentials_fails_before_network() {
    let tmp = TempDir::new().unwrap();
    let text = stderr_of(
        shopwhisper(&tmp)
            .args(["ask", "red dress for a wedding"])
            .assert()
            .failure(),
    );
    assert!(text.contains("OPENAI_API_KEY"), "got: {}", text);
}

#[test]
fn ask_empty_query_errors_not_panics() {
    let tmp = TempDir::new().unwrap();
    let text = stderr_of(shopwhisper(&tmp).args(["ask", "   "]).assert().failure());
    assert!(text.contains("EmptyQuery"), "got: {}", text);
}

#[test]
fn ask_requires_query_argument() {
    let tmp = TempDir::new().unwrap();
    shopwhisper(&tmp).arg("ask").assert().failure();
}

#[test]
fn unknown_provider_is_rejected() {
    let tmp = TempDir::new().unwrap();
    shopwhisper(&tmp)
        .args(["ask", "boots", "--provider", "myspace"])
        .env("OPENAI_API_KEY", "sk-test")
        .env("PINECONE_API_KEY", "pc-test")
        .env("PINECONE_INDEX", "products")
        .assert()
        .failure();
}

// ── Connectivity test ────────────────────────────────────────────────────

#[test]
fn auth_test_unreachable_services_exit_non_zero() {
    // Nothing listens on port 1, so every check fails fast
    let tmp = TempDir::new().unwrap();
    let config_home = tmp.path().join(".config");
    std::fs::create_dir_all(config_home.join("shopwhisper")).unwrap();
    std::fs::write(
        config_home.join("shopwhisper").join("auth.json"),
        r#"{"credentials":{"pinecone":{"type":"api","key":"pc-test","endpoint":"http://127.0.0.1:1","index":"products"}}}"#,
    )
    .unwrap();

    let text = stdout_of(
        shopwhisper(&tmp)
            .args(["auth", "test"])
            .env("XDG_CONFIG_HOME", &config_home)
            .env("OPENAI_API_KEY", "sk-test")
            .env("PINECONE_API_KEY", "pc-test")
            .env("PINECONE_INDEX", "products")
            .env("SHOPWHISPER_EMBED_ENDPOINT", "http://127.0.0.1:1")
            .env("SHOPWHISPER_LLM_ENDPOINT", "http://127.0.0.1:1")
            .assert()
            .failure(),
    );
    assert!(text.contains("FAIL"), "got: {}", text);
    assert!(text.contains("chat"), "chat completion should be checked; got: {}", text);
}
