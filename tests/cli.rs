use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mindmate [OPTIONS] <COMMAND>"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("--inference-url <INFERENCE_URL>"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mindmate serve"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("--host <HOST>"))
        .stdout(predicate::str::contains("--templates <TEMPLATES>"));
}

#[test]
fn test_cli_chat_help_lists_choices() {
    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.arg("chat")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("zephyr-7b"))
        .stdout(predicate::str::contains("phi-3"))
        .stdout(predicate::str::contains("anxious"));
}

#[test]
fn test_cli_models() {
    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("HuggingFaceH4/zephyr-7b-beta"))
        .stdout(predicate::str::contains("microsoft/Phi-3-mini-4k-instruct"));
}

#[test]
fn test_cli_rejects_unknown_mood() {
    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.args(["chat", "--mood", "ecstatic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'ecstatic'"));
}

#[test]
fn test_cli_no_command() {
    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: mindmate [OPTIONS] <COMMAND>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_chat_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/microsoft/Phi-3-mini-4k-instruct"))
        .and(header("authorization", "Bearer cli-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "generated_text": "Try a 4-7-8 breath." }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = Command::cargo_bin("mindmate").unwrap();
    cmd.args(["--inference-url", &server.uri(), "chat", "--model", "phi-3", "--mood", "anxious"])
        .env("HF_TOKEN", "cli-token")
        .write_stdin("I'm feeling anxious lately.\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mood: 😰 Anxious"))
        .stdout(predicate::str::contains("🧘 MindMate: Try a 4-7-8 breath."));
}
