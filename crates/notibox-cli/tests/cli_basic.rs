//! Basic CLI E2E tests.
//!
//! Each test gets a throwaway HOME so config and state land in a temp
//! directory, then drives the compiled binary the way a user would.
//! Nothing here talks to the network or the OS keyring.

use std::path::Path;
use std::process::Command;

use notibox_core::storage::StateDb;
use notibox_core::NotificationStore;
use tempfile::TempDir;

fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_notibox-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("NOTIBOX_ENV")
        .env_remove("NOTIBOX_DEBUG_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn item(id: &str, reason: &str, repo: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "unread": true,
        "reason": reason,
        "subject": { "title": title, "type": "Issue" },
        "repository": { "full_name": repo },
        "updated_at": "2026-02-10T08:00:00Z",
    })
}

/// Seed the store the CLI will open under the given HOME.
fn seed_store(home: &Path, payloads: &[serde_json::Value]) {
    let dir = home.join(".config").join("notibox");
    std::fs::create_dir_all(&dir).unwrap();
    let db = StateDb::open_at(&dir.join("notibox.db")).unwrap();
    let mut store = NotificationStore::open(db).unwrap();
    let items = payloads
        .iter()
        .map(|p| serde_json::from_value(p.clone()).unwrap())
        .collect();
    store.ingest(items);
    store.flush().unwrap();
}

fn status_json(home: &Path) -> serde_json::Value {
    let (stdout, _, code) = run_cli(home, &["status", "--json"]);
    assert_eq!(code, 0, "status failed");
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("inbox"));
    assert!(stdout.contains("rules"));
    assert!(stdout.contains("watch"));
    assert!(stdout.contains("badge"));
}

#[test]
fn status_on_an_empty_store() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Active:   0 (0 unread)"));
    assert!(stdout.contains("Fetched:  never"));
}

#[test]
fn badge_is_blank_when_nothing_is_unread() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["badge"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "");
}

#[test]
fn badge_counts_seeded_unread() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[
            item("n1", "mention", "acme/site", "Broken link"),
            item("n2", "subscribed", "acme/site", "CI flake"),
        ],
    );
    let (stdout, _, code) = run_cli(home.path(), &["badge", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["priority"], true);
    assert_eq!(parsed["text"], "2");
}

#[test]
fn inbox_list_shows_seeded_items() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[item("n1", "mention", "acme/site", "Broken link")],
    );
    let (stdout, _, code) = run_cli(home.path(), &["inbox", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("n1"));
    assert!(stdout.contains("acme/site"));
    assert!(stdout.contains("Broken link"));
}

#[test]
fn inbox_filter_narrows_and_persists() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[
            item("n1", "mention", "acme/site", "Broken link"),
            item("n2", "subscribed", "acme/site", "CI flake"),
        ],
    );

    let (stdout, _, code) = run_cli(home.path(), &["inbox", "list", "--filter", "mentions"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("n1"));
    assert!(!stdout.contains("n2"));

    // The filter is part of the durable state.
    let (stdout, _, code) = run_cli(home.path(), &["inbox", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("n1"));
    assert!(!stdout.contains("n2"));

    let (_, stderr, code) = run_cli(home.path(), &["inbox", "list", "--filter", "bogus"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown filter"));
}

#[test]
fn read_mark_then_undo_across_invocations() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[
            item("n1", "mention", "acme/site", "Broken link"),
            item("n2", "subscribed", "acme/site", "CI flake"),
        ],
    );

    let (stdout, _, code) = run_cli(home.path(), &["read", "mark", "n1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Marked 1 notification(s) read."));
    assert_eq!(status_json(home.path())["active"], 1);

    let (stdout, _, code) = run_cli(home.path(), &["read", "undo"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Restored 1 notification(s)."));
    let status = status_json(home.path());
    assert_eq!(status["active"], 2);
    assert_eq!(status["unread"], 2);

    let (stdout, _, code) = run_cli(home.path(), &["read", "undo"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Nothing to undo."));
}

#[test]
fn archive_add_is_terminal_and_listed() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[
            item("n1", "mention", "acme/site", "Broken link"),
            item("n2", "subscribed", "acme/site", "CI flake"),
        ],
    );

    let (stdout, _, code) = run_cli(home.path(), &["archive", "add", "n2"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Archived 1 notification(s)."));

    let (stdout, _, code) = run_cli(home.path(), &["archive", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("n2"));

    let status = status_json(home.path());
    assert_eq!(status["active"], 1);
    assert_eq!(status["archived"], 1);
}

#[test]
fn snooze_set_list_and_cancel() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[item("n1", "mention", "acme/site", "Broken link")],
    );

    let (stdout, _, code) = run_cli(
        home.path(),
        &["snooze", "set", "n1", "--for-minutes", "120"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Snoozed n1 until"));

    let (stdout, _, code) = run_cli(home.path(), &["snooze", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("n1"));

    let (stdout, _, code) = run_cli(home.path(), &["snooze", "cancel", "n1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Woke n1."));

    let (_, stderr, code) = run_cli(home.path(), &["snooze", "cancel", "n1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not snoozed"));

    // Waking forces the item unread.
    let status = status_json(home.path());
    assert_eq!(status["active"], 1);
    assert_eq!(status["unread"], 1);
}

#[test]
fn snooze_rejects_an_overflowing_minute_count() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[item("n1", "mention", "acme/site", "Broken link")],
    );

    // u64::MAX minutes does not fit a millisecond clock.
    let (_, stderr, code) = run_cli(
        home.path(),
        &["snooze", "set", "n1", "--for-minutes", "18446744073709551615"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("--for-minutes is too large"));

    // The item is untouched.
    let status = status_json(home.path());
    assert_eq!(status["active"], 1);
    assert_eq!(status["snoozed"], 0);
}

#[test]
fn rules_roundtrip_through_the_cli() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[
            item("n1", "mention", "acme/site", "Broken link"),
            item("n2", "ci_activity", "acme/infra", "Nightly failed"),
        ],
    );

    let (stdout, _, code) = run_cli(home.path(), &["rules", "add", "repo", "acme/infra"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Rule added:"));

    let (stdout, _, code) = run_cli(home.path(), &["rules", "list", "--json"]);
    assert_eq!(code, 0);
    let rules: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rule_id = rules[0]["id"].as_str().unwrap().to_string();

    let (stdout, _, code) = run_cli(home.path(), &["rules", "apply", "--dry-run"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Would archive 1 notification(s)."));
    assert!(stdout.contains("n2"));
    assert_eq!(status_json(home.path())["active"], 2);

    let (stdout, _, code) = run_cli(home.path(), &["rules", "apply"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Archived 1 notification(s)."));
    let status = status_json(home.path());
    assert_eq!(status["active"], 1);
    assert_eq!(status["archived"], 1);

    let (stdout, _, code) = run_cli(home.path(), &["rules", "toggle", &rule_id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("disabled"));

    let (stdout, _, code) = run_cli(home.path(), &["rules", "delete", &rule_id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("deleted"));

    let (stdout, _, code) = run_cli(home.path(), &["rules", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No rules configured."));
}

#[test]
fn rules_add_rejects_bad_input() {
    let home = TempDir::new().unwrap();

    let (_, stderr, code) = run_cli(home.path(), &["rules", "add", "repo", "not-a-repo"]);
    assert_ne!(code, 0);
    assert!(!stderr.is_empty());

    let (_, stderr, code) = run_cli(home.path(), &["rules", "add", "reason", "nonsense"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown reason"));

    let (_, stderr, code) = run_cli(home.path(), &["rules", "add", "color", "blue"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown rule kind"));
}

#[test]
fn config_get_set_roundtrip() {
    let home = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "sync.fetch_interval_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let (stdout, _, code) = run_cli(
        home.path(),
        &["config", "set", "sync.fetch_interval_secs", "120"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "sync.fetch_interval_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn watch_once_runs_without_credentials() {
    let home = TempDir::new().unwrap();
    seed_store(
        home.path(),
        &[item("n1", "mention", "acme/site", "Broken link")],
    );
    let (_, stderr, code) = run_cli(home.path(), &["watch", "--once"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("watch loop started"));
}

#[test]
fn completions_generate_for_bash() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("notibox-cli"));
}
