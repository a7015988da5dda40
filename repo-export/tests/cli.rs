use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{NamedTempFile, TempDir};

fn repo_export() -> Command {
    let mut cmd = Command::cargo_bin("repo-export").expect("Binary exists");
    cmd.env_remove("GITHUB_TOKEN").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_the_export_subcommand() {
    repo_export()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"));

    repo_export()
        .args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--repo").and(predicate::str::contains("--output")));
}

#[test]
fn export_without_token_fails_before_any_request() {
    let dir = TempDir::new().expect("temp dir");
    repo_export()
        .current_dir(dir.path())
        .args(["export", "--repo", "octo/demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN must be set"));

    // no document was written
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn malformed_repository_is_rejected() {
    repo_export()
        .env("GITHUB_TOKEN", "dummy")
        .args(["export", "--repo", "just-a-name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[test]
fn unreachable_api_fails_with_non_zero_exit() {
    let settings = NamedTempFile::new().expect("Creating temp settings file failed");
    write(
        settings.path(),
        "api_base_url: \"http://127.0.0.1:9\"\nrequest_timeout_secs: 2\ndeadline_secs: 10\n",
    )
    .expect("Writing temp settings failed");
    let dir = TempDir::new().expect("temp dir");

    repo_export()
        .current_dir(dir.path())
        .env("GITHUB_TOKEN", "dummy")
        .args(["export", "--repo", "octo/demo", "--config"])
        .arg(settings.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Repository exported to").not());
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use repo_export::cli::{run, Cli, Commands};

    // An invalid repository fails fast, after the trace event.
    let cli = Cli {
        command: Commands::Export {
            repo: "invalid".to_string(),
            config: None,
            output: None,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
