#![cfg(unix)]

mod common;

use cloudscan_runner::logger::{ConsoleLogger, PLUGIN_NAME};
use cloudscan_runner::options::ScanOptions;
use cloudscan_runner::orchestrator::ScanOrchestrator;
use cloudscan_runner::resolver::RulepackResolver;
use common::{direct_client, serve, Response};

fn orchestrator_in(
    temp: &std::path::Path,
) -> (ScanOrchestrator, cloudscan_runner::logger::CapturedLog) {
    let (logger, captured) = ConsoleLogger::capture();
    let resolver = RulepackResolver::new(logger.clone()).with_temp_dir(temp);
    (ScanOrchestrator::new(logger).with_resolver(resolver), captured)
}

#[test]
fn echo_scan_succeeds_and_relays_output() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, captured) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("echo").scan_arg("hello").build().unwrap();

    let report = orchestrator.perform(&options);

    assert!(report.succeeded);
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.command.tokens(), ["echo", "hello"]);
    assert!(captured.lines().contains(&"[cloudscan-runner] hello".to_string()));
}

#[test]
fn version_diagnostic_runs_first_and_command_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, captured) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("echo")
        .base_args(["start", "-b", "web"])
        .scan_arg("-scan")
        .build()
        .unwrap();

    orchestrator.perform(&options);

    let lines = captured.lines();
    let version = lines
        .iter()
        .position(|l| l == "[cloudscan-runner] -version")
        .expect("version diagnostic output");
    let logged = lines
        .iter()
        .position(|l| l == "[cloudscan-runner] Executing command: echo start -b web -scan")
        .expect("logged command line");
    let scan = lines
        .iter()
        .position(|l| l == "[cloudscan-runner] start -b web -scan")
        .expect("scan output");
    assert!(version < logged && logged < scan);
}

#[test]
fn failing_version_diagnostic_does_not_fail_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("scanned-marker"), "").unwrap();
    let (orchestrator, captured) = orchestrator_in(dir.path());
    // `ls -version` exits non-zero; `ls <dir>` succeeds.
    let options = ScanOptions::builder("ls")
        .scan_arg(dir.path().to_string_lossy())
        .build()
        .unwrap();

    let report = orchestrator.perform(&options);
    assert!(report.succeeded);
    assert!(captured.contents().contains("scanned-marker"));
}

#[test]
fn non_zero_exit_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, captured) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("false").build().unwrap();

    let report = orchestrator.perform(&options);
    assert!(!report.succeeded);
    assert_eq!(report.exit_code, 1);
    assert!(captured.contents().contains("Scan failed with exit code 1"));
}

#[test]
fn missing_command_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, _) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("cloudscan-runner-definitely-not-installed")
        .build()
        .unwrap();

    let report = orchestrator.perform(&options);
    assert!(!report.succeeded);
}

#[test]
fn resolved_rules_become_flag_pairs_and_unresolved_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.xml");
    let second = dir.path().join("second.xml");
    std::fs::write(&first, "<RulePack/>").unwrap();
    std::fs::write(&second, "<RulePack/>").unwrap();

    let (orchestrator, _) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("cloudscan")
        .base_args(["start", "-b", "web"])
        .rules([
            first.to_string_lossy().into_owned(),
            "/definitely/missing.xml".to_string(),
            second.to_string_lossy().into_owned(),
            first.to_string_lossy().into_owned(),
        ])
        .scan_args(["-scan", "-quick"])
        .build()
        .unwrap();

    let (command, unresolved) = orchestrator.command_vector(&options);
    let first = first.to_string_lossy().into_owned();
    let first = first.as_str();
    let second = second.to_string_lossy().into_owned();
    let second = second.as_str();

    assert_eq!(
        command.tokens(),
        [
            "cloudscan", "start", "-b", "web", "-rules", first, "-rules", second, "-rules", first,
            "-scan", "-quick",
        ]
    );
    assert_eq!(unresolved, vec!["/definitely/missing.xml".to_string()]);
}

#[test]
fn rule_path_with_space_is_quoted() {
    let dir = tempfile::tempdir().unwrap();
    let rule = dir.path().join("my rules.xml");
    std::fs::write(&rule, "<RulePack/>").unwrap();

    let (orchestrator, _) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("cloudscan")
        .rule(rule.to_string_lossy())
        .build()
        .unwrap();

    let (command, _) = orchestrator.command_vector(&options);
    assert_eq!(command.tokens()[2], format!("\"{}\"", rule.display()));
}

#[test]
fn render_returns_shell_command_without_running() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let (orchestrator, captured) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("touch")
        .scan_arg(marker.to_string_lossy())
        .build()
        .unwrap();

    let rendered = orchestrator.render(&options);

    assert_eq!(rendered.shell, format!("sh -c 'touch {}'", marker.display()));
    assert_eq!(rendered.argv.tokens().len(), 2);
    assert!(!marker.exists());
    assert!(captured.contents().contains("Scan command: touch"));
}

#[test]
fn workspace_sets_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("workspace-marker"), "").unwrap();
    let (orchestrator, captured) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("ls")
        .workspace(dir.path())
        .build()
        .unwrap();

    let report = orchestrator.perform(&options);
    assert!(report.succeeded);
    assert!(captured.contents().contains("workspace-marker"));
}

#[test]
fn options_env_reaches_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, captured) = orchestrator_in(dir.path());
    let options = ScanOptions::builder("sh")
        .scan_args(["-c", "echo token=$SCAN_TOKEN"])
        .env("SCAN_TOKEN", "abc123")
        .build()
        .unwrap();

    let report = orchestrator.perform(&options);
    assert!(report.succeeded);
    assert!(captured.contents().contains("token=abc123"));
}

#[test]
fn relative_rule_is_found_in_workspace_by_the_scan() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    std::fs::create_dir(workspace.path().join("rules")).unwrap();
    let rule = workspace.path().join("rules/workspace-only.xml");
    std::fs::write(&rule, "<RulePack/>").unwrap();

    let (orchestrator, _) = orchestrator_in(temp.path());
    // `$2` is the path after `-rules`; the scan fails if it cannot see it.
    let options = ScanOptions::builder("sh")
        .base_args(["-c", r#"test -f "$2""#, "sh"])
        .rule("rules/workspace-only.xml")
        .workspace(workspace.path())
        .build()
        .unwrap();

    let report = orchestrator.perform(&options);

    assert!(report.succeeded);
    assert!(report.unresolved_rules.is_empty());
    assert_eq!(report.command.tokens()[4], "-rules");
    assert_eq!(report.command.tokens()[5], rule.to_string_lossy());
}

#[test]
fn relative_rule_outside_workspace_is_unresolved() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let (orchestrator, _) = orchestrator_in(temp.path());
    let options = ScanOptions::builder("cloudscan")
        .rule("Cargo.toml")
        .workspace(workspace.path())
        .build()
        .unwrap();

    let (command, unresolved) = orchestrator.command_vector(&options);
    assert_eq!(command.tokens(), ["cloudscan"]);
    assert_eq!(unresolved, vec!["Cargo.toml".to_string()]);
}

#[test]
fn downloads_land_in_workspace_without_temp_override() {
    let workspace = tempfile::tempdir().unwrap();
    let (base, server) = serve(vec![Response::ok("<RulePack/>")]);
    let (logger, _) = ConsoleLogger::capture();
    let resolver = RulepackResolver::new(logger.clone()).with_client(direct_client());
    let orchestrator = ScanOrchestrator::new(logger).with_resolver(resolver);
    let options = ScanOptions::builder("cloudscan")
        .rule(format!("{base}/r.xml"))
        .workspace(workspace.path())
        .build()
        .unwrap();

    let (command, unresolved) = orchestrator.command_vector(&options);
    server.join().unwrap();

    assert!(unresolved.is_empty());
    let downloaded = std::path::Path::new(&command.tokens()[2]);
    assert!(downloaded.starts_with(workspace.path().join(PLUGIN_NAME)));
    assert!(downloaded.is_file());
}

#[test]
fn temp_override_wins_over_workspace_for_downloads() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let (base, server) = serve(vec![Response::ok("<RulePack/>")]);
    let (logger, _) = ConsoleLogger::capture();
    let resolver = RulepackResolver::new(logger.clone())
        .with_temp_dir(temp.path())
        .with_client(direct_client());
    let orchestrator = ScanOrchestrator::new(logger).with_resolver(resolver);
    let options = ScanOptions::builder("cloudscan")
        .rule(format!("{base}/r.xml"))
        .workspace(workspace.path())
        .build()
        .unwrap();

    let (command, _) = orchestrator.command_vector(&options);
    server.join().unwrap();

    let downloaded = std::path::Path::new(&command.tokens()[2]);
    assert!(downloaded.starts_with(temp.path().join(PLUGIN_NAME)));
    assert!(!workspace.path().join(PLUGIN_NAME).exists());
}
