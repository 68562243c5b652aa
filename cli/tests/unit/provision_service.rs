//! Tests for the provisioning pipeline.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use nxbootstrap_cli::application::services::logged_runner::LoggedRunner;
use nxbootstrap_cli::application::services::provision::{self, Step};
use nxbootstrap_cli::domain::config::{BootstrapConfig, RunOptions, Target};
use nxbootstrap_cli::domain::error::ProvisionError;

use crate::helpers::{base_env, config_with};
use crate::mocks::{MemoryStager, MemoryTranscript, RecordingReporter, Reply, ScriptedRunner};

const CONFIG_PATH: &str = "/etc/puppetlabs/puppet/puppet.conf";

/// Runner that answers the two queries `configure_agent` depends on.
fn device() -> ScriptedRunner {
    ScriptedRunner::new()
        .on("--configprint config", Reply::Ok("/etc/puppetlabs/puppet/puppet.conf\n"))
        .on("hostname", Reply::Ok("n9k-1\n"))
}

struct Harness {
    transcript: MemoryTranscript,
    stager: MemoryStager,
    reporter: RecordingReporter,
}

impl Harness {
    fn new() -> Self {
        Self::with_stager(MemoryStager::default())
    }

    fn with_stager(stager: MemoryStager) -> Self {
        Self {
            transcript: MemoryTranscript::default(),
            stager,
            reporter: RecordingReporter::default(),
        }
    }

    async fn provision(
        &self,
        config: &BootstrapConfig,
        runner: &ScriptedRunner,
    ) -> anyhow::Result<provision::ProvisionReport> {
        let logged = LoggedRunner::new(runner, &self.transcript);
        provision::provision(config, &logged, &self.stager, &self.reporter).await
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_run_executes_steps_in_order() {
    let config = config_with(&[("DNS", "10.0.0.1")]);
    let runner = device();
    let h = Harness::new();

    let report = h.provision(&config, &runner).await.expect("provision");

    assert_eq!(
        report.completed,
        vec![Step::Resolver, Step::Reachability, Step::Install, Step::Configure, Step::Kickstart]
    );
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let order = [
        "sudo rm -f /etc/resolv.conf",
        "sudo cp /bootflash/resolv.conf",
        "sudo ip netns exec management ping -c 5 pm.example.com",
        "sudo ip netns exec management wget -q -O /dev/null http://repo.example.com/rpms/",
        "sudo ip netns exec management yum install -y http://repo.example.com/rpms/puppet-agent-1.2.5-1.nxos.x86_64.rpm",
        "sudo /opt/puppetlabs/puppet/bin/puppet agent --configprint config",
        "hostname",
        "sudo cp /bootflash/puppet.conf",
        "sudo ln -sf /opt/puppetlabs/puppet/bin/puppet /usr/bin/puppet",
        "sudo ip netns exec management /opt/puppetlabs/puppet/bin/puppet agent -t",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|p| runner.position(p).unwrap_or_else(|| panic!("missing call: {p}\n{:#?}", runner.lines())))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:#?}", runner.lines());
    assert_eq!(runner.lines().len(), order.len());
}

#[tokio::test]
async fn test_resolver_untouched_without_nameservers() {
    let config = config_with(&[]);
    let runner = device();
    let h = Harness::new();

    let report = h.provision(&config, &runner).await.expect("provision");

    assert!(!report.completed.contains(&Step::Resolver));
    assert!(runner.position("/etc/resolv.conf").is_none(), "{:#?}", runner.lines());
    assert!(runner.position("/bootflash/resolv.conf").is_none());
    assert!(h.stager.contents("resolv.conf").is_none());
    assert!(h.transcript.contains("No nameservers configured"));
}

#[tokio::test]
async fn test_rendered_files_are_staged_and_discarded() {
    let config = config_with(&[("DNS", "10.0.0.1, 10.0.0.2")]);
    let runner = device();
    let h = Harness::new();

    h.provision(&config, &runner).await.expect("provision");

    assert_eq!(
        h.stager.contents("resolv.conf").expect("resolv.conf staged"),
        "nameserver 10.0.0.1\nnameserver 10.0.0.2\ndomain example.com\nsearch example.com\n"
    );
    assert_eq!(
        h.stager.contents("puppet.conf").expect("puppet.conf staged"),
        "[main]\ncertname=n9k-1.example.com\nserver=pm.example.com\n"
    );
    assert!(h.stager.all_discarded());
    assert!(runner.lines().iter().any(|l| l.ends_with(CONFIG_PATH)));
}

#[tokio::test]
async fn test_every_command_lands_in_transcript() {
    let config = config_with(&[]);
    let runner = device();
    let h = Harness::new();

    h.provision(&config, &runner).await.expect("provision");

    let commands = h.transcript.entries().iter().filter(|e| e.starts_with("$ ")).count();
    assert_eq!(commands, runner.lines().len());
    assert!(h.transcript.contains("$ hostname\nn9k-1"));
}

#[tokio::test]
async fn test_gpg_key_imported_before_install() {
    let config = config_with(&[("RPM_GPG_KEY", "http://repo.example.com/RPM-GPG-KEY")]);
    let runner = device();
    let h = Harness::new();

    let report = h.provision(&config, &runner).await.expect("provision");

    let gpg = runner.position("rpm --import http://repo.example.com/RPM-GPG-KEY").expect("gpg import");
    let yum = runner.position("yum install").expect("install");
    assert!(gpg < yum);
    assert!(report.completed.contains(&Step::GpgKey));
}

#[tokio::test]
async fn test_guestshell_target_uses_chvrf_prefix() {
    let config = BootstrapConfig::from_env(
        &base_env(),
        RunOptions { target: Target::Guestshell, ..RunOptions::default() },
    )
    .expect("config");
    let runner = device();
    let h = Harness::new();

    h.provision(&config, &runner).await.expect("provision");

    assert!(
        runner.position("sudo /isan/bin/guestshell sudo chvrf management ping -c 5 pm.example.com").is_some(),
        "{:#?}",
        runner.lines()
    );
}

#[tokio::test]
async fn test_no_vrf_runs_commands_outside_namespace() {
    let config = BootstrapConfig::from_env(
        &base_env(),
        RunOptions { no_vrf: true, ..RunOptions::default() },
    )
    .expect("config");
    let runner = device();
    let h = Harness::new();

    h.provision(&config, &runner).await.expect("provision");

    assert!(runner.position("sudo ping -c 5 pm.example.com").is_some(), "{:#?}", runner.lines());
    assert!(runner.position("ip netns exec").is_none(), "{:#?}", runner.lines());
}

// ── Early exit ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_failure_stops_before_install() {
    let config = config_with(&[]);
    let runner = device().on("ping", Reply::Exit(1, "no route to host"));
    let h = Harness::new();

    let err = h.provision(&config, &runner).await.unwrap_err();

    let pe = err.downcast_ref::<ProvisionError>().expect("provision error");
    assert!(matches!(pe, ProvisionError::Unreachable { target, .. } if target == "pm.example.com"));
    assert_eq!(pe.to_string(), "Failed to ping puppet master");
    assert!(runner.position("wget").is_none());
    assert!(runner.position("yum").is_none());
    assert!(h.transcript.contains("Failed to ping puppet master"));
}

#[tokio::test]
async fn test_repo_failure_stops_before_install() {
    let config = config_with(&[]);
    let runner = device().on("wget", Reply::Exit(4, "connection refused"));
    let h = Harness::new();

    let err = h.provision(&config, &runner).await.unwrap_err();

    let pe = err.downcast_ref::<ProvisionError>().expect("provision error");
    assert!(matches!(pe, ProvisionError::Unreachable { target, .. } if target == "http://repo.example.com/rpms/"));
    assert!(runner.position("yum").is_none());
    assert!(h.transcript.contains("Failed to contact RPM repo"));
}

#[tokio::test]
async fn test_unreachable_error_carries_steps_already_done() {
    let config = config_with(&[("DNS", "10.0.0.1")]);
    let runner = device().on("ping", Reply::Exit(1, "no route to host"));
    let h = Harness::new();

    let err = h.provision(&config, &runner).await.unwrap_err();

    match err.downcast_ref::<ProvisionError>() {
        Some(ProvisionError::Unreachable { completed, .. }) => {
            assert_eq!(completed, &vec![Step::Resolver]);
        }
        other => panic!("expected Unreachable, got {other:?}"),
    }
}

// ── Fatal failures ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_install_failure_is_fatal() {
    let config = config_with(&[]);
    let runner = device().on("yum", Reply::Exit(1, "No package available"));
    let h = Harness::new();

    let err = h.provision(&config, &runner).await.unwrap_err();

    let pe = err.downcast_ref::<ProvisionError>().expect("provision error");
    assert!(matches!(pe, ProvisionError::StepFailed { .. }), "got: {pe:?}");
    assert!(pe.to_string().contains("No package available"), "got: {pe}");
    assert!(runner.position("agent -t").is_none());
}

#[tokio::test]
async fn test_failed_copy_still_discards_staged_file() {
    let config = config_with(&[("DNS", "10.0.0.1")]);
    let runner = device().on("sudo cp /bootflash/resolv.conf", Reply::Exit(1, "read-only file system"));
    let h = Harness::new();

    h.provision(&config, &runner).await.unwrap_err();

    assert!(h.stager.all_discarded());
    assert!(runner.position("ping").is_none());
}

#[tokio::test]
async fn test_failed_copy_is_reported_over_failed_discard() {
    let config = config_with(&[("DNS", "10.0.0.1")]);
    let runner = device().on("sudo cp /bootflash/resolv.conf", Reply::Exit(1, "read-only file system"));
    let h = Harness::with_stager(MemoryStager::failing_discard());

    let err = h.provision(&config, &runner).await.unwrap_err();

    let pe = err.downcast_ref::<ProvisionError>().expect("copy failure, not discard failure");
    assert!(pe.to_string().contains("read-only file system"), "got: {pe}");
    assert!(h.stager.all_discarded());
}

#[tokio::test]
async fn test_failed_discard_after_good_copy_stops_run() {
    let config = config_with(&[("DNS", "10.0.0.1")]);
    let runner = device();
    let h = Harness::with_stager(MemoryStager::failing_discard());

    let err = h.provision(&config, &runner).await.unwrap_err();

    assert!(err.to_string().contains("cannot remove /bootflash/resolv.conf"), "got: {err}");
    assert!(runner.position("ping").is_none());
}

// ── Warnings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_agent_exit_code_two_counts_as_started() {
    let config = config_with(&[]);
    let runner = device().on("agent -t", Reply::Exit(2, ""));
    let h = Harness::new();

    let report = h.provision(&config, &runner).await.expect("provision");
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_agent_failure_is_a_warning() {
    let config = config_with(&[]);
    let runner = device().on("agent -t", Reply::Exit(1, "Could not request certificate"));
    let h = Harness::new();

    let report = h.provision(&config, &runner).await.expect("provision");

    assert_eq!(report.completed.last(), Some(&Step::Kickstart));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(h.reporter.warnings.lock().expect("lock").len(), 1);
    assert!(h.transcript.contains("Agent did not start properly"));
}

#[tokio::test]
async fn test_failed_symlink_and_gpg_are_warnings() {
    let config = config_with(&[("RPM_GPG_KEY", "http://repo.example.com/KEY")]);
    let runner = device()
        .on("rpm --import", Reply::Exit(1, "import failed"))
        .on("ln -sf", Reply::Exit(1, "exists"));
    let h = Harness::new();

    let report = h.provision(&config, &runner).await.expect("provision");

    assert_eq!(report.warnings.len(), 2, "{:?}", report.warnings);
    assert!(runner.position("agent -t").is_some());
}

// ── Environment ──────────────────────────────────────────────────────────────

#[test]
fn test_proxies_go_to_child_env_not_command_line() {
    let config = config_with(&[
        ("PROXY", "http://proxy.example.com:8080"),
        ("PROXY_SECURE", "https://proxy.example.com:8443"),
    ]);
    assert_eq!(
        config.child_env(),
        vec![
            ("http_proxy".to_string(), "http://proxy.example.com:8080".to_string()),
            ("https_proxy".to_string(), "https://proxy.example.com:8443".to_string()),
        ]
    );
    assert!(!config.prefixed("yum install -y x").contains("proxy"));
}
