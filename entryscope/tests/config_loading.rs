mod common;

use std::io::Write;
use std::path::PathBuf;

use common::init;
use entryscope::config::LogLevel;
use entryscope::{Agent, AgentConfig, AttachError, OutputTarget};
use entryscope_host::mock::MockHost;
use entryscope_host::{HostEvent, ThreadHandle};
use entryscope_protocol::OutputFormat;

#[test]
fn test_options_and_file_merge() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("agent.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        "[general]\nenable_logging = false\nlog_level = \"info\"\n\n[output]\ntarget = \"stderr\"\nformat = \"json\""
    )
    .unwrap();

    let options = format!("config={},log_level=debug,mystery=1", config_path.display());
    let config = AgentConfig::resolve(Some(&options)).unwrap();

    assert_eq!(config.output, OutputTarget::Stderr);
    assert_eq!(config.format, OutputFormat::Json);
    assert!(!config.enable_logging);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.config_source, Some(config_path));
    assert_eq!(config.unknown_options, vec!["mystery".to_string()]);
}

#[test]
fn test_invalid_file_rejected() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("agent.toml");
    std::fs::write(&config_path, "[output]\nformat = \"xml\"\n").unwrap();

    let err = AgentConfig::resolve(Some(&format!("config={}", config_path.display()))).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Error at line 2"), "{message}");
    assert!(message.contains("Valid output formats"), "{message}");
}

#[test]
fn test_file_output_target() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("trace.txt");
    let config = AgentConfig {
        output: OutputTarget::File(trace_path.clone()),
        ..AgentConfig::default()
    };

    let agent = Agent::new(config).unwrap();
    let host = MockHost::new();
    agent.attach(&host).unwrap();
    host.deliver(&agent, HostEvent::VmInit { thread: ThreadHandle(1) });
    drop(agent);

    assert_eq!(std::fs::read_to_string(trace_path).unwrap(), "MockVM is ready\n");
}

#[test]
fn test_unwritable_output_fails_attach() {
    init();
    let config = AgentConfig {
        output: OutputTarget::File(PathBuf::from("/nonexistent-entryscope-dir/trace.txt")),
        ..AgentConfig::default()
    };

    assert!(matches!(Agent::new(config), Err(AttachError::Output { .. })));
}
