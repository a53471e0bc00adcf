mod common;

use common::{agent, foo_bar, init};
use entryscope::{AttachError, LifecycleState};
use entryscope_host::mock::{HostCall, MockHost};
use entryscope_host::{EventKind, HostError, HostEvent, HostStatus, ThreadHandle};
use entryscope_protocol::OutputFormat;

#[test]
fn test_capability_rejection_aborts_attach() {
    init();
    let host = MockHost::new();
    host.reject_capabilities(HostStatus::NOT_AVAILABLE);
    let (method, thread) = foo_bar(&host);
    let (agent, output) = agent(OutputFormat::Text);

    let err = agent.attach(&host).unwrap_err();

    assert!(matches!(
        err,
        AttachError::Host(HostError::CapabilitiesRejected {
            status: HostStatus::NOT_AVAILABLE,
            ..
        })
    ));
    assert_eq!(host.calls(), vec![HostCall::AddCapabilities]);
    for kind in EventKind::ALL {
        assert!(!host.is_bound(kind));
        assert!(!host.is_enabled(kind));
    }

    assert!(!host.deliver(&agent, HostEvent::MethodEntry { method, thread }));
    assert!(!host.deliver(&agent, HostEvent::VmDeath));
    assert!(output.contents().is_empty());
    assert_eq!(agent.state(), LifecycleState::Unattached);
}

#[test]
fn test_full_session() {
    init();
    let host = MockHost::new();
    let (method, thread) = foo_bar(&host);
    let (agent, output) = agent(OutputFormat::Text);

    agent.attach(&host).unwrap();
    assert_eq!(agent.state(), LifecycleState::Active);

    host.deliver(&agent, HostEvent::VmInit { thread: ThreadHandle(1) });
    host.deliver(&agent, HostEvent::MethodEntry { method, thread });
    host.deliver(&agent, HostEvent::VmDeath);
    agent.detach();

    let text = output.contents();
    assert!(text.starts_with("MockVM is ready\n\nSignature(ClassName): 'LFoo;'\n"));
    assert!(text.ends_with("MockVM finished the code execution\n"));
    assert_eq!(agent.state(), LifecycleState::Unattached);
}

#[test]
fn test_lifecycle_json_lines() {
    init();
    let host = MockHost::new();
    let (agent, output) = agent(OutputFormat::Json);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::VmInit { thread: ThreadHandle(1) });
    host.deliver(&agent, HostEvent::VmDeath);

    let lines: Vec<serde_json::Value> = output
        .contents()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "vm_init");
    assert_eq!(lines[1]["event"], "vm_death");
    assert_eq!(lines[1]["vm"], "MockVM");
}

#[test]
fn test_method_entry_enable_rejected_without_capability_grant() {
    init();
    let host = MockHost::new();
    host.fail_enable(EventKind::MethodEntry, HostStatus::MUST_POSSESS_CAPABILITY);
    let (agent, _) = agent(OutputFormat::Text);

    let err = agent.attach(&host).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to enable MethodEntry notification: 99 (MUST_POSSESS_CAPABILITY)"
    );
    // Bound but never enabled: nothing is delivered
    assert!(host.is_bound(EventKind::MethodEntry));
    assert!(!host.deliver(&agent, HostEvent::VmDeath));
}
