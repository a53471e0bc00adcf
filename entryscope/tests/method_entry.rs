mod common;

use common::{agent, foo_bar, init, static_foo_bar};
use entryscope_host::mock::{HostCall, MockHost, MockLocalVariable, MockMethod};
use entryscope_host::{HostEvent, HostStatus};
use entryscope_protocol::OutputFormat;

#[test]
fn test_end_to_end_foo_bar() {
    init();
    let host = MockHost::new();
    let (method, thread) = static_foo_bar(&host);
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    assert!(host.deliver(&agent, HostEvent::MethodEntry { method, thread }));

    assert_eq!(
        output.contents(),
        "\nSignature(ClassName): 'LFoo;'\n\t Method: 'bar'\n\t\tparam_size: 2\n\
         \t\tslot:0, start:0, cur:0, param:Ljava/lang/String; s\n"
    );
    assert!(host.live_buffers().is_empty());
}

#[test]
fn test_end_to_end_json() {
    init();
    let host = MockHost::new();
    let (method, thread) = foo_bar(&host);
    let (agent, output) = agent(OutputFormat::Json);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let line: serde_json::Value = serde_json::from_str(output.contents().trim_end()).unwrap();
    assert_eq!(line["event"], "method_entry");
    assert_eq!(line["class_name"], "Foo");
    assert_eq!(line["method_name"], "bar");
    assert_eq!(line["param_count"], 3);

    let names: Vec<&str> = line["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["this", "s"]);
}

#[test]
fn test_zero_parameters_no_error() {
    init();
    let host = MockHost::new();
    let method = host.add_method(MockMethod::new("LMain;", "run").with_arguments_size(0).without_debug_info());
    let thread = host.add_thread(method, Ok(0));
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let text = output.contents();
    assert!(!text.contains("ERROR"));
    assert!(text.ends_with("\t\tparam_size: 0\n"));
    assert!(!host.calls().contains(&HostCall::LocalVariableTable(method)));
}

#[test]
fn test_absent_debug_info_one_diagnostic() {
    init();
    let host = MockHost::new();
    let method = host.add_method(MockMethod::new("LFoo;", "bar").with_arguments_size(3).without_debug_info());
    let thread = host.add_thread(method, Ok(0));
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let text = output.contents();
    let errors: Vec<&str> = text.lines().filter(|l| l.starts_with("ERROR:")).collect();
    assert_eq!(
        errors,
        vec!["ERROR: MOCKTI: 101(MOCKTI_ERROR_ABSENT_INFORMATION): Failed to load LocalVariableTable"]
    );
    assert!(!text.contains("slot:"));
    assert!(!host.calls().contains(&HostCall::FrameLocation(thread)));
    assert!(host.live_buffers().is_empty());
}

#[test]
fn test_bindings_after_current_location_skipped() {
    init();
    let host = MockHost::new();
    let method = host.add_method(
        MockMethod::new("LFoo;", "scan")
            .with_arguments_size(3)
            .with_local_variables(vec![
                MockLocalVariable::new(0, "a", "Ljava/lang/Object;", 0),
                MockLocalVariable::new(1, "b", "Ljava/lang/Object;", 5),
                MockLocalVariable::new(2, "c", "Ljava/lang/Object;", 10),
            ]),
    );
    let thread = host.add_thread(method, Ok(6));
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let text = output.contents();
    assert!(text.contains("\t\tslot:0, start:0, cur:6, param:Ljava/lang/Object; a\n"));
    assert!(text.contains("\t\tslot:1, start:5, cur:6, param:Ljava/lang/Object; b\n"));
    assert!(!text.contains(" c\n"));
    assert!(host.live_buffers().is_empty());
}

#[test]
fn test_walk_bounded_by_argument_size() {
    init();
    let host = MockHost::new();
    let method = host.add_method(
        MockMethod::new("LFoo;", "one")
            .with_arguments_size(1)
            .with_local_variables(vec![
                MockLocalVariable::new(0, "arg", "Ljava/lang/Object;", 0),
                MockLocalVariable::new(1, "local", "Ljava/lang/Object;", 0),
            ]),
    );
    let thread = host.add_thread(method, Ok(20));
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let text = output.contents();
    assert!(text.contains(" arg\n"));
    assert!(!text.contains(" local\n"));
}

#[test]
fn test_primitives_walked_not_reported() {
    init();
    let host = MockHost::new();
    let method = host.add_method(
        MockMethod::new("LMath;", "mix")
            .with_arguments_size(6)
            .with_local_variables(vec![
                MockLocalVariable::new(0, "i", "I", 0),
                MockLocalVariable::new(1, "l", "J", 0),
                MockLocalVariable::new(3, "o", "Ljava/lang/Object;", 0),
                MockLocalVariable::new(4, "z", "Z", 0),
                MockLocalVariable::new(5, "d", "[D", 0),
            ]),
    );
    let thread = host.add_thread(method, Ok(0));
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let params: Vec<String> = output
        .contents()
        .lines()
        .filter(|l| l.contains("param:"))
        .map(str::to_string)
        .collect();
    assert_eq!(
        params,
        vec![
            "\t\tslot:3, start:0, cur:0, param:Ljava/lang/Object; o",
            "\t\tslot:5, start:0, cur:0, param:[D d",
        ]
    );
}

#[test]
fn test_every_buffer_released_once() {
    init();
    let host = MockHost::new();
    let (with_info, thread_a) = foo_bar(&host);
    let early_stop = host.add_method(
        MockMethod::new("LFoo;", "late")
            .with_arguments_size(2)
            .with_local_variables(vec![
                MockLocalVariable::new(0, "a", "Ljava/lang/Object;", 0)
                    .with_generic_signature("Ljava/util/List<Ljava/lang/String;>;"),
                MockLocalVariable::new(1, "b", "Ljava/lang/Object;", 50),
            ]),
    );
    let thread_b = host.add_thread(early_stop, Ok(1));
    let frame_fails = host.add_method(
        MockMethod::new("LFoo;", "opaque")
            .with_arguments_size(1)
            .with_local_variables(vec![MockLocalVariable::new(0, "a", "LFoo;", 0)]),
    );
    let thread_c = host.add_thread(frame_fails, Err(HostStatus::OPAQUE_FRAME));
    let no_info = host.add_method(MockMethod::new("LFoo;", "bare").with_arguments_size(1).without_debug_info());
    let thread_d = host.add_thread(no_info, Ok(0));

    let (agent, _) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();
    for (method, thread) in [
        (with_info, thread_a),
        (early_stop, thread_b),
        (frame_fails, thread_c),
        (no_info, thread_d),
    ] {
        host.deliver(&agent, HostEvent::MethodEntry { method, thread });
    }

    assert!(host.allocated_count() > 0);
    assert!(host.live_buffers().is_empty(), "leaked: {:?}", host.live_buffers());
    assert!(host.invalid_releases().is_empty());
    assert_eq!(host.release_counts().len(), host.allocated_count());
    assert!(host.release_counts().values().all(|count| *count == 1));
}

#[test]
fn test_symbol_failures_keep_pipeline_going() {
    init();
    let host = MockHost::new();
    let method = host.add_method(
        MockMethod::new("LFoo;", "bar")
            .with_arguments_size(1)
            .with_local_variables(vec![MockLocalVariable::new(0, "s", "Ljava/lang/String;", 0)])
            .failing(entryscope_host::mock::MockQuery::MethodName, HostStatus::INVALID_METHODID),
    );
    let thread = host.add_thread(method, Ok(0));
    let (agent, output) = agent(OutputFormat::Text);
    agent.attach(&host).unwrap();

    host.deliver(&agent, HostEvent::MethodEntry { method, thread });

    let text = output.contents();
    assert!(text.starts_with("ERROR: MOCKTI: 23(MOCKTI_ERROR_INVALID_METHODID): Cannot load method name\n"));
    assert!(text.contains("\t Method: ''\n"));
    assert!(text.contains("param:Ljava/lang/String; s"));
}
