use scry::emit::StreamSink;
use scry::inspect::{InspectOutcome, Inspector, Limits};
use scry::value::{Value, ValueArena};

#[test]
fn call_budget_latches_for_the_rest_of_the_process() {
    let mut limits = Limits::default();
    limits.max_calls = 3;
    let mut inspector = Inspector::in_memory(limits);
    let arena = ValueArena::new();

    let outcomes: Vec<bool> = (0..6)
        .map(|i| {
            inspector
                .analyze(&arena, &Value::Int(i), "n")
                .is_some()
        })
        .collect();
    assert_eq!(outcomes, [true, true, true, false, false, false]);
}

#[test]
fn skipped_calls_emit_nothing() {
    let mut limits = Limits::default();
    limits.max_calls = 0;
    let mut inspector = Inspector::in_memory(limits);
    let arena = ValueArena::new();

    let mut sink = StreamSink::new(Vec::new());
    let outcome = inspector
        .inspect(&arena, &Value::from("quiet"), "s", &mut sink)
        .unwrap();
    assert_eq!(outcome, InspectOutcome::Skipped);
    assert!(sink.into_inner().is_empty());
}

#[test]
fn successful_calls_complete_end_to_end() {
    let mut arena = ValueArena::new();
    let pair = arena.alloc_composite("Pair");
    arena.composite_push(pair, "left", Value::Int(1));
    arena.composite_push(pair, "right", Value::Int(2));

    let mut inspector = Inspector::in_memory(Limits::default());
    let mut sink = StreamSink::new(Vec::new());
    let outcome = inspector
        .inspect(&arena, &Value::Composite(pair), "pair", &mut sink)
        .unwrap();

    assert_eq!(outcome, InspectOutcome::Completed);
    let output = String::from_utf8(sink.into_inner()).unwrap();
    assert!(output.contains("pair (composite Pair)"));
    assert!(output.contains("left (int) => 1"));
    assert!(output.contains("right (int) => 2"));
    assert!(output.ends_with("}\n"));
}

#[test]
fn limits_load_from_partial_json() {
    let limits = Limits::from_json_str(r#"{"max_seconds": 0.5, "seq_threshold": 10}"#).unwrap();
    assert_eq!(limits.max_seconds, 0.5);
    assert_eq!(limits.seq_threshold, 10);
    assert_eq!(limits.max_depth, Limits::default().max_depth);
    assert_eq!(
        limits.memory_floor_bytes,
        Limits::default().memory_floor_bytes
    );
}

#[test]
fn limits_reject_malformed_json() {
    assert!(Limits::from_json_str("{max_depth: 1}").is_err());
    assert!(Limits::from_json_str(r#"{"max_depth": "deep"}"#).is_err());
}

#[test]
fn each_call_gets_a_fresh_clock() {
    // A budget generous enough for any single call, consumed per call
    // rather than across calls.
    let mut limits = Limits::default();
    limits.max_seconds = 5.0;
    let mut inspector = Inspector::in_memory(limits);
    let arena = ValueArena::new();

    for i in 0..50 {
        let node = inspector.analyze(&arena, &Value::Int(i), "n");
        assert!(node.is_some());
        assert!(node.unwrap().marker.is_none());
    }
}
