//! Integration tests for event dispatch semantics on a kernel bus.
//!
//! Covers:
//! - canonical topics and root-most-first bubbling
//! - cancellation, once bindings and idempotent binds
//! - snapshot dispatch while listeners mutate the bus
//! - the process-wide bus before it is installed

use serde_json::json;
use std::sync::Arc;
use weft::config::{BusConfig, KernelConfig};
use weft::{global, ComponentId, Event, EventError, Flow, Kernel, KernelError, Listener};
use weft_event::testing::Recorder;

// =============================================================================
// Test Fixtures
// =============================================================================

fn kernel_with_depth(max_depth: usize) -> Kernel {
    Kernel::new(KernelConfig {
        bus: BusConfig { max_depth },
        ..Default::default()
    })
    .expect("valid config")
}

fn kernel() -> Kernel {
    kernel_with_depth(32)
}

// =============================================================================
// Bubbling
// =============================================================================

#[test]
fn ancestors_run_root_most_first() {
    let kernel = kernel();
    let rec = Recorder::new();
    let bus = kernel.bus();
    bus.bind(rec.listener("start"), "app.request.start", false)
        .unwrap();
    bus.bind(rec.listener("request"), "App/Request", false).unwrap();
    bus.bind(rec.listener("app"), "app", false).unwrap();
    bus.bind(rec.listener("sibling"), "app.response", false).unwrap();

    let ran = kernel
        .publish(&Event::new("\\app//REQUEST.start/"))
        .unwrap();

    assert!(ran);
    assert_eq!(rec.calls(), ["app", "request", "start"]);
}

#[test]
fn same_node_runs_in_bind_order() {
    let kernel = kernel();
    let rec = Recorder::new();
    for label in ["first", "second", "third"] {
        kernel
            .bus()
            .bind(rec.listener(label), "cache.hit", false)
            .unwrap();
    }

    kernel.publish(&Event::new("cache.hit")).unwrap();
    assert_eq!(rec.calls(), ["first", "second", "third"]);
}

#[test]
fn stop_cancels_descendants_and_later_bindings() {
    let kernel = kernel();
    let rec = Recorder::new();
    let bus = kernel.bus();
    bus.bind(rec.listener("app"), "app", false).unwrap();
    bus.bind(rec.stopper("guard"), "app.request", false).unwrap();
    bus.bind(rec.listener("late"), "app.request", false).unwrap();
    bus.bind(rec.listener("start"), "app.request.start", false)
        .unwrap();

    assert!(kernel.publish(&Event::new("app.request.start")).unwrap());
    assert_eq!(rec.calls(), ["app", "guard"]);
}

// =============================================================================
// Binding rules
// =============================================================================

#[test]
fn once_binding_fires_a_single_time() {
    let kernel = kernel();
    let rec = Recorder::new();
    kernel
        .bus()
        .bind(rec.listener("boot"), "app.ready", true)
        .unwrap();

    kernel.publish(&Event::new("app.ready")).unwrap();
    kernel.publish(&Event::new("app.ready")).unwrap();

    assert_eq!(rec.count("boot"), 1);
    assert_eq!(kernel.bus().bindings_on("app.ready"), 0);
}

#[test]
fn rebinding_a_method_is_idempotent() {
    let kernel = kernel();
    let owner = ComponentId::builtin("router");
    let rec = Recorder::new();
    for _ in 0..3 {
        let r = rec.clone();
        kernel
            .bus()
            .bind(
                Listener::method(&owner, "route", move |_| {
                    r.record("route");
                    Ok(Flow::Continue)
                }),
                ["app.request", "app.request"],
                false,
            )
            .unwrap();
    }

    kernel.publish(&Event::new("app.request")).unwrap();
    assert_eq!(rec.calls(), ["route"]);
    assert_eq!(kernel.bus().listener_count(), 1);
}

#[test]
fn invalid_topic_binds_nothing() {
    let kernel = kernel();
    let rec = Recorder::new();
    let err = kernel
        .bus()
        .bind(rec.listener("x"), ["view.render", "/"], false)
        .expect_err("blank topic");
    assert!(matches!(err, EventError::InvalidTopic(_)));
    assert!(!kernel.bus().has_topic("view.render"));
}

// =============================================================================
// Snapshot dispatch
// =============================================================================

#[test]
fn binding_during_dispatch_waits_for_next_publish() {
    let kernel = kernel();
    let bus = Arc::clone(kernel.bus());
    let rec = Recorder::new();

    let late = rec.clone();
    let inner = Arc::clone(&bus);
    bus.bind(
        Listener::closure(move |_| {
            late.record("binder");
            inner.bind(late.listener("late"), "app.tick", false)?;
            Ok(Flow::Continue)
        }),
        "app",
        true,
    )
    .unwrap();

    kernel.publish(&Event::new("app.tick")).unwrap();
    assert_eq!(rec.calls(), ["binder"]);

    kernel.publish(&Event::new("app.tick")).unwrap();
    assert_eq!(rec.calls(), ["binder", "late"]);
}

#[test]
fn nested_publish_beyond_depth_fails() {
    let kernel = kernel_with_depth(2);
    let bus = Arc::clone(kernel.bus());
    let inner = Arc::clone(&bus);
    bus.bind(
        Listener::closure(move |event| {
            inner.publish(event)?;
            Ok(Flow::Continue)
        }),
        "loop",
        false,
    )
    .unwrap();

    let err = kernel.publish(&Event::new("loop")).expect_err("runaway");
    let KernelError::Event(err) = err else {
        panic!("expected event error");
    };
    let root = err.root_cause().to_string();
    assert!(root.contains("depth"), "root cause: {root}");
}

#[test]
fn params_reach_listeners_in_order() {
    let kernel = kernel();
    let rec = Recorder::new();
    let r = rec.clone();
    kernel
        .bus()
        .bind(
            Listener::closure(move |event| {
                for param in event.params() {
                    r.record(param.snapshot().to_string());
                }
                Ok(Flow::Continue)
            }),
            "db.query",
            false,
        )
        .unwrap();

    kernel
        .publish(&Event::new("db.query").with_param("users").with_param(json!(10)))
        .unwrap();
    assert_eq!(rec.calls(), ["\"users\"", "10"]);
}

// =============================================================================
// Process-wide bus
// =============================================================================

#[test]
fn global_publish_before_install_is_soft_false() {
    // This binary never boots a kernel.
    assert!(!global::is_installed());
    assert!(!global::publish(&Event::new("app.start")).unwrap());

    let rec = Recorder::new();
    let err = global::bind(rec.listener("x"), "app.start", false).expect_err("nothing installed");
    assert!(matches!(err, EventError::NotInstalled));
}
