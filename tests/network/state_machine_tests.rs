//! Tests for the connectivity state machine
//!
//! Probes are stubbed. Most tests use the current-thread test runtime, so
//! spawned probe tasks only make progress while the test awaits; the
//! `with_runtime` tests drive an explicit multi-thread runtime.

use crate::common::{
    classifier_for, connected, next_result, signal, source, wifi_info, GatedProbe, PanickingProbe, StubProbe,
};
use netreach::core::network::*;
use std::sync::Arc;

fn machine(src: &Arc<SnapshotSource>, probe: Arc<dyn ReachabilityProbe>, host: Option<&str>) -> ConnectivityStateMachine {
    ConnectivityStateMachine::new(classifier_for(src), probe, host.map(str::to_string), 16).unwrap()
}

#[tokio::test]
async fn test_mobile_attach_probes_and_publishes() {
    let src = source(None, None);
    let probe = StubProbe::new(true);
    let machine = machine(&src, probe.clone(), Some("example.com"));
    let mut subscription = machine.subscribe();

    assert_eq!(machine.snapshot().state, ConnectivityState::NoNetwork);

    src.set_active(connected(NetworkType::Mobile));
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::ProbeScheduled);

    let result = next_result(&mut subscription).await;
    assert_eq!(
        result,
        ReachabilityResult {
            prev_available: false,
            new_available: true,
            does_host_respond: true,
            prev_state: ConnectivityState::NoNetwork,
            new_state: ConnectivityState::ConnectedMobile,
            prev_identity: None,
            new_identity: Some(NetworkIdentity::mobile()),
        }
    );
    assert_eq!(probe.calls(), vec!["example.com".to_string()]);
    assert!(!machine.is_probe_in_flight());
    assert_eq!(machine.snapshot().host_responds, Some(true));
}

#[tokio::test]
async fn test_repeated_signal_is_noop() {
    let src = source(connected(NetworkType::Mobile), None);
    let probe = StubProbe::new(true);
    let machine = machine(&src, probe.clone(), Some("example.com"));
    let mut subscription = machine.subscribe();

    // Bootstrapped baseline already matches
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::NoOp);
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::NoOp);

    tokio::task::yield_now().await;
    assert!(probe.calls().is_empty());
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn test_access_point_change_triggers_probe() {
    let src = source(connected(NetworkType::Wifi), Some(wifi_info("office", "aa:bb:cc:00:00:01")));
    let probe = StubProbe::new(false);
    let machine = machine(&src, probe.clone(), Some("example.com"));
    let mut subscription = machine.subscribe();

    src.set_wifi(Some(wifi_info("office", "aa:bb:cc:00:00:02")));
    assert_eq!(machine.on_signal(&signal(NetworkType::Wifi)), Transition::ProbeScheduled);

    let result = next_result(&mut subscription).await;
    assert_eq!(result.prev_state, ConnectivityState::ConnectedWiFi);
    assert_eq!(result.new_state, ConnectivityState::ConnectedWiFi);
    assert!(result.prev_available && result.new_available);
    assert_ne!(result.prev_identity, result.new_identity);
    assert!(!result.does_host_respond);
    assert_eq!(probe.calls().len(), 1);
}

#[tokio::test]
async fn test_signal_for_other_network_is_ignored() {
    let src = source(connected(NetworkType::Wifi), None);
    let probe = StubProbe::new(true);
    let machine = machine(&src, probe.clone(), Some("example.com"));
    let before = machine.snapshot();

    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::Ignored);
    assert_eq!(machine.snapshot(), before);
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn test_second_probe_is_dropped_while_one_is_in_flight() {
    let src = source(None, None);
    let probe = GatedProbe::new(true);
    let machine = machine(&src, probe.clone(), Some("example.com"));
    let mut subscription = machine.subscribe();

    src.set_active(connected(NetworkType::Mobile));
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::ProbeScheduled);
    probe.wait_started().await;
    assert!(machine.is_probe_in_flight());

    src.set_active(connected(NetworkType::Wifi));
    src.set_wifi(Some(wifi_info("cafe", "aa:bb:cc:dd:ee:ff")));
    assert_eq!(machine.on_signal(&signal(NetworkType::Wifi)), Transition::ProbeSkipped);

    // The baseline moves even though the probe was skipped
    let snapshot = machine.snapshot();
    assert_eq!(snapshot.state, ConnectivityState::ConnectedWiFi);
    assert_eq!(snapshot.host_responds, None);

    probe.open();
    let result = next_result(&mut subscription).await;
    assert_eq!(result.new_state, ConnectivityState::ConnectedMobile);
    assert!(result.does_host_respond);

    // A stale probe does not vouch for the newer baseline
    assert_eq!(machine.snapshot().host_responds, None);
    assert_eq!(probe.calls(), 1);
    assert!(!machine.is_probe_in_flight());
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn test_guard_released_after_probe_panics() {
    let src = source(None, None);
    let machine = machine(&src, Arc::new(PanickingProbe), Some("example.com"));
    let mut subscription = machine.subscribe();

    src.set_active(connected(NetworkType::Mobile));
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::ProbeScheduled);

    let result = next_result(&mut subscription).await;
    assert!(!result.does_host_respond);
    assert!(!machine.is_probe_in_flight());

    src.set_active(connected(NetworkType::Ethernet));
    assert_eq!(machine.on_signal(&signal(NetworkType::Ethernet)), Transition::ProbeScheduled);
    let result = next_result(&mut subscription).await;
    assert_eq!(result.new_state, ConnectivityState::ConnectedOther);
}

#[tokio::test]
async fn test_disconnect_publishes_without_probe() {
    let src = source(connected(NetworkType::Mobile), None);
    let probe = StubProbe::new(true);
    let machine = machine(&src, probe.clone(), Some("example.com"));
    let mut subscription = machine.subscribe();

    src.set_active(None);
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::Published);

    let result = next_result(&mut subscription).await;
    assert!(result.prev_available);
    assert!(!result.new_available);
    assert!(!result.does_host_respond);
    assert_eq!(result.new_state, ConnectivityState::NoNetwork);
    assert_eq!(result.new_identity, None);
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn test_no_host_publishes_directly() {
    let src = source(None, None);
    let probe = StubProbe::new(true);
    let machine = machine(&src, probe.clone(), None);
    let mut subscription = machine.subscribe();

    src.set_active(connected(NetworkType::Mobile));
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::Published);

    let result = next_result(&mut subscription).await;
    assert!(result.new_available);
    assert!(!result.does_host_respond);
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn test_blank_host_disables_probing() {
    let src = source(None, None);
    let machine = machine(&src, StubProbe::new(true), Some("   "));
    assert_eq!(machine.host(), None);
}

#[tokio::test]
async fn test_unobserved_transition_still_moves_baseline() {
    let src = source(None, None);
    let machine = machine(&src, StubProbe::new(true), None);
    assert!(!machine.has_subscribers());

    src.set_active(connected(NetworkType::Mobile));
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::Unobserved);
    assert_eq!(machine.snapshot().state, ConnectivityState::ConnectedMobile);
    assert!(machine.snapshot().available);

    // Once the baseline matches, the same signal is a no-op even with a subscriber
    let _subscription = machine.subscribe();
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::NoOp);
}

#[test]
fn test_new_requires_runtime() {
    let src = source(None, None);
    let result = ConnectivityStateMachine::new(classifier_for(&src), StubProbe::new(true), None, 8);
    assert!(matches!(result, Err(NetworkError::RuntimeUnavailable)));
}

#[test]
fn test_with_runtime_spawns_on_given_handle() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let src = source(None, None);
    let probe = StubProbe::new(true);
    let machine = ConnectivityStateMachine::with_runtime(
        classifier_for(&src),
        probe.clone(),
        Some("example.com".to_string()),
        8,
        runtime.handle().clone(),
    );
    let mut subscription = machine.subscribe();

    src.set_active(connected(NetworkType::Mobile));
    assert_eq!(machine.on_signal(&signal(NetworkType::Mobile)), Transition::ProbeScheduled);

    let result = runtime.block_on(next_result(&mut subscription));
    assert!(result.does_host_respond);
    assert_eq!(probe.calls().len(), 1);
}

#[test]
fn test_concurrent_signals_schedule_one_probe() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let src = source(connected(NetworkType::Wifi), Some(wifi_info("office", "00:00:00:00:00:00")));
    let probe = GatedProbe::new(true);
    let machine = ConnectivityStateMachine::with_runtime(
        classifier_for(&src),
        probe.clone(),
        Some("example.com".to_string()),
        16,
        runtime.handle().clone(),
    );
    let mut subscription = machine.subscribe();

    let threads = 8;
    let barrier = std::sync::Barrier::new(threads);
    let transitions: Vec<Transition> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let (src, machine, barrier) = (&src, &machine, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    // Every thread roams to its own access point
                    src.set_wifi(Some(wifi_info("office", &format!("aa:bb:cc:dd:ee:{:02x}", i + 1))));
                    machine.on_signal(&signal(NetworkType::Wifi))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let scheduled = transitions.iter().filter(|t| **t == Transition::ProbeScheduled).count();
    assert_eq!(scheduled, 1, "{:?}", transitions);
    assert!(transitions
        .iter()
        .all(|t| matches!(t, Transition::ProbeScheduled | Transition::ProbeSkipped | Transition::NoOp)));

    runtime.block_on(probe.wait_started());
    assert!(machine.is_probe_in_flight());
    assert_eq!(probe.calls(), 1);

    probe.open();
    let result = runtime.block_on(next_result(&mut subscription));
    assert!(result.does_host_respond);
    assert_eq!(probe.calls(), 1);
}
