//! End-to-end confirmation scenarios against a mock game surface.
//!
//! Uses a manual clock and hand-fed raw updates so issuance and arrival
//! timestamps are exact.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use pulse_bot::{ActionError, ActionInterface, InterfaceConfig, RejectReason};
use pulse_core::{ActionParams, Cash, ManualClock, SharedClock};
use pulse_executor::{LiveExecutor, MockSurfaceDriver};
use pulse_persistence::NullLog;

fn build_interface(
    config: InterfaceConfig,
    start_ms: u64,
) -> (Arc<ActionInterface>, Arc<MockSurfaceDriver>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_ms));
    let shared: SharedClock = clock.clone();
    let driver = Arc::new(MockSurfaceDriver::new());
    let executor = Arc::new(LiveExecutor::new(driver.clone(), shared.clone()));
    let interface = Arc::new(ActionInterface::with_clock(
        &config,
        executor,
        Arc::new(NullLog),
        shared,
    ));
    (interface, driver, clock)
}

fn raw_update(cash: &str, qty: &str, tick: u64) -> String {
    format!(
        r#"{{"cash":"{cash}","positionQty":"{qty}","avgCost":"0","cumulativePnl":"0","tick":{tick},"gameId":"g1"}}"#
    )
}

#[tokio::test]
async fn open_confirmed_with_measured_latency() {
    let (interface, _driver, clock) = build_interface(InterfaceConfig::default(), 900);

    // Baseline state before the action.
    interface.handle_raw_update(&raw_update("5.0", "0", 100));

    clock.set(1000);
    let task = {
        let interface = interface.clone();
        tokio::spawn(async move {
            interface
                .execute_action(ActionParams::Open {
                    amount: Cash::new(dec!(1.0)),
                })
                .await
        })
    };

    // Let the call claim, dispatch, and register before the update lands.
    tokio::time::sleep(Duration::from_millis(10)).await;

    clock.set(1180);
    interface.handle_raw_update(&raw_update("4.0", "0.01", 101));

    let result = task.await.unwrap().unwrap();
    assert!(result.success);
    assert_eq!(result.latency_ms, Some(180));
    assert_eq!(result.state.cash, Cash::new(dec!(4.0)));
    assert_eq!(result.state.position_qty.inner(), dec!(0.01));
    assert_eq!(result.state.entry_tick, Some(101));

    let stats = interface.latency_stats();
    assert_eq!(stats.sample_count, 1);
    assert_eq!(stats.p50_ms, 180);

    interface.shutdown();
}

#[tokio::test]
async fn close_times_out_and_is_returned_as_data() {
    let config = InterfaceConfig {
        timeout_ms: 500,
        sweep_interval_ms: 25,
        ..InterfaceConfig::default()
    };
    let (interface, _driver, clock) = build_interface(config, 1000);

    let task = {
        let interface = interface.clone();
        tokio::spawn(async move {
            interface
                .execute_action(ActionParams::Close { fraction: dec!(1) })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;

    // Deadline passes with no matching event; the periodic sweep resolves it.
    clock.set(1501);
    let result = task.await.unwrap().unwrap();

    assert!(!result.success);
    assert!(result.latency_ms.is_none());
    assert_eq!(interface.pending_count(), 0);

    interface.shutdown();
}

#[tokio::test]
async fn second_open_rejected_before_dispatch() {
    let (interface, driver, _clock) = build_interface(InterfaceConfig::default(), 1000);

    let first = {
        let interface = interface.clone();
        tokio::spawn(async move {
            interface
                .execute_action(ActionParams::Open {
                    amount: Cash::new(dec!(1.0)),
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(driver.press_count(), 1);

    // Same-kind action while the first is in flight: rejected up front.
    let err = interface
        .execute_action(ActionParams::Open {
            amount: Cash::new(dec!(2.0)),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Rejected(RejectReason::PendingOfSameType)
    ));

    // The executor was never invoked for the rejected call.
    assert_eq!(driver.press_count(), 1);

    // A different kind is still allowed while the open is pending.
    let wager = {
        let interface = interface.clone();
        tokio::spawn(async move {
            interface
                .execute_action(ActionParams::SideWager {
                    amount: Cash::new(dec!(0.01)),
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(driver.press_count(), 2);

    interface.shutdown();
    assert!(!first.await.unwrap().unwrap().success);
    assert!(!wager.await.unwrap().unwrap().success);
}

#[tokio::test]
async fn side_wager_matched_then_cleared_passively() {
    let (interface, _driver, clock) = build_interface(InterfaceConfig::default(), 49_900);

    // Baseline: no wager active.
    interface.handle_raw_update(&raw_update("5.0", "0", 199));

    clock.set(50_000);
    let task = {
        let interface = interface.clone();
        tokio::spawn(async move {
            interface
                .execute_action(ActionParams::SideWager {
                    amount: Cash::new(dec!(0.01)),
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;

    clock.set(50_120);
    interface.handle_raw_update(
        r#"{"cash":"4.99","positionQty":"0","avgCost":"0","cumulativePnl":"0","wager":{"amount":"0.01","placedTick":200},"tick":200,"gameId":"g1"}"#,
    );

    let result = task.await.unwrap().unwrap();
    assert!(result.success);
    assert_eq!(result.latency_ms, Some(120));
    let wager = result.state.active_wager.unwrap();
    assert_eq!(wager.amount, Cash::new(dec!(0.01)));
    assert_eq!(wager.placed_tick, 200);

    // Game-end style update clears the wager; the tracker follows with no
    // new pending action.
    clock.set(57_500);
    interface.handle_raw_update(&raw_update("5.01", "0", 230));

    assert!(interface.state_snapshot().active_wager.is_none());
    assert_eq!(interface.pending_count(), 0);

    interface.shutdown();
}
