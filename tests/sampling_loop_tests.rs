//! Integration tests for the sampling loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lrv_meter::app::{run_sampling_loop, warm_up, StopReason};
use lrv_meter::models::RawChannels;
use lrv_meter::sensor::{IlluminatedSensor, ReplaySensor};
use lrv_meter::services::naming::NameLookup;
use lrv_meter::sinks::{SnapshotSink, SnapshotSlot};

mod fixtures;
use fixtures::{fast_loop, test_pipeline, FailingSink, FixedLookup, RecordingSink, OLIVE};

#[tokio::test]
async fn test_cycle_limit_publishes_every_reading() {
    let sensor = ReplaySensor::new(vec![OLIVE], true);
    let probe = sensor.illumination_probe();
    let sensor = IlluminatedSensor::new(sensor).unwrap();
    assert!(probe.is_on());

    let recorder = RecordingSink::default();
    let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![Box::new(recorder.clone())];

    let summary = run_sampling_loop(
        sensor,
        &test_pipeline(100.0),
        None,
        &mut sinks,
        fast_loop(Some(3)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.reason, StopReason::CycleLimit);
    assert!(!probe.is_on());
    assert_eq!(probe.switch_off_count(), 1);

    let seen = recorder.seen();
    assert_eq!(seen.len(), 3);
    for snapshot in &seen {
        assert_eq!(snapshot.color_hex(), "#556644");
        assert_eq!(snapshot.color_name(), Some("DarkOliveGreen"));
        assert!((snapshot.lrv() - 37.6).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_cancel_before_start_takes_no_reading() {
    let sensor = ReplaySensor::new(vec![OLIVE], true);
    let probe = sensor.illumination_probe();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = run_sampling_loop(
        IlluminatedSensor::new(sensor).unwrap(),
        &test_pipeline(100.0),
        None,
        &mut [],
        fast_loop(None),
        cancel,
    )
    .await
    .unwrap();

    assert_eq!(summary.cycles, 0);
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert!(!probe.is_on());
}

#[tokio::test]
async fn test_interrupt_switches_illumination_off() {
    let sensor = ReplaySensor::new(vec![OLIVE], true);
    let probe = sensor.illumination_probe();
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        interrupt.cancel();
    });

    let summary = run_sampling_loop(
        IlluminatedSensor::new(sensor).unwrap(),
        &test_pipeline(100.0),
        None,
        &mut [],
        fast_loop(None),
        cancel,
    )
    .await
    .unwrap();

    assert_eq!(summary.reason, StopReason::Cancelled);
    assert!(summary.cycles >= 1);
    assert!(!probe.is_on());
    assert_eq!(probe.switch_off_count(), 1);
}

#[tokio::test]
async fn test_sensor_failure_propagates_and_switches_off() {
    let sensor = ReplaySensor::new(vec![OLIVE, OLIVE], false);
    let probe = sensor.illumination_probe();
    let recorder = RecordingSink::default();
    let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![Box::new(recorder.clone())];

    let result = run_sampling_loop(
        IlluminatedSensor::new(sensor).unwrap(),
        &test_pipeline(100.0),
        None,
        &mut sinks,
        fast_loop(None),
        CancellationToken::new(),
    )
    .await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read color sensor"));
    assert_eq!(recorder.seen().len(), 2);
    assert!(!probe.is_on());
    assert_eq!(probe.switch_off_count(), 1);
}

#[tokio::test]
async fn test_failing_sink_does_not_stop_loop() {
    let recorder = RecordingSink::default();
    let mut sinks: Vec<Box<dyn SnapshotSink>> =
        vec![Box::new(FailingSink), Box::new(recorder.clone())];

    let summary = run_sampling_loop(
        IlluminatedSensor::new(ReplaySensor::new(vec![OLIVE], true)).unwrap(),
        &test_pipeline(100.0),
        None,
        &mut sinks,
        fast_loop(Some(2)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.cycles, 2);
    assert_eq!(recorder.seen().len(), 2);
}

#[tokio::test]
async fn test_dark_reading_is_still_published() {
    let slot = SnapshotSlot::new();
    let reader = slot.reader();
    let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![Box::new(slot)];

    run_sampling_loop(
        IlluminatedSensor::new(ReplaySensor::new(vec![RawChannels::new(0, 0, 0, 0)], true))
            .unwrap(),
        &test_pipeline(100.0),
        None,
        &mut sinks,
        fast_loop(Some(1)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let latest = reader.latest().unwrap();
    assert!(latest.lrv().abs() < f64::EPSILON);
    assert_eq!(latest.color_hex(), "#000000");
    assert_eq!(latest.color_name(), Some("Black"));
}

#[tokio::test]
async fn test_remote_name_replaces_palette_name() {
    let recorder = RecordingSink::default();
    let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![Box::new(recorder.clone())];
    let lookup = FixedLookup(Some("Moss"));

    run_sampling_loop(
        IlluminatedSensor::new(ReplaySensor::new(vec![OLIVE], true)).unwrap(),
        &test_pipeline(100.0),
        Some(&lookup as &dyn NameLookup),
        &mut sinks,
        fast_loop(Some(1)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(recorder.seen()[0].color_name(), Some("Moss"));
}

#[tokio::test]
async fn test_unavailable_remote_name_is_unknown() {
    let recorder = RecordingSink::default();
    let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![Box::new(recorder.clone())];
    let lookup = FixedLookup(None);

    run_sampling_loop(
        IlluminatedSensor::new(ReplaySensor::new(vec![OLIVE], true)).unwrap(),
        &test_pipeline(100.0),
        Some(&lookup as &dyn NameLookup),
        &mut sinks,
        fast_loop(Some(1)),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let seen = recorder.seen();
    assert_eq!(seen[0].color_name(), None);
    assert_eq!(seen[0].display_name(), "Unknown");
}

#[tokio::test]
async fn test_interrupt_during_warm_up_switches_illumination_off() {
    let sensor = ReplaySensor::new(vec![OLIVE], true);
    let leds = sensor.illumination_probe();
    let sensor = IlluminatedSensor::new(sensor).unwrap();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        interrupt.cancel();
    });

    let warmed = warm_up(sensor, Duration::from_secs(30), &cancel)
        .await
        .unwrap();

    assert!(warmed.is_none());
    assert!(!leds.is_on());
    assert_eq!(leds.switch_off_count(), 1);
}

#[tokio::test]
async fn test_warm_up_hands_back_lit_sensor() {
    let sensor = ReplaySensor::new(vec![OLIVE], true);
    let leds = sensor.illumination_probe();
    let sensor = IlluminatedSensor::new(sensor).unwrap();

    let warmed = warm_up(sensor, Duration::from_millis(5), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert!(warmed.is_lit());
    assert!(leds.is_on());
    drop(warmed);
    assert_eq!(leds.switch_off_count(), 1);
}
