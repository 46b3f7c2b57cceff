//! Integration tests for basic workflow scenarios

use crate::common::{MockDelay, create_mock_driver};
use lis2hh12::interrupt::{InterruptGenerator, InterruptGeneratorConfig};
use lis2hh12::{
    AccelConfig, EventSource, FifoConfig, InterruptLine, InterruptPinConfig, InterruptRouting,
    Trigger,
};

#[test]
fn test_complete_initialization_workflow() {
    let (driver, interface) = create_mock_driver();

    // Identify the device
    let descriptor = driver.identify(&mut MockDelay::default()).unwrap();
    assert_eq!(descriptor.who_am_i, 0x41);

    // Configure accelerometer
    driver.configure(&AccelConfig::default()).unwrap();
    driver
        .configure_interrupt_pin(&InterruptPinConfig::i2c_default())
        .unwrap();
    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only())
        .unwrap();
    assert_eq!(driver.interrupt_trigger(), Trigger::LowLevel);
    driver.set_task_ready(true);

    // Set up mock sensor data
    interface.set_accel_data(100, -50, 16384);
    interface.set_register(0x27, 0x08);

    // Interrupt, then the deferred task
    assert!(driver.on_interrupt());
    driver.service();
    assert_eq!(driver.last_sample().z, 16384);

    // Application reads go through the same handle
    let mg = driver.read_acceleration_mg().unwrap();
    assert!(mg.z > 990.0 && mg.z < 1010.0);

    let counters = driver.counters();
    assert_eq!(counters.source(EventSource::DataReady).ok, 1);
    assert_eq!(counters.lost, 0);
}

#[test]
fn test_fifo_batch_workflow() {
    let (driver, interface) = create_mock_driver();
    driver.identify(&mut MockDelay::default()).unwrap();

    driver.set_fifo(&FifoConfig::stream(16)).unwrap();
    driver
        .route_interrupts(InterruptLine::Int2, &InterruptRouting::fifo_batch())
        .unwrap();
    driver.set_task_ready(true);

    interface.fill_fifo(16);
    assert!(driver.on_interrupt());
    driver.service();

    assert_eq!(interface.fifo_len(), 0);
    assert_eq!(driver.last_sample().x, 15);
    assert_eq!(driver.counters().source(EventSource::Fifo).ok, 1);
}

#[test]
fn test_motion_workflow() {
    let (driver, interface) = create_mock_driver();
    driver.identify(&mut MockDelay::default()).unwrap();

    driver
        .configure_interrupt_generator(
            InterruptGenerator::Ig1,
            &InterruptGeneratorConfig::wake_up(0x20, 2),
        )
        .unwrap();
    driver
        .configure_interrupt_generator(
            InterruptGenerator::Ig2,
            &InterruptGeneratorConfig::free_fall(0x08, 4),
        )
        .unwrap();
    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::motion())
        .unwrap();
    driver.set_inactivity_threshold(16, 40).unwrap();
    driver.set_task_ready(true);

    // Wake-up fires on X high
    interface.set_register(0x31, 0x42);
    driver.on_interrupt();
    driver.service();

    let counters = driver.counters();
    assert_eq!(counters.source(EventSource::Ig1).ok, 1);
    assert_eq!(counters.source(EventSource::Ig2).ok, 1);
    assert_eq!(counters.source(EventSource::Inactivity).ok, 1);
    assert_eq!(interface.get_register(0x31), 0);
}

#[test]
fn test_error_recovery() {
    let (driver, interface) = create_mock_driver();
    driver.identify(&mut MockDelay::default()).unwrap();

    // Inject a read failure
    interface.fail_next_read();

    // This read should fail
    assert!(driver.read_acceleration().is_err());

    // Subsequent reads succeed
    interface.set_accel_data(7, 8, 9);
    let data = driver.read_acceleration().unwrap();
    assert_eq!((data.x, data.y, data.z), (7, 8, 9));
}

#[test]
fn test_release_returns_transport() {
    let (driver, interface) = create_mock_driver();
    driver.identify(&mut MockDelay::default()).unwrap();

    let released = driver.release();
    released.set_register(0x21, 0x55);
    assert_eq!(interface.get_register(0x21), 0x55);
}
