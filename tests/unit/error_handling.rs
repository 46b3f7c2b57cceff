//! Unit tests for error handling and recovery

use crate::common::{MockError, create_identified_driver};
use lis2hh12::{Error, EventSource, InterruptLine, InterruptRouting, Register};

#[test]
fn test_read_failure_leaves_image_unchanged() {
    let (driver, interface) = create_identified_driver();
    interface.set_accel_data(1, 2, 3);
    driver.read_acceleration().unwrap();
    let before = driver.registers();

    interface.set_accel_data(4, 5, 6);
    interface.fail_next_read();
    assert_eq!(
        driver.read_acceleration(),
        Err(Error::Bus(MockError::Communication))
    );
    assert_eq!(driver.registers(), before);
}

#[test]
fn test_write_failure_not_mirrored() {
    let (driver, interface) = create_identified_driver();
    interface.fail_next_write();

    assert_eq!(
        driver.set_inactivity_threshold(32, 12),
        Err(Error::Bus(MockError::Communication))
    );
    assert_eq!(driver.registers().raw(Register::ActThs), 0);
    // Stopped at the failing step
    assert!(interface.writes_to(0x1F).is_empty());

    driver.set_inactivity_threshold(32, 12).unwrap();
    assert_eq!(driver.registers().raw(Register::ActThs), 32);
}

#[test]
fn test_update_failure_after_read_leaves_image_unchanged() {
    let (driver, interface) = create_identified_driver();
    let before = driver.registers();
    interface.fail_next_write();

    assert_eq!(
        driver.set_output_data_rate(4),
        Err(Error::Bus(MockError::Communication))
    );
    assert_eq!(driver.registers(), before);
    assert_eq!(interface.get_register(0x20), 0x07);
}

#[test]
fn test_errors_are_distinguishable() {
    let (driver, interface) = create_identified_driver();

    let config = driver.set_output_data_rate(7);
    interface.fail_next_read();
    let bus = driver.set_output_data_rate(1);

    assert_eq!(config, Err(Error::InvalidConfig));
    assert_eq!(bus, Err(Error::Bus(MockError::Communication)));
    assert_ne!(config, bus);
}

#[test]
fn test_gate_failure_counts_lost() {
    let (driver, interface) = create_identified_driver();
    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only())
        .unwrap();
    driver.set_task_ready(true);
    interface.fail_reads_at(Some(0x22));
    interface.clear_operations();

    driver.on_interrupt();
    assert_eq!(driver.service(), 1);

    let counters = driver.counters();
    assert_eq!(counters.lost, 1);
    assert_eq!(counters.total_ok(), 0);
    assert_eq!(counters.total_err(), 0);
    assert_eq!(interface.reads_at(0x27), 0);
}

#[test]
fn test_source_read_failure_counts_source_error() {
    let (driver, interface) = create_identified_driver();
    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only())
        .unwrap();
    driver.set_task_ready(true);
    interface.fail_reads_at(Some(0x27));

    driver.on_interrupt();
    assert_eq!(driver.service(), 2);

    let counts = driver.counters().source(EventSource::DataReady);
    assert_eq!(counts.ok, 0);
    assert_eq!(counts.err, 1);
    assert_eq!(driver.counters().lost, 0);
}

#[test]
fn test_cascade_recovers_after_bus_error() {
    let (driver, interface) = create_identified_driver();
    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::motion())
        .unwrap();
    driver.set_task_ready(true);
    interface.fail_reads_at(Some(0x31));

    driver.on_interrupt();
    driver.service();
    let counters = driver.counters();
    assert_eq!(counters.source(EventSource::Ig1).err, 1);
    assert_eq!(counters.source(EventSource::Ig2).ok, 1);

    interface.fail_reads_at(None);
    driver.on_interrupt();
    driver.service();
    let counters = driver.counters();
    assert_eq!(counters.source(EventSource::Ig1).ok, 1);
    assert_eq!(counters.source(EventSource::Ig1).err, 1);
    assert_eq!(counters.source(EventSource::Ig2).ok, 2);
}

#[test]
fn test_identity_read_failure() {
    let (driver, interface) = crate::common::create_mock_driver();
    interface.fail_reads_at(Some(0x0F));

    assert_eq!(
        driver.identify(&mut crate::common::MockDelay::default()),
        Err(Error::Bus(MockError::Communication))
    );
    assert!(!driver.is_identified());
}

#[test]
fn test_lift_preserves_variants() {
    assert_eq!(Error::<()>::InvalidConfig.lift::<MockError>(), Error::InvalidConfig);
    assert_eq!(Error::<()>::InvalidState.lift::<MockError>(), Error::InvalidState);
    assert_eq!(
        Error::<()>::InvalidDevice(0x33).lift::<MockError>(),
        Error::InvalidDevice(0x33)
    );
    assert_eq!(
        Error::<()>::FifoFraming(0x25).lift::<MockError>(),
        Error::FifoFraming(0x25)
    );
}

#[test]
fn test_lift_of_unit_bus_error_is_config_error() {
    // No transport error to carry, so it reads as a rejected parameter
    assert_eq!(Error::<()>::Bus(()).lift::<MockError>(), Error::InvalidConfig);
}

#[test]
fn test_bus_error_conversion() {
    let error: Error<MockError> = MockError::Communication.into();
    assert_eq!(error, Error::Bus(MockError::Communication));
}
