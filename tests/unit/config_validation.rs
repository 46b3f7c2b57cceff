//! Unit tests for configuration validation

use crate::common::{Operation, create_identified_driver, create_mock_driver};
use lis2hh12::interrupt::{InterruptGenerator, InterruptGeneratorConfig, Threshold};
use lis2hh12::{
    AccelConfig, Axes, Error, Field, InterruptLine, InterruptPinConfig, InterruptRouting, Register,
    Trigger,
};

#[test]
fn test_inactivity_threshold_out_of_range() {
    let (driver, interface) = create_identified_driver();

    let result = driver.set_inactivity_threshold(200, 10);
    assert_eq!(result, Err(Error::InvalidConfig));
    assert_eq!(interface.transaction_count(), 0);
    assert_eq!(driver.registers().raw(Register::ActThs), 0);
}

#[test]
fn test_inactivity_threshold_applied() {
    let (driver, interface) = create_identified_driver();

    driver.set_inactivity_threshold(32, 12).unwrap();

    assert_eq!(interface.get_register(0x1E), 0x20);
    assert_eq!(interface.get_register(0x1F), 0x0C);
    assert_ne!(interface.get_register(0x22) & 0x20, 0);

    let image = driver.registers();
    assert_eq!(image.raw(Register::ActThs), 0x20);
    assert_eq!(image.raw(Register::ActDur), 0x0C);
    assert_eq!(image.field(Field::Ctrl3Int1Inact), 1);
}

#[test]
fn test_inactivity_threshold_boundaries() {
    let (driver, interface) = create_identified_driver();

    driver.set_inactivity_threshold(127, 255).unwrap();
    assert_eq!(interface.get_register(0x1E), 127);
    assert_eq!(interface.get_register(0x1F), 255);

    driver.set_inactivity_threshold(0, 0).unwrap();
    assert_eq!(interface.get_register(0x1E), 0);
}

#[test]
fn test_configuration_requires_identification() {
    let (driver, interface) = create_mock_driver();

    assert_eq!(driver.set_output_data_rate(1), Err(Error::InvalidState));
    assert_eq!(driver.enable_axes(Axes::all()), Err(Error::InvalidState));
    assert_eq!(driver.set_full_scale(0), Err(Error::InvalidState));
    assert_eq!(driver.configure(&AccelConfig::default()), Err(Error::InvalidState));
    assert_eq!(
        driver.route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only()),
        Err(Error::InvalidState)
    );
    // Invalid parameters still report the missing identification first
    assert_eq!(driver.set_inactivity_threshold(200, 10), Err(Error::InvalidState));
    assert_eq!(interface.transaction_count(), 0);
}

#[test]
fn test_output_data_rate() {
    let (driver, interface) = create_identified_driver();

    for rate in 0..=6u8 {
        driver.set_output_data_rate(rate).unwrap();
        let ctrl1 = interface.get_register(0x20);
        assert_eq!((ctrl1 >> 4) & 0x07, rate);
        // Axis enables survive the update
        assert_eq!(ctrl1 & 0x07, 0x07);
        assert_eq!(driver.read_field(Field::Ctrl1Odr), rate);
    }

    interface.clear_operations();
    assert_eq!(driver.set_output_data_rate(7), Err(Error::InvalidConfig));
    assert_eq!(driver.set_output_data_rate(255), Err(Error::InvalidConfig));
    assert_eq!(interface.transaction_count(), 0);
}

#[test]
fn test_enable_axes_preserves_rate() {
    let (driver, interface) = create_identified_driver();
    driver.set_output_data_rate(5).unwrap();

    driver
        .enable_axes(Axes {
            x: true,
            y: false,
            z: true,
        })
        .unwrap();
    assert_eq!(interface.get_register(0x20), 0b0101_0101);

    driver.enable_axes(Axes::none()).unwrap();
    assert_eq!(interface.get_register(0x20), 0b0101_0000);
}

#[test]
fn test_full_scale() {
    let (driver, interface) = create_identified_driver();

    driver.set_full_scale(2).unwrap();
    // IF_ADD_INC stays set
    assert_eq!(interface.get_register(0x23), 0x24);
    driver.set_full_scale(3).unwrap();
    assert_eq!(interface.get_register(0x23), 0x34);
    driver.set_full_scale(0).unwrap();
    assert_eq!(interface.get_register(0x23), 0x04);

    interface.clear_operations();
    assert_eq!(driver.set_full_scale(1), Err(Error::InvalidConfig));
    assert_eq!(driver.set_full_scale(4), Err(Error::InvalidConfig));
    assert_eq!(interface.transaction_count(), 0);
}

#[test]
fn test_configure_accelerometer() {
    let (driver, interface) = create_identified_driver();

    driver.configure(&AccelConfig::motion()).unwrap();
    // HR | ODR=400 Hz | BDU | ZYX
    assert_eq!(interface.get_register(0x20), 0xDF);
    assert_eq!(interface.get_register(0x23), 0x34);

    driver.configure(&AccelConfig::low_power()).unwrap();
    assert_eq!(interface.get_register(0x20), 0x1F);
    assert_eq!(interface.get_register(0x23), 0x04);
}

#[test]
fn test_configure_fifo() {
    let (driver, interface) = create_identified_driver();

    driver.configure_fifo(2, 16).unwrap();
    assert_eq!(interface.get_register(0x2E), 0x50);
    assert_ne!(interface.get_register(0x22) & 0x80, 0);

    driver.configure_fifo(0, 0).unwrap();
    assert_eq!(interface.get_register(0x2E), 0x00);
    assert_eq!(interface.get_register(0x22) & 0x80, 0);

    interface.clear_operations();
    assert_eq!(driver.configure_fifo(5, 10), Err(Error::InvalidConfig));
    assert_eq!(driver.configure_fifo(6, 10), Err(Error::InvalidConfig));
    assert_eq!(driver.configure_fifo(2, 32), Err(Error::InvalidConfig));
    assert_eq!(interface.transaction_count(), 0);
}

#[test]
fn test_fifo_enable_preserves_routing() {
    let (driver, interface) = create_identified_driver();
    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::fifo_batch())
        .unwrap();
    driver.configure_fifo(1, 8).unwrap();
    assert_eq!(interface.get_register(0x22), 0b1000_0110);
}

#[test]
fn test_route_interrupts() {
    let (driver, interface) = create_identified_driver();
    driver.configure_fifo(2, 4).unwrap();

    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only())
        .unwrap();
    // FIFO_EN untouched
    assert_eq!(interface.get_register(0x22), 0b1000_0001);

    driver
        .route_interrupts(InterruptLine::Int1, &InterruptRouting::motion())
        .unwrap();
    assert_eq!(interface.get_register(0x22), 0b1001_1000);

    let routing = InterruptRouting {
        boot: true,
        ..InterruptRouting::fifo_batch()
    };
    driver.route_interrupts(InterruptLine::Int2, &routing).unwrap();
    assert_eq!(interface.get_register(0x25), 0b0110_0010);
    assert_eq!(
        InterruptRouting::from_bits(InterruptLine::Int2, driver.registers().raw(Register::Ctrl6)),
        routing
    );
    assert_eq!(driver.interrupt_routing(InterruptLine::Int2), routing);
    assert_eq!(
        driver.interrupt_routing(InterruptLine::Int1),
        InterruptRouting::motion()
    );
}

#[test]
fn test_route_interrupts_rejects_wrong_line() {
    let (driver, interface) = create_identified_driver();

    let boot = InterruptRouting {
        boot: true,
        ..InterruptRouting::none()
    };
    assert_eq!(
        driver.route_interrupts(InterruptLine::Int1, &boot),
        Err(Error::InvalidConfig)
    );
    let inactivity = InterruptRouting {
        inactivity: true,
        ..InterruptRouting::none()
    };
    assert_eq!(
        driver.route_interrupts(InterruptLine::Int2, &inactivity),
        Err(Error::InvalidConfig)
    );
    assert_eq!(interface.transaction_count(), 0);
}

#[test]
fn test_interrupt_pin_config() {
    let (driver, interface) = create_identified_driver();
    assert_eq!(driver.interrupt_trigger(), Trigger::RisingEdge);

    driver
        .configure_interrupt_pin(&InterruptPinConfig::i2c_default())
        .unwrap();
    assert_eq!(interface.get_register(0x24), 0x03);
    assert_eq!(interface.get_register(0x26), 0x0C);
    assert_eq!(driver.interrupt_trigger(), Trigger::LowLevel);

    let pulsed = InterruptPinConfig {
        active_low: false,
        open_drain: false,
        latch_ig1: false,
        latch_ig2: false,
    };
    driver.configure_interrupt_pin(&pulsed).unwrap();
    assert_eq!(interface.get_register(0x24), 0x00);
    assert_eq!(driver.interrupt_trigger(), Trigger::RisingEdge);
}

#[test]
fn test_interrupt_generator_write_order() {
    let (driver, interface) = create_identified_driver();

    let config = InterruptGeneratorConfig {
        threshold: Threshold::PerAxis {
            x: 0x10,
            y: 0x20,
            z: 0x30,
        },
        ..InterruptGeneratorConfig::wake_up(0, 3)
    };
    driver
        .configure_interrupt_generator(InterruptGenerator::Ig1, &config)
        .unwrap();

    let writes: Vec<(u8, u8)> = interface
        .operations()
        .into_iter()
        .filter_map(|op| match op {
            Operation::Write { address, value } => Some((address, value)),
            Operation::Read { .. } => None,
        })
        .collect();
    assert_eq!(
        writes,
        vec![(0x32, 0x10), (0x33, 0x20), (0x34, 0x30), (0x35, 0x03), (0x30, 0x2A)]
    );
}

#[test]
fn test_interrupt_generator_two() {
    let (driver, interface) = create_identified_driver();

    driver
        .configure_interrupt_generator(
            InterruptGenerator::Ig2,
            &InterruptGeneratorConfig::free_fall(0x08, 5),
        )
        .unwrap();
    assert_eq!(interface.get_register(0x38), 0x08);
    assert_eq!(interface.get_register(0x39), 0x05);
    assert_eq!(interface.get_register(0x36), 0b1001_0101);
}

#[test]
fn test_interrupt_generator_validation() {
    let (driver, interface) = create_identified_driver();

    assert_eq!(
        driver.configure_interrupt_generator(
            InterruptGenerator::Ig1,
            &InterruptGeneratorConfig::wake_up(0x10, 128)
        ),
        Err(Error::InvalidConfig)
    );
    let per_axis = InterruptGeneratorConfig {
        threshold: Threshold::PerAxis { x: 1, y: 2, z: 3 },
        ..InterruptGeneratorConfig::default()
    };
    assert_eq!(
        driver.configure_interrupt_generator(InterruptGenerator::Ig2, &per_axis),
        Err(Error::InvalidConfig)
    );
    assert_eq!(interface.transaction_count(), 0);
}
