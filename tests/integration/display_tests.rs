//! LCD plate driver against the emulated expander.

use thermoplate::drivers::button::Button;
use thermoplate::drivers::lcd::{self, LcdPlate, Led};
use thermoplate::error::Error;
use thermoplate::pins;

use crate::mock_hw::{EXPANDER, FakeBus, NoopDelay};

const IODIRA: u8 = 0x00;
const IPOLA: u8 = 0x02;
const GPINTENA: u8 = 0x04;
const GPPUA: u8 = 0x0C;
const OLATA: u8 = 0x14;

fn plate() -> (FakeBus, LcdPlate<FakeBus, NoopDelay>) {
    let bus = FakeBus::new(true);
    let lcd = LcdPlate::probe(bus.clone(), EXPANDER, NoopDelay).unwrap();
    (bus, lcd)
}

#[test]
fn probe_configures_button_bank() {
    let (bus, _lcd) = plate();
    assert_eq!(bus.register(IODIRA), 0b0011_1111);
    assert_eq!(bus.register(IPOLA), 0b0011_1111);
    assert_eq!(bus.register(GPPUA), 0b0011_1111);
    assert_eq!(bus.register(GPINTENA), 0b0001_1111);
}

#[test]
fn probe_leaves_controller_reset() {
    let (bus, lcd) = plate();
    let commands: Vec<u8> = bus
        .lcd_bytes()
        .into_iter()
        .filter_map(|(rs, b)| (!rs).then_some(b))
        .collect();
    assert_eq!(commands, vec![0x33, 0x32, 0x28, 0x01, 0x02, 0x06, 0x0C]);
    assert_eq!(lcd.display_control(), lcd::DISPLAY_ON);
}

#[test]
fn absent_plate_reports_hardware_absent() {
    let bus = FakeBus::new(false);
    let err = LcdPlate::probe(bus, EXPANDER, NoopDelay).err();
    assert!(matches!(err, Some(Error::HardwareAbsent(_))));
}

#[test]
fn two_line_message() {
    let (bus, mut lcd) = plate();
    lcd.clear().unwrap();
    lcd.message("Hello\nworld").unwrap();
    assert_eq!(bus.screen_text(), "Hello\nworld");
}

#[test]
fn non_latin1_characters_become_question_marks() {
    let (bus, mut lcd) = plate();
    lcd.clear().unwrap();
    lcd.write_text("21°C ✓").unwrap();
    assert_eq!(bus.screen_text(), "21°C ?");
}

#[test]
fn leds_and_backlight_share_bank_a_without_clobbering() {
    let (bus, mut lcd) = plate();
    lcd.set_led(Led::Green, true).unwrap();
    lcd.set_backlight(false).unwrap();
    assert_eq!(
        bus.register(OLATA),
        pins::GREEN_LED_BIT | pins::BACKLIGHT_BIT
    );
    lcd.set_backlight(true).unwrap();
    assert_eq!(bus.register(OLATA), pins::GREEN_LED_BIT);
}

#[test]
fn red_led_survives_text_writes() {
    let (bus, mut lcd) = plate();
    lcd.set_led(Led::Red, true).unwrap();
    lcd.message("x").unwrap();
    assert_eq!(lcd.expander().bank_b() & pins::RED_LED_BIT, pins::RED_LED_BIT);
    assert_eq!(bus.register(0x13) & pins::RED_LED_BIT, pins::RED_LED_BIT);
}

#[test]
fn buttons_read_through_the_plate() {
    let (bus, mut lcd) = plate();
    bus.press(Button::Select.bit() | Button::Right.bit());
    let mask = lcd.buttons().unwrap();
    assert!(mask.is_pressed(Button::Select));
    assert!(mask.is_pressed(Button::Right));
    assert_eq!(mask.first_pressed(), Some(Button::Select));
    assert_eq!(lcd.acknowledge_interrupt().unwrap(), mask.bits());
}
