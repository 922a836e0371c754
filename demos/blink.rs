use f75111_gpio::{DevPort, F75111, GpioLevel, GpioPin, Result};
use std::{thread, time::Duration};

const BLINK_PIN_NUM: u8 = 1;
const BLINKS: usize = 20;

fn main() -> Result<()> {
    env_logger::init();
    println!("Opening F75111 through /dev/port...");
    let device = F75111::open(DevPort::load_default())?;
    println!("Device opened.");

    let blink_pin = GpioPin::new(BLINK_PIN_NUM)?;
    device.switch_to_output()?;

    println!("Blinking {} {} times", blink_pin, BLINKS);
    for _ in 0..BLINKS {
        device.set_pin(blink_pin, GpioLevel::High)?;
        thread::sleep(Duration::from_millis(250));
        device.set_pin(blink_pin, GpioLevel::Low)?;
        thread::sleep(Duration::from_millis(250));
    }

    // Leaves every line low and back in input mode
    device.switch_to_input()?;
    device.close();
    Ok(())
}
