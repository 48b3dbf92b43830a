//! Probe both BMP280 I2C addresses and report where a sensor answers.
//!
//! The SDO pin level selects the address, so a board with an unknown strap
//! can be at either 0x76 or 0x77.

use bmp280_multibus::{i2c1::Address, Bmp280Bus as _, CHIP_ID};
use linux_embedded_hal::I2cdev;

const ID_REG: u8 = 0xD0;

fn main() {
    let mut i2c = I2cdev::new("/dev/i2c-1").expect("Failed to open /dev/i2c-1");

    for address in [Address::SdoGnd, Address::SdoVddio] {
        let mut bus = bmp280_multibus::i2c1::Bmp280Bus::new(i2c, address);
        match bus.read_reg(ID_REG) {
            Ok(id) if id == CHIP_ID => {
                println!("Found BMP280 at address 0x{:02x}", address as u8);
                return;
            }
            Ok(id) => println!(
                "Device at 0x{:02x} answered with chip ID 0x{id:02x}",
                address as u8
            ),
            Err(e) => println!("Nothing at address 0x{:02x}: {e:?}", address as u8),
        }
        i2c = bus.free();
    }
    println!("No sensor found");
}
