//! Poll a BMP280 on a Raspberry Pi and print a reading every second.
//!
//! Wiring: SDA to GPIO 2 (pin 3), SCL to GPIO 3 (pin 5), SDO to GND for
//! address 0x76.

use bmp280_multibus::{i2c1::Address, Bmp280, Sample, CHIP_ID};
use linux_embedded_hal::I2cdev;

const SETTINGS: bmp280_multibus::Settings = bmp280_multibus::Settings {
    config: bmp280_multibus::Config::RESET
        .set_standby_time(bmp280_multibus::Standby::Millis1000)
        .set_filter(bmp280_multibus::Filter::X16),
    ctrl_meas: bmp280_multibus::CtrlMeas::RESET
        .set_osrs_t(bmp280_multibus::Oversampling::X16)
        .set_osrs_p(bmp280_multibus::Oversampling::X16)
        .set_mode(bmp280_multibus::Mode::Normal),
};

fn main() {
    let i2c = I2cdev::new("/dev/i2c-1").expect("Failed to open /dev/i2c-1");

    let mut bmp: Bmp280<_> =
        Bmp280::from_i2c1(i2c, Address::SdoGnd).expect("Failed to initialize BMP280");

    // sanity check
    assert_eq!(bmp.chip_id().expect("Failed to read chip ID"), CHIP_ID);

    bmp.settings(&SETTINGS).expect("Failed to configure BMP280");

    // first conversion after entering normal mode
    std::thread::sleep(std::time::Duration::from_millis(250));

    loop {
        let sample: Sample = bmp.sample().expect("Failed to sample BMP280");
        println!("Temperature: {:.1} °C", sample.temperature);
        println!("Pressure: {:.1} hPa", sample.pressure);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}
