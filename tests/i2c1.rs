use bmp280_multibus::{i2c1::Address, Bmp280, Sample};
use ehm::eh1::i2c::{Mock, Transaction};

const ADDR: u8 = 0x76;

const SETTINGS: bmp280_multibus::Settings = bmp280_multibus::Settings {
    config: bmp280_multibus::Config::RESET
        .set_standby_time(bmp280_multibus::Standby::Millis1000)
        .set_filter(bmp280_multibus::Filter::X16),
    ctrl_meas: bmp280_multibus::CtrlMeas::RESET
        .set_osrs_t(bmp280_multibus::Oversampling::X16)
        .set_osrs_p(bmp280_multibus::Oversampling::X16)
        .set_mode(bmp280_multibus::Mode::Normal),
};

/// Calibration words from the BMP280 datasheet worked example, read in
/// ascending address order, least-significant byte first.
fn calibration_transactions() -> Vec<Transaction> {
    [
        (0x88, [0x70, 0x6B]), // dig_T1 = 27504
        (0x8A, [0x43, 0x67]), // dig_T2 = 26435
        (0x8C, [0x18, 0xFC]), // dig_T3 = -1000
        (0x8E, [0x7D, 0x8E]), // dig_P1 = 36477
        (0x90, [0x43, 0xD6]), // dig_P2 = -10685
        (0x92, [0xD0, 0x0B]), // dig_P3 = 3024
        (0x94, [0x27, 0x0B]), // dig_P4 = 2855
        (0x96, [0x8C, 0x00]), // dig_P5 = 140
        (0x98, [0xF9, 0xFF]), // dig_P6 = -7
        (0x9A, [0x8C, 0x3C]), // dig_P7 = 15500
        (0x9C, [0xF8, 0xC6]), // dig_P8 = -14600
        (0x9E, [0x70, 0x17]), // dig_P9 = 6000
    ]
    .iter()
    .map(|(reg, data)| Transaction::write_read(ADDR, vec![*reg], data.to_vec()))
    .collect()
}

/// Byte reads producing adc_T = 519888 (0x7EED0).
fn raw_temperature_transactions() -> [Transaction; 3] {
    [
        Transaction::write_read(ADDR, vec![0xFA], vec![0x7E]),
        Transaction::write_read(ADDR, vec![0xFB], vec![0xED]),
        Transaction::write_read(ADDR, vec![0xFC], vec![0x00]),
    ]
}

/// Byte reads producing adc_P = 415148 (0x655AC).
fn raw_pressure_transactions() -> [Transaction; 3] {
    [
        Transaction::write_read(ADDR, vec![0xF7], vec![0x65]),
        Transaction::write_read(ADDR, vec![0xF8], vec![0x5A]),
        Transaction::write_read(ADDR, vec![0xF9], vec![0xC0]),
    ]
}

#[test]
fn i2c1_datasheet_sample() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.push(Transaction::write(ADDR, vec![0xF5, 0b10110000]));
    transactions.push(Transaction::write(ADDR, vec![0xF4, 0b10110111]));
    transactions.extend(raw_temperature_transactions());
    transactions.extend(raw_pressure_transactions());
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    bmp.settings(&SETTINGS).unwrap();
    let sample: Sample = bmp.sample().unwrap();

    assert!(
        (sample.temperature - 25.08).abs() < 0.001,
        "temperature = {}",
        sample.temperature
    );
    assert!(
        (sample.pressure - 1006.5329).abs() < 0.01,
        "pressure = {}",
        sample.pressure
    );

    bmp.free().free().done();
}

#[test]
fn i2c1_read_temperature() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.extend(raw_temperature_transactions());
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    let celsius: f32 = bmp.read_temperature().unwrap();
    assert!((celsius - 25.08).abs() < 0.001, "celsius = {celsius}");

    bmp.free().free().done();
}

#[test]
fn i2c1_read_pressure() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.extend(raw_temperature_transactions());
    transactions.extend(raw_pressure_transactions());
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    let hpa: f32 = bmp.read_pressure().unwrap();
    assert!((hpa - 1006.5329).abs() < 0.01, "hpa = {hpa}");

    bmp.free().free().done();
}

#[test]
fn i2c1_raw_sample_assembly() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.extend([
        Transaction::write_read(ADDR, vec![0xFA], vec![0x7F]),
        Transaction::write_read(ADDR, vec![0xFB], vec![0xA0]),
        Transaction::write_read(ADDR, vec![0xFC], vec![0x00]),
    ]);
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    assert_eq!(bmp.read_raw_temperature().unwrap(), 0x7FA00);

    bmp.free().free().done();
}

#[test]
fn i2c1_xlsb_low_nibble_discarded() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.extend([
        Transaction::write_read(ADDR, vec![0xF7], vec![0x65]),
        Transaction::write_read(ADDR, vec![0xF8], vec![0x5A]),
        Transaction::write_read(ADDR, vec![0xF9], vec![0xCF]),
    ]);
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    // low nibble of the xlsb byte is not part of the sample
    assert_eq!(bmp.read_raw_pressure().unwrap(), 0x655AC);

    bmp.free().free().done();
}

#[test]
fn i2c1_set_config_idempotent() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.push(Transaction::write(ADDR, vec![0xF5, 0b10110000]));
    transactions.push(Transaction::write(ADDR, vec![0xF5, 0b10110000]));
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    bmp.set_config(SETTINGS.config).unwrap();
    bmp.set_config(SETTINGS.config).unwrap();

    bmp.free().free().done();
}

#[test]
fn i2c1_chip_id_and_reset() {
    let mut transactions: Vec<Transaction> = calibration_transactions();
    transactions.push(Transaction::write_read(ADDR, vec![0xD0], vec![0x58]));
    transactions.push(Transaction::write(ADDR, vec![0xE0, 0xB6]));
    let i2c = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    assert_eq!(bmp.chip_id().unwrap(), bmp280_multibus::CHIP_ID);
    bmp.reset().unwrap();

    bmp.free().free().done();
}
