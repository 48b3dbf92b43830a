use bmp280_multibus::{Bmp280, Sample};
use ehm::eh1::spi::{Mock, Transaction};

const SETTINGS: bmp280_multibus::Settings = bmp280_multibus::Settings {
    config: bmp280_multibus::Config::RESET
        .set_standby_time(bmp280_multibus::Standby::Millis1000)
        .set_filter(bmp280_multibus::Filter::X16),
    ctrl_meas: bmp280_multibus::CtrlMeas::RESET
        .set_osrs_t(bmp280_multibus::Oversampling::X16)
        .set_osrs_p(bmp280_multibus::Oversampling::X16)
        .set_mode(bmp280_multibus::Mode::Normal),
};

/// Calibration words from the BMP280 datasheet worked example.
///
/// SPI reads set the high bit of the register address; the calibration
/// addresses already have it set.
fn calibration_transactions() -> Vec<Transaction<u8>> {
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
    .flat_map(|(reg, data)| {
        [
            Transaction::transaction_start(),
            Transaction::write(reg | 0x80),
            Transaction::read_vec(data.to_vec()),
            Transaction::transaction_end(),
        ]
    })
    .collect()
}

fn read_reg_transactions(reg: u8, data: u8) -> [Transaction<u8>; 4] {
    [
        Transaction::transaction_start(),
        Transaction::write(reg | 0x80),
        Transaction::read(data),
        Transaction::transaction_end(),
    ]
}

#[test]
fn spi1_datasheet_sample() {
    let mut transactions: Vec<Transaction<u8>> = calibration_transactions();
    transactions.extend([
        Transaction::transaction_start(),
        Transaction::write_vec(vec![0xF5 & !0x80, 0b10110000]),
        Transaction::transaction_end(),
        Transaction::transaction_start(),
        Transaction::write_vec(vec![0xF4 & !0x80, 0b10110111]),
        Transaction::transaction_end(),
    ]);
    // adc_T = 519888, adc_P = 415148
    transactions.extend(read_reg_transactions(0xFA, 0x7E));
    transactions.extend(read_reg_transactions(0xFB, 0xED));
    transactions.extend(read_reg_transactions(0xFC, 0x00));
    transactions.extend(read_reg_transactions(0xF7, 0x65));
    transactions.extend(read_reg_transactions(0xF8, 0x5A));
    transactions.extend(read_reg_transactions(0xF9, 0xC0));
    let spi = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_spi1(spi).unwrap();
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
fn spi1_chip_id() {
    let mut transactions: Vec<Transaction<u8>> = calibration_transactions();
    transactions.extend(read_reg_transactions(0xD0, 0x58));
    let spi = Mock::new(&transactions);

    let mut bmp: Bmp280<_> = Bmp280::from_spi1(spi).unwrap();
    assert_eq!(bmp.chip_id().unwrap(), bmp280_multibus::CHIP_ID);

    bmp.free().free().done();
}
