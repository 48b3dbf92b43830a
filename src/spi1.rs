use eh1::spi::Operation;

/// BMP280 bus.
#[derive(Debug)]
pub struct Bmp280Bus<SPI> {
    spi: SPI,
}

/// SPI mode for the BMP280.
///
/// The BMP280 also supports mode 3.
pub const MODE: eh1::spi::Mode = eh1::spi::MODE_0;

impl<SPI> Bmp280Bus<SPI> {
    /// Creates a new `Bmp280Bus` from an SPI device.
    ///
    /// # Example
    ///
    /// ```
    /// # let spi: ehm::eh1::spi::Mock<u8> = ehm::eh1::spi::Mock::new(&[]);
    /// use bmp280_multibus::spi1::Bmp280Bus;
    ///
    /// let mut bmp: Bmp280Bus<_> = Bmp280Bus::new(spi);
    /// # bmp.free().done();
    /// ```
    #[inline]
    pub fn new(spi: SPI) -> Self {
        Bmp280Bus { spi }
    }

    /// Free the SPI bus from the BMP280.
    ///
    /// # Example
    ///
    /// ```
    /// # let spi: ehm::eh1::spi::Mock<u8> = ehm::eh1::spi::Mock::new(&[]);
    /// use bmp280_multibus::spi1::Bmp280Bus;
    ///
    /// let bmp: Bmp280Bus<_> = Bmp280Bus::new(spi);
    /// let mut spi = bmp.free();
    /// # spi.done();
    /// ```
    #[inline]
    pub fn free(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> crate::Bmp280Bus for Bmp280Bus<SPI>
where
    SPI: eh1::spi::SpiDevice<Error = E>,
{
    type Error = E;

    fn read_reg(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf: [u8; 1] = [0];
        self.spi.transaction(&mut [
            Operation::Write(&[reg | (1 << 7)]),
            Operation::Read(&mut buf),
        ])?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, data: u8) -> Result<(), Self::Error> {
        self.spi.write(&[reg & !(1 << 7), data])
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, Self::Error> {
        let mut buf: [u8; 2] = [0; 2];
        self.spi.transaction(&mut [
            Operation::Write(&[reg | (1 << 7)]),
            Operation::Read(&mut buf),
        ])?;
        Ok(u16::from_le_bytes(buf))
    }
}
