/// BMP280 bus.
#[derive(Debug)]
pub struct Bmp280Bus<SPI, CS> {
    bus: SPI,
    cs: CS,
}

/// SPI mode for the BMP280.
///
/// The BMP280 also supports mode 3.
pub const MODE: eh0::spi::Mode = eh0::spi::MODE_0;

/// BMP280 error type.
#[derive(Debug)]
pub enum Error<SpiError, PinError> {
    /// SPI bus error wrapper.
    Spi(SpiError),
    /// GPIO pin error wrapper.
    Pin(PinError),
}

impl<SpiError, PinError> From<PinError> for Error<SpiError, PinError> {
    #[inline]
    fn from(e: PinError) -> Self {
        Error::Pin(e)
    }
}

impl<SPI, CS, SpiError, PinError> Bmp280Bus<SPI, CS>
where
    SPI: eh0::blocking::spi::Transfer<u8, Error = SpiError>
        + eh0::blocking::spi::Write<u8, Error = SpiError>,
    CS: eh0::digital::v2::OutputPin<Error = PinError>,
{
    /// Creates a new `Bmp280Bus` from a SPI peripheral and a chip select
    /// digital I/O pin.
    ///
    /// # Safety
    ///
    /// The chip select pin must be high before being passed to this function.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut spi = ehm::eh0::spi::Mock::new(&[]);
    /// # let mut pin = ehm::eh0::digital::Mock::new(&[
    /// #    ehm::eh0::digital::Transaction::set(ehm::eh0::digital::State::High),
    /// # ]);
    /// use bmp280_multibus::spi0::Bmp280Bus;
    /// use eh0::digital::v2::OutputPin;
    ///
    /// pin.set_high()?;
    /// let mut bmp: Bmp280Bus<_, _> = Bmp280Bus::new(spi, pin);
    /// # let (mut spi, mut pin) = bmp.free();
    /// # spi.done(); pin.done();
    /// # Ok::<(), ehm::eh0::MockError>(())
    /// ```
    #[inline]
    pub fn new(bus: SPI, cs: CS) -> Self {
        Bmp280Bus { bus, cs }
    }

    /// Free the SPI bus and CS pin from the BMP280.
    #[inline]
    pub fn free(self) -> (SPI, CS) {
        (self.bus, self.cs)
    }

    #[inline]
    fn with_chip_enable<T, E, F>(&mut self, mut f: F) -> Result<T, E>
    where
        F: FnMut(&mut SPI) -> Result<T, E>,
        E: core::convert::From<Error<SpiError, PinError>>,
    {
        self.cs.set_low().map_err(Error::Pin)?;
        let result: Result<T, E> = f(&mut self.bus);
        self.cs.set_high().map_err(Error::Pin)?;
        result
    }
}

impl<SPI, CS, SpiError, PinError> crate::Bmp280Bus for Bmp280Bus<SPI, CS>
where
    SPI: eh0::blocking::spi::Transfer<u8, Error = SpiError>
        + eh0::blocking::spi::Write<u8, Error = SpiError>,
    CS: eh0::digital::v2::OutputPin<Error = PinError>,
{
    type Error = Error<SpiError, PinError>;

    fn read_reg(&mut self, reg: u8) -> Result<u8, Self::Error> {
        self.with_chip_enable(|spi| {
            spi.write(&[reg | (1 << 7)]).map_err(Error::Spi)?;
            let mut buf: [u8; 1] = [0];
            spi.transfer(&mut buf).map_err(Error::Spi)?;
            Ok(buf[0])
        })
    }

    fn write_reg(&mut self, reg: u8, data: u8) -> Result<(), Self::Error> {
        let mut buf: [u8; 2] = [reg & !(1 << 7), data];
        self.with_chip_enable(|spi| {
            spi.transfer(&mut buf).map_err(Error::Spi)?;
            Ok(())
        })
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, Self::Error> {
        self.with_chip_enable(|spi| {
            spi.write(&[reg | (1 << 7)]).map_err(Error::Spi)?;
            let mut buf: [u8; 2] = [0; 2];
            spi.transfer(&mut buf).map_err(Error::Spi)?;
            Ok(u16::from_le_bytes(buf))
        })
    }
}
