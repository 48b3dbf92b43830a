/// I2C device address.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[repr(u8)]
pub enum Address {
    /// SDO pin is connected to GND.
    SdoGnd = 0x76,
    /// SDO pin is connected to V<sub>DDIO</sub>
    SdoVddio = 0x77,
}

/// BMP280 bus.
#[derive(Debug)]
pub struct Bmp280Bus<I2C> {
    address: u8,
    bus: I2C,
}

impl<I2C, E> Bmp280Bus<I2C>
where
    I2C: eh1::i2c::I2c<Error = E>,
{
    /// Creates a new `Bmp280Bus` from an I2C peripheral, and an I2C
    /// device address.
    ///
    /// # Example
    ///
    /// ```
    /// # let i2c = ehm::eh1::i2c::Mock::new(&[]);
    /// use bmp280_multibus::i2c1::{Address, Bmp280Bus};
    ///
    /// let mut bmp: Bmp280Bus<_> = Bmp280Bus::new(i2c, Address::SdoGnd);
    /// # bmp.free().done();
    /// ```
    #[inline]
    pub fn new(bus: I2C, address: Address) -> Self {
        Self {
            bus,
            address: address as u8,
        }
    }

    /// Free the I2C bus from the BMP280.
    ///
    /// # Example
    ///
    /// ```
    /// # let i2c = ehm::eh1::i2c::Mock::new(&[]);
    /// use bmp280_multibus::i2c1::{Address, Bmp280Bus};
    ///
    /// let bmp: Bmp280Bus<_> = Bmp280Bus::new(i2c, Address::SdoGnd);
    /// let mut i2c = bmp.free();
    /// # i2c.done();
    /// ```
    #[inline]
    pub fn free(self) -> I2C {
        self.bus
    }
}

impl<I2C, E> crate::Bmp280Bus for Bmp280Bus<I2C>
where
    I2C: eh1::i2c::I2c<Error = E>,
{
    type Error = E;

    fn read_reg(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf: [u8; 1] = [0];
        self.bus.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, data: u8) -> Result<(), Self::Error> {
        self.bus.write(self.address, &[reg, data])
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, Self::Error> {
        let mut buf: [u8; 2] = [0; 2];
        self.bus.write_read(self.address, &[reg], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}
