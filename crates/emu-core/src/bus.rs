//! Memory and I/O bus interfaces.

/// Memory bus interface.
///
/// The CPU reaches memory through this trait once per memory reference.
/// The bus decodes the address, picks the backing store and performs the
/// access. Unmapped reads return the bus's open-bus value; unmapped writes
/// are dropped.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// A bus that also has a separate I/O port space.
///
/// The Z80 reaches its peripherals with IN and OUT, which use their own
/// address space. Z80 machines implement this on top of [`Bus`].
pub trait IoBus: Bus {
    /// Read a byte from the given I/O port.
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to the given I/O port.
    fn write_io(&mut self, port: u16, value: u8);
}
