/// Bus transport capability for AT24Cxx chips.
///
/// The chips speak standard two-wire I²C: every transaction starts with
/// the 7-bit device address, followed by the internal word address (one
/// or two bytes depending on capacity), followed by data. After a write
/// the chip goes busy for its internal write cycle (t_WR, up to 5 ms)
/// and won't acknowledge its address until the cycle finished; readiness
/// is detected by ACK polling.
///
/// The driver core only depends on this capability, never on a concrete
/// bus. `linux` provides one over `/dev/i2c-N`.

mod linux;
#[cfg(test)]
pub(crate) mod mock;

pub use self::linux::LinuxI2cBus;

use std::fmt;
use std::str;
use std::time::Duration;

/// Conventional AT24Cxx address with A2..A0 strapped low.
pub const DEFAULT_ADDRESS: I2cAddress = I2cAddress(0x50);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct I2cAddress(u8);

impl I2cAddress {
	pub fn new(raw: u8) -> crate::AResult<I2cAddress> {
		ensure!(raw <= 0x7f, "invalid I2C address: 0x{:02x} (only 7 bits available)", raw);
		Ok(I2cAddress(raw))
	}

	pub fn raw(&self) -> u8 {
		self.0
	}
}

impl Default for I2cAddress {
	fn default() -> Self {
		DEFAULT_ADDRESS
	}
}

impl fmt::Debug for I2cAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_tuple("I2cAddress")
			.field(&format_args!("0x{:02x}", self.0))
			.finish()
	}
}

impl fmt::Display for I2cAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl str::FromStr for I2cAddress {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = if s.starts_with("0x") || s.starts_with("0X") {
			&s[2..]
		} else {
			s
		};

		let raw = with_context!(("invalid I2C address: {:?}", s),
			u8::from_str_radix(digits, 16).map_err(|e| e.into())
		)?;

		I2cAddress::new(raw)
	}
}

/// Width of the word-address field sent after the device address.
///
/// Parts up to 2 kbit take a single address byte, larger parts take
/// two (high byte first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressWidth {
	One,
	Two,
}

impl AddressWidth {
	pub fn len(self) -> usize {
		match self {
			AddressWidth::One => 1,
			AddressWidth::Two => 2,
		}
	}

	// wire encoding of a word address; only the first `len()` bytes
	// of the returned buffer are valid
	pub fn encode(self, mem_addr: usize) -> [u8; 2] {
		match self {
			AddressWidth::One => [mem_addr as u8, 0],
			AddressWidth::Two => [(mem_addr >> 8) as u8, mem_addr as u8],
		}
	}
}

pub trait I2cBus {
	/// One addressed write transaction: device address, word address,
	/// `data`, stop. The chip starts its internal write cycle on stop.
	fn write_to(
		&mut self,
		device: I2cAddress,
		mem_addr: usize,
		width: AddressWidth,
		data: &[u8],
	) -> crate::AResult<()>;

	/// One addressed read transaction spanning `buf.len()` bytes. The
	/// chip auto-increments its internal pointer, so a single read may
	/// cross page boundaries.
	fn read_from(
		&mut self,
		device: I2cAddress,
		mem_addr: usize,
		width: AddressWidth,
		buf: &mut [u8],
	) -> crate::AResult<()>;

	/// ACK-poll until the chip answers its address again or `timeout`
	/// passed; fails with `EepromError::BusTimeout` on expiry.
	fn poll_ready(&mut self, device: I2cAddress, timeout: Duration) -> crate::AResult<()>;
}
