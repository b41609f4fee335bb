use crate::EepromError;
use crate::bus::AddressWidth;

/// Addressing parameters of one AT24Cxx part.
///
/// A part rated for N kbit stores N·1024/8 bytes, organized in pages;
/// one write transaction must stay within a single page. Page sizes
/// per the Atmel/Microchip datasheets:
///
/// - AT24C01/02: 8 byte pages
/// - AT24C04/08/16: 16 byte pages
/// - AT24C32/64: 32 byte pages
/// - AT24C128/256: 64 byte pages
/// - AT24C512: 128 byte pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
	capacity: usize,
	page_size: usize,
	address_width: AddressWidth,
}

impl Geometry {
	pub fn resolve(nominal_kbits: usize) -> crate::AResult<Geometry> {
		let page_size = match nominal_kbits {
			1 | 2 => 8,
			4 | 8 | 16 => 16,
			32 | 64 => 32,
			128 | 256 => 64,
			512 => 128,
			_ => return Err(EepromError::UnsupportedVariant { nominal_kbits }.into()),
		};

		let capacity = nominal_kbits * 1024 / 8;
		let address_width = if capacity <= 256 {
			AddressWidth::One
		} else {
			AddressWidth::Two
		};

		Ok(Geometry {
			capacity,
			page_size,
			address_width,
		})
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn page_size(&self) -> usize {
		self.page_size
	}

	pub fn page_count(&self) -> usize {
		self.capacity / self.page_size
	}

	pub fn address_width(&self) -> AddressWidth {
		self.address_width
	}

	/// Bytes left in the page containing `offset`, starting at `offset`.
	pub fn room_in_page(&self, offset: usize) -> usize {
		self.page_size - offset % self.page_size
	}
}
