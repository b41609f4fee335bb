use std::time::Duration;

use crate::EepromError;
use crate::bus::{
	I2cAddress,
	I2cBus,
};

use super::Geometry;

// upper bound for the chip's internal write cycle; datasheet t_WR max
// is 5 ms across the family
const WRITE_CYCLE_TIMEOUT: Duration = Duration::from_millis(10);

/// One physical AT24Cxx chip on a bus.
///
/// Holds no buffered data; every operation goes to the chip. Operations
/// take `&mut self` — a device has a single internal address pointer
/// and write-cycle timer, so access must be serialized, and the borrow
/// checker enforces exactly that.
pub struct Eeprom<B: I2cBus> {
	bus: B,
	address: I2cAddress,
	geometry: Geometry,
}

impl<B: I2cBus> Eeprom<B> {
	/// Resolves the variant and attaches to the chip at `address`.
	pub fn open(bus: B, address: I2cAddress, nominal_kbits: usize) -> crate::AResult<Eeprom<B>> {
		let geometry = Geometry::resolve(nominal_kbits)?;
		info!(
			"AT24C{:02} at {}: {} pages of {} bytes ({} bytes total)",
			nominal_kbits,
			address,
			geometry.page_count(),
			geometry.page_size(),
			geometry.capacity(),
		);
		Ok(Eeprom {
			bus,
			address,
			geometry,
		})
	}

	pub fn address(&self) -> I2cAddress {
		self.address
	}

	pub fn geometry(&self) -> &Geometry {
		&self.geometry
	}

	pub fn capacity(&self) -> usize {
		self.geometry.capacity()
	}

	pub fn page_size(&self) -> usize {
		self.geometry.page_size()
	}

	pub fn page_count(&self) -> usize {
		self.geometry.page_count()
	}

	pub fn bus(&self) -> &B {
		&self.bus
	}

	pub fn bus_mut(&mut self) -> &mut B {
		&mut self.bus
	}

	// every operation validates before the first bus transaction
	fn check_range(&self, offset: usize, len: usize) -> crate::AResult<()> {
		let capacity = self.geometry.capacity();
		if len == 0 || offset >= capacity || capacity - offset < len {
			return Err(EepromError::OutOfRange {
				offset,
				len,
				capacity,
			}
			.into());
		}
		Ok(())
	}

	/// Reads `len` bytes starting at `offset`.
	///
	/// One bus transaction regardless of page boundaries: the chip
	/// auto-increments its internal pointer on sequential reads.
	pub fn read(&mut self, offset: usize, len: usize) -> crate::AResult<Vec<u8>> {
		self.check_range(offset, len)?;

		let mut buf = vec![0u8; len];
		self.bus.read_from(
			self.address,
			offset,
			self.geometry.address_width(),
			&mut buf,
		)?;
		Ok(buf)
	}

	/// Writes `data` starting at `offset`, splitting into page-aligned
	/// chunks.
	///
	/// The first chunk fills the current page up to its boundary, every
	/// following chunk covers at most one full page. After each chunk
	/// the chip's write cycle is awaited before the next transaction
	/// (and before returning, for the last one).
	///
	/// There is no rollback: if a chunk fails mid-sequence, earlier
	/// chunks stay committed and the error reports how many.
	pub fn write(&mut self, offset: usize, data: &[u8]) -> crate::AResult<()> {
		if data.is_empty() {
			return Ok(());
		}
		self.check_range(offset, data.len())?;

		let mut pos = offset;
		let mut rest = data;
		let mut committed_chunks = 0usize;
		while !rest.is_empty() {
			let take = rest.len().min(self.geometry.room_in_page(pos));
			let (chunk, tail) = rest.split_at(take);

			if let Err(cause) = self.bus.write_to(
				self.address,
				pos,
				self.geometry.address_width(),
				chunk,
			) {
				error!(
					"write of {} bytes at 0x{:04x} failed after {} chunk(s): {}",
					chunk.len(),
					pos,
					committed_chunks,
					cause,
				);
				return Err(EepromError::BusTransactionError {
					committed_chunks,
					cause,
				}
				.into());
			}
			self.bus.poll_ready(self.address, WRITE_CYCLE_TIMEOUT)?;

			committed_chunks += 1;
			pos += take;
			rest = tail;
		}
		Ok(())
	}

	/// Writes only the bytes of `data` that differ from the stored
	/// contents.
	///
	/// Each maximal run of changed bytes becomes its own `write` call;
	/// unchanged bytes are never transmitted (EEPROM cells have a
	/// bounded write-cycle lifetime). Matching contents degrade to a
	/// no-op without any write transaction.
	pub fn update(&mut self, offset: usize, data: &[u8]) -> crate::AResult<()> {
		if data.is_empty() {
			return Ok(());
		}
		self.check_range(offset, data.len())?;

		let current = self.read(offset, data.len())?;

		let mut runs = 0usize;
		let mut i = 0usize;
		while i < data.len() {
			if data[i] == current[i] {
				i += 1;
				continue;
			}
			let start = i;
			while i < data.len() && data[i] != current[i] {
				i += 1;
			}
			self.write(offset + start, &data[start..i])?;
			runs += 1;
		}

		if runs == 0 {
			debug!("update of {} bytes at 0x{:04x}: contents already match", data.len(), offset);
		}
		Ok(())
	}

	/// Resets the whole device to the erased state (0xff), one full
	/// page per transaction.
	pub fn wipe(&mut self) -> crate::AResult<()> {
		let page = vec![0xffu8; self.geometry.page_size()];
		for index in 0..self.geometry.page_count() {
			self.write(index * self.geometry.page_size(), &page)?;
		}
		Ok(())
	}

	/// Page-aligned hexdump of the region `[offset, offset+len)`, one
	/// line per page; bytes outside the requested window show as `..`.
	pub fn dump_pages(&mut self, offset: usize, len: usize) -> crate::AResult<Vec<String>> {
		self.check_range(offset, len)?;

		let data = self.read(offset, len)?;
		let page_size = self.geometry.page_size();
		let first_page = offset / page_size;
		let last_page = (offset + len - 1) / page_size;

		let mut lines = Vec::with_capacity(last_page - first_page + 1);
		for page in first_page..=last_page {
			let mut hex = String::new();
			let mut ascii = String::new();
			for cell in page * page_size..(page + 1) * page_size {
				if !hex.is_empty() {
					hex.push(' ');
				}
				if cell < offset || cell >= offset + len {
					hex.push_str("..");
					ascii.push('?');
				} else {
					let byte = data[cell - offset];
					hex.push_str(&format!("{:02x}", byte));
					ascii.push(if byte.is_ascii_graphic() || byte == b' ' {
						byte as char
					} else {
						'.'
					});
				}
			}
			lines.push(format!("page {:4}: {} |{}|", page, hex, ascii));
		}
		Ok(lines)
	}
}
