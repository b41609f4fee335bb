use std::time::Duration;

use crate::EepromError;

use super::{
	AddressWidth,
	I2cAddress,
	I2cBus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
	Write {
		mem_addr: usize,
		width: AddressWidth,
		data: Vec<u8>,
	},
	Read {
		mem_addr: usize,
		width: AddressWidth,
		len: usize,
	},
	PollReady,
}

/// In-memory bus with a transaction log; cells start erased (0xff)
/// like a fresh chip.
pub struct MockBus {
	pub memory: Vec<u8>,
	pub log: Vec<Transaction>,
	/// fail the write transaction with this index (counting writes only)
	pub fail_write_at: Option<usize>,
	/// chip never becomes ready again when set
	pub stuck_busy: bool,
	writes_seen: usize,
}

impl MockBus {
	pub fn new(capacity: usize) -> MockBus {
		MockBus {
			memory: vec![0xff; capacity],
			log: Vec::new(),
			fail_write_at: None,
			stuck_busy: false,
			writes_seen: 0,
		}
	}

	pub fn preload(&mut self, offset: usize, data: &[u8]) {
		self.memory[offset..offset + data.len()].copy_from_slice(data);
	}

	/// (mem_addr, payload) of every write transaction so far
	pub fn writes(&self) -> Vec<(usize, Vec<u8>)> {
		self.log
			.iter()
			.filter_map(|t| match t {
				Transaction::Write { mem_addr, data, .. } => Some((*mem_addr, data.clone())),
				_ => None,
			})
			.collect()
	}

	pub fn write_count(&self) -> usize {
		self.writes().len()
	}

	pub fn read_count(&self) -> usize {
		self.log
			.iter()
			.filter(|t| match t {
				Transaction::Read { .. } => true,
				_ => false,
			})
			.count()
	}

	pub fn poll_count(&self) -> usize {
		self.log
			.iter()
			.filter(|t| match t {
				Transaction::PollReady => true,
				_ => false,
			})
			.count()
	}

	pub fn clear_log(&mut self) {
		self.log.clear();
	}
}

impl I2cBus for MockBus {
	fn write_to(
		&mut self,
		_device: I2cAddress,
		mem_addr: usize,
		width: AddressWidth,
		data: &[u8],
	) -> crate::AResult<()> {
		let index = self.writes_seen;
		self.writes_seen += 1;

		if self.fail_write_at == Some(index) {
			bail!("injected bus failure at write {}", index);
		}

		self.log.push(Transaction::Write {
			mem_addr,
			width,
			data: data.to_vec(),
		});
		self.memory[mem_addr..mem_addr + data.len()].copy_from_slice(data);
		Ok(())
	}

	fn read_from(
		&mut self,
		_device: I2cAddress,
		mem_addr: usize,
		width: AddressWidth,
		buf: &mut [u8],
	) -> crate::AResult<()> {
		self.log.push(Transaction::Read {
			mem_addr,
			width,
			len: buf.len(),
		});
		buf.copy_from_slice(&self.memory[mem_addr..mem_addr + buf.len()]);
		Ok(())
	}

	fn poll_ready(&mut self, _device: I2cAddress, timeout: Duration) -> crate::AResult<()> {
		self.log.push(Transaction::PollReady);
		if self.stuck_busy {
			return Err(EepromError::BusTimeout { timeout }.into());
		}
		Ok(())
	}
}
