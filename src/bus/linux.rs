use std::fs;
use std::io::{
	Read,
	Write,
};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

use crate::EepromError;

use super::{
	AddressWidth,
	I2cAddress,
	I2cBus,
};

// from linux/i2c-dev.h
const I2C_RETRIES: libc::c_ulong = 0x0701;
const I2C_SLAVE: libc::c_ulong = 0x0703;

// ACK probe pacing; t_WR is a few milliseconds, no point in hammering
const POLL_INTERVAL: Duration = Duration::from_micros(500);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// `I2cBus` over an i2c-dev character device (`/dev/i2c-N`).
///
/// Reads are issued as a plain address-set write followed by a read;
/// the AT24Cxx parts accept the word address from the preceding write
/// even without a repeated start.
pub struct LinuxI2cBus {
	file: fs::File,
	// avoid redundant I2C_SLAVE ioctls for consecutive transactions
	selected: Option<I2cAddress>,
}

impl LinuxI2cBus {
	pub fn open<P: AsRef<Path>>(path: P) -> crate::AResult<LinuxI2cBus> {
		let path = path.as_ref();
		with_context!(("couldn't open I2C bus device {:?}", path), {
			let file = fs::OpenOptions::new()
				.read(true)
				.write(true)
				.open(path)?;

			// the kernel would retry on lost arbitration; we do our own
			// ACK polling, so keep transactions one-shot
			let r = unsafe { libc::ioctl(file.as_raw_fd(), I2C_RETRIES, 0u64) };
			if r != 0 {
				return Err(std::io::Error::last_os_error().into());
			}

			Ok(LinuxI2cBus {
				file,
				selected: None,
			})
		})
	}

	fn select(&mut self, device: I2cAddress) -> crate::AResult<()> {
		if self.selected == Some(device) {
			return Ok(());
		}
		let r = unsafe { libc::ioctl(self.file.as_raw_fd(), I2C_SLAVE, device.raw() as u64) };
		ensure!(r == 0, "couldn't select I2C device {}: {}", device, std::io::Error::last_os_error());
		self.selected = Some(device);
		Ok(())
	}

	// one addressed probe transaction; NACK while the chip is busy
	fn probe(&mut self) -> bool {
		let mut scratch = [0u8; 1];
		match self.file.read(&mut scratch) {
			Ok(n) => n == 1,
			Err(_) => false,
		}
	}
}

impl I2cBus for LinuxI2cBus {
	fn write_to(
		&mut self,
		device: I2cAddress,
		mem_addr: usize,
		width: AddressWidth,
		data: &[u8],
	) -> crate::AResult<()> {
		self.select(device)?;

		// word address and payload must go out in a single transaction
		let prefix = width.encode(mem_addr);
		let mut message = Vec::with_capacity(width.len() + data.len());
		message.extend_from_slice(&prefix[..width.len()]);
		message.extend_from_slice(data);

		debug!("I2C {}: write {} bytes at 0x{:04x}", device, data.len(), mem_addr);
		with_context!(("I2C write of {} bytes at 0x{:04x} failed", data.len(), mem_addr),
			self.file.write_all(&message).map_err(|e| e.into())
		)
	}

	fn read_from(
		&mut self,
		device: I2cAddress,
		mem_addr: usize,
		width: AddressWidth,
		buf: &mut [u8],
	) -> crate::AResult<()> {
		self.select(device)?;

		let prefix = width.encode(mem_addr);
		debug!("I2C {}: read {} bytes at 0x{:04x}", device, buf.len(), mem_addr);
		with_context!(("I2C read of {} bytes at 0x{:04x} failed", buf.len(), mem_addr), {
			// dummy write sets the chip's internal address pointer
			self.file.write_all(&prefix[..width.len()])?;
			self.file.read_exact(buf)?;
			Ok(())
		})
	}

	fn poll_ready(&mut self, device: I2cAddress, timeout: Duration) -> crate::AResult<()> {
		self.select(device)?;

		let start = Instant::now();
		loop {
			if self.probe() {
				return Ok(());
			}
			if start.elapsed() >= timeout {
				warn!("I2C {}: no ACK within {:?}", device, timeout);
				return Err(EepromError::BusTimeout { timeout }.into());
			}
			reliable_sleep(POLL_INTERVAL);
		}
	}
}
