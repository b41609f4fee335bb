use std::time::Duration;

/// Driver error kinds.
///
/// All operations return `AResult<T>`; the kind is part of the error
/// chain and can be recovered with `EepromError::of`.
#[derive(Debug, Fail)]
pub enum EepromError {
	#[fail(display = "unsupported EEPROM variant: {} kbit", nominal_kbits)]
	UnsupportedVariant { nominal_kbits: usize },

	#[fail(display = "requested range (offset {}, {} bytes) outside of device capacity {}", offset, len, capacity)]
	OutOfRange {
		offset: usize,
		len: usize,
		capacity: usize,
	},

	#[fail(display = "device did not acknowledge within {:?}", timeout)]
	BusTimeout { timeout: Duration },

	#[fail(display = "bus transaction failed after {} committed chunk(s): {}", committed_chunks, cause)]
	BusTransactionError {
		committed_chunks: usize,
		#[fail(cause)]
		cause: failure::Error,
	},
}

impl EepromError {
	/// Kind of a `failure::Error`, if its chain carries one.
	pub fn of(error: &failure::Error) -> Option<&EepromError> {
		error.iter_chain().filter_map(|f| f.downcast_ref::<EepromError>()).next()
	}
}
