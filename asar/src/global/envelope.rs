use std::{
	convert::TryInto,
	io::{self, Read},
};

use super::{error::InternalError, result::InternalResult};

/// Round `n` up to the next multiple of [`crate::ALIGNMENT`].
#[inline(always)]
pub(crate) fn align(n: u64) -> u64 {
	let m = crate::ALIGNMENT;
	(n + m - 1) & !(m - 1)
}

// The two size words are u32, which caps how large a header can be framed
pub(crate) fn padded_size(len: u64) -> InternalResult<u64> {
	let padded = align(len);
	if padded + 4 > u32::MAX as u64 {
		return Err(InternalError::FormatError(format!(
			"header of {} bytes overflows the envelope's 32-bit size words",
			len
		)));
	}

	Ok(padded)
}

/// Frame `json` with the fixed binary envelope.
///
/// Layout, all integers little-endian:
/// `[u32: 4 + padded_len][u32: json_len][json bytes][zero padding]`,
/// where `padded_len` is `json_len` rounded up to the next multiple of
/// [`crate::ALIGNMENT`]. The first word counts everything that follows it,
/// the second the exact unpadded JSON length.
/// ### Errors
/// - [`InternalError::FormatError`] if `json` is too large for the size
///   words to describe
pub fn encode(json: &[u8]) -> InternalResult<Vec<u8>> {
	let padded = padded_size(json.len() as u64)? as usize;

	let mut buffer = Vec::with_capacity(crate::ENVELOPE_SIZE as usize + padded);
	buffer.extend_from_slice(&(padded as u32 + 4).to_le_bytes());
	buffer.extend_from_slice(&(json.len() as u32).to_le_bytes());
	buffer.extend_from_slice(json);
	buffer.resize(crate::ENVELOPE_SIZE as usize + padded, 0);

	Ok(buffer)
}

/// Read and validate the envelope from the start of `handle`.
///
/// Returns the unpadded header JSON and the `baseoffset`: the absolute
/// position where the data region begins.
/// ### Errors
/// - [`InternalError::FormatError`] if the source is truncated, the outer
///   size is below the minimum, the inner size overflows the padded region,
///   or the padding contains non-zero bytes
pub fn decode<T: Read>(mut handle: T) -> InternalResult<(Vec<u8>, u64)> {
	let mut prefix = [0u8; crate::ENVELOPE_SIZE as usize];
	read_exact_or_truncated(&mut handle, &mut prefix)?;

	let outer_size = u32::from_le_bytes(prefix[0..4].try_into().unwrap());
	let inner_size = u32::from_le_bytes(prefix[4..8].try_into().unwrap());

	if outer_size < 4 {
		return Err(InternalError::FormatError(format!(
			"envelope declares an outer size of {}, minimum is 4",
			outer_size
		)));
	}

	let padded = (outer_size - 4) as usize;
	if inner_size as usize > padded {
		return Err(InternalError::FormatError(format!(
			"header length {} overflows its padded region of {} bytes",
			inner_size, padded
		)));
	}

	let mut json = vec![0u8; padded];
	read_exact_or_truncated(&mut handle, &mut json)?;

	if json[inner_size as usize..].iter().any(|byte| *byte != 0) {
		return Err(InternalError::FormatError(
			"header padding contains non-zero bytes".to_string(),
		));
	}

	json.truncate(inner_size as usize);
	Ok((json, crate::ENVELOPE_SIZE + padded as u64))
}

// A short read here means the source is not a valid archive, not that the
// filesystem failed
fn read_exact_or_truncated<T: Read>(mut handle: T, buffer: &mut [u8]) -> InternalResult<()> {
	handle.read_exact(buffer).map_err(|err| match err.kind() {
		io::ErrorKind::UnexpectedEof => {
			InternalError::FormatError("source ended inside the envelope".to_string())
		},
		_ => InternalError::IOError(err),
	})
}
