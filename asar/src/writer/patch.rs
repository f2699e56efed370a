use std::{
	fs,
	io::{Cursor, Read, Seek},
	path::{Path, PathBuf},
};

use log::debug;

use crate::global::{envelope, error::InternalError, result::InternalResult};
use crate::loader::archive::Archive;

/// Rewrite `archive` with the leaf at `archive_path` replaced by
/// `new_content`, producing a new in-memory archive.
///
/// Contract: every byte belonging to any other leaf is copied over verbatim.
/// Leaves before the target keep their offsets; leaves after it shift by the
/// size delta. The header is re-serialized, so the new `baseoffset` is
/// derived from the new header rather than assumed equal to the old one.
/// ### Errors
/// - [`InternalError::NotFoundError`] / [`InternalError::IsADirectoryError`]
///   if `archive_path` does not resolve to a file leaf
/// - [`InternalError::ValidationError`] if the target leaf is `unpacked`,
///   its bytes are not in the data region
pub fn replace_file<T: Read + Seek>(
	archive: &mut Archive<T>, archive_path: &str, new_content: &[u8],
) -> InternalResult<Archive<Cursor<Vec<u8>>>> {
	// The old header keeps the original offsets for reading back the
	// untouched byte ranges
	let old_leaves = {
		let target = archive.header().lookup_file(archive_path)?;
		if target.unpacked {
			return Err(InternalError::ValidationError(format!(
				"{} is unpacked and stored outside the archive",
				archive_path
			)));
		}

		archive.header().leaves()
	};

	let mut header = archive.header().clone();
	header.lookup_file_mut(archive_path)?.size = new_content.len() as u64;
	let data_len = header.assign_offsets();

	let json = header.serialize()?;
	let mut buffer = envelope::encode(&json)?;
	let baseoffset = buffer.len() as u64;

	buffer.reserve(data_len as usize);
	for (path, entry) in old_leaves {
		if entry.unpacked {
			continue;
		}

		if path == archive_path {
			buffer.extend_from_slice(new_content);
		} else {
			let raw = archive.fetch_raw(&entry)?;
			buffer.extend_from_slice(&raw);
		}
	}

	Ok(Archive::from_parts(header, baseoffset, Cursor::new(buffer)))
}

/// Write `bytes` next to `destination`, then swap the finished file in with
/// a rename. The destination is never left holding a half-written archive.
pub fn commit(bytes: &[u8], destination: &Path) -> InternalResult<()> {
	let mut temporary = destination.as_os_str().to_os_string();
	temporary.push(".tmp");
	let temporary = PathBuf::from(temporary);

	fs::write(&temporary, bytes)?;
	if let Err(err) = fs::rename(&temporary, destination) {
		let _ = fs::remove_file(&temporary);
		return Err(err.into());
	}

	debug!("committed {} bytes to {}", bytes.len(), destination.display());
	Ok(())
}
