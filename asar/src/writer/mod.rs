use std::{
	fs,
	io::Cursor,
	path::{Path, PathBuf},
};

mod patch;

pub use patch::{commit, replace_file};

use crate::global::{
	envelope,
	error::InternalError,
	header::{Directory, FileEntry, Header, Node},
	result::InternalResult,
};
use crate::loader::archive::Archive;

/// Pack the directory tree under `source` into a complete in-memory archive.
///
/// Entries at every directory level are visited in lexicographic order, so
/// packing the same tree twice produces byte-identical buffers regardless of
/// how the host filesystem enumerates them. The returned [`Archive`] is
/// ready to use without re-parsing.
/// ### Errors
/// - [`InternalError::ValidationError`] if `source` is not a directory, or
///   the tree contains a non-regular file (symlink, device)
/// - `io` errors on unreadable sources
pub fn compress(source: impl AsRef<Path>) -> InternalResult<Archive<Cursor<Vec<u8>>>> {
	let source = source.as_ref();
	if !source.is_dir() {
		return Err(InternalError::ValidationError(format!(
			"pack source is not a directory: {}",
			source.display()
		)));
	}

	// `bodies` collects (path, expected size) in the exact traversal order
	// the offsets are assigned in
	let mut bodies = Vec::new();
	let root = scan_directory(source, &mut bodies)?;

	let mut header = Header { root };
	let data_len = header.assign_offsets();

	let json = header.serialize()?;
	let mut buffer = envelope::encode(&json)?;
	let baseoffset = buffer.len() as u64;

	buffer.reserve(data_len as usize);
	for (path, expected) in bodies {
		let raw = fs::read(&path)?;
		if raw.len() as u64 != expected {
			return Err(InternalError::ValidationError(format!(
				"{} changed size while packing: expected {} bytes, read {}",
				path.display(),
				expected,
				raw.len()
			)));
		}

		buffer.extend_from_slice(&raw);
	}

	Ok(Archive::from_parts(header, baseoffset, Cursor::new(buffer)))
}

/// [`compress`] `source`, then write the archive to `destination` via a
/// temporary file swapped in atomically. An existing `destination` is
/// overwritten.
pub fn pack(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> InternalResult<()> {
	let archive = compress(source)?;
	let buffer = archive.into_inner().into_inner();

	patch::commit(&buffer, destination.as_ref())
}

fn scan_directory(
	directory: &Path, bodies: &mut Vec<(PathBuf, u64)>,
) -> InternalResult<Directory> {
	let mut entries = fs::read_dir(directory)?.collect::<Result<Vec<_>, _>>()?;
	entries.sort_by_key(|entry| entry.file_name());

	let mut children = Vec::with_capacity(entries.len());
	for entry in entries {
		let path = entry.path();
		let name = entry.file_name().into_string().map_err(|name| {
			InternalError::ValidationError(format!("file name is not valid UTF-8: {:?}", name))
		})?;

		// symlink_metadata so a link never masquerades as its target
		let metadata = fs::symlink_metadata(&path)?;
		let file_type = metadata.file_type();

		if file_type.is_dir() {
			children.push((name, Node::Directory(scan_directory(&path, bodies)?)));
		} else if file_type.is_file() {
			bodies.push((path, metadata.len()));
			children.push((
				name,
				Node::File(FileEntry {
					size: metadata.len(),
					offset: 0,
					unpacked: false,
					executable: is_executable(&metadata),
				}),
			));
		} else {
			return Err(InternalError::ValidationError(format!(
				"refusing to pack non-regular file: {}",
				path.display()
			)));
		}
	}

	Ok(Directory { children })
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
	use std::os::unix::fs::PermissionsExt;

	metadata.permissions().mode() & 0o100 != 0
}

#[cfg(not(unix))]
fn is_executable(_: &fs::Metadata) -> bool {
	false
}
