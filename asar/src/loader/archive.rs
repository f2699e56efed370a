use std::{
	fmt, fs,
	io::{Read, Seek, SeekFrom, Write},
	path::Path,
};

use log::{debug, warn};

use crate::global::{
	envelope,
	error::InternalError,
	header::{Directory, FileEntry, Header, ListEntry, Node},
	result::InternalResult,
};

/// A wrapper for loading data from archive sources.
///
/// Owns its backing handle exclusively for its whole lifetime; dropping the
/// [`Archive`] releases the handle on every exit path. Several independent
/// `Archive`s over separate handles of the same file are safe, concurrent
/// writers to one path are not and must be serialized by the caller.
/// > **A word of advice:**
/// > Does not buffer the underlying handle, so consider wrapping `handle` in a `BufReader`
pub struct Archive<T> {
	header: Header,
	baseoffset: u64,
	handle: T,
}

impl<T> fmt::Debug for Archive<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Archive")
			.field("header", &self.header)
			.field("baseoffset", &self.baseoffset)
			.finish()
	}
}

impl<T> Archive<T> {
	pub(crate) fn from_parts(header: Header, baseoffset: u64, handle: T) -> Archive<T> {
		Archive {
			header,
			baseoffset,
			handle,
		}
	}

	/// Consume the [`Archive`] and return the underlying handle.
	pub fn into_inner(self) -> T {
		self.handle
	}

	/// The parsed header tree.
	#[inline(always)]
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Absolute position where the data region begins. Fixed for the
	/// archive's lifetime.
	#[inline(always)]
	pub fn baseoffset(&self) -> u64 {
		self.baseoffset
	}

	/// Full paths of every file leaf, in traversal order.
	pub fn leaf_paths(&self) -> Vec<String> {
		self.header.leaf_paths()
	}

	/// Flat `{path, size, unpacked}` rows for every file leaf, in traversal
	/// order.
	pub fn list_entries(&self) -> Vec<ListEntry> {
		self.header.entries()
	}
}

impl<T: Read + Seek> Archive<T> {
	/// Given a read handle, decodes the envelope and parses the header into
	/// an [`Archive`]. No partially-valid archive is ever returned.
	/// ### Errors
	/// - [`InternalError::FormatError`] if the envelope or the header JSON is
	///   malformed
	/// - `io` errors
	pub fn from_handle(mut handle: T) -> InternalResult<Archive<T>> {
		// Start reading from the start of the input
		handle.seek(SeekFrom::Start(0))?;

		let (json, baseoffset) = envelope::decode(&mut handle)?;
		let header = Header::parse(&json)?;

		Ok(Archive {
			header,
			baseoffset,
			handle,
		})
	}

	pub(crate) fn fetch_raw(&mut self, entry: &FileEntry) -> InternalResult<Vec<u8>> {
		self.handle
			.seek(SeekFrom::Start(self.baseoffset + entry.offset))?;

		let mut raw = vec![0u8; entry.size as usize];
		self.handle.read_exact(&mut raw)?;

		Ok(raw)
	}

	/// Fetch the raw bytes of the leaf at `path`.
	/// ### Errors
	/// - [`InternalError::NotFoundError`] / [`InternalError::IsADirectoryError`]
	///   if `path` does not resolve to a file leaf
	/// - [`InternalError::ValidationError`] if the leaf is `unpacked`, its
	///   bytes are not in the data region
	pub fn fetch(&mut self, path: &str) -> InternalResult<Vec<u8>> {
		let entry = self.packed_entry(path)?;
		self.fetch_raw(&entry)
	}

	/// Fetch the leaf at `path` and write its bytes directly into `target`.
	/// Returns the number of bytes written.
	pub fn fetch_write<W: Write>(&mut self, path: &str, mut target: W) -> InternalResult<u64> {
		let entry = self.packed_entry(path)?;
		let raw = self.fetch_raw(&entry)?;

		target.write_all(&raw)?;
		Ok(entry.size)
	}

	/// Extract every leaf into the directory `destination`, which must not
	/// exist yet. Directories that contain no files are materialized too.
	///
	/// Not transactional: a failure mid-walk leaves whatever was already
	/// written on disk.
	/// ### Errors
	/// - [`InternalError::AlreadyExistsError`] if `destination` exists,
	///   before anything is written
	pub fn extract(&mut self, destination: impl AsRef<Path>) -> InternalResult<()> {
		let destination = destination.as_ref();
		if destination.exists() {
			return Err(InternalError::AlreadyExistsError(destination.to_path_buf()));
		}

		fs::create_dir_all(destination)?;

		// The walk reads through `&mut self`, so it can't borrow the header
		// at the same time
		let root = self.header.root.clone();
		self.extract_directory(&root, "", destination)
	}

	fn extract_directory(
		&mut self, directory: &Directory, prefix: &str, destination: &Path,
	) -> InternalResult<()> {
		for (name, node) in &directory.children {
			let path = if prefix.is_empty() {
				name.clone()
			} else {
				format!("{}{}{}", prefix, crate::SEPARATOR, name)
			};

			match node {
				Node::Directory(child) => {
					fs::create_dir_all(destination.join(&path))?;
					self.extract_directory(child, &path, destination)?;
				},
				Node::File(entry) => {
					if entry.unpacked {
						warn!("skipping unpacked leaf with no bytes in the data region: {}", path);
						continue;
					}

					let target = destination.join(&path);
					self.write_leaf(entry, &target)?;
					debug!("extracted {} to {}", path, target.display());
				},
			}
		}

		Ok(())
	}

	/// Extract the single leaf at `archive_path` to `destination`, creating
	/// parent directories as needed. An existing file at `destination` is
	/// overwritten.
	pub fn extract_file(
		&mut self, archive_path: &str, destination: impl AsRef<Path>,
	) -> InternalResult<()> {
		let entry = self.packed_entry(archive_path)?;
		let destination = destination.as_ref();

		if let Some(parent) = destination.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}

		self.write_leaf(&entry, destination)?;
		debug!("extracted {} to {}", archive_path, destination.display());

		Ok(())
	}

	fn write_leaf(&mut self, entry: &FileEntry, destination: &Path) -> InternalResult<()> {
		let raw = self.fetch_raw(entry)?;
		fs::write(destination, raw)?;

		#[cfg(unix)]
		if entry.executable {
			make_executable(destination)?;
		}

		Ok(())
	}

	fn packed_entry(&self, path: &str) -> InternalResult<FileEntry> {
		let entry = self.header.lookup_file(path)?;
		if entry.unpacked {
			return Err(InternalError::ValidationError(format!(
				"{} is unpacked and stored outside the archive",
				path
			)));
		}

		Ok(entry.clone())
	}
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
	use std::os::unix::fs::PermissionsExt;

	let mut permissions = fs::metadata(path)?.permissions();
	permissions.set_mode(permissions.mode() | 0o111);
	fs::set_permissions(path, permissions)
}
