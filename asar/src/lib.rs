mod tests;

pub(crate) mod global;
pub(crate) mod loader;
pub(crate) mod writer;

// Global constants
/// The header JSON is zero-padded up to a multiple of this many bytes
pub const ALIGNMENT: u64 = 4;

/// The size in bytes of the fixed envelope prefix preceding the header JSON
pub const ENVELOPE_SIZE: u64 = 8;

/// The path separator used inside archives, regardless of host platform
pub const SEPARATOR: char = '/';

pub mod prelude {
	//! All crate structures and logic is stored within
	pub use crate::global::{
		envelope,
		error::InternalError,
		header::{Directory, FileEntry, Header, ListEntry, Node},
		result::InternalResult,
	};
	pub use crate::loader::archive::Archive;
	pub use crate::writer::{commit, compress, pack, replace_file};
}
