use std::fmt;

use serde_json::{Map, Value};

use super::{error::InternalError, result::InternalResult};

/// Metadata for a single file leaf in the header tree.
///
/// `offset` is relative to the start of the data region; every read of the
/// leaf's bytes is computed as `baseoffset + offset`. An `unpacked` leaf is
/// declared in the header but stored outside the data region, so its
/// `offset` carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
	pub size: u64,
	pub offset: u64,
	pub unpacked: bool,
	pub executable: bool,
}

/// A directory node: an ordered mapping of child name to [`Node`].
///
/// Order is insertion order, never sorted. Serialization order, traversal
/// order and the data-region layout all derive from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
	pub(crate) children: Vec<(String, Node)>,
}

impl Directory {
	pub fn get(&self, name: &str) -> Option<&Node> {
		self.children
			.iter()
			.find(|(child, _)| child == name)
			.map(|(_, node)| node)
	}

	fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
		self.children
			.iter_mut()
			.find(|(child, _)| child == name)
			.map(|(_, node)| node)
	}

	/// Child `(name, node)` pairs in insertion order.
	pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
		self.children.iter().map(|(name, node)| (name.as_str(), node))
	}
}

/// A node in the header tree, resolved into its variant once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Directory(Directory),
	File(FileEntry),
}

impl Node {
	fn from_value(value: &Value) -> InternalResult<Node> {
		let object = value.as_object().ok_or_else(|| {
			InternalError::FormatError("header nodes must be JSON objects".to_string())
		})?;

		match (object.get("files"), object.get("size")) {
			(Some(_), Some(_)) => Err(InternalError::FormatError(
				"node carries both \"files\" and \"size\", it must be one or the other".to_string(),
			)),
			(None, None) => Err(InternalError::FormatError(
				"node carries neither \"files\" nor \"size\"".to_string(),
			)),
			(Some(files), None) => {
				let files = files.as_object().ok_or_else(|| {
					InternalError::FormatError("\"files\" must be a JSON object".to_string())
				})?;

				let mut children = Vec::with_capacity(files.len());
				for (name, child) in files {
					children.push((name.clone(), Node::from_value(child)?));
				}

				Ok(Node::Directory(Directory { children }))
			},
			(None, Some(size)) => {
				let size = size.as_u64().ok_or_else(|| {
					InternalError::FormatError("\"size\" must be an unsigned integer".to_string())
				})?;

				let offset = match object.get("offset") {
					Some(offset) => {
						let text = offset.as_str().ok_or_else(|| {
							InternalError::FormatError(
								"\"offset\" must be a decimal string".to_string(),
							)
						})?;

						Some(text.parse::<u64>().map_err(|_| {
							InternalError::FormatError(format!(
								"\"offset\" is not a decimal unsigned integer: {:?}",
								text
							))
						})?)
					},
					None => None,
				};

				let unpacked = match object.get("unpacked") {
					Some(flag) => flag.as_bool().ok_or_else(|| {
						InternalError::FormatError("\"unpacked\" must be a boolean".to_string())
					})?,
					None => false,
				};

				let executable = match object.get("executable") {
					Some(flag) => flag.as_bool().ok_or_else(|| {
						InternalError::FormatError("\"executable\" must be a boolean".to_string())
					})?,
					None => false,
				};

				// A file with no offset lives outside the data region
				Ok(Node::File(FileEntry {
					size,
					offset: offset.unwrap_or(0),
					unpacked: unpacked || offset.is_none(),
					executable,
				}))
			},
		}
	}

	fn to_value(&self) -> Value {
		match self {
			Node::Directory(directory) => {
				let mut files = Map::with_capacity(directory.children.len());
				for (name, child) in &directory.children {
					files.insert(name.clone(), child.to_value());
				}

				let mut object = Map::new();
				object.insert("files".to_string(), Value::Object(files));
				Value::Object(object)
			},
			Node::File(entry) => {
				let mut object = Map::new();
				object.insert("size".to_string(), Value::from(entry.size));

				if entry.unpacked {
					object.insert("unpacked".to_string(), Value::Bool(true));
				} else {
					object.insert("offset".to_string(), Value::String(entry.offset.to_string()));
				}

				if entry.executable {
					object.insert("executable".to_string(), Value::Bool(true));
				}

				Value::Object(object)
			},
		}
	}
}

/// The decoded archive header: the unnamed root [`Directory`] describing
/// every archived path, its size and its offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
	pub(crate) root: Directory,
}

/// One row of the flat file listing, the data source behind every textual
/// rendering of an archive's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
	pub path: String,
	pub size: u64,
	pub unpacked: bool,
}

impl Header {
	/// Parse the header JSON into a validated tree.
	/// ### Errors
	/// - [`InternalError::FormatError`] on invalid JSON, or on any node that
	///   is neither directory- nor file-shaped
	pub fn parse(json: &[u8]) -> InternalResult<Header> {
		let value: Value = serde_json::from_slice(json)?;

		match Node::from_value(&value)? {
			Node::Directory(root) => Ok(Header { root }),
			Node::File(_) => Err(InternalError::FormatError(
				"the root node must be a directory".to_string(),
			)),
		}
	}

	/// Serialize the tree back into compact header JSON, directory children
	/// in their stored order, offsets rendered as decimal strings.
	pub fn serialize(&self) -> InternalResult<Vec<u8>> {
		let value = Node::Directory(self.root.clone()).to_value();
		Ok(serde_json::to_vec(&value)?)
	}

	/// The root directory of the tree.
	pub fn root(&self) -> &Directory {
		&self.root
	}

	/// Resolve `path` to its [`Node`], descending component by component.
	/// ### Errors
	/// - [`InternalError::NotFoundError`] if any component is absent
	/// - [`InternalError::NotADirectoryError`] if an intermediate component
	///   resolves to a file
	pub fn lookup(&self, path: &str) -> InternalResult<&Node> {
		let mut components = path.split(crate::SEPARATOR).filter(|c| !c.is_empty());

		let first = components
			.next()
			.ok_or_else(|| InternalError::NotFoundError(path.to_string()))?;
		let mut node = self
			.root
			.get(first)
			.ok_or_else(|| InternalError::NotFoundError(path.to_string()))?;

		for component in components {
			node = match node {
				Node::Directory(directory) => directory
					.get(component)
					.ok_or_else(|| InternalError::NotFoundError(path.to_string()))?,
				Node::File(_) => return Err(InternalError::NotADirectoryError(path.to_string())),
			};
		}

		Ok(node)
	}

	/// [`Header::lookup`], additionally requiring the target to be a file.
	pub fn lookup_file(&self, path: &str) -> InternalResult<&FileEntry> {
		match self.lookup(path)? {
			Node::File(entry) => Ok(entry),
			Node::Directory(_) => Err(InternalError::IsADirectoryError(path.to_string())),
		}
	}

	pub(crate) fn lookup_file_mut(&mut self, path: &str) -> InternalResult<&mut FileEntry> {
		let mut components = path.split(crate::SEPARATOR).filter(|c| !c.is_empty());

		let first = components
			.next()
			.ok_or_else(|| InternalError::NotFoundError(path.to_string()))?;
		let mut node = self
			.root
			.get_mut(first)
			.ok_or_else(|| InternalError::NotFoundError(path.to_string()))?;

		for component in components {
			node = match node {
				Node::Directory(directory) => directory
					.get_mut(component)
					.ok_or_else(|| InternalError::NotFoundError(path.to_string()))?,
				Node::File(_) => return Err(InternalError::NotADirectoryError(path.to_string())),
			};
		}

		match node {
			Node::File(entry) => Ok(entry),
			Node::Directory(_) => Err(InternalError::IsADirectoryError(path.to_string())),
		}
	}

	/// Every file leaf as a `(full path, entry)` pair, in canonical traversal
	/// order: depth-first, children in declared order, files and
	/// sub-directories interleaved as declared.
	pub fn leaves(&self) -> Vec<(String, FileEntry)> {
		fn walk(children: &[(String, Node)], prefix: &str, leaves: &mut Vec<(String, FileEntry)>) {
			for (name, node) in children {
				let path = if prefix.is_empty() {
					name.clone()
				} else {
					format!("{}{}{}", prefix, crate::SEPARATOR, name)
				};

				match node {
					Node::Directory(directory) => walk(&directory.children, &path, leaves),
					Node::File(entry) => leaves.push((path, entry.clone())),
				}
			}
		}

		let mut leaves = Vec::new();
		walk(&self.root.children, "", &mut leaves);
		leaves
	}

	/// Full paths of every file leaf, in canonical traversal order.
	pub fn leaf_paths(&self) -> Vec<String> {
		self.leaves().into_iter().map(|(path, _)| path).collect()
	}

	/// The flat listing rows for every file leaf, in canonical traversal
	/// order. Presentation layers sort these however they like.
	pub fn entries(&self) -> Vec<ListEntry> {
		self.leaves()
			.into_iter()
			.map(|(path, entry)| ListEntry {
				path,
				size: entry.size,
				unpacked: entry.unpacked,
			})
			.collect()
	}

	/// Assign contiguous data-region offsets to every packed leaf, in
	/// canonical traversal order: first offset 0, each subsequent offset the
	/// running sum of the sizes before it. `unpacked` leaves keep their size
	/// but contribute no bytes and receive no offset.
	///
	/// Returns the total length of the data region.
	pub fn assign_offsets(&mut self) -> u64 {
		fn assign(children: &mut [(String, Node)], counter: &mut u64) {
			for (_, node) in children {
				match node {
					Node::Directory(directory) => assign(&mut directory.children, counter),
					Node::File(entry) => {
						if entry.unpacked {
							continue;
						}

						entry.offset = *counter;
						*counter += entry.size;
					},
				}
			}
		}

		let mut counter = 0;
		assign(&mut self.root.children, &mut counter);
		counter
	}
}

impl fmt::Display for Header {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "[ArchiveHeader] leaves: {}", self.leaves().len())
	}
}
