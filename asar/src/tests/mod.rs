/// This is meant to mirror as closely as possible, how users should use the crate
#[cfg(test)]
mod tests {
	use std::fs;
	use std::io::Cursor;

	// The header internals are pub(crate); tests build trees directly
	use crate::global::{
		envelope,
		header::{Directory, FileEntry, Header, Node},
	};
	use crate::prelude::*;

	fn file(size: u64, offset: u64) -> Node {
		Node::File(FileEntry {
			size,
			offset,
			unpacked: false,
			executable: false,
		})
	}

	// a.txt(10)@0, b.txt(20)@10, sub/c.txt(30)@30
	fn sample_header() -> Header {
		Header {
			root: Directory {
				children: vec![
					("a.txt".to_string(), file(10, 0)),
					("b.txt".to_string(), file(20, 10)),
					(
						"sub".to_string(),
						Node::Directory(Directory {
							children: vec![("c.txt".to_string(), file(30, 30))],
						}),
					),
				],
			},
		}
	}

	fn sample_data() -> Vec<u8> {
		let mut data = vec![b'A'; 10];
		data.extend(vec![b'B'; 20]);
		data.extend(vec![b'C'; 30]);
		data
	}

	fn sample_archive() -> Archive<Cursor<Vec<u8>>> {
		let json = sample_header().serialize().unwrap();
		let mut buffer = envelope::encode(&json).unwrap();
		buffer.extend_from_slice(&sample_data());

		Archive::from_handle(Cursor::new(buffer)).unwrap()
	}

	#[test]
	fn envelope_round_trip() {
		for len in 0..=9usize {
			let json = vec![b'x'; len];
			let encoded = envelope::encode(&json).unwrap();

			// the outer word counts itself out, the rest is aligned
			assert_eq!(encoded.len() as u64 % crate::ALIGNMENT, 0);

			let (decoded, baseoffset) = envelope::decode(encoded.as_slice()).unwrap();
			assert_eq!(decoded, json);
			assert_eq!(baseoffset, encoded.len() as u64);
		}
	}

	#[test]
	fn envelope_rejects_truncated_prefix() {
		let result = envelope::decode([1u8, 2, 3].as_slice());
		assert!(matches!(result, Err(InternalError::FormatError(_))));
	}

	#[test]
	fn envelope_rejects_truncated_body() {
		// declares 8 padded bytes, carries 4
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&12u32.to_le_bytes());
		bytes.extend_from_slice(&8u32.to_le_bytes());
		bytes.extend_from_slice(&[0u8; 4]);

		let result = envelope::decode(bytes.as_slice());
		assert!(matches!(result, Err(InternalError::FormatError(_))));
	}

	#[test]
	fn envelope_rejects_bad_sizes() {
		// outer size below the minimum of 4
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&3u32.to_le_bytes());
		bytes.extend_from_slice(&0u32.to_le_bytes());
		assert!(matches!(
			envelope::decode(bytes.as_slice()),
			Err(InternalError::FormatError(_))
		));

		// inner size overflowing the padded region
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&8u32.to_le_bytes());
		bytes.extend_from_slice(&5u32.to_le_bytes());
		bytes.extend_from_slice(&[0u8; 4]);
		assert!(matches!(
			envelope::decode(bytes.as_slice()),
			Err(InternalError::FormatError(_))
		));
	}

	#[test]
	fn envelope_rejects_oversized_headers() {
		// the size words are u32, nothing near 4 GiB can be framed
		assert!(matches!(
			envelope::padded_size(u32::MAX as u64),
			Err(InternalError::FormatError(_))
		));
		assert_eq!(envelope::padded_size(5).unwrap(), 8);
	}

	#[test]
	fn envelope_rejects_nonzero_padding() {
		let mut encoded = envelope::encode(b"{}").unwrap();
		// flip a byte inside the two bytes of padding
		let last = encoded.len() - 1;
		encoded[last] = 0xFF;

		let result = envelope::decode(encoded.as_slice());
		assert!(matches!(result, Err(InternalError::FormatError(_))));
	}

	#[test]
	fn header_round_trip_preserves_order() -> InternalResult<()> {
		// deliberately unsorted children
		let header = Header {
			root: Directory {
				children: vec![
					("zeta".to_string(), file(4, 0)),
					("alpha".to_string(), file(2, 4)),
					(
						"mid".to_string(),
						Node::Directory(Directory {
							children: vec![("inner".to_string(), file(1, 6))],
						}),
					),
				],
			},
		};

		let json = header.serialize()?;
		let parsed = Header::parse(&json)?;

		assert_eq!(parsed, header);
		// serialization is deterministic down to the byte
		assert_eq!(parsed.serialize()?, json);

		Ok(())
	}

	#[test]
	fn header_serializes_offsets_as_decimal_strings() -> InternalResult<()> {
		let json = sample_header().serialize()?;
		let text = std::str::from_utf8(&json).unwrap();

		assert!(text.contains(r#""offset":"10""#));
		assert!(text.contains(r#""size":20"#));

		Ok(())
	}

	#[test]
	fn header_rejects_malformed_nodes() {
		// neither directory- nor file-shaped
		let result = Header::parse(br#"{"files":{"x":{}}}"#);
		assert!(matches!(result, Err(InternalError::FormatError(_))));

		// both shapes at once
		let result = Header::parse(br#"{"files":{"x":{"files":{},"size":1}}}"#);
		assert!(matches!(result, Err(InternalError::FormatError(_))));

		// offset must be a decimal string
		let result = Header::parse(br#"{"files":{"x":{"size":1,"offset":0}}}"#);
		assert!(matches!(result, Err(InternalError::FormatError(_))));

		// root must be a directory
		let result = Header::parse(br#"{"size":1,"offset":"0"}"#);
		assert!(matches!(result, Err(InternalError::FormatError(_))));
	}

	#[test]
	fn header_flags_round_trip() -> InternalResult<()> {
		let json = br#"{"files":{"tool":{"size":4,"offset":"0","executable":true},"side":{"size":9,"unpacked":true}}}"#;
		let header = Header::parse(json)?;

		let tool = header.lookup_file("tool")?;
		assert!(tool.executable && !tool.unpacked);

		let side = header.lookup_file("side")?;
		assert!(side.unpacked && !side.executable);

		// flags survive a serialize/parse cycle
		let reparsed = Header::parse(&header.serialize()?)?;
		assert_eq!(reparsed, header);

		Ok(())
	}

	#[test]
	fn lookup_resolves_paths() -> InternalResult<()> {
		let header = sample_header();

		assert_eq!(header.lookup_file("a.txt")?.size, 10);
		assert_eq!(header.lookup_file("sub/c.txt")?.offset, 30);

		assert!(matches!(
			header.lookup("missing"),
			Err(InternalError::NotFoundError(_))
		));
		assert!(matches!(
			header.lookup("sub/missing"),
			Err(InternalError::NotFoundError(_))
		));
		// descending through a file
		assert!(matches!(
			header.lookup("a.txt/deeper"),
			Err(InternalError::NotADirectoryError(_))
		));
		// a directory where a file is required
		assert!(matches!(
			header.lookup_file("sub"),
			Err(InternalError::IsADirectoryError(_))
		));

		Ok(())
	}

	#[test]
	fn listing_matches_lookup() -> InternalResult<()> {
		let header = sample_header();
		let paths = header.leaf_paths();

		assert_eq!(paths, vec!["a.txt", "b.txt", "sub/c.txt"]);
		for path in &paths {
			header.lookup_file(path)?;
		}

		let entries = header.entries();
		assert_eq!(entries.len(), paths.len());
		assert!(entries.iter().all(|entry| !entry.unpacked));

		Ok(())
	}

	#[test]
	fn header_exposes_the_root_directory() {
		let header = sample_header();

		let names: Vec<&str> = header.root().children().map(|(name, _)| name).collect();
		assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
		assert!(matches!(header.root().get("sub"), Some(Node::Directory(_))));

		assert_eq!(header.to_string(), "[ArchiveHeader] leaves: 3");
	}

	#[test]
	fn allocator_assigns_contiguous_offsets() {
		let mut header = Header {
			root: Directory {
				children: vec![
					("one".to_string(), file(5, 999)),
					("empty".to_string(), file(0, 999)),
					(
						"side".to_string(),
						Node::File(FileEntry {
							size: 9,
							offset: 999,
							unpacked: true,
							executable: false,
						}),
					),
					("two".to_string(), file(7, 999)),
				],
			},
		};

		let data_len = header.assign_offsets();
		assert_eq!(data_len, 12);

		let leaves = header.leaves();
		let mut counter = 0;
		for (_, entry) in leaves.iter().filter(|(_, entry)| !entry.unpacked) {
			assert_eq!(entry.offset, counter);
			counter += entry.size;
		}

		// unpacked leaves receive no offset contribution
		assert_eq!(header.lookup_file("side").unwrap().offset, 999);
		assert_eq!(header.lookup_file("two").unwrap().offset, 5);
	}

	#[test]
	fn fetch_reads_exact_ranges() -> InternalResult<()> {
		let mut archive = sample_archive();

		// the data region starts right after the encoded envelope
		let json = sample_header().serialize()?;
		assert_eq!(archive.baseoffset(), envelope::encode(&json)?.len() as u64);

		assert_eq!(archive.fetch("a.txt")?, vec![b'A'; 10]);
		assert_eq!(archive.fetch("sub/c.txt")?, vec![b'C'; 30]);

		let mut sink = Vec::new();
		assert_eq!(archive.fetch_write("b.txt", &mut sink)?, 20);
		assert_eq!(sink, vec![b'B'; 20]);

		Ok(())
	}

	#[test]
	fn pack_extract_round_trip() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let source = workspace.path().join("source");

		fs::create_dir_all(source.join("sub/deeper"))?;
		fs::create_dir_all(source.join("hollow"))?;
		fs::write(source.join("a.txt"), b"hello")?;
		fs::write(source.join("sub/b.bin"), [0u8, 1, 2, 254, 255])?;
		fs::write(source.join("sub/deeper/c.txt"), b"")?;

		let mut archive = compress(&source)?;
		assert_eq!(
			archive.leaf_paths(),
			vec!["a.txt", "sub/b.bin", "sub/deeper/c.txt"]
		);

		let destination = workspace.path().join("out");
		archive.extract(&destination)?;

		assert_eq!(fs::read(destination.join("a.txt"))?, b"hello");
		assert_eq!(fs::read(destination.join("sub/b.bin"))?, [0u8, 1, 2, 254, 255]);
		assert_eq!(fs::read(destination.join("sub/deeper/c.txt"))?, b"");
		// directories with no files are materialized too
		assert!(destination.join("hollow").is_dir());

		Ok(())
	}

	#[test]
	fn compress_is_deterministic() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let source = workspace.path().join("source");

		fs::create_dir_all(source.join("nested"))?;
		fs::write(source.join("zz.txt"), b"last")?;
		fs::write(source.join("aa.txt"), b"first")?;
		fs::write(source.join("nested/mid.txt"), b"middle")?;

		let first = compress(&source)?.into_inner().into_inner();
		let second = compress(&source)?.into_inner().into_inner();

		assert_eq!(first, second);
		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn compress_rejects_symlinks() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let source = workspace.path().join("source");

		fs::create_dir_all(&source)?;
		fs::write(source.join("real.txt"), b"data")?;
		std::os::unix::fs::symlink(source.join("real.txt"), source.join("link.txt"))?;

		let result = compress(&source);
		assert!(matches!(result, Err(InternalError::ValidationError(_))));

		Ok(())
	}

	#[cfg(unix)]
	#[test]
	fn executable_bit_survives_the_round_trip() -> InternalResult<()> {
		use std::os::unix::fs::PermissionsExt;

		let workspace = tempfile::tempdir()?;
		let source = workspace.path().join("source");
		fs::create_dir_all(&source)?;

		let tool = source.join("tool.sh");
		fs::write(&tool, b"#!/bin/sh\n")?;
		fs::set_permissions(&tool, fs::Permissions::from_mode(0o755))?;
		fs::write(source.join("plain.txt"), b"data")?;

		let mut archive = compress(&source)?;
		assert!(archive.header().lookup_file("tool.sh")?.executable);
		assert!(!archive.header().lookup_file("plain.txt")?.executable);

		let destination = workspace.path().join("out");
		archive.extract(&destination)?;

		let mode = fs::metadata(destination.join("tool.sh"))?.permissions().mode();
		assert_ne!(mode & 0o111, 0);
		let mode = fs::metadata(destination.join("plain.txt"))?.permissions().mode();
		assert_eq!(mode & 0o111, 0);

		Ok(())
	}

	#[test]
	fn extract_skips_unpacked_leaves() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;

		let json = br#"{"files":{"kept.txt":{"size":4,"offset":"0"},"side.bin":{"size":9,"unpacked":true}}}"#;
		let mut buffer = envelope::encode(Header::parse(json)?.serialize()?.as_slice())?;
		buffer.extend_from_slice(b"data");

		let mut archive = Archive::from_handle(Cursor::new(buffer))?;
		let destination = workspace.path().join("out");
		archive.extract(&destination)?;

		// the packed sibling lands on disk, the unpacked leaf does not
		assert_eq!(fs::read(destination.join("kept.txt"))?, b"data");
		assert!(!destination.join("side.bin").exists());

		Ok(())
	}

	#[test]
	fn extract_refuses_existing_destination() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let destination = workspace.path().join("occupied");
		fs::create_dir_all(&destination)?;

		let mut archive = sample_archive();
		let result = archive.extract(&destination);
		assert!(matches!(result, Err(InternalError::AlreadyExistsError(_))));

		// and nothing was written
		assert_eq!(fs::read_dir(&destination)?.count(), 0);
		Ok(())
	}

	#[test]
	fn extract_file_creates_parents_and_overwrites() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let target = workspace.path().join("fresh/dirs/c.txt");

		let mut archive = sample_archive();
		archive.extract_file("sub/c.txt", &target)?;
		assert_eq!(fs::read(&target)?, vec![b'C'; 30]);

		// an existing file at the destination is overwritten
		archive.extract_file("a.txt", &target)?;
		assert_eq!(fs::read(&target)?, vec![b'A'; 10]);

		Ok(())
	}

	#[test]
	fn replace_preserves_every_other_byte() -> InternalResult<()> {
		let mut archive = sample_archive();
		let mut patched = replace_file(&mut archive, "b.txt", b"XXXXX")?;

		// the target carries the new bytes at its old offset
		let entry = patched.header().lookup_file("b.txt")?;
		assert_eq!((entry.size, entry.offset), (5, 10));
		assert_eq!(patched.fetch("b.txt")?, b"XXXXX");

		// upstream untouched, downstream shifted by the size delta
		assert_eq!(patched.header().lookup_file("a.txt")?.offset, 0);
		assert_eq!(patched.header().lookup_file("sub/c.txt")?.offset, 15);
		assert_eq!(patched.fetch("a.txt")?, vec![b'A'; 10]);
		assert_eq!(patched.fetch("sub/c.txt")?, vec![b'C'; 30]);

		Ok(())
	}

	#[test]
	fn replace_reparses_cleanly() -> InternalResult<()> {
		// growing the target changes digit counts, so the header length and
		// baseoffset move; a fresh parse of the buffer must agree
		let mut archive = sample_archive();
		let grown = vec![b'Z'; 1000];
		let patched = replace_file(&mut archive, "a.txt", &grown)?;

		let buffer = patched.into_inner().into_inner();
		let mut reopened = Archive::from_handle(Cursor::new(buffer))?;

		assert_eq!(reopened.fetch("a.txt")?, grown);
		assert_eq!(reopened.fetch("b.txt")?, vec![b'B'; 20]);
		assert_eq!(reopened.fetch("sub/c.txt")?, vec![b'C'; 30]);
		assert_eq!(reopened.header().lookup_file("b.txt")?.offset, 1000);

		Ok(())
	}

	#[test]
	fn replace_requires_a_file_leaf() {
		let mut archive = sample_archive();

		assert!(matches!(
			replace_file(&mut archive, "missing.txt", b""),
			Err(InternalError::NotFoundError(_))
		));
		assert!(matches!(
			replace_file(&mut archive, "sub", b""),
			Err(InternalError::IsADirectoryError(_))
		));
	}

	#[test]
	fn replace_rejects_unpacked_targets() -> InternalResult<()> {
		let json = br#"{"files":{"kept.txt":{"size":4,"offset":"0"},"side.bin":{"size":9,"unpacked":true}}}"#;
		let mut buffer = envelope::encode(Header::parse(json)?.serialize()?.as_slice())?;
		buffer.extend_from_slice(b"data");

		let mut archive = Archive::from_handle(Cursor::new(buffer))?;
		assert!(matches!(
			replace_file(&mut archive, "side.bin", b"elsewhere"),
			Err(InternalError::ValidationError(_))
		));

		Ok(())
	}

	#[test]
	fn commit_replaces_destination_atomically() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let destination = workspace.path().join("target.asar");

		fs::write(&destination, b"stale")?;
		commit(b"fresh bytes", &destination)?;

		assert_eq!(fs::read(&destination)?, b"fresh bytes");
		// the temporary is gone
		assert_eq!(fs::read_dir(workspace.path())?.count(), 1);

		Ok(())
	}

	#[test]
	fn pack_writes_a_loadable_archive() -> InternalResult<()> {
		let workspace = tempfile::tempdir()?;
		let source = workspace.path().join("source");
		fs::create_dir_all(&source)?;
		fs::write(source.join("greeting.txt"), b"hello asar")?;

		let destination = workspace.path().join("app.asar");
		pack(&source, &destination)?;

		let file = fs::File::open(&destination)?;
		let mut archive = Archive::from_handle(file)?;
		assert_eq!(archive.fetch("greeting.txt")?, b"hello asar");

		Ok(())
	}
}
