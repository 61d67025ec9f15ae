//! Fixed on-disk layout of the three persisted record shapes.
//!
//! Byte order is native; the records are encoded/decoded with explicit `to_ne_bytes`/
//! `from_ne_bytes` calls rather than a raw-pointer cast, so the layout is exact without
//! relying on the platform's struct padding rules.

use crate::error::{Error, Result};

/// Magic number stamped in the superblock once the device has been formatted.
pub const MAGIC: u32 = 0x1234_5678;

/// Maximum number of data blocks a regular file may span.
pub const DATA_PER_FILE: u64 = 6;

/// Size in bytes of a fixed filename/symlink-target buffer.
pub const MAX_NAME_LEN: usize = 128;

/// The inode number of the root directory.
pub const ROOT_INO: u32 = 0;

/// Size in bytes of the encoded superblock record.
pub const SUPERBLOCK_RECORD_SIZE: usize = 10 * 4;

/// Size in bytes of the encoded inode record.
pub const INODE_RECORD_SIZE: usize = 4 + 4 + MAX_NAME_LEN + 4 + 4;

/// Size in bytes of the encoded dentry record.
pub const DENTRY_RECORD_SIZE: usize = MAX_NAME_LEN + 4 + 4;

/// The type of file a dentry/inode refers to.
///
/// The numeric values are part of the on-disk format and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
	/// Unused / unspecified.
	File = 0,
	/// A directory, holding a contiguous run of dentry records.
	Dir = 1,
	/// A regular file, holding up to `DATA_PER_FILE` blocks of data.
	RegFile = 2,
	/// A symbolic link; its target is stored in the inode's `target_path`.
	SymLink = 3,
}

impl FileType {
	fn from_u32(v: u32) -> Result<Self> {
		match v {
			0 => Ok(Self::File),
			1 => Ok(Self::Dir),
			2 => Ok(Self::RegFile),
			3 => Ok(Self::SymLink),
			_ => Err(Error::Inval),
		}
	}
}

/// Copies `src` into a zero-padded, fixed-size `len`-byte buffer, truncating if necessary.
fn pad_name(src: &str, len: usize) -> Vec<u8> {
	let mut buf = vec![0u8; len];
	let bytes = src.as_bytes();
	let n = bytes.len().min(len);
	buf[..n].copy_from_slice(&bytes[..n]);
	buf
}

/// Reads a zero-padded fixed-size name buffer back into a `String`, stopping at the first NUL
/// or the end of the buffer, whichever comes first.
fn unpad_name(buf: &[u8]) -> String {
	let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
	String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// The persisted superblock: on-disk layout offsets and block counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperblockRecord {
	pub magic: u32,
	pub sz_usage: u32,
	pub max_ino: u32,
	pub map_inode_blks: u32,
	pub map_inode_offset: u32,
	pub map_data_blks: u32,
	pub map_data_offset: u32,
	pub inode_blks: u32,
	pub inode_offset: u32,
	pub data_offset: u32,
}

impl SuperblockRecord {
	/// Tells whether `buf` starts with a valid superblock magic number.
	pub fn is_valid(buf: &[u8]) -> bool {
		buf.len() >= 4 && u32::from_ne_bytes(buf[0..4].try_into().unwrap()) == MAGIC
	}

	pub fn encode(&self) -> [u8; SUPERBLOCK_RECORD_SIZE] {
		let mut buf = [0u8; SUPERBLOCK_RECORD_SIZE];
		let fields = [
			self.magic,
			self.sz_usage,
			self.max_ino,
			self.map_inode_blks,
			self.map_inode_offset,
			self.map_data_blks,
			self.map_data_offset,
			self.inode_blks,
			self.inode_offset,
			self.data_offset,
		];
		for (i, field) in fields.iter().enumerate() {
			buf[i * 4..i * 4 + 4].copy_from_slice(&field.to_ne_bytes());
		}
		buf
	}

	pub fn decode(buf: &[u8]) -> Result<Self> {
		if buf.len() < SUPERBLOCK_RECORD_SIZE {
			return Err(Error::Inval);
		}
		let read = |i: usize| u32::from_ne_bytes(buf[i * 4..i * 4 + 4].try_into().unwrap());
		Ok(Self {
			magic: read(0),
			sz_usage: read(1),
			max_ino: read(2),
			map_inode_blks: read(3),
			map_inode_offset: read(4),
			map_data_blks: read(5),
			map_data_offset: read(6),
			inode_blks: read(7),
			inode_offset: read(8),
			data_offset: read(9),
		})
	}
}

/// The persisted inode record: one block per inode.
#[derive(Debug, Clone)]
pub struct InodeRecord {
	pub ino: u32,
	pub size: u32,
	pub target_path: String,
	pub dir_cnt: u32,
	pub ftype: FileType,
}

impl InodeRecord {
	pub fn encode(&self) -> Vec<u8> {
		let mut buf = Vec::with_capacity(INODE_RECORD_SIZE);
		buf.extend_from_slice(&self.ino.to_ne_bytes());
		buf.extend_from_slice(&self.size.to_ne_bytes());
		buf.extend_from_slice(&pad_name(&self.target_path, MAX_NAME_LEN));
		buf.extend_from_slice(&self.dir_cnt.to_ne_bytes());
		buf.extend_from_slice(&(self.ftype as u32).to_ne_bytes());
		buf
	}

	pub fn decode(buf: &[u8]) -> Result<Self> {
		if buf.len() < INODE_RECORD_SIZE {
			return Err(Error::Inval);
		}
		let ino = u32::from_ne_bytes(buf[0..4].try_into().unwrap());
		let size = u32::from_ne_bytes(buf[4..8].try_into().unwrap());
		let target_path = unpad_name(&buf[8..8 + MAX_NAME_LEN]);
		let tail = 8 + MAX_NAME_LEN;
		let dir_cnt = u32::from_ne_bytes(buf[tail..tail + 4].try_into().unwrap());
		let ftype = FileType::from_u32(u32::from_ne_bytes(
			buf[tail + 4..tail + 8].try_into().unwrap(),
		))?;
		Ok(Self {
			ino,
			size,
			target_path,
			dir_cnt,
			ftype,
		})
	}
}

/// The persisted dentry record: a filename, its type and the inode it refers to.
#[derive(Debug, Clone)]
pub struct DentryRecord {
	pub fname: String,
	pub ftype: FileType,
	pub ino: u32,
}

impl DentryRecord {
	pub fn encode(&self) -> Vec<u8> {
		let mut buf = Vec::with_capacity(DENTRY_RECORD_SIZE);
		buf.extend_from_slice(&pad_name(&self.fname, MAX_NAME_LEN));
		buf.extend_from_slice(&(self.ftype as u32).to_ne_bytes());
		buf.extend_from_slice(&self.ino.to_ne_bytes());
		buf
	}

	pub fn decode(buf: &[u8]) -> Result<Self> {
		if buf.len() < DENTRY_RECORD_SIZE {
			return Err(Error::Inval);
		}
		let fname = unpad_name(&buf[0..MAX_NAME_LEN]);
		let ftype = FileType::from_u32(u32::from_ne_bytes(
			buf[MAX_NAME_LEN..MAX_NAME_LEN + 4].try_into().unwrap(),
		))?;
		let ino = u32::from_ne_bytes(
			buf[MAX_NAME_LEN + 4..MAX_NAME_LEN + 8]
				.try_into()
				.unwrap(),
		);
		Ok(Self { fname, ftype, ino })
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn superblock_roundtrip() {
		let sb = SuperblockRecord {
			magic: MAGIC,
			sz_usage: 0,
			max_ino: 10,
			map_inode_blks: 1,
			map_inode_offset: 512,
			map_data_blks: 1,
			map_data_offset: 1024,
			inode_blks: 10,
			inode_offset: 1536,
			data_offset: 6656,
		};
		let buf = sb.encode();
		assert!(SuperblockRecord::is_valid(&buf));
		assert_eq!(SuperblockRecord::decode(&buf).unwrap(), sb);
	}

	#[test]
	fn invalid_magic_is_rejected() {
		let buf = [0u8; SUPERBLOCK_RECORD_SIZE];
		assert!(!SuperblockRecord::is_valid(&buf));
	}

	#[test]
	fn inode_record_roundtrip_and_padding() {
		let rec = InodeRecord {
			ino: 3,
			size: 42,
			target_path: String::new(),
			dir_cnt: 0,
			ftype: FileType::RegFile,
		};
		let buf = rec.encode();
		assert_eq!(buf.len(), INODE_RECORD_SIZE);
		assert!(buf[8..8 + MAX_NAME_LEN].iter().all(|&b| b == 0));
		let back = InodeRecord::decode(&buf).unwrap();
		assert_eq!(back.ino, 3);
		assert_eq!(back.size, 42);
		assert_eq!(back.target_path, "");
		assert_eq!(back.ftype, FileType::RegFile);
	}

	#[test]
	fn dentry_record_roundtrip() {
		let rec = DentryRecord {
			fname: "hello".to_string(),
			ftype: FileType::RegFile,
			ino: 1,
		};
		let buf = rec.encode();
		assert_eq!(buf.len(), DENTRY_RECORD_SIZE);
		let back = DentryRecord::decode(&buf).unwrap();
		assert_eq!(back.fname, "hello");
		assert_eq!(back.ino, 1);
		assert_eq!(back.ftype, FileType::RegFile);
	}
}
