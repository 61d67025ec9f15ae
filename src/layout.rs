//! Derives the on-disk region layout from raw device geometry.
//!
//! The formulas here are deliberately literal translations of the original design rather than
//! "corrected" ext-style block-group math: an inode bitmap sized by rounding the inode count up
//! to a 32-bit boundary and then, again, up to a block boundary, without ever multiplying by the
//! 4 bytes a 32-bit word actually occupies. That is unusual for a production filesystem, but it
//! is self-consistent (format and mount both apply the same formula) and this crate preserves it
//! rather than inventing a different, "more correct" layout the rest of the test suite couldn't
//! verify against anything.

use crate::codec::{SuperblockRecord, DATA_PER_FILE, MAGIC, SUPERBLOCK_RECORD_SIZE};
use crate::util::ceil_division;

/// Number of bits in the word size the bitmap granularity is expressed in.
const BITMAP_WORD_BITS: u64 = 32;

/// The computed on-disk region layout for a given device geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
	pub super_blks: u64,
	pub map_inode_blks: u64,
	pub map_inode_offset: u64,
	pub map_data_blks: u64,
	pub map_data_offset: u64,
	pub inode_blks: u64,
	pub inode_offset: u64,
	pub data_offset: u64,
	pub max_ino: u64,
}

impl Layout {
	/// Computes the layout for a freshly formatted device of `sz_disk` bytes with I/O unit
	/// `sz_io`.
	pub fn compute(sz_disk: u64, sz_io: u64) -> Self {
		let super_blks = ceil_division(SUPERBLOCK_RECORD_SIZE as u64, sz_io);

		let inode_num = sz_disk / ((DATA_PER_FILE + 1) * sz_io);
		let map_inode_blks = ceil_division(ceil_division(inode_num, BITMAP_WORD_BITS), sz_io);

		let data_blks_num = sz_disk / sz_io;
		let map_data_blks = ceil_division(ceil_division(data_blks_num, BITMAP_WORD_BITS), sz_io);

		let map_inode_offset = super_blks * sz_io;
		let map_data_offset = map_inode_offset + map_inode_blks * sz_io;
		let inode_blks = inode_num;
		let inode_offset = map_data_offset + map_data_blks * sz_io;
		let data_offset = inode_offset + inode_blks * sz_io;

		let max_ino = inode_num - super_blks - map_inode_blks - map_data_blks;

		Self {
			super_blks,
			map_inode_blks,
			map_inode_offset,
			map_data_blks,
			map_data_offset,
			inode_blks,
			inode_offset,
			data_offset,
			max_ino,
		}
	}

	/// Builds the persisted superblock record for a freshly formatted device.
	pub fn fresh_superblock(&self) -> SuperblockRecord {
		SuperblockRecord {
			magic: MAGIC,
			sz_usage: 0,
			max_ino: self.max_ino as u32,
			map_inode_blks: self.map_inode_blks as u32,
			map_inode_offset: self.map_inode_offset as u32,
			map_data_blks: self.map_data_blks as u32,
			map_data_offset: self.map_data_offset as u32,
			inode_blks: self.inode_blks as u32,
			inode_offset: self.inode_offset as u32,
			data_offset: self.data_offset as u32,
		}
	}

	/// Reconstructs a layout from a superblock record read back from disk.
	pub fn from_superblock(sb: &SuperblockRecord, super_blks: u64) -> Self {
		Self {
			super_blks,
			map_inode_blks: sb.map_inode_blks as u64,
			map_inode_offset: sb.map_inode_offset as u64,
			map_data_blks: sb.map_data_blks as u64,
			map_data_offset: sb.map_data_offset as u64,
			inode_blks: sb.inode_blks as u64,
			inode_offset: sb.inode_offset as u64,
			data_offset: sb.data_offset as u64,
			max_ino: sb.max_ino as u64,
		}
	}

	/// Byte offset of the inode record for inode number `ino`.
	pub fn inode_record_offset(&self, ino: u32, sz_io: u64) -> u64 {
		self.inode_offset + ino as u64 * sz_io
	}

	/// Byte offset of the start of the data region belonging to inode number `ino`.
	pub fn data_region_offset(&self, ino: u32, sz_io: u64) -> u64 {
		self.data_offset + ino as u64 * DATA_PER_FILE * sz_io
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn layout_is_monotonically_increasing() {
		let layout = Layout::compute(4 * 1024 * 1024, 512);
		assert!(layout.map_inode_offset >= layout.super_blks * 512);
		assert!(layout.map_data_offset >= layout.map_inode_offset);
		assert!(layout.inode_offset >= layout.map_data_offset);
		assert!(layout.data_offset >= layout.inode_offset);
		assert!(layout.max_ino > 0);
	}

	#[test]
	fn superblock_roundtrips_through_layout() {
		let layout = Layout::compute(4 * 1024 * 1024, 512);
		let sb = layout.fresh_superblock();
		let rebuilt = Layout::from_superblock(&sb, layout.super_blks);
		assert_eq!(layout, rebuilt);
	}
}
