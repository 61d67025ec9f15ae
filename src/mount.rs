//! Mount/unmount lifecycle: format-on-first-boot detection, layout computation, bitmap
//! load/store, and the recursive root flush at unmount.

use std::path::PathBuf;

use crate::adapter::Adapter;
use crate::bitmap::{Allocator, Bitmap};
use crate::codec::{SuperblockRecord, ROOT_INO, SUPERBLOCK_RECORD_SIZE};
use crate::dentry::{Dentry, DentryRef};
use crate::driver::BlockDriver;
use crate::error::Result;
use crate::layout::Layout;

/// The single recognized mount option: the path to the block device.
///
/// Parsing command-line arguments into this struct is the caller's job; the core only consumes
/// the resolved value.
#[derive(Debug, Clone)]
pub struct MountOptions {
	pub device: PathBuf,
}

/// An active mount: the superblock, both bitmaps, and the root dentry, plus the driver they were
/// loaded from.
///
/// Modeled as a value the caller owns rather than as global state: `mount` produces one, and
/// `unmount` consumes it, so the type system rules out a second concurrent mount in the same
/// process rather than relying on a runtime flag.
pub struct Filesystem<D: BlockDriver> {
	pub(crate) driver: D,
	pub(crate) sz_io: u64,
	pub(crate) sz_disk: u64,
	pub(crate) layout: Layout,
	pub(crate) allocator: Allocator,
	pub(crate) sz_usage: u64,
	pub(crate) root: DentryRef,
}

impl<D: BlockDriver> Filesystem<D> {
	pub(crate) fn adapter(&mut self) -> Adapter<'_, D> {
		Adapter::new(&mut self.driver, self.sz_io)
	}

	/// Root dentry of the mounted tree.
	pub fn root(&self) -> DentryRef {
		self.root.clone()
	}

	/// Mounts the filesystem over `driver`, formatting it first if it has no valid superblock.
	pub fn mount(mut driver: D) -> Result<Self> {
		let sz_disk = driver.device_size()?;
		let sz_io = driver.io_size()?;

		let root = Dentry::new_root();

		let super_blks_now = {
			// `Layout::compute` also derives `super_blks`; read-only, cheap to recompute here
			// before we know whether the device is formatted.
			Layout::compute(sz_disk, sz_io).super_blks
		};

		let sb_bytes = {
			let mut adapter = Adapter::new(&mut driver, sz_io);
			adapter.read(0, SUPERBLOCK_RECORD_SIZE as u64)?
		};

		let (layout, sb, is_init) = if SuperblockRecord::is_valid(&sb_bytes) {
			let sb = SuperblockRecord::decode(&sb_bytes)?;
			let layout = Layout::from_superblock(&sb, super_blks_now);
			(layout, sb, false)
		} else {
			let layout = Layout::compute(sz_disk, sz_io);
			(layout, layout.fresh_superblock(), true)
		};

		let inode_map_bytes = {
			let mut adapter = Adapter::new(&mut driver, sz_io);
			adapter.read(layout.map_inode_offset, layout.map_inode_blks * sz_io)?
		};
		let data_map_bytes = {
			let mut adapter = Adapter::new(&mut driver, sz_io);
			adapter.read(layout.map_data_offset, layout.map_data_blks * sz_io)?
		};

		let allocator = Allocator {
			inode_map: Bitmap::from_bytes(inode_map_bytes),
			data_map: Bitmap::from_bytes(data_map_bytes),
			max_ino: layout.max_ino,
			sz_io,
			data_offset: layout.data_offset,
		};

		let mut fs = Self {
			driver,
			sz_io,
			sz_disk,
			layout,
			allocator,
			sz_usage: sb.sz_usage as u64,
			root,
		};

		if is_init {
			let root_inode = fs.alloc_inode_for(&fs.root(), crate::codec::FileType::Dir)?;
			fs.sync_inode(&root_inode)?;
		} else {
			fs.read_inode(&fs.root(), ROOT_INO)?;
		}

		Ok(fs)
	}

	/// Flushes the reachable tree, the superblock and both bitmaps, then hands the driver back
	/// to the caller.
	///
	/// Returning `D` rather than dropping it lets a caller reuse or inspect the device after
	/// unmount (a disk-image file stays open for further tooling; an in-memory driver survives
	/// for a test to assert against). A caller with no further use for it can simply drop the
	/// returned value.
	pub fn unmount(mut self) -> Result<D> {
		let root_inode = self
			.root
			.borrow()
			.inode
			.clone()
			.expect("root inode is loaded for the lifetime of the mount");
		self.sync_inode(&root_inode)?;

		let sb = SuperblockRecord {
			magic: crate::codec::MAGIC,
			sz_usage: self.sz_usage as u32,
			max_ino: self.layout.max_ino as u32,
			map_inode_blks: self.layout.map_inode_blks as u32,
			map_inode_offset: self.layout.map_inode_offset as u32,
			map_data_blks: self.layout.map_data_blks as u32,
			map_data_offset: self.layout.map_data_offset as u32,
			inode_blks: self.layout.inode_blks as u32,
			inode_offset: self.layout.inode_offset as u32,
			data_offset: self.layout.data_offset as u32,
		};

		let map_inode_offset = self.layout.map_inode_offset;
		let map_data_offset = self.layout.map_data_offset;
		let inode_map_bytes = self.allocator.inode_map.as_bytes().to_vec();
		let data_map_bytes = self.allocator.data_map.as_bytes().to_vec();

		let mut adapter = self.adapter();
		adapter.write(0, &sb.encode())?;
		adapter.write(map_inode_offset, &inode_map_bytes)?;
		adapter.write(map_data_offset, &data_map_bytes)?;

		Ok(self.driver)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::driver::MemDriver;

	const DEVICE_SIZE: u64 = 4 * 1024 * 1024;
	const IO_SIZE: u64 = 512;

	#[test]
	fn first_boot_stamps_magic_and_remount_does_not_reformat() {
		let fs = Filesystem::mount(MemDriver::new(DEVICE_SIZE, IO_SIZE)).unwrap();
		let max_ino_before = fs.layout.max_ino;
		let driver = fs.unmount().unwrap();

		assert_eq!(
			u32::from_ne_bytes(driver.as_bytes()[0..4].try_into().unwrap()),
			crate::codec::MAGIC
		);

		let remounted = Filesystem::mount(driver).unwrap();
		assert_eq!(remounted.root.borrow().ino, ROOT_INO);
		assert_eq!(remounted.layout.max_ino, max_ino_before);
		assert_eq!(remounted.sz_usage, 0);
		remounted.unmount().unwrap();
	}

	#[test]
	fn both_bitmaps_round_trip_through_remount() {
		let mut fs = Filesystem::mount(MemDriver::new(DEVICE_SIZE, IO_SIZE)).unwrap();
		let root = fs.root();
		let root_inode = root.borrow().inode.clone().unwrap();

		let child = Dentry::new("hello", crate::codec::FileType::RegFile);
		child.borrow_mut().parent = Some(std::rc::Rc::downgrade(&root));
		fs.alloc_inode_for(&child, crate::codec::FileType::RegFile)
			.unwrap();
		fs.attach_child(&root_inode, child);

		let inode_map_before = fs.allocator.inode_map.as_bytes().to_vec();
		let data_map_before = fs.allocator.data_map.as_bytes().to_vec();
		let driver = fs.unmount().unwrap();

		let remounted = Filesystem::mount(driver).unwrap();
		assert_eq!(remounted.allocator.inode_map.as_bytes(), inode_map_before);
		assert_eq!(remounted.allocator.data_map.as_bytes(), data_map_before);
	}
}
