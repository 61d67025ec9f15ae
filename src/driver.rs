//! The block-driver seam: the opaque device the core is handed at mount time.
//!
//! The core never opens a device itself and never assumes anything about what is behind it; it
//! only calls `device_size`/`io_size` once at mount and then moves whole blocks in and out
//! through `read_block`/`write_block`. Two implementations are provided: [`FileDriver`], for a
//! real block device or a disk-image file, and [`MemDriver`], an in-memory stand-in used by the
//! test suite.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use crate::error::{Error, Result};

/// The contract the core relies on to talk to a block device.
///
/// `device_size` and `io_size` are queried once, at mount; `read_block`/`write_block` move
/// exactly one `io_size()`-sized block, addressed by its zero-based index.
pub trait BlockDriver {
	/// Total size of the device in bytes.
	fn device_size(&mut self) -> Result<u64>;

	/// The device's atomic transfer size, in bytes.
	fn io_size(&mut self) -> Result<u64>;

	/// Reads the block at `index` into `buf`. `buf.len()` is always `io_size()`.
	fn read_block(&mut self, index: u64, buf: &mut [u8]) -> Result<()>;

	/// Writes `buf` to the block at `index`. `buf.len()` is always `io_size()`.
	fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()>;
}

/// ioctl macro: command.
macro_rules! ioc {
	($a:expr, $b:expr, $c:expr, $d:expr) => {
		(($a) << 30) | (($b) << 8) | ($c) | (($d) << 16)
	};
}

/// ioctl macro: read command.
macro_rules! ior {
	($a:expr, $b:expr, $c:ty) => {
		ioc!(2i64, $a, $b, std::mem::size_of::<$c>() as i64)
	};
}

/// ioctl command: get the size of a block device, in bytes (despite the "SIZE64" name, this
/// does not return a sector count).
const BLKGETSIZE64: i64 = ior!(0x12, 114, u64);
/// ioctl command: get the logical block size of a block device, in bytes.
const BLKSSZGET: i64 = ior!(0x12, 104, i32);

/// A [`BlockDriver`] backed by a real file: either an actual block device or a plain regular
/// file used to hold a disk image.
pub struct FileDriver {
	file: File,
	/// Overrides the queried I/O unit size; set when the backing file is a plain regular file,
	/// which has no logical sector size of its own to query.
	forced_io_size: Option<u64>,
}

impl FileDriver {
	/// Opens `path` for reading and writing, querying the device's own I/O unit size via ioctl.
	///
	/// Use this for an actual block device (e.g. `/dev/sdb`).
	pub fn open(path: &Path) -> Result<Self> {
		let file = File::options().read(true).write(true).open(path)?;
		Ok(Self {
			file,
			forced_io_size: None,
		})
	}

	/// Opens `path` for reading and writing, using `io_size` as the I/O unit size rather than
	/// querying it.
	///
	/// Use this for a plain regular file standing in for a disk image.
	pub fn open_with_io_size(path: &Path, io_size: u64) -> Result<Self> {
		let file = File::options().read(true).write(true).open(path)?;
		Ok(Self {
			file,
			forced_io_size: Some(io_size),
		})
	}
}

impl BlockDriver for FileDriver {
	fn device_size(&mut self) -> Result<u64> {
		let metadata = self.file.metadata()?;
		if metadata.file_type().is_block_device() {
			let mut bytes: u64 = 0;
			let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), BLKGETSIZE64 as _, &mut bytes) };
			if ret < 0 {
				return Err(Error::Io(std::io::Error::last_os_error()));
			}
			Ok(bytes)
		} else {
			Ok(metadata.len())
		}
	}

	fn io_size(&mut self) -> Result<u64> {
		if let Some(sz) = self.forced_io_size {
			return Ok(sz);
		}
		let metadata = self.file.metadata()?;
		if metadata.file_type().is_block_device() {
			let mut sz: i32 = 0;
			let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), BLKSSZGET as _, &mut sz) };
			if ret < 0 {
				return Err(Error::Io(std::io::Error::last_os_error()));
			}
			Ok(sz as u64)
		} else {
			Ok(512)
		}
	}

	fn read_block(&mut self, index: u64, buf: &mut [u8]) -> Result<()> {
		self.file.seek(SeekFrom::Start(index * buf.len() as u64))?;
		self.file.read_exact(buf)?;
		Ok(())
	}

	fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()> {
		self.file.seek(SeekFrom::Start(index * buf.len() as u64))?;
		self.file.write_all(buf)?;
		Ok(())
	}
}

/// A [`BlockDriver`] backed by a `Vec<u8>`, for use in tests.
pub struct MemDriver {
	bytes: Vec<u8>,
	io_size: u64,
}

impl MemDriver {
	/// Creates a zeroed device of `size` bytes with the given I/O unit size.
	pub fn new(size: u64, io_size: u64) -> Self {
		Self {
			bytes: vec![0u8; size as usize],
			io_size,
		}
	}

	/// Returns the raw backing bytes, for assertions in tests.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}
}

impl BlockDriver for MemDriver {
	fn device_size(&mut self) -> Result<u64> {
		Ok(self.bytes.len() as u64)
	}

	fn io_size(&mut self) -> Result<u64> {
		Ok(self.io_size)
	}

	fn read_block(&mut self, index: u64, buf: &mut [u8]) -> Result<()> {
		let off = (index * buf.len() as u64) as usize;
		let end = off + buf.len();
		if end > self.bytes.len() {
			return Err(Error::Seek);
		}
		buf.copy_from_slice(&self.bytes[off..end]);
		Ok(())
	}

	fn write_block(&mut self, index: u64, buf: &[u8]) -> Result<()> {
		let off = (index * buf.len() as u64) as usize;
		let end = off + buf.len();
		if end > self.bytes.len() {
			return Err(Error::Seek);
		}
		self.bytes[off..end].copy_from_slice(buf);
		Ok(())
	}
}
