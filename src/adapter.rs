//! The block-driver adapter: turns the block-granular [`BlockDriver`] into byte-addressed,
//! arbitrary-size reads and writes, hiding alignment from the rest of the core.

use crate::driver::BlockDriver;
use crate::error::Result;
use crate::util::{round_down, round_up};

/// Wraps a `BlockDriver` with the alignment logic needed to read/write at arbitrary byte
/// offsets and sizes.
///
/// Built fresh around a `&mut D` for the duration of a single call; it holds no state of its
/// own beyond the block size.
pub(crate) struct Adapter<'d, D: BlockDriver> {
	driver: &'d mut D,
	sz_io: u64,
}

impl<'d, D: BlockDriver> Adapter<'d, D> {
	pub(crate) fn new(driver: &'d mut D, sz_io: u64) -> Self {
		Self { driver, sz_io }
	}

	/// Reads `size` bytes starting at `offset`, regardless of block alignment.
	pub(crate) fn read(&mut self, offset: u64, size: u64) -> Result<Vec<u8>> {
		let aligned_offset = round_down(offset, self.sz_io);
		let bias = offset - aligned_offset;
		let aligned_size = round_up(size + bias, self.sz_io);

		let mut buf = vec![0u8; aligned_size as usize];
		let mut block = vec![0u8; self.sz_io as usize];
		let mut index = aligned_offset / self.sz_io;
		for chunk in buf.chunks_mut(self.sz_io as usize) {
			self.driver.read_block(index, &mut block)?;
			chunk.copy_from_slice(&block);
			index += 1;
		}

		Ok(buf[bias as usize..(bias + size) as usize].to_vec())
	}

	/// Writes `content` at `offset`, regardless of block alignment.
	///
	/// When `offset`/`content.len()` do not land on block boundaries, this performs a
	/// read-modify-write of the whole aligned span.
	pub(crate) fn write(&mut self, offset: u64, content: &[u8]) -> Result<()> {
		let aligned_offset = round_down(offset, self.sz_io);
		let bias = offset - aligned_offset;
		let aligned_size = round_up(content.len() as u64 + bias, self.sz_io);

		let mut buf = self.read(aligned_offset, aligned_size)?;
		buf[bias as usize..bias as usize + content.len()].copy_from_slice(content);

		let mut index = aligned_offset / self.sz_io;
		for chunk in buf.chunks(self.sz_io as usize) {
			self.driver.write_block(index, chunk)?;
			index += 1;
		}

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::driver::MemDriver;

	#[test]
	fn aligned_roundtrip() {
		let mut driver = MemDriver::new(4096, 512);
		{
			let mut adapter = Adapter::new(&mut driver, 512);
			adapter.write(512, b"hello").unwrap();
			let got = adapter.read(512, 5).unwrap();
			assert_eq!(&got, b"hello");
		}
	}

	#[test]
	fn unaligned_roundtrip_preserves_surrounding_bytes() {
		let mut driver = MemDriver::new(4096, 512);
		{
			let mut adapter = Adapter::new(&mut driver, 512);
			adapter.write(0, &[0xaa; 512]).unwrap();
			// write into the middle of a block, should not disturb the rest.
			adapter.write(100, b"mid").unwrap();
			let got = adapter.read(0, 512).unwrap();
			assert_eq!(&got[0..100], &[0xaa; 100]);
			assert_eq!(&got[100..103], b"mid");
			assert_eq!(&got[103..512], &[0xaa; 512 - 103]);
		}
	}

	#[test]
	fn crosses_block_boundary() {
		let mut driver = MemDriver::new(4096, 512);
		{
			let mut adapter = Adapter::new(&mut driver, 512);
			let content = vec![0x42u8; 600];
			adapter.write(300, &content).unwrap();
			let got = adapter.read(300, 600).unwrap();
			assert_eq!(got, content);
		}
	}
}
