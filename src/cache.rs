//! The inode/dentry cache: lazy loads from disk, head-insertion child attachment, and the
//! recursive flush that serializes the whole reachable tree at unmount.

use std::cell::RefCell;
use std::rc::Rc;

use crate::codec::{DentryRecord, FileType, InodeRecord, DATA_PER_FILE};
use crate::dentry::{Dentry, DentryRef};
use crate::driver::BlockDriver;
use crate::error::Result;
use crate::inode::{Inode, InodeRef};
use crate::mount::Filesystem;

impl<D: BlockDriver> Filesystem<D> {
	/// Allocates a fresh inode of type `ftype`, binds it bidirectionally to `dentry`, and
	/// returns it. Does not write anything to disk; the caller (or a later `sync_inode`) does
	/// that.
	pub fn alloc_inode_for(&mut self, dentry: &DentryRef, ftype: FileType) -> Result<InodeRef> {
		let ino = self.allocator.alloc_inode()?;

		let data = match ftype {
			FileType::RegFile => Some(vec![0u8; (DATA_PER_FILE * self.sz_io) as usize]),
			_ => None,
		};

		let inode = Rc::new(RefCell::new(Inode {
			ino,
			size: 0,
			target_path: String::new(),
			ftype,
			dentry: Rc::downgrade(dentry),
			children: Vec::new(),
			data,
		}));

		{
			let mut d = dentry.borrow_mut();
			d.ino = ino;
			d.ftype = ftype;
			d.inode = Some(inode.clone());
		}

		Ok(inode)
	}

	/// Reads inode number `ino` from the inode table, decodes it, and binds it to `dentry`. For
	/// a directory, also loads every child dentry record from the inode's data region and
	/// attaches each one. For a regular file, loads its full data region.
	pub fn read_inode(&mut self, dentry: &DentryRef, ino: u32) -> Result<InodeRef> {
		let offset = self.layout.inode_record_offset(ino, self.sz_io);
		let rec = {
			let mut adapter = self.adapter();
			let buf = adapter.read(offset, self.sz_io)?;
			InodeRecord::decode(&buf)?
		};

		let data = if rec.ftype == FileType::RegFile {
			let data_offset = self.layout.data_region_offset(ino, self.sz_io);
			let mut adapter = self.adapter();
			Some(adapter.read(data_offset, DATA_PER_FILE * self.sz_io)?)
		} else {
			None
		};

		let inode = Rc::new(RefCell::new(Inode {
			ino: rec.ino,
			size: rec.size as u64,
			target_path: rec.target_path,
			ftype: rec.ftype,
			dentry: Rc::downgrade(dentry),
			children: Vec::new(),
			data,
		}));

		{
			let mut d = dentry.borrow_mut();
			d.ino = ino;
			d.ftype = rec.ftype;
			d.inode = Some(inode.clone());
		}

		if rec.ftype == FileType::Dir {
			let data_offset = self.layout.data_region_offset(ino, self.sz_io);
			for i in 0..rec.dir_cnt as u64 {
				let child_rec = {
					let mut adapter = self.adapter();
					let buf = adapter.read(
						data_offset + i * crate::codec::DENTRY_RECORD_SIZE as u64,
						crate::codec::DENTRY_RECORD_SIZE as u64,
					)?;
					DentryRecord::decode(&buf)?
				};
				let child = Dentry::new(child_rec.fname, child_rec.ftype);
				{
					let mut c = child.borrow_mut();
					c.ino = child_rec.ino;
					c.parent = Some(Rc::downgrade(dentry));
				}
				self.attach_child(&inode, child);
			}
		}

		Ok(inode)
	}

	/// Attaches `child_dentry` to `parent_inode`'s child list by head insertion.
	pub fn attach_child(&self, parent_inode: &InodeRef, child_dentry: DentryRef) {
		parent_inode.borrow_mut().children.insert(0, child_dentry);
	}

	/// Looks up the `index`-th child of `dir_inode`, where 0 is the most recently attached.
	pub fn get_child(&self, dir_inode: &InodeRef, index: usize) -> Option<DentryRef> {
		dir_inode.borrow().children.get(index).cloned()
	}

	/// Writes `inode`'s record to its slot in the inode table, then, for a directory, writes
	/// every child's dentry record and recurses into any child whose inode is already loaded;
	/// for a regular file, writes the data buffer. Marks every block written as used.
	pub fn sync_inode(&mut self, inode: &InodeRef) -> Result<()> {
		let (ino, ftype, size, target_path, dir_cnt, children) = {
			let i = inode.borrow();
			(
				i.ino,
				i.ftype,
				i.size,
				i.target_path.clone(),
				i.dir_cnt(),
				i.children.clone(),
			)
		};

		let rec = InodeRecord {
			ino,
			size: size as u32,
			target_path,
			dir_cnt,
			ftype,
		};
		let offset = self.layout.inode_record_offset(ino, self.sz_io);
		{
			let mut adapter = self.adapter();
			adapter.write(offset, &rec.encode())?;
		}

		match ftype {
			FileType::Dir => {
				let data_offset = self.layout.data_region_offset(ino, self.sz_io);
				for (i, child) in children.iter().enumerate() {
					let (fname, child_ftype, child_ino) = {
						let c = child.borrow();
						(c.fname.clone(), c.ftype, c.ino)
					};
					let child_rec = DentryRecord {
						fname,
						ftype: child_ftype,
						ino: child_ino,
					};
					let slot_offset =
						data_offset + i as u64 * crate::codec::DENTRY_RECORD_SIZE as u64;
					{
						let mut adapter = self.adapter();
						adapter.write(slot_offset, &child_rec.encode())?;
					}
					self.allocator.mark_data(slot_offset);

					let child_inode = child.borrow().inode.clone();
					if let Some(child_inode) = child_inode {
						self.sync_inode(&child_inode)?;
					}
				}
			}
			FileType::RegFile => {
				let data_offset = self.layout.data_region_offset(ino, self.sz_io);
				self.allocator.mark_data(data_offset);
				let data = inode.borrow().data.clone();
				if let Some(data) = data {
					let mut adapter = self.adapter();
					adapter.write(data_offset, &data)?;
				}
			}
			FileType::File | FileType::SymLink => {}
		}

		Ok(())
	}
}
