//! The in-memory inode: file metadata plus, for a loaded directory, its children and, for a
//! loaded regular file, its data buffer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::codec::FileType;
use crate::dentry::{Dentry, DentryRef};

/// Shared, mutable handle to an [`Inode`].
pub type InodeRef = Rc<RefCell<Inode>>;

/// An inode: metadata for one filesystem object.
pub struct Inode {
	pub ino: u32,
	pub size: u64,
	pub target_path: String,
	pub ftype: FileType,
	/// Non-owning back-link to the dentry that owns this inode.
	pub dentry: Weak<RefCell<Dentry>>,
	/// Owned child dentries, directories only. Index 0 is the most recently attached child:
	/// `attach_child` inserts at the front, so sibling order is the reverse of creation order.
	pub children: Vec<DentryRef>,
	/// Owned data buffer, regular files only, sized `DATA_PER_FILE * sz_io`.
	pub data: Option<Vec<u8>>,
}

impl Inode {
	/// The number of children currently attached; kept in lock-step with `children.len()` and
	/// persisted as `dir_cnt`.
	pub fn dir_cnt(&self) -> u32 {
		self.children.len() as u32
	}
}
