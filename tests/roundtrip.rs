//! End-to-end mount/unmount scenarios against an in-memory device.

use newfs::{FileType, Filesystem, MemDriver};

const DEVICE_SIZE: u64 = 4 * 1024 * 1024;
const IO_SIZE: u64 = 512;

#[test]
fn first_boot_format_and_unmount_succeed() {
	let driver = MemDriver::new(DEVICE_SIZE, IO_SIZE);
	let fs = Filesystem::mount(driver).unwrap();
	fs.unmount().unwrap();
}

#[test]
fn root_persists_across_remount() {
	let driver = MemDriver::new(DEVICE_SIZE, IO_SIZE);
	let fs = Filesystem::mount(driver).unwrap();
	let root = fs.root();
	assert_eq!(root.borrow().ino, 0);
	fs.unmount().unwrap();
}

#[test]
fn create_and_lookup_child() {
	let driver = MemDriver::new(DEVICE_SIZE, IO_SIZE);
	let mut fs = Filesystem::mount(driver).unwrap();

	let root = fs.root();
	let root_inode = root.borrow().inode.clone().unwrap();

	let child = newfs::Dentry::new("hello", FileType::RegFile);
	child.borrow_mut().parent = Some(std::rc::Rc::downgrade(&root));
	let _child_inode = fs.alloc_inode_for(&child, FileType::RegFile).unwrap();
	fs.attach_child(&root_inode, child);

	let result = fs.lookup("/hello").unwrap();
	assert!(result.found);
	assert_eq!(result.dentry.borrow().ino, 1);
	assert_eq!(result.dentry.borrow().ftype, FileType::RegFile);
}

#[test]
fn lookup_missing_path_returns_root() {
	let driver = MemDriver::new(DEVICE_SIZE, IO_SIZE);
	let mut fs = Filesystem::mount(driver).unwrap();

	let result = fs.lookup("/nope").unwrap();
	assert!(!result.found);
	assert!(!result.is_root);
	assert_eq!(result.dentry.borrow().fname, "/");
}

#[test]
fn lookup_through_regular_file_misses() {
	let driver = MemDriver::new(DEVICE_SIZE, IO_SIZE);
	let mut fs = Filesystem::mount(driver).unwrap();

	let root = fs.root();
	let root_inode = root.borrow().inode.clone().unwrap();

	let child = newfs::Dentry::new("hello", FileType::RegFile);
	child.borrow_mut().parent = Some(std::rc::Rc::downgrade(&root));
	fs.alloc_inode_for(&child, FileType::RegFile).unwrap();
	fs.attach_child(&root_inode, child);

	let result = fs.lookup("/hello/x").unwrap();
	assert!(!result.found);
	assert_eq!(result.dentry.borrow().fname, "hello");
}

#[test]
fn capacity_exhaustion_fails_allocation() {
	// Sized so `max_ino == 4`: mount's own root allocation consumes one slot, leaving exactly
	// three successful `alloc_inode_for` calls before the fourth hits `NoSpace`, matching the
	// capacity scenario.
	const CAPACITY_DEVICE_SIZE: u64 = 25088;
	let driver = MemDriver::new(CAPACITY_DEVICE_SIZE, IO_SIZE);
	let mut fs = Filesystem::mount(driver).unwrap();

	let root = fs.root();
	let mut allocated = 0;
	loop {
		let child = newfs::Dentry::new(format!("f{allocated}"), FileType::RegFile);
		child.borrow_mut().parent = Some(std::rc::Rc::downgrade(&root));
		match fs.alloc_inode_for(&child, FileType::RegFile) {
			Ok(_) => allocated += 1,
			Err(newfs::Error::NoSpace) => break,
			Err(e) => panic!("unexpected error: {e}"),
		}
		if allocated > 10_000 {
			panic!("allocation never exhausted capacity");
		}
	}
	assert_eq!(allocated, 3);
}
