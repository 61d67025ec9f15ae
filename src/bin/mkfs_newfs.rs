//! The `mkfs-newfs` tool formats a device file with a fresh filesystem.
//!
//! It owns no core logic: it opens the device, hands it to [`newfs::Filesystem::mount`] (which
//! formats on first boot) and immediately unmounts, flushing the fresh superblock and bitmaps.

use std::env;
use std::path::PathBuf;
use std::process::exit;

use newfs::{FileDriver, Filesystem};

/// Command-line arguments understood by this binary.
struct Args {
	prog: String,
	device_path: Option<PathBuf>,
	/// Forces the I/O unit size, for plain regular files standing in for a block device.
	io_size: Option<u64>,
}

fn parse_args() -> Args {
	let mut iter = env::args();
	let prog = iter.next().unwrap_or_else(|| "mkfs-newfs".to_owned());
	let mut device_path = None;
	let mut io_size = None;

	while let Some(arg) = iter.next() {
		match arg.as_str() {
			"--io-size" => {
				io_size = iter
					.next()
					.and_then(|v| v.parse().ok())
					.or(io_size);
			}
			_ => device_path = Some(PathBuf::from(arg)),
		}
	}

	Args {
		prog,
		device_path,
		io_size,
	}
}

fn main() {
	let args = parse_args();

	let device_path = args.device_path.unwrap_or_else(|| {
		eprintln!("{}: specify path to a device", args.prog);
		exit(1);
	});

	let driver = match args.io_size {
		Some(sz) => FileDriver::open_with_io_size(&device_path, sz),
		None => FileDriver::open(&device_path),
	}
	.unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, device_path.display(), e);
		exit(1);
	});

	let fs = Filesystem::mount(driver).unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, device_path.display(), e);
		exit(1);
	});

	fs.unmount().unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, device_path.display(), e);
		exit(1);
	});

	println!("{}: filesystem ready on {}", args.prog, device_path.display());
}
