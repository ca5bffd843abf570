//! Gallery Archive
//!
//! ZIP handling for image releases on top of the `zip` crate: a
//! deterministic writer for exported bundles and a reader that finds
//! images in published release archives by filename.
//!
//! # Example
//!
//! ```
//! use gallery_archive::{ArchiveReader, ArchiveWriter, Compression};
//!
//! let mut writer = ArchiveWriter::new(Compression::Stored);
//! writer.add("apple.png", b"png bytes").unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = ArchiveReader::new(&bytes).unwrap();
//! assert_eq!(reader.read_by_name("apple.png").unwrap().unwrap(), b"png bytes");
//! ```

#![warn(unreachable_pub)]

mod entry;
mod error;
mod reader;
mod writer;

pub use entry::{basename, validate_entry_name, Compression};
pub use error::ArchiveError;
pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
