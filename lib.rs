//! # Shredder - Secure File Overwriting Library
//!
//! Shredder overwrites the contents of a file with pseudo-random data for a
//! configurable number of passes, optionally deleting it afterwards. It works
//! on regular files as well as block and character devices such as `/dev/sdX`.
//!
//! ## Features
//!
//! - **Block-aligned passes**: Writes in filesystem block sized chunks and
//!   rounds regular files up to the next full block
//! - **Exact mode**: Overwrite only the logical size of the file
//! - **Device support**: Special files are measured by seeking to their end
//! - **Fresh stream per run**: Every invocation is seeded from OS entropy
//!
//! ## Quick Start
//!
//! ```no_run
//! use shredder::{shred, shred_with_opts, ShredOptions, ShredRequest};
//!
//! fn main() -> Result<(), shredder::ShredError> {
//!     // Three passes, block-aligned, then delete
//!     shred("./secret.txt")?;
//!
//!     // One pass over exactly the file's bytes, keep the file
//!     let req = ShredRequest::new("./keep.txt", ShredOptions::new(1, false, true));
//!     shred_with_opts(&req)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Limits
//!
//! Shredding overwrites the addressable byte range only. It does not defeat
//! wear-leveling on flash media, does not touch directory entries or journal
//! copies, and the overwrite stream is not cryptographically unpredictable.

pub mod config;
pub mod error;
pub mod extent;
pub mod random;
pub mod shred;

// Re-export common types for convenience
pub use config::ShredOptions;
pub use error::{Result, ShredError};
pub use shred::{shred, shred_with_opts, shred_with_progress, Progress, ShredRequest};
