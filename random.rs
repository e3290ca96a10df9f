//! Overwrite stream generation.
//!
//! [`RandomSource`] seeds a fast non-cryptographic generator from 8 bytes
//! of OS entropy. Every shred invocation gets a fresh seed, so shredding the
//! same file twice writes different content, while all passes of a single
//! invocation continue the same stream.
//!
//! The output is not cryptographically unpredictable: 64 bits of entropy
//! drive the whole stream. That keeps overwrite throughput bound by the disk
//! rather than by the generator.

use crate::error::{Result, ShredError};
use rand::rngs::SmallRng;
use rand_core::{RngCore, SeedableRng};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use zeroize::Zeroize;

/// Entropy device read on unix platforms
pub const ENTROPY_DEVICE: &str = "/dev/urandom";

/// Bytes of entropy folded into the seed
pub const SEED_LEN: usize = 8;

pub struct RandomSource {
    rng: SmallRng,
}

impl RandomSource {
    /// Seed from the platform entropy source.
    #[cfg(unix)]
    pub fn new() -> Result<Self> {
        Self::from_entropy_device(ENTROPY_DEVICE)
    }

    /// Seed from the platform entropy source.
    #[cfg(not(unix))]
    pub fn new() -> Result<Self> {
        use rand_core::OsRng;

        let mut seed = [0u8; SEED_LEN];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| ShredError::entropy("OS RNG", io::Error::new(io::ErrorKind::Other, e)))?;
        Ok(Self::from_seed_bytes(seed))
    }

    /// Seed from an entropy device such as `/dev/urandom`.
    pub fn from_entropy_device(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mut device = File::open(path).map_err(|e| ShredError::entropy(&name, e))?;
        Self::read_seed(&mut device, &name)
    }

    /// Seed from any reader. A single read must yield all [`SEED_LEN`] bytes.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        Self::read_seed(reader, "reader")
    }

    /// Deterministic stream, for callers that supply their own seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Fill `buf` with the next bytes of the stream.
    pub fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }

    fn read_seed<R: Read>(reader: &mut R, name: &str) -> Result<Self> {
        let mut seed = [0u8; SEED_LEN];
        let n = reader
            .read(&mut seed)
            .map_err(|e| ShredError::entropy(name, e))?;
        if n != SEED_LEN {
            seed.zeroize();
            return Err(ShredError::entropy(
                name,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("unexpected number of bytes read ({n} bytes)"),
                ),
            ));
        }
        debug!(source = name, "seeded overwrite stream");
        Ok(Self::from_seed_bytes(seed))
    }

    fn from_seed_bytes(mut seed: [u8; SEED_LEN]) -> Self {
        let source = Self::from_seed(u64::from_be_bytes(seed));
        seed.zeroize();
        source
    }
}
