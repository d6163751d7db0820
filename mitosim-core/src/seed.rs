//! Per-run RNG seeds, read from a fixed-width binary table and extended
//! on demand so repeat invocations over the same run range stay
//! reproducible.

use std::io::Read as _;
use std::path::Path;

use crate::error::{MitosimError, Result};

/// A fixed master seed used to deterministically derive any seed table
/// entry that is missing from disk.
const MASTER_SEED: u64 = 0x5EED_1234_ABCD_EF01;

/// Reads, and lazily extends, a table of `u32` seeds (little-endian,
/// one `u32` per run index starting at 0).
#[derive(Debug, Default)]
pub struct SeedTable {
    seeds: Vec<u32>,
}

impl SeedTable {
    /// Reads `path` if it exists (treating a short or absent file as
    /// merely having fewer entries than requested, not an error).
    ///
    /// # Errors
    /// Returns [`MitosimError::InvalidSeedTable`] if the file exists but
    /// its length is not a multiple of 4 bytes, or if it cannot be read.
    pub fn read(path: &Path) -> Result<Self> {
        let Ok(mut file) = std::fs::File::open(path) else {
            return Ok(Self::default());
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| MitosimError::Io { path: path.display().to_string(), source })?;
        if bytes.len() % 4 != 0 {
            return Err(MitosimError::InvalidSeedTable {
                reason: format!(
                    "seed table `{}` length {} is not a multiple of 4 bytes",
                    path.display(),
                    bytes.len()
                ),
            });
        }
        let seeds = bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
        Ok(Self { seeds })
    }

    /// The seed for run `index`, generating and caching it from the
    /// master seed if the table does not already hold that many entries.
    pub fn seed_for(&mut self, index: usize) -> u32 {
        while self.seeds.len() <= index {
            let derived = Self::derive(MASTER_SEED, self.seeds.len());
            self.seeds.push(derived);
        }
        self.seeds[index]
    }

    /// Deterministically derives a 32-bit seed for table position `slot`
    /// from the master seed via a fixed-point splitmix-style mix.
    fn derive(master: u64, slot: usize) -> u32 {
        let mut z = master.wrapping_add((slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "only the low 32 bits of the mixed value are used, by design"
        )]
        let truncated = z as u32;
        truncated
    }

    /// Writes the current table back to `path`, little-endian, one
    /// `u32` per entry.
    ///
    /// # Errors
    /// Returns [`MitosimError::Io`] if the file cannot be written.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let mut bytes = Vec::with_capacity(self.seeds.len() * 4);
        for &seed in &self.seeds {
            bytes.extend_from_slice(&seed.to_le_bytes());
        }
        std::fs::write(path, bytes)
            .map_err(|source| MitosimError::Io { path: path.display().to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_starts_an_empty_table() {
        let table = SeedTable::read(Path::new("/nonexistent/seeds.bin")).unwrap();
        assert_eq!(table.seeds.len(), 0);
    }

    #[test]
    fn seed_for_extends_and_is_stable_across_repeats() {
        let mut table = SeedTable::default();
        let first = table.seed_for(3);
        let second = table.seed_for(3);
        assert_eq!(first, second);
        assert_eq!(table.seeds.len(), 4);
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.bin");

        let mut table = SeedTable::default();
        let seeds: Vec<u32> = (0..5).map(|i| table.seed_for(i)).collect();
        table.persist(&path).unwrap();

        let mut reread = SeedTable::read(&path).unwrap();
        let reread_seeds: Vec<u32> = (0..5).map(|i| reread.seed_for(i)).collect();
        assert_eq!(seeds, reread_seeds);
    }

    #[test]
    fn truncated_file_is_a_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.bin");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();
        let err = SeedTable::read(&path).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidSeedTable);
    }
}
