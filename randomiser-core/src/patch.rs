use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::record::{Diff, Record};
use crate::{RandomiserError, Result};

const PATCH_MAGIC: &[u8; 4] = b"FERP";
const PATCH_VERSION: u8 = 1;

/// Ordered collection of diffs gathered from every record touched by a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiffCompiler {
    diffs: Vec<Diff>,
}

impl DiffCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_diff(&mut self, diff: Diff) {
        self.diffs.push(diff);
    }

    /// Commit the record and take its outstanding diff, if any.
    pub fn add_record(&mut self, record: &mut Record) {
        record.commit();
        if let Some(diff) = record.extract_diff() {
            self.add_diff(diff);
        }
    }

    pub fn diffs(&self) -> &[Diff] {
        &self.diffs
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn changed_bytes(&self) -> usize {
        self.diffs.iter().map(Diff::len).sum()
    }

    pub fn apply(&self, base: &[u8]) -> Result<Vec<u8>> {
        apply(base, &self.diffs)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = u32::try_from(self.diffs.len())
            .map_err(|_| RandomiserError::Patch("too many diffs for patch file".to_string()))?;

        let mut raw = Vec::with_capacity(9 + self.changed_bytes() + self.diffs.len() * 8);
        raw.extend_from_slice(PATCH_MAGIC);
        raw.push(PATCH_VERSION);
        raw.extend_from_slice(&count.to_le_bytes());
        for diff in &self.diffs {
            let address = u32::try_from(diff.address).map_err(|_| {
                RandomiserError::Patch(format!("diff address 0x{:X} exceeds 32 bits", diff.address))
            })?;
            let len = u32::try_from(diff.len())
                .map_err(|_| RandomiserError::Patch("diff longer than 4 GiB".to_string()))?;
            raw.extend_from_slice(&address.to_le_bytes());
            raw.extend_from_slice(&len.to_le_bytes());
            raw.extend_from_slice(&diff.bytes);
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        Ok(encoder.finish()?)
    }

    pub fn from_bytes(compressed: &[u8]) -> Result<Self> {
        let mut decoder = GzDecoder::new(compressed);
        let mut raw = Vec::new();
        decoder.read_to_end(&mut raw)?;

        if raw.len() < 9 || &raw[0..4] != PATCH_MAGIC {
            return Err(RandomiserError::Patch("not a patch file".to_string()));
        }
        if raw[4] != PATCH_VERSION {
            return Err(RandomiserError::Patch(format!(
                "unsupported patch version {}",
                raw[4]
            )));
        }

        let count = u32::from_le_bytes([raw[5], raw[6], raw[7], raw[8]]) as usize;
        let mut diffs = Vec::with_capacity(count.min(raw.len() / 8));
        let mut offset = 9usize;
        for _ in 0..count {
            if offset + 8 > raw.len() {
                return Err(RandomiserError::Patch(
                    "patch file truncated inside a diff header".to_string(),
                ));
            }
            let address = u32::from_le_bytes([
                raw[offset],
                raw[offset + 1],
                raw[offset + 2],
                raw[offset + 3],
            ]) as usize;
            let len = u32::from_le_bytes([
                raw[offset + 4],
                raw[offset + 5],
                raw[offset + 6],
                raw[offset + 7],
            ]) as usize;
            offset += 8;

            if offset + len > raw.len() {
                return Err(RandomiserError::Patch(
                    "patch file truncated inside diff bytes".to_string(),
                ));
            }
            diffs.push(Diff::new(address, raw[offset..offset + len].to_vec()));
            offset += len;
        }

        Ok(Self { diffs })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }
}

/// Write every diff into a copy of `base` in order; later diffs win where
/// they overlap. A diff reaching past the end of the image is an error
/// since patches never change the image length.
pub fn apply(base: &[u8], diffs: &[Diff]) -> Result<Vec<u8>> {
    let mut out = base.to_vec();
    for diff in diffs {
        let end = diff
            .address
            .checked_add(diff.len())
            .filter(|&end| end <= out.len())
            .ok_or_else(|| {
                RandomiserError::Patch(format!(
                    "diff at 0x{:X} (+{}) extends beyond image of {} bytes",
                    diff.address,
                    diff.len(),
                    out.len()
                ))
            })?;
        out[diff.address..end].copy_from_slice(&diff.bytes);
    }
    Ok(out)
}
