//! Stamped filenames shared by spools and performance logs. Every file this
//! harness writes is named `<stamp>_<variant>_BatchNr:<N>_BatchSize:<S>_IntSize:<B>_<kind>.<ext>`,
//! where `<stamp>` is a local-time `YYYYMMDD_HHMMSS` prefix; "latest file in a
//! directory" selection is the lexicographic maximum of that 15-character
//! prefix.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::params::Parameters;

/// `YYYYMMDD_HHMMSS`, local time. Exactly 15 characters, so lexicographic and
/// chronological ordering of stamps agree.
#[must_use]
pub fn stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Builds `<stamp>_<variant>_BatchNr:<N>_BatchSize:<S>_IntSize:<B>_<kind>.<ext>`.
#[must_use]
pub fn stamped_filename(params: &Parameters, kind: &str, extension: &str) -> String {
    format!(
        "{stamp}_{variant}_BatchNr:{batch_count}_BatchSize:{batch_size}_IntSize:{int_bits}_{kind}.{extension}",
        stamp = stamp(),
        variant = params.variant.as_str(),
        batch_count = params.batch_count,
        batch_size = params.batch_size,
        int_bits = params.int_bits.bits(),
    )
}

/// Returns the path of the lexicographically-latest file in `dir` by its
/// leading 15-character stamp, or `None` if `dir` does not exist or holds no
/// files with a name long enough to carry a stamp.
pub fn latest_file(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    const STAMP_LEN: usize = "YYYYMMDD_HHMMSS".len();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut best: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.len() < STAMP_LEN {
            continue;
        }
        let prefix = name[..STAMP_LEN].to_string();
        let is_new_best = match &best {
            Some((best_prefix, _)) => prefix > *best_prefix,
            None => true,
        };
        if is_new_best {
            best = Some((prefix, path));
        }
    }
    Ok(best.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DataHandling, IntBits, Variant};

    #[test]
    fn stamp_is_fifteen_characters() {
        assert_eq!(stamp().len(), 15);
    }

    #[test]
    fn filename_embeds_parameters() {
        let params = Parameters {
            variant: Variant::Hhe,
            int_bits: IntBits::B32,
            batch_size: 16,
            batch_count: 4,
            data_handling: DataHandling::AllAtOnce,
        };
        let name = stamped_filename(&params, "data_kreyvium", "bin");
        assert!(name.contains("HHE"));
        assert!(name.contains("BatchNr:4"));
        assert!(name.contains("BatchSize:16"));
        assert!(name.contains("IntSize:32"));
        assert!(name.ends_with("_data_kreyvium.bin"));
    }

    #[test]
    fn latest_file_picks_lexicographic_max_prefix() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "20260101_000000_HHE_BatchNr:1_BatchSize:1_IntSize:8_data_kreyvium.bin",
            "20260102_000000_HHE_BatchNr:1_BatchSize:1_IntSize:8_data_kreyvium.bin",
            "20251231_235959_HHE_BatchNr:1_BatchSize:1_IntSize:8_data_kreyvium.bin",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let latest = latest_file(dir.path()).unwrap().unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "20260102_000000_HHE_BatchNr:1_BatchSize:1_IntSize:8_data_kreyvium.bin"
        );
    }

    #[test]
    fn missing_directory_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert_eq!(latest_file(&missing).unwrap(), None);
    }
}
