//! Keypair file loading (Solana CLI JSON byte-array format).

use std::path::{Path, PathBuf};

use solana_keypair::Keypair;
use thiserror::Error;

/// Keypair file errors.
#[derive(Debug, Error)]
pub enum KeyFileError {
    /// File is missing, unreadable, or does not hold a valid keypair.
    #[error("failed to load keypair file {path}: {message}")]
    Load {
        /// File path.
        path: PathBuf,
        /// Loader error text.
        message: String,
    },
}

/// Reads a keypair stored as a JSON array of 64 bytes.
///
/// # Errors
///
/// Returns [`KeyFileError::Load`] when the file cannot be read or does not hold a valid
/// keypair.
pub fn read_keypair_file(path: impl AsRef<Path>) -> Result<Keypair, KeyFileError> {
    let path = path.as_ref();
    solana_keypair::read_keypair_file(path).map_err(|error| KeyFileError::Load {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use solana_signer::Signer;

    use super::*;

    fn write_temp(contents: &str) -> Option<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new().ok()?;
        file.write_all(contents.as_bytes()).ok()?;
        Some(file)
    }

    #[test]
    fn reads_cli_formatted_keypair() {
        let keypair = Keypair::new();
        let encoded = serde_json::to_string(&keypair.to_bytes().to_vec());
        assert!(encoded.is_ok());
        let file = encoded.ok().and_then(|encoded| write_temp(&encoded));
        assert!(file.is_some());
        if let Some(file) = file {
            let loaded = read_keypair_file(file.path());
            assert!(loaded.is_ok());
            if let Ok(loaded) = loaded {
                assert_eq!(loaded.pubkey(), keypair.pubkey());
            }
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let file = write_temp("[1, 2, 3]");
        assert!(file.is_some());
        if let Some(file) = file {
            let loaded = read_keypair_file(file.path());
            assert!(matches!(loaded, Err(KeyFileError::Load { .. })));
            if let Err(error) = loaded {
                assert!(error.to_string().contains(&file.path().display().to_string()));
            }
        }
    }

    #[test]
    fn rejects_non_json() {
        let file = write_temp("not json");
        assert!(file.is_some());
        if let Some(file) = file {
            assert!(matches!(
                read_keypair_file(file.path()),
                Err(KeyFileError::Load { .. })
            ));
        }
    }

    #[test]
    fn missing_file_keeps_its_path() {
        let dir = tempfile::tempdir();
        assert!(dir.is_ok());
        if let Ok(dir) = dir {
            let path = dir.path().join("absent.json");
            assert!(matches!(
                read_keypair_file(&path),
                Err(KeyFileError::Load { path: ref failed, .. }) if *failed == path
            ));
        }
    }
}
