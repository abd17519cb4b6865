use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CacheError;

/// Leading bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const GZIP_TOOL: &str = "gzip";

/// Returns true if `header` starts with the gzip magic number.
pub fn is_gzip(header: &[u8]) -> bool {
    header.starts_with(&GZIP_MAGIC)
}

/// How the decompression strategy should be chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompressionMode {
    /// Pick based on the platform, see [`Decompression::detect`].
    #[default]
    Auto,
    Native,
    External,
}

/// The strategy used to undo gzip compression of a cached file.
///
/// Chosen once up front; the loader never branches on the platform itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decompression {
    /// In-process decoding with `flate2`.
    Native,
    /// Shell out to `<program> -cd <path>`.
    External { program: PathBuf },
}

impl Decompression {
    /// Select the strategy for the current platform.
    ///
    /// Windows uses the external `gzip` tool, which must then be installed.
    /// Everywhere else decoding happens in-process.
    pub fn detect() -> Result<Self, CacheError> {
        if cfg!(windows) {
            Self::external()
        } else {
            Ok(Self::Native)
        }
    }

    /// Locate `gzip` on `PATH`.
    pub fn external() -> Result<Self, CacheError> {
        let program = which::which(GZIP_TOOL).map_err(|_| CacheError::ToolMissing {
            tool: GZIP_TOOL.to_owned(),
        })?;
        Ok(Self::External { program })
    }

    pub fn from_mode(mode: DecompressionMode) -> Result<Self, CacheError> {
        match mode {
            DecompressionMode::Auto => Self::detect(),
            DecompressionMode::Native => Ok(Self::Native),
            DecompressionMode::External => Self::external(),
        }
    }

    /// Decompress the gzip file at `path`. `file` is an open handle to it,
    /// positioned at the start of the stream.
    pub fn decompress(&self, path: &Path, file: File) -> Result<Vec<u8>, CacheError> {
        match self {
            Self::Native => {
                let mut decoder = MultiGzDecoder::new(BufReader::new(file));
                let mut data = Vec::new();
                decoder
                    .read_to_end(&mut data)
                    .map_err(|e| CacheError::Decompress {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                Ok(data)
            }
            Self::External { program } => {
                // Some platforms refuse a second open of the same file.
                drop(file);
                debug!("-> {} -cd {}", program.display(), path.display());

                let output = Command::new(program)
                    .arg("-cd")
                    .arg(path)
                    .output()
                    .map_err(|e| match e.kind() {
                        std::io::ErrorKind::NotFound => CacheError::ToolMissing {
                            tool: program.display().to_string(),
                        },
                        _ => CacheError::io(program, e),
                    })?;

                if !output.status.success() {
                    return Err(CacheError::Decompress {
                        path: path.to_path_buf(),
                        message: format!(
                            "{} exited with {}: {}",
                            program.display(),
                            output.status,
                            String::from_utf8_lossy(&output.stderr).trim()
                        ),
                    });
                }

                Ok(output.stdout)
            }
        }
    }
}
