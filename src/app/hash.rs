//! MD5 digest value type
//!
//! The catalog publishes MD5 digests as hex strings of arbitrary case. This
//! module stores them as 16-byte arrays so comparisons are exact and
//! case-insensitive by construction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::constants::files;
use crate::errors::{IntegrityError, IntegrityResult};

/// MD5 digest stored as its raw 16 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Hash([u8; 16]);

impl Md5Hash {
    /// Parse an MD5 digest from a hex string
    ///
    /// # Arguments
    ///
    /// * `hex` - 32-character hexadecimal string (case insensitive)
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::InvalidHash` if the string is not 32 hex digits
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cmpdl::app::Md5Hash;
    ///
    /// let hash = Md5Hash::from_hex("50c9d1c465f3cbff652be1509c2e2a4e")?;
    /// let hash_upper = Md5Hash::from_hex("50C9D1C465F3CBFF652BE1509C2E2A4E")?;
    /// assert_eq!(hash, hash_upper);
    /// # Ok::<(), cmpdl::errors::IntegrityError>(())
    /// ```
    pub fn from_hex(hex: &str) -> IntegrityResult<Self> {
        let invalid = || IntegrityError::InvalidHash {
            hash: hex.to_string(),
        };

        if hex.len() != 32 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut bytes = [0u8; 16];
        for (slot, chunk) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(chunk).map_err(|_| invalid())?;
            *slot = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }

        Ok(Md5Hash(bytes))
    }

    /// Lowercase 32-character hex representation
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(32), |mut acc, b| {
            let _ = write!(&mut acc, "{:02x}", b);
            acc
        })
    }

    /// Digest an in-memory buffer
    pub fn compute(data: impl AsRef<[u8]>) -> Self {
        Md5Hash(md5::compute(data).0)
    }

    /// Digest a file on disk, reading it in fixed-size chunks
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::Unreadable` if the file cannot be opened or read
    pub async fn of_file(path: &Path) -> IntegrityResult<Self> {
        let unreadable = |source| IntegrityError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).await.map_err(unreadable)?;
        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; files::HASH_CHUNK_SIZE];

        loop {
            let read = file.read(&mut buffer).await.map_err(unreadable)?;
            if read == 0 {
                break;
            }
            context.consume(&buffer[..read]);
        }

        Ok(Md5Hash(context.compute().0))
    }
}

impl fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Md5Hash {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Md5Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Md5Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}
