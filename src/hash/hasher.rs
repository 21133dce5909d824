//! Incremental hash accumulator over every supported algorithm

use super::digest::Digest;
use crate::config::HashAlgorithm;
use sha2::Digest as _;

/// Unified hasher that supports all algorithms
pub enum Hasher {
    /// SHA-1
    Sha1(sha1::Sha1),
    /// SHA-256
    Sha256(sha2::Sha256),
    /// SHA-512
    Sha512(sha2::Sha512),
    /// MD5
    Md5(md5::Md5),
    /// XXHash32, seed 0
    Xx32(xxhash_rust::xxh32::Xxh32),
    /// XXHash64, seed 0
    Xx64(xxhash_rust::xxh64::Xxh64),
    /// XXHash3 128-bit
    Xxh3(xxhash_rust::xxh3::Xxh3),
    /// BLAKE3
    Blake3(blake3::Hasher),
}

impl Hasher {
    /// Create a new hasher for the given algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Self::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha512 => Self::Sha512(sha2::Sha512::new()),
            HashAlgorithm::Md5 => Self::Md5(md5::Md5::new()),
            HashAlgorithm::Xx32 => Self::Xx32(xxhash_rust::xxh32::Xxh32::new(0)),
            HashAlgorithm::Xx64 => Self::Xx64(xxhash_rust::xxh64::Xxh64::new(0)),
            HashAlgorithm::Xxh3 => Self::Xxh3(xxhash_rust::xxh3::Xxh3::new()),
            HashAlgorithm::Blake3 => Self::Blake3(blake3::Hasher::new()),
        }
    }

    /// Get the algorithm this hasher uses
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha1(_) => HashAlgorithm::Sha1,
            Self::Sha256(_) => HashAlgorithm::Sha256,
            Self::Sha512(_) => HashAlgorithm::Sha512,
            Self::Md5(_) => HashAlgorithm::Md5,
            Self::Xx32(_) => HashAlgorithm::Xx32,
            Self::Xx64(_) => HashAlgorithm::Xx64,
            Self::Xxh3(_) => HashAlgorithm::Xxh3,
            Self::Blake3(_) => HashAlgorithm::Blake3,
        }
    }

    /// Absorb the next block of input
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Md5(h) => h.update(data),
            Self::Xx32(h) => h.update(data),
            Self::Xx64(h) => h.update(data),
            Self::Xxh3(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Finalize into a digest.
    ///
    /// xxHash integers are emitted big-endian, the canonical xxHash byte
    /// order, so hex output reads the same as the integer printed in hex.
    pub fn finalize(self) -> Digest {
        let algorithm = self.algorithm();
        let bytes = match self {
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
            Self::Md5(h) => h.finalize().to_vec(),
            Self::Xx32(h) => h.digest().to_be_bytes().to_vec(),
            Self::Xx64(h) => h.digest().to_be_bytes().to_vec(),
            Self::Xxh3(h) => h.digest128().to_be_bytes().to_vec(),
            Self::Blake3(h) => h.finalize().as_bytes().to_vec(),
        };
        Digest::new(algorithm, bytes)
    }

    /// Reset the hasher for reuse
    pub fn reset(&mut self) {
        match self {
            Self::Sha1(h) => sha2::Digest::reset(h),
            Self::Sha256(h) => sha2::Digest::reset(h),
            Self::Sha512(h) => sha2::Digest::reset(h),
            Self::Md5(h) => sha2::Digest::reset(h),
            Self::Xx32(h) => h.reset(0),
            Self::Xx64(h) => h.reset(0),
            Self::Xxh3(h) => h.reset(),
            Self::Blake3(h) => {
                h.reset();
            }
        }
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(algorithm: HashAlgorithm, data: &[u8]) -> String {
        let mut hasher = Hasher::new(algorithm);
        hasher.update(data);
        hasher.finalize().to_hex()
    }

    #[test]
    fn test_empty_input_vectors() {
        assert_eq!(hex_of(HashAlgorithm::Md5, b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            hex_of(HashAlgorithm::Sha1, b""),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Sha256, b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Sha512, b""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
        assert_eq!(hex_of(HashAlgorithm::Xx32, b""), "02cc5d05");
        assert_eq!(hex_of(HashAlgorithm::Xx64, b""), "ef46db3751d8e999");
        assert_eq!(hex_of(HashAlgorithm::Xxh3, b""), "99aa06d3014798d86001c324468d497f");
        assert_eq!(
            hex_of(HashAlgorithm::Blake3, b""),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(hex_of(HashAlgorithm::Md5, b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            hex_of(HashAlgorithm::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_output_sizes_match_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let digest = Hasher::new(algorithm).finalize();
            assert_eq!(digest.as_bytes().len(), algorithm.output_size(), "{}", algorithm);
            assert_eq!(digest.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_split_updates_match_single_update() {
        for algorithm in HashAlgorithm::ALL {
            let mut split = Hasher::new(algorithm);
            split.update(b"Hello, ");
            split.update(b"");
            split.update(b"World!");
            assert_eq!(split.finalize().to_hex(), hex_of(algorithm, b"Hello, World!"));
        }
    }

    #[test]
    fn test_reset() {
        for algorithm in HashAlgorithm::ALL {
            let mut hasher = Hasher::new(algorithm);
            hasher.update(b"discarded");
            hasher.reset();
            hasher.update(b"kept");
            assert_eq!(hasher.finalize().to_hex(), hex_of(algorithm, b"kept"));
        }
    }

    #[test]
    fn test_write_impl() {
        let mut hasher = Hasher::new(HashAlgorithm::Blake3);
        std::io::copy(&mut &b"streamed"[..], &mut hasher).unwrap();
        assert_eq!(hasher.finalize().to_hex(), hex_of(HashAlgorithm::Blake3, b"streamed"));
    }
}
