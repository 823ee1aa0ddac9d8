use corvid_types::Hash;
use sha3::{Digest, Keccak256};

/// Hash function of a crypto suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Keccak256,
    Blake3,
}

impl HashAlgorithm {
    /// One-shot digest of `data`.
    pub fn digest(self, data: &[u8]) -> Hash {
        match self {
            HashAlgorithm::Keccak256 => keccak256(data),
            HashAlgorithm::Blake3 => blake3_hash(data),
        }
    }
}

/// Keccak-256 (the pre-standard SHA-3 padding used by Solidity tooling).
pub fn keccak256(data: &[u8]) -> Hash {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash::from_bytes(out)
}

/// blake3 digest
pub fn blake3_hash(data: &[u8]) -> Hash {
    Hash::from_bytes(*blake3::hash(data).as_bytes())
}

/// Incremental hasher for streaming hash computation
pub enum IncrementalHasher {
    Keccak256(Keccak256),
    Blake3(Box<blake3::Hasher>),
}

impl IncrementalHasher {
    /// Create a new incremental hasher for the given algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Keccak256 => IncrementalHasher::Keccak256(Keccak256::new()),
            HashAlgorithm::Blake3 => IncrementalHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        match self {
            IncrementalHasher::Keccak256(h) => h.update(data),
            IncrementalHasher::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Finalize and return the hash
    pub fn finalize(self) -> Hash {
        match self {
            IncrementalHasher::Keccak256(h) => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&h.finalize());
                Hash::from_bytes(out)
            }
            IncrementalHasher::Blake3(h) => Hash::from_bytes(*h.finalize().as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_keccak256_vectors() {
        assert_eq!(
            keccak256(b"").as_bytes(),
            &hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
        assert_eq!(
            keccak256(b"Notify(uint256,uint256)").as_bytes(),
            &hex!("71e71a8458267085d5ab16980fd5f114d2d37f232479c245d523ce8d23ca40ed")
        );
    }

    #[test]
    fn test_blake3_deterministic() {
        let h1 = blake3_hash(b"test");
        let h2 = blake3_hash(b"test");
        assert_eq!(h1, h2);
        assert_ne!(h1, blake3_hash(b"test2"));
        assert_ne!(h1, keccak256(b"test"));
    }

    #[test]
    fn test_incremental_hasher() {
        for algorithm in [HashAlgorithm::Keccak256, HashAlgorithm::Blake3] {
            let mut hasher = IncrementalHasher::new(algorithm);
            hasher.update(b"hello ");
            hasher.update(b"world");
            assert_eq!(hasher.finalize(), algorithm.digest(b"hello world"));
        }
    }
}
