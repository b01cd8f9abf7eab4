//! Perceptual fingerprints and the engine that computes them.
//!
//! A fingerprint is a compact, fixed-length summary of an image's visual
//! appearance: visually similar images produce fingerprints with a small
//! Hamming distance even after resizing, recompression, or minor color
//! shifts. The heavy lifting is delegated to the [`image_hasher`] crate;
//! this module pins the configuration and wraps the hash in a newtype so
//! the rest of the pipeline never touches hasher internals.

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig, ImageHash};
use serde::{Deserialize, Serialize};

/// Supported perceptual hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FingerprintAlgorithm {
    /// aHash: mean-based, 8×8. Fast but least resilient.
    Mean,
    /// dHash: gradient-based, 8×8. Fast and effective; the default.
    #[default]
    Gradient,
    /// dHash in both axes, 16×16, for a longer 256-bit fingerprint.
    DoubleGradient,
    /// pHash: DCT preprocessing with a median split. Most resilient to
    /// recompression at the cost of extra work per image.
    Dct,
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "mean",
            Self::Gradient => "gradient",
            Self::DoubleGradient => "double-gradient",
            Self::Dct => "dct",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FingerprintAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Self::Mean),
            "gradient" => Ok(Self::Gradient),
            "double-gradient" => Ok(Self::DoubleGradient),
            "dct" => Ok(Self::Dct),
            other => Err(format!(
                "unknown algorithm '{other}' (expected mean, gradient, double-gradient, or dct)"
            )),
        }
    }
}

/// A fixed-length perceptual hash of one image.
///
/// Computed once at ingestion and never recomputed. Two fingerprints are
/// comparable only when produced by the same [`FingerprintEngine`]
/// configuration.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(ImageHash);

impl Fingerprint {
    /// Hamming distance to another fingerprint: the number of differing
    /// bits. Symmetric, and zero iff the two images are perceptually
    /// identical under the algorithm.
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        self.0.dist(&other.0)
    }

    /// Base64 rendering of the hash bits, for display or persistence.
    #[must_use]
    pub fn to_base64(&self) -> String {
        self.0.to_base64()
    }

    /// Parse a fingerprint previously rendered with [`Self::to_base64`].
    #[must_use]
    pub fn from_base64(encoded: &str) -> Option<Self> {
        ImageHash::from_base64(encoded).ok().map(Self)
    }

    /// Build a fingerprint directly from raw hash bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        ImageHash::from_bytes(bytes).ok().map(Self)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_base64())
    }
}

/// Computes perceptual fingerprints with a fixed algorithm configuration.
///
/// The engine is pure: the fingerprint is a function of pixel content
/// only (the hasher normalizes color internally before sampling).
pub struct FingerprintEngine {
    algorithm: FingerprintAlgorithm,
    hasher: Hasher,
}

impl FingerprintEngine {
    /// Create an engine for the given algorithm.
    #[must_use]
    pub fn new(algorithm: FingerprintAlgorithm) -> Self {
        let config = HasherConfig::new();
        let config = match algorithm {
            FingerprintAlgorithm::Mean => config.hash_alg(HashAlg::Mean),
            FingerprintAlgorithm::Gradient => config.hash_alg(HashAlg::Gradient),
            FingerprintAlgorithm::DoubleGradient => {
                config.hash_alg(HashAlg::DoubleGradient).hash_size(16, 16)
            }
            FingerprintAlgorithm::Dct => config.hash_alg(HashAlg::Median).preproc_dct(),
        };
        Self {
            algorithm,
            hasher: config.to_hasher(),
        }
    }

    /// Fingerprint one decoded image.
    #[must_use]
    pub fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        Fingerprint(self.hasher.hash_image(image))
    }

    /// The algorithm this engine was built with.
    #[must_use]
    pub const fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self::new(FingerprintAlgorithm::default())
    }
}

impl fmt::Debug for FingerprintEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintEngine")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
