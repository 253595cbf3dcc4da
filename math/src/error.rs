use num_bigint::BigUint;

/// Errors reported by the arithmetic kernel.
///
/// Construction-time failures (no prime, no root, bad modulus) mean the
/// context cannot be built. The remaining variants reject a single call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A modulus that must be prime is composite.
    #[error("{0} is not prime")]
    NotPrime(BigUint),
    /// A word-sized modulus is outside the supported range.
    #[error("modulus {q} outside supported range [3, 2^{max_bits})")]
    ModulusOutOfRange { q: u64, max_bits: u32 },
    /// gcd(value, modulus) != 1.
    #[error("{value} is not invertible modulo {modulus}")]
    NotInvertible { value: BigUint, modulus: BigUint },
    /// The requested order does not divide p - 1.
    #[error("no element of order {order} modulo {modulus}")]
    NoRootOfUnity { order: BigUint, modulus: BigUint },
    /// The multiplicative group has no generator in [2, p).
    #[error("no generator in [2, {0})")]
    NoGenerator(BigUint),
    /// q != 1 mod 2N.
    #[error("q={q} is not NTT-friendly for ring dimension {n}: q mod 2n = {rem}")]
    NotNttFriendly { q: u64, n: usize, rem: u64 },
    /// A ring dimension is not a power of two.
    #[error("{0} is not a power of two")]
    NotPowerOfTwo(usize),
    /// No prime of the requested shape fits in a machine word.
    #[error("exhausted NTT-friendly primes above 2^{bits} with q = 1 mod {nth_root}")]
    PrimeSearchExhausted { bits: u32, nth_root: u64 },
    /// Two operands of an elementwise operation differ in length.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    /// A context was built for a different ring dimension.
    #[error("degree mismatch: context has n={expected}, operand has n={got}")]
    DegreeMismatch { expected: usize, got: usize },
    /// Index beyond the logical size of a buffer.
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    /// Galois element is even or not below the cyclotomic order.
    #[error("invalid Galois element {elt} for cyclotomic order {order}")]
    InvalidGaloisElement { elt: u64, order: u64 },
    /// Empty sampling interval.
    #[error("invalid sampling range [{min}, {max})")]
    InvalidSampleRange { min: u64, max: u64 },
    /// More nonzero entries requested than the vector has.
    #[error("hamming weight {weight} exceeds length {length}")]
    HammingWeightTooLarge { weight: usize, length: usize },
    /// The CRT modulus cannot hold the exact product without wraparound.
    #[error("CRT modulus of {modulus_bits} bits cannot hold products bounded by {bound}")]
    InsufficientCrtModulus { modulus_bits: u64, bound: BigUint },
    /// Parameter outside its admissible domain.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    /// A noise distribution could not be instantiated.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
