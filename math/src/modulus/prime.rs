use crate::error::{Error, Result};
use crate::modulus::MAX_MODULUS_BITS;
use crate::number_theory::is_prime;
use num_bigint::BigUint;

/// Ascending iterator over primes q = k * nth_root + 1 with q > 2^bits.
///
/// Every yielded prime supports a primitive nth_root-th root of unity, so
/// with nth_root = 2N it is usable as an NTT modulus for dimension N.
/// Iteration ends once candidates reach 2^MAX_MODULUS_BITS.
#[derive(Clone, Debug)]
pub struct NttFriendlyPrimes {
    bits: u32,
    nth_root: u64,
    next_prime: u64,
    exhausted: bool,
}

impl NttFriendlyPrimes {
    pub fn new(bits: u32, nth_root: u64) -> Result<Self> {
        if bits == 0 || bits >= MAX_MODULUS_BITS {
            return Err(Error::invalid_parameter(
                "bits",
                format!("{} not in [1, {})", bits, MAX_MODULUS_BITS),
            ));
        }
        if nth_root == 0 || nth_root >= 1 << MAX_MODULUS_BITS {
            return Err(Error::invalid_parameter(
                "nth_root",
                format!("{} not in [1, 2^{})", nth_root, MAX_MODULUS_BITS),
            ));
        }

        // Smallest k with k * nth_root + 1 > 2^bits.
        let lower: u128 = 1u128 << bits;
        let k: u128 = lower.div_ceil(nth_root as u128).max(1);
        let first: u128 = k * nth_root as u128 + 1;

        Ok(Self {
            bits,
            nth_root,
            next_prime: first.min(u64::MAX as u128) as u64,
            exhausted: first >> MAX_MODULUS_BITS != 0,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn nth_root(&self) -> u64 {
        self.nth_root
    }

    /// Returns the next k primes, failing if the word range runs out first.
    pub fn next_upstream_primes(&mut self, k: usize) -> Result<Vec<u64>> {
        let mut primes: Vec<u64> = Vec::with_capacity(k);
        for _ in 0..k {
            primes.push(self.next_upstream_prime()?)
        }
        Ok(primes)
    }

    pub fn next_upstream_prime(&mut self) -> Result<u64> {
        self.next().ok_or(Error::PrimeSearchExhausted {
            bits: self.bits,
            nth_root: self.nth_root,
        })
    }
}

impl Iterator for NttFriendlyPrimes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while !self.exhausted {
            let candidate: u64 = self.next_prime;
            match candidate.checked_add(self.nth_root) {
                Some(next) if next >> MAX_MODULUS_BITS == 0 => self.next_prime = next,
                _ => self.exhausted = true,
            }
            if is_prime(&BigUint::from(candidate)) {
                return Some(candidate);
            }
        }
        None
    }
}
