use crate::error::{Error, Result};
use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::{ReduceOnce, Residue, MAX_MODULUS_BITS};
use crate::number_theory::is_prime;
use num_bigint::BigUint;
use prime_factorization::Factorization;
use tracing::{debug, instrument};

/// The prime field Z_q for a word-sized prime q.
///
/// Every operation accepts any machine integer (negative ones included),
/// normalizes it into [0, q) and returns a value in [0, q). Products go
/// through a 128-bit intermediate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zp64 {
    q: u64,
    bits: u32,
    /// Distinct prime factors of q-1.
    factors: Vec<u64>,
    barrett: BarrettPrecomp<u64>,
}

impl Zp64 {
    /// Returns Z_q, failing if q is not a prime in [3, 2^63).
    #[instrument(level = "debug")]
    pub fn new(q: u64) -> Result<Self> {
        let bits: u32 = u64::BITS - q.leading_zeros();
        Self::with_bits(q, bits)
    }

    /// Same as [Zp64::new] with a caller-declared bit length: fails if q >= 2^bits.
    pub fn with_bits(q: u64, bits: u32) -> Result<Self> {
        if q < 3 || bits > MAX_MODULUS_BITS || q >> bits != 0 {
            return Err(Error::ModulusOutOfRange {
                q,
                max_bits: bits.min(MAX_MODULUS_BITS),
            });
        }

        if !is_prime(&BigUint::from(q)) {
            return Err(Error::NotPrime(BigUint::from(q)));
        }

        let factors: Vec<u64> = Factorization::run(q - 1)
            .prime_factor_repr()
            .iter()
            .map(|(p, _)| *p)
            .collect();

        debug!(q, bits, ?factors, "prime field ready");

        Ok(Self {
            q,
            bits,
            factors,
            barrett: BarrettPrecomp::new(q),
        })
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn factors(&self) -> &[u64] {
        &self.factors
    }

    pub fn barrett(&self) -> &BarrettPrecomp<u64> {
        &self.barrett
    }

    /// Returns the Shoup constant of x mod q.
    #[inline(always)]
    pub fn prepare<T: Residue>(&self, x: T) -> Barrett<u64> {
        self.barrett.prepare(x.residue(self.q))
    }

    /// Maps x into [0, q).
    #[inline(always)]
    pub fn reduce<T: Residue>(&self, x: T) -> u64 {
        x.residue(self.q)
    }

    /// Maps a residue in [0, q) to its representative in (-q/2, q/2].
    #[inline(always)]
    pub fn center(&self, x: u64) -> i64 {
        debug_assert!(x < self.q);
        if x > self.q >> 1 {
            x as i64 - self.q as i64
        } else {
            x as i64
        }
    }

    #[inline(always)]
    pub fn add<A: Residue, B: Residue>(&self, a: A, b: B) -> u64 {
        (self.reduce(a) + self.reduce(b)).reduce_once(self.q)
    }

    #[inline(always)]
    pub fn sub<A: Residue, B: Residue>(&self, a: A, b: B) -> u64 {
        (self.reduce(a) + self.q - self.reduce(b)).reduce_once(self.q)
    }

    #[inline(always)]
    pub fn neg<A: Residue>(&self, a: A) -> u64 {
        (self.q - self.reduce(a)).reduce_once(self.q)
    }

    #[inline(always)]
    pub fn mul<A: Residue, B: Residue>(&self, a: A, b: B) -> u64 {
        ((self.reduce(a) as u128 * self.reduce(b) as u128) % self.q as u128) as u64
    }

    /// Returns x^exponent mod q by square-and-multiply.
    pub fn pow<T: Residue>(&self, x: T, exponent: u64) -> u64 {
        let mut y: u64 = 1;
        let mut x_pow: u64 = self.reduce(x);
        let mut e: u64 = exponent;
        while e > 0 {
            if e & 1 == 1 {
                y = self.mul(y, x_pow);
            }
            x_pow = self.mul(x_pow, x_pow);
            e >>= 1;
        }
        y
    }

    /// Returns x^-1 mod q.
    pub fn inv<T: Residue>(&self, x: T) -> Result<u64> {
        let x: u64 = self.reduce(x);
        if x == 0 {
            return Err(Error::NotInvertible {
                value: BigUint::from(x),
                modulus: BigUint::from(self.q),
            });
        }
        Ok(self.pow(x, self.q - 2))
    }

    /// Returns true if x generates the full multiplicative group.
    pub fn is_generator<T: Residue>(&self, x: T) -> bool {
        let x: u64 = self.reduce(x);
        x != 0
            && self
                .factors
                .iter()
                .all(|&factor| self.pow(x, (self.q - 1) / factor) != 1)
    }

    /// Returns the smallest g in [2, q) of multiplicative order q-1.
    pub fn find_smallest_generator(&self) -> u64 {
        // A prime field always has a generator, so the search terminates.
        let mut candidate: u64 = 2;
        while !self.is_generator(candidate) {
            candidate += 1;
        }
        candidate
    }

    /// Returns an element of multiplicative order exactly `order`,
    /// computed as g^((q-1)/order) for the smallest generator g.
    pub fn root_of_unity(&self, order: u64) -> Result<u64> {
        if order == 0 || (self.q - 1) % order != 0 {
            return Err(Error::NoRootOfUnity {
                order: BigUint::from(order),
                modulus: BigUint::from(self.q),
            });
        }
        let g: u64 = self.find_smallest_generator();
        let root: u64 = self.pow(g, (self.q - 1) / order);
        debug_assert!(self.pow(root, order) == 1);
        debug_assert!(order & 1 == 1 || self.pow(root, order >> 1) == self.q - 1);
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_inputs_are_normalized() {
        let zp: Zp64 = Zp64::new(19).unwrap();
        assert_eq!(zp.add(-1i64, -2i64), 16);
        assert_eq!(zp.mul(-1i64, -2i64), 2);
        assert_eq!(zp.sub(-1i64, -2i64), 1);
        assert_eq!(zp.inv(-1i64).unwrap(), zp.inv(18u64).unwrap());
        assert_eq!(zp.neg(0u64), 0);
        assert_eq!(zp.neg(-5i64), 5);
    }

    #[test]
    fn rejects_composite_and_out_of_range() {
        assert_eq!(Zp64::new(21), Err(Error::NotPrime(BigUint::from(21u64))));
        assert!(matches!(Zp64::new(2), Err(Error::ModulusOutOfRange { .. })));
        assert!(matches!(Zp64::new(1 << 63), Err(Error::ModulusOutOfRange { .. })));
        assert!(matches!(Zp64::with_bits(17, 64), Err(Error::ModulusOutOfRange { .. })));
        assert_eq!(Zp64::new(1 << 62), Err(Error::NotPrime(BigUint::from(1u64 << 62))));
        assert!(matches!(Zp64::with_bits(73, 6), Err(Error::ModulusOutOfRange { .. })));
        assert!(Zp64::with_bits(73, 7).is_ok());
    }

    #[test]
    fn inverse_of_zero_fails() {
        let zp: Zp64 = Zp64::new(73).unwrap();
        assert!(matches!(zp.inv(0u64), Err(Error::NotInvertible { .. })));
        assert!(matches!(zp.inv(146u64), Err(Error::NotInvertible { .. })));
        for x in 1..73u64 {
            assert_eq!(zp.mul(x, zp.inv(x).unwrap()), 1);
        }
    }

    #[test]
    fn generator_and_roots() {
        let zp: Zp64 = Zp64::new(73).unwrap();
        assert_eq!(zp.find_smallest_generator(), 5);
        assert_eq!(zp.root_of_unity(8).unwrap(), 10);
        assert!(matches!(zp.root_of_unity(5), Err(Error::NoRootOfUnity { .. })));
        assert_eq!(Zp64::new(17).unwrap().root_of_unity(8).unwrap(), 9);
    }

    #[test]
    fn large_prime_no_overflow() {
        for q in [0x1fffffffffe00001u64, 0x7fffffffff620001] {
            let zp: Zp64 = Zp64::new(q).unwrap();
            assert_eq!(zp.mul(q - 1, q - 1), 1);
            assert_eq!(zp.add(q - 1, q - 1), q - 2);
            assert_eq!(zp.sub(0u64, q - 1), 1);
            assert_eq!(zp.mul(-1i64, -1i64), 1);
            assert_eq!(zp.center(q - 1), -1);
            let root: u64 = zp.root_of_unity(1 << 17).unwrap();
            assert_eq!(zp.pow(root, 1 << 16), q - 1);
        }
    }

    #[test]
    fn full_63_bit_primes() {
        let q: u64 = (1 << 63) - 25;
        let zp: Zp64 = Zp64::new(q).unwrap();
        assert_eq!(zp.bits(), 63);
        assert_eq!(Zp64::with_bits(q, 63).unwrap(), zp);
        let x: u64 = q - 2;
        assert_eq!(zp.mul(x, zp.inv(x).unwrap()), 1);
        assert_eq!(zp.add(x, x), q - 4);
    }
}
