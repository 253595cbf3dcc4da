use crate::dft::ntt::NttContext;
use crate::dyn_array::DynArray;
use crate::error::{Error, Result};
use crate::modulus::prime::NttFriendlyPrimes;
use crate::modulus::{Zp64, MAX_MODULUS_BITS};
use crate::number_theory::normalize;
use itertools::izip;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use tracing::{debug, instrument};

/// Residue number system over pairwise-coprime NTT-friendly primes.
///
/// Holds the reconstruction constants M = prod(p_i), M_i = M / p_i and
/// M_i^-1 mod p_i, plus one [NttContext] per prime so that products that
/// overflow a single word can be computed exactly.
pub struct CrtContext {
    n: usize,
    prime_size: u32,
    ntt: Vec<NttContext>,
    modulus: BigUint,
    half_modulus: BigUint,
    cofactors: Vec<BigUint>,
    cofactor_invs: Vec<u64>,
}

/// Returns x for x < 2^64.
fn low_u64(x: &BigUint) -> u64 {
    debug_assert!(x.bits() <= 64);
    x.iter_u64_digits().next().unwrap_or(0)
}

impl CrtContext {
    /// Draws `num_primes` primes p > 2^prime_size with p = 1 mod 2 * poly_modulus_degree.
    #[instrument(level = "debug")]
    pub fn new(num_primes: usize, prime_size: u32, poly_modulus_degree: usize) -> Result<Self> {
        if num_primes == 0 {
            return Err(Error::invalid_parameter("num_primes", "must be positive"));
        }
        if !poly_modulus_degree.is_power_of_two() {
            return Err(Error::NotPowerOfTwo(poly_modulus_degree));
        }
        if prime_size == 0 || prime_size >= MAX_MODULUS_BITS {
            return Err(Error::invalid_parameter(
                "prime_size",
                format!("{} not in [1, {})", prime_size, MAX_MODULUS_BITS),
            ));
        }

        let nth_root: u64 = (poly_modulus_degree as u64) << 1;
        let primes: Vec<u64> =
            NttFriendlyPrimes::new(prime_size, nth_root)?.next_upstream_primes(num_primes)?;
        Self::from_primes(poly_modulus_degree, prime_size, &primes)
    }

    /// Builds the context from explicit primes, each = 1 mod 2n, distinct
    /// and larger than 2^prime_size.
    pub fn from_primes(n: usize, prime_size: u32, primes: &[u64]) -> Result<Self> {
        if primes.is_empty() {
            return Err(Error::invalid_parameter("primes", "empty"));
        }
        if prime_size >= MAX_MODULUS_BITS {
            return Err(Error::invalid_parameter(
                "prime_size",
                format!("{} not below {}", prime_size, MAX_MODULUS_BITS),
            ));
        }
        for (i, p) in primes.iter().enumerate() {
            if *p >> prime_size == 0 || *p == 1 << prime_size {
                return Err(Error::invalid_parameter(
                    "primes",
                    format!("{} is not above 2^{}", p, prime_size),
                ));
            }
            if primes[..i].contains(p) {
                return Err(Error::invalid_parameter(
                    "primes",
                    format!("{} appears twice", p),
                ));
            }
        }

        let ntt: Vec<NttContext> = primes
            .iter()
            .map(|&q| NttContext::new(n, q))
            .collect::<Result<Vec<NttContext>>>()?;

        let modulus: BigUint = primes.iter().map(|&q| BigUint::from(q)).product();
        let cofactors: Vec<BigUint> = primes.iter().map(|&q| &modulus / q).collect();
        let cofactor_invs: Vec<u64> = izip!(ntt.iter(), cofactors.iter())
            .map(|(ctx, m_i)| {
                let prime: &Zp64 = ctx.prime();
                prime.inv(low_u64(&(m_i % prime.q())))
            })
            .collect::<Result<Vec<u64>>>()?;

        debug!(n, ?primes, modulus_bits = modulus.bits(), "crt context ready");

        Ok(Self {
            n,
            prime_size,
            ntt,
            half_modulus: &modulus >> 1u32,
            modulus,
            cofactors,
            cofactor_invs,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn prime_size(&self) -> u32 {
        self.prime_size
    }

    pub fn num_primes(&self) -> usize {
        self.ntt.len()
    }

    pub fn primes(&self) -> Vec<u64> {
        self.ntt.iter().map(|ctx| ctx.q()).collect()
    }

    /// M, the product of all primes.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The NTT tables for the i-th prime.
    pub fn ntt(&self, i: usize) -> Option<&NttContext> {
        self.ntt.get(i)
    }

    /// Returns value mod p_i for every prime; negative values are normalized.
    pub fn crt(&self, value: &BigInt) -> Vec<u64> {
        let reduced: BigUint = normalize(value, &self.modulus);
        self.ntt
            .iter()
            .map(|ctx| low_u64(&(&reduced % ctx.q())))
            .collect()
    }

    /// Returns the unique value in [0, M) congruent to residues[i] mod p_i.
    pub fn reconstruct(&self, residues: &[u64]) -> Result<BigUint> {
        if residues.len() != self.ntt.len() {
            return Err(Error::LengthMismatch {
                expected: self.ntt.len(),
                got: residues.len(),
            });
        }
        let mut sum: BigUint = BigUint::zero();
        izip!(
            residues.iter(),
            self.ntt.iter(),
            self.cofactors.iter(),
            self.cofactor_invs.iter()
        )
        .for_each(|(r, ctx, m_i, m_i_inv)| {
            sum += m_i * ctx.prime().mul(*r, *m_i_inv);
        });
        Ok(sum % &self.modulus)
    }

    /// Same as [CrtContext::reconstruct] but returns the representative in (-M/2, M/2].
    pub fn reconstruct_centered(&self, residues: &[u64]) -> Result<BigInt> {
        let value: BigUint = self.reconstruct(residues)?;
        if value > self.half_modulus {
            Ok(BigInt::from(value) - BigInt::from(self.modulus.clone()))
        } else {
            Ok(BigInt::from(value))
        }
    }

    /// Returns the exact product a * b mod X^N + 1 over the integers.
    ///
    /// Each prime multiplies independently through its NTT; coefficients
    /// are then reconstructed centered. Fails if n * max|a| * max|b| could
    /// reach M/2.
    pub fn multiply(&self, a: &[i64], b: &[i64]) -> Result<Vec<BigInt>> {
        for len in [a.len(), b.len()] {
            if len != self.n {
                return Err(Error::DegreeMismatch {
                    expected: self.n,
                    got: len,
                });
            }
        }

        let max_abs = |v: &[i64]| v.iter().map(|x| x.unsigned_abs()).max().unwrap_or(0);
        let bound: BigUint =
            BigUint::from(self.n) * BigUint::from(max_abs(a)) * BigUint::from(max_abs(b));
        if bound >= self.half_modulus {
            return Err(Error::InsufficientCrtModulus {
                modulus_bits: self.modulus.bits(),
                bound,
            });
        }

        let num_primes: usize = self.ntt.len();

        // Row-major [prime][coefficient] products.
        let mut products: DynArray<u64> = DynArray::with_capacity(num_primes * self.n);
        let mut a_res: DynArray<u64> = DynArray::with_capacity(self.n);
        let mut b_res: DynArray<u64> = DynArray::with_capacity(self.n);

        for ctx in self.ntt.iter() {
            let prime: &Zp64 = ctx.prime();
            a_res.clear();
            b_res.clear();
            izip!(a.iter(), b.iter()).for_each(|(x, y)| {
                a_res.push(prime.reduce(*x));
                b_res.push(prime.reduce(*y));
            });
            ctx.multiply(a_res.as_slice(), b_res.as_slice())?
                .into_iter()
                .for_each(|c| products.push(c));
        }

        let mut residues: DynArray<u64> = DynArray::with_capacity(num_primes);
        residues.resize(num_primes);
        (0..self.n)
            .map(|j| {
                residues
                    .as_mut_slice()
                    .iter_mut()
                    .enumerate()
                    .for_each(|(i, r)| *r = products.as_slice()[i * self.n + j]);
                self.reconstruct_centered(residues.as_slice())
            })
            .collect()
    }

    /// Bit length of M.
    pub fn modulus_bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Returns true if `value` lies in the centered range returned by reconstruction.
    pub fn fits(&self, value: &BigInt) -> bool {
        value.magnitude() <= &self.half_modulus
    }
}

impl std::fmt::Debug for CrtContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrtContext")
            .field("n", &self.n)
            .field("prime_size", &self.prime_size)
            .field("primes", &self.primes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn round_trip_small() {
        let crt: CrtContext = CrtContext::new(4, 9, 256).unwrap();
        assert_eq!(crt.primes(), vec![7681, 10753, 11777, 12289]);
        for p in crt.primes() {
            assert!(p > 1 << 9);
            assert_eq!(p % 512, 1);
        }
        let residues: Vec<u64> = crt.crt(&BigInt::from(178));
        assert_eq!(residues, vec![178; 4]);
        assert_eq!(crt.reconstruct(&residues).unwrap(), BigUint::from(178u32));
    }

    #[test]
    fn round_trip_edges() {
        let crt: CrtContext = CrtContext::new(3, 40, 16).unwrap();
        let m: BigUint = crt.modulus().clone();
        for v in [BigUint::zero(), BigUint::one(), &m - 1u32, &m >> 1u32] {
            let residues: Vec<u64> = crt.crt(&BigInt::from(v.clone()));
            assert_eq!(crt.reconstruct(&residues).unwrap(), v);
        }
        let residues: Vec<u64> = crt.crt(&BigInt::from(-5));
        assert_eq!(crt.reconstruct_centered(&residues).unwrap(), BigInt::from(-5));
        assert_eq!(crt.reconstruct(&residues).unwrap(), &m - 5u32);
    }

    #[test]
    fn reconstruct_length_mismatch() {
        let crt: CrtContext = CrtContext::new(2, 20, 8).unwrap();
        assert!(matches!(
            crt.reconstruct(&[1, 2, 3]),
            Err(Error::LengthMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(CrtContext::new(0, 20, 8).is_err());
        assert!(matches!(CrtContext::new(2, 20, 12), Err(Error::NotPowerOfTwo(12))));
        assert!(CrtContext::new(2, 63, 8).is_err());
        assert!(CrtContext::from_primes(4, 10, &[17, 17]).is_err());
        assert!(matches!(
            CrtContext::from_primes(4, 4, &[19]),
            Err(Error::NotNttFriendly { .. })
        ));
    }

    #[test]
    fn explicit_primes_respect_prime_size() {
        assert!(matches!(
            CrtContext::from_primes(256, 13, &[7681, 10753]),
            Err(Error::InvalidParameter { name: "primes", .. })
        ));
        assert!(matches!(
            CrtContext::from_primes(8, 4, &[17]),
            Err(Error::InvalidParameter { name: "primes", .. })
        ));
        assert!(CrtContext::from_primes(8, 63, &[17]).is_err());

        let crt: CrtContext = CrtContext::from_primes(256, 12, &[12289, 13313]).unwrap();
        assert_eq!(crt.prime_size(), 12);
        assert_eq!(crt.primes(), vec![12289, 13313]);
    }
}
