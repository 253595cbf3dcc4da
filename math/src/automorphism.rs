use crate::error::{Error, Result};
use crate::modulus::{WordOps, Zp64};
use tracing::{debug, instrument};
use utils::map::Map;

/// Generator of the cyclic subgroup of (Z/2NZ)^* that acts as slot rotations.
pub const GALOIS_GENERATOR: u64 = 3;

/// Returns x^e mod 2^64. Reducing by a power-of-two modulus is then a mask.
fn pow_wrapping(x: u64, e: u64) -> u64 {
    let mut y: u64 = 1;
    let mut x_pow: u64 = x;
    let mut exp: u64 = e;
    while exp > 0 {
        if exp & 1 == 1 {
            y = y.wrapping_mul(x_pow);
        }
        x_pow = x_pow.wrapping_mul(x_pow);
        exp >>= 1;
    }
    y
}

/// Galois group bookkeeping for Z[X]/(X^N + 1), N a power of two.
///
/// Elements live in the odd residues of [1, 2N). Rotation by `step` slots is
/// `3^step`, conjugation is `2N - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GaloisTool {
    coeff_count: usize,
    m: u64,
}

impl GaloisTool {
    #[instrument(level = "debug")]
    pub fn new(coeff_count: usize) -> Result<Self> {
        if coeff_count < 2 || !coeff_count.is_power_of_two() {
            return Err(Error::NotPowerOfTwo(coeff_count));
        }
        debug!(m = (coeff_count as u64) << 1, "galois tool ready");
        Ok(Self {
            coeff_count,
            m: (coeff_count as u64) << 1,
        })
    }

    pub fn coeff_count(&self) -> usize {
        self.coeff_count
    }

    /// Cyclotomic order 2N.
    pub fn cyclotomic_order(&self) -> u64 {
        self.m
    }

    /// Maps a signed rotation step to its Galois element. Step 0 is conjugation.
    pub fn get_elt_from_step(&self, step: i64) -> u64 {
        if step == 0 {
            return self.m - 1;
        }
        let half: i64 = (self.coeff_count >> 1) as i64;
        let step: u64 = step.rem_euclid(half) as u64;
        pow_wrapping(GALOIS_GENERATOR, step) & (self.m - 1)
    }

    pub fn get_elts_from_steps(&self, steps: &[i64]) -> Vec<u64> {
        steps.iter().map(|&s| self.get_elt_from_step(s)).collect()
    }

    /// Conjugation followed by the elements for rotations by +-2^i.
    ///
    /// The last positive and negative power-of-two rotations coincide, so the
    /// list ends with a repeated element. Callers keying on the element see it once.
    pub fn get_elts_all(&self) -> Vec<u64> {
        let mask: u64 = self.m - 1;
        let log_n: usize = self.coeff_count.log2();
        let mut elts: Vec<u64> = Vec::with_capacity(2 * log_n - 1);
        elts.push(mask);

        let mut pos: u64 = GALOIS_GENERATOR;
        // 3 has order N/2 modulo 2N, so 3^-1 = 3^(N/2 - 1).
        let mut neg: u64 = pow_wrapping(GALOIS_GENERATOR, (self.coeff_count as u64 >> 1) - 1) & mask;
        for _ in 0..log_n - 1 {
            elts.push(pos);
            pos = pos.wrapping_mul(pos) & mask;
            elts.push(neg);
            neg = neg.wrapping_mul(neg) & mask;
        }
        elts
    }

    /// Dense index (elt - 1) / 2 in [0, N).
    pub fn get_index_from_elt(&self, elt: u64) -> Result<usize> {
        if elt & 1 == 0 || elt >= self.m {
            return Err(Error::InvalidGaloisElement { elt, order: self.m });
        }
        Ok(((elt - 1) >> 1) as usize)
    }

    pub fn get_elt_from_index(&self, index: usize) -> Result<u64> {
        if index >= self.coeff_count {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.coeff_count,
            });
        }
        Ok(((index as u64) << 1) | 1)
    }

    fn check(&self, len: usize, elt: u64) -> Result<()> {
        if len != self.coeff_count {
            return Err(Error::DegreeMismatch {
                expected: self.coeff_count,
                got: len,
            });
        }
        self.get_index_from_elt(elt).map(|_| ())
    }

    /// Applies X^i -> X^(i * elt) to reduced coefficients in [0, q).
    pub fn apply_galois(&self, coeffs: &[u64], elt: u64, prime: &Zp64) -> Result<Vec<u64>> {
        self.check(coeffs.len(), elt)?;
        let n: usize = self.coeff_count;
        let log_n: usize = n.log2();
        let mask: usize = n - 1;
        let mut out: Vec<u64> = vec![0; n];
        coeffs.iter().enumerate().for_each(|(i, ai)| {
            let gal_el_i: usize = i * elt as usize;
            let sign: usize = (gal_el_i >> log_n) & 1;
            let ai: u64 = prime.reduce(*ai);
            out[gal_el_i & mask] = if sign == 1 { prime.neg(ai) } else { ai };
        });
        Ok(out)
    }

    /// Applies the same automorphism to the evaluation vector produced by
    /// [crate::dft::ntt::NttContext::forward_inplace]. This is a pure permutation.
    pub fn apply_galois_ntt(&self, values: &[u64], elt: u64) -> Result<Vec<u64>> {
        self.check(values.len(), elt)?;
        let mask: u64 = self.m - 1;
        Ok((0..self.coeff_count as u64)
            .map(|k| values[((elt * (2 * k + 1)) & mask) as usize >> 1])
            .collect())
    }
}

/// Precomputed index table for one Galois element.
///
/// In the coefficient domain `permutation[i]` is the destination of
/// coefficient i, with the sign flip stored in the top bit. In the
/// evaluation domain `permutation[k]` is the source slot of output k.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoPerm {
    pub gal_el: u64,
    pub ntt: bool,
    pub permutation: Vec<usize>,
}

const SIGN_BIT: usize = 1 << (usize::BITS - 1);

impl AutoPerm {
    pub fn new<const NTT: bool>(tool: &GaloisTool, gal_el: u64) -> Result<Self> {
        tool.get_index_from_elt(gal_el)?;
        let n: usize = tool.coeff_count();
        let mut permutation: Vec<usize> = Vec::with_capacity(n);

        if NTT {
            let mask: usize = (tool.cyclotomic_order() - 1) as usize;
            for k in 0..n {
                permutation.push(((gal_el as usize * (2 * k + 1)) & mask) >> 1);
            }
        } else {
            let log_n: usize = n.log2();
            let mask: usize = n - 1;
            for i in 0..n {
                let gal_el_i: usize = i * gal_el as usize;
                let sign: usize = (gal_el_i >> log_n) & 1;
                permutation.push((gal_el_i & mask) | (sign << (usize::BITS - 1)));
            }
        }

        Ok(Self {
            gal_el,
            ntt: NTT,
            permutation,
        })
    }

    /// Applies the table to `a`; in the coefficient domain `a` must be reduced mod `prime`.
    pub fn apply(&self, a: &[u64], prime: &Zp64) -> Result<Vec<u64>> {
        if a.len() != self.permutation.len() {
            return Err(Error::LengthMismatch {
                expected: self.permutation.len(),
                got: a.len(),
            });
        }
        if self.ntt {
            return Ok(self.permutation.iter().map(|&src| a[src]).collect());
        }
        let mut out: Vec<u64> = vec![0; a.len()];
        self.permutation.iter().zip(a.iter()).for_each(|(&idx, ai)| {
            let ai: u64 = prime.reduce(*ai);
            if idx & SIGN_BIT != 0 {
                out[idx & !SIGN_BIT] = prime.neg(ai);
            } else {
                out[idx] = ai;
            }
        });
        Ok(out)
    }
}

/// Tables keyed by Galois element.
#[derive(Default)]
pub struct AutoPermMap(Map<u64, AutoPerm>);

impl AutoPermMap {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, perm: AutoPerm) {
        self.0.insert(perm.gal_el, perm);
    }

    /// Builds and caches the table for every element in `tool.get_elts_all()`.
    pub fn gen_all<const NTT: bool>(&mut self, tool: &GaloisTool) -> Result<()> {
        for gal_el in tool.get_elts_all() {
            if !self.0.contains_key(&gal_el) {
                self.insert(AutoPerm::new::<NTT>(tool, gal_el)?);
            }
        }
        debug!(n = tool.coeff_count(), tables = self.0.len(), "automorphism tables ready");
        Ok(())
    }

    pub fn gen<const NTT: bool>(&mut self, tool: &GaloisTool, step: i64) -> Result<u64> {
        let gal_el: u64 = tool.get_elt_from_step(step);
        if !self.0.contains_key(&gal_el) {
            self.insert(AutoPerm::new::<NTT>(tool, gal_el)?);
        }
        Ok(gal_el)
    }

    pub fn get(&self, gal_el: &u64) -> Option<&AutoPerm> {
        self.0.get(gal_el)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
