use crate::modulus::ReduceOnce;

/// A constant `value` < q paired with `quotient = floor(value * 2^64 / q)`.
///
/// Multiplying by a prepared constant costs one widening multiply and one
/// wrapping multiply instead of a 128-bit division.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Barrett<O>(pub O, pub O);

impl<O> Barrett<O> {
    #[inline(always)]
    pub fn value(&self) -> &O {
        &self.0
    }

    #[inline(always)]
    pub fn quotient(&self) -> &O {
        &self.1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrettPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub one: Barrett<O>,
}

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        debug_assert!(q > 1 && q < 0x8000000000000000, "invalid q={}", q);
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q, "v={} >= q={}", v, self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as u64;
        Barrett(v, quotient)
    }

    /// Returns a * x mod q in [0, 2q).
    #[inline(always)]
    pub fn mul_external_lazy(&self, a: Barrett<u64>, x: u64) -> u64 {
        let hi: u64 = ((a.1 as u128 * x as u128) >> 64) as u64;
        a.0.wrapping_mul(x).wrapping_sub(hi.wrapping_mul(self.q))
    }

    /// Returns a * x mod q in [0, q).
    #[inline(always)]
    pub fn mul_external(&self, a: Barrett<u64>, x: u64) -> u64 {
        self.mul_external_lazy(a, x).reduce_once(self.q)
    }

    /// Assigns a * x mod q to x.
    #[inline(always)]
    pub fn mul_external_assign(&self, a: Barrett<u64>, x: &mut u64) {
        *x = self.mul_external(a, *x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_external_matches_u128() {
        for q in [0x1fffffffffe00001u64, 0x7fffffffff620001] {
            let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
            let values: [u64; 5] = [0, 1, 2, q >> 1, q - 1];
            let xs: [u64; 5] = [0, 1, q - 1, u64::MAX, 0x123456789abcdef];
            for &v in values.iter() {
                let b: Barrett<u64> = precomp.prepare(v);
                for &x in xs.iter() {
                    let want: u64 = ((v as u128 * x as u128) % q as u128) as u64;
                    assert_eq!(precomp.mul_external(b, x), want, "v={} x={}", v, x);
                    assert!(precomp.mul_external_lazy(b, x) < precomp.two_q);
                }
            }
            assert_eq!(precomp.mul_external(precomp.one(), 42), 42);
        }
    }
}
