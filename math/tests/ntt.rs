use itertools::izip;
use math::dft::ntt::NttContext;
use math::dft::Dft;
use math::modulus::Zp64;
use math::poly::Poly;
use math::sampling::sample_uniform_mod;
use sampling::source::Source;

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

#[test]
fn ntt_small() {
    let ctx: NttContext = NttContext::new(4, 73).unwrap();

    sub_test("test_ntt_vector", || test_ntt_vector(&ctx));
    sub_test("test_ntt_inverse_vector", || test_ntt_inverse_vector(&ctx));
    sub_test("test_tables_inverse", || test_tables_inverse(&ctx));
}

fn test_ntt_vector(ctx: &NttContext) {
    let mut a: Vec<u64> = vec![0, 1, 4, 5];
    ctx.ntt(&mut a, ctx.root_of_unity_array()).unwrap();
    assert_eq!(a, vec![10, 34, 71, 31]);
}

fn test_ntt_inverse_vector(ctx: &NttContext) {
    assert_eq!(ctx.n_inv(), 73 - 18);
    let mut a: Vec<u64> = vec![10, 34, 71, 31];
    ctx.ntt(&mut a, ctx.root_of_unity_inv_array()).unwrap();
    ctx.scale_by_n_inv(&mut a).unwrap();
    assert_eq!(a, vec![0, 1, 4, 5]);
}

fn test_tables_inverse(ctx: &NttContext) {
    let prime: &Zp64 = ctx.prime();
    izip!(ctx.root_of_unity_array(), ctx.root_of_unity_inv_array())
        .for_each(|(w, w_inv)| assert_eq!(prime.mul(*w, *w_inv), 1));
    // psi has order exactly 2N
    assert_eq!(prime.pow(ctx.psi(), 4), 72);
    assert_eq!(prime.pow(ctx.psi(), 8), 1);
}

#[test]
fn ntt_multiply_mod_17() {
    let ctx: NttContext = NttContext::new(4, 17).unwrap();
    let a: Vec<u64> = vec![0, 0, 2, 0];
    assert_eq!(ctx.multiply(&a, &a).unwrap(), vec![13, 0, 0, 0]);

    let prime: Zp64 = Zp64::new(17).unwrap();
    let p: Poly = Poly::new(4, &[0, 0, 2, 0]).unwrap();
    assert_eq!(p.mul_schoolbook(&p, &prime).unwrap().coeffs(), &[13, 0, 0, 0]);
}

#[test]
fn ntt_large() {
    let mut source: Source = Source::new([0u8; 32]);
    for (q, log_n) in [
        (0x1fffffffffe00001u64, 1),
        (0x1fffffffffe00001, 5),
        (0x1fffffffffe00001, 10),
        (0x7fffffffff620001, 5),
        (0x7fffffffff620001, 10),
    ] {
        let n: usize = 1 << log_n;
        let ctx: NttContext = NttContext::new(n, q).unwrap();

        sub_test(&format!("test_forward_inverse::<q={:#x}, n={}>", q, n), || {
            test_forward_inverse(&ctx, &mut source)
        });
        sub_test(&format!("test_ntt_matches_schoolbook::<q={:#x}, n={}>", q, n), || {
            test_ntt_matches_schoolbook(&ctx, &mut source)
        });
        sub_test(&format!("test_forward_is_evaluation::<q={:#x}, n={}>", q, n), || {
            test_forward_is_evaluation(&ctx, &mut source)
        });
    }
}

fn test_forward_inverse(ctx: &NttContext, source: &mut Source) {
    let a: Vec<u64> = sample_uniform_mod(ctx.q(), ctx.n(), source).unwrap();
    let mut b: Vec<u64> = a.clone();
    ctx.forward_inplace(&mut b).unwrap();
    ctx.backward_inplace(&mut b).unwrap();
    assert_eq!(a, b);
}

fn test_ntt_matches_schoolbook(ctx: &NttContext, source: &mut Source) {
    let n: usize = ctx.n();
    let a: Vec<u64> = sample_uniform_mod(ctx.q(), n, source).unwrap();
    let b: Vec<u64> = sample_uniform_mod(ctx.q(), n, source).unwrap();
    let pa: Poly = Poly::from_coeffs(a.iter().map(|x| *x as i64).collect());
    let pb: Poly = Poly::from_coeffs(b.iter().map(|x| *x as i64).collect());

    let want: Poly = pa.mul(&pb, ctx.prime()).unwrap();
    let have: Vec<u64> = ctx.multiply(&a, &b).unwrap();
    izip!(want.coeffs(), have.iter()).for_each(|(w, h)| assert_eq!(*w as u64, *h));
}

fn test_forward_is_evaluation(ctx: &NttContext, source: &mut Source) {
    let prime: &Zp64 = ctx.prime();
    let a: Vec<u64> = sample_uniform_mod(ctx.q(), ctx.n(), source).unwrap();
    let evals: Vec<u64> = ctx.forward(&a).unwrap();
    let psi: u64 = ctx.psi();
    for k in [0, ctx.n() - 1] {
        let x: u64 = prime.pow(psi, 2 * k as u64 + 1);
        let value: u64 = a
            .iter()
            .rev()
            .fold(0u64, |acc, c| prime.add(prime.mul(acc, x), *c));
        assert_eq!(evals[k], value);
    }
}

#[test]
fn ntt_parameter_errors() {
    assert!(NttContext::new(6, 73).is_err());
    assert!(NttContext::new(64, 73).is_err());
    assert!(NttContext::new(4, 75).is_err());
    let ctx: NttContext = NttContext::new(4, 73).unwrap();
    assert!(ctx.forward(&[1, 2, 3]).is_err());
}
