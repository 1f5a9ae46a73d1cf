use approx::assert_abs_diff_eq;
use ferric_fdm::core::{Array, FdmError};
use ferric_fdm::math::{BiCGStab, Gmres, LinearOperator, MatrixOperator};
use nalgebra::DMatrix;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Random symmetric positive definite matrix `B·Bᵀ + n·I` and right-hand side.
fn spd_system(n: usize, seed: u64) -> (MatrixOperator, Array) {
    let mut rng = StdRng::seed_from_u64(seed);
    let b = DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0_f64..1.0));
    let a = &b * b.transpose() + DMatrix::identity(n, n) * n as f64;
    let rhs = Array::from_fn(n, |_, _| rng.random_range(-1.0_f64..1.0));
    (MatrixOperator::new(a).expect("square matrix"), rhs)
}

fn relative_residual(a: &MatrixOperator, x: &Array, b: &Array) -> f64 {
    (b - a.apply(x).expect("apply")).norm() / b.norm()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48, .. ProptestConfig::default()
    })]

    #[test]
    fn bicgstab_solves_spd_systems(n in 2usize..16, seed in any::<u64>()) {
        let (a, b) = spd_system(n, seed);
        let res = BiCGStab::new(&a, 10 * n, 1.0e-10).solve(&b, None).expect("bicgstab converges");
        prop_assert!(res.error < 1.0e-10);
        prop_assert!(relative_residual(&a, &res.x, &b) < 1.0e-8);

        // Starting from a converged solution does no further work.
        let again = BiCGStab::new(&a, 10 * n, 1.0e-8).solve(&b, Some(&res.x)).expect("re-solve");
        prop_assert_eq!(again.iterations, 0);
    }

    #[test]
    fn gmres_residual_history_is_monotone(n in 2usize..16, seed in any::<u64>()) {
        let (a, b) = spd_system(n, seed);
        let res = Gmres::new(&a, 2 * n, 1.0e-10).solve(&b, None).expect("gmres converges");
        prop_assert!(res.errors.len() >= 2);
        prop_assert!(res.errors.len() <= n + 1);
        for w in res.errors.windows(2) {
            prop_assert!(w[1] <= w[0] * (1.0 + 1.0e-12));
        }
        prop_assert!(relative_residual(&a, &res.x, &b) < 1.0e-8);

        // Restarting from the converged solution needs at most one more step.
        let again = Gmres::new(&a, 2 * n, 1.0e-8).solve(&b, Some(&res.x)).expect("re-solve");
        prop_assert!(again.errors.len() <= 2);
    }

    #[test]
    fn single_restart_cycle_equals_plain_gmres(n in 2usize..10, seed in any::<u64>()) {
        let (a, b) = spd_system(n, seed);
        let solver = Gmres::new(&a, 2 * n, 1.0e-10);
        let plain = solver.solve(&b, None).expect("gmres converges");
        let restarted = solver.solve_with_restart(1, &b, None).expect("gmres converges");
        prop_assert_eq!(plain, restarted);
    }

    #[test]
    fn solvers_agree_on_spd_systems(n in 2usize..12, seed in any::<u64>()) {
        let (a, b) = spd_system(n, seed);
        let x1 = BiCGStab::new(&a, 10 * n, 1.0e-12).solve(&b, None).expect("bicgstab").x;
        let x2 = Gmres::new(&a, 2 * n, 1.0e-12).solve(&b, None).expect("gmres").x;
        prop_assert!((&x1 - &x2).norm() < 1.0e-8 * x2.norm().max(1.0));
    }
}

#[test]
fn zero_right_hand_side_is_trivial() {
    let (a, _) = spd_system(5, 7);
    let zero = Array::zeros(5);

    let bicg = BiCGStab::new(&a, 10, 1.0e-8).solve(&zero, None).expect("trivial");
    assert_eq!(bicg.iterations, 0);
    assert_eq!(bicg.error, 0.0);
    assert_eq!(bicg.x, zero);

    let gmres = Gmres::new(&a, 10, 1.0e-8).solve(&zero, None).expect("trivial");
    assert_eq!(gmres.errors, vec![0.0]);
    assert_eq!(gmres.x, zero);
}

#[test]
fn diagonal_system_iteration_counts() {
    let a = MatrixOperator::diagonal(&[2.0, 3.0, 4.0, 5.0]);
    let b = Array::from_vec(vec![2.0, 3.0, 4.0, 5.0]);

    let bicg = BiCGStab::new(&a, 10, 1.0e-8).solve(&b, None).expect("bicgstab converges");
    assert_eq!(bicg.iterations, 4);
    for v in bicg.x.iter() {
        assert_abs_diff_eq!(*v, 1.0, epsilon = 1.0e-8);
    }

    let gmres = Gmres::new(&a, 10, 1.0e-8).solve(&b, None).expect("gmres converges");
    assert_eq!(gmres.errors.len(), 5);
    for v in gmres.x.iter() {
        assert_abs_diff_eq!(*v, 1.0, epsilon = 1.0e-8);
    }
}

#[test]
fn closures_and_preconditioners_compose() {
    let d = [1.0, 10.0, 100.0, 1000.0];
    let a = |x: &Array| -> Result<Array, FdmError> {
        Ok(Array::from_iterator(x.len(), x.iter().zip(d).map(|(v, di)| v * di)))
    };
    let jacobi = |x: &Array| -> Result<Array, FdmError> {
        Ok(Array::from_iterator(x.len(), x.iter().zip(d).map(|(v, di)| v / di)))
    };
    let b = Array::from_element(4, 1.0);

    let res = Gmres::new(&a, 10, 1.0e-10)
        .with_preconditioner(&jacobi)
        .solve(&b, None)
        .expect("preconditioned gmres");
    assert_eq!(res.errors.len(), 2);
    for (x, di) in res.x.iter().zip(d) {
        assert_abs_diff_eq!(*x, 1.0 / di, epsilon = 1.0e-12);
    }
}

#[test]
fn oversized_gmres_budget_stays_within_the_krylov_dimension() {
    let a = MatrixOperator::diagonal(&[2.0, 3.0, 4.0, 5.0]);
    let b = Array::from_vec(vec![2.0, 3.0, 4.0, 5.0]);
    let res = Gmres::new(&a, 100_000, 1.0e-8).solve(&b, None).expect("gmres converges");
    assert!(res.errors.len() <= 5);
    for v in res.x.iter() {
        assert_abs_diff_eq!(*v, 1.0, epsilon = 1.0e-8);
    }
}

#[test]
fn exhausted_budget_reports_convergence_failure() {
    let a = MatrixOperator::diagonal(&[1.0, 10.0, 100.0, 1000.0]);
    let b = Array::from_element(4, 1.0);
    let err = Gmres::new(&a, 1, 1.0e-12)
        .solve(&b, None)
        .expect_err("one Arnoldi step is not enough");
    assert!(matches!(err, FdmError::ConvergenceFailure(_)));
}
