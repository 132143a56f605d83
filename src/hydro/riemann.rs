use crate::num_vec::{Comparison, Number};
use super::eos::EquationOfState;
use super::euler::RiemannData;




/**
 * A guaranteed maximal wavespeed estimate for the Riemann problem between
 * two states, valid for materials linearized by a common covolume
 * `b_interp`. The returned number is never smaller than the largest speed
 * at which a wave of the exact Riemann solution leaves the interface, but it
 * may be larger: the estimate trades sharpness for a closed form.
 *
 * Two shortcuts are taken with respect to the full algorithm:
 *
 * - The nonvacuum condition is assumed to hold.
 *
 * - The two-expansion case with `p* < p_min` is not treated separately.
 *   There both outer waves travel at `u - a` and `u + a`, which any
 *   pressure estimate `p_2 <= p_min` reproduces; a larger `p_2` gives a
 *   more pessimistic bound.
 *
 * Every method is generic over `Number`, so the same code evaluates one
 * interface (`f64`) or a batch of interfaces (`NumVec<W>`). Branching is
 * done with `compare_and_select` only.
 *
 * Inputs with zero or negative density, pressure or sound speed are outside
 * the contract and yield meaningless numbers.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiemannSolver {
    b_interp: f64,
}




// ============================================================================
impl RiemannSolver {

    pub fn new(b_interp: f64) -> Self {
        Self { b_interp }
    }

    pub fn for_equation_of_state(eos: &EquationOfState) -> Self {
        Self::new(eos.interpolation_b())
    }

    pub fn b_interp(&self) -> f64 {
        self.b_interp
    }

    /// `2 a (1 - b rho) / (gamma - 1)`
    #[inline(always)]
    pub fn alpha<N: Number>(&self, rho: N, gamma: N, a: N) -> N {
        let one = N::splat(1.0);
        N::splat(2.0) * a * (one - N::splat(self.b_interp) * rho) / (gamma - one)
    }

    /// The correction factor c(gamma): 1 up to 5/3, sqrt(2)/2 from 3 on,
    /// and `sqrt((3 gamma + 11) / (6 (gamma + 1)))` in between.
    #[inline(always)]
    pub fn c<N: Number>(&self, gamma: N) -> N {
        let radicand = (N::splat(3.0) * gamma + N::splat(11.0)) / (N::splat(6.0) * (gamma + N::splat(1.0)));
        let interior = radicand.sqrt();

        let c_of_gamma = N::compare_and_select(
            Comparison::LessThanOrEqual,
            gamma,
            N::splat(5.0 / 3.0),
            N::splat(1.0),
            interior,
        );

        N::compare_and_select(
            Comparison::GreaterThanOrEqual,
            gamma,
            N::splat(3.0),
            N::splat(0.5 * std::f64::consts::SQRT_2),
            c_of_gamma,
        )
    }

    /// Star pressure estimate for a rarefaction on the high pressure side
    /// and a shock on the low pressure side. The gamma and alpha values are
    /// those of whichever state carries p_min (resp. p_max), not those of
    /// state i (resp. j).
    #[inline(always)]
    pub fn p_star_rs<N: Number>(&self, i: &RiemannData<N>, j: &RiemannData<N>) -> N {
        let (rho_i, u_i, p_i, gamma_i, a_i) = i.as_tuple();
        let (rho_j, u_j, p_j, gamma_j, a_j) = j.as_tuple();
        let alpha_i = self.alpha(rho_i, gamma_i, a_i);
        let alpha_j = self.alpha(rho_j, gamma_j, a_j);
        let one = N::splat(1.0);
        let two = N::splat(2.0);

        let p_min = p_i.min(p_j);
        let p_max = p_i.max(p_j);

        let gamma_min = N::compare_and_select(Comparison::LessThan, p_i, p_j, gamma_i, gamma_j);
        let gamma_max = N::compare_and_select(Comparison::GreaterThanOrEqual, p_i, p_j, gamma_i, gamma_j);
        let alpha_min = N::compare_and_select(Comparison::LessThan, p_i, p_j, alpha_i, alpha_j);
        let alpha_max = N::compare_and_select(Comparison::GreaterThanOrEqual, p_i, p_j, alpha_i, alpha_j);

        let c_gamma_min = self.c(gamma_min);
        let exp_min = two * gamma_min / (gamma_min - one);
        let exp_max = (gamma_max - one) / (two * gamma_max);

        let numerator = alpha_max * (one - (p_min / p_max).powf(exp_max)) - (u_j - u_i);
        let denominator = c_gamma_min * alpha_min;
        let base = numerator / denominator + one;

        p_min * base.powf(exp_min)
    }

    /// Star pressure estimate for two shocks, solved in closed form from a
    /// linearized relation with the exponent of the smaller gamma.
    #[inline(always)]
    pub fn p_star_ss<N: Number>(&self, i: &RiemannData<N>, j: &RiemannData<N>) -> N {
        let (rho_i, u_i, p_i, gamma_i, a_i) = i.as_tuple();
        let (rho_j, u_j, p_j, gamma_j, a_j) = j.as_tuple();
        let one = N::splat(1.0);

        let gamma_m = gamma_i.min(gamma_j);
        let alpha_hat_i = self.c(gamma_i) * self.alpha(rho_i, gamma_i, a_i);
        let alpha_hat_j = self.c(gamma_j) * self.alpha(rho_j, gamma_j, a_j);

        let exp = (gamma_m - one) / (N::splat(2.0) * gamma_m);
        let exp_inv = one / exp;

        let numerator = alpha_hat_i + alpha_hat_j - (u_j - u_i);
        let denominator = alpha_hat_i * p_i.powf(-exp) + alpha_hat_j * p_j.powf(-exp);

        (numerator / denominator).powf(exp_inv)
    }

    /// The two-shock velocity gap functional evaluated at p_max. Negative
    /// means the star pressure exceeds p_max.
    #[inline(always)]
    pub fn phi_of_p_max<N: Number>(&self, i: &RiemannData<N>, j: &RiemannData<N>) -> N {
        let (rho_i, u_i, p_i, gamma_i, _) = i.as_tuple();
        let (rho_j, u_j, p_j, gamma_j, _) = j.as_tuple();
        let one = N::splat(1.0);
        let half = N::splat(0.5);
        let b = N::splat(self.b_interp);

        let p_max = p_i.max(p_j);

        let radicand_inverse_i = half * rho_i / (one - b * rho_i) * ((gamma_i + one) * p_max + (gamma_i - one) * p_i);
        let value_i = (p_max - p_i) / radicand_inverse_i.sqrt();

        let radicand_inverse_j = half * rho_j / (one - b * rho_j) * ((gamma_j + one) * p_max + (gamma_j - one) * p_j);
        let value_j = (p_max - p_j) / radicand_inverse_j.sqrt();

        value_i + value_j + u_j - u_i
    }

    #[inline(always)]
    fn shock_factor<N: Number>(state: &RiemannData<N>, p_star: N) -> N {
        let factor = N::splat(0.5) * (state.gamma + N::splat(1.0)) / state.gamma;
        let tmp = ((p_star - state.pressure) / state.pressure).positive_part();
        (N::splat(1.0) + factor * tmp).sqrt()
    }

    /// Speed of the left-going (1-) wave for the given star pressure.
    #[inline(always)]
    pub fn lambda1_minus<N: Number>(&self, state: &RiemannData<N>, p_star: N) -> N {
        state.velocity - state.sound_speed * Self::shock_factor(state, p_star)
    }

    /// Speed of the right-going (3-) wave for the given star pressure.
    #[inline(always)]
    pub fn lambda3_plus<N: Number>(&self, state: &RiemannData<N>, p_star: N) -> N {
        state.velocity + state.sound_speed * Self::shock_factor(state, p_star)
    }

    #[inline(always)]
    pub fn compute_lambda<N: Number>(&self, i: &RiemannData<N>, j: &RiemannData<N>, p_star: N) -> N {
        let nu_11 = self.lambda1_minus(i, p_star);
        let nu_32 = self.lambda3_plus(j, p_star);
        nu_32.positive_part().max(nu_11.negative_part())
    }

    /// Return an upper bound on the maximal wavespeed of the Riemann problem
    /// with left state `i` and right state `j`.
    #[inline]
    pub fn compute<N: Number>(&self, i: &RiemannData<N>, j: &RiemannData<N>) -> N {
        let p_max = i.pressure.max(j.pressure);
        let phi_p_max = self.phi_of_p_max(i, j);
        let p_star_ss = self.p_star_ss(i, j);
        let p_star_rs = self.p_star_rs(i, j);

        let p_2 = N::compare_and_select(
            Comparison::LessThan,
            phi_p_max,
            N::splat(0.0),
            p_star_ss,
            p_max.min(p_star_rs),
        );

        self.compute_lambda(i, j, p_2)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::RiemannSolver;
    use crate::hydro::euler::RiemannData;
    use crate::num_vec::NumVec;
    use proptest::prelude::*;

    fn state(rho: f64, u: f64, p: f64, gamma: f64) -> RiemannData<f64> {
        RiemannData::polytropic(rho, u, p, gamma)
    }

    /// Exact maximal wavespeed of the polytropic Riemann problem, with the
    /// star pressure found by bisection on the pressure function.
    fn exact_max_wavespeed(l: &RiemannData<f64>, r: &RiemannData<f64>) -> f64 {
        fn f(p: f64, s: &RiemannData<f64>) -> f64 {
            let (rho, _, pk, g, a) = s.as_tuple();
            if p > pk {
                let aa = 2.0 / ((g + 1.0) * rho);
                let bb = (g - 1.0) / (g + 1.0) * pk;
                (p - pk) * f64::sqrt(aa / (p + bb))
            } else {
                2.0 * a / (g - 1.0) * ((p / pk).powf((g - 1.0) / (2.0 * g)) - 1.0)
            }
        }
        let gap = |p: f64| f(p, l) + f(p, r) + r.velocity - l.velocity;
        let (mut lo, mut hi) = (1e-14, 1e8);
        for _ in 0..400 {
            let mid = f64::sqrt(lo * hi);
            if gap(mid) > 0.0 { hi = mid } else { lo = mid }
        }
        RiemannSolver::new(0.0).compute_lambda(l, r, hi)
    }

    fn is_nonvacuum(l: &RiemannData<f64>, r: &RiemannData<f64>) -> bool {
        let du = r.velocity - l.velocity;
        let limit = 2.0 * l.sound_speed / (l.gamma - 1.0) + 2.0 * r.sound_speed / (r.gamma - 1.0);
        du < limit
    }

    fn shock_tubes() -> Vec<(RiemannData<f64>, RiemannData<f64>)> {
        let g = 1.4;
        vec![
            (state(1.0, 0.0, 1.0, g), state(0.125, 0.0, 0.1, g)),
            (state(1.0, -2.0, 0.4, g), state(1.0, 2.0, 0.4, g)),
            (state(1.0, 0.0, 1000.0, g), state(1.0, 0.0, 0.01, g)),
            (state(1.0, 0.0, 0.01, g), state(1.0, 0.0, 100.0, g)),
            (state(5.99924, 19.5975, 460.894, g), state(5.99242, -6.19633, 46.0950, g)),
            (state(1.0, 2.0, 0.4, g), state(1.0, -2.0, 0.4, g)),
            (state(0.445, 0.698, 3.528, g), state(0.5, 0.0, 0.571, g)),
            (state(1.0, 0.0, 1.0, 5.0 / 3.0), state(0.125, 0.0, 0.1, 5.0 / 3.0)),
            (state(1.0, 0.0, 1.0, 3.0), state(0.125, 0.0, 0.1, 1.4)),
        ]
    }

    #[test]
    fn c_of_gamma_is_clamped_and_monotone() {
        let rs = RiemannSolver::new(0.0);
        assert_eq!(rs.c(5.0 / 3.0), 1.0);
        assert_eq!(rs.c(1.4), 1.0);
        assert_eq!(rs.c(3.0), 0.5 * f64::sqrt(2.0));
        assert_eq!(rs.c(7.0), 0.5 * f64::sqrt(2.0));

        let mut last = rs.c(5.0 / 3.0);
        for n in 1..1000 {
            let gamma = 5.0 / 3.0 + (3.0 - 5.0 / 3.0) * n as f64 / 1000.0;
            let c = rs.c(gamma);
            assert!(c <= last + 1e-15);
            assert!((c - last).abs() < 1e-3);
            last = c;
        }
        assert!((rs.c(5.0 / 3.0 + 1e-12) - 1.0).abs() < 1e-9);
        assert!((rs.c(3.0 - 1e-12) - f64::sqrt(5.0 / 6.0)).abs() < 1e-9);
        assert!(rs.c(3.0) < last);
    }

    #[test]
    fn estimate_bounds_the_exact_speed_on_shock_tubes() {
        let rs = RiemannSolver::new(0.0);

        for (l, r) in shock_tubes() {
            let exact = exact_max_wavespeed(&l, &r);
            let estimate = rs.compute(&l, &r);
            assert!(estimate >= exact * (1.0 - 1e-12), "{} < {} for {:?} {:?}", estimate, exact, l, r);
        }
    }

    #[test]
    fn sod_estimate_is_within_documented_tolerance() {
        let rs = RiemannSolver::new(0.0);
        let l = state(1.0, 0.0, 1.0, 1.4);
        let r = state(0.125, 0.0, 0.1, 1.4);
        let exact = exact_max_wavespeed(&l, &r);
        let estimate = rs.compute(&l, &r);

        assert!((exact - 1.7522).abs() < 1e-3);
        assert!(estimate >= exact);
        assert!(estimate <= 1.5 * exact);
        assert!((estimate - 2.5753).abs() < 1e-3);
    }

    #[test]
    fn identical_states_give_the_sound_speed() {
        let rs = RiemannSolver::new(0.0);
        let s = state(1.3, 0.0, 0.7, 1.4);
        let expected = rs.lambda3_plus(&s, s.pressure);
        assert!((expected - s.sound_speed).abs() < 1e-14);
        assert!((rs.compute(&s, &s) - s.sound_speed).abs() < 1e-12);
    }

    #[test]
    fn estimate_is_mirror_symmetric() {
        let rs = RiemannSolver::new(0.0);

        for (l, r) in shock_tubes() {
            let forward = rs.compute(&l, &r);
            let mirror = rs.compute(&r.reflect(), &l.reflect());
            assert!((forward - mirror).abs() <= 1e-12 * forward);
        }
    }

    #[test]
    fn batched_evaluation_agrees_with_scalar_evaluation() {
        let rs = RiemannSolver::new(0.0);
        let pairs = shock_tubes();

        for chunk in pairs.chunks(4) {
            let ls: Vec<_> = chunk.iter().map(|p| p.0).collect();
            let rs_: Vec<_> = chunk.iter().map(|p| p.1).collect();
            let batch = rs.compute(&RiemannData::<NumVec<4>>::gather(&ls), &RiemannData::<NumVec<4>>::gather(&rs_));

            for (lane, (l, r)) in chunk.iter().enumerate() {
                assert_eq!(batch[lane], rs.compute(l, r));
            }
        }
    }

    #[test]
    fn covolume_reduces_the_acoustic_compliance() {
        let ideal = RiemannSolver::new(0.0);
        let dense = RiemannSolver::new(0.5);
        assert!(dense.alpha(1.0, 1.4, 1.0) < ideal.alpha(1.0, 1.4, 1.0));
        assert!((dense.alpha(1.0, 1.4, 1.0) - 2.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn estimate_never_underestimates(
            rho_l in 1e-2f64..1e2, u_l in -3.0f64..3.0, p_l in 1e-2f64..1e2,
            rho_r in 1e-2f64..1e2, u_r in -3.0f64..3.0, p_r in 1e-2f64..1e2,
            g_l in prop::sample::select(vec![1.1, 1.4, 5.0 / 3.0, 2.0, 3.0]),
            g_r in prop::sample::select(vec![1.1, 1.4, 5.0 / 3.0, 2.0, 3.0]),
        ) {
            let l = state(rho_l, u_l, p_l, g_l);
            let r = state(rho_r, u_r, p_r, g_r);
            prop_assume!(is_nonvacuum(&l, &r));

            let exact = exact_max_wavespeed(&l, &r);
            let estimate = RiemannSolver::new(0.0).compute(&l, &r);
            prop_assert!(estimate >= exact * (1.0 - 1e-9));
        }
    }
}
