use std::ops::{Add, Div, Mul, Sub};
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::num_vec::{NumVec, Number};
use super::eos::EquationOfState;




// ============================================================================
/**
 * Conserved variables of the 1-D Euler equations: mass density, momentum
 * density along the mesh axis, and total energy density.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conserved(pub f64, pub f64, pub f64);

/**
 * Primitive variables of the 1-D Euler equations: mass density, velocity,
 * and gas pressure.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitive(pub f64, pub f64, pub f64);

/**
 * The state on one side of an interface, as seen by the Riemann solver:
 * density, normal velocity, pressure, effective adiabatic exponent, and
 * sound speed. The number type is either `f64` (one state) or a lane
 * vector (one state per lane).
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiemannData<N> {
    pub density: N,
    pub velocity: N,
    pub pressure: N,
    pub gamma: N,
    pub sound_speed: N,
}




// ============================================================================
impl Conserved {

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn momentum(&self) -> f64 {
        self.1
    }

    pub fn energy_density(&self) -> f64 {
        self.2
    }

    pub fn velocity(&self) -> f64 {
        self.1 / self.0
    }

    /// Volumetric internal energy, `E - m^2 / (2 rho)`.
    pub fn internal_energy(&self) -> f64 {
        self.2 - 0.5 * self.1 * self.1 / self.0
    }

    pub fn gas_pressure(&self, eos: &EquationOfState) -> f64 {
        eos.pressure(self.0, self.internal_energy())
    }

    pub fn is_admissible(&self, eos: &EquationOfState) -> bool {
        eos.is_admissible(self.0, self.internal_energy())
    }

    /// Checked recovery of the primitive state. This is for use outside the
    /// hot path (initial data, output); the update operator builds Riemann
    /// data directly and checks admissibility on the result instead.
    pub fn to_primitive(&self, eos: &EquationOfState) -> Result<Primitive, Error> {
        let d = self.mass_density();
        let cov = 1.0 - eos.interpolation_b() * d;
        let pg = self.gas_pressure(eos);

        if d < 0.0 {
            Err(Error::NegativeMassDensity(d))
        } else if cov <= 0.0 {
            Err(Error::CovolumeExceeded(cov))
        } else if pg + eos.interpolation_pinf() < 0.0 {
            Err(Error::NegativeGasPressure(pg))
        } else {
            Ok(Primitive(d, self.velocity(), pg))
        }
    }

    /// Build the Riemann data of this state along the unit normal `n`
    /// (`+1` or `-1` in one dimension). No checks are made: the state must
    /// lie in the invariant domain.
    #[inline]
    pub fn riemann_data(&self, eos: &EquationOfState, n: f64) -> RiemannData<f64> {
        let rho = self.mass_density();
        let rho_e = self.internal_energy();
        let b = eos.interpolation_b();
        let q = eos.interpolation_q();
        let pinf = eos.interpolation_pinf();

        let cov = 1.0 - b * rho;
        let p = eos.pressure(rho, rho_e) + pinf;
        let gamma = 1.0 + p * cov / (rho_e - q * rho - pinf * cov);
        let a = f64::sqrt(gamma * p / (rho * cov));

        RiemannData {
            density: rho,
            velocity: self.velocity() * n,
            pressure: p,
            gamma,
            sound_speed: a,
        }
    }

    /// The flux of conserved quantities through a face with unit normal
    /// along the mesh axis.
    pub fn flux_vector(&self, eos: &EquationOfState) -> Conserved {
        let pg = self.gas_pressure(eos);
        let vn = self.velocity();

        Conserved(
            self.0 * vn,
            self.1 * vn + pg,
            self.2 * vn + pg * vn)
    }
}




// ============================================================================
impl Primitive {

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn velocity(&self) -> f64 {
        self.1
    }

    pub fn gas_pressure(&self) -> f64 {
        self.2
    }

    pub fn to_conserved(&self, eos: &EquationOfState) -> Conserved {
        let d = self.mass_density();
        let v = self.velocity();
        let e = eos.specific_internal_energy(d, self.gas_pressure());

        Conserved(
            d,
            d * v,
            d * (0.5 * v * v + e))
    }
}




// ============================================================================
impl RiemannData<f64> {

    /// Riemann data of a polytropic gas given in primitive variables.
    pub fn polytropic(density: f64, velocity: f64, pressure: f64, gamma: f64) -> Self {
        Self {
            density,
            velocity,
            pressure,
            gamma,
            sound_speed: f64::sqrt(gamma * pressure / density),
        }
    }

    /// The same state seen along the opposite normal.
    pub fn reflect(&self) -> Self {
        Self { velocity: -self.velocity, ..*self }
    }
}

impl<const W: usize> RiemannData<NumVec<W>> {

    /// Transpose `W` scalar states into lanes. Fewer than `W` states may be
    /// given; the trailing lanes then repeat the last state.
    pub fn gather(states: &[RiemannData<f64>]) -> Self {
        let last = states.len().saturating_sub(1);
        let lane = |i: usize| &states[i.min(last)];

        Self {
            density: NumVec::from_fn(|i| lane(i).density),
            velocity: NumVec::from_fn(|i| lane(i).velocity),
            pressure: NumVec::from_fn(|i| lane(i).pressure),
            gamma: NumVec::from_fn(|i| lane(i).gamma),
            sound_speed: NumVec::from_fn(|i| lane(i).sound_speed),
        }
    }
}

impl<N: Number> RiemannData<N> {
    pub fn as_tuple(&self) -> (N, N, N, N, N) {
        (self.density, self.velocity, self.pressure, self.gamma, self.sound_speed)
    }
}




// ============================================================================
impl Add<Conserved> for Conserved {
    type Output = Conserved;
    fn add(self, u: Self) -> Conserved {
        Conserved(self.0 + u.0, self.1 + u.1, self.2 + u.2)
    }
}

impl Sub<Conserved> for Conserved {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1, self.2 - u.2)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a, self.2 * a)
    }
}

impl Div<f64> for Conserved {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self(self.0 / a, self.1 / a, self.2 / a)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Conserved, Primitive, RiemannData};
    use crate::hydro::eos::EquationOfState;
    use crate::num_vec::NumVec;

    #[test]
    fn riemann_data_of_polytropic_gas_recovers_gamma_and_sound_speed() {
        let eos = EquationOfState::polytropic(1.4);
        let u = Primitive(0.5, 0.3, 2.0).to_conserved(&eos);
        let r = u.riemann_data(&eos, 1.0);
        let e = RiemannData::polytropic(0.5, 0.3, 2.0, 1.4);

        assert!((r.gamma - 1.4).abs() < 1e-12);
        assert!((r.pressure - e.pressure).abs() < 1e-12);
        assert!((r.sound_speed - e.sound_speed).abs() < 1e-12);
        assert!((u.riemann_data(&eos, -1.0).velocity + 0.3).abs() < 1e-12);
    }

    #[test]
    fn riemann_data_of_stiffened_gas_recovers_gamma() {
        let eos = EquationOfState::NobleAbelStiffenedGas { gamma: 1.19, b: 6.7e-4, q: -1.0e3, pinf: 2.0e3 };
        let u = Primitive(10.0, 0.0, 5.0e3).to_conserved(&eos);
        let r = u.riemann_data(&eos, 1.0);
        let cov = 1.0 - 6.7e-4 * 10.0;

        assert!((r.gamma - 1.19).abs() < 1e-9);
        assert!((r.pressure - 7.0e3).abs() < 1e-6);
        assert!((r.sound_speed - f64::sqrt(1.19 * 7.0e3 / (10.0 * cov))).abs() < 1e-9);
    }

    #[test]
    fn checked_recovery_reports_unphysical_states() {
        let eos = EquationOfState::polytropic(1.4);
        assert!(Conserved(-1.0, 0.0, 1.0).to_primitive(&eos).is_err());
        assert!(Conserved(1.0, 2.0, 1.0).to_primitive(&eos).is_err());
        let p = Conserved(1.0, 0.0, 2.5).to_primitive(&eos).unwrap();
        assert!((p.gas_pressure() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gather_pads_a_partial_batch_with_the_last_state() {
        let a = RiemannData::polytropic(1.0, 0.0, 1.0, 1.4);
        let b = RiemannData::polytropic(0.125, 0.0, 0.1, 1.4);
        let batch = RiemannData::<NumVec<4>>::gather(&[a, b]);
        assert_eq!(batch.density.to_array(), [1.0, 0.125, 0.125, 0.125]);
    }
}
