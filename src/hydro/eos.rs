use serde::{Deserialize, Serialize};




/**
 * The material model closing the Euler equations. This is a closed set of
 * variants, dispatched by tag, so that the closure can be inlined into the
 * per-node loops.
 *
 * All relations take the volumetric internal energy `e_vol = rho * e` where
 * a pressure is computed, and return the specific internal energy `e` where
 * an energy is computed. At fixed density `pressure` and
 * `specific_internal_energy` are inverses of one another on the physical
 * domain (`p > 0`, `1 - b rho > 0`). No error is raised for states outside
 * that domain; they surface later as invariant domain violations.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquationOfState {
    PolytropicGas {
        gamma: f64,
    },
    NobleAbelStiffenedGas {
        gamma: f64,
        b: f64,
        q: f64,
        pinf: f64,
    },
    VanDerWaals {
        gamma: f64,
        a: f64,
        b: f64,
    },
}




// ============================================================================
impl EquationOfState {

    pub fn polytropic(gamma: f64) -> Self {
        Self::PolytropicGas { gamma }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PolytropicGas { .. } => "polytropic gas",
            Self::NobleAbelStiffenedGas { .. } => "noble-abel-stiffened gas",
            Self::VanDerWaals { .. } => "van der waals",
        }
    }

    pub fn gamma(&self) -> f64 {
        match *self {
            Self::PolytropicGas { gamma } => gamma,
            Self::NobleAbelStiffenedGas { gamma, .. } => gamma,
            Self::VanDerWaals { gamma, .. } => gamma,
        }
    }

    /// Pressure from density and volumetric internal energy.
    #[inline]
    pub fn pressure(&self, rho: f64, e_vol: f64) -> f64 {
        match *self {
            Self::PolytropicGas { gamma } => (gamma - 1.0) * e_vol,
            Self::NobleAbelStiffenedGas { gamma, b, q, pinf } => {
                let cov = 1.0 - b * rho;
                (gamma - 1.0) * (e_vol - q * rho) / cov - gamma * pinf
            }
            Self::VanDerWaals { gamma, a, b } => {
                let cov = 1.0 - b * rho;
                (gamma - 1.0) * (e_vol + a * rho * rho) / cov - a * rho * rho
            }
        }
    }

    /// Specific internal energy from density and pressure.
    #[inline]
    pub fn specific_internal_energy(&self, rho: f64, p: f64) -> f64 {
        match *self {
            Self::PolytropicGas { gamma } => p / (rho * (gamma - 1.0)),
            Self::NobleAbelStiffenedGas { gamma, b, q, pinf } => {
                let cov = 1.0 - b * rho;
                (p + gamma * pinf) / (gamma - 1.0) * cov / rho + q
            }
            Self::VanDerWaals { gamma, a, b } => {
                let cov = 1.0 - b * rho;
                (p + a * rho * rho) * cov / (rho * (gamma - 1.0)) - a * rho
            }
        }
    }

    /// The covolume used to linearize this material for the Riemann solver.
    pub fn interpolation_b(&self) -> f64 {
        match *self {
            Self::PolytropicGas { .. } => 0.0,
            Self::NobleAbelStiffenedGas { b, .. } => b,
            Self::VanDerWaals { b, .. } => b,
        }
    }

    /// The reference specific internal energy of the linearization.
    pub fn interpolation_q(&self) -> f64 {
        match *self {
            Self::NobleAbelStiffenedGas { q, .. } => q,
            _ => 0.0,
        }
    }

    /// The reference pressure of the linearization.
    pub fn interpolation_pinf(&self) -> f64 {
        match *self {
            Self::NobleAbelStiffenedGas { pinf, .. } => pinf,
            _ => 0.0,
        }
    }

    /// Whether a state with the given density and volumetric internal
    /// energy lies in the invariant domain: positive density, covolume
    /// constraint satisfied, and positive (shifted) pressure.
    pub fn is_admissible(&self, rho: f64, e_vol: f64) -> bool {
        let cov = 1.0 - self.interpolation_b() * rho;
        let shifted = self.pressure(rho, e_vol) + self.interpolation_pinf();
        rho > 0.0 && cov > 0.0 && shifted > 0.0
    }
}

impl Default for EquationOfState {
    fn default() -> Self {
        Self::PolytropicGas { gamma: 7.0 / 5.0 }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::EquationOfState;
    use proptest::prelude::*;

    fn materials() -> Vec<EquationOfState> {
        vec![
            EquationOfState::polytropic(1.4),
            EquationOfState::NobleAbelStiffenedGas { gamma: 1.19, b: 6.7e-4, q: -1.177788e6, pinf: 0.0 },
            EquationOfState::NobleAbelStiffenedGas { gamma: 4.4, b: 0.0, q: 0.0, pinf: 6.0e3 },
            EquationOfState::VanDerWaals { gamma: 1.4, a: 0.5, b: 0.1 },
        ]
    }

    #[test]
    fn polytropic_gas_matches_gamma_law() {
        let eos = EquationOfState::polytropic(1.4);
        assert!((eos.pressure(1.0, 2.5) - 1.0).abs() < 1e-14);
        assert!((eos.specific_internal_energy(2.0, 0.8) - 1.0).abs() < 1e-14);
        assert_eq!(eos.interpolation_b(), 0.0);
    }

    #[test]
    fn stiffened_gas_reduces_to_polytropic_gas() {
        let nasg = EquationOfState::NobleAbelStiffenedGas { gamma: 1.4, b: 0.0, q: 0.0, pinf: 0.0 };
        let ideal = EquationOfState::polytropic(1.4);
        assert_eq!(nasg.pressure(0.7, 3.0), ideal.pressure(0.7, 3.0));
        assert!((nasg.specific_internal_energy(0.7, 3.0) - ideal.specific_internal_energy(0.7, 3.0)).abs() < 1e-14);
    }

    #[test]
    fn admissibility_rejects_unphysical_states() {
        let eos = EquationOfState::VanDerWaals { gamma: 1.4, a: 0.0, b: 0.5 };
        assert!(eos.is_admissible(1.0, 1.0));
        assert!(!eos.is_admissible(-1.0, 1.0));
        assert!(!eos.is_admissible(2.5, 1.0));
        assert!(!EquationOfState::polytropic(1.4).is_admissible(1.0, -1e-3));
    }

    #[test]
    fn equation_of_state_is_tagged_by_variant_name() {
        use ciborium::value::Value;

        let eos = EquationOfState::NobleAbelStiffenedGas { gamma: 1.4, b: 0.1, q: 0.0, pinf: 0.0 };
        let value = Value::serialized(&eos).unwrap();
        let tag = value
            .as_map()
            .and_then(|map| map.iter().find(|(k, _)| k.as_text() == Some("type")))
            .and_then(|(_, v)| v.as_text());
        assert_eq!(tag, Some("noble_abel_stiffened_gas"));
        assert_eq!(value.deserialized::<EquationOfState>().unwrap(), eos);
    }

    proptest! {
        #[test]
        fn pressure_and_energy_relations_are_inverses(
            which in 0usize..4,
            rho in 0.05f64..1.0,
            p in 1e-2f64..1e3,
        ) {
            let eos = materials()[which];
            let e = eos.specific_internal_energy(rho, p);
            let p_back = eos.pressure(rho, rho * e);
            prop_assert!((p_back - p).abs() <= 1e-8 * (1.0 + p.abs() + e.abs() * rho));
        }
    }
}
