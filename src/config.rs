use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::Error;




/**
 * The explicit Runge-Kutta schemes offered by the time integrator. All three
 * are third order. Each is carried out as a sequence of forward-Euler
 * sub-steps of the update operator with a common step size `tau`, and one
 * step of the scheme covers `substeps() * tau`.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSteppingScheme {
    /// SSPRK(3,3;1/3): three stages, one sub-step per step.
    ///
    /// ```text
    ///   0 |
    ///   1 |  1
    /// 1/2 | 1/4 1/4
    /// ----+------------
    ///     | 1/6 1/6 2/3
    /// ```
    #[serde(rename = "ssprk_33")]
    Ssprk33,

    /// RK(3,3;1): three stages, three sub-steps per step.
    ///
    /// ```text
    ///   0 |
    /// 1/3 | 1/3
    /// 2/3 |  0  2/3
    /// ----+------------
    ///     | 1/4  0  3/4
    /// ```
    #[serde(rename = "erk_33")]
    Erk33,

    /// RK(4,3;1): four stages, four sub-steps per step.
    ///
    /// ```text
    ///   0 |
    /// 1/4 | 1/4
    /// 1/2 |  0  1/2
    /// 3/4 |  0  1/4 1/2
    /// ----+----------------
    ///     |  0  2/3 -1/3 2/3
    /// ```
    #[serde(rename = "erk_43")]
    Erk43,
}

/**
 * What the time integrator does when a step leaves the invariant domain.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CFLRecoveryStrategy {
    /// Accept the step and flag the violation.
    None,
    /// Redo the whole step from its initial state with `cfl_min`.
    BangBangControl,
}

/**
 * The immutable configuration of a time integrator.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepContext {
    pub cfl_min: f64,
    pub cfl_max: f64,
    pub cfl_recovery_strategy: CFLRecoveryStrategy,
    pub time_stepping_scheme: TimeSteppingScheme,
}




// ============================================================================
impl TimeSteppingScheme {

    pub const ALL: [TimeSteppingScheme; 3] = [Self::Ssprk33, Self::Erk33, Self::Erk43];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ssprk33 => "ssprk 33",
            Self::Erk33 => "erk 33",
            Self::Erk43 => "erk 43",
        }
    }

    pub fn num_stages(&self) -> usize {
        self.weights().len()
    }

    /// The number of forward-Euler sub-steps of size `tau` that make up one
    /// step of the scheme.
    pub fn substeps(&self) -> usize {
        match self {
            Self::Ssprk33 => 1,
            Self::Erk33 => 3,
            Self::Erk43 => 4,
        }
    }

    /// Row `s` of the Butcher matrix: the weights of the stage derivatives
    /// `0..s` in stage `s`.
    pub fn stage_weights(&self, s: usize) -> &'static [f64] {
        const SSPRK_33: [&[f64]; 3] = [&[], &[1.0], &[0.25, 0.25]];
        const ERK_33: [&[f64]; 3] = [&[], &[1.0 / 3.0], &[0.0, 2.0 / 3.0]];
        const ERK_43: [&[f64]; 4] = [&[], &[0.25], &[0.0, 0.5], &[0.0, 0.25, 0.5]];

        match self {
            Self::Ssprk33 => SSPRK_33[s],
            Self::Erk33 => ERK_33[s],
            Self::Erk43 => ERK_43[s],
        }
    }

    /// The weights of the stage derivatives in the final combination.
    pub fn weights(&self) -> &'static [f64] {
        match self {
            Self::Ssprk33 => &[1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0],
            Self::Erk33 => &[0.25, 0.0, 0.75],
            Self::Erk43 => &[0.0, 2.0 / 3.0, -1.0 / 3.0, 2.0 / 3.0],
        }
    }

    /// The stage times as fractions of the step.
    pub fn nodes(&self) -> &'static [f64] {
        match self {
            Self::Ssprk33 => &[0.0, 1.0, 0.5],
            Self::Erk33 => &[0.0, 1.0 / 3.0, 2.0 / 3.0],
            Self::Erk43 => &[0.0, 0.25, 0.5, 0.75],
        }
    }
}

impl fmt::Display for TimeSteppingScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TimeSteppingScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "ssprk 33" => Ok(Self::Ssprk33),
            "erk 33" => Ok(Self::Erk33),
            "erk 43" => Ok(Self::Erk43),
            _ => Err(Error::UnknownScheme(s.to_string())),
        }
    }
}




// ============================================================================
impl CFLRecoveryStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BangBangControl => "bang bang control",
        }
    }
}

impl fmt::Display for CFLRecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CFLRecoveryStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" => Ok(Self::None),
            "bang bang control" => Ok(Self::BangBangControl),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(|c: char| c == '_' || c == '-', " ")
}




// ============================================================================
impl StepContext {

    pub fn new(cfl_min: f64, cfl_max: f64, cfl_recovery_strategy: CFLRecoveryStrategy, time_stepping_scheme: TimeSteppingScheme) -> Self {
        Self { cfl_min, cfl_max, cfl_recovery_strategy, time_stepping_scheme }
    }

    /// Check that `0 < cfl_min <= cfl_max` with both numbers finite.
    pub fn validate(&self) -> Result<(), Error> {
        let Self { cfl_min, cfl_max, .. } = *self;

        if cfl_min.is_finite() && cfl_max.is_finite() && 0.0 < cfl_min && cfl_min <= cfl_max {
            Ok(())
        } else {
            Err(Error::InvalidCfl { cfl_min, cfl_max })
        }
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self {
            cfl_min: 0.45,
            cfl_max: 0.9,
            cfl_recovery_strategy: CFLRecoveryStrategy::BangBangControl,
            time_stepping_scheme: TimeSteppingScheme::Erk33,
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{CFLRecoveryStrategy, StepContext, TimeSteppingScheme};
    use crate::error::Error;

    #[test]
    fn tableaux_are_consistent() {
        for scheme in TimeSteppingScheme::ALL.iter() {
            let b: f64 = scheme.weights().iter().sum();
            assert!((b - 1.0).abs() < 1e-14, "{}", scheme);
            assert_eq!(scheme.nodes().len(), scheme.num_stages());

            for s in 0..scheme.num_stages() {
                let a = scheme.stage_weights(s);
                assert_eq!(a.len(), s);
                assert!((a.iter().sum::<f64>() - scheme.nodes()[s]).abs() < 1e-14, "{} stage {}", scheme, s);
            }
        }
    }

    #[test]
    fn tableaux_have_third_order_conditions() {
        for scheme in TimeSteppingScheme::ALL.iter() {
            let b = scheme.weights();
            let c = scheme.nodes();
            let bc: f64 = b.iter().zip(c).map(|(b, c)| b * c).sum();
            let bcc: f64 = b.iter().zip(c).map(|(b, c)| b * c * c).sum();
            let bac: f64 = (0..scheme.num_stages())
                .map(|s| b[s] * scheme.stage_weights(s).iter().zip(c).map(|(a, c)| a * c).sum::<f64>())
                .sum();
            assert!((bc - 0.5).abs() < 1e-14);
            assert!((bcc - 1.0 / 3.0).abs() < 1e-14);
            assert!((bac - 1.0 / 6.0).abs() < 1e-14);
        }
    }

    #[test]
    fn names_parse_with_spaces_or_underscores() {
        assert_eq!("ssprk 33".parse::<TimeSteppingScheme>(), Ok(TimeSteppingScheme::Ssprk33));
        assert_eq!("erk_43".parse::<TimeSteppingScheme>(), Ok(TimeSteppingScheme::Erk43));
        assert_eq!("bang bang control".parse::<CFLRecoveryStrategy>(), Ok(CFLRecoveryStrategy::BangBangControl));
        assert_eq!("none".parse::<CFLRecoveryStrategy>(), Ok(CFLRecoveryStrategy::None));
        assert_eq!("rk4".parse::<TimeSteppingScheme>(), Err(Error::UnknownScheme("rk4".into())));
        assert!("sometimes".parse::<CFLRecoveryStrategy>().is_err());

        for scheme in TimeSteppingScheme::ALL.iter() {
            assert_eq!(scheme.to_string().parse::<TimeSteppingScheme>().as_ref(), Ok(scheme));
        }
    }

    #[test]
    fn step_context_rejects_invalid_cfl_numbers() {
        let context = StepContext::default();
        assert!(context.validate().is_ok());
        assert!(StepContext { cfl_min: 0.0, ..context }.validate().is_err());
        assert!(StepContext { cfl_min: 0.9, cfl_max: 0.5, ..context }.validate().is_err());
        assert!(StepContext { cfl_max: f64::NAN, ..context }.validate().is_err());
        assert!(StepContext { cfl_min: 0.5, cfl_max: 0.5, ..context }.validate().is_ok());
    }

    #[test]
    fn step_context_uses_snake_case_names() {
        use ciborium::value::Value;

        let value = Value::serialized(&StepContext::default()).unwrap();
        let text = format!("{:?}", value);
        assert!(text.contains("bang_bang_control"));
        assert!(text.contains("erk_33"));
        assert_eq!(value.deserialized::<StepContext>().unwrap(), StepContext::default());
    }
}
