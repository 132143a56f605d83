use core::ops::{Add, Div, Index, Mul, Neg, Sub};




/**
 * The comparisons available to `Number::compare_and_select`.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

impl Comparison {
    #[inline(always)]
    fn test(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::LessThan => lhs < rhs,
            Comparison::LessThanOrEqual => lhs <= rhs,
            Comparison::GreaterThanOrEqual => lhs >= rhs,
        }
    }
}




/**
 * Arithmetic needed by the wavespeed estimate, implemented for scalars and
 * for lane vectors. Data-dependent control flow is only expressed through
 * `compare_and_select`, which evaluates both operands and blends them per
 * lane, so the same code path is valid for every lane of a batch.
 */
pub trait Number:
    Copy
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The number of independent values carried.
    const WIDTH: usize;

    fn splat(x: f64) -> Self;

    fn sqrt(self) -> Self;

    fn powf(self, exponent: Self) -> Self;

    fn min(self, other: Self) -> Self;

    fn max(self, other: Self) -> Self;

    /// Per lane: `cmp(lhs, rhs) ? on_true : on_false`.
    fn compare_and_select(cmp: Comparison, lhs: Self, rhs: Self, on_true: Self, on_false: Self) -> Self;

    fn positive_part(self) -> Self {
        self.max(Self::splat(0.0))
    }

    fn negative_part(self) -> Self {
        (-self).max(Self::splat(0.0))
    }
}

impl Number for f64 {
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(x: f64) -> Self {
        x
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline(always)]
    fn powf(self, exponent: Self) -> Self {
        f64::powf(self, exponent)
    }

    #[inline(always)]
    fn min(self, other: Self) -> Self {
        f64::min(self, other)
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }

    #[inline(always)]
    fn compare_and_select(cmp: Comparison, lhs: Self, rhs: Self, on_true: Self, on_false: Self) -> Self {
        if cmp.test(lhs, rhs) { on_true } else { on_false }
    }
}




/**
 * A statically-sized vector of `f64` lanes. Every operation is applied
 * lane-wise over a fixed-size array, which the compiler lowers to packed
 * instructions for the common widths (2, 4, 8).
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumVec<const W: usize> {
    data: [f64; W],
}




// ============================================================================
impl<const W: usize> NumVec<W> {

    pub fn new(data: [f64; W]) -> Self {
        Self { data }
    }

    pub fn from_fn<F: FnMut(usize) -> f64>(mut f: F) -> Self {
        let mut data = [0.0; W];

        for (i, x) in data.iter_mut().enumerate() {
            *x = f(i)
        }
        Self { data }
    }

    pub fn to_array(self) -> [f64; W] {
        self.data
    }

    pub fn lane(&self, i: usize) -> f64 {
        self.data[i]
    }

    #[inline(always)]
    fn map<F: Fn(f64) -> f64>(self, f: F) -> Self {
        let mut data = self.data;

        for x in data.iter_mut() {
            *x = f(*x)
        }
        Self { data }
    }

    #[inline(always)]
    fn zip_map<F: Fn(f64, f64) -> f64>(self, other: Self, f: F) -> Self {
        let mut data = self.data;

        for (x, y) in data.iter_mut().zip(other.data.iter()) {
            *x = f(*x, *y)
        }
        Self { data }
    }
}




// ============================================================================
impl<const W: usize> Add for NumVec<W> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_map(other, |a, b| a + b)
    }
}

impl<const W: usize> Sub for NumVec<W> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_map(other, |a, b| a - b)
    }
}

impl<const W: usize> Mul for NumVec<W> {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.zip_map(other, |a, b| a * b)
    }
}

impl<const W: usize> Div for NumVec<W> {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        self.zip_map(other, |a, b| a / b)
    }
}

impl<const W: usize> Neg for NumVec<W> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|a| -a)
    }
}

impl<const W: usize> Index<usize> for NumVec<W> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}




// ============================================================================
impl<const W: usize> Number for NumVec<W> {
    const WIDTH: usize = W;

    fn splat(x: f64) -> Self {
        Self { data: [x; W] }
    }

    fn sqrt(self) -> Self {
        self.map(f64::sqrt)
    }

    fn powf(self, exponent: Self) -> Self {
        self.zip_map(exponent, f64::powf)
    }

    fn min(self, other: Self) -> Self {
        self.zip_map(other, f64::min)
    }

    fn max(self, other: Self) -> Self {
        self.zip_map(other, f64::max)
    }

    fn compare_and_select(cmp: Comparison, lhs: Self, rhs: Self, on_true: Self, on_false: Self) -> Self {
        let mut data = on_false.data;

        for (i, x) in data.iter_mut().enumerate() {
            let mask = cmp.test(lhs.data[i], rhs.data[i]);
            *x = if mask { on_true.data[i] } else { *x };
        }
        Self { data }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Comparison, NumVec, Number};

    #[test]
    fn lane_arithmetic_matches_scalar_arithmetic() {
        let a = NumVec::new([1.0, 2.0, 3.0, 4.0]);
        let b = NumVec::new([0.5, 0.25, 2.0, 8.0]);
        let c = (a + b) * a / b - a;

        for i in 0..4 {
            let (x, y) = (a[i], b[i]);
            assert_eq!(c[i], (x + y) * x / y - x);
        }
    }

    #[test]
    fn compare_and_select_blends_per_lane() {
        let lhs = NumVec::new([1.0, 2.0, 3.0, 4.0]);
        let rhs = NumVec::splat(2.5);
        let t = NumVec::splat(1.0);
        let f = NumVec::splat(0.0);

        let lt = NumVec::compare_and_select(Comparison::LessThan, lhs, rhs, t, f);
        let ge = NumVec::compare_and_select(Comparison::GreaterThanOrEqual, lhs, rhs, t, f);
        assert_eq!(lt.to_array(), [1.0, 1.0, 0.0, 0.0]);
        assert_eq!(ge.to_array(), [0.0, 0.0, 1.0, 1.0]);

        let le = NumVec::compare_and_select(Comparison::LessThanOrEqual, lhs, NumVec::splat(2.0), t, f);
        assert_eq!(le.to_array(), [1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn positive_and_negative_parts_split_the_sign() {
        let x = NumVec::new([-2.0, 0.0, 3.0]);
        assert_eq!(x.positive_part().to_array(), [0.0, 0.0, 3.0]);
        assert_eq!(x.negative_part().to_array(), [2.0, 0.0, 0.0]);
        assert_eq!((-1.5f64).negative_part(), 1.5);
    }
}
