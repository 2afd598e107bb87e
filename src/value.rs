//! value.rs
//! Nominal value with a one-sigma uncertainty, the only numeric currency
//! accepted across the formula boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A nominal value with its standard deviation.
///
/// A `NaN` nominal is the "undefined" sentinel a formula returns when its
/// inputs fall outside the range it was fitted for. Arithmetic propagates
/// uncertainty to first order assuming independent operands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UValue {
    pub nominal: f64,
    pub std_dev: f64,
}

impl UValue {
    pub const fn new(nominal: f64, std_dev: f64) -> Self {
        Self { nominal, std_dev }
    }

    /// A value known without uncertainty (measured inputs, constants).
    pub const fn exact(nominal: f64) -> Self {
        Self { nominal, std_dev: 0.0 }
    }

    pub const fn undefined() -> Self {
        Self { nominal: f64::NAN, std_dev: f64::NAN }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.nominal.is_nan()
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.nominal * k, (self.std_dev * k).abs())
    }

    pub fn powf(self, n: f64) -> Self {
        let nominal = self.nominal.powf(n);
        let derivative = n * self.nominal.powf(n - 1.0);
        Self::new(nominal, (derivative * self.std_dev).abs())
    }

    pub fn exp(self) -> Self {
        let nominal = self.nominal.exp();
        Self::new(nominal, (nominal * self.std_dev).abs())
    }

    /// Relative uncertainty, `0.0` for a zero nominal.
    pub fn relative(&self) -> f64 {
        if self.nominal == 0.0 { 0.0 } else { (self.std_dev / self.nominal).abs() }
    }
}

impl fmt::Display for UValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            return write!(f, "undefined");
        }
        match f.precision() {
            Some(p) => write!(f, "{:.*} ± {:.*}", p, self.nominal, p, self.std_dev),
            None => write!(f, "{} ± {}", self.nominal, self.std_dev),
        }
    }
}

impl Add for UValue {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.nominal + rhs.nominal, self.std_dev.hypot(rhs.std_dev))
    }
}

impl Sub for UValue {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.nominal - rhs.nominal, self.std_dev.hypot(rhs.std_dev))
    }
}

impl Mul for UValue {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let sd = (rhs.nominal * self.std_dev).hypot(self.nominal * rhs.std_dev);
        Self::new(self.nominal * rhs.nominal, sd)
    }
}

impl Div for UValue {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let b2 = rhs.nominal * rhs.nominal;
        let sd = (self.std_dev / rhs.nominal).hypot(self.nominal * rhs.std_dev / b2);
        Self::new(self.nominal / rhs.nominal, sd)
    }
}
