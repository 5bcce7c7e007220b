use crate::engine::CalcError;

/// Unary scientific functions. Trig operands are degrees, matching
/// the on-screen keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SciFunction {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Square,
}

impl SciFunction {
    pub fn apply(self, value: f64) -> Result<f64, CalcError> {
        let result = match self {
            SciFunction::Sin => value.to_radians().sin(),
            SciFunction::Cos => value.to_radians().cos(),
            SciFunction::Tan => {
                if tan_undefined(value) {
                    return Err(CalcError::TanUndefined(value));
                }
                value.to_radians().tan()
            }
            SciFunction::Log => {
                if value <= 0.0 {
                    return Err(CalcError::LogDomain("log"));
                }
                value.log10()
            }
            SciFunction::Ln => {
                if value <= 0.0 {
                    return Err(CalcError::LogDomain("ln"));
                }
                value.ln()
            }
            SciFunction::Sqrt => {
                if value < 0.0 {
                    return Err(CalcError::SqrtDomain);
                }
                value.sqrt()
            }
            SciFunction::Square => value * value,
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::Overflow)
        }
    }
}

// Odd multiples of 90°, where cosine vanishes.
fn tan_undefined(degrees: f64) -> bool {
    ((degrees.abs() % 180.0) - 90.0).abs() < 1e-9
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn trig_interprets_degrees() {
        assert!(close(SciFunction::Sin.apply(90.0).unwrap(), 1.0));
        assert!(close(SciFunction::Cos.apply(0.0).unwrap(), 1.0));
        assert!(close(SciFunction::Cos.apply(60.0).unwrap(), 0.5));
        assert!(close(SciFunction::Tan.apply(45.0).unwrap(), 1.0));
    }

    #[test]
    fn tan_rejects_its_asymptotes() {
        assert_eq!(SciFunction::Tan.apply(90.0), Err(CalcError::TanUndefined(90.0)));
        assert_eq!(SciFunction::Tan.apply(270.0), Err(CalcError::TanUndefined(270.0)));
        assert_eq!(SciFunction::Tan.apply(-90.0), Err(CalcError::TanUndefined(-90.0)));
        assert!(SciFunction::Tan.apply(89.9).is_ok());
    }

    #[test]
    fn logarithms_need_positive_operands() {
        assert!(close(SciFunction::Log.apply(100.0).unwrap(), 2.0));
        assert!(close(SciFunction::Ln.apply(std::f64::consts::E).unwrap(), 1.0));
        assert_eq!(SciFunction::Log.apply(0.0), Err(CalcError::LogDomain("log")));
        assert_eq!(SciFunction::Ln.apply(-1.0), Err(CalcError::LogDomain("ln")));
    }

    #[test]
    fn sqrt_rejects_negatives() {
        assert!(close(SciFunction::Sqrt.apply(16.0).unwrap(), 4.0));
        assert_eq!(SciFunction::Sqrt.apply(-4.0), Err(CalcError::SqrtDomain));
    }

    #[test]
    fn square_overflow_is_caught() {
        assert!(close(SciFunction::Square.apply(12.0).unwrap(), 144.0));
        assert_eq!(SciFunction::Square.apply(1e200), Err(CalcError::Overflow));
    }

    #[test]
    fn constants() {
        assert!(close(Constant::Pi.value(), std::f64::consts::PI));
        assert!(close(Constant::E.value(), std::f64::consts::E));
    }
}
