use crate::engine::{format_number, CalcError};

const KM_TO_MILES: f64 = 0.621371;
const KG_TO_POUNDS: f64 = 2.20462;
const METERS_TO_FEET: f64 = 3.28084;

/// Unit conversions. Distances and weights must be non-negative;
/// temperatures may go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    CelsiusToFahrenheit,
    KmToMiles,
    KgToPounds,
    MetersToFeet,
}

impl Conversion {
    pub fn apply(self, value: f64) -> Result<f64, CalcError> {
        let result = match self {
            Conversion::CelsiusToFahrenheit => value * 9.0 / 5.0 + 32.0,
            Conversion::KmToMiles => {
                non_negative(value, "Distance")?;
                value * KM_TO_MILES
            }
            Conversion::KgToPounds => {
                non_negative(value, "Weight")?;
                value * KG_TO_POUNDS
            }
            Conversion::MetersToFeet => {
                non_negative(value, "Length")?;
                value * METERS_TO_FEET
            }
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::Overflow)
        }
    }

    fn units(self) -> (&'static str, &'static str) {
        match self {
            Conversion::CelsiusToFahrenheit => ("°C", "°F"),
            Conversion::KmToMiles => ("km", "mi"),
            Conversion::KgToPounds => ("kg", "lb"),
            Conversion::MetersToFeet => ("m", "ft"),
        }
    }

    /// Human-readable summary for the transient display,
    /// e.g. `5km = 3.106855mi`.
    pub fn summary(self, input: f64, output: f64) -> String {
        let (from, to) = self.units();
        format!("{}{} = {}{}", format_number(input), from, format_number(output), to)
    }
}

fn non_negative(value: f64, what: &'static str) -> Result<(), CalcError> {
    if value < 0.0 {
        Err(CalcError::NegativeQuantity(what))
    } else {
        Ok(())
    }
}
