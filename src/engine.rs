use crate::conversions::Conversion;
use crate::history::History;
use crate::scientific::{Constant, SciFunction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest entry the user can type. Computed results may render longer.
pub const MAX_ENTRY_LEN: usize = 16;

/// How long a transient notice stays on the screen before it reverts.
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "−",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> Result<f64, CalcError> {
        let result = match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => {
                if b == 0.0 {
                    return Err(CalcError::DivideByZero);
                }
                a / b
            }
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::Overflow)
        }
    }
}

/// Behavior of the % key. `PercentOfTotal` matches iOS calculators:
/// with a pending operation, `200 + 10 %` turns the entry into 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PercentPolicy {
    Simple,
    #[default]
    PercentOfTotal,
}

/// Canonical input tokens. The UI maps button labels and keyboard
/// keys onto these; the evaluator never sees raw strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key {
    Digit(u8),
    DecimalPoint,
    Operator(Operator),
    Equals,
    Clear,
    ClearAll,
    Backspace,
    ToggleSign,
    Percent,
    Function(SciFunction),
    Constant(Constant),
    Convert(Conversion),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalcError {
    #[error("'{0}' is not a number")]
    BadEntry(String),
    #[error("Cannot divide by zero")]
    DivideByZero,
    #[error("{0} needs a positive number")]
    LogDomain(&'static str),
    #[error("Square root needs a non-negative number")]
    SqrtDomain,
    #[error("tan is undefined at {0}°")]
    TanUndefined(f64),
    #[error("{0} cannot be negative")]
    NegativeQuantity(&'static str),
    #[error("Result is too large")]
    Overflow,
    #[error("Entry is limited to 16 characters")]
    EntryTooLong,
}

/// A short message shown in place of the display, reverting after
/// `duration`. Conversion summaries and errors both use this.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub duration: Duration,
}

impl Notice {
    pub fn new(text: String) -> Self {
        Self { text, duration: NOTICE_DURATION }
    }
}

/// What the UI renders after a key press.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub display: String,
    pub notice: Option<Notice>,
}

/// The calculator state machine: entry buffer, running total, pending
/// operator, and the history log. All presses go through [`press`];
/// on error the state is left exactly as it was.
///
/// [`press`]: Evaluator::press
pub struct Evaluator {
    entry: String,
    total: Option<f64>,
    pending: Option<Operator>,
    history: History,
    percent_policy: PercentPolicy,
}

impl Evaluator {
    pub fn new(percent_policy: PercentPolicy) -> Self {
        Self {
            entry: "0".to_string(),
            total: None,
            pending: None,
            history: History::new(),
            percent_policy,
        }
    }

    /// Display string for the current entry. Negative numbers are
    /// wrapped in parentheses for readability.
    pub fn display(&self) -> String {
        if self.entry.starts_with('-') {
            format!("({})", self.entry)
        } else {
            self.entry.clone()
        }
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn set_percent_policy(&mut self, policy: PercentPolicy) {
        self.percent_policy = policy;
    }

    pub fn press(&mut self, key: Key) -> Result<Update, CalcError> {
        let mut notice = None;
        match key {
            Key::Digit(d) => self.digit(d)?,
            Key::DecimalPoint => self.decimal_point()?,
            Key::Operator(op) => self.operator(op)?,
            Key::Equals => self.equals()?,
            Key::Clear => self.clear(),
            Key::ClearAll => {
                self.clear();
                self.history.clear();
            }
            Key::Backspace => self.backspace(),
            Key::ToggleSign => self.toggle_sign(),
            Key::Percent => self.percent()?,
            Key::Function(function) => {
                let value = self.parse_entry()?;
                self.entry = format_number(function.apply(value)?);
            }
            Key::Constant(constant) => {
                self.entry = constant.value().to_string();
            }
            Key::Convert(conversion) => {
                let value = self.parse_entry()?;
                let converted = conversion.apply(value)?;
                self.entry = format_number(converted);
                notice = Some(Notice::new(conversion.summary(value, converted)));
            }
        }
        Ok(Update { display: self.display(), notice })
    }

    fn digit(&mut self, digit: u8) -> Result<(), CalcError> {
        debug_assert!(digit <= 9);
        let ch = char::from(b'0' + digit);
        if self.entry == "0" {
            self.entry = ch.to_string();
        } else {
            if self.entry.len() >= MAX_ENTRY_LEN {
                return Err(CalcError::EntryTooLong);
            }
            self.entry.push(ch);
        }
        Ok(())
    }

    fn decimal_point(&mut self) -> Result<(), CalcError> {
        if self.entry.contains('.') {
            return Ok(());
        }
        if self.entry.len() >= MAX_ENTRY_LEN {
            return Err(CalcError::EntryTooLong);
        }
        self.entry.push('.');
        Ok(())
    }

    // Accepted even on a "0" entry so a chain can start from zero
    // (e.g. leading "−" builds a negative result).
    fn operator(&mut self, op: Operator) -> Result<(), CalcError> {
        let operand = self.parse_entry()?;
        self.total = match (self.total, self.pending) {
            (Some(total), Some(pending)) => Some(pending.apply(total, operand)?),
            (Some(total), None) => Some(total),
            (None, _) => Some(operand),
        };
        self.pending = Some(op);
        self.entry = "0".to_string();
        Ok(())
    }

    fn equals(&mut self) -> Result<(), CalcError> {
        let Some(op) = self.pending else {
            return Ok(());
        };
        let lhs = self.total.unwrap_or(0.0);
        let rhs = self.parse_entry()?;
        let result = op.apply(lhs, rhs)?;
        self.history.record(
            format_number(lhs),
            op.symbol(),
            format_number(rhs),
            format_number(result),
        );
        self.total = None;
        self.pending = None;
        self.entry = format_number(result);
        Ok(())
    }

    fn clear(&mut self) {
        self.entry = "0".to_string();
        self.total = None;
        self.pending = None;
    }

    fn backspace(&mut self) {
        self.entry.pop();
        if self.entry.is_empty() || self.entry == "-" {
            self.entry = "0".to_string();
        }
    }

    fn toggle_sign(&mut self) {
        if self.entry == "0" {
            return;
        }
        if let Some(stripped) = self.entry.strip_prefix('-') {
            self.entry = stripped.to_string();
        } else {
            self.entry.insert(0, '-');
        }
    }

    fn percent(&mut self) -> Result<(), CalcError> {
        let value = self.parse_entry()?;
        let result = match (self.percent_policy, self.total, self.pending) {
            (PercentPolicy::PercentOfTotal, Some(total), Some(_)) => total * value / 100.0,
            _ => value / 100.0,
        };
        if !result.is_finite() {
            return Err(CalcError::Overflow);
        }
        self.entry = format_number(result);
        Ok(())
    }

    /// Loads a previously used operand back into the entry buffer
    /// (the history sidebar's edit action).
    pub fn resume_operand(&mut self, operand: &str) -> Result<(), CalcError> {
        match operand.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.entry = operand.to_string();
                Ok(())
            }
            _ => Err(CalcError::BadEntry(operand.to_string())),
        }
    }

    fn parse_entry(&self) -> Result<f64, CalcError> {
        match self.entry.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(CalcError::BadEntry(self.entry.clone())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(PercentPolicy::default())
    }
}

/// Formats a result for the display: whole numbers without a decimal
/// part, everything else trimmed to at most 10 decimal places.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.abs() >= 1e15 {
        value.to_string()
    } else {
        format!("{:.10}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(calc: &mut Evaluator, keys: &[Key]) -> Update {
        let mut last = Update { display: calc.display(), notice: None };
        for key in keys {
            last = calc.press(*key).expect("press failed");
        }
        last
    }

    #[test]
    fn digits_replace_the_leading_zero() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(0), Key::Digit(7), Key::Digit(2)]);
        assert_eq!(calc.display(), "72");
    }

    #[test]
    fn decimal_point_is_idempotent() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(1), Key::DecimalPoint, Key::DecimalPoint]);
        assert_eq!(calc.entry(), "1.");
        press_all(&mut calc, &[Key::Digit(5), Key::DecimalPoint]);
        assert_eq!(calc.entry(), "1.5");
    }

    #[test]
    fn five_plus_three_is_eight_with_one_history_entry() {
        let mut calc = Evaluator::default();
        let update = press_all(
            &mut calc,
            &[Key::Digit(5), Key::Operator(Operator::Add), Key::Digit(3), Key::Equals],
        );
        assert_eq!(update.display, "8");
        assert_eq!(calc.history().len(), 1);
        assert_eq!(calc.history().recent()[0].to_string(), "5 + 3 = 8");
    }

    #[test]
    fn chained_operations_fold_left_to_right() {
        let mut calc = Evaluator::default();
        let update = press_all(
            &mut calc,
            &[
                Key::Digit(4),
                Key::Operator(Operator::Add),
                Key::Digit(5),
                Key::Operator(Operator::Add),
                Key::Digit(2),
                Key::Equals,
            ],
        );
        assert_eq!(update.display, "11");
    }

    #[test]
    fn zero_total_does_not_restart_the_chain() {
        // 5 − 5 + 3 = must be 3: the intermediate zero total is a
        // real value, not an uninitialized marker.
        let mut calc = Evaluator::default();
        let update = press_all(
            &mut calc,
            &[
                Key::Digit(5),
                Key::Operator(Operator::Subtract),
                Key::Digit(5),
                Key::Operator(Operator::Add),
                Key::Digit(3),
                Key::Equals,
            ],
        );
        assert_eq!(update.display, "3");
    }

    #[test]
    fn operator_on_zero_starts_a_negative_chain() {
        let mut calc = Evaluator::default();
        let update = press_all(
            &mut calc,
            &[Key::Operator(Operator::Subtract), Key::Digit(5), Key::Equals],
        );
        assert_eq!(update.display, "(-5)");
        assert_eq!(calc.entry(), "-5");
    }

    #[test]
    fn divide_by_zero_is_blocked_and_recoverable() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(7), Key::Operator(Operator::Divide), Key::Digit(0)]);
        assert_eq!(calc.press(Key::Equals), Err(CalcError::DivideByZero));
        // State untouched: the chain is still 7 ÷ _, entry still "0".
        assert_eq!(calc.entry(), "0");
        assert_eq!(calc.total(), Some(7.0));
        assert_eq!(calc.pending_operator(), Some(Operator::Divide));
        let update = press_all(&mut calc, &[Key::Digit(5), Key::Equals]);
        assert_eq!(update.display, "1.4");
    }

    #[test]
    fn equals_without_pending_operator_is_a_no_op() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(9), Key::Equals]);
        assert_eq!(calc.display(), "9");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn duplicate_history_entries_are_suppressed() {
        let mut calc = Evaluator::default();
        press_all(
            &mut calc,
            &[Key::Digit(2), Key::Operator(Operator::Add), Key::Digit(2), Key::Equals],
        );
        press_all(
            &mut calc,
            &[
                Key::Clear,
                Key::Digit(2),
                Key::Operator(Operator::Add),
                Key::Digit(2),
                Key::Equals,
            ],
        );
        assert_eq!(calc.history().len(), 1);
    }

    #[test]
    fn clear_resets_entry_total_and_pending() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(8), Key::Operator(Operator::Multiply), Key::Digit(2)]);
        press_all(&mut calc, &[Key::Clear]);
        assert_eq!(calc.entry(), "0");
        assert_eq!(calc.total(), None);
        assert_eq!(calc.pending_operator(), None);
    }

    #[test]
    fn clear_keeps_history_but_clear_all_drops_it() {
        let mut calc = Evaluator::default();
        press_all(
            &mut calc,
            &[Key::Digit(2), Key::Operator(Operator::Add), Key::Digit(2), Key::Equals],
        );
        press_all(&mut calc, &[Key::Clear]);
        assert_eq!(calc.history().len(), 1);
        press_all(&mut calc, &[Key::ClearAll]);
        assert!(calc.history().is_empty());
    }

    #[test]
    fn toggle_sign_on_zero_is_a_no_op() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::ToggleSign]);
        assert_eq!(calc.entry(), "0");
    }

    #[test]
    fn toggle_sign_round_trips() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(5), Key::ToggleSign]);
        assert_eq!(calc.entry(), "-5");
        assert_eq!(calc.display(), "(-5)");
        press_all(&mut calc, &[Key::ToggleSign]);
        assert_eq!(calc.entry(), "5");
    }

    #[test]
    fn backspace_trims_and_bottoms_out_at_zero() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(1), Key::Digit(2), Key::Backspace]);
        assert_eq!(calc.entry(), "1");
        press_all(&mut calc, &[Key::Backspace, Key::Backspace]);
        assert_eq!(calc.entry(), "0");
    }

    #[test]
    fn backspace_never_leaves_a_bare_minus() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(5), Key::ToggleSign, Key::Backspace]);
        assert_eq!(calc.entry(), "0");
    }

    #[test]
    fn entry_length_is_capped() {
        let mut calc = Evaluator::default();
        for _ in 0..MAX_ENTRY_LEN {
            calc.press(Key::Digit(9)).unwrap();
        }
        assert_eq!(calc.press(Key::Digit(9)), Err(CalcError::EntryTooLong));
        assert_eq!(calc.entry().len(), MAX_ENTRY_LEN);
    }

    #[test]
    fn percent_of_total_policy() {
        let mut calc = Evaluator::new(PercentPolicy::PercentOfTotal);
        // 200 + 10 % = adds 10% of 200.
        let update = press_all(
            &mut calc,
            &[
                Key::Digit(2),
                Key::Digit(0),
                Key::Digit(0),
                Key::Operator(Operator::Add),
                Key::Digit(1),
                Key::Digit(0),
                Key::Percent,
            ],
        );
        assert_eq!(update.display, "20");
        let update = press_all(&mut calc, &[Key::Equals]);
        assert_eq!(update.display, "220");
    }

    #[test]
    fn simple_percent_policy_divides_by_100() {
        let mut calc = Evaluator::new(PercentPolicy::Simple);
        let update = press_all(
            &mut calc,
            &[
                Key::Digit(2),
                Key::Digit(0),
                Key::Digit(0),
                Key::Operator(Operator::Add),
                Key::Digit(1),
                Key::Digit(0),
                Key::Percent,
            ],
        );
        assert_eq!(update.display, "0.1");
    }

    #[test]
    fn fractional_results_are_trimmed() {
        let mut calc = Evaluator::default();
        let update = press_all(
            &mut calc,
            &[
                Key::Digit(1),
                Key::Digit(0),
                Key::Operator(Operator::Divide),
                Key::Digit(3),
                Key::Equals,
            ],
        );
        assert_eq!(update.display, "3.3333333333");
    }

    #[test]
    fn constants_replace_the_entry() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(4), Key::Constant(Constant::Pi)]);
        assert_eq!(calc.entry(), "3.141592653589793");
    }

    #[test]
    fn conversion_emits_a_summary_notice() {
        let mut calc = Evaluator::default();
        let update = press_all(
            &mut calc,
            &[Key::Digit(5), Key::Convert(Conversion::KmToMiles)],
        );
        let notice = update.notice.expect("conversion should carry a notice");
        assert_eq!(notice.text, "5km = 3.106855mi");
        assert_eq!(notice.duration, NOTICE_DURATION);
    }

    #[test]
    fn failed_function_leaves_entry_untouched() {
        let mut calc = Evaluator::default();
        press_all(&mut calc, &[Key::Digit(9), Key::ToggleSign]);
        assert_eq!(
            calc.press(Key::Function(SciFunction::Sqrt)),
            Err(CalcError::SqrtDomain)
        );
        assert_eq!(calc.entry(), "-9");
    }

    #[test]
    fn resume_operand_restores_a_number() {
        let mut calc = Evaluator::default();
        calc.resume_operand("3.5").unwrap();
        assert_eq!(calc.entry(), "3.5");
        assert!(calc.resume_operand("bogus").is_err());
    }

    #[test]
    fn overflow_is_reported_not_stored() {
        let mut calc = Evaluator::default();
        calc.resume_operand("1e308").unwrap();
        press_all(&mut calc, &[Key::Operator(Operator::Multiply)]);
        calc.resume_operand("1e308").unwrap();
        assert_eq!(calc.press(Key::Equals), Err(CalcError::Overflow));
        assert_eq!(calc.entry(), "1e308");
    }

    #[test]
    fn format_number_handles_whole_and_fractional_values() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-5.0), "-5");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }
}
