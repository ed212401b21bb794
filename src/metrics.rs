//! Timing metrics shown after an answer.

use crate::Completion;
use std::fmt;
use std::time::Duration;

/// Everything the trailing metrics line reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub model: String,
    pub provider: String,
    pub elapsed: Duration,
    pub completion_tokens: Option<u32>,
    pub cost: Option<f64>,
}

impl Metrics {
    pub fn from_completion(completion: &Completion) -> Self {
        let usage = completion.usage.as_ref();
        Self {
            model: completion.model.clone(),
            provider: completion.provider.clone(),
            elapsed: completion.elapsed,
            // The CLI backend reports cost without tokens
            completion_tokens: usage
                .map(|u| u.completion_tokens)
                .filter(|&tokens| tokens > 0),
            cost: usage.and_then(|u| u.cost),
        }
    }

    /// Elapsed seconds rounded to two decimals, as displayed.
    pub fn elapsed_seconds(&self) -> f64 {
        round_to(self.elapsed.as_secs_f64(), 2)
    }

    /// Completion tokens per second rounded to one decimal.
    ///
    /// `None` when the token count is unknown or the elapsed time rounds to
    /// zero.
    pub fn tokens_per_second(&self) -> Option<f64> {
        let tokens = self.completion_tokens?;
        let elapsed = self.elapsed_seconds();
        if elapsed <= 0.0 {
            return None;
        }
        Some(round_to(f64::from(tokens) / self.elapsed.as_secs_f64(), 1))
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} via {} - {:.2}s - ",
            self.model,
            self.provider,
            self.elapsed_seconds()
        )?;
        match self.tokens_per_second() {
            Some(tps) => write!(f, "{tps:.1} tok/s")?,
            None => f.write_str("n/a tok/s")?,
        }
        if let Some(cost) = self.cost {
            write!(f, " - ${cost}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(elapsed: Duration, tokens: Option<u32>) -> Metrics {
        Metrics {
            model: "inception/mercury-coder".to_string(),
            provider: "Inception".to_string(),
            elapsed,
            completion_tokens: tokens,
            cost: None,
        }
    }

    #[test]
    fn test_tokens_per_second_is_rounded_to_one_decimal() {
        let m = metrics(Duration::from_millis(1500), Some(100));
        assert_eq!(m.tokens_per_second(), Some(66.7));
        assert_eq!(m.to_string(), "[inception/mercury-coder via Inception - 1.50s - 66.7 tok/s]");
    }

    #[test]
    fn test_zero_elapsed_reports_sentinel() {
        let m = metrics(Duration::from_millis(2), Some(100));
        assert_eq!(m.tokens_per_second(), None);
        assert!(m.to_string().ends_with("0.00s - n/a tok/s]"));
    }

    #[test]
    fn test_unknown_tokens_report_sentinel() {
        let m = metrics(Duration::from_secs(2), None);
        assert_eq!(m.tokens_per_second(), None);
    }

    #[test]
    fn test_cost_is_appended() {
        let mut m = metrics(Duration::from_secs(1), None);
        m.cost = Some(0.0042);
        assert_eq!(
            m.to_string(),
            "[inception/mercury-coder via Inception - 1.00s - n/a tok/s - $0.0042]"
        );
    }
}
