//! Sales and payment totals for a closing

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Sales reported through each channel; an absent figure counts as 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesFigures {
    pub system: Option<BigDecimal>,
    pub manual: Option<BigDecimal>,
    pub online: Option<BigDecimal>,
}

impl SalesFigures {
    /// Sum of all channels
    pub fn total(&self) -> BigDecimal {
        or_zero(&self.system) + or_zero(&self.manual) + or_zero(&self.online)
    }
}

/// Money accounted for at closing; an absent figure counts as 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentFigures {
    pub credit_card: Option<BigDecimal>,
    pub upi: Option<BigDecimal>,
    pub cash: Option<BigDecimal>,
    /// Paid out of the drawer during the day
    pub expenses: Option<BigDecimal>,
}

impl PaymentFigures {
    /// Card + UPI + cash + expenses
    pub fn total(&self) -> BigDecimal {
        or_zero(&self.credit_card)
            + or_zero(&self.upi)
            + or_zero(&self.cash)
            + or_zero(&self.expenses)
    }
}

/// Derived totals of a closing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationTotals {
    pub total_sales: BigDecimal,
    pub total_payments: BigDecimal,
    /// `total_payments - total_sales`
    pub discrepancy: BigDecimal,
}

impl ReconciliationTotals {
    /// Zero discrepancy
    pub fn is_balanced(&self) -> bool {
        self.discrepancy == BigDecimal::from(0)
    }

    pub fn outcome(&self) -> ReconciliationOutcome {
        ReconciliationOutcome::of(&self.discrepancy)
    }
}

/// Which way a closing is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationOutcome {
    Balanced,
    /// More money accounted for than sold
    Excess,
    /// Less money accounted for than sold
    Shortage,
}

impl ReconciliationOutcome {
    /// Classify a signed discrepancy
    pub fn of(discrepancy: &BigDecimal) -> Self {
        let zero = BigDecimal::from(0);
        if *discrepancy == zero {
            ReconciliationOutcome::Balanced
        } else if *discrepancy > zero {
            ReconciliationOutcome::Excess
        } else {
            ReconciliationOutcome::Shortage
        }
    }
}

/// Compute sales and payment totals and the discrepancy between them.
///
/// Never fails: missing figures are treated as 0.
pub fn compute_totals(sales: &SalesFigures, payments: &PaymentFigures) -> ReconciliationTotals {
    let total_sales = sales.total();
    let total_payments = payments.total();
    let discrepancy = &total_payments - &total_sales;

    tracing::debug!(%total_sales, %total_payments, %discrepancy, "computed closing totals");

    ReconciliationTotals {
        total_sales,
        total_payments,
        discrepancy,
    }
}

fn or_zero(value: &Option<BigDecimal>) -> BigDecimal {
    value.clone().unwrap_or_else(|| BigDecimal::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(value: i64) -> Option<BigDecimal> {
        Some(BigDecimal::from(value))
    }

    #[test]
    fn test_mismatched_closing() {
        let sales = SalesFigures {
            system: money(500),
            manual: money(200),
            online: money(0),
        };
        let payments = PaymentFigures {
            credit_card: money(300),
            upi: money(100),
            cash: money(3300),
            expenses: money(0),
        };

        let totals = compute_totals(&sales, &payments);
        assert_eq!(totals.total_sales, BigDecimal::from(700));
        assert_eq!(totals.total_payments, BigDecimal::from(3700));
        assert_eq!(totals.discrepancy, BigDecimal::from(3000));
        assert!(!totals.is_balanced());
        assert_eq!(totals.outcome(), ReconciliationOutcome::Excess);
    }

    #[test]
    fn test_balanced_closing() {
        let sales = SalesFigures {
            system: money(1200),
            manual: money(300),
            online: None,
        };
        let payments = PaymentFigures {
            credit_card: money(400),
            upi: money(250),
            cash: money(800),
            expenses: money(50),
        };

        let totals = compute_totals(&sales, &payments);
        assert!(totals.is_balanced());
        assert_eq!(totals.outcome(), ReconciliationOutcome::Balanced);
    }

    #[test]
    fn test_missing_figures_default_to_zero() {
        let totals = compute_totals(&SalesFigures::default(), &PaymentFigures::default());
        assert_eq!(totals.total_sales, BigDecimal::from(0));
        assert_eq!(totals.total_payments, BigDecimal::from(0));
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_shortage() {
        let sales = SalesFigures {
            system: money(1000),
            ..Default::default()
        };
        let payments = PaymentFigures {
            cash: money(900),
            ..Default::default()
        };

        let totals = compute_totals(&sales, &payments);
        assert_eq!(totals.discrepancy, BigDecimal::from(-100));
        assert_eq!(totals.outcome(), ReconciliationOutcome::Shortage);
    }
}
