//! Closing entry form input and its validation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reconciliation::{Denomination, DenominationCounts, PaymentFigures, SalesFigures};
use crate::types::*;

/// A closing entry as submitted.
///
/// Every field is optional so that an absent value can be told apart from
/// an explicit zero. Cash is not an input; it is derived from the counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingEntryInput {
    #[serde(alias = "branchId")]
    pub branch: Option<String>,
    pub date: Option<NaiveDate>,
    pub system_sales: Option<BigDecimal>,
    pub manual_sales: Option<BigDecimal>,
    pub online_sales: Option<BigDecimal>,
    pub expenses: Option<BigDecimal>,
    pub credit_card_payment: Option<BigDecimal>,
    pub upi_payment: Option<BigDecimal>,
    #[serde(rename = "denom2000")]
    pub denom_2000: Option<i64>,
    #[serde(rename = "denom500")]
    pub denom_500: Option<i64>,
    #[serde(rename = "denom200")]
    pub denom_200: Option<i64>,
    #[serde(rename = "denom100")]
    pub denom_100: Option<i64>,
    #[serde(rename = "denom50")]
    pub denom_50: Option<i64>,
    #[serde(rename = "denom20")]
    pub denom_20: Option<i64>,
    #[serde(rename = "denom10")]
    pub denom_10: Option<i64>,
}

/// Closing input that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedClosing {
    pub branch: String,
    pub date: NaiveDate,
    pub sales: SalesFigures,
    /// Card, UPI and expenses; cash is filled in from `counts`
    pub payments: PaymentFigures,
    pub counts: DenominationCounts,
}

impl ClosingEntryInput {
    /// Count for one denomination as submitted
    pub fn count(&self, denomination: Denomination) -> Option<i64> {
        match denomination {
            Denomination::Note2000 => self.denom_2000,
            Denomination::Note500 => self.denom_500,
            Denomination::Note200 => self.denom_200,
            Denomination::Note100 => self.denom_100,
            Denomination::Note50 => self.denom_50,
            Denomination::Note20 => self.denom_20,
            Denomination::Note10 => self.denom_10,
        }
    }

    /// Set the count for one denomination
    pub fn set_count(&mut self, denomination: Denomination, count: i64) {
        let slot = match denomination {
            Denomination::Note2000 => &mut self.denom_2000,
            Denomination::Note500 => &mut self.denom_500,
            Denomination::Note200 => &mut self.denom_200,
            Denomination::Note100 => &mut self.denom_100,
            Denomination::Note50 => &mut self.denom_50,
            Denomination::Note20 => &mut self.denom_20,
            Denomination::Note10 => &mut self.denom_10,
        };
        *slot = Some(count);
    }

    /// Check presence of every field, then the values.
    ///
    /// Presence is checked in a fixed order (branch, date, sales channels,
    /// expenses, payments, then counts from 2000 down) and the first absent
    /// field is reported.
    pub fn validate(&self) -> BackOfficeResult<ValidatedClosing> {
        let branch = self
            .branch
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(BackOfficeError::MissingField("branch"))?;
        let date = self.date.ok_or(BackOfficeError::MissingField("date"))?;

        let money = [
            ("systemSales", &self.system_sales),
            ("manualSales", &self.manual_sales),
            ("onlineSales", &self.online_sales),
            ("expenses", &self.expenses),
            ("creditCardPayment", &self.credit_card_payment),
            ("upiPayment", &self.upi_payment),
        ];
        for (name, value) in money {
            if value.is_none() {
                return Err(BackOfficeError::MissingField(name));
            }
        }
        for denomination in Denomination::ALL {
            if self.count(denomination).is_none() {
                return Err(BackOfficeError::MissingField(denomination.field_name()));
            }
        }

        let zero = BigDecimal::from(0);
        for (name, value) in money {
            if let Some(amount) = value {
                if *amount < zero {
                    return Err(BackOfficeError::InvalidAmount(format!(
                        "{} must not be negative, got {}",
                        name, amount
                    )));
                }
            }
        }

        let counts = DenominationCounts::from_pairs(
            Denomination::ALL
                .into_iter()
                .filter_map(|d| self.count(d).map(|count| (d.value(), count))),
        )?;

        Ok(ValidatedClosing {
            branch: branch.to_string(),
            date,
            sales: SalesFigures {
                system: self.system_sales.clone(),
                manual: self.manual_sales.clone(),
                online: self.online_sales.clone(),
            },
            payments: PaymentFigures {
                credit_card: self.credit_card_payment.clone(),
                upi: self.upi_payment.clone(),
                cash: None,
                expenses: self.expenses.clone(),
            },
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ClosingEntryInput {
        let mut input = ClosingEntryInput {
            branch: Some("branch-1".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 31),
            system_sales: Some(BigDecimal::from(500)),
            manual_sales: Some(BigDecimal::from(200)),
            online_sales: Some(BigDecimal::from(0)),
            expenses: Some(BigDecimal::from(0)),
            credit_card_payment: Some(BigDecimal::from(300)),
            upi_payment: Some(BigDecimal::from(100)),
            ..Default::default()
        };
        for denomination in Denomination::ALL {
            input.set_count(denomination, 0);
        }
        input
    }

    #[test]
    fn test_zero_values_are_present() {
        let validated = complete().validate().unwrap();
        assert_eq!(validated.branch, "branch-1");
        assert_eq!(validated.counts, DenominationCounts::new());
    }

    #[test]
    fn test_first_missing_field_in_order() {
        let mut input = complete();
        input.manual_sales = None;
        input.upi_payment = None;
        input.denom_50 = None;
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("manualSales"))
        ));

        input.manual_sales = Some(BigDecimal::from(0));
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("upiPayment"))
        ));

        input.upi_payment = Some(BigDecimal::from(0));
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("denom50"))
        ));
    }

    #[test]
    fn test_expenses_checked_before_payments() {
        let mut input = complete();
        input.credit_card_payment = None;
        input.expenses = None;
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("expenses"))
        ));
    }

    #[test]
    fn test_branch_and_date_first() {
        let mut input = ClosingEntryInput::default();
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("branch"))
        ));

        input.branch = Some("   ".to_string());
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("branch"))
        ));

        input.branch = Some("branch-1".to_string());
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::MissingField("date"))
        ));
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut input = complete();
        input.upi_payment = Some(BigDecimal::from(-5));
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::InvalidAmount(_))
        ));

        let mut input = complete();
        input.denom_100 = Some(-1);
        assert!(matches!(
            input.validate(),
            Err(BackOfficeError::InvalidCount {
                denomination: 100,
                count: -1
            })
        ));
    }

    #[test]
    fn test_deserializes_form_payload() {
        let input: ClosingEntryInput = serde_json::from_value(serde_json::json!({
            "branchId": "branch-9",
            "date": "2024-03-31",
            "systemSales": "500",
            "manualSales": "200",
            "onlineSales": "0",
            "expenses": "0",
            "creditCardPayment": "300",
            "upiPayment": "100",
            "cashPayment": "3300",
            "denom2000": 1,
            "denom500": 2,
            "denom200": 0,
            "denom100": 3,
            "denom50": 0,
            "denom20": 0,
            "denom10": 0
        }))
        .unwrap();

        assert_eq!(input.branch.as_deref(), Some("branch-9"));
        assert_eq!(input.denom_500, Some(2));
        assert!(input.validate().is_ok());
    }
}
