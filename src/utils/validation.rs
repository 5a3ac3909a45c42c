//! Validation utilities

use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::billing::NewBill;
use crate::traits::*;
use crate::types::*;

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(amount: &BigDecimal) -> BackOfficeResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(BackOfficeError::InvalidAmount(format!(
            "Amount must not be negative, got {}",
            amount
        )))
    } else {
        Ok(())
    }
}

/// Parse a textual amount as entered in a form
pub fn parse_amount(raw: &str) -> BackOfficeResult<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BackOfficeError::InvalidAmount(
            "Amount cannot be empty".to_string(),
        ));
    }

    BigDecimal::from_str(trimmed)
        .map_err(|_| BackOfficeError::InvalidAmount(format!("'{}' is not a number", raw)))
}

/// Validate that a bill number is well formed
pub fn validate_bill_number(bill_number: &str) -> BackOfficeResult<()> {
    if bill_number.trim().is_empty() {
        return Err(BackOfficeError::MissingFields(vec!["billNumber"]));
    }

    if bill_number.len() > 50 {
        return invalid_bill_number("cannot exceed 50 characters");
    }

    // Dealers print numbers like "INV/2024-25/0042"
    if !bill_number
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/')
    {
        return invalid_bill_number(
            "can only contain alphanumeric characters, dashes, underscores and slashes",
        );
    }

    Ok(())
}

fn invalid_bill_number(reason: &str) -> BackOfficeResult<()> {
    Err(BackOfficeError::InvalidBillNumber(format!(
        "Bill number {}",
        reason
    )))
}

/// Enhanced bill validator with bill number format checks
pub struct EnhancedBillValidator;

impl BillValidator for EnhancedBillValidator {
    fn validate_new_bill(&self, bill: &NewBill) -> BackOfficeResult<()> {
        DefaultBillValidator.validate_new_bill(bill)?;
        validate_bill_number(&bill.bill_number)
    }

    fn validate_bill(&self, bill: &Bill) -> BackOfficeResult<()> {
        DefaultBillValidator.validate_bill(bill)?;
        validate_bill_number(&bill.bill_number)
    }
}
