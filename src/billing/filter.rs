//! Bill list filtering and summaries

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Criteria for listing bills; an unset criterion matches everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillFilter {
    /// Case-insensitive text matched against bill number, dealer name and branch name
    pub search: Option<String>,
    pub branch: Option<String>,
    pub dealer: Option<String>,
    /// First creation day included
    pub created_from: Option<NaiveDate>,
    /// Last creation day included
    pub created_to: Option<NaiveDate>,
    pub status: Option<BillStatus>,
}

impl BillFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch = Some(branch_id.into());
        self
    }

    pub fn dealer(mut self, dealer_id: impl Into<String>) -> Self {
        self.dealer = Some(dealer_id.into());
        self
    }

    /// Bills created on any day from `from` through `to`
    pub fn created_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    pub fn status(mut self, status: BillStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether a listing satisfies every set criterion
    pub fn matches(&self, listing: &BillListing) -> bool {
        let bill = &listing.bill;

        if let Some(ref search) = self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                let contains = |text: &str| text.to_lowercase().contains(&needle);
                let hit = contains(&bill.bill_number)
                    || listing.dealer_name.as_deref().is_some_and(contains)
                    || listing.branch_name.as_deref().is_some_and(contains);
                if !hit {
                    return false;
                }
            }
        }

        if self.branch.as_ref().is_some_and(|b| *b != bill.branch) {
            return false;
        }
        if self.dealer.as_ref().is_some_and(|d| *d != bill.dealer) {
            return false;
        }

        let created = bill.created_at.date();
        if self.created_from.is_some_and(|from| created < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| created > to) {
            return false;
        }

        self.status.is_none_or(|status| bill.status() == status)
    }
}

/// Totals over a set of bills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    pub bill_count: usize,
    pub completed_count: usize,
    pub total_amount: BigDecimal,
    pub total_paid: BigDecimal,
    pub total_pending: BigDecimal,
}

impl BillSummary {
    pub fn from_listings(listings: &[BillListing]) -> Self {
        let mut summary = Self {
            bill_count: listings.len(),
            completed_count: 0,
            total_amount: BigDecimal::from(0),
            total_paid: BigDecimal::from(0),
            total_pending: BigDecimal::from(0),
        };

        for listing in listings {
            let bill = &listing.bill;
            if bill.status() == BillStatus::Completed {
                summary.completed_count += 1;
            }
            summary.total_amount += bill.amount();
            summary.total_paid += bill.paid();
            summary.total_pending += bill.pending();
        }

        summary
    }
}
