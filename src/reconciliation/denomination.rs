//! Currency notes and drawer counts

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Notes counted at closing, highest value first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Denomination {
    Note2000,
    Note500,
    Note200,
    Note100,
    Note50,
    Note20,
    Note10,
}

impl Denomination {
    /// Every denomination, highest value first
    pub const ALL: [Denomination; 7] = [
        Denomination::Note2000,
        Denomination::Note500,
        Denomination::Note200,
        Denomination::Note100,
        Denomination::Note50,
        Denomination::Note20,
        Denomination::Note10,
    ];

    /// Face value of the note
    pub fn value(self) -> u32 {
        match self {
            Denomination::Note2000 => 2000,
            Denomination::Note500 => 500,
            Denomination::Note200 => 200,
            Denomination::Note100 => 100,
            Denomination::Note50 => 50,
            Denomination::Note20 => 20,
            Denomination::Note10 => 10,
        }
    }

    /// Look up a denomination by face value
    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.value() == value)
    }

    /// Input field name used when reporting a missing count
    pub fn field_name(self) -> &'static str {
        match self {
            Denomination::Note2000 => "denom2000",
            Denomination::Note500 => "denom500",
            Denomination::Note200 => "denom200",
            Denomination::Note100 => "denom100",
            Denomination::Note50 => "denom50",
            Denomination::Note20 => "denom20",
            Denomination::Note10 => "denom10",
        }
    }

    fn index(self) -> usize {
        match self {
            Denomination::Note2000 => 0,
            Denomination::Note500 => 1,
            Denomination::Note200 => 2,
            Denomination::Note100 => 3,
            Denomination::Note50 => 4,
            Denomination::Note20 => 5,
            Denomination::Note10 => 6,
        }
    }
}

/// Number of notes of each denomination; an uncounted denomination is 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CountsRecord", into = "CountsRecord")]
pub struct DenominationCounts {
    counts: [u32; 7],
}

/// One line of a denomination breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenominationLine {
    pub denomination: Denomination,
    pub count: u32,
    /// `value * count`
    pub subtotal: BigDecimal,
}

impl DenominationCounts {
    /// All counts zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, denomination: Denomination, count: u32) -> Self {
        self.set(denomination, count);
        self
    }

    /// Set the count for one denomination
    pub fn set(&mut self, denomination: Denomination, count: u32) {
        self.counts[denomination.index()] = count;
    }

    /// Count for one denomination
    pub fn get(&self, denomination: Denomination) -> u32 {
        self.counts[denomination.index()]
    }

    /// Build counts from `(face value, count)` pairs.
    ///
    /// Unknown face values and negative counts are rejected. A face value
    /// given twice keeps the last count.
    pub fn from_pairs<I>(pairs: I) -> BackOfficeResult<Self>
    where
        I: IntoIterator<Item = (u32, i64)>,
    {
        let mut counts = Self::new();
        for (value, count) in pairs {
            let denomination =
                Denomination::from_value(value).ok_or(BackOfficeError::InvalidDenomination(value))?;
            let count = u32::try_from(count).map_err(|_| BackOfficeError::InvalidCount {
                denomination: value,
                count,
            })?;
            counts.set(denomination, count);
        }
        Ok(counts)
    }

    /// Per-note subtotals, highest value first
    pub fn breakdown(&self) -> Vec<DenominationLine> {
        Denomination::ALL
            .into_iter()
            .map(|denomination| {
                let count = self.get(denomination);
                DenominationLine {
                    denomination,
                    count,
                    subtotal: BigDecimal::from(u64::from(denomination.value()) * u64::from(count)),
                }
            })
            .collect()
    }

    /// Total number of notes counted
    pub fn note_count(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}

/// Cash total of a drawer count: sum of value times count
pub fn compute_cash(counts: &DenominationCounts) -> BigDecimal {
    let mut total = BigDecimal::from(0);
    for line in counts.breakdown() {
        total += line.subtotal;
    }
    total
}

#[derive(Serialize, Deserialize)]
struct CountsRecord {
    #[serde(default)]
    denom2000: u32,
    #[serde(default)]
    denom500: u32,
    #[serde(default)]
    denom200: u32,
    #[serde(default)]
    denom100: u32,
    #[serde(default)]
    denom50: u32,
    #[serde(default)]
    denom20: u32,
    #[serde(default)]
    denom10: u32,
}

impl From<CountsRecord> for DenominationCounts {
    fn from(r: CountsRecord) -> Self {
        Self {
            counts: [
                r.denom2000,
                r.denom500,
                r.denom200,
                r.denom100,
                r.denom50,
                r.denom20,
                r.denom10,
            ],
        }
    }
}

impl From<DenominationCounts> for CountsRecord {
    fn from(c: DenominationCounts) -> Self {
        let [denom2000, denom500, denom200, denom100, denom50, denom20, denom10] = c.counts;
        Self {
            denom2000,
            denom500,
            denom200,
            denom100,
            denom50,
            denom20,
            denom10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compute_cash_mixed_notes() {
        let counts = DenominationCounts::new()
            .with(Denomination::Note2000, 1)
            .with(Denomination::Note500, 2)
            .with(Denomination::Note100, 3);

        assert_eq!(compute_cash(&counts), BigDecimal::from(3300));
        assert_eq!(counts.note_count(), 6);
    }

    #[test]
    fn test_compute_cash_empty_drawer() {
        assert_eq!(compute_cash(&DenominationCounts::new()), BigDecimal::from(0));
    }

    #[test]
    fn test_from_pairs() {
        let counts = DenominationCounts::from_pairs([(2000, 1), (500, 2), (100, 3)]).unwrap();
        assert_eq!(counts.get(Denomination::Note500), 2);
        assert_eq!(counts.get(Denomination::Note10), 0);
        assert_eq!(compute_cash(&counts), BigDecimal::from(3300));
    }

    #[test]
    fn test_from_pairs_rejects_negative_count() {
        let result = DenominationCounts::from_pairs([(50, -2)]);
        assert!(matches!(
            result,
            Err(BackOfficeError::InvalidCount {
                denomination: 50,
                count: -2
            })
        ));
    }

    #[test]
    fn test_from_pairs_rejects_unknown_note() {
        let result = DenominationCounts::from_pairs([(1000, 1)]);
        assert!(matches!(result, Err(BackOfficeError::InvalidDenomination(1000))));
    }

    #[test]
    fn test_breakdown_order_and_subtotals() {
        let counts = DenominationCounts::new()
            .with(Denomination::Note10, 7)
            .with(Denomination::Note2000, 2);
        let lines = counts.breakdown();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0].denomination, Denomination::Note2000);
        assert_eq!(lines[0].subtotal, BigDecimal::from(4000));
        assert_eq!(lines[6].denomination, Denomination::Note10);
        assert_eq!(lines[6].subtotal, BigDecimal::from(70));
    }

    #[test]
    fn test_counts_wire_shape() {
        let counts = DenominationCounts::new().with(Denomination::Note200, 4);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["denom200"], 4);
        assert_eq!(json["denom2000"], 0);

        let partial: DenominationCounts =
            serde_json::from_value(serde_json::json!({ "denom20": 3 })).unwrap();
        assert_eq!(partial.get(Denomination::Note20), 3);
        assert_eq!(partial.get(Denomination::Note500), 0);
    }

    #[test]
    fn test_fractional_count_is_not_a_count() {
        let result: Result<DenominationCounts, _> =
            serde_json::from_value(serde_json::json!({ "denom20": 1.5 }));
        assert!(result.is_err());
    }

    fn counts_strategy() -> impl Strategy<Value = [u32; 7]> {
        prop::array::uniform7(0u32..10_000)
    }

    fn build(raw: [u32; 7]) -> DenominationCounts {
        let mut counts = DenominationCounts::new();
        for (denomination, count) in Denomination::ALL.into_iter().zip(raw) {
            counts.set(denomination, count);
        }
        counts
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Doubling every count doubles the cash total.
        #[test]
        fn prop_compute_cash_is_linear(raw in counts_strategy()) {
            let single = compute_cash(&build(raw));
            let doubled = compute_cash(&build(raw.map(|c| c * 2)));
            prop_assert_eq!(doubled, single * BigDecimal::from(2));
        }

        /// The total is the sum of the per-note subtotals.
        #[test]
        fn prop_breakdown_sums_to_total(raw in counts_strategy()) {
            let counts = build(raw);
            let mut sum = BigDecimal::from(0);
            for line in counts.breakdown() {
                sum += line.subtotal;
            }
            prop_assert_eq!(sum, compute_cash(&counts));
        }
    }
}
