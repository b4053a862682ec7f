//! ACS household income brackets (table `B19001`).
//!
//! The sixteen brackets are fixed, ascending, and non-overlapping. Each
//! carries the dollar weight used when reducing grouped counts to an
//! average: the midpoint for closed ranges, the boundary for the two
//! open-ended ends.

use serde::{Deserialize, Serialize};

/// Number of income brackets in table `B19001`.
pub const BRACKET_COUNT: usize = 16;

/// ACS variable holding the total number of responding households.
pub const RESPONDENTS_VARIABLE: &str = "B19001_001E";

/// One household income bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeBracket {
    /// ACS estimate variable (e.g. `"B19001_002E"`).
    pub variable: &'static str,
    /// Human-readable range.
    pub label: &'static str,
    /// Dollar weight applied to this bracket's count.
    pub weight: u32,
}

/// The `B19001` brackets in ascending order.
pub const INCOME_BRACKETS: [IncomeBracket; BRACKET_COUNT] = [
    IncomeBracket {
        variable: "B19001_002E",
        label: "Less than $10,000",
        weight: 10_000,
    },
    IncomeBracket {
        variable: "B19001_003E",
        label: "$10,000 to $14,999",
        weight: 12_500,
    },
    IncomeBracket {
        variable: "B19001_004E",
        label: "$15,000 to $19,999",
        weight: 17_500,
    },
    IncomeBracket {
        variable: "B19001_005E",
        label: "$20,000 to $24,999",
        weight: 22_500,
    },
    IncomeBracket {
        variable: "B19001_006E",
        label: "$25,000 to $29,999",
        weight: 27_500,
    },
    IncomeBracket {
        variable: "B19001_007E",
        label: "$30,000 to $34,999",
        weight: 32_500,
    },
    IncomeBracket {
        variable: "B19001_008E",
        label: "$35,000 to $39,999",
        weight: 37_500,
    },
    IncomeBracket {
        variable: "B19001_009E",
        label: "$40,000 to $44,999",
        weight: 42_500,
    },
    IncomeBracket {
        variable: "B19001_010E",
        label: "$45,000 to $49,999",
        weight: 47_500,
    },
    IncomeBracket {
        variable: "B19001_011E",
        label: "$50,000 to $59,999",
        weight: 55_000,
    },
    IncomeBracket {
        variable: "B19001_012E",
        label: "$60,000 to $74,999",
        weight: 67_500,
    },
    IncomeBracket {
        variable: "B19001_013E",
        label: "$75,000 to $99,999",
        weight: 87_500,
    },
    IncomeBracket {
        variable: "B19001_014E",
        label: "$100,000 to $124,999",
        weight: 112_500,
    },
    IncomeBracket {
        variable: "B19001_015E",
        label: "$125,000 to $149,999",
        weight: 137_500,
    },
    IncomeBracket {
        variable: "B19001_016E",
        label: "$150,000 to $199,999",
        weight: 175_000,
    },
    IncomeBracket {
        variable: "B19001_017E",
        label: "$200,000 or more",
        weight: 200_000,
    },
];

/// Household counts per income bracket for one tract, in
/// [`INCOME_BRACKETS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBracketCounts {
    counts: [u64; BRACKET_COUNT],
    /// Total responding households, when the source reports it.
    respondents: Option<u64>,
}

impl IncomeBracketCounts {
    /// Creates a set of counts without a respondents total.
    #[must_use]
    pub const fn new(counts: [u64; BRACKET_COUNT]) -> Self {
        Self {
            counts,
            respondents: None,
        }
    }

    /// Attaches the reported respondents total.
    #[must_use]
    pub const fn with_respondents(mut self, respondents: u64) -> Self {
        self.respondents = Some(respondents);
        self
    }

    /// Per-bracket household counts.
    #[must_use]
    pub const fn counts(&self) -> &[u64; BRACKET_COUNT] {
        &self.counts
    }

    /// Total responding households as reported by the source.
    #[must_use]
    pub const fn respondents(&self) -> Option<u64> {
        self.respondents
    }

    /// Sum of the bracket counts, saturating at `u64::MAX`.
    #[must_use]
    pub fn households(&self) -> u64 {
        self.counts.iter().fold(0, |sum, &count| sum.saturating_add(count))
    }

    /// Count × bracket weight, per bracket, in dollars.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted_totals(&self) -> [f64; BRACKET_COUNT] {
        let mut totals = [0.0; BRACKET_COUNT];
        for (total, (count, bracket)) in totals
            .iter_mut()
            .zip(self.counts.iter().zip(INCOME_BRACKETS.iter()))
        {
            *total = *count as f64 * f64::from(bracket.weight);
        }
        totals
    }

    /// Sum of [`Self::weighted_totals`].
    #[must_use]
    pub fn weighted_sum(&self) -> f64 {
        self.weighted_totals().iter().sum()
    }
}
