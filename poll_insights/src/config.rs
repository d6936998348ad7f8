// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// One poll answer event, as collected by the response sheet.
///
/// Records are normalized at the I/O boundary: a field that is missing in the
/// source is carried as an empty string, never as an error. The library only
/// reads records and never mutates them.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ResponseRecord {
    /// ISO-8601 submission time. May be empty.
    pub timestamp: String,
    /// Identifier of the poll being answered (`poll1`, `poll2`, ...).
    pub poll_id: String,
    /// Full question text, as displayed to the respondent.
    pub question: String,
    /// Poll category label.
    pub category: String,
    /// The recorded value of the selected option.
    pub response: String,
    /// Identifies a respondent session. An empty id is a valid key: all
    /// "no session" respondents fall into one bucket.
    pub session_id: String,
    /// Country reported for the respondent.
    pub user_country: String,
}

// ******** Output data structures *********

/// Earliest and latest non-empty timestamps seen in a corpus.
///
/// Timestamps are compared lexicographically. The inputs are ISO-8601
/// strings, for which lexicographic and chronological order coincide.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

/// Corpus-wide counters.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BasicStats {
    pub total_responses: u64,
    pub unique_sessions: u64,
    pub countries: u64,
    pub polls: u64,
    /// Absent when no record carries a non-empty timestamp.
    pub date_range: Option<DateRange>,
}

/// Per-poll counters. Question and category are taken from the first record
/// seen for the poll id.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollStats {
    pub question: String,
    pub category: String,
    pub responses: u64,
    pub unique_sessions: u64,
}

/// Per-country counters.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountryStats {
    pub responses: u64,
    pub unique_sessions: u64,
}

/// Answer-value counts for the three demographic polls.
///
/// Only records whose poll id is one of [`crate::AGE_GROUP_POLL_ID`],
/// [`crate::RESIDENCE_POLL_ID`] and [`crate::AFFILIATION_POLL_ID`]
/// contribute here. All other records are ignored for this breakdown while
/// still counting toward the other ones.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DemographicBreakdown {
    pub age_groups: BTreeMap<String, u64>,
    pub residence: BTreeMap<String, u64>,
    pub political_affiliation: BTreeMap<String, u64>,
}

/// The full outcome of one analysis run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnalysisReport {
    /// Absent for an empty corpus.
    pub basic_stats: Option<BasicStats>,
    pub poll_breakdown: BTreeMap<String, PollStats>,
    pub geographic_breakdown: BTreeMap<String, CountryStats>,
    pub demographic_breakdown: DemographicBreakdown,
}

// ******** Poll markup structures *********

/// One selectable option of a poll definition.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollOption {
    /// The option text as displayed to the respondent.
    pub text: String,
    /// Normalized identifier derived from the display text, see
    /// [`crate::option_value`]. Stable across regenerations.
    pub value: String,
    /// Percentage recorded in the source document. Static display data only,
    /// never recomputed from a corpus.
    pub percentage: u32,
}

/// A poll as described by the definition document.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollDefinition {
    /// `poll<N>`, with `<N>` the digits of the section heading, verbatim.
    pub id: String,
    pub title: String,
    pub category: String,
    pub question: String,
    pub options: Vec<PollOption>,
}

/// Errors raised by the markup compiler.
///
/// Malformed definition sections are not errors: they are silently dropped
/// by the parser. Only structural failures on the target document surface.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MarkupErrors {
    /// The target document lacks one of the sentinel marker lines. The
    /// payload is the literal marker that was not found.
    MissingMarker(&'static str),
}

impl Error for MarkupErrors {}

impl Display for MarkupErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupErrors::MissingMarker(marker) => {
                write!(f, "marker {} not found in the target document", marker)
            }
        }
    }
}
