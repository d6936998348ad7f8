mod builder;
mod config;
pub mod manual;
mod markup;

use log::{debug, info};

use std::collections::{BTreeMap, HashMap, HashSet};

pub use crate::builder::*;
pub use crate::config::*;
pub use crate::markup::*;

/// Poll id carrying the age-group demographic question.
pub const AGE_GROUP_POLL_ID: &str = "poll17";
/// Poll id carrying the residence demographic question.
pub const RESIDENCE_POLL_ID: &str = "poll16";
/// Poll id carrying the political-affiliation demographic question.
pub const AFFILIATION_POLL_ID: &str = "poll18";

// **** Private structures ****

// Per-key counters while a pass is running. The session set is collapsed to
// a count once the pass is over.
#[derive(Debug, Clone, Default)]
struct GroupAccumulator {
    question: String,
    category: String,
    responses: u64,
    sessions: HashSet<String>,
}

impl GroupAccumulator {
    fn record(&mut self, session_id: &str) {
        self.responses += 1;
        self.sessions.insert(session_id.to_string());
    }
}

/// Runs every breakdown over the given corpus and bundles the results.
///
/// Pure and deterministic: the same records yield the same report, and the
/// corpus is only read. An empty corpus is not an error; it produces an
/// absent [`BasicStats`] and empty breakdown maps, and the caller decides
/// whether that zero-state is acceptable.
pub fn run_response_stats(records: &[ResponseRecord]) -> AnalysisReport {
    info!("run_response_stats: processing {:?} records", records.len());
    let report = AnalysisReport {
        basic_stats: basic_statistics(records),
        poll_breakdown: poll_breakdown(records),
        geographic_breakdown: geographic_breakdown(records),
        demographic_breakdown: demographic_breakdown(records),
    };
    debug!(
        "run_response_stats: {:?} polls, {:?} countries",
        report.poll_breakdown.len(),
        report.geographic_breakdown.len()
    );
    report
}

/// Corpus-wide counters: totals, distinct keys and the timestamp range.
///
/// Returns `None` for an empty corpus. Distinctness is plain string
/// distinctness, so an empty session id or country is a valid key of its
/// own.
pub fn basic_statistics(records: &[ResponseRecord]) -> Option<BasicStats> {
    if records.is_empty() {
        return None;
    }
    let mut sessions: HashSet<&str> = HashSet::new();
    let mut countries: HashSet<&str> = HashSet::new();
    let mut polls: HashSet<&str> = HashSet::new();
    let mut date_range: Option<DateRange> = None;
    for r in records.iter() {
        sessions.insert(r.session_id.as_str());
        countries.insert(r.user_country.as_str());
        polls.insert(r.poll_id.as_str());
        if r.timestamp.is_empty() {
            continue;
        }
        date_range = Some(match date_range.take() {
            None => DateRange {
                earliest: r.timestamp.clone(),
                latest: r.timestamp.clone(),
            },
            Some(dr) => DateRange {
                earliest: if r.timestamp < dr.earliest {
                    r.timestamp.clone()
                } else {
                    dr.earliest
                },
                latest: if r.timestamp > dr.latest {
                    r.timestamp.clone()
                } else {
                    dr.latest
                },
            },
        });
    }
    Some(BasicStats {
        total_responses: records.len() as u64,
        unique_sessions: sessions.len() as u64,
        countries: countries.len() as u64,
        polls: polls.len() as u64,
        date_range,
    })
}

/// Groups the corpus by poll id.
///
/// The output map is keyed lexicographically by poll id, which is also the
/// display order of the report.
pub fn poll_breakdown(records: &[ResponseRecord]) -> BTreeMap<String, PollStats> {
    let mut acc: HashMap<&str, GroupAccumulator> = HashMap::new();
    for r in records.iter() {
        let e = acc.entry(r.poll_id.as_str()).or_insert_with(|| {
            // Question and category come from the first record of the poll.
            GroupAccumulator {
                question: r.question.clone(),
                category: r.category.clone(),
                ..GroupAccumulator::default()
            }
        });
        e.record(&r.session_id);
    }
    debug!("poll_breakdown: {:?} distinct polls", acc.len());
    acc.into_iter()
        .map(|(poll_id, a)| {
            (
                poll_id.to_string(),
                PollStats {
                    question: a.question,
                    category: a.category,
                    responses: a.responses,
                    unique_sessions: a.sessions.len() as u64,
                },
            )
        })
        .collect()
}

/// Groups the corpus by reported country.
pub fn geographic_breakdown(records: &[ResponseRecord]) -> BTreeMap<String, CountryStats> {
    let mut acc: HashMap<&str, GroupAccumulator> = HashMap::new();
    for r in records.iter() {
        acc.entry(r.user_country.as_str())
            .or_default()
            .record(&r.session_id);
    }
    debug!("geographic_breakdown: {:?} distinct countries", acc.len());
    acc.into_iter()
        .map(|(country, a)| {
            (
                country.to_string(),
                CountryStats {
                    responses: a.responses,
                    unique_sessions: a.sessions.len() as u64,
                },
            )
        })
        .collect()
}

/// Counts answer values for the three demographic polls.
///
/// Records for any other poll id are ignored here; they still count toward
/// the basic statistics and the other breakdowns.
pub fn demographic_breakdown(records: &[ResponseRecord]) -> DemographicBreakdown {
    let mut breakdown = DemographicBreakdown::default();
    for r in records.iter() {
        let counts = match r.poll_id.as_str() {
            AGE_GROUP_POLL_ID => &mut breakdown.age_groups,
            RESIDENCE_POLL_ID => &mut breakdown.residence,
            AFFILIATION_POLL_ID => &mut breakdown.political_affiliation,
            _ => continue,
        };
        *counts.entry(r.response.clone()).or_insert(0) += 1;
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(poll_id: &str, session_id: &str, country: &str) -> ResponseRecord {
        ResponseRecord {
            poll_id: poll_id.to_string(),
            session_id: session_id.to_string(),
            user_country: country.to_string(),
            ..ResponseRecord::default()
        }
    }

    fn sample_corpus() -> Vec<ResponseRecord> {
        vec![
            ResponseRecord {
                timestamp: "2025-02-03T10:00:00Z".to_string(),
                question: "Q1?".to_string(),
                category: "Politics".to_string(),
                response: "Yes".to_string(),
                ..record("poll1", "s1", "Nepal")
            },
            ResponseRecord {
                timestamp: "2025-02-01T08:30:00Z".to_string(),
                response: "No".to_string(),
                ..record("poll1", "s2", "Nepal")
            },
            ResponseRecord {
                timestamp: "2025-02-05T23:59:59Z".to_string(),
                response: "18-24".to_string(),
                ..record("poll17", "s1", "USA")
            },
            ResponseRecord {
                response: "Kathmandu".to_string(),
                ..record("poll16", "s3", "Nepal")
            },
        ]
    }

    #[test]
    fn empty_corpus_is_a_zero_state() {
        let report = run_response_stats(&[]);
        assert_eq!(report.basic_stats, None);
        assert!(report.poll_breakdown.is_empty());
        assert!(report.geographic_breakdown.is_empty());
        assert_eq!(report.demographic_breakdown, DemographicBreakdown::default());
    }

    #[test]
    fn basic_statistics_counts_distinct_keys() {
        let stats = basic_statistics(&sample_corpus()).unwrap();
        assert_eq!(stats.total_responses, 4);
        assert_eq!(stats.unique_sessions, 3);
        assert_eq!(stats.countries, 2);
        assert_eq!(stats.polls, 3);
    }

    #[test]
    fn date_range_is_lexicographic() {
        // Min/max are taken lexicographically over the timestamp strings.
        // For well-formed ISO-8601 input that is also the chronological
        // order, which is what makes this comparison acceptable.
        let stats = basic_statistics(&sample_corpus()).unwrap();
        let dr = stats.date_range.unwrap();
        assert_eq!(dr.earliest, "2025-02-01T08:30:00Z");
        assert_eq!(dr.latest, "2025-02-05T23:59:59Z");
    }

    #[test]
    fn date_range_absent_without_timestamps() {
        let records = vec![record("poll1", "s1", "Nepal")];
        let stats = basic_statistics(&records).unwrap();
        assert_eq!(stats.date_range, None);
    }

    #[test]
    fn breakdown_counts_sum_to_total() {
        let records = sample_corpus();
        let report = run_response_stats(&records);
        let total = report.basic_stats.unwrap().total_responses;
        let poll_sum: u64 = report.poll_breakdown.values().map(|s| s.responses).sum();
        let geo_sum: u64 = report
            .geographic_breakdown
            .values()
            .map(|s| s.responses)
            .sum();
        assert_eq!(poll_sum, total);
        assert_eq!(geo_sum, total);
    }

    #[test]
    fn unique_sessions_bounded_by_responses() {
        let report = run_response_stats(&sample_corpus());
        for stats in report.poll_breakdown.values() {
            assert!(stats.unique_sessions <= stats.responses);
        }
        for stats in report.geographic_breakdown.values() {
            assert!(stats.unique_sessions <= stats.responses);
        }
    }

    #[test]
    fn poll_breakdown_keeps_first_question_seen() {
        let mut records = sample_corpus();
        records.push(ResponseRecord {
            question: "Q1, reworded?".to_string(),
            ..record("poll1", "s9", "India")
        });
        let polls = poll_breakdown(&records);
        assert_eq!(polls["poll1"].question, "Q1?");
        assert_eq!(polls["poll1"].category, "Politics");
        assert_eq!(polls["poll1"].responses, 3);
    }

    #[test]
    fn empty_session_id_is_one_bucket() {
        let records = vec![
            record("poll1", "", "Nepal"),
            record("poll1", "", "Nepal"),
            record("poll1", "s1", "Nepal"),
        ];
        let polls = poll_breakdown(&records);
        assert_eq!(polls["poll1"].responses, 3);
        assert_eq!(polls["poll1"].unique_sessions, 2);
    }

    #[test]
    fn demographics_ignore_unrecognized_polls() {
        let report = run_response_stats(&sample_corpus());
        let demo = &report.demographic_breakdown;
        assert_eq!(demo.age_groups.get("18-24"), Some(&1));
        assert_eq!(demo.residence.get("Kathmandu"), Some(&1));
        assert!(demo.political_affiliation.is_empty());
        // The ignored records still count everywhere else.
        assert_eq!(report.poll_breakdown["poll1"].responses, 2);
        assert_eq!(report.basic_stats.unwrap().total_responses, 4);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = sample_corpus();
        assert_eq!(run_response_stats(&records), run_response_stats(&records));
    }
}
