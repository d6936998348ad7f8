pub use crate::config::*;

/// A builder for assembling a corpus of response records.
///
/// The analysis functions take a plain slice, so the builder is only a
/// convenience for callers that receive answers one at a time.
///
/// ```
/// use poll_insights::CorpusBuilder;
///
/// let mut builder = CorpusBuilder::new();
/// builder.add_response("poll1", "Yes", "session-a");
/// builder.add_response("poll1", "No", "session-b");
///
/// let records = builder.build();
/// let report = poll_insights::run_response_stats(&records);
/// assert_eq!(report.poll_breakdown["poll1"].responses, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CorpusBuilder {
    _records: Vec<ResponseRecord>,
}

impl CorpusBuilder {
    pub fn new() -> CorpusBuilder {
        CorpusBuilder {
            _records: Vec::new(),
        }
    }

    /// Adds an answer with only the fields every record carries. The other
    /// fields default to the empty string, which the aggregator treats as
    /// valid missing data.
    pub fn add_response(&mut self, poll_id: &str, response: &str, session_id: &str) {
        self.add_record(&ResponseRecord {
            poll_id: poll_id.to_string(),
            response: response.to_string(),
            session_id: session_id.to_string(),
            ..ResponseRecord::default()
        });
    }

    /// Adds a fully populated record.
    pub fn add_record(&mut self, record: &ResponseRecord) {
        self._records.push(record.clone());
    }

    pub fn build(self) -> Vec<ResponseRecord> {
        self._records
    }
}
