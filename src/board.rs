use log::{info, warn};

use poll_insights::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_csv;
pub mod io_json;

// Countries shown in the console summary.
const TOP_COUNTRIES: usize = 10;

#[derive(Debug, Snafu)]
pub enum BoardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a JSON array of response records"))]
    JsonNotAnArray {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Page update failed: {source}"))]
    PageUpdate { source: MarkupErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BoardResult<T> = Result<T, BoardError>;

/// A response record as keyed in the exports of the collection sheet.
///
/// This is the one place where the external column spelling appears; the
/// readers normalize everything into [`ResponseRecord`] before the analysis
/// runs. Every column is optional and defaults to the empty string.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "Poll ID", default)]
    pub poll_id: String,
    #[serde(rename = "Response", default)]
    pub response: String,
    #[serde(rename = "Question", default)]
    pub question: String,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Session ID", default)]
    pub session_id: String,
    #[serde(rename = "User Country", default)]
    pub user_country: String,
}

impl From<RawRecord> for ResponseRecord {
    fn from(raw: RawRecord) -> ResponseRecord {
        ResponseRecord {
            timestamp: raw.timestamp,
            poll_id: raw.poll_id,
            question: raw.question,
            category: raw.category,
            response: raw.response,
            session_id: raw.session_id,
            user_country: raw.user_country,
        }
    }
}

impl From<&ResponseRecord> for RawRecord {
    fn from(record: &ResponseRecord) -> RawRecord {
        RawRecord {
            timestamp: record.timestamp.clone(),
            poll_id: record.poll_id.clone(),
            response: record.response.clone(),
            question: record.question.clone(),
            category: record.category.clone(),
            session_id: record.session_id.clone(),
            user_country: record.user_country.clone(),
        }
    }
}

fn load_records(args: &Args) -> BoardResult<Vec<ResponseRecord>> {
    let records = if let Some(path) = &args.csv_file {
        io_csv::read_csv_records(path)?
    } else if let Some(path) = &args.json_file {
        io_json::read_json_records(path)?
    } else {
        whatever!("No input provided: use --csv-file or --json-file")
    };
    info!("loaded {:?} records", records.len());
    Ok(records)
}

fn counts_to_json(counts: &BTreeMap<String, u64>) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (value, count) in counts.iter() {
        m.insert(value.clone(), json!(count));
    }
    JSValue::Object(m)
}

/// Converts a report into the nested-mapping JSON shape of the analysis
/// export. The core structs stay serde-free; the conversion lives here.
pub fn analysis_to_json(report: &AnalysisReport) -> JSValue {
    let basic = match &report.basic_stats {
        None => JSValue::Null,
        Some(stats) => {
            let date_range = match &stats.date_range {
                None => JSValue::Null,
                Some(dr) => json!({"earliest": dr.earliest, "latest": dr.latest}),
            };
            json!({
                "total_responses": stats.total_responses,
                "unique_sessions": stats.unique_sessions,
                "countries": stats.countries,
                "polls": stats.polls,
                "date_range": date_range,
            })
        }
    };

    let mut polls: JSMap<String, JSValue> = JSMap::new();
    for (poll_id, stats) in report.poll_breakdown.iter() {
        polls.insert(
            poll_id.clone(),
            json!({
                "question": stats.question,
                "category": stats.category,
                "responses": stats.responses,
                "unique_sessions": stats.unique_sessions,
            }),
        );
    }

    let mut countries: JSMap<String, JSValue> = JSMap::new();
    for (country, stats) in report.geographic_breakdown.iter() {
        countries.insert(
            country.clone(),
            json!({
                "responses": stats.responses,
                "unique_sessions": stats.unique_sessions,
            }),
        );
    }

    let demo = &report.demographic_breakdown;
    json!({
        "basic_statistics": basic,
        "poll_breakdown": polls,
        "geographic_breakdown": countries,
        "demographic_breakdown": {
            "age_groups": counts_to_json(&demo.age_groups),
            "residence": counts_to_json(&demo.residence),
            "political_affiliation": counts_to_json(&demo.political_affiliation),
        },
    })
}

// The exported file carries a generation stamp on top of the analysis
// payload. The stamp stays out of analysis_to_json so reference checks
// compare the payload only.
fn build_export_js(report: &AnalysisReport) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    m.insert(
        "generated_at".to_string(),
        json!(chrono::Local::now().to_rfc3339()),
    );
    if let JSValue::Object(sections) = analysis_to_json(report) {
        for (key, value) in sections {
            m.insert(key, value);
        }
    }
    JSValue::Object(m)
}

fn truncate_question(question: &str) -> String {
    // The summary keeps one line per question.
    let prefix: String = question.chars().take(80).collect();
    format!("{}...", prefix)
}

fn print_counts(label: &str, counts: &BTreeMap<String, u64>) {
    if counts.is_empty() {
        return;
    }
    println!("   {}:", label);
    for (value, count) in counts.iter() {
        println!("      {}: {} responses", value, count);
    }
}

/// Prints the human-readable report to the standard output.
///
/// Polls are listed in lexicographic id order, countries by response count
/// descending (ties in key order).
pub fn print_summary(report: &AnalysisReport) {
    println!();
    println!("{}", "=".repeat(60));
    println!("POLL RESPONSE SUMMARY");
    println!("{}", "=".repeat(60));

    match &report.basic_stats {
        None => println!("\nNo data loaded"),
        Some(stats) => {
            println!("\nBasic statistics:");
            println!("   Total responses: {}", stats.total_responses);
            println!("   Unique sessions: {}", stats.unique_sessions);
            println!("   Countries: {}", stats.countries);
            println!("   Active polls: {}", stats.polls);
            match &stats.date_range {
                Some(dr) => println!("   Date range: {} to {}", dr.earliest, dr.latest),
                None => println!("   Date range: no timestamps recorded"),
            }
        }
    }

    if !report.poll_breakdown.is_empty() {
        println!("\nPoll breakdown:");
        for (poll_id, stats) in report.poll_breakdown.iter() {
            println!(
                "   {}: {} responses ({} unique sessions)",
                poll_id, stats.responses, stats.unique_sessions
            );
            println!("      Category: {}", stats.category);
            println!("      Question: {}", truncate_question(&stats.question));
        }
    }

    if !report.geographic_breakdown.is_empty() {
        println!("\nGeographic breakdown (top {}):", TOP_COUNTRIES);
        let mut countries: Vec<(&String, &CountryStats)> =
            report.geographic_breakdown.iter().collect();
        countries.sort_by(|a, b| b.1.responses.cmp(&a.1.responses));
        for (country, stats) in countries.iter().take(TOP_COUNTRIES) {
            println!(
                "   {}: {} responses ({} unique sessions)",
                country, stats.responses, stats.unique_sessions
            );
        }
    }

    let demo = &report.demographic_breakdown;
    let has_demographics = !(demo.age_groups.is_empty()
        && demo.residence.is_empty()
        && demo.political_affiliation.is_empty());
    if has_demographics {
        println!("\nDemographic breakdown:");
        print_counts("Age groups", &demo.age_groups);
        print_counts("Residence", &demo.residence);
        print_counts("Political affiliation", &demo.political_affiliation);
    }

    println!();
    println!("{}", "=".repeat(60));
}

// The reference file stores the analysis payload without the generation
// stamp, so checks are reproducible across runs.
fn check_reference(report: &AnalysisReport, path: &str) -> BoardResult<()> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu {
        path: path.to_string(),
    })?;
    let reference: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let pretty_reference =
        serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    let pretty_computed =
        serde_json::to_string_pretty(&analysis_to_json(report)).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference analysis");
        print_diff(pretty_reference.as_str(), pretty_computed.as_ref(), "\n");
        whatever!(
            "Difference detected between computed analysis and reference {}",
            path
        );
    }
    info!("analysis matches the reference {}", path);
    Ok(())
}

/// Loads the records, aggregates them and runs every requested output:
/// console summary, CSV re-export, analysis export, reference check.
pub fn run_report(args: &Args) -> BoardResult<()> {
    let records = load_records(args)?;
    let report = run_response_stats(&records);

    if args.summary {
        print_summary(&report);
    }
    if let Some(path) = &args.export_csv {
        io_csv::write_csv_records(&records, path)?;
        println!("Data exported to {}", path);
    }
    if let Some(path) = &args.export_analysis {
        let pretty =
            serde_json::to_string_pretty(&build_export_js(&report)).context(ParsingJsonSnafu {})?;
        fs::write(path, pretty).context(WritingFileSnafu { path: path.clone() })?;
        println!("Analysis exported to {}", path);
    }
    if let Some(reference_path) = &args.reference {
        check_reference(&report, reference_path)?;
    }
    Ok(())
}

/// Recompiles the poll region of the target page from the definition
/// document. The page is only written once the splice has succeeded.
pub fn run_page_update(definitions_path: &str, page_path: &str) -> BoardResult<()> {
    let document = fs::read_to_string(definitions_path).context(OpeningFileSnafu {
        path: definitions_path.to_string(),
    })?;
    let polls = parse_poll_definitions(&document);
    if polls.is_empty() {
        whatever!("No polls found in {}", definitions_path);
    }
    let fragments: Vec<String> = polls.iter().map(render_poll).collect();

    let page = fs::read_to_string(page_path).context(OpeningFileSnafu {
        path: page_path.to_string(),
    })?;
    let updated = splice_polls(&page, &fragments).context(PageUpdateSnafu {})?;
    fs::write(page_path, updated).context(WritingFileSnafu {
        path: page_path.to_string(),
    })?;
    println!("Updated {} polls in {}", polls.len(), page_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_corpus_exports_null_statistics() {
        let report = run_response_stats(&[]);
        let js = analysis_to_json(&report);
        assert_eq!(js["basic_statistics"], JSValue::Null);
        assert_eq!(js["poll_breakdown"], json!({}));
        assert_eq!(js["geographic_breakdown"], json!({}));
        assert_eq!(js["demographic_breakdown"]["age_groups"], json!({}));
    }

    #[test]
    fn analysis_json_has_the_report_shape() {
        let records = vec![
            ResponseRecord {
                timestamp: "2025-01-01T00:00:00Z".to_string(),
                poll_id: "poll1".to_string(),
                question: "Q?".to_string(),
                category: "C".to_string(),
                response: "Yes".to_string(),
                session_id: "s1".to_string(),
                user_country: "Nepal".to_string(),
            },
            ResponseRecord {
                poll_id: "poll17".to_string(),
                response: "25-34".to_string(),
                session_id: "s2".to_string(),
                user_country: "USA".to_string(),
                ..ResponseRecord::default()
            },
        ];
        let report = run_response_stats(&records);
        let js = analysis_to_json(&report);
        assert_eq!(js["basic_statistics"]["total_responses"], json!(2));
        assert_eq!(
            js["basic_statistics"]["date_range"]["earliest"],
            json!("2025-01-01T00:00:00Z")
        );
        assert_eq!(js["poll_breakdown"]["poll1"]["responses"], json!(1));
        assert_eq!(js["poll_breakdown"]["poll1"]["question"], json!("Q?"));
        assert_eq!(
            js["geographic_breakdown"]["Nepal"]["unique_sessions"],
            json!(1)
        );
        assert_eq!(js["demographic_breakdown"]["age_groups"]["25-34"], json!(1));
    }

    #[test]
    fn raw_record_round_trips() {
        let record = ResponseRecord {
            poll_id: "poll2".to_string(),
            session_id: "s1".to_string(),
            ..ResponseRecord::default()
        };
        let raw = RawRecord::from(&record);
        let back: ResponseRecord = raw.into();
        assert_eq!(back, record);
    }
}
