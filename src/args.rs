use clap::Parser;

/// This is a poll response aggregation and reporting program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) A CSV export of response records to analyze. The first row must name the
    /// columns (Timestamp, Poll ID, Response, ...). For more information about the schema,
    /// read the documentation.
    #[clap(long, value_parser)]
    pub csv_file: Option<String>,

    /// (file path) A JSON export of response records to analyze: an array of objects keyed
    /// by the column names. Ignored when --csv-file is also provided.
    #[clap(long, value_parser)]
    pub json_file: Option<String>,

    /// If passed as an argument, prints a human-readable summary of the analysis to the
    /// standard output.
    #[clap(long, takes_value = false)]
    pub summary: bool,

    /// (file path or empty) If specified, the full analysis will be written in JSON format
    /// to the given location.
    #[clap(long, value_parser)]
    pub export_analysis: Option<String>,

    /// (file path or empty) If specified, the loaded records will be re-exported in CSV
    /// format to the given location, with the canonical column set.
    #[clap(long, value_parser)]
    pub export_csv: Option<String>,

    /// (file path) A reference file containing the analysis of the same records in JSON
    /// format. If provided, pollboard will check that the computed analysis matches the
    /// reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) The poll definition document in markdown format. Requires --html-file.
    #[clap(long, value_parser)]
    pub polls_config: Option<String>,

    /// (file path) The webpage to update in place: the region between the poll markers is
    /// regenerated from the definition document. Requires --polls-config.
    #[clap(long, value_parser)]
    pub html_file: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
