use clap::Parser;

/// This is a culture survey tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey: question catalog, response
    /// sources, answer labels, maturity tiers and output settings.
    /// For more information about the file format, read the crate manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, cindex will check that the
    /// tabulated output matches the reference and fail on any difference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in
    /// JSON format to the given location. Setting this option overrides the output directory that
    /// may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the responses. Setting this option overrides the
    /// response sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the responses input: csv, csv_wide, forms or json. See the crate
    /// manual for all the input types.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path) The question catalog (.csv or .xlsx), with one statement per row. Required
    /// when no configuration file is given.
    #[clap(long, value_parser)]
    pub catalog: Option<String>,

    /// (five values, flag repeated once per label) The answer labels, in ascending order of
    /// agreement. This replaces the default English scale, for translated questionnaires or house
    /// wordings. It should correspond to the entries in the responses file.
    #[clap(long, value_parser)]
    pub labels: Option<Vec<String>>,

    /// (default: the single worksheet) When using an Excel file, indicates the name of the
    /// worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
