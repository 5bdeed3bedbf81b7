use crate::enricher::MissingValuePolicy;
use crate::pipeline::{PipelineConfig, DEFAULT_OUTPUT_DIR, DEFAULT_PREVIEW_ROWS};
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub struct Args {
    pub csv_file: String,
    pub output_dir: String,
    pub delimiter: u8,
    pub strict: bool,
    pub focus_categories: Vec<String>,
    pub preview_rows: usize,
    pub no_charts: bool,
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("sales-analysis")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarizes a sales CSV into charts and a narrative report")
        .arg(Arg::with_name("csv_file")
            .takes_value(true).required(true).help("path of CSV file to read from"))
        .arg(Arg::with_name("output_dir")
            .long("output-dir").short("o").takes_value(true).default_value(DEFAULT_OUTPUT_DIR)
            .help("directory the SVG charts are written to"))
        .arg(Arg::with_name("delimiter")
            .long("delimiter").short("d").takes_value(true).default_value(",")
            .validator(validate_delimiter).help("single-byte field delimiter"))
        .arg(Arg::with_name("strict")
            .long("strict").help("fail on missing Quantity or Price values"))
        .arg(Arg::with_name("focus_category")
            .long("focus-category").takes_value(true).multiple(true).number_of_values(1)
            .help("category to call out by name in the report"))
        .arg(Arg::with_name("preview_rows")
            .long("preview-rows").takes_value(true).default_value("5")
            .validator(validate_count).help("number of rows shown in data previews"))
        .arg(Arg::with_name("no_charts")
            .long("no-charts").help("skip writing the chart files"))
}

fn validate_delimiter(value: String) -> Result<(), String> {
    if value.len() == 1 {
        Ok(())
    } else {
        Err(format!("delimiter must be a single byte, got {:?}", value))
    }
}

fn validate_count(value: String) -> Result<(), String> {
    value
        .parse::<usize>()
        .map(|_| ())
        .map_err(|_| format!("expected a non-negative integer, got {:?}", value))
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(&app().get_matches())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&app().get_matches_from_safe(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            csv_file: matches.value_of("csv_file").unwrap_or_default().to_string(),
            output_dir: matches
                .value_of("output_dir")
                .unwrap_or(DEFAULT_OUTPUT_DIR)
                .to_string(),
            delimiter: matches
                .value_of("delimiter")
                .and_then(|d| d.bytes().next())
                .unwrap_or(b','),
            strict: matches.is_present("strict"),
            focus_categories: matches
                .values_of("focus_category")
                .map(|values| values.map(String::from).collect())
                .unwrap_or_default(),
            preview_rows: matches
                .value_of("preview_rows")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PREVIEW_ROWS),
            no_charts: matches.is_present("no_charts"),
        }
    }

    pub fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input: PathBuf::from(self.csv_file),
            output_dir: PathBuf::from(self.output_dir),
            delimiter: self.delimiter,
            missing_values: if self.strict {
                MissingValuePolicy::Reject
            } else {
                MissingValuePolicy::Propagate
            },
            focus_categories: self.focus_categories,
            preview_rows: self.preview_rows,
            render_charts: !self.no_charts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_apply_defaults() {
        let config = Args::try_parse_from(["sales-analysis", "sales.csv"])
            .unwrap()
            .into_config();

        assert_eq!(config, PipelineConfig::new("sales.csv"));
    }

    #[test]
    fn should_parse_every_option() {
        let args = Args::try_parse_from([
            "sales-analysis",
            "sales.csv",
            "--output-dir",
            "out",
            "-d",
            ";",
            "--strict",
            "--focus-category",
            "Laptops",
            "--focus-category",
            "TV",
            "--preview-rows",
            "3",
            "--no-charts",
        ])
        .unwrap();

        assert_eq!(
            args,
            Args {
                csv_file: String::from("sales.csv"),
                output_dir: String::from("out"),
                delimiter: b';',
                strict: true,
                focus_categories: vec![String::from("Laptops"), String::from("TV")],
                preview_rows: 3,
                no_charts: true,
            }
        );
        assert_eq!(args.into_config().missing_values, MissingValuePolicy::Reject);
    }

    #[test]
    fn should_reject_bad_values() {
        assert!(Args::try_parse_from(["sales-analysis"]).is_err());
        assert!(Args::try_parse_from(["sales-analysis", "a.csv", "-d", "::"]).is_err());
        assert!(Args::try_parse_from(["sales-analysis", "a.csv", "--preview-rows", "-1"]).is_err());
    }
}
