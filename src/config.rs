//! Command-line configuration.
//!
//! ```text
//! read-angio -i /some/dicom/folder -o /other/path/angio.mha
//! read-angio -v -i /some/dicom/folder -o /other/path/angio.mha
//! ```

use crate::{
    enums::{Execution, KeyParsing, SeriesSelection},
    ordering_key::OrderingKeyExtractor,
};

use clap::Parser;
use dicom::core::Tag;
use std::path::PathBuf;

/// Read an angiography DICOM series and write it as one volume ordered by
/// Content Time.
#[derive(Parser, Debug, Clone)]
#[command(name = "read-angio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder containing the DICOM slices.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output MetaImage file (.mha or .mhd).
    #[arg(short, long)]
    pub output: PathBuf,

    /// Log every slice and its ordering key.
    #[arg(short, long)]
    pub verbose: bool,

    /// Tag holding the ordering key, as `gggg,eeee`.
    #[arg(long, default_value = "0008,0033", value_parser = parse_tag)]
    pub order_tag: Tag,

    /// Require the whole tag value to be a number instead of accepting a
    /// numeric prefix.
    #[arg(long)]
    pub strict_key: bool,

    /// Series Instance UID to process when the folder holds several series.
    #[arg(long, conflicts_with = "single_series")]
    pub series_uid: Option<String>,

    /// Fail if the folder holds more than one series.
    #[arg(long)]
    pub single_series: bool,

    /// Decode slices on all cores.
    #[arg(long)]
    pub parallel: bool,
}

impl Cli {
    pub fn series_selection(&self) -> SeriesSelection {
        match (&self.series_uid, self.single_series) {
            (Some(uid), _) => SeriesSelection::Uid(uid.clone()),
            (None, true) => SeriesSelection::Single,
            (None, false) => SeriesSelection::First,
        }
    }

    pub fn extractor(&self) -> OrderingKeyExtractor {
        let parsing = if self.strict_key {
            KeyParsing::Strict
        } else {
            KeyParsing::Permissive
        };
        OrderingKeyExtractor::new(self.order_tag, parsing)
    }

    pub fn execution(&self) -> Execution {
        if self.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        }
    }
}

/// Parse `gggg,eeee`, `gggg|eeee`, `(gggg,eeee)` or `ggggeeee` (hex).
pub fn parse_tag(value: &str) -> Result<Tag, String> {
    let trimmed = value
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');
    let (group, element) = match trimmed.split_once([',', '|']) {
        Some((group, element)) => (group.trim(), element.trim()),
        None if trimmed.len() == 8 && trimmed.is_ascii() => trimmed.split_at(4),
        None => return Err(format!("invalid tag {value:?}, expected gggg,eeee")),
    };

    let parse = |part: &str| {
        u16::from_str_radix(part, 16).map_err(|err| format!("invalid tag {value:?}: {err}"))
    };
    Ok(Tag(parse(group)?, parse(element)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering_key::DEFAULT_ORDERING_TAG;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("read-angio").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_tag_spellings() {
        for spelling in ["0008,0033", "0008|0033", "(0008,0033)", "00080033"] {
            assert_eq!(parse_tag(spelling).unwrap(), DEFAULT_ORDERING_TAG);
        }
        assert_eq!(parse_tag("0020,0013").unwrap(), Tag(0x0020, 0x0013));
        assert!(parse_tag("0008").is_err());
        assert!(parse_tag("zzzz,0033").is_err());
    }

    #[test]
    fn defaults_match_original_behavior() {
        let cli = cli(&["-i", "in", "-o", "out.mha"]);
        assert_eq!(cli.input, PathBuf::from("in"));
        assert_eq!(cli.output, PathBuf::from("out.mha"));
        assert!(!cli.verbose);
        assert_eq!(cli.series_selection(), SeriesSelection::First);
        assert_eq!(cli.execution(), Execution::Sequential);
        assert_eq!(cli.extractor().tag(), DEFAULT_ORDERING_TAG);
    }

    #[test]
    fn long_flags_select_options() {
        let cli = cli(&[
            "--input",
            "in",
            "--output",
            "out.mhd",
            "--verbose",
            "--series-uid",
            "1.2.3",
            "--parallel",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.series_selection(), SeriesSelection::Uid("1.2.3".into()));
        assert_eq!(cli.execution(), Execution::Parallel);
    }

    #[test]
    fn missing_output_is_a_usage_error() {
        assert!(Cli::try_parse_from(["read-angio", "-i", "in"]).is_err());
    }

    #[test]
    fn series_uid_conflicts_with_single_series() {
        assert!(
            Cli::try_parse_from([
                "read-angio",
                "-i",
                "in",
                "-o",
                "out.mha",
                "--single-series",
                "--series-uid",
                "1.2"
            ])
            .is_err()
        );
    }
}
