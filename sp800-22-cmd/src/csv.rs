//! Everything needed to save CSV results.

use csv::{Error, Writer, WriterBuilder};
use serde::Serialize;
use sp800_22_lib::{TestSummary, DEFAULT_THRESHOLD};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One row of the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "test name")]
    test: &'a str,
    #[serde(rename = "time in ms")]
    time: f64,
    #[serde(rename = "result no")]
    result_no: usize,
    #[serde(rename = "PASS/FAIL")]
    pass_fail: &'static str,
    #[serde(rename = "p-value")]
    p_value: f64,
    #[serde(rename = "comment")]
    comment: &'a str,
}

/// Writes the test results as `;`-separated rows, usually to a file.
#[derive(Debug)]
pub struct CsvFile<W: Write = File>(Writer<W>);

impl CsvFile {
    /// Creates (or truncates) the file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> CsvFile<W> {
    pub fn from_writer(writer: W) -> Self {
        let mut builder = WriterBuilder::new();
        builder.delimiter(b';').has_headers(true);

        #[cfg(target_family = "windows")]
        builder.terminator(csv::Terminator::CRLF);

        Self(builder.from_writer(writer))
    }

    /// Append the results of one test to the CSV output: one row per raw result.
    ///
    /// A test without raw results (it could not be run) is written as a single "SKIPPED" row with
    /// a p-value of -1 and the reason as comment.
    pub fn write_summary(&mut self, summary: &TestSummary) -> Result<(), Error> {
        let time = (summary.elapsed.as_micros() as f64) / 1000.0;

        if summary.sub_results.is_empty() {
            self.0.serialize(CsvRow {
                test: summary.name,
                time,
                result_no: 0,
                pass_fail: "SKIPPED",
                p_value: -1.0,
                comment: summary.warning.as_deref().unwrap_or(""),
            })?;
        }

        for (no, result) in summary.sub_results.iter().enumerate() {
            let pass_fail = if result.is_skipped() {
                "SKIPPED"
            } else if result.passed(DEFAULT_THRESHOLD) {
                "PASS"
            } else {
                "FAIL"
            };

            self.0.serialize(CsvRow {
                test: summary.name,
                time,
                result_no: no,
                pass_fail,
                p_value: if result.is_skipped() {
                    -1.0
                } else {
                    result.p_value()
                },
                comment: result.comment().unwrap_or(""),
            })?;
        }

        self.0.flush()?;
        Ok(())
    }

    /// Flushes the remaining rows and hands back the writer.
    pub fn into_inner(self) -> Result<W, Error> {
        self.0
            .into_inner()
            .map_err(|e| Error::from(e.into_error()))
    }
}
