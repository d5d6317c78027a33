//! Galactic column density via the CIAO `prop_colden_exe` tool.
//!
//! colden estimates the Galactic neutral hydrogen column along a line of
//! sight. The batch executable reads positions from an input file and
//! writes a fixed-column report to an output file; its stdout is banner
//! chatter and its exit code carries no signal.
//!
//! # Report format
//!
//! Whitespace-separated columns. A data row echoes the sexagesimal
//! position in columns 1-6, carries galactic longitude and latitude in
//! columns 7-8, and the NH value (units of 10^20 cm^-2) or a `-`
//! placeholder in column 9:
//!
//! ```text
//! 00 42 44.330  +41 16 07.50  121.174  -21.573  67.0
//! ```

use std::collections::HashMap;
use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::equatorial::Equatorial;
use crate::error::{CiaoError, CiaoResult};
use crate::runner::run_tool_stdout_to;

/// Look up the Galactic neutral hydrogen column density at a J2000
/// position.
///
/// `ra` and `dec` are degrees. The returned density is in units of
/// 10^22 cm^-2; the tool reports 10^20 cm^-2 and the value is divided by
/// 100. The lookup uses the NRAO survey.
///
/// The call owns three scoped temp files (tool input, tool report, stdout
/// sink); all are removed on return, success or not.
///
/// # Errors
///
/// [`CiaoError::NoColumnDensity`] if no row of the report carries a
/// numeric NH value.
pub fn column_density(
    ra: f64,
    dec: f64,
    env: Option<&HashMap<String, String>>,
) -> CiaoResult<f64> {
    let pos = Equatorial::new(ra, dec);
    debug!("colden lookup at {pos}");

    let mut infile = tempfile::Builder::new()
        .prefix("colden_in")
        .suffix(".dat")
        .tempfile()?;
    writeln!(infile, "{pos}")?;
    infile.flush()?;

    let outfile = tempfile::Builder::new()
        .prefix("colden_out")
        .suffix(".dat")
        .tempfile()?;
    let sink = tempfile::Builder::new()
        .prefix("colden_log")
        .suffix(".dat")
        .tempfile()?;

    let args = vec![
        "d".to_string(),
        "nrao".to_string(),
        "j2000".to_string(),
        format!(
            ":{}:{}",
            infile.path().display(),
            outfile.path().display()
        ),
    ];
    run_tool_stdout_to("prop_colden_exe", &args, env, sink.reopen()?)?;

    let report = std::fs::read_to_string(outfile.path())?;
    parse_colden_report(&report).ok_or(CiaoError::NoColumnDensity)
}

/// Galactic longitude/latitude columns must look like plain numbers for a
/// row to count as data.
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+\.?\d*$").expect("valid number pattern"));

/// Scan the report for the first data row with a numeric NH column and
/// convert its value to units of 10^22 cm^-2.
fn parse_colden_report(report: &str) -> Option<f64> {
    for line in report.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() >= 9
            && tokens[8] != "-"
            && NUMBER.is_match(tokens[6])
            && NUMBER.is_match(tokens[7])
        {
            return tokens[8].parse::<f64>().ok().map(|nh| nh / 100.0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_qualifying_row_wins_and_scales() {
        let report = "Some header text\n\
                      1 2 3 4 5 6 10.0 20.0 150.5\n\
                      1 2 3 4 5 6 10.0 20.0 999.0\n";
        assert_relative_eq!(parse_colden_report(report).unwrap(), 1.505);
    }

    #[test]
    fn placeholder_rows_are_skipped() {
        let report = "1 2 3 4 5 6 10.0 20.0 -\n\
                      00 42 44.330 +41 16 07.50 121.174 -21.573 67.0\n";
        assert_relative_eq!(parse_colden_report(report).unwrap(), 0.67);
    }

    #[test]
    fn no_qualifying_row_is_none() {
        // placeholder NH on every data line
        assert_eq!(parse_colden_report("1 2 3 4 5 6 10.0 20.0 -\n"), None);
        // too few columns
        assert_eq!(parse_colden_report("1 2 3 4 5 6 10.0 20.0\n"), None);
        // non-numeric galactic coordinate columns
        assert_eq!(parse_colden_report("1 2 3 4 5 6 lon lat 67.0\n"), None);
        assert_eq!(parse_colden_report(""), None);
    }

    #[cfg(unix)]
    #[test]
    fn column_density_reads_the_report_file() {
        use std::os::unix::fs::PermissionsExt;

        // Stub prop_colden_exe: peel the output path off the ":in:out"
        // argument, write one report row, chat on stdout like the real
        // tool does.
        let bin = tempfile::tempdir().unwrap();
        let stub = "out=${4##*:}\n\
                    printf '00 42 44.330 +41 16 07.50 121.174 -21.573 67.0\\n' > \"$out\"\n\
                    echo 'Colden v2.4 banner'";
        let path = bin.path().join("prop_colden_exe");
        std::fs::write(&path, format!("#!/bin/sh\n{stub}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env = HashMap::from([("PATH".to_string(), bin.path().display().to_string())]);
        let nh = column_density(10.684708, 41.26875, Some(&env)).unwrap();
        assert_relative_eq!(nh, 0.67);
    }

    #[cfg(unix)]
    #[test]
    fn empty_report_is_a_lookup_failure() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempfile::tempdir().unwrap();
        let path = bin.path().join("prop_colden_exe");
        std::fs::write(&path, "#!/bin/sh\necho 'no coverage'\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env = HashMap::from([("PATH".to_string(), bin.path().display().to_string())]);
        let err = column_density(187.25, 2.05, Some(&env)).unwrap_err();
        assert!(matches!(err, CiaoError::NoColumnDensity));
    }
}
