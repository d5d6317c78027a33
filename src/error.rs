//! Error types for CIAO tool invocation and output parsing.

use thiserror::Error;

use crate::dmcoords::CoordSystem;

/// Errors produced by the CIAO wrappers.
#[derive(Error, Debug)]
pub enum CiaoError {
    /// `PFILES` was not present in the supplied environment mapping.
    ///
    /// A CIAO environment always defines the parameter-file search path;
    /// its absence means the caller never sourced a CIAO setup, so there
    /// is no sensible default to fall back to.
    #[error("PFILES must be defined in the environment")]
    PfilesNotSet,

    /// A coordinate-system tag outside the recognized set.
    #[error("unknown coordinate system '{value}' (expected one of: {allowed})")]
    UnknownCoordSystem {
        /// The offending tag as supplied.
        value: String,
        /// The recognized tags, comma separated.
        allowed: &'static str,
    },

    /// The position value count does not match the coordinate system's
    /// parameter list.
    #[error("{system} coordinates take {expected} values, got {got}")]
    CoordinateArity {
        system: CoordSystem,
        expected: usize,
        got: usize,
    },

    /// A conversion tool wrote output where a clean run is silent.
    ///
    /// dmcoords does not signal failure through its exit code; printed
    /// output is the only failure indication, so the captured text and the
    /// exact command line are carried verbatim.
    #[error("dmcoords produced unexpected output\ncommand: {command}\noutput: {output}")]
    UnexpectedOutput { command: String, output: String },

    /// No row of the colden report carried a numeric column density.
    #[error("colden did not give a valid column density value")]
    NoColumnDensity,

    /// The CIAO setup script could not be sourced.
    #[error("failed to source {script}: {detail}")]
    SetupScript { script: String, detail: String },

    /// Process or filesystem failure underneath a tool invocation.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CIAO operations.
pub type CiaoResult<T> = Result<T, CiaoError>;
