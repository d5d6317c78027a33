//! Coordinate conversion via the CIAO `dmcoords` tool.
//!
//! `dmcoords` converts a position between the coordinate systems attached
//! to a Chandra event file: celestial, sky, detector, chip, logical and
//! mission (off-axis angles). The tool is driven entirely through its
//! parameter file — the input position is `pset`, the tool runs, and every
//! derived value is read back out of the parameter dump.
//!
//! # Invocation sequence
//!
//! ```text
//! punlearn dmcoords
//! pset dmcoords ra=10.684708 dec=41.26875 celfmt=deg
//! dmcoords infile=acisf00635_evt2.fits asolfile=pcadf00635_asol1.fits celfmt=deg option=cel
//! pdump dmcoords
//! ```
//!
//! A clean `dmcoords` run is silent and the exit code carries no signal;
//! any printed output means the conversion failed, and the captured text is
//! the only diagnostic there is.
//!
//! # Dump format
//!
//! `pdump` emits one parameter per line as `name='value'`:
//!
//! ```text
//! ra='10.684708'
//! chip_id='3'
//! detector='ACIS-I'
//! ```
//!
//! Values are coerced to [`ParamValue::Int`], then [`ParamValue::Float`],
//! else kept as text. Lines in any other shape are skipped. This pattern
//! is coupled to the dump format of the installed CIAO version, which is
//! the tool's only machine-readable surface.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CiaoError, CiaoResult};
use crate::runner::run_tool;

/// The coordinate systems dmcoords can take an input position in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordSystem {
    /// Celestial RA/Dec (degrees).
    Cel,
    /// Tangent-plane sky pixels.
    Sky,
    /// Detector pixels.
    Det,
    /// Chip number plus on-chip pixels.
    Chip,
    /// Logical (binned image) pixels.
    Logical,
    /// Mission off-axis angles theta/phi.
    Msc,
}

/// Recognized tags, comma separated, for error messages.
const ALLOWED_SYSTEMS: &str = "cel, sky, det, chip, logical, msc";

impl CoordSystem {
    /// All recognized systems.
    pub const ALL: [CoordSystem; 6] = [
        CoordSystem::Cel,
        CoordSystem::Sky,
        CoordSystem::Det,
        CoordSystem::Chip,
        CoordSystem::Logical,
        CoordSystem::Msc,
    ];

    /// Tag used for the tool's `option` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            CoordSystem::Cel => "cel",
            CoordSystem::Sky => "sky",
            CoordSystem::Det => "det",
            CoordSystem::Chip => "chip",
            CoordSystem::Logical => "logical",
            CoordSystem::Msc => "msc",
        }
    }

    /// Positional input parameter names for this system, in pset order.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            CoordSystem::Cel => &["ra", "dec"],
            CoordSystem::Sky => &["x", "y"],
            CoordSystem::Det => &["detx", "dety"],
            CoordSystem::Chip => &["chip_id", "chipx", "chipy"],
            CoordSystem::Logical => &["logicalx", "logicaly"],
            CoordSystem::Msc => &["theta", "phi"],
        }
    }
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordSystem {
    type Err = CiaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cel" => Ok(CoordSystem::Cel),
            "sky" => Ok(CoordSystem::Sky),
            "det" => Ok(CoordSystem::Det),
            "chip" => Ok(CoordSystem::Chip),
            "logical" => Ok(CoordSystem::Logical),
            "msc" => Ok(CoordSystem::Msc),
            _ => Err(CiaoError::UnknownCoordSystem {
                value: s.to_string(),
                allowed: ALLOWED_SYSTEMS,
            }),
        }
    }
}

/// Textual representation of RA/Dec values (the `celfmt` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleFormat {
    /// Decimal degrees.
    #[default]
    Deg,
    /// Sexagesimal hours (RA) and degrees (Dec).
    Hms,
}

impl AngleFormat {
    /// Value for the `celfmt` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            AngleFormat::Deg => "deg",
            AngleFormat::Hms => "hms",
        }
    }
}

impl fmt::Display for AngleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value from the dmcoords parameter dump.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Coerce a raw dump value: integer first, then float, else text.
    fn parse(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            return ParamValue::Int(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            return ParamValue::Float(value);
        }
        ParamValue::Text(raw.to_string())
    }

    /// Numeric view; `Int` widens to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(value) => Some(*value as f64),
            ParamValue::Float(value) => Some(*value),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value}"),
            ParamValue::Text(value) => f.write_str(value),
        }
    }
}

/// Convert a position through every coordinate system attached to an
/// event file.
///
/// * `event_file` — event file whose WCS and instrument keywords drive the
///   conversion.
/// * `aspect_solutions` — aspect solution file(s) covering the
///   observation; multiple files are passed to the tool comma-joined, in
///   order.
/// * `pos` — position values matching `system`'s parameter list, e.g.
///   `[ra, dec]` for [`CoordSystem::Cel`] or `[chip_id, chipx, chipy]`
///   for [`CoordSystem::Chip`].
/// * `angle_format` — how RA/Dec are rendered in the dump.
/// * `env` — environment to run the tools under, typically from
///   [`ciao_environment`](crate::environment::ciao_environment) after
///   [`localize_param_files`](crate::pfiles::localize_param_files); `None`
///   inherits the calling process environment.
///
/// Returns everything the tool reports: the inputs, the position in all
/// derived systems, and instrument metadata.
///
/// # Errors
///
/// [`CiaoError::CoordinateArity`] if `pos` does not match the system's
/// parameter count (checked before any tool runs);
/// [`CiaoError::UnexpectedOutput`] if the conversion printed anything.
///
/// # Example
///
/// ```no_run
/// use std::path::{Path, PathBuf};
/// use ciao_util::dmcoords::{self, AngleFormat, CoordSystem};
///
/// let params = dmcoords::convert(
///     Path::new("acisf00635_evt2.fits"),
///     &[PathBuf::from("pcadf00635_asol1.fits")],
///     &[10.684708, 41.26875],
///     CoordSystem::Cel,
///     AngleFormat::Deg,
///     None,
/// )?;
/// println!("off-axis angle: {}", params["theta"]);
/// # Ok::<(), ciao_util::CiaoError>(())
/// ```
pub fn convert(
    event_file: &Path,
    aspect_solutions: &[PathBuf],
    pos: &[f64],
    system: CoordSystem,
    angle_format: AngleFormat,
    env: Option<&HashMap<String, String>>,
) -> CiaoResult<HashMap<String, ParamValue>> {
    let expected = system.param_names().len();
    if pos.len() != expected {
        return Err(CiaoError::CoordinateArity {
            system,
            expected,
            got: pos.len(),
        });
    }

    run_tool("punlearn", &["dmcoords".to_string()], env)?;
    run_tool("pset", &set_args(system, pos, angle_format), env)?;

    let asolfile = aspect_solutions
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(",");
    let args = vec![
        format!("infile={}", event_file.display()),
        format!("asolfile={asolfile}"),
        format!("celfmt={angle_format}"),
        format!("option={system}"),
    ];
    let run = run_tool("dmcoords", &args, env)?;
    let output = run.combined();
    if !output.is_empty() {
        return Err(CiaoError::UnexpectedOutput {
            command: run.command,
            output,
        });
    }

    let dump = run_tool("pdump", &["dmcoords".to_string()], env)?;
    Ok(parse_param_dump(&dump.stdout))
}

/// Build the `pset` argument list: the tool name, each positional
/// parameter in order, then the angle format.
fn set_args(system: CoordSystem, pos: &[f64], angle_format: AngleFormat) -> Vec<String> {
    let mut args = vec!["dmcoords".to_string()];
    for (name, value) in system.param_names().iter().zip(pos) {
        args.push(format!("{name}={value}"));
    }
    args.push(format!("celfmt={angle_format}"));
    args
}

static DUMP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*=\s*'(.*)'\s*$").expect("valid dump pattern"));

/// Parse `pdump` output into a name → value map, skipping lines that are
/// not `name='value'`.
fn parse_param_dump(text: &str) -> HashMap<String, ParamValue> {
    let mut params = HashMap::new();
    for line in text.lines() {
        if let Some(caps) = DUMP_LINE.captures(line) {
            params.insert(caps[1].to_string(), ParamValue::parse(&caps[2]));
        }
    }
    params
}
