//! Utilities for scripting the CIAO X-ray analysis toolchain.
//!
//! [CIAO] is the analysis suite for Chandra X-ray observatory data. Its
//! tools are classic parameter-file programs: state lives in per-tool
//! `.par` files found through the `PFILES` search path, and batch use
//! means punlearn/pset/run/pdump sequences. This crate wraps the handful
//! of invocations our pipelines need:
//!
//! - [`ciao_environment`] — capture the environment a CIAO setup script
//!   exports, as the mapping every call below accepts;
//! - [`localize_param_files`] — give a session its own parameter-file
//!   directory so concurrent runs don't fight over pset state;
//! - [`dmcoords::convert`] — position conversion between celestial, sky,
//!   detector, chip, logical and mission coordinate systems;
//! - [`colden::column_density`] — Galactic NH along a line of sight.
//!
//! Everything is synchronous and stateless; each call formats a command,
//! runs the tool, and parses what comes back. The parsers are coupled to
//! the (undocumented, versioned) report formats of the installed CIAO —
//! see the module docs for the exact contracts.
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use ciao_util::dmcoords::{self, AngleFormat, CoordSystem};
//!
//! let mut env = ciao_util::ciao_environment(Path::new("/soft/ciao/bin/ciao.bash"))?;
//! let _pfiles = ciao_util::localize_param_files(&mut env, None)?;
//!
//! let params = dmcoords::convert(
//!     Path::new("acisf00635_evt2.fits"),
//!     &[PathBuf::from("pcadf00635_asol1.fits")],
//!     &[10.684708, 41.26875],
//!     CoordSystem::Cel,
//!     AngleFormat::Deg,
//!     Some(&env),
//! )?;
//! println!("off-axis angle: {} arcmin", params["theta"]);
//!
//! let nh = ciao_util::colden::column_density(10.684708, 41.26875, Some(&env))?;
//! println!("NH = {nh} x 10^22 cm^-2");
//! # Ok::<(), ciao_util::CiaoError>(())
//! ```
//!
//! [CIAO]: https://cxc.cfa.harvard.edu/ciao/

pub mod colden;
pub mod dmcoords;
pub mod environment;
pub mod equatorial;
mod error;
pub mod pfiles;
mod runner;

pub use colden::column_density;
pub use dmcoords::{AngleFormat, CoordSystem, ParamValue};
pub use environment::ciao_environment;
pub use equatorial::Equatorial;
pub use error::{CiaoError, CiaoResult};
pub use pfiles::localize_param_files;
