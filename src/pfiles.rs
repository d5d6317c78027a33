//! Per-session isolation of CIAO parameter files.
//!
//! CIAO tools keep their state in per-tool parameter files looked up
//! through the `PFILES` search path (semicolon-delimited, first match
//! wins). Two sessions sharing one writable head will clobber each
//! other's pset state; pointing the head at a private scratch directory
//! keeps each session's parameters to itself while the stock parameter
//! files stay reachable further down the chain.

use std::collections::HashMap;
use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use crate::error::{CiaoError, CiaoResult};

/// Environment variable holding the parameter-file search path.
pub const PFILES_ENV: &str = "PFILES";

/// Prepend a fresh private directory to `PFILES` in `env`.
///
/// `env` is mutated in place: its `PFILES` value becomes
/// `"<tempdir>;<previous value>"`. The returned [`TempDir`] owns the
/// directory; it is deleted, along with any parameter files the tools
/// wrote into it, when the handle drops — on normal scope exit, early
/// return, or unwind alike.
///
/// Pass `dir` to place the directory somewhere other than the system temp
/// location.
///
/// # Errors
///
/// [`CiaoError::PfilesNotSet`] if `env` has no `PFILES` key. No directory
/// is created in that case.
pub fn localize_param_files(
    env: &mut HashMap<String, String>,
    dir: Option<&Path>,
) -> CiaoResult<TempDir> {
    let pfiles = env.get(PFILES_ENV).ok_or(CiaoError::PfilesNotSet)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix("ciao-pfiles-");
    let tempdir = match dir {
        Some(dir) => builder.tempdir_in(dir)?,
        None => builder.tempdir()?,
    };

    let localized = format!("{};{}", tempdir.path().display(), pfiles);
    debug!("PFILES localized to {localized}");
    env.insert(PFILES_ENV.to_string(), localized);

    Ok(tempdir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_pfiles(value: &str) -> HashMap<String, String> {
        HashMap::from([(PFILES_ENV.to_string(), value.to_string())])
    }

    #[test]
    fn prepends_a_fresh_directory() {
        let mut env = env_with_pfiles("a;b");
        let tempdir = localize_param_files(&mut env, None).unwrap();
        assert!(tempdir.path().is_dir());
        assert_eq!(
            env[PFILES_ENV],
            format!("{};a;b", tempdir.path().display())
        );
    }

    #[test]
    fn directory_is_removed_on_drop() {
        let mut env = env_with_pfiles("/stock/param");
        let tempdir = localize_param_files(&mut env, None).unwrap();
        let path = tempdir.path().to_path_buf();
        assert!(path.exists());
        drop(tempdir);
        assert!(!path.exists());
    }

    #[test]
    fn missing_pfiles_is_a_configuration_error() {
        let parent = tempfile::tempdir().unwrap();
        let mut env = HashMap::new();
        let err = localize_param_files(&mut env, Some(parent.path())).unwrap_err();
        assert!(matches!(err, CiaoError::PfilesNotSet));
        assert!(env.is_empty());
        // nothing was created under the requested parent
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn honors_the_directory_hint() {
        let parent = tempfile::tempdir().unwrap();
        let mut env = env_with_pfiles("/stock/param");
        let tempdir = localize_param_files(&mut env, Some(parent.path())).unwrap();
        assert_eq!(tempdir.path().parent(), Some(parent.path()));
    }
}
