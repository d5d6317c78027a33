//! Capture a CIAO environment from its shell setup script.
//!
//! A CIAO install configures the shell: `. /soft/ciao/bin/ciao.bash`
//! exports `PATH`, `PFILES`, `ASCDS_*` and friends. The wrappers in this
//! crate take that environment as a plain mapping; this module produces
//! one without the caller having to be a shell.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{CiaoError, CiaoResult};

/// Source `setup_script` in a fresh bash and return the resulting
/// environment.
///
/// The script's stdout is discarded; only the exported variables survive,
/// taken from a NUL-delimited `env -0` dump so values containing newlines
/// round-trip.
///
/// The returned mapping is what [`localize_param_files`] mutates and the
/// tool wrappers run under.
///
/// [`localize_param_files`]: crate::pfiles::localize_param_files
///
/// # Errors
///
/// [`CiaoError::SetupScript`] if bash exits nonzero — the script is
/// missing or failed to source. Whatever the script wrote to stderr is
/// carried in the error.
pub fn ciao_environment(setup_script: &Path) -> CiaoResult<HashMap<String, String>> {
    let script = format!(". {} > /dev/null && env -0", setup_script.display());
    debug!("capturing environment: bash -c {script:?}");

    let output = Command::new("bash").arg("-c").arg(&script).output()?;
    if !output.status.success() {
        return Err(CiaoError::SetupScript {
            script: setup_script.display().to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let dump = String::from_utf8_lossy(&output.stdout);
    let mut env = HashMap::new();
    for entry in dump.split('\0') {
        if let Some((key, value)) = entry.split_once('=') {
            env.insert(key.to_string(), value.to_string());
        }
    }
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[cfg(unix)]
    #[test]
    fn captures_exported_variables() {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        writeln!(script, "export ASCDS_INSTALL=/soft/ciao").unwrap();
        writeln!(script, "export PFILES=\"/home/user/pfiles;/soft/ciao/param\"").unwrap();
        writeln!(script, "echo 'CIAO configuration complete'").unwrap();
        script.flush().unwrap();

        let env = ciao_environment(script.path()).unwrap();
        assert_eq!(env["ASCDS_INSTALL"], "/soft/ciao");
        assert_eq!(env["PFILES"], "/home/user/pfiles;/soft/ciao/param");
        // the shell's own environment comes along
        assert!(env.contains_key("PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_script_is_an_error() {
        let err = ciao_environment(Path::new("/no/such/ciao.bash")).unwrap_err();
        assert!(matches!(err, CiaoError::SetupScript { .. }));
        assert!(err.to_string().contains("/no/such/ciao.bash"));
    }
}
