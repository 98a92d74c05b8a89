//! Locate the param and log files of a simulation directory.
//!
//! Missing files are an expected outcome here, not an error: each path
//! comes back as `None` with a warning in the log.

use std::path::{Path, PathBuf};

use crate::changa::{getpar, ParamSource};
use crate::defaults::Defaults;
use crate::error::ParamResult;
use crate::format::{Config, Dialect};

/// Find the `.param` and `.log` files for the run in `simdir`.
///
/// Without an explicit `paramfile`, `<prefix>.param` is tried first, then
/// the only `*.param` in the directory. The log is `<achOutName>.log` if
/// the param names one that exists, else `<prefix>.log`. `paramfile` and
/// the returned paths are relative to `simdir`.
///
/// # Errors
///
/// Only when `simdir` cannot be listed or a param file is malformed in a
/// way other than being unreadable. Files that are absent or unreadable
/// give `None`.
pub fn find_param_names(
    defaults: &Defaults,
    simdir: &Path,
    paramfile: Option<&Path>,
    prefix: Option<&str>,
) -> ParamResult<(Option<PathBuf>, Option<PathBuf>)> {
    let mut param_name = match paramfile {
        Some(name) => Some(name.to_path_buf()),
        None => locate_param(simdir, prefix)?,
    };

    let mut log_name = None;
    if let Some(name) = &param_name {
        match Config::load(simdir.join(name), Dialect::Param) {
            Ok(param) => {
                if let Ok(out_name) = getpar(defaults, "achOutName", ParamSource::Config(&param)) {
                    let candidate = PathBuf::from(format!("{out_name}.log"));
                    if simdir.join(&candidate).is_file() {
                        log_name = Some(candidate);
                    }
                }
            }
            Err(e) if e.is_unreadable_file() => {
                log::warn!("could not read {}: {e}", name.display());
                param_name = None;
            }
            Err(e) => return Err(e),
        }
    }

    if log_name.is_none() {
        if let Some(prefix) = prefix {
            let candidate = PathBuf::from(format!("{prefix}.log"));
            if simdir.join(&candidate).is_file() {
                log_name = Some(candidate);
            }
        }
    }
    if log_name.is_none() {
        log::debug!("no .log file in {}", simdir.display());
    }

    Ok((
        param_name.map(|name| simdir.join(name)),
        log_name.map(|name| simdir.join(name)),
    ))
}

fn locate_param(simdir: &Path, prefix: Option<&str>) -> ParamResult<Option<PathBuf>> {
    if let Some(prefix) = prefix {
        let candidate = PathBuf::from(format!("{prefix}.param"));
        if simdir.join(&candidate).is_file() {
            return Ok(Some(candidate));
        }
    }

    let mut names: Vec<PathBuf> = std::fs::read_dir(simdir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "param"))
        .filter_map(|path| path.file_name().map(PathBuf::from))
        .collect();

    if names.len() == 1 {
        Ok(names.pop())
    } else {
        log::warn!(
            "could not find .param file in {} ({} candidates)",
            simdir.display(),
            names.len()
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn defaults() -> Defaults {
        Defaults::bundled().unwrap()
    }

    #[test]
    fn test_single_param_no_log() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("disk.param"), "achOutName = disk\n").unwrap();

        let (param, log) = find_param_names(&defaults(), dir.path(), None, None).unwrap();
        assert_eq!(param, Some(dir.path().join("disk.param")));
        assert_eq!(log, None);
    }

    #[test]
    fn test_log_from_out_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.param"), "achOutName = wd\n").unwrap();
        fs::write(dir.path().join("wd.log"), "").unwrap();

        let (param, log) = find_param_names(&defaults(), dir.path(), None, None).unwrap();
        assert_eq!(param, Some(dir.path().join("run.param")));
        assert_eq!(log, Some(dir.path().join("wd.log")));
    }

    #[test]
    fn test_log_from_simulator_default_out_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.param"), "dDelta = 0.1\n").unwrap();
        fs::write(dir.path().join("pargrav.log"), "").unwrap();

        let (_, log) = find_param_names(&defaults(), dir.path(), None, None).unwrap();
        assert_eq!(log, Some(dir.path().join("pargrav.log")));
    }

    #[test]
    fn test_ambiguous_params() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.param"), "").unwrap();
        fs::write(dir.path().join("b.param"), "").unwrap();

        let (param, log) = find_param_names(&defaults(), dir.path(), None, Some("c")).unwrap();
        assert_eq!((param, log), (None, None));
    }

    #[test]
    fn test_ambiguous_params_prefix_log() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.param"), "").unwrap();
        fs::write(dir.path().join("b.param"), "").unwrap();
        fs::write(dir.path().join("c.log"), "").unwrap();

        let (param, log) = find_param_names(&defaults(), dir.path(), None, Some("c")).unwrap();
        assert_eq!(param, None);
        assert_eq!(log, Some(dir.path().join("c.log")));
    }

    #[test]
    fn test_prefix_breaks_tie() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.param"), "").unwrap();
        fs::write(dir.path().join("b.param"), "").unwrap();

        let (param, _) = find_param_names(&defaults(), dir.path(), None, Some("b")).unwrap();
        assert_eq!(param, Some(dir.path().join("b.param")));
    }

    #[test]
    fn test_missing_explicit_param() {
        let dir = tempfile::tempdir().unwrap();
        let (param, log) =
            find_param_names(&defaults(), dir.path(), Some(Path::new("gone.param")), None).unwrap();
        assert_eq!((param, log), (None, None));
    }

    #[test]
    fn test_unparseable_param_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.param"), "this is not a param line\n").unwrap();

        let (param, _) = find_param_names(&defaults(), dir.path(), None, None).unwrap();
        assert_eq!(param, None);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(find_param_names(&defaults(), &gone, None, None).is_err());
    }
}
