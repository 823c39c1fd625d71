use std::{fs, io::ErrorKind, path::Path};

use crate::infra::{error::AppError, storage_layout::StorageLayout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub session_removed: bool,
}

/// Removes the local session marker so the next run starts at guided
/// sign-in. The provider-side session simply expires; no remote call.
pub fn logout_and_reset() -> Result<LogoutOutcome, AppError> {
    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;

    let session_removed = remove_if_exists(&layout.session_file())?;

    Ok(LogoutOutcome { session_removed })
}

fn remove_if_exists(path: &Path) -> Result<bool, AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(AppError::SessionMarker {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;
    use crate::test_support::env_lock;

    #[test]
    fn logout_removes_session_marker() {
        let _guard = env_lock();
        let root = tempfile::tempdir().expect("temp dir");

        let old_xdg = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", root.path());

        let layout = StorageLayout::resolve().expect("layout should resolve");
        layout.ensure_dirs().expect("dirs should be created");
        fs::write(layout.session_file(), b"signed-in").expect("session should be written");

        let outcome = logout_and_reset().expect("logout should succeed");

        assert!(outcome.session_removed);
        assert!(!layout.session_file().exists());

        match old_xdg {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    #[test]
    fn logout_is_a_noop_without_a_session() {
        let _guard = env_lock();
        let root = tempfile::tempdir().expect("temp dir");

        let old_xdg = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", root.path());

        let outcome = logout_and_reset().expect("logout should succeed");

        assert!(!outcome.session_removed);

        match old_xdg {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}
