//! Writing the generated routes file, with operator diagnostics on failure.
//!
//! A routes file that cannot be written never fails the content change
//! that triggered it. Instead the caller gets a [`WriteReport`] describing
//! the file's mode and ownership and the identity the process runs as, so
//! an operator can fix the permissions.

use std::ffi::{CStr, CString};
use std::fs::OpenOptions;
use std::io::Write;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nodealias_core::permissions::{octal_mode, symbolic_mask, UNKNOWN};
use serde::Serialize;

/// Upper bound for the passwd/group lookup scratch buffer.
const MAX_LOOKUP_BUF: usize = 1 << 16;

/// Outcome of one attempt to write the routes file.
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub path: PathBuf,
    pub written: bool,
    /// Human-readable summary for an operator. Never empty.
    pub diagnostics: String,
    /// Present when the file was not written.
    pub details: Option<FileDiagnostics>,
}

impl WriteReport {
    fn success(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            written: true,
            diagnostics: format!("File has been written to: {}", path.display()),
            details: None,
        }
    }

    fn failure(path: &Path, details: FileDiagnostics) -> Self {
        Self {
            path: path.to_path_buf(),
            written: false,
            diagnostics: details.render(path),
            details: Some(details),
        }
    }

    /// The file was not touched because its contents could not be produced.
    pub fn generation_failed(path: &Path, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            written: false,
            diagnostics: format!(
                "Routes could not be generated, {} was left unchanged: {error}",
                path.display()
            ),
            details: None,
        }
    }
}

/// Mode and ownership facts gathered for an unwritable file.
///
/// Every field is optional: a lookup that fails renders as
/// "Unknown (permissions issue?)" instead of aborting the report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileDiagnostics {
    pub permissions: Option<String>,
    pub mask: Option<String>,
    pub owner_user: Option<String>,
    pub owner_group: Option<String>,
    pub process_user: Option<String>,
    pub process_group: Option<String>,
    /// Error from opening or writing, when the write was attempted.
    pub write_error: Option<String>,
}

impl FileDiagnostics {
    /// Gather whatever can be learned about `path` and this process.
    pub fn collect(path: &Path) -> Self {
        let metadata = std::fs::metadata(path).ok();
        // SAFETY: geteuid/getegid take no arguments and cannot fail.
        let (euid, egid) = unsafe { (libc::geteuid(), libc::getegid()) };

        Self {
            permissions: metadata.as_ref().map(|m| octal_mode(m.mode())),
            mask: metadata.as_ref().map(|m| symbolic_mask(m.mode())),
            owner_user: metadata.as_ref().and_then(|m| user_name(m.uid())),
            owner_group: metadata.as_ref().and_then(|m| group_name(m.gid())),
            process_user: user_name(euid),
            process_group: group_name(egid),
            write_error: None,
        }
    }

    fn with_write_error(mut self, error: impl std::fmt::Display) -> Self {
        self.write_error = Some(error.to_string());
        self
    }

    /// Plain-text report, one fact per line.
    pub fn render(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());

        let mut lines = vec![
            format!("Cannot overwrite {file_name}!"),
            "Please ensure the file exists and is writable by this process.".to_string(),
            format!("File Location: {}", path.display()),
            format!("File Permissions are: {}", or_unknown(&self.permissions)),
            format!("File Mask is: {}", or_unknown(&self.mask)),
            format!("Owned by User: {}", or_unknown(&self.owner_user)),
            format!("Owned by Group: {}", or_unknown(&self.owner_group)),
            format!("Process running as User: {}", or_unknown(&self.process_user)),
            format!("Process running in Group: {}", or_unknown(&self.process_group)),
        ];
        if let Some(error) = &self.write_error {
            lines.push(format!("Write error: {error}"));
        }
        lines.join("\n")
    }
}

/// Writes generated content to the routes file.
pub struct FileWriteReporter;

impl FileWriteReporter {
    /// Overwrite `path` with `content` if it is writable, otherwise report
    /// why not. Never panics and never returns an error.
    ///
    /// The file must already exist; it is truncated in place so its owner
    /// and mode are preserved.
    pub fn write_generated(path: &Path, content: &str) -> WriteReport {
        if !is_writable(path) {
            tracing::warn!(path = %path.display(), "Routes file is not writable");
            return WriteReport::failure(path, FileDiagnostics::collect(path));
        }

        match overwrite(path, content) {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "Routes file written");
                WriteReport::success(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Routes file write failed");
                WriteReport::failure(path, FileDiagnostics::collect(path).with_write_error(e))
            }
        }
    }
}

fn overwrite(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

/// `access(2)` write check. Missing files are not writable.
fn is_writable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the call's duration.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

fn user_name(uid: libc::uid_t) -> Option<String> {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        let mut pwd = MaybeUninit::<libc::passwd>::uninit();
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        // SAFETY: all pointers reference live, correctly sized buffers.
        let rc = unsafe {
            libc::getpwuid_r(uid, pwd.as_mut_ptr(), buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < MAX_LOOKUP_BUF {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success `result` points at `pwd`, whose `pw_name` is a
        // NUL-terminated string stored in `buf`.
        let name = unsafe { CStr::from_ptr((*result).pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

fn group_name(gid: libc::gid_t) -> Option<String> {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        let mut grp = MaybeUninit::<libc::group>::uninit();
        let mut result: *mut libc::group = std::ptr::null_mut();
        // SAFETY: all pointers reference live, correctly sized buffers.
        let rc = unsafe {
            libc::getgrgid_r(gid, grp.as_mut_ptr(), buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < MAX_LOOKUP_BUF {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success `result` points at `grp`, whose `gr_name` is a
        // NUL-terminated string stored in `buf`.
        let name = unsafe { CStr::from_ptr((*result).gr_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_existing_file_in_place() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), "old contents that are longer").unwrap();

        let report = FileWriteReporter::write_generated(file.path(), "<?php\n?>");

        assert!(report.written);
        assert!(report.details.is_none());
        assert!(report.diagnostics.contains(&file.path().display().to_string()));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "<?php\n?>");
    }

    #[test]
    fn missing_file_is_reported_not_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.php");

        let report = FileWriteReporter::write_generated(&path, "<?php\n?>");

        assert!(!report.written);
        assert!(!path.exists());
        assert!(report.diagnostics.starts_with("Cannot overwrite routes.php!"));
        assert!(report
            .diagnostics
            .contains("File Permissions are: Unknown (permissions issue?)"));
        assert!(report
            .diagnostics
            .contains("Owned by User: Unknown (permissions issue?)"));
        let details = report.details.expect("details");
        assert!(details.permissions.is_none());
        assert!(details.owner_group.is_none());
    }

    #[test]
    fn read_only_file_is_reported_and_left_alone() {
        use std::os::unix::fs::PermissionsExt;

        // SAFETY: geteuid takes no arguments and cannot fail.
        if unsafe { libc::geteuid() } == 0 {
            // Root passes access(2) write checks regardless of mode.
            return;
        }
        let file = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), "original").unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o444)).unwrap();

        let report = FileWriteReporter::write_generated(file.path(), "<?php\n?>");

        assert!(!report.written);
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "original");
        assert!(report.diagnostics.contains("File Permissions are: 0444"));
        assert!(report.diagnostics.contains("File Mask is: r-- r-- r--"));
        let details = report.details.expect("details");
        assert!(details.write_error.is_none());
    }

    #[test]
    fn directory_target_reports_write_error() {
        let dir = tempfile::tempdir().expect("tempdir");

        let report = FileWriteReporter::write_generated(dir.path(), "<?php\n?>");

        assert!(!report.written);
        let details = report.details.expect("details");
        assert!(details.write_error.is_some());
        assert!(details.mask.is_some());
        assert!(report.diagnostics.contains("Write error:"));
    }

    #[test]
    fn nul_in_path_is_not_writable() {
        let path = Path::new("bad\0name");
        let report = FileWriteReporter::write_generated(path, "x");
        assert!(!report.written);
        assert!(!report.diagnostics.is_empty());
    }

    #[test]
    fn generation_failure_mentions_file() {
        let report = WriteReport::generation_failed(Path::new("/tmp/routes.php"), "store down");
        assert!(!report.written);
        assert!(report.diagnostics.contains("/tmp/routes.php"));
        assert!(report.diagnostics.contains("store down"));
    }
}
