use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Remote layout constants
// ---------------------------------------------------------------------------

pub const DBFS_SCHEME: &str = "dbfs:";
pub const JARS_DIR: &str = "/FileStore/jars";
pub const REQUIREMENTS_DIR: &str = "/FileStore/job-requirements";
pub const BUNDLES_DIR: &str = "/Shared/bundles";

// ---------------------------------------------------------------------------
// Local layout constants
// ---------------------------------------------------------------------------

pub const JOB_DEFINITION_FILE: &str = "databricks.yml";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const DIST_DIR: &str = "dist";
pub const BUILD_DIR: &str = "build";

// ---------------------------------------------------------------------------
// DbfsPath
// ---------------------------------------------------------------------------

/// An absolute path in the DBFS namespace.
///
/// `Display` renders the namespaced `dbfs:/...` form used in job and library
/// payloads; [`DbfsPath::api_path`] gives the bare form the DBFS API expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbfsPath(String);

impl DbfsPath {
    /// Accepts `dbfs:/a/b`, `/a/b` or `a/b`.
    pub fn new(path: &str) -> Self {
        let bare = path.strip_prefix(DBFS_SCHEME).unwrap_or(path);
        let bare = bare.trim_end_matches('/');
        if bare.starts_with('/') {
            DbfsPath(bare.to_string())
        } else {
            DbfsPath(format!("/{bare}"))
        }
    }

    pub fn api_path(&self) -> &str {
        &self.0
    }

    pub fn join(&self, name: &str) -> Self {
        DbfsPath(format!("{}/{}", self.0.trim_end_matches('/'), name))
    }

    pub fn parent(&self) -> Option<DbfsPath> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            return if self.0.len() > 1 {
                Some(DbfsPath("/".to_string()))
            } else {
                None
            };
        }
        Some(DbfsPath(self.0[..idx].to_string()))
    }
}

impl fmt::Display for DbfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DBFS_SCHEME}{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Remote destination for a built wheel: `/FileStore/jars/<basename>`.
pub fn artifact_destination(local: &Path) -> Option<DbfsPath> {
    let name = local.file_name()?.to_str()?;
    Some(DbfsPath::new(JARS_DIR).join(name))
}

pub fn requirements_destination(bundle_name: &str) -> DbfsPath {
    DbfsPath::new(REQUIREMENTS_DIR)
        .join(bundle_name)
        .join(REQUIREMENTS_FILE)
}

/// Workspace folder a bundle's source tree is mirrored into.
pub fn bundle_workspace_path(bundle_name: &str) -> String {
    format!("{BUNDLES_DIR}/{bundle_name}")
}

/// The bundle directory's own name, used to namespace remote locations.
pub fn bundle_name(bundle_dir: &Path) -> String {
    bundle_dir
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| bundle_dir.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dbfs_path_normalizes_prefixes() {
        for raw in ["dbfs:/FileStore/jars", "/FileStore/jars", "FileStore/jars/"] {
            assert_eq!(DbfsPath::new(raw).api_path(), "/FileStore/jars", "{raw}");
        }
    }

    #[test]
    fn dbfs_path_display_is_namespaced() {
        let p = DbfsPath::new(JARS_DIR).join("pkg-1.0-py3-none-any.whl");
        assert_eq!(p.to_string(), "dbfs:/FileStore/jars/pkg-1.0-py3-none-any.whl");
        assert_eq!(p.api_path(), "/FileStore/jars/pkg-1.0-py3-none-any.whl");
    }

    #[test]
    fn dbfs_path_parent() {
        let p = DbfsPath::new("/FileStore/jars/a.whl");
        assert_eq!(p.parent(), Some(DbfsPath::new("/FileStore/jars")));
        assert_eq!(DbfsPath::new("/a").parent(), Some(DbfsPath::new("/")));
    }

    #[test]
    fn artifact_destination_uses_basename() {
        let dest = artifact_destination(Path::new("/tmp/proj/dist/pkg-1.0-py3-none-any.whl")).unwrap();
        assert_eq!(dest.api_path(), "/FileStore/jars/pkg-1.0-py3-none-any.whl");
    }

    #[test]
    fn path_helpers() {
        assert_eq!(
            requirements_destination("db_sp_handler").to_string(),
            "dbfs:/FileStore/job-requirements/db_sp_handler/requirements.txt"
        );
        assert_eq!(bundle_workspace_path("db_sp_handler"), "/Shared/bundles/db_sp_handler");
        assert_eq!(bundle_name(Path::new("/does/not/exist/handler")), "handler");
    }
}
