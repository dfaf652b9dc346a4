//! Resolved directories for one watch session.

use std::path::{Component, Path, PathBuf};

use super::TargetError;

/// Where sources are read from and where output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    project_root: PathBuf,
    source_root: Option<PathBuf>,
    dist_root: Option<PathBuf>,
    /// Prefixes relative to the watched root.
    ignored_paths: Vec<PathBuf>,
}

impl WatchTarget {
    /// Resolve a session target.
    ///
    /// `source_root` and `dist_root` must be both set or both absent, and
    /// must not name the same directory.
    /// Relative roots resolve against `project_root`. When the dist root sits
    /// inside the watched root it is ignored, so written output never feeds
    /// back into the pipeline.
    pub fn new(
        project_root: impl Into<PathBuf>,
        source_root: Option<PathBuf>,
        dist_root: Option<PathBuf>,
        ignored_paths: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self, TargetError> {
        let project_root = project_root.into();

        let (source_root, dist_root) = match (source_root, dist_root) {
            (Some(src), Some(dist)) => (
                Some(resolve(&project_root, &src)),
                Some(resolve(&project_root, &dist)),
            ),
            (None, None) => (None, None),
            (Some(_), None) => return Err(TargetError::UnpairedRoots { given: "--src" }),
            (None, Some(_)) => return Err(TargetError::UnpairedRoots { given: "--dist" }),
        };

        if let (Some(src), Some(dist)) = (&source_root, &dist_root)
            && src == dist
        {
            return Err(TargetError::SameRoots { path: src.clone() });
        }

        let mut target = Self {
            project_root,
            source_root,
            dist_root,
            ignored_paths: ignored_paths.into_iter().map(|p| normalize(&p)).collect(),
        };

        if let Some(dist) = &target.dist_root
            && let Ok(inside) = dist.strip_prefix(target.watched_root())
        {
            let inside = normalize(inside);
            if !inside.as_os_str().is_empty() && !target.ignored_paths.contains(&inside) {
                target.ignored_paths.push(inside);
            }
        }

        Ok(target)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }

    pub fn dist_root(&self) -> Option<&Path> {
        self.dist_root.as_deref()
    }

    pub fn ignored_paths(&self) -> &[PathBuf] {
        &self.ignored_paths
    }

    /// Directory the watcher observes: the source root, else the project root.
    pub fn watched_root(&self) -> &Path {
        self.source_root.as_deref().unwrap_or(&self.project_root)
    }

    /// Directory output is written under: the dist root, else the project root.
    pub fn output_root(&self) -> &Path {
        self.dist_root.as_deref().unwrap_or(&self.project_root)
    }

    /// Whether a path relative to the watched root falls under an ignored prefix.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        let relative = normalize(relative);
        self.ignored_paths.iter().any(|prefix| relative.starts_with(prefix))
    }

    /// Express an event path relative to the watched root.
    ///
    /// Returns `None` for absolute paths outside the watched root.
    pub fn relative(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            path.strip_prefix(self.watched_root()).ok().map(normalize)
        } else {
            Some(normalize(path))
        }
    }

    /// Absolute path of a source file.
    pub fn source_path(&self, relative: &Path) -> PathBuf {
        self.watched_root().join(relative)
    }

    /// Output path mirroring `relative` under the output root, optionally
    /// with a new extension.
    pub fn destination(&self, relative: &Path, extension: Option<&str>) -> PathBuf {
        let mirrored = self.output_root().join(relative);
        match extension {
            Some(ext) => mirrored.with_extension(ext),
            None => mirrored,
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Drop `.` components and trailing separators.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_roots_resolve_against_project() {
        let target = WatchTarget::new(
            "/proj",
            Some(PathBuf::from("src")),
            Some(PathBuf::from("./dist")),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(target.watched_root(), Path::new("/proj/src"));
        assert_eq!(target.output_root(), Path::new("/proj/dist"));
        // dist is a sibling of src, nothing extra to ignore
        assert!(target.ignored_paths().is_empty());
    }

    #[test]
    fn test_unpaired_roots_are_rejected() {
        let err = WatchTarget::new("/proj", Some(PathBuf::from("src")), None, Vec::new()).unwrap_err();
        assert_eq!(err, TargetError::UnpairedRoots { given: "--src" });

        let err = WatchTarget::new("/proj", None, Some(PathBuf::from("dist")), Vec::new()).unwrap_err();
        assert_eq!(err, TargetError::UnpairedRoots { given: "--dist" });
    }

    #[test]
    fn test_identical_roots_are_rejected() {
        let err = WatchTarget::new(
            "/proj",
            Some(PathBuf::from("site")),
            Some(PathBuf::from("./site/")),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TargetError::SameRoots {
                path: PathBuf::from("/proj/site")
            }
        );

        let err = WatchTarget::new("/proj", Some(PathBuf::from(".")), Some(PathBuf::from("/proj")), Vec::new())
            .unwrap_err();
        assert!(matches!(err, TargetError::SameRoots { .. }));
    }

    #[test]
    fn test_same_folder_mode() {
        let target = WatchTarget::new("/proj", None, None, Vec::new()).unwrap();

        assert_eq!(target.watched_root(), Path::new("/proj"));
        assert_eq!(target.output_root(), Path::new("/proj"));
        assert_eq!(
            target.destination(Path::new("style.mystyle"), Some("css")),
            PathBuf::from("/proj/style.css")
        );
    }

    #[test]
    fn test_destination_mirrors_relative_directory() {
        let target = WatchTarget::new(
            "/proj",
            Some(PathBuf::from("/proj/src")),
            Some(PathBuf::from("/proj/dist")),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(
            target.destination(Path::new("a/b.tpl"), Some("html")),
            PathBuf::from("/proj/dist/a/b.html")
        );
        assert_eq!(
            target.destination(Path::new("img/logo.png"), None),
            PathBuf::from("/proj/dist/img/logo.png")
        );
        assert_eq!(target.source_path(Path::new("a/b.tpl")), PathBuf::from("/proj/src/a/b.tpl"));
    }

    #[test]
    fn test_ignored_prefixes_match_whole_components() {
        let target = WatchTarget::new(
            "/proj",
            None,
            None,
            vec![PathBuf::from("node_modules"), PathBuf::from("./drafts/old")],
        )
        .unwrap();

        assert!(target.is_ignored(Path::new("node_modules/pkg/index.js")));
        assert!(target.is_ignored(Path::new("./drafts/old/post.md")));
        assert!(!target.is_ignored(Path::new("node_modules2/file.js")));
        assert!(!target.is_ignored(Path::new("drafts/new/post.md")));
    }

    #[test]
    fn test_dist_inside_watched_root_is_ignored() {
        let target = WatchTarget::new(
            "/proj",
            Some(PathBuf::from(".")),
            Some(PathBuf::from("build/site")),
            Vec::new(),
        )
        .unwrap();

        assert!(target.is_ignored(Path::new("build/site/index.html")));
        assert!(!target.is_ignored(Path::new("build/other.txt")));
    }

    #[test]
    fn test_relative_event_paths() {
        let target = WatchTarget::new(
            "/proj",
            Some(PathBuf::from("src")),
            Some(PathBuf::from("dist")),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(
            target.relative(Path::new("/proj/src/pages/a.md")),
            Some(PathBuf::from("pages/a.md"))
        );
        assert_eq!(target.relative(Path::new("pages/a.md")), Some(PathBuf::from("pages/a.md")));
        assert_eq!(target.relative(Path::new("/elsewhere/a.md")), None);
    }
}
