use std::path::{Component, Path, PathBuf};

/// Relationship between the root directory and the directory the scanner ran in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathOffset {
    /// Root and working directory are the same; there is nothing to rebase.
    Same,
    /// `/`-separated relative path from root to the working directory.
    Relative(String),
}

impl PathOffset {
    /// Computes the offset between two absolute, normalized paths.
    pub(crate) fn between(root: &Path, working: &Path) -> Self {
        if root == working {
            Self::Same
        } else {
            Self::Relative(relative_offset(root, working))
        }
    }
}

/// Makes `path` absolute against `cwd` and folds `.` and `..` lexically.
///
/// Symlinks are not resolved, so two spellings of the same directory through
/// different links stay distinct.
pub(crate) fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Relative path that leads from `root` to `working`, joined with `/`.
pub(crate) fn relative_offset(root: &Path, working: &Path) -> String {
    let root_parts: Vec<Component<'_>> = root.components().collect();
    let working_parts: Vec<Component<'_>> = working.components().collect();
    let common = root_parts
        .iter()
        .zip(&working_parts)
        .take_while(|(left, right)| left == right)
        .count();

    let mut segments: Vec<String> = std::iter::repeat_n("..".to_string(), root_parts.len() - common)
        .collect();
    segments.extend(
        working_parts[common..]
            .iter()
            .map(|part| part.as_os_str().to_string_lossy().into_owned()),
    );
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
