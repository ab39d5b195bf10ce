use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Every `.html` file under `root`, minus those matching an exclude glob, in path order.
///
/// Exclude patterns are relative to `root`. A pattern matching a directory
/// excludes everything below it.
pub fn valid_paths(root: &Path, exclude_paths: &[String]) -> Result<Vec<PathBuf>> {
    let excludes = exclude_paths
        .iter()
        .map(|p| Pattern::new(p.trim_start_matches("./")).with_context(|| format!("invalid exclude pattern {p:?}")))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        let p = entry.path();
        if !entry.file_type().is_file() || p.extension().and_then(|s| s.to_str()) != Some("html") {
            continue;
        }
        let rel = p.strip_prefix(root).unwrap_or(p);
        if is_excluded(rel, &excludes) {
            tracing::debug!(path = %rel.display(), "excluded");
            continue;
        }
        files.push(p.to_path_buf());
    }
    files.sort();
    Ok(files)
}

fn is_excluded(rel: &Path, excludes: &[Pattern]) -> bool {
    rel.ancestors()
        .filter(|a| !a.as_os_str().is_empty())
        .any(|a| excludes.iter().any(|pat| pat.matches_path_with(a, MATCH)))
}

/// Site-absolute url of a page: its path below `root`, `/`-separated with a leading `/`.
pub fn root_relative_url(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut url = String::new();
    for part in rel.components() {
        if let Component::Normal(s) = part {
            url.push('/');
            url.push_str(&s.to_string_lossy());
        }
    }
    if url.is_empty() { url.push('/'); }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_root_relative() {
        let root = Path::new("public");
        assert_eq!(root_relative_url(root, Path::new("public/docs/intro.html")), "/docs/intro.html");
        assert_eq!(root_relative_url(root, Path::new("public/index.html")), "/index.html");
    }

    #[test]
    fn excludes_match_files_and_directories() {
        let pats = vec![Pattern::new("drafts").unwrap(), Pattern::new("**/404.html").unwrap()];
        assert!(is_excluded(Path::new("drafts/post.html"), &pats));
        assert!(is_excluded(Path::new("404.html"), &pats));
        assert!(is_excluded(Path::new("blog/404.html"), &pats));
        assert!(!is_excluded(Path::new("blog/post.html"), &pats));
    }

    #[test]
    fn star_stays_within_a_directory() {
        let pats = vec![Pattern::new("*.html").unwrap()];
        assert!(is_excluded(Path::new("index.html"), &pats));
        assert!(!is_excluded(Path::new("blog/post.html"), &pats));
    }
}
