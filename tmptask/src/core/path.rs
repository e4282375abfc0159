//! Pure path allocation for temporary files.
//!
//! Allocation never touches the filesystem. The platform temp directory is
//! resolved by the caller and passed in, so the result depends only on the
//! request and the random source.

use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::types::ResourcePath;

/// Characters used for random fragments. Visually ambiguous glyphs
/// (`0 1 i l o I O`) are left out.
pub const FRAGMENT_ALPHABET: &str = "23456789abcdefghjkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of the random fragment inserted between stem and extension.
pub const FRAGMENT_LEN: usize = 12;

/// Inputs to a single allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    /// Logical file name without extension.
    pub stem: String,
    /// Appended verbatim, so callers supply their own leading dot.
    pub extension: String,
    /// Parent directory. Empty means "use the temp directory".
    pub base: PathBuf,
    /// Insert `_<fragment>` after the stem.
    pub include_random: bool,
}

impl Default for PathRequest {
    fn default() -> Self {
        Self {
            stem: "tmp".to_string(),
            extension: String::new(),
            base: PathBuf::new(),
            include_random: true,
        }
    }
}

impl PathRequest {
    pub fn new(stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            extension: extension.into(),
            ..Self::default()
        }
    }

    pub fn base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    pub fn include_random(mut self, include_random: bool) -> Self {
        self.include_random = include_random;
        self
    }
}

/// Pick the directory an allocation lands in.
///
/// An empty `base` resolves to `temp_dir`; anything else is used as given.
pub fn resolve_base(base: &Path, temp_dir: &Path) -> PathBuf {
    if base.as_os_str().is_empty() {
        temp_dir.to_path_buf()
    } else {
        base.to_path_buf()
    }
}

/// Compute the path for `request`.
///
/// `temp_dir` is only consulted when `request.base` is empty. The random
/// source is only consulted when `request.include_random` is set.
pub fn allocate<R: Rng + ?Sized>(
    request: &PathRequest,
    temp_dir: &Path,
    rng: &mut R,
) -> ResourcePath {
    let base = resolve_base(&request.base, temp_dir);
    let fragment = request.include_random.then(|| random_fragment(rng));
    let file_name = file_name(&request.stem, fragment.as_deref(), &request.extension);
    // `join` would drop the base for an absolute stem.
    let mut path = base.into_os_string();
    path.push(MAIN_SEPARATOR_STR);
    path.push(file_name);
    ResourcePath::new(PathBuf::from(path))
}

/// Build `stem[_fragment]extension`.
pub fn file_name(stem: &str, fragment: Option<&str>, extension: &str) -> String {
    match fragment {
        Some(fragment) => format!("{stem}_{fragment}{extension}"),
        None => format!("{stem}{extension}"),
    }
}

/// Draw [`FRAGMENT_LEN`] distinct characters from [`FRAGMENT_ALPHABET`].
///
/// Uniqueness is statistical only; callers that need a hard guarantee must
/// disambiguate themselves.
pub fn random_fragment<R: Rng + ?Sized>(rng: &mut R) -> String {
    FRAGMENT_ALPHABET
        .as_bytes()
        .choose_multiple(rng, FRAGMENT_LEN)
        .map(|byte| char::from(*byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn plain_allocation_joins_base_stem_and_extension() {
        let request = PathRequest::new("tmp", "")
            .base("/tmp")
            .include_random(false);
        let path = allocate(&request, Path::new("/unused"), &mut rng());
        assert_eq!(path.as_path(), Path::new("/tmp/tmp"));
    }

    #[test]
    fn extension_is_appended_verbatim() {
        let request = PathRequest::new("data", "tar.gz")
            .base("/srv")
            .include_random(false);
        let path = allocate(&request, Path::new("/unused"), &mut rng());
        assert_eq!(path.as_path(), Path::new("/srv/datatar.gz"));
    }

    #[test]
    fn empty_base_resolves_to_temp_dir() {
        let request = PathRequest::new("report", ".txt");
        let path = allocate(&request, Path::new("/var/tmp"), &mut rng());

        assert_eq!(path.as_path().parent(), Some(Path::new("/var/tmp")));
        let name = path
            .as_path()
            .file_name()
            .and_then(|name| name.to_str())
            .expect("utf-8 file name");
        let fragment = name
            .strip_prefix("report_")
            .and_then(|rest| rest.strip_suffix(".txt"))
            .expect("report_<fragment>.txt");
        assert_eq!(fragment.len(), FRAGMENT_LEN);
    }

    #[test]
    fn fragment_uses_alphabet_without_repeats() {
        let fragment = random_fragment(&mut rng());
        assert_eq!(fragment.chars().count(), FRAGMENT_LEN);
        assert!(fragment.chars().all(|c| FRAGMENT_ALPHABET.contains(c)));
        let unique: HashSet<char> = fragment.chars().collect();
        assert_eq!(unique.len(), FRAGMENT_LEN);
    }

    #[test]
    fn fragments_differ_across_allocations() {
        let mut rng = rng();
        let request = PathRequest::new("same", "");
        let paths: HashSet<ResourcePath> = (0..200)
            .map(|_| allocate(&request, Path::new("/tmp"), &mut rng))
            .collect();
        assert_eq!(paths.len(), 200);
    }

    #[test]
    fn seeded_allocation_is_deterministic() {
        let request = PathRequest::default();
        let first = allocate(&request, Path::new("/tmp"), &mut rng());
        let second = allocate(&request, Path::new("/tmp"), &mut rng());
        assert_eq!(first, second);
    }

    #[test]
    fn absolute_stem_stays_under_base() {
        let request = PathRequest::new("/etc/passwd", "")
            .base("/tmp")
            .include_random(false);
        let path = allocate(&request, Path::new("/unused"), &mut rng());

        assert_eq!(path.as_path().as_os_str(), "/tmp//etc/passwd");
        assert!(path.as_path().starts_with("/tmp"));
        assert_ne!(path.as_path(), Path::new("/etc/passwd"));
    }

    #[test]
    fn relative_base_stays_relative() {
        let request = PathRequest::new("out", ".txt")
            .base("scratch")
            .include_random(false);
        let path = allocate(&request, Path::new("/tmp"), &mut rng());

        assert!(path.as_path().is_relative());
        assert_eq!(path.as_path(), Path::new("scratch/out.txt"));
    }

    #[test]
    fn empty_stem_and_extension_still_allocate() {
        let request = PathRequest::new("", "").include_random(false);
        let path = allocate(&request, Path::new("/tmp"), &mut rng());
        assert!(path.as_path().starts_with("/tmp"));
    }
}
