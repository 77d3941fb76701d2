use {
    once_cell::sync::Lazy,
    std::{
        collections::HashSet,
        fmt::{Display, Formatter, Result as FmtResult},
        path::{Path, PathBuf},
        sync::Mutex,
    },
};

/// Location information for items in a Kconfig file.
///
/// Filenames are interned (see [`cache_path`]) so that locations stay `Copy` even though one is
/// attached to every token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    /// The file in which the item is located.
    pub filename: &'static Path,

    /// The line number of the item (1-based).
    pub line: u32,

    /// The column number of the item (1-based, with tab stops every 8 columns).
    pub column: u32,
}

impl Location {
    /// Create a location pointing at the start of the given file.
    pub fn start_of(filename: &Path) -> Self {
        Self {
            filename: cache_path(filename.to_owned()),
            line: 1,
            column: 1,
        }
    }

    /// Advance the location using the given character.
    pub fn advance_char(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else if c == '\t' {
            self.column = (self.column + 8) & !7;
        } else {
            self.column += 1;
        }
    }

    /// Advance the location using the contents from the given string.
    #[inline(always)]
    pub fn advance(&mut self, s: &str) {
        for c in s.chars() {
            self.advance_char(c);
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}:{}", self.filename.display(), self.line, self.column)
    }
}

static PATH_CACHE: Lazy<Mutex<HashSet<&'static Path>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Intern a path, returning a reference that lives for the remainder of the program.
///
/// Each unique path is leaked exactly once and shared by every [`Location`] that refers to it.
pub(crate) fn cache_path(path: PathBuf) -> &'static Path {
    let mut cache = PATH_CACHE.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(existing) = cache.get(path.as_path()) {
        return existing;
    }

    let leaked: &'static Path = Box::leak(path.into_boxed_path());
    cache.insert(leaked);
    leaked
}

#[cfg(test)]
mod tests {
    use {super::cache_path, std::path::PathBuf};

    #[test]
    fn cached_paths_are_shared() {
        let a = cache_path(PathBuf::from("/tmp/Kconfig.cache-test"));
        let b = cache_path(PathBuf::from("/tmp/Kconfig.cache-test"));
        assert!(std::ptr::eq(a, b));
    }
}
