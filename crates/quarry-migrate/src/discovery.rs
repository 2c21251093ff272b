//! Finding migration files and turning them into [`Migration`]s.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::migration::{Migration, SqlMigration};

/// Ordered set of directories searched for migrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPaths {
    paths: Vec<PathBuf>,
}

impl MigrationPaths {
    /// Creates an empty path set.
    #[must_use]
    pub const fn new() -> Self {
        Self { paths: Vec::new() }
    }

    /// Adds a directory. It does not have to exist yet.
    ///
    /// Trailing separators are trimmed and duplicates are ignored.
    pub fn add_path(&mut self, path: impl AsRef<Path>) {
        let path = trim_separators(path.as_ref());
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Builder form of [`MigrationPaths::add_path`].
    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.add_path(path);
        self
    }

    /// Registered directories, in insertion order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// First registered directory, where new migrations are written.
    #[must_use]
    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Maps every migration name (file stem) to its file.
    ///
    /// Only files with `extension` are considered. Directories that do not
    /// exist are skipped. When two directories hold the same name, the one
    /// added last wins.
    ///
    /// # Errors
    ///
    /// IO errors while listing an existing directory.
    pub fn discover(&self, extension: &str) -> Result<BTreeMap<String, PathBuf>> {
        let mut files = BTreeMap::new();
        for dir in &self.paths {
            if !dir.is_dir() {
                debug!(path = %dir.display(), "Skipping missing migrations directory");
                continue;
            }
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    files.insert(stem.to_string(), path.clone());
                }
            }
        }
        Ok(files)
    }
}

impl<P: AsRef<Path>> FromIterator<P> for MigrationPaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut paths = Self::new();
        for path in iter {
            paths.add_path(path);
        }
        paths
    }
}

fn trim_separators(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', std::path::MAIN_SEPARATOR]);
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

/// Turns a discovered file into a runnable migration.
pub trait MigrationResolver: Send + Sync {
    /// File extension this resolver handles, without the dot.
    fn extension(&self) -> &str;

    /// Loads the migration `name` found at `path`.
    ///
    /// # Errors
    ///
    /// [`MigrateError::MigrationContract`] when the file does not define a
    /// valid up/down pair.
    fn resolve(&self, name: &str, path: &Path) -> Result<Arc<dyn Migration>>;
}

const UP_MARKER: &str = "-- migrate:up";
const DOWN_MARKER: &str = "-- migrate:down";

/// Resolves `.sql` files split into `-- migrate:up` and `-- migrate:down`
/// sections.
///
/// ```sql
/// -- migrate:up
/// CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT);
///
/// -- migrate:down
/// DROP TABLE posts;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFileResolver;

impl SqlFileResolver {
    /// Parses the contents of a migration file.
    ///
    /// # Errors
    ///
    /// [`MigrateError::MigrationContract`] when a section marker is missing,
    /// repeated, or the down section comes first.
    pub fn parse(name: &str, source: &str) -> Result<SqlMigration> {
        let mut up: Option<String> = None;
        let mut down: Option<String> = None;

        for line in source.lines() {
            let marker = line.trim().to_ascii_lowercase();
            if marker == UP_MARKER {
                if up.is_some() || down.is_some() {
                    return Err(MigrateError::contract(name, "misplaced '-- migrate:up' marker"));
                }
                up = Some(String::new());
            } else if marker == DOWN_MARKER {
                if up.is_none() || down.is_some() {
                    return Err(MigrateError::contract(
                        name,
                        "'-- migrate:down' must appear once, after '-- migrate:up'",
                    ));
                }
                down = Some(String::new());
            } else if let Some(section) = down.as_mut().or(up.as_mut()) {
                section.push_str(line);
                section.push('\n');
            }
        }

        match (up, down) {
            (Some(up), Some(down)) => Ok(SqlMigration::new(
                split_sql_statements(&up),
                split_sql_statements(&down),
            )),
            (None, _) => Err(MigrateError::contract(name, "missing '-- migrate:up' section")),
            (Some(_), None) => Err(MigrateError::contract(name, "missing '-- migrate:down' section")),
        }
    }
}

impl MigrationResolver for SqlFileResolver {
    fn extension(&self) -> &str {
        "sql"
    }

    fn resolve(&self, name: &str, path: &Path) -> Result<Arc<dyn Migration>> {
        let source = std::fs::read_to_string(path)?;
        Ok(Arc::new(Self::parse(name, &source)?))
    }
}

/// Splits a script on `;`, ignoring semicolons inside quotes and inside
/// `BEGIN ... END` trigger bodies or `CASE ... END` expressions. `--` and
/// `/* */` comments are dropped.
#[must_use]
pub fn split_sql_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;
    // open BEGIN/CASE blocks
    let mut depth = 0_usize;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            current.push(c);
            continue;
        }

        depth = track_block(&word, &current, depth);
        word.clear();
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                current.push(' ');
            }
            ';' if depth == 0 => {
                push_statement(&mut statements, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &current);
    statements
}

/// Updates the block depth after `word` ends inside `statement`.
///
/// `BEGIN` only opens a block in `CREATE ...` statements so that a bare
/// `BEGIN;` still splits.
fn track_block(word: &str, statement: &str, depth: usize) -> usize {
    let creating = statement
        .trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("create"));
    if word.eq_ignore_ascii_case("case") || (creating && word.eq_ignore_ascii_case("begin")) {
        depth + 1
    } else if word.eq_ignore_ascii_case("end") {
        depth.saturating_sub(1)
    } else {
        depth
    }
}

fn push_statement(statements: &mut Vec<String>, sql: &str) {
    let sql = sql.trim();
    if !sql.is_empty() {
        statements.push(sql.to_string());
    }
}

/// Resolves `.rs` files to migrations compiled into the binary.
///
/// The file only marks the migration's place in the ordering; its stem is
/// looked up among the registered implementations.
#[derive(Default, Clone)]
pub struct MigrationRegistry {
    migrations: HashMap<String, Arc<dyn Migration>>,
}

impl MigrationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `migration` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, migration: impl Migration + 'static) {
        self.migrations.insert(name.into(), Arc::new(migration));
    }

    /// Builder form of [`MigrationRegistry::register`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, migration: impl Migration + 'static) -> Self {
        self.register(name, migration);
        self
    }

    /// Returns true when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.migrations.contains_key(name)
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.migrations.keys().collect();
        names.sort();
        f.debug_struct("MigrationRegistry")
            .field("migrations", &names)
            .finish()
    }
}

impl MigrationResolver for MigrationRegistry {
    fn extension(&self) -> &str {
        "rs"
    }

    fn resolve(&self, name: &str, _path: &Path) -> Result<Arc<dyn Migration>> {
        self.migrations
            .get(name)
            .cloned()
            .ok_or_else(|| MigrateError::contract(name, "no migration registered under this name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_path_trims_and_dedups() {
        let mut paths = MigrationPaths::new();
        paths.add_path("db/migrations/");
        paths.add_path("db/migrations");
        paths.add_path("vendor/migrations//");
        assert_eq!(
            paths.paths(),
            [PathBuf::from("db/migrations"), PathBuf::from("vendor/migrations")]
        );
        assert_eq!(paths.first(), Some(Path::new("db/migrations")));
    }

    #[test]
    fn test_discover_last_path_wins_and_sorts() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(a.path().join("002_posts.sql"), "").unwrap();
        std::fs::write(a.path().join("001_users.sql"), "").unwrap();
        std::fs::write(a.path().join("notes.txt"), "").unwrap();
        std::fs::write(b.path().join("002_posts.sql"), "").unwrap();

        let paths: MigrationPaths = [a.path(), b.path(), Path::new("/does/not/exist")]
            .into_iter()
            .collect();
        let files = paths.discover("sql").unwrap();

        assert_eq!(
            files.keys().collect::<Vec<_>>(),
            vec!["001_users", "002_posts"]
        );
        assert_eq!(files["002_posts"], b.path().join("002_posts.sql"));
    }

    #[test]
    fn test_parse_sections() {
        let source = "\
-- migrate:up
CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT DEFAULT 'a;b');
CREATE INDEX posts_title ON posts (title);

-- migrate:down
DROP TABLE posts;
";
        let migration = SqlFileResolver::parse("001_posts", source).unwrap();
        assert_eq!(
            migration.up,
            vec![
                "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT DEFAULT 'a;b')",
                "CREATE INDEX posts_title ON posts (title)",
            ]
        );
        assert_eq!(migration.down, vec!["DROP TABLE posts"]);
    }

    #[test]
    fn test_parse_rejects_missing_sections() {
        assert!(matches!(
            SqlFileResolver::parse("x", "CREATE TABLE t (a INTEGER);"),
            Err(MigrateError::MigrationContract { .. })
        ));
        assert!(matches!(
            SqlFileResolver::parse("x", "-- migrate:up\nSELECT 1;"),
            Err(MigrateError::MigrationContract { .. })
        ));
        assert!(SqlFileResolver::parse("x", "-- migrate:down\n-- migrate:up\n").is_err());
    }

    #[test]
    fn test_split_drops_comments_and_empty_statements() {
        let statements = split_sql_statements(
            "-- create t; later\nCREATE TABLE \"a;b\" (x TEXT);;\n  -- trailing\n",
        );
        assert_eq!(statements, vec!["CREATE TABLE \"a;b\" (x TEXT)"]);

        let statements = split_sql_statements(
            "/* drop; later */ SELECT 1;\nSELECT /* a;b */ 2; /* unterminated; ",
        );
        assert_eq!(statements, vec!["SELECT 1", "SELECT   2"]);
    }

    #[test]
    fn test_split_keeps_trigger_and_case_bodies_whole() {
        let statements = split_sql_statements(
            "CREATE TRIGGER t AFTER INSERT ON a BEGIN UPDATE b SET n = n + 1; END;\n\
             CREATE TRIGGER u AFTER UPDATE ON a BEGIN\n\
               UPDATE b SET n = CASE WHEN n > 0 THEN n - 1 ELSE 0 END;\n\
               DELETE FROM c WHERE backend = 'x';\n\
             END;\n\
             BEGIN;\n\
             SELECT end_date FROM d;",
        );
        assert_eq!(
            statements,
            vec![
                "CREATE TRIGGER t AFTER INSERT ON a BEGIN UPDATE b SET n = n + 1; END",
                "CREATE TRIGGER u AFTER UPDATE ON a BEGIN\n\
                   UPDATE b SET n = CASE WHEN n > 0 THEN n - 1 ELSE 0 END;\n\
                   DELETE FROM c WHERE backend = 'x';\n\
                 END",
                "BEGIN",
                "SELECT end_date FROM d",
            ]
        );
    }

    #[test]
    fn test_registry_rejects_unknown_names() {
        let registry = MigrationRegistry::new().with("001_init", SqlMigration::default());
        assert!(registry.contains("001_init"));
        assert!(registry.resolve("001_init", Path::new("001_init.rs")).is_ok());
        assert!(matches!(
            registry.resolve("002_missing", Path::new("002_missing.rs")),
            Err(MigrateError::MigrationContract { .. })
        ));
    }
}
