//! Output sinks: plain text files, one per article

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::article::Article;

/// Durable storage for enriched articles.
///
/// Called concurrently from every enrichment worker of every source.
pub trait Sink: Send + Sync {
    /// Persist `article.text()` under `(source, article.category(), article.id())`.
    ///
    /// Saving the same key again overwrites the previous content.
    fn save(&self, source: &str, article: &Article) -> io::Result<()>;
}

const TEXT_EXT: &str = "txt";

/// Writes `root/<source>/<category>/<id>.txt` with atomic tmp→rename
#[derive(Debug, Clone)]
pub struct TextFileSink {
    root: PathBuf,
}

impl TextFileSink {
    /// Create the sink and every `root/<source>/<category>` directory up front.
    ///
    /// Fails if any directory cannot be created; the run must not start then.
    pub fn create<'a>(
        root: impl Into<PathBuf>,
        layout: impl IntoIterator<Item = (&'a str, &'a [String])>,
    ) -> io::Result<Self> {
        let root = root.into();
        for (source, categories) in layout {
            for category in categories {
                fs::create_dir_all(root.join(source).join(category))?;
            }
        }
        Ok(Self { root })
    }

    /// Final path of an article's text file
    pub fn path_for(&self, source: &str, article: &Article) -> PathBuf {
        self.root
            .join(source)
            .join(article.category())
            .join(format!("{}.{TEXT_EXT}", article.id()))
    }
}

impl Sink for TextFileSink {
    fn save(&self, source: &str, article: &Article) -> io::Result<()> {
        let final_path = self.path_for(source, article);
        let tmp_path = final_path.with_extension(format!("{TEXT_EXT}.tmp"));

        fs::write(&tmp_path, article.text())?;
        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}

/// Remove `<id>.txt.tmp` files left in the category directories by an
/// interrupted run.
///
/// Only the configured `root/<source>/<category>` directories are visited and
/// only regular files are removed; anything else under `root` is left alone.
pub fn cleanup_tmp_files<'a>(
    root: &Path,
    layout: impl IntoIterator<Item = (&'a str, &'a [String])>,
) -> io::Result<()> {
    let tmp_suffix = format!(".{TEXT_EXT}.tmp");
    for (source, categories) in layout {
        for category in categories {
            let dir = root.join(source).join(category);
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            for entry in entries {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                if entry.file_name().to_string_lossy().ends_with(&tmp_suffix) {
                    let path = entry.path();
                    log::warn!("Removing stale tmp file: {}", path.display());
                    fs::remove_file(&path)?;
                }
            }
        }
    }
    Ok(())
}

/// Number of saved articles in one (source, category) directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub source: String,
    pub category: String,
    pub files: usize,
}

/// Count saved `.txt` files per (source, category).
///
/// A missing directory counts as zero.
pub fn count_saved<'a>(
    root: &Path,
    layout: impl IntoIterator<Item = (&'a str, &'a [String])>,
) -> io::Result<Vec<CategoryCount>> {
    let mut counts = Vec::new();
    for (source, categories) in layout {
        for category in categories {
            let dir = root.join(source).join(category);
            let files = match fs::read_dir(&dir) {
                Ok(entries) => {
                    let mut n = 0;
                    for entry in entries {
                        if entry?.path().extension().is_some_and(|ext| ext == TEXT_EXT) {
                            n += 1;
                        }
                    }
                    n
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
                Err(e) => return Err(e),
            };
            counts.push(CategoryCount {
                source: source.to_string(),
                category: category.clone(),
                files,
            });
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn article(category: &str, id: &str, text: &str) -> Article {
        let mut a = Article::new(category, id, format!("https://example.org/{id}"));
        a.set_text(text);
        a
    }

    #[test]
    fn create_prepares_all_directories() {
        let dir = TempDir::new().unwrap();
        let tass = cats(&["sport", "kultura"]);
        let rt = cats(&["all-news"]);
        TextFileSink::create(dir.path(), [("tass", tass.as_slice()), ("rt", rt.as_slice())])
            .unwrap();

        assert!(dir.path().join("tass/sport").is_dir());
        assert!(dir.path().join("tass/kultura").is_dir());
        assert!(dir.path().join("rt/all-news").is_dir());
    }

    #[test]
    fn create_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("out");
        fs::write(&blocker, b"not a dir").unwrap();
        let news = cats(&["news"]);
        assert!(TextFileSink::create(&blocker, [("meduza", news.as_slice())]).is_err());
    }

    #[test]
    fn save_writes_text_file() {
        let dir = TempDir::new().unwrap();
        let news = cats(&["news"]);
        let sink = TextFileSink::create(dir.path(), [("meduza", news.as_slice())]).unwrap();

        sink.save("meduza", &article("news", "news-@-1", "hello")).unwrap();

        let path = dir.path().join("meduza/news/news-@-1.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
        assert!(!dir.path().join("meduza/news/news-@-1.txt.tmp").exists());
    }

    #[test]
    fn save_twice_overwrites() {
        let dir = TempDir::new().unwrap();
        let sport = cats(&["sport"]);
        let sink = TextFileSink::create(dir.path(), [("tass", sport.as_slice())]).unwrap();
        let a = article("sport", "7", "same body");

        sink.save("tass", &a).unwrap();
        sink.save("tass", &a).unwrap();

        let path = sink.path_for("tass", &a);
        assert_eq!(fs::read_to_string(path).unwrap(), "same body");
        let counts = count_saved(dir.path(), [("tass", sport.as_slice())]).unwrap();
        assert_eq!(counts[0].files, 1);
    }

    #[test]
    fn save_into_unknown_category_fails() {
        let dir = TempDir::new().unwrap();
        let sport = cats(&["sport"]);
        let sink = TextFileSink::create(dir.path(), [("tass", sport.as_slice())]).unwrap();
        assert!(sink.save("tass", &article("politika", "1", "x")).is_err());
    }

    #[test]
    fn cleanup_removes_stale_article_tmp_files() {
        let dir = TempDir::new().unwrap();
        let sport = cats(&["sport"]);
        let category = dir.path().join("tass/sport");
        fs::create_dir_all(&category).unwrap();
        fs::write(category.join("1.txt.tmp"), b"stale").unwrap();
        fs::write(category.join("2.txt"), b"keep").unwrap();

        cleanup_tmp_files(dir.path(), [("tass", sport.as_slice())]).unwrap();

        assert!(!category.join("1.txt.tmp").exists());
        assert!(category.join("2.txt").exists());
    }

    #[test]
    fn cleanup_leaves_foreign_tmp_files() {
        let dir = TempDir::new().unwrap();
        let sport = cats(&["sport"]);
        let category = dir.path().join("tass/sport");
        fs::create_dir_all(&category).unwrap();
        let build = dir.path().join("my-project/build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("session.tmp"), b"not ours").unwrap();
        fs::write(dir.path().join("top.tmp"), b"not ours").unwrap();
        fs::write(dir.path().join("tass/notes.txt.tmp"), b"outside a category").unwrap();
        fs::write(category.join("editor.swp.tmp"), b"not an article").unwrap();

        cleanup_tmp_files(dir.path(), [("tass", sport.as_slice())]).unwrap();

        assert!(build.join("session.tmp").exists());
        assert!(dir.path().join("top.tmp").exists());
        assert!(dir.path().join("tass/notes.txt.tmp").exists());
        assert!(category.join("editor.swp.tmp").exists());
    }

    #[test]
    fn cleanup_skips_directories_named_like_tmp() {
        let dir = TempDir::new().unwrap();
        let sport = cats(&["sport"]);
        let odd = dir.path().join("tass/sport/odd.txt.tmp");
        fs::create_dir_all(&odd).unwrap();
        fs::write(odd.join("inner.txt.tmp"), b"nested").unwrap();

        cleanup_tmp_files(dir.path(), [("tass", sport.as_slice())]).unwrap();

        assert!(odd.join("inner.txt.tmp").exists());
    }

    #[test]
    fn cleanup_missing_root_is_ok() {
        let dir = TempDir::new().unwrap();
        let news = cats(&["news"]);
        assert!(cleanup_tmp_files(&dir.path().join("absent"), [("meduza", news.as_slice())]).is_ok());
    }

    #[test]
    fn count_saved_missing_dir_is_zero() {
        let dir = TempDir::new().unwrap();
        let news = cats(&["news"]);
        let counts = count_saved(dir.path(), [("meduza", news.as_slice())]).unwrap();
        assert_eq!(
            counts,
            vec![CategoryCount {
                source: "meduza".into(),
                category: "news".into(),
                files: 0,
            }]
        );
    }
}
