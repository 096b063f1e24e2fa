use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use fsfinder::finder::{DirItem, DirListing, FileSystem, Stat};
use fsfinder::{FindError, FindFlags, FindOptions, FindResult, Finder, Matcher};
use tempfile::{tempdir, TempDir};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create the tree `root/{a.go, b.txt, sub/{c.go, .hidden}}` inside a temp dir
fn sample_tree() -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("root");
    fs::create_dir_all(root.join("sub"))?;
    File::create(root.join("a.go"))?.write_all(b"package a")?;
    File::create(root.join("b.txt"))?.write_all(b"bee")?;
    File::create(root.join("sub").join("c.go"))?.write_all(b"package sub")?;
    File::create(root.join("sub").join(".hidden"))?;
    Ok((dir, root))
}

/// Result paths relative to `base`, sorted
fn relative(base: &Path, paths: Vec<PathBuf>) -> Vec<String> {
    let mut out: Vec<String> = paths
        .iter()
        .map(|p| p.strip_prefix(base).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    out.sort();
    out
}

#[derive(Debug)]
enum Node {
    Dir(Vec<DirItem>),
    File(Vec<u8>),
}

/// In-memory filesystem that counts stats and open handles
#[derive(Debug, Default)]
struct MemFs {
    nodes: HashMap<PathBuf, Node>,
    broken_dirs: HashSet<PathBuf>,
    broken_stats: HashSet<PathBuf>,
    broken_entries: HashSet<PathBuf>,
    stats: AtomicUsize,
    open_handles: Arc<AtomicUsize>,
}

impl MemFs {
    fn new(root: impl Into<PathBuf>) -> Self {
        let mut fs = Self::default();
        fs.nodes.insert(root.into(), Node::Dir(Vec::new()));
        fs
    }

    fn add(&mut self, path: PathBuf, node: Node) {
        let parent = path.parent().unwrap().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let is_dir = matches!(node, Node::Dir(_));
        match self.nodes.get_mut(&parent) {
            Some(Node::Dir(items)) => items.push(DirItem::new(name, is_dir)),
            _ => panic!("missing parent {}", parent.display()),
        }
        self.nodes.insert(path, node);
    }

    fn dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.add(path.into(), Node::Dir(Vec::new()));
        self
    }

    fn file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.add(path.into(), Node::File(content.as_bytes().to_vec()));
        self
    }

    fn broken_dir(mut self, path: &str) -> Self {
        self.broken_dirs.insert(PathBuf::from(path));
        self
    }

    fn broken_stat(mut self, path: &str) -> Self {
        self.broken_stats.insert(PathBuf::from(path));
        self
    }

    /// The entry fails while its parent is being listed
    fn broken_entry(mut self, path: &str) -> Self {
        self.broken_entries.insert(PathBuf::from(path));
        self
    }
}

struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    open: Arc<AtomicUsize>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FileSystem for MemFs {
    fn read_dir(&self, dir: &Path) -> FindResult<DirListing> {
        if self.broken_dirs.contains(dir) {
            return Err(FindError::read_dir(
                dir,
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ));
        }
        match self.nodes.get(dir) {
            Some(Node::Dir(items)) => {
                let mut listing = DirListing::default();
                for item in items {
                    let path = dir.join(&item.name);
                    if self.broken_entries.contains(&path) {
                        listing.errors.push(FindError::read_dir(
                            path,
                            io::Error::new(io::ErrorKind::NotFound, "vanished"),
                        ));
                    } else {
                        listing.items.push(item.clone());
                    }
                }
                Ok(listing)
            }
            _ => Err(FindError::read_dir(
                dir,
                io::Error::new(io::ErrorKind::NotFound, "no such dir"),
            )),
        }
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        if self.broken_stats.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        match self.nodes.get(path) {
            Some(Node::Dir(_)) => Ok(Stat {
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
                mode: 0o755,
                is_dir: true,
            }),
            Some(Node::File(data)) => Ok(Stat {
                size: data.len() as u64,
                modified: SystemTime::UNIX_EPOCH,
                mode: 0o644,
                is_dir: false,
            }),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
        }
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        match self.nodes.get(path) {
            Some(Node::File(data)) => {
                self.open_handles.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(TrackedReader {
                    inner: Cursor::new(data.clone()),
                    open: Arc::clone(&self.open_handles),
                }))
            }
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
        }
    }
}

#[test]
fn test_include_ext_unlimited_depth() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let (dir, root) = sample_tree()?;

    let options = FindOptions::new().scan_dir(&root).include_ext(".go");
    let mut finder = Finder::new(options)?;

    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["root/a.go", "root/sub/c.go"]
    );
    Ok(())
}

#[test]
fn test_include_ext_max_depth_one() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;

    let options = FindOptions::new()
        .scan_dir(&root)
        .include_ext(".go")
        .with_max_depth(Some(1));
    let mut finder = Finder::new(options)?;

    assert_eq!(relative(dir.path(), finder.find_paths()), vec!["root/a.go"]);
    Ok(())
}

#[test]
fn test_exclude_name_both_kinds() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;

    let options = FindOptions::new()
        .scan_dir(&root)
        .files_and_dirs()
        .exclude_name("b.txt");
    let mut finder = Finder::new(options)?;

    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["root/a.go", "root/sub", "root/sub/.hidden", "root/sub/c.go"]
    );
    Ok(())
}

#[test]
fn test_find_flags_govern_emission_only() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;
    fs::create_dir_all(root.join("sub").join("deeper"))?;

    let mut files = Finder::new(FindOptions::new().scan_dir(&root))?;
    assert!(files.find().iter().all(|e| !e.is_dir()));
    assert_eq!(files.num(), 4);

    let mut dirs = Finder::new(FindOptions::new().scan_dir(&root).only_dirs())?;
    let found = dirs.find();
    assert!(found.iter().all(|e| e.is_dir()));
    // directories are still descended under the dir flag
    assert_eq!(
        relative(dir.path(), found.iter().map(|e| e.path().to_path_buf()).collect()),
        vec!["root/sub", "root/sub/deeper"]
    );

    let mut both = Finder::new(FindOptions::new().scan_dir(&root).with_flags(FindFlags::BOTH))?;
    assert_eq!(both.find().len(), 6);
    Ok(())
}

#[test]
fn test_depth_limit_bounds_results() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let mut current = dir.path().to_path_buf();
    for level in 0..5 {
        File::create(current.join(format!("f{}.txt", level)))?;
        current = current.join(format!("d{}", level));
        fs::create_dir(&current)?;
    }

    for limit in 1..=5 {
        let options = FindOptions::new()
            .scan_dir(dir.path())
            .files_and_dirs()
            .with_max_depth(Some(limit));
        let mut finder = Finder::new(options)?;
        let paths = finder.find_paths();

        assert!(!paths.is_empty());
        for path in paths {
            let depth = path.strip_prefix(dir.path())?.components().count();
            assert!(depth <= limit, "{} deeper than {}", path.display(), limit);
        }
    }

    // 0 means unlimited: 5 files and 5 dirs
    let options = FindOptions::new()
        .scan_dir(dir.path())
        .files_and_dirs()
        .with_max_depth(Some(0));
    assert_eq!(Finder::new(options)?.find().len(), 10);
    Ok(())
}

#[test]
fn test_cached_results_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let options = FindOptions::new().scan_dir(&root).with_cache_result(true);
    let mut finder = Finder::new(options)?;

    let first = finder.find_paths();
    File::create(root.join("late.go"))?;
    let second = finder.find_paths();

    // the cache is reused without walking again
    assert_eq!(first, second);
    assert_eq!(finder.cache_num(), 4);

    finder.reset_result();
    assert_eq!(finder.find_paths().len(), 5);
    Ok(())
}

#[test]
fn test_uncached_results_are_set_equal() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let mut finder = Finder::new(FindOptions::new().scan_dir(&root).files_and_dirs())?;
    let first: HashSet<PathBuf> = finder.find_paths().into_iter().collect();
    let second: HashSet<PathBuf> = finder.find_paths().into_iter().collect();

    assert_eq!(first, second);
    assert_eq!(finder.cache_num(), 0);
    Ok(())
}

#[test]
fn test_exclude_wins_over_include() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let options = FindOptions::new()
        .scan_dir(&root)
        .include_name("a.go")
        .include(Matcher::ext("go"))
        .exclude_ext("go");
    let mut finder = Finder::new(options)?;

    assert!(finder.find().is_empty());
    Ok(())
}

#[test]
fn test_duplicate_roots_are_walked_twice() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let mut finder = Finder::new(FindOptions::new().include_ext("go"))?;
    finder.add_scan_dirs([&root, &root]);

    assert_eq!(finder.find().len(), 4);
    Ok(())
}

#[test]
fn test_dot_dir_and_dir_rules_prune() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    for sub in [".git", "vendor", "src"] {
        fs::create_dir(dir.path().join(sub))?;
        File::create(dir.path().join(sub).join("x.go"))?;
    }
    File::create(dir.path().join(".env"))?;

    let options = FindOptions::new()
        .scan_dir(dir.path())
        .files_and_dirs()
        .exclude_dot_dir(true)
        .exclude_dot_file(true)
        .exclude_dir("vendor");
    let mut finder = Finder::new(options)?;

    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["src", "src/x.go"]
    );
    Ok(())
}

#[test]
fn test_include_dir_does_not_prune() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;

    let options = FindOptions::new()
        .scan_dir(&root)
        .files_and_dirs()
        .include_dir("nothing-matches");
    let mut finder = Finder::new(options)?;

    // no directory is emitted, but sub is still descended
    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["root/a.go", "root/b.txt", "root/sub/.hidden", "root/sub/c.go"]
    );
    Ok(())
}

#[test]
fn test_missing_and_file_roots_are_recorded() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;

    let options = FindOptions::new()
        .scan_dir(dir.path().join("missing"))
        .scan_dir(root.join("a.go"))
        .scan_dir(&root)
        .include_ext("go");
    let mut finder = Finder::new(options)?;

    assert_eq!(finder.find().len(), 2);
    match finder.err() {
        Some(FindError::RootNotFound(path)) => assert!(path.ends_with("missing")),
        other => panic!("Expected RootNotFound, got {:?}", other),
    }

    finder.reset();
    assert!(finder.err().is_none());
    Ok(())
}

#[test]
fn test_read_dir_failure_keeps_siblings() -> Result<(), Box<dyn std::error::Error>> {
    let fs = Arc::new(
        MemFs::new("/r")
            .dir("/r/bad")
            .file("/r/bad/lost.go", "")
            .dir("/r/good")
            .file("/r/good/found.go", "")
            .broken_dir("/r/bad"),
    );

    let options = FindOptions::new().scan_dir("/r").include_ext("go");
    let mut finder = Finder::with_file_system(options, fs)?;

    assert_eq!(finder.find_paths(), vec![PathBuf::from("/r/good/found.go")]);
    assert!(matches!(finder.err(), Some(FindError::ReadDirFailure { .. })));
    Ok(())
}

#[test]
fn test_failed_entry_keeps_siblings_in_listing() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let fs = Arc::new(
        MemFs::new("/r")
            .file("/r/a.go", "")
            .file("/r/gone.go", "")
            .file("/r/z.go", "")
            .broken_entry("/r/gone.go"),
    );

    for concurrency in [1, 3] {
        let options = FindOptions::new()
            .scan_dir("/r")
            .include_ext("go")
            .with_concurrency(concurrency);
        let shared: Arc<dyn FileSystem> = Arc::clone(&fs) as Arc<MemFs>;
        let mut finder = Finder::with_file_system(options, shared)?;

        let mut names = finder.find_names();
        names.sort();
        assert_eq!(names, vec!["a.go", "z.go"]);
        match finder.err() {
            Some(FindError::ReadDirFailure { path, .. }) => {
                assert_eq!(path, Path::new("/r/gone.go"))
            }
            other => panic!("Expected ReadDirFailure, got {:?}", other),
        }
    }
    Ok(())
}

#[test]
fn test_stat_failure_excludes_entry() -> Result<(), Box<dyn std::error::Error>> {
    let fs = Arc::new(
        MemFs::new("/r")
            .file("/r/a.bin", "1234")
            .file("/r/b.bin", "5678")
            .broken_stat("/r/a.bin"),
    );

    let options = FindOptions::new()
        .scan_dir("/r")
        .exclude(Matcher::size_range(100, 0));
    let mut finder = Finder::with_file_system(options, fs)?;

    assert_eq!(finder.find_names(), vec!["b.bin".to_string()]);
    match finder.err() {
        Some(FindError::StatFailure { path, .. }) => assert_eq!(path, Path::new("/r/a.bin")),
        other => panic!("Expected StatFailure, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_elem_info_stats_once() -> Result<(), Box<dyn std::error::Error>> {
    let fs = Arc::new(MemFs::new("/r").file("/r/a.go", "package a"));

    let mut finder = Finder::with_file_system(FindOptions::new().scan_dir("/r"), fs.clone())?;
    let found = finder.find();
    assert_eq!(found.len(), 1);

    // only the root was stat-ed during the walk
    let before = fs.stats.load(Ordering::SeqCst);
    let first = found[0].info().unwrap().clone();
    let second = found[0].info().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first.size, 9);
    assert_eq!(fs.stats.load(Ordering::SeqCst), before + 1);
    Ok(())
}

#[test]
fn test_concurrent_walk_matches_sequential() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = tempdir()?;
    for i in 0..8 {
        let sub = dir.path().join(format!("d{}", i)).join("inner");
        fs::create_dir_all(&sub)?;
        File::create(sub.join(format!("f{}.go", i)))?;
        File::create(dir.path().join(format!("d{}", i)).join("skip.txt"))?;
    }

    let sequential: HashSet<PathBuf> = Finder::new(
        FindOptions::new().scan_dir(dir.path()).include_ext("go"),
    )?
    .find_paths()
    .into_iter()
    .collect();

    let mut concurrent = Finder::new(
        FindOptions::new()
            .scan_dir(dir.path())
            .include_ext("go")
            .with_concurrency(4),
    )?;
    let pooled: HashSet<PathBuf> = concurrent.find_paths().into_iter().collect();

    assert_eq!(sequential.len(), 8);
    assert_eq!(sequential, pooled);
    assert_eq!(concurrent.num(), 8);
    Ok(())
}

#[test]
fn test_concurrent_keeps_listing_order_within_dir() -> Result<(), Box<dyn std::error::Error>> {
    let mut mem = MemFs::new("/r");
    for i in 0..4 {
        mem = mem
            .dir(format!("/r/d{}", i))
            .file(format!("/r/d{}/x.txt", i), "");
    }
    for i in 0..10 {
        mem = mem.file(format!("/r/f{}.txt", i), "");
    }

    let options = FindOptions::new().scan_dir("/r").with_concurrency(3);
    let mut finder = Finder::with_file_system(options, Arc::new(mem))?;
    let names: Vec<String> = finder
        .find()
        .iter()
        .filter(|e| e.path().parent() == Some(Path::new("/r")))
        .map(|e| e.name().to_string())
        .collect();

    let expected: Vec<String> = (0..10).map(|i| format!("f{}.txt", i)).collect();
    assert_eq!(names, expected);
    assert_eq!(finder.num(), 14);
    Ok(())
}

#[test]
fn test_callback_abort_is_propagated() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let mut finder = Finder::new(FindOptions::new().scan_dir(&root).files_and_dirs())?;
    let mut seen = 0;
    let result = finder.each(|_| {
        seen += 1;
        if seen == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    assert!(matches!(result, Err(FindError::CallbackAbort)));
    assert_eq!(seen, 2);

    // the finder is still usable afterwards
    assert_eq!(finder.find().len(), 5);
    Ok(())
}

#[test]
fn test_callback_abort_under_concurrency() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    for i in 0..6 {
        let sub = dir.path().join(format!("d{}", i));
        fs::create_dir(&sub)?;
        for j in 0..5 {
            File::create(sub.join(format!("f{}.txt", j)))?;
        }
    }

    let options = FindOptions::new().scan_dir(dir.path()).with_concurrency(4);
    let mut finder = Finder::new(options)?;
    let mut seen = 0;
    let result = finder.each_path(|_| {
        seen += 1;
        ControlFlow::Break(())
    });

    assert!(matches!(result, Err(FindError::CallbackAbort)));
    assert_eq!(seen, 1);
    Ok(())
}

#[test]
fn test_abort_does_not_fill_cache() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let options = FindOptions::new().scan_dir(&root).with_cache_result(true);
    let mut finder = Finder::new(options)?;

    let result = finder.each(|_| ControlFlow::Break(()));
    assert!(result.is_err());
    assert_eq!(finder.cache_num(), 0);

    assert_eq!(finder.find().len(), 4);
    assert_eq!(finder.cache_num(), 4);

    // replaying the cache still honours the sentinel
    let result = finder.each_elem(|_| ControlFlow::Break(()));
    assert!(matches!(result, Err(FindError::CallbackAbort)));
    Ok(())
}

#[test]
fn test_each_file_closes_before_next() -> Result<(), Box<dyn std::error::Error>> {
    let fs = Arc::new(
        MemFs::new("/r")
            .file("/r/one.txt", "1")
            .file("/r/two.txt", "22")
            .dir("/r/sub")
            .file("/r/sub/three.txt", "333"),
    );
    let handles = Arc::clone(&fs.open_handles);

    let options = FindOptions::new().scan_dir("/r").files_and_dirs();
    let mut finder = Finder::with_file_system(options, fs)?;

    let mut total = 0;
    finder.each_file(|file, _elem| {
        assert_eq!(handles.load(Ordering::SeqCst), 1);
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        total += buf.len();
        ControlFlow::Continue(())
    })?;

    assert_eq!(total, 6);
    assert_eq!(handles.load(Ordering::SeqCst), 0);

    // a breaking callback still releases its handle
    let result = finder.each_file(|_, _| ControlFlow::Break(()));
    assert!(result.is_err());
    assert_eq!(handles.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_each_contents_and_stat() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, root) = sample_tree()?;

    let mut finder = Finder::new(FindOptions::new().scan_dir(&root).include_ext("go"))?;

    let mut packages = Vec::new();
    finder.each_contents(|contents, _| {
        packages.push(contents.to_string());
        ControlFlow::Continue(())
    })?;
    packages.sort();
    assert_eq!(packages, vec!["package a", "package sub"]);

    let mut sizes = 0;
    finder.each_stat(|stat, elem| {
        assert!(!elem.is_dir());
        sizes += stat.size;
        ControlFlow::Continue(())
    })?;
    assert_eq!(sizes, 20);
    assert!(finder.err().is_none());
    Ok(())
}

#[test]
fn test_abs_path_results() -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let fs = Arc::new(MemFs::new(cwd.join("data")).file(cwd.join("data").join("a.go"), ""));

    let options = FindOptions::new().scan_dir("data").with_abs_path(true);
    let mut finder = Finder::with_file_system(options, fs)?;

    let paths = finder.find_paths();
    assert_eq!(paths, vec![cwd.join("data").join("a.go")]);
    assert!(paths[0].is_absolute());
    Ok(())
}

#[test]
fn test_abs_path_cleans_dot_root() -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let fs = Arc::new(
        MemFs::new(cwd.clone())
            .dir(cwd.join("data"))
            .file(cwd.join("data").join("a.go"), ""),
    );

    let options = FindOptions::new()
        .scan_dir(".")
        .scan_dir("./data/../data")
        .include_ext("go")
        .with_abs_path(true);
    let mut finder = Finder::with_file_system(options, fs)?;

    let paths = finder.find_paths();
    let expected = cwd.join("data").join("a.go");
    assert_eq!(paths, vec![expected.clone(), expected]);
    assert!(paths.iter().all(|p| !p.components().any(|c| matches!(
        c,
        std::path::Component::CurDir | std::path::Component::ParentDir
    ))));
    assert!(finder.err().is_none());
    Ok(())
}

#[test]
fn test_include_and_exclude_path_substring() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;

    let options = FindOptions::new().scan_dir(&root).include_path("/sub/");
    let mut finder = Finder::new(options)?;
    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["root/sub/.hidden", "root/sub/c.go"]
    );

    // a path exclude filters entries but does not stop descent
    let options = FindOptions::new()
        .scan_dir(&root)
        .files_and_dirs()
        .exclude_path("/sub/")
        .include_path("root");
    let mut finder = Finder::new(options)?;
    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["root/a.go", "root/b.txt", "root/sub"]
    );
    Ok(())
}

#[test]
fn test_matcher_combinators_in_finder() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, root) = sample_tree()?;

    let mut finder = Finder::new(FindOptions::new().scan_dir(&root))?;
    finder
        .include(Matcher::ext("go").or(Matcher::regex(r"^b\.")?))
        .exclude(Matcher::path("/sub/"));

    assert_eq!(
        relative(dir.path(), finder.find_paths()),
        vec!["root/a.go", "root/b.txt"]
    );
    Ok(())
}
