//! 文件查找模块
//!
//! 这个模块提供可组合过滤规则的目录树查找器，
//! 包括惰性读取元数据的条目、结果缓存、流式回调以及可选的线程池遍历。

mod elem;
pub mod filter;
pub mod fs;
pub mod options;
mod thread_pool;
mod walker;

use std::io::Read;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

pub use self::elem::Elem;
pub use self::filter::{parse_human_size, Matcher, MultiMatcher};
pub use self::fs::{DirItem, DirListing, FileSystem, OsFileSystem, Stat};
pub use self::options::{compile, FindFlags, FindOptions, Rules, RuleSet};
pub use thread_pool::{ThreadPoolConfig, WorkerPool};

use crate::errors::{FindError, FindResult};

/// 文件查找器
///
/// 持有一份选项、编译好的规则以及上一次遍历的状态（缓存、错误、计数）。
/// `reset()` 只清除遍历状态，规则保持不变。
///
/// 回调返回 `ControlFlow::Break(())` 时，遍历立即结束，
/// 触发它的调用返回 `Err(FindError::CallbackAbort)`，查找器仍可继续使用。
#[derive(Debug)]
pub struct Finder {
    options: FindOptions,
    rules: Rules,
    fs: Arc<dyn FileSystem>,
    pool: Option<WorkerPool>,
    cache: Option<Vec<Arc<Elem>>>,
    num: usize,
    err: Option<FindError>,
}

impl Finder {
    /// 创建新的文件查找器实例
    ///
    /// 规则在这里编译一次；无效的 glob 或正则规则会返回错误。
    pub fn new(options: FindOptions) -> FindResult<Self> {
        Self::with_file_system(options, Arc::new(OsFileSystem))
    }

    /// 使用指定的文件系统实现创建查找器
    pub fn with_file_system(options: FindOptions, fs: Arc<dyn FileSystem>) -> FindResult<Self> {
        let rules = compile(&options)?;
        let pool = if options.concurrency > 1 {
            Some(WorkerPool::new(ThreadPoolConfig::with_threads(options.concurrency))?)
        } else {
            None
        };

        Ok(Self {
            options,
            rules,
            fs,
            pool,
            cache: None,
            num: 0,
            err: None,
        })
    }

    /// 查找选项
    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// 添加扫描根目录，重复的目录会各自遍历一次
    pub fn add_scan_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.options.scan_dirs.push(dir.into());
        self
    }

    pub fn add_scan_dirs<I, P>(&mut self, dirs: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.options.scan_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// 添加包含匹配器，所有包含匹配器都必须匹配
    pub fn include(&mut self, matcher: Matcher) -> &mut Self {
        self.options.includes.push(matcher.clone());
        self.rules.include.add(matcher);
        self
    }

    pub fn includes(&mut self, matchers: impl IntoIterator<Item = Matcher>) -> &mut Self {
        for matcher in matchers {
            self.include(matcher);
        }
        self
    }

    /// 同 [`Finder::include`]
    pub fn with(&mut self, matcher: Matcher) -> &mut Self {
        self.include(matcher)
    }

    /// 添加排除匹配器，任意一个匹配即排除
    pub fn exclude(&mut self, matcher: Matcher) -> &mut Self {
        self.options.excludes.push(matcher.clone());
        self.rules.exclude.push(matcher);
        self
    }

    pub fn excludes(&mut self, matchers: impl IntoIterator<Item = Matcher>) -> &mut Self {
        for matcher in matchers {
            self.exclude(matcher);
        }
        self
    }

    /// 同 [`Finder::exclude`]
    pub fn without(&mut self, matcher: Matcher) -> &mut Self {
        self.exclude(matcher)
    }

    /// 查找所有匹配的条目
    ///
    /// 启用缓存且已有缓存时直接返回缓存内容。
    pub fn find(&mut self) -> Vec<Arc<Elem>> {
        let mut found = Vec::new();
        // the collector never breaks, so the walk cannot abort
        let _ = self.run(|elem| {
            found.push(Arc::clone(elem));
            ControlFlow::Continue(())
        });
        found
    }

    /// 查找并返回完整路径
    pub fn find_paths(&mut self) -> Vec<PathBuf> {
        self.find().iter().map(|e| e.path().to_path_buf()).collect()
    }

    /// 查找并返回基本名称
    pub fn find_names(&mut self) -> Vec<String> {
        self.find().iter().map(|e| e.name().to_string()).collect()
    }

    /// 对每个匹配条目调用回调
    pub fn each<F>(&mut self, mut f: F) -> FindResult<()>
    where
        F: FnMut(&Elem) -> ControlFlow<()>,
    {
        self.run(|elem| f(elem))
    }

    /// 对每个匹配条目调用回调，回调获得条目的共享所有权
    pub fn each_elem<F>(&mut self, mut f: F) -> FindResult<()>
    where
        F: FnMut(Arc<Elem>) -> ControlFlow<()>,
    {
        self.run(|elem| f(Arc::clone(elem)))
    }

    /// 对每个匹配路径调用回调
    pub fn each_path<F>(&mut self, mut f: F) -> FindResult<()>
    where
        F: FnMut(&Path) -> ControlFlow<()>,
    {
        self.run(|elem| f(elem.path()))
    }

    /// 对每个匹配条目连同元数据调用回调
    ///
    /// 元数据读取失败的条目被跳过并记录错误。
    pub fn each_stat<F>(&mut self, mut f: F) -> FindResult<()>
    where
        F: FnMut(&Stat, &Elem) -> ControlFlow<()>,
    {
        let mut failures = Vec::new();
        let result = self.run(|elem| match elem.info() {
            Ok(stat) => f(stat, elem),
            Err(err) => {
                failures.push(err.duplicate());
                ControlFlow::Continue(())
            }
        });
        self.note_all(failures);
        result
    }

    /// 以只读方式打开每个匹配的文件并调用回调
    ///
    /// 文件在处理下一个匹配之前关闭，无论回调结果如何。目录被跳过。
    pub fn each_file<F>(&mut self, mut f: F) -> FindResult<()>
    where
        F: FnMut(&mut dyn Read, &Elem) -> ControlFlow<()>,
    {
        let mut failures = Vec::new();
        let result = self.run(|elem| {
            if elem.is_dir() {
                return ControlFlow::Continue(());
            }
            match elem.file_system().open(elem.path()) {
                // the handle is dropped when this arm ends
                Ok(mut file) => f(file.as_mut(), elem),
                Err(source) => {
                    failures.push(FindError::OpenFailure {
                        path: elem.path().to_path_buf(),
                        source,
                    });
                    ControlFlow::Continue(())
                }
            }
        });
        self.note_all(failures);
        result
    }

    /// 读取每个匹配文件的全部内容（UTF-8）并调用回调
    pub fn each_contents<F>(&mut self, mut f: F) -> FindResult<()>
    where
        F: FnMut(&str, &Elem) -> ControlFlow<()>,
    {
        let mut failures = Vec::new();
        let result = self.each_file(|file, elem| {
            let mut contents = String::new();
            match file.read_to_string(&mut contents) {
                Ok(_) => f(&contents, elem),
                Err(source) => {
                    failures.push(FindError::ReadFailure {
                        path: elem.path().to_path_buf(),
                        source,
                    });
                    ControlFlow::Continue(())
                }
            }
        });
        self.note_all(failures);
        result
    }

    /// 清除缓存、计数和错误，保留选项与规则
    pub fn reset(&mut self) {
        self.reset_result();
        self.err = None;
    }

    /// 清除缓存和计数
    pub fn reset_result(&mut self) {
        self.cache = None;
        self.num = 0;
    }

    /// 上一次遍历记录的第一个非致命错误
    pub fn err(&self) -> Option<&FindError> {
        self.err.as_ref()
    }

    /// 上一次遍历匹配到的条目数
    pub fn num(&self) -> usize {
        self.num
    }

    /// 缓存中的条目数
    pub fn cache_num(&self) -> usize {
        self.cache.as_ref().map_or(0, Vec::len)
    }

    /// 缓存的条目
    pub fn caches(&self) -> &[Arc<Elem>] {
        self.cache.as_deref().unwrap_or(&[])
    }

    /// 遍历（或重放缓存），每个匹配条目调用一次 `sink`
    fn run<S>(&mut self, mut sink: S) -> FindResult<()>
    where
        S: FnMut(&Arc<Elem>) -> ControlFlow<()>,
    {
        if self.options.cache_result {
            if let Some(cache) = &self.cache {
                for elem in cache {
                    if sink(elem).is_break() {
                        return Err(FindError::CallbackAbort);
                    }
                }
                return Ok(());
            }
        }

        info!(
            "Starting search in {} scan dirs with {} workers",
            self.options.scan_dirs.len(),
            self.pool.as_ref().map_or(1, WorkerPool::thread_count)
        );

        let caching = self.options.cache_result;
        let mut collected = Vec::new();
        let outcome = walker::walk(
            &self.options,
            &self.rules,
            &self.fs,
            self.pool.as_ref(),
            |elem: &Arc<Elem>| {
                if caching {
                    collected.push(Arc::clone(elem));
                }
                sink(elem)
            },
        );

        info!("Found {} entries ({} errors)", outcome.num, outcome.errors);
        self.num = outcome.num;
        self.err = outcome.err;

        if outcome.aborted {
            return Err(FindError::CallbackAbort);
        }
        if caching {
            self.cache = Some(collected);
        }
        Ok(())
    }

    fn note_all(&mut self, errors: Vec<FindError>) {
        for err in errors {
            warn!("{}", err);
            if self.err.is_none() {
                self.err = Some(err);
            }
        }
    }
}
