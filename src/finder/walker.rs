//! 文件系统遍历功能
//!
//! 本模块按深度优先顺序遍历每个扫描根目录，对每个子条目应用规则，
//! 把匹配结果交给回调。设置了线程池时，子目录的递归交给线程池执行。

use std::ops::ControlFlow;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::{env, io};

use log::{debug, warn};
use rayon::Scope;

use super::elem::Elem;
use super::fs::FileSystem;
use super::options::{FindOptions, Rules};
use super::thread_pool::WorkerPool;
use crate::errors::FindError;

/// 一次遍历的结果统计
#[derive(Debug, Default)]
pub(crate) struct WalkOutcome {
    /// 交给回调的条目数
    pub num: usize,
    /// 第一个记录的非致命错误
    pub err: Option<FindError>,
    /// 记录的错误总数
    pub errors: usize,
    /// 回调是否要求中止
    pub aborted: bool,
}

/// 工作线程共享的错误记录
#[derive(Default)]
struct ErrorSlot {
    first: Option<FindError>,
    count: usize,
}

/// 回调和计数器，只在调用线程上使用
struct Emitter<S> {
    sink: S,
    num: usize,
}

/// 处理一个子条目后产生的动作
enum Visit {
    Emit(Arc<Elem>),
    Descend(PathBuf),
}

/// 使用给定选项和规则遍历文件系统
struct Walker<'a> {
    options: &'a FindOptions,
    rules: &'a Rules,
    fs: &'a Arc<dyn FileSystem>,
    depth_limit: Option<usize>,
    errors: Mutex<ErrorSlot>,
    stopped: AtomicBool,
}

/// 遍历所有扫描根目录，每个匹配条目调用一次 `sink`
///
/// `sink` 总是在调用线程上执行，从不在线程池内执行；线程池模式下
/// 工作线程通过通道把匹配条目送回调用线程。
/// `sink` 返回 `ControlFlow::Break` 时遍历尽快结束，`aborted` 置为 true。
pub(crate) fn walk<S>(
    options: &FindOptions,
    rules: &Rules,
    fs: &Arc<dyn FileSystem>,
    pool: Option<&WorkerPool>,
    sink: S,
) -> WalkOutcome
where
    S: FnMut(&Arc<Elem>) -> ControlFlow<()>,
{
    let walker = Walker {
        options,
        rules,
        fs,
        depth_limit: options.depth_limit(),
        errors: Mutex::new(ErrorSlot::default()),
        stopped: AtomicBool::new(false),
    };
    let mut out = Emitter { sink, num: 0 };

    for root in &options.scan_dirs {
        if walker.is_stopped() {
            break;
        }
        let Some(root) = walker.prepare_root(root) else {
            continue;
        };

        debug!("Walking scan root {}", root.display());
        match pool {
            Some(pool) => walker.walk_root_pooled(pool, root, &mut out),
            None => walker.walk_dir(&root, 0, &mut out),
        }
    }

    let aborted = walker.is_stopped();
    let errors = walker.errors.into_inner().unwrap_or_else(PoisonError::into_inner);
    WalkOutcome {
        num: out.num,
        err: errors.first,
        errors: errors.count,
        aborted,
    }
}

/// 按词法规则清理路径：去掉 `.`，`..` 弹出上一级，不访问文件系统
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // the parent of the root is the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

impl<'a> Walker<'a> {
    /// 检查扫描根目录，不可用时记录错误并返回 None
    fn prepare_root(&self, root: &Path) -> Option<PathBuf> {
        let root = if self.options.use_abs_path {
            let joined = if root.is_absolute() {
                root.to_path_buf()
            } else {
                match env::current_dir() {
                    Ok(cwd) => cwd.join(root),
                    Err(e) => {
                        self.record(FindError::stat(root, e));
                        return None;
                    }
                }
            };
            clean_path(&joined)
        } else {
            root.to_path_buf()
        };

        match self.fs.stat(&root) {
            Ok(stat) if stat.is_dir => Some(root),
            Ok(_) => {
                self.record(FindError::NotADirectory(root));
                None
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.record(FindError::RootNotFound(root));
                None
            }
            Err(e) => {
                self.record(FindError::stat(root, e));
                None
            }
        }
    }

    /// 单线程深度优先遍历
    fn walk_dir<S>(&self, dir: &Path, depth: usize, out: &mut Emitter<S>)
    where
        S: FnMut(&Arc<Elem>) -> ControlFlow<()>,
    {
        self.visit_dir(dir, depth, &mut |visit| match visit {
            Visit::Emit(elem) => self.emit(out, &elem),
            Visit::Descend(sub) => {
                self.walk_dir(&sub, depth + 1, out);
                ControlFlow::Continue(())
            }
        });
    }

    /// 线程池遍历一个根目录，调用线程负责接收匹配条目并执行回调
    fn walk_root_pooled<S>(&self, pool: &WorkerPool, root: PathBuf, out: &mut Emitter<S>)
    where
        S: FnMut(&Arc<Elem>) -> ControlFlow<()>,
    {
        pool.scope(|s| {
            let (tx, rx) = mpsc::channel();
            s.spawn(move |s| self.walk_pooled(s, tx, root, 0));

            // keeps draining after a break so no worker blocks on send
            for elem in rx {
                let _ = self.emit(out, &elem);
            }
        });
    }

    /// 当前目录的子条目由本线程处理，子目录交给线程池
    fn walk_pooled<'s>(
        &'s self,
        scope: &Scope<'s>,
        tx: Sender<Arc<Elem>>,
        dir: PathBuf,
        depth: usize,
    ) {
        self.visit_dir(&dir, depth, &mut |visit| match visit {
            Visit::Emit(elem) => match tx.send(elem) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            },
            Visit::Descend(sub) => {
                let tx = tx.clone();
                scope.spawn(move |s| self.walk_pooled(s, tx, sub, depth + 1));
                ControlFlow::Continue(())
            }
        });
    }

    /// 读取一次目录，按列表顺序处理每个子条目
    ///
    /// 是否递归与是否输出互相独立：不满足规则的目录仍会被递归，
    /// 除非被点目录策略或目录排除规则挡住，或已到达深度上限。
    fn visit_dir(
        &self,
        dir: &Path,
        depth: usize,
        on_visit: &mut dyn FnMut(Visit) -> ControlFlow<()>,
    ) {
        if self.is_stopped() {
            return;
        }

        let listing = match self.fs.read_dir(dir) {
            Ok(listing) => listing,
            Err(err) => {
                self.record(err);
                return;
            }
        };
        debug!("Listed {} entries in {}", listing.items.len(), dir.display());
        for err in listing.errors {
            self.record(err);
        }

        let child_depth = depth + 1;
        let can_descend = self.depth_limit.map_or(true, |max| child_depth < max);

        for item in listing.items {
            if self.is_stopped() {
                return;
            }

            let elem = Arc::new(Elem::new(
                dir.join(&item.name),
                item.name,
                item.is_dir,
                Arc::clone(self.fs),
            ));

            if self.skip_dot(&elem) {
                continue;
            }

            let descend_into = elem.is_dir() && can_descend && !self.rules.prunes(&elem);
            let accepted = self.rules.accepts(&elem);

            // a stat failure inside any matcher excludes the entry
            if let Some(err) = elem.cached_stat_error() {
                self.record(err.duplicate());
            } else if accepted && on_visit(Visit::Emit(Arc::clone(&elem))).is_break() {
                return;
            }

            if descend_into {
                let _ = on_visit(Visit::Descend(elem.path().to_path_buf()));
            }
        }
    }

    fn skip_dot(&self, elem: &Elem) -> bool {
        if !elem.is_dot() {
            return false;
        }
        if elem.is_dir() {
            self.options.exclude_dot_dir
        } else {
            self.options.exclude_dot_file
        }
    }

    /// 在调用线程上执行回调，不持有任何锁
    fn emit<S>(&self, out: &mut Emitter<S>, elem: &Arc<Elem>) -> ControlFlow<()>
    where
        S: FnMut(&Arc<Elem>) -> ControlFlow<()>,
    {
        if self.is_stopped() {
            return ControlFlow::Break(());
        }

        out.num += 1;
        let flow = (out.sink)(elem);
        if flow.is_break() {
            debug!("Callback stopped the walk at {}", elem.path().display());
            self.stopped.store(true, Ordering::SeqCst);
        }
        flow
    }

    /// 记录非致命错误，只保留第一个
    fn record(&self, err: FindError) {
        warn!("{}", err);
        let mut slot = self.lock_errors();
        slot.count += 1;
        if slot.first.is_none() {
            slot.first = Some(err);
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn lock_errors(&self) -> MutexGuard<'_, ErrorSlot> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
