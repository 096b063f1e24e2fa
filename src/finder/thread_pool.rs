//! 遍历用的固定大小线程池
//!
//! 并发度大于 1 时，子目录的递归作为独立任务交给线程池执行。

use log::{debug, info};
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use crate::errors::{FindError, FindResult};

/// 线程池配置选项
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// 线程数
    pub threads: usize,
    /// 线程名前缀
    pub thread_name: String,
}

impl ThreadPoolConfig {
    /// 指定线程数的配置，至少一个线程
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            ..Self::default()
        }
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            thread_name: "fsfinder-worker".to_string(),
        }
    }
}

/// 固定大小的工作线程池
#[derive(Debug)]
pub struct WorkerPool {
    config: ThreadPoolConfig,
    pool: ThreadPool,
}

impl WorkerPool {
    /// 创建新的线程池
    pub fn new(config: ThreadPoolConfig) -> FindResult<Self> {
        let prefix = config.thread_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()
            .map_err(|e| FindError::ThreadPool(e.to_string()))?;

        info!(
            "Created worker pool with {} threads (CPUs: {})",
            config.threads,
            num_cpus::get()
        );

        Ok(Self { config, pool })
    }

    /// 在调用线程上运行一个作用域，派生的任务由线程池执行
    ///
    /// 作用域内派生的任务全部完成后才返回。
    pub fn scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&Scope<'scope>) -> R,
    {
        debug!("Dispatching scope onto {} workers", self.config.threads);
        self.pool.in_place_scope(op)
    }

    /// 获取线程数
    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn config(&self) -> &ThreadPoolConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_thread_pool_config_default() {
        let config = ThreadPoolConfig::default();
        assert_eq!(config.threads, num_cpus::get());
        assert_eq!(config.thread_name, "fsfinder-worker");
    }

    #[test]
    fn test_with_threads_at_least_one() {
        assert_eq!(ThreadPoolConfig::with_threads(0).threads, 1);
        assert_eq!(ThreadPoolConfig::with_threads(4).threads, 4);
    }

    #[test]
    fn test_worker_pool_size() {
        let pool = WorkerPool::new(ThreadPoolConfig::with_threads(3)).unwrap();
        assert_eq!(pool.thread_count(), 3);
        assert_eq!(pool.config().threads, 3);
    }

    #[test]
    fn test_scope_waits_for_spawned_tasks() {
        let pool = WorkerPool::new(ThreadPoolConfig::with_threads(2)).unwrap();
        let done = AtomicUsize::new(0);

        pool.scope(|s| {
            for _ in 0..16 {
                s.spawn(|_| {
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(done.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_scope_body_runs_on_calling_thread() {
        let pool = WorkerPool::new(ThreadPoolConfig::with_threads(2)).unwrap();
        let caller = std::thread::current().id();

        let body_thread = pool.scope(|_| std::thread::current().id());

        assert_eq!(body_thread, caller);
    }
}
