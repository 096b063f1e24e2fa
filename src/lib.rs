//! 用于查找文件和目录的库
//!
//! 本库提供可配置、可组合过滤规则的目录树查找功能，支持：
//! - 按名称、扩展名、路径、目录名、文件名分类的包含/排除规则
//! - 可组合的匹配器（glob、正则、前后缀、修改时间、大小、点文件）
//! - 惰性读取元数据的条目
//! - 结果缓存与流式回调
//! - 可选的固定大小线程池遍历
//!
//! 遍历中的非致命错误（根目录缺失、stat 失败、目录不可读）不会中断查找，
//! 而是记录下来，可通过 [`Finder::err`] 查看。
//!
//! # 示例
//!
//! 基本用法：
//! ```no_run
//! use fsfinder::finder::{Finder, FindOptions, Matcher};
//!
//! // 创建查找选项
//! let options = FindOptions::new()
//!     .scan_dir("src")
//!     .include_ext(".rs")      // 只要 Rust 文件
//!     .exclude_dir("target")   // 不进入 target 目录
//!     .with_max_depth(Some(3)); // 最大搜索深度
//!
//! let mut finder = Finder::new(options).unwrap();
//! finder.exclude(Matcher::suffix("_test.rs"));
//!
//! // 执行查找
//! for path in finder.find_paths() {
//!     println!("找到文件: {}", path.display());
//! }
//!
//! if let Some(err) = finder.err() {
//!     eprintln!("部分条目无法访问: {}", err);
//! }
//! ```
//!
//! 更多用法请参考各模块文档。

pub mod errors;
pub mod finder;

// Re-export main types for convenience
pub use errors::{FindError, FindResult};
pub use finder::{Elem, FindFlags, FindOptions, Finder, Matcher, MultiMatcher};
