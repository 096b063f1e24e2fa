use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for operations that can produce FindError
pub type FindResult<T> = Result<T, FindError>;

/// fsfinder 的错误类型
///
/// 遍历期间的错误（根目录缺失、stat 失败、目录读取失败、打开失败）
/// 不会中断查找，而是记录到查找器的错误槽中，可通过 `Finder::err()` 查看。
/// 只有 `CallbackAbort` 会同步返回给调用者。
#[derive(Debug, Error)]
pub enum FindError {
    /// 扫描根目录不存在
    #[error("扫描目录不存在: {}", .0.display())]
    RootNotFound(PathBuf),

    /// 扫描根路径不是目录
    #[error("不是目录: {}", .0.display())]
    NotADirectory(PathBuf),

    /// 无法读取条目的元数据
    #[error("无法读取元数据 {}: {source}", .path.display())]
    StatFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 目录不可读
    #[error("目录读取失败 {}: {source}", .path.display())]
    ReadDirFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 无法打开匹配到的文件
    #[error("无法打开文件 {}: {source}", .path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 无法读取匹配到的文件内容
    #[error("无法读取文件 {}: {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 回调要求提前结束遍历
    #[error("遍历被回调中止")]
    CallbackAbort,

    /// 模式匹配错误
    #[error("模式匹配错误: {message}")]
    PatternError { message: String },

    /// 无效的大小表达式
    #[error("无效的大小: {0}")]
    InvalidSize(String),

    /// 线程池创建失败
    #[error("线程池错误: {0}")]
    ThreadPool(String),
}

impl FindError {
    /// 创建 stat 失败错误
    pub fn stat(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FindError::StatFailure {
            path: path.into(),
            source,
        }
    }

    /// 创建目录读取失败错误
    pub fn read_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FindError::ReadDirFailure {
            path: path.into(),
            source,
        }
    }

    /// 出错的路径（如果有）
    pub fn path(&self) -> Option<&Path> {
        match self {
            FindError::RootNotFound(p) | FindError::NotADirectory(p) => Some(p),
            FindError::StatFailure { path, .. }
            | FindError::ReadDirFailure { path, .. }
            | FindError::OpenFailure { path, .. }
            | FindError::ReadFailure { path, .. } => Some(path),
            _ => None,
        }
    }

    /// 遍历能否在此错误之后继续
    ///
    /// 可恢复的错误被记录到错误槽，其余的直接返回给调用者。
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FindError::RootNotFound(_)
                | FindError::NotADirectory(_)
                | FindError::StatFailure { .. }
                | FindError::ReadDirFailure { .. }
                | FindError::OpenFailure { .. }
                | FindError::ReadFailure { .. }
        )
    }

    /// 复制一个错误，io::Error 本身不可克隆，只保留 kind 和消息
    pub(crate) fn duplicate(&self) -> Self {
        fn copy_io(err: &io::Error) -> io::Error {
            io::Error::new(err.kind(), err.to_string())
        }

        match self {
            FindError::RootNotFound(p) => FindError::RootNotFound(p.clone()),
            FindError::NotADirectory(p) => FindError::NotADirectory(p.clone()),
            FindError::StatFailure { path, source } => FindError::stat(path.clone(), copy_io(source)),
            FindError::ReadDirFailure { path, source } => {
                FindError::read_dir(path.clone(), copy_io(source))
            }
            FindError::OpenFailure { path, source } => FindError::OpenFailure {
                path: path.clone(),
                source: copy_io(source),
            },
            FindError::ReadFailure { path, source } => FindError::ReadFailure {
                path: path.clone(),
                source: copy_io(source),
            },
            FindError::CallbackAbort => FindError::CallbackAbort,
            FindError::PatternError { message } => FindError::PatternError {
                message: message.clone(),
            },
            FindError::InvalidSize(s) => FindError::InvalidSize(s.clone()),
            FindError::ThreadPool(s) => FindError::ThreadPool(s.clone()),
        }
    }
}

impl From<walkdir::Error> for FindError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        let source = match err.io_error() {
            Some(io_err) => io::Error::new(io_err.kind(), io_err.to_string()),
            None => io::Error::new(io::ErrorKind::Other, err.to_string()),
        };
        FindError::read_dir(path, source)
    }
}

impl From<glob::PatternError> for FindError {
    fn from(err: glob::PatternError) -> Self {
        FindError::PatternError {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for FindError {
    fn from(err: regex::Error) -> Self {
        FindError::PatternError {
            message: err.to_string(),
        }
    }
}
