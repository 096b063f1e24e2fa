//! 查找到的文件系统条目
//!
//! `Elem` 保存路径、名称与目录标记，元数据在第一次调用 `info()` 时才读取，
//! 之后无论成功还是失败都直接返回缓存的结果。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::fs::{FileSystem, OsFileSystem, Stat};
use crate::errors::FindError;

/// 一个被发现的文件或目录
pub struct Elem {
    path: PathBuf,
    name: String,
    is_dir: bool,
    fs: Arc<dyn FileSystem>,
    stat: OnceLock<Result<Stat, FindError>>,
}

impl Elem {
    /// 创建新的条目，不会访问文件系统
    pub fn new(path: PathBuf, name: String, is_dir: bool, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path,
            name,
            is_dir,
            fs,
            stat: OnceLock::new(),
        }
    }

    /// 根据路径创建使用操作系统文件系统的条目
    ///
    /// 名称取路径的最后一段。
    pub fn from_path(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(path, name, is_dir, Arc::new(OsFileSystem))
    }

    /// 完整路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 基本名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 是否为目录（来自目录项类型）
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// 名称是否以 `.` 开头
    pub fn is_dot(&self) -> bool {
        self.name.starts_with('.')
    }

    /// 读取元数据
    ///
    /// 底层 stat 最多执行一次，后续调用返回缓存的值或错误。
    pub fn info(&self) -> Result<&Stat, &FindError> {
        self.stat
            .get_or_init(|| {
                self.fs
                    .stat(&self.path)
                    .map_err(|e| FindError::stat(self.path.clone(), e))
            })
            .as_ref()
    }

    /// 已缓存的 stat 错误，不会触发 stat
    pub(crate) fn cached_stat_error(&self) -> Option<&FindError> {
        match self.stat.get() {
            Some(Err(err)) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }
}

impl fmt::Debug for Elem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elem")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("is_dir", &self.is_dir)
            .field("stat_loaded", &self.stat.get().is_some())
            .finish()
    }
}
