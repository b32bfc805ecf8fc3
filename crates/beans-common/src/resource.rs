//! 资源抽象
//!
//! bean 定义读取器只通过 [`Resource`] 访问输入，不关心其来源。

use crate::errors::{BeansError, BeansResult};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// 可加载的输入资源
pub trait Resource: fmt::Debug + Send + Sync {
    /// 资源描述，用于日志和错误信息
    fn description(&self) -> String;

    /// 资源是否存在
    fn exists(&self) -> bool;

    /// 读取完整内容
    fn read_to_string(&self) -> BeansResult<String>;

    /// 创建相对于当前资源的资源
    fn create_relative(&self, relative_path: &str) -> BeansResult<Box<dyn Resource>> {
        Err(BeansError::store_in(
            self.description(),
            format!("不支持相对资源: {}", relative_path),
        ))
    }
}

/// 文件系统资源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemResource {
    path: PathBuf,
}

impl FileSystemResource {
    /// 创建新的文件资源，路径按词法规范化
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: normalize(path.as_ref()),
        }
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileSystemResource {
    fn description(&self) -> String {
        format!("file [{}]", self.path.display())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_to_string(&self) -> BeansResult<String> {
        std::fs::read_to_string(&self.path).map_err(|source| BeansError::ResourceIo {
            resource: self.description(),
            source,
        })
    }

    fn create_relative(&self, relative_path: &str) -> BeansResult<Box<dyn Resource>> {
        let relative = Path::new(relative_path.trim_start_matches("file:"));
        let resolved = if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            match self.path.parent() {
                Some(dir) => dir.join(relative),
                None => relative.to_path_buf(),
            }
        };
        Ok(Box::new(Self::new(resolved)))
    }
}

/// 去掉 `.`，并让 `..` 抵消前一个普通路径段，不访问文件系统
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// 内存字节资源
#[derive(Clone, PartialEq, Eq)]
pub struct ByteArrayResource {
    bytes: Vec<u8>,
    description: String,
}

impl ByteArrayResource {
    /// 创建新的字节资源
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_description(bytes, "resource loaded from byte array")
    }

    /// 创建带描述的字节资源
    pub fn with_description(bytes: impl Into<Vec<u8>>, description: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            description: description.into(),
        }
    }
}

impl fmt::Debug for ByteArrayResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteArrayResource")
            .field("description", &self.description)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Resource for ByteArrayResource {
    fn description(&self) -> String {
        format!("Byte array resource [{}]", self.description)
    }

    fn exists(&self) -> bool {
        true
    }

    fn read_to_string(&self) -> BeansResult<String> {
        String::from_utf8(self.bytes.clone()).map_err(|e| BeansError::ResourceIo {
            resource: self.description(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}
