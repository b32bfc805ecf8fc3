//! bean 作用域

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单例作用域关键字
pub const SCOPE_SINGLETON: &str = "singleton";

/// 原型作用域关键字
pub const SCOPE_PROTOTYPE: &str = "prototype";

/// bean 作用域类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeanScope {
    /// 单例模式 - 工厂内共享同一个实例
    Singleton,
    /// 原型模式 - 每次请求都创建新实例
    Prototype,
    /// 自定义作用域，由外部容器解释
    Custom(String),
}

impl BeanScope {
    /// 从 XML 属性值解析作用域，空字符串表示未设置
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" => None,
            SCOPE_SINGLETON => Some(Self::Singleton),
            SCOPE_PROTOTYPE => Some(Self::Prototype),
            other => Some(Self::Custom(other.to_string())),
        }
    }

    /// 作用域名称
    pub fn as_str(&self) -> &str {
        match self {
            Self::Singleton => SCOPE_SINGLETON,
            Self::Prototype => SCOPE_PROTOTYPE,
            Self::Custom(name) => name,
        }
    }
}

impl Default for BeanScope {
    fn default() -> Self {
        Self::Singleton
    }
}

impl fmt::Display for BeanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
