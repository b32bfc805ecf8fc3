//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// bean 工厂错误类型
///
/// 加载、解析、注册和查找 bean 定义时的所有失败都归入此类型。
#[derive(Error, Debug)]
pub enum BeansError {
    #[error("读取资源失败: {resource}, 原因: {source}")]
    ResourceIo {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML 文档解析失败: {resource} 第 {line} 行: {message}")]
    XmlParse {
        resource: String,
        line: usize,
        message: String,
    },

    #[error("bean 定义存储失败{}{}: {message}", fmt_resource(.resource), fmt_bean(.bean_name))]
    BeanDefinitionStore {
        resource: Option<String>,
        bean_name: Option<String>,
        message: String,
    },

    #[error("bean 定义不存在: {name}")]
    NoSuchBeanDefinition { name: String },

    #[error("bean 定义不允许覆盖: {bean_name}, 原因: {message}")]
    BeanDefinitionOverride { bean_name: String, message: String },

    #[error("别名无效: {alias} -> {name}, 原因: {message}")]
    IllegalAlias {
        alias: String,
        name: String,
        message: String,
    },

    #[error("检测到循环依赖: {chain}")]
    CircularDependency { chain: String },

    #[error("注册表已被释放，无法继续注册 bean 定义")]
    RegistryReleased,
}

fn fmt_resource(resource: &Option<String>) -> String {
    resource
        .as_ref()
        .map(|r| format!(" [{}]", r))
        .unwrap_or_default()
}

fn fmt_bean(bean_name: &Option<String>) -> String {
    bean_name
        .as_ref()
        .map(|n| format!(" (bean '{}')", n))
        .unwrap_or_default()
}

impl BeansError {
    /// 创建存储错误
    pub fn store(message: impl Into<String>) -> Self {
        Self::BeanDefinitionStore {
            resource: None,
            bean_name: None,
            message: message.into(),
        }
    }

    /// 创建带资源描述的存储错误
    pub fn store_in(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BeanDefinitionStore {
            resource: Some(resource.into()),
            bean_name: None,
            message: message.into(),
        }
    }

    /// 创建带 bean 名称的存储错误
    pub fn store_for_bean(
        resource: Option<String>,
        bean_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BeanDefinitionStore {
            resource,
            bean_name: Some(bean_name.into()),
            message: message.into(),
        }
    }

    /// 创建 bean 不存在错误
    pub fn no_such_bean(name: impl Into<String>) -> Self {
        Self::NoSuchBeanDefinition { name: name.into() }
    }

    /// 是否属于加载/解析失败
    ///
    /// 加载期间注册定义或别名时的冲突同样视为加载失败。
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::ResourceIo { .. }
                | Self::XmlParse { .. }
                | Self::BeanDefinitionStore { .. }
                | Self::BeanDefinitionOverride { .. }
                | Self::IllegalAlias { .. }
                | Self::RegistryReleased
        )
    }

    /// 为尚未关联资源的存储错误补充资源描述
    pub fn with_resource(self, description: &str) -> Self {
        match self {
            Self::BeanDefinitionStore {
                resource: None,
                bean_name,
                message,
            } => Self::BeanDefinitionStore {
                resource: Some(description.to_string()),
                bean_name,
                message,
            },
            other => other,
        }
    }

    /// 为尚未关联 bean 名称的存储错误补充名称
    pub fn with_bean_name(self, name: &str) -> Self {
        match self {
            Self::BeanDefinitionStore {
                resource,
                bean_name: None,
                message,
            } => Self::BeanDefinitionStore {
                resource,
                bean_name: Some(name.to_string()),
                message,
            },
            other => other,
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type BeansResult<T> = Result<T, BeansError>;
