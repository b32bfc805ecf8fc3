//! 工厂与读取器配置

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "BEANS";

/// bean 工厂配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeanFactoryOptions {
    /// 是否允许同名 bean 定义覆盖
    pub allow_bean_definition_overriding: bool,
    /// 是否允许别名重新指向其他 bean
    pub allow_alias_overriding: bool,
    /// 激活的 profile
    pub active_profiles: Vec<String>,
    /// 没有激活任何 profile 时使用的默认 profile
    pub default_profiles: Vec<String>,
    /// `<import>` 的最大嵌套深度
    pub max_import_depth: usize,
}

impl Default for BeanFactoryOptions {
    fn default() -> Self {
        Self {
            allow_bean_definition_overriding: true,
            allow_alias_overriding: true,
            active_profiles: Vec::new(),
            default_profiles: vec!["default".to_string()],
            max_import_depth: 32,
        }
    }
}

impl BeanFactoryOptions {
    /// 从可选的 TOML 文件和 `BEANS_` 前缀的环境变量加载配置
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载工厂配置文件: {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("active_profiles")
                .with_list_parse_key("default_profiles")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(|e| {
            error!("工厂配置构建失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        let options: Self = settings.try_deserialize().map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// 直接从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let options: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// 设置激活的 profile
    pub fn with_active_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    /// 设置是否允许覆盖定义
    pub fn with_bean_definition_overriding(mut self, allowed: bool) -> Self {
        self.allow_bean_definition_overriding = allowed;
        self
    }

    /// 设置是否允许覆盖别名
    pub fn with_alias_overriding(mut self, allowed: bool) -> Self {
        self.allow_alias_overriding = allowed;
        self
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_import_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_import_depth 必须大于 0".to_string(),
            });
        }
        if self
            .active_profiles
            .iter()
            .chain(self.default_profiles.iter())
            .any(|p| p.trim().is_empty())
        {
            return Err(ConfigError::ValidationError {
                message: "profile 名称不能为空".to_string(),
            });
        }
        Ok(())
    }

    /// 判断 profile 表达式列表是否被接受
    ///
    /// 任一表达式满足即接受；`!name` 表示该 profile 未激活。
    pub fn accepts_profiles(&self, profiles: &[&str]) -> bool {
        profiles.iter().any(|profile| match profile.strip_prefix('!') {
            Some(negated) => !self.is_profile_active(negated),
            None => self.is_profile_active(profile),
        })
    }

    fn is_profile_active(&self, profile: &str) -> bool {
        let effective = if self.active_profiles.is_empty() {
            &self.default_profiles
        } else {
            &self.active_profiles
        };
        effective.iter().any(|p| p == profile)
    }
}
