//! # Bean Abstractions
//!
//! bean 定义注册和查找的抽象层。
//!
//! ## 核心接口
//!
//! - [`BeanDefinitionRegistry`] - bean 定义注册表接口
//! - [`AliasRegistry`] - 别名注册表接口
//! - [`BeanFactory`] - 支持父工厂委托的查找接口
//! - [`BeanDefinitionReader`] - 从资源读取定义并写入注册表
//! - [`CircularDependencyDetector`] - depends-on 循环检测

pub mod factory;
pub mod reader;
pub mod registry;
pub mod resolver;

pub use factory::*;
pub use reader::*;
pub use registry::*;
pub use resolver::*;
