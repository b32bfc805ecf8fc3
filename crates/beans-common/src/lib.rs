//! # Beans Common
//!
//! 这个 crate 提供了 bean 定义工厂的公共模型、资源抽象和错误类型。
//!
//! ## 核心组件
//!
//! - [`BeanDefinition`] - bean 定义（类名、作用域、属性、构造参数等）
//! - [`Resource`] - 可加载的输入资源
//! - [`BeanFactoryOptions`] - 工厂与读取器的配置项
//! - [`BeansError`] - 加载、解析和注册失败的统一错误类型
//!
//! ## 设计原则
//!
//! - 定义只描述如何构造对象，不负责实例化
//! - 所有失败都以 [`BeansError`] 同步返回给调用方

pub mod configuration;
pub mod definition;
pub mod errors;
pub mod resource;
pub mod scope;

pub use configuration::*;
pub use definition::*;
pub use errors::*;
pub use resource::*;
pub use scope::*;
