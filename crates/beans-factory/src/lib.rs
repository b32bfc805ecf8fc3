//! # bean 工厂具体实现
//!
//! 提供具体的 bean 定义注册表、XML 定义读取器以及二者的便捷组合
//! [`XmlBeanFactory`]。
//!
//! ```rust,no_run
//! use beans_abstractions::{BeanDefinitionReader, BeanFactory};
//! use beans_common::FileSystemResource;
//! use beans_factory::{DefaultListableBeanFactory, XmlBeanDefinitionReader};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = Arc::new(DefaultListableBeanFactory::new());
//! let reader = XmlBeanDefinitionReader::new(&factory);
//! reader.load_bean_definitions(&FileSystemResource::new("config/beans.xml"))?;
//!
//! let definition = factory.get_merged_bean_definition("dataSource")?;
//! println!("{:?}", definition.class_name);
//! # Ok(())
//! # }
//! ```

pub mod support;
pub mod xml;

pub use support::DefaultListableBeanFactory;
pub use xml::XmlBeanDefinitionReader;
#[allow(deprecated)]
pub use xml::XmlBeanFactory;
