//! XML 定义读取

mod document;
mod factory;
mod parser;
mod reader;

#[allow(deprecated)]
pub use factory::XmlBeanFactory;
pub use reader::XmlBeanDefinitionReader;
