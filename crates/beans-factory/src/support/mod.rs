//! 注册表与工厂的通用实现

mod default_factory;

pub use default_factory::DefaultListableBeanFactory;
