//! XML 驱动的便捷 bean 工厂
#![allow(deprecated)]

use super::reader::XmlBeanDefinitionReader;
use crate::support::DefaultListableBeanFactory;
use beans_abstractions::{
    AliasRegistry, BeanDefinitionReader, BeanDefinitionRegistry, BeanFactory,
    HierarchicalBeanFactory, ListableBeanFactory,
};
use beans_common::{BeanDefinition, BeanFactoryOptions, BeansResult, Resource};
use std::sync::Arc;
use tracing::info;

/// 从单个 XML 资源加载定义的 bean 工厂
///
/// 组合了一个 [`DefaultListableBeanFactory`] 和绑定到它的
/// [`XmlBeanDefinitionReader`]。构造时同步加载资源，任何读取或解析失败都直接
/// 返回错误，调用方拿不到部分填充的工厂。
#[deprecated(
    since = "0.1.0",
    note = "直接使用 DefaultListableBeanFactory 搭配 XmlBeanDefinitionReader"
)]
#[derive(Debug)]
pub struct XmlBeanFactory {
    factory: Arc<DefaultListableBeanFactory>,
    reader: XmlBeanDefinitionReader,
}

impl XmlBeanFactory {
    /// 从资源创建工厂
    pub fn new(resource: &dyn Resource) -> BeansResult<Self> {
        Self::with_parent(resource, None)
    }

    /// 从资源创建带父工厂的工厂
    pub fn with_parent(
        resource: &dyn Resource,
        parent: Option<Arc<dyn BeanFactory>>,
    ) -> BeansResult<Self> {
        Self::with_options(resource, parent, BeanFactoryOptions::default())
    }

    /// 使用指定配置创建工厂
    pub fn with_options(
        resource: &dyn Resource,
        parent: Option<Arc<dyn BeanFactory>>,
        options: BeanFactoryOptions,
    ) -> BeansResult<Self> {
        let mut factory = DefaultListableBeanFactory::new().with_options(options.clone());
        if let Some(parent) = parent {
            factory = factory.with_parent(parent);
        }
        let factory = Arc::new(factory);
        let reader = XmlBeanDefinitionReader::new(&factory).with_options(options);

        let count = reader.load_bean_definitions(resource)?;
        info!("XmlBeanFactory 已就绪: {}, 共 {} 个定义", resource.description(), count);

        Ok(Self { factory, reader })
    }

    /// 底层工厂
    pub fn factory(&self) -> &Arc<DefaultListableBeanFactory> {
        &self.factory
    }

    /// 绑定到底层工厂的读取器
    pub fn reader(&self) -> &XmlBeanDefinitionReader {
        &self.reader
    }

    /// 取出底层工厂
    pub fn into_factory(self) -> Arc<DefaultListableBeanFactory> {
        self.factory
    }

    /// 是否包含本地定义
    pub fn contains_bean_definition(&self, name: &str) -> bool {
        self.factory.contains_bean_definition(name)
    }

    /// 本地定义数量
    pub fn bean_definition_count(&self) -> usize {
        self.factory.bean_definition_count()
    }

    /// 本地定义名称
    pub fn bean_definition_names(&self) -> Vec<String> {
        self.factory.bean_definition_names()
    }

    /// 校验 depends-on 声明
    pub fn validate_dependencies(&self) -> BeansResult<()> {
        self.factory.validate_dependencies()
    }
}

impl BeanFactory for XmlBeanFactory {
    fn contains_bean(&self, name: &str) -> bool {
        self.factory.contains_bean(name)
    }

    fn get_merged_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        self.factory.get_merged_bean_definition(name)
    }

    fn get_aliases(&self, name: &str) -> Vec<String> {
        BeanFactory::get_aliases(self.factory.as_ref(), name)
    }
}

impl HierarchicalBeanFactory for XmlBeanFactory {
    fn parent_bean_factory(&self) -> Option<Arc<dyn BeanFactory>> {
        self.factory.parent_bean_factory()
    }

    fn contains_local_bean(&self, name: &str) -> bool {
        self.factory.contains_local_bean(name)
    }
}

impl ListableBeanFactory for XmlBeanFactory {
    fn contains_bean_definition(&self, name: &str) -> bool {
        self.factory.contains_bean_definition(name)
    }

    fn bean_definition_count(&self) -> usize {
        self.factory.bean_definition_count()
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.factory.bean_definition_names()
    }

    fn bean_names_for_type(&self, class_name: &str, include_non_singletons: bool) -> Vec<String> {
        self.factory
            .bean_names_for_type(class_name, include_non_singletons)
    }
}

impl AliasRegistry for XmlBeanFactory {
    fn register_alias(&self, name: &str, alias: &str) -> BeansResult<()> {
        self.factory.register_alias(name, alias)
    }

    fn remove_alias(&self, alias: &str) -> BeansResult<()> {
        self.factory.remove_alias(alias)
    }

    fn is_alias(&self, name: &str) -> bool {
        self.factory.is_alias(name)
    }

    fn registered_aliases(&self, name: &str) -> Vec<String> {
        self.factory.registered_aliases(name)
    }

    fn canonical_name(&self, name: &str) -> String {
        self.factory.canonical_name(name)
    }
}

impl BeanDefinitionRegistry for XmlBeanFactory {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeansResult<()> {
        self.factory.register_bean_definition(name, definition)
    }

    fn remove_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        self.factory.remove_bean_definition(name)
    }

    fn get_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        self.factory.get_bean_definition(name)
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.factory.contains_bean_definition(name)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.factory.bean_definition_names()
    }

    fn bean_definition_count(&self) -> usize {
        self.factory.bean_definition_count()
    }
}
