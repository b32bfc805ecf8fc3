//! bean 工厂抽象接口
//!
//! 工厂只负责查找定义，不负责实例化。

use beans_common::{BeanDefinition, BeansResult};
use std::sync::Arc;

/// bean 工厂 trait
///
/// 查找时先查本地注册表，本地不存在时委托给父工厂。
pub trait BeanFactory: Send + Sync {
    /// 名称（或别名）是否在本工厂或父工厂中定义
    fn contains_bean(&self, name: &str) -> bool;

    /// 获取合并父定义后的完整定义
    fn get_merged_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>>;

    /// 是否为单例
    fn is_singleton(&self, name: &str) -> BeansResult<bool> {
        Ok(self.get_merged_bean_definition(name)?.is_singleton())
    }

    /// 是否为原型
    fn is_prototype(&self, name: &str) -> BeansResult<bool> {
        Ok(self.get_merged_bean_definition(name)?.is_prototype())
    }

    /// 获取目标类型名称
    fn get_type(&self, name: &str) -> BeansResult<Option<String>> {
        Ok(self.get_merged_bean_definition(name)?.class_name.clone())
    }

    /// 获取别名
    fn get_aliases(&self, name: &str) -> Vec<String>;
}

/// 分层 bean 工厂 trait
pub trait HierarchicalBeanFactory: BeanFactory {
    /// 父工厂
    fn parent_bean_factory(&self) -> Option<Arc<dyn BeanFactory>>;

    /// 是否在本地定义（忽略父工厂）
    fn contains_local_bean(&self, name: &str) -> bool;
}

/// 可枚举 bean 工厂 trait
///
/// 枚举只覆盖本地定义，不包含父工厂。
pub trait ListableBeanFactory: BeanFactory {
    /// 是否包含本地定义
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// 本地定义数量
    fn bean_definition_count(&self) -> usize;

    /// 本地定义名称
    fn bean_definition_names(&self) -> Vec<String>;

    /// 按类型名称查找 bean 名称，抽象定义不计入
    fn bean_names_for_type(&self, class_name: &str, include_non_singletons: bool) -> Vec<String>;
}
