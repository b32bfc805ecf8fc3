//! bean 定义注册表抽象接口

use beans_common::{BeanDefinition, BeansResult};
use std::sync::Arc;

/// 别名注册表 trait
pub trait AliasRegistry: Send + Sync {
    /// 为名称注册别名
    fn register_alias(&self, name: &str, alias: &str) -> BeansResult<()>;

    /// 移除别名
    fn remove_alias(&self, alias: &str) -> BeansResult<()>;

    /// 是否为别名
    fn is_alias(&self, name: &str) -> bool;

    /// 获取直接或间接指向名称的所有别名
    fn registered_aliases(&self, name: &str) -> Vec<String>;

    /// 解析别名链得到规范名称
    fn canonical_name(&self, name: &str) -> String;
}

/// bean 定义注册表 trait
///
/// 所有方法都只需要共享引用，读取器可以持有非拥有的回指引用。
pub trait BeanDefinitionRegistry: AliasRegistry {
    /// 注册 bean 定义
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeansResult<()>;

    /// 移除 bean 定义
    fn remove_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>>;

    /// 获取本地注册的原始定义
    fn get_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>>;

    /// 是否包含本地定义
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// 按注册顺序返回所有定义名称
    fn bean_definition_names(&self) -> Vec<String>;

    /// 定义数量
    fn bean_definition_count(&self) -> usize;

    /// 名称是否已被定义或别名占用
    fn is_bean_name_in_use(&self, name: &str) -> bool {
        self.is_alias(name) || self.contains_bean_definition(name)
    }
}
