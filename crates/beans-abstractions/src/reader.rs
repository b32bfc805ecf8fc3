//! bean 定义读取器抽象接口

use beans_common::{BeansResult, Resource};
use tracing::debug;

/// bean 定义读取器 trait
pub trait BeanDefinitionReader {
    /// 从资源加载定义，返回本次注册的定义数量
    fn load_bean_definitions(&self, resource: &dyn Resource) -> BeansResult<usize>;

    /// 依次加载多个资源，遇到第一个错误即停止
    fn load_all(&self, resources: &[&dyn Resource]) -> BeansResult<usize> {
        let mut count = 0;
        for resource in resources {
            count += self.load_bean_definitions(*resource)?;
        }
        debug!("从 {} 个资源加载了 {} 个 bean 定义", resources.len(), count);
        Ok(count)
    }
}
