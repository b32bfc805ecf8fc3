//! 默认的可枚举 bean 工厂

use beans_abstractions::{
    AliasRegistry, BeanDefinitionRegistry, BeanFactory, CircularDependencyDetector,
    DefaultCircularDependencyDetector, DependencyGraphNode, HierarchicalBeanFactory,
    ListableBeanFactory,
};
use beans_common::{BeanDefinition, BeanFactoryOptions, BeansError, BeansResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 注册表状态
#[derive(Debug, Default)]
struct RegistryState {
    /// 名称 -> 定义
    definitions: HashMap<String, Arc<BeanDefinition>>,
    /// 注册顺序
    names: Vec<String>,
    /// 别名 -> 名称
    aliases: HashMap<String, String>,
}

impl RegistryState {
    fn canonical_name(&self, name: &str) -> String {
        let mut canonical = name;
        // 别名表无环，长度即为链长上限
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(canonical) {
                Some(target) => canonical = target,
                None => break,
            }
        }
        canonical.to_string()
    }

    /// `name` 沿别名链是否能到达 `target`
    fn resolves_to(&self, name: &str, target: &str) -> bool {
        let mut current = name;
        for _ in 0..=self.aliases.len() {
            if current == target {
                return true;
            }
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    fn collect_aliases(&self, name: &str, result: &mut Vec<String>) {
        for (alias, target) in &self.aliases {
            if target == name && !result.contains(alias) {
                result.push(alias.clone());
                self.collect_aliases(alias, result);
            }
        }
    }
}

/// 合并定义缓存
///
/// 每次失效都会递增代数；合并开始后代数发生变化的结果不会写入缓存。
#[derive(Debug, Default)]
struct MergedCache {
    generation: u64,
    entries: HashMap<String, Arc<BeanDefinition>>,
}

/// 默认的 bean 工厂实现
///
/// 同时充当 bean 定义注册表、别名注册表和支持父工厂委托的查找工厂。
/// 内部状态由读写锁保护，所有注册操作只需要共享引用。
pub struct DefaultListableBeanFactory {
    parent: Option<Arc<dyn BeanFactory>>,
    options: BeanFactoryOptions,
    state: RwLock<RegistryState>,
    /// 合并后定义的缓存，任何注册变更都会清空
    merged: RwLock<MergedCache>,
    detector: DefaultCircularDependencyDetector,
}

impl DefaultListableBeanFactory {
    /// 创建新的工厂
    pub fn new() -> Self {
        Self {
            parent: None,
            options: BeanFactoryOptions::default(),
            state: RwLock::new(RegistryState::default()),
            merged: RwLock::new(MergedCache::default()),
            detector: DefaultCircularDependencyDetector,
        }
    }

    /// 设置父工厂
    pub fn with_parent(mut self, parent: Arc<dyn BeanFactory>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// 设置配置
    pub fn with_options(mut self, options: BeanFactoryOptions) -> Self {
        self.options = options;
        self
    }

    /// 当前配置
    pub fn options(&self) -> &BeanFactoryOptions {
        &self.options
    }

    /// 是否包含本地定义
    pub fn contains_bean_definition(&self, name: &str) -> bool {
        self.state.read().definitions.contains_key(name)
    }

    /// 本地定义数量
    pub fn bean_definition_count(&self) -> usize {
        self.state.read().definitions.len()
    }

    /// 按注册顺序返回本地定义名称
    pub fn bean_definition_names(&self) -> Vec<String> {
        self.state.read().names.clone()
    }

    /// 清空所有定义和别名
    pub fn clear(&self) {
        let mut state = self.state.write();
        let count = state.definitions.len();
        *state = RegistryState::default();
        drop(state);
        self.invalidate_merged();
        info!("清空 bean 工厂，移除了 {} 个定义", count);
    }

    /// 校验 depends-on 声明
    ///
    /// 每个依赖必须能在工厂层级中找到，且本地依赖之间不能成环。
    /// 找不到的 `ref` 引用只记录警告。
    pub fn validate_dependencies(&self) -> BeansResult<()> {
        let mut graph = Vec::new();

        for name in self.bean_definition_names() {
            let definition = self.get_bean_definition(&name)?;

            for dependency in &definition.depends_on {
                if !self.contains_bean(dependency) {
                    return Err(BeansError::no_such_bean(dependency.clone()));
                }
            }

            for reference in definition.referenced_bean_names() {
                if !self.contains_bean(&reference) {
                    warn!("bean '{}' 引用了未定义的 bean '{}'", name, reference);
                }
            }

            let dependencies = definition
                .depends_on
                .iter()
                .map(|d| self.canonical_name(d))
                .collect();
            graph.push(DependencyGraphNode::new(name, dependencies));
        }

        self.detector.detect_circular_dependencies(&graph)?;
        debug!("依赖校验通过，共 {} 个定义", graph.len());
        Ok(())
    }

    fn merged_local(
        &self,
        name: &str,
        visiting: &mut Vec<String>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        let generation = {
            let cache = self.merged.read();
            if let Some(cached) = cache.entries.get(name) {
                return Ok(Arc::clone(cached));
            }
            cache.generation
        };

        if visiting.iter().any(|v| v == name) {
            let mut chain = visiting.clone();
            chain.push(name.to_string());
            return Err(BeansError::store_for_bean(
                None,
                name,
                format!("父定义链存在循环: {}", chain.join(" -> ")),
            ));
        }
        visiting.push(name.to_string());

        let raw = self.get_bean_definition(name)?;
        let merged = match raw.parent_name.as_deref() {
            None => raw,
            Some(parent_name) => {
                let parent_canonical = self.canonical_name(parent_name);
                let parent_definition = if parent_canonical != name
                    && self.contains_bean_definition(&parent_canonical)
                {
                    self.merged_local(&parent_canonical, visiting)?
                } else {
                    // 与自身同名或本地不存在的父定义到父工厂中查找
                    self.merged_from_parent(parent_name, name)?
                };
                Arc::new(parent_definition.merged_with_child(&raw))
            }
        };

        visiting.pop();
        self.cache_merged(name, &merged, generation);
        Ok(merged)
    }

    /// 仅当缓存在合并期间未失效时写入
    fn cache_merged(&self, name: &str, merged: &Arc<BeanDefinition>, generation: u64) {
        let mut cache = self.merged.write();
        if cache.generation == generation {
            cache.entries.insert(name.to_string(), Arc::clone(merged));
        } else {
            debug!("合并期间定义发生变化，不缓存 '{}'", name);
        }
    }

    fn merged_from_parent(
        &self,
        parent_name: &str,
        child_name: &str,
    ) -> BeansResult<Arc<BeanDefinition>> {
        let parent = self.parent.as_ref().ok_or_else(|| {
            BeansError::store_for_bean(
                None,
                child_name,
                format!("无法解析父定义 '{}': 没有父工厂", parent_name),
            )
        })?;

        parent
            .get_merged_bean_definition(parent_name)
            .map_err(|e| match e {
                BeansError::NoSuchBeanDefinition { name } => BeansError::store_for_bean(
                    None,
                    child_name,
                    format!("无法解析父定义 '{}'", name),
                ),
                other => other,
            })
    }

    fn invalidate_merged(&self) {
        let mut cache = self.merged.write();
        cache.entries.clear();
        cache.generation = cache.generation.wrapping_add(1);
    }
}

impl Default for DefaultListableBeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultListableBeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("DefaultListableBeanFactory")
            .field("definitions", &state.names)
            .field("aliases", &state.aliases)
            .field("has_parent", &self.parent.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl AliasRegistry for DefaultListableBeanFactory {
    fn register_alias(&self, name: &str, alias: &str) -> BeansResult<()> {
        if name.trim().is_empty() || alias.trim().is_empty() {
            return Err(BeansError::IllegalAlias {
                alias: alias.to_string(),
                name: name.to_string(),
                message: "名称和别名都不能为空".to_string(),
            });
        }

        let mut state = self.state.write();

        if alias == name {
            state.aliases.remove(alias);
            debug!("别名 '{}' 与名称相同，已移除", alias);
            drop(state);
            self.invalidate_merged();
            return Ok(());
        }

        if let Some(registered) = state.aliases.get(alias) {
            if registered == name {
                return Ok(());
            }
            if !self.options.allow_alias_overriding {
                return Err(BeansError::IllegalAlias {
                    alias: alias.to_string(),
                    name: name.to_string(),
                    message: format!("别名已指向 '{}'", registered),
                });
            }
            info!("别名 '{}' 从 '{}' 改为指向 '{}'", alias, registered, name);
        }

        if state.definitions.contains_key(alias) && !self.options.allow_bean_definition_overriding {
            return Err(BeansError::IllegalAlias {
                alias: alias.to_string(),
                name: name.to_string(),
                message: "已存在同名的 bean 定义".to_string(),
            });
        }

        if state.resolves_to(name, alias) {
            return Err(BeansError::IllegalAlias {
                alias: alias.to_string(),
                name: name.to_string(),
                message: "别名形成循环".to_string(),
            });
        }

        state.aliases.insert(alias.to_string(), name.to_string());
        drop(state);
        self.invalidate_merged();
        debug!("注册别名: {} -> {}", alias, name);
        Ok(())
    }

    fn remove_alias(&self, alias: &str) -> BeansResult<()> {
        let removed = self.state.write().aliases.remove(alias);
        match removed {
            Some(_) => {
                self.invalidate_merged();
                Ok(())
            }
            None => Err(BeansError::IllegalAlias {
                alias: alias.to_string(),
                name: String::new(),
                message: "别名未注册".to_string(),
            }),
        }
    }

    fn is_alias(&self, name: &str) -> bool {
        self.state.read().aliases.contains_key(name)
    }

    fn registered_aliases(&self, name: &str) -> Vec<String> {
        let mut result = Vec::new();
        self.state.read().collect_aliases(name, &mut result);
        result.sort();
        result
    }

    fn canonical_name(&self, name: &str) -> String {
        self.state.read().canonical_name(name)
    }
}

impl BeanDefinitionRegistry for DefaultListableBeanFactory {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeansResult<()> {
        if name.trim().is_empty() {
            return Err(BeansError::store_for_bean(
                definition.resource_description.clone(),
                name,
                "bean 名称不能为空",
            ));
        }

        definition.validate().map_err(|e| {
            let e = e.with_bean_name(name);
            match &definition.resource_description {
                Some(resource) => e.with_resource(resource),
                None => e,
            }
        })?;

        let mut state = self.state.write();

        if state.definitions.contains_key(name) {
            if !self.options.allow_bean_definition_overriding {
                return Err(BeansError::BeanDefinitionOverride {
                    bean_name: name.to_string(),
                    message: "已存在同名定义且不允许覆盖".to_string(),
                });
            }
            info!("覆盖 bean 定义 '{}'", name);
        } else {
            if state.aliases.contains_key(name) {
                if !self.options.allow_bean_definition_overriding {
                    return Err(BeansError::BeanDefinitionOverride {
                        bean_name: name.to_string(),
                        message: "名称已被用作别名且不允许覆盖".to_string(),
                    });
                }
                state.aliases.remove(name);
                debug!("移除与新定义同名的别名 '{}'", name);
            }
            state.names.push(name.to_string());
        }

        state
            .definitions
            .insert(name.to_string(), Arc::new(definition));
        drop(state);
        self.invalidate_merged();

        debug!("注册 bean 定义: {}", name);
        Ok(())
    }

    fn remove_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        let mut state = self.state.write();
        let removed = state
            .definitions
            .remove(name)
            .ok_or_else(|| BeansError::no_such_bean(name))?;
        state.names.retain(|n| n != name);
        drop(state);
        self.invalidate_merged();

        debug!("移除 bean 定义: {}", name);
        Ok(removed)
    }

    fn get_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        self.state
            .read()
            .definitions
            .get(name)
            .cloned()
            .ok_or_else(|| BeansError::no_such_bean(name))
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        Self::contains_bean_definition(self, name)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        Self::bean_definition_names(self)
    }

    fn bean_definition_count(&self) -> usize {
        Self::bean_definition_count(self)
    }
}

impl BeanFactory for DefaultListableBeanFactory {
    fn contains_bean(&self, name: &str) -> bool {
        if self.contains_local_bean(name) {
            return true;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.contains_bean(name))
    }

    fn get_merged_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        let canonical = self.canonical_name(name);
        if self.contains_bean_definition(&canonical) {
            return self.merged_local(&canonical, &mut Vec::new());
        }

        match &self.parent {
            Some(parent) => parent.get_merged_bean_definition(name),
            None => Err(BeansError::no_such_bean(name)),
        }
    }

    fn get_aliases(&self, name: &str) -> Vec<String> {
        let canonical = self.canonical_name(name);

        if !self.contains_bean_definition(&canonical) {
            if let Some(parent) = &self.parent {
                return parent.get_aliases(name);
            }
        }

        let mut result = Vec::new();
        if canonical != name {
            result.push(canonical.clone());
        }
        result.extend(
            self.registered_aliases(&canonical)
                .into_iter()
                .filter(|alias| alias != name),
        );
        result
    }
}

impl HierarchicalBeanFactory for DefaultListableBeanFactory {
    fn parent_bean_factory(&self) -> Option<Arc<dyn BeanFactory>> {
        self.parent.clone()
    }

    fn contains_local_bean(&self, name: &str) -> bool {
        self.contains_bean_definition(&self.canonical_name(name))
    }
}

impl ListableBeanFactory for DefaultListableBeanFactory {
    fn contains_bean_definition(&self, name: &str) -> bool {
        Self::contains_bean_definition(self, name)
    }

    fn bean_definition_count(&self) -> usize {
        Self::bean_definition_count(self)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        Self::bean_definition_names(self)
    }

    fn bean_names_for_type(&self, class_name: &str, include_non_singletons: bool) -> Vec<String> {
        self.bean_definition_names()
            .into_iter()
            .filter(|name| match self.get_merged_bean_definition(name) {
                Ok(definition) => {
                    !definition.is_abstract
                        && definition.class_name.as_deref() == Some(class_name)
                        && (include_non_singletons || definition.is_singleton())
                }
                Err(e) => {
                    debug!("跳过无法合并的定义 '{}': {}", name, e);
                    false
                }
            })
            .collect()
    }
}
