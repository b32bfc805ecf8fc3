//! bean 定义模型
//!
//! 描述如何构造和装配一个对象的配置记录。定义本身不会被实例化。

use crate::errors::{BeansError, BeansResult};
use crate::scope::BeanScope;
use serde::Serialize;
use std::collections::BTreeMap;

/// 带可选目标类型的字面值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedStringValue {
    /// 原始字符串
    pub value: String,
    /// 目标类型名称
    pub type_name: Option<String>,
}

/// 对其他 bean 的引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeanReference {
    /// 被引用的 bean 名称
    pub bean_name: String,
    /// 是否只在父工厂中查找
    pub to_parent: bool,
}

/// map 条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: BeanValue,
    pub value: BeanValue,
}

/// 属性或构造参数的值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BeanValue {
    Literal(TypedStringValue),
    Reference(BeanReference),
    /// 仅校验存在性的 bean 名称
    IdRef(String),
    Null,
    List(Vec<BeanValue>),
    Set(Vec<BeanValue>),
    Array(Vec<BeanValue>),
    Map(Vec<MapEntry>),
    Props(Vec<(String, String)>),
    InnerBean(Box<BeanDefinitionHolder>),
}

impl BeanValue {
    /// 创建字面值
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(TypedStringValue {
            value: value.into(),
            type_name: None,
        })
    }

    /// 创建 bean 引用
    pub fn reference(bean_name: impl Into<String>) -> Self {
        Self::Reference(BeanReference {
            bean_name: bean_name.into(),
            to_parent: false,
        })
    }

    /// 收集值中直接或嵌套引用的 bean 名称
    pub fn referenced_bean_names(&self, names: &mut Vec<String>) {
        match self {
            Self::Reference(reference) => names.push(reference.bean_name.clone()),
            Self::List(items) | Self::Set(items) | Self::Array(items) => {
                for item in items {
                    item.referenced_bean_names(names);
                }
            }
            Self::Map(entries) => {
                for entry in entries {
                    entry.key.referenced_bean_names(names);
                    entry.value.referenced_bean_names(names);
                }
            }
            Self::InnerBean(holder) => holder.definition.referenced_bean_names_into(names),
            Self::Literal(_) | Self::IdRef(_) | Self::Null | Self::Props(_) => {}
        }
    }
}

/// 构造参数值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueHolder {
    pub value: BeanValue,
    pub type_name: Option<String>,
    pub name: Option<String>,
}

impl ValueHolder {
    /// 创建新的参数值
    pub fn new(value: BeanValue) -> Self {
        Self {
            value,
            type_name: None,
            name: None,
        }
    }
}

/// 构造参数集合
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstructorArgumentValues {
    /// 按下标指定的参数
    pub indexed: BTreeMap<usize, ValueHolder>,
    /// 未指定下标的参数
    pub generic: Vec<ValueHolder>,
}

impl ConstructorArgumentValues {
    /// 是否已存在指定下标的参数
    pub fn has_indexed(&self, index: usize) -> bool {
        self.indexed.contains_key(&index)
    }

    /// 添加按下标指定的参数，覆盖同一下标
    pub fn add_indexed(&mut self, index: usize, holder: ValueHolder) {
        self.indexed.insert(index, holder);
    }

    /// 添加未指定下标的参数
    pub fn add_generic(&mut self, holder: ValueHolder) {
        if !self.generic.contains(&holder) {
            self.generic.push(holder);
        }
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.indexed.len() + self.generic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.generic.is_empty()
    }

    /// 合并另一组参数，同一下标以 `other` 为准
    pub fn merge_from(&mut self, other: &Self) {
        for (index, holder) in &other.indexed {
            self.add_indexed(*index, holder.clone());
        }
        for holder in &other.generic {
            self.add_generic(holder.clone());
        }
    }

    fn values(&self) -> impl Iterator<Item = &ValueHolder> {
        self.indexed.values().chain(self.generic.iter())
    }
}

/// 属性值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValue {
    pub name: String,
    pub value: BeanValue,
}

/// bean 定义
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeanDefinition {
    /// 目标类型名称
    pub class_name: Option<String>,
    /// 父定义名称
    pub parent_name: Option<String>,
    /// 作用域，未设置时视为单例
    pub scope: Option<BeanScope>,
    /// 是否为抽象模板
    pub is_abstract: bool,
    /// 是否延迟初始化，未设置时视为否
    pub lazy_init: Option<bool>,
    /// 需要先初始化的 bean
    pub depends_on: Vec<String>,
    pub primary: bool,
    pub autowire_candidate: bool,
    pub init_method_name: Option<String>,
    pub destroy_method_name: Option<String>,
    pub factory_bean_name: Option<String>,
    pub factory_method_name: Option<String>,
    pub constructor_arguments: ConstructorArgumentValues,
    pub property_values: Vec<PropertyValue>,
    pub description: Option<String>,
    /// 定义来源
    pub resource_description: Option<String>,
}

impl BeanDefinition {
    /// 创建指定类型的定义
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            autowire_candidate: true,
            ..Self::default()
        }
    }

    /// 创建继承父定义的子定义
    pub fn child_of(parent_name: impl Into<String>) -> Self {
        Self {
            parent_name: Some(parent_name.into()),
            autowire_candidate: true,
            ..Self::default()
        }
    }

    /// 创建空定义（类型由父定义或工厂方法决定）
    pub fn empty() -> Self {
        Self {
            autowire_candidate: true,
            ..Self::default()
        }
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: BeanScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 设置为抽象模板
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// 设置延迟初始化
    pub fn with_lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = Some(lazy_init);
        self
    }

    /// 添加依赖
    pub fn with_depends_on(mut self, bean_name: impl Into<String>) -> Self {
        self.depends_on.push(bean_name.into());
        self
    }

    /// 添加属性，同名属性被替换
    pub fn with_property(mut self, name: impl Into<String>, value: BeanValue) -> Self {
        self.set_property_value(name, value);
        self
    }

    /// 添加按下标指定的构造参数
    pub fn with_constructor_arg(mut self, index: usize, value: BeanValue) -> Self {
        self.constructor_arguments
            .add_indexed(index, ValueHolder::new(value));
        self
    }

    /// 设置工厂 bean 和工厂方法
    pub fn with_factory(
        mut self,
        factory_bean_name: Option<String>,
        factory_method_name: impl Into<String>,
    ) -> Self {
        self.factory_bean_name = factory_bean_name;
        self.factory_method_name = Some(factory_method_name.into());
        self
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 获取属性值
    pub fn property(&self, name: &str) -> Option<&BeanValue> {
        self.property_values
            .iter()
            .find(|pv| pv.name == name)
            .map(|pv| &pv.value)
    }

    /// 添加属性值，重复的属性名视为错误
    pub fn add_property_value(&mut self, name: impl Into<String>, value: BeanValue) -> BeansResult<()> {
        let name = name.into();
        if self.property(&name).is_some() {
            return Err(BeansError::store(format!("属性 '{}' 重复定义", name)));
        }
        self.property_values.push(PropertyValue { name, value });
        Ok(())
    }

    /// 设置属性值，同名属性被替换
    pub fn set_property_value(&mut self, name: impl Into<String>, value: BeanValue) {
        let name = name.into();
        match self.property_values.iter_mut().find(|pv| pv.name == name) {
            Some(existing) => existing.value = value,
            None => self.property_values.push(PropertyValue { name, value }),
        }
    }

    /// 生效的作用域
    pub fn effective_scope(&self) -> BeanScope {
        self.scope.clone().unwrap_or_default()
    }

    pub fn is_singleton(&self) -> bool {
        self.effective_scope() == BeanScope::Singleton
    }

    pub fn is_prototype(&self) -> bool {
        self.effective_scope() == BeanScope::Prototype
    }

    pub fn is_lazy_init(&self) -> bool {
        self.lazy_init.unwrap_or(false)
    }

    /// 校验定义的完整性
    pub fn validate(&self) -> BeansResult<()> {
        if self.factory_bean_name.is_some() && self.factory_method_name.is_none() {
            return Err(BeansError::store("指定了 factory-bean 但缺少 factory-method"));
        }
        if !self.is_abstract
            && self.class_name.is_none()
            && self.parent_name.is_none()
            && self.factory_method_name.is_none()
        {
            return Err(BeansError::store(
                "非抽象定义必须指定 class、parent 或 factory-method 之一",
            ));
        }
        Ok(())
    }

    /// 以当前定义为父定义，合并子定义得到完整定义
    pub fn merged_with_child(&self, child: &Self) -> Self {
        let mut merged = self.clone();

        if child.class_name.is_some() {
            merged.class_name = child.class_name.clone();
        }
        if child.scope.is_some() {
            merged.scope = child.scope.clone();
        }
        if child.lazy_init.is_some() {
            merged.lazy_init = child.lazy_init;
        }
        if child.init_method_name.is_some() {
            merged.init_method_name = child.init_method_name.clone();
        }
        if child.destroy_method_name.is_some() {
            merged.destroy_method_name = child.destroy_method_name.clone();
        }
        if child.factory_method_name.is_some() {
            merged.factory_bean_name = child.factory_bean_name.clone();
            merged.factory_method_name = child.factory_method_name.clone();
        }

        merged.constructor_arguments.merge_from(&child.constructor_arguments);
        for pv in &child.property_values {
            merged.set_property_value(pv.name.clone(), pv.value.clone());
        }

        // 以下设置从不继承
        merged.parent_name = None;
        merged.is_abstract = child.is_abstract;
        merged.depends_on = child.depends_on.clone();
        merged.primary = child.primary;
        merged.autowire_candidate = child.autowire_candidate;
        merged.description = child.description.clone();
        merged.resource_description = child.resource_description.clone();
        merged
    }

    /// 定义中引用的所有 bean 名称（含嵌套集合和内部 bean）
    pub fn referenced_bean_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.referenced_bean_names_into(&mut names);
        names
    }

    fn referenced_bean_names_into(&self, names: &mut Vec<String>) {
        for holder in self.constructor_arguments.values() {
            holder.value.referenced_bean_names(names);
        }
        for pv in &self.property_values {
            pv.value.referenced_bean_names(names);
        }
    }
}

/// 带名称和别名的 bean 定义
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeanDefinitionHolder {
    pub name: String,
    pub aliases: Vec<String>,
    pub definition: BeanDefinition,
}

impl BeanDefinitionHolder {
    /// 创建新的定义持有者
    pub fn new(name: impl Into<String>, definition: BeanDefinition) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            definition,
        }
    }
}
