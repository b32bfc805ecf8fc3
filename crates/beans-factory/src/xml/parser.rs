//! `<bean>` 元素解析

use super::document::Element;
use beans_abstractions::BeanDefinitionRegistry;
use beans_common::{
    BeanDefinition, BeanDefinitionHolder, BeanReference, BeanScope, BeanValue, BeansError,
    BeansResult, MapEntry, TypedStringValue, ValueHolder,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use tracing::{debug, warn};

const TRUE_VALUE: &str = "true";
const DEFAULT_VALUE: &str = "default";
const GENERATED_NAME_SEPARATOR: &str = "#";

/// `<beans>` 元素上的默认设置，嵌套的 `<beans>` 继承并可覆盖
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DocumentDefaults {
    pub lazy_init: Option<bool>,
    pub init_method: Option<String>,
    pub destroy_method: Option<String>,
}

impl DocumentDefaults {
    /// 以当前默认值为基础，应用 `<beans>` 元素上的默认属性
    pub fn derive(&self, beans: &Element) -> Self {
        let mut defaults = self.clone();
        match beans.non_empty_attribute("default-lazy-init") {
            Some(DEFAULT_VALUE) | None => {}
            Some(value) => defaults.lazy_init = Some(value == TRUE_VALUE),
        }
        if let Some(method) = beans.non_empty_attribute("default-init-method") {
            defaults.init_method = Some(method.to_string());
        }
        if let Some(method) = beans.non_empty_attribute("default-destroy-method") {
            defaults.destroy_method = Some(method.to_string());
        }
        defaults
    }
}

/// 按 `,; ` 及空白拆分名称列表
pub(crate) fn split_names(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// bean 定义解析委托
///
/// 每个 `<beans>` 元素对应一个委托；已用名称集合由同一文档内的所有委托共享，
/// 名称唯一性按文档检查。
pub(crate) struct BeanDefinitionParserDelegate<'a> {
    registry: &'a dyn BeanDefinitionRegistry,
    resource: &'a str,
    defaults: DocumentDefaults,
    used_names: &'a RefCell<HashSet<String>>,
    inner_bean_counter: &'a Cell<usize>,
}

impl<'a> BeanDefinitionParserDelegate<'a> {
    pub fn new(
        registry: &'a dyn BeanDefinitionRegistry,
        resource: &'a str,
        defaults: DocumentDefaults,
        used_names: &'a RefCell<HashSet<String>>,
        inner_bean_counter: &'a Cell<usize>,
    ) -> Self {
        Self {
            registry,
            resource,
            defaults,
            used_names,
            inner_bean_counter,
        }
    }

    /// 解析顶层或内部 `<bean>` 元素
    pub fn parse_bean_definition_element(
        &mut self,
        element: &Element,
        containing: Option<&BeanDefinition>,
    ) -> BeansResult<BeanDefinitionHolder> {
        let id = element.non_empty_attribute("id").map(str::to_string);
        let mut aliases = element
            .attribute("name")
            .map(split_names)
            .unwrap_or_default();

        let mut bean_name = id.unwrap_or_default();
        if bean_name.is_empty() && !aliases.is_empty() {
            bean_name = aliases.remove(0);
            debug!("第 {} 行未指定 id，使用第一个别名 '{}' 作为名称", element.line, bean_name);
        }

        if containing.is_none() {
            self.check_name_uniqueness(&bean_name, &aliases, element)?;
        }

        let definition = self.parse_bean_definition_body(element, &bean_name, containing)?;

        if bean_name.is_empty() {
            bean_name = match containing {
                Some(_) => self.generate_inner_bean_name(&definition),
                None => {
                    let generated = self.generate_bean_name(&definition, element)?;
                    // 第一个生成名称同时以类名作为别名
                    if let Some(class_name) = &definition.class_name {
                        if generated.starts_with(class_name.as_str())
                            && generated.len() > class_name.len()
                            && !self.registry.is_bean_name_in_use(class_name)
                            && !self.used_names.borrow().contains(class_name)
                        {
                            aliases.push(class_name.clone());
                        }
                    }
                    generated
                }
            };
            debug!("第 {} 行的 bean 未指定名称，生成名称 '{}'", element.line, bean_name);
            // 隐式的类名别名不占用名称，后续同名定义可以取代它
            if containing.is_none() {
                self.used_names.borrow_mut().insert(bean_name.clone());
            }
        }

        Ok(BeanDefinitionHolder {
            name: bean_name,
            aliases,
            definition,
        })
    }

    fn check_name_uniqueness(
        &mut self,
        bean_name: &str,
        aliases: &[String],
        element: &Element,
    ) -> BeansResult<()> {
        let mut used_names = self.used_names.borrow_mut();
        let found = if !bean_name.is_empty() && used_names.contains(bean_name) {
            Some(bean_name)
        } else {
            aliases
                .iter()
                .find(|alias| used_names.contains(alias.as_str()))
                .map(String::as_str)
        };

        if let Some(found) = found {
            return Err(self.error_at(
                element,
                Some(bean_name),
                format!("bean 名称 '{}' 已在此文档中使用", found),
            ));
        }

        if !bean_name.is_empty() {
            used_names.insert(bean_name.to_string());
        }
        used_names.extend(aliases.iter().cloned());
        Ok(())
    }

    fn parse_bean_definition_body(
        &mut self,
        element: &Element,
        bean_name: &str,
        containing: Option<&BeanDefinition>,
    ) -> BeansResult<BeanDefinition> {
        let mut definition = BeanDefinition::empty();
        definition.class_name = element.non_empty_attribute("class").map(str::to_string);
        definition.parent_name = element.non_empty_attribute("parent").map(str::to_string);
        definition.resource_description = Some(self.resource.to_string());

        if let Some(scope) = element.attribute("scope") {
            definition.scope = BeanScope::parse(scope);
        } else if let Some(containing) = containing {
            // 内部 bean 默认使用外部 bean 的作用域
            definition.scope = containing.scope.clone();
        }

        definition.is_abstract = element.attribute("abstract") == Some(TRUE_VALUE);

        definition.lazy_init = match element.non_empty_attribute("lazy-init") {
            Some(DEFAULT_VALUE) | None => self.defaults.lazy_init,
            Some(value) => Some(value == TRUE_VALUE),
        };

        definition.autowire_candidate = element.attribute("autowire-candidate") != Some("false");
        definition.primary = element.attribute("primary") == Some(TRUE_VALUE);

        if let Some(depends_on) = element.attribute("depends-on") {
            definition.depends_on = split_names(depends_on);
        }

        definition.init_method_name = element
            .non_empty_attribute("init-method")
            .map(str::to_string)
            .or_else(|| self.defaults.init_method.clone());
        definition.destroy_method_name = element
            .non_empty_attribute("destroy-method")
            .map(str::to_string)
            .or_else(|| self.defaults.destroy_method.clone());

        definition.factory_method_name = element
            .non_empty_attribute("factory-method")
            .map(str::to_string);
        definition.factory_bean_name = element
            .non_empty_attribute("factory-bean")
            .map(str::to_string);

        for child in element.child_elements() {
            match child.name.as_str() {
                "description" => {
                    definition.description = Some(child.text().trim().to_string());
                }
                "constructor-arg" => self.parse_constructor_arg(child, bean_name, &mut definition)?,
                "property" => self.parse_property(child, bean_name, &mut definition)?,
                "meta" | "lookup-method" | "replaced-method" | "qualifier" => {
                    debug!("忽略 bean '{}' 的 <{}> 元素", bean_name, child.name);
                }
                other => {
                    warn!(
                        "忽略 bean '{}' 中未知的 <{}> 元素（{} 第 {} 行）",
                        bean_name, other, self.resource, child.line
                    );
                }
            }
        }

        Ok(definition)
    }

    fn parse_constructor_arg(
        &mut self,
        element: &Element,
        bean_name: &str,
        definition: &mut BeanDefinition,
    ) -> BeansResult<()> {
        let value = self.parse_property_value(element, bean_name, definition, "<constructor-arg>")?;
        let holder = ValueHolder {
            value,
            type_name: element.non_empty_attribute("type").map(str::to_string),
            name: element.non_empty_attribute("name").map(str::to_string),
        };

        match element.attribute("index") {
            Some(index) => {
                let index: usize = index.trim().parse().map_err(|_| {
                    self.error_at(
                        element,
                        Some(bean_name),
                        format!("constructor-arg 的 index 必须是非负整数: '{}'", index),
                    )
                })?;
                if definition.constructor_arguments.has_indexed(index) {
                    return Err(self.error_at(
                        element,
                        Some(bean_name),
                        format!("constructor-arg 的 index {} 重复", index),
                    ));
                }
                definition.constructor_arguments.add_indexed(index, holder);
            }
            None => definition.constructor_arguments.add_generic(holder),
        }
        Ok(())
    }

    fn parse_property(
        &mut self,
        element: &Element,
        bean_name: &str,
        definition: &mut BeanDefinition,
    ) -> BeansResult<()> {
        let name = element
            .non_empty_attribute("name")
            .ok_or_else(|| self.error_at(element, Some(bean_name), "<property> 缺少 name 属性"))?
            .to_string();

        if definition.property(&name).is_some() {
            return Err(self.error_at(
                element,
                Some(bean_name),
                format!("属性 '{}' 重复定义", name),
            ));
        }

        let value = self.parse_property_value(element, bean_name, definition, "<property>")?;
        definition
            .add_property_value(name, value)
            .map_err(|e| e.with_bean_name(bean_name).with_resource(self.resource))
    }

    /// 解析 `<property>` / `<constructor-arg>` 的值
    fn parse_property_value(
        &mut self,
        element: &Element,
        bean_name: &str,
        containing: &BeanDefinition,
        element_name: &str,
    ) -> BeansResult<BeanValue> {
        let mut sub_elements = element
            .child_elements()
            .filter(|child| child.name != "description" && child.name != "meta");
        let sub_element = sub_elements.next();
        if sub_elements.next().is_some() {
            return Err(self.error_at(
                element,
                Some(bean_name),
                format!("{} 只能包含一个子元素", element_name),
            ));
        }

        let ref_attribute = element.attribute("ref");
        let value_attribute = element.attribute("value");
        let specified = [ref_attribute.is_some(), value_attribute.is_some(), sub_element.is_some()]
            .iter()
            .filter(|flag| **flag)
            .count();
        if specified > 1 {
            return Err(self.error_at(
                element,
                Some(bean_name),
                format!("{} 只能指定 ref、value 或子元素之一", element_name),
            ));
        }

        if let Some(reference) = ref_attribute {
            let reference = reference.trim();
            if reference.is_empty() {
                return Err(self.error_at(
                    element,
                    Some(bean_name),
                    format!("{} 的 ref 属性为空", element_name),
                ));
            }
            return Ok(BeanValue::reference(reference));
        }

        if let Some(value) = value_attribute {
            return Ok(BeanValue::literal(value));
        }

        match sub_element {
            Some(sub_element) => self.parse_value_element(sub_element, bean_name, containing, None),
            None => Err(self.error_at(
                element,
                Some(bean_name),
                format!("{} 必须指定 ref、value 或子元素", element_name),
            )),
        }
    }

    /// 解析值子元素
    fn parse_value_element(
        &mut self,
        element: &Element,
        bean_name: &str,
        containing: &BeanDefinition,
        default_value_type: Option<&str>,
    ) -> BeansResult<BeanValue> {
        match element.name.as_str() {
            "bean" => {
                let holder = self.parse_bean_definition_element(element, Some(containing))?;
                Ok(BeanValue::InnerBean(Box::new(holder)))
            }
            "ref" => {
                if let Some(target) = element.non_empty_attribute("bean") {
                    Ok(BeanValue::Reference(BeanReference {
                        bean_name: target.to_string(),
                        to_parent: false,
                    }))
                } else if let Some(target) = element.non_empty_attribute("parent") {
                    Ok(BeanValue::Reference(BeanReference {
                        bean_name: target.to_string(),
                        to_parent: true,
                    }))
                } else {
                    Err(self.error_at(element, Some(bean_name), "<ref> 必须指定 bean 或 parent"))
                }
            }
            "idref" => element
                .non_empty_attribute("bean")
                .map(|target| BeanValue::IdRef(target.to_string()))
                .ok_or_else(|| self.error_at(element, Some(bean_name), "<idref> 必须指定 bean")),
            "value" => Ok(BeanValue::Literal(TypedStringValue {
                value: element.text(),
                type_name: element
                    .non_empty_attribute("type")
                    .or(default_value_type)
                    .map(str::to_string),
            })),
            "null" => Ok(BeanValue::Null),
            "list" | "set" | "array" => {
                let value_type = element.non_empty_attribute("value-type");
                let mut items = Vec::new();
                for child in element.child_elements().filter(|c| c.name != "description") {
                    items.push(self.parse_value_element(child, bean_name, containing, value_type)?);
                }
                Ok(match element.name.as_str() {
                    "list" => BeanValue::List(items),
                    "set" => BeanValue::Set(items),
                    _ => BeanValue::Array(items),
                })
            }
            "map" => self.parse_map(element, bean_name, containing),
            "props" => {
                let mut props = Vec::new();
                for prop in element.child_elements().filter(|c| c.name == "prop") {
                    let key = prop
                        .attribute("key")
                        .ok_or_else(|| self.error_at(prop, Some(bean_name), "<prop> 缺少 key 属性"))?;
                    props.push((key.to_string(), prop.text().trim().to_string()));
                }
                Ok(BeanValue::Props(props))
            }
            other => Err(self.error_at(
                element,
                Some(bean_name),
                format!("未知的属性值元素 <{}>", other),
            )),
        }
    }

    fn parse_map(
        &mut self,
        element: &Element,
        bean_name: &str,
        containing: &BeanDefinition,
    ) -> BeansResult<BeanValue> {
        let key_type = element.non_empty_attribute("key-type");
        let value_type = element.non_empty_attribute("value-type");
        let mut entries = Vec::new();

        for entry in element.child_elements().filter(|c| c.name == "entry") {
            let key_element = entry.first_child("key");
            let value_element = entry
                .child_elements()
                .find(|c| c.name != "key" && c.name != "description");

            let key = match (entry.attribute("key"), entry.attribute("key-ref"), key_element) {
                (Some(key), None, None) => BeanValue::Literal(TypedStringValue {
                    value: key.to_string(),
                    type_name: key_type.map(str::to_string),
                }),
                (None, Some(key_ref), None) if !key_ref.trim().is_empty() => {
                    BeanValue::reference(key_ref.trim())
                }
                (None, None, Some(key_element)) => {
                    let inner = key_element.child_elements().next().ok_or_else(|| {
                        self.error_at(key_element, Some(bean_name), "<key> 必须包含一个子元素")
                    })?;
                    self.parse_value_element(inner, bean_name, containing, key_type)?
                }
                _ => {
                    return Err(self.error_at(
                        entry,
                        Some(bean_name),
                        "<entry> 必须且只能通过 key、key-ref 或 <key> 之一指定键",
                    ))
                }
            };

            let entry_value_type = entry.non_empty_attribute("value-type").or(value_type);
            let value = match (entry.attribute("value"), entry.attribute("value-ref"), value_element) {
                (Some(value), None, None) => BeanValue::Literal(TypedStringValue {
                    value: value.to_string(),
                    type_name: entry_value_type.map(str::to_string),
                }),
                (None, Some(value_ref), None) if !value_ref.trim().is_empty() => {
                    BeanValue::reference(value_ref.trim())
                }
                (None, None, Some(value_element)) => {
                    self.parse_value_element(value_element, bean_name, containing, entry_value_type)?
                }
                _ => {
                    return Err(self.error_at(
                        entry,
                        Some(bean_name),
                        "<entry> 必须且只能通过 value、value-ref 或子元素之一指定值",
                    ))
                }
            };

            entries.push(MapEntry { key, value });
        }

        Ok(BeanValue::Map(entries))
    }

    fn generate_bean_name(
        &self,
        definition: &BeanDefinition,
        element: &Element,
    ) -> BeansResult<String> {
        let base = generated_name_base(definition).ok_or_else(|| {
            self.error_at(
                element,
                None,
                "bean 未指定 class、parent 或 factory-bean，无法生成名称",
            )
        })?;

        let mut counter = 0usize;
        loop {
            let candidate = format!("{}{}{}", base, GENERATED_NAME_SEPARATOR, counter);
            if !self.registry.is_bean_name_in_use(&candidate) && !self.used_names.borrow().contains(&candidate)
            {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    fn generate_inner_bean_name(&self, definition: &BeanDefinition) -> String {
        let base = generated_name_base(definition).unwrap_or_else(|| "(inner bean)".to_string());
        let counter = self.inner_bean_counter.get();
        self.inner_bean_counter.set(counter + 1);
        format!("{}{}inner{}{}", base, GENERATED_NAME_SEPARATOR, GENERATED_NAME_SEPARATOR, counter)
    }

    fn error_at(
        &self,
        element: &Element,
        bean_name: Option<&str>,
        message: impl Into<String>,
    ) -> BeansError {
        BeansError::BeanDefinitionStore {
            resource: Some(self.resource.to_string()),
            bean_name: bean_name.filter(|n| !n.is_empty()).map(str::to_string),
            message: format!("第 {} 行: {}", element.line, message.into()),
        }
    }
}

fn generated_name_base(definition: &BeanDefinition) -> Option<String> {
    if let Some(class_name) = &definition.class_name {
        return Some(class_name.clone());
    }
    if let Some(parent_name) = &definition.parent_name {
        return Some(format!("{}$child", parent_name));
    }
    definition
        .factory_bean_name
        .as_ref()
        .map(|factory_bean| format!("{}$created", factory_bean))
}
