//! XML bean 定义读取器

use super::document::{parse_document, Element};
use super::parser::{split_names, BeanDefinitionParserDelegate, DocumentDefaults};
use beans_abstractions::{BeanDefinitionReader, BeanDefinitionRegistry};
use beans_common::{BeanFactoryOptions, BeansError, BeansResult, ByteArrayResource, Resource};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

const BEANS_ELEMENT: &str = "beans";
const BEAN_ELEMENT: &str = "bean";
const ALIAS_ELEMENT: &str = "alias";
const IMPORT_ELEMENT: &str = "import";
const DESCRIPTION_ELEMENT: &str = "description";

/// XML bean 定义读取器
///
/// 持有注册表的弱引用：读取器不延长注册表的生命周期，
/// 注册表释放后继续加载会返回 [`BeansError::RegistryReleased`]。
pub struct XmlBeanDefinitionReader {
    registry: Weak<dyn BeanDefinitionRegistry>,
    options: BeanFactoryOptions,
}

/// 单次加载（含 import）的上下文
struct LoadContext<'a> {
    registry: &'a dyn BeanDefinitionRegistry,
    /// 正在加载的资源栈
    loading: Vec<String>,
    /// 内部 bean 名称计数器，跨 import 共享
    inner_bean_counter: Rc<Cell<usize>>,
}

impl XmlBeanDefinitionReader {
    /// 创建绑定到注册表的读取器
    pub fn new<R>(registry: &Arc<R>) -> Self
    where
        R: BeanDefinitionRegistry + 'static,
    {
        let weak: Weak<R> = Arc::downgrade(registry);
        let registry: Weak<dyn BeanDefinitionRegistry> = weak;
        Self {
            registry,
            options: BeanFactoryOptions::default(),
        }
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

    /// 从 XML 文本加载定义
    pub fn load_from_str(&self, xml: &str, description: &str) -> BeansResult<usize> {
        self.load_bean_definitions(&ByteArrayResource::with_description(xml, description))
    }

    fn registry(&self) -> BeansResult<Arc<dyn BeanDefinitionRegistry>> {
        self.registry.upgrade().ok_or(BeansError::RegistryReleased)
    }

    fn do_load(&self, resource: &dyn Resource, context: &mut LoadContext<'_>) -> BeansResult<()> {
        let description = resource.description();

        if context.loading.contains(&description) {
            return Err(BeansError::store_in(
                description,
                format!("检测到循环 import: {}", context.loading.join(" -> ")),
            ));
        }
        if context.loading.len() >= self.options.max_import_depth {
            return Err(BeansError::store_in(
                description,
                format!("import 嵌套超过最大深度 {}", self.options.max_import_depth),
            ));
        }

        debug!("从 {} 加载 XML bean 定义", description);
        let content = resource.read_to_string()?;
        let root = parse_document(&content, &description)?;

        if root.name != BEANS_ELEMENT {
            return Err(BeansError::store_in(
                description,
                format!("根元素必须是 <beans>，实际为 <{}>", root.name),
            ));
        }

        // 名称唯一性按文档检查，被 import 的文档各自独立
        let used_names = RefCell::new(HashSet::new());
        context.loading.push(description.clone());
        let result = self.register_bean_definitions(
            &root,
            &DocumentDefaults::default(),
            &used_names,
            resource,
            &description,
            context,
        );
        context.loading.pop();
        result
    }

    fn register_bean_definitions(
        &self,
        beans: &Element,
        parent_defaults: &DocumentDefaults,
        used_names: &RefCell<HashSet<String>>,
        resource: &dyn Resource,
        description: &str,
        context: &mut LoadContext<'_>,
    ) -> BeansResult<()> {
        if let Some(profile) = beans.non_empty_attribute("profile") {
            let profiles = split_names(profile);
            let specs: Vec<&str> = profiles.iter().map(String::as_str).collect();
            if !self.options.accepts_profiles(&specs) {
                debug!(
                    "跳过 {} 第 {} 行的 <beans>：profile [{}] 未激活",
                    description, beans.line, profile
                );
                return Ok(());
            }
        }

        let defaults = parent_defaults.derive(beans);
        let registry = context.registry;
        let counter = Rc::clone(&context.inner_bean_counter);
        let mut delegate = BeanDefinitionParserDelegate::new(
            registry,
            description,
            defaults.clone(),
            used_names,
            &counter,
        );

        for element in beans.child_elements() {
            match element.name.as_str() {
                BEAN_ELEMENT => {
                    let holder = delegate.parse_bean_definition_element(element, None)?;
                    registry
                        .register_bean_definition(&holder.name, holder.definition)
                        .map_err(|e| e.with_resource(description))?;
                    for alias in &holder.aliases {
                        registry.register_alias(&holder.name, alias)?;
                    }
                    debug!("注册 bean 定义 '{}'（{} 第 {} 行）", holder.name, description, element.line);
                }
                ALIAS_ELEMENT => {
                    let name = element.non_empty_attribute("name");
                    let alias = element.non_empty_attribute("alias");
                    match (name, alias) {
                        (Some(name), Some(alias)) => registry.register_alias(name, alias)?,
                        _ => {
                            return Err(BeansError::store_in(
                                description,
                                format!("第 {} 行: <alias> 必须同时指定 name 和 alias", element.line),
                            ))
                        }
                    }
                }
                IMPORT_ELEMENT => {
                    self.import_bean_definition_resource(element, resource, description, context)?;
                }
                BEANS_ELEMENT => {
                    self.register_bean_definitions(
                        element,
                        &defaults,
                        used_names,
                        resource,
                        description,
                        context,
                    )?;
                }
                DESCRIPTION_ELEMENT => {}
                other => warn!(
                    "忽略 <beans> 中未知的 <{}> 元素（{} 第 {} 行）",
                    other, description, element.line
                ),
            }
        }

        Ok(())
    }

    fn import_bean_definition_resource(
        &self,
        element: &Element,
        resource: &dyn Resource,
        description: &str,
        context: &mut LoadContext<'_>,
    ) -> BeansResult<()> {
        let location = element.non_empty_attribute("resource").ok_or_else(|| {
            BeansError::store_in(
                description,
                format!("第 {} 行: <import> 缺少 resource 属性", element.line),
            )
        })?;

        let imported = resource.create_relative(location)?;
        let before = context.registry.bean_definition_count();
        self.do_load(imported.as_ref(), context)?;
        debug!(
            "从 {} 导入了 {} 个 bean 定义",
            imported.description(),
            context.registry.bean_definition_count().saturating_sub(before)
        );
        Ok(())
    }
}

impl BeanDefinitionReader for XmlBeanDefinitionReader {
    fn load_bean_definitions(&self, resource: &dyn Resource) -> BeansResult<usize> {
        let registry = self.registry()?;
        let before = registry.bean_definition_count();

        let mut context = LoadContext {
            registry: registry.as_ref(),
            loading: Vec::new(),
            inner_bean_counter: Rc::new(Cell::new(0)),
        };
        self.do_load(resource, &mut context)?;

        let count = registry.bean_definition_count().saturating_sub(before);
        info!("从 {} 加载了 {} 个 bean 定义", resource.description(), count);
        Ok(count)
    }
}

impl fmt::Debug for XmlBeanDefinitionReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlBeanDefinitionReader")
            .field("registry_alive", &(self.registry.strong_count() > 0))
            .field("options", &self.options)
            .finish()
    }
}
