//! XmlBeanFactory 端到端集成测试
#![allow(deprecated)]

use beans_abstractions::{
    AliasRegistry, BeanDefinitionReader, BeanFactory, HierarchicalBeanFactory, ListableBeanFactory,
};
use beans_common::{
    BeanFactoryOptions, BeanScope, BeanValue, BeansError, ByteArrayResource, FileSystemResource, Resource,
};
use beans_factory::{DefaultListableBeanFactory, XmlBeanDefinitionReader, XmlBeanFactory};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans xmlns="http://www.springframework.org/schema/beans"
       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
       xsi:schemaLocation="http://www.springframework.org/schema/beans
                           http://www.springframework.org/schema/beans/spring-beans.xsd">"#;

fn document(body: &str) -> String {
    format!("{}\n{}\n</beans>\n", HEADER, body)
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[test]
fn test_empty_document_yields_empty_registry() {
    let factory = XmlBeanFactory::new(&ByteArrayResource::new(document(""))).unwrap();
    assert_eq!(factory.bean_definition_count(), 0);
    assert!(factory.bean_definition_names().is_empty());
    assert!(!factory.contains_bean("anything"));
}

#[test]
fn test_loads_exactly_the_declared_definitions() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "beans.xml",
        &document(
            r#"
  <bean id="dataSource" class="com.example.DataSource" destroy-method="close">
    <property name="url" value="jdbc:h2:mem:test"/>
    <property name="maxConnections"><value type="int">8</value></property>
  </bean>
  <bean id="repository" name="repo,store" class="com.example.Repository" scope="prototype">
    <constructor-arg index="0" ref="dataSource"/>
  </bean>
  <bean id="service" class="com.example.Service" depends-on="repository" lazy-init="true">
    <property name="repository" ref="repo"/>
    <property name="tags">
      <list><value>a</value><value>b</value></list>
    </property>
  </bean>"#,
        ),
    );

    let factory = XmlBeanFactory::new(&FileSystemResource::new(&path)).unwrap();

    assert_eq!(
        factory.bean_definition_names(),
        vec!["dataSource", "repository", "service"]
    );

    let data_source = factory.get_merged_bean_definition("dataSource").unwrap();
    assert_eq!(data_source.class_name.as_deref(), Some("com.example.DataSource"));
    assert_eq!(data_source.destroy_method_name.as_deref(), Some("close"));
    assert_eq!(
        data_source.property("url"),
        Some(&BeanValue::literal("jdbc:h2:mem:test"))
    );
    assert!(data_source
        .resource_description
        .as_deref()
        .unwrap()
        .contains("beans.xml"));

    let repository = factory.get_merged_bean_definition("store").unwrap();
    assert_eq!(repository.effective_scope(), BeanScope::Prototype);
    assert_eq!(repository.constructor_arguments.len(), 1);
    assert!(factory.is_prototype("repo").unwrap());
    assert_eq!(sorted(factory.get_aliases("repository")), vec!["repo", "store"]);

    let service = factory.get_merged_bean_definition("service").unwrap();
    assert_eq!(service.depends_on, vec!["repository"]);
    assert!(service.is_lazy_init());
    assert_eq!(
        service.property("repository"),
        Some(&BeanValue::reference("repo"))
    );

    assert!(factory.validate_dependencies().is_ok());
}

#[test]
fn test_missing_resource_fails_construction() {
    let dir = TempDir::new().unwrap();
    let error = XmlBeanFactory::new(&FileSystemResource::new(dir.path().join("absent.xml")))
        .unwrap_err();
    assert!(matches!(error, BeansError::ResourceIo { .. }));
    assert!(error.is_load_failure());
}

#[test]
fn test_malformed_resource_fails_construction() {
    let cases = [
        "<beans><bean id=\"a\" class=\"A\"></beans>",
        "not xml at all",
        "<beans></beans><beans></beans>",
    ];
    for xml in cases {
        let error = XmlBeanFactory::new(&ByteArrayResource::new(xml)).unwrap_err();
        assert!(matches!(error, BeansError::XmlParse { .. }), "{xml}: {error}");
        assert!(error.is_load_failure());
    }
}

#[test]
fn test_invalid_definition_fails_construction() {
    let cases = [
        // 根元素不是 <beans>
        "<bean id=\"a\" class=\"A\"/>",
        // 同一 <beans> 内重复名称
        "<beans><bean id=\"a\" class=\"A\"/><bean id=\"a\" class=\"B\"/></beans>",
        // 非抽象 bean 缺少 class
        "<beans><bean id=\"a\"/></beans>",
        // factory-bean 缺少 factory-method
        "<beans><bean id=\"a\" factory-bean=\"b\"/></beans>",
    ];
    for xml in cases {
        let error = XmlBeanFactory::new(&ByteArrayResource::new(xml)).unwrap_err();
        assert!(
            matches!(error, BeansError::BeanDefinitionStore { .. }),
            "{xml}: {error}"
        );
        assert!(error.is_load_failure());
    }
}

#[test]
fn test_parent_entries_resolve_through_child_without_copying() {
    let parent = XmlBeanFactory::new(&ByteArrayResource::with_description(
        document(
            r#"
  <bean id="base" abstract="true" scope="prototype">
    <property name="timeout" value="30"/>
  </bean>
  <bean id="shared" class="com.example.Shared"/>
  <alias name="shared" alias="common"/>"#,
        ),
        "parent",
    ))
    .unwrap();
    let parent: Arc<dyn BeanFactory> = parent.into_factory();

    let child = XmlBeanFactory::with_parent(
        &ByteArrayResource::with_description(
            document(
                r#"
  <bean id="client" parent="base" class="com.example.Client">
    <property name="shared" ref="common"/>
  </bean>"#,
            ),
            "child",
        ),
        Some(Arc::clone(&parent)),
    )
    .unwrap();

    assert_eq!(child.bean_definition_count(), 1);
    assert!(!child.contains_bean_definition("shared"));
    assert!(!child.contains_local_bean("shared"));
    assert!(child.contains_bean("shared"));
    assert!(child.contains_bean("common"));
    assert!(child.parent_bean_factory().is_some());

    let shared = child.get_merged_bean_definition("common").unwrap();
    assert_eq!(shared.class_name.as_deref(), Some("com.example.Shared"));
    assert_eq!(child.get_aliases("shared"), vec!["common"]);

    let client = child.get_merged_bean_definition("client").unwrap();
    assert_eq!(client.class_name.as_deref(), Some("com.example.Client"));
    assert_eq!(client.effective_scope(), BeanScope::Prototype);
    assert_eq!(client.property("timeout"), Some(&BeanValue::literal("30")));
    assert!(client.parent_name.is_none());
    assert!(!client.is_abstract);

    assert!(child.validate_dependencies().is_ok());
    assert!(matches!(
        child.get_merged_bean_definition("nowhere"),
        Err(BeansError::NoSuchBeanDefinition { .. })
    ));
}

#[test]
fn test_child_definition_with_same_name_uses_parent_definition() {
    let parent = XmlBeanFactory::new(&ByteArrayResource::new(document(
        r#"<bean id="service" class="com.example.Service"><property name="a" value="1"/></bean>"#,
    )))
    .unwrap();
    let parent: Arc<dyn BeanFactory> = parent.into_factory();

    let child = XmlBeanFactory::with_parent(
        &ByteArrayResource::new(document(
            r#"<bean id="service" parent="service"><property name="b" value="2"/></bean>"#,
        )),
        Some(parent),
    )
    .unwrap();

    let merged = child.get_merged_bean_definition("service").unwrap();
    assert_eq!(merged.class_name.as_deref(), Some("com.example.Service"));
    assert_eq!(merged.property("a"), Some(&BeanValue::literal("1")));
    assert_eq!(merged.property("b"), Some(&BeanValue::literal("2")));
}

#[test]
fn test_imports_resolve_relative_to_importing_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_file(
        dir.path(),
        "nested/infra.xml",
        &document(r#"<bean id="cache" class="com.example.Cache"/>"#),
    );
    let main = write_file(
        dir.path(),
        "main.xml",
        &document(
            r#"
  <import resource="nested/infra.xml"/>
  <bean id="app" class="com.example.App">
    <property name="cache" ref="cache"/>
  </bean>"#,
        ),
    );

    let factory = XmlBeanFactory::new(&FileSystemResource::new(&main)).unwrap();
    assert_eq!(factory.bean_definition_names(), vec!["cache", "app"]);
    let cache = factory.get_merged_bean_definition("cache").unwrap();
    assert!(cache
        .resource_description
        .as_deref()
        .unwrap()
        .contains("infra.xml"));
}

#[test]
fn test_import_cycle_fails_construction() {
    let dir = TempDir::new().unwrap();
    let first = write_file(
        dir.path(),
        "first.xml",
        &document(r#"<import resource="second.xml"/><bean id="a" class="A"/>"#),
    );
    write_file(
        dir.path(),
        "second.xml",
        &document(r#"<import resource="first.xml"/><bean id="b" class="B"/>"#),
    );

    let error = XmlBeanFactory::new(&FileSystemResource::new(&first)).unwrap_err();
    match &error {
        BeansError::BeanDefinitionStore { message, .. } => {
            assert!(message.contains("first.xml"), "{message}")
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(error.is_load_failure());
}

#[test]
fn test_import_cycle_through_dot_relative_path_detected() {
    let dir = TempDir::new().unwrap();
    let first = write_file(
        dir.path(),
        "first.xml",
        &document(r#"<import resource="./second.xml"/>"#),
    );
    write_file(
        dir.path(),
        "second.xml",
        &document(r#"<import resource="./first.xml"/>"#),
    );

    let error = XmlBeanFactory::new(&FileSystemResource::new(&first)).unwrap_err();
    match &error {
        BeansError::BeanDefinitionStore { message, .. } => {
            assert!(message.contains("循环"), "{message}")
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_imported_documents_have_their_own_names() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "extra.xml",
        &document(r#"<bean id="a" class="com.example.Imported"/>"#),
    );
    let main = write_file(
        dir.path(),
        "main.xml",
        &document(r#"<bean id="a" class="com.example.Local"/><import resource="extra.xml"/>"#),
    );

    let factory = XmlBeanFactory::new(&FileSystemResource::new(&main)).unwrap();
    assert_eq!(
        factory.get_type("a").unwrap().as_deref(),
        Some("com.example.Imported")
    );
}

#[test]
fn test_duplicate_name_across_nested_beans_fails_construction() {
    let cases = [
        r#"<beans><bean id="a" class="A"/><beans><bean id="a" class="B"/></beans></beans>"#,
        r#"<beans><beans><bean id="a" class="A"/></beans><beans><bean name="b,a" class="B"/></beans></beans>"#,
    ];
    for xml in cases {
        let error = XmlBeanFactory::new(&ByteArrayResource::new(xml)).unwrap_err();
        assert!(
            matches!(error, BeansError::BeanDefinitionStore { .. }),
            "{xml}: {error}"
        );
    }
}

#[test]
fn test_explicit_id_takes_over_generated_class_alias() {
    let factory = XmlBeanFactory::new(&ByteArrayResource::new(document(
        r#"<bean class="com.example.A"/><bean id="com.example.A" class="com.example.B"/>"#,
    )))
    .unwrap();

    assert_eq!(
        factory.bean_definition_names(),
        vec!["com.example.A#0", "com.example.A"]
    );
    assert!(!factory.is_alias("com.example.A"));
    assert_eq!(
        factory.get_type("com.example.A").unwrap().as_deref(),
        Some("com.example.B")
    );
}

#[test]
fn test_missing_import_fails_construction() {
    let dir = TempDir::new().unwrap();
    let main = write_file(
        dir.path(),
        "main.xml",
        &document(r#"<import resource="missing.xml"/>"#),
    );
    let error = XmlBeanFactory::new(&FileSystemResource::new(&main)).unwrap_err();
    assert!(matches!(error, BeansError::ResourceIo { .. }));
}

#[test]
fn test_nested_beans_honour_profiles() {
    let xml = document(
        r#"
  <bean id="always" class="com.example.Always"/>
  <beans profile="dev">
    <bean id="devOnly" class="com.example.Dev"/>
  </beans>
  <beans profile="!dev">
    <bean id="notDev" class="com.example.Prod"/>
  </beans>
  <beans profile="default">
    <bean id="fallback" class="com.example.Fallback"/>
  </beans>"#,
    );

    let without_profiles = XmlBeanFactory::new(&ByteArrayResource::new(xml.clone())).unwrap();
    assert_eq!(
        without_profiles.bean_definition_names(),
        vec!["always", "notDev", "fallback"]
    );

    let dev = XmlBeanFactory::with_options(
        &ByteArrayResource::new(xml),
        None,
        BeanFactoryOptions::default().with_active_profiles(["dev"]),
    )
    .unwrap();
    assert_eq!(dev.bean_definition_names(), vec!["always", "devOnly"]);
}

#[test]
fn test_nested_beans_inherit_defaults() {
    let factory = XmlBeanFactory::new(&ByteArrayResource::new(
        r#"<beans default-lazy-init="true" default-init-method="setup">
  <bean id="a" class="A"/>
  <beans default-lazy-init="false">
    <bean id="b" class="B"/>
  </beans>
  <bean id="c" class="C" lazy-init="false" init-method="start"/>
</beans>"#,
    ))
    .unwrap();

    let a = factory.get_merged_bean_definition("a").unwrap();
    assert!(a.is_lazy_init());
    assert_eq!(a.init_method_name.as_deref(), Some("setup"));

    let b = factory.get_merged_bean_definition("b").unwrap();
    assert!(!b.is_lazy_init());
    assert_eq!(b.init_method_name.as_deref(), Some("setup"));

    let c = factory.get_merged_bean_definition("c").unwrap();
    assert!(!c.is_lazy_init());
    assert_eq!(c.init_method_name.as_deref(), Some("start"));
}

#[test]
fn test_alias_elements_and_generated_names() {
    let factory = XmlBeanFactory::new(&ByteArrayResource::new(document(
        r#"
  <bean id="primaryDataSource" class="com.example.DataSource"/>
  <alias name="primaryDataSource" alias="dataSource"/>
  <alias name="dataSource" alias="ds"/>
  <bean class="com.example.Anonymous"/>
  <bean class="com.example.Anonymous"/>"#,
    )))
    .unwrap();

    assert_eq!(factory.canonical_name("ds"), "primaryDataSource");
    assert!(factory.is_alias("dataSource"));
    assert!(factory.contains_bean("ds"));
    assert_eq!(
        sorted(factory.get_aliases("primaryDataSource")),
        vec!["dataSource", "ds"]
    );

    assert_eq!(
        factory.bean_definition_names(),
        vec![
            "primaryDataSource",
            "com.example.Anonymous#0",
            "com.example.Anonymous#1"
        ]
    );
    assert_eq!(factory.canonical_name("com.example.Anonymous"), "com.example.Anonymous#0");
    assert_eq!(
        factory.bean_names_for_type("com.example.Anonymous", true),
        vec!["com.example.Anonymous#0", "com.example.Anonymous#1"]
    );
}

#[test]
fn test_overriding_controlled_by_options() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "override.xml",
        &document(r#"<bean id="service" class="com.example.Replacement"/>"#),
    );
    let main = write_file(
        dir.path(),
        "main.xml",
        &document(
            r#"<bean id="service" class="com.example.Original"/>
  <import resource="override.xml"/>"#,
        ),
    );

    let lenient = XmlBeanFactory::new(&FileSystemResource::new(&main)).unwrap();
    assert_eq!(lenient.bean_definition_count(), 1);
    assert_eq!(
        lenient.get_type("service").unwrap().as_deref(),
        Some("com.example.Replacement")
    );

    let error = XmlBeanFactory::with_options(
        &FileSystemResource::new(&main),
        None,
        BeanFactoryOptions::default().with_bean_definition_overriding(false),
    )
    .unwrap_err();
    assert!(matches!(error, BeansError::BeanDefinitionOverride { .. }));
    assert!(error.is_load_failure());
}

#[test]
fn test_options_loaded_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        dir.path(),
        "beans.toml",
        r#"
allow_bean_definition_overriding = false
active_profiles = ["cloud"]
max_import_depth = 4
"#,
    );

    let options = BeanFactoryOptions::load(Some(config.as_path())).unwrap();
    assert!(!options.allow_bean_definition_overriding);
    assert_eq!(options.active_profiles, vec!["cloud"]);
    assert_eq!(options.max_import_depth, 4);

    let factory = XmlBeanFactory::with_options(
        &ByteArrayResource::new(document(
            r#"<beans profile="cloud"><bean id="storage" class="com.example.S3"/></beans>"#,
        )),
        None,
        options,
    )
    .unwrap();
    assert!(factory.contains_bean_definition("storage"));
    assert!(!factory.reader().options().allow_bean_definition_overriding);
}

#[test]
fn test_import_depth_limit() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "level2.xml", &document(r#"<bean id="deep" class="D"/>"#));
    write_file(
        dir.path(),
        "level1.xml",
        &document(r#"<import resource="level2.xml"/>"#),
    );
    let main = write_file(
        dir.path(),
        "main.xml",
        &document(r#"<import resource="level1.xml"/>"#),
    );

    let options = BeanFactoryOptions {
        max_import_depth: 2,
        ..BeanFactoryOptions::default()
    };
    let error =
        XmlBeanFactory::with_options(&FileSystemResource::new(&main), None, options).unwrap_err();
    assert!(matches!(error, BeansError::BeanDefinitionStore { .. }));

    let factory = XmlBeanFactory::new(&FileSystemResource::new(&main)).unwrap();
    assert!(factory.contains_bean_definition("deep"));
}

#[test]
fn test_depends_on_cycle_detected_after_load() {
    let factory = XmlBeanFactory::new(&ByteArrayResource::new(document(
        r#"
  <bean id="a" class="A" depends-on="b"/>
  <bean id="b" class="B" depends-on="c"/>
  <bean id="c" class="C" depends-on="a"/>"#,
    )))
    .unwrap();

    match factory.validate_dependencies() {
        Err(BeansError::CircularDependency { chain }) => {
            assert!(chain.contains("a") && chain.contains("b") && chain.contains("c"), "{chain}")
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_missing_depends_on_reported() {
    let factory = XmlBeanFactory::new(&ByteArrayResource::new(document(
        r#"<bean id="a" class="A" depends-on="ghost"><property name="x" ref="alsoGhost"/></bean>"#,
    )))
    .unwrap();
    assert!(matches!(
        factory.validate_dependencies(),
        Err(BeansError::NoSuchBeanDefinition { ref name }) if name == "ghost"
    ));
}

#[test]
fn test_reader_reports_released_registry() {
    let factory = Arc::new(DefaultListableBeanFactory::new());
    let reader = XmlBeanDefinitionReader::new(&factory);

    let loaded = reader
        .load_bean_definitions(&ByteArrayResource::new(document(
            r#"<bean id="a" class="A"/>"#,
        )))
        .unwrap();
    assert_eq!(loaded, 1);

    drop(factory);
    let error = reader
        .load_bean_definitions(&ByteArrayResource::new(document("")))
        .unwrap_err();
    assert!(matches!(error, BeansError::RegistryReleased));
}

#[test]
fn test_reader_load_all_counts_every_resource() {
    let factory = Arc::new(DefaultListableBeanFactory::new());
    let reader = XmlBeanDefinitionReader::new(&factory);
    let first = ByteArrayResource::new(document(r#"<bean id="a" class="A"/>"#));
    let second = ByteArrayResource::new(document(
        r#"<bean id="b" class="B"/><bean id="c" class="C"/>"#,
    ));

    let resources: [&dyn Resource; 2] = [&first, &second];
    let loaded = reader.load_all(&resources).unwrap();
    assert_eq!(loaded, 3);
    assert_eq!(factory.bean_definition_count(), 3);
}
