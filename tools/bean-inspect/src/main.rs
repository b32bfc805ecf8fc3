//! # bean-inspect
//!
//! 加载 XML bean 定义资源，校验依赖并打印合并后的定义。
#![allow(deprecated)]

use anyhow::{Context, Result};
use beans_abstractions::BeanFactory;
use beans_common::{BeanDefinition, BeanFactoryOptions, FileSystemResource};
use beans_factory::XmlBeanFactory;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "bean-inspect")]
#[command(about = "加载 XML bean 定义并打印合并后的结果")]
struct Args {
    /// XML 资源路径
    resource: PathBuf,

    /// 父工厂的 XML 资源路径
    #[arg(long)]
    parent: Option<PathBuf>,

    /// 工厂配置文件（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 激活的 profile，可重复指定
    #[arg(long = "profile")]
    profiles: Vec<String>,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// 日志级别
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// 输出条目
#[derive(Debug, Serialize)]
struct DefinitionReport {
    name: String,
    aliases: Vec<String>,
    definition: BeanDefinition,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志，输出到 stderr 以免干扰 JSON
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .with_writer(std::io::stderr)
        .init();

    let options = load_options(&args)?;
    let factory = build_factory(&args, options)?;

    match factory.validate_dependencies() {
        Ok(()) => info!("依赖校验通过"),
        Err(e) => warn!("依赖校验失败: {}", e),
    }

    let reports = collect_reports(&factory)?;
    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => print_table(&reports),
    }

    Ok(())
}

/// 加载工厂配置，命令行指定的 profile 覆盖配置文件
fn load_options(args: &Args) -> Result<BeanFactoryOptions> {
    let mut options = BeanFactoryOptions::load(args.config.as_deref())
        .context("加载工厂配置失败")?;
    if !args.profiles.is_empty() {
        options = options.with_active_profiles(args.profiles.iter().cloned());
    }
    Ok(options)
}

/// 构建工厂（先构建父工厂）
fn build_factory(args: &Args, options: BeanFactoryOptions) -> Result<XmlBeanFactory> {
    let parent: Option<Arc<dyn BeanFactory>> = match &args.parent {
        Some(path) => {
            let parent = XmlBeanFactory::with_options(
                &FileSystemResource::new(path),
                None,
                options.clone(),
            )
            .with_context(|| format!("加载父工厂失败: {}", path.display()))?;
            let parent: Arc<dyn BeanFactory> = parent.into_factory();
            Some(parent)
        }
        None => None,
    };

    XmlBeanFactory::with_options(&FileSystemResource::new(&args.resource), parent, options)
        .with_context(|| format!("加载 bean 定义失败: {}", args.resource.display()))
}

fn collect_reports(factory: &XmlBeanFactory) -> Result<Vec<DefinitionReport>> {
    factory
        .bean_definition_names()
        .into_iter()
        .map(|name| {
            let definition = factory
                .get_merged_bean_definition(&name)
                .with_context(|| format!("合并定义失败: {}", name))?;
            Ok(DefinitionReport {
                aliases: factory.get_aliases(&name),
                name,
                definition: definition.as_ref().clone(),
            })
        })
        .collect()
}

fn print_table(reports: &[DefinitionReport]) {
    println!("{:<32} {:<40} {:<10} {}", "NAME", "CLASS", "SCOPE", "ALIASES");
    for report in reports {
        let definition = &report.definition;
        let class_name = definition.class_name.as_deref().unwrap_or("-");
        let scope = if definition.is_abstract {
            "abstract".to_string()
        } else {
            definition.effective_scope().to_string()
        };
        println!(
            "{:<32} {:<40} {:<10} {}",
            report.name,
            class_name,
            scope,
            report.aliases.join(",")
        );
    }
    println!("共 {} 个 bean 定义", reports.len());
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    }
}
