//! 基于 quick-xml 事件构建的最小 DOM

use beans_common::{BeansError, BeansResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// 节点
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

/// 元素
///
/// 名称取本地名（去掉命名空间前缀），命名空间声明和带前缀的属性被忽略。
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// 起始标签所在行（从 1 开始）
    pub line: usize,
}

impl Element {
    /// 属性原始值
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 去除首尾空白后非空的属性值
    pub fn non_empty_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// 子元素
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// 第一个指定名称的子元素
    pub fn first_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// 直接文本内容（含 CDATA），保留原始空白
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// 解析文档，返回根元素
pub(crate) fn parse_document(source: &str, resource: &str) -> BeansResult<Element> {
    let mut reader = Reader::from_str(source);
    reader.check_end_names(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| parse_error(source, reader.buffer_position(), resource, e))?;

        match event {
            Event::Start(start) => {
                let line = line_at(source, position);
                if root.is_some() && stack.is_empty() {
                    return Err(xml_error(resource, line, "根元素之后存在多余的元素"));
                }
                stack.push(element_from(&start, line, resource)?);
            }
            Event::Empty(start) => {
                let line = line_at(source, position);
                let element = element_from(&start, line, resource)?;
                attach(&mut stack, &mut root, element, resource)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    xml_error(resource, line_at(source, position), "结束标签没有对应的起始标签")
                })?;
                attach(&mut stack, &mut root, element, resource)?;
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| parse_error(source, position, resource, e))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(value.into_owned())),
                    None if !value.trim().is_empty() => {
                        return Err(xml_error(
                            resource,
                            line_at(source, position),
                            "根元素之外存在文本内容",
                        ));
                    }
                    None => {}
                }
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                let value = std::str::from_utf8(&bytes).map_err(|e| {
                    xml_error(resource, line_at(source, position), e.to_string())
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(value.to_string())),
                    None => {
                        return Err(xml_error(
                            resource,
                            line_at(source, position),
                            "根元素之外存在 CDATA",
                        ));
                    }
                }
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(
            resource,
            line_at(source, source.len()),
            format!("元素 <{}>（第 {} 行）未闭合", open.name, open.line),
        ));
    }

    root.ok_or_else(|| xml_error(resource, line_at(source, source.len()), "文档缺少根元素"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    resource: &str,
) -> BeansResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(xml_error(resource, element.line, "根元素之后存在多余的元素"));
    }
    *root = Some(element);
    Ok(())
}

fn element_from(start: &BytesStart<'_>, line: usize, resource: &str) -> BeansResult<Element> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(|e| xml_error(resource, line, e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(resource, line, e.to_string()))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| xml_error(resource, line, e.to_string()))?;
        if key == "xmlns" || key.contains(':') {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|e| xml_error(resource, line, e.to_string()))?;
        attributes.push((key.to_string(), value.into_owned()));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        line,
    })
}

fn line_at(source: &str, position: usize) -> usize {
    let end = position.min(source.len());
    source.as_bytes()[..end]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

fn parse_error(
    source: &str,
    position: usize,
    resource: &str,
    error: quick_xml::Error,
) -> BeansError {
    xml_error(resource, line_at(source, position), error.to_string())
}

fn xml_error(resource: &str, line: usize, message: impl Into<String>) -> BeansError {
    BeansError::XmlParse {
        resource: resource.to_string(),
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_and_text() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- header -->
<beans xmlns="http://www.springframework.org/schema/beans"
       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <bean id="a" class="com.example.A">
    <property name="text"><value>a &amp; b</value></property>
    <property name="raw"><value><![CDATA[<raw>]]></value></property>
  </bean>
</beans>"#,
            "inline",
        )
        .unwrap();

        assert_eq!(root.name, "beans");
        assert!(root.attributes.is_empty());
        let bean = root.first_child("bean").unwrap();
        assert_eq!(bean.attribute("id"), Some("a"));
        assert_eq!(bean.line, 5);

        let values: Vec<String> = bean
            .child_elements()
            .map(|p| p.first_child("value").unwrap().text())
            .collect();
        assert_eq!(values, vec!["a & b", "<raw>"]);
    }

    #[test]
    fn test_prefixed_elements_use_local_name() {
        let root = parse_document(
            r#"<b:beans xmlns:b="urn:beans"><b:bean b:id="x" id="y"/></b:beans>"#,
            "inline",
        )
        .unwrap();
        assert_eq!(root.name, "beans");
        let bean = root.first_child("bean").unwrap();
        assert_eq!(bean.attributes, vec![("id".to_string(), "y".to_string())]);
    }

    #[test]
    fn test_malformed_documents() {
        let cases = [
            ("", "缺少根元素"),
            ("<beans>", ""),
            ("<beans><bean></beans>", ""),
            ("<beans/><beans/>", "多余"),
            ("text<beans/>", "文本"),
            ("<beans a=\"1\" a=\"2\"/>", ""),
        ];
        for (source, expected) in cases {
            let error = parse_document(source, "inline").unwrap_err();
            match error {
                BeansError::XmlParse { message, .. } => {
                    assert!(message.contains(expected), "{source}: {message}")
                }
                other => panic!("{source}: unexpected error {other}"),
            }
        }
    }

    #[test]
    fn test_error_reports_line() {
        let error = parse_document("<beans>\n  <bean>\n  </beans>\n", "inline").unwrap_err();
        match error {
            BeansError::XmlParse { line, resource, .. } => {
                assert_eq!(line, 3);
                assert_eq!(resource, "inline");
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
