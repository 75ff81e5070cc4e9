// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Minimal XML-RPC codec for the Loopia API.
//!
//! Only what Loopia's zone record methods exchange is supported: scalar
//! strings, integers, booleans and doubles, plus arrays and structs of those.

use quick_xml::escape::partial_escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::errors::StoreError;

/// An XML-RPC value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Serialize a `methodCall` document.
///
/// Character data is escaped for `&`, `<` and `>` only; quotes are left as is.
#[must_use]
pub fn encode_method_call(method: &str, params: &[Value]) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(
        body,
        "<methodCall><methodName>{}</methodName><params>",
        partial_escape(method)
    );
    for param in params {
        body.push_str("<param>");
        encode_value(&mut body, param);
        body.push_str("</param>");
    }
    body.push_str("</params></methodCall>");
    body
}

fn encode_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => {
            let _ = write!(out, "<int>{i}</int>");
        }
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{d}</double>");
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", partial_escape(s.as_str()));
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", partial_escape(name.as_str()));
                encode_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Parse a `methodResponse` document into its single return value.
///
/// # Errors
///
/// Returns [`StoreError::Fault`] for fault responses and
/// [`StoreError::MalformedResponse`] for anything that is not a well-formed
/// XML-RPC response.
pub fn parse_method_response(body: &[u8]) -> Result<Value, StoreError> {
    let root = parse_document(body)?;
    if root.name != "methodResponse" {
        return Err(malformed(format!("unexpected root element <{}>", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| malformed("fault without value"))?;
        return Err(fault_from_value(&parse_value(value)?));
    }

    let value = root
        .child("params")
        .and_then(|params| params.child("param"))
        .and_then(|param| param.child("value"))
        .ok_or_else(|| malformed("response without params"))?;

    parse_value(value)
}

fn fault_from_value(value: &Value) -> StoreError {
    let Value::Struct(members) = value else {
        return malformed("fault value is not a struct");
    };

    StoreError::Fault {
        code: members
            .get("faultCode")
            .and_then(Value::as_i64)
            .unwrap_or_default(),
        message: members
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

fn parse_value(element: &Element) -> Result<Value, StoreError> {
    // Untyped values are strings
    let Some(typed) = element.children.first() else {
        return Ok(Value::String(element.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "string" => Ok(Value::String(typed.text.clone())),
        "int" | "i4" | "i8" => text
            .parse()
            .map(Value::Int)
            .map_err(|e| malformed(format!("invalid integer '{text}': {e}"))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(malformed(format!("invalid boolean '{other}'"))),
        },
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|e| malformed(format!("invalid double '{text}': {e}"))),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = typed
                .child("data")
                .ok_or_else(|| malformed("array without data"))?;
            data.children
                .iter()
                .filter(|child| child.name == "value")
                .map(parse_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|child| child.name == "member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| malformed("struct member without name"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| malformed("struct member without value"))?;
                members.insert(name.text.clone(), parse_value(value)?);
            }
            Ok(Value::Struct(members))
        }
        other => Err(malformed(format!("unsupported value type <{other}>"))),
    }
}

/// Bare XML element tree, enough to walk an XML-RPC response.
#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }
}

fn parse_document(body: &[u8]) -> Result<Element, StoreError> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(Element::new(e.local_name().as_ref())),
            Ok(Event::Empty(e)) => {
                let element = Element::new(e.local_name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => return Err(malformed("unexpected end of document")),
            Err(e) => return Err(malformed(e.to_string())),
            // Declarations, comments, processing instructions
            Ok(_) => {}
        }
        buf.clear();
    }
}

fn malformed(reason: impl Into<String>) -> StoreError {
    StoreError::MalformedResponse {
        reason: reason.into(),
    }
}

#[cfg(test)]
#[path = "xmlrpc_tests.rs"]
mod xmlrpc_tests;
