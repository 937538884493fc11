//! xml.rs: XML payloads.
//!
//! The document root is `<jobState>`; every field becomes a child element
//! with the same name as its JSON counterpart. Each entry of `parameters`
//! becomes a child element of `<parameters>` named after the parameter, so
//! a parameter whose name is not a valid XML name cannot be encoded and the
//! endpoint's delivery fails.
//!
//! Text is written so that any XML 1.0 reader gets it back unchanged:
//! carriage returns go out as character references (readers would otherwise
//! fold `\r\n` into `\n`), and characters XML 1.0 cannot carry at all, such
//! as the ESC of ANSI colour codes, are replaced with U+FFFD.
//!
//! Decoding reads events with text trimming off, so leading and trailing
//! whitespace (every tail log ends with a newline) survives the round trip.

use std::borrow::Cow;
use std::fmt;

use pn_model::{BuildState, JobState, Phase};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::WireError;

const ROOT_ELEMENT: &str = "jobState";

pub fn encode(state: &JobState) -> Result<Vec<u8>, WireError> {
    let build = &state.build;
    let mut out = Document::new();

    out.declaration()?;
    out.open(ROOT_ELEMENT)?;
    out.leaf("name", &state.name)?;
    out.leaf("url", &state.url)?;

    out.open("build")?;
    if let Some(full_url) = &build.full_url {
        out.leaf("fullUrl", full_url)?;
    }
    out.leaf("number", &build.number.to_string())?;
    out.leaf("phase", build.phase.as_str())?;
    if let Some(status) = &build.status {
        out.leaf("status", status)?;
    }
    out.leaf("url", &build.url)?;
    if let Some(display_name) = &build.display_name {
        out.leaf("displayName", display_name)?;
    }
    if let Some(parameters) = &build.parameters {
        out.open("parameters")?;
        for (name, value) in parameters {
            if !is_xml_name(name) {
                tracing::warn!(
                    "build parameter '{}' is not a valid XML element name; XML notification not sent",
                    name
                );
                return Err(WireError::Xml(format!(
                    "parameter name '{}' is not a valid XML element name",
                    name
                )));
            }
            out.leaf(name, value)?;
        }
        out.close("parameters")?;
    }
    out.leaf("log", &build.log)?;
    out.close("build")?;

    out.close(ROOT_ELEMENT)?;
    Ok(out.into_bytes())
}

pub fn decode(payload: &[u8]) -> Result<JobState, WireError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| WireError::Xml(format!("payload is not UTF-8: {}", e)))?;
    let root = read_tree(text)?;
    if root.name != ROOT_ELEMENT {
        return Err(WireError::Xml(format!(
            "root element is <{}>, expected <{}>",
            root.name, ROOT_ELEMENT
        )));
    }

    let build = root.required("build")?;
    let number = build
        .required("number")?
        .text
        .trim()
        .parse::<u64>()
        .map_err(|e| WireError::Xml(format!("invalid <number>: {}", e)))?;
    let phase = build
        .required("phase")?
        .text
        .trim()
        .parse::<Phase>()
        .map_err(WireError::Xml)?;

    Ok(JobState {
        name: root.required("name")?.text.clone(),
        url: root.required("url")?.text.clone(),
        build: BuildState {
            full_url: build.text_of("fullUrl"),
            number,
            phase,
            status: build.text_of("status"),
            url: build.required("url")?.text.clone(),
            display_name: build.text_of("displayName"),
            parameters: build.child("parameters").map(|parameters| {
                parameters
                    .children
                    .iter()
                    .map(|p| (p.name.clone(), p.text.clone()))
                    .collect()
            }),
            log: build.text_of("log").unwrap_or_default(),
        },
    })
}

fn xml_error(e: impl fmt::Display) -> WireError {
    WireError::Xml(e.to_string())
}

/// Element-at-a-time writer over an in-memory buffer.
struct Document {
    writer: Writer<Vec<u8>>,
}

impl Document {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn declaration(&mut self) -> Result<(), WireError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)
    }

    fn open(&mut self, name: &str) -> Result<(), WireError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_error)
    }

    fn close(&mut self, name: &str) -> Result<(), WireError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<(), WireError> {
        self.open(name)?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escape_text(text))))
            .map_err(xml_error)?;
        self.close(name)
    }

    fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn escape_text(text: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>' | '\r') || !is_xml_char(c);
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            c if !is_xml_char(c) => escaped.push(char::REPLACEMENT_CHARACTER),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// A parsed element: its name, its own text and its child elements.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required(&self, name: &str) -> Result<&Element, WireError> {
        self.child(name)
            .ok_or_else(|| WireError::Xml(format!("<{}> has no <{}> element", self.name, name)))
    }

    fn text_of(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.clone())
    }
}

fn element_name(start: &BytesStart<'_>) -> Result<String, WireError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(xml_error)
}

/// Read the document's root element. Whitespace-only text between child
/// elements ends up in the parent's `text` and is ignored by the caller.
fn read_tree(text: &str) -> Result<Element, WireError> {
    let mut reader = Reader::from_str(text);
    let mut open: Vec<Element> = Vec::new();

    loop {
        let finished = match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                open.push(Element {
                    name: element_name(&start)?,
                    ..Element::default()
                });
                None
            }
            Event::Empty(start) => Some(Element {
                name: element_name(&start)?,
                ..Element::default()
            }),
            Event::End(_) => match open.pop() {
                Some(element) => Some(element),
                None => return Err(WireError::Xml("unbalanced end tag".to_string())),
            },
            Event::Text(t) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&t.unescape().map_err(xml_error)?);
                }
                None
            }
            Event::CData(c) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&c.decode().map_err(xml_error)?);
                }
                None
            }
            Event::Eof => return Err(WireError::Xml("document has no root element".to_string())),
            _ => None,
        };

        if let Some(element) = finished {
            match open.last_mut() {
                Some(parent) => parent.children.push(element),
                None => return Ok(element),
            }
        }
    }
}
