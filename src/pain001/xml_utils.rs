use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::PainError;
use crate::core::amount::format_amount;

pub type XmlResult = Result<Vec<u8>, PainError>;

fn xml_io(e: std::io::Error) -> PainError {
    PainError::Xml(format!("XML write error: {e}"))
}

/// Thin element writer over `quick_xml::Writer`. Every element it writes is
/// either a container or carries text; empty leaves are never produced.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// Start a document with the `utf-8` declaration. `indent == 0` writes
    /// everything on one line.
    pub fn new(indent: usize) -> Result<Self, PainError> {
        let buf = Cursor::new(Vec::new());
        let mut writer = if indent == 0 {
            Writer::new(buf)
        } else {
            Writer::new_with_indent(buf, b' ', indent)
        };
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, PainError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, PainError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, PainError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// Only `<`, `>` and `&` are escaped; quotes stay literal.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, PainError> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    /// Write `name` only when `text` is present and not blank.
    pub fn optional_text_element(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, PainError> {
        match text.filter(|t| !t.trim().is_empty()) {
            Some(t) => self.text_element(name, t),
            None => Ok(self),
        }
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, PainError> {
        self.start_element_with_attrs(name, attrs)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    /// `<name Ccy="EUR">1234.50</name>`
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, PainError> {
        self.text_element_with_attrs(name, &format_amount(amount), &[("Ccy", currency)])
    }

    /// Open each element of `path` in turn.
    pub fn open_path(&mut self, path: &[&str]) -> Result<&mut Self, PainError> {
        for name in path {
            self.start_element(name)?;
        }
        Ok(self)
    }

    /// Close the elements of `path`, innermost first.
    pub fn close_path(&mut self, path: &[&str]) -> Result<&mut Self, PainError> {
        for name in path.iter().rev() {
            self.end_element(name)?;
        }
        Ok(self)
    }

    /// `<a><b><c>text</c></b></a>` for `path = [a, b, c]`.
    pub fn nested_text(&mut self, path: &[&str], text: &str) -> Result<&mut Self, PainError> {
        let Some((leaf, parents)) = path.split_last() else {
            return Ok(self);
        };
        self.open_path(parents)?;
        self.text_element(leaf, text)?;
        self.close_path(parents)
    }

    fn write_text(&mut self, text: &str) -> Result<(), PainError> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(xml_io)
    }
}
