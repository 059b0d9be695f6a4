//! XMLMC parameter envelope builder
//!
//! Parameters are accumulated as a flat XML fragment through ordered calls.
//! The fragment is not a tree: opening and closing tags are appended as text
//! and nesting is not checked unless the caller asks for it through
//! [`ParamBuilder::is_balanced`].
//!
//! # Examples
//!
//! ```
//! use xmlmc::params::ParamBuilder;
//!
//! let mut params = ParamBuilder::new();
//! params.set_param("stage", "1").unwrap();
//! assert_eq!(params.get_param(), "<params><stage>1</stage></params>");
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, XmlmcError};

/// Error text for an empty parameter name.
pub const PARAM_NAME_EMPTY: &str = "Name Must contain at least one letter or number";
/// Error text for a parameter name with characters outside `[A-Za-z0-9_]`.
pub const PARAM_NAME_INVALID: &str = "Name invalid only Numbers and letters can be used";
/// Error text for an empty element name.
pub const ELEMENT_NAME_EMPTY: &str = "Element must have at least one letter or number";
/// Error text for an element name with characters outside `[A-Za-z0-9_]`.
pub const ELEMENT_NAME_INVALID: &str = "Element invalid only Numbers and letters can be used";
/// Error text for a value that cannot be represented as XML text.
pub const VALUE_NOT_ENCODABLE: &str = "Could not clean the varValue input";

/// Shared identifier pattern, compiled once and never mutated.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]*$").expect("identifier pattern is valid"))
}

/// Returns `true` when `name` is a usable tag name.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_pattern().is_match(name)
}

/// Which kind of name is being validated; selects the error wording.
#[derive(Debug, Clone, Copy)]
enum NameKind {
    Param,
    Element,
}

fn validate_name(name: &str, kind: NameKind) -> Result<()> {
    let (empty, invalid) = match kind {
        NameKind::Param => (PARAM_NAME_EMPTY, PARAM_NAME_INVALID),
        NameKind::Element => (ELEMENT_NAME_EMPTY, ELEMENT_NAME_INVALID),
    };
    if name.is_empty() {
        return Err(XmlmcError::Validation(empty.to_string()).into());
    }
    if !identifier_pattern().is_match(name) {
        return Err(XmlmcError::Validation(invalid.to_string()).into());
    }
    Ok(())
}

/// Character allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Escapes `value` for use as XML character data or a quoted attribute value.
///
/// `&`, `<`, `>`, both quote characters and the whitespace control
/// characters are replaced with entity or numeric references, so decoding
/// the result yields `value` exactly.
///
/// # Errors
///
/// Returns [`XmlmcError::Encoding`] if `value` contains a character that
/// XML 1.0 cannot represent (for example NUL).
pub fn escape_text(value: &str) -> Result<String> {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\t' => escaped.push_str("&#x9;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => return Err(XmlmcError::Encoding(VALUE_NOT_ENCODABLE.to_string()).into()),
        }
    }
    Ok(escaped)
}

/// An attribute placed on the opening tag of a parameter.
///
/// The value is written verbatim; escaping it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute value, emitted unescaped
    pub value: String,
}

impl ParamAttribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Accumulates the parameter fragment of one XMLMC call.
#[derive(Debug, Clone, Default)]
pub struct ParamBuilder {
    fragment: String,
    open: Vec<String>,
    mismatched: bool,
}

impl ParamBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `<name>escaped-value</name>`.
    ///
    /// # Errors
    ///
    /// Returns [`XmlmcError::Validation`] for an empty or invalid name and
    /// [`XmlmcError::Encoding`] when the value cannot be escaped. The
    /// fragment is left unchanged on error.
    pub fn set_param(&mut self, name: &str, value: &str) -> Result<()> {
        validate_name(name, NameKind::Param)?;
        let cleaned = escape_text(value)?;
        self.fragment.push('<');
        self.fragment.push_str(name);
        self.fragment.push('>');
        self.fragment.push_str(&cleaned);
        self.push_close_tag(name);
        Ok(())
    }

    /// Appends `<name k="v" ...>escaped-value</name>` with attributes in the
    /// order given.
    ///
    /// # Errors
    ///
    /// Same as [`ParamBuilder::set_param`].
    pub fn set_param_with_attributes(
        &mut self,
        name: &str,
        value: &str,
        attributes: &[ParamAttribute],
    ) -> Result<()> {
        validate_name(name, NameKind::Param)?;
        let cleaned = escape_text(value)?;
        self.fragment.push('<');
        self.fragment.push_str(name);
        for attribute in attributes {
            self.fragment.push(' ');
            self.fragment.push_str(&attribute.name);
            self.fragment.push_str("=\"");
            self.fragment.push_str(&attribute.value);
            self.fragment.push('"');
        }
        self.fragment.push('>');
        self.fragment.push_str(&cleaned);
        self.push_close_tag(name);
        Ok(())
    }

    /// Appends a bare opening tag `<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`XmlmcError::Validation`] for an empty or invalid name.
    pub fn open_element(&mut self, name: &str) -> Result<()> {
        validate_name(name, NameKind::Element)?;
        self.fragment.push('<');
        self.fragment.push_str(name);
        self.fragment.push('>');
        self.open.push(name.to_string());
        Ok(())
    }

    /// Appends a bare closing tag `</name>`.
    ///
    /// No check is made that `name` matches the last opened element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlmcError::Validation`] for an empty or invalid name.
    pub fn close_element(&mut self, name: &str) -> Result<()> {
        validate_name(name, NameKind::Element)?;
        self.push_close_tag(name);
        match self.open.last() {
            Some(top) if top == name => {
                self.open.pop();
            }
            _ => self.mismatched = true,
        }
        Ok(())
    }

    /// Current fragment wrapped in `<params>...</params>`.
    pub fn get_param(&self) -> String {
        format!("<params>{}</params>", self.fragment)
    }

    /// Raw accumulated fragment without the `<params>` wrapper.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Whether no parameters have been added since the last reset.
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Whether every opened element was closed in order.
    pub fn is_balanced(&self) -> bool {
        !self.mismatched && self.open.is_empty()
    }

    /// Names of elements opened but not yet closed, outermost first.
    pub fn unclosed_elements(&self) -> &[String] {
        &self.open
    }

    /// Reset the fragment to empty.
    pub fn clear_param(&mut self) {
        self.fragment.clear();
        self.open.clear();
        self.mismatched = false;
    }

    fn push_close_tag(&mut self, name: &str) {
        self.fragment.push_str("</");
        self.fragment.push_str(name);
        self.fragment.push('>');
    }
}
