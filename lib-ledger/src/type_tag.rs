//! Structured type-tag parsing.
//!
//! Remote objects print their type as `package::module::name`, optionally
//! with a single generic parameter (`package::module::name<inner>`). The
//! treasury's coin type is recovered from that printed form, so this module
//! parses the grammar properly instead of pattern-extracting substrings.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed type tag: `package::module::name` with an optional generic
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub package: String,
    pub module: String,
    pub name: String,
    pub type_param: Option<Box<TypeTag>>,
}

impl TypeTag {
    pub fn parse(input: &str) -> LedgerResult<Self> {
        let mut parser = Parser::new(input);
        let tag = parser.parse_tag()?;
        parser.expect_end()?;
        Ok(tag)
    }

    /// True if package, module, and name all match. The generic parameter is
    /// deliberately ignored so callers can match a type family.
    pub fn matches(&self, package: &str, module: &str, name: &str) -> bool {
        self.package == package && self.module == module && self.name == name
    }

    /// True if module and name match, regardless of the publishing package.
    /// Used when scanning deployment receipts, where the package id is the
    /// unknown being discovered.
    pub fn matches_entry(&self, module: &str, name: &str) -> bool {
        self.module == module && self.name == name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.name)?;
        if let Some(param) = &self.type_param {
            write!(f, "<{}>", param)?;
        }
        Ok(())
    }
}

impl FromStr for TypeTag {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::parse(s)
    }
}

impl Serialize for TypeTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TypeTag::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Recursive-descent parser over the type-tag grammar:
///
/// ```text
/// tag     := segment "::" segment "::" segment generic?
/// generic := "<" tag ">"
/// segment := (alnum | "_")+   -- the package segment also allows a 0x prefix
/// ```
struct Parser<'a> {
    input: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            rest: input.trim(),
        }
    }

    fn err(&self, reason: impl Into<String>) -> LedgerError {
        LedgerError::TypeTag {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_tag(&mut self) -> LedgerResult<TypeTag> {
        let package = self.take_segment("package")?;
        self.take_separator()?;
        let module = self.take_segment("module")?;
        self.take_separator()?;
        let name = self.take_segment("type name")?;

        let type_param = if self.rest.starts_with('<') {
            self.rest = &self.rest[1..];
            let inner = self.parse_tag()?;
            if !self.rest.starts_with('>') {
                return Err(self.err("unclosed generic parameter"));
            }
            self.rest = &self.rest[1..];
            Some(Box::new(inner))
        } else {
            None
        };

        Ok(TypeTag {
            package,
            module,
            name,
            type_param,
        })
    }

    fn take_segment(&mut self, what: &str) -> LedgerResult<String> {
        let body = self.rest.strip_prefix("0x").unwrap_or(self.rest);
        let prefix_len = self.rest.len() - body.len();
        let ident_len = body
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(body.len());
        if ident_len == 0 {
            return Err(self.err(format!("empty {} segment", what)));
        }
        let total = prefix_len + ident_len;
        let segment = &self.rest[..total];
        if prefix_len > 0 && !body[..ident_len].chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.err(format!("0x-prefixed {} segment is not hex", what)));
        }
        self.rest = &self.rest[total..];
        Ok(segment.to_string())
    }

    fn take_separator(&mut self) -> LedgerResult<()> {
        if let Some(rest) = self.rest.strip_prefix("::") {
            self.rest = rest;
            Ok(())
        } else {
            Err(self.err("expected '::' separator"))
        }
    }

    fn expect_end(&mut self) -> LedgerResult<()> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(self.err(format!("trailing input '{}'", self.rest)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_tag() {
        let tag = TypeTag::parse("0x2::coin::Coin").unwrap();
        assert_eq!(tag.package, "0x2");
        assert_eq!(tag.module, "coin");
        assert_eq!(tag.name, "Coin");
        assert!(tag.type_param.is_none());
    }

    #[test]
    fn test_parse_generic_tag() {
        let tag = TypeTag::parse("0xabc::treasury::Treasury<0xdef::usdx::USDX>").unwrap();
        assert_eq!(tag.module, "treasury");
        assert_eq!(tag.name, "Treasury");
        let inner = tag.type_param.as_deref().unwrap();
        assert_eq!(inner.package, "0xdef");
        assert_eq!(inner.module, "usdx");
        assert_eq!(inner.name, "USDX");
    }

    #[test]
    fn test_parse_nested_generic() {
        let tag = TypeTag::parse("0x2::coin::TreasuryCap<0x2::coin::Coin<0xa::m::T>>").unwrap();
        let inner = tag.type_param.as_deref().unwrap();
        let innermost = inner.type_param.as_deref().unwrap();
        assert_eq!(innermost.package, "0xa");
        assert_eq!(innermost.name, "T");
    }

    #[test]
    fn test_display_round_trip() {
        let raw = "0xabc::treasury::Treasury<0xdef::usdx::USDX>";
        let tag = TypeTag::parse(raw).unwrap();
        assert_eq!(tag.to_string(), raw);
        assert_eq!(TypeTag::parse(&tag.to_string()).unwrap(), tag);
    }

    #[test]
    fn test_reject_missing_segment() {
        assert!(TypeTag::parse("0x2::coin").is_err());
        assert!(TypeTag::parse("::coin::Coin").is_err());
        assert!(TypeTag::parse("0x2::::Coin").is_err());
    }

    #[test]
    fn test_reject_unclosed_generic() {
        assert!(TypeTag::parse("0x2::coin::Coin<0xa::m::T").is_err());
    }

    #[test]
    fn test_reject_trailing_input() {
        assert!(TypeTag::parse("0x2::coin::Coin<0xa::m::T>junk").is_err());
    }

    #[test]
    fn test_underscore_names_are_valid() {
        // Names like `mint_cap::MintCap` must not be mis-split.
        let tag = TypeTag::parse("0x2::mint_cap::MintCap<0xa::usd_x::USD_X>").unwrap();
        assert_eq!(tag.module, "mint_cap");
        assert_eq!(tag.type_param.unwrap().module, "usd_x");
    }

    #[test]
    fn test_matches() {
        let tag = TypeTag::parse("0xabc::treasury::Treasury<0xdef::usdx::USDX>").unwrap();
        assert!(tag.matches("0xabc", "treasury", "Treasury"));
        assert!(tag.matches_entry("treasury", "Treasury"));
        assert!(!tag.matches("0xdef", "treasury", "Treasury"));
        assert!(!tag.matches_entry("treasury", "MintCap"));
    }
}
