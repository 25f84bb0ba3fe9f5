//! # Input Grammar
//!
//! Turns the compact option strings into typed records.
//!
//! ## Schema
//!
//! ```text
//! title:string:unique  amount:decimal.5.2:default.0  price:decimal(8, 2):nullable
//! ```
//!
//! Records are separated by whitespace or commas. Each record is a list of
//! `:`-separated calls; the first call carries the column name. A call takes
//! its arguments either dot-separated (`decimal.5.2`) or in parentheses
//! (`decimal(5, 2)`). Arguments are kept verbatim.
//!
//! ## Foreign keys
//!
//! ```text
//! user_id  author_id:id:people:cascade  [tenant_id,user_id]:::restrict:cascade
//! ```
//!
//! Each record is `name[:column[:table[:on_delete[:on_update]]]]`; empty
//! segments are absent. A bracketed name declares a composite key.
//!
//! Quotes and brackets protect separators everywhere. No semantic checks
//! happen here: a column without a type parses fine and is rejected later
//! by validation.

use migrant_core::{ColumnSpec, ForeignKeySpec, GenError, GenResult, KeyName, TypeCall};
use serde::Serialize;

/// Maximum number of `:` segments in a foreign key record.
const KEY_SEGMENTS: usize = 5;

// ============================================================================
// Public API
// ============================================================================

/// Which record shape a raw option string holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Schema,
    ForeignKeys,
}

impl ParseMode {
    /// Name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ParseMode::Schema => "schema",
            ParseMode::ForeignKeys => "foreign-keys",
        }
    }
}

impl std::str::FromStr for ParseMode {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schema" => Ok(ParseMode::Schema),
            "keys" | "foreign-keys" => Ok(ParseMode::ForeignKeys),
            other => Err(GenError::validation(format!(
                "Unknown parse mode '{}' (expected 'schema' or 'foreign-keys')",
                other
            ))),
        }
    }
}

/// Parsed records of either shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedValue {
    Columns(Vec<ColumnSpec>),
    Keys(Vec<ForeignKeySpec>),
}

impl ParsedValue {
    /// Number of parsed records
    pub fn record_count(&self) -> usize {
        match self {
            ParsedValue::Columns(c) => c.len(),
            ParsedValue::Keys(k) => k.len(),
        }
    }
}

/// Parse a raw option string in the given mode.
///
/// Returns `Ok(None)` when the string is empty or blank (flag not given).
pub fn parse_value(raw: &str, mode: ParseMode) -> GenResult<Option<ParsedValue>> {
    Ok(match mode {
        ParseMode::Schema => parse_schema(raw)?.map(ParsedValue::Columns),
        ParseMode::ForeignKeys => parse_foreign_keys(raw)?.map(ParsedValue::Keys),
    })
}

/// Parse a schema string into column records.
pub fn parse_schema(raw: &str) -> GenResult<Option<Vec<ColumnSpec>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let grammar = Grammar::new("schema", raw);
    let columns = grammar
        .records()?
        .into_iter()
        .map(|record| grammar.column(record))
        .collect::<GenResult<Vec<_>>>()?;

    tracing::debug!(columns = columns.len(), "parsed schema");
    Ok(Some(columns))
}

/// Parse a foreign keys string into key records.
pub fn parse_foreign_keys(raw: &str) -> GenResult<Option<Vec<ForeignKeySpec>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let grammar = Grammar::new("foreign-keys", raw);
    let keys = grammar
        .records()?
        .into_iter()
        .map(|record| grammar.foreign_key(record))
        .collect::<GenResult<Vec<_>>>()?;

    tracing::debug!(keys = keys.len(), "parsed foreign keys");
    Ok(Some(keys))
}

/// Split a comma-separated additions string into method names.
///
/// Entries are trimmed; blank entries are dropped.
pub fn parse_additionals(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// Pre-parsed (JSON) input
// ============================================================================

/// Parse a JSON array of records, as passed with `--parsed`.
pub fn parse_json_value(raw: &str, mode: ParseMode) -> GenResult<Option<ParsedValue>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(match mode {
        ParseMode::Schema => ParsedValue::Columns(serde_json::from_str(raw)?),
        ParseMode::ForeignKeys => ParsedValue::Keys(serde_json::from_str(raw)?),
    }))
}

/// Parse a JSON array of addition names, as passed with `--parsed`.
pub fn parse_json_additionals(raw: &str) -> GenResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

// ============================================================================
// Grammar internals
// ============================================================================

/// A slice of the raw input with its absolute byte offset.
#[derive(Debug, Clone, Copy)]
struct Segment<'a> {
    offset: usize,
    text: &'a str,
}

impl<'a> Segment<'a> {
    fn trimmed(self) -> Self {
        let start = self.text.len() - self.text.trim_start().len();
        Segment {
            offset: self.offset + start,
            text: self.text.trim(),
        }
    }

    fn slice(self, start: usize, end: usize) -> Self {
        Segment {
            offset: self.offset + start,
            text: &self.text[start..end],
        }
    }
}

struct Grammar<'r> {
    what: &'static str,
    raw: &'r str,
}

impl<'r> Grammar<'r> {
    fn new(what: &'static str, raw: &'r str) -> Self {
        Self { what, raw }
    }

    fn error(&self, position: usize, msg: impl Into<String>) -> GenError {
        GenError::parse(self.what, self.raw, position, msg)
    }

    fn whole(&self) -> Segment<'r> {
        Segment {
            offset: 0,
            text: self.raw,
        }
    }

    /// Non-empty records, split on whitespace and commas.
    fn records(&self) -> GenResult<Vec<Segment<'r>>> {
        Ok(self
            .split(self.whole(), |c| c.is_whitespace() || c == ',')?
            .into_iter()
            .filter(|s| !s.text.is_empty())
            .collect())
    }

    /// Split on separators found outside quotes, parentheses and brackets.
    fn split<'a>(&self, seg: Segment<'a>, is_sep: impl Fn(char) -> bool) -> GenResult<Vec<Segment<'a>>> {
        let mut segments = Vec::new();
        let mut closers: Vec<(char, usize)> = Vec::new();
        let mut quote: Option<(char, usize)> = None;
        let mut start = 0;

        for (i, c) in seg.text.char_indices() {
            if let Some((q, _)) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '\'' | '"' => quote = Some((c, i)),
                '(' => closers.push((')', i)),
                '[' => closers.push((']', i)),
                ')' | ']' => match closers.pop() {
                    Some((expected, _)) if expected == c => {}
                    _ => return Err(self.error(seg.offset + i, format!("unexpected '{}'", c))),
                },
                _ if closers.is_empty() && is_sep(c) => {
                    segments.push(seg.slice(start, i));
                    start = i + c.len_utf8();
                }
                _ => {}
            }
        }

        if let Some((q, pos)) = quote {
            return Err(self.error(seg.offset + pos, format!("unterminated {} quote", q)));
        }
        if let Some((closer, pos)) = closers.pop() {
            return Err(self.error(seg.offset + pos, format!("missing closing '{}'", closer)));
        }

        segments.push(seg.slice(start, seg.text.len()));
        Ok(segments)
    }

    fn identifier(&self, seg: Segment<'_>) -> GenResult<String> {
        let seg = seg.trimmed();
        if seg.text.is_empty() {
            return Err(self.error(seg.offset, "expected identifier"));
        }
        if let Some((i, c)) = seg.text.char_indices().find(|(_, c)| !is_ident_char(*c)) {
            return Err(self.error(
                seg.offset + i,
                format!("unexpected character '{}' in identifier", c),
            ));
        }
        Ok(seg.text.to_string())
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    fn column(&self, record: Segment<'_>) -> GenResult<ColumnSpec> {
        let calls = self
            .split(record, |c| c == ':')?
            .into_iter()
            .map(|part| self.call(part))
            .collect::<GenResult<Vec<_>>>()?;
        Ok(ColumnSpec { calls })
    }

    /// `name`, `name.arg.arg` or `name(arg, arg)`
    fn call(&self, part: Segment<'_>) -> GenResult<TypeCall> {
        let part = part.trimmed();
        let name_end = part
            .text
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(part.text.len());
        let name = self.identifier(part.slice(0, name_end))?;
        let rest = part.slice(name_end, part.text.len());

        let args = match rest.text.chars().next() {
            None => Vec::new(),
            Some('(') => {
                if !rest.text.ends_with(')') {
                    return Err(self.error(
                        rest.offset + rest.text.len(),
                        format!("expected ')' to close the arguments of '{}'", name),
                    ));
                }
                let inner = rest.slice(1, rest.text.len() - 1);
                if inner.text.trim().is_empty() {
                    Vec::new()
                } else {
                    self.arguments(inner, ',')?
                }
            }
            Some('.') => self.arguments(rest.slice(1, rest.text.len()), '.')?,
            Some(c) => {
                return Err(self.error(
                    rest.offset,
                    format!("unexpected character '{}' after '{}'", c, name),
                ));
            }
        };

        Ok(TypeCall { name, args })
    }

    fn arguments(&self, seg: Segment<'_>, sep: char) -> GenResult<Vec<String>> {
        self.split(seg, |c| c == sep)?
            .into_iter()
            .map(|arg| {
                let arg = arg.trimmed();
                if arg.text.is_empty() {
                    Err(self.error(arg.offset, "empty argument"))
                } else {
                    Ok(arg.text.to_string())
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Foreign keys
    // ------------------------------------------------------------------

    fn foreign_key(&self, record: Segment<'_>) -> GenResult<ForeignKeySpec> {
        let segments = self.split(record, |c| c == ':')?;
        if segments.len() > KEY_SEGMENTS {
            return Err(self.error(
                segments[KEY_SEGMENTS].offset,
                format!(
                    "too many segments (expected name:column:table:on_delete:on_update, got {})",
                    segments.len()
                ),
            ));
        }

        let mut optional = segments[1..]
            .iter()
            .map(|s| self.attribute(*s))
            .collect::<GenResult<Vec<_>>>()?
            .into_iter();

        Ok(ForeignKeySpec {
            name: self.key_name(segments[0])?,
            column: optional.next().flatten(),
            table: optional.next().flatten(),
            on_delete: optional.next().flatten(),
            on_update: optional.next().flatten(),
        })
    }

    fn key_name(&self, seg: Segment<'_>) -> GenResult<KeyName> {
        let seg = seg.trimmed();
        if seg.text.starts_with('[') {
            if !seg.text.ends_with(']') {
                return Err(self.error(
                    seg.offset + seg.text.len(),
                    "expected ']' to close the composite key",
                ));
            }
            let names = self
                .split(seg.slice(1, seg.text.len() - 1), |c| c == ',')?
                .into_iter()
                .map(|s| self.identifier(s))
                .collect::<GenResult<Vec<_>>>()?;
            return Ok(KeyName::Composite(names));
        }
        Ok(KeyName::Single(self.identifier(seg)?))
    }

    /// An optional key attribute; surrounding quotes are stripped.
    fn attribute(&self, seg: Segment<'_>) -> GenResult<Option<String>> {
        let seg = seg.trimmed();
        let text = unquote(seg.text);
        if text.is_empty() {
            return Ok(None);
        }
        if text.contains(['(', ')', '[', ']']) {
            return Err(self.error(seg.offset, format!("unexpected value '{}'", seg.text)));
        }
        Ok(Some(text.to_string()))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn unquote(s: &str) -> &str {
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(raw: &str) -> Vec<ColumnSpec> {
        parse_schema(raw).unwrap().unwrap()
    }

    fn keys(raw: &str) -> Vec<ForeignKeySpec> {
        parse_foreign_keys(raw).unwrap().unwrap()
    }

    #[test]
    fn test_empty_input_is_absent() {
        assert_eq!(parse_schema("").unwrap(), None);
        assert_eq!(parse_schema("   ").unwrap(), None);
        assert_eq!(parse_foreign_keys("").unwrap(), None);
        assert_eq!(parse_value("", ParseMode::Schema).unwrap(), None);
    }

    #[test]
    fn test_schema_separators() {
        let cols = columns("title:string,body:text");
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].name(), "title");
        assert_eq!(cols[1].type_calls(), &[TypeCall::new("text")]);

        let cols = columns("  title:string   body:text , published:boolean ");
        let names: Vec<&str> = cols.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["title", "body", "published"]);
    }

    #[test]
    fn test_schema_dot_arguments() {
        let cols = columns("amount:decimal.5.2:default.0");
        assert_eq!(
            cols[0].type_calls(),
            &[
                TypeCall::with_args("decimal", ["5", "2"]),
                TypeCall::with_args("default", ["0"]),
            ]
        );
    }

    #[test]
    fn test_schema_paren_arguments() {
        let cols = columns("price:decimal(8, 2):nullable(), status:string:default('draft')");
        assert_eq!(cols.len(), 2);
        assert_eq!(
            cols[0].type_calls(),
            &[
                TypeCall::with_args("decimal", ["8", "2"]),
                TypeCall::new("nullable"),
            ]
        );
        assert_eq!(cols[1].type_calls()[1].args, vec!["'draft'"]);
    }

    #[test]
    fn test_quotes_protect_separators() {
        let cols = columns("opens:time:default('08:00, daily') name:string:after.'last.name'");
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].type_calls()[1].args, vec!["'08:00, daily'"]);
        assert_eq!(cols[1].type_calls()[1].args, vec!["'last.name'"]);
    }

    #[test]
    fn test_bare_column_parses() {
        let cols = columns("title");
        assert_eq!(cols[0].calls.len(), 1);
    }

    #[test]
    fn test_schema_errors() {
        let err = parse_schema("title:").unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("expected identifier"));

        let err = parse_schema("amount:decimal(5,2").unwrap_err();
        assert!(err.to_string().contains("missing closing ')'"));

        let err = parse_schema("name:string:default('x)").unwrap_err();
        assert!(err.to_string().contains("unterminated"));

        let err = parse_schema("amount:decimal.5..2").unwrap_err();
        assert!(err.to_string().contains("empty argument"));

        let err = parse_schema("bad-name:string").unwrap_err();
        assert!(err.to_string().contains("position 3"));
    }

    #[test]
    fn test_simple_foreign_key() {
        let k = keys("user_id");
        assert_eq!(k, vec![ForeignKeySpec::new("user_id")]);
    }

    #[test]
    fn test_foreign_key_segments() {
        let k = keys("author_id:id:people:cascade:restrict category_id::categories");
        assert_eq!(
            k[0],
            ForeignKeySpec::new("author_id")
                .references("id")
                .on("people")
                .on_delete("cascade")
                .on_update("restrict")
        );
        assert_eq!(k[1], ForeignKeySpec::new("category_id").on("categories"));
    }

    #[test]
    fn test_foreign_key_quoted_action() {
        let k = keys("owner_id:::'set null'");
        assert_eq!(k[0].on_delete.as_deref(), Some("set null"));
        assert_eq!(k[0].column, None);
        assert_eq!(k[0].table, None);
    }

    #[test]
    fn test_composite_foreign_key() {
        let k = keys("[tenant_id, user_id]:::cascade, post_id");
        assert_eq!(k.len(), 2);
        assert_eq!(
            k[0].name,
            KeyName::Composite(vec!["tenant_id".into(), "user_id".into()])
        );
        assert_eq!(k[0].on_delete.as_deref(), Some("cascade"));
        assert_eq!(k[1].name, KeyName::from("post_id"));
    }

    #[test]
    fn test_foreign_key_errors() {
        assert!(parse_foreign_keys("a:b:c:d:e:f").is_err());
        assert!(parse_foreign_keys(":id:users").is_err());
        assert!(parse_foreign_keys("[a_id,b_id").is_err());
    }

    #[test]
    fn test_parse_value_modes() {
        let v = parse_value("title:string", ParseMode::Schema).unwrap().unwrap();
        assert!(matches!(v, ParsedValue::Columns(ref c) if c.len() == 1));

        let v = parse_value("a_id b_id", ParseMode::ForeignKeys).unwrap().unwrap();
        assert_eq!(v.record_count(), 2);

        assert_eq!("keys".parse::<ParseMode>().unwrap(), ParseMode::ForeignKeys);
        assert!("nope".parse::<ParseMode>().is_err());
    }

    #[test]
    fn test_additionals() {
        assert_eq!(
            parse_additionals(" timestamps, softDeletes ,,rememberToken"),
            vec!["timestamps", "softDeletes", "rememberToken"]
        );
        assert!(parse_additionals("").is_empty());
    }

    #[test]
    fn test_json_input() {
        let json = r#"[[{"name":"title","args":[]},{"name":"string","args":[]}]]"#;
        let v = parse_json_value(json, ParseMode::Schema).unwrap().unwrap();
        assert_eq!(
            v,
            ParsedValue::Columns(vec![ColumnSpec::new("title").call(TypeCall::new("string"))])
        );

        let v = parse_json_value(r#"[{"name":"user_id","on_delete":"cascade"}]"#, ParseMode::ForeignKeys)
            .unwrap()
            .unwrap();
        assert_eq!(
            v,
            ParsedValue::Keys(vec![ForeignKeySpec::new("user_id").on_delete("cascade")])
        );

        assert_eq!(parse_json_value("", ParseMode::Schema).unwrap(), None);
        assert!(parse_json_value("{", ParseMode::Schema).unwrap_err().is_input());
        assert_eq!(
            parse_json_additionals(r#"["timestamps"]"#).unwrap(),
            vec!["timestamps"]
        );
    }
}
