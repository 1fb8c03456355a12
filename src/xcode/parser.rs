//! Reader for the OpenStep property-list dialect used by `project.pbxproj`.
//!
//! The grammar is small: dictionaries `{ key = value; }`, arrays
//! `( value, value, )` and strings, either bare or double-quoted. Comments
//! (`/* ... */` and `// ...`) may appear anywhere whitespace may.
use crate::error::ProjectError;

use super::value::{Dict, Value};

/// Parse manifest text into its top-level dictionary.
///
/// # Errors
///
/// Returns [`ProjectError::Parse`] with the 1-based line number of the first
/// token that does not fit the grammar.
pub fn parse(text: &str) -> Result<Dict, ProjectError> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    match parser.parse_value()? {
        Value::Dict(dict) => {
            parser.skip_trivia()?;
            if parser.peek().is_some() {
                return Err(parser.error("unexpected content after top-level dictionary"));
            }
            Ok(dict)
        }
        Value::String(_) | Value::Array(_) => {
            Err(parser.error("top-level value must be a dictionary"))
        }
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
    line: usize,
}

/// Bytes that terminate a bare (unquoted) string.
const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'{' | b'}' | b'(' | b')' | b';' | b'=' | b',' | b'"'
    ) || b.is_ascii_whitespace()
}

impl<'a> Parser<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            text,
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> ProjectError {
        ProjectError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ProjectError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => {
                    self.bump();
                }
                (Some(b'/'), Some(b'*')) => {
                    let start_line = self.line;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(ProjectError::Parse {
                                    line: start_line,
                                    message: "unterminated comment".to_string(),
                                });
                            }
                        }
                    }
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, wanted: u8) -> Result<(), ProjectError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(b) if b == wanted => {
                self.bump();
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}', found '{}'",
                char::from(wanted),
                char::from(b)
            ))),
            None => Err(self.error(format!(
                "expected '{}', found end of input",
                char::from(wanted)
            ))),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ProjectError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(b'{') => self.parse_dict().map(Value::Dict),
            Some(b'(') => self.parse_array().map(Value::Array),
            Some(b'"') => self.parse_quoted().map(Value::String),
            Some(_) => self.parse_bare().map(Value::String),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dict(&mut self) -> Result<Dict, ProjectError> {
        self.expect(b'{')?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.bump();
                return Ok(dict);
            }
            let key = match self.parse_value()? {
                Value::String(key) => key,
                Value::Array(_) | Value::Dict(_) => {
                    return Err(self.error("dictionary key must be a string"));
                }
            };
            self.expect(b'=')?;
            let value = self.parse_value()?;
            self.expect(b';')?;
            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, ProjectError> {
        self.expect(b'(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b')') {
                self.bump();
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b')') => {}
                Some(b) => {
                    return Err(self.error(format!(
                        "expected ',' or ')' in array, found '{}'",
                        char::from(b)
                    )));
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_bare(&mut self) -> Result<String, ProjectError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_delimiter(b) || (b == b'/' && matches!(self.peek_at(1), Some(b'*' | b'/'))) {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a value"));
        }
        self.text
            .get(start..self.pos)
            .map(String::from)
            .ok_or_else(|| self.error("invalid UTF-8 boundary in bare string"))
    }

    fn parse_quoted(&mut self) -> Result<String, ProjectError> {
        let start_line = self.line;
        self.bump();
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(ProjectError::Parse {
                        line: start_line,
                        message: "unterminated quoted string".to_string(),
                    });
                }
                Some(b'"') => {
                    self.push_run(&mut out, run_start)?;
                    self.bump();
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.push_run(&mut out, run_start)?;
                    self.bump();
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn push_run(&self, out: &mut String, run_start: usize) -> Result<(), ProjectError> {
        let run = self
            .text
            .get(run_start..self.pos)
            .ok_or_else(|| self.error("invalid UTF-8 boundary in quoted string"))?;
        out.push_str(run);
        Ok(())
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), ProjectError> {
        match self.bump() {
            Some(b'n') => out.push('\n'),
            Some(b't') => out.push('\t'),
            Some(b'r') => out.push('\r'),
            Some(b'"') => out.push('"'),
            Some(b'\\') => out.push('\\'),
            Some(b'U') => {
                let digits = self
                    .text
                    .get(self.pos..self.pos + 4)
                    .ok_or_else(|| self.error("truncated \\U escape"))?;
                let code = u32::from_str_radix(digits, 16)
                    .map_err(|_| self.error(format!("invalid \\U escape '{digits}'")))?;
                let ch = char::from_u32(code)
                    .ok_or_else(|| self.error(format!("invalid code point U+{digits}")))?;
                out.push(ch);
                self.pos += 4;
            }
            Some(other) => {
                out.push('\\');
                out.push(char::from(other));
            }
            None => return Err(self.error("unterminated escape")),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::xcode::value::{get_str, get_str_array};

    #[test]
    fn parses_header_comments_and_nested_values() {
        let text = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	objects = {

/* Begin PBXGroup section */
		AAA /* Fonts */ = {
			isa = PBXGroup;
			children = (
				BBB /* a.ttf */,
			);
			name = Fonts;
			sourceTree = "<group>";
		};
/* End PBXGroup section */
	};
	rootObject = CCC /* Project object */;
}
"#;
        let root = parse(text).expect("parse");
        assert_eq!(get_str(&root, "archiveVersion"), Some("1"));
        assert_eq!(get_str(&root, "rootObject"), Some("CCC"));
        let objects = root["objects"].as_dict().expect("objects dict");
        let group = objects["AAA"].as_dict().expect("group dict");
        assert_eq!(get_str(group, "isa"), Some("PBXGroup"));
        assert_eq!(get_str(group, "sourceTree"), Some("<group>"));
        assert_eq!(get_str_array(group, "children"), vec!["BBB"]);
    }

    #[test]
    fn parses_escapes_in_quoted_strings() {
        let root = parse(r#"{ a = "say \"hi\"\n\tnow\\"; b = "\U00e9t\U00e9"; }"#).expect("parse");
        assert_eq!(get_str(&root, "a"), Some("say \"hi\"\n\tnow\\"));
        assert_eq!(get_str(&root, "b"), Some("été"));
    }

    #[test]
    fn bare_strings_allow_paths_and_dots() {
        let root = parse("{ path = MyApp/Fonts/Inter.ttf; type = file.assetcatalog; }").unwrap();
        assert_eq!(get_str(&root, "path"), Some("MyApp/Fonts/Inter.ttf"));
        assert_eq!(get_str(&root, "type"), Some("file.assetcatalog"));
    }

    #[test]
    fn arrays_without_trailing_comma() {
        let root = parse("{ list = (a, b); empty = (); }").unwrap();
        assert_eq!(get_str_array(&root, "list"), vec!["a", "b"]);
        assert!(get_str_array(&root, "empty").is_empty());
    }

    #[test]
    fn key_order_is_preserved() {
        let root = parse("{ z = 1; a = 2; m = 3; }").unwrap();
        let keys: Vec<&str> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn missing_semicolon_reports_line() {
        let err = parse("{\n a = 1;\n b = 2\n}").unwrap_err();
        match err {
            ProjectError::Parse { line, message } => {
                assert_eq!(line, 4);
                assert!(message.contains("';'"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            parse("{ a = \"open; }"),
            Err(ProjectError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn top_level_must_be_dictionary() {
        assert!(parse("(a, b)").is_err());
        assert!(parse("{ } trailing").is_err());
    }
}
