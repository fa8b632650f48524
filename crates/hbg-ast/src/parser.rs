//! Front end for synthetic units
//!
//! A synthetic unit is the small program the extractor builds from a script:
//! an optional package line, imports, annotations with literal arguments and an
//! empty class declaration. The parser accepts exactly that shape and folds
//! annotation arguments to constant [`Literal`] values while parsing.

use smallvec::SmallVec;
use std::fmt;
use tracing::debug;

use crate::errors::ParseError;

/// Argument list of one annotation: `(field, value)` in source order
pub type Arguments = SmallVec<[(String, Literal); 8]>;

/// Field name a lone positional argument is bound to
pub const POSITIONAL_FIELD: &str = "value";

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "abstract",
    "final",
    "static",
    "strictfp",
];

/// Constant value of an annotation argument
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Reference to a named constant such as `Defaults.NAME`
    Name(String),
    List(Vec<Literal>),
}

impl Literal {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Literal::Str(s) => format!("string {:?}", s),
            Literal::Int(i) => format!("integer {}", i),
            Literal::Float(f) => format!("decimal {:?}", f),
            Literal::Bool(b) => format!("boolean {}", b),
            Literal::Name(n) => format!("reference {}", n),
            Literal::List(items) => format!("list of {} values", items.len()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Name(n) => f.write_str(n),
            Literal::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported name, ending in `.*` for on-demand imports
    pub path: String,
    pub alias: Option<String>,
}

impl Import {
    /// Name this import makes visible, if it is a single-type import
    pub fn visible_name(&self) -> Option<&str> {
        if let Some(alias) = &self.alias {
            return Some(alias);
        }
        if self.path.ends_with(".*") {
            return None;
        }
        self.path.rsplit('.').next()
    }

    /// Package of an on-demand import
    pub fn wildcard_package(&self) -> Option<&str> {
        self.path.strip_suffix(".*")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnnotation {
    /// Name as written, simple or dotted
    pub name: String,
    pub arguments: Arguments,
    pub line: usize,
}

/// Structure of a parsed synthetic unit
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub annotations: Vec<ParsedAnnotation>,
    pub class_name: String,
    pub class_line: usize,
}

/// Front-end state for one run.
///
/// Every unit is parsed on its own, so two scripts may declare the same
/// class name. Only the class of the current file is remembered, and
/// [`ParseContext::reset`] forgets it.
#[derive(Debug, Default)]
pub struct ParseContext {
    last_class: Option<String>,
    units_parsed: usize,
}

impl ParseContext {
    pub fn new() -> Self {
        ParseContext::default()
    }

    /// Forget the class of the previous file
    pub fn reset(&mut self) {
        self.last_class = None;
    }

    /// Class declared by the most recently parsed unit
    pub fn last_class(&self) -> Option<&str> {
        self.last_class.as_deref()
    }

    pub fn units_parsed(&self) -> usize {
        self.units_parsed
    }

    /// Tokenize and parse one synthetic unit
    pub fn parse_unit(&mut self, text: &str) -> Result<ParsedUnit, ParseError> {
        let tokens = Lexer::new(text).tokenize()?;
        let unit = Parser::new(tokens).unit()?;

        self.last_class = Some(unit.class_name.clone());
        self.units_parsed += 1;
        debug!(
            "Parsed synthetic unit for class {} with {} annotation(s)",
            unit.class_name,
            unit.annotations.len()
        );
        Ok(unit)
    }
}

// =============================================================================
// LEXER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Symbol(char),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{}'", name),
            Token::Str(_) => "string literal".to_string(),
            Token::Int(_) | Token::Float(_) => "number".to_string(),
            Token::Symbol(c) => format!("'{}'", c),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Lexed {
    token: Token,
    line: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Lexer {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, message)
    }

    fn tokenize(mut self) -> Result<Vec<Lexed>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let line = self.line;
            let Some(c) = self.peek() else {
                tokens.push(Lexed {
                    token: Token::Eof,
                    line,
                });
                return Ok(tokens);
            };

            let token = if c.is_alphabetic() || c == '_' || c == '$' {
                Token::Ident(self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '$'))
            } else if c.is_ascii_digit() {
                self.number()?
            } else if c == '\'' || c == '"' {
                self.string(c)?
            } else if "@.,;=+-*/()[]{}:<>?&".contains(c) {
                self.pos += 1;
                Token::Symbol(c)
            } else {
                return Err(self.error(format!("unexpected character {:?}", c)));
            };
            tokens.push(Lexed { token, line });
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some('\n'), _) => {
                    self.line += 1;
                    self.pos += 1;
                }
                (Some(c), _) if c.is_whitespace() => self.pos += 1,
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    let start_line = self.line;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (None, _) => {
                                return Err(ParseError::new(start_line, "unterminated comment"))
                            }
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some('\n'), _) => {
                                self.line += 1;
                                self.pos += 1;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.pos += 2;
            let digits = self.take_while(|c| c.is_ascii_hexdigit() || c == '_');
            if matches!(self.peek(), Some('l' | 'L' | 'i' | 'I' | 'g' | 'G')) {
                self.pos += 1;
            }
            let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
            return i64::from_str_radix(&cleaned, 16)
                .map(Token::Int)
                .map_err(|_| self.error(format!("invalid hexadecimal literal 0x{}", digits)));
        }

        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            is_float = true;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.push(e);
                if let (true, Some(sign)) = (signed, self.peek_at(1)) {
                    text.push(sign);
                }
                self.pos += digit_at;
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }

        match self.peek() {
            Some('d' | 'D' | 'f' | 'F') => {
                self.pos += 1;
                is_float = true;
            }
            Some('l' | 'L' | 'i' | 'I') if !is_float => self.pos += 1,
            Some('g' | 'G') => self.pos += 1,
            _ => {}
        }

        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        if is_float {
            cleaned
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(format!("invalid decimal literal {}", text)))
        } else {
            cleaned
                .parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.error(format!("integer literal out of range: {}", text)))
        }
    }

    fn string(&mut self, quote: char) -> Result<Token, ParseError> {
        let start_line = self.line;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(ParseError::new(start_line, "unterminated string literal"));
            };
            if c == quote {
                if !triple {
                    self.pos += 1;
                    break;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.pos += 3;
                    break;
                }
            }
            if c == '\n' && !triple {
                return Err(ParseError::new(start_line, "unterminated string literal"));
            }
            self.pos += 1;

            match c {
                '\\' => {
                    if let Some(escaped) = self.escape()? {
                        value.push(escaped);
                    }
                }
                '$' if quote == '"'
                    && self
                        .peek()
                        .is_some_and(|n| n == '{' || n.is_alphabetic() || n == '_') =>
                {
                    return Err(self.error("interpolated string is not a constant"));
                }
                '\n' => {
                    self.line += 1;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }
        Ok(Token::Str(value))
    }

    /// Character for the escape sequence after a backslash; `None` for a line
    /// continuation
    fn escape(&mut self) -> Result<Option<char>, ParseError> {
        let Some(c) = self.peek() else {
            return Err(self.error("unterminated escape sequence"));
        };
        self.pos += 1;
        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '0' => '\0',
            '\\' | '\'' | '"' | '$' => c,
            '\n' => {
                self.line += 1;
                return Ok(None);
            }
            'u' => {
                let hex: String = (0..4).filter_map(|i| self.peek_at(i)).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(format!("invalid unicode escape \\u{}", hex)))?;
                self.pos += 4;
                code
            }
            other => return Err(self.error(format!("invalid escape sequence \\{}", other))),
        };
        Ok(Some(escaped))
    }
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser {
    tokens: Vec<Lexed>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Lexed>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn lexed_at(&self, offset: usize) -> Option<&Lexed> {
        self.tokens
            .get(self.pos + offset)
            .or_else(|| self.tokens.last())
    }

    fn peek(&self) -> &Token {
        self.lexed_at(0).map_or(&Token::Eof, |l| &l.token)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.lexed_at(offset).map_or(&Token::Eof, |l| &l.token)
    }

    fn line(&self) -> usize {
        self.lexed_at(0).map_or(0, |l| l.line)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line(), message)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        self.error(format!(
            "expected {}, found {}",
            expected,
            self.peek().describe()
        ))
    }

    fn is_symbol(&self, c: char) -> bool {
        *self.peek() == Token::Symbol(c)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Ident(name) if name == keyword)
    }

    fn expect_symbol(&mut self, c: char) -> Result<(), ParseError> {
        if self.is_symbol(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", c)))
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.ident()?;
        while self.is_symbol('.') && matches!(self.peek_at(1), Token::Ident(_)) {
            self.advance();
            name.push('.');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn skip_semicolons(&mut self) {
        while self.is_symbol(';') {
            self.advance();
        }
    }

    fn unit(&mut self) -> Result<ParsedUnit, ParseError> {
        self.skip_semicolons();
        let package = if self.is_keyword("package") {
            self.advance();
            let name = self.qualified_name()?;
            self.skip_semicolons();
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.is_keyword("import") {
            imports.push(self.import()?);
        }

        let mut annotations = Vec::new();
        loop {
            if self.is_symbol('@') {
                annotations.push(self.annotation()?);
            } else if MODIFIERS.iter().any(|m| self.is_keyword(m)) {
                self.advance();
            } else {
                break;
            }
        }

        if !self.is_keyword("class") {
            return Err(self.unexpected("a class declaration"));
        }
        self.advance();
        let class_line = self.line();
        let class_name = self.ident()?;
        self.expect_symbol('{')?;
        self.expect_symbol('}')?;
        self.skip_semicolons();

        if *self.peek() != Token::Eof {
            return Err(self.unexpected("end of input"));
        }

        Ok(ParsedUnit {
            package,
            imports,
            annotations,
            class_name,
            class_line,
        })
    }

    fn import(&mut self) -> Result<Import, ParseError> {
        self.advance();
        if self.is_keyword("static") {
            self.advance();
        }
        let mut path = self.qualified_name()?;
        if self.is_symbol('.') {
            self.advance();
            self.expect_symbol('*')?;
            path.push_str(".*");
        }
        let alias = if self.is_keyword("as") {
            self.advance();
            Some(self.ident()?)
        } else {
            None
        };
        self.skip_semicolons();
        Ok(Import { path, alias })
    }

    fn annotation(&mut self) -> Result<ParsedAnnotation, ParseError> {
        let line = self.line();
        self.expect_symbol('@')?;
        let name = self.qualified_name()?;
        let mut arguments = Arguments::new();

        if self.is_symbol('(') {
            self.advance();
            let named = matches!(self.peek(), Token::Ident(_))
                && *self.peek_at(1) == Token::Symbol('=');
            if named {
                loop {
                    let field = self.ident()?;
                    self.expect_symbol('=')?;
                    let value = self.value()?;
                    arguments.push((field, value));
                    if !self.is_symbol(',') {
                        break;
                    }
                    self.advance();
                    if self.is_symbol(')') {
                        break;
                    }
                }
            } else if !self.is_symbol(')') {
                let value = self.value()?;
                arguments.push((POSITIONAL_FIELD.to_string(), value));
            }
            self.expect_symbol(')')?;
        }

        Ok(ParsedAnnotation {
            name,
            arguments,
            line,
        })
    }

    fn value(&mut self) -> Result<Literal, ParseError> {
        let mut left = self.term()?;
        while self.is_symbol('+') || self.is_symbol('-') {
            let line = self.line();
            let Token::Symbol(op) = self.advance() else {
                break;
            };
            let right = self.term()?;
            left = fold(op, left, right).map_err(|message| ParseError::new(line, message))?;
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Literal, ParseError> {
        let mut left = self.unary()?;
        while self.is_symbol('*') || self.is_symbol('/') {
            let line = self.line();
            let Token::Symbol(op) = self.advance() else {
                break;
            };
            let right = self.unary()?;
            left = fold(op, left, right).map_err(|message| ParseError::new(line, message))?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Literal, ParseError> {
        if self.is_symbol('-') {
            let line = self.line();
            self.advance();
            return match self.unary()? {
                Literal::Int(i) => i
                    .checked_neg()
                    .map(Literal::Int)
                    .ok_or_else(|| ParseError::new(line, "integer overflow")),
                Literal::Float(f) => Ok(Literal::Float(-f)),
                other => Err(ParseError::new(
                    line,
                    format!("cannot negate {}", other.describe()),
                )),
            };
        }
        if self.is_symbol('+') {
            self.advance();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Literal, ParseError> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(Literal::Str(s))
            }
            Token::Int(i) => {
                self.advance();
                Ok(Literal::Int(i))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Literal::Float(f))
            }
            Token::Ident(name) if name == "true" || name == "false" => {
                self.advance();
                Ok(Literal::Bool(name == "true"))
            }
            Token::Ident(_) => Ok(Literal::Name(self.qualified_name()?)),
            Token::Symbol(open @ ('[' | '{')) => {
                self.advance();
                let close = if open == '[' { ']' } else { '}' };
                let mut items = Vec::new();
                while !self.is_symbol(close) {
                    items.push(self.value()?);
                    if !self.is_symbol(',') {
                        break;
                    }
                    self.advance();
                }
                self.expect_symbol(close)?;
                Ok(Literal::List(items))
            }
            Token::Symbol('(') => {
                self.advance();
                let value = self.value()?;
                self.expect_symbol(')')?;
                Ok(value)
            }
            _ => Err(self.unexpected("a constant value")),
        }
    }
}

/// Fold a binary operation over two constants
fn fold(op: char, left: Literal, right: Literal) -> Result<Literal, String> {
    use Literal::{Float, Int, Str};

    let overflow = || "integer overflow".to_string();
    match (op, left, right) {
        ('+', Str(a), b) => Ok(Str(format!("{}{}", a, b))),
        ('+', a @ (Int(_) | Float(_) | Literal::Bool(_)), Str(b)) => Ok(Str(format!("{}{}", a, b))),
        ('+', Int(a), Int(b)) => a.checked_add(b).map(Int).ok_or_else(overflow),
        ('-', Int(a), Int(b)) => a.checked_sub(b).map(Int).ok_or_else(overflow),
        ('*', Int(a), Int(b)) => a.checked_mul(b).map(Int).ok_or_else(overflow),
        ('/', Int(_), Int(0)) => Err("division by zero".to_string()),
        ('/', Int(a), Int(b)) if a.checked_rem(b) == Some(0) => {
            a.checked_div(b).map(Int).ok_or_else(overflow)
        }
        (op, a @ (Int(_) | Float(_)), b @ (Int(_) | Float(_))) => {
            let (x, y) = (as_f64(&a), as_f64(&b));
            Ok(Float(match op {
                '+' => x + y,
                '-' => x - y,
                '*' => x * y,
                _ => x / y,
            }))
        }
        (op, a, b) => Err(format!(
            "cannot apply '{}' to {} and {}",
            op,
            a.describe(),
            b.describe()
        )),
    }
}

fn as_f64(literal: &Literal) -> f64 {
    match literal {
        Literal::Int(i) => *i as f64,
        Literal::Float(f) => *f,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ParsedUnit, ParseError> {
        ParseContext::new().parse_unit(text)
    }

    fn args(unit: &ParsedUnit, index: usize) -> Vec<(String, Literal)> {
        unit.annotations[index].arguments.to_vec()
    }

    #[test]
    fn test_parse_minimal_unit() -> Result<(), ParseError> {
        let unit = parse("import a.b.Updater;\n@Updater(name = 'x')\nclass Fix {}")?;
        assert_eq!(unit.package, None);
        assert_eq!(unit.imports[0].path, "a.b.Updater");
        assert_eq!(unit.imports[0].visible_name(), Some("Updater"));
        assert_eq!(unit.class_name, "Fix");
        assert_eq!(unit.class_line, 3);
        assert_eq!(
            args(&unit, 0),
            vec![("name".to_string(), Literal::Str("x".to_string()))]
        );
        Ok(())
    }

    #[test]
    fn test_parse_imports_package_and_modifiers() -> Result<(), ParseError> {
        let text = "package org.example;\nimport static a.B.C\nimport x.y.*\nimport p.Q as R\n@Deprecated public final class Fix {}\n";
        let unit = parse(text)?;
        assert_eq!(unit.package.as_deref(), Some("org.example"));
        assert_eq!(unit.imports.len(), 3);
        assert_eq!(unit.imports[1].wildcard_package(), Some("x.y"));
        assert_eq!(unit.imports[2].visible_name(), Some("R"));
        assert_eq!(unit.annotations[0].name, "Deprecated");
        Ok(())
    }

    #[test]
    fn test_literal_forms() -> Result<(), ParseError> {
        let text = r#"@A(s = """multi
line""", i = 1_000L, h = 0xFF, d = 2.5d, e = 1e3, neg = -4, b = true,
  list = ['a', "b",], arr = {1, 2}, cat = 'a' + "b" + 3, prod = 60 * 1000,
  ref = Defaults.NAME, esc = 'it\'s\tA')
class A {}"#;
        let unit = parse(text)?;
        let values: Vec<(String, Literal)> = args(&unit, 0);
        let get = |name: &str| {
            values
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("s"), Some(Literal::Str("multi\nline".to_string())));
        assert_eq!(get("i"), Some(Literal::Int(1000)));
        assert_eq!(get("h"), Some(Literal::Int(255)));
        assert_eq!(get("d"), Some(Literal::Float(2.5)));
        assert_eq!(get("e"), Some(Literal::Float(1000.0)));
        assert_eq!(get("neg"), Some(Literal::Int(-4)));
        assert_eq!(get("b"), Some(Literal::Bool(true)));
        assert_eq!(
            get("list"),
            Some(Literal::List(vec![
                Literal::Str("a".to_string()),
                Literal::Str("b".to_string())
            ]))
        );
        assert_eq!(
            get("arr"),
            Some(Literal::List(vec![Literal::Int(1), Literal::Int(2)]))
        );
        assert_eq!(get("cat"), Some(Literal::Str("ab3".to_string())));
        assert_eq!(get("prod"), Some(Literal::Int(60_000)));
        assert_eq!(get("ref"), Some(Literal::Name("Defaults.NAME".to_string())));
        assert_eq!(get("esc"), Some(Literal::Str("it's\tA".to_string())));
        Ok(())
    }

    #[test]
    fn test_division_folds() -> Result<(), ParseError> {
        let unit = parse("@A(half = 100 / 2, odd = 7 / 2, mixed = 60 * 1000 / 4 - 1, f = 1.5 / 3)\nclass A {}")?;
        let values = args(&unit, 0);
        assert_eq!(values[0].1, Literal::Int(50));
        assert_eq!(values[1].1, Literal::Float(3.5));
        assert_eq!(values[2].1, Literal::Int(14_999));
        assert_eq!(values[3].1, Literal::Float(0.5));
        Ok(())
    }

    #[test]
    fn test_positional_argument() -> Result<(), ParseError> {
        let unit = parse("@Grab('org:x:1')\n@Empty()\nclass A {}")?;
        assert_eq!(
            args(&unit, 0),
            vec![(
                POSITIONAL_FIELD.to_string(),
                Literal::Str("org:x:1".to_string())
            )]
        );
        assert!(unit.annotations[1].arguments.is_empty());
        Ok(())
    }

    #[test]
    fn test_syntax_errors_report_line() {
        let err = parse("@A(name = 'x'\nclass A {}").err();
        assert_eq!(err.map(|e| e.line), Some(2));

        assert!(parse("def x = 1\nclass A {}").is_err());
        assert!(parse("@A(name = \"${x}\")\nclass A {}").is_err());
        assert!(parse("@A(name = 'open\nclass A {}").is_err());
        assert!(parse("class A {}\nclass B {}").is_err());
        assert!(parse("@A(n = 1 / 0)\nclass A {}").is_err());
        assert!(parse("@A(n = 9223372036854775808)\nclass A {}").is_err());
        assert!(parse("@A\n").is_err());
    }

    #[test]
    fn test_comments_are_skipped() -> Result<(), ParseError> {
        let unit = parse("// header\n/* block\n @Fake */\n@A class /* x */ B {}")?;
        assert_eq!(unit.annotations.len(), 1);
        assert_eq!(unit.annotations[0].line, 4);
        assert_eq!(unit.class_name, "B");
        Ok(())
    }

    #[test]
    fn test_context_accepts_repeated_class_names() -> Result<(), ParseError> {
        let mut context = ParseContext::new();
        assert_eq!(context.last_class(), None);
        context.parse_unit("class Same {}")?;
        context.parse_unit("class Same {}")?;
        assert_eq!(context.last_class(), Some("Same"));
        assert_eq!(context.units_parsed(), 2);

        context.reset();
        assert_eq!(context.last_class(), None);
        assert!(context.parse_unit("class {}").is_err());
        assert_eq!(context.last_class(), None);
        assert_eq!(context.units_parsed(), 2);
        Ok(())
    }
}
