//! Span-tracking scanner for boundary dictionary files.
//!
//! The scanner records the byte span of every literal it reads so the
//! patcher can splice new text into the original file without rewriting
//! unrelated content. Block comments, `//` line comments and `#` directive
//! lines are skipped but stay part of the surrounding text.

use std::ops::Range;
use std::path::Path;

use hearth_core::{ParseError, Value};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// A parsed value plus the spans needed to patch it in place.
#[derive(Debug)]
pub(crate) enum Literal {
    /// A single token (scalar, vector, word or switch).
    Token {
        /// Span of the token text.
        span: Range<usize>,
        /// The parsed value.
        value: Value,
    },
    /// A `nonuniform List<...>` literal. Only the final entry is kept as
    /// the representative value; the entry spans allow a bulk rewrite.
    List {
        /// Span of each list entry.
        entries: SmallVec<[Range<usize>; 4]>,
        /// The last entry's value.
        last: Value,
    },
}

impl Literal {
    pub(crate) fn value(&self) -> &Value {
        match self {
            Literal::Token { value, .. } => value,
            Literal::List { last, .. } => last,
        }
    }
}

/// The `internalField` clause.
#[derive(Debug)]
pub(crate) struct InternalField {
    /// Span of the `uniform ` keyword run, if present.
    pub uniform: Option<Range<usize>>,
    /// Where `uniform ` would be inserted (start of the value).
    pub value_start: usize,
    pub value: Literal,
}

/// One named entry inside a boundary block.
#[derive(Debug)]
pub(crate) struct Entry {
    pub uniform: Option<Range<usize>>,
    pub value_start: usize,
    pub value: Literal,
}

/// One named block inside `boundaryField`.
#[derive(Debug)]
pub(crate) struct Block {
    /// Span of the whole block including the name, its closing brace and
    /// the trailing newline run.
    pub span: Range<usize>,
    /// The block's `type` entry.
    pub kind: Option<String>,
    pub entries: IndexMap<String, Entry>,
}

/// Everything the patcher needs to know about one dictionary file.
#[derive(Debug)]
pub(crate) struct ParsedField {
    pub internal: Option<InternalField>,
    /// Byte offset of the `boundaryField` keyword.
    pub boundary_keyword: usize,
    /// Byte offset just past the `{` opening the boundaryField block.
    pub after_boundary_open: usize,
    pub blocks: IndexMap<String, Block>,
}

/// Parse a dictionary file into spans and values.
pub(crate) fn parse(src: &str, path: &Path) -> Result<ParsedField, ParseError> {
    let mut cur = Cursor { src, pos: 0 };
    let mut internal = None;
    let mut boundary = None;

    // Top-level scan: every clause is either `word ... ;` or `word { ... }`.
    loop {
        cur.skip_trivia();
        if cur.at_end() {
            break;
        }
        let (word, word_span) = cur.word();
        if word.is_empty() {
            // Stray delimiter at top level, step over it.
            cur.pos += 1;
            continue;
        }
        match word {
            "internalField" => {
                internal = Some(parse_internal(&mut cur)?);
            }
            "boundaryField" => {
                cur.skip_trivia();
                if !cur.eat(b'{') {
                    return Err(ParseError::MissingBoundaryField {
                        path: path.to_path_buf(),
                    });
                }
                let after_open = cur.pos;
                let blocks = parse_blocks(&mut cur)?;
                boundary = Some((word_span.start, after_open, blocks));
            }
            _ => {
                // FoamFile header, dimensions, anything else: skip the
                // clause without interpreting it.
                cur.skip_trivia();
                if cur.eat(b'{') {
                    cur.skip_balanced();
                } else {
                    cur.skip_to_semicolon();
                }
            }
        }
    }

    let (boundary_keyword, after_boundary_open, blocks) =
        boundary.ok_or_else(|| ParseError::MissingBoundaryField {
            path: path.to_path_buf(),
        })?;
    Ok(ParsedField {
        internal,
        boundary_keyword,
        after_boundary_open,
        blocks,
    })
}

fn parse_internal(cur: &mut Cursor<'_>) -> Result<InternalField, ParseError> {
    let (uniform, value_start, value) = parse_literal(cur, "internalField")?;
    Ok(InternalField {
        uniform,
        value_start,
        value,
    })
}

fn parse_blocks(cur: &mut Cursor<'_>) -> Result<IndexMap<String, Block>, ParseError> {
    let mut blocks = IndexMap::new();
    loop {
        cur.skip_trivia();
        if cur.eat(b'}') || cur.at_end() {
            break;
        }
        let line_start = cur.line_start();
        let (name, _) = cur.word();
        if name.is_empty() {
            cur.pos += 1;
            continue;
        }
        let name = name.to_string();
        cur.skip_trivia();
        if !cur.eat(b'{') {
            // Not a block (a stray directive token), skip the clause.
            cur.skip_to_semicolon();
            continue;
        }
        let mut kind = None;
        let mut entries = IndexMap::new();
        loop {
            cur.skip_trivia();
            if cur.eat(b'}') || cur.at_end() {
                break;
            }
            let (key, _) = cur.word();
            if key.is_empty() {
                cur.pos += 1;
                continue;
            }
            let key = key.to_string();
            let (uniform, value_start, value) = parse_literal(cur, &key)?;
            if key == "type" {
                if let Value::Word(w) = value.value() {
                    kind = Some(w.clone());
                }
            } else {
                entries.insert(
                    key,
                    Entry {
                        uniform,
                        value_start,
                        value,
                    },
                );
            }
        }
        let end = cur.trailing_newlines();
        blocks.insert(
            name,
            Block {
                span: line_start..end,
                kind,
                entries,
            },
        );
    }
    Ok(blocks)
}

type LiteralParts = (Option<Range<usize>>, usize, Literal);

/// Parse `[uniform] <token | (vec) | nonuniform List<...> N (...)> ;`.
fn parse_literal(cur: &mut Cursor<'_>, context: &str) -> Result<LiteralParts, ParseError> {
    cur.skip_trivia();
    let mut uniform = None;
    let mut start = cur.pos;
    if cur.peek_word() == "uniform" {
        let kw_start = cur.pos;
        cur.word();
        cur.skip_spaces();
        uniform = Some(kw_start..cur.pos);
        start = cur.pos;
    }

    let value = if cur.peek_word() == "nonuniform" {
        cur.word();
        cur.skip_trivia();
        let (list_kw, _) = cur.word();
        let vector = list_kw.contains("vector");
        cur.skip_trivia();
        // Optional element count before the parenthesized body.
        if cur.peek_word().parse::<usize>().is_ok() {
            cur.word();
            cur.skip_trivia();
        }
        if !cur.eat(b'(') {
            return Err(cur.bad_literal(context));
        }
        let mut entries: SmallVec<[Range<usize>; 4]> = SmallVec::new();
        let mut last = None;
        loop {
            cur.skip_trivia();
            if cur.eat(b')') || cur.at_end() {
                break;
            }
            if vector {
                let (span, v) = cur.vector().ok_or_else(|| cur.bad_literal(context))?;
                entries.push(span);
                last = Some(Value::Vector(v));
            } else {
                let (tok, span) = cur.word();
                let v: f64 = tok.parse().map_err(|_| cur.bad_literal(context))?;
                entries.push(span);
                last = Some(Value::Scalar(v));
            }
        }
        let last = last.ok_or_else(|| cur.bad_literal(context))?;
        Literal::List { entries, last }
    } else if cur.peek() == Some(b'(') {
        match cur.vector() {
            Some((span, v)) => Literal::Token {
                span,
                value: Value::Vector(v),
            },
            // Not a numeric triple: keep the raw text verbatim.
            None => cur.raw_to_semicolon(start),
        }
    } else {
        let (tok, span) = cur.word();
        if tok.is_empty() {
            return Err(cur.bad_literal(context));
        }
        let after = cur.pos;
        cur.skip_trivia();
        if cur.peek() == Some(b';') {
            Literal::Token {
                span,
                value: Value::from_token(tok),
            }
        } else {
            // Multi-token value, keep it verbatim up to the semicolon.
            cur.pos = after;
            cur.raw_to_semicolon(span.start)
        }
    };

    cur.skip_trivia();
    if !cur.eat(b';') {
        return Err(cur.bad_literal(context));
    }
    Ok((uniform, start, value))
}

// ── Cursor ───────────────────────────────────────────────────────

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip whitespace, `//` comments, `/* */` comments and `#` directive
    /// lines.
    fn skip_trivia(&mut self) {
        let bytes = self.src.as_bytes();
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.src[self.pos..].starts_with("//") || self.peek() == Some(b'#') {
                while self.peek().is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
            } else if self.src[self.pos..].starts_with("/*") {
                match self.src[self.pos..].find("*/") {
                    Some(off) => self.pos += off + 2,
                    None => self.pos = bytes.len(),
                }
            } else {
                return;
            }
        }
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') || self.peek() == Some(b'\t') {
            self.pos += 1;
        }
    }

    /// Read a word token: everything up to whitespace or a delimiter.
    fn word(&mut self) -> (&'a str, Range<usize>) {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'{' | b'}' | b'(' | b')' | b';'))
        {
            self.pos += 1;
        }
        (&self.src[start..self.pos], start..self.pos)
    }

    /// Peek the next word without consuming it.
    fn peek_word(&self) -> &'a str {
        let mut end = self.pos;
        let bytes = self.src.as_bytes();
        while end < bytes.len()
            && !bytes[end].is_ascii_whitespace()
            && !matches!(bytes[end], b'{' | b'}' | b'(' | b')' | b';')
        {
            end += 1;
        }
        &self.src[self.pos..end]
    }

    /// Parse `( x y z )` as a numeric triple. Restores the cursor and
    /// returns `None` if the parenthesized text is not one.
    fn vector(&mut self) -> Option<(Range<usize>, [f64; 3])> {
        let start = self.pos;
        if !self.eat(b'(') {
            return None;
        }
        let mut out = [0.0f64; 3];
        for slot in &mut out {
            self.skip_trivia();
            let (tok, _) = self.word();
            match tok.parse() {
                Ok(v) => *slot = v,
                Err(_) => {
                    self.pos = start;
                    return None;
                }
            }
        }
        self.skip_trivia();
        if !self.eat(b')') {
            self.pos = start;
            return None;
        }
        Some((start..self.pos, out))
    }

    /// Capture everything from `start` up to the next semicolon as one
    /// verbatim word value.
    fn raw_to_semicolon(&mut self, start: usize) -> Literal {
        while self.peek().is_some_and(|b| b != b';') {
            self.pos += 1;
        }
        let text = self.src[start..self.pos].trim_end();
        let span = start..start + text.len();
        Literal::Token {
            value: Value::Word(text.to_string()),
            span,
        }
    }

    fn skip_to_semicolon(&mut self) {
        while self.peek().is_some_and(|b| b != b';') {
            self.pos += 1;
        }
        self.eat(b';');
    }

    /// Skip a balanced `{ ... }` body; the opening brace is already eaten.
    fn skip_balanced(&mut self) {
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Start of the current line's indentation run.
    fn line_start(&self) -> usize {
        let bytes = self.src.as_bytes();
        let mut start = self.pos;
        while start > 0 && (bytes[start - 1] == b' ' || bytes[start - 1] == b'\t') {
            start -= 1;
        }
        start
    }

    /// Consume the newline run after the current position and return the
    /// new position.
    fn trailing_newlines(&mut self) -> usize {
        while matches!(self.peek(), Some(b'\n') | Some(b'\r')) {
            self.pos += 1;
        }
        self.pos
    }

    fn bad_literal(&self, context: &str) -> ParseError {
        let rest = &self.src[self.pos.min(self.src.len())..];
        let text: String = rest.chars().take(40).collect();
        ParseError::BadLiteral {
            context: context.to_string(),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
/*--------------------------------*- C++ -*----------------------------------*\\
  =========                 |
\\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       volScalarField;
    object      T;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

dimensions      [0 0 0 1 0 0 0];

internalField   uniform 293.15;

boundaryField
{
    #includeEtc \"caseDicts/setConstraintTypes\"

    heater
    {
        type            fixedValue;
        value           uniform 293.15;
    }

    walls
    {
        type            zeroGradient;
    }
}

// ************************************************************************* //
";

    #[test]
    fn parses_internal_field_and_blocks() {
        let parsed = parse(SAMPLE, Path::new("T")).unwrap();
        let internal = parsed.internal.as_ref().unwrap();
        assert!(internal.uniform.is_some());
        assert_eq!(internal.value.value(), &Value::Scalar(293.15));
        assert_eq!(parsed.blocks.len(), 2);
        let heater = &parsed.blocks["heater"];
        assert_eq!(heater.kind.as_deref(), Some("fixedValue"));
        let value = &heater.entries["value"];
        assert!(value.uniform.is_some());
        assert_eq!(value.value.value(), &Value::Scalar(293.15));
        assert_eq!(parsed.blocks["walls"].kind.as_deref(), Some("zeroGradient"));
    }

    #[test]
    fn spans_point_at_the_literals() {
        let parsed = parse(SAMPLE, Path::new("T")).unwrap();
        let entry = &parsed.blocks["heater"].entries["value"];
        if let Literal::Token { span, .. } = &entry.value {
            assert_eq!(&SAMPLE[span.clone()], "293.15");
        } else {
            panic!("expected a token literal");
        }
    }

    #[test]
    fn vector_literal() {
        let src = "boundaryField\n{\n    inlet\n    {\n        type            fixedValue;\n        value           uniform (0 1.5 0);\n    }\n}\n";
        let parsed = parse(src, Path::new("U")).unwrap();
        let entry = &parsed.blocks["inlet"].entries["value"];
        assert_eq!(entry.value.value(), &Value::Vector([0.0, 1.5, 0.0]));
    }

    #[test]
    fn nonuniform_list_keeps_the_last_value() {
        let src = "\
internalField   nonuniform List<scalar>
3
(
291.0
292.0
293.0
)
;

boundaryField
{
}
";
        let parsed = parse(src, Path::new("T")).unwrap();
        let internal = parsed.internal.unwrap();
        assert_eq!(internal.value.value(), &Value::Scalar(293.0));
        match internal.value {
            Literal::List { entries, .. } => assert_eq!(entries.len(), 3),
            _ => panic!("expected a list literal"),
        }
    }

    #[test]
    fn nonuniform_vector_list() {
        let src = "\
internalField   nonuniform List<vector> 2 ((0 0 0) (0 1 0));

boundaryField
{
}
";
        let parsed = parse(src, Path::new("U")).unwrap();
        assert_eq!(
            parsed.internal.unwrap().value.value(),
            &Value::Vector([0.0, 1.0, 0.0])
        );
    }

    #[test]
    fn missing_boundary_field_is_an_error() {
        let err = parse("dimensions [0 0 0 0 0 0 0];\n", Path::new("T")).unwrap_err();
        assert!(matches!(err, ParseError::MissingBoundaryField { .. }));
    }

    #[test]
    fn multi_token_values_are_kept_verbatim() {
        let src = "\
boundaryField
{
    inlet
    {
        type            flowRateInletVelocity;
        volumetricFlowRate constant 0.2;
    }
}
";
        let parsed = parse(src, Path::new("U")).unwrap();
        let entry = &parsed.blocks["inlet"].entries["volumetricFlowRate"];
        assert_eq!(entry.value.value(), &Value::Word("constant 0.2".into()));
    }
}
