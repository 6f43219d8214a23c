use crate::document::ExportDocument;
use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;

static PROLOGUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:const|var|let)\s+[a-zA-Z_$][\w$]*\s*=\s*")
        .expect("prologue pattern")
});
static TERMINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r";\s*$").expect("terminator pattern"));
static BARE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(^|[,{\s])([a-zA-Z_][a-zA-Z0-9_]*)\s*:").expect("bare key pattern")
});
static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));

/// Reduces the exporter's `var NAME = { version: 3, parts: [ ... ], };`
/// output to a strict document:
///
/// 1. strip a leading `export const|var|let NAME =` prologue
/// 2. strip the trailing `;`
/// 3. keep the span between the first `{` and the last `}`
/// 4. quote bare keys that follow `{`, `,`, whitespace or a line start
/// 5. drop trailing commas before `}` and `]`
/// 6. parse as JSON
///
/// Step 4 is a regex, not a tokenizer: a key-like run such as `foo:` preceded
/// by whitespace inside a string value gets quoted too.
pub fn parse_literal(text: &str) -> Result<ExportDocument, ParseError> {
    let json = literal_to_json(text)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    ExportDocument::from_value(value)
}

/// Steps 1-5: rewrites the literal into JSON text without parsing it.
pub fn literal_to_json(text: &str) -> Result<String, ParseError> {
    let src = text.trim();
    let src = PROLOGUE.replace(src, "");
    let src = TERMINATOR.replace(&src, "");

    let start = src.find('{').ok_or(ParseError::NoObjectLiteral)?;
    let end = src.rfind('}').ok_or(ParseError::NoObjectLiteral)?;
    if end < start {
        return Err(ParseError::NoObjectLiteral);
    }
    let src = &src[start..=end];

    let src = BARE_KEY.replace_all(src, "${1}\"${2}\":");
    let src = TRAILING_COMMA.replace_all(&src, "${1}");
    Ok(src.into_owned())
}
