use anyhow::{bail, Context, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Ref(u64),
    Str(String),
    List(Vec<Param>),
    /// Numbers, enums (`.T.`), `$`, `*` and typed values, kept verbatim.
    Raw(String),
}

impl Param {
    pub fn as_ref_id(&self) -> Option<u64> {
        match self {
            Param::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Param::Raw(s) => parse_step_float(s),
            _ => None,
        }
    }

    /// Every reference in this parameter, depth first.
    pub fn refs(&self, out: &mut Vec<u64>) {
        match self {
            Param::Ref(id) => out.push(*id),
            Param::List(items) => items.iter().for_each(|p| p.refs(out)),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u64,
    /// Entity type keyword; empty for complex `(A()B())` instances.
    pub keyword: String,
    pub params: Vec<Param>,
}

impl Entity {
    pub fn label(&self) -> Option<&str> {
        self.params.first().and_then(Param::as_str)
    }

    pub fn refs(&self) -> Vec<u64> {
        let mut out = Vec::new();
        self.params.iter().for_each(|p| p.refs(&mut out));
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entities: HashMap<u64, Entity>,
    order: Vec<u64>,
}

impl EntityTable {
    pub fn get(&self, id: u64) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Entities in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub fn parse_entities(text: &str) -> Result<EntityTable> {
    if !text.trim_start().starts_with("ISO-10303-21") {
        bail!("not an ISO-10303-21 file");
    }
    let data_start = text.find("DATA;").context("no DATA section")?;
    let body = &text[data_start + "DATA;".len()..];

    let mut table = EntityTable::default();
    for stmt in split_statements(body) {
        let stmt = stmt.trim();
        if stmt == "ENDSEC" {
            break;
        }
        let Some(rest) = stmt.strip_prefix('#') else {
            continue;
        };
        let Some((id_str, rest)) = rest.split_once('=') else {
            continue;
        };
        let id: u64 = id_str
            .trim()
            .parse()
            .with_context(|| format!("bad entity id: #{}", id_str.trim()))?;
        let entity = parse_instance(id, rest.trim())
            .with_context(|| format!("parse entity #{id}"))?;
        if table.entities.insert(id, entity).is_none() {
            table.order.push(id);
        }
    }
    Ok(table)
}

fn parse_instance(id: u64, rest: &str) -> Result<Entity> {
    if rest.starts_with('(') {
        return Ok(Entity {
            id,
            keyword: String::new(),
            params: Vec::new(),
        });
    }
    let open = rest.find('(').context("missing parameter list")?;
    let close = rest.rfind(')').context("unterminated parameter list")?;
    if close < open {
        bail!("unbalanced parameter list");
    }
    let keyword = rest[..open].trim().to_ascii_uppercase();
    let params = parse_params(&rest[open + 1..close])?;
    Ok(Entity {
        id,
        keyword,
        params,
    })
}

/// Splits on `;` outside of strings, dropping `/* */` comments.
fn split_statements(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            current.push(c);
            if c == '\'' {
                in_string = false;
            }
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                current.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' => out.push(std::mem::take(&mut current)),
            '\r' | '\n' => current.push(' '),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

fn parse_params(src: &str) -> Result<Vec<Param>> {
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0;
    let params = parse_list_items(&chars, &mut pos, None)?;
    Ok(params)
}

fn parse_list_items(chars: &[char], pos: &mut usize, close: Option<char>) -> Result<Vec<Param>> {
    let mut items = Vec::new();
    loop {
        skip_ws(chars, pos);
        match chars.get(*pos) {
            None if close.is_none() => return Ok(items),
            None => bail!("unterminated list"),
            Some(&c) if Some(c) == close => {
                *pos += 1;
                return Ok(items);
            }
            Some(&',') => {
                *pos += 1;
            }
            Some(&')') => bail!("unexpected ')' at offset {}", *pos),
            Some(_) => {
                let start = *pos;
                items.push(parse_param(chars, pos)?);
                if *pos == start {
                    bail!("unexpected {:?} at offset {start}", chars[start]);
                }
            }
        }
    }
}

fn parse_param(chars: &[char], pos: &mut usize) -> Result<Param> {
    match chars[*pos] {
        '#' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos].is_ascii_digit() {
                *pos += 1;
            }
            let digits: String = chars[start..*pos].iter().collect();
            Ok(Param::Ref(digits.parse().context("bad reference")?))
        }
        '\'' => {
            *pos += 1;
            let mut s = String::new();
            loop {
                match chars.get(*pos) {
                    None => bail!("unterminated string"),
                    Some(&'\'') if chars.get(*pos + 1) == Some(&'\'') => {
                        s.push('\'');
                        *pos += 2;
                    }
                    Some(&'\'') => {
                        *pos += 1;
                        return Ok(Param::Str(s));
                    }
                    Some(&c) => {
                        s.push(c);
                        *pos += 1;
                    }
                }
            }
        }
        '(' => {
            *pos += 1;
            Ok(Param::List(parse_list_items(chars, pos, Some(')'))?))
        }
        _ => {
            let start = *pos;
            let mut depth = 0usize;
            while let Some(&c) = chars.get(*pos) {
                match c {
                    '(' => depth += 1,
                    ')' if depth == 0 => break,
                    ')' => depth -= 1,
                    ',' if depth == 0 => break,
                    _ => {}
                }
                *pos += 1;
            }
            Ok(Param::Raw(chars[start..*pos].iter().collect::<String>().trim().to_string()))
        }
    }
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

/// Handles STEP's `0.E+000` style exponents.
pub fn parse_step_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.contains(".E") {
        s.replace(".E", ".0E").parse().ok()
    } else {
        s.parse().ok()
    }
}
