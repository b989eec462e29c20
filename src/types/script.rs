//! Reader for the rule-script format:
//!
//! ```text
//! friend = "knows personally" -2.5      # relation decl: name, label, log-density
//! small <- "ant", "flea"                # set decl
//! friend(0,1); friend(1,2) -> friend(0,2)
//! in_small(0) -> tiny(0,0)
//! ```
//!
//! Blank lines and `#`-prefixed lines are ignored. An argument `INT` is a
//! rule variable; `INT()` marks it functional (existential).

use {
    super::SolverError,
    std::{fmt, fs::File, io::Read, path::Path},
};

/// One `NAME = STRING NUMBER` line.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationDecl {
    pub name: String,
    pub label: String,
    /// expected log-density, the weighted graph's base value
    pub density: f64,
}

/// One `NAME <- STRING, ...` line.
#[derive(Clone, Debug, PartialEq)]
pub struct SetDecl {
    pub name: String,
    pub members: Vec<String>,
}

/// An argument of a rule literal before relation resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArgSpec {
    pub index: u32,
    pub functional: bool,
}

/// A literal of a rule before relation resolution. Membership literals
/// (`in_NAME(x)`) carry a single argument.
#[derive(Clone, Debug, PartialEq)]
pub struct LitSpec {
    pub relation: String,
    pub args: Vec<ArgSpec>,
}

/// One `premises -> conclusions` line.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleDecl {
    pub premises: Vec<LitSpec>,
    pub conclusions: Vec<LitSpec>,
    /// 1-based source line, for error reports
    pub line: usize,
}

/// A parsed rule script. Relation resolution against a concrete model
/// happens later, in `solver::build`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    pub relations: Vec<RelationDecl>,
    pub sets: Vec<SetDecl>,
    pub rules: Vec<RuleDecl>,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Script({} relations, {} sets, {} rules)",
            self.relations.len(),
            self.sets.len(),
            self.rules.len()
        )
    }
}

impl TryFrom<&Path> for Script {
    type Error = SolverError;
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let mut buf = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|_| SolverError::IOError)?;
        Script::try_from(buf.as_str())
    }
}

impl TryFrom<&str> for Script {
    type Error = SolverError;
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let mut script = Script::default();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let body = match raw.find('#') {
                Some(p) => &raw[..p],
                None => raw,
            }
            .trim();
            if body.is_empty() {
                continue;
            }
            if body.contains("->") && !body.contains("<-") {
                script.rules.push(parse_rule(body, line)?);
            } else if let Some((name, rest)) = body.split_once("<-") {
                script.sets.push(parse_set(name, rest, line)?);
            } else if let Some((name, rest)) = body.split_once('=') {
                script.relations.push(parse_relation(name, rest, line)?);
            } else {
                return Err(fail(line, "not a declaration or a rule"));
            }
        }
        Ok(script)
    }
}

fn fail(line: usize, reason: &str) -> SolverError {
    SolverError::ParseFailure {
        line,
        reason: reason.to_string(),
    }
}

fn parse_relation(name: &str, rest: &str, line: usize) -> Result<RelationDecl, SolverError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(fail(line, "relation declaration without a name"));
    }
    let rest = rest.trim();
    let label = parse_string(rest, line)?;
    let density = rest[label.len() + 2..]
        .trim()
        .parse::<f64>()
        .map_err(|_| fail(line, "relation declaration without a log-density"))?;
    Ok(RelationDecl {
        name: name.to_string(),
        label,
        density,
    })
}

fn parse_set(name: &str, rest: &str, line: usize) -> Result<SetDecl, SolverError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(fail(line, "set declaration without a name"));
    }
    let mut members = Vec::new();
    for part in rest.split(',') {
        members.push(parse_string(part.trim(), line)?);
    }
    Ok(SetDecl {
        name: name.to_string(),
        members,
    })
}

/// parse one double-quoted string at the start of `s`.
fn parse_string(s: &str, line: usize) -> Result<String, SolverError> {
    let mut chars = s.chars();
    if chars.next() != Some('"') {
        return Err(fail(line, "expected a double-quoted string"));
    }
    let inner: String = chars.take_while(|c| *c != '"').collect();
    if s.len() < inner.len() + 2 {
        return Err(fail(line, "unterminated string"));
    }
    Ok(inner)
}

fn parse_rule(body: &str, line: usize) -> Result<RuleDecl, SolverError> {
    let (pre, post) = body.split_once("->").expect("checked by caller");
    let rule = RuleDecl {
        premises: parse_literals(pre, line)?,
        conclusions: parse_literals(post, line)?,
        line,
    };
    if rule.premises.is_empty() && rule.conclusions.is_empty() {
        return Err(SolverError::EmptyRule);
    }
    // one argument index must be either functional or plain throughout a rule
    let mut seen: Vec<(u32, bool)> = Vec::new();
    for lit in rule.premises.iter().chain(rule.conclusions.iter()) {
        for a in lit.args.iter() {
            match seen.iter().find(|(i, _)| *i == a.index) {
                Some((i, f)) if *f != a.functional => {
                    return Err(SolverError::InvalidTerm(format!(
                        "argument {i} is both functional and non-functional (line {line})"
                    )));
                }
                Some(_) => (),
                None => seen.push((a.index, a.functional)),
            }
        }
    }
    Ok(rule)
}

fn parse_literals(s: &str, line: usize) -> Result<Vec<LitSpec>, SolverError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(';').map(|part| parse_literal(part, line)).collect()
}

fn parse_literal(s: &str, line: usize) -> Result<LitSpec, SolverError> {
    let s = s.trim();
    let open = s.find('(').ok_or_else(|| fail(line, "literal without '('"))?;
    if !s.ends_with(')') {
        return Err(fail(line, "literal without ')'"));
    }
    let relation = s[..open].trim();
    if relation.is_empty() {
        return Err(fail(line, "literal without a relation name"));
    }
    let args: Vec<ArgSpec> = s[open + 1..s.len() - 1]
        .split(',')
        .map(|a| parse_arg(a, line))
        .collect::<Result<_, _>>()?;
    let expected = if relation.starts_with("in_") { 1 } else { 2 };
    if args.len() != expected {
        return Err(fail(line, "wrong number of literal arguments"));
    }
    Ok(LitSpec {
        relation: relation.to_string(),
        args,
    })
}

fn parse_arg(s: &str, line: usize) -> Result<ArgSpec, SolverError> {
    let s = s.trim();
    let (body, functional) = match s.strip_suffix("()") {
        Some(b) => (b.trim(), true),
        None => (s, false),
    };
    let index = body
        .parse::<u32>()
        .map_err(|_| fail(line, "literal argument is not an integer"))?;
    Ok(ArgSpec { index, functional })
}
