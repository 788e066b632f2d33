use crate::document::{Document, NodeId};
use radar_core::{RadarError, RadarResult};

/// Small selector language covering the forms that appear in the candidate,
/// container and hidden-text lists: tag names, `.class`, `#id`,
/// `[attr]` / `[attr="v"]` / `[attr*="v"]`, compounds of those, and a single
/// level of descendant combination (`[data-view-name="job-card"] p`).
#[derive(Debug, Clone)]
pub struct Selector {
    parts: Vec<Compound>,
    source: String,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    preds: Vec<Pred>,
}

#[derive(Debug, Clone)]
enum Pred {
    Id(String),
    Class(String),
    AttrPresent(String),
    AttrEquals(String, String),
    AttrContains(String, String),
}

impl Selector {
    pub fn parse(input: &str) -> RadarResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RadarError::Selector("empty selector".to_string()));
        }
        if let Some(bad) = trimmed.chars().find(|c| matches!(c, '>' | '+' | '~' | ':' | ',')) {
            return Err(RadarError::Selector(format!(
                "unsupported combinator '{}' in '{}'",
                bad, trimmed
            )));
        }
        let parts = trimmed
            .split_whitespace()
            .map(parse_compound)
            .collect::<RadarResult<Vec<_>>>()?;
        Ok(Self {
            parts,
            source: trimmed.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let (subject, ancestors) = match self.parts.split_last() {
            Some(split) => split,
            None => return false,
        };
        if !compound_matches(doc, node, subject) {
            return false;
        }
        let mut current = node;
        for part in ancestors.iter().rev() {
            match nearest_matching_ancestor(doc, current, part) {
                Some(ancestor) => current = ancestor,
                None => return false,
            }
        }
        true
    }
}

fn nearest_matching_ancestor(doc: &Document, node: NodeId, part: &Compound) -> Option<NodeId> {
    let mut current = doc.parent(node);
    while let Some(id) = current {
        if compound_matches(doc, id, part) {
            return Some(id);
        }
        current = doc.parent(id);
    }
    None
}

fn compound_matches(doc: &Document, node: NodeId, part: &Compound) -> bool {
    if let Some(tag) = &part.tag {
        if tag != "*" && doc.tag(node) != tag {
            return false;
        }
    }
    part.preds.iter().all(|pred| match pred {
        Pred::Id(id) => doc.attr(node, "id") == Some(id.as_str()),
        Pred::Class(class) => doc.has_class(node, class),
        Pred::AttrPresent(name) => doc.attr(node, name).is_some(),
        Pred::AttrEquals(name, value) => doc.attr(node, name) == Some(value.as_str()),
        Pred::AttrContains(name, value) => doc
            .attr(node, name)
            .map(|v| v.contains(value.as_str()))
            .unwrap_or(false),
    })
}

fn parse_compound(input: &str) -> RadarResult<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;

    if pos < chars.len() && (chars[pos].is_ascii_alphabetic() || chars[pos] == '*') {
        let start = pos;
        if chars[pos] == '*' {
            pos += 1;
        } else {
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '-') {
                pos += 1;
            }
        }
        compound.tag = Some(chars[start..pos].iter().collect::<String>().to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                let (name, next) = take_ident(&chars, pos + 1, input)?;
                compound.preds.push(Pred::Class(name));
                pos = next;
            }
            '#' => {
                let (name, next) = take_ident(&chars, pos + 1, input)?;
                compound.preds.push(Pred::Id(name));
                pos = next;
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|off| pos + off)
                    .ok_or_else(|| {
                        RadarError::Selector(format!("unclosed attribute in '{}'", input))
                    })?;
                let body: String = chars[pos + 1..close].iter().collect();
                compound.preds.push(parse_attr_pred(&body, input)?);
                pos = close + 1;
            }
            other => {
                return Err(RadarError::Selector(format!(
                    "unexpected '{}' in '{}'",
                    other, input
                )));
            }
        }
    }

    if compound.tag.is_none() && compound.preds.is_empty() {
        return Err(RadarError::Selector(format!("empty compound in '{}'", input)));
    }
    Ok(compound)
}

fn take_ident(chars: &[char], start: usize, input: &str) -> RadarResult<(String, usize)> {
    let mut pos = start;
    while pos < chars.len()
        && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '-' || chars[pos] == '_')
    {
        pos += 1;
    }
    if pos == start {
        return Err(RadarError::Selector(format!("missing name in '{}'", input)));
    }
    Ok((chars[start..pos].iter().collect(), pos))
}

fn parse_attr_pred(body: &str, input: &str) -> RadarResult<Pred> {
    let (name, op, raw_value) = if let Some(eq) = body.find("*=") {
        (&body[..eq], Some('*'), Some(&body[eq + 2..]))
    } else if let Some(eq) = body.find('=') {
        (&body[..eq], Some('='), Some(&body[eq + 1..]))
    } else {
        (body, None, None)
    };

    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(RadarError::Selector(format!(
            "missing attribute name in '{}'",
            input
        )));
    }

    match (op, raw_value) {
        (None, None) => Ok(Pred::AttrPresent(name)),
        (Some(op), Some(raw)) => {
            let value = unquote(raw.trim(), input)?;
            if op == '*' {
                Ok(Pred::AttrContains(name, value))
            } else {
                Ok(Pred::AttrEquals(name, value))
            }
        }
        _ => Err(RadarError::Selector(format!("bad attribute in '{}'", input))),
    }
}

fn unquote(raw: &str, input: &str) -> RadarResult<String> {
    if raw.len() >= 2 {
        let bytes = raw.as_bytes();
        let quote = bytes[0];
        if (quote == b'"' || quote == b'\'') && bytes[raw.len() - 1] == quote {
            return Ok(raw[1..raw.len() - 1].to_string());
        }
    }
    if raw.starts_with('"') || raw.starts_with('\'') {
        return Err(RadarError::Selector(format!("unbalanced quote in '{}'", input)));
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc_with(tag: &str, attrs: &[(&str, &str)]) -> (Document, NodeId) {
        let mut doc = Document::new();
        let id = doc.create_element(tag);
        for (name, value) in attrs {
            doc.set_attr(id, name, value);
        }
        doc.append_child(doc.body(), id).unwrap();
        (doc, id)
    }

    #[test]
    fn tag_selector() {
        let (doc, id) = doc_with("h2", &[]);
        assert!(Selector::parse("h2").unwrap().matches(&doc, id));
        assert!(!Selector::parse("h3").unwrap().matches(&doc, id));
    }

    #[test]
    fn class_selector() {
        let (doc, id) = doc_with("div", &[("class", "comp-name highlighted")]);
        assert!(Selector::parse(".comp-name").unwrap().matches(&doc, id));
        assert!(!Selector::parse(".comp").unwrap().matches(&doc, id));
    }

    #[test]
    fn attr_selectors() {
        let (doc, id) = doc_with("span", &[("data-testid", "company-name")]);
        assert!(Selector::parse("[data-testid]").unwrap().matches(&doc, id));
        assert!(Selector::parse(r#"[data-testid="company-name"]"#)
            .unwrap()
            .matches(&doc, id));
        assert!(!Selector::parse(r#"[data-testid="employer"]"#)
            .unwrap()
            .matches(&doc, id));
    }

    #[test]
    fn attr_contains_selector() {
        let (doc, id) = doc_with("li", &[("class", "search-result-card")]);
        let sel = Selector::parse(r#"li[class*="result"]"#).unwrap();
        assert!(sel.matches(&doc, id));
        let (other, other_id) = doc_with("div", &[("class", "search-result-card")]);
        assert!(!sel.matches(&other, other_id));
    }

    #[test]
    fn descendant_combinator() {
        let mut doc = Document::new();
        let card = doc.create_element("div");
        doc.set_attr(card, "data-view-name", "job-card");
        doc.append_child(doc.body(), card).unwrap();
        let wrapper = doc.create_element("div");
        doc.append_child(card, wrapper).unwrap();
        let p = doc.create_element("p");
        doc.append_child(wrapper, p).unwrap();

        let sel = Selector::parse(r#"[data-view-name="job-card"] p"#).unwrap();
        assert!(sel.matches(&doc, p));
        assert!(!sel.matches(&doc, wrapper));

        let mut bare = Document::new();
        let lone = bare.create_element("p");
        bare.append_child(bare.body(), lone).unwrap();
        assert!(!sel.matches(&bare, lone));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse("h1, h2").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("[class*=\"open").is_err());
    }

    #[test]
    fn full_candidate_list_parses() {
        let inputs = [
            "h1",
            "a",
            ".company-name",
            r#"[class*="company"]"#,
            ".job-card-container__company-name",
            r#"[data-testid="company-name"]"#,
            r#"[data-view-name="job-card"] p"#,
            r#"[data-chameleon-result-urn]"#,
            r#"li[class*="result"]"#,
        ];
        for input in inputs {
            Selector::parse(input).unwrap();
        }
    }
}
