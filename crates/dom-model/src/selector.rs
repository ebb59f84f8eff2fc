//! Structural selectors
//!
//! A [`CompoundSelector`] is a tag plus class tokens (`DIV.item.big`); a
//! [`PathSelector`] chains compounds with descendant combinators
//! (`BODY UL.tasks LI.task`). Matching is structural, so class tokens never
//! need to survive a round trip through selector syntax. The string form
//! escapes CSS metacharacters and can be parsed back with [`str::parse`].

use std::fmt;
use std::str::FromStr;

use crate::errors::DomError;
use crate::model::ElementRef;

const UNIVERSAL: &str = "*";

/// Tag plus class tokens.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    tag: String,
    classes: Vec<String>,
}

impl CompoundSelector {
    /// Tags are stored upper-cased and compared case-insensitively.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_uppercase(),
            classes: Vec::new(),
        }
    }

    pub fn universal() -> Self {
        Self::new(UNIVERSAL)
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.classes.push(class_name.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Tag matches (ASCII case-insensitive) and every class token is present
    /// (case-sensitive). Extra classes on the element are allowed.
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if self.tag != UNIVERSAL && !element.tag_name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        self.classes
            .iter()
            .all(|wanted| element.classes().any(|token| token == wanted))
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag == UNIVERSAL {
            f.write_str(UNIVERSAL)?;
        } else {
            f.write_str(&escape_ident(&self.tag))?;
        }
        for class_name in &self.classes {
            write!(f, ".{}", escape_ident(class_name))?;
        }
        Ok(())
    }
}

/// Root-to-leaf chain of compounds joined by descendant combinators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathSelector {
    steps: Vec<CompoundSelector>,
}

impl PathSelector {
    pub fn new(steps: Vec<CompoundSelector>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[CompoundSelector] {
        &self.steps
    }

    pub fn leaf(&self) -> Option<&CompoundSelector> {
        self.steps.last()
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for PathSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for PathSelector {
    type Err = DomError;

    /// Parses the subset produced by `Display`: type or universal selectors,
    /// `.class` suffixes, backslash escapes and whitespace as the descendant
    /// combinator.
    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        let unsupported = || DomError::UnsupportedSelector(selector.to_string());
        let chars: Vec<char> = selector.chars().collect();
        let mut steps = Vec::new();
        let mut i = 0usize;

        while i < chars.len() {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }

            let mut step = match chars[i] {
                '*' => {
                    i += 1;
                    CompoundSelector::universal()
                }
                '.' => CompoundSelector::universal(),
                _ => {
                    let (tag, next) = parse_ident(&chars, i).ok_or_else(unsupported)?;
                    i = next;
                    CompoundSelector::new(tag)
                }
            };

            while i < chars.len() && !chars[i].is_whitespace() {
                if chars[i] != '.' {
                    return Err(unsupported());
                }
                let (class_name, next) = parse_ident(&chars, i + 1).ok_or_else(unsupported)?;
                step.classes.push(class_name);
                i = next;
            }

            steps.push(step);
        }

        if steps.is_empty() {
            return Err(unsupported());
        }
        Ok(Self { steps })
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// CSS identifier escaping: metacharacters get a backslash, a leading digit
/// becomes a hex escape.
fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (idx, ch) in ident.chars().enumerate() {
        if idx == 0 && ch.is_ascii_digit() {
            out.push_str(&format!("\\{:x} ", ch as u32));
        } else if is_ident_char(ch) {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

fn parse_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    let mut i = start;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            let (decoded, next) = parse_escape(chars, i + 1)?;
            out.push(decoded);
            i = next;
        } else if is_ident_char(ch) {
            out.push(ch);
            i += 1;
        } else {
            break;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some((out, i))
    }
}

fn parse_escape(chars: &[char], start: usize) -> Option<(char, usize)> {
    let first = *chars.get(start)?;
    if !first.is_ascii_hexdigit() {
        return Some((first, start + 1));
    }
    let mut end = start;
    while end < chars.len() && end - start < 6 && chars[end].is_ascii_hexdigit() {
        end += 1;
    }
    let hex: String = chars[start..end].iter().collect();
    let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)?;
    if chars.get(end).is_some_and(|ch| *ch == ' ') {
        end += 1;
    }
    Some((decoded, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_display() {
        let plain = CompoundSelector::new("div");
        assert_eq!(plain.to_string(), "DIV");

        let classed = CompoundSelector::new("li").with_class("task").with_class("done");
        assert_eq!(classed.to_string(), "LI.task.done");
    }

    #[test]
    fn test_escaping_metacharacters() {
        let odd = CompoundSelector::new("span")
            .with_class("w-1/2")
            .with_class("md:flex")
            .with_class("2col");
        assert_eq!(odd.to_string(), "SPAN.w-1\\/2.md\\:flex.\\32 col");

        let path = PathSelector::new(vec![CompoundSelector::new("body"), odd.clone()]);
        let parsed: PathSelector = path.to_string().parse().unwrap();
        assert_eq!(parsed.steps()[1], odd);
    }

    #[test]
    fn test_parse_path() {
        let path: PathSelector = "html body   ul.tasks li.task.open".parse().unwrap();
        assert_eq!(path.depth(), 4);
        assert_eq!(path.steps()[2].tag(), "UL");
        assert_eq!(path.leaf().unwrap().classes(), ["task", "open"]);
        assert_eq!(path.to_string(), "HTML BODY UL.tasks LI.task.open");
    }

    #[test]
    fn test_parse_universal_and_bare_class() {
        let path: PathSelector = "* .item".parse().unwrap();
        assert_eq!(path.steps()[0].tag(), "*");
        assert_eq!(path.steps()[1].tag(), "*");
        assert_eq!(path.steps()[1].classes(), ["item"]);
    }

    #[test]
    fn test_parse_rejects_other_combinators() {
        assert!("div > p".parse::<PathSelector>().is_err());
        assert!("div#main".parse::<PathSelector>().is_err());
        assert!("a[href]".parse::<PathSelector>().is_err());
        assert!("   ".parse::<PathSelector>().is_err());
        assert!("div.".parse::<PathSelector>().is_err());
    }
}
