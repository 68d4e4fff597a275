//! Typed form of a block's `source` string.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized source locator: {0}")]
pub struct ParseSourceError(pub String);

/// Where a block sits in the document's hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocator {
    LegalBasis,
    Decision,
    Chapter { number: String, title: String },
    Article { article: String },
    Clause { article: String, clause: String },
    Point { article: String, clause: String, point: String },
    Appendix { number: String },
}

impl SourceLocator {
    /// Article number for article, clause and point locators.
    pub fn article(&self) -> Option<&str> {
        match self {
            Self::Article { article }
            | Self::Clause { article, .. }
            | Self::Point { article, .. } => Some(article.as_str()),
            _ => None,
        }
    }

    /// Whether this locator falls under `Điều {article}`.
    pub fn is_in_article(&self, article: &str) -> bool {
        self.article() == Some(article)
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegalBasis => write!(f, "Căn cứ"),
            Self::Decision => write!(f, "Quyết định"),
            Self::Chapter { number, title } if title.is_empty() => write!(f, "Chương {number}"),
            Self::Chapter { number, title } => write!(f, "Chương {number} — {title}"),
            Self::Article { article } => write!(f, "Điều {article}"),
            Self::Clause { article, clause } => write!(f, "Điều {article}, Khoản {clause}"),
            Self::Point {
                article,
                clause,
                point,
            } => write!(f, "Điều {article}, Khoản {clause}, Điểm {point}"),
            Self::Appendix { number } => write!(f, "Phụ lục {number}"),
        }
    }
}

fn number_after<'a>(part: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = part.trim().strip_prefix(prefix)?.trim();
    (!rest.is_empty() && !rest.contains(char::is_whitespace)).then_some(rest)
}

impl FromStr for SourceLocator {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseSourceError(s.to_string());

        match s {
            "Căn cứ" => return Ok(Self::LegalBasis),
            "Quyết định" => return Ok(Self::Decision),
            _ => {}
        }

        if let Some(rest) = s.strip_prefix("Chương ") {
            let (number, title) = match rest.split_once('—') {
                Some((n, t)) => (n.trim(), t.trim()),
                None => (rest.trim(), ""),
            };
            if number.is_empty() {
                return Err(err());
            }
            return Ok(Self::Chapter {
                number: number.to_string(),
                title: title.to_string(),
            });
        }

        if let Some(number) = number_after(s, "Phụ lục") {
            return Ok(Self::Appendix {
                number: number.to_string(),
            });
        }

        let parts: Vec<&str> = s.split(',').collect();
        let article = number_after(parts[0], "Điều").ok_or_else(err)?.to_string();
        match parts.as_slice() {
            [_] => Ok(Self::Article { article }),
            [_, clause] => Ok(Self::Clause {
                article,
                clause: number_after(clause, "Khoản").ok_or_else(err)?.to_string(),
            }),
            [_, clause, point] => Ok(Self::Point {
                article,
                clause: number_after(clause, "Khoản").ok_or_else(err)?.to_string(),
                point: number_after(point, "Điểm").ok_or_else(err)?.to_string(),
            }),
            _ => Err(err()),
        }
    }
}
