//! Compare link domain entity
//!
//! A GitHub compare URL naming the two refs whose diff gets published.

use regex::Regex;

/// Parsed `https://<host>/<owner>/<repo>/compare/<base>...<head>` link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareLink {
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub base: String,
    pub head: String,
}

impl CompareLink {
    /// `<base>...<head>` as shown in published titles
    pub fn range(&self) -> String {
        format!("{}...{}", self.base, self.head)
    }

    pub fn patch_url(&self) -> String {
        format!("{}.patch", self.url)
    }

    pub fn diff_url(&self) -> String {
        format!("{}.diff", self.url)
    }
}

/// Recognizes compare links for a single forge host
#[derive(Debug, Clone)]
pub struct CompareLinkMatcher {
    pattern: Regex,
}

impl CompareLinkMatcher {
    pub fn new(host: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^https://{}/([\w\-]+)/([\w\-]+)/compare/([\w\-]+)\.\.\.([\w\-]+)$",
            regex::escape(host)
        ))?;
        Ok(Self { pattern })
    }

    /// Parse `link`, returning `None` for anything that is not a compare link
    pub fn parse(&self, link: &str) -> Option<CompareLink> {
        let caps = self.pattern.captures(link)?;
        Some(CompareLink {
            url: link.to_string(),
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            base: caps[3].to_string(),
            head: caps[4].to_string(),
        })
    }
}
