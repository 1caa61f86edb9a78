//! Portfolio page assembly.
//!
//! The page shell is static HTML with `{{field}}` placeholders. Substitution runs in a
//! single regex pass over the shell, so text inside a field is never re-scanned.
//! Field values are inserted verbatim; `projects` is already card markup from the model.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

const PAGE_SHELL: &str = include_str!("shell.html");

const LINKEDIN_HOME: &str = "https://www.linkedin.com";
const GITHUB_HOME: &str = "https://www.github.com";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioFields {
    pub name: String,
    pub role: String,
    pub bio: String,
    /// Pre-rendered project card markup.
    pub projects: String,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    pub year: i32,
}

impl PortfolioFields {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        let value = match key {
            "name" => Cow::Borrowed(self.name.as_str()),
            "role" => Cow::Borrowed(self.role.as_str()),
            "bio" => Cow::Borrowed(self.bio.as_str()),
            "projects" => Cow::Borrowed(self.projects.as_str()),
            "email" => Cow::Borrowed(self.email.as_str()),
            "linkedin" => Cow::Borrowed(or_home(&self.linkedin, LINKEDIN_HOME)),
            "github" => Cow::Borrowed(or_home(&self.github, GITHUB_HOME)),
            "year" => Cow::Owned(self.year.to_string()),
            _ => return None,
        };
        Some(value)
    }
}

fn or_home<'a>(link: &'a str, home: &'a str) -> &'a str {
    let link = link.trim();
    if link.is_empty() {
        home
    } else {
        link
    }
}

/// Fills the page shell with `fields`. Unknown placeholders are left as-is.
pub fn assemble_portfolio(fields: &PortfolioFields) -> String {
    PLACEHOLDER
        .replace_all(PAGE_SHELL, |caps: &Captures| match fields.lookup(&caps[1]) {
            Some(value) => value.into_owned(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
