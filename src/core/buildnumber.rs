//! core::buildnumber
//!
//! Composite build-number formatting.
//!
//! The default rule is `{name}.{commitsCount}.{shortRevision}[-{dirty}]`
//! where `name` is the tag, else the branch, else `UNNAMED`. Callers can
//! plug in another rule through [`BuildNumberFormatter`]; a formatter that
//! yields no usable value is an error, never silently replaced.

use std::sync::LazyLock;

use regex::Regex;

use super::types::CommitCount;

/// Name used when neither a tag nor a branch is available.
pub const FALLBACK_NAME: &str = "UNNAMED";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z]+)\}").expect("placeholder regex is valid"));

/// Everything a formatter may use, by name.
#[derive(Debug, Clone, Copy)]
pub struct BuildNumberInputs<'a> {
    pub tag: &'a str,
    pub branch: &'a str,
    pub revision: &'a str,
    pub parent: &'a str,
    pub short_revision: &'a str,
    pub commits_count: CommitCount,
    pub author_date: &'a str,
    pub commit_date: &'a str,
    pub dirty: &'a str,
    pub describe: &'a str,
}

impl BuildNumberInputs<'_> {
    /// Look up an input by its published (camelCase) name.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match name {
            "tag" => self.tag,
            "branch" => self.branch,
            "revision" => self.revision,
            "parent" => self.parent,
            "shortRevision" => self.short_revision,
            "commitsCount" => return Some(self.commits_count.to_string()),
            "authorDate" => self.author_date,
            "commitDate" => self.commit_date,
            "dirty" => self.dirty,
            "describe" => self.describe,
            _ => return None,
        };
        Some(value.to_string())
    }
}

/// A rule turning resolved fields into the composite build number.
///
/// Returning `None` means the rule produced nothing usable.
pub trait BuildNumberFormatter {
    fn format(&self, inputs: &BuildNumberInputs<'_>) -> Option<String>;
}

impl<F> BuildNumberFormatter for F
where
    F: Fn(&BuildNumberInputs<'_>) -> Option<String>,
{
    fn format(&self, inputs: &BuildNumberInputs<'_>) -> Option<String> {
        self(inputs)
    }
}

/// The canonical `{name}.{commitsCount}.{shortRevision}[-{dirty}]` rule.
///
/// # Example
///
/// ```
/// use gitbuildnumber::core::buildnumber::default_build_number;
///
/// assert_eq!(default_build_number("v1.2", "main", "5", "abc1234", ""), "v1.2.5.abc1234");
/// assert_eq!(default_build_number("", "main", "5", "abc1234", "DIRTY"), "main.5.abc1234-DIRTY");
/// assert_eq!(default_build_number("", "", "0", "abc1234", ""), "UNNAMED.0.abc1234");
/// ```
pub fn default_build_number(
    tag: &str,
    branch: &str,
    commits_count: &str,
    short_revision: &str,
    dirty: &str,
) -> String {
    let name = if !tag.is_empty() {
        tag
    } else if !branch.is_empty() {
        branch
    } else {
        FALLBACK_NAME
    };

    let mut out = format!("{name}.{commits_count}.{short_revision}");
    if !dirty.is_empty() {
        out.push('-');
        out.push_str(dirty);
    }
    out
}

/// Formatter applying [`default_build_number`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBuildNumber;

impl BuildNumberFormatter for DefaultBuildNumber {
    fn format(&self, inputs: &BuildNumberInputs<'_>) -> Option<String> {
        Some(default_build_number(
            inputs.tag,
            inputs.branch,
            &inputs.commits_count.to_string(),
            inputs.short_revision,
            inputs.dirty,
        ))
    }
}

/// Formatter substituting `{field}` placeholders in a template.
///
/// Unknown placeholders, or a blank result, yield `None`.
///
/// # Example
///
/// ```
/// use gitbuildnumber::core::buildnumber::{BuildNumberFormatter, BuildNumberInputs, TemplateBuildNumber};
/// use gitbuildnumber::core::types::CommitCount;
///
/// let inputs = BuildNumberInputs {
///     tag: "",
///     branch: "main",
///     revision: "abc1234def",
///     parent: "",
///     short_revision: "abc1234",
///     commits_count: CommitCount::Counted(12),
///     author_date: "2024-01-01",
///     commit_date: "2024-01-02",
///     dirty: "",
///     describe: "v1-12-gabc1234",
/// };
///
/// let fmt = TemplateBuildNumber::new("{branch}-b{commitsCount}");
/// assert_eq!(fmt.format(&inputs).as_deref(), Some("main-b12"));
/// assert_eq!(TemplateBuildNumber::new("{nope}").format(&inputs), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBuildNumber {
    template: String,
}

impl TemplateBuildNumber {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl BuildNumberFormatter for TemplateBuildNumber {
    fn format(&self, inputs: &BuildNumberInputs<'_>) -> Option<String> {
        let mut out = String::with_capacity(self.template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(&self.template) {
            let whole = caps.get(0)?;
            out.push_str(&self.template[last..whole.start()]);
            out.push_str(&inputs.get(&caps[1])?);
            last = whole.end();
        }
        out.push_str(&self.template[last..]);

        if out.trim().is_empty() {
            None
        } else {
            Some(out)
        }
    }
}
