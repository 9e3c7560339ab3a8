//! Placeholder substitution for report title/body templates.

/// Token replaced with the responsible party label.
pub const TOKEN_ASSIGNEE: &str = "{assignee}";
/// Token replaced with the number of reported issues.
pub const TOKEN_ISSUE_COUNT: &str = "{issueCount}";
/// Token replaced with the report date.
pub const TOKEN_DATE: &str = "{date}";
/// Token replaced with the rendered issue list (body only).
pub const TOKEN_ISSUE_LIST: &str = "{issueList}";

/// Values substituted into report templates.
#[derive(Debug, Clone)]
pub struct TemplateVars<'a> {
    pub assignee: &'a str,
    pub issue_count: usize,
    pub date: &'a str,
    pub issue_list: &'a str,
}

/// Render a title template. `{issueList}` is left untouched in titles.
pub fn render_title(template: &str, vars: &TemplateVars<'_>) -> String {
    template
        .replace(TOKEN_ASSIGNEE, vars.assignee)
        .replace(TOKEN_ISSUE_COUNT, &vars.issue_count.to_string())
        .replace(TOKEN_DATE, vars.date)
}

/// Render a body template, including the `{issueList}` token.
///
/// The issue list is substituted last so text inside issue descriptions that
/// happens to look like a token is not expanded.
pub fn render_body(template: &str, vars: &TemplateVars<'_>) -> String {
    render_title(template, vars).replace(TOKEN_ISSUE_LIST, vars.issue_list)
}
