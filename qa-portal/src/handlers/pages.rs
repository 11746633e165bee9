use askama::Template;
use axum::extract::MatchedPath;
use service_core::error::AppError;

use crate::content::{self, PageRoute, Section, AI_TOOLS_PATH};
use crate::models::SessionUser;

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: &'static str,
    pub section: &'static str,
    /// Content template identifier for the page body.
    pub content_id: &'static str,
    pub username: String,
    pub show_generator: bool,
    pub nav: Vec<&'static PageRoute>,
    pub tools: Vec<&'static PageRoute>,
}

impl PageTemplate {
    pub fn new(page: &'static PageRoute, user: &SessionUser) -> Self {
        Self {
            title: page.title,
            section: page.section.label(),
            content_id: page.template,
            username: user.display_name().to_string(),
            show_generator: page.path == AI_TOOLS_PATH,
            nav: content::section_pages(Section::Main).collect(),
            tools: content::section_pages(Section::Tools).collect(),
        }
    }
}

/// Render the route table entry registered under the matched path.
pub async fn render_page(
    matched: MatchedPath,
    user: SessionUser,
) -> Result<PageTemplate, AppError> {
    let page = content::lookup(matched.as_str())
        .ok_or_else(|| AppError::NotFound(format!("No page at {}", matched.as_str())))?;

    Ok(PageTemplate::new(page, &user))
}
