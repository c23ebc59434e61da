//! HTML pages rendered with askama templates from `templates/`.

use {
    askama::Template,
    axum::{
        http::StatusCode,
        response::{Html, IntoResponse, Response},
    },
    tracing::error,
};

use repolink_github::Project;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub authorize_url: &'a str,
}

#[derive(Template)]
#[template(path = "repos.html")]
pub struct ReposPage<'a> {
    pub projects: &'a [Project],
    pub state: &'a str,
}

#[derive(Template)]
#[template(path = "submitted.html")]
pub struct SubmittedPage<'a> {
    pub repos: &'a [String],
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub status: u16,
    pub message: &'a str,
}

/// Render `page` with `status`, falling back to a plain 500 if the template fails.
pub fn render<T: Template>(status: StatusCode, page: &T) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        },
    }
}

pub fn error_page(status: StatusCode, message: &str) -> Response {
    render(status, &ErrorPage {
        status: status.as_u16(),
        message,
    })
}
