//! Victim page templates and the static-page handler
//!
//! Interpolation is plain `format!`; whatever reaches these functions is
//! emitted as-is. Escaping, where a variant wants it, happens before.

use async_trait::async_trait;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use lab_common::SetCookie;
use lab_core::response::html;
use lab_core::store::Article;
use lab_core::{Handler, RequestContext, Result};

/// Wrap a fragment in a minimal UTF-8 document
pub fn render_page(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"/></head><body>{}</body></html>",
        fragment
    )
}

/// Article body, comment list and the comment form
pub fn article_page(article: &Article) -> String {
    let comments: String = article
        .comments
        .iter()
        .map(|comment| format!("<li>{}</li>", comment))
        .collect();

    render_page(&format!(
        r#"
    <div style="width: 500px;margin: auto;">
      <h1>{title}</h1>
      <p>{content}</p>
      <h3>Comments</h3>
      <ul>{comments}</ul>
      <hr/>
      <p>Leave a comment:</p>
      <form action="/comments" method="post">
        <textarea lines="3" maxlength="1000" name="comment"></textarea>
        <button type="submit">Submit</button>
      </form>
    </div>
    "#,
        title = article.title,
        content = article.content,
        comments = comments,
    ))
}

/// Readable-from-script cookies the XSS victims hand out to every visitor
pub fn profile_cookies(account: &str) -> Vec<SetCookie> {
    vec![SetCookie::new("name", account), SetCookie::new("age", "10")]
}

/// Serves one fixed body for every request it is routed
pub struct StaticPage {
    body: String,
    content_type: Option<&'static str>,
}

impl StaticPage {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }

    pub fn script(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some("application/javascript"),
        }
    }
}

#[async_trait]
impl Handler for StaticPage {
    async fn call(&self, _ctx: RequestContext) -> Result<Response> {
        let mut response = html(self.body.clone());
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_page_lists_comments_in_order() {
        let article = Article::default();
        let page = article_page(&article);
        let first = page.find("<li>Comment 1</li>").unwrap();
        let second = page.find("<li>Comment 2</li>").unwrap();
        assert!(first < second);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<form action="/comments" method="post">"#));
    }

    #[test]
    fn test_profile_cookies_have_no_flags() {
        let rendered: Vec<String> = profile_cookies("keliq")
            .iter()
            .map(SetCookie::header_value)
            .collect();
        assert_eq!(rendered, vec!["name=keliq", "age=10"]);
    }
}
