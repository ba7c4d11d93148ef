//! 视图抽象与内置视图
//!
//! 视图契约：接受模型数据与原始请求，产生一个完整的响应。
//! 渲染机制对调度核心不可见，新视图类型只需实现 [`View`]。

use crate::model_and_view::Model;
use crate::request::{WebRequest, WebResponse};
use crate::template::TemplateEngine;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use std::sync::Arc;

/// 重定向视图名前缀，例如 `"redirect:/login"`
pub const REDIRECT_PREFIX: &str = "redirect:";

/// 视图渲染能力
#[async_trait]
pub trait View: Send + Sync {
    async fn render(&self, model: &Model, request: &WebRequest) -> Result<WebResponse>;
}

/// 模板视图 - 以视图名定位 Tera 模板
pub struct TemplateView {
    name: String,
    engine: Arc<TemplateEngine>,
}

impl TemplateView {
    pub fn new(name: impl Into<String>, engine: Arc<TemplateEngine>) -> Self {
        Self {
            name: name.into(),
            engine,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl View for TemplateView {
    async fn render(&self, model: &Model, _request: &WebRequest) -> Result<WebResponse> {
        let html = self.engine.render(&self.name, model)?;
        let response = http::Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Bytes::from(html))?;
        Ok(response)
    }
}

/// JSON 视图 - 将整个模型序列化为响应体
pub struct JsonView;

#[async_trait]
impl View for JsonView {
    async fn render(&self, model: &Model, _request: &WebRequest) -> Result<WebResponse> {
        let body = serde_json::to_vec(model)?;
        let response = http::Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))?;
        Ok(response)
    }
}

/// 重定向视图 - 302 跳转，忽略模型
pub struct RedirectView {
    location: String,
}

impl RedirectView {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

#[async_trait]
impl View for RedirectView {
    async fn render(&self, _model: &Model, _request: &WebRequest) -> Result<WebResponse> {
        let response = http::Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, HeaderValue::try_from(self.location.as_str())?)
            .body(Bytes::new())?;
        Ok(response)
    }
}

/// 按视图名解析出具体视图：`redirect:` 前缀走重定向，其余走模板
pub fn resolve_view_name(name: &str, engine: &Arc<TemplateEngine>) -> Arc<dyn View> {
    if let Some(location) = name.strip_prefix(REDIRECT_PREFIX) {
        Arc::new(RedirectView::new(location))
    } else {
        Arc::new(TemplateView::new(name, Arc::clone(engine)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get_request(path: &str) -> WebRequest {
        http::Request::builder()
            .method(http::Method::GET)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_view_serializes_model() {
        let mut model = Model::new();
        model.insert("status".to_string(), json!("ok"));

        let response = JsonView.render(&model, &get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_template_view_renders_model() {
        let engine = Arc::new(TemplateEngine::new());
        engine
            .add_raw_template("hello.html", "Hello, {{ name }}!")
            .unwrap();

        let mut model = Model::new();
        model.insert("name".to_string(), json!("World"));

        let view = TemplateView::new("hello.html", engine);
        let response = view.render(&model, &get_request("/hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "Hello, World!");
    }

    #[tokio::test]
    async fn test_redirect_view_sets_location() {
        let view = RedirectView::new("/login");
        let response = view.render(&Model::new(), &get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_resolve_view_name_redirect_prefix() {
        let engine = Arc::new(TemplateEngine::new());
        // redirect: 前缀不经过模板引擎
        let view = resolve_view_name("redirect:/index", &engine);
        let response = view.render(&Model::new(), &get_request("/")).await.unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/index");
    }
}
