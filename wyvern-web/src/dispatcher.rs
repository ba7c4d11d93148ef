//! 前端控制器
//!
//! 所有请求的统一入口：初始化阶段装配映射与适配器，
//! 每个请求按「解析 handler → 解析适配器 → 调用 → 渲染」四步分发。

use crate::adapter::{HandlerAdapter, HandlerAdapterRegistry};
use crate::error::{DispatchError, MvcError};
use crate::mapping::{HandlerMapping, HandlerMappingRegistry};
use crate::request::{WebRequest, WebResponse};
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use std::sync::Arc;

/// 类似 Spring 的 DispatcherServlet
///
/// 生命周期：Uninitialized -> Ready，由启动阶段的一次 [`initialize`](Self::initialize)
/// 触发且进程内不可逆。注册接口取 `&mut self`，初始化完成后配置即只读，
/// [`service`](Self::service) 可被并发调用。
pub struct Dispatcher {
    mapping_registry: HandlerMappingRegistry,
    adapter_registry: HandlerAdapterRegistry,
    initialized: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            mapping_registry: HandlerMappingRegistry::new(),
            adapter_registry: HandlerAdapterRegistry::new(),
            initialized: false,
        }
    }

    /// 追加一个 HandlerMapping，注册顺序决定解析优先级
    pub fn register_mapping(&mut self, mapping: Box<dyn HandlerMapping>) {
        self.mapping_registry.register(mapping);
    }

    /// 追加一个 HandlerAdapter，注册顺序决定匹配优先级
    pub fn register_adapter(&mut self, adapter: Arc<dyn HandlerAdapter>) {
        self.adapter_registry.register(adapter);
    }

    /// 初始化全部映射；失败即中止启动
    pub fn initialize(&mut self) -> Result<(), MvcError> {
        self.mapping_registry.initialize()?;
        self.initialized = true;
        tracing::info!(
            "✅ Dispatcher initialized: {} mappings, {} adapters",
            self.mapping_registry.len(),
            self.adapter_registry.len()
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// 带类型化错误的分发流程，保留失败类别供观测
    pub async fn dispatch(&self, request: Arc<WebRequest>) -> Result<WebResponse, DispatchError> {
        if !self.initialized {
            return Err(DispatchError::NotInitialized);
        }

        let handler = self.mapping_registry.resolve(&request)?;
        let adapter = self.adapter_registry.resolve(&handler)?;

        let model_and_view = adapter
            .handle(Arc::clone(&request), &handler)
            .await
            .map_err(DispatchError::Invocation)?;

        model_and_view
            .render(&request)
            .await
            .map_err(DispatchError::Rendering)
    }

    /// 请求入口：所有失败在此边界折叠为一个传输层响应
    pub async fn service(&self, request: WebRequest) -> WebResponse {
        let method = request.method().to_string();
        let path = request.uri().path().to_string();
        let request = Arc::new(request);

        match self.dispatch(request).await {
            Ok(response) => response,
            Err(error) => {
                match &error {
                    DispatchError::HandlerNotFound { .. } => {
                        tracing::warn!(method = %method, path = %path, "No handler found");
                    }
                    other => {
                        tracing::error!(
                            method = %method,
                            path = %path,
                            error = ?other,
                            "Request could not be completed"
                        );
                    }
                }
                failure_response(error.status_code())
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn failure_response(status: StatusCode) -> WebResponse {
    let body = status.canonical_reason().unwrap_or("request failed");
    let mut response = http::Response::new(Bytes::from_static(body.as_bytes()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ControllerAdapter, HandlerExecutionAdapter};
    use crate::controller::Controller;
    use crate::mapping::ManualHandlerMapping;
    use crate::model_and_view::Model;
    use crate::template::TemplateEngine;
    use crate::view::View;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(method: http::Method, path: &str) -> WebRequest {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    struct PageController(&'static str);

    #[async_trait]
    impl Controller for PageController {
        async fn execute(&self, _request: Arc<WebRequest>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingController;

    #[async_trait]
    impl Controller for FailingController {
        async fn execute(&self, _request: Arc<WebRequest>) -> Result<String> {
            anyhow::bail!("database unavailable")
        }
    }

    struct CountingView(Arc<AtomicUsize>);

    #[async_trait]
    impl View for CountingView {
        async fn render(&self, _model: &Model, _request: &WebRequest) -> Result<WebResponse> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(http::Response::new(Bytes::from_static(b"rendered")))
        }
    }

    struct BrokenView;

    #[async_trait]
    impl View for BrokenView {
        async fn render(&self, _model: &Model, _request: &WebRequest) -> Result<WebResponse> {
            anyhow::bail!("template corrupted")
        }
    }

    fn template_dispatcher(template: (&str, &str), controller_path: &str, view_name: &'static str) -> Dispatcher {
        let engine = Arc::new(TemplateEngine::new());
        engine.add_raw_template(template.0, template.1).unwrap();

        let mut manual = ManualHandlerMapping::new();
        manual.register(controller_path, Arc::new(PageController(view_name)));

        let mut dispatcher = Dispatcher::new();
        dispatcher.register_mapping(Box::new(manual));
        dispatcher.register_adapter(Arc::new(HandlerExecutionAdapter));
        dispatcher.register_adapter(Arc::new(ControllerAdapter::new(engine)));
        dispatcher.initialize().unwrap();
        dispatcher
    }

    #[tokio::test]
    async fn test_full_dispatch_renders_view() {
        let dispatcher = template_dispatcher(("index.html", "welcome"), "/", "index.html");

        let response = dispatcher.service(request(http::Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "welcome");
    }

    #[tokio::test]
    async fn test_unmapped_path_yields_not_found() {
        let dispatcher = template_dispatcher(("index.html", "welcome"), "/", "index.html");

        let response = dispatcher.service(request(http::Method::GET, "/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatch_before_initialize_is_rejected() {
        let dispatcher = Dispatcher::new();
        let error = dispatcher
            .dispatch(Arc::new(request(http::Method::GET, "/")))
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::NotInitialized));
    }

    #[tokio::test]
    async fn test_invocation_failure_never_reaches_render() {
        let rendered = Arc::new(AtomicUsize::new(0));

        let mut manual = ManualHandlerMapping::new();
        manual.register("/broken", Arc::new(FailingController));

        let counter = Arc::clone(&rendered);
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_mapping(Box::new(manual));
        dispatcher.register_adapter(Arc::new(ControllerAdapter::with_view_factory(Box::new(
            move |_name| -> Arc<dyn View> { Arc::new(CountingView(Arc::clone(&counter))) },
        ))));
        dispatcher.initialize().unwrap();

        let error = dispatcher
            .dispatch(Arc::new(request(http::Method::GET, "/broken")))
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::Invocation(_)));
        assert_eq!(rendered.load(Ordering::SeqCst), 0);

        // service 边界折叠为通用失败响应
        let response = dispatcher.service(request(http::Method::GET, "/broken")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rendering_failure_surfaces_as_server_error() {
        let mut manual = ManualHandlerMapping::new();
        manual.register("/page", Arc::new(PageController("page.html")));

        let mut dispatcher = Dispatcher::new();
        dispatcher.register_mapping(Box::new(manual));
        dispatcher.register_adapter(Arc::new(ControllerAdapter::with_view_factory(Box::new(
            |_name| -> Arc<dyn View> { Arc::new(BrokenView) },
        ))));
        dispatcher.initialize().unwrap();

        let error = dispatcher
            .dispatch(Arc::new(request(http::Method::GET, "/page")))
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::Rendering(_)));

        let response = dispatcher.service(request(http::Method::GET, "/page")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_adapter_surfaces_as_server_error() {
        let mut manual = ManualHandlerMapping::new();
        manual.register("/legacy", Arc::new(PageController("page.html")));

        // 只注册了注解适配器，旧式 Controller 无适配器可用
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_mapping(Box::new(manual));
        dispatcher.register_adapter(Arc::new(HandlerExecutionAdapter));
        dispatcher.initialize().unwrap();

        let error = dispatcher
            .dispatch(Arc::new(request(http::Method::GET, "/legacy")))
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::AdapterNotFound { .. }));

        let response = dispatcher.service(request(http::Method::GET, "/legacy")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_counting_view_renders_once_on_success() {
        let rendered = Arc::new(AtomicUsize::new(0));

        let mut manual = ManualHandlerMapping::new();
        manual.register("/page", Arc::new(PageController("page.html")));

        let counter = Arc::clone(&rendered);
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_mapping(Box::new(manual));
        dispatcher.register_adapter(Arc::new(ControllerAdapter::with_view_factory(Box::new(
            move |_name| -> Arc<dyn View> { Arc::new(CountingView(Arc::clone(&counter))) },
        ))));
        dispatcher.initialize().unwrap();

        let response = dispatcher.service(request(http::Method::GET, "/page")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "rendered");
        assert_eq!(rendered.load(Ordering::SeqCst), 1);
    }
}
