//! 注解控制器：编译时注册，初始化阶段被 AnnotationHandlerMapping 扫描装配

use serde_json::json;
use std::sync::Arc;
use wyvern_web::prelude::*;

pub const BASE: &str = module_path!();

struct ApiController {
    app_name: &'static str,
}

impl ApiController {
    fn new() -> Self {
        Self {
            app_name: "wyvern-web-demo",
        }
    }

    /// GET /api/users
    async fn list_users(
        self: Arc<Self>,
        _request: Arc<WebRequest>,
    ) -> anyhow::Result<ModelAndView> {
        tracing::info!("📋 Listing users");
        Ok(ModelAndView::new(Arc::new(JsonView)).with_object(
            "users",
            json!([
                { "id": 1, "name": "Alice", "email": "alice@example.com" },
                { "id": 2, "name": "Bob", "email": "bob@example.com" },
            ]),
        ))
    }

    /// GET /api/info
    async fn info(
        self: Arc<Self>,
        _request: Arc<WebRequest>,
    ) -> anyhow::Result<ModelAndView> {
        Ok(ModelAndView::new(Arc::new(JsonView))
            .with_object("app", self.app_name)
            .with_object("status", "running"))
    }

    /// 任意方法 /api/health
    async fn health(
        self: Arc<Self>,
        request: Arc<WebRequest>,
    ) -> anyhow::Result<ModelAndView> {
        tracing::info!("💓 Health check via {}", request.method());
        Ok(ModelAndView::new(Arc::new(JsonView))
            .with_object("status", "healthy")
            .with_object("method", request.method().as_str()))
    }
}

fn build() -> anyhow::Result<Vec<(RouteSpec, HandlerExecution)>> {
    let controller = Arc::new(ApiController::new());
    Ok(vec![
        (
            RouteSpec::new("/api/users", &[RequestMethod::Get]),
            HandlerExecution::bind(
                Arc::clone(&controller),
                "ApiController",
                "list_users",
                ApiController::list_users,
            ),
        ),
        (
            RouteSpec::new("/api/info", &[RequestMethod::Get]),
            HandlerExecution::bind(
                Arc::clone(&controller),
                "ApiController",
                "info",
                ApiController::info,
            ),
        ),
        (
            RouteSpec::any("/api/health"),
            HandlerExecution::bind(
                controller,
                "ApiController",
                "health",
                ApiController::health,
            ),
        ),
    ])
}

wyvern_web::inventory::submit! {
    ControllerRegistration::new("ApiController", module_path!(), build)
}
