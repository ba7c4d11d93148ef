//! Wyvern Web 调度框架演示
//!
//! 同时演示两种 handler 形态：
//! - 注解控制器（inventory 编译时注册，AnnotationHandlerMapping 扫描）
//! - 旧式 Controller（ManualHandlerMapping 显式注册）

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wyvern_web::prelude::*;

mod controller;

/// 旧式控制器：返回视图名，由 ControllerAdapter 包装
struct HomeController;

#[async_trait]
impl Controller for HomeController {
    async fn execute(&self, _request: Arc<WebRequest>) -> anyhow::Result<String> {
        Ok("home.html".to_string())
    }
}

/// 旧式控制器：redirect: 前缀触发重定向视图
struct LoginRedirectController;

#[async_trait]
impl Controller for LoginRedirectController {
    async fn execute(&self, _request: Arc<WebRequest>) -> anyhow::Result<String> {
        Ok("redirect:/".to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🌐 Wyvern Web - MVC Dispatch Demo");
    println!("==================================\n");

    // 模板引擎：演示用内存模板，生产环境可用 TemplateEngine::from_directory
    let engine = Arc::new(TemplateEngine::new());
    engine.add_raw_template("home.html", "<h1>Wyvern</h1><p>front controller demo</p>")?;

    // 手动映射先注册，解析优先级高于注解映射
    let mut manual = ManualHandlerMapping::new();
    manual.register("/", Arc::new(HomeController));
    manual.register("/login", Arc::new(LoginRedirectController));

    let mut dispatcher = Dispatcher::new();
    dispatcher.register_mapping(Box::new(manual));
    dispatcher.register_mapping(Box::new(AnnotationHandlerMapping::new([controller::BASE])));
    dispatcher.register_adapter(Arc::new(HandlerExecutionAdapter));
    dispatcher.register_adapter(Arc::new(ControllerAdapter::new(engine)));
    dispatcher.initialize()?;

    println!("📋 可用端点：\n");
    println!("  GET    /               - 首页（旧式 Controller + 模板视图）");
    println!("  GET    /login          - 重定向到首页");
    println!("  GET    /api/users      - 用户列表（注解控制器 + JSON 视图）");
    println!("  GET    /api/info       - 应用信息");
    println!("  *      /api/health     - 健康检查（匹配所有方法）\n");

    let server = WebServer::new(ServerProperties::from_env(), Arc::new(dispatcher));
    server.run().await
}
