//! Web 服务器模块
//!
//! 基于 Axum 的传输层垫片：把 Dispatcher 挂载为整个路由的 fallback，
//! 所有请求收集请求体后交给前端控制器分发。

use crate::dispatcher::Dispatcher;
use crate::request::WebRequest;
use anyhow::Context;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

/// 请求体上限，超出即拒绝
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Web 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerProperties {
    /// 服务器监听地址
    pub host: String,

    /// 服务器监听端口
    pub port: u16,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerProperties {
    /// 从环境变量加载配置（SERVER_HOST / SERVER_PORT）
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// 获取服务器地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Wyvern Web 服务器
pub struct WebServer {
    config: ServerProperties,
    dispatcher: Arc<Dispatcher>,
}

impl WebServer {
    /// 创建新的 Web 服务器；dispatcher 必须已完成初始化
    pub fn new(config: ServerProperties, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// 启动服务器
    pub async fn run(self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.dispatcher.is_initialized(),
            "dispatcher must be initialized before serving"
        );

        let addr = self.config.address();
        let dispatcher = self.dispatcher;

        let app = Router::new()
            .fallback(move |request: axum::extract::Request| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { forward(dispatcher, request).await }
            })
            .into_make_service();

        tracing::info!("🚀 Starting Wyvern Web Server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind to {}", addr))?;

        tracing::info!("✅ Server listening on http://{}", addr);

        axum::serve(listener, app).await.context("server error")?;

        Ok(())
    }
}

async fn forward(dispatcher: Arc<Dispatcher>, request: axum::extract::Request) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(error = %error, "Failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let response = dispatcher
        .service(WebRequest::from_parts(parts, bytes))
        .await;
    response.map(Body::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_properties_default_address() {
        let config = ServerProperties::default();
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_run_rejects_uninitialized_dispatcher() {
        let server = WebServer::new(ServerProperties::default(), Arc::new(Dispatcher::new()));
        assert!(server.run().await.is_err());
    }
}
