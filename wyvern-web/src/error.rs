//! 错误类型定义
//!
//! 初始化错误与分发错误分属两个枚举：初始化失败是致命的启动错误，
//! 分发失败则在 service 边界被折叠为一个 HTTP 响应。

use http::StatusCode;

/// 启动阶段错误 - 不可恢复，直接中止启动
#[derive(Debug, thiserror::Error)]
pub enum MvcError {
    /// HandlerMapping 初始化失败（控制器构造失败、路由元数据异常等）
    #[error("handler mapping '{mapping}' failed to initialize")]
    MappingInitialization {
        mapping: String,
        #[source]
        source: anyhow::Error,
    },
}

/// 请求分发错误
///
/// 四种失败形态在 [`crate::dispatcher::Dispatcher::service`] 边界统一折叠，
/// 内部保留具体类别用于日志观测
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// 没有任何 HandlerMapping 能解析该请求
    #[error("no handler found for {method} {path}")]
    HandlerNotFound { method: String, path: String },

    /// 没有任何 HandlerAdapter 支持解析出的 handler - 属于配置错误
    #[error("no handler adapter supports handler kind '{handler_kind}'")]
    AdapterNotFound { handler_kind: &'static str },

    /// handler 执行过程中抛出错误
    #[error("handler invocation failed")]
    Invocation(#[source] anyhow::Error),

    /// 视图渲染失败
    #[error("view rendering failed")]
    Rendering(#[source] anyhow::Error),

    /// 在初始化完成前调用了分发入口
    #[error("dispatcher has not been initialized")]
    NotInitialized,
}

impl DispatchError {
    /// 映射到传输层状态码：NotFound 可恢复为 404，其余一律 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerNotFound { .. } => StatusCode::NOT_FOUND,
            Self::AdapterNotFound { .. }
            | Self::Invocation(_)
            | Self::Rendering(_)
            | Self::NotInitialized => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 无法识别的 HTTP 方法
#[derive(Debug, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(pub String);
