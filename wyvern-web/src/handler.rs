//! Handler 值类型
//!
//! HandlerKey 是注解映射表的查找键；HandlerExecution 是控制器实例与
//! 某个路由方法的绑定；Handler 是映射层产出、适配器层消费的带标签联合。

use crate::model_and_view::ModelAndView;
use crate::request::{RequestMethod, WebRequest};
use anyhow::Result;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::controller::Controller;

/// 注解映射表的复合键（路径 + HTTP 方法），结构化相等与哈希
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    path: String,
    method: RequestMethod,
}

impl HandlerKey {
    pub fn new(path: impl Into<String>, method: RequestMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }

    /// 从请求计算查找键；方法无法识别时返回 None
    pub fn from_request(request: &WebRequest) -> Option<Self> {
        let method = RequestMethod::try_from(request.method()).ok()?;
        Some(Self::new(request.uri().path(), method))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

type BoundMethod =
    Box<dyn Fn(Arc<WebRequest>) -> BoxFuture<'static, Result<ModelAndView>> + Send + Sync>;

/// 控制器实例与其某个路由方法的绑定调用单元
///
/// 控制器实例在扫描阶段创建一次，之后被该控制器的所有路由方法共享
pub struct HandlerExecution {
    controller_type: &'static str,
    method_name: &'static str,
    invoke: BoundMethod,
}

impl HandlerExecution {
    /// 绑定控制器实例与它的一个异步路由方法
    ///
    /// 方法签名形如 `async fn hello(self: Arc<Self>, request: Arc<WebRequest>) -> Result<ModelAndView>`，
    /// 直接以方法路径传入即可
    pub fn bind<C, F, Fut>(
        controller: Arc<C>,
        controller_type: &'static str,
        method_name: &'static str,
        method: F,
    ) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, Arc<WebRequest>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ModelAndView>> + Send + 'static,
    {
        let invoke: BoundMethod = Box::new(move |request| {
            Box::pin(method(Arc::clone(&controller), request))
        });
        Self {
            controller_type,
            method_name,
            invoke,
        }
    }

    /// 调用绑定的方法
    pub async fn handle(&self, request: Arc<WebRequest>) -> Result<ModelAndView> {
        (self.invoke)(request).await
    }

    pub fn controller_type(&self) -> &'static str {
        self.controller_type
    }

    pub fn method_name(&self) -> &'static str {
        self.method_name
    }
}

impl fmt::Debug for HandlerExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerExecution")
            .field("controller_type", &self.controller_type)
            .field("method_name", &self.method_name)
            .finish()
    }
}

impl fmt::Display for HandlerExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller_type, self.method_name)
    }
}

/// 映射层产出的 handler，带类型标签
///
/// 新的 handler 形态在此追加变体，并配套一个新的 HandlerAdapter，
/// 前端控制器无需改动
#[derive(Clone)]
pub enum Handler {
    /// 注解路由方法
    Execution(Arc<HandlerExecution>),
    /// 旧式控制器对象
    Controller(Arc<dyn Controller>),
}

impl Handler {
    /// handler 形态标签，用于诊断与 AdapterNotFound 报告
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Execution(_) => "HandlerExecution",
            Handler::Controller(_) => "Controller",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Execution(execution) => {
                f.debug_tuple("Execution").field(execution).finish()
            }
            Handler::Controller(_) => f.write_str("Controller"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_and_view::ModelAndView;
    use crate::view::JsonView;
    use bytes::Bytes;
    use std::collections::HashMap;

    struct EchoController;

    impl EchoController {
        async fn echo(
            self: Arc<Self>,
            request: Arc<WebRequest>,
        ) -> Result<ModelAndView> {
            Ok(ModelAndView::new(Arc::new(JsonView))
                .with_object("path", request.uri().path()))
        }
    }

    fn get_request(path: &str) -> WebRequest {
        http::Request::builder()
            .method(http::Method::GET)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_handler_key_structural_equality() {
        let a = HandlerKey::new("/users", RequestMethod::Get);
        let b = HandlerKey::new("/users", RequestMethod::Get);
        let c = HandlerKey::new("/users", RequestMethod::Post);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut table = HashMap::new();
        table.insert(a, 1);
        assert_eq!(table.get(&b), Some(&1));
        assert!(table.get(&c).is_none());
    }

    #[test]
    fn test_handler_key_from_request() {
        let key = HandlerKey::from_request(&get_request("/users")).unwrap();
        assert_eq!(key.path(), "/users");
        assert_eq!(key.method(), RequestMethod::Get);

        let unknown = http::Request::builder()
            .method(http::Method::TRACE)
            .uri("/users")
            .body(Bytes::new())
            .unwrap();
        assert!(HandlerKey::from_request(&unknown).is_none());
    }

    #[tokio::test]
    async fn test_bound_method_invocation() {
        let execution = HandlerExecution::bind(
            Arc::new(EchoController),
            "EchoController",
            "echo",
            EchoController::echo,
        );
        assert_eq!(execution.to_string(), "EchoController#echo");

        let mav = execution.handle(Arc::new(get_request("/echo"))).await.unwrap();
        assert_eq!(
            mav.get_object("path"),
            Some(&serde_json::json!("/echo"))
        );
    }
}
