//! HandlerAdapter 策略与注册表
//!
//! 适配器将某一种 handler 形态的调用归一化为 ModelAndView 契约，
//! 调度核心因此无需关心 handler 如何计算结果。新增 handler 形态时
//! 注册一个新的 Mapping 和一个新的 Adapter 即可，前端控制器不变。

use crate::controller::Controller;
use crate::error::DispatchError;
use crate::handler::Handler;
use crate::model_and_view::ModelAndView;
use crate::request::WebRequest;
use crate::template::TemplateEngine;
use crate::view::{resolve_view_name, View};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// 单一 handler 形态的调用策略
#[async_trait]
pub trait HandlerAdapter: Send + Sync {
    /// 适配器名称，用于日志
    fn name(&self) -> &str;

    /// 是否支持该 handler 形态
    fn supports(&self, handler: &Handler) -> bool;

    /// 调用 handler 并归一化为 ModelAndView；任何失败原样向上传播
    async fn handle(
        &self,
        request: Arc<WebRequest>,
        handler: &Handler,
    ) -> Result<ModelAndView>;
}

/// 注解路由方法的适配器：方法自身已返回 ModelAndView，原样透传
pub struct HandlerExecutionAdapter;

#[async_trait]
impl HandlerAdapter for HandlerExecutionAdapter {
    fn name(&self) -> &str {
        "HandlerExecutionAdapter"
    }

    fn supports(&self, handler: &Handler) -> bool {
        matches!(handler, Handler::Execution(_))
    }

    async fn handle(
        &self,
        request: Arc<WebRequest>,
        handler: &Handler,
    ) -> Result<ModelAndView> {
        match handler {
            Handler::Execution(execution) => execution.handle(request).await,
            other => bail!(
                "HandlerExecutionAdapter does not support handler kind '{}'",
                other.kind()
            ),
        }
    }
}

type ViewFactory = Box<dyn Fn(&str) -> Arc<dyn View> + Send + Sync>;

/// 旧式 Controller 的适配器：把 execute 返回的视图名包装为 ModelAndView
pub struct ControllerAdapter {
    view_factory: ViewFactory,
}

impl ControllerAdapter {
    /// 默认按视图名解析：`redirect:` 前缀走重定向，其余走模板视图
    pub fn new(engine: Arc<TemplateEngine>) -> Self {
        Self {
            view_factory: Box::new(move |name| resolve_view_name(name, &engine)),
        }
    }

    /// 自定义视图名到视图的解析
    pub fn with_view_factory(view_factory: ViewFactory) -> Self {
        Self { view_factory }
    }
}

#[async_trait]
impl HandlerAdapter for ControllerAdapter {
    fn name(&self) -> &str {
        "ControllerAdapter"
    }

    fn supports(&self, handler: &Handler) -> bool {
        matches!(handler, Handler::Controller(_))
    }

    async fn handle(
        &self,
        request: Arc<WebRequest>,
        handler: &Handler,
    ) -> Result<ModelAndView> {
        match handler {
            Handler::Controller(controller) => {
                let view_name = controller.execute(request).await?;
                Ok(ModelAndView::new((self.view_factory)(&view_name)))
            }
            other => bail!(
                "ControllerAdapter does not support handler kind '{}'",
                other.kind()
            ),
        }
    }
}

impl std::fmt::Debug for dyn HandlerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 有序的 HandlerAdapter 集合
///
/// 每一种映射可能产出的 handler 形态都必须有对应的适配器，
/// 缺失属于配置错误而非运行时可恢复条件
pub struct HandlerAdapterRegistry {
    adapters: Vec<Arc<dyn HandlerAdapter>>,
}

impl HandlerAdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// 追加一个适配器，顺序由调用方决定且有意义
    pub fn register(&mut self, adapter: Arc<dyn HandlerAdapter>) {
        self.adapters.push(adapter);
    }

    /// 返回首个 supports 判定为真的适配器
    pub fn resolve(&self, handler: &Handler) -> Result<Arc<dyn HandlerAdapter>, DispatchError> {
        self.adapters
            .iter()
            .find(|adapter| adapter.supports(handler))
            .cloned()
            .ok_or_else(|| DispatchError::AdapterNotFound {
                handler_kind: handler.kind(),
            })
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for HandlerAdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
