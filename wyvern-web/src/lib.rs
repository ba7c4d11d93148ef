//! # Wyvern Web
//!
//! Spring MVC 风格的 Rust 前端控制器调度框架
//!
//! ## 核心特性
//!
//! - **前端控制器** - 所有请求经过 [`dispatcher::Dispatcher`] 统一分发
//! - **可插拔映射** - 手动注册表与编译时扫描两种 HandlerMapping 策略
//! - **适配器模式** - HandlerAdapter 将异构 handler 归一化为 ModelAndView 调用契约
//! - **注解驱动** - 使用 inventory 实现控制器的编译时自动收集
//! - **视图渲染** - 基于 Tera 的模板视图、JSON 视图与重定向视图

pub mod adapter;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod mapping;
pub mod model_and_view;
pub mod request;
pub mod server;
pub mod template;
pub mod view;

// 供控制器注册宏使用
pub use inventory;

pub mod prelude {
    //! 预导入模块

    pub use crate::adapter::{
        ControllerAdapter, HandlerAdapter, HandlerAdapterRegistry, HandlerExecutionAdapter,
    };
    pub use crate::controller::{Controller, ControllerRegistration, RouteSpec};
    pub use crate::dispatcher::Dispatcher;
    pub use crate::error::{DispatchError, MvcError};
    pub use crate::handler::{Handler, HandlerExecution, HandlerKey};
    pub use crate::mapping::{
        AnnotationHandlerMapping, HandlerMapping, HandlerMappingRegistry, ManualHandlerMapping,
    };
    pub use crate::model_and_view::{Model, ModelAndView};
    pub use crate::request::{RequestMethod, WebRequest, WebResponse};
    pub use crate::server::{ServerProperties, WebServer};
    pub use crate::template::TemplateEngine;
    pub use crate::view::{JsonView, RedirectView, TemplateView, View};

    pub use async_trait::async_trait;
    pub use http::StatusCode;
}
