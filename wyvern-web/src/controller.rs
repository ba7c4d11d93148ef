//! 控制器契约与编译时注册
//!
//! 两种控制器形态：
//! - 旧式 [`Controller`]：execute 返回视图名字符串，由 ManualHandlerMapping 按路径注册
//! - 注解控制器：通过 [`ControllerRegistration`] 用 inventory 在编译时收集，
//!   由 AnnotationHandlerMapping 在初始化阶段扫描装配

use crate::handler::HandlerExecution;
use crate::request::{RequestMethod, WebRequest};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 旧式控制器契约
///
/// 返回视图名字符串，由 ControllerAdapter 包装为 ModelAndView
#[async_trait]
pub trait Controller: Send + Sync {
    async fn execute(&self, request: Arc<WebRequest>) -> Result<String>;
}

/// 路由元数据：路径模式 + 该方法响应的 HTTP 方法集合
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub path: &'static str,
    pub methods: &'static [RequestMethod],
}

impl RouteSpec {
    pub const fn new(path: &'static str, methods: &'static [RequestMethod]) -> Self {
        Self { path, methods }
    }

    /// 匹配所有 HTTP 方法的路由
    pub const fn any(path: &'static str) -> Self {
        Self {
            path,
            methods: RequestMethod::ALL,
        }
    }
}

/// 控制器注册信息
///
/// `build` 在映射初始化阶段被调用恰好一次：构造控制器实例，
/// 并返回该实例全部路由方法的绑定。构造失败是致命的启动错误。
pub struct ControllerRegistration {
    /// 控制器类型名称
    pub type_name: &'static str,

    /// 注册处的模块路径（`module_path!()`），用于基础模块过滤
    pub module_path: &'static str,

    /// 构造实例并绑定路由方法
    pub build: fn() -> Result<Vec<(RouteSpec, HandlerExecution)>>,
}

impl ControllerRegistration {
    pub const fn new(
        type_name: &'static str,
        module_path: &'static str,
        build: fn() -> Result<Vec<(RouteSpec, HandlerExecution)>>,
    ) -> Self {
        Self {
            type_name,
            module_path,
            build,
        }
    }
}

// 使用 inventory 收集所有控制器注册
inventory::collect!(ControllerRegistration);

/// 扫描落在任一基础模块之下的控制器注册
pub fn scan_controllers(base_modules: &[String]) -> Vec<&'static ControllerRegistration> {
    inventory::iter::<ControllerRegistration>
        .into_iter()
        .filter(|registration| {
            base_modules
                .iter()
                .any(|base| module_matches(base, registration.module_path))
        })
        .collect()
}

fn module_matches(base: &str, module_path: &str) -> bool {
    module_path == base
        || (module_path.starts_with(base) && module_path[base.len()..].starts_with("::"))
}
