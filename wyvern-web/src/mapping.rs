//! HandlerMapping 策略与注册表
//!
//! 映射策略将请求解析为 handler：
//! - [`AnnotationHandlerMapping`] 扫描编译时收集的控制器注册，按 (路径, 方法) 精确匹配
//! - [`ManualHandlerMapping`] 启动前显式注册的路径表，仅按路径匹配
//!
//! [`HandlerMappingRegistry`] 按注册顺序依次询问各映射，首个命中者胜出。

use crate::controller::{scan_controllers, Controller};
use crate::error::{DispatchError, MvcError};
use crate::handler::{Handler, HandlerExecution, HandlerKey};
use crate::request::WebRequest;
use std::collections::HashMap;
use std::sync::Arc;

/// 请求到 handler 的解析策略
///
/// `initialize` 在单线程启动阶段调用一次；初始化完成后映射表只读，
/// `get_handler` 可被并发调用
pub trait HandlerMapping: Send + Sync {
    /// 映射名称，用于日志与初始化错误报告
    fn name(&self) -> &str;

    /// 一次性初始化；失败是致命的启动错误
    fn initialize(&mut self) -> anyhow::Result<()>;

    /// 解析请求；不匹配时返回 None
    fn get_handler(&self, request: &WebRequest) -> Option<Handler>;
}

/// 注解驱动的映射：扫描基础模块下的控制器注册构建路由表
pub struct AnnotationHandlerMapping {
    base_modules: Vec<String>,
    handler_executions: HashMap<HandlerKey, Arc<HandlerExecution>>,
}

impl AnnotationHandlerMapping {
    /// 以一组基础模块路径创建，初始化前路由表为空
    pub fn new<I, S>(base_modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_modules: base_modules.into_iter().map(Into::into).collect(),
            handler_executions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.handler_executions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handler_executions.is_empty()
    }
}

impl HandlerMapping for AnnotationHandlerMapping {
    fn name(&self) -> &str {
        "AnnotationHandlerMapping"
    }

    fn initialize(&mut self) -> anyhow::Result<()> {
        // 重建路由表，重复初始化得到相同结果
        self.handler_executions.clear();

        tracing::info!(
            "🔍 Scanning controllers under base modules {:?}...",
            self.base_modules
        );

        for registration in scan_controllers(&self.base_modules) {
            let routes = (registration.build)().map_err(|e| {
                e.context(format!(
                    "failed to construct controller '{}'",
                    registration.type_name
                ))
            })?;

            let mut route_count = 0;
            for (spec, execution) in routes {
                let execution = Arc::new(execution);
                for method in spec.methods {
                    let key = HandlerKey::new(spec.path, *method);
                    if let Some(previous) =
                        self.handler_executions.insert(key.clone(), Arc::clone(&execution))
                    {
                        // 重复注册采用覆盖语义，保留告警便于排查
                        tracing::warn!(
                            key = %key,
                            previous = %previous,
                            current = %execution,
                            "Duplicate route registration, the last one wins"
                        );
                    }
                    route_count += 1;
                }
            }
            tracing::info!(
                "✅ Registered controller: {} ({} routes)",
                registration.type_name,
                route_count
            );
        }

        tracing::info!(
            "✅ AnnotationHandlerMapping initialized: {} routes",
            self.handler_executions.len()
        );
        Ok(())
    }

    fn get_handler(&self, request: &WebRequest) -> Option<Handler> {
        // 仅精确匹配，不做通配或路径变量解析
        let key = HandlerKey::from_request(request)?;
        self.handler_executions
            .get(&key)
            .map(|execution| Handler::Execution(Arc::clone(execution)))
    }
}

/// 手动注册的旧式映射：路径到 Controller 实例的固定表
///
/// 旧式映射只按路径区分，不参与 HTTP 方法判别
pub struct ManualHandlerMapping {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ManualHandlerMapping {
    pub fn new() -> Self {
        Self {
            controllers: HashMap::new(),
        }
    }

    /// 启动前注册一个路径对应的控制器
    pub fn register(&mut self, path: impl Into<String>, controller: Arc<dyn Controller>) {
        self.controllers.insert(path.into(), controller);
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl Default for ManualHandlerMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerMapping for ManualHandlerMapping {
    fn name(&self) -> &str {
        "ManualHandlerMapping"
    }

    fn initialize(&mut self) -> anyhow::Result<()> {
        // 表在注册时已就绪，这里只做记录
        tracing::info!(
            "✅ ManualHandlerMapping initialized: {} paths",
            self.controllers.len()
        );
        Ok(())
    }

    fn get_handler(&self, request: &WebRequest) -> Option<Handler> {
        self.controllers
            .get(request.uri().path())
            .map(|controller| Handler::Controller(Arc::clone(controller)))
    }
}

/// 有序的 HandlerMapping 集合
///
/// 注册顺序即查询顺序，首个非空命中者胜出
pub struct HandlerMappingRegistry {
    mappings: Vec<Box<dyn HandlerMapping>>,
}

impl HandlerMappingRegistry {
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// 追加一个映射，顺序由调用方决定且有意义
    pub fn register(&mut self, mapping: Box<dyn HandlerMapping>) {
        self.mappings.push(mapping);
    }

    /// 按注册顺序初始化所有映射；任一失败即中止启动
    pub fn initialize(&mut self) -> Result<(), MvcError> {
        for mapping in &mut self.mappings {
            let name = mapping.name().to_string();
            mapping
                .initialize()
                .map_err(|source| MvcError::MappingInitialization {
                    mapping: name,
                    source,
                })?;
        }
        Ok(())
    }

    /// 解析请求为 handler；所有映射都未命中时返回 HandlerNotFound
    pub fn resolve(&self, request: &WebRequest) -> Result<Handler, DispatchError> {
        self.mappings
            .iter()
            .find_map(|mapping| mapping.get_handler(request))
            .ok_or_else(|| DispatchError::HandlerNotFound {
                method: request.method().to_string(),
                path: request.uri().path().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for HandlerMappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
