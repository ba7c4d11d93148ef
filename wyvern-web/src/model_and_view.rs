//! 请求处理结果聚合
//!
//! ModelAndView 由 handler 创建，携带渲染数据与负责渲染的视图，
//! 每个请求创建一次、渲染一次后即被消费。

use crate::request::{WebRequest, WebResponse};
use crate::view::View;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 模型数据 - 视图渲染的输入
pub type Model = HashMap<String, Value>;

/// 类似 Spring MVC 的 ModelAndView
pub struct ModelAndView {
    view: Arc<dyn View>,
    model: Model,
}

impl ModelAndView {
    pub fn new(view: Arc<dyn View>) -> Self {
        Self {
            view,
            model: Model::new(),
        }
    }

    /// 向模型中添加一个对象
    pub fn add_object(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.model.insert(key.into(), value.into());
    }

    /// 链式添加模型对象
    pub fn with_object(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_object(key, value);
        self
    }

    pub fn get_object(&self, key: &str) -> Option<&Value> {
        self.model.get(key)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn view(&self) -> &Arc<dyn View> {
        &self.view
    }

    /// 渲染视图并产生响应
    ///
    /// 取 self 所有权：一个 ModelAndView 只能被渲染一次
    pub async fn render(self, request: &WebRequest) -> Result<WebResponse> {
        self.view.render(&self.model, request).await
    }
}

impl fmt::Debug for ModelAndView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAndView")
            .field("model_keys", &self.model.keys().collect::<Vec<_>>())
            .finish()
    }
}
