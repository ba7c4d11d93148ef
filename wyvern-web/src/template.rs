//! 模板引擎支持
//!
//! 基于 Tera 模板引擎，为 TemplateView 提供渲染能力。
//! 支持从目录加载模板，也支持注册内存中的原始模板（便于测试和演示）。

use crate::model_and_view::Model;
use anyhow::{anyhow, Context, Result};
use std::sync::RwLock;
use tera::Tera;

/// Tera 模板引擎封装
pub struct TemplateEngine {
    tera: RwLock<Tera>,
}

impl TemplateEngine {
    /// 创建一个空引擎，模板通过 [`add_raw_template`](Self::add_raw_template) 注册
    pub fn new() -> Self {
        Self {
            tera: RwLock::new(Tera::default()),
        }
    }

    /// 从模板目录加载（glob 模式，例如 `"templates/**/*"`）
    pub fn from_directory(pattern: &str) -> Result<Self> {
        let tera = Tera::new(pattern)
            .with_context(|| format!("failed to load templates from '{}'", pattern))?;
        Ok(Self {
            tera: RwLock::new(tera),
        })
    }

    /// 注册一个内存模板
    pub fn add_raw_template(&self, name: &str, content: &str) -> Result<()> {
        let mut tera = self
            .tera
            .write()
            .map_err(|_| anyhow!("template engine lock poisoned"))?;
        tera.add_raw_template(name, content)
            .with_context(|| format!("failed to register template '{}'", name))?;
        Ok(())
    }

    /// 以模型数据渲染指定模板
    pub fn render(&self, name: &str, model: &Model) -> Result<String> {
        let context = tera::Context::from_serialize(model)
            .context("failed to build template context from model")?;
        let tera = self
            .tera
            .read()
            .map_err(|_| anyhow!("template engine lock poisoned"))?;
        tera.render(name, &context)
            .with_context(|| format!("failed to render template '{}'", name))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_raw_template() {
        let engine = TemplateEngine::new();
        engine
            .add_raw_template("greeting.html", "<p>Hello, {{ name }}!</p>")
            .unwrap();

        let mut model = Model::new();
        model.insert("name".to_string(), json!("Wyvern"));

        let html = engine.render("greeting.html", &model).unwrap();
        assert_eq!(html, "<p>Hello, Wyvern!</p>");
    }

    #[test]
    fn test_render_unknown_template_fails() {
        let engine = TemplateEngine::new();
        let model = Model::new();
        assert!(engine.render("missing.html", &model).is_err());
    }
}
