//! 请求/响应载体
//!
//! 调度核心不关心传输细节，请求与响应只是携带方法、路径和字节体的不透明载体。
//! handler 与视图共享同一个请求，因此分发时以 `Arc<WebRequest>` 传递。

use crate::error::UnsupportedMethod;
use bytes::Bytes;
use std::fmt;

/// 入站请求载体
pub type WebRequest = http::Request<Bytes>;

/// 出站响应载体
pub type WebResponse = http::Response<Bytes>;

/// 路由支持的 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl RequestMethod {
    /// 全部方法 - 路由声明未指定方法时表示匹配所有方法
    pub const ALL: &'static [RequestMethod] = &[
        RequestMethod::Get,
        RequestMethod::Post,
        RequestMethod::Put,
        RequestMethod::Delete,
        RequestMethod::Patch,
        RequestMethod::Head,
        RequestMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Head => "HEAD",
            RequestMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&http::Method> for RequestMethod {
    type Error = UnsupportedMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        match method.as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            "PATCH" => Ok(RequestMethod::Patch),
            "HEAD" => Ok(RequestMethod::Head),
            "OPTIONS" => Ok(RequestMethod::Options),
            _ => Err(UnsupportedMethod(method.to_string())),
        }
    }
}
