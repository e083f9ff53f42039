//! 安全模块
//!
//! 写入校验和 HTTP 安全响应头。

pub mod middleware;
pub mod validation;

pub use middleware::security_headers_middleware;
pub use validation::{Validatable, ValidationError, ValidationResult};
