mod r#impl;
mod structs;

pub use r#impl::{get_config, init_config, set_config};
pub use structs::*;

/// TypeScript 类型导出路径
pub const TS_EXPORT_PATH: &str = "../dashboard/src/services/types.generated.ts";
