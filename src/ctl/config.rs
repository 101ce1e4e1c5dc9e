//! 控制器配置
//!
//! 核心本身不读取文件或环境变量；配置由调用方（例如回放工具的场景文件与命令行）提供。

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// 路径上每条转发规则的优先级
    pub flow_priority: u16,
    /// table-miss 规则的优先级（必须最低）
    pub table_miss_priority: u16,
    /// 链路发现事件建立的交换机间边的权重
    pub link_weight: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            flow_priority: 1,
            table_miss_priority: 0,
            link_weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("flow_priority ({flow}) must be higher than table_miss_priority ({table_miss})")]
    PriorityOrder { flow: u16, table_miss: u16 },
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flow_priority <= self.table_miss_priority {
            return Err(ConfigError::PriorityOrder {
                flow: self.flow_priority,
                table_miss: self.table_miss_priority,
            });
        }
        Ok(())
    }
}
