//! Security - Permissions

use serde::{Deserialize, Serialize};

/// 用户权限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// 管理员，隐含所有其他权限
    Admin,
    Music,
    Download,
    Ai,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Music => "music",
            Self::Download => "download",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 检查权限集合是否满足要求（Admin 满足任何要求）
pub fn has_permission(granted: &[Permission], required: Permission) -> bool {
    granted
        .iter()
        .any(|p| *p == required || *p == Permission::Admin)
}
