use tauri::command;

use super::active_device;
use crate::permissions::PermissionInfo;

/// Check microphone permission status without prompting
#[command]
pub async fn check_microphone_permission() -> Result<PermissionInfo, String> {
    let device = active_device().await?;
    Ok(device.permission().await)
}

/// Get microphone permission status as a plain string
#[command]
pub async fn get_permission_status_string() -> Result<String, String> {
    let device = active_device().await?;
    Ok(device.permission().await.status.to_string())
}
