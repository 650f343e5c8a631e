#[cfg(test)]
mod commands_permissions_tests {
    use std::sync::Arc;

    use carechat::commands::{
        check_microphone_permission, get_permission_status_string, use_capture_device,
    };
    use carechat::permissions::PermissionStatus;
    use carechat::testing::ScriptedDevice;

    lazy_static::lazy_static! {
        static ref GRANTING_DEVICE: Arc<ScriptedDevice> =
            Arc::new(ScriptedDevice::with_chunks(vec![]));
    }

    #[tokio::test]
    async fn test_check_microphone_permission_reports_granted() {
        use_capture_device(GRANTING_DEVICE.clone()).await;

        let info = check_microphone_permission().await.unwrap();
        assert_eq!(info.status, PermissionStatus::Granted);
        assert!(!info.message.is_empty());
    }

    #[tokio::test]
    async fn test_permission_status_string_is_stable() {
        use_capture_device(GRANTING_DEVICE.clone()).await;

        let status = get_permission_status_string().await.unwrap();
        assert_eq!(status, "granted");
    }

    #[test]
    fn test_permission_status_display_values() {
        assert_eq!(PermissionStatus::Granted.to_string(), "granted");
        assert_eq!(PermissionStatus::Denied.to_string(), "denied");
        assert_eq!(PermissionStatus::NotDetermined.to_string(), "not_determined");
        assert_eq!(PermissionStatus::Restricted.to_string(), "restricted");
    }
}
