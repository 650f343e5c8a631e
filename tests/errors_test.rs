#[cfg(test)]
mod error_tests {
    use carechat::errors::ComposerError;
    use std::error::Error;

    #[test]
    fn test_permission_denied_display() {
        let error = ComposerError::PermissionDenied("Microphone refused".to_string());
        assert!(error.to_string().contains("Permission denied"));
        assert!(error.to_string().contains("Microphone refused"));
    }

    #[test]
    fn test_device_error_display() {
        let error = ComposerError::DeviceError("Recorder stalled".to_string());
        assert_eq!(error.to_string(), "Capture device error: Recorder stalled");
    }

    #[test]
    fn test_codec_error_display() {
        let error = ComposerError::CodecError("Bad payload".to_string());
        assert_eq!(error.to_string(), "Codec error: Bad payload");
    }

    #[test]
    fn test_debug_format() {
        let error = ComposerError::PersistenceError("Debug test".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("PersistenceError"));
        assert!(debug_str.contains("Debug test"));
    }

    #[test]
    fn test_implements_error_trait() {
        let error = ComposerError::PermissionDenied("Error trait test".to_string());
        let _error_trait: &dyn Error = &error;
        assert!(error.source().is_none()); // ComposerError doesn't wrap other errors
    }

    #[test]
    fn test_all_error_variant_messages() {
        let test_cases = vec![
            (
                ComposerError::PermissionDenied("test".to_string()),
                "Permission denied error",
            ),
            (
                ComposerError::DeviceError("test".to_string()),
                "Capture device error",
            ),
            (ComposerError::CodecError("test".to_string()), "Codec error"),
            (
                ComposerError::PersistenceError("test".to_string()),
                "Persistence error",
            ),
            (
                ComposerError::IdentityMismatch("test".to_string()),
                "Identity mismatch error",
            ),
        ];

        for (error, expected_prefix) in test_cases {
            let display = error.to_string();
            assert!(
                display.contains(expected_prefix),
                "Error '{}' should contain prefix '{}'",
                display,
                expected_prefix
            );
            assert!(
                display.contains("test"),
                "Error '{}' should contain message 'test'",
                display
            );
        }
    }

    #[test]
    fn test_error_message_extraction() {
        let test_message = "Detailed error information";

        match ComposerError::PersistenceError(test_message.to_string()) {
            ComposerError::PersistenceError(msg) => assert_eq!(msg, test_message),
            _ => panic!("Wrong error variant"),
        }

        match ComposerError::IdentityMismatch(test_message.to_string()) {
            ComposerError::IdentityMismatch(msg) => assert_eq!(msg, test_message),
            _ => panic!("Wrong error variant"),
        }
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ComposerError>();
        assert_sync::<ComposerError>();
    }

    #[test]
    fn test_error_propagation() {
        fn request_device() -> Result<(), ComposerError> {
            Err(ComposerError::DeviceError("No microphone found".to_string()))
        }

        fn start_recording() -> Result<Vec<u8>, ComposerError> {
            request_device()?;
            Ok(vec![])
        }

        match start_recording() {
            Err(ComposerError::DeviceError(msg)) => {
                assert_eq!(msg, "No microphone found");
            }
            _ => panic!("Expected DeviceError to propagate"),
        }
    }

    #[test]
    fn test_error_boxing() {
        let errors: Vec<Box<dyn Error>> = vec![
            Box::new(ComposerError::PermissionDenied("denied".to_string())),
            Box::new(ComposerError::CodecError("garbled".to_string())),
            Box::new(ComposerError::PersistenceError("offline".to_string())),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_error_string_conversion_for_commands() {
        // The command layer hands errors to the frontend as strings.
        let error = ComposerError::IdentityMismatch("user-9 is not in this pair".to_string());
        let as_string = error.to_string();
        assert_eq!(
            as_string,
            "Identity mismatch error: user-9 is not in this pair"
        );
    }
}
