/// Formats its arguments, redacts the result through [`crate::SecretRedactor`],
/// then emits at `info` level.
#[macro_export]
macro_rules! redacted_info {
    ($($arg:tt)*) => {
        tracing::info!("{}", $crate::SecretRedactor::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_warn {
    ($($arg:tt)*) => {
        tracing::warn!("{}", $crate::SecretRedactor::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_error {
    ($($arg:tt)*) => {
        tracing::error!("{}", $crate::SecretRedactor::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_debug {
    ($($arg:tt)*) => {
        tracing::debug!("{}", $crate::SecretRedactor::redact(&format!($($arg)*)))
    };
}
