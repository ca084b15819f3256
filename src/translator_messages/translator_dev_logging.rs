// DEPENDENCY CLASSIFICATION LOGGING
#[macro_export]
#[cfg(feature = "show_deps")]
macro_rules! deps_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_deps"))]
macro_rules! deps_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// Extra timer logging
#[macro_export]
#[cfg(feature = "detailed_timers")]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        saying::say!($msg, Green #$time.elapsed());
    };
}

#[macro_export]
#[cfg(not(feature = "detailed_timers"))]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        // Nothing
    };
}

// Generated headers
#[macro_export]
#[cfg(feature = "show_headers")]
macro_rules! header_log {
    ($header:expr) => {
        saying::say!("\n", $header.to_string());
    };
}

#[macro_export]
#[cfg(not(feature = "show_headers"))]
macro_rules! header_log {
    ($header:expr) => {
        // Nothing
    };
}

// Generated implementation files
#[macro_export]
#[cfg(feature = "show_impl")]
macro_rules! impl_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_impl"))]
macro_rules! impl_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// CLOSURE CAPTURE LOGGING
#[macro_export]
#[cfg(feature = "show_closures")]
macro_rules! closure_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_closures"))]
macro_rules! closure_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// ARRAY SYNTHESIS LOGGING
#[macro_export]
#[cfg(feature = "show_arrays")]
macro_rules! array_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_arrays"))]
macro_rules! array_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}
