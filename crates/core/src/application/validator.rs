// Environment Validator - hard gate before any engine or connection exists

use crate::domain::host::{boot_descriptor_path, BOOT_DESCRIPTOR};
use crate::domain::{RunContext, RuntimeOptions};
use crate::error::{AppError, Result};
use tracing::{debug, warn};

/// Confirm `options.app_root` is a bootable host application root.
///
/// On success returns the [`RunContext`] derived from the options (debug
/// level and shutdown policy).
pub fn validate_environment(options: &RuntimeOptions) -> Result<RunContext> {
    let descriptor = boot_descriptor_path(&options.app_root);

    if !descriptor.is_file() {
        warn!(
            app_root = %options.app_root.display(),
            descriptor = %descriptor.display(),
            "Boot descriptor not found"
        );
        return Err(AppError::InvalidAppRoot {
            root: options.app_root.clone(),
            descriptor: BOOT_DESCRIPTOR.to_string(),
        });
    }

    let ctx = RunContext::from_options(options);
    debug!(
        app_root = %options.app_root.display(),
        debug = ?ctx.debug,
        shutdown = ?ctx.shutdown,
        "Environment validated"
    );
    Ok(ctx)
}
