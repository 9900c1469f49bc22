/*
 * Resolves the per-user directories the application writes to: the local
 * configuration directory holding `settings.json`, and the log file used when no
 * terminal is available.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

const LOG_FILENAME: &str = "text_finder.log";

/*
 * Returns the platform-local (non-roaming) configuration directory for
 * `app_name`, creating it if needed. No organization qualifier is used, so on
 * Windows this is `AppData/Local/<app_name>/config`. Returns `None` when no home
 * directory can be determined or the directory cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving config dir for '{app_name}'");
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    let config_path = proj_dirs.config_local_dir();
    if !config_path.exists() {
        if let Err(e) = fs::create_dir_all(config_path) {
            log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created config directory {config_path:?}");
    }
    Some(config_path.to_path_buf())
}

pub fn get_log_file_path(app_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(LOG_FILENAME))
}
