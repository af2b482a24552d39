//! CLI configuration -- thin wrapper around `nimbra_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--gateway, --element, --token, --store, ...).

use std::path::PathBuf;

use secrecy::SecretString;

use nimbra_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use nimbra_config::{
    Config, DEFAULT_ELEMENT, Profile, config_path, load_config, save_config, store_path,
    store_token,
};

/// Everything a command needs to reach the element and the store.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub controller: ControllerConfig,
    pub store: PathBuf,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Merge the config file, the active profile and CLI flags.
///
/// Without a matching profile, `--gateway` alone is enough; an explicitly
/// named profile that does not exist is an error.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name: profile_name,
            });
        }
        None => Profile {
            element: DEFAULT_ELEMENT.into(),
            ..Profile::default()
        },
    };

    // Flag > env > profile
    if let Some(ref gateway) = global.gateway {
        profile.gateway.clone_from(gateway);
    }
    if profile.gateway.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    if let Some(ref element) = global.element {
        profile.element.clone_from(element);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(ref store) = global.store {
        profile.store = Some(store.clone());
    }

    let mut controller =
        nimbra_config::profile_to_controller_config(&profile, &profile_name, &cfg.defaults)?;
    if let Some(ref token) = global.token {
        controller.token = Some(SecretString::from(token.clone()));
    }

    tracing::debug!(
        profile = %profile_name,
        gateway = %controller.url,
        element = %controller.element,
        insecure = matches!(controller.tls, TlsVerification::DangerAcceptInvalid),
        timeout = ?controller.timeout,
        "resolved gateway settings"
    );

    Ok(Resolved {
        store: store_path(Some(&profile)),
        profile_name,
        controller,
    })
}

/// Store location for commands that never talk to the element.
pub fn resolve_store(global: &GlobalOpts) -> Result<PathBuf, CliError> {
    if let Some(ref store) = global.store {
        return Ok(store.clone());
    }
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    Ok(store_path(cfg.profiles.get(&profile_name)))
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}
