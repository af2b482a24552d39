//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;
use tabled::Tabled;

use nimbra_core::TlsVerification;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ResolvedView {
    profile: String,
    gateway: String,
    element: String,
    token: &'static str,
    tls: String,
    timeout_secs: u64,
    retry_attempts: u32,
    retry_interval_secs: u64,
    store: String,
}

impl ResolvedView {
    fn detail(&self) -> String {
        format!(
            "Profile:  {}\nGateway:  {}\nElement:  {}\nToken:    {}\nTLS:      {}\n\
             Timeout:  {}s\nRetry:    {} x {}s\nStore:    {}",
            self.profile,
            self.gateway,
            self.element,
            self.token,
            self.tls,
            self.timeout_secs,
            self.retry_attempts,
            self.retry_interval_secs,
            self.store,
        )
    }
}

#[derive(Clone, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Default")]
    default: String,
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("nimbra configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let gateway: String = Input::new()
                .with_prompt("Gateway URL")
                .default("https://localhost".into())
                .interact_text()
                .map_err(prompt_err)?;

            let element: String = Input::new()
                .with_prompt("Element name")
                .default(config::DEFAULT_ELEMENT.into())
                .interact_text()
                .map_err(prompt_err)?;

            let token = rpassword::prompt_password("Gateway token (empty for none): ")
                .map_err(prompt_err)?;

            let token_field = if token.is_empty() {
                None
            } else {
                let store_choices = &[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ];
                let store_selection = Select::new()
                    .with_prompt("Where to store the token?")
                    .items(store_choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;
                if store_selection == 0 {
                    config::store_token(&profile_name, &token)?;
                    eprintln!("   Token stored in system keyring");
                    None
                } else {
                    Some(token)
                }
            };

            let mut cfg = config::load_config()?;
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    gateway,
                    element,
                    token: token_field,
                    ..Profile::default()
                },
            );
            if cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }
            let path = config::save_config(&cfg)?;
            output::print_success(
                &format!("Profile '{profile_name}' saved to {}", path.display()),
                color,
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let resolved = config::resolve(global)?;
            let settings = &resolved.controller;
            let view = ResolvedView {
                profile: resolved.profile_name.clone(),
                gateway: settings.url.to_string(),
                element: settings.element.clone(),
                token: if settings.token.is_some() { "set" } else { "none" },
                tls: match settings.tls {
                    TlsVerification::SystemDefaults => "system".into(),
                    TlsVerification::CustomCa(ref path) => format!("ca {}", path.display()),
                    TlsVerification::DangerAcceptInvalid => "insecure".into(),
                },
                timeout_secs: settings.timeout.as_secs(),
                retry_attempts: settings.retry.max_attempts,
                retry_interval_secs: settings.retry.interval.as_secs(),
                store: resolved.store.display().to_string(),
            };
            let out = output::render_single(
                &global.output,
                &view,
                ResolvedView::detail,
                |v| v.profile.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = config::active_profile_name(global, &cfg);
            let mut rows: Vec<ProfileRow> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileRow {
                    default: if *name == default { "*".into() } else { String::new() },
                    name: name.clone(),
                    gateway: p.gateway.clone(),
                    element: p.element.clone(),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            let out = output::render_list(
                &global.output,
                &rows,
                ProfileRow::clone,
                |r| r.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_success(&format!("Default profile is now '{name}'"), color, global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config()?;
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            let token = rpassword::prompt_password(format!("Token for '{name}': "))
                .map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            config::store_token(&name, &token)?;
            output::print_success(
                &format!("Token for '{name}' stored in system keyring"),
                color,
                global.quiet,
            );
            Ok(())
        }
    }
}
