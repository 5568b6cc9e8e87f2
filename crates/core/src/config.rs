use crate::permissions::PermissionsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use toml_edit::{DocumentMut, value};
use tracing::info;

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, doc: &mut DocumentMut);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, doc: &mut DocumentMut) {
                    doc.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, i64, bool);

impl<T> ConfigSerializeDefault for Option<T> {
    fn fix_config(self, _: &str, _: &mut DocumentMut) {
        assert!(self.is_none(), "`Some` as default is unimplemented");
    }
}

macro_rules! gen_config {
    (
        $( $(#[$meta:meta])* $name:ident: $type:ty = $default:expr),*
    ) => {
        #[derive(Serialize, Deserialize, Debug)]
        pub struct ServerConfig {
            $(
                $(#[$meta])*
                pub $name: $type,
            )*
        }

        impl ServerConfig {
            /// Reads `config_file`, adding any missing keys with their default
            /// value. The file is rewritten if keys had to be added.
            pub fn load(config_file: impl AsRef<Path>) -> Result<ServerConfig> {
                let config_file = config_file.as_ref();
                let str = match fs::read_to_string(config_file) {
                    Ok(str) => str,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
                    Err(err) => {
                        return Err(err).with_context(|| {
                            format!("Failed to read {}", config_file.display())
                        })
                    }
                };
                let mut doc = str
                    .parse::<DocumentMut>()
                    .with_context(|| format!("Failed to parse {}", config_file.display()))?;

                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, stringify!($name), &mut doc);
                )*

                let patched = doc.to_string();
                if str != patched {
                    info!("Writing default values to {}", config_file.display());
                    fs::write(config_file, &patched)
                        .with_context(|| format!("Failed to write {}", config_file.display()))?;
                }

                toml::from_str(&patched)
                    .with_context(|| format!("Invalid configuration in {}", config_file.display()))
            }
        }
    };
}

gen_config! {
    /// Name used for command lines typed without a player name.
    console_username: String = "Console".to_string(),
    /// Log every command line the console driver handles.
    log_commands: bool = true,
    permissions: Option<PermissionsConfig> = None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.console_username, "Console");
        assert!(config.log_commands);
        assert!(config.permissions.is_none());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("console_username = \"Console\""));
        assert!(written.contains("log_commands = true"));
    }

    #[test]
    fn existing_values_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(
            &path,
            r#"# server owner comment
log_commands = false

[permissions.users.Steve]
"essentials.setwarp" = true
"group.admin" = true

[permissions.groups.admin]
"essentials.*" = true
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert!(!config.log_commands);
        assert_eq!(config.console_username, "Console");
        let permissions = config.permissions.unwrap();
        let mut steve: Vec<_> = permissions.users["Steve"].keys().cloned().collect();
        steve.sort();
        assert_eq!(steve, ["essentials.setwarp", "group.admin"]);
        assert!(permissions.groups["admin"]["essentials.*"]);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# server owner comment"));
        assert!(written.contains("console_username = \"Console\""));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "log_commands = = true").unwrap();
        let err = ServerConfig::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
