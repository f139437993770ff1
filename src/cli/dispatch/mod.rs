use crate::cli::actions::{Action, StoreKind};
use anyhow::Result;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let store = match matches.get_one::<String>("sso-store").map(String::as_str) {
        Some("file") => StoreKind::File,
        _ => StoreKind::Memory,
    };

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        context_path: matches
            .get_one("context-path")
            .map(|s: &String| s.to_string())
            .unwrap_or_default(),
        cookie_name: matches
            .get_one("sso-cookie-name")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --sso-cookie-name"))?,
        cookie_domain: matches
            .get_one("sso-cookie-domain")
            .map(|s: &String| s.to_string()),
        store,
        sso_file: matches.get_one("sso-file").map(|s: &String| PathBuf::from(s)),
        role_mappings: matches
            .get_one("role-mappings")
            .map(|s: &String| PathBuf::from(s)),
        users: matches.get_one("users").map(|s: &String| PathBuf::from(s)),
        dsn: matches.get_one("dsn").map(|s: &String| s.to_string()),
        logout_path: matches
            .get_one("logout-path")
            .map(|s: &String| s.to_string())
            .unwrap_or_else(|| "/".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::handler;
    use crate::cli::actions::{Action, StoreKind};
    use crate::cli::commands;

    #[test]
    fn builds_a_server_action_from_matches() {
        let matches = commands::new().get_matches_from(vec![
            "ensaluto",
            "--users",
            "/etc/ensaluto/users.json",
            "--context-path",
            "/bob",
            "--sso-store",
            "file",
            "--sso-file",
            "/tmp/logins",
        ]);

        let Action::Server {
            port,
            context_path,
            cookie_name,
            store,
            sso_file,
            users,
            dsn,
            logout_path,
            ..
        } = handler(&matches).expect("action");

        assert_eq!(port, 8080);
        assert_eq!(context_path, "/bob");
        assert_eq!(cookie_name, "ensaluto_sso");
        assert_eq!(store, StoreKind::File);
        assert_eq!(sso_file.map(|p| p.display().to_string()), Some("/tmp/logins".to_string()));
        assert_eq!(
            users.map(|p| p.display().to_string()),
            Some("/etc/ensaluto/users.json".to_string())
        );
        assert!(dsn.is_none());
        assert_eq!(logout_path, "/");
    }
}
