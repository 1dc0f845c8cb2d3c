//! Project scaffolding for `aegis-server init`.
//!
//! Creates the files a fresh deployment needs: `aegis.toml`, `.env.example`,
//! `.gitignore`, and the data directory.

use std::fs;
use std::path::Path;

use super::output::Output;

/// Options for the init command.
pub struct InitOptions {
    pub force: bool,
    pub host: String,
    pub port: u16,
}

/// Scaffold a new AEGIS deployment in `path`.
pub fn run(path: &Path, options: &InitOptions, out: &Output) -> std::io::Result<()> {
    out.banner();
    out.header("Initializing AEGIS deployment");

    if !path.exists() {
        fs::create_dir_all(path)?;
        out.created("directory", &path.display().to_string());
    }

    write_file(
        path,
        "aegis.toml",
        &config_template(&options.host, options.port),
        options.force,
        out,
    )?;
    write_file(path, ".env.example", ENV_TEMPLATE, options.force, out)?;
    write_file(path, ".gitignore", GITIGNORE_TEMPLATE, options.force, out)?;

    let data_dir = path.join("data");
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
        out.created("directory", &data_dir.display().to_string());
    }

    out.complete("Deployment scaffolded");
    out.hint("Set the signing secret, then start the server:");
    out.command("cp .env.example .env   # then edit AEGIS_JWT_SECRET");
    out.command("aegis-server");

    Ok(())
}

fn write_file(
    dir: &Path,
    name: &str,
    content: &str,
    force: bool,
    out: &Output,
) -> std::io::Result<()> {
    let target = dir.join(name);

    if target.exists() && !force {
        out.skipped(name, "already exists, use --force to overwrite");
        return Ok(());
    }

    fs::write(&target, content)?;
    out.created("file", name);
    Ok(())
}

fn config_template(host: &str, port: u16) -> String {
    format!(
        r#"# AEGIS server configuration
#
# Secrets are never stored here: [auth] and [federated] name environment
# variables, resolved once at startup.

[server]
host = "{host}"
port = {port}
log_level = "info"
request_timeout_secs = 30

[auth]
jwt_secret_env = "AEGIS_JWT_SECRET"
access_token_ttl = 900        # 15 minutes
refresh_token_ttl = 604800    # 7 days
password_min_length = 8

[database]
url = "./data/aegis.db"       # ":memory:" selects the in-memory store

# Uncomment to enable federated login through an OIDC provider.
# [federated]
# issuer_url = "https://id.example.com/realms/main"
# client_id = "aegis"
# client_secret_env = "AEGIS_OIDC_CLIENT_SECRET"
# redirect_url = "http://{host}:{port}/api/v1/auth/federated/callback"
"#
    )
}

const ENV_TEMPLATE: &str = r#"# AEGIS environment
#
# The signing secret must be at least 32 bytes. Generate one with:
#   openssl rand -base64 48
AEGIS_JWT_SECRET=

# Only needed when [federated] is enabled in aegis.toml.
# AEGIS_OIDC_CLIENT_SECRET=
"#;

const GITIGNORE_TEMPLATE: &str = r#"/target
/data
.env
*.db
"#;
