//! LeadScope command-line entry point.
//!
//! # Responsibility
//! - Load layered config, start logging and open the store.
//! - Resolve the acting identity and route each subcommand to a core service.
//! - Print results as JSON on stdout.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{ActorArgs, Cli, Commands, LeadArgs, ProfileArgs};
use leadscope_core::db::open_db_with_timeout;
use leadscope_core::{
    AgentService, CategoryService, CoreConfig, Identity, IdentityProvider, IdentityService,
    LeadFields, LeadService, LogNotifier, Profile, SqliteAgentRepository,
    SqliteCategoryRepository, SqliteIdentityRepository, SqliteLeadRepository,
};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

fn main() {
    if let Err(error) = run() {
        eprintln!("leadscope error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load_from(path),
        None => CoreConfig::load(),
    }
    .context("failed to load configuration")?;
    if let Some(path) = cli.db.clone() {
        config.database.path = Some(path);
    }
    leadscope_core::init_from_config(&config.logging).context("failed to start logging")?;

    if let Commands::Ping = cli.command {
        println!("leadscope_core ping={}", leadscope_core::ping());
        println!("leadscope_core version={}", leadscope_core::core_version());
        return Ok(());
    }

    let path = database_path(&config)?;
    let conn = open_db_with_timeout(path, config.database.busy_timeout())
        .with_context(|| format!("failed to open database {}", path.display()))?;

    dispatch(&conn, &config, cli.command)
}

/// Store commands need a database file; only `ping` runs without one.
fn database_path(config: &CoreConfig) -> anyhow::Result<&Path> {
    config
        .database
        .path
        .as_deref()
        .context("no database configured; pass --db or set database.path")
}

fn dispatch(conn: &Connection, config: &CoreConfig, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Ping => Ok(()),
        Commands::Signup(profile) => {
            let signup = identities(conn).create_identity(&to_profile(profile))?;
            info!(
                "event=cli_signup module=cli status=ok identity={} organization={}",
                signup.identity.id, signup.organization.id
            );
            print_json(&signup.identity)
        }
        Commands::Hire { actor, profile } => {
            let identity = acting(conn, &actor)?;
            let notifier = LogNotifier::new(config.invite.sender.clone());
            let service = AgentService::new(
                SqliteAgentRepository::new(conn),
                notifier,
                config.invite.clone(),
            );
            print_json(&service.create_agent(&identity, &to_profile(profile))?)
        }
        Commands::AddLead { actor, lead } => {
            let identity = acting(conn, &actor)?;
            print_json(&leads(conn).create_lead(&identity, &to_lead_fields(lead))?)
        }
        Commands::Assign {
            actor,
            lead,
            agent,
        } => {
            let identity = acting(conn, &actor)?;
            print_json(&leads(conn).assign_agent(&identity, lead, agent)?)
        }
        Commands::AddCategory { actor, name } => {
            let identity = acting(conn, &actor)?;
            print_json(&categories(conn).create_category(&identity, &name)?)
        }
        Commands::Categorize {
            actor,
            lead,
            category,
        } => {
            let identity = acting(conn, &actor)?;
            print_json(&leads(conn).update_category(&identity, lead, category)?)
        }
        Commands::Leads(actor) => {
            let identity = acting(conn, &actor)?;
            print_json(&leads(conn).lead_overview(&identity)?)
        }
        Commands::Summary(actor) => {
            let identity = acting(conn, &actor)?;
            print_json(&categories(conn).category_overview(&identity)?)
        }
    }
}

fn acting(conn: &Connection, actor: &ActorArgs) -> anyhow::Result<Identity> {
    let service = identities(conn);
    let identity = service
        .session(actor.identity)
        .current_identity()
        .with_context(|| format!("unknown identity {}", actor.identity))?;
    Ok(identity)
}

fn identities(conn: &Connection) -> IdentityService<SqliteIdentityRepository<'_>> {
    IdentityService::new(SqliteIdentityRepository::new(conn))
}

fn leads(conn: &Connection) -> LeadService<SqliteLeadRepository<'_>> {
    LeadService::new(SqliteLeadRepository::new(conn))
}

fn categories(
    conn: &Connection,
) -> CategoryService<SqliteCategoryRepository<'_>, SqliteLeadRepository<'_>> {
    CategoryService::new(
        SqliteCategoryRepository::new(conn),
        SqliteLeadRepository::new(conn),
    )
}

fn to_profile(args: ProfileArgs) -> Profile {
    Profile {
        username: args.username,
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
    }
}

fn to_lead_fields(args: LeadArgs) -> LeadFields {
    LeadFields {
        first_name: args.first_name,
        last_name: args.last_name,
        age: args.age,
        description: args.description,
        phone_number: args.phone,
        email: args.email,
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::database_path;
    use leadscope_core::CoreConfig;
    use std::path::{Path, PathBuf};

    #[test]
    fn store_commands_require_a_database_path() {
        let config = CoreConfig::default();
        let err = database_path(&config).unwrap_err();
        assert!(err.to_string().contains("--db"));
    }

    #[test]
    fn configured_database_path_is_used() {
        let mut config = CoreConfig::default();
        config.database.path = Some(PathBuf::from("crm.sqlite3"));
        assert_eq!(database_path(&config).unwrap(), Path::new("crm.sqlite3"));
    }
}
