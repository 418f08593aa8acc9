use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Command-line access to the LeadScope CRM core.
#[derive(Debug, Parser)]
#[command(name = "leadscope", version, about)]
pub struct Cli {
    /// TOML config file (defaults to `leadscope.toml` in the working directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `database.path` from config.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check core linkage and print the core version.
    Ping,
    /// Create an organizer together with its organization.
    Signup(ProfileArgs),
    /// Provision an agent in the acting organizer's organization.
    Hire {
        #[command(flatten)]
        actor: ActorArgs,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Create a lead in the acting organizer's organization.
    AddLead {
        #[command(flatten)]
        actor: ActorArgs,
        #[command(flatten)]
        lead: LeadArgs,
    },
    /// Assign an agent to a lead.
    Assign {
        #[command(flatten)]
        actor: ActorArgs,
        #[arg(long)]
        lead: Uuid,
        #[arg(long)]
        agent: Uuid,
    },
    /// Create a category.
    AddCategory {
        #[command(flatten)]
        actor: ActorArgs,
        #[arg(long)]
        name: String,
    },
    /// Set or clear the category of a lead.
    Categorize {
        #[command(flatten)]
        actor: ActorArgs,
        #[arg(long)]
        lead: Uuid,
        /// Omit to clear the category.
        #[arg(long)]
        category: Option<Uuid>,
    },
    /// List the leads visible to the acting identity.
    Leads(ActorArgs),
    /// Categories plus the count of visible uncategorized leads.
    Summary(ActorArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ActorArgs {
    /// Identity id the command acts as.
    #[arg(long = "as", value_name = "IDENTITY_ID")]
    pub identity: Uuid,
}

#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
}

#[derive(Debug, Clone, Args)]
pub struct LeadArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, default_value_t = 0)]
    pub age: u32,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub description: String,
}
