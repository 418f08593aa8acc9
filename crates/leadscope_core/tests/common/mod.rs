#![allow(dead_code)]

use leadscope_core::db::open_db_in_memory;
use leadscope_core::{
    Agent, AgentService, CategoryService, Identity, IdentityService, InviteConfig, LeadFields,
    LeadService, Notifier, NotifyError, Profile, SqliteAgentRepository, SqliteCategoryRepository,
    SqliteIdentityRepository, SqliteLeadRepository,
};
use rusqlite::Connection;
use std::sync::Mutex;

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

/// Records every notification instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(recipient, _, _)| recipient.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((
            recipient.to_string(),
            subject.to_string(),
            message.to_string(),
        ));
        Ok(())
    }
}

/// Always fails, to exercise best-effort delivery.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _recipient: &str, _subject: &str, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("relay offline".to_string()))
    }
}

pub fn identities(conn: &Connection) -> IdentityService<SqliteIdentityRepository<'_>> {
    IdentityService::new(SqliteIdentityRepository::new(conn))
}

pub fn leads(conn: &Connection) -> LeadService<SqliteLeadRepository<'_>> {
    LeadService::new(SqliteLeadRepository::new(conn))
}

pub fn categories(
    conn: &Connection,
) -> CategoryService<SqliteCategoryRepository<'_>, SqliteLeadRepository<'_>> {
    CategoryService::new(
        SqliteCategoryRepository::new(conn),
        SqliteLeadRepository::new(conn),
    )
}

pub fn agents<'a, N: Notifier>(
    conn: &'a Connection,
    notifier: N,
) -> AgentService<SqliteAgentRepository<'a>, N> {
    AgentService::new(
        SqliteAgentRepository::new(conn),
        notifier,
        InviteConfig::default(),
    )
}

pub fn signup(conn: &Connection, username: &str) -> Identity {
    identities(conn)
        .create_identity(&Profile::new(username, format!("{username}@crm.test")))
        .unwrap()
        .identity
}

/// Creates an agent under `organizer` and returns the agent row together with
/// the identity the agent acts as.
pub fn hire(conn: &Connection, organizer: &Identity, username: &str) -> (Agent, Identity) {
    let notifier = RecordingNotifier::default();
    let agent = agents(conn, &notifier)
        .create_agent(organizer, &Profile::new(username, format!("{username}@crm.test")))
        .unwrap();
    let identity = identities(conn).get_identity(agent.identity_id).unwrap();
    (agent, identity)
}

pub fn lead_fields(first_name: &str) -> LeadFields {
    LeadFields::new(first_name, "Prospect", format!("{}@leads.test", first_name.to_lowercase()))
}
