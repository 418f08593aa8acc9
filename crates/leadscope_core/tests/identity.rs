mod common;

use leadscope_core::{IdentityProvider, Profile, Role, ServiceError, ValidationError};
use uuid::Uuid;

#[test]
fn signup_provisions_organizer_with_organization() {
    let conn = common::setup();
    let service = common::identities(&conn);

    let mut profile = Profile::new("  olivia ", "olivia@crm.test");
    profile.first_name = "Olivia".to_string();
    let signup = service.create_identity(&profile).unwrap();

    assert_eq!(signup.identity.username, "olivia");
    assert_eq!(signup.identity.role, Role::Organizer);
    assert_eq!(signup.identity.organization_id, signup.organization.id);
    assert_eq!(signup.organization.owner_identity_id, signup.identity.id);
    assert_eq!(
        service.organization_of(&signup.identity).unwrap(),
        signup.organization
    );
}

#[test]
fn each_organizer_owns_a_distinct_organization() {
    let conn = common::setup();
    let first = common::signup(&conn, "olivia");
    let second = common::signup(&conn, "oscar");
    assert_ne!(first.organization_id, second.organization_id);
}

#[test]
fn signup_rejects_duplicates_and_bad_profiles() {
    let conn = common::setup();
    let service = common::identities(&conn);
    common::signup(&conn, "olivia");

    let duplicate = service
        .create_identity(&Profile::new("olivia", "again@crm.test"))
        .unwrap_err();
    assert!(matches!(
        duplicate,
        ServiceError::Validation(ValidationError::DuplicateUsername(_))
    ));
    assert!(service
        .create_identity(&Profile::new("", "blank@crm.test"))
        .unwrap_err()
        .is_validation());
    assert!(service
        .create_identity(&Profile::new("nomail", "not-an-email"))
        .unwrap_err()
        .is_validation());

    let organizations: i64 = conn
        .query_row("SELECT COUNT(*) FROM organizations;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(organizations, 1);
}

#[test]
fn agent_identity_resolves_role_and_employer() {
    let conn = common::setup();
    let organizer = common::signup(&conn, "olivia");
    let (agent, identity) = common::hire(&conn, &organizer, "adam");

    assert_eq!(identity.role, Role::Agent(agent.id));
    assert_eq!(identity.role.agent_id(), Some(agent.id));
    assert_eq!(identity.organization_id, organizer.organization_id);
    assert_eq!(
        common::identities(&conn).organization_of(&identity).unwrap().owner_identity_id,
        organizer.id
    );
}

#[test]
fn session_provider_resolves_current_identity() {
    let conn = common::setup();
    let organizer = common::signup(&conn, "olivia");
    let service = common::identities(&conn);

    let session = service.session(organizer.id);
    assert_eq!(session.current_identity().unwrap(), organizer);
    assert_eq!(organizer.current_identity().unwrap(), organizer);

    let unknown = service.session(Uuid::new_v4());
    assert!(unknown.current_identity().unwrap_err().is_not_found());
}

#[test]
fn role_serializes_as_tagged_variant() {
    let conn = common::setup();
    let organizer = common::signup(&conn, "olivia");
    let (agent, identity) = common::hire(&conn, &organizer, "adam");

    let organizer_json = serde_json::to_value(&organizer).unwrap();
    assert_eq!(organizer_json["role"], serde_json::json!({ "kind": "organizer" }));

    let agent_json = serde_json::to_value(&identity).unwrap();
    assert_eq!(agent_json["role"]["kind"], "agent");
    assert_eq!(agent_json["role"]["agent_id"], agent.id.to_string());

    let parsed: Role = serde_json::from_value(agent_json["role"].clone()).unwrap();
    assert_eq!(parsed, Role::Agent(agent.id));
}
