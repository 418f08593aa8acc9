//! Scoping properties checked over a multi-organization dataset.

mod common;

use leadscope_core::{scope_leads, scope_agents, scope_categories, Identity, Lead, LeadId};
use rusqlite::Connection;
use std::collections::BTreeSet;

struct Dataset {
    organizers: Vec<Identity>,
    agents: Vec<Identity>,
    all_leads: Vec<Lead>,
}

/// Two organizations, two agents each, a handful of leads with mixed
/// assignment and categorization.
fn build(conn: &Connection) -> Dataset {
    let leads = common::leads(conn);
    let categories = common::categories(conn);
    let mut organizers = Vec::new();
    let mut agents = Vec::new();

    for org in ["north", "south"] {
        let organizer = common::signup(conn, &format!("{org}-owner"));
        let hot = categories.create_category(&organizer, "hot").unwrap();
        let (first, first_identity) = common::hire(conn, &organizer, &format!("{org}-a1"));
        let (second, second_identity) = common::hire(conn, &organizer, &format!("{org}-a2"));

        for index in 0..6 {
            let lead = leads
                .create_lead(&organizer, &common::lead_fields(&format!("{org}{index}")))
                .unwrap();
            match index % 3 {
                0 => {
                    leads.assign_agent(&organizer, lead.id, first.id).unwrap();
                }
                1 => {
                    leads.assign_agent(&organizer, lead.id, second.id).unwrap();
                }
                _ => {}
            }
            if index % 2 == 0 {
                leads.update_category(&organizer, lead.id, Some(hot.id)).unwrap();
            }
        }

        agents.push(first_identity);
        agents.push(second_identity);
        organizers.push(organizer);
    }

    let all_leads = organizers
        .iter()
        .flat_map(|organizer| leads.list_leads(organizer).unwrap())
        .collect();
    Dataset {
        organizers,
        agents,
        all_leads,
    }
}

fn ids(leads: &[Lead]) -> BTreeSet<LeadId> {
    leads.iter().map(|lead| lead.id).collect()
}

#[test]
fn visible_leads_never_leave_the_identity_scope() {
    let conn = common::setup();
    let data = build(&conn);
    let leads = common::leads(&conn);
    assert_eq!(data.all_leads.len(), 12);

    for identity in data.organizers.iter().chain(data.agents.iter()) {
        for lead in leads.list_leads(identity).unwrap() {
            assert_eq!(lead.organization_id, identity.organization_id);
            if let Some(agent_id) = identity.role.agent_id() {
                assert_eq!(lead.agent_id, Some(agent_id));
            }
        }
    }
}

#[test]
fn in_memory_evaluation_agrees_with_sql() {
    let conn = common::setup();
    let data = build(&conn);
    let leads = common::leads(&conn);

    for identity in data.organizers.iter().chain(data.agents.iter()) {
        let predicate = scope_leads(identity);
        let expected: Vec<Lead> = data
            .all_leads
            .iter()
            .filter(|lead| predicate.matches_lead(lead))
            .cloned()
            .collect();
        assert_eq!(ids(&leads.list_leads(identity).unwrap()), ids(&expected));
    }
}

#[test]
fn unassigned_lead_count_matches_visible_uncategorized_leads() {
    let conn = common::setup();
    let data = build(&conn);
    let leads = common::leads(&conn);

    for identity in data.organizers.iter().chain(data.agents.iter()) {
        let visible_uncategorized = leads
            .list_leads(identity)
            .unwrap()
            .into_iter()
            .filter(|lead| lead.category_id.is_none())
            .count() as u64;
        assert_eq!(
            leads.unassigned_lead_count(identity).unwrap(),
            visible_uncategorized
        );
    }
}

#[test]
fn unassigned_list_and_overview_partition_organizer_leads() {
    let conn = common::setup();
    let data = build(&conn);
    let leads = common::leads(&conn);

    for organizer in &data.organizers {
        let overview = leads.lead_overview(organizer).unwrap();
        let unassigned = leads.list_unassigned_leads(organizer).unwrap();
        assert_eq!(ids(&overview.unassigned), ids(&unassigned));
        assert!(overview.assigned.iter().all(|lead| lead.agent_id.is_some()));
        assert_eq!(
            overview.assigned.len() + overview.unassigned.len(),
            leads.list_leads(organizer).unwrap().len()
        );
    }
    for agent in &data.agents {
        assert!(leads.list_unassigned_leads(agent).unwrap_err().is_permission_denied());
        assert!(leads.lead_overview(agent).unwrap().unassigned.is_empty());
    }
}

#[test]
fn agent_and_category_scopes_stay_inside_organization() {
    let conn = common::setup();
    let data = build(&conn);
    let categories = common::categories(&conn);
    let agents = common::agents(&conn, common::RecordingNotifier::default());

    for organizer in &data.organizers {
        let agent_scope = scope_agents(organizer).unwrap();
        let listed = agents.list_agents(organizer).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|agent| agent_scope.matches_agent(agent)));

        let category_scope = scope_categories(organizer).unwrap();
        let visible = categories.list_categories(organizer).unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible.iter().all(|category| category_scope.matches_category(category)));
    }
    for agent in &data.agents {
        assert!(scope_agents(agent).is_err());
        let visible = categories.list_categories(agent).unwrap();
        assert!(visible
            .iter()
            .all(|category| category.organization_id == agent.organization_id));
    }
}
