mod common;

use common::Harness;
use team_service::error::TeamError;
use team_service::events::HACKATHON_TEAM_DELETED;

const HACKATHON: i32 = 1;

#[tokio::test]
async fn team_size_limit_is_enforced_exactly() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 3, 100);
    let team = h.brand_team("Falcons", 1, &[2, 3, 4]).await;

    let err = h
        .engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2, 3, 4])
        .await
        .unwrap_err();
    assert!(matches!(err, TeamError::TeamTooLarge));
    assert_eq!(h.engines.hackathon_teams.registered_count(HACKATHON).await.unwrap(), 0);

    let created = h
        .engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2, 3])
        .await
        .unwrap();
    assert_eq!(created.team.name, "Falcons");
    assert_eq!(created.team.hackathon_name.as_deref(), Some("Hackathon 1"));
    assert_eq!(created.mates.len(), 3);
    assert_eq!(h.engines.hackathon_teams.registered_count(HACKATHON).await.unwrap(), 3);
}

#[tokio::test]
async fn a_full_hackathon_takes_nobody() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 3);
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    let hawks = h.brand_team("Hawks", 3, &[4]).await;
    h.engines
        .hackathon_teams
        .create(falcons.id, HACKATHON, &[1, 2])
        .await
        .unwrap();

    let err = h
        .engines
        .hackathon_teams
        .create(hawks.id, HACKATHON, &[3, 4])
        .await
        .unwrap_err();
    assert!(matches!(err, TeamError::HackathonFull));
    assert_eq!(h.engines.hackathon_teams.registered_count(HACKATHON).await.unwrap(), 2);
    assert_eq!(h.engines.hackathon_teams.list_for_hackathon(HACKATHON).await.unwrap().len(), 1);
    assert!(matches!(
        h.engines.hackathon_teams.get_mate(3, HACKATHON).await,
        Err(TeamError::NotAMember)
    ));
}

#[tokio::test]
async fn registration_needs_members_and_a_captain() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let team = h.brand_team("Falcons", 1, &[2, 3]).await;

    assert!(matches!(
        h.engines.hackathon_teams.create(team.id, HACKATHON, &[]).await,
        Err(TeamError::EmptyTeam)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.create(team.id, HACKATHON, &[40, 41]).await,
        Err(TeamError::EmptyTeam)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.create(team.id, HACKATHON, &[2, 3]).await,
        Err(TeamError::NoCaptain)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.create(404, HACKATHON, &[1]).await,
        Err(TeamError::TeamNotFound)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.create(team.id, 77, &[1]).await,
        Err(TeamError::HackathonNotFound)
    ));
}

#[tokio::test]
async fn one_registration_per_team_and_per_user() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    let hawks = h.brand_team("Hawks", 3, &[]).await;
    h.engines
        .hackathon_teams
        .create(falcons.id, HACKATHON, &[1, 2])
        .await
        .unwrap();

    assert!(matches!(
        h.engines.hackathon_teams.create(falcons.id, HACKATHON, &[1]).await,
        Err(TeamError::AlreadyParticipating)
    ));

    // user 2 switches brand teams but still holds a seat
    h.engines.mates.remove(2, true).await.unwrap();
    h.engines.mates.add(hawks.id, 2, false).await.unwrap();
    assert!(matches!(
        h.engines.hackathon_teams.create(hawks.id, HACKATHON, &[3, 2]).await,
        Err(TeamError::AlreadyParticipatingInHackathon)
    ));
    let captain_seat = h.engines.hackathon_teams.get_mate(1, HACKATHON).await.unwrap();
    let moved_seat = h.engines.hackathon_teams.get_mate(2, HACKATHON).await.unwrap();
    assert_eq!(moved_seat.team_id, captain_seat.team_id);
}

#[tokio::test]
async fn a_closed_registry_freezes_rosters() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let team = h.brand_team("Falcons", 1, &[2]).await;
    h.engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2])
        .await
        .unwrap();
    h.hackathons.set_registry_open(HACKATHON, false);

    assert!(matches!(
        h.engines.hackathon_teams.remove_member(HACKATHON, 2, false).await,
        Err(TeamError::RegistryClosed)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.set_role_description(HACKATHON, 2, Some("Design")).await,
        Err(TeamError::RegistryClosed)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.set_captain(HACKATHON, 2, true).await,
        Err(TeamError::RegistryClosed)
    ));
    assert_eq!(h.engines.hackathon_teams.registered_count(HACKATHON).await.unwrap(), 2);
}

#[tokio::test]
async fn seats_copy_brand_roles_at_registration() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let team = h.brand_team("Falcons", 1, &[2]).await;
    h.engines.mates.set_role_description(2, Some("Frontend")).await.unwrap();
    h.engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2])
        .await
        .unwrap();

    // later brand edits do not leak into the hackathon roster
    h.engines.mates.set_role_description(2, Some("Backend")).await.unwrap();
    h.engines.teams.set_captain(team.id, 2, true).await.unwrap();

    let seat = h.engines.hackathon_teams.get_mate(2, HACKATHON).await.unwrap();
    assert_eq!(seat.role_desc.as_deref(), Some("Frontend"));
    assert!(!seat.is_captain);
    assert_eq!(seat.hackathon_id, Some(HACKATHON));

    let seat = h
        .engines
        .hackathon_teams
        .set_role_description(HACKATHON, 2, Some("Pitch"))
        .await
        .unwrap();
    assert_eq!(seat.role_desc.as_deref(), Some("Pitch"));
}

#[tokio::test]
async fn adding_members_after_registration() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 3, 100);
    let falcons = h.brand_team("Falcons", 1, &[2, 3, 4]).await;
    let hawks = h.brand_team("Hawks", 5, &[]).await;
    let created = h
        .engines
        .hackathon_teams
        .create(falcons.id, HACKATHON, &[1, 2])
        .await
        .unwrap();
    let team_id = created.team.id;

    assert!(matches!(
        h.engines.hackathon_teams.add_member(hawks.id, team_id, 3).await,
        Err(TeamError::Mismatch)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.add_member(falcons.id, team_id, 99).await,
        Err(TeamError::NotAMember)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.add_member(falcons.id, team_id, 2).await,
        Err(TeamError::AlreadyParticipatingInHackathon)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.add_member(falcons.id, 404, 3).await,
        Err(TeamError::TeamNotFound)
    ));

    let seat = h.engines.hackathon_teams.add_member(falcons.id, team_id, 3).await.unwrap();
    assert_eq!(seat.team_id, team_id);
    assert_eq!(seat.user_name.as_deref(), Some("User 3"));

    // the team is now at its limit of three
    assert!(matches!(
        h.engines.hackathon_teams.add_member(falcons.id, team_id, 4).await,
        Err(TeamError::TeamTooLarge)
    ));
    assert_eq!(h.engines.hackathon_teams.list_mates(team_id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn the_last_member_leaving_dissolves_and_announces() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let team = h.brand_team("Falcons", 1, &[2]).await;
    let created = h
        .engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2])
        .await
        .unwrap();

    h.engines.hackathon_teams.remove_member(HACKATHON, 2, false).await.unwrap();
    assert!(h.publisher.published().is_empty());

    let gone = h.engines.hackathon_teams.remove_member(HACKATHON, 1, true).await.unwrap();
    assert!(gone.user_name.is_none());
    assert!(matches!(
        h.engines.hackathon_teams.get_by_id(created.team.id).await,
        Err(TeamError::TeamNotFound)
    ));

    let published = h.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].event_name, HACKATHON_TEAM_DELETED);
    assert_eq!(published[0].data["id"], created.team.id);
    assert_eq!(published[0].data["name"], "Falcons");

    assert!(matches!(
        h.engines.hackathon_teams.remove_member(HACKATHON, 1, false).await,
        Err(TeamError::NotAMember)
    ));
}

#[tokio::test]
async fn a_hackathon_team_keeps_a_captain() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let team = h.brand_team("Falcons", 1, &[2]).await;
    h.engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2])
        .await
        .unwrap();

    assert!(matches!(
        h.engines.hackathon_teams.set_captain(HACKATHON, 1, false).await,
        Err(TeamError::LastCaptain)
    ));
    // demoting a non-captain is a no-op, not a violation
    let seat = h.engines.hackathon_teams.set_captain(HACKATHON, 2, false).await.unwrap();
    assert!(!seat.is_captain);

    h.engines.hackathon_teams.set_captain(HACKATHON, 2, true).await.unwrap();
    h.engines.hackathon_teams.set_captain(HACKATHON, 1, false).await.unwrap();
    let captains = h
        .engines
        .hackathon_teams
        .captains(h.engines.hackathon_teams.get_mate(2, HACKATHON).await.unwrap().team_id)
        .await
        .unwrap();
    assert_eq!(captains.len(), 1);
    assert_eq!(captains[0].user_id, 2);
}

#[tokio::test]
async fn teammates_are_checked_per_hackathon() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    let hawks = h.brand_team("Hawks", 3, &[]).await;
    h.engines
        .hackathon_teams
        .create(falcons.id, HACKATHON, &[1, 2])
        .await
        .unwrap();
    h.engines
        .hackathon_teams
        .create(hawks.id, HACKATHON, &[3])
        .await
        .unwrap();

    let target = h.engines.hackathon_teams.ensure_teammates(HACKATHON, 1, 2).await.unwrap();
    assert_eq!(target.user_id, 2);
    assert!(matches!(
        h.engines.hackathon_teams.ensure_teammates(HACKATHON, 1, 3).await,
        Err(TeamError::NotYourMate)
    ));
    assert!(matches!(
        h.engines.hackathon_teams.ensure_teammates(HACKATHON, 9, 3).await,
        Err(TeamError::NotAMember)
    ));
}

#[tokio::test]
async fn team_views_for_readers() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    h.hackathons.add(2, 5, 100);
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    let hawks = h.brand_team("Hawks", 3, &[]).await;
    let first = h
        .engines
        .hackathon_teams
        .create(falcons.id, HACKATHON, &[1, 2])
        .await
        .unwrap()
        .team;
    let second = h
        .engines
        .hackathon_teams
        .create(hawks.id, 2, &[3])
        .await
        .unwrap()
        .team;
    h.engines
        .submissions
        .upload(HACKATHON, "pitch.txt", first.id, bytes::Bytes::from_static(b"hello"))
        .await
        .unwrap();

    let total = h.engines.hackathon_teams.get_total(first.id).await.unwrap();
    assert_eq!(total.team.hackathon_name.as_deref(), Some("Hackathon 1"));
    assert_eq!(total.mates.len(), 2);
    let submission = total.team.submission.unwrap();
    assert_eq!(submission.name, "pitch.txt");

    let listed = h.engines.hackathon_teams.list_for_hackathon(HACKATHON).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.id);
    assert!(h.engines.hackathon_teams.list_for_hackathon(3).await.unwrap().is_empty());

    let many = h
        .engines
        .hackathon_teams
        .list_many(&[first.id, second.id, 999])
        .await
        .unwrap();
    assert_eq!(many.len(), 2);
    assert!(many.iter().all(|t| t.hackathon_name.is_none()));
}

#[tokio::test]
async fn deleting_a_hackathon_team_announces_it() {
    let h = Harness::new();
    h.hackathons.add(HACKATHON, 5, 100);
    let team = h.brand_team("Falcons", 1, &[2]).await;
    let created = h
        .engines
        .hackathon_teams
        .create(team.id, HACKATHON, &[1, 2])
        .await
        .unwrap();

    let deleted = h.engines.hackathon_teams.delete_team(created.team.id).await.unwrap();
    assert_eq!(deleted.id, created.team.id);
    assert_eq!(h.engines.hackathon_teams.registered_count(HACKATHON).await.unwrap(), 0);
    assert_eq!(h.publisher.published().len(), 1);

    assert!(matches!(
        h.engines.hackathon_teams.delete_team(created.team.id).await,
        Err(TeamError::TeamNotFound)
    ));
    // the brand team is untouched
    assert_eq!(h.engines.mates.count(team.id).await.unwrap(), 2);
}
