mod common;

use common::Harness;
use team_service::acl::UserRole;
use team_service::error::TeamError;

#[tokio::test]
async fn a_user_holds_at_most_one_brand_membership() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    let hawks = h.brand_team("Hawks", 3, &[]).await;

    let err = h.engines.mates.add(hawks.id, 2, false).await.unwrap_err();
    assert!(matches!(err, TeamError::AlreadyMember));

    let err = h.engines.mates.add(falcons.id, 2, false).await.unwrap_err();
    assert!(matches!(err, TeamError::AlreadyMember));
    assert_eq!(h.engines.mates.count(falcons.id).await.unwrap(), 2);
}

#[tokio::test]
async fn organizers_cannot_join_teams() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[]).await;
    h.users.add(7, UserRole::Organizer);

    let err = h.engines.mates.add(team.id, 7, false).await.unwrap_err();
    assert!(matches!(err, TeamError::IneligibleRole));
    assert!(h.engines.mates.find(7).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_users_and_outages_are_told_apart() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[]).await;

    let err = h.engines.mates.add(team.id, 99, false).await.unwrap_err();
    assert!(matches!(err, TeamError::UserNotFound));

    h.register_users(&[5]);
    h.users.set_down(true);
    let err = h.engines.mates.add(team.id, 5, false).await.unwrap_err();
    assert!(matches!(err, TeamError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn joining_a_missing_team_fails() {
    let h = Harness::new();
    h.register_users(&[4]);
    let err = h.engines.mates.add(404, 4, false).await.unwrap_err();
    assert!(matches!(err, TeamError::TeamNotFound));
}

#[tokio::test]
async fn listing_is_enriched_but_survives_an_outage() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[2, 3]).await;

    let mates = h.engines.mates.list(team.id).await.unwrap();
    assert_eq!(mates.len(), 3);
    assert!(mates.iter().all(|m| m.user_name.is_some()));

    h.users.set_down(true);
    let mates = h.engines.mates.list(team.id).await.unwrap();
    assert_eq!(mates.len(), 3);
    assert!(mates.iter().all(|m| m.user_name.is_none()));

    let captains = h.engines.mates.captains(team.id).await.unwrap();
    assert_eq!(captains.len(), 1);
    assert_eq!(captains[0].user_id, 1);
}

#[tokio::test]
async fn role_and_captaincy_updates_need_a_membership() {
    let h = Harness::new();
    h.brand_team("Falcons", 1, &[2]).await;

    let mate = h
        .engines
        .mates
        .set_role_description(2, Some("Backend"))
        .await
        .unwrap();
    assert_eq!(mate.role_desc.as_deref(), Some("Backend"));
    assert_eq!(mate.user_name.as_deref(), Some("User 2"));

    let mate = h.engines.mates.set_captain(2, true).await.unwrap();
    assert!(mate.is_captain);

    assert!(matches!(
        h.engines.mates.set_role_description(42, None).await,
        Err(TeamError::NotAMember)
    ));
    assert!(matches!(
        h.engines.mates.set_captain(42, true).await,
        Err(TeamError::NotAMember)
    ));
}

#[tokio::test]
async fn the_last_removal_takes_the_team_with_it() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[2]).await;

    let removed = h.engines.mates.remove(2, false).await.unwrap();
    assert_eq!(removed.user_id, 2);
    assert!(h.engines.teams.exists(team.id).await.unwrap());

    let removed = h.engines.mates.remove(1, true).await.unwrap();
    assert!(removed.user_name.is_none());
    assert!(!h.engines.teams.exists(team.id).await.unwrap());

    assert!(matches!(
        h.engines.mates.remove(1, false).await,
        Err(TeamError::NotAMember)
    ));
}
