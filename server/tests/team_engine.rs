mod common;

use common::Harness;
use team_service::error::TeamError;

#[tokio::test]
async fn team_names_are_unique() {
    let h = Harness::new();
    h.register_users(&[1, 2]);

    let falcons = h.engines.teams.create("Falcons", 1).await.unwrap();
    assert_eq!(falcons.name, "Falcons");
    assert_eq!(falcons.mates.len(), 1);
    assert!(falcons.mates[0].is_captain);
    assert_eq!(falcons.mates[0].user_name.as_deref(), Some("User 1"));

    let err = h.engines.teams.create("Falcons", 2).await.unwrap_err();
    assert!(matches!(err, TeamError::NameAlreadyUsed));
    // the rejected creator stays free to join elsewhere
    assert!(h.engines.mates.find(2).await.unwrap().is_none());
}

#[tokio::test]
async fn creating_requires_a_known_free_user() {
    let h = Harness::new();
    assert!(matches!(
        h.engines.teams.create("Ghosts", 77).await,
        Err(TeamError::UserNotFound)
    ));

    h.brand_team("Falcons", 1, &[]).await;
    assert!(matches!(
        h.engines.teams.create("Hawks", 1).await,
        Err(TeamError::AlreadyMember)
    ));
}

#[tokio::test]
async fn removing_the_last_member_dissolves_the_team() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[2]).await;

    let removed = h.engines.teams.remove_member(2, Some(team.id)).await.unwrap();
    assert_eq!(removed.user_id, 2);
    let info = h.engines.teams.get_info(team.id).await.unwrap();
    assert_eq!(info.mates.len(), 1);

    h.engines.teams.remove_member(1, None).await.unwrap();
    assert!(matches!(
        h.engines.teams.get_info(team.id).await,
        Err(TeamError::TeamNotFound)
    ));
}

#[tokio::test]
async fn the_only_captain_cannot_walk_out_on_the_team() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[2]).await;

    assert!(matches!(
        h.engines.teams.remove_member(1, None).await,
        Err(TeamError::LastCaptain)
    ));
    assert!(matches!(
        h.engines.teams.set_captain(team.id, 1, false).await,
        Err(TeamError::LastCaptain)
    ));

    h.engines.teams.set_captain(team.id, 2, true).await.unwrap();
    h.engines.teams.set_captain(team.id, 1, false).await.unwrap();
    assert_eq!(h.engines.mates.captains(team.id).await.unwrap().len(), 1);
    h.engines.teams.remove_member(1, None).await.unwrap();
}

#[tokio::test]
async fn captains_only_act_on_their_own_team() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    let hawks = h.brand_team("Hawks", 3, &[4]).await;

    assert!(matches!(
        h.engines.teams.remove_member(4, Some(falcons.id)).await,
        Err(TeamError::NotYourMate)
    ));
    assert!(matches!(
        h.engines.teams.set_captain(falcons.id, 4, true).await,
        Err(TeamError::NotYourMate)
    ));
    assert!(matches!(
        h.engines.teams.remove_member(99, Some(hawks.id)).await,
        Err(TeamError::NotAMember)
    ));
}

#[tokio::test]
async fn captaincy_lookups() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[2]).await;
    h.register_users(&[3]);

    assert_eq!(h.engines.teams.get_by_captain(1).await.unwrap(), team);
    assert!(matches!(
        h.engines.teams.get_by_captain(2).await,
        Err(TeamError::UserIsNotOwner)
    ));
    assert!(matches!(
        h.engines.teams.get_by_captain(3).await,
        Err(TeamError::UserNotInTeam)
    ));
    assert!(matches!(
        h.engines.teams.get_by_member(3).await,
        Err(TeamError::UserNotInTeam)
    ));
    assert_eq!(h.engines.teams.get_by_member(2).await.unwrap().id, team.id);
}

#[tokio::test]
async fn rename_checks_uniqueness_and_existence() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[]).await;
    h.brand_team("Hawks", 2, &[]).await;

    assert!(matches!(
        h.engines.teams.rename(falcons.id, "Hawks").await,
        Err(TeamError::NameAlreadyUsed)
    ));
    assert!(matches!(
        h.engines.teams.rename(404, "Owls").await,
        Err(TeamError::TeamNotFound)
    ));

    let renamed = h.engines.teams.rename(falcons.id, "Owls").await.unwrap();
    assert_eq!(renamed.name, "Owls");
    let names = h.engines.teams.name_map().await.unwrap();
    assert_eq!(names.get(&falcons.id).map(String::as_str), Some("Owls"));
    assert_eq!(h.engines.teams.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_team_leaves_no_orphans() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[2]).await;
    h.register_users(&[3]);
    h.engines.invites.invite(team.id, 3).await.unwrap();

    h.engines.teams.delete(team.id).await.unwrap();
    assert!(h.engines.mates.find(1).await.unwrap().is_none());
    assert!(h.engines.mates.find(2).await.unwrap().is_none());
    assert!(h.engines.invites.list_for_user(3).await.unwrap().is_empty());

    assert!(matches!(
        h.engines.teams.delete(team.id).await,
        Err(TeamError::TeamNotFound)
    ));
}
