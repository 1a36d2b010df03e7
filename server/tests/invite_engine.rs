mod common;

use common::Harness;
use team_service::error::TeamError;

#[tokio::test]
async fn accepting_one_invite_purges_the_rest() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[]).await;
    let hawks = h.brand_team("Hawks", 2, &[]).await;
    h.register_users(&[3]);

    let invite = h.engines.invites.invite(falcons.id, 3).await.unwrap();
    assert_eq!(invite.team_name.as_deref(), Some("Falcons"));
    assert_eq!(invite.user_name.as_deref(), Some("User 3"));
    h.engines.invites.invite(hawks.id, 3).await.unwrap();

    let pending = h.engines.invites.list_for_user(3).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().any(|i| i.team_name.as_deref() == Some("Hawks")));

    let mate = h.engines.invites.accept(falcons.id, 3).await.unwrap();
    assert_eq!(mate.team_id, falcons.id);
    assert!(!mate.is_captain);
    assert!(h.engines.invites.list_for_user(3).await.unwrap().is_empty());
}

#[tokio::test]
async fn invite_preconditions() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[2]).await;
    h.register_users(&[3]);

    assert!(matches!(
        h.engines.invites.invite(falcons.id, 50).await,
        Err(TeamError::UserNotFound)
    ));
    assert!(matches!(
        h.engines.invites.invite(falcons.id, 2).await,
        Err(TeamError::AlreadyMember)
    ));
    h.engines.invites.invite(falcons.id, 3).await.unwrap();
    assert!(matches!(
        h.engines.invites.invite(falcons.id, 3).await,
        Err(TeamError::AlreadyInvited)
    ));
    assert!(matches!(
        h.engines.invites.invite(404, 3).await,
        Err(TeamError::TeamNotFound)
    ));
}

#[tokio::test]
async fn user_service_outage_blocks_inviting() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[]).await;
    h.register_users(&[3]);
    h.users.set_down(true);

    assert!(matches!(
        h.engines.invites.invite(falcons.id, 3).await,
        Err(TeamError::ServiceUnavailable(_))
    ));
}

#[tokio::test]
async fn declining_removes_only_that_invite() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[]).await;
    let hawks = h.brand_team("Hawks", 2, &[]).await;
    h.register_users(&[3]);
    h.engines.invites.invite(falcons.id, 3).await.unwrap();
    h.engines.invites.invite(hawks.id, 3).await.unwrap();

    h.engines.invites.decline(falcons.id, 3).await.unwrap();
    let pending = h.engines.invites.list_for_user(3).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].team_id, hawks.id);

    assert!(matches!(
        h.engines.invites.decline(falcons.id, 3).await,
        Err(TeamError::NoSuchInvite)
    ));
}

#[tokio::test]
async fn a_failed_accept_keeps_the_invite() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[]).await;
    h.register_users(&[3]);
    h.engines.invites.invite(falcons.id, 3).await.unwrap();

    // the invitee founds a team of their own in the meantime
    h.engines.teams.create("Owls", 3).await.unwrap();

    assert!(matches!(
        h.engines.invites.accept(falcons.id, 3).await,
        Err(TeamError::AlreadyMember)
    ));
    assert_eq!(h.engines.invites.list_for_user(3).await.unwrap().len(), 1);

    assert!(matches!(
        h.engines.invites.accept(404, 3).await,
        Err(TeamError::NoSuchInvite)
    ));
}

#[tokio::test]
async fn clearing_counts_what_was_removed() {
    let h = Harness::new();
    let falcons = h.brand_team("Falcons", 1, &[]).await;
    let hawks = h.brand_team("Hawks", 2, &[]).await;
    h.register_users(&[3]);
    h.engines.invites.invite(falcons.id, 3).await.unwrap();
    h.engines.invites.invite(hawks.id, 3).await.unwrap();

    assert_eq!(h.engines.invites.clear_for_user(3).await.unwrap(), 2);
    assert_eq!(h.engines.invites.clear_for_user(3).await.unwrap(), 0);
}
