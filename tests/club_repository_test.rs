mod common;

use clubhub::{
    domain::{
        ClubCategory, ClubFilter, CreateClubRequest, CreateEventRequest, EventType,
        MeetingSchedule, SocialLinks, UserRole,
    },
    repository::{
        ClubRepository, EventRepository, SqliteClubRepository, SqliteEventRepository,
    },
};
use chrono::{Duration, Utc};

fn club_request(name: &str, category: ClubCategory) -> CreateClubRequest {
    CreateClubRequest {
        name: name.to_string(),
        description: format!("{} meets every week on campus.", name),
        category,
        logo: String::new(),
        cover_image: String::new(),
        social_links: SocialLinks::default(),
        meeting_schedule: MeetingSchedule::default(),
        tags: vec!["campus".to_string()],
    }
}

#[tokio::test]
async fn test_club_crud_and_membership() -> anyhow::Result<()> {
    let pool = common::test_pool().await;
    let president = common::insert_user(&pool, "Pat President", "pat@example.com", UserRole::ClubLeader).await;
    let student = common::insert_user(&pool, "Sam Student", "sam@example.com", UserRole::Student).await;

    let repo = SqliteClubRepository::new(pool.clone());

    // Create enrols the president
    let club = repo.create(president.id, club_request("Chess Club", ClubCategory::Academic)).await?;
    assert_eq!(club.president_id, president.id);
    assert!(club.is_active);
    assert!(repo.is_member(club.id, president.id).await?);
    assert_eq!(repo.member_count(club.id).await?, 1);

    // Joining twice is a no-op the second time
    assert!(repo.add_member(club.id, student.id).await?);
    assert!(!repo.add_member(club.id, student.id).await?);
    let members = repo.member_ids(club.id).await?;
    assert_eq!(members.len(), 2);
    assert!(members.contains(&president.id) && members.contains(&student.id));
    assert_eq!(repo.club_ids_for_member(student.id).await?, vec![club.id]);

    // Update
    let mut changed = club.clone();
    changed.vice_president_id = Some(student.id);
    changed.tags = vec!["strategy".to_string()];
    let updated = repo.update(&changed).await?;
    assert_eq!(updated.vice_president_id, Some(student.id));
    assert_eq!(updated.tags, vec!["strategy".to_string()]);

    // Leaving gives up the vice presidency
    assert!(repo.remove_member(club.id, student.id).await?);
    assert!(!repo.remove_member(club.id, student.id).await?);
    let after_leave = repo.find_by_id(club.id).await?.expect("club exists");
    assert_eq!(after_leave.vice_president_id, None);
    assert_eq!(after_leave.president_id, president.id);
    assert!(!repo.is_member(club.id, student.id).await?);

    // Delete
    repo.delete(club.id).await?;
    assert!(repo.find_by_id(club.id).await?.is_none());
    assert!(repo.club_ids_for_member(president.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_club_filters_and_trending() -> anyhow::Result<()> {
    let pool = common::test_pool().await;
    let leader = common::insert_user(&pool, "Lee Leader", "lee@example.com", UserRole::ClubLeader).await;
    let a = common::insert_user(&pool, "Ann", "ann@example.com", UserRole::Student).await;
    let b = common::insert_user(&pool, "Ben", "ben@example.com", UserRole::Student).await;

    let repo = SqliteClubRepository::new(pool.clone());
    let robotics = repo.create(leader.id, club_request("Robotics Society", ClubCategory::Technical)).await?;
    let hiking = repo.create(leader.id, club_request("Hiking Group", ClubCategory::Sports)).await?;
    let theatre = repo.create(leader.id, club_request("Theatre 100% Live", ClubCategory::Cultural)).await?;

    repo.add_member(hiking.id, a.id).await?;
    repo.add_member(hiking.id, b.id).await?;
    repo.add_member(theatre.id, a.id).await?;

    let by_category = ClubFilter {
        category: Some(ClubCategory::Technical),
        search: None,
    };
    let clubs = repo.list(&by_category, 10, 0).await?;
    assert_eq!(clubs.len(), 1);
    assert_eq!(clubs[0].id, robotics.id);
    assert_eq!(repo.count(&by_category).await?, 1);

    // Search is case-insensitive and treats % literally
    let by_search = ClubFilter {
        category: None,
        search: Some("100%".to_string()),
    };
    let clubs = repo.list(&by_search, 10, 0).await?;
    assert_eq!(clubs.len(), 1);
    assert_eq!(clubs[0].id, theatre.id);

    let by_name = ClubFilter {
        category: None,
        search: Some("HIKING".to_string()),
    };
    assert_eq!(repo.count(&by_name).await?, 1);

    // Paging
    let all = ClubFilter::default();
    assert_eq!(repo.count(&all).await?, 3);
    assert_eq!(repo.list(&all, 2, 0).await?.len(), 2);
    assert_eq!(repo.list(&all, 2, 2).await?.len(), 1);

    let trending = repo.list_trending(2).await?;
    assert_eq!(
        trending.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![hiking.id, theatre.id]
    );

    Ok(())
}

#[tokio::test]
async fn test_event_registration_respects_capacity() -> anyhow::Result<()> {
    let pool = common::test_pool().await;
    let leader = common::insert_user(&pool, "Lee Leader", "lee@example.com", UserRole::ClubLeader).await;
    let a = common::insert_user(&pool, "Ann", "ann@example.com", UserRole::Student).await;
    let b = common::insert_user(&pool, "Ben", "ben@example.com", UserRole::Student).await;

    let club = SqliteClubRepository::new(pool.clone())
        .create(leader.id, club_request("Film Club", ClubCategory::Cultural))
        .await?;

    let events = SqliteEventRepository::new(pool.clone());
    let start = Utc::now() + Duration::days(3);
    let event = events
        .create(
            leader.id,
            CreateEventRequest {
                title: "Screening".to_string(),
                description: "Monthly screening and discussion.".to_string(),
                club: club.id,
                event_type: EventType::Social,
                start_date: start,
                end_date: start + Duration::hours(2),
                location: "Campus".to_string(),
                venue: "Auditorium".to_string(),
                max_participants: 1,
                registration_deadline: None,
                is_registration_required: true,
                registration_fee: 0.0,
                images: Vec::new(),
                tags: Vec::new(),
            },
        )
        .await?;

    assert!(events.register(event.id, a.id).await?);
    // Full
    assert!(!events.register(event.id, b.id).await?);
    // Duplicate
    assert!(!events.register(event.id, a.id).await?);
    assert_eq!(events.registration_count(event.id).await?, 1);
    assert_eq!(events.participant_ids(event.id).await?, vec![a.id]);

    assert!(events.unregister(event.id, a.id).await?);
    assert!(events.register(event.id, b.id).await?);

    Ok(())
}
